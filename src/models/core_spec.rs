//! Core specifications: which launcher runs a ROM.
//!
//! A category's `-CORE=` list (or a per-launch override) holds raw strings in one of
//! three shapes:
//!
//! - `"nestopia"`: no prefix, uses the category's default launcher type (normally `RA`)
//! - `"SA:YABASANSHIRO"`: standalone emulator looked up as `TYPE_SA_YABASANSHIRO`
//! - `"PPSSPP:ppsspp"`: custom launcher looked up as `TYPE_PPSSPP`

use std::fmt;
use thiserror::Error;

/// Launcher tag for RetroArch-style cores.
pub const RETROARCH_TAG: &str = "RA";

/// Launcher tag for standalone emulators.
pub const STANDALONE_TAG: &str = "SA";

const LIBRETRO_SUFFIX: &str = "_libretro";
const LIBRETRO_EXTENSION: &str = ".so";

/// Errors produced while parsing a raw core string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreSpecError {
    #[error("Empty core specification")]
    Empty,

    #[error("Core specification '{0}' has an empty launcher type")]
    MissingType(String),

    #[error("Core specification '{0}' has an empty core name")]
    MissingName(String),
}

/// Parsed core specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreSpec {
    /// RetroArch plugin, invoked as `ra_script core_path rom_path`.
    RetroArch(String),
    /// Standalone emulator, invoked as `emulator rom_path`.
    Standalone(String),
    /// Any other launcher tag, invoked as `TYPE_<tag> rom_path`.
    Custom { tag: String, name: String },
}

impl CoreSpec {
    /// Parse with `RA` as the default launcher type.
    pub fn parse(raw: &str) -> Result<Self, CoreSpecError> {
        Self::parse_with_default(raw, RETROARCH_TAG)
    }

    /// Parse a raw core string.
    ///
    /// The string is split on the first `:`. The left part, uppercased, is the
    /// launcher type. Without a `:` the launcher type is `default_type`.
    pub fn parse_with_default(raw: &str, default_type: &str) -> Result<Self, CoreSpecError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreSpecError::Empty);
        }

        let (tag, name) = match raw.split_once(':') {
            Some((tag, name)) => (tag.trim().to_uppercase(), name.trim()),
            None => (default_type.trim().to_uppercase(), raw),
        };

        if tag.is_empty() {
            return Err(CoreSpecError::MissingType(raw.to_string()));
        }
        if name.is_empty() {
            return Err(CoreSpecError::MissingName(raw.to_string()));
        }

        let name = name.to_string();
        Ok(match tag.as_str() {
            RETROARCH_TAG => CoreSpec::RetroArch(name),
            STANDALONE_TAG => CoreSpec::Standalone(name),
            _ => CoreSpec::Custom { tag, name },
        })
    }

    /// Launcher type tag (`RA`, `SA`, or the custom tag).
    pub fn launcher_type(&self) -> &str {
        match self {
            CoreSpec::RetroArch(_) => RETROARCH_TAG,
            CoreSpec::Standalone(_) => STANDALONE_TAG,
            CoreSpec::Custom { tag, .. } => tag,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CoreSpec::RetroArch(name) | CoreSpec::Standalone(name) => name,
            CoreSpec::Custom { name, .. } => name,
        }
    }

    /// Suffix of the global config key holding the executable path.
    ///
    /// The full key is `TYPE_<suffix>`.
    pub fn executable_key(&self) -> String {
        match self {
            CoreSpec::RetroArch(_) => RETROARCH_TAG.to_string(),
            CoreSpec::Standalone(name) => format!("{}_{}", STANDALONE_TAG, name),
            CoreSpec::Custom { tag, .. } => tag.clone(),
        }
    }

    /// Human-readable label for the core selection list.
    pub fn display_name(&self) -> String {
        match self {
            CoreSpec::RetroArch(name) => name.clone(),
            CoreSpec::Standalone(name) => format!("{} (standalone)", name),
            CoreSpec::Custom { tag, name } => format!("{} ({})", name, tag),
        }
    }
}

impl fmt::Display for CoreSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.launcher_type(), self.name())
    }
}

/// Convert a RetroArch core name to its library filename.
///
/// Names already containing `_libretro.` or ending in `_libretro` are treated as
/// fully qualified and returned unchanged, so cross-platform names like
/// `genesis_plus_gx_libretro.dylib` keep their extension.
pub fn core_filename(core_name: &str) -> String {
    if core_name.contains("_libretro.") || core_name.ends_with(LIBRETRO_SUFFIX) {
        core_name.to_string()
    } else {
        format!("{}{}{}", core_name, LIBRETRO_SUFFIX, LIBRETRO_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_name_is_retroarch() {
        let spec = CoreSpec::parse("nestopia").unwrap();
        assert_eq!(spec, CoreSpec::RetroArch("nestopia".to_string()));
        assert_eq!(spec.launcher_type(), "RA");
        assert_eq!(spec.name(), "nestopia");
    }

    #[test]
    fn test_parse_standalone() {
        let spec = CoreSpec::parse("SA:YABASANSHIRO").unwrap();
        assert_eq!(spec, CoreSpec::Standalone("YABASANSHIRO".to_string()));
        assert_eq!(spec.executable_key(), "SA_YABASANSHIRO");
    }

    #[test]
    fn test_parse_custom_tag() {
        let spec = CoreSpec::parse("PPSSPP:ppsspp").unwrap();
        assert_eq!(spec.launcher_type(), "PPSSPP");
        assert_eq!(spec.name(), "ppsspp");
        assert_eq!(spec.executable_key(), "PPSSPP");
    }

    #[test]
    fn test_parse_lowercase_tag_is_uppercased() {
        let spec = CoreSpec::parse("sa:drastic").unwrap();
        assert_eq!(spec, CoreSpec::Standalone("drastic".to_string()));
    }

    #[test]
    fn test_parse_splits_on_first_colon_only() {
        let spec = CoreSpec::parse("CUSTOM:a:b").unwrap();
        assert_eq!(spec.name(), "a:b");
    }

    #[test]
    fn test_parse_uses_category_default_type() {
        let spec = CoreSpec::parse_with_default("drastic", "SA").unwrap();
        assert_eq!(spec, CoreSpec::Standalone("drastic".to_string()));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(CoreSpec::parse(""), Err(CoreSpecError::Empty));
        assert_eq!(CoreSpec::parse("   "), Err(CoreSpecError::Empty));
        assert!(matches!(CoreSpec::parse(":nestopia"), Err(CoreSpecError::MissingType(_))));
        assert!(matches!(CoreSpec::parse("SA:"), Err(CoreSpecError::MissingName(_))));
    }

    #[test]
    fn test_core_filename_conversion() {
        assert_eq!(core_filename("nestopia"), "nestopia_libretro.so");
        assert_eq!(core_filename("mupen64plus_next"), "mupen64plus_next_libretro.so");
        assert_eq!(
            core_filename("genesis_plus_gx_libretro.dylib"),
            "genesis_plus_gx_libretro.dylib"
        );
        assert_eq!(core_filename("snes9x_libretro"), "snes9x_libretro");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(CoreSpec::parse("nestopia").unwrap().display_name(), "nestopia");
        assert_eq!(
            CoreSpec::parse("SA:DRASTIC").unwrap().display_name(),
            "DRASTIC (standalone)"
        );
        assert_eq!(CoreSpec::parse("SA:DRASTIC").unwrap().to_string(), "SA:DRASTIC");
    }
}
