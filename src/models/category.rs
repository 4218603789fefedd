use camino::{Utf8Path, Utf8PathBuf};

/// A named group of ROMs sharing a directory, file extensions and candidate cores.
///
/// Categories are built once by [`crate::config::ConfigManager`] and never mutated
/// afterwards. Other components refer to them by `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub directory: Utf8PathBuf,
    pub extensions: Vec<String>,
    /// Launcher type used for core specs without a `TAG:` prefix. Empty means `RA`.
    pub emulator_type: String,
    /// Candidate cores, first one is the default.
    pub cores: Vec<String>,
    pub title_image: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Case-insensitive extension check (`ext` without the leading dot).
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// The core used when no override is given.
    pub fn default_core(&self) -> Option<&str> {
        self.cores.first().map(String::as_str)
    }

    pub fn has_core(&self, core: &str) -> bool {
        self.cores.iter().any(|c| c == core)
    }

    /// Launcher type applied to bare core names.
    pub fn default_launcher_type(&self) -> &str {
        if self.emulator_type.is_empty() {
            "RA"
        } else {
            &self.emulator_type
        }
    }
}

/// A file or subdirectory found while scanning a category directory.
///
/// `path` is the identity of the ROM: favorites, history and last-core lookups
/// are all keyed by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomFile {
    pub path: Utf8PathBuf,
    /// File stem (or directory name) shown in lists.
    pub name: String,
    /// Lowercase extension without the dot. Empty for directories.
    pub extension: String,
    pub is_directory: bool,
    pub size: u64,
}

impl RomFile {
    pub fn file(path: impl Into<Utf8PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path.file_stem().unwrap_or_default().to_string();
        let extension = path.extension().unwrap_or_default().to_lowercase();
        Self {
            path,
            name,
            extension,
            is_directory: false,
            size,
        }
    }

    pub fn directory(path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        let name = path.file_name().unwrap_or_default().to_string();
        Self {
            path,
            name,
            extension: String::new(),
            is_directory: true,
            size: 0,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_file_from_path() {
        let rom = RomFile::file("/roms/nes/Mario.NES", 40976);
        assert_eq!(rom.name, "Mario");
        assert_eq!(rom.extension, "nes");
        assert!(!rom.is_directory);
        assert_eq!(rom.size, 40976);
    }

    #[test]
    fn test_directory_entry() {
        let dir = RomFile::directory("/roms/nes/Hacks");
        assert_eq!(dir.name, "Hacks");
        assert!(dir.is_directory);
        assert!(dir.extension.is_empty());
    }

    #[test]
    fn test_category_defaults() {
        let mut category = Category::new("NES");
        assert_eq!(category.default_launcher_type(), "RA");
        assert_eq!(category.default_core(), None);

        category.emulator_type = "SA".to_string();
        category.cores = vec!["nestopia".to_string(), "fceumm".to_string()];
        category.extensions = vec!["nes".to_string(), "zip".to_string()];

        assert_eq!(category.default_launcher_type(), "SA");
        assert_eq!(category.default_core(), Some("nestopia"));
        assert!(category.has_core("fceumm"));
        assert!(category.accepts_extension("NES"));
        assert!(!category.accepts_extension("sfc"));
    }
}
