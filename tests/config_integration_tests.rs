//! Integration tests for the launcher config and what is built from it
//!
//! These tests verify:
//! - Loading `launcher.cfg` from disk, including `$VAR` expansion and ROM_BASE joining
//! - Scanning category directories defined by the config
//! - Runtime options layered from an options file

use camino::Utf8PathBuf;
use romfront::services::RomScanner;
use romfront::{AppOptions, ConfigManager};
use std::fs;
use tempfile::TempDir;

fn create_test_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

fn write_config(root: &Utf8PathBuf) -> Utf8PathBuf {
    let config = format!(
        "\
; romfront test config
ROM_BASE={root}/Roms
CORE_PATH=${{ROM_BASE}}/../cores
TYPE_RA=./retroarch.sh
SPLASH_TIME=2
BGM_DIR={root}/bgm

-TITLE=NES
-DIR=FC
-EXT=nes,NES,zip
-CORE=nestopia,fceumm

-TITLE=NDS
-DIR=NDS
-EXT=nds
-TYPE=SA
-CORE=DRASTIC
"
    );
    let path = root.join("launcher.cfg");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn test_load_full_config() {
    let (_temp_dir, root) = create_test_dir();
    let config = ConfigManager::new(write_config(&root)).load().unwrap();

    let names: Vec<&str> = config.categories().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["NES", "NDS"]);

    assert_eq!(config.rom_base(), format!("{}/Roms", root));
    assert_eq!(
        config.core_path().map(|p| p.to_string()),
        Some(format!("{}/Roms/../cores", root))
    );
    assert_eq!(config.splash_time(), 2);
    assert_eq!(config.bgm_dir(), format!("{}/bgm", root));

    let nds = config.category("NDS").unwrap();
    assert_eq!(nds.directory, root.join("Roms/NDS"));
    assert_eq!(nds.default_launcher_type(), "SA");
}

#[test]
fn test_scan_configured_category() {
    let (_temp_dir, root) = create_test_dir();
    let config = ConfigManager::new(write_config(&root)).load().unwrap();

    let fc = root.join("Roms/FC");
    fs::create_dir_all(fc.join("Hacks")).unwrap();
    fs::create_dir_all(fc.join("aftermarket")).unwrap();
    fs::write(fc.join("Zelda.NES"), b"1").unwrap();
    fs::write(fc.join("contra.zip"), b"22").unwrap();
    fs::write(fc.join("readme.txt"), b"333").unwrap();

    let scanner = RomScanner::new();
    let nes = config.category("NES").unwrap();
    let names: Vec<String> = scanner
        .scan_category(nes, "")
        .into_iter()
        .map(|rom| rom.name)
        .collect();
    assert_eq!(names, vec!["aftermarket", "Hacks", "contra", "Zelda"]);

    let hits = scanner.search_roms(&scanner.scan_category(nes, ""), "ZEL");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].extension, "nes");
}

#[test]
fn test_scan_missing_category_directory() {
    let (_temp_dir, root) = create_test_dir();
    let config = ConfigManager::new(write_config(&root)).load().unwrap();

    let nds = config.category("NDS").unwrap();
    assert!(RomScanner::new().scan_category(nds, "").is_empty());
}

#[test]
fn test_options_file_points_at_config() {
    let (_temp_dir, root) = create_test_dir();
    let config_path = write_config(&root);
    let options_path = root.join("romfront.toml");
    fs::write(
        &options_path,
        format!(
            "config_file = \"{}\"\ndata_dir = \"{}/data\"\nlaunch_grace_ms = 250\n",
            config_path, root
        ),
    )
    .unwrap();

    let options = AppOptions::load_from(Some(&options_path)).unwrap();
    assert_eq!(options.config_file, config_path);
    assert_eq!(options.launch_grace().as_millis(), 250);

    let config = ConfigManager::new(&options.config_file).load().unwrap();
    assert_eq!(config.category_count(), 2);
}
