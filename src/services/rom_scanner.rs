//! Category directory scanning.
//!
//! Lists subdirectories and extension-matching files under a category directory.
//! Directories come first, then files, each group sorted case-insensitively by name.
//! Scan problems never fail the caller: they are logged and produce an empty list.

use crate::models::{Category, RomFile};
use camino::Utf8PathBuf;

#[derive(Debug, Clone, Default)]
pub struct RomScanner;

impl RomScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan `category.directory` (or `subdirectory` relative to it).
    pub fn scan_category(&self, category: &Category, subdirectory: &str) -> Vec<RomFile> {
        let directory: Utf8PathBuf = if subdirectory.is_empty() {
            category.directory.clone()
        } else {
            category.directory.join(subdirectory)
        };

        if !directory.exists() {
            tracing::warn!("Directory not found: {}", directory);
            return Vec::new();
        }
        if !directory.is_dir() {
            tracing::warn!("Not a directory: {}", directory);
            return Vec::new();
        }

        let entries = match directory.read_dir_utf8() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("Error scanning directory {}: {}", directory, e);
                return Vec::new();
            }
        };

        let mut directories = Vec::new();
        let mut files = Vec::new();

        for entry in entries.flatten() {
            let path = entry.path().to_path_buf();
            if path.is_dir() {
                directories.push(RomFile::directory(path));
                continue;
            }

            let extension = path.extension().unwrap_or_default();
            if !category.accepts_extension(extension) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(RomFile::file(path, size));
        }

        directories.sort_by_key(|d| d.name.to_lowercase());
        files.sort_by_key(|f| f.name.to_lowercase());

        tracing::debug!(
            "Scanned {}: {} directories, {} files",
            directory,
            directories.len(),
            files.len()
        );

        directories.extend(files);
        directories
    }

    /// Case-insensitive substring filter on display names.
    pub fn search_roms(&self, roms: &[RomFile], query: &str) -> Vec<RomFile> {
        if query.is_empty() {
            return roms.to_vec();
        }

        let query = query.to_lowercase();
        roms.iter()
            .filter(|rom| rom.name.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }
}

/// Format a byte count for display (`512B`, `1.5KB`, `3.2MB`, `1.0GB`).
pub fn format_file_size(size_bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size_bytes < KB {
        format!("{}B", size_bytes)
    } else if size_bytes < MB {
        format!("{:.1}KB", size_bytes as f64 / KB as f64)
    } else if size_bytes < GB {
        format!("{:.1}MB", size_bytes as f64 / MB as f64)
    } else {
        format!("{:.1}GB", size_bytes as f64 / GB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn nes_category(dir: &TempDir) -> Category {
        let mut category = Category::new("NES");
        category.directory = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        category.extensions = vec!["nes".to_string(), "zip".to_string()];
        category
    }

    #[test]
    fn test_scan_orders_directories_then_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("zelda.nes"), b"zz").unwrap();
        fs::write(temp_dir.path().join("Mario.NES"), b"mmmm").unwrap();
        fs::write(temp_dir.path().join("readme.txt"), b"skip").unwrap();
        fs::create_dir(temp_dir.path().join("hacks")).unwrap();
        fs::create_dir(temp_dir.path().join("Beta")).unwrap();

        let roms = RomScanner::new().scan_category(&nes_category(&temp_dir), "");
        let names: Vec<&str> = roms.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["Beta", "hacks", "Mario", "zelda"]);
        assert!(roms[0].is_directory);
        assert_eq!(roms[2].extension, "nes");
        assert_eq!(roms[2].size, 4);
    }

    #[test]
    fn test_scan_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("hacks")).unwrap();
        fs::write(temp_dir.path().join("hacks").join("smb_plus.zip"), b"x").unwrap();

        let roms = RomScanner::new().scan_category(&nes_category(&temp_dir), "hacks");
        assert_eq!(roms.len(), 1);
        assert_eq!(roms[0].name, "smb_plus");
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut category = nes_category(&temp_dir);
        category.directory = category.directory.join("nope");

        assert!(RomScanner::new().scan_category(&category, "").is_empty());
    }

    #[test]
    fn test_search_roms() {
        let roms = vec![
            RomFile::file("/roms/Super Mario Bros.nes", 0),
            RomFile::file("/roms/Metroid.nes", 0),
        ];
        let scanner = RomScanner::new();

        assert_eq!(scanner.search_roms(&roms, "mario").len(), 1);
        assert_eq!(scanner.search_roms(&roms, "").len(), 2);
        assert!(scanner.search_roms(&roms, "zelda").is_empty());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512B");
        assert_eq!(format_file_size(1536), "1.5KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.0MB");
        assert_eq!(format_file_size(2 * 1024 * 1024 * 1024), "2.0GB");
    }
}
