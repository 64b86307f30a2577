//! Path Operations Module
//!
//! This module handles path operations for directories and files.

use std::path::PathBuf;

/// Join Paths
///
/// Joins a slice of path segments into a single path string, using PathBuf
/// to handle platform-specific separators. Panics if the result is not
/// valid unicode.
pub fn join(paths: &[&str]) -> String {
    let mut path: PathBuf = PathBuf::new();
    for p in paths {
        path.push(p);
    }
    path.into_os_string().into_string().unwrap()
}

pub mod dir {
    //! Directory Operations Submodule

    use std::fs;
    use std::path::Path;

    use super::{SignBridgeDir, SignBridgeImg, SignBridgePath};
    use crate::module::define;

    /// Create Directory from Path List
    ///
    /// Joins the given segments and creates the directory, returning
    /// `Some(path)` on success or `None` on failure.
    pub fn create_dir_from_path_list(paths: &[&str]) -> Option<String> {
        let path = super::join(paths);
        match fs::create_dir_all(Path::new(&path)) {
            Ok(_) => Some(path),
            Err(_) => None,
        }
    }

    /// Create Subdirectory in Either Directory
    ///
    /// Creates `name` under `dir1` when `dir1` exists, otherwise under
    /// `dir2`. Returns `Some(path)` on success.
    pub fn create_subdir_in_either_dir(dir1: &str, dir2: &str, name: &str) -> Option<String> {
        let exist: bool = Path::new(dir1).is_dir();
        let parent: &str = match exist {
            true => dir1,
            false => dir2,
        };
        create_dir_from_path_list(&[parent, name])
    }

    /// Create Data Directory
    ///
    /// Creates the application data directory under the persistent parent
    /// when available, falling back to the ephemeral parent. Panics if
    /// neither can be created.
    pub fn create_data_dir() -> String {
        let res = create_subdir_in_either_dir(
            define::path::PERSISTENT_DIR,
            define::path::EPHEMERAL_DIR,
            define::system::NAME,
        );
        match res {
            Some(path) => path,
            None => panic!("Can't Create Data Dir."),
        }
    }

    /// Create Temporary Directory
    ///
    /// Creates the application's ephemeral directory. Panics on failure.
    pub fn create_tmp_dir() -> String {
        let res = create_dir_from_path_list(&[define::path::EPHEMERAL_DIR, define::system::NAME]);
        match res {
            Some(path) => path,
            None => panic!("Can't Create Tmp Dir."),
        }
    }

    /// Create Application Subdirectory and Paths
    ///
    /// Creates the data, tmp, img and log directories and returns a
    /// `SignBridgePath` with all resource locations filled in. The capture
    /// and display images live in the ephemeral directory since they are
    /// rewritten continuously.
    pub fn create_app_sub_dir() -> SignBridgePath {
        let data_dir = create_data_dir();
        let tmp_dir = create_tmp_dir();
        let img_dir = create_dir_from_path_list(&[&data_dir, define::path::IMG_DIR]).unwrap();
        let log_dir = create_dir_from_path_list(&[&data_dir, define::path::LOG_DIR]).unwrap();
        let capture_img = super::join(&[&tmp_dir, define::path::CAPTURE_IMAGE]);
        let display_img = super::join(&[&tmp_dir, define::path::DISPLAY_IMAGE]);
        SignBridgePath {
            dir: SignBridgeDir {
                data: data_dir,
                tmp: tmp_dir,
                img: img_dir,
                log: log_dir,
            },
            img: SignBridgeImg {
                capture: capture_img,
                display: display_img,
            },
        }
    }
}

/// Paths of Resources
///
/// This struct represents the paths of the resources used by the application.
#[derive(Debug, Clone)]
pub struct SignBridgePath {
    /// Directories Paths
    pub dir: SignBridgeDir,
    /// Images Paths
    pub img: SignBridgeImg,
}

/// Paths of Directories
#[derive(Debug, Clone)]
pub struct SignBridgeDir {
    /// Data Directory Path
    pub data: String,
    /// Temporary Directory Path
    pub tmp: String,
    /// Image Directory Path
    pub img: String,
    /// Log Directory Path
    pub log: String,
}

/// Paths of Images
#[derive(Debug, Clone)]
pub struct SignBridgeImg {
    /// Last Captured Camera Frame Path
    pub capture: String,
    /// Currently Displayed Playback Frame Path
    pub display: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_create_dir_from_path_list() {
        dir::create_dir_from_path_list(&["/tmp", "signbridgetest", "test_create_dir"]);
        assert!(Path::new("/tmp/signbridgetest/test_create_dir").is_dir());
    }

    #[test]
    fn test_create_subdir_in_either_dir() {
        // The first parent doesn't exist, so the subdirectory must land in the second.
        dir::create_subdir_in_either_dir(
            "/tmp/signbridgetest-none",
            "/tmp/signbridgetest",
            "test_create_subdir",
        );
        assert!(Path::new("/tmp/signbridgetest/test_create_subdir").is_dir());
    }

    #[test]
    fn test_path_join() {
        assert_eq!(join(&["/test/", "test"]), "/test/test");
        assert_eq!(join(&["test", "test", "test"]), "test/test/test");
        assert_eq!(
            join(&["./test/", "test/", "test.txt"]),
            "./test/test/test.txt"
        );
    }
}
