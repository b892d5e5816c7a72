//! Destination directory naming.
//!
//! Names are the leading hex characters of a SHA-256 digest over a path
//! string, so identical inputs always land in the same directory.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::model::AssetKind;

/// Number of hex characters kept from the digest.
pub const NAME_LEN: usize = 8;

/// Hash an arbitrary string into a destination directory name.
#[must_use]
pub fn destination_name(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let mut digest = format!("{:x}", hasher.finalize());
    digest.truncate(NAME_LEN);
    digest
}

/// String fed to the hash for a canonical source path.
///
/// Files hash their containing directory (or their basename); directories
/// hash their own full path (or their basename).
#[must_use]
pub fn hash_input(kind: AssetKind, source: &Path, hash_by_name: bool) -> String {
    let chosen = if hash_by_name {
        source.file_name().map(Path::new)
    } else {
        match kind {
            AssetKind::File => source.parent(),
            AssetKind::Directory => Some(source),
        }
    };
    chosen
        .unwrap_or(source)
        .to_string_lossy()
        .into_owned()
}

/// Destination directory name for a canonical source path.
#[must_use]
pub fn destination_dir(kind: AssetKind, source: &Path, hash_by_name: bool) -> String {
    destination_name(&hash_input(kind, source, hash_by_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_short_stable_hex() {
        let first = destination_name("/srv/app/assets");
        let second = destination_name("/srv/app/assets");
        assert_eq!(first, second);
        assert_eq!(first.len(), NAME_LEN);
        assert!(first.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_ne!(first, destination_name("/srv/app/other"));
    }

    #[test]
    fn known_digest_prefix() {
        // sha256("") = e3b0c442...
        assert_eq!(destination_name(""), "e3b0c442");
    }

    #[test]
    fn files_hash_parent_and_directories_hash_themselves() {
        let file = Path::new("/srv/app/assets/css/app.css");
        assert_eq!(
            hash_input(AssetKind::File, file, false),
            "/srv/app/assets/css"
        );
        assert_eq!(hash_input(AssetKind::File, file, true), "app.css");

        let dir = Path::new("/srv/app/assets/css");
        assert_eq!(
            hash_input(AssetKind::Directory, dir, false),
            "/srv/app/assets/css"
        );
        assert_eq!(hash_input(AssetKind::Directory, dir, true), "css");
    }

    #[test]
    fn sibling_files_share_a_destination() {
        let css = Path::new("/srv/app/assets/app.css");
        let js = Path::new("/srv/app/assets/app.js");
        assert_eq!(
            destination_dir(AssetKind::File, css, false),
            destination_dir(AssetKind::File, js, false)
        );
        assert_eq!(
            destination_dir(AssetKind::File, css, false),
            destination_dir(AssetKind::Directory, Path::new("/srv/app/assets"), false)
        );
    }

    #[test]
    fn root_without_basename_falls_back_to_full_path() {
        assert_eq!(hash_input(AssetKind::Directory, Path::new("/"), true), "/");
    }
}
