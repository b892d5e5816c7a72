//! Default values applied when the configuration document omits a field.
//!
//! # Design
//! - Keep every default in one place so the documented values and the loader agree.

/// Permission mode applied to newly created destination directories.
pub const DIR_MODE: u32 = 0o777;
/// Entries skipped by directory publishing unless overridden.
pub const EXCLUDE: &[&str] = &[".svn", ".git", ".gitignore"];
/// Directory holding lock markers when locking is enabled.
pub const LOCK_DIR: &str = "runtime/asset-locks";
/// Log level used when neither the document nor `RUST_LOG` sets one.
pub const LOG_LEVEL: &str = "info";

/// Default exclusion list as owned strings.
#[must_use]
pub fn exclude() -> Vec<String> {
    EXCLUDE.iter().map(|entry| (*entry).to_string()).collect()
}
