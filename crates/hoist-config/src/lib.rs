#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! File-backed configuration for the asset publisher.
//!
//! Layout: `model.rs` (raw document and validated config types), `validate.rs`
//! (normalisation and parsing helpers), `loader.rs` (TOML loading),
//! `defaults.rs` (documented default values).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_from_path, load_from_str};
pub use model::{
    ConfigDocument, LockConfig, LockDocument, LogFormatSetting, LoggingSettings, PublishConfig,
};
