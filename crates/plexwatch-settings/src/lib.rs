//! # plexwatch-settings
//!
//! Configuration for the plexwatch client, loaded from three layers (in
//! priority order):
//! 1. **Compiled defaults**: [`PlexwatchSettings::default()`]
//! 2. **User file**: `~/.plexwatch/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `PLEXWATCH_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use plexwatch_settings::load_settings;
//!
//! let settings = load_settings().unwrap_or_default();
//! println!("server: {}", settings.server.url);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides_with, deep_merge, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::*;
