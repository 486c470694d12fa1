//! Board configuration
//!
//! Loaded from `panel.toml`, embedded into the firmware image and parsed at
//! boot by a small `no_std` parser. The firmware build also validates the
//! same file on the host, so a bad file normally fails the build rather
//! than the boot.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::{ConfigError, DisplayConfig, PanelConfig, TouchConfig};
