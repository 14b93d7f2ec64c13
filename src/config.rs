//! Tool configuration.
//!
//! Handles loading, validating, and merging `imgtool.toml`. Stock defaults are
//! the base layer; a user file overrides just the keys it names. Command-line
//! flags override both (see `main.rs`).
//!
//! ## Config File Location
//!
//! `imgtool` looks for `imgtool.toml` in the current directory, or takes an
//! explicit file with `--config`:
//!
//! ```text
//! project/
//! ├── imgtool.toml         # picked up automatically
//! ├── photos/
//! └── out/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [convert]
//! format = "png"            # png | jpg | jpeg | gif | webp
//! quality = 80              # 1-100, JPEG and WebP only
//! resize = ""               # "800x600", "0x600", "800x0", "50%"; empty = none
//! watermark = ""            # image path; empty = none
//! watermark_opacity = 100   # 0-100
//! webp_lossless = false     # skip quality quantization for WebP
//!
//! [processing]
//! workers = 4               # parallel workers in dir mode
//! recursive = false         # descend into subdirectories in dir mode
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse:
//!
//! ```toml
//! [convert]
//! format = "webp"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::OutputFormat;
use crate::process::ProcessingOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name picked up by [`discover_config`].
pub const CONFIG_FILE_NAME: &str = "imgtool.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `imgtool.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// What each output file looks like.
    pub convert: ConvertConfig,
    /// How directory mode runs.
    pub processing: ProcessingConfig,
}

/// Per-image conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Target format name.
    pub format: String,
    /// Lossy encoding quality (1-100).
    pub quality: u32,
    /// Resize spec; empty means no resize.
    pub resize: String,
    /// Watermark image path; empty means no watermark.
    pub watermark: String,
    /// Watermark opacity (0-100).
    pub watermark_opacity: u32,
    pub webp_lossless: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            quality: 80,
            resize: String::new(),
            watermark: String::new(),
            watermark_opacity: 100,
            webp_lossless: false,
        }
    }
}

/// Directory-mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Number of parallel workers. Also bounds how many images are in memory.
    pub workers: usize,
    /// Descend into subdirectories when collecting inputs.
    pub recursive: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            recursive: false,
        }
    }
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.convert
            .format
            .parse::<OutputFormat>()
            .map_err(|e| ConfigError::Validation(format!("convert.format: {e}")))?;
        if !(1..=100).contains(&self.convert.quality) {
            return Err(ConfigError::Validation(
                "convert.quality must be 1-100".into(),
            ));
        }
        if self.convert.watermark_opacity > 100 {
            return Err(ConfigError::Validation(
                "convert.watermark_opacity must be 0-100".into(),
            ));
        }
        if self.processing.workers == 0 {
            return Err(ConfigError::Validation(
                "processing.workers must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Pipeline options described by the `[convert]` table.
    pub fn processing_options(&self) -> Result<ProcessingOptions, ConfigError> {
        let format = self
            .convert
            .format
            .parse::<OutputFormat>()
            .map_err(|e| ConfigError::Validation(format!("convert.format: {e}")))?;
        Ok(ProcessingOptions::from_parts(
            format,
            self.convert.quality,
            Some(self.convert.resize.as_str()),
            Some(Path::new(&self.convert.watermark)),
            self.convert.watermark_opacity,
            self.convert.webp_lossless,
        ))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load an explicit config file. A missing file is an error.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    resolve_config(Some(load_raw_config(path)?))
}

/// Load `imgtool.toml` from `dir` if it exists, otherwise the stock defaults.
pub fn discover_config(dir: &Path) -> Result<ToolConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config(&path)
}

/// Returns a fully-commented stock `imgtool.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgtool Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# imgtool reads ./imgtool.toml automatically, or the file given with --config.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Conversion
# ---------------------------------------------------------------------------
[convert]
# Output format: png, jpg (or jpeg), gif, webp.
format = "png"

# Encoding quality for lossy formats (1 = smallest, 100 = best).
# Ignored for png and gif.
quality = 80

# Resize before encoding. Examples:
#   "800x600"  exact size (aspect ratio not preserved)
#   "0x600"    height 600, width follows the aspect ratio
#   "800x0"    width 800, height follows the aspect ratio
#   "50%"      scale both sides
# Empty means no resize.
resize = ""

# Image composited into the bottom-right corner, 10px from each edge.
# Empty means no watermark.
watermark = ""

# Watermark opacity (0 = invisible, 100 = opaque).
watermark_opacity = 100

# Encode WebP losslessly instead of trading detail for size by quality.
webp_lossless = false

# ---------------------------------------------------------------------------
# Processing (directory mode)
# ---------------------------------------------------------------------------
[processing]
# Parallel workers. Each holds one image in memory at a time.
workers = 4

# Include images in subdirectories.
recursive = false
"##
}
