//! Decoder configuration

use serde::{Deserialize, Serialize};

use crate::format::{DATA_REGION_START, FILE_MAGIC, RECORD_ALIGNMENT};
use crate::{MdbError, Result};

/// Binary constants and scan limits used by the decoder
///
/// `Default` reproduces the on-disk format exactly. Overrides exist for
/// inspecting damaged or unusual images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Expected 16-byte file signature
    pub magic: [u8; 16],
    /// Offset of the first record slot
    pub data_region_start: usize,
    /// Slot granularity records are padded to
    pub record_alignment: usize,
    /// Resynchronization settings
    pub resync: ResyncConfig,
    /// Largest declared record size accepted as plausible
    pub max_record_size: u32,
}

/// Bounded resynchronization after an invalid record header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResyncConfig {
    /// Distance between candidate header positions
    ///
    /// Candidates sit at multiples of `step` past the invalid header, so a
    /// valid header is only found when its distance is such a multiple. With
    /// the default of 16 a record 300 bytes on is skipped and the scan picks
    /// up at the next candidate; a step of 4 reaches it.
    pub step: usize,
    /// Bytes searched past the invalid header before giving up
    pub window: usize,
}

impl Default for ResyncConfig {
    fn default() -> Self {
        Self {
            step: 16,
            window: 4096,
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            magic: FILE_MAGIC,
            data_region_start: DATA_REGION_START,
            record_alignment: RECORD_ALIGNMENT,
            resync: ResyncConfig::default(),
            max_record_size: 4096,
        }
    }
}

impl DecoderConfig {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, parsed, or fails validation
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MdbError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| MdbError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if any size or step is zero
    pub fn validate(&self) -> Result<()> {
        if self.record_alignment == 0 {
            return Err(MdbError::ConfigError(
                "record_alignment must be > 0".to_string(),
            ));
        }

        if self.resync.step == 0 {
            return Err(MdbError::ConfigError("resync.step must be > 0".to_string()));
        }

        if self.resync.window < self.resync.step {
            return Err(MdbError::ConfigError(format!(
                "resync.window ({}) must be at least resync.step ({})",
                self.resync.window, self.resync.step
            )));
        }

        if self.max_record_size == 0 {
            return Err(MdbError::ConfigError(
                "max_record_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
