//! Configuration primitives for the display driver.

use crate::params::Backlight;

/// Widest line an HD44780 can address in two-line mode.
pub const MAX_COLUMNS: u8 = 40;

/// User-facing configuration for the character display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Visible characters per line, used to wrap and pad text.
    pub columns: u8,
    /// Backlight state applied from `init` onwards.
    pub backlight: Backlight,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration describes a real module.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.columns == 0 || self.columns > MAX_COLUMNS {
            return Err(ConfigError::ColumnsOutOfRange);
        }

        Ok(())
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the number of visible columns.
    pub fn columns(mut self, columns: u8) -> Self {
        self.config.columns = columns;
        self
    }

    /// Overrides the initial backlight state.
    pub fn backlight(mut self, backlight: Backlight) -> Self {
        self.config.backlight = backlight;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: 16,
            backlight: Backlight::On,
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Column count is zero or wider than the controller can address.
    ColumnsOutOfRange,
}
