//! Strongly typed parameter enumerations for the display driver.
//!
//! These enums map directly onto expander bit encodings and controller address
//! ranges. Prefer them over raw integers so out-of-range lines and stray control
//! bits cannot be expressed.
//!
//! # Examples
//!
//! ```rust
//! use lcd_max31855::params::{Backlight, Line};
//!
//! assert_eq!(Line::Two.base_address(), 0x40);
//! assert_eq!(Line::from_number(5), None);
//! assert!(Backlight::On.is_on());
//! ```

use modular_bitfield::prelude::Specifier;

/// Display line selection. HD44780-class 20x4 modules interleave their lines in
/// DDRAM, so the base addresses are fixed per line rather than computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// First line, DDRAM base `0x00`.
    One,
    /// Second line, DDRAM base `0x40`.
    Two,
    /// Third line, DDRAM base `0x14`.
    Three,
    /// Fourth line, DDRAM base `0x54`.
    Four,
}

impl Line {
    /// All lines in display order.
    pub const ALL: [Line; 4] = [Line::One, Line::Two, Line::Three, Line::Four];

    /// Returns the DDRAM address of the first cell on this line.
    pub const fn base_address(self) -> u8 {
        match self {
            Self::One => 0x00,
            Self::Two => 0x40,
            Self::Three => 0x14,
            Self::Four => 0x54,
        }
    }

    /// Maps a 1-based line number onto a [`Line`].
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// Returns the 1-based line number.
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

/// Backlight transistor state (`P3` on the expander).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum Backlight {
    /// Backlight off.
    Off = 0,
    /// Backlight on.
    On = 1,
}

impl Backlight {
    /// Returns `true` when the backlight is lit.
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for Backlight {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Register select line (`P0` on the expander).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum RegisterSelect {
    /// Instruction register: the byte is a command.
    Command = 0,
    /// Data register: the byte is a character or glyph row.
    Data = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_roundtrip() {
        for line in Line::ALL {
            assert_eq!(Line::from_number(line.number()), Some(line));
        }
        assert_eq!(Line::from_number(0), None);
        assert_eq!(Line::from_number(5), None);
    }

    #[test]
    fn line_base_addresses_are_fixed() {
        let bases: [u8; 4] = Line::ALL.map(Line::base_address);
        assert_eq!(bases, [0x00, 0x40, 0x14, 0x54]);
    }
}
