//! Instruction set of the HD44780-class controller and the PCF8574 expander
//! byte that carries it.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{Backlight, RegisterSelect};

/// `Clear display` instruction.
pub const CMD_CLEAR_DISPLAY: u8 = 0x01;
/// `Return home` instruction.
pub const CMD_RETURN_HOME: u8 = 0x02;
/// `Entry mode set` instruction.
pub const CMD_ENTRY_MODE_SET: u8 = 0x04;
/// `Display on/off control` instruction.
pub const CMD_DISPLAY_CONTROL: u8 = 0x08;
/// `Function set` instruction.
pub const CMD_FUNCTION_SET: u8 = 0x20;
/// `Set CGRAM address` instruction.
pub const CMD_SET_CGRAM_ADDR: u8 = 0x40;
/// `Set DDRAM address` instruction.
pub const CMD_SET_DDRAM_ADDR: u8 = 0x80;

/// Entry mode: cursor moves left to right.
pub const ENTRY_LEFT: u8 = 0x02;
/// Display control: display on.
pub const DISPLAY_ON: u8 = 0x04;
/// Function set: two-line mode.
pub const FUNCTION_2LINE: u8 = 0x08;
/// Function set: 5x8 dot font.
pub const FUNCTION_5X8_DOTS: u8 = 0x00;
/// Function set: 4-bit interface.
pub const FUNCTION_4BIT_MODE: u8 = 0x00;

/// Reset byte repeated three times at power-up to force a known interface width.
pub const RESET_SEQUENCE_COMMAND: u8 = 0x03;
/// Marks the end of the reset sequence and selects the 4-bit interface.
pub const ENTER_4BIT_COMMAND: u8 = 0x02;

/// Highest valid DDRAM address (7-bit address field).
pub const MAX_DDRAM_ADDRESS: u8 = 0x7F;
/// Number of user-definable glyphs in CGRAM.
pub const CGRAM_GLYPHS: usize = 8;

/// Full power-up handshake, in transmission order.
pub const INIT_SEQUENCE: [u8; 8] = [
    RESET_SEQUENCE_COMMAND,
    RESET_SEQUENCE_COMMAND,
    RESET_SEQUENCE_COMMAND,
    ENTER_4BIT_COMMAND,
    CMD_FUNCTION_SET | FUNCTION_2LINE | FUNCTION_5X8_DOTS | FUNCTION_4BIT_MODE,
    CMD_DISPLAY_CONTROL | DISPLAY_ON,
    CMD_CLEAR_DISPLAY,
    CMD_ENTRY_MODE_SET | ENTRY_LEFT,
];

/// Bitfield representation of the byte latched on the expander port.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    // Register select (P0).
    pub register_select: RegisterSelect,
    // Read/write (P1), always write.
    pub read: bool,
    // Enable strobe (P2).
    pub enable: bool,
    // Backlight transistor (P3).
    pub backlight: Backlight,
    // Data lines D4..D7 (P4..P7).
    pub data: B4,
}

impl From<u8> for Control {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Control> for u8 {
    fn from(value: Control) -> Self {
        value.into_bytes()[0]
    }
}

impl Control {
    /// Builds the port byte for one nibble with the enable line low.
    pub fn nibble(nibble: u8, register_select: RegisterSelect, backlight: Backlight) -> Self {
        Self::new()
            .with_register_select(register_select)
            .with_backlight(backlight)
            .with_data(nibble & 0x0F)
    }

    /// Port byte with only the backlight bit driven.
    pub fn backlight_only(backlight: Backlight) -> Self {
        Self::new().with_backlight(backlight)
    }
}

/// Splits a byte into its high and low nibbles, high first.
pub const fn split_nibbles(byte: u8) -> [u8; 2] {
    [byte >> 4, byte & 0x0F]
}

/// `Set DDRAM address` instruction for `address`.
pub const fn set_ddram_address(address: u8) -> u8 {
    CMD_SET_DDRAM_ADDR | (address & MAX_DDRAM_ADDRESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_layout_matches_backpack_wiring() {
        let control = Control::new()
            .with_register_select(RegisterSelect::Data)
            .with_enable(true)
            .with_backlight(Backlight::On)
            .with_data(0xA);

        assert_eq!(u8::from(control), 0b1010_1_1_0_1);

        let decoded = Control::from(0b0101_0_0_1_0);
        assert_eq!(decoded.register_select(), RegisterSelect::Command);
        assert!(decoded.read());
        assert!(!decoded.enable());
        assert_eq!(decoded.backlight(), Backlight::Off);
        assert_eq!(decoded.data(), 0x5);
    }

    #[test]
    fn nibble_places_data_in_upper_port_bits() {
        let byte = u8::from(Control::nibble(0x4, RegisterSelect::Data, Backlight::On));
        assert_eq!(byte, 0x49);

        let byte = u8::from(Control::nibble(0x3, RegisterSelect::Command, Backlight::Off));
        assert_eq!(byte, 0x30);
    }

    #[test]
    fn backlight_only_sets_bit_three() {
        assert_eq!(u8::from(Control::backlight_only(Backlight::On)), 0x08);
        assert_eq!(u8::from(Control::backlight_only(Backlight::Off)), 0x00);
    }

    #[test]
    fn init_sequence_matches_controller_handshake() {
        assert_eq!(INIT_SEQUENCE, [0x03, 0x03, 0x03, 0x02, 0x28, 0x0C, 0x01, 0x06]);
    }

    #[test]
    fn ddram_address_command() {
        assert_eq!(set_ddram_address(0x00), 0x80);
        assert_eq!(set_ddram_address(0x45), 0xC5);
        assert_eq!(set_ddram_address(0x54), 0xD4);
        assert_eq!(split_nibbles(0xC5), [0x0C, 0x05]);
    }
}
