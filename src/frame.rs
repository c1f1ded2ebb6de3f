//! Decoding of the MAX31855 conversion frame.
//!
//! Each read clocks out one 32-bit big-endian word:
//!
//! | Bits    | Field                                      |
//! |---------|--------------------------------------------|
//! | D31     | thermocouple sign                          |
//! | D30:D18 | thermocouple magnitude, 0.25 °C per LSB    |
//! | D17     | reserved                                   |
//! | D16     | fault asserted                             |
//! | D15     | internal (cold-junction) sign              |
//! | D14:D4  | internal magnitude, 0.0625 °C per LSB      |
//! | D3      | reserved                                   |
//! | D2:D0   | short-to-VCC, short-to-GND, open circuit   |
//!
//! Both temperatures are two's complement over sign plus magnitude, i.e. 14 and
//! 12 bits wide respectively.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

/// Width of the internal magnitude field.
pub const INTERNAL_MAGNITUDE_BITS: u32 = 11;
/// Width of the thermocouple magnitude field.
pub const THERMOCOUPLE_MAGNITUDE_BITS: u32 = 13;

/// °C per LSB of the internal temperature.
pub const INTERNAL_RESOLUTION: f32 = 0.0625;
/// °C per LSB of the thermocouple temperature.
pub const THERMOCOUPLE_RESOLUTION: f32 = 0.25;

/// Bitfield view of one conversion frame, bit 0 first.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    // Open-circuit fault flag (D0).
    pub open_circuit: bool,
    // Short-to-GND fault flag (D1).
    pub short_to_gnd: bool,
    // Short-to-VCC fault flag (D2).
    pub short_to_vcc: bool,
    #[skip]
    __: B1,
    // Internal temperature magnitude (D14:D4).
    pub internal_magnitude: B11,
    // Internal temperature sign (D15).
    pub internal_sign: bool,
    // Fault asserted (D16).
    pub fault: bool,
    #[skip]
    __: B1,
    // Thermocouple temperature magnitude (D30:D18).
    pub thermocouple_magnitude: B13,
    // Thermocouple temperature sign (D31).
    pub thermocouple_sign: bool,
}

impl From<u32> for Frame {
    fn from(word: u32) -> Self {
        Self::from_bytes(word.to_le_bytes())
    }
}

impl From<Frame> for u32 {
    fn from(frame: Frame) -> Self {
        u32::from_le_bytes(frame.into_bytes())
    }
}

/// Bitfield representation of the three fault flags.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultCode {
    // Thermocouple open circuit (D0).
    pub open_circuit: bool,
    // Thermocouple shorted to GND (D1).
    pub short_to_gnd: bool,
    // Thermocouple shorted to VCC (D2).
    pub short_to_vcc: bool,
    #[skip]
    __: B5,
}

impl FaultCode {
    /// Returns the raw 3-bit code.
    pub fn bits(self) -> u8 {
        self.into_bytes()[0]
    }

    /// Returns `true` when no fault flag is set.
    pub fn is_empty(self) -> bool {
        self.bits() == 0
    }
}

impl From<u8> for FaultCode {
    fn from(value: u8) -> Self {
        Self::from_bytes([value & 0x07])
    }
}

impl From<FaultCode> for u8 {
    fn from(value: FaultCode) -> Self {
        value.bits()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FaultCode {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "FaultCode {{ OC: {}, SCG: {}, SCV: {} }}",
            self.open_circuit(),
            self.short_to_gnd(),
            self.short_to_vcc()
        );
    }
}

/// Sign-resolved contents of one frame, before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawReading {
    /// Cold-junction temperature in 1/16 °C.
    pub internal: i16,
    /// Thermocouple temperature in 1/4 °C.
    pub thermocouple: i16,
    /// Fault flags, empty unless the frame asserts D16.
    pub fault: FaultCode,
}

impl RawReading {
    /// Cold-junction temperature in °C.
    pub fn internal_celsius(&self) -> f32 {
        internal_celsius(self.internal)
    }

    /// Thermocouple temperature in °C.
    pub fn thermocouple_celsius(&self) -> f32 {
        thermocouple_celsius(self.thermocouple)
    }
}

/// Resolves a sign bit plus `bits`-wide magnitude as two's complement.
#[inline]
fn sign_extend(magnitude: u16, negative: bool, bits: u32) -> i16 {
    let magnitude = magnitude as i16;
    if negative {
        magnitude - (1 << bits)
    } else {
        magnitude
    }
}

/// Decodes one captured frame, most significant byte first as clocked out.
///
/// The low three bits are only meaningful while D16 is set; otherwise the
/// reported fault code is empty whatever they hold.
pub fn decode(bytes: [u8; 4]) -> RawReading {
    let frame = Frame::from(u32::from_be_bytes(bytes));

    let internal = sign_extend(
        frame.internal_magnitude(),
        frame.internal_sign(),
        INTERNAL_MAGNITUDE_BITS,
    );
    let thermocouple = sign_extend(
        frame.thermocouple_magnitude(),
        frame.thermocouple_sign(),
        THERMOCOUPLE_MAGNITUDE_BITS,
    );
    let fault = if frame.fault() {
        FaultCode::new()
            .with_open_circuit(frame.open_circuit())
            .with_short_to_gnd(frame.short_to_gnd())
            .with_short_to_vcc(frame.short_to_vcc())
    } else {
        FaultCode::new()
    };

    RawReading {
        internal,
        thermocouple,
        fault,
    }
}

/// Scales a raw internal code to °C.
pub fn internal_celsius(raw: i16) -> f32 {
    f32::from(raw) * INTERNAL_RESOLUTION
}

/// Scales a raw thermocouple code to °C.
pub fn thermocouple_celsius(raw: i16) -> f32 {
    f32::from(raw) * THERMOCOUPLE_RESOLUTION
}
