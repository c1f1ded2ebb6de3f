//! Bus interface abstractions for the display and converter drivers.

pub mod i2c;
pub mod spi;

/// Single-byte write access, as used by the display's port expander.
pub trait BusWriter {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Writes one byte to the expander's output port.
    fn write(&mut self, byte: u8) -> core::result::Result<(), Self::Error>;
}

/// Fixed-length frame capture, as used by the thermocouple converter.
pub trait BusTransceiver {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Clocks one complete 4-byte frame out of the device.
    fn transfer(&mut self) -> core::result::Result<[u8; 4], Self::Error>;
}
