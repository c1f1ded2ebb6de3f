//! High-level MAX31855 thermocouple converter driver.

use embedded_hal::spi::SpiDevice;

use crate::error::{Error, Result};
use crate::frame::{decode, FaultCode, RawReading};
use crate::interface::spi::SpiInterface;
use crate::interface::BusTransceiver;
use crate::log::{trace, warning};

/// Outcome of a thermocouple read.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Hot-junction temperature in °C.
    Celsius(f32),
    /// The converter flagged the thermocouple; the temperature field is not trustworthy.
    Fault(FaultCode),
}

impl Reading {
    /// Returns the temperature, or `None` when a fault was reported.
    pub fn celsius(self) -> Option<f32> {
        match self {
            Self::Celsius(celsius) => Some(celsius),
            Self::Fault(_) => None,
        }
    }

    /// Returns the fault flags, if any.
    pub fn fault(self) -> Option<FaultCode> {
        match self {
            Self::Celsius(_) => None,
            Self::Fault(fault) => Some(fault),
        }
    }
}

/// Synchronous driver for one MAX31855.
///
/// Holds no state besides the bus; every call is one frame. When the SPI bus is
/// shared, serializing access is the job of the `SpiDevice` implementation.
pub struct Max31855<IFACE> {
    interface: IFACE,
}

impl<IFACE> Max31855<IFACE> {
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE) -> Self {
        Self { interface }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> IFACE {
        self.interface
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }
}

impl<SPI> Max31855<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI) -> Self {
        Self::new(SpiInterface::new(spi))
    }

    /// Releases the driver, returning the SPI device.
    pub fn release_spi(self) -> SPI {
        self.release().release()
    }
}

impl<IFACE, CommE> Max31855<IFACE>
where
    IFACE: BusTransceiver<Error = CommE>,
{
    /// Captures and decodes one frame.
    pub fn read_raw(&mut self) -> Result<RawReading, CommE> {
        let bytes = self.interface.transfer().map_err(|err| {
            warning!("max31855: frame transfer failed");
            Error::Interface(err)
        })?;

        let reading = decode(bytes);
        trace!(
            "max31855: internal {} thermocouple {} fault {}",
            reading.internal,
            reading.thermocouple,
            reading.fault.bits()
        );
        Ok(reading)
    }

    /// Reads the hot-junction temperature, or the fault flags if any are raised.
    pub fn temperature(&mut self) -> Result<Reading, CommE> {
        let raw = self.read_raw()?;
        if raw.fault.is_empty() {
            return Ok(Reading::Celsius(raw.thermocouple_celsius()));
        }

        warning!("max31855: fault reported, code {}", raw.fault.bits());
        Ok(Reading::Fault(raw.fault))
    }

    /// Reads the hot-junction temperature, folding faults into `None`.
    pub fn sample(&mut self) -> Result<Option<f32>, CommE> {
        self.temperature().map(Reading::celsius)
    }

    /// Reads the cold-junction (die) temperature. Valid even while a thermocouple fault is raised.
    pub fn read_internal(&mut self) -> Result<f32, CommE> {
        self.read_raw().map(|raw| raw.internal_celsius())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::ErrorKind;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    fn frame_read(bytes: [u8; 4]) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::read_vec(bytes.to_vec()),
            SpiTransaction::transaction_end(),
        ]
    }

    struct ScriptedBus {
        frames: Vec<core::result::Result<[u8; 4], ErrorKind>>,
    }

    impl BusTransceiver for ScriptedBus {
        type Error = ErrorKind;

        fn transfer(&mut self) -> core::result::Result<[u8; 4], Self::Error> {
            self.frames.remove(0)
        }
    }

    fn scripted(frames: &[core::result::Result<[u8; 4], ErrorKind>]) -> Max31855<ScriptedBus> {
        Max31855::new(ScriptedBus {
            frames: frames.to_vec(),
        })
    }

    #[test]
    fn temperature_over_spi_device() {
        let expectations = frame_read([0x06, 0x40, 0x19, 0x00]);
        let mut spi = SpiMock::new(&expectations);
        let mut sensor = Max31855::new_spi(spi.clone());

        assert_eq!(sensor.temperature().unwrap(), Reading::Celsius(100.0));

        spi.done();
    }

    #[test]
    fn read_raw_over_spi_device() {
        let expectations = frame_read([0x00, 0x19, 0x01, 0x40]);
        let mut spi = SpiMock::new(&expectations);
        let mut sensor = Max31855::new_spi(spi.clone());

        let raw = sensor.read_raw().unwrap();
        assert_eq!(raw.internal, 20);
        assert_eq!(raw.thermocouple, 6);
        assert!(raw.fault.is_empty());
        assert_eq!(raw.internal_celsius(), 1.25);
        assert_eq!(raw.thermocouple_celsius(), 1.5);

        spi.done();
    }

    #[test]
    fn fault_is_reported_instead_of_temperature() {
        let mut sensor = scripted(&[
            Ok([0x7F, 0xFD, 0x19, 0x01]),
            Ok([0x00, 0x01, 0x19, 0x02]),
            Ok([0x00, 0x01, 0x19, 0x04]),
        ]);

        let open = sensor.temperature().unwrap().fault().unwrap();
        assert!(open.open_circuit());

        let gnd = sensor.temperature().unwrap().fault().unwrap();
        assert!(gnd.short_to_gnd());

        let vcc = sensor.temperature().unwrap().fault().unwrap();
        assert!(vcc.short_to_vcc());
    }

    #[test]
    fn fault_bit_without_flags_still_yields_temperature() {
        let mut sensor = scripted(&[Ok([0x00, 0x19, 0x01, 0x40])]);

        assert_eq!(sensor.temperature().unwrap(), Reading::Celsius(1.5));
    }

    #[test]
    fn stale_low_bits_are_ignored_without_fault_bit() {
        let mut sensor = scripted(&[Ok([0x01, 0x90, 0x19, 0x07])]);

        assert_eq!(sensor.temperature().unwrap(), Reading::Celsius(25.0));
    }

    #[test]
    fn sample_folds_faults_into_none() {
        let mut sensor = scripted(&[Ok([0xFF, 0xF0, 0x00, 0x00]), Ok([0x00, 0x01, 0x00, 0x01])]);

        assert_eq!(sensor.sample().unwrap(), Some(-1.0));
        assert_eq!(sensor.sample().unwrap(), None);
    }

    #[test]
    fn internal_temperature_survives_sensor_fault() {
        let mut sensor = scripted(&[Ok([0x00, 0x01, 0xC9, 0x01])]);

        assert_eq!(sensor.read_internal().unwrap(), -55.0);
    }

    #[test]
    fn transport_error_propagates() {
        let mut sensor = scripted(&[Err(ErrorKind::Other)]);

        assert_eq!(sensor.temperature(), Err(Error::Interface(ErrorKind::Other)));
    }
}
