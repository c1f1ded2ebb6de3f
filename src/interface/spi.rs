//! SPI interface implementation built on top of `embedded-hal` `SpiDevice`.

use embedded_hal::spi::{Mode, SpiDevice, MODE_0};

use super::BusTransceiver;

/// SPI mode expected by the MAX31855 (CPOL = 0, CPHA = 0).
pub const MODE: Mode = MODE_0;

/// Number of bytes clocked out per conversion frame.
pub const FRAME_LEN: usize = 4;

/// SPI-based interface implementation for the converter driver.
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new interface from the provided SPI device abstraction.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Provides mutable access to the wrapped SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> BusTransceiver for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn transfer(&mut self) -> core::result::Result<[u8; FRAME_LEN], Self::Error> {
        // The device is read-only; the transfer overwrites whatever the buffer held.
        let mut frame = [0u8; FRAME_LEN];
        self.spi.read(&mut frame)?;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::SpiInterface;
    use crate::interface::BusTransceiver;
    use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};

    struct MockDevice<'a> {
        responses: &'a [Result<[u8; 4], ErrorKind>],
        index: usize,
    }

    impl<'a> MockDevice<'a> {
        fn new(responses: &'a [Result<[u8; 4], ErrorKind>]) -> Self {
            Self { responses, index: 0 }
        }
    }

    impl<'a> Drop for MockDevice<'a> {
        fn drop(&mut self) {
            assert_eq!(
                self.index,
                self.responses.len(),
                "not all SPI responses consumed"
            );
        }
    }

    impl<'a> ErrorType for MockDevice<'a> {
        type Error = ErrorKind;
    }

    impl<'a> SpiDevice for MockDevice<'a> {
        fn transaction<'b>(
            &mut self,
            operations: &mut [Operation<'b, u8>],
        ) -> Result<(), Self::Error> {
            let response = self
                .responses
                .get(self.index)
                .expect("unexpected SPI transaction");
            self.index += 1;

            assert_eq!(operations.len(), 1, "expected a single read operation");
            match &mut operations[0] {
                Operation::Read(buf) => {
                    assert_eq!(buf.len(), 4, "frame length mismatch");
                    let frame = (*response)?;
                    buf.copy_from_slice(&frame);
                }
                _ => panic!("operation must be read"),
            }

            Ok(())
        }
    }

    #[test]
    fn transfer_reads_one_full_frame() {
        let responses = [Ok([0x01, 0x90, 0x1A, 0x20])];
        let mut interface = SpiInterface::new(MockDevice::new(&responses));

        assert_eq!(interface.transfer().unwrap(), [0x01, 0x90, 0x1A, 0x20]);
    }

    #[test]
    fn consecutive_transfers_are_independent() {
        let responses = [Ok([0xFF; 4]), Ok([0x00; 4])];
        let mut interface = SpiInterface::new(MockDevice::new(&responses));

        assert_eq!(interface.transfer().unwrap(), [0xFF; 4]);
        assert_eq!(interface.transfer().unwrap(), [0x00; 4]);
    }

    #[test]
    fn transfer_propagates_bus_error() {
        let responses = [Err(ErrorKind::ChipSelectFault)];
        let mut interface = SpiInterface::new(MockDevice::new(&responses));

        assert_eq!(interface.transfer(), Err(ErrorKind::ChipSelectFault));
    }
}
