//! HD44780-class character display driven through a PCF8574 I2C expander.
//!
//! The expander exposes eight output pins; four carry the controller's upper data
//! lines and the rest drive register select, enable, and the backlight. Every
//! byte therefore travels as two nibbles, each latched by an enable strobe.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::commands::{
    set_ddram_address,
    split_nibbles,
    Control,
    CGRAM_GLYPHS,
    CMD_CLEAR_DISPLAY,
    CMD_RETURN_HOME,
    CMD_SET_CGRAM_ADDR,
    INIT_SEQUENCE,
    MAX_DDRAM_ADDRESS,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::i2c::I2cInterface;
use crate::interface::BusWriter;
use crate::log::{debug, warning};
use crate::params::{Backlight, Line, RegisterSelect};
use crate::text::{encode_char, fit_line, justify, wrap_point};

// Data lines must be stable before the enable edge.
const NIBBLE_SETUP_US: u32 = 100;
// Enable high-phase hold.
const STROBE_HOLD_US: u32 = 500;
// Enable low-phase settle after the falling edge.
const STROBE_SETTLE_US: u32 = 100;
// Settle after the last handshake command.
const INIT_SETTLE_US: u32 = 200;
// Settle after a bare port write (backlight changes).
const PORT_SETTLE_US: u32 = 100;

/// Bitmap of one user-defined character, top row first, 5 significant bits per row.
pub type Glyph = [u8; 8];

/// Display driver bound to an I2C expander.
pub type I2cLcd<M, I2C, D> = Lcd<M, I2cInterface<I2C>, D>;

/// High-level synchronous driver for one character display.
///
/// All operations take `&self` and run under a driver-wide lock held for the
/// whole operation, delays included, so concurrent callers can never splice
/// nibbles into each other's commands. `M` selects the lock flavour:
/// `CriticalSectionRawMutex` when the driver is shared between execution
/// contexts, `NoopRawMutex` when it is not.
///
/// Every write is strobed with fixed waits, so the lock is held for a long
/// time: about 11 ms for [`init`](Self::init) and about 24 ms per padded
/// 16-column line. A critical section masks interrupts for that whole span.
/// Where interrupt latency matters, share the driver between threads or tasks
/// with a thread-mode or RTOS-backed `RawMutex` instead.
pub struct Lcd<M, IFACE, D> {
    state: Mutex<M, RefCell<BusState<IFACE, D>>>,
    config: Config,
}

/// Everything the protocol mutates, kept behind the lock.
struct BusState<IFACE, D> {
    interface: IFACE,
    delay: D,
    backlight: Backlight,
    initialized: bool,
}

impl<M, IFACE, D> Lcd<M, IFACE, D>
where
    M: RawMutex,
{
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface and delay.
    ///
    /// Nothing is sent until [`init`](Self::init) is called.
    pub fn new(interface: IFACE, delay: D, config: Config) -> Self {
        Self {
            state: Mutex::new(RefCell::new(BusState {
                interface,
                delay,
                backlight: config.backlight,
                initialized: false,
            })),
            config,
        }
    }

    /// Consumes the driver and returns the owned interface, delay and configuration.
    pub fn release(self) -> (IFACE, D, Config) {
        let state = self.state.into_inner().into_inner();
        (state.interface, state.delay, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.state.get_mut().get_mut().interface
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the cached backlight state.
    pub fn is_backlight_on(&self) -> bool {
        self.state.lock(|state| state.borrow().backlight.is_on())
    }
}

impl<M, I2C, D> Lcd<M, I2cInterface<I2C>, D>
where
    M: RawMutex,
    I2C: I2c,
{
    // ==================================================================
    // == I2C Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for an expander at `address`.
    pub fn new_i2c(i2c: I2C, address: u8, delay: D, config: Config) -> Self {
        Self::new(I2cInterface::new(i2c, address), delay, config)
    }

    /// Releases the driver, returning the I2C bus, delay and configuration.
    pub fn release_i2c(self) -> (I2C, D, Config) {
        let (iface, delay, config) = self.release();
        (iface.release(), delay, config)
    }
}

impl<M, IFACE, D, CommE> Lcd<M, IFACE, D>
where
    M: RawMutex,
    IFACE: BusWriter<Error = CommE>,
    D: DelayNs,
{
    // ==================================================================
    // == Initialization ================================================
    // ==================================================================
    /// Runs the power-up handshake and puts the controller in 4-bit, two-line mode.
    ///
    /// Must complete once before any other write; the handshake itself is fixed.
    /// The backlight is reset to `Config::backlight`, overriding any earlier
    /// [`backlight`](Self::backlight) call. If the handshake fails the driver is
    /// not ready until `init` succeeds again.
    pub fn init(&self) -> Result<(), CommE> {
        self.config.validate().map_err(|_| Error::InvalidConfig)?;
        debug!("lcd: init, {} columns", self.config.columns);

        self.with_state(|state| {
            state.initialized = false;
            state.backlight = self.config.backlight;
            for command in INIT_SEQUENCE {
                state.command(command)?;
            }
            state.delay.delay_us(INIT_SETTLE_US);
            state.initialized = true;
            Ok(())
        })
    }

    // ==================================================================
    // == Character & String Output =====================================
    // ==================================================================
    /// Writes one character code at the current cursor position.
    pub fn write_char(&self, code: u8) -> Result<(), CommE> {
        self.with_ready_state(|state| state.data(code))
    }

    /// Writes `text` starting at the first cell of `line`.
    pub fn display_string(&self, text: &str, line: Line) -> Result<(), CommE> {
        self.with_ready_state(|state| {
            state.command(set_ddram_address(line.base_address()))?;
            state.write_str(text)
        })
    }

    /// Writes `text` starting at `column` (0-based) of `line`.
    pub fn display_string_at(&self, text: &str, line: Line, column: u8) -> Result<(), CommE> {
        let address = ddram_address(line, column)?;
        self.with_ready_state(|state| {
            state.command(set_ddram_address(address))?;
            state.write_str(text)
        })
    }

    /// Moves the cursor to `column` (0-based) of `line`.
    pub fn set_cursor(&self, line: Line, column: u8) -> Result<(), CommE> {
        let address = ddram_address(line, column)?;
        self.with_ready_state(|state| state.command(set_ddram_address(address)))
    }

    /// Shows `text`, wrapping it onto the second line when wider than the display.
    ///
    /// Text containing newlines is written one line per display line instead.
    /// Every written line is padded to the configured width so stale characters
    /// are overwritten.
    pub fn display(&self, text: &str) -> Result<(), CommE> {
        let columns = usize::from(self.config.columns);
        self.with_ready_state(|state| {
            if text.contains('\n') {
                return state.write_lines(text.lines(), columns);
            }

            match wrap_point(text, columns) {
                None => state.write_line(Line::One, text, columns),
                Some((end, start)) => {
                    state.write_line(Line::One, &text[..end], columns)?;
                    state.write_line(Line::Two, &text[start..], columns)
                }
            }
        })
    }

    /// Writes up to four lines, padded to the configured width. Extra lines are dropped.
    pub fn display_lines(&self, lines: &[&str]) -> Result<(), CommE> {
        let columns = usize::from(self.config.columns);
        self.with_ready_state(|state| state.write_lines(lines.iter().copied(), columns))
    }

    /// Writes up to four rows of cells, one row per line, each spread across the
    /// configured width with [`justify`]. Extra rows are dropped.
    pub fn display_table(&self, rows: &[&[&str]]) -> Result<(), CommE> {
        let columns = usize::from(self.config.columns);
        self.with_ready_state(|state| {
            for (line, cells) in Line::ALL.into_iter().zip(rows) {
                state.write_row(line, justify(cells, columns))?;
            }
            Ok(())
        })
    }

    // ==================================================================
    // == Display Control ===============================================
    // ==================================================================
    /// Clears the display and returns the cursor home.
    pub fn clear(&self) -> Result<(), CommE> {
        self.with_ready_state(|state| {
            state.command(CMD_CLEAR_DISPLAY)?;
            state.command(CMD_RETURN_HOME)
        })
    }

    /// Switches the backlight. The new state is carried by every later port write.
    ///
    /// Only touches the expander's backlight pin, so it is valid before `init`.
    pub fn backlight(&self, on: bool) -> Result<(), CommE> {
        debug!("lcd: backlight {}", on);
        let backlight = Backlight::from(on);
        self.with_state(|state| {
            state.put(Control::backlight_only(backlight))?;
            state.backlight = backlight;
            state.delay.delay_us(PORT_SETTLE_US);
            Ok(())
        })
    }

    /// Loads up to eight glyphs into CGRAM, starting at character code 0.
    ///
    /// The cursor is left in CGRAM; position it again before writing text.
    pub fn load_custom_chars(&self, glyphs: &[Glyph]) -> Result<(), CommE> {
        if glyphs.len() > CGRAM_GLYPHS {
            return Err(Error::TooManyGlyphs);
        }

        self.with_ready_state(|state| {
            state.command(CMD_SET_CGRAM_ADDR)?;
            for row in glyphs.iter().flatten() {
                state.data(*row)?;
            }
            Ok(())
        })
    }

    // ==================================================================
    // == Internal Helpers ==============================================
    // ==================================================================
    fn with_state<T, F>(&self, f: F) -> Result<T, CommE>
    where
        F: FnOnce(&mut BusState<IFACE, D>) -> Result<T, CommE>,
    {
        self.state.lock(|state| f(&mut state.borrow_mut()))
    }

    fn with_ready_state<T, F>(&self, f: F) -> Result<T, CommE>
    where
        F: FnOnce(&mut BusState<IFACE, D>) -> Result<T, CommE>,
    {
        self.with_state(|state| {
            if !state.initialized {
                return Err(Error::NotReady);
            }
            f(state)
        })
    }
}

fn ddram_address<E>(line: Line, column: u8) -> Result<u8, E> {
    line.base_address()
        .checked_add(column)
        .filter(|address| *address <= MAX_DDRAM_ADDRESS)
        .ok_or(Error::InvalidPosition)
}

impl<IFACE, D, CommE> BusState<IFACE, D>
where
    IFACE: BusWriter<Error = CommE>,
    D: DelayNs,
{
    fn put(&mut self, control: Control) -> Result<(), CommE> {
        self.interface.write(u8::from(control)).map_err(|err| {
            warning!("lcd: bus write failed");
            Error::Interface(err)
        })
    }

    /// One nibble: present the data lines, then pulse enable.
    fn write_nibble(&mut self, nibble: u8, register_select: RegisterSelect) -> Result<(), CommE> {
        let port = Control::nibble(nibble, register_select, self.backlight);

        self.put(port)?;
        self.delay.delay_us(NIBBLE_SETUP_US);

        self.put(port.with_enable(true))?;
        self.delay.delay_us(STROBE_HOLD_US);
        self.put(port.with_enable(false))?;
        self.delay.delay_us(STROBE_SETTLE_US);
        Ok(())
    }

    fn send(&mut self, byte: u8, register_select: RegisterSelect) -> Result<(), CommE> {
        for nibble in split_nibbles(byte) {
            self.write_nibble(nibble, register_select)?;
        }
        Ok(())
    }

    fn command(&mut self, command: u8) -> Result<(), CommE> {
        self.send(command, RegisterSelect::Command)
    }

    fn data(&mut self, code: u8) -> Result<(), CommE> {
        self.send(code, RegisterSelect::Data)
    }

    fn write_str(&mut self, text: &str) -> Result<(), CommE> {
        for c in text.chars() {
            self.data(encode_char(c))?;
        }
        Ok(())
    }

    fn write_line(&mut self, line: Line, text: &str, columns: usize) -> Result<(), CommE> {
        self.write_row(line, fit_line(text, columns))
    }

    fn write_row<C>(&mut self, line: Line, codes: C) -> Result<(), CommE>
    where
        C: IntoIterator<Item = u8>,
    {
        self.command(set_ddram_address(line.base_address()))?;
        for code in codes {
            self.data(code)?;
        }
        Ok(())
    }

    fn write_lines<'a, L>(&mut self, lines: L, columns: usize) -> Result<(), CommE>
    where
        L: Iterator<Item = &'a str>,
    {
        for (line, text) in Line::ALL.into_iter().zip(lines) {
            self.write_line(line, text, columns)?;
        }
        Ok(())
    }
}
