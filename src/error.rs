//! Error handling primitives shared by the display and converter drivers.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// The provided configuration parameters are invalid.
    InvalidConfig,
    /// The display has not been initialized yet.
    NotReady,
    /// Line base plus column does not fit the 7-bit DDRAM address space.
    InvalidPosition,
    /// More than eight glyphs were handed to CGRAM.
    TooManyGlyphs,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}
