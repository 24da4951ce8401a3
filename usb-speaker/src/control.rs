/// Trait for output-stage components the speaker switches on and off with
/// the streaming interface (e.g. a class-D amplifier's shutdown pin).
pub trait AudioControl {
    /// Error type for control operations.
    type Error;

    /// Enable the component.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Disable the component.
    fn disable(&mut self) -> Result<(), Self::Error>;
}

/// A board with no switchable output stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlwaysOn;

impl AudioControl for AlwaysOn {
    type Error = core::convert::Infallible;

    fn enable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
