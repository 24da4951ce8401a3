//! MAX98357A class-D amplifier driver.
//!
//! The MAX98357A has no control bus: its `SD_MODE` pin is the only knob.
//! Driving it low shuts the amplifier down; driving it high enables it (the
//! board's pull network picks the channel mix).
//!
//! The driver is generic over any [`embedded_hal::digital::OutputPin`].
//!
//! # Example
//!
//! ```ignore
//! let mut amp = Max98357a::new(sd_mode_pin)?; // pin driven low
//! amp.enable()?;                              // streaming started
//! ```

use embedded_hal::digital::OutputPin;

use crate::control::AudioControl;

/// MAX98357A amplifier controlled through its `SD_MODE` pin.
pub struct Max98357a<P> {
    sd_mode: P,
    enabled: bool,
}

impl<P: OutputPin> Max98357a<P> {
    /// Take the `SD_MODE` pin and drive it low (shutdown).
    pub fn new(mut sd_mode: P) -> Result<Self, P::Error> {
        sd_mode.set_low()?;
        Ok(Max98357a {
            sd_mode,
            enabled: false,
        })
    }

    /// Whether the amplifier was last enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Release the pin.
    pub fn release(self) -> P {
        self.sd_mode
    }
}

impl<P: OutputPin> AudioControl for Max98357a<P> {
    type Error = P::Error;

    fn enable(&mut self) -> Result<(), Self::Error> {
        self.sd_mode.set_high()?;
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.sd_mode.set_low()?;
        self.enabled = false;
        Ok(())
    }
}
