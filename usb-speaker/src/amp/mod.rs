//! Amplifier drivers implementing [`AudioControl`](crate::control::AudioControl).

mod max98357a;

pub use max98357a::Max98357a;
