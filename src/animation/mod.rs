//! Reveal/decay animation of yearly curves.

/// A single year's curve and its state machine.
pub mod curve;
/// Frame loop over all curves.
pub mod sequencer;
