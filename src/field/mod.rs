//! Generative SmoothLife field used as a slow modulation source.
//!
//! [`FieldGrid`] holds the simulation, [`FieldRunner`] steps it on its own
//! thread, and [`FieldReader`] gives the audio side lock-free access to the
//! latest completed generation.

pub mod buffer;
pub mod grid;
pub mod rules;
pub mod runner;

pub use buffer::{FieldPublisher, FieldReader, FieldSnapshot};
pub use grid::{FieldGrid, MIN_FIELD_SIZE};
pub use rules::SmoothLifeRules;
pub use runner::{FieldConfig, FieldRunner};
