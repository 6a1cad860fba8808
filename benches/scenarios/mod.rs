//! Full-pipeline benchmarks.
//!
//! These drive the engine the way the demo binary does: a handful of held
//! notes, every stage active, and optionally a live field.

mod engine;

pub use engine::bench_engine;
