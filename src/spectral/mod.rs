//! Frequency-domain masking with overlap-add resynthesis.

pub mod filter;
pub mod mask;
pub mod window;

pub use filter::{SpectralFilter, MAX_FFT_SIZE, MIN_FFT_SIZE};
pub use mask::{bin_position, SpectralMask, MAX_MASK_GAIN};
