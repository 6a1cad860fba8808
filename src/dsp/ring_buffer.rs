//! Fixed-capacity circular sample store.
//!
//! Capacity is chosen at construction (control rate) and never changes. The
//! write index always stays in `0..capacity`, and every read offset is
//! clamped to `capacity - 1`, so reads can never alias the slot being written.

#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(4)],
            write_pos: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Largest offset a read may use.
    #[inline]
    pub fn max_offset(&self) -> usize {
        self.buffer.len() - 1
    }

    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Sample written `offset` pushes ago. Offset 1 is the most recent.
    #[inline]
    pub fn read(&self, offset: usize) -> f32 {
        let len = self.buffer.len();
        let offset = offset.clamp(1, len - 1);
        self.buffer[(self.write_pos + len - offset) % len]
    }

    /// Fractional read with linear interpolation between neighbours.
    #[inline]
    pub fn read_frac(&self, offset: f32) -> f32 {
        let max = (self.buffer.len() - 2) as f32;
        let offset = offset.clamp(1.0, max);
        let whole = offset.floor();
        let frac = offset - whole;
        let a = self.read(whole as usize);
        let b = self.read(whole as usize + 1);
        a + (b - a) * frac
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
