use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    error::{Error, Result},
    field::rules::SmoothLifeRules,
};

/// Smallest accepted grid edge.
pub const MIN_FIELD_SIZE: usize = 8;

/// Neighbourhood offsets for the inner disc and outer ring, built once per
/// rule set so a tick only sums precomputed cells.
#[derive(Debug, Clone, Default)]
struct Kernel {
    inner: Vec<(isize, isize)>,
    outer: Vec<(isize, isize)>,
}

impl Kernel {
    fn new(rules: &SmoothLifeRules) -> Self {
        let reach = rules.outer_radius.ceil() as isize;
        let ri2 = rules.inner_radius * rules.inner_radius;
        let ra2 = rules.outer_radius * rules.outer_radius;

        let mut kernel = Self::default();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let d2 = (dx * dx + dy * dy) as f32;
                if d2 <= ri2 {
                    kernel.inner.push((dx, dy));
                } else if d2 <= ra2 {
                    kernel.outer.push((dx, dy));
                }
            }
        }
        kernel
    }
}

/// The SmoothLife simulation state: a toroidal grid of values in [0, 1].
///
/// Row-major, `cells[y * width + x]`. `step()` writes into a scratch grid and
/// swaps, so reads during a tick always see the previous generation.
#[derive(Debug, Clone)]
pub struct FieldGrid {
    width: usize,
    height: usize,
    cells: Vec<f32>,
    scratch: Vec<f32>,
    rules: SmoothLifeRules,
    kernel: Kernel,
    generation: u64,
    rng: StdRng,
}

impl FieldGrid {
    /// Empty grid. Call [`randomise`](Self::randomise) to seed it.
    pub fn new(width: usize, height: usize, rules: SmoothLifeRules, seed: u64) -> Result<Self> {
        if width < MIN_FIELD_SIZE || height < MIN_FIELD_SIZE {
            return Err(Error::InvalidFieldSize {
                width,
                height,
                min: MIN_FIELD_SIZE,
            });
        }
        rules.validate()?;

        Ok(Self {
            width,
            height,
            cells: vec![0.0; width * height],
            scratch: vec![0.0; width * height],
            kernel: Kernel::new(&rules),
            rules,
            generation: 0,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    pub fn rules(&self) -> &SmoothLifeRules {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: SmoothLifeRules) -> Result<()> {
        rules.validate()?;
        if rules.inner_radius != self.rules.inner_radius || rules.outer_radius != self.rules.outer_radius {
            self.kernel = Kernel::new(&rules);
        }
        self.rules = rules;
        Ok(())
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.cells[(y % self.height) * self.width + (x % self.width)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfRange {
                what: "field cell",
                index: y.saturating_mul(self.width).saturating_add(x),
                len: self.cells.len(),
            });
        }
        self.cells[y * self.width + x] = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        Ok(())
    }

    /// Uniform noise over the whole grid from the seeded generator.
    pub fn randomise(&mut self) {
        for cell in &mut self.cells {
            *cell = self.rng.gen_range(0.0..=1.0);
        }
    }

    /// Noise inside a rectangle, clipped to the grid; the rest is untouched.
    pub fn randomise_region(&mut self, x: usize, y: usize, width: usize, height: usize) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for row in y.min(y_end)..y_end {
            for col in x.min(x_end)..x_end {
                self.cells[row * self.width + col] = self.rng.gen_range(0.0..=1.0);
            }
        }
    }

    pub fn fill(&mut self, value: f32) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        self.cells.fill(value);
    }

    pub fn mean(&self) -> f32 {
        self.cells.iter().sum::<f32>() / self.cells.len() as f32
    }

    #[inline]
    fn neighbourhood_mean(&self, cx: usize, cy: usize, offsets: &[(isize, isize)]) -> f32 {
        let (w, h) = (self.width as isize, self.height as isize);
        let mut sum = 0.0;
        for &(dx, dy) in offsets {
            let x = (cx as isize + dx).rem_euclid(w) as usize;
            let y = (cy as isize + dy).rem_euclid(h) as usize;
            sum += self.cells[y * self.width + x];
        }
        sum / offsets.len().max(1) as f32
    }

    /// Advance one generation.
    pub fn step(&mut self) {
        let dt = self.rules.dt;
        for cy in 0..self.height {
            for cx in 0..self.width {
                let m = self.neighbourhood_mean(cx, cy, &self.kernel.inner);
                let n = self.neighbourhood_mean(cx, cy, &self.kernel.outer);
                let s = self.rules.transition(n, m);

                let index = cy * self.width + cx;
                self.scratch[index] = (self.cells[index] + dt * (2.0 * s - 1.0)).clamp(0.0, 1.0);
            }
        }
        std::mem::swap(&mut self.cells, &mut self.scratch);
        self.generation += 1;
    }
}
