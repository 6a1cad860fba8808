use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

use crate::field::grid::FieldGrid;

/*
Double Buffering
================

                    publish()
  FieldGrid ──copy──→ [back] ──swap──→ [front] ←── load() ── FieldReader(s)
                                  ↑                           (audio / control)
                     ArcSwap<FieldSnapshot>

The publisher owns two snapshots. It copies the finished grid into the back
one, swaps it in as the front, and the old front becomes the next back. The
reader side is a single atomic pointer load; it never sees a half-written
grid because the writer only touches the back buffer.

The publisher also keeps its own reference to the front. A reader dropping
its guard therefore never frees a snapshot, so the audio thread never runs a
deallocation. If a reader still holds the back buffer when the next publish
comes around (it held a snapshot across a whole tick), that buffer is retired
and a fresh one is allocated on the writer thread. Retired buffers are freed,
again by the writer, once nobody else references them.
*/

/// One completed generation of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    width: usize,
    height: usize,
    generation: u64,
    mean: f32,
    cells: Vec<f32>,
}

impl FieldSnapshot {
    /// All-zero snapshot at generation 0.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            generation: 0,
            mean: 0.0,
            cells: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Monotonically increasing; compare against a cached value to skip
    /// remapping an unchanged field.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Average over every cell, computed once at publish time.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Row-major values in [0, 1].
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.cells[y * self.width + x]
    }

    /// Bilinear read at normalised coordinates; both axes clamp to [0, 1]
    /// where 0 and 1 land on the first and last cell centres.
    #[inline]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let fx = x.clamp(0.0, 1.0) * (self.width - 1) as f32;
        let fy = y.clamp(0.0, 1.0) * (self.height - 1) as f32;

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.get(x0, y0) + (self.get(x0 + 1, y0) - self.get(x0, y0)) * tx;
        let bottom = self.get(x0, y0 + 1) + (self.get(x0 + 1, y0 + 1) - self.get(x0, y0 + 1)) * tx;
        top + (bottom - top) * ty
    }

    fn copy_from(&mut self, grid: &FieldGrid) {
        self.width = grid.width();
        self.height = grid.height();
        self.generation = grid.generation();
        self.cells.clear();
        self.cells.extend_from_slice(grid.cells());
        self.mean = grid.mean();
    }
}

/// Writer half. Lives on the thread that steps the simulation.
pub struct FieldPublisher {
    shared: Arc<ArcSwap<FieldSnapshot>>,
    front: Arc<FieldSnapshot>,
    back: Arc<FieldSnapshot>,
    retired: Vec<Arc<FieldSnapshot>>,
}

/// Reader half. Cheap to clone; every clone sees the same front buffer.
#[derive(Clone)]
pub struct FieldReader {
    shared: Arc<ArcSwap<FieldSnapshot>>,
}

impl FieldPublisher {
    pub fn new(width: usize, height: usize) -> (Self, FieldReader) {
        let front = Arc::new(FieldSnapshot::empty(width, height));
        let back = Arc::new(FieldSnapshot::empty(width, height));
        let shared = Arc::new(ArcSwap::new(Arc::clone(&front)));

        let publisher = Self {
            shared: Arc::clone(&shared),
            front,
            back,
            retired: Vec::new(),
        };
        (publisher, FieldReader { shared })
    }

    /// Copy `grid` into the back buffer and make it the front.
    pub fn publish(&mut self, grid: &FieldGrid) {
        self.retired.retain(|snapshot| Arc::strong_count(snapshot) > 1);

        if Arc::get_mut(&mut self.back).is_none() {
            tracing::debug!(
                generation = grid.generation(),
                "field back buffer still held by a reader, allocating a new one"
            );
            let fresh = Arc::new(FieldSnapshot::empty(grid.width(), grid.height()));
            let held = std::mem::replace(&mut self.back, fresh);
            self.retired.push(held);
        }
        if let Some(back) = Arc::get_mut(&mut self.back) {
            back.copy_from(grid);
        }

        let _previous = self.shared.swap(Arc::clone(&self.back));
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Buffers waiting for their last reader to let go.
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    pub fn reader(&self) -> FieldReader {
        FieldReader {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl FieldReader {
    /// Borrow the current front buffer. Lock-free and allocation-free; hold the
    /// guard for at most one block.
    #[inline]
    pub fn load(&self) -> Guard<Arc<FieldSnapshot>> {
        self.shared.load()
    }

    /// Owned handle to the current front buffer, for control-rate readers.
    pub fn latest(&self) -> Arc<FieldSnapshot> {
        self.shared.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.shared.load().generation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::rules::SmoothLifeRules;

    fn grid(seed: u64) -> FieldGrid {
        let mut grid = FieldGrid::new(16, 12, SmoothLifeRules::default().with_outer_radius(4.0), seed).unwrap();
        grid.randomise();
        grid
    }

    #[test]
    fn reader_sees_each_published_generation() {
        let (mut publisher, reader) = FieldPublisher::new(16, 12);
        assert_eq!(reader.generation(), 0);

        let mut grid = grid(1);
        for expected in 1..=5 {
            grid.step();
            publisher.publish(&grid);
            let snapshot = reader.load();
            assert_eq!(snapshot.generation(), expected);
            assert_eq!(snapshot.cells(), grid.cells());
        }
    }

    #[test]
    fn held_snapshot_is_never_modified() {
        let (mut publisher, reader) = FieldPublisher::new(16, 12);
        let mut grid = grid(2);

        grid.step();
        publisher.publish(&grid);
        let held = reader.latest();
        let copy = (*held).clone();

        // The held buffer would be the back buffer on the second publish
        for _ in 0..4 {
            grid.step();
            publisher.publish(&grid);
        }

        assert_eq!(*held, copy, "writer touched a buffer a reader still holds");
        assert!(publisher.retired_count() >= 1);
        assert_eq!(reader.generation(), 5);

        drop(held);
        grid.step();
        publisher.publish(&grid);
        assert_eq!(publisher.retired_count(), 0);
    }

    #[test]
    fn bilinear_sample_interpolates_between_cells() {
        let mut grid = FieldGrid::new(8, 8, SmoothLifeRules::default().with_outer_radius(3.0), 0).unwrap();
        grid.set(0, 0, 0.0).unwrap();
        grid.set(1, 0, 1.0).unwrap();
        let (mut publisher, reader) = FieldPublisher::new(8, 8);
        publisher.publish(&grid);

        let snapshot = reader.load();
        let half_cell = 0.5 / 7.0;
        assert!((snapshot.sample(half_cell, 0.0) - 0.5).abs() < 1e-5);
        assert_eq!(snapshot.sample(-3.0, -3.0), 0.0);
        assert!((snapshot.mean() - 1.0 / 64.0).abs() < 1e-6);
    }
}
