//! Value types an attachment can carry across threads.
//!
//! An [`AtomicSnapshot`] type has an atomic cell that is read and written
//! whole: a reader sees either the latest stored value or an older one, never
//! a torn value. Each type also knows how to map itself to and from the
//! normalized `0..=1` range parameters use.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use atomic_float::{AtomicF32, AtomicF64};

/// A value type with lock-free atomic snapshot semantics.
pub trait AtomicSnapshot: Copy + Default + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// The atomic cell holding one value.
    type Cell: Send + Sync;

    fn new_cell(value: Self) -> Self::Cell;
    fn load(cell: &Self::Cell) -> Self;
    fn store(cell: &Self::Cell, value: Self);

    /// Convert from a normalized parameter value. `steps` is the number of
    /// discrete choices (0 for continuous parameters).
    fn from_normalized(normalized: f32, steps: usize) -> Self;

    /// Convert to a normalized parameter value.
    fn to_normalized(self, steps: usize) -> f32;
}

impl AtomicSnapshot for f32 {
    type Cell = AtomicF32;

    fn new_cell(value: Self) -> AtomicF32 {
        AtomicF32::new(value)
    }

    fn load(cell: &AtomicF32) -> Self {
        cell.load(Ordering::Acquire)
    }

    fn store(cell: &AtomicF32, value: Self) {
        cell.store(value, Ordering::Release);
    }

    fn from_normalized(normalized: f32, _steps: usize) -> Self {
        normalized
    }

    fn to_normalized(self, _steps: usize) -> f32 {
        self.clamp(0.0, 1.0)
    }
}

impl AtomicSnapshot for f64 {
    type Cell = AtomicF64;

    fn new_cell(value: Self) -> AtomicF64 {
        AtomicF64::new(value)
    }

    fn load(cell: &AtomicF64) -> Self {
        cell.load(Ordering::Acquire)
    }

    fn store(cell: &AtomicF64, value: Self) {
        cell.store(value, Ordering::Release);
    }

    fn from_normalized(normalized: f32, _steps: usize) -> Self {
        f64::from(normalized)
    }

    fn to_normalized(self, _steps: usize) -> f32 {
        self.clamp(0.0, 1.0) as f32
    }
}

impl AtomicSnapshot for bool {
    type Cell = AtomicBool;

    fn new_cell(value: Self) -> AtomicBool {
        AtomicBool::new(value)
    }

    fn load(cell: &AtomicBool) -> Self {
        cell.load(Ordering::Acquire)
    }

    fn store(cell: &AtomicBool, value: Self) {
        cell.store(value, Ordering::Release);
    }

    fn from_normalized(normalized: f32, _steps: usize) -> Self {
        normalized >= 0.5
    }

    fn to_normalized(self, _steps: usize) -> f32 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}

/// Choice index of a discrete parameter.
impl AtomicSnapshot for i32 {
    type Cell = AtomicI32;

    fn new_cell(value: Self) -> AtomicI32 {
        AtomicI32::new(value)
    }

    fn load(cell: &AtomicI32) -> Self {
        cell.load(Ordering::Acquire)
    }

    fn store(cell: &AtomicI32, value: Self) {
        cell.store(value, Ordering::Release);
    }

    fn from_normalized(normalized: f32, steps: usize) -> Self {
        if steps < 2 {
            return 0;
        }
        let last = (steps - 1) as f32;
        (normalized.clamp(0.0, 1.0) * last).round() as i32
    }

    fn to_normalized(self, steps: usize) -> f32 {
        if steps < 2 {
            return 0.0;
        }
        let last = (steps - 1) as i32;
        self.clamp(0, last) as f32 / last as f32
    }
}
