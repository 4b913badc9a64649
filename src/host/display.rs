use std::sync::{Mutex, PoisonError};

use crate::foundation::{core::TargetSize, error::ViewResult};

/// Source of the display's current pixel size.
///
/// Queried on every presentation, never cached, so rotations and resolution changes are picked
/// up by the next call.
pub trait DisplayMetrics {
    /// Current display size.
    fn current_size(&self) -> ViewResult<TargetSize>;
}

/// Display with a fixed size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDisplay(pub TargetSize);

impl DisplayMetrics for FixedDisplay {
    fn current_size(&self) -> ViewResult<TargetSize> {
        Ok(self.0)
    }
}

/// Display whose size can change between queries, e.g. on rotation.
#[derive(Debug)]
pub struct MutableDisplay {
    size: Mutex<TargetSize>,
}

impl MutableDisplay {
    /// Start at `size`.
    pub fn new(size: TargetSize) -> Self {
        Self {
            size: Mutex::new(size),
        }
    }

    /// Change the size reported by later queries.
    pub fn set(&self, size: TargetSize) {
        *self.size.lock().unwrap_or_else(PoisonError::into_inner) = size;
    }

    /// Swap width and height.
    pub fn rotate(&self) {
        let mut size = self.size.lock().unwrap_or_else(PoisonError::into_inner);
        *size = size.rotated();
    }
}

impl DisplayMetrics for MutableDisplay {
    fn current_size(&self) -> ViewResult<TargetSize> {
        Ok(*self.size.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
