//! Fixed-capacity FIFO series of samples.

use alloc::collections::VecDeque;

use super::Sample;
use crate::error::{ConfigError, ConfigResult};

/// Insertion-ordered sequence with a capacity fixed at construction
///
/// Pushing into a full series drops the oldest element first, so the
/// series always holds the most recent `capacity` items in the order they
/// arrived. Storage is allocated once up front and never grows.
#[derive(Debug, Clone)]
pub struct BoundedSeries<T = Sample> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy> BoundedSeries<T> {
    /// Create an empty series holding at most `capacity` items
    ///
    /// `name` only labels the error if the capacity is zero.
    pub fn new(name: &'static str, capacity: usize) -> ConfigResult<Self> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity { series: name });
        }

        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append an item, returning `true` if the oldest item was evicted
    pub fn push(&mut self, item: T) -> bool {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front();
            true
        } else {
            false
        };
        self.items.push_back(item);
        evicted
    }

    /// Append items in order, keeping only the newest `capacity` of them
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.push(item);
        }
    }

    /// Number of items held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True once the next push will evict
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently pushed item
    pub fn newest(&self) -> Option<T> {
        self.items.back().copied()
    }

    /// The last `n` items, oldest first
    ///
    /// Asking for more than the series holds yields everything it holds.
    pub fn iter_from_newest(&self, n: usize) -> impl DoubleEndedIterator<Item = T> + '_ {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip).copied()
    }

    /// All items, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = T> + '_ {
        self.items.iter().copied()
    }

    /// Drop every item; the capacity is unchanged
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl BoundedSeries<f32> {
    /// Arithmetic mean of all values, `None` when empty
    pub fn mean(&self) -> Option<f32> {
        mean_of(self.iter())
    }
}

impl BoundedSeries<Sample> {
    /// Arithmetic mean of the newest `n` values, `None` when empty
    pub fn mean_of_newest(&self, n: usize) -> Option<f32> {
        mean_of(self.iter_from_newest(n).map(|s| s.value))
    }

    /// Largest of the newest `n` values, `None` when empty
    pub fn max_of_newest(&self, n: usize) -> Option<f32> {
        self.iter_from_newest(n)
            .map(|s| s.value)
            .reduce(|max, v| if v > max { v } else { max })
    }
}

fn mean_of(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0f32, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f32)
    }
}
