//! # Worker identity number allocator.
//!
//! [`SlotAllocator`] owns the set of worker identity numbers `1..=N` and hands
//! out the **smallest** currently-free number. Numbers are recycled when a
//! worker exits, so observers always see low, stable numbers reassigned
//! predictably, which keeps logs readable and lets tests assert exact
//! numbering sequences.
//!
//! ## Invariant
//! At any instant, `free ∪ assigned = {1..=N}` exactly, with no duplicates.
//! Both `acquire` and `release` are non-blocking; the free set is mutated only
//! by the controller loop, so no internal synchronization is needed.

use std::collections::BTreeSet;

use crate::error::SlotError;

/// Min-ordered set of free worker identity numbers.
#[derive(Debug)]
pub struct SlotAllocator {
    capacity: u32,
    free: BTreeSet<u32>,
}

impl SlotAllocator {
    /// Creates an allocator with all of `1..=capacity` free.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            free: (1..=capacity).collect(),
        }
    }

    /// Removes and returns the smallest currently-free number.
    ///
    /// Fails with [`SlotError::Exhausted`] if none are free; callers are
    /// expected to check [`SlotAllocator::has_free`] first, as this never
    /// blocks.
    pub fn acquire(&mut self) -> Result<u32, SlotError> {
        let smallest = self.free.iter().next().copied().ok_or(SlotError::Exhausted)?;
        self.free.remove(&smallest);
        Ok(smallest)
    }

    /// Returns a number to the free set.
    ///
    /// Fails with [`SlotError::InvalidRelease`] if the number is out of range
    /// or already free; a double release is a programming error, not a
    /// runtime condition to tolerate silently.
    pub fn release(&mut self, number: u32) -> Result<(), SlotError> {
        if number == 0 || number > self.capacity || !self.free.insert(number) {
            return Err(SlotError::InvalidRelease { number });
        }
        Ok(())
    }

    /// True if at least one number is free.
    #[inline]
    pub fn has_free(&self) -> bool {
        !self.free.is_empty()
    }

    /// Number of currently free identity numbers.
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Total number of identity numbers managed (`N`).
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hands_out_smallest_first() {
        let mut slots = SlotAllocator::new(4);
        assert_eq!(slots.acquire(), Ok(1));
        assert_eq!(slots.acquire(), Ok(2));
        assert_eq!(slots.acquire(), Ok(3));
        assert_eq!(slots.free_count(), 1);
    }

    #[test]
    fn reuses_smallest_regardless_of_release_order() {
        let mut slots = SlotAllocator::new(3);
        assert_eq!(slots.acquire(), Ok(1));
        assert_eq!(slots.acquire(), Ok(2));
        assert_eq!(slots.acquire(), Ok(3));

        // Release {3, 1} in that order while 2 stays assigned, then free 2.
        slots.release(3).unwrap();
        slots.release(1).unwrap();
        slots.release(2).unwrap();

        assert_eq!(slots.acquire(), Ok(1));
        assert_eq!(slots.acquire(), Ok(2));
        assert_eq!(slots.acquire(), Ok(3));
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut slots = SlotAllocator::new(1);
        assert_eq!(slots.acquire(), Ok(1));
        assert!(!slots.has_free());
        assert_eq!(slots.acquire(), Err(SlotError::Exhausted));
    }

    #[test]
    fn double_release_is_an_error() {
        let mut slots = SlotAllocator::new(2);
        let n = slots.acquire().unwrap();
        slots.release(n).unwrap();
        assert_eq!(slots.release(n), Err(SlotError::InvalidRelease { number: n }));
    }

    #[test]
    fn out_of_range_release_is_an_error() {
        let mut slots = SlotAllocator::new(2);
        assert_eq!(slots.release(0), Err(SlotError::InvalidRelease { number: 0 }));
        assert_eq!(slots.release(3), Err(SlotError::InvalidRelease { number: 3 }));
    }

    #[test]
    fn free_and_assigned_always_cover_the_range() {
        let mut slots = SlotAllocator::new(4);
        let mut assigned = Vec::new();
        assigned.push(slots.acquire().unwrap());
        assigned.push(slots.acquire().unwrap());
        slots.release(assigned.remove(0)).unwrap();
        assigned.push(slots.acquire().unwrap());

        // No duplicates among live assignments, and counts always add up.
        let mut unique = assigned.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), assigned.len());
        assert_eq!(slots.free_count() + assigned.len(), 4);

        // Releasing an assigned number must always succeed.
        for n in assigned {
            slots.release(n).unwrap();
        }
        assert_eq!(slots.free_count(), 4);
    }
}
