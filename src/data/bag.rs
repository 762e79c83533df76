//! `GrowableBag<T>`: an append-friendly, unordered container with O(1) removal.
//!
//! Removal swaps the last element into the vacated slot. Callers that keep
//! an external `element -> index` map must apply the returned [`BagMove`] to
//! stay consistent.

use core::fmt::{self, Debug};

use crate::region_error::RegionError;

const NAME: &str = "GrowableBag";

/// Change record produced by [`GrowableBag::remove_at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BagMove {
    /// The removed slot was the last one; nothing moved.
    None,
    /// The element at `from` now lives at `to`.
    Moved { from: usize, to: usize },
}

/// Growable sequence with amortised doubling append and swap-remove.
pub struct GrowableBag<T> {
    items: Vec<T>,
}

impl<T> Debug for GrowableBag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBag")
            .field("len", &self.items.len())
            .field("capacity", &self.items.capacity())
            .finish()
    }
}

impl<T> Default for GrowableBag<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GrowableBag<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            items: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append and return the new element's index.
    #[inline]
    pub fn add(&mut self, value: T) -> usize {
        if self.items.len() == self.items.capacity() {
            // Grow geometrically starting from a small block.
            let extra = self.items.capacity().max(4);
            self.items.reserve_exact(extra);
        }
        self.items.push(value);
        self.items.len() - 1
    }

    /// Remove the element at `index`, moving the last element into its slot.
    pub fn remove_at(&mut self, index: usize) -> Result<(T, BagMove), RegionError> {
        let len = self.items.len();
        if index >= len {
            return Err(RegionError::IndexOutOfRange {
                container: NAME,
                index,
                len,
            });
        }
        let last = len - 1;
        let removed = self.items.swap_remove(index);
        let mv = if index == last {
            BagMove::None
        } else {
            BagMove::Moved {
                from: last,
                to: index,
            }
        };
        Ok((removed, mv))
    }

    /// Insert at `index`, shifting the tail right by one.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), RegionError> {
        let len = self.items.len();
        if index > len {
            return Err(RegionError::IndexOutOfRange {
                container: NAME,
                index,
                len,
            });
        }
        self.items.insert(index, value);
        Ok(())
    }

    #[inline]
    pub fn get(&self, index: usize) -> Result<&T, RegionError> {
        let len = self.items.len();
        self.items.get(index).ok_or(RegionError::IndexOutOfRange {
            container: NAME,
            index,
            len,
        })
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Drop all elements, keeping the capacity.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Release the storage now; returns the number of elements dropped.
    pub fn dispose(self) -> usize {
        let len = self.items.len();
        log::trace!("{NAME}: disposing {len} elements");
        len
    }
}

impl<T: Ord> GrowableBag<T> {
    /// Sort in place; bags are unordered until asked otherwise.
    pub fn sort_unstable(&mut self) {
        self.items.sort_unstable();
    }

    /// Sort and drop repeated elements.
    pub fn sort_dedup(&mut self) {
        self.items.sort_unstable();
        self.items.dedup();
    }
}

impl<T> AsRef<[T]> for GrowableBag<T> {
    fn as_ref(&self) -> &[T] {
        &self.items
    }
}

impl<T> FromIterator<T> for GrowableBag<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_middle_reports_move() {
        let mut b: GrowableBag<char> = "abcde".chars().collect();
        let (gone, mv) = b.remove_at(1).unwrap();
        assert_eq!(gone, 'b');
        assert_eq!(mv, BagMove::Moved { from: 4, to: 1 });
        assert_eq!(b.len(), 4);
        assert_eq!(b.as_slice(), &['a', 'e', 'c', 'd']);
    }

    #[test]
    fn remove_last_reports_no_move() {
        let mut b: GrowableBag<u32> = (0..3).collect();
        assert_eq!(b.remove_at(2).unwrap(), (2, BagMove::None));
        assert_eq!(b.remove_at(0).unwrap(), (0, BagMove::Moved { from: 1, to: 0 }));
        assert_eq!(b.remove_at(0).unwrap(), (1, BagMove::None));
        assert!(b.is_empty());
        assert!(b.remove_at(0).is_err());
    }

    #[test]
    fn insert_shifts_tail() {
        let mut b = GrowableBag::new();
        b.add(1);
        b.add(3);
        b.insert(1, 2).unwrap();
        b.insert(3, 4).unwrap();
        assert_eq!(b.as_slice(), &[1, 2, 3, 4]);
        assert!(b.insert(9, 0).is_err());
    }

    #[test]
    fn add_returns_indices_and_grows() {
        let mut b = GrowableBag::with_capacity(1);
        for i in 0..100u32 {
            assert_eq!(b.add(i), i as usize);
        }
        assert!(b.as_slice().iter().copied().eq(0..100));
        assert_eq!(b.dispose(), 100);
    }

    #[test]
    fn external_index_map_stays_consistent() {
        // Keep `pos[v]` = index of v in the bag across random removals.
        let mut b: GrowableBag<usize> = (0..10).collect();
        let mut pos: Vec<Option<usize>> = (0..10).map(Some).collect();
        for v in [3usize, 9, 0, 5] {
            let i = pos[v].unwrap();
            let (gone, mv) = b.remove_at(i).unwrap();
            assert_eq!(gone, v);
            pos[v] = None;
            if let BagMove::Moved { from, to } = mv {
                let moved = b.as_slice()[to];
                assert_eq!(pos[moved], Some(from));
                pos[moved] = Some(to);
            }
        }
        for (v, p) in pos.iter().enumerate() {
            if let Some(i) = p {
                assert_eq!(b.as_slice()[*i], v);
            }
        }
    }
}
