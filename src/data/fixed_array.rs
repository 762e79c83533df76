//! `FixedArray<T>`: a single-owner buffer whose length is fixed at construction.
//!
//! Per-run arrays (labels, costs, closed sets, scratch buffers) are allocated
//! once at the size of the domain and never grow. The handle is not `Clone`;
//! ownership moves explicitly, and the storage is released exactly once,
//! either by [`FixedArray::dispose`] or when the handle goes out of scope.

use core::fmt::{self, Debug};
use core::ops::{Index, IndexMut};

use crate::region_error::RegionError;

const NAME: &str = "FixedArray";

/// Fixed-length, explicitly owned storage.
pub struct FixedArray<T> {
    buf: Box<[T]>,
}

impl<T> Debug for FixedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedArray")
            .field("len", &self.buf.len())
            .finish()
    }
}

impl<T: Clone> FixedArray<T> {
    /// Allocate `len` slots, each a clone of `fill`.
    pub fn filled(len: usize, fill: T) -> Self {
        Self {
            buf: vec![fill; len].into_boxed_slice(),
        }
    }

    /// Overwrite every slot with `value`.
    pub fn fill(&mut self, value: T) {
        self.buf.fill(value);
    }

    /// Copy `src` into `[offset, offset + src.len())`.
    pub fn write_at(&mut self, offset: usize, src: &[T]) -> Result<(), RegionError> {
        let len = self.buf.len();
        let end = offset
            .checked_add(src.len())
            .filter(|&e| e <= len)
            .ok_or(RegionError::IndexOutOfRange {
                container: NAME,
                index: offset.saturating_add(src.len()).saturating_sub(1),
                len,
            })?;
        self.buf[offset..end].clone_from_slice(src);
        Ok(())
    }
}

impl<T: Default> FixedArray<T> {
    /// Allocate `len` default-initialised slots.
    pub fn with_default(len: usize) -> Self {
        Self {
            buf: (0..len).map(|_| T::default()).collect(),
        }
    }
}

impl<T> FixedArray<T> {
    /// Take ownership of an existing vector; its length becomes fixed.
    pub fn from_vec(v: Vec<T>) -> Self {
        Self {
            buf: v.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Checked read.
    #[inline]
    pub fn get(&self, index: usize) -> Result<&T, RegionError> {
        let len = self.buf.len();
        self.buf.get(index).ok_or(RegionError::IndexOutOfRange {
            container: NAME,
            index,
            len,
        })
    }

    /// Checked mutable access.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, RegionError> {
        let len = self.buf.len();
        self.buf.get_mut(index).ok_or(RegionError::IndexOutOfRange {
            container: NAME,
            index,
            len,
        })
    }

    /// Checked write; returns the previous value.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) -> Result<T, RegionError> {
        Ok(core::mem::replace(self.get_mut(index)?, value))
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.buf
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.buf
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.buf.iter()
    }

    /// Give the storage back as a plain vector, consuming the handle.
    pub fn into_vec(self) -> Vec<T> {
        self.buf.into_vec()
    }

    /// Release the backing storage now and return how many slots it held.
    ///
    /// Consumes the handle, so a second dispose cannot be expressed.
    pub fn dispose(self) -> usize {
        let len = self.buf.len();
        log::trace!("{NAME}: disposing {len} slots");
        drop(self.buf);
        len
    }
}

impl<T> Index<usize> for FixedArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.buf[index]
    }
}

impl<T> IndexMut<usize> for FixedArray<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.buf[index]
    }
}

impl<'a, T> IntoIterator for &'a FixedArray<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.buf.iter()
    }
}
