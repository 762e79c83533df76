//! Bounded stack, queue and list over a caller-supplied buffer.
//!
//! The buffer is sized once to a statically known worst case (usually the
//! pixel or node count) and lent to the algorithm for the duration of a
//! call, so the hot path never allocates. Exceeding the buffer is a sizing
//! bug upstream and surfaces as [`RegionError::CapacityExceeded`].

use crate::region_error::RegionError;

/// LIFO over a borrowed buffer.
#[derive(Debug)]
pub struct BoundedStack<'buf, T: Copy> {
    buf: &'buf mut [T],
    len: usize,
}

impl<'buf, T: Copy> BoundedStack<'buf, T> {
    /// Start empty; capacity is `buf.len()`.
    pub fn new(buf: &'buf mut [T]) -> Self {
        Self { buf, len: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), RegionError> {
        let capacity = self.buf.len();
        let slot = self.buf.get_mut(self.len).ok_or(RegionError::CapacityExceeded {
            container: "BoundedStack",
            capacity,
        })?;
        *slot = value;
        self.len += 1;
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.buf[self.len])
    }

    #[inline]
    pub fn peek(&self) -> Option<T> {
        self.len.checked_sub(1).map(|i| self.buf[i])
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

/// FIFO ring over a borrowed buffer.
#[derive(Debug)]
pub struct BoundedQueue<'buf, T: Copy> {
    buf: &'buf mut [T],
    head: usize,
    len: usize,
}

impl<'buf, T: Copy> BoundedQueue<'buf, T> {
    pub fn new(buf: &'buf mut [T]) -> Self {
        Self {
            buf,
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push_back(&mut self, value: T) -> Result<(), RegionError> {
        let cap = self.buf.len();
        if self.len == cap {
            return Err(RegionError::CapacityExceeded {
                container: "BoundedQueue",
                capacity: cap,
            });
        }
        let tail = (self.head + self.len) % cap;
        self.buf[tail] = value;
        self.len += 1;
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let v = self.buf[self.head];
        self.head = (self.head + 1) % self.buf.len();
        self.len -= 1;
        Some(v)
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

/// Append-only list over a borrowed buffer, with in-place compaction.
#[derive(Debug)]
pub struct BoundedList<'buf, T: Copy> {
    buf: &'buf mut [T],
    len: usize,
}

impl<'buf, T: Copy> BoundedList<'buf, T> {
    pub fn new(buf: &'buf mut [T]) -> Self {
        Self { buf, len: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, value: T) -> Result<(), RegionError> {
        let capacity = self.buf.len();
        let slot = self.buf.get_mut(self.len).ok_or(RegionError::CapacityExceeded {
            container: "BoundedList",
            capacity,
        })?;
        *slot = value;
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<T, RegionError> {
        self.as_slice()
            .get(index)
            .copied()
            .ok_or(RegionError::IndexOutOfRange {
                container: "BoundedList",
                index,
                len: self.len,
            })
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.buf[..self.len]
    }

    /// Keep only the elements for which `keep` returns true, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(T) -> bool) {
        let mut w = 0;
        for r in 0..self.len {
            let v = self.buf[r];
            if keep(v) {
                self.buf[w] = v;
                w += 1;
            }
        }
        self.len = w;
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}
