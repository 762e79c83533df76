//! Explicitly owned containers underlying every engine.
//!
//! - [`FixedArray`]: fixed-length per-run arrays.
//! - [`GrowableBag`]: append/swap-remove bags with change records.
//! - [`BoundedStack`], [`BoundedQueue`], [`BoundedList`]: frontier and
//!   worklist structures over a caller-supplied worst-case buffer.

pub mod bag;
pub mod bounded;
pub mod fixed_array;

pub use bag::{BagMove, GrowableBag};
pub use bounded::{BoundedList, BoundedQueue, BoundedStack};
pub use fixed_array::FixedArray;
