//! Persistence of engine output.

pub mod membership;
