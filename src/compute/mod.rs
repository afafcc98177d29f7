//! Query algorithms and input validation.
//!
//! Everything here is pure: functions take borrowed entities and return
//! ordered rows. The [`Registry`](crate::Registry) feeds them its live
//! collections.

pub mod ranking;
pub mod spatial;
pub mod validation;

pub use ranking::Ranked;
pub use spatial::{ClosestPair, approx_eq};
