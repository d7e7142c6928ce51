//! Scene module
//!
//! Per-frame object states (bounded spheres) and the flat-buffer layout
//! they are decoded from.

mod object_state;

pub use object_state::{ObjectState, ObjectLayout};
