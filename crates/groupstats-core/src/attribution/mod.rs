//! Attribution engine
//!
//! Turns a member snapshot and a group catalog into per-group aggregates for
//! a date window, distributing multi-group members' usage according to the
//! configured [`AttributionPolicy`].

mod engine;
mod policy;

pub use engine::{compute_aggregates, unknown_group_refs, UnknownGroupRef};
pub use policy::{split_evenly, AttributionPolicy, Usage};
