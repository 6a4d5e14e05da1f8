//! Data models for GroupStats

mod aggregate;
mod dataset;
mod group;
mod member;
mod window;

pub use aggregate::*;
pub use dataset::*;
pub use group::*;
pub use member::*;
pub use window::*;
