//! Filter and pagination over sorted aggregates
//!
//! Nothing here mutates aggregates: each call derives a display subset from
//! its inputs, so the same [`ViewState`] always renders the same rows.

mod page;
mod state;
mod summary;

pub use page::{view, ViewPage, ViewRow};
pub use state::ViewState;
pub use summary::Summary;
