//! Table view-model
//!
//! Turns a raw in-memory collection plus a [`ViewState`] into the rows a
//! data table actually shows: filtered by the search term, sorted by the
//! active column, cut into pages. The computation is a pure function of
//! its inputs with no hidden state, so it is safe to rerun on every
//! render.

mod column;
mod search;
mod view_model;
mod view_state;

pub use column::*;
pub use search::*;
pub use view_model::*;
pub use view_state::*;
