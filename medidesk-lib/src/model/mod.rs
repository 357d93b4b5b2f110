//! Dynamic record model
//!
//! Records hold field values without a fixed schema. Pages hand raw
//! records to the table view-model for display and to the cache for
//! round-trips to the API; schema validation is the concern of the form
//! layer, not this module.

mod path;
mod record;
mod value;

pub use path::*;
pub use record::*;
pub use value::*;
