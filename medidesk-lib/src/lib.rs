//! MediDesk client library
//!
//! The reusable core of the MediDesk facility dashboard: a table
//! view-model (search/sort/paginate over in-memory records), a resource
//! cache with read deduplication and invalidation-on-write, and the REST
//! client both sit on.

pub mod cache;
pub mod error;
pub mod identity;
pub mod model;
pub mod notify;
pub mod session;
pub mod table;

mod client;
mod resource;

pub use client::*;
pub use resource::*;
