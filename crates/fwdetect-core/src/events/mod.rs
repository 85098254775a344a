//! Run lifecycle events: a handler trait with no-op defaults plus a
//! dispatcher that fans out to many handlers.

pub mod dispatcher;
pub mod handler;
pub mod types;
