//! API Module
//!
//! HTTP handlers and routing that put the cache manager on a local REST
//! surface. See [`create_router`] for the endpoint table.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
