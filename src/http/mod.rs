//! HTTP surface consumed by the arena engine

pub mod error;
pub mod routes;

pub use routes::build_router;
