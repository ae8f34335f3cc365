//! API Module
//!
//! Admin HTTP surface over the shared cache layer.
//!
//! # Endpoints
//! - `GET /health` - Store mode and timestamp
//! - `GET /stats` - Manager settings, edge count and store statistics
//! - `PUT /cache` - Store a JSON value
//! - `GET /cache/:key` - Read a value and its TTL
//! - `DELETE /cache/:key` - Delete a key
//! - `DELETE /cache` - Flush the store
//! - `POST /invalidate/key/:key` - Cascade invalidation
//! - `POST /invalidate/pattern` - Pattern invalidation
//! - `POST /invalidate/domain/:domain` - Domain invalidation
//! - `POST /invalidate/domain/:domain/:id` - Entity invalidation
//! - `POST /dependencies` - Register a dependency edge
//! - `GET /dependencies/:key` - Direct dependents of a key

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
