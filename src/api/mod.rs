//! API Module
//!
//! HTTP handlers and routing exposing the cache over a REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a value
//! - `GET /get/:namespace/:key` - Retrieve a value
//! - `GET /has/:namespace/:key` - Check a key
//! - `GET /ttl/:namespace/:key` - Expiration of a key
//! - `DELETE /del/:namespace/:key` - Forget a key
//! - `GET /keys/:namespace` - List keys
//! - `GET /all/:namespace` - Dump values
//! - `DELETE /flush/:namespace` - Empty a namespace
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
