//! HTTP API layer.
//!
//! Exposes the mutation, aggregation, and authentication services as REST
//! endpoints under `/api/`, the broadcast channel at `/ws`, and uploaded
//! voice notes under `/uploads/`.
//!
//! The router is composable — [`api_router`] returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
pub mod websocket;

pub use router::api_router;
pub use server::{start_server, ServerHandle};
pub use types::ApiContext;
