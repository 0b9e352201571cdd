//! HTTP/REST API layer for Gupshup.
//!
//! Axum-based REST API at `/api/v1/` with envelope response format and CORS
//! support. Each session is held in memory for the life of the process.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
