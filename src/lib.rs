//! Multipart upload relay library.
//!
//! Accepts one file on `POST /upload`, re-posts it to a file-ingestion API
//! with a bearer credential, and mirrors the upstream answer back.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod security;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
