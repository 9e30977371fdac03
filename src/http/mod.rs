//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs   (Axum router, request ID, tracing, timeout layers)
//!     → security    (X-Proxy-Token, body budget) on /upload only
//!     → handlers.rs (GET / liveness, POST /upload relay)
//!     → response    (upstream mirror or RelayError JSON)
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer, UPLOAD_PATH};
