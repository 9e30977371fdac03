//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! POST /upload:
//!     → token.rs  (X-Proxy-Token, when a shared secret is configured)
//!     → limits.rs (request body budget, 413 on overflow)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - The token check runs before the body is read
//! - Fail closed: a configured secret is never bypassed

pub mod limits;
pub mod token;

pub use token::{require_proxy_token, X_PROXY_TOKEN};
