//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the upstream client produce:
//!     → logging.rs (structured tracing events, request spans with x-request-id)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every span and rejection log
//! - Metric macros are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
