//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Bind → Serve
//!
//! Shutdown:
//!     signals.rs (SIGINT/SIGTERM) → Shutdown::trigger
//!     → server stops accepting → in-flight uploads finish → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
