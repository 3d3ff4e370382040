//! Remote serial debug protocol server.
//!
//! Owns everything downstream of the debug artifact: the packet codec
//! (§4.5), command dispatcher (§4.6), execution engine (§4.7), xfer engine
//! and providers (§4.8), and the per-connection listener (§4.9). The PC
//! index and value decoder live in sibling crates and are re-exported
//! through the types this crate returns.

pub mod breakpoints;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod hex;
pub mod memory;
pub mod metrics;
pub mod registers;
mod server;
pub mod session;
pub mod xfer;

pub use config::ServerConfig;
pub use dispatch::dispatch as dispatch_payload;
pub use metrics::{Metrics, MetricsSnapshot};
pub use server::{ServeError, Server};
pub use session::{Session, StopReplyStyle};
pub use xfer::Providers;
