//! Listener / session (§4.9): one thread per accepted connection, each
//! owning a single [`Session`] behind its own lock. The debug artifact and
//! PC index are immutable and shared across every session via `Arc`.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rdbg_artifact::Program;
use rdbg_index::PcIndex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::{self, ACK};
use crate::config::ServerConfig;
use crate::dispatch::dispatch;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::session::{Session, StopReplyStyle};
use crate::xfer::Providers;

/// How long `serve` sleeps between non-blocking accept polls while waiting
/// for either a new connection or the shutdown signal.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Failures that can prevent the server from accepting connections at all.
/// Packet-level failures never reach here; they are reported on the wire
/// per §7 instead.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to configure listener at {addr}: {source}")]
    Configure {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// A debug protocol server bound to one immutable artifact.
///
/// Cheap to clone: every field is an `Arc`, so each accepted connection gets
/// its own handle to the same shared state without re-parsing the artifact.
#[derive(Clone)]
pub struct Server {
    artifact: Arc<Program>,
    pc_index: Arc<PcIndex>,
    providers: Arc<Providers>,
    strict_checksum: bool,
    stop_reply_style: StopReplyStyle,
    metrics: Arc<Metrics>,
}

impl Server {
    /// Build a server from a debug artifact with default configuration
    /// (no providers installed, lenient checksum handling, simple stop
    /// replies).
    #[must_use]
    pub fn new(artifact: Program) -> Self {
        let pc_index = PcIndex::build(&artifact);
        Self {
            artifact: Arc::new(artifact),
            pc_index: Arc::new(pc_index),
            providers: Arc::new(Providers::default()),
            strict_checksum: false,
            stop_reply_style: StopReplyStyle::Simple,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Build a server from a debug artifact and a [`ServerConfig`]. The
    /// config's `listen_addr` is not consumed here; callers pass it
    /// explicitly to [`Server::serve`] so the same config can be reused to
    /// bind more than one listener.
    #[must_use]
    pub fn from_config(artifact: Program, config: ServerConfig) -> Self {
        let mut server = Self::new(artifact);
        server.providers = Arc::new(config.providers);
        server.strict_checksum = config.strict_checksum;
        server.stop_reply_style = config.stop_reply_style;
        server
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Bind `listen_addr` without accepting connections yet. Split out from
    /// [`Server::serve`] so tests can bind an ephemeral port (`:0`) and learn
    /// the chosen address before handing the listener to the accept loop.
    pub fn bind(listen_addr: &str) -> Result<TcpListener, ServeError> {
        TcpListener::bind(listen_addr).map_err(|source| ServeError::Bind {
            addr: listen_addr.to_string(),
            source,
        })
    }

    /// Bind and accept connections until an external shutdown signal
    /// (Ctrl-C) arrives. Blocks the calling thread.
    pub fn serve(&self, listen_addr: &str) -> Result<(), ServeError> {
        let listener = Self::bind(listen_addr)?;
        info!(addr = %listen_addr, "listening for debugger connections");
        self.serve_on(listener)
    }

    /// Accept connections on an already-bound listener until shutdown.
    /// Each connection is handled on its own thread; packet processing
    /// within one connection is strictly serial (§5).
    pub fn serve_on(&self, listener: TcpListener) -> Result<(), ServeError> {
        let addr = listener.local_addr().ok();
        listener
            .set_nonblocking(true)
            .map_err(|source| ServeError::Configure {
                addr: addr.map_or_else(String::new, |a| a.to_string()),
                source,
            })?;

        let shutdown = Arc::new(AtomicBool::new(false));
        {
            let shutdown = Arc::clone(&shutdown);
            // Best-effort: a second `set_handler` call in a test process
            // errors out and is ignored rather than propagated.
            let _ = ctrlc::set_handler(move || {
                shutdown.store(true, Ordering::SeqCst);
            });
        }
        self.serve_until(listener, &shutdown)
    }

    /// Like [`Server::serve_on`], but the caller supplies the shutdown flag
    /// directly instead of installing a Ctrl-C handler. Existing
    /// connections are not force-closed; they drain naturally when their
    /// peer disconnects (§5).
    pub fn serve_until(
        &self,
        listener: TcpListener,
        shutdown: &AtomicBool,
    ) -> Result<(), ServeError> {
        while !shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    debug!(%peer, "accepted connection");
                    let server = self.clone();
                    thread::spawn(move || server.handle_conn(stream));
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                }
            }
        }
        Ok(())
    }

    /// Drive one connection end to end: read a packet, ack it, dispatch it,
    /// write the reply, repeat until the peer closes or errors (§4.9).
    fn handle_conn(&self, mut stream: TcpStream) {
        let session = Mutex::new(
            Session::new(Arc::clone(&self.artifact), Arc::clone(&self.pc_index))
                .with_stop_reply_style(self.stop_reply_style),
        );
        let mut buf = Vec::new();
        let mut read_buf = [0u8; 4096];

        'conn: loop {
            match stream.read(&mut read_buf) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&read_buf[..n]),
                Err(e) => {
                    warn!(error = %e, "connection read failed");
                    break;
                }
            }

            while let Some((frame, consumed)) = codec::read_frame(&buf) {
                buf.drain(..consumed);

                if self.strict_checksum && !frame.checksum_matches() {
                    warn!("dropping frame with bad checksum");
                    continue;
                }

                let mut guard = session.lock();
                if !guard.no_ack && stream.write_all(&[ACK]).is_err() {
                    break 'conn;
                }

                if frame.payload.starts_with("qXfer:") {
                    self.metrics.record_xfer();
                }
                let reply = dispatch(&mut guard, &self.providers, &frame.payload);
                drop(guard);

                let encoded = codec::encode_frame(&reply);
                self.metrics
                    .record_packet(frame.payload.len(), encoded.len());
                if stream.write_all(encoded.as_bytes()).is_err() {
                    break 'conn;
                }
            }
        }
        debug!("connection closed");
    }
}
