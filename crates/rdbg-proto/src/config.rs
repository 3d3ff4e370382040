//! Server configuration (§6, §10 of the expanded spec).

use crate::session::StopReplyStyle;
use crate::xfer::Providers;

/// Bundles everything [`crate::Server::from_config`] needs beyond the
/// debug artifact itself: where to listen, which provider hooks are wired
/// up, and whether to enforce the packet checksum.
pub struct ServerConfig {
    pub listen_addr: String,
    pub providers: Providers,
    /// When `true`, a frame whose checksum does not match its payload is
    /// dropped with no reply instead of being dispatched. Off by default,
    /// matching §4.5's "checksum is not validated" baseline behavior.
    pub strict_checksum: bool,
    /// Stop-reply rendering style for every session this server accepts.
    /// The wire protocol has no command that flips this per the command
    /// table in §4.6; it is fixed per server instance (§4.7, §4.10).
    pub stop_reply_style: StopReplyStyle,
}

impl ServerConfig {
    #[must_use]
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            providers: Providers::default(),
            strict_checksum: false,
            stop_reply_style: StopReplyStyle::Simple,
        }
    }

    #[must_use]
    pub fn with_providers(mut self, providers: Providers) -> Self {
        self.providers = providers;
        self
    }

    #[must_use]
    pub fn with_strict_checksum(mut self, strict: bool) -> Self {
        self.strict_checksum = strict;
        self
    }

    #[must_use]
    pub fn with_stop_reply_style(mut self, style: StopReplyStyle) -> Self {
        self.stop_reply_style = style;
        self
    }
}
