//! Pluggable JSON provider hooks for the `qXfer` streams that have no
//! built-in synthesis (§4.8, §6).

use std::collections::HashMap;

pub type SimpleProvider = Box<dyn Fn() -> Vec<u8> + Send + Sync>;
pub type ExtendedProvider = Box<dyn Fn(&HashMap<String, String>) -> Vec<u8> + Send + Sync>;
pub type ActorMessagesProvider = Box<dyn Fn(u64, u32) -> Vec<u8> + Send + Sync>;
pub type CorrelationProvider = Box<dyn Fn(&str, u32) -> Vec<u8> + Send + Sync>;
pub type LocalsProvider = Box<dyn Fn(u64) -> Vec<u8> + Send + Sync>;
pub type PrettyLocalsProvider = Box<dyn Fn(u64, u64) -> Vec<u8> + Send + Sync>;

/// Optional callbacks installed before a [`crate::Server`] starts accepting
/// connections. A stream with neither a simple nor an extended provider
/// registered returns `"l"` (empty, per §4.8).
#[derive(Default)]
pub struct Providers {
    pub actors: Option<SimpleProvider>,
    pub actors_ex: Option<ExtendedProvider>,
    pub actor_messages: Option<ActorMessagesProvider>,
    pub actor_messages_ex: Option<ExtendedProvider>,
    pub actors_graph: Option<SimpleProvider>,
    pub actors_graph_ex: Option<ExtendedProvider>,
    pub deadlocks: Option<SimpleProvider>,
    pub deadlocks_ex: Option<ExtendedProvider>,
    pub correlation: Option<CorrelationProvider>,
    pub correlation_ex: Option<ExtendedProvider>,
    pub locals: Option<LocalsProvider>,
    pub pretty_locals: Option<PrettyLocalsProvider>,
}

/// Parse an annex string of the form `k=v,k=v,...` into a lookup map.
/// Malformed pairs (no `=`) are skipped rather than rejected, matching the
/// handlers' general policy of degrading instead of erroring on the wire.
#[must_use]
pub fn parse_annex(annex: &str) -> HashMap<String, String> {
    annex
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
