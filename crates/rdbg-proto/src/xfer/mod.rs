//! `qXfer:<stream>:read:<annex>:<off>,<len>` dispatch (§4.8).

pub mod builtin;
pub mod chunker;
pub mod providers;

pub use providers::Providers;

use crate::session::Session;

const STREAMS: &[&str] = &[
    "features",
    "libraries",
    "memory-map",
    "auxv",
    "stack",
    "locals",
    "pretty-locals",
    "pretty-memory",
    "actors",
    "actors-messages",
    "actors-graph",
    "deadlocks",
    "correlation",
];

/// Streams advertised by `qSupported` (§4.6).
#[must_use]
pub fn supported_streams() -> &'static [&'static str] {
    STREAMS
}

/// Handle a `qXfer:...` command. `payload` is the full packet including the
/// `qXfer:` prefix.
#[must_use]
pub fn dispatch(session: &Session, providers: &Providers, payload: &str) -> String {
    let Some(rest) = payload.strip_prefix("qXfer:") else {
        return String::new();
    };
    // rest = "<stream>:read:<annex>:<off>,<len>"
    let mut parts = rest.splitn(4, ':');
    let (Some(stream), Some("read"), Some(annex), Some(off_len)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return String::new();
    };
    let Some((off_str, len_str)) = off_len.rsplit_once(',') else {
        return String::new();
    };
    let (Some(off), Some(len)) = (crate::hex::parse_usize(off_str), crate::hex::parse_usize(len_str))
    else {
        return String::new();
    };

    match stream {
        "features" => chunker::chunk(&builtin::features_xml(), off, len),
        "libraries" => chunker::chunk(&builtin::libraries_xml(), off, len),
        "memory-map" => chunker::chunk(&builtin::memory_map_xml(), off, len),
        "auxv" => "l".to_string(),
        "stack" => {
            let buf = builtin::build_stack_trace(&session.pc_index, session.pc());
            chunker::chunk(&buf, off, len)
        }
        "locals" => {
            let buf = if let Some(provider) = &providers.locals {
                provider(session.pc())
            } else {
                builtin::synthesize_locals(&session.artifact, &session.pc_index, session.pc())
            };
            chunker::chunk(&buf, off, len)
        }
        "pretty-locals" => {
            let buf = if let Some(provider) = &providers.pretty_locals {
                provider(session.pc(), session.registers.frame_base())
            } else {
                builtin::synthesize_pretty_locals(
                    &session.artifact,
                    &session.pc_index,
                    session.pc(),
                    session.registers.frame_base(),
                    &session.memory,
                )
            };
            chunker::chunk(&buf, off, len)
        }
        "pretty-memory" => {
            let params = providers::parse_annex(annex);
            let addr = params.get("addr").and_then(|s| crate::hex::parse_u64(s)).unwrap_or(0);
            let mem_len = params.get("len").and_then(|s| crate::hex::parse_u64(s)).unwrap_or(0);
            let buf = builtin::pretty_memory_dump(&session.memory, addr, mem_len);
            chunker::chunk(&buf, off, len)
        }
        "actors" => simple_stream(&providers.actors, &providers.actors_ex, annex, off, len),
        "actors-graph" => simple_stream(&providers.actors_graph, &providers.actors_graph_ex, annex, off, len),
        "deadlocks" => simple_stream(&providers.deadlocks, &providers.deadlocks_ex, annex, off, len),
        "actors-messages" => {
            let params = providers::parse_annex(annex);
            if !annex.is_empty() {
                if let Some(provider) = &providers.actor_messages_ex {
                    return chunker::chunk(&provider(&params), off, len);
                }
            }
            match &providers.actor_messages {
                Some(provider) => {
                    let actor = params.get("actor").and_then(|s| s.parse().ok()).unwrap_or(0);
                    let n = params.get("n").and_then(|s| s.parse().ok()).unwrap_or(100);
                    chunker::chunk(&provider(actor, n), off, len)
                }
                None => "l".to_string(),
            }
        }
        "correlation" => {
            let params = providers::parse_annex(annex);
            if !annex.is_empty() {
                if let Some(provider) = &providers.correlation_ex {
                    return chunker::chunk(&provider(&params), off, len);
                }
            }
            match &providers.correlation {
                Some(provider) => {
                    let id = params.get("id").cloned().unwrap_or_default();
                    let n = params.get("n").and_then(|s| s.parse().ok()).unwrap_or(100);
                    chunker::chunk(&provider(&id, n), off, len)
                }
                None => "l".to_string(),
            }
        }
        _ => String::new(),
    }
}

/// Shared shape for the simple/extended provider pairs that take no typed
/// arguments beyond the raw annex map (`actors`, `actors-graph`, `deadlocks`).
fn simple_stream(
    simple: &Option<providers::SimpleProvider>,
    extended: &Option<providers::ExtendedProvider>,
    annex: &str,
    off: usize,
    len: usize,
) -> String {
    if !annex.is_empty() {
        if let Some(provider) = extended {
            let params = providers::parse_annex(annex);
            return chunker::chunk(&provider(&params), off, len);
        }
    }
    match simple {
        Some(provider) => chunker::chunk(&provider(), off, len),
        None => "l".to_string(),
    }
}
