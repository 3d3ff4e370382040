//! Command dispatcher (§4.6): matches a decoded payload against the
//! recognized command table and returns the reply payload. Unknown commands
//! return the empty string.

use tracing::{debug, trace, warn};

use crate::breakpoints::BreakpointKind;
use crate::error::{E01, E02};
use crate::hex;
use crate::registers::NUM_REGS;
use crate::session::{Session, StopReplyStyle};
use crate::xfer::{self, Providers};

/// Route one decoded payload to its handler.
#[must_use]
pub fn dispatch(session: &mut Session, providers: &Providers, payload: &str) -> String {
    trace!(%payload, "dispatching packet");

    if payload == "?" {
        return session.stop_reply();
    }
    if payload == "qSupported" || payload.starts_with("qSupported:") {
        return q_supported();
    }
    if payload == "QStartNoAckMode" {
        session.no_ack = true;
        debug!("no-ack mode enabled");
        return "OK".to_string();
    }
    if payload == "qAttached" {
        return "1".to_string();
    }
    if payload == "qOffsets" {
        return "Text=0;Data=0;Bss=0".to_string();
    }
    if payload.starts_with("qSymbol") {
        return "OK".to_string();
    }
    if payload == "qC" {
        return "QC1".to_string();
    }
    if payload == "qfThreadInfo" {
        return "m1".to_string();
    }
    if payload == "qsThreadInfo" {
        return "l".to_string();
    }
    if payload == "qHostInfo" {
        return "triple:rdbg-unknown-unknown;endian:little;ptrsize:8;".to_string();
    }
    if let Some(rest) = payload.strip_prefix("qRegisterInfo") {
        return q_register_info(rest);
    }
    if payload.starts_with("qThreadExtraInfo") {
        return hex::encode(b"main thread");
    }
    if payload.starts_with("qMemoryRegionInfo:") {
        return "start:0;size:100000;permissions:rw;".to_string();
    }
    if payload.starts_with('H') || payload.starts_with('T') {
        return "OK".to_string();
    }
    if payload == "g" {
        return read_all_registers(session);
    }
    if let Some(rest) = payload.strip_prefix('G') {
        return write_all_registers(session, rest);
    }
    if payload == "vCont?" {
        return "vCont;c;s".to_string();
    }
    if payload == "vCont;c" || payload.starts_with('c') {
        let addr_hex = payload.strip_prefix('c').unwrap_or("");
        if !addr_hex.is_empty() {
            match hex::parse_u64(addr_hex) {
                Some(addr) => session.registers.set_pc(addr),
                None => return E01.to_string(),
            }
        }
        session.run_continue();
        return session.stop_reply();
    }
    if payload == "vCont;s" || payload.starts_with('s') {
        let addr_hex = payload.strip_prefix('s').unwrap_or("");
        if !addr_hex.is_empty() {
            match hex::parse_u64(addr_hex) {
                Some(addr) => session.registers.set_pc(addr),
                None => return E01.to_string(),
            }
        }
        session.step();
        return session.stop_reply();
    }
    if let Some(rest) = payload.strip_prefix('p') {
        return read_one_register(session, rest);
    }
    if let Some(rest) = payload.strip_prefix('P') {
        return write_one_register(session, rest);
    }
    if let Some(rest) = payload.strip_prefix('m') {
        return read_memory(session, rest);
    }
    if let Some(rest) = payload.strip_prefix('M') {
        return write_memory(session, rest);
    }
    if let Some(rest) = payload.strip_prefix('Z') {
        return set_breakpoint(session, rest);
    }
    if let Some(rest) = payload.strip_prefix('z') {
        return clear_breakpoint(session, rest);
    }
    if payload == "D" || payload == "k" {
        return "OK".to_string();
    }
    if payload.starts_with("qXfer:") {
        return xfer::dispatch(session, providers, payload);
    }
    if payload == "vMustReplyEmpty" {
        return String::new();
    }

    warn!(%payload, "unrecognized packet");
    String::new()
}

fn q_supported() -> String {
    let xfers: String = xfer::supported_streams()
        .iter()
        .map(|name| format!("qXfer:{name}:read+;"))
        .collect();
    format!(
        "PacketSize=4000;QStartNoAckMode+;swbreak+;hwbreak+;{xfers}qSymbol+"
    )
}

fn q_register_info(rest: &str) -> String {
    let Some(index) = hex::parse_usize(rest) else {
        return E01.to_string();
    };
    if index >= NUM_REGS {
        return E01.to_string();
    }
    let generic = if index == 0 { ";generic:pc" } else { "" };
    format!("name:r{index};bitsize:64;encoding:uint;format:hex;set:general{generic};")
}

fn read_all_registers(session: &Session) -> String {
    let mut bytes = Vec::with_capacity(NUM_REGS * 8);
    for reg in session.registers.all() {
        bytes.extend_from_slice(&reg.to_le_bytes());
    }
    hex::encode(&bytes)
}

fn write_all_registers(session: &mut Session, rest: &str) -> String {
    let Some(bytes) = hex::decode(rest) else {
        return E01.to_string();
    };
    if bytes.len() != NUM_REGS * 8 {
        return E02.to_string();
    }
    let mut values = [0u64; NUM_REGS];
    for (i, chunk) in bytes.chunks_exact(8).enumerate() {
        values[i] = u64::from_le_bytes(chunk.try_into().unwrap());
    }
    session.registers.load_all(values);
    "OK".to_string()
}

fn read_one_register(session: &Session, rest: &str) -> String {
    let Some(index) = hex::parse_usize(rest) else {
        return E01.to_string();
    };
    match session.registers.get(index) {
        Some(value) => hex::encode(&value.to_le_bytes()),
        None => E01.to_string(),
    }
}

fn write_one_register(session: &mut Session, rest: &str) -> String {
    let Some((index_str, value_hex)) = rest.split_once('=') else {
        return E01.to_string();
    };
    let Some(index) = hex::parse_usize(index_str) else {
        return E01.to_string();
    };
    let Some(bytes) = hex::decode(value_hex) else {
        return E01.to_string();
    };
    if bytes.len() != 8 {
        return E02.to_string();
    }
    let value = u64::from_le_bytes(bytes.try_into().unwrap());
    if session.registers.set(index, value) {
        "OK".to_string()
    } else {
        E01.to_string()
    }
}

fn read_memory(session: &Session, rest: &str) -> String {
    let Some((addr_str, len_str)) = rest.split_once(',') else {
        return E01.to_string();
    };
    let (Some(addr), Some(len)) = (hex::parse_u64(addr_str), hex::parse_usize(len_str)) else {
        return E01.to_string();
    };
    hex::encode(&session.memory.read_range(addr, len))
}

fn write_memory(session: &mut Session, rest: &str) -> String {
    let Some((head, data_hex)) = rest.split_once(':') else {
        return E01.to_string();
    };
    let Some((addr_str, len_str)) = head.split_once(',') else {
        return E01.to_string();
    };
    let (Some(addr), Some(len)) = (hex::parse_u64(addr_str), hex::parse_usize(len_str)) else {
        return E01.to_string();
    };
    let Some(bytes) = hex::decode(data_hex) else {
        return E01.to_string();
    };
    if bytes.len() != len {
        return E02.to_string();
    }
    session.memory.write_range(addr, &bytes);
    "OK".to_string()
}

fn parse_breakpoint_args(rest: &str) -> Option<(BreakpointKind, u64, u64)> {
    let (kind_str, tail) = rest.split_once(',')?;
    let (addr_str, len_str) = tail.split_once(',')?;
    let digit: u8 = kind_str.parse().ok()?;
    let kind = BreakpointKind::from_digit(digit)?;
    let addr = hex::parse_u64(addr_str)?;
    let len = hex::parse_u64(len_str)?;
    Some((kind, addr, len))
}

fn set_breakpoint(session: &mut Session, rest: &str) -> String {
    let Some((kind, addr, _len)) = parse_breakpoint_args(rest) else {
        return E01.to_string();
    };
    debug!(?kind, addr, "breakpoint set");
    session.breakpoints.insert(kind, addr);
    "OK".to_string()
}

fn clear_breakpoint(session: &mut Session, rest: &str) -> String {
    let Some((kind, addr, _len)) = parse_breakpoint_args(rest) else {
        return E01.to_string();
    };
    debug!(?kind, addr, "breakpoint cleared");
    session.breakpoints.remove(kind, addr);
    "OK".to_string()
}
