//! Breakpoint/watchpoint kinds and storage (§3, §4.6).
//!
//! Only the soft-breakpoint set is consulted by the execution engine; the
//! others are stored with identical set semantics so a future execution
//! engine can start evaluating them without a protocol change.

use std::collections::HashSet;

/// Breakpoint/watchpoint kind, keyed by the `Z<k>`/`z<k>` packet digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakpointKind {
    Soft,
    Hard,
    WriteWatch,
    ReadWatch,
    AccessWatch,
}

impl BreakpointKind {
    #[must_use]
    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Self::Soft),
            1 => Some(Self::Hard),
            2 => Some(Self::WriteWatch),
            3 => Some(Self::ReadWatch),
            4 => Some(Self::AccessWatch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Breakpoints {
    soft: HashSet<u64>,
    hard: HashSet<u64>,
    write_watch: HashSet<u64>,
    read_watch: HashSet<u64>,
    access_watch: HashSet<u64>,
}

impl Breakpoints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn set_mut(&mut self, kind: BreakpointKind) -> &mut HashSet<u64> {
        match kind {
            BreakpointKind::Soft => &mut self.soft,
            BreakpointKind::Hard => &mut self.hard,
            BreakpointKind::WriteWatch => &mut self.write_watch,
            BreakpointKind::ReadWatch => &mut self.read_watch,
            BreakpointKind::AccessWatch => &mut self.access_watch,
        }
    }

    fn set(&self, kind: BreakpointKind) -> &HashSet<u64> {
        match kind {
            BreakpointKind::Soft => &self.soft,
            BreakpointKind::Hard => &self.hard,
            BreakpointKind::WriteWatch => &self.write_watch,
            BreakpointKind::ReadWatch => &self.read_watch,
            BreakpointKind::AccessWatch => &self.access_watch,
        }
    }

    pub fn insert(&mut self, kind: BreakpointKind, addr: u64) {
        self.set_mut(kind).insert(addr);
    }

    /// Remove `addr` from `kind`'s set. Returns whether it was present,
    /// matching `Z<k>`'s symmetric `z<k>` behavior (see design note on the
    /// historical no-op removal bug in non-soft kinds).
    pub fn remove(&mut self, kind: BreakpointKind, addr: u64) -> bool {
        self.set_mut(kind).remove(&addr)
    }

    #[must_use]
    pub fn contains(&self, kind: BreakpointKind, addr: u64) -> bool {
        self.set(kind).contains(&addr)
    }

    #[must_use]
    pub fn contains_soft(&self, addr: u64) -> bool {
        self.contains(BreakpointKind::Soft, addr)
    }
}
