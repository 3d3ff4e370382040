//! Per-connection session state and the execution engine (§4.7, §4.9).

use std::sync::Arc;

use rdbg_artifact::Program;
use rdbg_index::PcIndex;

use crate::breakpoints::{BreakpointKind, Breakpoints};
use crate::memory::AddressSpace;
use crate::registers::RegisterFile;

/// Stop-reply rendering style, toggled by `qSupported` negotiation in real
/// GDB but here fixed per session at construction (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReplyStyle {
    Simple,
    Extended,
}

/// Everything one connection mutates. The PC index and artifact are shared
/// read-only via `Arc`; everything else here lives behind the one lock a
/// [`crate::server::Server`] holds per session (§4.9, §5).
pub struct Session {
    pub artifact: Arc<Program>,
    pub pc_index: Arc<PcIndex>,
    pub registers: RegisterFile,
    pub breakpoints: Breakpoints,
    pub memory: AddressSpace,
    pub no_ack: bool,
    pub stop_reply_style: StopReplyStyle,
}

impl Session {
    #[must_use]
    pub fn new(artifact: Arc<Program>, pc_index: Arc<PcIndex>) -> Self {
        Self {
            artifact,
            pc_index,
            registers: RegisterFile::new(),
            breakpoints: Breakpoints::new(),
            memory: AddressSpace::new(),
            no_ack: false,
            stop_reply_style: StopReplyStyle::Simple,
        }
    }

    #[must_use]
    pub fn with_stop_reply_style(mut self, style: StopReplyStyle) -> Self {
        self.stop_reply_style = style;
        self
    }

    #[must_use]
    pub fn pc(&self) -> u64 {
        self.registers.pc()
    }

    /// Advance the PC by one line-stride, following the range-boundary rule
    /// in §4.7. Returns `true` if the PC moved.
    pub fn step(&mut self) -> bool {
        let pc = self.pc();
        let moved = if let Some(idx) = self.pc_index.range_index_containing(pc) {
            let range = &self.pc_index.ranges()[idx];
            let next = pc + rdbg_index::LINE_STRIDE;
            let new_pc = if next < range.high {
                next
            } else if let Some(next_idx) = self.pc_index.next_range_index_after(pc) {
                self.pc_index.ranges()[next_idx].low
            } else {
                range.high
            };
            self.registers.set_pc(new_pc);
            new_pc != pc
        } else if let Some(next_idx) = self.pc_index.next_range_index_after(pc) {
            let new_pc = self.pc_index.ranges()[next_idx].low;
            self.registers.set_pc(new_pc);
            true
        } else {
            false
        };
        moved
    }

    /// Run until a soft breakpoint is hit or a `step` makes no progress.
    pub fn run_continue(&mut self) {
        loop {
            if self.breakpoints.contains(BreakpointKind::Soft, self.pc()) {
                return;
            }
            if !self.step() {
                return;
            }
        }
    }

    /// Render the current stop as a reply payload (§4.7).
    #[must_use]
    pub fn stop_reply(&self) -> String {
        match self.stop_reply_style {
            StopReplyStyle::Simple => "S05".to_string(),
            StopReplyStyle::Extended => {
                format!("T05;thread:1;pc:{};", crate::hex::encode(&self.pc().to_le_bytes()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdbg_artifact::load_from_str;

    fn two_function_index() -> (Arc<Program>, Arc<PcIndex>) {
        let program = load_from_str(
            r#"{
                "generated_at": "2026-01-01T00:00:00Z",
                "modules": [{
                    "module_name": "m",
                    "functions": [
                        {
                            "name": "a_fn",
                            "span": {"file": "f.src", "start_line": 1, "end_line": 2},
                            "lines": [
                                {"file": "f.src", "line": 1, "column": 1},
                                {"file": "f.src", "line": 2, "column": 1}
                            ],
                            "variables": []
                        },
                        {
                            "name": "b_fn",
                            "span": {"file": "f.src", "start_line": 10, "end_line": 10},
                            "lines": [
                                {"file": "f.src", "line": 10, "column": 1}
                            ],
                            "variables": []
                        }
                    ]
                }]
            }"#,
        )
        .unwrap();
        let index = Arc::new(PcIndex::build(&program));
        (Arc::new(program), index)
    }

    #[test]
    fn step_advances_within_a_range() {
        let (artifact, index) = two_function_index();
        let mut session = Session::new(artifact, index);
        assert!(session.step());
        assert_eq!(session.pc(), 4);
    }

    #[test]
    fn step_crosses_into_the_next_range() {
        let (artifact, index) = two_function_index();
        let mut session = Session::new(artifact, index);
        session.registers.set_pc(4);
        assert!(session.step());
        assert_eq!(session.pc(), 8);
    }

    #[test]
    fn continue_stops_at_a_soft_breakpoint() {
        let (artifact, index) = two_function_index();
        let mut session = Session::new(artifact, index);
        session.breakpoints.insert(BreakpointKind::Soft, 8);
        session.run_continue();
        assert_eq!(session.pc(), 8);
    }

    #[test]
    fn registers_zero_always_mirrors_pc() {
        let (artifact, index) = two_function_index();
        let mut session = Session::new(artifact, index);
        session.step();
        assert_eq!(session.registers.get(0), Some(session.pc()));
    }
}
