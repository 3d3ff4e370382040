//! PC index: the derived, immutable mapping from synthetic addresses to source lines.
//!
//! There is no real instruction stream to address, so every function is
//! assigned a contiguous pseudo-address range with a fixed 4-byte stride
//! per line entry. The DWARF/object-file emitter (out of scope here) must
//! use the same stride for addresses to stay interchangeable between the
//! two output formats.

use rdbg_artifact::{LineEntry, Program};

/// Stride in bytes assigned to each line entry.
pub const LINE_STRIDE: u64 = 4;

/// A contiguous pseudo-address range owned by one function.
#[derive(Debug, Clone)]
pub struct PcRange {
    pub low: u64,
    pub high: u64,
    pub module_name: String,
    pub function_name: String,
    pub module_index: usize,
    pub function_index: usize,
    pub lines: Vec<LineEntry>,
}

impl PcRange {
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.low && addr < self.high
    }
}

/// Result of an address-to-source lookup (spec: `addr -> (file, line, ok)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub file: String,
    pub line: u32,
    pub ok: bool,
}

impl Lookup {
    fn miss() -> Self {
        Self {
            file: String::new(),
            line: 0,
            ok: false,
        }
    }

    fn empty_range_hit() -> Self {
        Self {
            file: String::new(),
            line: 0,
            ok: true,
        }
    }
}

/// The immutable, precomputed table of pseudo-address ranges for one artifact.
#[derive(Debug, Clone, Default)]
pub struct PcIndex {
    ranges: Vec<PcRange>,
}

impl PcIndex {
    /// Build the index from an artifact.
    ///
    /// Modules are walked sorted by name; within each module, functions are
    /// walked sorted by name. Each function with `n` line entries (`n = 0`
    /// treated as `n = 1`) is assigned `[cursor, cursor + 4n)` and the
    /// cursor advances by `4n`.
    #[must_use]
    pub fn build(program: &Program) -> Self {
        let mut module_order: Vec<usize> = (0..program.modules.len()).collect();
        module_order.sort_by(|&a, &b| {
            program.modules[a]
                .module_name
                .cmp(&program.modules[b].module_name)
        });

        let mut ranges = Vec::new();
        let mut cursor: u64 = 0;
        for &mi in &module_order {
            let module = &program.modules[mi];
            let mut function_order: Vec<usize> = (0..module.functions.len()).collect();
            function_order.sort_by(|&a, &b| {
                module.functions[a].name.cmp(&module.functions[b].name)
            });

            for &fi in &function_order {
                let function = &module.functions[fi];
                let n = function.lines.len().max(1) as u64;
                let low = cursor;
                let high = cursor + LINE_STRIDE * n;
                ranges.push(PcRange {
                    low,
                    high,
                    module_name: module.module_name.clone(),
                    function_name: function.name.clone(),
                    module_index: mi,
                    function_index: fi,
                    lines: function.lines.clone(),
                });
                cursor = high;
            }
        }

        Self { ranges }
    }

    /// Total address space spanned by the index: `[0, total)`.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.ranges.last().map_or(0, |r| r.high)
    }

    /// All ranges, in construction (address) order.
    #[must_use]
    pub fn ranges(&self) -> &[PcRange] {
        &self.ranges
    }

    /// Index of the range containing `addr`, if any.
    #[must_use]
    pub fn range_index_containing(&self, addr: u64) -> Option<usize> {
        self.ranges.iter().position(|r| r.contains(addr))
    }

    /// Index of the first range whose `low` is strictly greater than `addr`.
    #[must_use]
    pub fn next_range_index_after(&self, addr: u64) -> Option<usize> {
        self.ranges.iter().position(|r| r.low > addr)
    }

    /// Resolve an address to its source location.
    #[must_use]
    pub fn lookup(&self, addr: u64) -> Lookup {
        let Some(idx) = self.range_index_containing(addr) else {
            return Lookup::miss();
        };
        let range = &self.ranges[idx];
        if range.lines.is_empty() {
            return Lookup::empty_range_hit();
        }
        let line_idx = ((addr - range.low) / LINE_STRIDE) as usize;
        let line_idx = line_idx.min(range.lines.len() - 1);
        let entry = &range.lines[line_idx];
        Lookup {
            file: entry.file.clone(),
            line: entry.line,
            ok: true,
        }
    }
}
