//! Built-in `qXfer` streams that need no external provider (§4.8).

use rdbg_artifact::Program;
use rdbg_index::PcIndex;
use rdbg_value::decode_value;
use serde_json::json;

use crate::memory::AddressSpace;

/// Fixed pseudo-architecture target description: a 64-bit PC and sixteen
/// general 64-bit registers `r0`..`r15`.
#[must_use]
pub fn features_xml() -> Vec<u8> {
    let mut regs = String::new();
    for i in 0..16 {
        regs.push_str(&format!(
            r#"<reg name="r{i}" bitsize="64" type="int"/>"#
        ));
    }
    format!(
        r#"<?xml version="1.0"?><target><architecture>rdbg</architecture><feature name="org.rdbg.core"><reg name="pc" bitsize="64" type="code_ptr"/>{regs}</feature></target>"#
    )
    .into_bytes()
}

/// Fixed single-library listing of the executable itself.
#[must_use]
pub fn libraries_xml() -> Vec<u8> {
    br#"<?xml version="1.0"?><library-list><library name="a.out"><section address="0"/></library></library-list>"#
        .to_vec()
}

/// Fixed single RAM region spanning `0x100000` bytes.
#[must_use]
pub fn memory_map_xml() -> Vec<u8> {
    br#"<?xml version="1.0"?><memory-map><memory type="ram" start="0" length="0x100000"/></memory-map>"#
        .to_vec()
}

/// Build the current frame plus one line of context on either side (§4.8).
#[must_use]
pub fn build_stack_trace(pc_index: &PcIndex, pc: u64) -> Vec<u8> {
    let mut frames = Vec::new();

    if let Some(idx) = pc_index.range_index_containing(pc) {
        let range = &pc_index.ranges()[idx];
        let lookup = pc_index.lookup(pc);
        frames.push(json!({
            "pc": pc,
            "function": range.function_name,
            "file": lookup.file,
            "line": lookup.line,
        }));

        if idx > 0 {
            let prev = &pc_index.ranges()[idx - 1];
            if let Some(last) = prev.lines.last() {
                frames.push(json!({
                    "pc": prev.high.saturating_sub(rdbg_index::LINE_STRIDE),
                    "function": prev.function_name,
                    "file": last.file,
                    "line": last.line,
                }));
            }
        }

        if let Some(next) = pc_index.ranges().get(idx + 1) {
            if let Some(first) = next.lines.first() {
                frames.push(json!({
                    "pc": next.low,
                    "function": next.function_name,
                    "file": first.file,
                    "line": first.line,
                }));
            }
        }
    }

    serde_json::to_vec(&json!({ "frames": frames })).unwrap_or_else(|_| b"{\"frames\":[]}".to_vec())
}

/// Resolve a variable's display type name: its own `type` field first, then
/// `type_meta.name`, then `type_meta.kind`, then `"unknown"` (§4.8).
fn variable_type_name(variable: &rdbg_artifact::Variable) -> String {
    if !variable.type_name.is_empty() {
        return variable.type_name.clone();
    }
    if let Some(meta) = &variable.type_meta {
        if !meta.name.is_empty() {
            return meta.name.clone();
        }
        return format!("{:?}", meta.kind).to_lowercase();
    }
    "unknown".to_string()
}

/// Synthesize the `locals` stream directly from the artifact: names, types,
/// frame base, and offset only, with no values (used when no locals
/// provider is registered).
#[must_use]
pub fn synthesize_locals(program: &Program, pc_index: &PcIndex, pc: u64) -> Vec<u8> {
    let Some(idx) = pc_index.range_index_containing(pc) else {
        return b"l".to_vec();
    };
    let range = &pc_index.ranges()[idx];
    let function = &program.modules[range.module_index].functions[range.function_index];

    let locals: Vec<_> = function
        .variables
        .iter()
        .map(|v| {
            json!({
                "name": v.name,
                "type": variable_type_name(v),
                "base": v.address_base,
                "off": v.frame_offset,
            })
        })
        .collect();

    serde_json::to_vec(&locals).unwrap_or_else(|_| b"[]".to_vec())
}

/// Synthesize the `pretty-locals` stream: walk the current function's
/// variables, compute each variable's absolute address from the frame base
/// and frame offset, and decode a value at that address (§4.3, §4.4, §4.8).
#[must_use]
pub fn synthesize_pretty_locals(
    program: &Program,
    pc_index: &PcIndex,
    pc: u64,
    frame_base: u64,
    mem: &AddressSpace,
) -> Vec<u8> {
    let Some(idx) = pc_index.range_index_containing(pc) else {
        return b"l".to_vec();
    };
    let range = &pc_index.ranges()[idx];
    let function = &program.modules[range.module_index].functions[range.function_index];

    let locals: Vec<_> = function
        .variables
        .iter()
        .map(|v| {
            let addr = frame_base.wrapping_add(v.frame_offset as u64);
            let value = decode_value(mem, addr, v.type_meta.as_ref(), Some(v.type_name.as_str()));
            json!({
                "name": v.name,
                "type": variable_type_name(v),
                "value": value,
            })
        })
        .collect();

    serde_json::to_vec(&locals).unwrap_or_else(|_| b"[]".to_vec())
}

/// Canonical 16-byte-per-row hex+ASCII dump of `[addr, addr+len)`.
#[must_use]
pub fn pretty_memory_dump(mem: &AddressSpace, addr: u64, len: u64) -> Vec<u8> {
    let bytes = mem.read_range(addr, len as usize);
    let mut out = String::new();
    for (row_idx, row) in bytes.chunks(16).enumerate() {
        let row_addr = addr + (row_idx as u64) * 16;
        out.push_str(&format!("{row_addr:08x}  "));
        for b in row {
            out.push_str(&format!("{b:02x} "));
        }
        for _ in row.len()..16 {
            out.push_str("   ");
        }
        out.push_str(" |");
        for b in row {
            let c = *b as char;
            out.push(if c.is_ascii_graphic() || c == ' ' { c } else { '.' });
        }
        out.push_str("|\n");
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdbg_artifact::load_from_str;

    #[test]
    fn features_xml_lists_pc_and_sixteen_registers() {
        let xml = String::from_utf8(features_xml()).unwrap();
        assert!(xml.contains(r#"name="pc""#));
        assert!(xml.contains(r#"name="r15""#));
        assert!(!xml.contains(r#"name="r16""#));
    }

    #[test]
    fn memory_dump_renders_printable_ascii() {
        let mut mem = AddressSpace::new();
        mem.write_range(0, b"Hello, world!!!!");
        let dump = String::from_utf8(pretty_memory_dump(&mem, 0, 16)).unwrap();
        assert!(dump.contains("Hello, world!!!!"));
    }

    #[test]
    fn stack_trace_includes_current_frame() {
        let program = load_from_str(
            r#"{
                "generated_at": "2026-01-01T00:00:00Z",
                "modules": [{
                    "module_name": "m",
                    "functions": [{
                        "name": "only_fn",
                        "span": {"file": "f.src", "start_line": 1, "end_line": 1},
                        "lines": [{"file": "f.src", "line": 1, "column": 1}],
                        "variables": []
                    }]
                }]
            }"#,
        )
        .unwrap();
        let index = PcIndex::build(&program);
        let trace = build_stack_trace(&index, 0);
        let text = String::from_utf8(trace).unwrap();
        assert!(text.contains("only_fn"));
    }
}
