//! Kind-dispatched value decoding (§4.4 of the design).

use std::collections::HashSet;

use rdbg_artifact::{Field, TypeKind, TypeMeta};
use serde_json::{Map, Value, json};

use crate::reader::MemoryReader;

/// Maximum recursion depth; the fourth nested level is replaced by `<max-depth>`.
const MAX_DEPTH: usize = 3;
/// Hard cap on decoded array element counts.
const MAX_ARRAY_LEN: usize = 64;
/// Hard cap on decoded slice element counts.
const MAX_SLICE_LEN: u32 = 64;
/// Hard cap on decoded map entry counts.
const MAX_MAP_LEN: usize = 8;
/// Hard cap on decoded string length.
const MAX_STRING_LEN: usize = 256;
/// Default element stride (bytes) when a type's size is unknown.
const DEFAULT_STRIDE: u64 = 8;

/// Decode a value at `addr` using `type_meta` when present, else a best-effort
/// inference from `type_name`.
pub fn decode_value<M: MemoryReader>(
    mem: &M,
    addr: u64,
    type_meta: Option<&TypeMeta>,
    type_name: Option<&str>,
) -> Value {
    let mut visited = HashSet::new();
    decode_at(mem, addr, type_meta, type_name, 0, &mut visited)
}

fn decode_at<M: MemoryReader>(
    mem: &M,
    addr: u64,
    type_meta: Option<&TypeMeta>,
    type_name: Option<&str>,
    depth: usize,
    visited: &mut HashSet<u64>,
) -> Value {
    if depth > MAX_DEPTH {
        return json!("<max-depth>");
    }

    match type_meta {
        Some(tm) => decode_typed(mem, addr, tm, depth, visited),
        None => decode_untyped(mem, addr, type_name.unwrap_or("")),
    }
}

/// Decode without structured type metadata: infer a primitive form from the
/// type-name string, falling back to a raw hex dump of 8 bytes.
fn decode_untyped<M: MemoryReader>(mem: &M, addr: u64, type_name: &str) -> Value {
    match infer_primitive(type_name) {
        Some(prim) => decode_primitive(mem, addr, prim),
        None if type_name.eq_ignore_ascii_case("bool") => {
            json!(mem.read_u8(addr) != 0)
        }
        None if type_name.eq_ignore_ascii_case("string") => {
            decode_string(mem, addr)
        }
        None => json!(format!("0x{:x}", mem.read_u64(addr))),
    }
}

#[derive(Debug, Clone, Copy)]
enum Prim {
    I32,
    U32,
    F32,
    I64,
    U64,
    F64,
}

/// Infer a primitive form from a type-name string (e.g. `"int32"` -> `I32`).
fn infer_primitive(name: &str) -> Option<Prim> {
    let lower = name.to_ascii_lowercase();
    let is_float = lower.contains("float");
    let is_signed = lower.starts_with("int") || (is_float && !lower.contains("uint"));
    let is_64 = lower.contains("64") || (!lower.contains("32") && !lower.contains("16") && !lower.contains('8'));

    if !lower.contains("int") && !is_float {
        return None;
    }

    Some(match (is_float, is_signed, is_64) {
        (true, _, true) => Prim::F64,
        (true, _, false) => Prim::F32,
        (false, true, true) => Prim::I64,
        (false, true, false) => Prim::I32,
        (false, false, true) => Prim::U64,
        (false, false, false) => Prim::U32,
    })
}

fn decode_primitive<M: MemoryReader>(mem: &M, addr: u64, prim: Prim) -> Value {
    match prim {
        Prim::I32 => json!(mem.read_u32(addr) as i32),
        Prim::U32 => json!(mem.read_u32(addr)),
        Prim::F32 => json!(f32::from_bits(mem.read_u32(addr))),
        Prim::I64 => json!(mem.read_u64(addr) as i64),
        Prim::U64 => json!(mem.read_u64(addr)),
        Prim::F64 => json!(f64::from_bits(mem.read_u64(addr))),
    }
}

fn decode_string<M: MemoryReader>(mem: &M, addr: u64) -> Value {
    let ptr = mem.read_u64(addr);
    let bytes = mem.read_cstring(ptr, MAX_STRING_LEN);
    json!(String::from_utf8_lossy(&bytes).into_owned())
}

fn decode_typed<M: MemoryReader>(
    mem: &M,
    addr: u64,
    tm: &TypeMeta,
    depth: usize,
    visited: &mut HashSet<u64>,
) -> Value {
    match tm.kind {
        TypeKind::Int | TypeKind::Float => match infer_primitive(&tm.name) {
            Some(prim) => decode_primitive(mem, addr, prim),
            None => json!(format!("0x{:x}", mem.read_u64(addr))),
        },
        TypeKind::Bool => json!(mem.read_u8(addr) != 0),
        TypeKind::String => decode_string(mem, addr),
        TypeKind::Pointer => decode_pointer(mem, addr, tm, depth, visited),
        TypeKind::Struct => decode_struct(mem, addr, tm, depth, visited),
        TypeKind::Tuple => decode_tuple(mem, addr, tm, depth, visited),
        TypeKind::Array => decode_array(mem, addr, tm, depth, visited),
        TypeKind::Slice => decode_slice(mem, addr, tm, depth, visited),
        TypeKind::Map => decode_map(mem, addr, tm, depth, visited),
        TypeKind::Interface => decode_interface(mem, addr),
    }
}

fn decode_pointer<M: MemoryReader>(
    mem: &M,
    addr: u64,
    tm: &TypeMeta,
    depth: usize,
    visited: &mut HashSet<u64>,
) -> Value {
    let ptr = mem.read_u64(addr);
    if ptr == 0 {
        return json!({"addr": "0x0", "deref": Value::Null});
    }
    if visited.contains(&ptr) {
        return json!({"addr": format!("0x{ptr:x}"), "deref": "<cycle>"});
    }

    let Some(elem) = tm.parameters.first() else {
        return json!(format!("0x{ptr:x}"));
    };

    visited.insert(ptr);
    let deref = decode_at(mem, ptr, Some(elem), None, depth + 1, visited);
    json!({"addr": format!("0x{ptr:x}"), "deref": deref})
}

fn decode_struct<M: MemoryReader>(
    mem: &M,
    addr: u64,
    tm: &TypeMeta,
    depth: usize,
    visited: &mut HashSet<u64>,
) -> Value {
    let mut obj = Map::new();
    for field in &tm.fields {
        let value = decode_at(
            mem,
            addr + field.offset,
            Some(&field.type_meta),
            None,
            depth + 1,
            visited,
        );
        obj.insert(field.name.clone(), value);
    }
    Value::Object(obj)
}

fn decode_tuple<M: MemoryReader>(
    mem: &M,
    addr: u64,
    tm: &TypeMeta,
    depth: usize,
    visited: &mut HashSet<u64>,
) -> Value {
    let values: Vec<Value> = tm
        .fields
        .iter()
        .map(|field| {
            decode_at(
                mem,
                addr + field.offset,
                Some(&field.type_meta),
                None,
                depth + 1,
                visited,
            )
        })
        .collect();
    Value::Array(values)
}

fn decode_array<M: MemoryReader>(
    mem: &M,
    addr: u64,
    tm: &TypeMeta,
    depth: usize,
    visited: &mut HashSet<u64>,
) -> Value {
    let elem = tm.parameters.first();
    let known_elem_size = elem.map(|e| e.size).filter(|&s| s > 0);
    let count = match known_elem_size {
        Some(es) if tm.size > 0 => (tm.size / es) as usize,
        _ => 8,
    }
    .min(MAX_ARRAY_LEN);
    let stride = known_elem_size.unwrap_or(DEFAULT_STRIDE);

    let values: Vec<Value> = (0..count)
        .map(|i| decode_at(mem, addr + i as u64 * stride, elem, None, depth + 1, visited))
        .collect();
    Value::Array(values)
}

fn find_field_ci<'a>(fields: &'a [Field], name: &str) -> Option<&'a Field> {
    fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

fn decode_slice<M: MemoryReader>(
    mem: &M,
    addr: u64,
    tm: &TypeMeta,
    depth: usize,
    visited: &mut HashSet<u64>,
) -> Value {
    let data_field = find_field_ci(&tm.fields, "data");
    let len_field = find_field_ci(&tm.fields, "len");

    let data_ptr = data_field.map_or(0, |f| mem.read_u64(addr + f.offset));
    let len = len_field
        .map_or(0, |f| mem.read_u32(addr + f.offset))
        .min(MAX_SLICE_LEN);

    let elem = tm.parameters.first();
    let elem_size = elem.map(|e| e.size).filter(|&s| s > 0).unwrap_or(DEFAULT_STRIDE);

    let values: Vec<Value> = (0..len)
        .map(|i| {
            decode_at(
                mem,
                data_ptr + u64::from(i) * elem_size,
                elem,
                None,
                depth + 1,
                visited,
            )
        })
        .collect();
    Value::Array(values)
}

fn decode_map<M: MemoryReader>(
    mem: &M,
    addr: u64,
    tm: &TypeMeta,
    depth: usize,
    visited: &mut HashSet<u64>,
) -> Value {
    let base_field = ["data", "entries", "buckets"]
        .iter()
        .find_map(|name| find_field_ci(&tm.fields, name));
    let count_field = ["len", "length", "count", "size"]
        .iter()
        .find_map(|name| find_field_ci(&tm.fields, name));

    let base_ptr = base_field.map_or_else(|| mem.read_u64(addr), |f| mem.read_u64(addr + f.offset));
    let count = count_field
        .map_or(0, |f| mem.read_u32(addr + f.offset) as usize)
        .min(MAX_MAP_LEN);

    let key_ty = tm.parameters.first();
    let val_ty = tm.parameters.get(1);
    let key_slot = slot_size(key_ty);
    let val_slot = slot_size(val_ty);
    let stride = key_slot + val_slot;

    let entries: Vec<Value> = (0..count)
        .map(|i| {
            let entry_addr = base_ptr + i as u64 * stride;
            let key = decode_at(mem, entry_addr, key_ty, None, depth + 1, visited);
            let value = decode_at(mem, entry_addr + key_slot, val_ty, None, depth + 1, visited);
            json!({"key": key, "value": value})
        })
        .collect();
    Value::Array(entries)
}

fn slot_size(ty: Option<&TypeMeta>) -> u64 {
    let raw = ty.map(|t| t.size).filter(|&s| s > 0).unwrap_or(DEFAULT_STRIDE);
    raw.div_ceil(8) * 8
}

fn decode_interface<M: MemoryReader>(mem: &M, addr: u64) -> Value {
    let vptr = mem.read_u64(addr);
    let data = mem.read_u64(addr + 8);
    json!({"vptr": format!("0x{vptr:x}"), "data": format!("0x{data:x}")})
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeMemory(RefCell<HashMap<u64, u8>>);

    impl FakeMemory {
        fn new() -> Self {
            Self(RefCell::new(HashMap::new()))
        }

        fn write_u64(&self, addr: u64, value: u64) {
            for (i, b) in value.to_le_bytes().iter().enumerate() {
                self.0.borrow_mut().insert(addr + i as u64, *b);
            }
        }

        fn write_u32(&self, addr: u64, value: u32) {
            for (i, b) in value.to_le_bytes().iter().enumerate() {
                self.0.borrow_mut().insert(addr + i as u64, *b);
            }
        }

        fn write_bytes(&self, addr: u64, bytes: &[u8]) {
            for (i, b) in bytes.iter().enumerate() {
                self.0.borrow_mut().insert(addr + i as u64, *b);
            }
        }
    }

    impl MemoryReader for FakeMemory {
        fn read_u8(&self, addr: u64) -> u8 {
            *self.0.borrow().get(&addr).unwrap_or(&0)
        }
    }

    fn int32() -> TypeMeta {
        TypeMeta {
            kind: TypeKind::Int,
            name: "int32".into(),
            size: 4,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![],
            parameters: vec![],
        }
    }

    fn pointer_to(elem: TypeMeta) -> TypeMeta {
        TypeMeta {
            kind: TypeKind::Pointer,
            name: "*T".into(),
            size: 8,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![],
            parameters: vec![elem],
        }
    }

    #[test]
    fn decodes_signed_primitive() {
        let mem = FakeMemory::new();
        mem.write_u32(0, (-5i32) as u32);
        let value = decode_value(&mem, 0, Some(&int32()), None);
        assert_eq!(value, json!(-5));
    }

    #[test]
    fn decodes_untyped_primitive_by_name() {
        let mem = FakeMemory::new();
        mem.write_u32(0, 42);
        let value = decode_value(&mem, 0, None, Some("uint32"));
        assert_eq!(value, json!(42));
    }

    #[test]
    fn null_pointer_has_no_deref() {
        let mem = FakeMemory::new();
        let ty = pointer_to(int32());
        let value = decode_value(&mem, 0, Some(&ty), None);
        assert_eq!(value["addr"], json!("0x0"));
        assert_eq!(value["deref"], Value::Null);
    }

    #[test]
    fn self_referential_pointer_terminates_with_cycle_marker() {
        let mem = FakeMemory::new();
        // A struct at address 0x100 with a single field "next" pointing to itself.
        let cyclic_struct = TypeMeta {
            kind: TypeKind::Struct,
            name: "Node".into(),
            size: 8,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![Field {
                name: "next".into(),
                offset: 0,
                type_meta: pointer_to(TypeMeta {
                    kind: TypeKind::Struct,
                    name: "Node".into(),
                    size: 8,
                    qualifiers: vec![],
                    alias_of: None,
                    fields: vec![],
                    parameters: vec![],
                }),
            }],
        };
        mem.write_u64(0x100, 0x100);
        let rendered = decode_value(&mem, 0x100, Some(&cyclic_struct), None);
        assert!(rendered.to_string().contains("<cycle>"));
    }

    #[test]
    fn depth_beyond_three_is_capped() {
        // Four pointer-to-pointer-to-pointer-to-pointer-to-int32, nested past the bound.
        let mut ty = int32();
        for _ in 0..5 {
            ty = pointer_to(ty);
        }
        let mem = FakeMemory::new();
        // every pointer points to the next address
        for level in 0..5u64 {
            mem.write_u64(level * 8, (level + 1) * 8);
        }
        let rendered = decode_value(&mem, 0, Some(&ty), None);
        assert!(rendered.to_string().contains("<max-depth>"));
    }

    #[test]
    fn slice_reads_data_and_len_fields() {
        let slice_ty = TypeMeta {
            kind: TypeKind::Slice,
            name: "[]int32".into(),
            size: 16,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![
                Field {
                    name: "Data".into(),
                    offset: 0,
                    type_meta: pointer_to(int32()),
                },
                Field {
                    name: "Len".into(),
                    offset: 8,
                    type_meta: int32(),
                },
            ],
            parameters: vec![int32()],
        };
        let mem = FakeMemory::new();
        mem.write_u64(0, 0x1000);
        mem.write_u32(8, 2);
        mem.write_u32(0x1000, 11);
        mem.write_u32(0x1004, 22);
        let rendered = decode_value(&mem, 0, Some(&slice_ty), None);
        assert_eq!(rendered, json!([11, 22]));
    }

    #[test]
    fn string_reads_through_pointer_until_nul() {
        let mem = FakeMemory::new();
        mem.write_u64(0, 0x2000);
        mem.write_bytes(0x2000, b"hi\0garbage");
        let string_ty = TypeMeta {
            kind: TypeKind::String,
            name: "string".into(),
            size: 8,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![],
            parameters: vec![],
        };
        let rendered = decode_value(&mem, 0, Some(&string_ty), None);
        assert_eq!(rendered, json!("hi"));
    }

    #[test]
    fn array_defaults_count_to_eight_when_element_size_unknown() {
        let mem = FakeMemory::new();
        let array_ty = TypeMeta {
            kind: TypeKind::Array,
            name: "[8]?".into(),
            size: 32,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![],
            parameters: vec![],
        };
        let rendered = decode_value(&mem, 0, Some(&array_ty), None);
        assert_eq!(rendered.as_array().unwrap().len(), 8);
    }

    #[test]
    fn array_counts_by_size_over_element_size_when_both_known() {
        let mem = FakeMemory::new();
        for i in 0..4u64 {
            mem.write_u32(i * 4, (i as u32) * 10);
        }
        let array_ty = TypeMeta {
            kind: TypeKind::Array,
            name: "[4]int32".into(),
            size: 16,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![],
            parameters: vec![int32()],
        };
        let rendered = decode_value(&mem, 0, Some(&array_ty), None);
        assert_eq!(rendered, json!([0, 10, 20, 30]));
    }

    #[test]
    fn tuple_decodes_each_field_by_offset() {
        let mem = FakeMemory::new();
        mem.write_u32(0, 7);
        mem.write_u32(4, 9);
        let tuple_ty = TypeMeta {
            kind: TypeKind::Tuple,
            name: "(int32, int32)".into(),
            size: 8,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![
                Field {
                    name: "0".into(),
                    offset: 0,
                    type_meta: int32(),
                },
                Field {
                    name: "1".into(),
                    offset: 4,
                    type_meta: int32(),
                },
            ],
            parameters: vec![],
        };
        let rendered = decode_value(&mem, 0, Some(&tuple_ty), None);
        assert_eq!(rendered, json!([7, 9]));
    }

    #[test]
    fn map_reads_entries_from_base_and_count_fields() {
        let mem = FakeMemory::new();
        // base_ptr at offset 0 ("data"), count at offset 8 ("len").
        mem.write_u64(0, 0x3000);
        mem.write_u32(8, 2);
        // key/value slots are rounded up to 8 bytes each, so stride is 16.
        mem.write_u32(0x3000, 1);
        mem.write_u32(0x3008, 100);
        mem.write_u32(0x3010, 2);
        mem.write_u32(0x3018, 200);
        let map_ty = TypeMeta {
            kind: TypeKind::Map,
            name: "map[int32]int32".into(),
            size: 16,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![
                Field {
                    name: "data".into(),
                    offset: 0,
                    type_meta: pointer_to(int32()),
                },
                Field {
                    name: "len".into(),
                    offset: 8,
                    type_meta: int32(),
                },
            ],
            parameters: vec![int32(), int32()],
        };
        let rendered = decode_value(&mem, 0, Some(&map_ty), None);
        assert_eq!(
            rendered,
            json!([{"key": 1, "value": 100}, {"key": 2, "value": 200}])
        );
    }

    #[test]
    fn interface_reports_vtable_and_data_pointers() {
        let mem = FakeMemory::new();
        mem.write_u64(0, 0xdead);
        mem.write_u64(8, 0xbeef);
        let iface_ty = TypeMeta {
            kind: TypeKind::Interface,
            name: "interface{}".into(),
            size: 16,
            qualifiers: vec![],
            alias_of: None,
            fields: vec![],
            parameters: vec![],
        };
        let rendered = decode_value(&mem, 0, Some(&iface_ty), None);
        assert_eq!(rendered["vptr"], json!("0xdead"));
        assert_eq!(rendered["data"], json!("0xbeef"));
    }
}
