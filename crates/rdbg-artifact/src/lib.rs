//! Debug artifact data model and JSON loader.
//!
//! The artifact is the immutable input to the debug protocol server: an
//! ordered tree of modules, functions, line entries, and typed variables
//! produced by a debug-information producer (out of scope here) and
//! consumed by the PC index, value decoder, and xfer engine.

mod loader;
mod model;

pub use loader::{LoaderError, load_from_path, load_from_str};
pub use model::{
    AddressBase, Field, Function, LineEntry, Module, Program, Qualifier, Span, TypeKind, TypeMeta,
    Variable,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "generated_at": "2026-01-01T00:00:00Z",
            "modules": [
                {
                    "module_name": "main",
                    "functions": [
                        {
                            "name": "add",
                            "span": {"file": "main.src", "start_line": 1, "end_line": 3},
                            "lines": [
                                {"file": "main.src", "line": 1, "column": 1},
                                {"file": "main.src", "line": 2, "column": 1},
                                {"file": "main.src", "line": 3, "column": 1}
                            ],
                            "variables": [
                                {
                                    "name": "a",
                                    "type": "int32",
                                    "span": {"file": "main.src", "start_line": 1, "end_line": 1},
                                    "is_param": true,
                                    "frame_offset": -8,
                                    "address_base": "fbreg"
                                }
                            ]
                        }
                    ]
                }
            ]
        }"#
    }

    #[test]
    fn parses_minimal_artifact() {
        let program = load_from_str(sample_json()).expect("should parse");
        assert_eq!(program.modules.len(), 1);
        assert_eq!(program.modules[0].functions[0].lines.len(), 3);
        assert!(program.modules[0].functions[0].variables[0].is_param);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = load_from_str("{ not json").unwrap_err();
        assert!(matches!(err, LoaderError::Parse(_)));
    }

    #[test]
    fn flags_out_of_order_lines_without_failing() {
        let json = r#"{
            "generated_at": "2026-01-01T00:00:00Z",
            "modules": [
                {
                    "module_name": "m",
                    "functions": [
                        {
                            "name": "f",
                            "span": {"file": "f.src", "start_line": 1, "end_line": 2},
                            "lines": [
                                {"file": "f.src", "line": 2, "column": 1},
                                {"file": "f.src", "line": 1, "column": 1}
                            ],
                            "variables": []
                        }
                    ]
                }
            ]
        }"#;
        // out-of-order lines are a warning, not a parse failure
        assert!(load_from_str(json).is_ok());
    }
}
