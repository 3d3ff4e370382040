//! Debug artifact data model.
//!
//! Mirrors the JSON document emitted by the debug-information producer:
//! a `Program` owning `Module`s, each owning `Function`s, each carrying
//! ordered `LineEntry` and `Variable` records plus optional `TypeMeta`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level debug artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub generated_at: DateTime<Utc>,
    pub modules: Vec<Module>,
}

/// A named collection of functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub module_name: String,
    pub functions: Vec<Function>,
}

/// Source span covering a file and a line range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// A compiled function: its line table, parameters, and locals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub span: Span,
    pub lines: Vec<LineEntry>,
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub param_types: Vec<String>,
}

/// One row of the function's line table.
///
/// Field order matches the spec's sort key (file, line, column) so the derived
/// `Ord` can be used directly to validate and, where needed, re-sort entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineEntry {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Where a variable's address is computed from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressBase {
    /// Frame-relative: `address = frame_base + frame_offset`.
    Fbreg,
    /// No base recorded.
    #[default]
    #[serde(rename = "")]
    None,
}

/// A parameter or local variable record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub span: Span,
    #[serde(default)]
    pub is_param: bool,
    #[serde(default)]
    pub is_captured: bool,
    #[serde(default)]
    pub frame_offset: i64,
    #[serde(default)]
    pub address_base: AddressBase,
    #[serde(default)]
    pub type_meta: Option<TypeMeta>,
}

/// Discriminant for `TypeMeta::kind`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Int,
    Float,
    Bool,
    String,
    Pointer,
    Struct,
    Array,
    Slice,
    Tuple,
    Interface,
    Map,
}

/// A named, offset field inside a struct or tuple `TypeMeta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub offset: u64,
    #[serde(rename = "type")]
    pub type_meta: TypeMeta,
}

/// Structured type description attached to a variable, field, or type parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMeta {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub alias_of: Option<Box<TypeMeta>>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub parameters: Vec<TypeMeta>,
}

/// A type qualifier such as `const` or `volatile`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    Const,
    Volatile,
}
