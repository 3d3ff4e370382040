//! Parsing and semantic validation of the debug artifact JSON document.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::model::Program;

/// Failure modes for loading a debug artifact.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load and validate a debug artifact from a JSON file on disk.
///
/// Structural failures (missing fields, type mismatches) are reported as
/// [`LoaderError::Parse`]. Semantic invariant violations (duplicate module
/// names, unsorted line tables) are logged as warnings and do not fail the
/// load: the PC index and value decoder are built to degrade gracefully
/// rather than trust an artifact to be well-formed.
pub fn load_from_path(path: &Path) -> Result<Program, LoaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&text)
}

/// Parse and validate a debug artifact from an in-memory JSON document.
pub fn load_from_str(text: &str) -> Result<Program, LoaderError> {
    let program: Program = serde_json::from_str(text)?;
    validate(&program);
    Ok(program)
}

/// Check the table invariants from the data model and log violations.
///
/// This never fails the load; callers that need strict validation should
/// inspect the returned `Program` themselves.
fn validate(program: &Program) {
    let mut seen_modules = HashSet::new();
    for module in &program.modules {
        if !seen_modules.insert(module.module_name.as_str()) {
            warn!(module = %module.module_name, "duplicate module name in artifact");
        }
        for function in &module.functions {
            if function.lines.windows(2).any(|w| w[0] > w[1]) {
                warn!(
                    module = %module.module_name,
                    function = %function.name,
                    "line entries are not sorted by (file, line, column)"
                );
            }
            for variable in &function.variables {
                if !variable.span.line_count_is_valid() {
                    warn!(
                        module = %module.module_name,
                        function = %function.name,
                        variable = %variable.name,
                        "variable span ends before it starts"
                    );
                }
            }
            if !parameters_precede_locals(function) {
                warn!(
                    module = %module.module_name,
                    function = %function.name,
                    "parameters are not listed before locals"
                );
            }
        }
    }
}

fn parameters_precede_locals(function: &crate::model::Function) -> bool {
    let mut seen_local = false;
    for variable in &function.variables {
        if variable.is_param {
            if seen_local {
                return false;
            }
        } else {
            seen_local = true;
        }
    }
    true
}

impl crate::model::Span {
    /// A span is internally consistent when it does not end before it starts.
    #[must_use]
    pub const fn line_count_is_valid(&self) -> bool {
        self.end_line == 0 || self.end_line >= self.start_line
    }
}
