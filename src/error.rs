use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::SourceLocation;

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_BODY_SCOPE: &str = "W-ERR-BODY-SCOPE";
pub const ERR_BIND_SCOPE: &str = "W-ERR-BIND-SCOPE";
pub const ERR_DEFAULT_MODULE: &str = "W-ERR-DEFAULT-MODULE";
pub const ERR_EXPR_SYNTAX: &str = "W-ERR-EXPR-SYNTAX";
pub const ERR_PARSE: &str = "W-ERR-PARSE";

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// A diagnostic reported against one template node. Compilation of the rest of
/// the template continues; the offending node's widget output is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[cfg_attr(feature = "napi", napi_derive::napi(object))]
#[serde(rename_all = "camelCase")]
#[error("{file}:{line}:{column}: {message} [{code}]")]
pub struct CompileError {
    pub code: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl CompileError {
    pub fn new(code: &str, message: &str, file: &str, location: &SourceLocation) -> Self {
        CompileError {
            code: code.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            line: location.line,
            column: location.column,
        }
    }
}

/// Errors from the fallible entry points of the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse template {file}: {message}")]
    Parse { file: String, message: String },

    #[error("failed to serialize widget data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
