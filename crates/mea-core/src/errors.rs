//! Structured error types shared across MEA crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`MeaError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (multi-indices, sub-terms, shapes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the MEA derivation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum MeaError {
    /// Dimension mismatch between species, propensities, stoichiometry or matrices.
    #[error("shape error: {0}")]
    Shape(ErrorInfo),
    /// Central and raw counters do not describe a derivable system.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// A central moment of order zero or one was submitted for derivation.
    #[error("degenerate moment: {0}")]
    DegenerateMoment(ErrorInfo),
    /// Failure raised by the symbolic back end (evaluation, unsupported forms).
    #[error("symbolic error: {0}")]
    Symbolic(ErrorInfo),
    /// Expression text could not be parsed.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl MeaError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            MeaError::Shape(info)
            | MeaError::Configuration(info)
            | MeaError::DegenerateMoment(info)
            | MeaError::Symbolic(info)
            | MeaError::Parse(info)
            | MeaError::Serde(info) => info,
        }
    }

    /// Attaches an additional context entry, keeping the error family intact.
    ///
    /// Used by callers that wrap a lower level failure with the multi-index or
    /// sub-term they were working on when it surfaced.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self {
            MeaError::Shape(info) => MeaError::Shape(info.with_context(key, value)),
            MeaError::Configuration(info) => {
                MeaError::Configuration(info.with_context(key, value))
            }
            MeaError::DegenerateMoment(info) => {
                MeaError::DegenerateMoment(info.with_context(key, value))
            }
            MeaError::Symbolic(info) => MeaError::Symbolic(info.with_context(key, value)),
            MeaError::Parse(info) => MeaError::Parse(info.with_context(key, value)),
            MeaError::Serde(info) => MeaError::Serde(info.with_context(key, value)),
        }
    }
}
