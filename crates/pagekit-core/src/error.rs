#![forbid(unsafe_code)]

//! Error types shared across pagekit crates.

use core::fmt;

/// Page-level error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// A component's required element is absent; the component stays inert.
    MissingElement {
        component: &'static str,
        selector: String,
    },
    /// Host-supplied configuration could not be parsed.
    InvalidConfig(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement {
                component,
                selector,
            } => write!(f, "{component}: missing required element `{selector}`"),
            Self::InvalidConfig(msg) => write!(f, "invalid page config: {msg}"),
        }
    }
}

impl std::error::Error for PageError {}

impl PageError {
    #[must_use]
    pub fn missing(component: &'static str, selector: impl Into<String>) -> Self {
        Self::MissingElement {
            component,
            selector: selector.into(),
        }
    }
}

/// Failure reported by a form submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitError {
    message: String,
}

impl SubmitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "submission failed: {}", self.message)
    }
}

impl std::error::Error for SubmitError {}
