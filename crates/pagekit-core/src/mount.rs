#![forbid(unsafe_code)]

//! Constructor-time capability check.
//!
//! Components are built through a `mount` function returning [`Mount`]. When
//! a required element is missing the result is [`Mount::Inactive`] and the
//! page simply never routes anything to it.

use crate::error::PageError;

#[derive(Debug)]
pub enum Mount<T> {
    Active(T),
    Inactive(PageError),
}

impl<T> Mount<T> {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    #[must_use]
    pub fn as_active(&self) -> Option<&T> {
        match self {
            Self::Active(inner) => Some(inner),
            Self::Inactive(_) => None,
        }
    }

    pub fn as_active_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Active(inner) => Some(inner),
            Self::Inactive(_) => None,
        }
    }

    #[must_use]
    pub fn into_active(self) -> Option<T> {
        match self {
            Self::Active(inner) => Some(inner),
            Self::Inactive(_) => None,
        }
    }

    /// Reason the component is inert, if it is.
    #[must_use]
    pub fn inactive_reason(&self) -> Option<&PageError> {
        match self {
            Self::Active(_) => None,
            Self::Inactive(err) => Some(err),
        }
    }
}

impl<T> From<Result<T, PageError>> for Mount<T> {
    fn from(result: Result<T, PageError>) -> Self {
        match result {
            Ok(inner) => Self::Active(inner),
            Err(err) => {
                tracing::debug!(%err, "component inactive");
                Self::Inactive(err)
            }
        }
    }
}
