//! Error types for Weave.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`InvokeError`] - Errors surfaced by a single intercepted call
//! - [`RegistryError`] - Errors while composing the advice registry
//! - [`PointcutResolutionError`] - Named pointcut references that cannot be resolved
//! - [`PointcutParseError`] - Malformed pointcut expressions
//! - [`ProceedError`] - Misuse of [`ProceedingJoinPoint::proceed`]
//!
//! [`ProceedingJoinPoint::proceed`]: crate::ProceedingJoinPoint::proceed

use thiserror::Error;

/// A boxed error type for failures raised by targets and advice.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned from an intercepted invocation.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// A before-advice handler failed; the target was never called.
    #[error("before advice of aspect `{aspect}` failed: {source}")]
    Before {
        /// Aspect owning the failing advice.
        aspect: String,
        /// The handler's error, unchanged.
        #[source]
        source: BoxError,
    },

    /// The join point chain raised: either the target itself or an around
    /// handler that chose to raise.
    #[error(transparent)]
    Target(BoxError),

    /// An around handler called `proceed()` more than once.
    #[error("around advice of aspect `{aspect}` proceeded more than once")]
    ProceedMisuse {
        /// Aspect owning the misbehaving advice.
        aspect: String,
        /// Failure the chain ended with, if it did not complete normally.
        #[source]
        source: Option<BoxError>,
    },

    /// An after-returning handler failed after the target succeeded.
    #[error("after-returning advice of aspect `{aspect}` failed: {source}")]
    AfterReturning {
        /// Aspect owning the failing advice.
        aspect: String,
        /// The handler's error, unchanged.
        #[source]
        source: BoxError,
    },

    /// The value produced by the chain is not of the type the caller expects.
    #[error("intercepted call produced `{found}`, expected `{expected}`")]
    ResultType {
        /// Type the caller asked for.
        expected: &'static str,
        /// Type name reported by the produced value.
        found: &'static str,
    },
}

impl InvokeError {
    /// Returns the failure raised by the join point chain, if that is what this is.
    pub fn as_target(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            InvokeError::Target(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Consumes the error, returning the chain failure if that is what this is.
    pub fn into_target(self) -> Result<BoxError, Self> {
        match self {
            InvokeError::Target(err) => Ok(err),
            other => Err(other),
        }
    }
}

/// A named pointcut reference could not be resolved while building.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointcutResolutionError {
    /// No definition exists for the name.
    #[error("unresolved pointcut reference `{0}`")]
    Unresolved(String),

    /// A definition refers back to itself through named references.
    #[error("cyclic pointcut definition through `{0}`")]
    Cycle(String),

    /// The same name was defined twice.
    #[error("pointcut `{0}` is already defined")]
    Duplicate(String),
}

/// A pointcut expression could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid pointcut at offset {offset}: {message}")]
pub struct PointcutParseError {
    /// Byte offset into the source expression.
    pub offset: usize,
    /// What went wrong.
    pub message: String,
}

impl PointcutParseError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Errors that can occur while composing an advice registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An advice pointcut refers to an unknown or cyclic definition.
    #[error("aspect `{aspect}`: {source}")]
    Resolution {
        /// Aspect whose advice failed validation.
        aspect: String,
        /// The underlying resolution failure.
        #[source]
        source: PointcutResolutionError,
    },

    /// A pointcut definition failed validation.
    #[error(transparent)]
    Definition(#[from] PointcutResolutionError),

    /// A textual pointcut failed to parse.
    #[error(transparent)]
    Parse(#[from] PointcutParseError),

    /// Two aspects were registered under the same name.
    #[error("aspect `{0}` is already registered")]
    DuplicateAspect(String),
}

/// Errors returned by [`ProceedingJoinPoint::proceed`].
///
/// [`ProceedingJoinPoint::proceed`]: crate::ProceedingJoinPoint::proceed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProceedError {
    /// `proceed()` was already called for this around invocation.
    #[error("proceed() called more than once")]
    AlreadyProceeded,
}
