//! # weave-core
//!
//! Core vocabulary for the Weave interception engine.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! code that declares pointcuts or writes advice without needing the
//! registry and dispatcher from `weave-std`.
//!
//! # Building Blocks
//!
//! - [`CallSignature`]: the operation being called (package, type, method, parameters)
//! - [`Pattern`] / [`Pointcut`]: declarative predicates over signatures, with a
//!   textual form parsed by [`parse`]
//! - [`Value`] / [`Arguments`]: type-erased arguments and results
//! - [`JoinPoint`] / [`ProceedingJoinPoint`]: per-call context handed to advice
//! - [`Advice`]: before, after, after-returning, after-throwing and around handlers
//!
//! # Error Types
//!
//! - [`InvokeError`] - Outcome of a failed intercepted call
//! - [`RegistryError`] - Composition-time failures
//! - [`PointcutResolutionError`] - Unresolvable named pointcuts
//! - [`PointcutParseError`] - Malformed pointcut text

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod advice;
mod error;
mod join_point;
mod parse;
mod pattern;
mod pointcut;
mod signature;
mod value;

// Re-exports
pub use advice::{
    Advice, AdviceKind, AfterAdvice, AfterReturningAdvice, AfterThrowingAdvice, AroundAdvice,
    BeforeAdvice, Failure,
};
pub use error::{
    BoxError, InvokeError, PointcutParseError, PointcutResolutionError, ProceedError,
    RegistryError,
};
pub use join_point::{JoinPoint, Proceed, ProceedTracker, ProceedingJoinPoint};
pub use parse::parse;
pub use pattern::Pattern;
pub use pointcut::{Atom, ParamPattern, Pointcut};
pub use signature::CallSignature;
pub use value::{Arguments, BoxValue, Value, boxed, unbox};
