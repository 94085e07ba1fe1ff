//! # Advice
//!
//! One trait per advice kind, each taking the [`JoinPoint`] plus whatever
//! that kind is allowed to see:
//!
//! | kind             | receives                                  | may change the outcome |
//! |------------------|-------------------------------------------|------------------------|
//! | `Before`         | join point                                | aborts the call on error |
//! | `Around`         | proceeding join point                     | yes |
//! | `After`          | join point                                | no |
//! | `AfterReturning` | join point, `&mut` result                 | mutates the result |
//! | `AfterThrowing`  | join point, the failure                   | no |
//!
//! Every trait has a blanket implementation for matching closures, so
//! handlers can be plain functions or structs.

use crate::{
    error::BoxError,
    join_point::{JoinPoint, ProceedingJoinPoint},
    value::{BoxValue, Value},
};
use std::{error::Error, fmt};

/// The failure observed by after-throwing advice.
pub type Failure = dyn Error + Send + Sync + 'static;

/// The kinds of advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdviceKind {
    /// Runs before the call.
    Before,
    /// Runs after a successful call, with the result.
    AfterReturning,
    /// Runs after a failed call, with the failure.
    AfterThrowing,
    /// Runs after the call whatever its outcome.
    After,
    /// Wraps the call.
    Around,
}

impl AdviceKind {
    /// Whether the kind runs on the way out of the call, in reverse aspect order.
    pub fn is_exit(self) -> bool {
        matches!(
            self,
            AdviceKind::After | AdviceKind::AfterReturning | AdviceKind::AfterThrowing
        )
    }
}

impl fmt::Display for AdviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdviceKind::Before => "@Before",
            AdviceKind::AfterReturning => "@AfterReturning",
            AdviceKind::AfterThrowing => "@AfterThrowing",
            AdviceKind::After => "@After",
            AdviceKind::Around => "@Around",
        })
    }
}

/// Advice run before the call. An error aborts the call.
pub trait BeforeAdvice: Send + Sync + 'static {
    /// Called before the around chain.
    fn before(&self, jp: &JoinPoint<'_>) -> Result<(), BoxError>;
}

impl<F> BeforeAdvice for F
where
    F: Fn(&JoinPoint<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn before(&self, jp: &JoinPoint<'_>) -> Result<(), BoxError> {
        (self)(jp)
    }
}

/// Advice wrapping the call.
///
/// Implementations either call [`ProceedingJoinPoint::proceed`] once and
/// return (or replace) its value, or return their own value or error
/// without proceeding, in which case the target never runs.
pub trait AroundAdvice: Send + Sync + 'static {
    /// Called in place of the inner chain.
    fn around(&self, pjp: &mut ProceedingJoinPoint<'_>) -> Result<BoxValue, BoxError>;
}

impl<F> AroundAdvice for F
where
    F: Fn(&mut ProceedingJoinPoint<'_>) -> Result<BoxValue, BoxError> + Send + Sync + 'static,
{
    fn around(&self, pjp: &mut ProceedingJoinPoint<'_>) -> Result<BoxValue, BoxError> {
        (self)(pjp)
    }
}

/// Advice run after the call whatever the outcome. Errors are logged only.
pub trait AfterAdvice: Send + Sync + 'static {
    /// Called once the around chain has finished.
    fn after(&self, jp: &JoinPoint<'_>) -> Result<(), BoxError>;
}

impl<F> AfterAdvice for F
where
    F: Fn(&JoinPoint<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn after(&self, jp: &JoinPoint<'_>) -> Result<(), BoxError> {
        (self)(jp)
    }
}

/// Advice run after a successful call. May mutate the result in place.
pub trait AfterReturningAdvice: Send + Sync + 'static {
    /// Called with the current result.
    fn after_returning(&self, jp: &JoinPoint<'_>, result: &mut dyn Value) -> Result<(), BoxError>;
}

impl<F> AfterReturningAdvice for F
where
    F: Fn(&JoinPoint<'_>, &mut dyn Value) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn after_returning(&self, jp: &JoinPoint<'_>, result: &mut dyn Value) -> Result<(), BoxError> {
        (self)(jp, result)
    }
}

/// Advice run after a failed call. Observes the failure; cannot suppress it.
pub trait AfterThrowingAdvice: Send + Sync + 'static {
    /// Called with the failure that will be re-raised.
    fn after_throwing(&self, jp: &JoinPoint<'_>, failure: &Failure) -> Result<(), BoxError>;
}

impl<F> AfterThrowingAdvice for F
where
    F: Fn(&JoinPoint<'_>, &Failure) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn after_throwing(&self, jp: &JoinPoint<'_>, failure: &Failure) -> Result<(), BoxError> {
        (self)(jp, failure)
    }
}

/// A handler of any kind.
pub enum Advice {
    /// See [`BeforeAdvice`].
    Before(Box<dyn BeforeAdvice>),
    /// See [`AfterReturningAdvice`].
    AfterReturning(Box<dyn AfterReturningAdvice>),
    /// See [`AfterThrowingAdvice`].
    AfterThrowing(Box<dyn AfterThrowingAdvice>),
    /// See [`AfterAdvice`].
    After(Box<dyn AfterAdvice>),
    /// See [`AroundAdvice`].
    Around(Box<dyn AroundAdvice>),
}

impl Advice {
    /// Wrap before advice.
    pub fn before(advice: impl BeforeAdvice) -> Self {
        Advice::Before(Box::new(advice))
    }

    /// Wrap after-returning advice.
    pub fn after_returning(advice: impl AfterReturningAdvice) -> Self {
        Advice::AfterReturning(Box::new(advice))
    }

    /// Wrap after-throwing advice.
    pub fn after_throwing(advice: impl AfterThrowingAdvice) -> Self {
        Advice::AfterThrowing(Box::new(advice))
    }

    /// Wrap after (finally) advice.
    pub fn after(advice: impl AfterAdvice) -> Self {
        Advice::After(Box::new(advice))
    }

    /// Wrap around advice.
    pub fn around(advice: impl AroundAdvice) -> Self {
        Advice::Around(Box::new(advice))
    }

    /// The kind of this handler.
    pub fn kind(&self) -> AdviceKind {
        match self {
            Advice::Before(_) => AdviceKind::Before,
            Advice::AfterReturning(_) => AdviceKind::AfterReturning,
            Advice::AfterThrowing(_) => AdviceKind::AfterThrowing,
            Advice::After(_) => AdviceKind::After,
            Advice::Around(_) => AdviceKind::Around,
        }
    }
}

impl fmt::Debug for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Advice({})", self.kind())
    }
}
