//! # Join points
//!
//! A [`JoinPoint`] is the per-call context handed to advice: the signature
//! being invoked and a read-only view of its arguments. Around advice
//! receives a [`ProceedingJoinPoint`] instead, which can additionally run the
//! rest of the chain exactly once.

use crate::{
    error::{BoxError, ProceedError},
    signature::CallSignature,
    value::{Arguments, BoxValue},
};
use std::{cell::RefCell, fmt, ops::Deref};

/// The context of a single intercepted call.
#[derive(Debug, Clone, Copy)]
pub struct JoinPoint<'a> {
    signature: &'a CallSignature,
    args: &'a Arguments,
}

impl<'a> JoinPoint<'a> {
    /// Create a join point for a call.
    pub fn new(signature: &'a CallSignature, args: &'a Arguments) -> Self {
        Self { signature, args }
    }

    /// The signature being invoked.
    pub fn signature(&self) -> &'a CallSignature {
        self.signature
    }

    /// The call arguments.
    pub fn args(&self) -> &'a Arguments {
        self.args
    }
}

/// The remainder of an around chain: inner around advice, then the target.
pub type Proceed<'a> = Box<dyn FnOnce() -> Result<BoxValue, BoxError> + 'a>;

/// Records `proceed()` misuse across every layer of one around chain.
///
/// An outer handler may swallow the error an inner handler's misuse
/// produced, so the dispatcher checks the tracker instead of the outcome.
#[derive(Debug, Default)]
pub struct ProceedTracker {
    misused_by: RefCell<Option<String>>,
}

impl ProceedTracker {
    /// A tracker with no misuse recorded.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, aspect: &str) {
        self.misused_by
            .borrow_mut()
            .get_or_insert_with(|| aspect.to_string());
    }

    /// The aspect that first proceeded twice, if any.
    pub fn into_misuse(self) -> Option<String> {
        self.misused_by.into_inner()
    }
}

/// Join point handed to around advice.
///
/// Dereferences to [`JoinPoint`] for the signature and arguments.
pub struct ProceedingJoinPoint<'a> {
    join_point: JoinPoint<'a>,
    aspect: &'a str,
    next: Option<Proceed<'a>>,
    tracker: &'a ProceedTracker,
}

impl<'a> ProceedingJoinPoint<'a> {
    /// Wrap `next` for the around advice owned by `aspect`.
    pub fn new(
        join_point: JoinPoint<'a>,
        aspect: &'a str,
        next: Proceed<'a>,
        tracker: &'a ProceedTracker,
    ) -> Self {
        Self {
            join_point,
            aspect,
            next: Some(next),
            tracker,
        }
    }

    /// The plain join point.
    pub fn join_point(&self) -> JoinPoint<'a> {
        self.join_point
    }

    /// Name of the aspect whose advice holds this join point.
    pub fn aspect(&self) -> &'a str {
        self.aspect
    }

    /// Whether `proceed()` has been called.
    pub fn has_proceeded(&self) -> bool {
        self.next.is_none()
    }

    /// Run the next layer (inner around advice or the target) and return its
    /// outcome.
    ///
    /// May be called at most once. A second call returns
    /// [`ProceedError::AlreadyProceeded`] and the whole invocation is reported
    /// as misuse, whatever the handler does with the error.
    pub fn proceed(&mut self) -> Result<BoxValue, BoxError> {
        match self.next.take() {
            Some(next) => next(),
            None => {
                self.tracker.record(self.aspect);
                Err(Box::new(ProceedError::AlreadyProceeded))
            }
        }
    }
}

impl<'a> Deref for ProceedingJoinPoint<'a> {
    type Target = JoinPoint<'a>;

    fn deref(&self) -> &Self::Target {
        &self.join_point
    }
}

impl fmt::Debug for ProceedingJoinPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProceedingJoinPoint")
            .field("join_point", &self.join_point)
            .field("aspect", &self.aspect)
            .field("proceeded", &self.has_proceeded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::boxed;

    #[test]
    fn test_proceed_once() {
        let sig = CallSignature::new("svc.Fortune", "getFortune");
        let args = Arguments::new();
        let tracker = ProceedTracker::new();
        let mut pjp = ProceedingJoinPoint::new(
            JoinPoint::new(&sig, &args),
            "Timing",
            Box::new(|| Ok(boxed("sunny"))),
            &tracker,
        );

        assert!(!pjp.has_proceeded());
        let out = pjp.proceed().unwrap();
        assert_eq!(out.downcast_ref::<&str>(), Some(&"sunny"));
        assert!(pjp.has_proceeded());
        assert_eq!(pjp.signature().method(), "getFortune");
        drop(pjp);
        assert_eq!(tracker.into_misuse(), None);
    }

    #[test]
    fn test_second_proceed_is_recorded() {
        let sig = CallSignature::new("svc.Fortune", "getFortune");
        let args = Arguments::new();
        let tracker = ProceedTracker::new();
        let mut pjp = ProceedingJoinPoint::new(
            JoinPoint::new(&sig, &args),
            "Timing",
            Box::new(|| Ok(boxed(()))),
            &tracker,
        );

        pjp.proceed().unwrap();
        let err = pjp.proceed().unwrap_err();
        assert!(err.downcast_ref::<ProceedError>().is_some());
        drop(pjp);
        assert_eq!(tracker.into_misuse().as_deref(), Some("Timing"));
    }

    #[test]
    fn test_tracker_debug_shows_first_misuser() {
        let tracker = ProceedTracker::new();
        assert_eq!(
            format!("{tracker:?}"),
            "ProceedTracker { misused_by: RefCell { value: None } }"
        );

        tracker.record("Outer");
        tracker.record("Inner");
        assert!(format!("{tracker:?}").contains("Some(\"Outer\")"));
        assert_eq!(tracker.into_misuse().as_deref(), Some("Outer"));
    }
}
