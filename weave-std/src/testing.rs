//! Testing utilities for Weave.
//!
//! - [`Journal`]: a shared, ordered log of what ran during a call
//! - [`RecordingAdvice`]: advice of every kind that writes to a [`Journal`]

use crate::aspect::AdviceEntry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use weave_core::{
    Advice, AfterAdvice, AfterReturningAdvice, AfterThrowingAdvice, AroundAdvice, BeforeAdvice,
    BoxError, BoxValue, Failure, JoinPoint, Pointcut, ProceedingJoinPoint, Value,
};

// ============================================================================
// Journal
// ============================================================================

/// A cloneable, thread-safe list of entries.
///
/// Clones share the same entries.
///
/// # Example
///
/// ```rust
/// use weave_std::testing::Journal;
///
/// let journal = Journal::new();
/// let writer = journal.clone();
/// writer.push("target");
/// assert_eq!(journal.entries(), ["target"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.lock().push(entry.into());
    }

    /// A snapshot of the entries.
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Before advice recording `"{name}:before"`.
    pub fn before(
        &self,
        name: &str,
    ) -> impl Fn(&JoinPoint<'_>) -> Result<(), BoxError> + Send + Sync + 'static + use<> {
        let journal = self.clone();
        let entry = format!("{name}:before");
        move |_| {
            journal.push(entry.as_str());
            Ok(())
        }
    }

    /// After advice recording `"{name}:after"`.
    pub fn after(
        &self,
        name: &str,
    ) -> impl Fn(&JoinPoint<'_>) -> Result<(), BoxError> + Send + Sync + 'static + use<> {
        let journal = self.clone();
        let entry = format!("{name}:after");
        move |_| {
            journal.push(entry.as_str());
            Ok(())
        }
    }

    /// After-returning advice recording `"{name}:after_returning"`.
    pub fn after_returning(
        &self,
        name: &str,
    ) -> impl Fn(&JoinPoint<'_>, &mut dyn Value) -> Result<(), BoxError> + Send + Sync + 'static + use<>
    {
        let journal = self.clone();
        let entry = format!("{name}:after_returning");
        move |_, _| {
            journal.push(entry.as_str());
            Ok(())
        }
    }

    /// After-throwing advice recording `"{name}:after_throwing"`.
    pub fn after_throwing(
        &self,
        name: &str,
    ) -> impl Fn(&JoinPoint<'_>, &Failure) -> Result<(), BoxError> + Send + Sync + 'static + use<> {
        let journal = self.clone();
        let entry = format!("{name}:after_throwing");
        move |_, _| {
            journal.push(entry.as_str());
            Ok(())
        }
    }

    /// Around advice recording `"{name}:around:enter"`, proceeding once, then
    /// recording `"{name}:around:exit"`.
    pub fn around(
        &self,
        name: &str,
    ) -> impl Fn(&mut ProceedingJoinPoint<'_>) -> Result<BoxValue, BoxError> + Send + Sync + 'static + use<>
    {
        let journal = self.clone();
        let enter = format!("{name}:around:enter");
        let exit = format!("{name}:around:exit");
        move |pjp| {
            journal.push(enter.as_str());
            let result = pjp.proceed();
            journal.push(exit.as_str());
            result
        }
    }
}

// ============================================================================
// Recording Advice
// ============================================================================

/// Advice of every kind that records into a [`Journal`].
///
/// Entries have the form `"{name}:{kind}"`, with around advice recording
/// `"{name}:around:enter"` and `"{name}:around:exit"`.
#[derive(Debug, Clone)]
pub struct RecordingAdvice {
    name: String,
    journal: Journal,
}

impl RecordingAdvice {
    /// Record into `journal` under `name`.
    pub fn new(name: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            journal: journal.clone(),
        }
    }

    fn record(&self, kind: &str) {
        self.journal.push(format!("{}:{kind}", self.name));
    }

    /// One entry per advice kind, all bound to `pointcut`.
    pub fn entries(&self, pointcut: impl Into<Pointcut>) -> Vec<AdviceEntry> {
        let pointcut = pointcut.into();
        vec![
            AdviceEntry::new(pointcut.clone(), Advice::before(self.clone())),
            AdviceEntry::new(pointcut.clone(), Advice::around(self.clone())),
            AdviceEntry::new(pointcut.clone(), Advice::after(self.clone())),
            AdviceEntry::new(pointcut.clone(), Advice::after_returning(self.clone())),
            AdviceEntry::new(pointcut, Advice::after_throwing(self.clone())),
        ]
    }
}

impl BeforeAdvice for RecordingAdvice {
    fn before(&self, _jp: &JoinPoint<'_>) -> Result<(), BoxError> {
        self.record("before");
        Ok(())
    }
}

impl AroundAdvice for RecordingAdvice {
    fn around(&self, pjp: &mut ProceedingJoinPoint<'_>) -> Result<BoxValue, BoxError> {
        self.record("around:enter");
        let result = pjp.proceed();
        self.record("around:exit");
        result
    }
}

impl AfterAdvice for RecordingAdvice {
    fn after(&self, _jp: &JoinPoint<'_>) -> Result<(), BoxError> {
        self.record("after");
        Ok(())
    }
}

impl AfterReturningAdvice for RecordingAdvice {
    fn after_returning(&self, _jp: &JoinPoint<'_>, _result: &mut dyn Value) -> Result<(), BoxError> {
        self.record("after_returning");
        Ok(())
    }
}

impl AfterThrowingAdvice for RecordingAdvice {
    fn after_throwing(&self, _jp: &JoinPoint<'_>, _failure: &Failure) -> Result<(), BoxError> {
        self.record("after_throwing");
        Ok(())
    }
}
