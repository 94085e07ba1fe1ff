//! Timing advice for measuring call duration.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use weave_core::{AroundAdvice, BoxError, BoxValue, CallSignature, ProceedingJoinPoint};

type Observer = Arc<dyn Fn(&CallSignature, Duration) + Send + Sync>;

/// Around advice that measures how long the rest of the chain takes.
///
/// The call always proceeds exactly once and its outcome is passed through
/// unchanged; failures are logged and re-raised. Calls slower than the
/// optional threshold are logged at warn level.
#[derive(Clone, Default)]
pub struct TimingAdvice {
    threshold: Option<Duration>,
    observer: Option<Observer>,
}

impl TimingAdvice {
    /// Create a timing advice without threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Warn when a call takes longer than `threshold`.
    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Report every measurement to `observer`.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&CallSignature, Duration) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    fn exceeded(&self, elapsed: Duration) -> bool {
        self.threshold.is_some_and(|limit| elapsed > limit)
    }
}

impl fmt::Debug for TimingAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimingAdvice")
            .field("threshold", &self.threshold)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl AroundAdvice for TimingAdvice {
    fn around(&self, pjp: &mut ProceedingJoinPoint<'_>) -> Result<BoxValue, BoxError> {
        let start = Instant::now();
        let result = pjp.proceed();
        let elapsed = start.elapsed();
        let signature = pjp.signature();

        if let Some(observer) = &self.observer {
            observer(signature, elapsed);
        }

        #[cfg(feature = "tracing")]
        {
            let method = signature.to_short_string();
            match &result {
                Err(err) => tracing::warn!(%method, ?elapsed, error = %err, "call failed"),
                Ok(_) if self.exceeded(elapsed) => {
                    tracing::warn!(%method, ?elapsed, "call exceeded threshold")
                }
                Ok(_) => tracing::info!(%method, ?elapsed, "call completed"),
            }
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = self.exceeded(elapsed);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use weave_core::{Arguments, JoinPoint, ProceedTracker, boxed, unbox};

    #[test]
    fn test_passes_outcome_through_and_reports() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let advice = TimingAdvice::new()
            .with_threshold(Duration::from_secs(60))
            .with_observer(move |sig, _| s.lock().unwrap().push(sig.method().to_string()));

        let sig = CallSignature::new("service.TrafficFortuneService", "getFortune");
        let args = Arguments::new();
        let tracker = ProceedTracker::new();
        let mut pjp = ProceedingJoinPoint::new(
            JoinPoint::new(&sig, &args),
            "Timing",
            Box::new(|| Ok(boxed("Expect heavy traffic this morning"))),
            &tracker,
        );

        let out = advice.around(&mut pjp).unwrap();
        assert_eq!(
            unbox::<&str>(out).unwrap(),
            "Expect heavy traffic this morning"
        );
        assert_eq!(*seen.lock().unwrap(), ["getFortune"]);
        assert!(!advice.exceeded(Duration::from_secs(1)));
        assert!(advice.exceeded(Duration::from_secs(61)));
    }

    #[test]
    fn test_failure_is_reraised() {
        let sig = CallSignature::new("service.TrafficFortuneService", "getFortune");
        let args = Arguments::new();
        let tracker = ProceedTracker::new();
        let mut pjp = ProceedingJoinPoint::new(
            JoinPoint::new(&sig, &args),
            "Timing",
            Box::new(|| Err("Major accident! Highway is closed!".into())),
            &tracker,
        );

        let err = TimingAdvice::new().around(&mut pjp).unwrap_err();
        assert_eq!(err.to_string(), "Major accident! Highway is closed!");
        drop(pjp);
        assert_eq!(tracker.into_misuse(), None);
    }
}
