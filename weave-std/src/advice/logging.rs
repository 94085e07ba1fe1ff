//! Logging advice for call observation.

use crate::aspect::AdviceEntry;
use weave_core::{
    Advice, AfterAdvice, AfterReturningAdvice, AfterThrowingAdvice, BeforeAdvice, BoxError,
    Failure, JoinPoint, Pointcut, Value,
};

/// Advice that logs intercepted calls.
///
/// Implements every observing advice kind; it never alters arguments,
/// results or failures. With the `tracing` feature disabled it does nothing.
#[derive(Debug, Clone, Default)]
pub struct LoggingAdvice {
    label: Option<String>,
}

impl LoggingAdvice {
    /// Create an unlabelled logging advice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging advice whose events carry `label`.
    pub fn named(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    /// The label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// One entry per observing kind, all bound to `pointcut`.
    pub fn entries(&self, pointcut: impl Into<Pointcut>) -> Vec<AdviceEntry> {
        let pointcut = pointcut.into();
        vec![
            AdviceEntry::new(pointcut.clone(), Advice::before(self.clone())),
            AdviceEntry::new(pointcut.clone(), Advice::after(self.clone())),
            AdviceEntry::new(pointcut.clone(), Advice::after_returning(self.clone())),
            AdviceEntry::new(pointcut, Advice::after_throwing(self.clone())),
        ]
    }
}

impl BeforeAdvice for LoggingAdvice {
    fn before(&self, jp: &JoinPoint<'_>) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                label = self.label(),
                method = %jp.signature(),
                args = ?jp.args(),
                "executing @Before advice"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = jp;
        }
        Ok(())
    }
}

impl AfterAdvice for LoggingAdvice {
    fn after(&self, jp: &JoinPoint<'_>) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                label = self.label(),
                method = %jp.signature().to_short_string(),
                "executing @After (finally) advice"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = jp;
        }
        Ok(())
    }
}

impl AfterReturningAdvice for LoggingAdvice {
    fn after_returning(&self, jp: &JoinPoint<'_>, result: &mut dyn Value) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                label = self.label(),
                method = %jp.signature().to_short_string(),
                ?result,
                "executing @AfterReturning advice"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = (jp, result);
        }
        Ok(())
    }
}

impl AfterThrowingAdvice for LoggingAdvice {
    fn after_throwing(&self, jp: &JoinPoint<'_>, failure: &Failure) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!(
                label = self.label(),
                method = %jp.signature().to_short_string(),
                error = %failure,
                "executing @AfterThrowing advice"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = (jp, failure);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{AdviceKind, Arguments, CallSignature, args};

    #[test]
    fn test_entries_cover_observing_kinds() {
        let kinds: Vec<_> = LoggingAdvice::named("demo")
            .entries(Pointcut::atom("*", "*"))
            .iter()
            .map(AdviceEntry::kind)
            .collect();
        assert_eq!(
            kinds,
            [
                AdviceKind::Before,
                AdviceKind::After,
                AdviceKind::AfterReturning,
                AdviceKind::AfterThrowing,
            ]
        );
    }

    #[test]
    fn test_logging_never_alters_result() {
        let sig = CallSignature::new("dao.AccountDao", "findAccounts");
        let args: Arguments = args![true];
        let jp = JoinPoint::new(&sig, &args);
        let advice = LoggingAdvice::new();

        let mut result = vec![1, 2, 3];
        advice.before(&jp).unwrap();
        advice.after_returning(&jp, &mut result).unwrap();
        advice.after(&jp).unwrap();
        assert_eq!(result, [1, 2, 3]);
        assert_eq!(advice.label(), None);
    }
}
