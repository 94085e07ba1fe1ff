//! # Interception dispatcher
//!
//! Runs the advice resolved for a call around the real target, following the
//! nested ("onion") model:
//!
//! ```text
//! PENDING -> BEFORE -> AROUND_CHAIN (-> TARGET) -> SUCCESS | FAILURE
//!         -> FINALLY -> RETURNING | THROWING -> DONE
//! ```
//!
//! All before advice runs first, in resolution order. The around chain then
//! nests each around handler over the next, with the target innermost.
//! Exit advice runs in reverse aspect order: after (finally) handlers on
//! every outcome, then after-returning handlers on success or after-throwing
//! handlers on failure.
//!
//! Interleaving before and around advice per aspect (so that an outer
//! aspect's around wraps an inner aspect's before) is not modelled.

use crate::registry::{AdviceProvider, AdviceRegistry, Applied, ResolvedAdvice};
use std::any::type_name;
use weave_core::{
    Arguments, AroundAdvice, BoxError, BoxValue, CallSignature, InvokeError, JoinPoint, Proceed,
    ProceedTracker, ProceedingJoinPoint, Value, unbox,
};

/// Executes intercepted calls against a source of advice.
///
/// # Example
///
/// ```rust
/// use weave_core::{Arguments, CallSignature, Pointcut, Value};
/// use weave_std::{aspect::Aspect, dispatcher::Dispatcher, registry::AdviceRegistry};
///
/// let registry = AdviceRegistry::builder()
///     .register(
///         Aspect::builder("Shout")
///             .after_returning(Pointcut::atom("dao", "find*"), |_, result: &mut dyn Value| {
///                 if let Some(names) = result.downcast_mut::<Vec<String>>() {
///                     names.iter_mut().for_each(|n| n.make_ascii_uppercase());
///                 }
///                 Ok(())
///             })
///             .build(),
///     )
///     .build()
///     .unwrap();
///
/// let dispatcher = Dispatcher::new(registry);
/// let sig = CallSignature::new("dao.AccountDao", "findAccounts");
/// let names = dispatcher
///     .invoke(&sig, Arguments::new(), || Ok(vec!["John".to_string()]))
///     .unwrap();
/// assert_eq!(names, ["JOHN"]);
/// ```
#[derive(Debug)]
pub struct Dispatcher<P = AdviceRegistry> {
    provider: P,
}

impl<P: AdviceProvider> Dispatcher<P> {
    /// Create a dispatcher over `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The advice provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Invoke `target` for the call described by `signature` and `args`,
    /// applying every matching advice.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::Before`] if a before handler fails; nothing else runs.
    /// - [`InvokeError::Target`] with the failure of the target (or of an
    ///   around handler that raised), after finally and after-throwing advice.
    /// - [`InvokeError::ProceedMisuse`] if an around handler proceeded twice,
    ///   carrying the chain's failure (if any) as its source. After-throwing
    ///   advice still sees that failure.
    /// - [`InvokeError::AfterReturning`] if an after-returning handler fails.
    /// - [`InvokeError::ResultType`] if around advice substituted a value of
    ///   a type other than `R`.
    pub fn invoke<R, F>(
        &self,
        signature: &CallSignature,
        args: Arguments,
        target: F,
    ) -> Result<R, InvokeError>
    where
        R: Value,
        F: FnOnce() -> Result<R, BoxError>,
    {
        let advice = self.provider.resolve(signature);
        if advice.is_empty() {
            return target().map_err(InvokeError::Target);
        }

        let jp = JoinPoint::new(signature, &args);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            signature = %signature,
            before = advice.before.len(),
            around = advice.around.len(),
            after = advice.after.len(),
            after_returning = advice.after_returning.len(),
            after_throwing = advice.after_throwing.len(),
            "dispatching intercepted call"
        );

        for applied in &advice.before {
            if let Err(source) = applied.handler.before(&jp) {
                return Err(InvokeError::Before {
                    aspect: applied.aspect.to_string(),
                    source,
                });
            }
        }

        let tracker = ProceedTracker::new();
        let target: Proceed<'_> = Box::new(move || target().map(|v| Box::new(v) as BoxValue));
        let outcome = run_chain(&advice.around, jp, target, &tracker);
        let misuse = tracker.into_misuse();

        for applied in &advice.after {
            if let Err(err) = applied.handler.after(&jp) {
                report_observer_failure("after", applied.aspect, signature, &err);
            }
        }

        if let Some(aspect) = misuse {
            let source = outcome.err();
            if let Some(failure) = &source {
                run_after_throwing(&advice, jp, failure);
            }
            return Err(InvokeError::ProceedMisuse { aspect, source });
        }

        match outcome {
            Ok(mut value) => {
                for applied in &advice.after_returning {
                    applied
                        .handler
                        .after_returning(&jp, &mut *value)
                        .map_err(|source| InvokeError::AfterReturning {
                            aspect: applied.aspect.to_string(),
                            source,
                        })?;
                }
                unbox::<R>(value).map_err(|value| InvokeError::ResultType {
                    expected: type_name::<R>(),
                    found: (*value).type_name(),
                })
            }
            Err(failure) => {
                run_after_throwing(&advice, jp, &failure);
                Err(InvokeError::Target(failure))
            }
        }
    }
}

/// Run `arounds[0]` with a `proceed` bound to the rest of the chain.
fn run_chain<'a>(
    arounds: &'a [Applied<'a, dyn AroundAdvice>],
    jp: JoinPoint<'a>,
    target: Proceed<'a>,
    tracker: &'a ProceedTracker,
) -> Result<BoxValue, BoxError> {
    let Some((outer, inner)) = arounds.split_first() else {
        return target();
    };
    let next: Proceed<'a> = Box::new(move || run_chain(inner, jp, target, tracker));
    let mut pjp = ProceedingJoinPoint::new(jp, outer.aspect, next, tracker);
    outer.handler.around(&mut pjp)
}

fn run_after_throwing(advice: &ResolvedAdvice<'_>, jp: JoinPoint<'_>, failure: &BoxError) {
    for applied in &advice.after_throwing {
        if let Err(err) = applied.handler.after_throwing(&jp, &**failure) {
            report_observer_failure("after-throwing", applied.aspect, jp.signature(), &err);
        }
    }
}

fn report_observer_failure(kind: &str, aspect: &str, signature: &CallSignature, err: &BoxError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        kind,
        aspect,
        signature = %signature,
        error = %err,
        "advice failed; call outcome unchanged"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (kind, aspect, signature, err);
}
