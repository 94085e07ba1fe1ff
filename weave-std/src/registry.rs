//! Registry module for advice management.
//!
//! This module provides a builder for registering aspects and a frozen
//! registry for immutable, thread-safe resolution of the advice applying to
//! a call.

use crate::{
    aspect::{AdviceEntry, Aspect},
    matcher::PointcutMatcher,
};
use std::{collections::HashSet, fmt, sync::Arc};
use weave_core::{
    Advice, AfterAdvice, AfterReturningAdvice, AfterThrowingAdvice, AroundAdvice, BeforeAdvice,
    CallSignature, RegistryError,
};

/// A handler selected for a call, with the aspect it belongs to.
pub struct Applied<'a, A: ?Sized> {
    /// Owning aspect name.
    pub aspect: &'a str,
    /// The handler.
    pub handler: &'a A,
}

impl<A: ?Sized> Clone for Applied<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ?Sized> Copy for Applied<'_, A> {}

impl<A: ?Sized> fmt::Debug for Applied<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Applied").field("aspect", &self.aspect).finish()
    }
}

/// The advice applying to one call, grouped by kind and in execution order.
///
/// `before` and `around` are ordered by ascending aspect precedence;
/// `after`, `after_returning` and `after_throwing` by descending precedence.
/// Within one aspect, declaration order is kept in every list.
#[derive(Debug, Default)]
pub struct ResolvedAdvice<'a> {
    /// Before advice, outermost first.
    pub before: Vec<Applied<'a, dyn BeforeAdvice>>,
    /// Around advice, outermost first.
    pub around: Vec<Applied<'a, dyn AroundAdvice>>,
    /// After (finally) advice, innermost aspect first.
    pub after: Vec<Applied<'a, dyn AfterAdvice>>,
    /// After-returning advice, innermost aspect first.
    pub after_returning: Vec<Applied<'a, dyn AfterReturningAdvice>>,
    /// After-throwing advice, innermost aspect first.
    pub after_throwing: Vec<Applied<'a, dyn AfterThrowingAdvice>>,
}

impl ResolvedAdvice<'_> {
    /// Total number of handlers.
    pub fn len(&self) -> usize {
        self.before.len()
            + self.around.len()
            + self.after.len()
            + self.after_returning.len()
            + self.after_throwing.len()
    }

    /// Whether no advice applies.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A source of advice for calls.
///
/// This trait abstracts where the dispatcher's advice comes from; the
/// standard implementation is [`AdviceRegistry`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid AdviceProvider",
    label = "missing `AdviceProvider` implementation",
    note = "Implement `AdviceProvider` to resolve advice for call signatures."
)]
pub trait AdviceProvider: Send + Sync {
    /// Resolve the advice applying to `signature`, in execution order.
    fn resolve<'a>(&'a self, signature: &CallSignature) -> ResolvedAdvice<'a>;
}

impl<P: AdviceProvider + ?Sized> AdviceProvider for Arc<P> {
    fn resolve<'a>(&'a self, signature: &CallSignature) -> ResolvedAdvice<'a> {
        (**self).resolve(signature)
    }
}

// ============================================================================
// AdviceRegistryBuilder - for composing registries
// ============================================================================

/// Builder for constructing an [`AdviceRegistry`].
///
/// Register aspects, then call `.build()` to validate every pointcut and
/// freeze the registry. No registration is possible afterwards.
///
/// # Example
/// ```rust
/// use weave_core::Pointcut;
/// use weave_std::{aspect::Aspect, matcher::PointcutMatcher, registry::AdviceRegistryBuilder};
///
/// let matcher = PointcutMatcher::builder()
///     .define("forDao", Pointcut::atom("com.example.dao", "*"))
///     .build()
///     .unwrap();
///
/// let registry = AdviceRegistryBuilder::new()
///     .with_matcher(matcher)
///     .register(
///         Aspect::builder("Logging")
///             .order(1)
///             .before(Pointcut::named("forDao"), |_| Ok(()))
///             .build(),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AdviceRegistryBuilder {
    matcher: PointcutMatcher,
    aspects: Vec<Aspect>,
}

impl AdviceRegistryBuilder {
    /// Create an empty builder with no named pointcuts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `matcher` (and its named definitions) for this registry.
    pub fn with_matcher(mut self, matcher: PointcutMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Register an aspect.
    pub fn register(mut self, aspect: Aspect) -> Self {
        self.register_mut(aspect);
        self
    }

    /// Register an aspect (mutable version).
    pub fn register_mut(&mut self, aspect: Aspect) {
        self.aspects.push(aspect);
    }

    /// Register an aspect from its parts.
    pub fn register_aspect(
        self,
        name: impl Into<String>,
        precedence: i32,
        entries: impl IntoIterator<Item = AdviceEntry>,
    ) -> Self {
        self.register(Aspect::new(name, precedence, entries))
    }

    /// Register every aspect submitted with `inventory::submit!`.
    #[cfg(feature = "inventory")]
    pub fn with_collected(mut self) -> Self {
        for registration in inventory::iter::<crate::collected::AspectRegistration> {
            self.register_mut((registration.factory)());
        }
        self
    }

    /// Get the number of registered aspects.
    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    /// Check if the builder has no aspects.
    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }

    /// Validate and build the immutable registry.
    ///
    /// Fails if two aspects share a name or if any advice pointcut refers to
    /// a name the matcher does not define. Aspects are then sorted by
    /// precedence; equal precedence keeps registration order.
    pub fn build(mut self) -> Result<AdviceRegistry, RegistryError> {
        {
            let mut names = HashSet::with_capacity(self.aspects.len());
            for aspect in &self.aspects {
                if !names.insert(aspect.name()) {
                    return Err(RegistryError::DuplicateAspect(aspect.name().to_string()));
                }
                for entry in aspect.entries() {
                    self.matcher
                        .validate(entry.pointcut())
                        .map_err(|source| RegistryError::Resolution {
                            aspect: aspect.name().to_string(),
                            source,
                        })?;
                }
            }
        }

        // Stable: equal precedence keeps registration order
        self.aspects.sort_by_key(Aspect::precedence);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            aspects = self.aspects.len(),
            definitions = self.matcher.len(),
            "advice registry built"
        );

        Ok(AdviceRegistry {
            matcher: self.matcher,
            aspects: self.aspects,
        })
    }
}

// ============================================================================
// AdviceRegistry - immutable, thread-safe advice storage
// ============================================================================

/// An immutable, thread-safe registry of aspects.
///
/// Created by [`AdviceRegistryBuilder::build`]. Resolution only reads, so a
/// registry can be shared via `Arc` by any number of in-flight calls.
#[derive(Debug)]
pub struct AdviceRegistry {
    matcher: PointcutMatcher,
    aspects: Vec<Aspect>,
}

impl AdviceRegistry {
    /// Start composing a registry.
    pub fn builder() -> AdviceRegistryBuilder {
        AdviceRegistryBuilder::new()
    }

    /// The aspects in ascending precedence.
    pub fn aspects(&self) -> &[Aspect] {
        &self.aspects
    }

    /// The matcher holding the named definitions.
    pub fn matcher(&self) -> &PointcutMatcher {
        &self.matcher
    }

    /// Get the number of registered aspects.
    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }
}

impl AdviceProvider for AdviceRegistry {
    fn resolve<'a>(&'a self, signature: &CallSignature) -> ResolvedAdvice<'a> {
        let mut resolved = ResolvedAdvice::default();

        for aspect in &self.aspects {
            let name = aspect.name();
            let matching = aspect
                .entries()
                .iter()
                .filter(|entry| self.matcher.matches(entry.pointcut(), signature));
            for entry in matching {
                match entry.advice() {
                    Advice::Before(h) => resolved.before.push(Applied {
                        aspect: name,
                        handler: &**h,
                    }),
                    Advice::Around(h) => resolved.around.push(Applied {
                        aspect: name,
                        handler: &**h,
                    }),
                    _ => {}
                }
            }
        }

        for aspect in self.aspects.iter().rev() {
            let name = aspect.name();
            let matching = aspect
                .entries()
                .iter()
                .filter(|entry| self.matcher.matches(entry.pointcut(), signature));
            for entry in matching {
                match entry.advice() {
                    Advice::After(h) => resolved.after.push(Applied {
                        aspect: name,
                        handler: &**h,
                    }),
                    Advice::AfterReturning(h) => resolved.after_returning.push(Applied {
                        aspect: name,
                        handler: &**h,
                    }),
                    Advice::AfterThrowing(h) => resolved.after_throwing.push(Applied {
                        aspect: name,
                        handler: &**h,
                    }),
                    _ => {}
                }
            }
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{Pointcut, PointcutResolutionError};

    fn noop_aspect(name: &str, precedence: i32) -> Aspect {
        Aspect::builder(name)
            .order(precedence)
            .before(Pointcut::atom("dao", "*"), |_| Ok(()))
            .around(Pointcut::atom("dao", "*"), |pjp| pjp.proceed())
            .after(Pointcut::atom("dao", "*"), |_| Ok(()))
            .after_returning(Pointcut::atom("dao", "*"), |_, _| Ok(()))
            .after_throwing(Pointcut::atom("dao", "*"), |_, _| Ok(()))
            .build()
    }

    fn aspects<A: ?Sized>(list: &[Applied<'_, A>]) -> Vec<String> {
        list.iter().map(|a| a.aspect.to_string()).collect()
    }

    #[test]
    fn test_onion_ordering() {
        let registry = AdviceRegistry::builder()
            .register(noop_aspect("Second", 2))
            .register(noop_aspect("First", 1))
            .build()
            .unwrap();

        let resolved = registry.resolve(&CallSignature::new("dao.AccountDao", "findAccounts"));
        assert_eq!(aspects(&resolved.before), ["First", "Second"]);
        assert_eq!(aspects(&resolved.around), ["First", "Second"]);
        assert_eq!(aspects(&resolved.after), ["Second", "First"]);
        assert_eq!(aspects(&resolved.after_returning), ["Second", "First"]);
        assert_eq!(aspects(&resolved.after_throwing), ["Second", "First"]);
        assert_eq!(resolved.len(), 10);
    }

    #[test]
    fn test_equal_precedence_keeps_registration_order() {
        let registry = AdviceRegistry::builder()
            .register(noop_aspect("A", 0))
            .register(noop_aspect("B", 0))
            .build()
            .unwrap();

        let resolved = registry.resolve(&CallSignature::new("dao.AccountDao", "doWork"));
        assert_eq!(aspects(&resolved.before), ["A", "B"]);
        assert_eq!(aspects(&resolved.after), ["B", "A"]);
    }

    #[test]
    fn test_unmatched_call_resolves_nothing() {
        let registry = AdviceRegistry::builder()
            .register(noop_aspect("A", 0))
            .build()
            .unwrap();

        let resolved = registry.resolve(&CallSignature::new("service.Fortune", "getFortune"));
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_unresolved_advice_pointcut_fails_build() {
        let err = AdviceRegistry::builder()
            .register(
                Aspect::builder("Logging")
                    .before(Pointcut::named("forDaoPackage"), |_| Ok(()))
                    .build(),
            )
            .build()
            .unwrap_err();

        match err {
            RegistryError::Resolution { aspect, source } => {
                assert_eq!(aspect, "Logging");
                assert_eq!(
                    source,
                    PointcutResolutionError::Unresolved("forDaoPackage".into())
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_aspect_fails_build() {
        let err = AdviceRegistry::builder()
            .register(noop_aspect("A", 0))
            .register_aspect("A", 1, Vec::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAspect(name) if name == "A"));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AdviceRegistry>();
        assert_send_sync::<Arc<AdviceRegistry>>();
    }
}
