//! Aspects: named, ordered groups of advice.

use weave_core::{
    Advice, AdviceKind, BoxError, BoxValue, Failure, JoinPoint, Pointcut, ProceedingJoinPoint,
    Value,
};

/// A handler bound to the pointcut selecting the calls it applies to.
#[derive(Debug)]
pub struct AdviceEntry {
    pointcut: Pointcut,
    advice: Advice,
}

impl AdviceEntry {
    /// Bind `advice` to `pointcut`.
    pub fn new(pointcut: impl Into<Pointcut>, advice: Advice) -> Self {
        Self {
            pointcut: pointcut.into(),
            advice,
        }
    }

    /// The selecting pointcut.
    pub fn pointcut(&self) -> &Pointcut {
        &self.pointcut
    }

    /// The handler.
    pub fn advice(&self) -> &Advice {
        &self.advice
    }

    /// The handler's kind.
    pub fn kind(&self) -> AdviceKind {
        self.advice.kind()
    }
}

/// A named group of advice with a precedence.
///
/// Lower precedence runs first on the way in (before, around) and last on
/// the way out (after, after-returning, after-throwing). Entries keep their
/// declaration order.
#[derive(Debug)]
pub struct Aspect {
    name: String,
    precedence: i32,
    entries: Vec<AdviceEntry>,
}

impl Aspect {
    /// Create an aspect from prepared entries.
    pub fn new(
        name: impl Into<String>,
        precedence: i32,
        entries: impl IntoIterator<Item = AdviceEntry>,
    ) -> Self {
        Self {
            name: name.into(),
            precedence,
            entries: entries.into_iter().collect(),
        }
    }

    /// Start building an aspect with precedence 0.
    pub fn builder(name: impl Into<String>) -> AspectBuilder {
        AspectBuilder::new(name)
    }

    /// The aspect name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The aspect precedence.
    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    /// The entries, in declaration order.
    pub fn entries(&self) -> &[AdviceEntry] {
        &self.entries
    }
}

/// Builder for [`Aspect`].
///
/// The kind-specific methods take closures directly so their argument types
/// are inferred; use [`advise`](Self::advise) for handler structs.
///
/// # Example
///
/// ```rust
/// use weave_core::Pointcut;
/// use weave_std::aspect::Aspect;
///
/// let aspect = Aspect::builder("MyDemoLoggingAspect")
///     .order(2)
///     .before(Pointcut::atom("com.example.dao", "add*"), |jp| {
///         println!("before {}", jp.signature());
///         Ok(())
///     })
///     .around(Pointcut::atom("com.example.service", "get*"), |pjp| pjp.proceed())
///     .build();
///
/// assert_eq!(aspect.entries().len(), 2);
/// assert_eq!(aspect.precedence(), 2);
/// ```
#[derive(Debug)]
pub struct AspectBuilder {
    name: String,
    precedence: i32,
    entries: Vec<AdviceEntry>,
}

impl AspectBuilder {
    /// Create a builder with precedence 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            precedence: 0,
            entries: Vec::new(),
        }
    }

    /// Set the precedence (lower = outermost).
    pub fn order(mut self, precedence: i32) -> Self {
        self.precedence = precedence;
        self
    }

    /// Add a prepared handler.
    pub fn advise(mut self, pointcut: impl Into<Pointcut>, advice: Advice) -> Self {
        self.entries.push(AdviceEntry::new(pointcut, advice));
        self
    }

    /// Add before advice.
    pub fn before<F>(self, pointcut: impl Into<Pointcut>, handler: F) -> Self
    where
        F: Fn(&JoinPoint<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.advise(pointcut, Advice::before(handler))
    }

    /// Add after (finally) advice.
    pub fn after<F>(self, pointcut: impl Into<Pointcut>, handler: F) -> Self
    where
        F: Fn(&JoinPoint<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.advise(pointcut, Advice::after(handler))
    }

    /// Add after-returning advice.
    pub fn after_returning<F>(self, pointcut: impl Into<Pointcut>, handler: F) -> Self
    where
        F: Fn(&JoinPoint<'_>, &mut dyn Value) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.advise(pointcut, Advice::after_returning(handler))
    }

    /// Add after-throwing advice.
    pub fn after_throwing<F>(self, pointcut: impl Into<Pointcut>, handler: F) -> Self
    where
        F: Fn(&JoinPoint<'_>, &Failure) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.advise(pointcut, Advice::after_throwing(handler))
    }

    /// Add around advice.
    pub fn around<F>(self, pointcut: impl Into<Pointcut>, handler: F) -> Self
    where
        F: Fn(&mut ProceedingJoinPoint<'_>) -> Result<BoxValue, BoxError> + Send + Sync + 'static,
    {
        self.advise(pointcut, Advice::around(handler))
    }

    /// Finish the aspect.
    pub fn build(self) -> Aspect {
        Aspect {
            name: self.name,
            precedence: self.precedence,
            entries: self.entries,
        }
    }
}
