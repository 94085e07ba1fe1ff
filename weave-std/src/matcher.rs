//! Pointcut evaluation with named definitions.

use std::collections::HashMap;
use weave_core::{CallSignature, Pointcut, PointcutResolutionError};

/// Evaluates [`Pointcut`] expressions against call signatures.
///
/// The matcher owns the named definitions that `Pointcut::Named` nodes refer
/// to. Definitions are validated when the matcher is built: every reference
/// must resolve and no definition may reach itself. Matching is then a pure,
/// total function of the expression and the signature.
///
/// # Example
///
/// ```rust
/// use weave_core::{CallSignature, Pointcut};
/// use weave_std::matcher::PointcutMatcher;
///
/// let matcher = PointcutMatcher::builder()
///     .define("forDao", Pointcut::atom("com.example.dao", "*"))
///     .define("getter", Pointcut::atom("com.example.dao", "get*"))
///     .build()
///     .unwrap();
///
/// let no_getters = Pointcut::named("forDao") & !Pointcut::named("getter");
/// let add = CallSignature::new("com.example.dao.AccountDao", "addAccount");
/// let get = CallSignature::new("com.example.dao.AccountDao", "getName");
/// assert!(matcher.matches(&no_getters, &add));
/// assert!(!matcher.matches(&no_getters, &get));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PointcutMatcher {
    definitions: HashMap<String, Pointcut>,
}

impl PointcutMatcher {
    /// Start defining named pointcuts.
    pub fn builder() -> PointcutMatcherBuilder {
        PointcutMatcherBuilder::new()
    }

    /// A matcher without definitions; only reference-free expressions validate.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a definition.
    pub fn definition(&self, name: &str) -> Option<&Pointcut> {
        self.definitions.get(name)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether there are no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Check that every reference in `expr` resolves.
    ///
    /// Definitions themselves were checked for cycles at build time, so a
    /// validated expression always evaluates without recursion through names.
    pub fn validate(&self, expr: &Pointcut) -> Result<(), PointcutResolutionError> {
        match expr
            .references()
            .into_iter()
            .find(|name| !self.definitions.contains_key(*name))
        {
            Some(missing) => Err(PointcutResolutionError::Unresolved(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Evaluate `expr` for `signature`.
    ///
    /// `And` stops at the first false side and `Or` at the first true side.
    /// An unresolved name evaluates to `false`; [`validate`](Self::validate)
    /// rejects such expressions before they reach dispatch.
    pub fn matches(&self, expr: &Pointcut, signature: &CallSignature) -> bool {
        match expr {
            Pointcut::Atom(atom) => atom.matches(signature),
            Pointcut::And(l, r) => self.matches(l, signature) && self.matches(r, signature),
            Pointcut::Or(l, r) => self.matches(l, signature) || self.matches(r, signature),
            Pointcut::Not(inner) => !self.matches(inner, signature),
            Pointcut::Named(name) => self
                .definitions
                .get(name)
                .is_some_and(|def| self.matches(def, signature)),
        }
    }
}

/// Builder for [`PointcutMatcher`].
#[derive(Debug, Default)]
pub struct PointcutMatcherBuilder {
    definitions: Vec<(String, Pointcut)>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl PointcutMatcherBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a named pointcut.
    pub fn define(mut self, name: impl Into<String>, pointcut: impl Into<Pointcut>) -> Self {
        self.define_mut(name, pointcut);
        self
    }

    /// Define a named pointcut (mutable version).
    pub fn define_mut(&mut self, name: impl Into<String>, pointcut: impl Into<Pointcut>) {
        self.definitions.push((name.into(), pointcut.into()));
    }

    /// Validate the definitions and build the matcher.
    ///
    /// Fails on duplicate names, references to undefined names, and cycles.
    pub fn build(self) -> Result<PointcutMatcher, PointcutResolutionError> {
        let mut definitions = HashMap::with_capacity(self.definitions.len());
        let mut order = Vec::with_capacity(self.definitions.len());
        for (name, pointcut) in self.definitions {
            if definitions.contains_key(&name) {
                return Err(PointcutResolutionError::Duplicate(name));
            }
            order.push(name.clone());
            definitions.insert(name, pointcut);
        }

        {
            let mut marks = HashMap::new();
            for name in &order {
                visit(name, &definitions, &mut marks)?;
            }
        }

        Ok(PointcutMatcher { definitions })
    }
}

fn visit<'a>(
    name: &'a str,
    definitions: &'a HashMap<String, Pointcut>,
    marks: &mut HashMap<&'a str, Mark>,
) -> Result<(), PointcutResolutionError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => return Err(PointcutResolutionError::Cycle(name.to_string())),
        None => {}
    }

    let Some(def) = definitions.get(name) else {
        return Err(PointcutResolutionError::Unresolved(name.to_string()));
    };

    marks.insert(name, Mark::Visiting);
    for reference in def.references() {
        visit(reference, definitions, marks)?;
    }
    marks.insert(name, Mark::Done);
    Ok(())
}
