//! # Pointcut expressions
//!
//! A [`Pointcut`] is a boolean predicate over a [`CallSignature`], built from
//! [`Atom`] leaves combined with `&`, `|` and `!`. Named references let one
//! definition reuse another; they are resolved by a matcher that owns the
//! definitions, never by the expression itself.
//!
//! ```rust
//! use weave_core::Pointcut;
//!
//! let for_dao = Pointcut::named("forDaoPackage");
//! let getter = Pointcut::named("getter");
//! let setter = Pointcut::named("setter");
//!
//! let no_accessors = for_dao & !(getter | setter);
//! assert_eq!(
//!     no_accessors.to_string(),
//!     "(forDaoPackage() && !(getter() || setter()))"
//! );
//! ```

use crate::{pattern::Pattern, signature::CallSignature};
use std::{fmt, ops};

/// Parameter-list constraint of an [`Atom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ParamPattern {
    /// `..`: any number of parameters of any type.
    #[default]
    Any,
    /// Exactly these parameters, each matched by its own glob.
    Exact(Vec<Pattern>),
    /// `p1, p2, ..`: these leading parameters, then any number of others.
    Leading(Vec<Pattern>),
}

impl ParamPattern {
    /// Test a parameter list.
    pub fn matches(&self, params: &[String]) -> bool {
        match self {
            ParamPattern::Any => true,
            ParamPattern::Exact(patterns) => {
                patterns.len() == params.len()
                    && patterns.iter().zip(params).all(|(p, t)| p.matches(t))
            }
            ParamPattern::Leading(patterns) => {
                patterns.len() <= params.len()
                    && patterns.iter().zip(params).all(|(p, t)| p.matches(t))
            }
        }
    }
}

impl fmt::Display for ParamPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamPattern::Any => f.write_str(".."),
            ParamPattern::Exact(patterns) => write_patterns(f, patterns),
            ParamPattern::Leading(patterns) => {
                write_patterns(f, patterns)?;
                f.write_str(", ..")
            }
        }
    }
}

fn write_patterns(f: &mut fmt::Formatter<'_>, patterns: &[Pattern]) -> fmt::Result {
    for (i, p) in patterns.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{p}")?;
    }
    Ok(())
}

/// The leaf predicate: package, type, method and parameter patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    /// Pattern for the dot-separated package of the owning type.
    pub package: Pattern,
    /// Pattern for the simple name of the owning type.
    pub type_name: Pattern,
    /// Pattern for the method name.
    pub method: Pattern,
    /// Constraint on the parameter list.
    pub params: ParamPattern,
}

impl Atom {
    /// Whether every component of the atom matches the signature.
    pub fn matches(&self, signature: &CallSignature) -> bool {
        self.package.matches(signature.package())
            && self.type_name.matches(signature.type_name())
            && self.method.matches(signature.method())
            && self.params.matches(signature.params())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("execution(* ")?;
        if !self.package.as_str().is_empty() {
            write!(f, "{}.", self.package)?;
        }
        write!(f, "{}.{}({}))", self.type_name, self.method, self.params)
    }
}

/// A boolean combination of signature predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pointcut {
    /// A leaf predicate.
    Atom(Atom),
    /// Both sides must match; the right side is skipped when the left fails.
    And(Box<Pointcut>, Box<Pointcut>),
    /// Either side must match; the right side is skipped when the left matches.
    Or(Box<Pointcut>, Box<Pointcut>),
    /// Negation.
    Not(Box<Pointcut>),
    /// Reference to a definition held by the matcher.
    Named(String),
}

impl Pointcut {
    /// Match calls whose package and method name match the given globs.
    pub fn atom(package: impl Into<Pattern>, method: impl Into<Pattern>) -> Self {
        Self::execution(package, Pattern::any(), method)
    }

    /// Match calls by package, type name and method name, with any parameters.
    pub fn execution(
        package: impl Into<Pattern>,
        type_name: impl Into<Pattern>,
        method: impl Into<Pattern>,
    ) -> Self {
        Pointcut::Atom(Atom {
            package: package.into(),
            type_name: type_name.into(),
            method: method.into(),
            params: ParamPattern::Any,
        })
    }

    /// Reference another pointcut by name.
    pub fn named(name: impl Into<String>) -> Self {
        Pointcut::Named(name.into())
    }

    /// Restrict an atom to an exact parameter list. Has no effect on
    /// composite expressions.
    pub fn with_params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        if let Pointcut::Atom(atom) = &mut self {
            atom.params = ParamPattern::Exact(params.into_iter().map(Into::into).collect());
        }
        self
    }

    /// Every named reference in this expression, in left-to-right order.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pointcut::Atom(_) => {}
            Pointcut::And(l, r) | Pointcut::Or(l, r) => {
                l.collect_references(out);
                r.collect_references(out);
            }
            Pointcut::Not(inner) => inner.collect_references(out),
            Pointcut::Named(name) => out.push(name),
        }
    }
}

impl From<Atom> for Pointcut {
    fn from(atom: Atom) -> Self {
        Pointcut::Atom(atom)
    }
}

impl ops::BitAnd for Pointcut {
    type Output = Pointcut;

    fn bitand(self, rhs: Pointcut) -> Pointcut {
        Pointcut::And(Box::new(self), Box::new(rhs))
    }
}

impl ops::BitOr for Pointcut {
    type Output = Pointcut;

    fn bitor(self, rhs: Pointcut) -> Pointcut {
        Pointcut::Or(Box::new(self), Box::new(rhs))
    }
}

impl ops::Not for Pointcut {
    type Output = Pointcut;

    fn not(self) -> Pointcut {
        Pointcut::Not(Box::new(self))
    }
}

impl fmt::Display for Pointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pointcut::Atom(atom) => write!(f, "{atom}"),
            Pointcut::And(l, r) => write!(f, "({l} && {r})"),
            Pointcut::Or(l, r) => write!(f, "({l} || {r})"),
            Pointcut::Not(inner) => write!(f, "!{inner}"),
            Pointcut::Named(name) => write!(f, "{name}()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(owner: &str, method: &str) -> CallSignature {
        CallSignature::new(owner, method)
    }

    #[test]
    fn test_atom_matches_package_and_method() {
        let Pointcut::Atom(atom) = Pointcut::atom("com.luv2code.aopdemo.dao", "get*") else {
            unreachable!()
        };
        assert!(atom.matches(&sig("com.luv2code.aopdemo.dao.AccountDAO", "getName")));
        assert!(!atom.matches(&sig("com.luv2code.aopdemo.dao.AccountDAO", "setName")));
        assert!(!atom.matches(&sig("com.luv2code.aopdemo.service.Fortune", "getFortune")));
    }

    #[test]
    fn test_exact_params() {
        let Pointcut::Atom(atom) = Pointcut::atom("dao", "findAccounts").with_params(["*"]) else {
            unreachable!()
        };
        assert!(atom.matches(&sig("dao.AccountDao", "findAccounts").with_params(["bool"])));
        assert!(!atom.matches(&sig("dao.AccountDao", "findAccounts")));
        assert!(!atom.matches(&sig("dao.AccountDao", "findAccounts").with_params(["bool", "u8"])));
    }

    #[test]
    fn test_references_in_order() {
        let p = Pointcut::named("a") & !(Pointcut::named("b") | Pointcut::atom("*", "*"));
        assert_eq!(p.references(), vec!["a", "b"]);
    }

    #[test]
    fn test_display_atom() {
        let p = Pointcut::execution("com.example", "AccountDao", "find*");
        assert_eq!(p.to_string(), "execution(* com.example.AccountDao.find*(..))");
    }
}
