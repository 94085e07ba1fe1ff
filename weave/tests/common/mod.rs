#![allow(dead_code)]

use std::{
    error::Error,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use weave::{AdviceRegistry, Aspect, CallSignature, Dispatcher, PointcutMatcher, parse};

pub const DAO: &str = "com.luv2code.aopdemo.dao";

// ============================================================================
// Test Targets
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub name: String,
    pub level: String,
}

impl Account {
    pub fn new(name: &str, level: &str) -> Self {
        Self {
            name: name.to_string(),
            level: level.to_string(),
        }
    }
}

pub fn two_accounts() -> Vec<Account> {
    vec![Account::new("John", "Silver"), Account::new("Madhu", "Platinum")]
}

pub fn find_accounts_sig() -> CallSignature {
    CallSignature::new("dao.AccountDAO", "findAccounts").with_params(["boolean"])
}

pub fn demo_sig(type_name: &str, method: &str) -> CallSignature {
    CallSignature::new(format!("{DAO}.{type_name}"), method)
}

/// A distinctive failure so tests can check it crosses the engine unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct TripWire {
    pub code: u32,
}

impl fmt::Display for TripWire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No soup for you!!! (code {})", self.code)
    }
}

impl Error for TripWire {}

/// Counts target executions.
#[derive(Clone, Default)]
pub struct CallCounter {
    pub calls: Arc<AtomicUsize>,
}

impl CallCounter {
    pub fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn demo_matcher() -> PointcutMatcher {
    PointcutMatcher::builder()
        .define("forDaoPackage", parse(&format!("execution(* {DAO}.*.*(..))")).unwrap())
        .define("getter", parse(&format!("execution(* {DAO}.*.get*(..))")).unwrap())
        .define("setter", parse(&format!("execution(* {DAO}.*.set*(..))")).unwrap())
        .define(
            "forDaoPackageNoGetterSetter",
            parse("forDaoPackage() && !(getter() || setter())").unwrap(),
        )
        .build()
        .unwrap()
}

pub fn dispatcher(aspects: impl IntoIterator<Item = Aspect>) -> Dispatcher {
    let mut builder = AdviceRegistry::builder().with_matcher(demo_matcher());
    for aspect in aspects {
        builder.register_mut(aspect);
    }
    Dispatcher::new(builder.build().unwrap())
}
