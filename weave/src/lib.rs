//! # weave - Declarative Call Interception
//!
//! `weave` wraps calls on target objects with cross-cutting advice selected
//! by declarative pointcuts, executed in the nested ("onion") model: the
//! aspect with the lowest precedence is outermost on the way in and
//! innermost on the way out.
//!
//! ## Quick Start
//!
//! ```rust
//! use weave::{AdviceRegistry, Arguments, Aspect, CallSignature, Dispatcher, Pointcut, args};
//!
//! let registry = AdviceRegistry::builder()
//!     .register(
//!         Aspect::builder("Audit")
//!             .order(1)
//!             .before("execution(* dao.*.add*(..))".parse::<Pointcut>().unwrap(), |jp| {
//!                 println!("calling {} with {:?}", jp.signature(), jp.args());
//!                 Ok(())
//!             })
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(registry);
//! let sig = CallSignature::new("dao.AccountDao", "addAccount").with_params(["Account", "bool"]);
//! let stored: bool = dispatcher.invoke(&sig, args!["Madhu", true], || Ok(true)).unwrap();
//! assert!(stored);
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): structured logs from the dispatcher and standard advice
//! - `macros`: the compile-time [`pointcut!`] macro
//! - `inventory`: link-time aspect registration
//! - `cli`: the `aop-demo` binary (`cargo run --features cli --bin aop-demo`)

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

// Advice
pub use weave_core::{
    Advice, AdviceKind, AfterAdvice, AfterReturningAdvice, AfterThrowingAdvice, AroundAdvice,
    BeforeAdvice, Failure,
};

// Pointcuts
pub use weave_core::{Atom, ParamPattern, Pattern, Pointcut, parse};

// Join points
pub use weave_core::{CallSignature, JoinPoint, Proceed, ProceedTracker, ProceedingJoinPoint};

// Values
pub use weave_core::{Arguments, BoxValue, Value, args, boxed, unbox};

// Error types
pub use weave_core::{
    BoxError, InvokeError, PointcutParseError, PointcutResolutionError, ProceedError,
    RegistryError,
};

// Composition and dispatch
pub use weave_std::{
    aspect::{AdviceEntry, Aspect, AspectBuilder},
    dispatcher::Dispatcher,
    matcher::{PointcutMatcher, PointcutMatcherBuilder},
    registry::{AdviceProvider, AdviceRegistry, AdviceRegistryBuilder, Applied, ResolvedAdvice},
};

// Standard advice
pub use weave_std::advice::{LoggingAdvice, TimingAdvice};

/// Testing utilities.
pub mod testing {
    pub use weave_std::testing::{Journal, RecordingAdvice};
}

#[cfg(feature = "macros")]
pub use weave_macros::pointcut;

#[cfg(feature = "inventory")]
pub use weave_std::collected::AspectRegistration;

#[cfg(feature = "inventory")]
pub use inventory;
