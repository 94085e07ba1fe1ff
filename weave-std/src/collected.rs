//! Link-time collection of aspects via `inventory`.

use crate::aspect::Aspect;

/// An aspect factory submitted with `inventory::submit!`.
///
/// [`AdviceRegistryBuilder::with_collected`](crate::registry::AdviceRegistryBuilder::with_collected)
/// calls every submitted factory once.
///
/// # Example
///
/// ```rust,ignore
/// fn audit() -> Aspect {
///     Aspect::builder("Audit").before(Pointcut::atom("dao", "*"), |_| Ok(())).build()
/// }
///
/// inventory::submit! { AspectRegistration::new(audit) }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AspectRegistration {
    /// Builds the aspect.
    pub factory: fn() -> Aspect,
}

impl AspectRegistration {
    /// Wrap a factory.
    pub const fn new(factory: fn() -> Aspect) -> Self {
        Self { factory }
    }
}

inventory::collect!(AspectRegistration);
