//! Procedural macros for Weave.
//!
//! - `pointcut!("...")` - Parse a pointcut expression at compile time

use proc_macro::TokenStream;

mod pointcut;

/// Parse a pointcut expression at compile time.
///
/// Expands to an expression of type `weave::Pointcut`. Malformed expressions
/// are reported as compile errors pointing at the string literal.
///
/// ```rust,ignore
/// let no_accessors = pointcut!(
///     "forDaoPackage() && !(getter() || setter())"
/// );
/// let add = pointcut!("execution(* com.luv2code.aopdemo.dao.*.add*(..))");
/// ```
#[proc_macro]
pub fn pointcut(input: TokenStream) -> TokenStream {
    pointcut::pointcut_impl(input)
}
