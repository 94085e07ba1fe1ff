//! Ready-made advice.
//!
//! - [`LoggingAdvice`]: logs entry, exit, results and failures
//! - [`TimingAdvice`]: around advice that measures how long a call takes

mod logging;
mod timing;

pub use logging::LoggingAdvice;
pub use timing::TimingAdvice;
