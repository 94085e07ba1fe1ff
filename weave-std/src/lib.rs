//! # weave-std
//!
//! Standard implementations for the Weave interception engine.
//!
//! This crate provides:
//! - **Matching**: [`matcher::PointcutMatcher`] with named, validated definitions
//! - **Composition**: [`aspect::Aspect`] and [`registry::AdviceRegistry`]
//! - **Execution**: [`dispatcher::Dispatcher`]
//! - **Standard advice**: Logging, Timing
//! - **Testing**: [`testing::Journal`], [`testing::RecordingAdvice`]

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core
pub use weave_core;

// Modules
pub mod advice;
pub mod aspect;
#[cfg(feature = "inventory")]
pub mod collected;
pub mod dispatcher;
pub mod matcher;
pub mod registry;
pub mod testing;

#[cfg(feature = "inventory")]
pub use inventory;
