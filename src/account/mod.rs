//! # Account Module
//!
//! Resolves which NEAR account a tool call acts for. The resolved
//! [`AccountContext`] is passed explicitly into handlers and on to the
//! SDK client cache.

pub mod context;

pub use context::AccountContext;
