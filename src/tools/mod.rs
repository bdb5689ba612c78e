//! Higher-level passes over a parsed document.
//!
//! - [`validate`]: reference, parent-boundary and phase checks, phase
//!   correction and the [`ValidationConfig`](validate::ValidationConfig) that
//!   drives them.
pub mod validate;
