//! Supporting infrastructure.
//!
//! Provides the counted byte source/sink pair used by every stage and the error type.

pub mod cursor;
pub mod errors;
