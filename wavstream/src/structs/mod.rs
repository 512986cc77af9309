//! Data structures representing the WAV container.

pub mod header;
