//! Integration test crate for CutLab.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the cutlab crates to verify they work together.

#[cfg(test)]
mod timeline;

#[cfg(test)]
mod store;

#[cfg(test)]
mod properties;
