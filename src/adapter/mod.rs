//! Implementations of application seams: the bundled decision functions.

pub mod strategy;
