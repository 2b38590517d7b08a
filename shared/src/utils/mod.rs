//! Utility helpers

pub mod masking;
pub mod validation;
