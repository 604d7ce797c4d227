// Utility functions

pub mod signature;

pub use signature::{compute_signature, constant_time_eq, verify_signature};
