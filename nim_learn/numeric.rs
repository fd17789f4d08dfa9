//! Numeric types used by the solver

pub mod nimber;
