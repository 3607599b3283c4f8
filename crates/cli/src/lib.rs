//! Operator tooling for drinks API bearer tokens.

pub mod cmd;
pub mod error;
