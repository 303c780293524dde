//! Infrastructure layer - ports and their adapters.

pub mod cache;
pub mod clock;
pub mod config;
pub mod dialog;
pub mod map;
pub mod ports;
pub mod problem_bank;
pub mod token;
pub mod variables;
