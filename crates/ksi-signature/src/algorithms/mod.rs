//! # Algorithms Module
//!
//! Pure hash-chain arithmetic.

pub mod chain_math;

pub use chain_math::{
    aggregation_step, calendar_step, highest_power_of_two, next_level, registration_time,
};
