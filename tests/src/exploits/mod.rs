//! # Tampering Scenarios
//!
//! Signatures and gateway responses altered after the fact must be
//! rejected by the rule that guards the altered field.

pub mod tampering;
