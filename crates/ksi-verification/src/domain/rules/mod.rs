//! # Verification Rules
//!
//! Each rule inspects one aspect of a signature and answers `Ok`, `Fail`
//! or `Na`. A rule that cannot run at all (missing context, hashing
//! failure, extender failure) returns an error instead of a verdict.
//!
//! | Module | Checks |
//! |--------|--------|
//! | `internal` | Chains and records agree with each other |
//! | `key` | Calendar authentication record against a trusted certificate |
//! | `publication` | Publication records, publications file, user publication |
//! | `calendar` | Signature calendar chain against a freshly extended one |

pub mod calendar;
pub mod internal;
pub mod key;
pub mod publication;

use super::context::VerificationContext;
use super::entities::{VerificationErrorCode, VerificationResult};
use super::errors::Result;

pub use calendar::*;
pub use internal::*;
pub use key::*;
pub use publication::*;

/// One verification check.
pub trait Rule: Send + Sync {
    /// Name reported in results.
    fn name(&self) -> &str;

    /// Evaluate the check.
    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult>;
}

/// `Ok` when `passed`, otherwise `Fail` with `code`.
pub(crate) fn check(rule: &dyn Rule, passed: bool, code: VerificationErrorCode) -> VerificationResult {
    if passed {
        VerificationResult::ok(rule.name())
    } else {
        VerificationResult::fail(rule.name(), code)
    }
}

/// `Ok` when `applies`, otherwise `Na` (inconclusive).
pub(crate) fn applicable(rule: &dyn Rule, applies: bool) -> VerificationResult {
    if applies {
        VerificationResult::ok(rule.name())
    } else {
        VerificationResult::na(rule.name(), VerificationErrorCode::Gen02)
    }
}
