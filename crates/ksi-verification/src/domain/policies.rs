//! # Verification Policies
//!
//! A policy is a tree of rules. Each node runs its rule and then follows
//! one of two edges:
//!
//! ```text
//!            ┌── Ok ──► on_success (or finish Ok)
//!   rule ────┼── Na ──► on_na      (or finish Na)
//!            └── Fail ► stop
//! ```
//!
//! Every rule result on the path taken is recorded in the policy result.
//! A policy is itself a [`Rule`], so policies nest.

use tracing::debug;

use super::context::VerificationContext;
use super::entities::{VerificationOutcome, VerificationResult};
use super::errors::Result;
use super::rules::*;
use crate::ports::outbound::SignatureVerifier;

// =============================================================================
// Rule tree
// =============================================================================

/// A rule with its success and not-applicable successors.
pub struct RuleNode {
    rule: Box<dyn Rule>,
    on_success: Option<Box<RuleNode>>,
    on_na: Option<Box<RuleNode>>,
}

impl RuleNode {
    /// Leaf node.
    pub fn new(rule: impl Rule + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            on_success: None,
            on_na: None,
        }
    }

    /// Rules run one after another while each returns `Ok`.
    pub fn sequence(first: impl Rule + 'static, rest: Vec<Box<dyn Rule>>) -> Self {
        let tail = rest.into_iter().rev().fold(None, |next: Option<RuleNode>, rule| {
            Some(Self {
                rule,
                on_success: next.map(Box::new),
                on_na: None,
            })
        });
        Self {
            rule: Box::new(first),
            on_success: tail.map(Box::new),
            on_na: None,
        }
    }

    /// Continue with `next` when this rule returns `Ok`.
    pub fn on_success(mut self, next: RuleNode) -> Self {
        self.on_success = Some(Box::new(next));
        self
    }

    /// Continue with `next` when this rule returns `Na`.
    pub fn on_na(mut self, next: RuleNode) -> Self {
        self.on_na = Some(Box::new(next));
        self
    }

    /// Walk the tree, appending every rule result to `trail`.
    fn evaluate(
        &self,
        context: &VerificationContext<'_>,
        trail: &mut Vec<VerificationResult>,
    ) -> Result<VerificationResult> {
        let result = self.rule.verify(context)?;
        trail.push(result.clone());

        let next = match result.outcome {
            VerificationOutcome::Ok => self.on_success.as_deref(),
            VerificationOutcome::Na => self.on_na.as_deref(),
            VerificationOutcome::Fail => None,
        };
        match next {
            Some(node) => node.evaluate(context, trail),
            None => Ok(result),
        }
    }
}

/// Attach `next` to the end of `node`'s success path.
fn then(mut node: RuleNode, next: RuleNode) -> RuleNode {
    node.on_success = Some(Box::new(match node.on_success.take() {
        Some(child) => then(*child, next),
        None => next,
    }));
    node
}

// =============================================================================
// Policy
// =============================================================================

/// Named rule tree.
pub struct Policy {
    name: String,
    root: RuleNode,
}

impl Policy {
    /// Policy evaluating `root`.
    pub fn new(name: impl Into<String>, root: RuleNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    /// Run the policy; the verdict is the last rule's result.
    pub fn evaluate(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let mut trail = Vec::new();
        let last = self.root.evaluate(context, &mut trail)?;
        debug!(policy = %self.name, outcome = ?last.outcome, "Verification policy finished");
        Ok(VerificationResult::with_children(&self.name, &last, trail))
    }

    // =========================================================================
    // Standard policies
    // =========================================================================

    /// Internal consistency of the signature alone.
    pub fn internal() -> Self {
        Self::new("InternalVerificationPolicy", internal_rules())
    }

    /// Internal checks, then the calendar authentication record's PKI signature.
    pub fn key_based() -> Self {
        let key_rules = RuleNode::new(CalendarHashChainExistenceRule).on_success(
            RuleNode::new(CalendarAuthenticationRecordExistenceRule).on_success(
                RuleNode::new(CertificateExistenceRule)
                    .on_success(RuleNode::new(CalendarAuthenticationRecordSignatureRule)),
            ),
        );
        Self::new("KeyBasedVerificationPolicy", then(internal_rules(), key_rules))
    }

    /// Internal checks, then comparison with a chain from the extender.
    pub fn calendar_based() -> Self {
        let input_and_time = || {
            RuleNode::new(ExtendedSignatureCalendarChainInputHashRule)
                .on_success(RuleNode::new(ExtendedSignatureCalendarChainAggregationTimeRule))
        };
        let calendar_rules = RuleNode::new(CalendarHashChainExistenceRule)
            .on_success(
                RuleNode::new(SignaturePublicationRecordExistenceRule)
                    .on_success(
                        RuleNode::new(ExtendedSignatureCalendarChainRootHashRule)
                            .on_success(input_and_time()),
                    )
                    .on_na(
                        RuleNode::new(ExtendedSignatureCalendarChainRightLinksMatchRule)
                            .on_success(input_and_time()),
                    ),
            )
            .on_na(input_and_time());
        Self::new(
            "CalendarBasedVerificationPolicy",
            then(internal_rules(), calendar_rules),
        )
    }

    /// Internal checks, then a publication supplied by the caller.
    pub fn user_publication_based() -> Self {
        let via_extender = || {
            RuleNode::new(UserProvidedPublicationCreationTimeRule).on_success(
                RuleNode::new(ExtendingPermittedRule).on_success(
                    RuleNode::new(UserProvidedPublicationHashMatchesExtendedResponseRule).on_success(
                        RuleNode::new(UserProvidedPublicationTimeMatchesExtendedResponseRule)
                            .on_success(RuleNode::new(
                                UserProvidedPublicationExtendedSignatureInputHashRule,
                            )),
                    ),
                ),
            )
        };
        let user_rules = RuleNode::new(UserProvidedPublicationExistenceRule).on_success(
            RuleNode::new(SignaturePublicationRecordExistenceRule)
                .on_success(RuleNode::new(UserProvidedPublicationVerificationRule).on_na(via_extender()))
                .on_na(via_extender()),
        );
        Self::new(
            "UserProvidedPublicationBasedVerificationPolicy",
            then(internal_rules(), user_rules),
        )
    }

    /// Internal checks, then the publications file.
    pub fn publications_file_based() -> Self {
        let file_rules = RuleNode::new(SignaturePublicationRecordExistenceRule)
            .on_success(RuleNode::new(PublicationsFileContainsSignaturePublicationRule))
            .on_na(
                RuleNode::new(ExtendingPermittedRule).on_success(
                    RuleNode::new(PublicationsFilePublicationHashMatchesExtenderResponseRule)
                        .on_success(
                            RuleNode::new(PublicationsFilePublicationTimeMatchesExtenderResponseRule)
                                .on_success(RuleNode::new(
                                    PublicationsFileExtendedSignatureInputHashRule,
                                )),
                        ),
                ),
            );
        Self::new(
            "PublicationsFileVerificationPolicy",
            then(internal_rules(), file_rules),
        )
    }
}

fn internal_rules() -> RuleNode {
    RuleNode::sequence(
        DocumentHashRule,
        vec![
            Box::new(AggregationChainInputHashRule),
            Box::new(AggregationHashChainConsistencyRule),
            Box::new(AggregationHashChainTimeConsistencyRule),
            Box::new(AggregationHashChainIndexRule),
            Box::new(CalendarHashChainInputHashRule),
            Box::new(CalendarHashChainAggregationTimeRule),
            Box::new(CalendarHashChainRegistrationTimeRule),
            Box::new(CalendarAuthenticationRecordPublicationTimeRule),
            Box::new(CalendarAuthenticationRecordHashRule),
            Box::new(SignaturePublicationRecordPublicationTimeRule),
            Box::new(SignaturePublicationRecordPublicationHashRule),
        ],
    )
}

impl Rule for Policy {
    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        self.evaluate(context)
    }
}

impl SignatureVerifier for Policy {
    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        self.evaluate(context)
    }
}
