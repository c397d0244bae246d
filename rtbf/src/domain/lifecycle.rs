//! Lifecycle decision engine
//!
//! Decides, for a single comment snapshot, whether this cycle should skip it,
//! obfuscate it or delete it. Evaluation order is fixed:
//!
//! 1. ignore flag present → skip
//! 2. deletion due → delete if the thresholds are equal or the comment is
//!    already watermarked, otherwise obfuscate first
//! 3. obfuscation due and not yet watermarked → obfuscate
//! 4. otherwise → skip
//!
//! Nothing here touches the clock or any I/O; `now` is an input.

use chrono::{DateTime, Duration, Utc};

use super::entities::{Comment, Decision};

/// Thresholds and marker tokens consumed by the decision engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub obfuscate_after: Duration,
    pub delete_after: Duration,
    /// Marker embedded in replacement text
    pub watermark: String,
    /// Marker that exempts a comment from processing; empty disables it
    pub ignore_flag: String,
}

impl LifecyclePolicy {
    /// Single-stage mode: comments go straight to deletion
    pub fn thresholds_collapsed(&self) -> bool {
        self.obfuscate_after == self.delete_after
    }
}

/// Why a decision was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    IgnoreFlag,
    NotDue,
    AlreadyObfuscated,
    ObfuscationDue,
    /// Past the deletion threshold but the watermark must be applied first
    DeletionPending,
    DeletionDue,
}

/// A decision together with the facts it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub decision: Decision,
    pub reason: Reason,
    pub age: Duration,
}

/// Assess a comment against the policy at instant `now`
pub fn assess(comment: &Comment, policy: &LifecyclePolicy, now: DateTime<Utc>) -> Assessment {
    let age = now.signed_duration_since(comment.created_at);
    let verdict = |decision, reason| Assessment {
        decision,
        reason,
        age,
    };

    if comment.contains_token(&policy.ignore_flag) {
        return verdict(Decision::Skip, Reason::IgnoreFlag);
    }

    let obfuscation_due = age >= policy.obfuscate_after;
    let deletion_due = age >= policy.delete_after;
    let already_obfuscated = comment.contains_token(&policy.watermark);

    if deletion_due {
        if policy.thresholds_collapsed() || already_obfuscated {
            verdict(Decision::Delete, Reason::DeletionDue)
        } else {
            verdict(Decision::Obfuscate, Reason::DeletionPending)
        }
    } else if obfuscation_due && !already_obfuscated {
        verdict(Decision::Obfuscate, Reason::ObfuscationDue)
    } else if obfuscation_due {
        verdict(Decision::Skip, Reason::AlreadyObfuscated)
    } else {
        verdict(Decision::Skip, Reason::NotDue)
    }
}

/// Decide what to do with a comment at instant `now`
#[allow(dead_code)]
pub fn decide(comment: &Comment, policy: &LifecyclePolicy, now: DateTime<Utc>) -> Decision {
    assess(comment, policy, now).decision
}
