//! Poll Cycle Service
//!
//! One pass over the account's most recent comments:
//! - list up to `scan_limit` comments, newest first
//! - run the lifecycle decision for each
//! - resolve replacement text and enqueue an edit for obfuscations
//! - enqueue a delete for deletions
//!
//! Mutations are only enqueued here; the queue worker applies them.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::app::mutation_queue::MutationQueue;
use crate::app::strategy_service::StrategyService;
use crate::domain::entities::{Comment, Decision, Mutation};
use crate::domain::lifecycle::{assess, LifecyclePolicy, Reason};
use crate::domain::ports::{PlatformClient, TextRewriter};
use crate::error::CycleError;

/// Tally of what a cycle decided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub scanned: usize,
    /// Skipped because of the ignore flag
    pub ignored: usize,
    /// Skipped for any other reason
    pub skipped: usize,
    pub obfuscated: usize,
    pub deleted: usize,
}

impl CycleReport {
    /// Number of mutations enqueued
    pub fn enqueued(&self) -> usize {
        self.obfuscated + self.deleted
    }
}

/// Service running a single poll cycle
pub struct PollCycleService<P, R>
where
    P: PlatformClient,
    R: TextRewriter,
{
    platform: Arc<P>,
    resolver: Arc<StrategyService<R>>,
    queue: MutationQueue,
    policy: LifecyclePolicy,
    scan_limit: u32,
}

impl<P, R> PollCycleService<P, R>
where
    P: PlatformClient,
    R: TextRewriter,
{
    pub fn new(
        platform: Arc<P>,
        resolver: Arc<StrategyService<R>>,
        queue: MutationQueue,
        policy: LifecyclePolicy,
        scan_limit: u32,
    ) -> Self {
        Self {
            platform,
            resolver,
            queue,
            policy,
            scan_limit,
        }
    }

    /// Run one cycle against the current time
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle as if the current time were `now`
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        tracing::info!(
            "Checking comments: obfuscation after {} minutes ({}), deletion after {} minutes ({})",
            self.policy.obfuscate_after.num_minutes(),
            now - self.policy.obfuscate_after,
            self.policy.delete_after.num_minutes(),
            now - self.policy.delete_after,
        );

        let comments = self.platform.list_own_comments(self.scan_limit).await?;

        let mut report = CycleReport {
            scanned: comments.len(),
            ..CycleReport::default()
        };

        for comment in &comments {
            self.process(comment, now, &mut report).await?;
        }

        tracing::info!(
            scanned = report.scanned,
            ignored = report.ignored,
            skipped = report.skipped,
            obfuscated = report.obfuscated,
            deleted = report.deleted,
            enqueued = report.enqueued(),
            "Poll cycle complete"
        );

        Ok(report)
    }

    async fn process(
        &self,
        comment: &Comment,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> Result<(), CycleError> {
        let assessment = assess(comment, &self.policy, now);
        let created = comment.created_at;
        let age_minutes = assessment.age.num_minutes();
        let permalink = comment.permalink.as_deref().unwrap_or("-");

        match (assessment.decision, assessment.reason) {
            (Decision::Skip, Reason::IgnoreFlag) => {
                tracing::debug!(
                    age_minutes,
                    permalink,
                    "Skipping comment {}: contains ignore flag '{}'",
                    comment.id,
                    self.policy.ignore_flag
                );
                report.ignored += 1;
            }
            (Decision::Skip, _) => {
                tracing::debug!(
                    comment_id = %comment.id,
                    age_minutes,
                    reason = ?assessment.reason,
                    "Comment from {} not ready for processing yet",
                    created
                );
                report.skipped += 1;
            }
            (Decision::Delete, _) => {
                tracing::info!(
                    age_minutes,
                    permalink,
                    "Deleting comment from {}: {}",
                    created,
                    comment.id
                );
                self.queue.enqueue(Mutation::delete(comment.id.clone()))?;
                report.deleted += 1;
            }
            (Decision::Obfuscate, reason) => {
                if reason == Reason::DeletionPending {
                    tracing::info!(
                        age_minutes,
                        permalink,
                        "Obfuscating comment (deletion pending) from {}: {}",
                        created,
                        comment.id
                    );
                } else {
                    tracing::info!(
                        age_minutes,
                        permalink,
                        "Obfuscating comment from {}: {}",
                        created,
                        comment.id
                    );
                }
                let replacement = self.resolver.resolve_replacement(&comment.body).await;
                self.queue
                    .enqueue(Mutation::edit(comment.id.clone(), replacement))?;
                report.obfuscated += 1;
            }
        }

        Ok(())
    }
}
