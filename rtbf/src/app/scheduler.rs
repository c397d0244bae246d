//! Scheduler
//!
//! Drives poll cycles on a fixed interval until a shutdown signal arrives.
//! Each cycle runs in its own task so a panic is contained to that cycle.
//! The shutdown signal is only observed between cycles.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::app::poll_cycle_service::PollCycleService;
use crate::config::ScheduleConfig;
use crate::domain::ports::{PlatformClient, TextRewriter};
use crate::error::CycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Terminated,
}

pub struct Scheduler<P, R>
where
    P: PlatformClient + 'static,
    R: TextRewriter + 'static,
{
    cycle: Arc<PollCycleService<P, R>>,
    poll_interval: Duration,
    retry_delay: Duration,
    state: SchedulerState,
}

impl<P, R> Scheduler<P, R>
where
    P: PlatformClient + 'static,
    R: TextRewriter + 'static,
{
    pub fn new(cycle: PollCycleService<P, R>, schedule: &ScheduleConfig) -> Self {
        Self {
            cycle: Arc::new(cycle),
            poll_interval: schedule.poll_interval,
            retry_delay: schedule.retry_delay,
            state: SchedulerState::Running,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Run cycles until `shutdown` resolves. Returns the number of cycles run.
    pub async fn run_until<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0;

        while self.state == SchedulerState::Running {
            let pause = self.tick().await;
            cycles += 1;

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Received interrupt signal, shutting down...");
                    self.state = SchedulerState::Terminated;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }

        cycles
    }

    /// Run one cycle and return how long to sleep afterwards
    async fn tick(&self) -> Duration {
        let cycle = self.cycle.clone();
        let handle = tokio::spawn(async move { cycle.run_cycle().await });

        match handle.await {
            Ok(Ok(_)) => {
                tracing::info!("Sleeping for {} minutes...", self.poll_interval.as_secs() / 60);
                self.poll_interval
            }
            Ok(Err(CycleError::Listing(e))) => {
                tracing::error!(error = %e, "Error processing comments");
                self.poll_interval
            }
            Ok(Err(e)) => {
                tracing::error!(
                    error = %e,
                    "Unexpected error in main loop, retrying in {} seconds",
                    self.retry_delay.as_secs()
                );
                self.retry_delay
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Poll cycle aborted, retrying in {} seconds",
                    self.retry_delay.as_secs()
                );
                self.retry_delay
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::mutation_queue::MutationQueue;
    use crate::app::strategy_service::{ReplacementStrategy, StrategyService};
    use crate::test_utils::{test_policy, MockPlatformClient, MockTextRewriter, PlatformCall};

    const MINUTE: Duration = Duration::from_secs(60);
    const MUTATION_DELAY: Duration = Duration::from_secs(1);

    fn schedule() -> ScheduleConfig {
        ScheduleConfig {
            poll_interval: 30 * MINUTE,
            scan_limit: 25,
            mutation_delay: MUTATION_DELAY,
            retry_delay: MINUTE,
        }
    }

    fn create_scheduler(
        platform: Arc<MockPlatformClient>,
    ) -> (
        Scheduler<MockPlatformClient, MockTextRewriter>,
        tokio::task::JoinHandle<()>,
    ) {
        let (queue, worker) = MutationQueue::spawn(platform.clone(), MUTATION_DELAY);
        let resolver = Arc::new(StrategyService::new(
            ReplacementStrategy::<MockTextRewriter>::RandomToken,
            None,
        ));
        let cycle = PollCycleService::new(platform, resolver, queue, test_policy(), 25);
        (Scheduler::new(cycle, &schedule()), worker)
    }

    fn list_calls(platform: &MockPlatformClient) -> usize {
        platform
            .calls()
            .iter()
            .filter(|call| matches!(call, PlatformCall::List(_)))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn runs_a_cycle_per_interval_until_shutdown() {
        let platform = Arc::new(MockPlatformClient::new());
        let (mut scheduler, _worker) = create_scheduler(platform.clone());

        let cycles = scheduler
            .run_until(tokio::time::sleep(95 * MINUTE))
            .await;

        // t = 0, 30, 60, 90
        assert_eq!(cycles, 4);
        assert_eq!(list_calls(&platform), 4);
        assert_eq!(scheduler.state(), SchedulerState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn listing_failures_do_not_stop_the_loop() {
        let platform = Arc::new(MockPlatformClient::new().failing_listing());
        let (mut scheduler, _worker) = create_scheduler(platform.clone());

        let cycles = scheduler
            .run_until(tokio::time::sleep(65 * MINUTE))
            .await;

        assert_eq!(cycles, 3);
        assert_eq!(list_calls(&platform), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_cycle_retries_after_fallback_delay() {
        let platform = Arc::new(MockPlatformClient::new().panicking_listing());
        let (mut scheduler, _worker) = create_scheduler(platform.clone());

        let cycles = scheduler
            .run_until(tokio::time::sleep(MINUTE * 5 + MINUTE / 2))
            .await;

        // t = 0, 1, 2, 3, 4, 5 minutes
        assert_eq!(cycles, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_queue_uses_fallback_delay() {
        let now = chrono::Utc::now();
        let platform = Arc::new(
            MockPlatformClient::new()
                .with_comments(vec![crate::test_utils::comment_aged("stale", 200, now)]),
        );
        let (mut scheduler, worker) = create_scheduler(platform.clone());
        worker.abort();
        let _ = worker.await;

        let cycles = scheduler
            .run_until(tokio::time::sleep(MINUTE * 2 + MINUTE / 2))
            .await;

        assert_eq!(cycles, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_before_start_still_completes_first_cycle() {
        let platform = Arc::new(MockPlatformClient::new());
        let (mut scheduler, _worker) = create_scheduler(platform.clone());

        let cycles = scheduler.run_until(std::future::ready(())).await;

        assert_eq!(cycles, 1);
        assert_eq!(list_calls(&platform), 1);
    }
}
