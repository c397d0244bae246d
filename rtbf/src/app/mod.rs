//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between the lifecycle engine, ports and the mutation queue.

pub mod mutation_queue;
pub mod poll_cycle_service;
pub mod scheduler;
pub mod strategy_service;

pub use mutation_queue::MutationQueue;
pub use poll_cycle_service::PollCycleService;
pub use scheduler::Scheduler;
pub use strategy_service::StrategyService;
