pub mod balance;
pub mod policy;
pub mod scheduler;

pub use balance::BalanceMonitor;
pub use policy::{Strategy, TickPolicy};
pub use scheduler::{Scheduler, SchedulerConfig};
