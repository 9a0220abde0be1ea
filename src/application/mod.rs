//! Application layer - use cases and services

pub mod commands;
pub mod presenter;
pub mod scheduler;

pub use commands::{Cli, Commands, CommandExecutor};
pub use presenter::{DisplaySurface, Presenter, TerminalDisplay};
pub use scheduler::{Countdown, CountdownEvent, Scheduler, SchedulerConfig};
