//! Scheduler runtime: one fleet pass, then the idle interval, until ctrl-c.

mod error;
mod runtime;

pub use error::DaemonError;
pub use runtime::{init_tracing, run, run_loop, start_blocking, LoopStats, LogFormat};
