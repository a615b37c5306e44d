//! Poll scheduler and process runtime: discovery, change detection and
//! mirroring on a timer, with the renderer supervised alongside.

mod error;
pub mod logging;
mod runtime;
pub mod scheduler;

pub use error::DaemonError;
pub use logging::{init_tracing, LogFormat, LogSettings, DEFAULT_LOG_LEVEL};
pub use runtime::{run, run_services, start_blocking, RuntimeConfig};
pub use scheduler::{CycleReport, Scheduler, SchedulerState, Shutdown};
