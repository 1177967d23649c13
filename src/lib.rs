//! # progress-watch
//!
//! Periodically polls an external command for a completion percentage,
//! appends each reading to a plain-text log and shows a live chart with
//! rate-of-change estimates and a projected completion time.
//!
//! The log doubles as the only channel between the sampler and the
//! reporter: the reporter re-reads it on every refresh, so the view can
//! also be rebuilt from a log written by an earlier run.

pub mod args;
pub mod clock;
pub mod config;
pub mod constants;
pub mod logging;
pub mod report;
pub mod runtime;
pub mod sampler;
pub mod source;
pub mod store;
pub mod trend;
pub mod tui;
pub mod types;

pub use args::Args;
pub use clock::ClockState;
pub use config::{Config, ConfigSource, load_config, load_config_with_fallback};
pub use report::{ReportView, Reporter};
pub use runtime::RuntimeConfig;
pub use sampler::{Sampler, SamplerError, SamplerState};
pub use source::{CommandSource, ProgressSource, SourceError};
pub use store::{LogError, ProgressLog};
pub use trend::{Horizon, LinearFit, Projection, TrendEstimate};
pub use types::{History, Percent, Reading, Sample, Timestamp};
