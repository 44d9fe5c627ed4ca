pub mod config;
pub mod event;
pub mod provider;
pub mod scaler;

pub use config::{Config, ConfigError};
pub use event::{InvocationEvent, SignalSource};
pub use provider::{AutoScalingGroups, DatabaseApi, DatabaseTarget, GroupApi, RdsDatabase};
pub use scaler::{DesiredState, Outcome, Scaler, Signal};

#[derive(Debug, thiserror::Error)]
#[error("App Error: {0}")]
pub struct AppError(pub String);
