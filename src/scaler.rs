//! Maps group activity to a start or stop of the companion database.
//!
//! Every decision re-reads the database status first, and at most one
//! lifecycle call is made per invocation. The call is not awaited to
//! completion on the provider side and is never retried.

use aws_sdk_autoscaling::types::LifecycleState;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{self, Config};
use crate::event::{InvocationEvent, SignalSource};
use crate::provider::{DatabaseApi, DatabaseTarget, GroupApi};
use crate::AppError;

const AVAILABLE: &str = "available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Active members of the group; `None` when the group could not be found.
    InstanceCount(Option<u32>),
    /// Rule ARN taken from a scheduled event.
    NamedEvent(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Outcome {
    Skipped,
    Misconfigured { reason: String },
    NoSignal,
    UnknownCount,
    UnmatchedEvent { arn: String },
    AlreadyRunning,
    AlreadyStopped,
    Started,
    Stopped,
}

pub fn desired_state(signal: &Signal, config: &Config) -> Option<DesiredState> {
    match signal {
        Signal::InstanceCount(None) => None,
        Signal::InstanceCount(Some(0)) => Some(DesiredState::Stopped),
        Signal::InstanceCount(Some(_)) => Some(DesiredState::Running),
        Signal::NamedEvent(arn) => {
            if config.down_event_arn.as_deref() == Some(arn.as_str()) {
                Some(DesiredState::Stopped)
            } else if config.up_event_arn.as_deref() == Some(arn.as_str()) {
                Some(DesiredState::Running)
            } else {
                None
            }
        }
    }
}

fn counts_as_active(state: &LifecycleState) -> bool {
    matches!(state, LifecycleState::Pending | LifecycleState::InService)
}

pub struct Scaler<D, G> {
    database: D,
    groups: G,
}

impl<D: DatabaseApi, G: GroupApi> Scaler<D, G> {
    pub fn new(database: D, groups: G) -> Self {
        Scaler { database, groups }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    /// Full invocation: environment checks, event adapter, then the decision.
    pub async fn invoke<F>(&self, event: &InvocationEvent, lookup: F) -> Result<Outcome, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if config::skip_requested(&lookup) {
            warn!("SKIP_EXECUTION is set to true - skipping execution.");
            return Ok(Outcome::Skipped);
        }

        let config = match Config::from_lookup(&lookup) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return Ok(Outcome::Misconfigured {
                    reason: e.to_string(),
                });
            }
        };

        info!(event = ?event, "received event");
        self.handle(event, &config).await
    }

    pub async fn handle(
        &self,
        event: &InvocationEvent,
        config: &Config,
    ) -> Result<Outcome, AppError> {
        let signal = match event.signal_source() {
            Some(SignalSource::Group(name)) => {
                if name != config.asg_name {
                    warn!(
                        event_group = %name,
                        configured_group = %config.asg_name,
                        "event group differs from ASG_NAME, using the event's group"
                    );
                }
                Signal::InstanceCount(self.instance_count(&name).await?)
            }
            Some(SignalSource::Rule(arn)) => Signal::NamedEvent(arn),
            None => {
                warn!("event carries neither an AutoScalingGroupName nor resources");
                return Ok(Outcome::NoSignal);
            }
        };

        self.decide_and_act(&signal, config).await
    }

    /// Number of members that are pending or in service. `None` only when the
    /// group does not exist; a group with no members is `Some(0)`, so an
    /// emptied group stops the database.
    pub async fn instance_count(&self, group: &str) -> Result<Option<u32>, AppError> {
        let Some(states) = self.groups.member_states(group).await? else {
            error!("No information for ASG named {}", group);
            return Ok(None);
        };

        let active = states.iter().filter(|s| counts_as_active(s)).count();
        let in_service = u32::try_from(active).unwrap_or(u32::MAX);
        info!(
            "There are (or about to be) {} instances in service",
            in_service
        );
        Ok(Some(in_service))
    }

    pub async fn status(&self, target: &DatabaseTarget) -> Result<Option<String>, AppError> {
        self.database.status(target).await
    }

    pub async fn decide_and_act(
        &self,
        signal: &Signal,
        config: &Config,
    ) -> Result<Outcome, AppError> {
        let Some(desired) = desired_state(signal, config) else {
            return Ok(match signal {
                Signal::InstanceCount(_) => {
                    warn!("instance count unknown; leaving RDS untouched");
                    Outcome::UnknownCount
                }
                Signal::NamedEvent(arn) => {
                    info!(arn = %arn, "event matches neither UP_EVENT_ARN nor DOWN_EVENT_ARN");
                    Outcome::UnmatchedEvent { arn: arn.clone() }
                }
            });
        };

        match signal {
            Signal::InstanceCount(Some(0)) => {
                info!("The number of instances in service is 0; stopping RDS.")
            }
            Signal::InstanceCount(Some(n)) => {
                info!("The number of instances in service is {}; starting RDS.", n)
            }
            _ => {}
        }

        let target = config.target();
        match desired {
            DesiredState::Stopped => self.stop(&target).await,
            DesiredState::Running => self.start(&target).await,
        }
    }

    async fn stop(&self, target: &DatabaseTarget) -> Result<Outcome, AppError> {
        info!("Received STOP event.");
        let status = self.status(target).await?;
        if status.as_deref() != Some(AVAILABLE) {
            warn!(status = ?status, "The RDS instance/cluster is already stopped.");
            return Ok(Outcome::AlreadyStopped);
        }

        info!("Stopping RDS {} {}", target.kind(), target.identifier());
        let response = self.database.stop(target).await?;
        debug!("{}", response);
        Ok(Outcome::Stopped)
    }

    async fn start(&self, target: &DatabaseTarget) -> Result<Outcome, AppError> {
        info!("Received START event.");
        let status = self.status(target).await?;
        if status.as_deref() == Some(AVAILABLE) {
            warn!("The RDS instance/cluster is already running.");
            return Ok(Outcome::AlreadyRunning);
        }

        info!("Starting RDS {} {}", target.kind(), target.identifier());
        let response = self.database.start(target).await?;
        debug!("{}", response);
        Ok(Outcome::Started)
    }
}
