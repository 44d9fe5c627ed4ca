//! Per-deployment settings read from the Lambda environment.

use crate::provider::DatabaseTarget;

pub const SKIP_EXECUTION: &str = "SKIP_EXECUTION";
pub const RDS_IDENTIFIER: &str = "RDS_IDENTIFIER";
pub const IS_CLUSTER: &str = "IS_CLUSTER";
pub const ASG_NAME: &str = "ASG_NAME";
pub const UP_EVENT_ARN: &str = "UP_EVENT_ARN";
pub const DOWN_EVENT_ARN: &str = "DOWN_EVENT_ARN";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("You must set your {0} appropriately.")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rds_identifier: String,
    pub is_cluster: bool,
    pub asg_name: String,
    pub up_event_arn: Option<String>,
    pub down_event_arn: Option<String>,
}

/// `true` when `SKIP_EXECUTION` asks the handler to do nothing at all.
pub fn skip_requested<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    flag(lookup(SKIP_EXECUTION))
}

/// Lookup backed by the process environment.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn flag(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("true") | Some("1"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rds_identifier = non_empty(lookup(RDS_IDENTIFIER));
        let is_cluster = flag(lookup(IS_CLUSTER));
        let asg_name = non_empty(lookup(ASG_NAME));

        tracing::info!("{}={:?}", RDS_IDENTIFIER, rds_identifier);
        tracing::info!("{}={}", IS_CLUSTER, is_cluster);
        tracing::info!("{}={:?}", ASG_NAME, asg_name);

        let rds_identifier = rds_identifier.ok_or(ConfigError::Missing(RDS_IDENTIFIER))?;
        let asg_name = asg_name.ok_or(ConfigError::Missing(ASG_NAME))?;

        Ok(Config {
            rds_identifier,
            is_cluster,
            asg_name,
            up_event_arn: non_empty(lookup(UP_EVENT_ARN)),
            down_event_arn: non_empty(lookup(DOWN_EVENT_ARN)),
        })
    }

    pub fn target(&self) -> DatabaseTarget {
        if self.is_cluster {
            DatabaseTarget::Cluster(self.rds_identifier.clone())
        } else {
            DatabaseTarget::Instance(self.rds_identifier.clone())
        }
    }
}
