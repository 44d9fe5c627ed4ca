//! Provider seams and their AWS-backed implementations.
//!
//! The scaler only talks to [`DatabaseApi`] and [`GroupApi`], so the SDK
//! clients built once in `main` can be swapped for in-memory fakes.

use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_autoscaling::types::LifecycleState;
use aws_smithy_runtime_api::client::result::SdkError;

use crate::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Instance(String),
    Cluster(String),
}

impl DatabaseTarget {
    pub fn identifier(&self) -> &str {
        match self {
            DatabaseTarget::Instance(id) | DatabaseTarget::Cluster(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DatabaseTarget::Instance(_) => "instance",
            DatabaseTarget::Cluster(_) => "cluster",
        }
    }
}

#[async_trait]
pub trait DatabaseApi: Send + Sync {
    /// Current status of the target, `None` when the provider returns no record.
    async fn status(&self, target: &DatabaseTarget) -> Result<Option<String>, AppError>;

    /// Requests a start. Returns the raw provider response for logging.
    async fn start(&self, target: &DatabaseTarget) -> Result<String, AppError>;

    /// Requests a stop. Returns the raw provider response for logging.
    async fn stop(&self, target: &DatabaseTarget) -> Result<String, AppError>;
}

#[async_trait]
pub trait GroupApi: Send + Sync {
    /// Lifecycle state of every member of the group, `None` when the group is unknown.
    async fn member_states(&self, group: &str) -> Result<Option<Vec<LifecycleState>>, AppError>;
}

fn provider_error<E: Debug, R: Debug>(operation: &str, err: SdkError<E, R>) -> AppError {
    AppError(format!("{} Error: {:?}", operation, err))
}

pub struct RdsDatabase {
    client: aws_sdk_rds::Client,
}

impl RdsDatabase {
    pub fn new(client: aws_sdk_rds::Client) -> Self {
        RdsDatabase { client }
    }
}

#[async_trait]
impl DatabaseApi for RdsDatabase {
    async fn status(&self, target: &DatabaseTarget) -> Result<Option<String>, AppError> {
        match target {
            DatabaseTarget::Cluster(id) => {
                let output = self
                    .client
                    .describe_db_clusters()
                    .db_cluster_identifier(id)
                    .send()
                    .await
                    .map_err(|e| provider_error("Describe DB Clusters", e))?;
                Ok(output
                    .db_clusters()
                    .first()
                    .and_then(|c| c.status())
                    .map(String::from))
            }
            DatabaseTarget::Instance(id) => {
                let output = self
                    .client
                    .describe_db_instances()
                    .db_instance_identifier(id)
                    .send()
                    .await
                    .map_err(|e| provider_error("Describe DB Instances", e))?;
                Ok(output
                    .db_instances()
                    .first()
                    .and_then(|i| i.db_instance_status())
                    .map(String::from))
            }
        }
    }

    async fn start(&self, target: &DatabaseTarget) -> Result<String, AppError> {
        match target {
            DatabaseTarget::Cluster(id) => {
                let output = self
                    .client
                    .start_db_cluster()
                    .db_cluster_identifier(id)
                    .send()
                    .await
                    .map_err(|e| provider_error("Start DB Cluster", e))?;
                Ok(format!("{:?}", output))
            }
            DatabaseTarget::Instance(id) => {
                let output = self
                    .client
                    .start_db_instance()
                    .db_instance_identifier(id)
                    .send()
                    .await
                    .map_err(|e| provider_error("Start DB Instance", e))?;
                Ok(format!("{:?}", output))
            }
        }
    }

    async fn stop(&self, target: &DatabaseTarget) -> Result<String, AppError> {
        match target {
            DatabaseTarget::Cluster(id) => {
                let output = self
                    .client
                    .stop_db_cluster()
                    .db_cluster_identifier(id)
                    .send()
                    .await
                    .map_err(|e| provider_error("Stop DB Cluster", e))?;
                Ok(format!("{:?}", output))
            }
            DatabaseTarget::Instance(id) => {
                let output = self
                    .client
                    .stop_db_instance()
                    .db_instance_identifier(id)
                    .send()
                    .await
                    .map_err(|e| provider_error("Stop DB Instance", e))?;
                Ok(format!("{:?}", output))
            }
        }
    }
}

pub struct AutoScalingGroups {
    client: aws_sdk_autoscaling::Client,
}

impl AutoScalingGroups {
    pub fn new(client: aws_sdk_autoscaling::Client) -> Self {
        AutoScalingGroups { client }
    }
}

#[async_trait]
impl GroupApi for AutoScalingGroups {
    async fn member_states(&self, group: &str) -> Result<Option<Vec<LifecycleState>>, AppError> {
        let output = self
            .client
            .describe_auto_scaling_groups()
            .auto_scaling_group_names(group)
            .send()
            .await
            .map_err(|e| provider_error("Describe Auto Scaling Groups", e))?;

        Ok(output.auto_scaling_groups().first().map(|asg| {
            asg.instances()
                .iter()
                .filter_map(|i| i.lifecycle_state().cloned())
                .collect()
        }))
    }
}
