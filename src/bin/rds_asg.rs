use aws_config::BehaviorVersion;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use rds_asg_lambda::{config, AutoScalingGroups, InvocationEvent, Outcome, RdsDatabase, Scaler};
use tracing_subscriber::EnvFilter;

async fn rds_asg(
    scaler: &Scaler<RdsDatabase, AutoScalingGroups>,
    event: LambdaEvent<InvocationEvent>,
) -> Result<Outcome, Error> {
    let outcome = scaler
        .invoke(&event.payload, config::env_var)
        .await?;
    tracing::info!(outcome = ?outcome, request_id = %event.context.request_id, "done");
    Ok(outcome)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            std::env::var("LOG_LEVEL")
                .ok()
                .filter(|level| !level.is_empty())
                .and_then(|level| EnvFilter::try_new(level).ok())
        })
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .without_time()
        .init();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let rds = aws_sdk_rds::Client::new(&config);
    let autoscaling = aws_sdk_autoscaling::Client::new(&config);
    let scaler = Scaler::new(RdsDatabase::new(rds), AutoScalingGroups::new(autoscaling));

    lambda_runtime::run(service_fn(|event: LambdaEvent<InvocationEvent>| rds_asg(&scaler, event))).await
}
