use serde::Deserialize;

/// Trigger payload. Autoscaling lifecycle events carry the group name in
/// `detail`; scheduled rule events carry the rule ARN in `resources`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvocationEvent {
    #[serde(default)]
    pub detail: Option<Detail>,
    #[serde(default)]
    pub resources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Detail {
    #[serde(rename = "AutoScalingGroupName", default)]
    pub auto_scaling_group_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalSource {
    Group(String),
    Rule(String),
}

impl InvocationEvent {
    pub fn signal_source(&self) -> Option<SignalSource> {
        let group = self
            .detail
            .as_ref()
            .and_then(|d| d.auto_scaling_group_name.as_deref())
            .filter(|name| !name.is_empty());
        if let Some(name) = group {
            return Some(SignalSource::Group(name.to_string()));
        }
        self.resources
            .as_deref()
            .and_then(|resources| resources.first())
            .map(|arn| SignalSource::Rule(arn.clone()))
    }
}
