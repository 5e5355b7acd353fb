use serde::{Deserialize, Serialize};

/// One complete point-in-time measurement of host and process resource usage.
///
/// Every decoded message produces a fresh value; nothing is merged with a
/// previous snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    pub cpu_usage: f64,
    pub mem_usage: f64,
    pub disk_usage: f64,
    pub net_traffic: f64,
    #[serde(default)]
    pub processes: Vec<ProcessSample>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub memory_usage: f64,
}

impl SystemSnapshot {
    /// Decode a `stats` event payload.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

impl Default for SystemSnapshot {
    fn default() -> Self {
        SystemSnapshot {
            cpu_usage: 0.0,
            mem_usage: 0.0,
            disk_usage: 0.0,
            net_traffic: 0.0,
            processes: Vec::new(),
        }
    }
}
