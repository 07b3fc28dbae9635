use serde::{Deserialize, Serialize, Serializer};

/// A bot-hosting process known to the fleet controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    pub process_id: u32,
    pub name: String,
    pub port: u16,
    pub version: String,
    pub mode: String,
    pub bot_count: usize,
    pub is_online: bool,
    pub is_master: bool,
}

/// One bot inside an instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub routine: String,
    pub status: String,
    /// Connection label: trainer label once identified, else the connection name
    pub connection: String,
    pub is_running: bool,
    pub is_paused: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleStatus {
    pub process_id: u32,
    pub name: String,
    pub total_bots: usize,
    pub idle_bots: usize,
    pub is_fully_idle: bool,
}

impl IdleStatus {
    pub fn new<S: Into<String>>(process_id: u32, name: S, total_bots: usize, idle_bots: usize) -> Self {
        Self {
            process_id,
            name: name.into(),
            total_bots,
            idle_bots,
            is_fully_idle: total_bots > 0 && idle_bots == total_bots,
        }
    }
}

/// Outcome of a command relayed to one instance.
///
/// `success` exists only on the wire and is always `error.is_none()`; an
/// incoming `success` field is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub process_id: u32,
    pub port: u16,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CommandResult {
    pub fn ok<S: Into<String>>(process_id: u32, port: u16, response: S) -> Self {
        Self {
            process_id,
            port,
            response: Some(response.into()),
            error: None,
        }
    }

    pub fn failed<S: Into<String>>(process_id: u32, port: u16, error: S) -> Self {
        Self {
            process_id,
            port,
            response: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommandResultOut<'a> {
    process_id: u32,
    port: u16,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for CommandResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CommandResultOut {
            process_id: self.process_id,
            port: self.port,
            success: self.is_success(),
            response: self.response.as_deref(),
            error: self.error.as_deref(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstancesPayload {
    pub instances: Vec<InstanceInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotsPayload {
    pub bots: Vec<BotInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleStatusPayload {
    pub statuses: Vec<IdleStatus>,
    pub all_idle: bool,
}

impl IdleStatusPayload {
    pub fn from_statuses(statuses: Vec<IdleStatus>) -> Self {
        let all_idle = !statuses.is_empty() && statuses.iter().all(|s| s.is_fully_idle);
        Self { statuses, all_idle }
    }
}

/// Aggregate of a command sent to many instances
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCommandPayload {
    pub results: Vec<CommandResult>,
    pub total: usize,
    pub successful: usize,
}

impl BatchCommandPayload {
    pub fn from_results(results: Vec<CommandResult>) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.is_success()).count();
        Self {
            results,
            total,
            successful,
        }
    }

    /// Results that did not succeed; zero when the counts are inconsistent
    pub fn failed(&self) -> usize {
        self.total.saturating_sub(self.successful)
    }
}
