use serde::{Deserialize, Serialize};

/// BattleKeep configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleKeepConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Maximum number of live sessions (0 = unlimited)
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// What `start` does with a key that already has a session
    #[serde(default)]
    pub restart_policy: RestartPolicy,
    /// Applied protocol lines kept per battle (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Behavior of `start` on an occupied key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestartPolicy {
    /// Release the existing session and put a fresh one in its place
    #[default]
    Replace,
    /// Refuse with `SessionExists`
    Reject,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_sessions() -> usize {
    0
}

fn default_history_limit() -> usize {
    1000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_sessions: default_max_sessions(),
            restart_policy: RestartPolicy::default(),
            history_limit: default_history_limit(),
        }
    }
}

impl std::fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestartPolicy::Replace => write!(f, "replace"),
            RestartPolicy::Reject => write!(f, "reject"),
        }
    }
}
