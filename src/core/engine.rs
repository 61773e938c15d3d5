//! JSON request/response façade over a battle registry
//!
//! One request per line in, one response per line out:
//!
//! ```text
//! {"op":"start","key":"a"}
//!     -> {"ok":true}
//! {"op":"transition","key":"a","changes":"|turn|1"}
//!     -> {"ok":true}
//! {"op":"fetch","key":"a"}
//!     -> {"ok":true,"result":{...}}
//! {"op":"fetch","key":"zz"}
//!     -> {"ok":false,"error":"Could not find session 'zz'"}
//! ```

use crate::core::battle::Battle;
use crate::core::session::{RegistryOptions, SessionRegistry};
use crate::domain::config::GlobalConfig;
use crate::domain::error::BattleKeepResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

/// Engine request, tagged by `op`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EngineRequest {
    Start { key: String },
    Transition { key: String, changes: Value },
    Fetch { key: String },
    Stop { key: String },
    List,
}

/// Engine response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EngineResponse {
    pub fn success(result: Value) -> Self {
        Self {
            ok: true,
            result,
            error: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            ok: false,
            result: Value::Null,
            error: Some(error.to_string()),
        }
    }
}

impl From<BattleKeepResult<Value>> for EngineResponse {
    fn from(result: BattleKeepResult<Value>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(e) => Self::failure(e),
        }
    }
}

impl EngineRequest {
    /// Operation name, for logging
    pub fn op(&self) -> &'static str {
        match self {
            EngineRequest::Start { .. } => "start",
            EngineRequest::Transition { .. } => "transition",
            EngineRequest::Fetch { .. } => "fetch",
            EngineRequest::Stop { .. } => "stop",
            EngineRequest::List => "list",
        }
    }
}

/// Text form of a change payload: strings verbatim, anything else as compact JSON
pub fn changes_text(changes: &Value) -> String {
    match changes {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Battle engine answering requests against one registry
pub struct BattleEngine {
    registry: SessionRegistry<Battle>,
}

impl BattleEngine {
    /// Create an engine over an existing registry
    pub fn new(registry: SessionRegistry<Battle>) -> Self {
        Self { registry }
    }

    /// Create an engine whose battles and limits follow the configuration
    pub fn from_config(config: &GlobalConfig) -> Self {
        let history_limit = config.history_limit;
        let registry = SessionRegistry::new(
            Box::new(move || Battle::with_history_limit(history_limit)),
            RegistryOptions::from(config),
        );
        Self::new(registry)
    }

    /// Handle one request
    pub fn handle(&mut self, request: EngineRequest) -> EngineResponse {
        debug!("engine.{}", request.op());

        let result = match request {
            EngineRequest::Start { key } => self.registry.start(&key).map(|_| Value::Null),
            EngineRequest::Transition { key, changes } => self
                .registry
                .transition(&key, &changes_text(&changes))
                .map(|_| Value::Null),
            EngineRequest::Fetch { key } => self.registry.fetch_json(&key),
            EngineRequest::Stop { key } => self.registry.stop(&key).map(|_| Value::Null),
            EngineRequest::List => Ok(Value::from(self.registry.keys())),
        };

        if let Err(e) = &result {
            error!("Engine request failed: {}", e);
        }
        EngineResponse::from(result)
    }

    /// Parse one request line and render the response line
    pub fn handle_line(&mut self, line: &str) -> String {
        let response = match serde_json::from_str::<EngineRequest>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                error!("Invalid engine request: {}", e);
                EngineResponse::failure(format!("Invalid request: {}", e))
            }
        };

        serde_json::to_string(&response)
            .unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"{}"}}"#, e))
    }

    /// Stop every battle, returning how many were live
    pub fn shutdown(&mut self) -> usize {
        self.registry.stop_all()
    }

    pub fn registry(&self) -> &SessionRegistry<Battle> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SessionRegistry<Battle> {
        &mut self.registry
    }
}

impl Default for BattleEngine {
    fn default() -> Self {
        Self::from_config(&GlobalConfig::default())
    }
}
