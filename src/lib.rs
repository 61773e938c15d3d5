//! BattleKeep Library
//!
//! Keyed registry of live battle sessions. Each session is started, fed
//! protocol text, fast-forwarded, snapshotted and finally destroyed through
//! the registry, and the engine exposes the same four operations as
//! JSON-lines requests.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use core::battle::{Battle, BattleSnapshot, BattleStatus};
pub use core::engine::{BattleEngine, EngineRequest, EngineResponse};
pub use core::session::{
    Destroyable, Mutable, RegistryOptions, Runnable, Seek, Session, SessionRegistry, Snapshot,
};
pub use domain::config::{BattleKeepConfig, GlobalConfig, RestartPolicy};
pub use domain::error::{BattleKeepError, BattleKeepResult};
