// Battle module - Protocol-driven battle state tracking
pub mod battle;
pub mod protocol;
pub mod state;

pub use battle::{Battle, DEFAULT_HISTORY_LIMIT};
pub use protocol::{parse_line, BattleEvent, ProtocolError};
pub use state::{BattleSnapshot, BattleStatus, PokemonState, SideState};
