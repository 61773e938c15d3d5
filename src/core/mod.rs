// Core module - Session registry, battle tracking and the engine façade
pub mod battle;
pub mod engine;
pub mod session;
