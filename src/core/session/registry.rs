use crate::core::session::session::{Seek, Session};
use crate::domain::config::{GlobalConfig, RestartPolicy};
use crate::domain::error::{BattleKeepError, BattleKeepResult};
use std::collections::HashMap;
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Builds a fresh session for `start`
pub type SessionFactory<S> = Box<dyn Fn() -> S>;

/// Registry limits and policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Maximum number of live sessions (0 = unlimited)
    pub max_sessions: usize,
    /// What `start` does with an occupied key
    pub restart_policy: RestartPolicy,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            max_sessions: 0,
            restart_policy: RestartPolicy::Replace,
        }
    }
}

impl From<&GlobalConfig> for RegistryOptions {
    fn from(config: &GlobalConfig) -> Self {
        Self {
            max_sessions: config.max_sessions,
            restart_policy: config.restart_policy,
        }
    }
}

/// Keyed registry owning one session per key
pub struct SessionRegistry<S: Session> {
    /// Live sessions
    sessions: HashMap<String, S>,
    /// Session constructor
    factory: SessionFactory<S>,
    /// Limits and policies
    options: RegistryOptions,
}

impl<S: Session + Default + 'static> SessionRegistry<S> {
    /// Create a registry that builds sessions with `S::default()`
    pub fn with_defaults(options: RegistryOptions) -> Self {
        Self::new(Box::new(S::default), options)
    }
}

impl<S: Session> SessionRegistry<S> {
    /// Create a new session registry
    pub fn new(factory: SessionFactory<S>, options: RegistryOptions) -> Self {
        Self {
            sessions: HashMap::new(),
            factory,
            options,
        }
    }

    /// Create a session under `key` and run it.
    ///
    /// An occupied key is handled by the configured [`RestartPolicy`]:
    /// `Replace` releases the old session first, `Reject` fails with
    /// [`BattleKeepError::SessionExists`].
    pub fn start(&mut self, key: &str) -> BattleKeepResult<()> {
        debug!("registry.start({})", key);

        if self.sessions.contains_key(key) {
            if self.options.restart_policy == RestartPolicy::Reject {
                return Err(BattleKeepError::SessionExists {
                    key: key.to_string(),
                });
            }
            if let Some(mut existing) = self.sessions.remove(key) {
                warn!("Replacing existing session '{}'", key);
                existing.destroy();
            }
        } else if self.is_full() {
            return Err(BattleKeepError::RegistryFull {
                max: self.options.max_sessions,
            });
        }

        let mut session = (self.factory)();
        session.play();
        self.sessions.insert(key.to_string(), session);

        info!("Started session '{}'", key);
        Ok(())
    }

    /// Append `changes` to the session at `key` and advance it to completion
    pub fn transition<C: Display + ?Sized>(
        &mut self,
        key: &str,
        changes: &C,
    ) -> BattleKeepResult<()> {
        self.advance(key, changes, Seek::End)
    }

    /// Append `changes` to the session at `key` and advance it to `seek`
    pub fn advance<C: Display + ?Sized>(
        &mut self,
        key: &str,
        changes: &C,
        seek: Seek,
    ) -> BattleKeepResult<()> {
        let changes = changes.to_string();
        debug!("registry.transition({}, {} bytes, {})", key, changes.len(), seek);

        let session = self
            .sessions
            .get_mut(key)
            .ok_or_else(|| BattleKeepError::not_found(key))?;

        session.add(&changes);
        session.fast_forward_to(seek);
        Ok(())
    }

    /// Independent copy of the state of the session at `key`
    pub fn fetch(&self, key: &str) -> BattleKeepResult<S::Snapshot> {
        debug!("registry.fetch({})", key);

        self.sessions
            .get(key)
            .map(|session| session.snapshot())
            .ok_or_else(|| BattleKeepError::not_found(key))
    }

    /// State of the session at `key` as plain JSON data
    pub fn fetch_json(&self, key: &str) -> BattleKeepResult<serde_json::Value> {
        let snapshot = self.fetch(key)?;
        Ok(serde_json::to_value(snapshot)?)
    }

    /// Release the session at `key` and remove it
    pub fn stop(&mut self, key: &str) -> BattleKeepResult<()> {
        debug!("registry.stop({})", key);

        let mut session = self
            .sessions
            .remove(key)
            .ok_or_else(|| BattleKeepError::not_found(key))?;
        session.destroy();

        info!("Stopped session '{}'", key);
        Ok(())
    }

    /// Release and remove every session, returning how many there were
    pub fn stop_all(&mut self) -> usize {
        let count = self.sessions.len();
        for (_, mut session) in self.sessions.drain() {
            session.destroy();
        }

        if count > 0 {
            info!("Stopped {} sessions", count);
        }
        count
    }

    /// Check if a session exists
    pub fn has_session(&self, key: &str) -> bool {
        self.sessions.contains_key(key)
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sessions.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Get maximum sessions (0 = unlimited)
    pub fn max_sessions(&self) -> usize {
        self.options.max_sessions
    }

    fn is_full(&self) -> bool {
        self.options.max_sessions > 0 && self.sessions.len() >= self.options.max_sessions
    }
}

impl<S: Session> Drop for SessionRegistry<S> {
    fn drop(&mut self) {
        self.stop_all();
    }
}
