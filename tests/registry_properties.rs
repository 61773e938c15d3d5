use battlekeep::{Battle, BattleKeepError, RegistryOptions, Seek, SessionRegistry};
use proptest::prelude::*;

fn registry() -> SessionRegistry<Battle> {
    SessionRegistry::with_defaults(RegistryOptions::default())
}

proptest! {
    #[test]
    fn missing_key_error_names_the_key(key in "[a-zA-Z0-9_-]{1,24}") {
        let mut registry = registry();

        for err in [
            registry.transition(&key, "|turn|1").unwrap_err(),
            registry.fetch(&key).unwrap_err(),
            registry.stop(&key).unwrap_err(),
        ] {
            let is_not_found = matches!(err, BattleKeepError::SessionNotFound { .. });
            prop_assert!(is_not_found);
            prop_assert!(err.to_string().contains(&key));
        }
    }

    #[test]
    fn stopped_sessions_stay_gone(keys in prop::collection::btree_set("[a-z]{1,8}", 1..8)) {
        let mut registry = registry();
        for key in &keys {
            registry.start(key).unwrap();
        }
        prop_assert_eq!(registry.session_count(), keys.len());

        for key in &keys {
            registry.stop(key).unwrap();
            prop_assert!(registry.transition(key, "|turn|1").is_err());
            prop_assert!(!registry.has_session(key));
        }
        prop_assert!(registry.is_empty());
    }

    #[test]
    fn turn_seek_never_overshoots(turns in 1u32..30, target in 1u32..30) {
        let log: String = (1..=turns).map(|t| format!("|turn|{}\n", t)).collect();
        let mut registry = registry();
        registry.start("a").unwrap();
        registry.advance("a", log.as_str(), Seek::Turn(target)).unwrap();

        let state = registry.fetch("a").unwrap();
        prop_assert_eq!(state.turn, target.min(turns));
        prop_assert_eq!(state.applied_lines + state.pending_lines, turns as usize);
    }
}
