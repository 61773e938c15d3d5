use crate::core::battle::protocol::{parse_line, parse_poke_id, BattleEvent};
use crate::core::battle::state::{canonical_ident, BattleSnapshot, BattleStatus, PokemonState};
use crate::core::session::{Destroyable, Mutable, Runnable, Seek, Snapshot};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Applied lines kept per battle unless configured otherwise
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Battle state tracker driven by protocol lines
#[derive(Debug, Clone)]
pub struct Battle {
    /// Tracked state
    state: BattleSnapshot,
    /// Lines added but not yet applied
    queue: VecDeque<String>,
    /// Most recently applied lines
    history: VecDeque<String>,
    /// Maximum history size (0 = unlimited)
    history_limit: usize,
}

impl Battle {
    /// Create a new battle
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a new battle keeping at most `history_limit` applied lines
    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            state: BattleSnapshot::new(),
            queue: VecDeque::new(),
            history: VecDeque::new(),
            history_limit,
        }
    }

    pub fn status(&self) -> BattleStatus {
        self.state.status
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    /// Lines waiting to be applied
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Most recently applied lines, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.iter().cloned().collect()
    }

    /// Read-only view of the tracked state
    pub fn state(&self) -> &BattleSnapshot {
        &self.state
    }

    fn reached(&self, seek: Seek) -> bool {
        match seek {
            Seek::Turn(turn) => self.state.turn >= turn,
            Seek::End => false,
        }
    }

    fn apply_line(&mut self, line: String) {
        match parse_line(&line) {
            Ok(Some(event)) => self.apply_event(event),
            Ok(None) => trace!("Skipping line: {}", line),
            Err(e) => debug!("Ignoring malformed line {:?}: {}", line, e),
        }

        self.state.applied_lines += 1;
        self.history.push_back(line);
        if self.history_limit > 0 {
            while self.history.len() > self.history_limit {
                self.history.pop_front();
            }
        }
    }

    fn apply_event(&mut self, event: BattleEvent) {
        let state = &mut self.state;

        match event {
            BattleEvent::Player { side, name } => state.side_entry(&side).name = name,
            BattleEvent::TeamSize { side, size } => state.side_entry(&side).team_size = Some(size),
            BattleEvent::GameType(game_type) => state.game_type = Some(game_type),
            BattleEvent::Gen(gen) => state.gen = Some(gen),
            BattleEvent::Tier(tier) => state.tier = Some(tier),
            BattleEvent::Turn(turn) => state.turn = turn,
            BattleEvent::Switch {
                ident,
                details,
                condition,
            } => {
                let (side, name) = match parse_poke_id(&ident) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        debug!("Ignoring switch: {}", e);
                        return;
                    }
                };
                let pokemon = state
                    .side_entry(&side)
                    .switch_in(&canonical_ident(&side, &name), &details);
                if let Some(condition) = condition {
                    pokemon.apply_condition(&condition);
                }
            }
            BattleEvent::Move { ident, move_id } => {
                with_pokemon(state, &ident, |p| p.record_move(&move_id));
            }
            BattleEvent::Condition { ident, condition } => {
                with_pokemon(state, &ident, |p| p.apply_condition(&condition));
            }
            BattleEvent::Status { ident, status } => {
                with_pokemon(state, &ident, |p| p.status = status);
            }
            BattleEvent::CureStatus { ident } => {
                with_pokemon(state, &ident, |p| p.status.clear());
            }
            BattleEvent::Boost { ident, stat, amount } => {
                with_pokemon(state, &ident, |p| p.boost(&stat, amount));
            }
            BattleEvent::ClearBoost { ident } => {
                with_pokemon(state, &ident, |p| p.boosts.clear());
            }
            BattleEvent::Faint { ident } => {
                with_pokemon(state, &ident, |p| p.faint());
            }
            BattleEvent::Weather(weather) => state.weather = weather,
            BattleEvent::SideStart { side, condition } => {
                state.side_entry(&side).add_condition(&condition);
            }
            BattleEvent::SideEnd { side, condition } => {
                state.side_entry(&side).remove_condition(&condition);
            }
            BattleEvent::Win(winner) => {
                debug!("Battle won by {}", winner);
                state.winner = Some(winner);
                state.ended = true;
                state.status = BattleStatus::Ended;
            }
            BattleEvent::Tie => {
                debug!("Battle ended in a tie");
                state.winner = None;
                state.ended = true;
                state.status = BattleStatus::Ended;
            }
        }
    }
}

fn with_pokemon<F>(state: &mut BattleSnapshot, ident: &str, update: F)
where
    F: FnOnce(&mut PokemonState),
{
    match state.pokemon_mut(ident) {
        Some(pokemon) => update(pokemon),
        None => debug!("Ignoring event for unknown pokemon '{}'", ident),
    }
}

impl Default for Battle {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable for Battle {
    fn play(&mut self) {
        if self.state.status == BattleStatus::Created {
            self.state.status = BattleStatus::Playing;
        }
    }
}

impl Mutable for Battle {
    fn add(&mut self, changes: &str) {
        if self.state.status == BattleStatus::Destroyed {
            warn!("Dropping changes added to a destroyed battle");
            return;
        }

        self.queue.extend(
            changes
                .split('\n')
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    fn fast_forward_to(&mut self, seek: Seek) {
        if self.state.status == BattleStatus::Destroyed {
            return;
        }
        self.play();

        let before = self.state.applied_lines;
        while !self.reached(seek) {
            let Some(line) = self.queue.pop_front() else {
                break;
            };
            self.apply_line(line);
        }

        trace!(
            "Fast-forwarded to {}: applied {} lines, {} pending",
            seek,
            self.state.applied_lines - before,
            self.queue.len()
        );
    }
}

impl Destroyable for Battle {
    fn destroy(&mut self) {
        self.queue.clear();
        self.history.clear();
        self.state.status = BattleStatus::Destroyed;
    }
}

impl Snapshot for Battle {
    type Snapshot = BattleSnapshot;

    fn snapshot(&self) -> BattleSnapshot {
        let mut snapshot = self.state.clone();
        snapshot.pending_lines = self.queue.len();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENING: &str = "|player|p1|Alice|1\n\
        |player|p2|Bob|2\n\
        |teamsize|p1|6\n\
        |teamsize|p2|6\n\
        |gametype|singles\n\
        |gen|7\n\
        |tier|[Gen 7] Random Battle\n\
        |\n\
        |start\n\
        |switch|p1a: Pikachu|Pikachu, L82, M|100/100\n\
        |switch|p2a: Onix|Onix, L90, F|100/100\n\
        |turn|1";

    fn create_test_battle() -> Battle {
        let mut battle = Battle::new();
        battle.play();
        battle.add(OPENING);
        battle.fast_forward_to(Seek::End);
        battle
    }

    #[test]
    fn test_battle_creation() {
        let battle = Battle::new();
        assert_eq!(battle.status(), BattleStatus::Created);
        assert_eq!(battle.turn(), 0);
        assert_eq!(battle.pending(), 0);
        assert!(battle.history().is_empty());
    }

    #[test]
    fn test_play_is_idempotent() {
        let mut battle = Battle::new();
        battle.play();
        battle.play();
        assert_eq!(battle.status(), BattleStatus::Playing);
    }

    #[test]
    fn test_opening_lines() {
        let battle = create_test_battle();
        let state = battle.snapshot();

        assert_eq!(state.turn, 1);
        assert_eq!(state.gen, Some(7));
        assert_eq!(state.game_type.as_deref(), Some("singles"));
        assert_eq!(state.tier.as_deref(), Some("[Gen 7] Random Battle"));
        assert_eq!(state.applied_lines, 12);
        assert_eq!(state.pending_lines, 0);

        let p1 = state.side("p1").unwrap();
        assert_eq!(p1.name, "Alice");
        assert_eq!(p1.team_size, Some(6));
        assert_eq!(p1.active.as_deref(), Some("p1: Pikachu"));

        let onix = state.pokemon("p2a: Onix").unwrap();
        assert_eq!(onix.level, 90);
        assert_eq!(onix.gender, "F");
        assert!(onix.active);
    }

    #[test]
    fn test_add_queues_without_applying() {
        let mut battle = create_test_battle();
        battle.add("|move|p1a: Pikachu|Thunderbolt|p2a: Onix\r\n|-damage|p2a: Onix|60/100\n\n");

        assert_eq!(battle.pending(), 2);
        assert_eq!(battle.snapshot().pending_lines, 2);
        assert_eq!(battle.state().pokemon("p2a: Onix").unwrap().hp, 100);

        battle.fast_forward_to(Seek::End);
        assert_eq!(battle.pending(), 0);
        assert_eq!(battle.state().pokemon("p2a: Onix").unwrap().hp, 60);
        assert_eq!(
            battle.state().pokemon("p1a: Pikachu").unwrap().move_track,
            vec![("thunderbolt".to_string(), 1)]
        );
    }

    #[test]
    fn test_seek_to_turn() {
        let mut battle = create_test_battle();
        battle.add(
            "|move|p1a: Pikachu|Thunderbolt|p2a: Onix\n|turn|2\n\
             |move|p1a: Pikachu|Thunderbolt|p2a: Onix\n|turn|3",
        );

        battle.fast_forward_to(Seek::Turn(2));
        assert_eq!(battle.turn(), 2);
        assert_eq!(battle.pending(), 2);

        // Already there, nothing more is applied
        battle.fast_forward_to(Seek::Turn(2));
        assert_eq!(battle.pending(), 2);

        battle.fast_forward_to(Seek::from(-1));
        assert_eq!(battle.turn(), 3);
        assert_eq!(battle.pending(), 0);
    }

    #[test]
    fn test_status_boosts_and_field() {
        let mut battle = create_test_battle();
        battle.add(
            "|-status|p2a: Onix|par\n\
             |-boost|p1a: Pikachu|spa|2\n\
             |-weather|RainDance\n\
             |-sidestart|p2: Bob|move: Stealth Rock\n\
             |-curestatus|p2a: Onix|par\n\
             |-unboost|p1a: Pikachu|spa|1",
        );
        battle.fast_forward_to(Seek::End);

        let state = battle.snapshot();
        assert_eq!(state.weather, "RainDance");
        assert_eq!(state.side("p2").unwrap().side_conditions, vec!["Stealth Rock".to_string()]);
        assert_eq!(state.pokemon("p2a: Onix").unwrap().status, "");
        assert_eq!(state.pokemon("p1a: Pikachu").unwrap().boosts.get("spa"), Some(&1));

        battle.add("|-weather|none\n|-sideend|p2: Bob|Stealth Rock\n|-clearboost|p1a: Pikachu");
        battle.fast_forward_to(Seek::End);
        let state = battle.snapshot();
        assert_eq!(state.weather, "");
        assert!(state.side("p2").unwrap().side_conditions.is_empty());
        assert!(state.pokemon("p1a: Pikachu").unwrap().boosts.is_empty());
    }

    #[test]
    fn test_faint_and_win() {
        let mut battle = create_test_battle();
        battle.add("|-damage|p2a: Onix|0 fnt\n|faint|p2a: Onix\n|win|Alice");
        battle.fast_forward_to(Seek::End);

        let state = battle.snapshot();
        let onix = state.pokemon("p2a: Onix").unwrap();
        assert!(onix.fainted);
        assert_eq!(onix.hp, 0);
        assert_eq!(state.side("p2").unwrap().remaining(), 0);
        assert!(state.ended);
        assert_eq!(state.winner.as_deref(), Some("Alice"));
        assert_eq!(state.status, BattleStatus::Ended);
    }

    #[test]
    fn test_tie() {
        let mut battle = create_test_battle();
        battle.add("|tie");
        battle.fast_forward_to(Seek::End);
        assert!(battle.snapshot().ended);
        assert!(battle.snapshot().winner.is_none());
    }

    #[test]
    fn test_malformed_and_unknown_lines_are_counted() {
        let mut battle = create_test_battle();
        battle.add("|turn|soon\n|-damage|p2a: Nobody|10/100\n|c|Bob|gg\nraw text");
        battle.fast_forward_to(Seek::End);

        let state = battle.snapshot();
        assert_eq!(state.turn, 1);
        assert_eq!(state.applied_lines, 16);
    }

    #[test]
    fn test_huge_boost_amounts_are_clamped() {
        let mut battle = create_test_battle();
        battle.add(
            "|-unboost|p1a: Pikachu|atk|2147483648\n\
             |-boost|p1a: Pikachu|spe|1\n\
             |-boost|p1a: Pikachu|spe|2147483647",
        );
        battle.fast_forward_to(Seek::End);

        let state = battle.snapshot();
        let pikachu = state.pokemon("p1a: Pikachu").unwrap();
        assert_eq!(pikachu.boosts.get("atk"), Some(&-6));
        assert_eq!(pikachu.boosts.get("spe"), Some(&6));
    }

    #[test]
    fn test_history_limit() {
        let mut battle = Battle::with_history_limit(3);
        battle.add(OPENING);
        battle.fast_forward_to(Seek::End);

        assert_eq!(battle.status(), BattleStatus::Playing);
        assert_eq!(
            battle.history(),
            vec![
                "|switch|p1a: Pikachu|Pikachu, L82, M|100/100".to_string(),
                "|switch|p2a: Onix|Onix, L90, F|100/100".to_string(),
                "|turn|1".to_string(),
            ]
        );
        assert_eq!(battle.snapshot().applied_lines, 12);
    }

    #[test]
    fn test_destroy() {
        let mut battle = create_test_battle();
        battle.add("|turn|2");
        battle.destroy();

        assert_eq!(battle.status(), BattleStatus::Destroyed);
        assert_eq!(battle.pending(), 0);
        assert!(battle.history().is_empty());

        battle.add("|turn|3");
        battle.fast_forward_to(Seek::End);
        assert_eq!(battle.pending(), 0);
        assert_eq!(battle.turn(), 1);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let battle = create_test_battle();
        let mut snapshot = battle.snapshot();
        snapshot.turn = 99;
        snapshot.sides[0].pokemon.clear();

        let fresh = battle.snapshot();
        assert_eq!(fresh.turn, 1);
        assert_eq!(fresh.sides[0].pokemon.len(), 1);
    }
}
