use crate::core::battle::protocol::{parse_poke_id, HpStatus, PokeDetails};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stat stages are clamped to this range
pub const MAX_BOOST: i32 = 6;

/// Battle lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleStatus {
    /// Constructed, not yet played
    Created,
    /// Accepting and applying protocol lines
    Playing,
    /// A win or tie has been seen
    Ended,
    /// Resources released
    Destroyed,
}

/// Observable battle state.
///
/// Every cross reference is an ident string, so the structure is a plain
/// tree and a clone is a complete, independent copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub status: BattleStatus,
    pub turn: u32,
    pub ended: bool,
    pub winner: Option<String>,
    pub weather: String,
    pub game_type: Option<String>,
    pub gen: Option<u32>,
    pub tier: Option<String>,
    /// Lines applied since the battle was created
    pub applied_lines: usize,
    /// Lines queued but not yet applied
    pub pending_lines: usize,
    pub sides: Vec<SideState>,
}

/// One player's side of the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideState {
    /// `p1`, `p2`, ...
    pub id: String,
    pub name: String,
    pub team_size: Option<u32>,
    /// Ident of the pokemon currently on the field
    pub active: Option<String>,
    pub side_conditions: Vec<String>,
    pub pokemon: Vec<PokemonState>,
}

/// A pokemon as revealed so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonState {
    /// `"p1: Pikachu"`
    pub ident: String,
    pub species: String,
    pub level: u32,
    pub gender: String,
    pub shiny: bool,
    pub hp: u32,
    pub maxhp: u32,
    pub status: String,
    pub fainted: bool,
    pub active: bool,
    pub boosts: BTreeMap<String, i32>,
    /// Move id and use count, in order of first use
    pub move_track: Vec<(String, u32)>,
}

impl BattleSnapshot {
    /// Fresh two-sided state
    pub fn new() -> Self {
        Self {
            status: BattleStatus::Created,
            turn: 0,
            ended: false,
            winner: None,
            weather: String::new(),
            game_type: None,
            gen: None,
            tier: None,
            applied_lines: 0,
            pending_lines: 0,
            sides: vec![SideState::new("p1"), SideState::new("p2")],
        }
    }

    /// Look up a side by id
    pub fn side(&self, id: &str) -> Option<&SideState> {
        self.sides.iter().find(|side| side.id == id)
    }

    /// Look up a side by id, adding it if this is the first time it shows up
    pub fn side_entry(&mut self, id: &str) -> &mut SideState {
        let index = match self.sides.iter().position(|side| side.id == id) {
            Some(index) => index,
            None => {
                self.sides.push(SideState::new(id));
                self.sides.len() - 1
            }
        };
        &mut self.sides[index]
    }

    /// Find a pokemon by any ident form (`p1a: Name` or `p1: Name`)
    pub fn pokemon(&self, ident: &str) -> Option<&PokemonState> {
        let (side, name) = parse_poke_id(ident).ok()?;
        self.side(&side)?.find(&canonical_ident(&side, &name))
    }

    /// Mutable variant of [`BattleSnapshot::pokemon`]
    pub fn pokemon_mut(&mut self, ident: &str) -> Option<&mut PokemonState> {
        let (side, name) = parse_poke_id(ident).ok()?;
        let ident = canonical_ident(&side, &name);
        self.sides
            .iter_mut()
            .find(|s| s.id == side)?
            .find_mut(&ident)
    }

    /// Check if the battle has ended
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl Default for BattleSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl SideState {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            team_size: None,
            active: None,
            side_conditions: Vec::new(),
            pokemon: Vec::new(),
        }
    }

    pub fn find(&self, ident: &str) -> Option<&PokemonState> {
        self.pokemon.iter().find(|p| p.ident == ident)
    }

    pub fn find_mut(&mut self, ident: &str) -> Option<&mut PokemonState> {
        self.pokemon.iter_mut().find(|p| p.ident == ident)
    }

    /// Put `ident` on the field, taking the previous active pokemon off it.
    /// The pokemon is created from `details` when it has not been seen yet.
    pub fn switch_in(&mut self, ident: &str, details: &PokeDetails) -> &mut PokemonState {
        if let Some(previous) = self.active.take() {
            if let Some(pokemon) = self.find_mut(&previous) {
                pokemon.active = false;
                pokemon.boosts.clear();
            }
        }
        self.active = Some(ident.to_string());

        let index = match self.pokemon.iter().position(|p| p.ident == ident) {
            Some(index) => index,
            None => {
                self.pokemon.push(PokemonState::new(ident, details));
                self.pokemon.len() - 1
            }
        };

        let pokemon = &mut self.pokemon[index];
        // Forme changes and transformations show up as new details
        pokemon.species = details.species.clone();
        pokemon.level = details.level;
        pokemon.active = true;
        pokemon
    }

    pub fn add_condition(&mut self, condition: &str) {
        if !self.side_conditions.iter().any(|c| c == condition) {
            self.side_conditions.push(condition.to_string());
        }
    }

    pub fn remove_condition(&mut self, condition: &str) {
        self.side_conditions.retain(|c| c != condition);
    }

    /// Pokemon that have not fainted
    pub fn remaining(&self) -> usize {
        self.pokemon.iter().filter(|p| !p.fainted).count()
    }
}

impl PokemonState {
    pub fn new(ident: &str, details: &PokeDetails) -> Self {
        Self {
            ident: ident.to_string(),
            species: details.species.clone(),
            level: details.level,
            gender: details.gender.clone(),
            shiny: details.shiny,
            hp: 100,
            maxhp: 100,
            status: String::new(),
            fainted: false,
            active: false,
            boosts: BTreeMap::new(),
            move_track: Vec::new(),
        }
    }

    /// Apply an `HP STATUS` update
    pub fn apply_condition(&mut self, condition: &HpStatus) {
        if let Some(hp) = condition.hp {
            self.hp = hp;
        }
        if let Some(maxhp) = condition.maxhp {
            self.maxhp = maxhp;
        }

        if condition.is_fainted() {
            self.faint();
        } else {
            self.status = condition.status.clone();
            if self.hp > 0 {
                self.fainted = false;
            }
        }
    }

    pub fn faint(&mut self) {
        self.hp = 0;
        self.fainted = true;
        self.status.clear();
    }

    /// Change a stat stage, clamped to ±[`MAX_BOOST`]
    pub fn boost(&mut self, stat: &str, amount: i32) {
        let stage = self.boosts.entry(stat.to_string()).or_insert(0);
        *stage = stage.saturating_add(amount).clamp(-MAX_BOOST, MAX_BOOST);
        if *stage == 0 {
            self.boosts.remove(stat);
        }
    }

    /// Count one use of a move
    pub fn record_move(&mut self, move_id: &str) {
        match self.move_track.iter_mut().find(|(id, _)| id == move_id) {
            Some((_, uses)) => *uses += 1,
            None => self.move_track.push((move_id.to_string(), 1)),
        }
    }

    /// Percentage of hp left, 0 when max hp is unknown
    pub fn hp_fraction(&self) -> f64 {
        if self.maxhp == 0 {
            0.0
        } else {
            f64::from(self.hp) / f64::from(self.maxhp)
        }
    }
}

/// `("p1", "Pikachu")` → `"p1: Pikachu"`
pub fn canonical_ident(side: &str, name: &str) -> String {
    format!("{}: {}", side, name)
}

impl std::fmt::Display for BattleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BattleStatus::Created => write!(f, "Created"),
            BattleStatus::Playing => write!(f, "Playing"),
            BattleStatus::Ended => write!(f, "Ended"),
            BattleStatus::Destroyed => write!(f, "Destroyed"),
        }
    }
}
