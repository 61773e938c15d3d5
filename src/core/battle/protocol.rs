//! Battle protocol parsing
//!
//! Lines look like `|switch|p1a: Pikachu|Pikachu, L82, M|100/100`. Only the
//! commands that move tracked state are turned into [`BattleEvent`]s; every
//! other line parses to `None`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed arguments on a recognised command
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProtocolError {
    #[error("'{command}' is missing argument {index}")]
    MissingArgument { command: String, index: usize },

    #[error("'{command}' has an invalid number: {value}")]
    InvalidNumber { command: String, value: String },

    #[error("Invalid pokemon ident: {0}")]
    InvalidIdent(String),

    #[error("Invalid side id: {0}")]
    InvalidSide(String),

    #[error("Invalid hp/status: {0}")]
    InvalidCondition(String),
}

/// Species details carried by switch-in lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokeDetails {
    pub species: String,
    pub level: u32,
    pub gender: String,
    pub shiny: bool,
}

/// Parsed `HP STATUS` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpStatus {
    pub hp: Option<u32>,
    pub maxhp: Option<u32>,
    pub status: String,
}

impl HpStatus {
    pub fn is_fainted(&self) -> bool {
        self.status == "fnt"
    }
}

/// State-changing battle events
#[derive(Debug, Clone, PartialEq)]
pub enum BattleEvent {
    Player { side: String, name: String },
    TeamSize { side: String, size: u32 },
    GameType(String),
    Gen(u32),
    Tier(String),
    Turn(u32),
    Switch {
        ident: String,
        details: PokeDetails,
        condition: Option<HpStatus>,
    },
    Move { ident: String, move_id: String },
    Condition { ident: String, condition: HpStatus },
    Status { ident: String, status: String },
    CureStatus { ident: String },
    Boost { ident: String, stat: String, amount: i32 },
    ClearBoost { ident: String },
    Faint { ident: String },
    Weather(String),
    SideStart { side: String, condition: String },
    SideEnd { side: String, condition: String },
    Win(String),
    Tie,
}

/// Lowercase and strip everything outside `[a-z0-9+]`
pub fn to_id(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '+')
        .collect()
}

/// `"p2a: Tapu Bulu"` → `("p2", "Tapu Bulu")`
pub fn parse_poke_id(ident: &str) -> Result<(String, String), ProtocolError> {
    let (position, name) = ident
        .split_once(':')
        .ok_or_else(|| ProtocolError::InvalidIdent(ident.to_string()))?;

    let side = parse_side_id(position)
        .map_err(|_| ProtocolError::InvalidIdent(ident.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ProtocolError::InvalidIdent(ident.to_string()));
    }

    Ok((side, name.to_string()))
}

/// `"p1"`, `"p1a"` or `"p1: Alice"` → `"p1"`
pub fn parse_side_id(value: &str) -> Result<String, ProtocolError> {
    let value = value.trim();
    let mut chars = value.chars();

    match (chars.next(), chars.next()) {
        (Some('p'), Some(digit)) if digit.is_ascii_digit() => Ok(format!("p{}", digit)),
        _ => Err(ProtocolError::InvalidSide(value.to_string())),
    }
}

/// `"Pikachu, L82, F, shiny"` → species id, level, gender, shiny
pub fn parse_poke_details(details: &str) -> PokeDetails {
    let mut parts = details.split(',').map(str::trim);
    let mut rv = PokeDetails {
        species: to_id(parts.next().unwrap_or_default()),
        level: 100,
        gender: "*".to_string(),
        shiny: false,
    };

    for part in parts {
        if let Some(level) = part.strip_prefix('L') {
            if let Ok(level) = level.parse() {
                rv.level = level;
            }
        } else if part == "shiny" {
            rv.shiny = true;
        } else if part == "M" || part == "F" {
            rv.gender = part.to_string();
        }
    }

    rv
}

/// Parse `"100/100"`, `"75/350 psn"`, `"0 fnt"` or a bare `"brn"`
pub fn parse_hp_status(value: &str) -> Result<HpStatus, ProtocolError> {
    let invalid = || ProtocolError::InvalidCondition(value.to_string());
    let mut parts = value.split_whitespace();
    let first = parts.next().ok_or_else(invalid)?;
    let second = parts.next();
    if parts.next().is_some() {
        return Err(invalid());
    }

    let (hp, status) = match second {
        Some(status) => (Some(first), status),
        None if first.starts_with(|c: char| c.is_ascii_digit()) => (Some(first), ""),
        None => (None, first),
    };

    let Some(hp) = hp else {
        return Ok(HpStatus {
            hp: None,
            maxhp: None,
            status: status.to_string(),
        });
    };

    if hp == "0" {
        return Ok(HpStatus {
            hp: Some(0),
            maxhp: None,
            status: status.to_string(),
        });
    }

    let (current, max) = hp.split_once('/').ok_or_else(invalid)?;
    Ok(HpStatus {
        hp: Some(current.parse().map_err(|_| invalid())?),
        maxhp: Some(max.parse().map_err(|_| invalid())?),
        status: status.to_string(),
    })
}

/// Parse one protocol line.
///
/// Returns `Ok(None)` for lines that carry no tracked state (chat, blank
/// lines, commands this tracker does not follow).
pub fn parse_line(line: &str) -> Result<Option<BattleEvent>, ProtocolError> {
    let Some(body) = line.strip_prefix('|') else {
        return Ok(None);
    };

    let args: Vec<&str> = body.split('|').collect();
    let command = args[0];
    let arg = |index: usize| -> Result<&str, ProtocolError> {
        args.get(index)
            .copied()
            .ok_or_else(|| ProtocolError::MissingArgument {
                command: command.to_string(),
                index,
            })
    };
    let number = |index: usize| -> Result<u32, ProtocolError> {
        let value = arg(index)?;
        value.trim().parse().map_err(|_| ProtocolError::InvalidNumber {
            command: command.to_string(),
            value: value.to_string(),
        })
    };

    let event = match command {
        "player" => {
            let name = args.get(2).copied().unwrap_or_default().trim();
            if name.is_empty() {
                return Ok(None);
            }
            BattleEvent::Player {
                side: parse_side_id(arg(1)?)?,
                name: name.to_string(),
            }
        }
        "teamsize" => BattleEvent::TeamSize {
            side: parse_side_id(arg(1)?)?,
            size: number(2)?,
        },
        "gametype" => BattleEvent::GameType(arg(1)?.to_string()),
        "gen" => BattleEvent::Gen(number(1)?),
        "tier" => BattleEvent::Tier(arg(1)?.to_string()),
        "turn" => BattleEvent::Turn(number(1)?),
        "switch" | "drag" | "replace" => BattleEvent::Switch {
            ident: arg(1)?.to_string(),
            details: parse_poke_details(arg(2)?),
            condition: match args.get(3) {
                Some(condition) if !condition.trim().is_empty() => {
                    Some(parse_hp_status(condition)?)
                }
                _ => None,
            },
        },
        "move" => BattleEvent::Move {
            ident: arg(1)?.to_string(),
            move_id: to_id(arg(2)?),
        },
        "-damage" | "-heal" | "-sethp" => BattleEvent::Condition {
            ident: arg(1)?.to_string(),
            condition: parse_hp_status(arg(2)?)?,
        },
        "-status" => BattleEvent::Status {
            ident: arg(1)?.to_string(),
            status: arg(2)?.trim().to_string(),
        },
        "-curestatus" => BattleEvent::CureStatus {
            ident: arg(1)?.to_string(),
        },
        "-boost" | "-unboost" => {
            let amount = i32::try_from(number(3)?).unwrap_or(i32::MAX);
            BattleEvent::Boost {
                ident: arg(1)?.to_string(),
                stat: arg(2)?.trim().to_string(),
                amount: if command == "-unboost" { -amount } else { amount },
            }
        }
        "-clearboost" => BattleEvent::ClearBoost {
            ident: arg(1)?.to_string(),
        },
        "faint" => BattleEvent::Faint {
            ident: arg(1)?.to_string(),
        },
        "-weather" => {
            let weather = arg(1)?.trim();
            BattleEvent::Weather(if weather == "none" {
                String::new()
            } else {
                weather.to_string()
            })
        }
        "-sidestart" | "-sideend" => {
            let side = parse_side_id(arg(1)?)?;
            let condition = side_condition_name(arg(2)?);
            if command == "-sidestart" {
                BattleEvent::SideStart { side, condition }
            } else {
                BattleEvent::SideEnd { side, condition }
            }
        }
        "win" => BattleEvent::Win(arg(1)?.to_string()),
        "tie" => BattleEvent::Tie,
        _ => return Ok(None),
    };

    Ok(Some(event))
}

fn side_condition_name(value: &str) -> String {
    let value = value.trim();
    value.strip_prefix("move: ").unwrap_or(value).to_string()
}
