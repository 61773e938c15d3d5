use crate::cli::args::OutputFormat;
use crate::core::battle::{BattleSnapshot, PokemonState};
use crate::domain::config::BattleKeepConfig;
use std::fmt;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_snapshot(&self, snapshot: &BattleSnapshot) -> Result<(), OutputError>;
    fn write_config(&self, config: &BattleKeepConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::BattleKeepError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_snapshot(&self, snapshot: &BattleSnapshot) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => print!("{}", render_text(snapshot)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(snapshot)?),
            OutputFormat::Table => println!("{}", render_table(snapshot)),
        }
        Ok(())
    }

    fn write_config(&self, config: &BattleKeepConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Text | OutputFormat::Table => {
                print!("{}", toml::to_string_pretty(config)?)
            }
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({ "message": message });
                println!("{}", output);
            }
            _ => println!("{}", message),
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({ "error": error });
                eprintln!("{}", output);
            }
            _ => eprintln!("Error: {}", error),
        }
        Ok(())
    }
}

/// Human-readable battle summary
pub fn render_text(snapshot: &BattleSnapshot) -> String {
    TextView(snapshot).to_string()
}

struct TextView<'a>(&'a BattleSnapshot);

impl fmt::Display for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        writeln!(f, "Battle: turn {} ({})", snapshot.turn, snapshot.status)?;

        let mut format = Vec::new();
        if let Some(gen) = snapshot.gen {
            format.push(format!("gen {}", gen));
        }
        if let Some(game_type) = &snapshot.game_type {
            format.push(game_type.clone());
        }
        if let Some(tier) = &snapshot.tier {
            format.push(tier.clone());
        }
        if !format.is_empty() {
            writeln!(f, "  Format: {}", format.join(" "))?;
        }

        let weather = if snapshot.weather.is_empty() { "none" } else { snapshot.weather.as_str() };
        writeln!(f, "  Weather: {}", weather)?;
        if snapshot.is_ended() {
            writeln!(f, "  Winner: {}", snapshot.winner.as_deref().unwrap_or("(tie)"))?;
        }
        writeln!(
            f,
            "  Lines: {} applied, {} pending",
            snapshot.applied_lines, snapshot.pending_lines
        )?;

        for side in &snapshot.sides {
            let name = if side.name.is_empty() { "?" } else { side.name.as_str() };
            match side.team_size {
                Some(size) => writeln!(f, "  Side {}: {} (team of {})", side.id, name, size)?,
                None => writeln!(f, "  Side {}: {}", side.id, name)?,
            }
            if !side.side_conditions.is_empty() {
                writeln!(f, "    Conditions: {}", side.side_conditions.join(", "))?;
            }
            for pokemon in &side.pokemon {
                let marker = if pokemon.active { '*' } else { ' ' };
                writeln!(
                    f,
                    "    {} {} ({} L{}) {}",
                    marker,
                    pokemon.ident,
                    pokemon.species,
                    pokemon.level,
                    condition_text(pokemon)
                )?;
            }
        }
        Ok(())
    }
}

/// One row per revealed pokemon
pub fn render_table(snapshot: &BattleSnapshot) -> String {
    let rows: Vec<PokemonRow> = snapshot
        .sides
        .iter()
        .flat_map(|side| side.pokemon.iter().map(move |p| PokemonRow::new(&side.id, p)))
        .collect();

    if rows.is_empty() {
        return format!("turn {} ({}), no pokemon revealed", snapshot.turn, snapshot.status);
    }
    Table::new(rows).to_string()
}

fn condition_text(pokemon: &PokemonState) -> String {
    if pokemon.fainted {
        return "fainted".to_string();
    }
    let mut text = format!("{}/{}", pokemon.hp, pokemon.maxhp);
    if !pokemon.status.is_empty() {
        text.push(' ');
        text.push_str(&pokemon.status);
    }
    text
}

#[derive(Tabled)]
struct PokemonRow {
    #[tabled(rename = "Side")]
    side: String,
    #[tabled(rename = "Pokemon")]
    ident: String,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Level")]
    level: u32,
    #[tabled(rename = "Condition")]
    condition: String,
    #[tabled(rename = "HP %")]
    hp_percent: String,
    #[tabled(rename = "Active")]
    active: bool,
}

impl PokemonRow {
    fn new(side: &str, pokemon: &PokemonState) -> Self {
        Self {
            side: side.to_string(),
            ident: pokemon.ident.clone(),
            species: pokemon.species.clone(),
            level: pokemon.level,
            condition: condition_text(pokemon),
            hp_percent: format!("{:.0}", pokemon.hp_fraction() * 100.0),
            active: pokemon.active,
        }
    }
}
