use crate::cli::args::{Args, Command, ConfigArgs, ConfigCommand, ReplayArgs};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::battle::BattleSnapshot;
use crate::core::engine::BattleEngine;
use crate::core::session::Seek;
use crate::domain::config::BattleKeepConfig;
use crate::domain::error::{BattleKeepError, BattleKeepResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::stdio::serve_lines;
use tokio::io::{self, BufReader};
use tracing::info;
use uuid::Uuid;

/// Execute CLI command
pub async fn execute_command(args: Args) -> BattleKeepResult<()> {
    let writer = ConsoleWriter::new(args.output);

    // Load configuration using ConfigManager
    let config_manager = ConfigManager::new()?;
    let config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(config_path)?
    } else {
        config_manager.load_config()?
    };

    if !args.quiet {
        init_logging(&config.global.log_level, args.verbose)?;
    }

    match args.command {
        Command::Replay(replay_args) => {
            let snapshot = execute_replay(replay_args, &config).await?;
            writer.write_snapshot(&snapshot)?;
            Ok(())
        }
        Command::Serve => execute_serve(&config).await,
        Command::Config(config_args) => {
            execute_config_command(config_args, &writer, &config, &config_manager)
        }
        Command::Version => {
            writer.write_message(&format!("battlekeep {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

/// Replay a protocol log into a fresh battle and return its final state
pub async fn execute_replay(
    args: ReplayArgs,
    config: &BattleKeepConfig,
) -> BattleKeepResult<BattleSnapshot> {
    let log = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|e| {
            BattleKeepError::InvalidInput(format!(
                "Failed to read log file {}: {}",
                args.file.display(),
                e
            ))
        })?;

    let key = args.key.unwrap_or_else(|| Uuid::new_v4().to_string());
    let seek = args.turn.map(Seek::Turn).unwrap_or(Seek::End);
    info!("Replaying {} as '{}' to {}", args.file.display(), key, seek);

    let mut engine = BattleEngine::from_config(&config.global);
    let registry = engine.registry_mut();
    registry.start(&key)?;
    registry.advance(&key, log.as_str(), seek)?;
    let snapshot = registry.fetch(&key)?;
    registry.stop(&key)?;

    Ok(snapshot)
}

async fn execute_serve(config: &BattleKeepConfig) -> BattleKeepResult<()> {
    let mut engine = BattleEngine::from_config(&config.global);
    serve_lines(&mut engine, BufReader::new(io::stdin()), io::stdout()).await?;
    Ok(())
}

fn execute_config_command(
    args: ConfigArgs,
    writer: &ConsoleWriter,
    config: &BattleKeepConfig,
    config_manager: &ConfigManager,
) -> BattleKeepResult<()> {
    match args.command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Init { path } => {
            let config_file = config_manager.init_project_config(&path)?;
            writer.write_message(&format!(
                "Project configuration initialized at '{}'",
                config_file.display()
            ))?;
            Ok(())
        }
    }
}
