use crate::core::engine::{BattleEngine, EngineResponse};
use crate::domain::error::BattleKeepResult;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

/// Line server statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    /// Requests answered
    pub requests: usize,
    /// Battles still live at end of input and stopped on shutdown
    pub stopped: usize,
}

/// Answer one JSON request per input line until the reader is exhausted.
///
/// Blank lines are skipped and a line that is not UTF-8 is answered with an
/// error response. Every answered line is flushed before the next one is
/// read. At end of input every remaining battle is stopped.
pub async fn serve_lines<R, W>(
    engine: &mut BattleEngine,
    mut reader: R,
    mut writer: W,
) -> BattleKeepResult<ServeStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(
        "Battle engine serving requests (max sessions: {})",
        engine.registry().max_sessions()
    );

    let mut stats = ServeStats::default();
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buffer) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                engine.handle_line(line)
            }
            Err(e) => {
                error!("Invalid engine request: {}", e);
                let failure = EngineResponse::failure(format!("Invalid request: {}", e));
                serde_json::to_string(&failure)?
            }
        };

        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        stats.requests += 1;
        debug!("Answered request #{}", stats.requests);
    }

    stats.stopped = engine.shutdown();
    info!(
        "Input closed after {} requests, stopped {} battles",
        stats.requests, stats.stopped
    );
    Ok(stats)
}
