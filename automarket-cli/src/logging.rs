use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Инициализирует `tracing` для CLI.
///
/// Логи пишутся в stderr, а не в stdout: stdout занят результатом команды
/// (список, карточка) и может уйти в pipe. Полоса загрузки тоже в stderr.
/// Уровень берётся из `RUST_LOG`, иначе из `default_level`, иначе `warn`.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}
