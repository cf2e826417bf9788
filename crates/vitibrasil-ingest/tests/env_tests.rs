//! `.env` handling for the binary
//!
//! Kept in its own test binary: it changes the working directory and the
//! process environment.

use anyhow::Result;
use clap::Parser;
use vitibrasil_common::logging::{LogFormat, LogLevel};
use vitibrasil_ingest::Cli;

#[test]
fn test_dotenv_log_settings_reach_the_log_config() -> Result<()> {
    if std::env::var_os("LOG_LEVEL").is_some() || std::env::var_os("LOG_FORMAT").is_some() {
        // the real environment wins over .env; nothing to check
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join(".env"), "LOG_LEVEL=warn\nLOG_FORMAT=json\n")?;
    std::env::set_current_dir(dir.path())?;

    let cli = Cli::try_parse_from(["vitibrasil-ingest", "--verbose", "run", "all"])?;
    let config = cli.log_config();

    assert_eq!(config.level, LogLevel::Warn);
    assert_eq!(config.format, LogFormat::Json);

    Ok(())
}
