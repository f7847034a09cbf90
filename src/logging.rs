use flexi_logger::{Logger, LoggerHandle};

use crate::error::StartupError;

/// Starts the stderr logger. `RUST_LOG` wins over the configured level.
///
/// The returned handle must stay alive for as long as the process logs.
pub fn init_logging(level: &str) -> Result<LoggerHandle, StartupError> {
    let handle = Logger::try_with_env_or_str(level)?
        .log_to_stderr()
        .format(flexi_logger::detailed_format)
        .start()?;
    Ok(handle)
}
