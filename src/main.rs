use std::path::PathBuf;
use std::process;

use log::{error, info};

use album_backend::config::AppConfig;
use album_backend::database::Database;
use album_backend::error::StartupError;
use album_backend::logging::init_logging;

fn main() {
    let config_file = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match AppConfig::load(config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let _logger = match init_logging(&config.logging.level) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(config: AppConfig) -> Result<(), StartupError> {
    let url = config.database.url()?;
    // Driver connections are blocking, so open them before the runtime starts.
    let database = Database::open(&config.database, url)?;

    info!("Server starting on port {} ...", config.web.port);
    let server = album_backend::build(&config.web, database.clone());
    // rocket::Error panics if dropped unread, so render it here.
    let result = rocket::execute(server.launch())
        .map(|_| ())
        .map_err(|e| StartupError::Launch(e.to_string()));

    // Last handle; closes the driver's connections outside the runtime.
    drop(database);
    info!("album store released");
    result
}
