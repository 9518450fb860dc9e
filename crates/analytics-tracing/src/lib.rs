use dotenvy::dotenv;
use std::{path::PathBuf, sync::Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,caption_feed=debug,api_server=debug";

fn init_env_layer() -> EnvFilter {
    // should happen before reading RUST_LOG so a value in .env is picked up
    match dotenv() {
        Ok(path) => eprintln!(".env read successfully from {}", path.display()),
        Err(e) => eprintln!("Could not load .env file: {e}"),
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Logs to `$LOCAL_LOG_DIR/app.log` when that variable is set, otherwise to stdout.
pub fn init_tracing() {
    let env_layer = init_env_layer();
    match std::env::var("LOCAL_LOG_DIR") {
        Ok(log_dir) if !log_dir.is_empty() => to_file(env_layer, PathBuf::from(log_dir)),
        _ => to_stdout(env_layer),
    }
}

pub fn init_tracing_to_stdout() {
    to_stdout(init_env_layer());
}

pub fn init_tracing_to_file(log_dir: PathBuf) {
    to_file(init_env_layer(), log_dir);
}

fn to_stdout(env_layer: EnvFilter) {
    let stdout_layer = tracing_subscriber::fmt::layer().with_ansi(true);

    if let Err(e) = tracing_subscriber::registry()
        .with(env_layer)
        .with(stdout_layer)
        .try_init()
    {
        eprintln!("tracing already initialized: {}", e);
    }
}

fn to_file(env_layer: EnvFilter, log_dir: PathBuf) {
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log dir: {}", e);
        return to_stdout(env_layer); // fallback to stdout tracing
    }
    let file = match std::fs::File::create(log_dir.join("app.log")) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to create log file: {}", e);
            return to_stdout(env_layer); // fallback to stdout tracing
        }
    };
    let file_log_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);

    if let Err(e) = tracing_subscriber::registry()
        .with(env_layer)
        .with(file_log_layer)
        .try_init()
    {
        eprintln!("tracing already initialized: {}", e);
    }
}
