use coi_serve::config::Config;
use coi_serve::logger;
use coi_serve::server::{self, Server, SignalHandler};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    // Fatal errors are reported once, through the error log
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let server = Server::bind(&cfg)?;

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    logger::log_server_start(&server.local_addr(), &cfg);

    server.run_until(async move { signals.wait().await }).await?;
    Ok(())
}
