use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use crate::config::LauncherConfig;
use crate::engine::LauncherEngine;
use crate::engine::models::{LaunchRequest, UpdateChannel};
use crate::process::{CompanionLauncher, ProcessLauncher};

mod config;
mod engine;
mod env;
mod networking;
mod process;
mod storage;
mod updater;

#[derive(Parser, Debug)]
#[command(
    name = "pgral-launcher",
    version,
    about = "Keeps pgral up to date and starts it"
)]
struct Cli {
    /// URL forwarded to pgral.
    #[arg(short = 'u', default_value = "", allow_hyphen_values = true)]
    url: String,

    /// Update channel: "main" or "beta". Any other value skips the update check.
    #[arg(short = 'v', default_value = "")]
    channel: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let channel = UpdateChannel::parse(&cli.channel);
    let request = LaunchRequest::new(cli.url);
    let config = LauncherConfig::default();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("startup: failed to build async runtime ({err}); skipping update check");
            let launch = ProcessLauncher::new().launch(&env::companion_path(&config), &request);
            return exit_code(launch.is_ok());
        }
    };

    let engine = LauncherEngine::new(config);
    let report = runtime.block_on(engine.run(channel, &request));
    debug!("main: update outcome {:?}", report.update);

    // A lock wait that timed out may still be parked on a blocking thread.
    runtime.shutdown_background();
    exit_code(report.launched())
}

fn exit_code(launched: bool) -> ExitCode {
    if launched {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
