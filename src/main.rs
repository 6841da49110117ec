use anyhow::Result;
use clap::Parser;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use softgen::{Cli, CommandHandler, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Errors only, unless --verbose; RUST_LOG still wins
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let handler = match CommandHandler::new(cli.config) {
        Ok(h) => h,
        Err(e) => {
            error!("Failed to initialize softgen: {e:#}");
            eprintln!("Error: Failed to initialize softgen: {e:#}");
            eprintln!("Check the config file, or run 'softgen init' to create one.");
            std::process::exit(1);
        }
    };

    // Ctrl-C cancels in-flight DeepSeek requests; other commands keep the default handler
    let cancel = CancellationToken::new();
    if matches!(cli.command, Commands::Gen { .. } | Commands::Ask { .. }) {
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, cancelling");
                on_interrupt.cancel();
            }
        });
    }

    match handler.handle_command(cli.command, &cancel).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("{}", handler.format_error(&format!("{e:#}")));
            std::process::exit(1);
        }
    }

    Ok(())
}
