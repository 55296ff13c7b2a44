use clap::Parser;
use tracing::debug;

use visitor_counter::cli::{Cli, Commands};
use visitor_counter::config::{get_config, init_config_from};
use visitor_counter::interfaces::cli::run_cli_command;
use visitor_counter::runtime::modes::run_server;
use visitor_counter::system::logging::init_logging;

async fn run_cli_or_exit(cmd: Commands) {
    if let Err(e) = run_cli_command(cmd).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // config generate 不需要加载配置和日志
    if let Some(cmd @ Commands::Config { .. }) = cli.command {
        run_cli_or_exit(cmd).await;
        return Ok(());
    }

    init_config_from(&cli.config);
    let config = get_config();

    // guard 必须存活到进程结束，否则缓冲中的日志会丢失
    let _guard = init_logging(&config.logging)?;
    debug!("Configuration loaded from {}", cli.config);

    match cli.command {
        None | Some(Commands::Serve) => run_server().await,
        Some(cmd) => {
            run_cli_or_exit(cmd).await;
            Ok(())
        }
    }
}
