//! hashrs 服务入口
//!
//! ```bash
//! # 使用默认配置在 0.0.0.0:8080 上监听
//! hashrs
//!
//! # 指定配置文件和端口
//! hashrs --config /etc/hashrs.toml --port 9000 -v
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hashrs::ServiceConfig;

/// Password hashing service (bcrypt, scrypt) over HTTP
#[derive(Debug, Parser)]
#[command(name = "hashrs", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./hashrs.toml if present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the configuration
    #[arg(long, value_name = "IP")]
    host: Option<String>,

    /// Port to listen on, overrides the configuration
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "hashrs exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> hashrs::Result<()> {
    let mut config = ServiceConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let addr = config.server.socket_addr()?;
    info!(
        defaults = ?config.defaults,
        limits = ?config.limits,
        "configuration loaded"
    );

    hashrs::server::serve(addr, Arc::new(config.dispatcher())).await
}

/// `-v` 次数对应的日志过滤器
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,hashrs=info",
        1 => "info,hashrs=debug",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let default_filter = default_filter(verbose);

    // RUST_LOG 优先，否则由 -v 次数决定
    let mut rejected = None;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|e| {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            rejected = Some(e.to_string());
        }
        EnvFilter::new(default_filter)
    });

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }

    if let Some(error) = rejected {
        warn!(%error, filter = default_filter, "ignoring invalid RUST_LOG");
    }
}
