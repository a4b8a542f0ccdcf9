use std::path::PathBuf;
use std::sync::Arc;

use facet::Facet;
use figue as args;
use sonde_types::IndexListing;
use sonde_web::access::TokenGate;
use sonde_web::app::{AppState, build_router};
use sonde_web::config::{ADMIN_TOKEN_ENV, Config, DEFAULT_HTTP_ADDR, DEFAULT_MOUNT, Overrides};
use sonde_web::discovery::discover;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Facet, Debug)]
struct ServerCli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    #[facet(args::named, default)]
    listen: Option<String>,
    #[facet(args::named, default)]
    settings: Option<String>,
}

#[derive(Facet, Debug)]
struct ClientCli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    #[facet(args::subcommand)]
    command: ClientCommand,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum ClientCommand {
    Index {
        #[facet(args::named, default)]
        url: Option<String>,
        #[facet(args::named, default)]
        token: Option<String>,
    },
}

fn main() {
    let cli_args: Vec<String> = std::env::args().skip(1).collect();
    if cli_args
        .first()
        .map(String::as_str)
        .is_some_and(is_client_command)
    {
        if let Err(err) = run_client() {
            eprintln!("{err}");
            std::process::exit(1);
        }
        return;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to build tokio runtime: {err}");
            std::process::exit(1);
        }
    };
    runtime.block_on(async {
        if let Err(err) = run_server().await {
            eprintln!("{err}");
            std::process::exit(1);
        }
    });
}

fn is_client_command(value: &str) -> bool {
    matches!(value, "index")
}

async fn run_server() -> Result<(), String> {
    let cli = parse_server_cli()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env(Overrides {
        listen: cli.listen,
        settings: cli.settings.map(PathBuf::from),
    })?;
    if config.admin_token.is_none() {
        warn!("{ADMIN_TOKEN_ENV} is not set; every diagnostic request will be rejected");
    }

    let discovered = discover();
    let gate = Arc::new(TokenGate::new(config.admin_token.clone()));
    let http_addr = config.http_addr.clone();
    let index_path = config.index_path();
    let state = AppState::new(discovered, gate, config);

    let http_listener = TcpListener::bind(&http_addr)
        .await
        .map_err(|e| format!("failed to bind HTTP on {http_addr}: {e}"))?;
    info!(
        %http_addr,
        %index_path,
        pages = state.registry.len(),
        "sonde HTTP server ready"
    );

    axum::serve(http_listener, build_router(state))
        .await
        .map_err(|e| format!("HTTP server error: {e}"))
}

fn parse_server_cli() -> Result<ServerCli, String> {
    let figue_config = args::builder::<ServerCli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("sonde")
                .description("Authenticated diagnostic page server")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();
    let cli = args::Driver::new(figue_config)
        .run()
        .into_result()
        .map_err(|e| e.to_string())?;
    Ok(cli.value)
}

fn run_client() -> Result<(), String> {
    let cli = parse_client_cli()?;
    match cli.command {
        ClientCommand::Index { url, token } => run_index(url, token),
    }
}

fn parse_client_cli() -> Result<ClientCli, String> {
    let figue_config = args::builder::<ClientCli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("sonde")
                .description("CLI for listing sonde diagnostic pages")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();
    let cli = args::Driver::new(figue_config)
        .run()
        .into_result()
        .map_err(|e| e.to_string())?;
    Ok(cli.value)
}

fn run_index(url: Option<String>, token: Option<String>) -> Result<(), String> {
    let base_url = url.unwrap_or_else(|| format!("http://{DEFAULT_HTTP_ADDR}{DEFAULT_MOUNT}"));
    let index_url = format!("{}/", base_url.trim_end_matches('/'));
    let token = token
        .or_else(|| std::env::var(ADMIN_TOKEN_ENV).ok())
        .ok_or_else(|| format!("pass --token or set {ADMIN_TOKEN_ENV}"))?;

    let response = match ureq::get(&index_url)
        .set("accept", "application/json")
        .set("authorization", &format!("Bearer {token}"))
        .call()
    {
        Ok(response) => response,
        Err(ureq::Error::Status(403, _)) => {
            return Err(format!("GET {index_url}: token rejected"));
        }
        Err(e) => return Err(format!("GET {index_url}: {e}")),
    };
    let body = response
        .into_string()
        .map_err(|e| format!("read GET response body: {e}"))?;
    let listing: IndexListing =
        facet_json::from_str(&body).map_err(|e| format!("decode index response: {e}"))?;
    println!(
        "{}",
        facet_json::to_string_pretty(&listing).map_err(|e| format!("encode index: {e}"))?
    );
    Ok(())
}
