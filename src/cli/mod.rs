use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::clients::GhostClient;
use crate::domain::PRESETS;
use crate::infra::config::{Config, ConfigInput, Transport};
use crate::tools::{registry, GhostSvc};

#[derive(Parser)]
#[command(name = "ghost-mcp")]
#[command(about = "MCP server for the Ghost Admin API")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Clone)]
pub struct Settings {
    /// Ghost site URL, e.g. https://myblog.ghost.io
    #[arg(long, env = "GHOST_URL", global = true)]
    pub url: Option<String>,
    /// Admin API key in the form {id}:{secret}
    #[arg(long, env = "GHOST_ADMIN_KEY", hide_env_values = true, global = true)]
    pub key: Option<String>,
    /// Comma-separated capability groups (posts,pages,tags,images)
    #[arg(long, env = "GHOST_TOOLS", global = true)]
    pub tools: Option<String>,
    /// Named preset (full, readonly, writer, editor)
    #[arg(long, env = "GHOST_PRESET", global = true)]
    pub preset: Option<String>,
    /// TOML file with fallback values for url, admin_key, tools and preset
    #[arg(long, env = "GHOST_MCP_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// MCP transport
    #[arg(
        long,
        value_enum,
        ignore_case = true,
        env = "GHOST_MCP_TRANSPORT",
        default_value_t = Transport::Stdio,
        global = true
    )]
    pub transport: Transport,
    /// HTTP port for the http transport
    #[arg(long, env = "PORT", default_value_t = 8080, global = true)]
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            tools: None,
            preset: None,
            config: None,
            transport: Transport::Stdio,
            port: 8080,
        }
    }
}

impl From<Settings> for ConfigInput {
    fn from(s: Settings) -> Self {
        ConfigInput {
            url: s.url,
            admin_key: s.key,
            tools: s.tools,
            preset: s.preset,
            config_path: s.config,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve MCP tools (default)
    Serve,
    /// List the tools the current configuration would expose
    Tools,
    /// Show the available presets
    Presets,
    /// Verify the site URL and admin key by fetching site info
    Check,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    run_commands(cli.settings, cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(settings: Settings, command: Commands) -> ExitCode {
    let (transport, port) = (settings.transport, settings.port);
    let input = ConfigInput::from(settings);
    let result = match command {
        Commands::Serve => serve(input, transport, port).await,
        Commands::Tools => list_tools(&input),
        Commands::Presets => {
            print!("{}", presets_table());
            Ok(())
        }
        Commands::Check => check(input).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(input: ConfigInput, transport: Transport, port: u16) -> anyhow::Result<()> {
    let cfg = Config::resolve(input)?;
    crate::infra::boot::run(cfg, transport, port).await
}

fn list_tools(input: &ConfigInput) -> anyhow::Result<()> {
    let selection = input.selection()?;
    for name in registry::tool_names(&selection) {
        println!("{name}");
    }
    Ok(())
}

fn presets_table() -> String {
    let mut out = String::new();
    for p in PRESETS {
        let groups: Vec<&str> = p.groups.iter().map(|g| g.name()).collect();
        let mode = if p.read_only { "read-only" } else { "read-write" };
        out.push_str(&format!("{:<10} {:<10} {}\n", p.name, mode, groups.join(",")));
    }
    out
}

async fn check(input: ConfigInput) -> anyhow::Result<()> {
    let cfg = Config::resolve(input)?;
    let client = GhostClient::new(&cfg.url, cfg.admin_key)?;
    let info = GhostSvc::new(Arc::new(client)).site_info().await?;
    println!("{info}");
    Ok(())
}
