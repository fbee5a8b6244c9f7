//! # figbind demo application
//!
//! A small CLI that reads a proxy configuration from TOML and prints what was
//! bound. It exists to demonstrate and manually verify figbind's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example figbind_demo -- demos/figbind_demo/demo.toml
//! cargo run --example figbind_demo -- demos/figbind_demo/demo.toml --dump-tree
//! RUST_LOG=figbind=trace cargo run --example figbind_demo -- demos/figbind_demo/demo.toml
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                    | How to exercise it                                          |
//! |----------------------------|-------------------------------------------------------------|
//! | Every field shape          | Run against `demo.toml`                                     |
//! | Copy node lists            | The second `[[routes]]` entry inherits from the first       |
//! | Name formats               | `--name-format snake` makes `maxConnections` unknown        |
//! | Position-annotated errors  | Change `port` to `"http"` in `demo.toml`                    |
//! | Unregistered field handler | `comment` under `[[upstreams]]` is ignored                  |
//! | Post-processing            | Point a route at an upstream that doesn't exist             |
//! | Tree dump                  | `--dump-tree` prints the parsed tree as JSON                |

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as _, ValueEnum};
use tracing_subscriber::EnvFilter;

use figbind::{ConfigReader, NameFormat, Parser, TomlParser};

use config::DemoConfig;

/// figbind demo: bind a TOML proxy config and print it.
#[derive(clap::Parser, Debug)]
#[command(name = "figbind-demo")]
struct Cli {
    /// Config file to read.
    path: PathBuf,

    /// Spelling of field names in the document.
    #[arg(long, value_enum, default_value_t = Format::Camel)]
    name_format: Format,

    /// Print the parsed tree as JSON instead of binding it.
    #[arg(long)]
    dump_tree: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Original,
    Camel,
    Snake,
    Kebab,
}

impl From<Format> for NameFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Original => NameFormat::Original,
            Format::Camel => NameFormat::CamelCase,
            Format::Snake => NameFormat::SnakeCase,
            Format::Kebab => NameFormat::KebabCase,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn dump_tree(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&cli.path)?;
    let tree = TomlParser::new().parse(&content)?;
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

fn print_config(config: &DemoConfig) {
    println!("name             {}", config.name);
    println!("verbose          {}", config.verbose);
    println!("tags             {}", config.tags.join(", "));
    for (key, value) in &config.env {
        println!("env.{key:<12} {value}");
    }
    let server = &config.server;
    println!("server           {}:{}", server.host, server.port);
    println!("  connections    {}", server.max_connections);
    println!("  log level      {}", server.log_level);
    for upstream in &config.upstreams {
        println!(
            "upstream         {} -> {} (weight {})",
            upstream.name,
            upstream.address,
            upstream.weight.unwrap_or(1)
        );
    }
    for route in config.routes.iter() {
        println!(
            "route            {} -> {} ({} ms)",
            route.path, route.upstream, route.timeout_ms
        );
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if cli.dump_tree {
        return match dump_tree(&cli) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Failed to parse {}:\n{e}", cli.path.display());
                ExitCode::FAILURE
            }
        };
    }

    let reader = ConfigReader::new().name_format(cli.name_format.into());
    match reader.read_toml_file::<DemoConfig>(&cli.path) {
        Ok(config) => {
            print_config(&config);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to load config:\n{e}");
            ExitCode::FAILURE
        }
    }
}
