use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pgnest::ast::Query;
use pgnest::db::{create_client, load_saved_connections, run, ConnectionConfig};
use pgnest::model::Model;

/// Run query-notation statements against PostgreSQL and print shaped JSON
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Use a saved connection by name
    #[arg(long = "connect")]
    connect: Option<String>,

    /// Schema to introspect the model from
    #[arg(long, default_value = "public")]
    schema: String,

    /// Query notation JSON file; reads stdin when omitted
    #[arg(long)]
    query: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = match cli.connect {
        Some(ref name) => {
            let saved = load_saved_connections().unwrap_or_default();
            match saved
                .into_iter()
                .find(|c| c.name.eq_ignore_ascii_case(name))
            {
                Some(c) => c,
                None => {
                    eprintln!("Error: no saved connection named {:?}", name);
                    eprintln!("Saved connections:");
                    for c in load_saved_connections().unwrap_or_default() {
                        eprintln!("  - {}", c.name);
                    }
                    std::process::exit(1);
                }
            }
        }
        None => ConnectionConfig::default(),
    };

    // Resolve password: PGPASSWORD env var, then interactive prompt
    if config.password.is_empty() {
        if let Ok(pw) = std::env::var("PGPASSWORD") {
            config.password = pw;
        } else {
            let prompt = format!("Password for {}: ", config.display_string());
            config.password = rpassword::read_password_from_tty(Some(&prompt))?;
        }
    }

    let client = create_client(&config).await?;
    let model = Model::introspect(&client, &cli.schema).await?;

    let notation = match cli.query {
        Some(ref path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read query notation from stdin")?;
            buf
        }
    };
    let query: Query =
        serde_json::from_str(&notation).context("Invalid query notation")?;

    let shaped = run(&client, &model, &query).await?;
    println!("{}", serde_json::to_string_pretty(&shaped)?);

    Ok(())
}
