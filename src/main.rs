use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskline::{api, db, mcp};

#[derive(Parser)]
#[command(name = "taskline")]
#[command(about = "Project and task tracking with working-day scheduling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Taskline server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Start MCP server via stdio (for agent integration)
    Mcp,
    /// Check server status
    Status {
        /// Port the server listens on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

async fn serve(port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting Taskline server on port {}", port);

    let db = db::Database::open_default()?;
    db.migrate()?;

    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Taskline server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "taskline=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port }) => {
            serve(port).await?;
        }
        Some(Commands::Mcp) => {
            let db = db::Database::open_default()?;
            db.migrate()?;

            mcp::run_stdio_server(db).await?;
        }
        Some(Commands::Status { port }) => {
            let url = format!("http://127.0.0.1:{}/health", port);
            match reqwest::get(&url).await {
                Ok(resp) if resp.status().is_success() => {
                    println!("Taskline server is running on port {}", port);
                }
                _ => {
                    println!("Taskline server is not responding on port {}", port);
                    std::process::exit(1);
                }
            }
        }
        None => {
            // Default: start server
            serve(3000).await?;
        }
    }

    Ok(())
}
