//! volunteam - find volunteer events near you and sign up from the terminal.
//!
//! Usage:
//!   volunteam login [email]
//!   volunteam logout
//!   volunteam whoami
//!   volunteam events
//!   volunteam show <event-id>
//!   volunteam volunteer <event-id>
//!   volunteam create

mod app;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

const USAGE: &str = "\
Usage: volunteam <command>

Commands:
  login [email]      Sign in, or create an account on first use
  logout             Sign out and forget the saved session
  whoami             Show the signed-in user
  events             List events
  show <id>          Show one event
  volunteer <id>     Volunteer for an event
  create             Create a new event";

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes buffered output when dropped.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let guard = init_tracing();
    info!("volunteam starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        eprintln!("{}", e);
        drop(guard);
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    let command = args.first().map(String::as_str);
    let arg = args.get(1).cloned();

    if matches!(command, None | Some("help" | "-h" | "--help")) {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut app = App::new()?;
    app.restore_session();

    match (command, arg) {
        (Some("login"), email) => app.login(email).await,
        (Some("logout"), _) => {
            app.logout();
            Ok(())
        }
        (Some("whoami"), _) => app.whoami(),
        (Some("events"), _) => app.list_events().await,
        (Some("show"), Some(id)) => app.show_event(&id).await,
        (Some("volunteer"), Some(id)) => app.volunteer(&id).await,
        (Some("create"), _) => app.create_event().await,
        _ => anyhow::bail!("{}", USAGE),
    }
}
