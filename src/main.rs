use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use parley::console;
use parley::session::{Outcome, Session};

/// Interactive line-chat client.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Chat server host.
    #[arg(default_value = "localhost")]
    host: String,

    /// Chat server port.
    #[arg(default_value_t = 6666)]
    port: u16,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    let session =
        Session::connect(&args.host, args.port).context("could not reach the chat server")?;

    println!("Connected to {}", session.addr());

    let input = console::spawn_stdin_pump();

    match session.run(input, |line| console::show(&line)) {
        Outcome::ServerClosed => {
            println!("Server closed the connection.");
            Ok(())
        }

        Outcome::InputClosed => Ok(()),

        Outcome::ConnectionLost(err) => Err(err).context("connection lost"),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parley=info"));

    // Logs go to stderr so they never interleave with chat lines.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
