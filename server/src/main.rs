use clap::Parser;
use env_logger::Env;
use log::info;
use server::network::Server;
use shared::{DEFAULT_PORT, TICK_PERIOD};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the hub to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Simulation period in milliseconds
    #[arg(short, long, default_value_t = TICK_PERIOD.as_millis() as u64,
          value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);

    info!("Starting server on {}", address);
    let mut server = Server::bind(&address, Duration::from_millis(args.tick_ms)).await?;

    server.run().await;

    Ok(())
}
