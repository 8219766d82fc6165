//! Chat relay server binary
//!
//! Usage:
//!   parley-server <port>
//!
//! The server binds all interfaces on the given port and serves until
//! killed. Set RUST_LOG to control log verbosity.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process;

use parley::{RelayConfig, RelayServer};
use tracing::error;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let Some(raw_port) = args.get(1) else {
        print_usage();
        process::exit(1);
    };

    let port: u16 = match raw_port.parse() {
        Ok(port) => port,
        Err(_) => {
            eprintln!("Invalid port: {}", raw_port);
            print_usage();
            process::exit(1);
        }
    };

    let config = RelayConfig {
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
        ..Default::default()
    };

    let mut server = RelayServer::new(config);
    if let Err(e) = server.start().await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: parley-server <port>");
}
