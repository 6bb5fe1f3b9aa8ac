// CLASSIFICATION: COMMUNITY
// Filename: combq.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-07-27

//! Naming-server daemon for CombFS.

use std::net::IpAddr;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use combfs::naming::NamingServer;

#[derive(Debug, Parser)]
#[command(author, version, about = "CombFS naming server")]
struct Cli {
    /// Host to bind the service and registration listeners.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,
    /// Port of the client service listener.
    #[arg(long, default_value_t = comb_wire::NAMING_SERVICE_PORT)]
    service_port: u16,
    /// Port of the storage-server registration listener.
    #[arg(long, default_value_t = comb_wire::NAMING_REGISTRATION_PORT)]
    registration_port: u16,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut server = NamingServer::with_ports(cli.service_port, cli.registration_port);
    server
        .set_host(cli.host)
        .context("configure listen host")?;
    server.start().context("start naming server")?;
    info!(
        "combq serving on {}:{} (service) and {}:{} (registration)",
        cli.host, cli.service_port, cli.host, cli.registration_port
    );

    loop {
        thread::park();
    }
}
