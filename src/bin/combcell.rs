// CLASSIFICATION: COMMUNITY
// Filename: combcell.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-07-27

//! Storage-server daemon for CombFS.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use combfs::proto::naming::Registration;
use combfs::rmi::Stub;
use combfs::storage::StorageServer;

#[derive(Debug, Parser)]
#[command(author, version, about = "CombFS storage server")]
struct Cli {
    /// Local directory whose contents this server exposes.
    #[arg(long)]
    root: PathBuf,
    /// Externally-routable host for the byte-I/O and command listeners.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,
    /// Registration endpoint of the naming server.
    #[arg(long, default_value_t = SocketAddr::from(([127, 0, 0, 1], comb_wire::NAMING_REGISTRATION_PORT)))]
    naming: SocketAddr,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let naming = Stub::<Registration>::new(cli.naming);
    let mut server = StorageServer::new(&cli.root);
    server
        .start(cli.host, &naming)
        .with_context(|| format!("start storage server over {}", cli.root.display()))?;
    info!(
        "combcell serving {} from {:?}",
        cli.root.display(),
        server.access_addr()
    );

    loop {
        thread::park();
    }
}
