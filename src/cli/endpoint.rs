//! Endpoint commands.

use clap::{Args, Subcommand};

/// Inspect connection endpoints
#[derive(Subcommand, Debug)]
pub enum EndpointCmd {
    /// Point a connection URL at a different host
    Rewrite(EndpointRewriteCmd),
}

impl EndpointCmd {
    pub fn run(self) -> slcpi::Result<()> {
        match self {
            EndpointCmd::Rewrite(cmd) => cmd.run(),
        }
    }
}

/// Replace the host of a URL, keeping scheme, credentials, and port.
///
/// Examples:
///   slcpi endpoint rewrite nats://nats:pw@127.0.0.1:4222 10.0.0.5
#[derive(Args, Debug)]
pub struct EndpointRewriteCmd {
    /// URL to rewrite
    #[arg(value_name = "URL")]
    pub url: String,

    /// Replacement host or IP address
    #[arg(value_name = "HOST")]
    pub host: String,
}

impl EndpointRewriteCmd {
    pub fn run(self) -> slcpi::Result<()> {
        println!("{}", slcpi::rewrite_host(&self.url, &self.host)?);
        Ok(())
    }
}
