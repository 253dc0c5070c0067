use clap::{Parser, Subcommand};

use crate::config::Config;

/// Job and worker tracking service
#[derive(Parser, Debug)]
#[command(name = "job-tracker", version)]
pub struct Cli {
    /// Address to bind, overrides HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overrides PORT
    #[arg(long)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
}

impl Cli {
    /// Apply command line overrides on top of the environment configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }

    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
