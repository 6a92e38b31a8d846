use clap::Parser;

use crate::config::AppConfig;

/// Command-line overrides, applied on top of the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "standup-web")]
#[command(about = "Standup web front end - server-rendered pages over the standup REST API")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Address to bind (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides PORT and STANDUP_WEB_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Base URL of the upstream API (overrides API_URL)")]
    pub api_url: Option<String>,
}

impl Cli {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(api_url) = &self.api_url {
            config.upstream.base_url = Some(api_url.clone());
        }
    }
}
