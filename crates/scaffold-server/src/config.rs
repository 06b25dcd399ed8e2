use crate::error::Result;
pub use clap::Parser;
use scaffold_types::config::BackendConfig;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "SCAFFOLD_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "SCAFFOLD_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "SCAFFOLD_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of server as visible to clients, used for self links"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "SCAFFOLD_MAX_REQUEST_ITEMS",
        default_value_t = 1000,
        help = "Maximum number of records returned by one listing"
    )]
    pub max_request_items: u32,

    #[arg(long, env = "SCAFFOLD_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,

    #[command(flatten)]
    pub backend: BackendConfig,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }
}
