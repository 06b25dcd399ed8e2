pub mod rest;

use std::time::Duration;

use anyhow::{Result, anyhow};
use rand::Rng as _;
use scaffold_server::config::{Parser, ServerConfig};
use tempfile::TempDir;
use tracing::{debug, error, info};

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

/// Keeps temporary data directory alive for the test duration
pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str, extra_args: &[&str]) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let base_url = format!("http://localhost:{}", port);
    let mut args = vec![
        "scaffold-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    args.extend_from_slice(extra_args);
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    prepare_env_with_args(test_name, &[]).await
}

pub async fn prepare_env_with_args(
    test_name: &str,
    extra_args: &[&str],
) -> Result<(ServerConfig, ConfigGuard)> {
    let (config, guard) = test_config(test_name, extra_args)?;
    debug!("Test data dir {:?}", config.backend.data_dir());
    Ok((config, guard))
}

/// Starts server in background and waits until it is healthy
pub async fn spawn_server(args: ServerConfig) -> Result<()> {
    let health_url = args.base_url.join("health")?;
    tokio::spawn(async move {
        if let Err(e) = scaffold_server::run::run(args).await {
            error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Server is ready");
                return Ok(());
            }
            _ => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
    Err(anyhow!("Server did not start"))
}

/// Prepares environment and starts server, returns its base URL
pub async fn launch_env(test_name: &str) -> Result<(reqwest::Url, ConfigGuard)> {
    let (args, guard) = prepare_env(test_name).await?;
    let base_url = args.base_url.clone();
    spawn_server(args).await?;
    Ok((base_url, guard))
}
