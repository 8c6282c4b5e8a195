//! Server configuration from command-line flags and environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

use crate::provider::{ProviderClient, ProviderError, DEFAULT_PROVIDER_URL};

/// Default port for the edit server.
pub const DEFAULT_PORT: u16 = 9473;

/// Default request body limit. Data URIs of full canvases easily exceed
/// axum's 2 MB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Command-line arguments for inpaint-server.
#[derive(Debug, Clone, Parser)]
#[command(name = "inpaint-server")]
#[command(about = "Mask-driven image edit relay")]
#[command(version)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "INPAINT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind (localhost unless you know what you are doing)
    #[arg(long, env = "INPAINT_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Image-edit provider endpoint
    #[arg(long, env = "EDIT_PROVIDER_URL", default_value = DEFAULT_PROVIDER_URL)]
    pub provider_url: String,

    /// Provider API key; without it every edit is simulated
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum accepted request body in bytes
    #[arg(long, env = "INPAINT_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            api_key: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Socket address to bind.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Build the provider client, or `None` when no usable key is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider URL is invalid.
    pub fn provider(&self) -> Result<Option<ProviderClient>, ProviderError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                ProviderClient::new(&self.provider_url, key).map(Some)
            }
            _ => Ok(None),
        }
    }
}
