use std::path::PathBuf;

use crate::consts::{ALLUXIO_PORT, ALLUXIO_PREFIX};
use crate::error::{Error, Result};

pub const ENV_MASTER_HOSTNAME: &str = "ALLUXIO_MASTER_HOSTNAME";
pub const ENV_MASTER_RPC_PORT: &str = "ALLUXIO_MASTER_RPC_PORT";
pub const ENV_LOCAL_ROOT: &str = "ALLUXIO_LOCAL_ROOT";

static DEFAULT_MASTER_HOSTNAME: &str = "localhost";

/// Client-side settings used to locate the cluster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub master_hostname: String,
    pub master_port: u16,
    /// Backing directory for the bundled `LocalFileSystem`.
    pub local_root: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            master_hostname: DEFAULT_MASTER_HOSTNAME.to_string(),
            master_port: ALLUXIO_PORT,
            local_root: std::env::temp_dir().join("alluxio"),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with the `ALLUXIO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut conf = Self::default();
        if let Some(host) = lookup(ENV_MASTER_HOSTNAME).filter(|h| !h.is_empty()) {
            conf.master_hostname = host;
        }
        if let Some(port) = lookup(ENV_MASTER_RPC_PORT) {
            conf.master_port = port.parse::<u16>().map_err(|e| {
                Error::InvalidArgument(format!("{ENV_MASTER_RPC_PORT} `{port}`: {e}"))
            })?;
        }
        if let Some(root) = lookup(ENV_LOCAL_ROOT).filter(|r| !r.is_empty()) {
            conf.local_root = PathBuf::from(root);
        }
        Ok(conf)
    }

    pub fn master_address(&self) -> String {
        format!(
            "{ALLUXIO_PREFIX}{}:{}",
            self.master_hostname, self.master_port
        )
    }
}
