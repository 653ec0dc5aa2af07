//! Node configuration loading and management.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dvr_routing::{Cidr, Cost, PeerAddr, RouterConfig};

/// Full configuration for the routing node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DvrConfig {
    /// Routing settings.
    #[serde(default)]
    pub router: RouterSection,

    /// HTTP API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Outbound delivery settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSection {
    /// The network this node originates, in CIDR notation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Seconds between periodic advertisements.
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
    /// CSV file with `neighbor,cost` rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbors_file: Option<PathBuf>,
    /// Inline neighbors, address to link cost. The CSV file wins on overlap.
    #[serde(default)]
    pub neighbors: BTreeMap<String, Cost>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port. Also the port neighbors use to reach this node.
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Host part of the address announced to neighbors.
    #[serde(default = "default_advertise_host")]
    pub advertise_host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Per-delivery timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_update_interval() -> u64 {
    10
}
fn default_api_addr() -> String {
    "0.0.0.0".into()
}
fn default_api_port() -> u16 {
    5000
}
fn default_advertise_host() -> String {
    "127.0.0.1".into()
}
fn default_timeout() -> u64 {
    5
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            network: None,
            update_interval_secs: default_update_interval(),
            neighbors_file: None,
            neighbors: BTreeMap::new(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
            advertise_host: default_advertise_host(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DvrConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: DvrConfig = toml::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// A starting point for `--init`: defaults plus a placeholder network and
    /// one inline neighbor. No neighbor file is referenced, so the result
    /// loads without anything else on disk.
    pub fn template() -> Self {
        let mut config = Self::default();
        config.router.network = Some("10.0.0.0/24".into());
        config.router.neighbors.insert("127.0.0.1:5001".into(), 1);
        config
    }

    /// The address neighbors use to reach this node.
    pub fn own_address(&self) -> String {
        format!("{}:{}", self.api.advertise_host, self.api.port)
    }

    pub fn api_socket_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }

    pub fn transport_timeout(&self) -> Duration {
        Duration::from_secs(self.transport.timeout_secs)
    }

    /// Inline neighbors merged with the CSV file, if one is configured.
    pub fn neighbors(&self) -> anyhow::Result<BTreeMap<String, Cost>> {
        let mut neighbors = self.router.neighbors.clone();
        if let Some(ref path) = self.router.neighbors_file {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading neighbor file {}", path.display()))?;
            let from_file = parse_neighbors_csv(&contents)
                .with_context(|| format!("in neighbor file {}", path.display()))?;
            neighbors.extend(from_file);
        }
        Ok(neighbors)
    }

    /// Resolve and validate everything the router needs.
    pub fn to_router_config(&self) -> anyhow::Result<RouterConfig> {
        let network = self
            .router
            .network
            .as_deref()
            .context("router.network is required (set it in the config or pass --network)")?;
        let network = Cidr::parse(network)?;
        let address = PeerAddr::new(self.own_address())?;

        let mut neighbors = BTreeMap::new();
        for (addr, cost) in self.neighbors()? {
            neighbors.insert(PeerAddr::new(addr)?, cost);
        }

        let config = RouterConfig::new(
            address,
            network,
            neighbors,
            Duration::from_secs(self.router.update_interval_secs),
        )?;
        Ok(config)
    }
}

/// Parse neighbor rows from CSV text with a `neighbor,cost` header.
///
/// `vizinho` and `custo` are accepted as the same two columns. Columns may
/// appear in any order and extra columns are ignored. Blank lines are skipped.
pub fn parse_neighbors_csv(contents: &str) -> anyhow::Result<BTreeMap<String, Cost>> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((_, header)) = lines.next() else {
        bail!("empty neighbor file");
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let column = |names: &[&str]| {
        columns
            .iter()
            .position(|c| names.contains(c))
            .with_context(|| format!("missing column {:?} in header", names[0]))
    };
    let neighbor_col = column(&["neighbor", "vizinho"])?;
    let cost_col = column(&["cost", "custo"])?;

    let mut neighbors = BTreeMap::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let (Some(neighbor), Some(cost)) = (fields.get(neighbor_col), fields.get(cost_col)) else {
            bail!("line {line_no}: expected columns neighbor and cost");
        };
        if neighbor.is_empty() {
            bail!("line {line_no}: empty neighbor address");
        }
        let cost: Cost = cost
            .parse()
            .with_context(|| format!("line {line_no}: invalid cost {cost:?}"))?;
        if cost == 0 {
            bail!("line {line_no}: cost for {neighbor} must be positive");
        }
        neighbors.insert(neighbor.to_string(), cost);
    }
    Ok(neighbors)
}
