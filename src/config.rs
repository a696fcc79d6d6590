use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub hub: HubConfig,
    #[serde(default)]
    pub auxiliary: Option<AuxiliaryConfig>,
    #[serde(default)]
    pub groups: Vec<GroupDef>,
    #[serde(default)]
    pub age_gate: AgeGateConfig,
    #[serde(default)]
    pub snapshot: Option<SnapshotConfig>,
    pub publishing: PublishingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Server directory endpoint (JSON array of hub entries).
    pub url: String,
    #[serde(default = "default_hub_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_hub_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_hub_timeout_ms() -> u64 {
    1500
}

fn default_hub_poll_interval_ms() -> u64 {
    1500
}

/// Optional third-party status endpoint, shown as one more group.
/// Polled on its own slower cadence to bound the load on the third party.
#[derive(Debug, Clone, Deserialize)]
pub struct AuxiliaryConfig {
    /// Display name for the auxiliary row.
    pub name: String,
    pub url: String,
    #[serde(default = "default_aux_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_aux_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_aux_timeout_ms() -> u64 {
    5000
}

fn default_aux_poll_interval_ms() -> u64 {
    5000
}

/// One community group: any keyword matching as a case-sensitive substring
/// of a server's name assigns the server to this group.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDef {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Heuristic 18+ classification: exact tag match or name substring.
#[derive(Debug, Clone, Deserialize)]
pub struct AgeGateConfig {
    #[serde(default = "default_age_markers")]
    pub tag_markers: Vec<String>,
    #[serde(default = "default_age_markers")]
    pub name_markers: Vec<String>,
}

fn default_age_markers() -> Vec<String> {
    vec!["18+".to_string()]
}

impl Default for AgeGateConfig {
    fn default() -> Self {
        Self {
            tag_markers: default_age_markers(),
            name_markers: default_age_markers(),
        }
    }
}

/// Daily CSV snapshot: fires once per day at hour:minute local time.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    pub dir: String,
    pub hour: u8,
    pub minute: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of dashboard snapshots kept in the broadcast channel for /ws/stats (slow clients may lag).
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (ws clients, cycles published/skipped) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.hub.url.is_empty(), "hub.url must be non-empty");
        anyhow::ensure!(
            self.hub.timeout_ms > 0,
            "hub.timeout_ms must be > 0, got {}",
            self.hub.timeout_ms
        );
        anyhow::ensure!(
            self.hub.poll_interval_ms > 0,
            "hub.poll_interval_ms must be > 0, got {}",
            self.hub.poll_interval_ms
        );
        anyhow::ensure!(!self.groups.is_empty(), "groups must list at least one group");
        for group in &self.groups {
            anyhow::ensure!(!group.name.is_empty(), "groups entries must have a non-empty name");
            anyhow::ensure!(
                !group.keywords.is_empty(),
                "group '{}' must have at least one keyword",
                group.name
            );
            anyhow::ensure!(
                group.keywords.iter().all(|k| !k.is_empty()),
                "group '{}' has an empty keyword",
                group.name
            );
        }
        if let Some(aux) = &self.auxiliary {
            anyhow::ensure!(!aux.name.is_empty(), "auxiliary.name must be non-empty");
            anyhow::ensure!(!aux.url.is_empty(), "auxiliary.url must be non-empty");
            anyhow::ensure!(
                aux.timeout_ms > 0,
                "auxiliary.timeout_ms must be > 0, got {}",
                aux.timeout_ms
            );
            anyhow::ensure!(
                aux.poll_interval_ms > 0,
                "auxiliary.poll_interval_ms must be > 0, got {}",
                aux.poll_interval_ms
            );
        }
        if let Some(snapshot) = &self.snapshot {
            anyhow::ensure!(!snapshot.dir.is_empty(), "snapshot.dir must be non-empty");
            anyhow::ensure!(
                snapshot.hour < 24,
                "snapshot.hour must be 0-23, got {}",
                snapshot.hour
            );
            anyhow::ensure!(
                snapshot.minute < 60,
                "snapshot.minute must be 0-59, got {}",
                snapshot.minute
            );
        }
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
