use anyhow::Context;
use crowdcore::sync::{ClientConfig, POLL_INTERVAL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ClientConfig,
    pub poll_secs: u64,
    /// Window of the room history chart.
    pub history_hours: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api: ClientConfig::default(),
            poll_secs: POLL_INTERVAL.as_secs(),
            history_hours: 10,
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading dashboard config {}", path_ref.display()))?;
        let config: DashboardConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing dashboard config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        poll_secs: Option<u64>,
        history_hours: Option<u32>,
    ) -> anyhow::Result<Self> {
        if let Some(url) = api_url {
            self.api.base_url = url;
        }
        if let Some(secs) = poll_secs {
            self.poll_secs = secs;
        }
        if let Some(hours) = history_hours {
            self.history_hours = hours;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.poll_secs > 0, "poll_secs must be at least 1");
        anyhow::ensure!(
            (1..=72).contains(&self.history_hours),
            "history_hours must be between 1 and 72, got {}",
            self.history_hours
        );
        Ok(())
    }

    pub fn cadence(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_poll_every_five_seconds() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.cadence(), Duration::from_secs(5));
        assert_eq!(cfg.history_hours, 10);
    }

    #[test]
    fn config_load_reads_yaml_and_keeps_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"api:\n  base_url: http://10.0.0.5:8000\npoll_secs: 2\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = DashboardConfig::load(&path).unwrap();
        assert_eq!(cfg.api.base_url, "http://10.0.0.5:8000");
        assert_eq!(cfg.api.timeout_ms, ClientConfig::default().timeout_ms);
        assert_eq!(cfg.cadence(), Duration::from_secs(2));
    }

    #[test]
    fn overrides_are_validated() {
        let cfg = DashboardConfig::default()
            .with_overrides(Some("http://sim:9000".into()), None, Some(24))
            .unwrap();
        assert_eq!(cfg.api.base_url, "http://sim:9000");
        assert_eq!(cfg.history_hours, 24);
        assert!(DashboardConfig::default()
            .with_overrides(None, Some(0), None)
            .is_err());
        assert!(DashboardConfig::default()
            .with_overrides(None, None, Some(100))
            .is_err());
    }
}
