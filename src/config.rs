use clap::Parser;
use std::time::Duration;
use url::Url;

/// Odds feed poller with windowed state resets
#[derive(Parser, Debug, Clone)]
#[command(name = "odds-state-sync", version, about)]
pub struct Config {
    /// Root URL of the simulation feed (serves /state and /mappings)
    #[arg(
        long,
        env = "RTC_SIMULATION_ROOT_PATH",
        default_value = "http://localhost:3000/api"
    )]
    pub feed_root: String,

    /// Length of one simulation window in minutes
    #[arg(long, env = "RTC_SIMULATION_DURATION_MIN", default_value = "5")]
    pub duration_min: u64,

    /// Feed polling interval in milliseconds
    #[arg(long, env = "TICK_INTERVAL_MS", default_value = "1000")]
    pub tick_interval_ms: u64,

    /// Status endpoint listen address
    #[arg(long, env = "STATUS_ADDR", default_value = "0.0.0.0:3001")]
    pub listen_addr: String,

    /// Per-request timeout for feed calls, in seconds
    #[arg(long, env = "FEED_TIMEOUT_SECS", default_value = "10")]
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let root = Url::parse(&self.feed_root).map_err(|e| {
            anyhow::anyhow!("feed_root '{}' is not a valid URL: {}", self.feed_root, e)
        })?;
        if !matches!(root.scheme(), "http" | "https") {
            anyhow::bail!("feed_root must be an http(s) URL, got '{}'", self.feed_root);
        }
        if self.duration_min == 0 {
            anyhow::bail!("duration_min must be positive");
        }
        if self.tick_interval_ms == 0 {
            anyhow::bail!("tick_interval_ms must be positive");
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.duration_min * 60 * 1000)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
