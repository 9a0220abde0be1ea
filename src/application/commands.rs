//! CLI commands and handlers
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::app::{self, AppCfg};
use crate::application::presenter::render_history;
use crate::config::Config;
use crate::domain::history::{FreshnessPolicy, History, HistoryStore};
use crate::infrastructure::storage::JsonFileStore;

#[derive(Parser, Debug)]
#[command(name = "oiwatch")]
#[command(version, about = "Options open-interest trend watcher")]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Poll the endpoint on a fixed interval (default)
    Watch {
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
    },

    /// Run a single fetch → analyze → save cycle and exit
    Once,

    /// Print stored history without fetching; the file is never modified
    History,

    /// Delete the stored history
    Clear,
}

/// Overrides applied on top of the config file (CLI > env > file > defaults)
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Path to TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// OI endpoint URL
    #[arg(long, env = "OIWATCH_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the OI endpoint
    #[arg(long, env = "OIWATCH_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// JSON field (dotted path) holding put OI
    #[arg(long, global = true)]
    pub put_field: Option<String>,

    /// JSON field (dotted path) holding call OI
    #[arg(long, global = true)]
    pub call_field: Option<String>,

    /// HTTP request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Refresh interval in milliseconds
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Countdown display granularity in milliseconds
    #[arg(long, global = true)]
    pub tick_ms: Option<u64>,

    /// History file path
    #[arg(long = "history", global = true)]
    pub history_path: Option<PathBuf>,

    /// Discard stored history older than this many hours
    #[arg(long, global = true)]
    pub freshness_hours: Option<u64>,

    /// Keep at most this many readings
    #[arg(long, global = true)]
    pub max_entries: Option<usize>,
}

impl SettingsArgs {
    /// Load the config file (if any) and layer these overrides on top.
    pub fn resolve(&self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(url) = &self.api_url {
            cfg.api.url = Some(url.clone());
        }
        if let Some(key) = &self.api_key {
            cfg.api.key = Some(key.clone());
        }
        if let Some(field) = &self.put_field {
            cfg.api.put_field = field.clone();
        }
        if let Some(field) = &self.call_field {
            cfg.api.call_field = field.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            cfg.api.timeout_ms = timeout_ms;
        }
        if let Some(interval_ms) = self.interval_ms {
            cfg.schedule.interval_ms = interval_ms;
        }
        if let Some(tick_ms) = self.tick_ms {
            cfg.schedule.tick_ms = tick_ms;
        }
        if let Some(path) = &self.history_path {
            cfg.history.path = path.clone();
        }
        if let Some(hours) = self.freshness_hours {
            cfg.history.freshness_hours = hours;
        }
        if let Some(max) = self.max_entries {
            cfg.history.max_entries = Some(max);
        }

        Ok(cfg)
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(cli: Cli) -> Result<()> {
        let cfg = cli.settings.resolve()?;
        let command = cli.command.unwrap_or(Commands::Watch { cycles: None });

        match command {
            Commands::Watch { cycles } => app::run(AppCfg::from_config(cfg)?, cycles).await,
            Commands::Once => app::run(AppCfg::from_config(cfg)?, Some(1)).await,
            Commands::History => Self::execute_history_command(cfg),
            Commands::Clear => Self::execute_clear_command(cfg),
        }
    }

    fn execute_history_command(cfg: Config) -> Result<()> {
        let store = JsonFileStore::new(&cfg.history.path);
        let policy = app::freshness_policy(cfg.history.freshness_hours)?;

        match stored_history(&store, &policy, Utc::now()) {
            Some(history) => print!("{}", render_history(&history)),
            None => println!("No stored readings in {:?}", cfg.history.path),
        }
        Ok(())
    }

    fn execute_clear_command(cfg: Config) -> Result<()> {
        let store = JsonFileStore::new(&cfg.history.path);
        store.clear()?;
        info!("🗑️ Cleared history at {:?}", cfg.history.path);
        Ok(())
    }
}

/// Fresh, non-empty stored history. Stale or unreadable records are reported
/// as absent but left in place for the next watch run to deal with.
fn stored_history(
    store: &dyn HistoryStore,
    policy: &FreshnessPolicy,
    now: DateTime<Utc>,
) -> Option<History> {
    match store.load() {
        Ok(Some(history)) if !history.is_empty() && policy.is_fresh(&history, now) => {
            Some(history)
        }
        Ok(_) => None,
        Err(e) => {
            warn!("⚠️ Ignoring unreadable history: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trend::{SessionState, TrendAnalyzer};
    use crate::shared::types::OiSnapshot;
    use chrono::{Duration, Local};
    use std::fs;

    fn temp_history_path() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("oiwatch-cmd-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir.join("history.json")
    }

    fn saved_store(path: &PathBuf) -> JsonFileStore {
        let analyzer = TrendAnalyzer::new();
        let mut state = SessionState::new();
        for (put, call) in [(1000.0, 800.0), (1100.0, 850.0)] {
            let reading = analyzer.analyze(OiSnapshot::new(put, call), &state, Local::now());
            state.record(reading);
        }
        let store = JsonFileStore::new(path);
        store.save(state.history()).unwrap();
        store
    }

    #[test]
    fn test_cli_defaults_to_watch() {
        let cli = Cli::try_parse_from(["oiwatch"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_overrides_take_priority() {
        let cli = Cli::try_parse_from([
            "oiwatch",
            "watch",
            "--cycles",
            "3",
            "--api-url",
            "https://oi.example.com",
            "--api-key",
            "abc",
            "--interval-ms",
            "5000",
            "--put-field",
            "data.put",
            "--history",
            "/tmp/oi.json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::Watch { cycles: Some(3) })));
        let cfg = cli.settings.resolve().unwrap();
        assert_eq!(cfg.api.url.as_deref(), Some("https://oi.example.com"));
        assert_eq!(cfg.api.key.as_deref(), Some("abc"));
        assert_eq!(cfg.schedule.interval_ms, 5_000);
        assert_eq!(cfg.schedule.tick_ms, 1_000);
        assert_eq!(cfg.api.put_field, "data.put");
        assert_eq!(cfg.history.path, PathBuf::from("/tmp/oi.json"));
    }

    #[test]
    fn test_history_and_clear_commands_parse() {
        let cli = Cli::try_parse_from(["oiwatch", "history", "--freshness-hours", "6"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::History)));
        assert_eq!(cli.settings.freshness_hours, Some(6));

        let cli = Cli::try_parse_from(["oiwatch", "clear"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Clear)));
    }

    #[test]
    fn test_stored_history_returns_fresh_readings() {
        let path = temp_history_path();
        let store = saved_store(&path);

        let history = stored_history(&store, &FreshnessPolicy::default(), Utc::now()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.newest().map(|r| r.put), Some(1100.0));
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_stored_history_leaves_stale_file_in_place() {
        let path = temp_history_path();
        let store = saved_store(&path);
        let later = Utc::now() + Duration::hours(25);

        assert!(stored_history(&store, &FreshnessPolicy::default(), later).is_none());
        assert!(path.exists());
        assert_eq!(store.load().unwrap().map(|h| h.len()), Some(2));
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_stored_history_leaves_corrupt_file_in_place() {
        let path = temp_history_path();
        fs::write(&path, b"{\"data\": [oops").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(stored_history(&store, &FreshnessPolicy::default(), Utc::now()).is_none());
        assert_eq!(fs::read(&path).unwrap(), b"{\"data\": [oops".to_vec());
        let siblings = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(siblings, 1);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
