// src/app.rs
use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use crate::application::presenter::{Presenter, TerminalDisplay};
use crate::application::scheduler::{Scheduler, SchedulerConfig};
use crate::config::Config;
use crate::domain::history::{load_session, FreshnessPolicy};
use crate::domain::trend::CONFIRMATION_LOOKBACK;
use crate::infrastructure::market_data::{HttpOiClient, OiEndpoint};
use crate::infrastructure::storage::JsonFileStore;
use crate::shared::errors::ConfigError;

/// Fully resolved settings for a watch run
#[derive(Debug, Clone)]
pub struct AppCfg {
    pub endpoint: OiEndpoint,
    pub interval: Duration,
    pub tick: Duration,
    pub history_path: PathBuf,
    pub freshness: FreshnessPolicy,
    pub max_entries: Option<usize>,
}

impl AppCfg {
    pub fn from_config(cfg: Config) -> Result<Self, ConfigError> {
        let url = cfg
            .api
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::Missing("api.url"))?;
        let key = cfg
            .api
            .key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("api.key"))?;

        if cfg.schedule.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "schedule.interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if cfg.schedule.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "schedule.tick_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if cfg.api.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "api.timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(max) = cfg.history.max_entries {
            if max < CONFIRMATION_LOOKBACK {
                return Err(ConfigError::Invalid {
                    key: "history.max_entries",
                    reason: format!(
                        "must be at least {} so trends can be confirmed",
                        CONFIRMATION_LOOKBACK
                    ),
                });
            }
        }
        let freshness = freshness_policy(cfg.history.freshness_hours)?;

        Ok(Self {
            endpoint: OiEndpoint {
                url,
                api_key: key,
                put_field: cfg.api.put_field,
                call_field: cfg.api.call_field,
                timeout: Duration::from_millis(cfg.api.timeout_ms),
            },
            interval: Duration::from_millis(cfg.schedule.interval_ms),
            tick: Duration::from_millis(cfg.schedule.tick_ms),
            history_path: cfg.history.path,
            freshness,
            max_entries: cfg.history.max_entries,
        })
    }
}

/// Resolve `history.freshness_hours` without panicking on huge values.
pub fn freshness_policy(hours: u64) -> Result<FreshnessPolicy, ConfigError> {
    i64::try_from(hours)
        .ok()
        .and_then(FreshnessPolicy::hours)
        .ok_or_else(|| ConfigError::Invalid {
            key: "history.freshness_hours",
            reason: format!("{} hours is out of range", hours),
        })
}

pub async fn run(app_cfg: AppCfg, max_cycles: Option<u64>) -> Result<()> {
    info!("Starting OI trend watcher");
    info!("Configuration: {:?}", app_cfg);

    let store = JsonFileStore::new(&app_cfg.history_path);
    let session = load_session(&store, &app_cfg.freshness, Utc::now())
        .with_max_entries(app_cfg.max_entries);

    let source = HttpOiClient::new(app_cfg.endpoint.clone())?;

    let mut presenter = Presenter::new(Box::new(TerminalDisplay::new()));
    if !session.history().is_empty() {
        presenter.show_history(session.history());
    }

    let mut scheduler = Scheduler::new(
        SchedulerConfig {
            interval: app_cfg.interval,
            tick: app_cfg.tick,
            max_cycles,
        },
        Box::new(source),
        Box::new(store),
        presenter,
        session,
    );

    let cycles = scheduler.run_until(shutdown_signal()).await;
    info!(
        "Stopped after {} cycle(s), {} readings in history",
        cycles,
        scheduler.session().history().len()
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("❌ Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
