use crate::models::Asset;
use anyhow::{Context, bail};
use std::env;
use std::time::Duration;

/// Where the order book and trade endpoints live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiBase {
    /// Co-hosted deployment: relative paths on the shared host.
    SameOrigin,
    /// Decoupled deployment: an absolute API origin.
    External(String),
}

impl ApiBase {
    pub const SAME_ORIGIN: &'static str = "http://127.0.0.1:8080";

    /// Unset or blank selects same-origin; anything else must be an absolute http(s) URL.
    pub fn parse(value: Option<&str>) -> anyhow::Result<Self> {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(Self::SameOrigin);
        };

        let url = reqwest::Url::parse(value).with_context(|| format!("API_URL {value:?}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("API_URL must be an http(s) origin, got {value:?}");
        }

        Ok(Self::External(value.trim_end_matches('/').to_string()))
    }

    pub fn origin(&self) -> &str {
        match self {
            Self::SameOrigin => Self::SAME_ORIGIN,
            Self::External(origin) => origin,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin(), path)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: ApiBase,
    pub api_port: u16,
    /// Selectable assets; the first is selected for new sessions.
    pub assets: Vec<Asset>,
    pub poll_interval: Duration,
    pub book_depth: usize,
    pub notice_timeout: Duration,
    pub json_logs: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_base = ApiBase::parse(env::var("API_URL").ok().as_deref())?;

        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number (1-65535)")?;

        // default to BTC, ETH and SOL if ASSETS is not set
        let assets: Vec<Asset> = env::var("ASSETS")
            .unwrap_or_else(|_| "BTC,ETH,SOL".to_string())
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Asset::new)
            .collect();
        if assets.is_empty() {
            bail!("ASSETS must name at least one asset");
        }

        let poll_interval = Duration::from_millis(millis("POLL_INTERVAL_MS", 5000)?);
        let notice_timeout = Duration::from_millis(millis("NOTICE_TIMEOUT_MS", 4000)?);

        let book_depth = env::var("BOOK_DEPTH")
            .unwrap_or_else(|_| crate::orderbook::DEFAULT_DEPTH.to_string())
            .parse::<usize>()
            .context("BOOK_DEPTH must be a positive integer")?;
        if book_depth == 0 {
            bail!("BOOK_DEPTH must be a positive integer");
        }

        let json_logs = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => true,
            Ok("pretty") | Err(_) => false,
            Ok(other) => bail!("LOG_FORMAT must be pretty or json, got {other:?}"),
        };

        Ok(Self {
            api_base,
            api_port,
            assets,
            poll_interval,
            book_depth,
            notice_timeout,
            json_logs,
        })
    }

    pub fn default_asset(&self) -> &Asset {
        &self.assets[0]
    }

    pub fn is_listed(&self, asset: &Asset) -> bool {
        self.assets.contains(asset)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: ApiBase::SameOrigin,
            api_port: 3000,
            assets: vec![Asset::new("BTC"), Asset::new("ETH"), Asset::new("SOL")],
            poll_interval: Duration::from_secs(5),
            book_depth: crate::orderbook::DEFAULT_DEPTH,
            notice_timeout: Duration::from_secs(4),
            json_logs: false,
        }
    }
}

fn millis(key: &str, default: u64) -> anyhow::Result<u64> {
    match env::var(key) {
        Ok(v) => v
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .with_context(|| format!("{key} must be a positive number of milliseconds")),
        Err(_) => Ok(default),
    }
}
