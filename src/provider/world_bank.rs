// src/provider/world_bank.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::{collections::BTreeMap, time::Duration};
use tracing::{debug, info, warn};
use url::Url;

use super::{DataProvider, IndicatorFailure, LoadReport};
use crate::config::WorldBankConfig;
use crate::table::{Indicator, IndicatorRecord, IndicatorTable, TableBuilder};

/// Upper bound on pages fetched for one indicator.
pub const MAX_PAGES: u32 = 500;

/// Failure of a single World Bank request, kept apart by kind so callers can
/// tell a timeout from a bad payload.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("could not parse response from {url}: {source}")]
    Parse {
        url: String,
        source: serde_json::Error,
    },

    #[error("World Bank API error from {url}: {message}")]
    Api { url: String, message: String },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network { source, .. } if source.is_timeout())
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Parse { url, .. }
            | FetchError::Api { url, .. } => url,
        }
    }
}

/// Paging block that heads every World Bank response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u32,
    pub pages: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldBankPage {
    pub meta: PageMeta,
    pub records: Vec<IndicatorRecord>,
    /// Records dropped because their year or country code was unusable.
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    country: Option<RawNamed>,
    #[serde(default)]
    countryiso3code: Option<String>,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNamed {
    value: String,
}

/// The API sends paging numbers either as JSON numbers or as strings.
fn as_u32(v: Option<&Value>) -> Option<u32> {
    match v? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_value(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite())
}

/// Parse one `[metadata, records]` response body.
pub fn parse_page(url: &str, body: &str) -> Result<WorldBankPage, FetchError> {
    let parse_err = |source| FetchError::Parse {
        url: url.to_string(),
        source,
    };
    let json: Value = serde_json::from_str(body).map_err(parse_err)?;

    let parts = match json.as_array() {
        Some(parts) if !parts.is_empty() => parts,
        _ => {
            return Err(FetchError::Api {
                url: url.to_string(),
                message: "response is not a non-empty JSON array".to_string(),
            })
        }
    };

    // Error payloads look like `[{"message": [{"id": .., "value": ..}]}]`.
    if let Some(messages) = parts[0].get("message").and_then(Value::as_array) {
        let message = messages
            .iter()
            .filter_map(|m| m.get("value").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(FetchError::Api {
            url: url.to_string(),
            message,
        });
    }

    let meta = PageMeta {
        page: as_u32(parts[0].get("page")).unwrap_or(1),
        pages: as_u32(parts[0].get("pages")).unwrap_or(1),
        total: as_u32(parts[0].get("total")).unwrap_or(0),
    };

    let raw: Vec<RawRecord> = match parts.get(1) {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => serde_json::from_value(v.clone()).map_err(parse_err)?,
    };

    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = 0;
    for r in raw {
        let code = r.countryiso3code.unwrap_or_default();
        let year = r.date.as_deref().and_then(|d| d.trim().parse::<i32>().ok());
        match (r.country, year) {
            (Some(country), Some(year)) if !code.trim().is_empty() => {
                records.push(IndicatorRecord {
                    country: country.value,
                    country_code: code.trim().to_string(),
                    year,
                    value: as_value(&r.value),
                });
            }
            (_, year) => {
                debug!(code = %code, ?year, "skipping unusable record");
                skipped += 1;
            }
        }
    }

    Ok(WorldBankPage {
        meta,
        records,
        skipped,
    })
}

/// Live provider backed by the World Bank Indicators API.
pub struct WorldBankProvider {
    client: Client,
    base_url: String,
    per_page: u32,
    start_year: i32,
    end_year: i32,
    indicators: Vec<Indicator>,
}

impl WorldBankProvider {
    pub fn new(cfg: &WorldBankConfig, start_year: i32, end_year: i32) -> Result<Self> {
        let base_url = cfg.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).with_context(|| format!("parsing base URL {}", base_url))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            base_url,
            per_page: cfg.per_page,
            start_year,
            end_year,
            indicators: cfg.indicators.clone(),
        })
    }

    pub fn indicator_url(&self, indicator: Indicator, page: u32) -> Result<Url, FetchError> {
        let raw = format!("{}/{}", self.base_url, indicator.code());
        Url::parse_with_params(
            &raw,
            &[
                ("format", "json".to_string()),
                ("date", format!("{}:{}", self.start_year, self.end_year)),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ],
        )
        .map_err(|source| FetchError::InvalidUrl { url: raw, source })
    }

    fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        debug!("Fetching text from {}", url);
        let network = |source| FetchError::Network {
            url: url.to_string(),
            source,
        };
        let resp = self.client.get(url.clone()).send().map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        resp.text().map_err(network)
    }

    /// Fetch every page of one indicator. No retries.
    ///
    /// Paging follows the local page counter against the reported page
    /// count, stops early on an empty page, and never goes past
    /// [`MAX_PAGES`].
    pub fn fetch_indicator(&self, indicator: Indicator) -> Result<Vec<IndicatorRecord>, FetchError> {
        let mut out = Vec::new();
        let mut page = 1;
        loop {
            let url = self.indicator_url(indicator, page)?;
            let body = self.get_text(&url)?;
            let parsed = parse_page(url.as_str(), &body)?;
            if parsed.skipped > 0 {
                warn!(%indicator, page, skipped = parsed.skipped, "dropped unusable records");
            }
            let empty = parsed.records.is_empty();
            out.extend(parsed.records);
            if empty || page >= parsed.meta.pages {
                break;
            }
            if page >= MAX_PAGES {
                warn!(%indicator, pages = parsed.meta.pages, "page limit reached; stopping");
                break;
            }
            page += 1;
        }
        debug!(%indicator, records = out.len(), "fetched indicator");
        Ok(out)
    }
}

/// Merge per-indicator records into one row per (country, year).
pub fn merge_records(
    indicators: &[Indicator],
    per_indicator: &[(Indicator, Vec<IndicatorRecord>)],
) -> Result<IndicatorTable> {
    let mut rows: BTreeMap<(String, i32), (String, Vec<Option<f64>>)> = BTreeMap::new();
    for (indicator, records) in per_indicator {
        let Some(col) = indicators.iter().position(|i| i == indicator) else {
            continue;
        };
        for rec in records {
            let entry = rows
                .entry((rec.country.clone(), rec.year))
                .or_insert_with(|| (rec.country_code.clone(), vec![None; indicators.len()]));
            entry.1[col] = rec.value;
        }
    }

    let mut builder = TableBuilder::new(indicators);
    for ((country, year), (code, values)) in rows {
        builder.push_row(&country, &code, year, &values)?;
    }
    Ok(builder.finish()?)
}

impl DataProvider for WorldBankProvider {
    fn name(&self) -> &'static str {
        "world_bank"
    }

    fn load(&self) -> Result<LoadReport> {
        let mut fetched = Vec::with_capacity(self.indicators.len());
        let mut failures = Vec::new();

        for &indicator in &self.indicators {
            match self.fetch_indicator(indicator) {
                Ok(records) => fetched.push((indicator, records)),
                Err(error) => {
                    warn!(
                        %indicator,
                        timeout = error.is_timeout(),
                        error = %error,
                        "indicator fetch failed; continuing without it"
                    );
                    failures.push(IndicatorFailure { indicator, error });
                }
            }
        }

        let table = merge_records(&self.indicators, &fetched).context("merging World Bank records")?;
        info!(
            rows = table.len(),
            failed = failures.len(),
            "loaded World Bank indicator table"
        );
        Ok(LoadReport::new(table, failures))
    }
}
