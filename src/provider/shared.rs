// src/provider/shared.rs

use anyhow::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

use super::{provider_for, DataProvider, LoadReport};
use crate::config::Config;

/// A load-once slot for the indicator table.
///
/// The first successful `get_or_load` runs the provider; every later call
/// returns the same `Arc`. A failed load leaves the slot empty so the next
/// call tries again. There is no invalidation.
pub struct TableCache {
    cell: OnceCell<Arc<LoadReport>>,
}

impl TableCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get_or_load(&self, provider: &dyn DataProvider) -> Result<Arc<LoadReport>> {
        self.cell
            .get_or_try_init(|| {
                info!(provider = provider.name(), "loading indicator table");
                provider.load().map(Arc::new)
            })
            .map(Arc::clone)
    }

    pub fn get(&self) -> Option<Arc<LoadReport>> {
        self.cell.get().cloned()
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: TableCache = TableCache::new();

/// Process-wide table, built from `config` on first use.
///
/// Later calls ignore `config` and return the table built by the first one.
pub fn shared_table(config: &Config) -> Result<Arc<LoadReport>> {
    if let Some(report) = SHARED.get() {
        return Ok(report);
    }
    let provider = provider_for(config)?;
    SHARED.get_or_load(provider.as_ref())
}
