use crate::core::cache::Cache;
use crate::core::market::{DailyClose, SeriesProvider};
use crate::core::period::Period;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

type SeriesCell = Arc<OnceCell<Vec<DailyClose>>>;

/// Memoizes daily close series per `(symbol, period)`.
///
/// Concurrent callers for the same key share one upstream request. Failures
/// are not cached, so the next call for that key fetches again.
pub struct CachingSeriesProvider<T: SeriesProvider> {
    inner: T,
    cache: Cache<(String, Period), SeriesCell>,
}

impl<T: SeriesProvider> CachingSeriesProvider<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: Cache::new(),
        }
    }
}

#[async_trait]
impl<T: SeriesProvider> SeriesProvider for CachingSeriesProvider<T> {
    async fn fetch_daily_closes(&self, symbol: &str, period: Period) -> Result<Vec<DailyClose>> {
        let cell = self
            .cache
            .get_or_insert_with((symbol.to_string(), period), SeriesCell::default)
            .await;

        if let Some(closes) = cell.get() {
            debug!("Cache hit for series: {} {}", symbol, period);
            return Ok(closes.clone());
        }

        let closes = cell
            .get_or_try_init(|| async {
                debug!("Cache miss for series: {} {}", symbol, period);
                self.inner.fetch_daily_closes(symbol, period).await
            })
            .await?;
        Ok(closes.clone())
    }
}
