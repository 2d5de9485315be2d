//! Dashboard aggregation and the debounced stats cache.
//!
//! Aggregation is a pure reduction over the fetched collections; the cache
//! collapses bursts of writes into one recomputation by serving the previous
//! snapshot until the latest dirty mark is older than the configured window.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use homeboy_records::{Inquiry, Listing, ReviewStatus};

const MONTHS_SHOWN: u32 = 6;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_listings: usize,
    pub pending_listings: usize,
    pub approved_listings: usize,
    pub rejected_listings: usize,
    pub total_inquiries: usize,
    pub pending_inquiries: usize,
    pub total_users: usize,
    pub listings_by_month: Vec<MonthBucket>,
    pub inquiries_by_month: Vec<MonthBucket>,
    /// Percentage change of new listings, current month vs the one before.
    /// Absent when the previous month had none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listings_month_over_month: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthBucket {
    pub month: String,
    pub count: usize,
}

pub fn aggregate(
    listings: &[Listing],
    inquiries: &[Inquiry],
    total_users: usize,
    now: DateTime<Utc>,
) -> DashboardStats {
    let count_status = |status: ReviewStatus| {
        listings
            .iter()
            .filter(|listing| listing.status == status)
            .count()
    };

    let listings_by_month = bucket_by_month(listings.iter().map(|l| l.created_at.as_str()), now);
    let inquiries_by_month = bucket_by_month(inquiries.iter().map(|i| i.created_at.as_str()), now);

    let current = listings_by_month.last().map(|b| b.count).unwrap_or(0);
    let previous = listings_by_month
        .len()
        .checked_sub(2)
        .and_then(|i| listings_by_month.get(i))
        .map(|b| b.count)
        .unwrap_or(0);
    let listings_month_over_month = if previous > 0 {
        Some(((current as f64 - previous as f64) / previous as f64) * 100.0)
    } else {
        None
    };

    DashboardStats {
        total_listings: listings.len(),
        pending_listings: count_status(ReviewStatus::Pending),
        approved_listings: count_status(ReviewStatus::Approved),
        rejected_listings: count_status(ReviewStatus::Rejected),
        total_inquiries: inquiries.len(),
        pending_inquiries: inquiries
            .iter()
            .filter(|inquiry| inquiry.status == ReviewStatus::Pending)
            .count(),
        total_users,
        listings_by_month,
        inquiries_by_month,
        listings_month_over_month,
    }
}

/// Oldest to newest, always exactly `MONTHS_SHOWN` buckets ending at the
/// current month. Timestamps that fail to parse are ignored.
fn bucket_by_month<'a>(
    timestamps: impl Iterator<Item = &'a str>,
    now: DateTime<Utc>,
) -> Vec<MonthBucket> {
    let months: Vec<String> = (0..MONTHS_SHOWN)
        .rev()
        .map(|back| shift_month(now.year(), now.month(), back))
        .map(|(year, month)| format!("{year:04}-{month:02}"))
        .collect();

    let mut buckets: Vec<MonthBucket> = months
        .iter()
        .map(|month| MonthBucket {
            month: month.clone(),
            count: 0,
        })
        .collect();

    for timestamp in timestamps {
        let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
            continue;
        };
        let key = format!("{:04}-{:02}", parsed.year(), parsed.month());
        if let Some(bucket) = buckets.iter_mut().find(|b| b.month == key) {
            bucket.count += 1;
        }
    }

    buckets
}

fn shift_month(year: i32, month: u32, back: u32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 - back as i32;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

/// Debounced snapshot holder for the dashboard.
#[derive(Clone)]
pub struct StatsCache {
    inner: Arc<Mutex<CacheSlot>>,
    window: Duration,
}

#[derive(Default)]
struct CacheSlot {
    snapshot: Option<DashboardStats>,
    dirty_since: Option<Instant>,
}

impl StatsCache {
    pub fn new(window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheSlot::default())),
            window,
        }
    }

    /// Record that the underlying collections changed. Repeated marks within
    /// the window extend the settle period rather than forcing recomputes.
    pub async fn mark_dirty(&self) {
        let mut slot = self.inner.lock().await;
        slot.dirty_since = Some(Instant::now());
    }

    /// The snapshot to serve without recomputing, if any. Returns `None` when
    /// the cache is cold or a burst of writes has settled.
    pub async fn fresh_snapshot(&self) -> Option<DashboardStats> {
        let mut slot = self.inner.lock().await;
        let snapshot = slot.snapshot.clone()?;

        match slot.dirty_since {
            None => Some(snapshot),
            // Burst still in flight: keep serving the stale snapshot.
            Some(marked) if marked.elapsed() < self.window => Some(snapshot),
            Some(_) => {
                slot.snapshot = None;
                slot.dirty_since = None;
                None
            }
        }
    }

    /// Install a freshly computed snapshot. `read_at` is when the caller
    /// started reading the collections; a dirty mark newer than that means
    /// the snapshot is already stale, so the mark survives and forces the
    /// next recompute once it settles.
    pub async fn store(&self, stats: DashboardStats, read_at: Instant) {
        let mut slot = self.inner.lock().await;
        slot.snapshot = Some(stats);
        if slot.dirty_since.is_some_and(|marked| marked <= read_at) {
            slot.dirty_since = None;
        }
    }
}
