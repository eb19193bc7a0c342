use crate::catalog::CategoryCatalog;
use crate::error::Result;
use crate::month::MonthKey;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Month buckets produced by an aggregation, plus the number of rows whose
/// month fell outside the bucket set and were left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation<V> {
    pub buckets: BTreeMap<MonthKey, V>,
    pub dropped: usize,
}

impl<V> Aggregation<V> {
    pub fn into_buckets(self) -> BTreeMap<MonthKey, V> {
        self.buckets
    }
}

/// Sums `value_of(row)` into the bucket of `month_of(row)`.
///
/// Every bucket starts at zero. Rows outside `buckets` are dropped and
/// counted in [`Aggregation::dropped`].
pub fn aggregate_scalar<R, M, V>(
    rows: &[R],
    month_of: M,
    value_of: V,
    buckets: &[MonthKey],
) -> Aggregation<Decimal>
where
    M: Fn(&R) -> MonthKey,
    V: Fn(&R) -> Decimal,
{
    let mut totals: BTreeMap<MonthKey, Decimal> =
        buckets.iter().map(|m| (*m, Decimal::ZERO)).collect();
    let mut dropped = 0;

    for row in rows {
        match totals.get_mut(&month_of(row)) {
            Some(total) => *total += value_of(row),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            "Dropped {} of {} rows outside the {} month buckets",
            dropped,
            rows.len(),
            buckets.len()
        );
    }

    Aggregation {
        buckets: totals,
        dropped,
    }
}

/// Sums rows into `month -> category label -> total`.
///
/// The result holds the full cross-product of `buckets` and `catalog`, zeros
/// included. A row whose category code is missing from the catalog (or has no
/// category at all) fails the whole aggregation with
/// [`crate::StatisticsError::UnknownCategory`]. Rows outside `buckets` are dropped
/// and counted.
pub fn aggregate_by_category<R, M, C, V>(
    rows: &[R],
    month_of: M,
    category_of: C,
    value_of: V,
    buckets: &[MonthKey],
    catalog: &CategoryCatalog,
) -> Result<Aggregation<BTreeMap<String, Decimal>>>
where
    M: Fn(&R) -> MonthKey,
    C: Fn(&R) -> Option<&str>,
    V: Fn(&R) -> Decimal,
{
    let mut grid: BTreeMap<MonthKey, BTreeMap<String, Decimal>> = buckets
        .iter()
        .map(|m| (*m, catalog.zeroed(Decimal::ZERO)))
        .collect();
    let mut dropped = 0;

    for row in rows {
        let code = category_of(row).unwrap_or_default();
        let label = catalog.label_of(code)?;

        let Some(month) = grid.get_mut(&month_of(row)) else {
            dropped += 1;
            continue;
        };

        // Labels are unique within a catalog and every bucket is seeded with all of them.
        if let Some(total) = month.get_mut(label) {
            *total += value_of(row);
        }
    }

    if dropped > 0 {
        debug!(
            "Dropped {} of {} categorised rows outside the {} month buckets",
            dropped,
            rows.len(),
            buckets.len()
        );
    }

    Ok(Aggregation {
        buckets: grid,
        dropped,
    })
}
