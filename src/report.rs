//! Report shapes built on top of the aggregator: the month window is either
//! given, inferred from the rows, or precomputed by the caller.

use crate::aggregator::{aggregate_by_category, aggregate_scalar};
use crate::catalog::CategoryCatalog;
use crate::error::Result;
use crate::interval::infer_interval;
use crate::month::MonthKey;
use crate::operation::OperationRow;
use crate::range::month_range;
use crate::{MonthlyBreakdown, MonthlyTotals};
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Month window for a row set: explicit bounds win, missing ones come from
/// the earliest and latest operation. `None` when there is nothing to infer
/// from.
fn resolve_buckets<R: OperationRow>(
    rows: &[R],
    start: Option<MonthKey>,
    end: Option<MonthKey>,
) -> Result<Option<Vec<MonthKey>>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (start, end) => {
            let (first, last) = infer_interval(rows, |r| r.operation_date())?;
            (start.unwrap_or(first), end.unwrap_or(last))
        }
    };

    debug!("Bucketing {} rows into {} .. {}", rows.len(), start, end);
    month_range(start, end).map(Some)
}

/// Monthly totals over the given or inferred window. `None` for no rows.
pub fn ground_and_sum<R: OperationRow>(
    rows: &[R],
    start: Option<MonthKey>,
    end: Option<MonthKey>,
) -> Result<Option<MonthlyTotals>> {
    let Some(buckets) = resolve_buckets(rows, start, end)? else {
        return Ok(None);
    };

    let aggregation = aggregate_scalar(rows, |r| r.month(), |r| r.amount(), &buckets);
    Ok(Some(aggregation.into_buckets()))
}

/// Monthly totals per catalog label over the given or inferred window.
/// `None` for no rows.
pub fn totalize_by_month<R, C>(
    rows: &[R],
    category_of: C,
    catalog: &CategoryCatalog,
    start: Option<MonthKey>,
    end: Option<MonthKey>,
) -> Result<Option<MonthlyBreakdown>>
where
    R: OperationRow,
    C: Fn(&R) -> Option<&str>,
{
    let Some(buckets) = resolve_buckets(rows, start, end)? else {
        return Ok(None);
    };

    breakdown_by_category(rows, category_of, catalog, &buckets).map(Some)
}

/// Monthly totals per catalog label over precomputed buckets.
pub fn breakdown_by_category<R, C>(
    rows: &[R],
    category_of: C,
    catalog: &CategoryCatalog,
    buckets: &[MonthKey],
) -> Result<MonthlyBreakdown>
where
    R: OperationRow,
    C: Fn(&R) -> Option<&str>,
{
    let aggregation = aggregate_by_category(
        rows,
        |r| r.month(),
        category_of,
        |r| r.amount(),
        buckets,
        catalog,
    )?;
    Ok(aggregation.into_buckets())
}

/// Same grid as [`breakdown_by_category`], turned around to
/// `label -> month -> total`.
pub fn pivot_by_category<R, C>(
    rows: &[R],
    category_of: C,
    catalog: &CategoryCatalog,
    buckets: &[MonthKey],
) -> Result<BTreeMap<String, MonthlyTotals>>
where
    R: OperationRow,
    C: Fn(&R) -> Option<&str>,
{
    let by_month = breakdown_by_category(rows, category_of, catalog, buckets)?;

    let mut pivot: BTreeMap<String, MonthlyTotals> = BTreeMap::new();
    for (month, totals) in by_month {
        for (label, total) in totals {
            pivot.entry(label).or_default().insert(month, total);
        }
    }

    Ok(pivot)
}

/// Totals per label, without month bucketing. Rows without a label are
/// skipped.
pub fn totals_by_label<R, L>(rows: &[R], label_of: L) -> BTreeMap<String, Decimal>
where
    R: OperationRow,
    L: Fn(&R) -> Option<&str>,
{
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut unlabeled = 0;

    for row in rows {
        match label_of(row) {
            Some(label) => *totals.entry(label.to_string()).or_default() += row.amount(),
            None => unlabeled += 1,
        }
    }

    if unlabeled > 0 {
        debug!("Skipped {} rows without a label", unlabeled);
    }

    totals
}
