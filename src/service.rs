use crate::aggregator::aggregate_scalar;
use crate::catalog::{CategoryDimension, CategoryProvider};
use crate::clock::{Clock, SystemClock};
use crate::config::StatisticsConfig;
use crate::error::Result;
use crate::filter::{OperationFilter, Scope};
use crate::month::MonthKey;
use crate::operation::{FinancialOperation, OperationKind, OperationRow};
use crate::range::{month_range, resolve_window};
use crate::report::{
    breakdown_by_category, ground_and_sum, pivot_by_category, totalize_by_month, totals_by_label,
};
use crate::utils::{parse_calendar_date, parse_calendar_end_date};
use crate::{MonthlyBreakdown, MonthlyTotals};
use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const RECEIPT_KINDS: [OperationKind; 2] =
    [OperationKind::InvoicePayment, OperationKind::CashReceipt];

/// The data-access layer: returns the operations selected by a filter.
pub trait OperationSource {
    fn fetch(&self, filter: &OperationFilter) -> Result<Vec<FinancialOperation>>;
}

/// Operations held in memory, filtered on every fetch.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<FinancialOperation>,
}

impl InMemorySource {
    pub fn new(rows: Vec<FinancialOperation>) -> Self {
        Self { rows }
    }
}

impl OperationSource for InMemorySource {
    fn fetch(&self, filter: &OperationFilter) -> Result<Vec<FinancialOperation>> {
        Ok(filter.apply(&self.rows).into_iter().cloned().collect())
    }
}

/// Optional report bounds as they arrive from the caller, e.g. path segments.
/// Accepts `YYYY-MM-DD` or `YYYY-MM`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportRequest {
    #[schemars(description = "Start date, YYYY-MM-DD or YYYY-MM. Omit for the default window.")]
    #[serde(default)]
    pub start: Option<String>,

    #[schemars(description = "End date, YYYY-MM-DD or YYYY-MM. Omit for today.")]
    #[serde(default)]
    pub end: Option<String>,
}

impl ReportRequest {
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// A bare month opens on its first day and closes on its last.
    fn dates(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        let present = |raw: &Option<String>| {
            raw.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let start = present(&self.start)
            .map(|s| parse_calendar_date(&s))
            .transpose()?;
        let end = present(&self.end)
            .map(|s| parse_calendar_end_date(&s))
            .transpose()?;
        Ok((start, end))
    }
}

/// Operation seen through its operation-type code.
struct TypedOperation<'a> {
    code: String,
    operation: &'a FinancialOperation,
}

impl OperationRow for TypedOperation<'_> {
    fn operation_date(&self) -> NaiveDate {
        self.operation.date
    }

    fn amount(&self) -> Decimal {
        self.operation.amount
    }
}

fn agency_label(op: &FinancialOperation) -> Option<&str> {
    op.agency.as_ref().map(|a| a.label.as_str())
}

/// One entry point per statistics report.
///
/// Reports either bucket over an inferred window (explicit bounds win, the
/// rest comes from the fetched operations) or over a trailing window of
/// `bucket_window_months`. Month-bucketed reports answer `None` when no
/// operation matches.
pub struct StatisticsService<S, P, C = SystemClock> {
    source: S,
    catalogs: P,
    clock: C,
    config: StatisticsConfig,
}

impl<S, P> StatisticsService<S, P, SystemClock>
where
    S: OperationSource,
    P: CategoryProvider,
{
    pub fn new(source: S, catalogs: P) -> Self {
        Self {
            source,
            catalogs,
            clock: SystemClock,
            config: StatisticsConfig::default(),
        }
    }
}

impl<S, P, C> StatisticsService<S, P, C>
where
    S: OperationSource,
    P: CategoryProvider,
    C: Clock,
{
    pub fn with_clock<C2: Clock>(self, clock: C2) -> StatisticsService<S, P, C2> {
        StatisticsService {
            source: self.source,
            catalogs: self.catalogs,
            clock,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: StatisticsConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &StatisticsConfig {
        &self.config
    }

    pub fn invoice_payments_by_agency(
        &self,
        agency_id: u64,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyTotals>> {
        info!("Invoice payments for agency {}", agency_id);
        self.inferred_totals(request, &[OperationKind::InvoicePayment], Scope::Agency(agency_id), None)
    }

    pub fn invoice_payments_by_sci(
        &self,
        sci_id: u64,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyTotals>> {
        info!("Invoice payments for SCI {}", sci_id);
        self.inferred_totals(request, &[OperationKind::InvoicePayment], Scope::Sci(sci_id), None)
    }

    pub fn invoice_payments_by_property(
        &self,
        property_id: u64,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyTotals>> {
        info!("Invoice payments for property {}", property_id);
        self.inferred_totals(
            request,
            &[OperationKind::InvoicePayment],
            Scope::Property(property_id),
            None,
        )
    }

    /// Invoice payments per payment method, every method in every month.
    pub fn invoice_payments_by_payment_method(
        &self,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyBreakdown>> {
        info!("Invoice payments by payment method");
        let (start, end) = request.dates()?;
        let filter = self
            .query_filter(start, end)?
            .kinds(&[OperationKind::InvoicePayment]);

        let rows = self.fetch(&filter)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let catalog = self.catalogs.catalog(CategoryDimension::PaymentMethod)?;
        totalize_by_month(
            &rows,
            FinancialOperation::payment_method_code,
            &catalog,
            start.map(MonthKey::from_date),
            end.map(MonthKey::from_date),
        )
    }

    pub fn expenses_by_agency(
        &self,
        agency_id: u64,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyTotals>> {
        info!("Expenses for agency {}", agency_id);
        self.inferred_totals(request, &[OperationKind::Expense], Scope::Agency(agency_id), None)
    }

    pub fn expenses_by_sci(&self, sci_id: u64, request: &ReportRequest) -> Result<Option<MonthlyTotals>> {
        info!("Expenses for SCI {}", sci_id);
        self.inferred_totals(request, &[OperationKind::Expense], Scope::Sci(sci_id), None)
    }

    pub fn expenses_by_property(
        &self,
        property_id: u64,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyTotals>> {
        info!("Expenses for property {}", property_id);
        self.inferred_totals(request, &[OperationKind::Expense], Scope::Property(property_id), None)
    }

    /// Expenses of one nature charged to the agency or to the SCI.
    pub fn expenses_by_nature_for_agency_or_sci(
        &self,
        nature_code: &str,
        agency_id: u64,
        sci_id: u64,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyTotals>> {
        info!(
            "Expenses of nature {} for agency {} or SCI {}",
            nature_code, agency_id, sci_id
        );
        self.inferred_totals(
            request,
            &[OperationKind::Expense],
            Scope::AgencyOrSci {
                agency: agency_id,
                sci: sci_id,
            },
            Some(nature_code),
        )
    }

    /// Agency expenses split per SCI over the trailing window.
    pub fn expenses_by_agency_per_sci(
        &self,
        agency_id: u64,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyBreakdown>> {
        info!("Expenses for agency {} per SCI", agency_id);
        let (buckets, filter) = self.trailing_window(request)?;
        let filter = filter
            .kinds(&[OperationKind::Expense])
            .scope(Scope::Agency(agency_id));

        let rows = self.fetch(&filter)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let catalog = self.catalogs.catalog(CategoryDimension::Sci)?;
        breakdown_by_category(&rows, FinancialOperation::sci_code, &catalog, &buckets).map(Some)
    }

    /// Expenses per nature over the trailing window, optionally for one agency.
    pub fn expenses_by_nature(
        &self,
        agency_id: Option<u64>,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyBreakdown>> {
        info!("Expenses by nature (agency: {:?})", agency_id);
        let (buckets, filter) = self.trailing_window(request)?;
        let scope = agency_id.map_or(Scope::Any, Scope::Agency);
        let filter = filter.kinds(&[OperationKind::Expense]).scope(scope);

        let rows = self.fetch(&filter)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let catalog = self.catalogs.catalog(CategoryDimension::ExpenseNature)?;
        breakdown_by_category(&rows, FinancialOperation::category_code, &catalog, &buckets).map(Some)
    }

    /// Monthly expenses of a single nature over the trailing window.
    pub fn expenses_for_nature(
        &self,
        nature_code: &str,
        request: &ReportRequest,
    ) -> Result<Option<MonthlyTotals>> {
        info!("Expenses of nature {}", nature_code);
        let (buckets, filter) = self.trailing_window(request)?;
        let filter = filter.kinds(&[OperationKind::Expense]).category(nature_code);

        let rows = self.fetch(&filter)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let aggregation = aggregate_scalar(&rows, |r| r.month(), |r| r.amount, &buckets);
        Ok(Some(aggregation.into_buckets()))
    }

    /// Every operation type with its monthly totals over the trailing window,
    /// keyed `type label -> month -> total`.
    pub fn operations_by_type(
        &self,
        request: &ReportRequest,
    ) -> Result<Option<BTreeMap<String, MonthlyTotals>>> {
        info!("Operations by type");
        let (buckets, filter) = self.trailing_window(request)?;

        let rows = self.fetch(&filter)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let typed: Vec<TypedOperation<'_>> = rows
            .iter()
            .map(|operation| TypedOperation {
                code: operation.kind.code(),
                operation,
            })
            .collect();

        let catalog = self.catalogs.catalog(CategoryDimension::OperationType)?;
        pivot_by_category(&typed, |t| Some(t.code.as_str()), &catalog, &buckets).map(Some)
    }

    /// Receipts (invoice payments and cash receipts) per agency name.
    pub fn receipts_by_agency(&self, request: &ReportRequest) -> Result<BTreeMap<String, Decimal>> {
        info!("Receipts by agency");
        let (start, end) = request.dates()?;
        let filter = self.query_filter(start, end)?.kinds(&RECEIPT_KINDS);

        let rows = self.fetch(&filter)?;
        Ok(totals_by_label(&rows, agency_label))
    }

    /// Receipts (invoice payments and cash receipts) per client type.
    pub fn receipts_by_client_type(
        &self,
        request: &ReportRequest,
    ) -> Result<BTreeMap<String, Decimal>> {
        info!("Receipts by client type");
        let (start, end) = request.dates()?;
        let filter = self.query_filter(start, end)?.kinds(&RECEIPT_KINDS);

        let rows = self.fetch(&filter)?;
        Ok(totals_by_label(&rows, |op| op.client_type.as_deref()))
    }

    /// Totals of one operation kind per agency name.
    pub fn totals_by_agency_for_kind(
        &self,
        kind: OperationKind,
        request: &ReportRequest,
    ) -> Result<BTreeMap<String, Decimal>> {
        info!("{:?} totals by agency", kind);
        self.label_totals(request, kind, Scope::Any, agency_label)
    }

    /// Totals of one operation kind for an agency, per expense nature.
    pub fn totals_by_nature_for_agency(
        &self,
        kind: OperationKind,
        agency_id: u64,
        request: &ReportRequest,
    ) -> Result<BTreeMap<String, Decimal>> {
        info!("{:?} totals for agency {} by nature", kind, agency_id);
        self.label_totals(request, kind, Scope::Agency(agency_id), |op| {
            op.category.as_ref().map(|c| c.label.as_str())
        })
    }

    /// Totals of one operation kind for an agency, per property.
    pub fn totals_by_property_for_agency(
        &self,
        kind: OperationKind,
        agency_id: u64,
        request: &ReportRequest,
    ) -> Result<BTreeMap<String, Decimal>> {
        info!("{:?} totals for agency {} by property", kind, agency_id);
        self.label_totals(request, kind, Scope::Agency(agency_id), |op| {
            op.property.as_ref().map(|p| p.label.as_str())
        })
    }

    /// Monthly totals of one operation kind for an agency over a calendar
    /// year, January through December.
    pub fn monthly_totals_for_agency_year(
        &self,
        kind: OperationKind,
        agency_id: u64,
        year: i32,
    ) -> Result<Option<MonthlyTotals>> {
        info!("{:?} for agency {} in {}", kind, agency_id, year);
        let filter = OperationFilter::for_year(year)?
            .kinds(&[kind])
            .scope(Scope::Agency(agency_id));

        let rows = self.fetch(&filter)?;
        ground_and_sum(&rows, Some(MonthKey::new(year, 1)?), Some(MonthKey::new(year, 12)?))
    }

    fn label_totals<L>(
        &self,
        request: &ReportRequest,
        kind: OperationKind,
        scope: Scope,
        label_of: L,
    ) -> Result<BTreeMap<String, Decimal>>
    where
        L: Fn(&FinancialOperation) -> Option<&str>,
    {
        let (start, end) = request.dates()?;
        let filter = self.query_filter(start, end)?.kinds(&[kind]).scope(scope);

        let rows = self.fetch(&filter)?;
        Ok(totals_by_label(&rows, label_of))
    }

    fn inferred_totals(
        &self,
        request: &ReportRequest,
        kinds: &[OperationKind],
        scope: Scope,
        nature_code: Option<&str>,
    ) -> Result<Option<MonthlyTotals>> {
        let (start, end) = request.dates()?;
        let mut filter = self.query_filter(start, end)?.kinds(kinds).scope(scope);
        if let Some(code) = nature_code {
            filter = filter.category(code);
        }

        let rows = self.fetch(&filter)?;
        ground_and_sum(
            &rows,
            start.map(MonthKey::from_date),
            end.map(MonthKey::from_date),
        )
    }

    fn query_filter(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<OperationFilter> {
        OperationFilter::for_period(start, end, self.config.query_window_months, &self.clock)
    }

    /// Buckets of the trailing window and a filter covering exactly those
    /// months. A defaulted start is widened to the first day of its month.
    fn trailing_window(&self, request: &ReportRequest) -> Result<(Vec<MonthKey>, OperationFilter)> {
        let (start, end) = request.dates()?;
        let (window_start, window_end) =
            resolve_window(start, end, self.config.bucket_window_months, &self.clock)?;

        let first = MonthKey::from_date(window_start);
        let buckets = month_range(first, MonthKey::from_date(window_end))?;
        let fetch_start = match start {
            Some(date) => date,
            None => first.first_day()?,
        };

        Ok((buckets, OperationFilter::new(fetch_start, window_end)))
    }

    fn fetch(&self, filter: &OperationFilter) -> Result<Vec<FinancialOperation>> {
        let rows = self.source.fetch(filter)?;
        debug!(
            "Fetched {} operations between {} and {}",
            rows.len(),
            filter.start,
            filter.end
        );
        Ok(rows)
    }
}
