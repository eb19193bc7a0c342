use crate::clock::Clock;
use crate::error::Result;
use crate::operation::{EntityRef, FinancialOperation, OperationKind};
use crate::month::MonthKey;
use crate::range::resolve_window;
use crate::utils::last_day_of_month;
use chrono::NaiveDate;

/// Which agency, SCI or property the operations must belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Any,
    Agency(u64),
    Sci(u64),
    Property(u64),
    /// Operations of the agency, or of the SCI, or both.
    AgencyOrSci { agency: u64, sci: u64 },
}

impl Scope {
    fn matches(&self, op: &FinancialOperation) -> bool {
        let has = |r: &Option<EntityRef>, id: u64| {
            r.as_ref().is_some_and(|e| e.id == id)
        };

        match *self {
            Scope::Any => true,
            Scope::Agency(id) => has(&op.agency, id),
            Scope::Sci(id) => has(&op.sci, id),
            Scope::Property(id) => has(&op.property, id),
            Scope::AgencyOrSci { agency, sci } => has(&op.agency, agency) || has(&op.sci, sci),
        }
    }
}

/// Selection of operations for one report.
///
/// Only validated, non-cancelled operations dated inside `[start, end]`
/// (both inclusive) pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Allowed kinds; empty allows every kind.
    pub kinds: Vec<OperationKind>,
    pub scope: Scope,
    /// Expense nature code.
    pub category_code: Option<String>,
    pub payment_method_code: Option<String>,
}

impl OperationFilter {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            kinds: Vec::new(),
            scope: Scope::Any,
            category_code: None,
            payment_method_code: None,
        }
    }

    /// Window from optional bounds: a missing start reaches back
    /// `default_span_months` from today and a missing end is today.
    pub fn for_period<C: Clock>(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        default_span_months: u32,
        clock: &C,
    ) -> Result<Self> {
        let (start, end) = resolve_window(start, end, default_span_months, clock)?;
        Ok(Self::new(start, end))
    }

    /// January 1st through December 31st of `year`.
    pub fn for_year(year: i32) -> Result<Self> {
        let start = MonthKey::new(year, 1)?.first_day()?;
        let end = last_day_of_month(year, 12)?;
        Ok(Self::new(start, end))
    }

    pub fn kinds(mut self, kinds: &[OperationKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn category(mut self, code: impl Into<String>) -> Self {
        self.category_code = Some(code.into());
        self
    }

    pub fn payment_method(mut self, code: impl Into<String>) -> Self {
        self.payment_method_code = Some(code.into());
        self
    }

    pub fn matches(&self, op: &FinancialOperation) -> bool {
        if !op.validated || op.cancelled {
            return false;
        }
        if op.date < self.start || op.date > self.end {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&op.kind) {
            return false;
        }
        if let Some(code) = &self.category_code {
            if op.category_code() != Some(code.as_str()) {
                return false;
            }
        }
        if let Some(code) = &self.payment_method_code {
            if op.payment_method_code() != Some(code.as_str()) {
                return false;
            }
        }
        self.scope.matches(op)
    }

    pub fn apply<'a>(&self, rows: &'a [FinancialOperation]) -> Vec<&'a FinancialOperation> {
        rows.iter().filter(|op| self.matches(op)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(d: NaiveDate) -> FinancialOperation {
        FinancialOperation::new(d, dec!(100), OperationKind::Expense)
    }

    #[test]
    fn test_calendar_year_window() {
        let filter = OperationFilter::for_year(2024).unwrap();
        assert_eq!(filter.start, date(2024, 1, 1));
        assert_eq!(filter.end, date(2024, 12, 31));

        assert!(filter.matches(&expense(date(2024, 12, 31))));
        assert!(!filter.matches(&expense(date(2025, 1, 1))));
        assert!(!filter.matches(&expense(date(2023, 12, 31))));
    }

    #[test]
    fn test_default_window_is_trailing_span() {
        let clock = FixedClock(date(2024, 7, 15));
        let filter = OperationFilter::for_period(None, None, 12, &clock).unwrap();

        assert_eq!(filter.start, date(2023, 7, 15));
        assert_eq!(filter.end, date(2024, 7, 15));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let filter = OperationFilter::new(date(2024, 1, 1), date(2024, 1, 31));

        assert!(filter.matches(&expense(date(2024, 1, 1))));
        assert!(filter.matches(&expense(date(2024, 1, 31))));
        assert!(!filter.matches(&expense(date(2023, 12, 31))));
        assert!(!filter.matches(&expense(date(2024, 2, 1))));
    }

    #[test]
    fn test_excludes_cancelled_and_pending() {
        let filter = OperationFilter::new(date(2024, 1, 1), date(2024, 12, 31));

        assert!(!filter.matches(&expense(date(2024, 3, 1)).cancelled()));
        assert!(!filter.matches(&expense(date(2024, 3, 1)).pending()));
    }

    #[test]
    fn test_kinds_and_category() {
        let filter = OperationFilter::new(date(2024, 1, 1), date(2024, 12, 31))
            .kinds(&[OperationKind::Expense])
            .category("ENT");

        let maintenance = expense(date(2024, 3, 1)).with_category(EntityRef::new(2, "Entretien").with_code("ENT"));
        let other = expense(date(2024, 3, 1)).with_category(EntityRef::new(3, "Taxes").with_code("TAX"));
        let payment = FinancialOperation::new(date(2024, 3, 1), dec!(10), OperationKind::InvoicePayment)
            .with_category(EntityRef::new(2, "Entretien").with_code("ENT"));

        assert!(filter.matches(&maintenance));
        assert!(!filter.matches(&other));
        assert!(!filter.matches(&payment));
    }

    #[test]
    fn test_scopes() {
        let op = expense(date(2024, 3, 1))
            .with_agency(EntityRef::new(1, "Agence Centre"))
            .with_sci(EntityRef::new(9, "SCI Les Almadies"));
        let window = OperationFilter::new(date(2024, 1, 1), date(2024, 12, 31));

        assert!(window.clone().scope(Scope::Agency(1)).matches(&op));
        assert!(!window.clone().scope(Scope::Agency(2)).matches(&op));
        assert!(window.clone().scope(Scope::Sci(9)).matches(&op));
        assert!(!window.clone().scope(Scope::Property(1)).matches(&op));
        assert!(window
            .clone()
            .scope(Scope::AgencyOrSci { agency: 2, sci: 9 })
            .matches(&op));
        assert!(!window
            .scope(Scope::AgencyOrSci { agency: 2, sci: 8 })
            .matches(&op));
    }

    #[test]
    fn test_apply() {
        let rows = vec![
            expense(date(2024, 3, 1)),
            expense(date(2024, 3, 2)).cancelled(),
            expense(date(2025, 1, 1)),
        ];
        let filter = OperationFilter::new(date(2024, 1, 1), date(2024, 12, 31));

        assert_eq!(filter.apply(&rows).len(), 1);
    }
}
