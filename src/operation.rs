use crate::month::MonthKey;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cash-register operation types used by the statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Settlement of a rent or service invoice.
    InvoicePayment,
    /// Any other cash-in at the register.
    CashReceipt,
    /// Spending charged to an agency, SCI or property.
    Expense,
    /// Operation type outside the reporting set, by its type id.
    Other(u32),
}

impl OperationKind {
    pub fn from_type_id(id: u32) -> Self {
        match id {
            6 => Self::InvoicePayment,
            7 => Self::CashReceipt,
            8 => Self::Expense,
            other => Self::Other(other),
        }
    }

    pub fn type_id(&self) -> u32 {
        match self {
            Self::InvoicePayment => 6,
            Self::CashReceipt => 7,
            Self::Expense => 8,
            Self::Other(id) => *id,
        }
    }

    /// Code used for this kind in the operation-type catalog.
    pub fn code(&self) -> String {
        self.type_id().to_string()
    }
}

/// A reference to another entity: id, optional business code, display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: u64,
    #[serde(default)]
    pub code: Option<String>,
    pub label: String,
}

impl EntityRef {
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            code: None,
            label: label.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// One cash-register operation as returned by the data-access layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialOperation {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub kind: OperationKind,
    /// Only validated operations count in statistics.
    #[serde(default = "default_validated")]
    pub validated: bool,
    #[serde(default)]
    pub cancelled: bool,
    /// Expense nature.
    #[serde(default)]
    pub category: Option<EntityRef>,
    #[serde(default)]
    pub payment_method: Option<EntityRef>,
    #[serde(default)]
    pub agency: Option<EntityRef>,
    #[serde(default)]
    pub sci: Option<EntityRef>,
    #[serde(default)]
    pub property: Option<EntityRef>,
    #[serde(default)]
    pub client_type: Option<String>,
}

fn default_validated() -> bool {
    true
}

impl FinancialOperation {
    pub fn new(date: NaiveDate, amount: Decimal, kind: OperationKind) -> Self {
        Self {
            date,
            amount,
            kind,
            validated: true,
            cancelled: false,
            category: None,
            payment_method: None,
            agency: None,
            sci: None,
            property: None,
            client_type: None,
        }
    }

    pub fn with_category(mut self, category: EntityRef) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_payment_method(mut self, method: EntityRef) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn with_agency(mut self, agency: EntityRef) -> Self {
        self.agency = Some(agency);
        self
    }

    pub fn with_sci(mut self, sci: EntityRef) -> Self {
        self.sci = Some(sci);
        self
    }

    pub fn with_property(mut self, property: EntityRef) -> Self {
        self.property = Some(property);
        self
    }

    pub fn with_client_type(mut self, client_type: impl Into<String>) -> Self {
        self.client_type = Some(client_type.into());
        self
    }

    /// Expense nature code.
    pub fn category_code(&self) -> Option<&str> {
        self.category.as_ref().and_then(|c| c.code.as_deref())
    }

    pub fn payment_method_code(&self) -> Option<&str> {
        self.payment_method.as_ref().and_then(|m| m.code.as_deref())
    }

    pub fn sci_code(&self) -> Option<&str> {
        self.sci.as_ref().and_then(|s| s.code.as_deref())
    }

    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub fn pending(mut self) -> Self {
        self.validated = false;
        self
    }
}

/// What the aggregation needs from a row: when it happened and how much.
pub trait OperationRow {
    fn operation_date(&self) -> NaiveDate;
    fn amount(&self) -> Decimal;

    fn month(&self) -> MonthKey {
        MonthKey::from_date(self.operation_date())
    }
}

impl OperationRow for FinancialOperation {
    fn operation_date(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_type_ids() {
        assert_eq!(OperationKind::from_type_id(6), OperationKind::InvoicePayment);
        assert_eq!(OperationKind::from_type_id(8), OperationKind::Expense);
        assert_eq!(OperationKind::from_type_id(3), OperationKind::Other(3));
        assert_eq!(OperationKind::CashReceipt.type_id(), 7);
        assert_eq!(OperationKind::Expense.code(), "8");
    }

    #[test]
    fn test_reference_codes() {
        let op = FinancialOperation::new(
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            dec!(75),
            OperationKind::Expense,
        )
        .with_category(EntityRef::new(2, "Entretien").with_code("ENT"))
        .with_sci(EntityRef::new(9, "SCI Les Almadies"));

        assert_eq!(op.category_code(), Some("ENT"));
        assert_eq!(op.payment_method_code(), None);
        assert_eq!(op.sci_code(), None);
    }

    #[test]
    fn test_row_month() {
        let op = FinancialOperation::new(
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            dec!(1500),
            OperationKind::InvoicePayment,
        );
        assert_eq!(op.month().to_string(), "2024-02");
        assert_eq!(OperationRow::amount(&op), dec!(1500));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"date":"2024-03-05","amount":"250.00","kind":"expense"}"#;
        let op: FinancialOperation = serde_json::from_str(json).unwrap();

        assert!(op.validated);
        assert!(!op.cancelled);
        assert_eq!(op.amount, dec!(250.00));
        assert!(op.category.is_none());
    }
}
