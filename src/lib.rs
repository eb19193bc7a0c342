//! # Estate Statistics
//!
//! Month-bucketed statistics for a real-estate back office: invoice payments,
//! expenses and cash receipts grouped by agency, SCI, property, payment method,
//! expense nature or operation type.
//!
//! ## Core Concepts
//!
//! - **Month bucket**: one `YYYY-MM` slot of a result. Results are `BTreeMap`s
//!   keyed by [`MonthKey`], so they always iterate in calendar order.
//! - **Zero-fill**: every month of the window is present, and in categorical
//!   reports every catalog entry is present in every month, with zero when no
//!   operation matches.
//! - **Window**: explicit bounds, bounds inferred from the operations, or a
//!   trailing window anchored on an injected [`Clock`].
//! - **Catalog**: the ordered `(code, label)` lookup table of a dimension
//!   (payment methods, expense natures, SCIs, operation types).
//!
//! Fetching operations and catalogs is left to the caller through the
//! [`OperationSource`] and [`CategoryProvider`] traits.
//!
//! ## Example
//!
//! ```rust,ignore
//! use estate_statistics::*;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let rows = vec![
//!     FinancialOperation::new(
//!         NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
//!         dec!(150000),
//!         OperationKind::InvoicePayment,
//!     )
//!     .with_agency(EntityRef::new(1, "Agence Plateau")),
//! ];
//!
//! let service = StatisticsService::new(InMemorySource::new(rows), StaticCatalogs::new());
//! let totals = service
//!     .invoice_payments_by_agency(1, &ReportRequest::between("2024-01", "2024-03"))
//!     .unwrap();
//! ```

pub mod aggregator;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod interval;
pub mod month;
pub mod operation;
pub mod range;
pub mod report;
pub mod service;
pub mod utils;

pub use aggregator::{aggregate_by_category, aggregate_scalar, Aggregation};
pub use catalog::{
    load_categories, CatalogEntry, Category, CategoryCatalog, CategoryDimension,
    CategoryProvider, StaticCatalogs,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::StatisticsConfig;
pub use error::{Result, StatisticsError};
pub use filter::{OperationFilter, Scope};
pub use interval::infer_interval;
pub use month::MonthKey;
pub use operation::{EntityRef, FinancialOperation, OperationKind, OperationRow};
pub use range::{build_range, month_range, resolve_window};
pub use report::*;
pub use service::{InMemorySource, OperationSource, ReportRequest, StatisticsService};
pub use utils::*;

use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// `YYYY-MM -> total`
pub type MonthlyTotals = BTreeMap<MonthKey, Decimal>;

/// `YYYY-MM -> category label -> total`
pub type MonthlyBreakdown = BTreeMap<MonthKey, BTreeMap<String, Decimal>>;
