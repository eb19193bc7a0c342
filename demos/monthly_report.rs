use chrono::NaiveDate;
use estate_statistics::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow::anyhow!("invalid date {}-{}-{}", y, m, d))
}

fn main() -> anyhow::Result<()> {
    println!("🏢 Estate Statistics: monthly report demo\n");

    let plateau = EntityRef::new(1, "Agence Plateau");
    let sci = EntityRef::new(10, "SCI Les Almadies").with_code("ALM");

    let rows = vec![
        FinancialOperation::new(date(2024, 1, 8)?, dec!(450000), OperationKind::InvoicePayment)
            .with_agency(plateau.clone())
            .with_sci(sci.clone())
            .with_payment_method(EntityRef::new(1, "Espèces").with_code("ESP")),
        FinancialOperation::new(date(2024, 3, 22)?, dec!(320000), OperationKind::InvoicePayment)
            .with_agency(plateau.clone())
            .with_sci(sci.clone())
            .with_payment_method(EntityRef::new(3, "Virement").with_code("VIR")),
        FinancialOperation::new(date(2024, 2, 14)?, dec!(65000), OperationKind::Expense)
            .with_agency(plateau.clone())
            .with_sci(sci.clone())
            .with_category(EntityRef::new(4, "Entretien").with_code("ENT")),
    ];

    let catalogs = StaticCatalogs::new()
        .with(
            CategoryDimension::PaymentMethod,
            vec![
                Category::new("ESP", "Espèces"),
                Category::new("CHQ", "Chèque"),
                Category::new("VIR", "Virement"),
            ],
        )
        .with(
            CategoryDimension::ExpenseNature,
            vec![
                Category::new("ENT", "Entretien"),
                Category::new("TAX", "Taxes foncières"),
            ],
        );

    let service = StatisticsService::new(InMemorySource::new(rows), catalogs)
        .with_clock(FixedClock(date(2024, 4, 10)?));

    println!("📊 Invoice payments, agency Plateau (window inferred from data):");
    match service.invoice_payments_by_agency(1, &ReportRequest::default())? {
        Some(totals) => {
            for (month, total) in &totals {
                println!("   {}  {:>12}", month, total);
            }
        }
        None => println!("   no payments"),
    }

    println!("\n💳 Invoice payments by payment method:");
    let request = ReportRequest::between("2024-01", "2024-04");
    let by_method = service.invoice_payments_by_payment_method(&request)?;
    println!("{}", serde_json::to_string_pretty(&by_method)?);

    println!("\n🧾 Expenses by nature, trailing window:");
    let by_nature = service.expenses_by_nature(Some(1), &ReportRequest::default())?;
    println!("{}", serde_json::to_string_pretty(&by_nature)?);

    println!("\n⚙️  Configuration schema:");
    println!("{}", StatisticsConfig::schema_as_json()?);

    Ok(())
}
