//! Issuing numbered bills against an in-memory repository
//!
//! Run with `RUST_LOG=billing_core=debug` to see allocation logs.

use std::sync::Arc;

use billing_core::{
    utils::{EnhancedBillValidator, MemoryBillRepository},
    AllocationStrategy, BillBuilder, BillRegister, BillType, BillingConfig, BillingError, Customer,
    LineItem, PriceConvention, RatePolicy, RawLineItem,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"{
    "tax": {
        "defaultRate": 18,
        "sellerState": "Karnataka",
        "stateRates": { "Kerala": 12, "Goa": 0 }
    },
    "numbering": { "width": 4, "demoPrefix": "TRIAL" }
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🧾 Billing Core - Issuing Bills\n");

    let config = BillingConfig::from_json_str(CONFIG)?;
    let register = Arc::new(
        BillRegister::with_validator(
            MemoryBillRepository::new(),
            config,
            Box::new(EnhancedBillValidator),
        )
        .with_rate_policy(RatePolicy::Configured),
    );

    let march = NaiveDate::from_ymd_opt(2025, 3, 28).ok_or("invalid date")?;
    let april = NaiveDate::from_ymd_opt(2025, 4, 2).ok_or("invalid date")?;

    // 1. GST bills on both sides of the financial year boundary
    for (date, buyer, state) in [
        (march, "Malabar Stores", "Kerala"),
        (april, "Mysore Mart", "Karnataka"),
        (april, "Panaji Traders", "Goa"),
    ] {
        let draft = BillBuilder::new(BillType::Gst, date)
            .customer(Customer::new(buyer, Some(state)))
            .item(LineItem::new("Cashew 1kg", 2, BigDecimal::from(560), BigDecimal::from(5)))
            .item(LineItem::new("Coffee 500g", 1, BigDecimal::from(236), BigDecimal::from(18)))
            .build()?;
        let bill = register.issue(draft).await?;
        let display = bill.breakdown.display_total();

        println!("📄 {} for {} ({})", bill.number, bill.customer.name, state);
        println!("  Rate:     {}%", bill.breakdown.gst_rate);
        println!("  Subtotal: ₹{}", bill.breakdown.subtotal);
        println!(
            "  CGST ₹{}  SGST ₹{}  IGST ₹{}",
            bill.breakdown.cgst, bill.breakdown.sgst, bill.breakdown.igst
        );
        println!("  Payable:  ₹{} (round off ₹{})", display.final_amount, display.round_off);
        println!();
    }

    // 2. Form input with aliased field names, tax-exclusive prices
    let raw: Vec<RawLineItem> = serde_json::from_str(
        r#"[
            {"itemName": "Repair visit", "qty": 1, "price": "750"},
            {"productName": "Fuse", "itemQuantity": 3, "itemPrice": 40}
        ]"#,
    )?;
    let draft = BillBuilder::new(BillType::NonGst, april)
        .customer(Customer::new("Walk-in", None))
        .raw_items(raw)?
        .convention(PriceConvention::Exclusive)
        .notes("Paid in cash")
        .build()?;
    let plain = register.issue(draft).await?;
    println!("📄 {}: total ₹{}, no tax", plain.number, plain.breakdown.total_amount);

    // 3. Quotations issued concurrently still get unique numbers
    let mut handles = Vec::new();
    for i in 1..=5 {
        let register = Arc::clone(&register);
        handles.push(tokio::spawn(async move {
            let draft = BillBuilder::new(BillType::Quotation, april)
                .customer(Customer::new(format!("Prospect {i}"), Some("Kerala")))
                .item(LineItem::new("Gift hamper", i, BigDecimal::from(1120), BigDecimal::from(12)))
                .build()?;
            let bill = register.issue(draft).await?;
            Ok::<_, BillingError>(bill)
        }));
    }
    for handle in handles {
        let bill = handle.await??;
        println!("📝 {} for {}", bill.number, bill.customer.name);
    }
    println!();

    // 4. Demo bills use the configured prefix; scan allocation for a second register
    let scanning = BillRegister::new(
        register.repository().clone(),
        BillingConfig::from_json_str(CONFIG)?,
    )
    .with_strategy(AllocationStrategy::ScanExisting { max_attempts: 3 });
    let demo = scanning
        .issue(
            BillBuilder::new(BillType::Demo, april)
                .customer(Customer::new("Sales demo", Some("Karnataka")))
                .item(LineItem::new("Sample", 1, BigDecimal::from(100), BigDecimal::from(18)))
                .build()?,
        )
        .await?;
    println!("🧪 {}", demo.number);

    let peeked = register.peek_next_number(BillType::Gst, april).await?;
    println!("🔮 Next GST number would be {}", peeked);

    println!("\n📚 Register:");
    for bill in register.list_bills(None).await? {
        println!("  {:<20} ₹{:>10}", bill.number.as_str(), bill.breakdown.total_amount);
    }

    Ok(())
}
