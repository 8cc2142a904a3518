//! GST calculation examples

use billing_core::{
    BillingMode, CalculationOptions, GstCalculation, GstSlab, Jurisdiction, LineItem,
    PriceConvention, RatePolicy, TaxCalculator, TaxConfig, TaxJurisdictionPair,
};
use bigdecimal::BigDecimal;
use std::str::FromStr;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Billing Core - GST Calculation Examples\n");

    // 1. Standard slabs
    println!("📊 GST Slabs:");
    for slab in GstSlab::ALL {
        println!("  {:?}: {}%", slab, slab.rate());
    }
    println!();

    // 2. Same amount, both jurisdictions
    let base_amount = BigDecimal::from(10000);
    for jurisdiction in [Jurisdiction::Intrastate, Jurisdiction::Interstate] {
        let calc = GstCalculation::calculate(
            base_amount.clone(),
            GstSlab::Higher.rate_for(jurisdiction),
        )?;

        println!("🏢 {:?} at 18%:", jurisdiction);
        println!("  Base Amount: ₹{}", calc.base_amount);
        println!("  CGST:        ₹{}", calc.cgst_amount);
        println!("  SGST:        ₹{}", calc.sgst_amount);
        println!("  IGST:        ₹{}", calc.igst_amount);
        println!("  Total GST:   ₹{}", calc.total_gst_amount);
        println!("  Final Total: ₹{}", calc.total_amount);
        println!();
    }

    // 3. Reverse calculation from an entered total
    let mut config = TaxConfig::default().with_seller_state("Karnataka");
    config.insert_state_rate("Kerala", BigDecimal::from(12))?;
    let calculator = TaxCalculator::new(config);

    let entered = BigDecimal::from(11800);
    let reverse = calculator.reverse(entered.clone(), BigDecimal::from(18), Jurisdiction::Intrastate)?;
    println!("🔄 Reverse Calculation:");
    println!("  Entered Total: ₹{}", entered);
    println!("  Base Amount:   ₹{}", reverse.base_amount);
    println!("  CGST:          ₹{}", reverse.cgst_amount);
    println!("  SGST:          ₹{}", reverse.sgst_amount);
    println!();

    // 4. A bill with mixed rates, priced both ways
    let items = vec![
        LineItem::new("Rice 5kg", 2, BigDecimal::from(320), GstSlab::Exempt.rate()),
        LineItem::new("Ghee 1L", 1, BigDecimal::from(630), GstSlab::Higher.rate()),
        LineItem::new("Notebook", 6, BigDecimal::from_str("44.50")?, GstSlab::Standard.rate()),
    ];
    let buyer = calculator.jurisdiction_for(Some("Tamil Nadu"));

    for convention in [PriceConvention::Inclusive, PriceConvention::Exclusive] {
        let breakdown = calculator.calculate(
            &items,
            &buyer,
            CalculationOptions::new(BillingMode::Gst, convention),
        )?;
        let display = breakdown.display_total();

        println!("🧾 Bill with {:?} prices (interstate: {}):", convention, breakdown.is_interstate);
        for line in &breakdown.lines {
            println!(
                "  {:<10} x{:<2} @ {:>2}%  taxable ₹{:>8}  gst ₹{:>7}",
                line.description, line.quantity, line.gst_rate, line.taxable_amount, line.gst_amount
            );
        }
        println!("  Subtotal:      ₹{}", breakdown.subtotal);
        println!("  IGST:          ₹{}", breakdown.igst);
        println!("  Total:         ₹{}", breakdown.total_amount);
        println!("  Effective Rate {}%", breakdown.gst_rate);
        println!("  Round Off:     ₹{}", display.round_off);
        println!("  Payable:       ₹{}", display.final_amount);
        println!();
    }

    // 5. Configured state rate and Non-GST mode
    let kerala = calculator.calculate(
        &items,
        &calculator.jurisdiction_for(Some("Kerala")),
        CalculationOptions::new(BillingMode::Gst, PriceConvention::Inclusive)
            .with_policy(RatePolicy::Configured),
    )?;
    println!("⚙️  Kerala at configured {}%: tax ₹{}", kerala.gst_rate, kerala.total_tax);

    let plain = calculator.calculate(
        &items,
        &TaxJurisdictionPair::default(),
        CalculationOptions::new(BillingMode::NonGst, PriceConvention::Inclusive),
    )?;
    println!("📄 Non-GST bill: total ₹{}, tax ₹{}", plain.total_amount, plain.total_tax);

    Ok(())
}
