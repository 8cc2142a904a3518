//! Property tests for the GST calculator

use bigdecimal::BigDecimal;
use billing_core::{
    BillingMode, CalculationOptions, GstSlab, LineItem, PriceConvention, TaxCalculator,
    TaxJurisdictionPair,
};
use proptest::prelude::*;

fn cents(value: u32) -> BigDecimal {
    BigDecimal::from(value) / BigDecimal::from(100)
}

fn slab_rate() -> impl Strategy<Value = BigDecimal> {
    prop::sample::select(GstSlab::ALL.to_vec()).prop_map(|slab| slab.rate())
}

fn convention() -> impl Strategy<Value = PriceConvention> {
    prop_oneof![
        Just(PriceConvention::Inclusive),
        Just(PriceConvention::Exclusive)
    ]
}

fn item() -> impl Strategy<Value = LineItem> {
    (1u32..50, 1u32..2_000_000, slab_rate())
        .prop_map(|(quantity, price, rate)| LineItem::new("Item", quantity, cents(price), rate))
}

fn pair() -> impl Strategy<Value = TaxJurisdictionPair> {
    prop_oneof![
        Just(TaxJurisdictionPair::new("Karnataka", "Karnataka")),
        Just(TaxJurisdictionPair::new("Karnataka", " karnataka ")),
        Just(TaxJurisdictionPair::new("Karnataka", "Kerala")),
        Just(TaxJurisdictionPair::new("Tamil Nadu", "Maharashtra")),
    ]
}

proptest! {
    #[test]
    fn split_is_exclusive_and_adds_up(
        items in prop::collection::vec(item(), 1..6),
        pair in pair(),
        convention in convention(),
    ) {
        let options = CalculationOptions::new(BillingMode::Gst, convention);
        let breakdown = TaxCalculator::default().calculate(&items, &pair, options).unwrap();

        let zero = BigDecimal::from(0);
        if breakdown.is_interstate {
            prop_assert_eq!(&breakdown.cgst, &zero);
            prop_assert_eq!(&breakdown.sgst, &zero);
            prop_assert_eq!(&breakdown.igst, &breakdown.total_tax);
        } else {
            prop_assert_eq!(&breakdown.igst, &zero);
            prop_assert_eq!(&breakdown.cgst + &breakdown.sgst, breakdown.total_tax.clone());
        }
        prop_assert_eq!(
            &breakdown.subtotal + &breakdown.total_tax,
            breakdown.total_amount.clone()
        );
    }

    #[test]
    fn reverse_recovers_forward_subtotal(
        quantity in 1u32..50,
        price in 1u32..2_000_000,
        rate in slab_rate(),
        pair in pair(),
    ) {
        let calculator = TaxCalculator::default();
        let original = LineItem::new("Item", quantity, cents(price), rate.clone());

        let forward = calculator
            .calculate(
                &[original.clone()],
                &pair,
                CalculationOptions::new(BillingMode::Gst, PriceConvention::Exclusive),
            )
            .unwrap();

        let entered = LineItem::new("Item", 1, forward.total_amount.clone(), rate);
        let reverse = calculator
            .calculate(
                &[entered],
                &pair,
                CalculationOptions::new(BillingMode::Gst, PriceConvention::Inclusive),
            )
            .unwrap();

        prop_assert_eq!(&reverse.total_amount, &forward.total_amount);
        let drift = (&reverse.subtotal - original.line_amount()).abs();
        prop_assert!(drift <= cents(1), "subtotal drifted by {}", drift);
    }

    #[test]
    fn calculation_is_deterministic(
        items in prop::collection::vec(item(), 0..6),
        pair in pair(),
        convention in convention(),
    ) {
        let calculator = TaxCalculator::default();
        let options = CalculationOptions::new(BillingMode::Gst, convention);

        let first = calculator.calculate(&items, &pair, options).unwrap();
        let second = calculator.calculate(&items, &pair, options).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn non_gst_bills_carry_no_tax(
        items in prop::collection::vec(item(), 1..6),
        convention in convention(),
    ) {
        let options = CalculationOptions::new(BillingMode::NonGst, convention);
        let breakdown = TaxCalculator::default()
            .calculate(&items, &TaxJurisdictionPair::default(), options)
            .unwrap();

        let zero = BigDecimal::from(0);
        prop_assert_eq!(&breakdown.total_tax, &zero);
        prop_assert_eq!(&breakdown.cgst, &zero);
        prop_assert_eq!(&breakdown.sgst, &zero);
        prop_assert_eq!(&breakdown.igst, &zero);
        prop_assert_eq!(&breakdown.total_amount, &breakdown.subtotal);
    }
}
