//! Sale reconciliation tests
//!
//! Covers sale totals: subtotal, discount (flat or percentage), tax,
//! profit, the paid/due split, and availability checks on line items.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::errors::DomainError;
use shared::payment::{finalize_sale, SaleLine};
use shared::types::{DiscountType, PaymentStatus};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn line(quantity: &str, unit_price: &str, buy_price: &str, available: &str) -> SaleLine {
    SaleLine {
        quantity: dec(quantity),
        unit_price: dec(unit_price),
        buy_price: dec(buy_price),
        available_quantity: dec(available),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Subtotal 1000, flat discount 100, tax 50: total 950. A payment of
    /// 500 leaves 450 due and a partial status.
    #[test]
    fn test_sale_totals_with_flat_discount() {
        let items = [
            line("10", "60", "40", "25"), // 600
            line("8", "50", "35", "30"),  // 400
        ];
        let totals =
            finalize_sale(&items, dec("100"), DiscountType::Amount, dec("50"), dec("500"))
                .unwrap();

        assert_eq!(totals.subtotal, dec("1000"));
        assert_eq!(totals.discount, dec("100"));
        assert_eq!(totals.total, dec("950"));
        assert_eq!(totals.paid, dec("500"));
        assert_eq!(totals.due, dec("450"));
        assert_eq!(totals.status, PaymentStatus::Partial);
        // (60-40)*10 + (50-35)*8 = 200 + 120
        assert_eq!(totals.profit, dec("320"));
    }

    #[test]
    fn test_percentage_discount() {
        let items = [line("10", "100", "70", "50")];
        let totals = finalize_sale(
            &items,
            dec("15"),
            DiscountType::Percentage,
            Decimal::ZERO,
            dec("850"),
        )
        .unwrap();

        assert_eq!(totals.subtotal, dec("1000"));
        assert_eq!(totals.discount, dec("150"));
        assert_eq!(totals.total, dec("850"));
        assert_eq!(totals.status, PaymentStatus::Paid);
    }

    /// A discount larger than the subtotal is clamped, never a negative total
    #[test]
    fn test_discount_clamped_to_subtotal() {
        let items = [line("2", "50", "30", "10")];
        let totals = finalize_sale(
            &items,
            dec("500"),
            DiscountType::Amount,
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .unwrap();

        assert_eq!(totals.discount, dec("100"));
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_overpayment_clamped_to_total() {
        let items = [line("2", "50", "30", "10")];
        let totals = finalize_sale(
            &items,
            Decimal::ZERO,
            DiscountType::Amount,
            Decimal::ZERO,
            dec("999"),
        )
        .unwrap();

        assert_eq!(totals.paid, dec("100"));
        assert_eq!(totals.due, Decimal::ZERO);
    }

    #[test]
    fn test_empty_sale_rejected() {
        let err = finalize_sale(
            &[],
            Decimal::ZERO,
            DiscountType::Amount,
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::EmptySale);
    }

    /// Selling more than the batch has available fails before any totals
    /// are derived.
    #[test]
    fn test_quantity_above_availability_rejected() {
        let items = [line("12", "50", "30", "10")];
        let err = finalize_sale(
            &items,
            Decimal::ZERO,
            DiscountType::Amount,
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: dec("12"),
                available: dec("10"),
            }
        );
    }

    #[test]
    fn test_negative_discount_rejected() {
        let items = [line("2", "50", "30", "10")];
        let err = finalize_sale(
            &items,
            dec("-10"),
            DiscountType::Amount,
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NegativeAmount { .. }));
    }

    /// Selling below cost yields a negative profit, which is reported
    /// rather than clamped.
    #[test]
    fn test_loss_making_sale_reports_negative_profit() {
        let items = [line("5", "30", "40", "20")];
        let totals = finalize_sale(
            &items,
            Decimal::ZERO,
            DiscountType::Amount,
            Decimal::ZERO,
            dec("150"),
        )
        .unwrap();
        assert_eq!(totals.profit, dec("-50"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for a sale line whose quantity never exceeds availability
    fn line_strategy() -> impl Strategy<Value = SaleLine> {
        (
            1i64..=10000i64,
            0i64..=100000i64,
            0i64..=100000i64,
            0i64..=10000i64,
        )
            .prop_map(|(qty, unit, buy, headroom)| SaleLine {
                quantity: Decimal::new(qty, 2),
                unit_price: Decimal::new(unit, 2),
                buy_price: Decimal::new(buy, 2),
                available_quantity: Decimal::new(qty + headroom, 2),
            })
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10000000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Total is exactly subtotal - discount + tax, floored at zero,
        /// and paid + due reconstructs it.
        #[test]
        fn totals_are_consistent(
            items in prop::collection::vec(line_strategy(), 1..=6),
            discount in amount_strategy(),
            tax in amount_strategy(),
            paid in amount_strategy(),
        ) {
            let totals =
                finalize_sale(&items, discount, DiscountType::Amount, tax, paid).unwrap();

            let expected_subtotal: Decimal =
                items.iter().map(|i| i.quantity * i.unit_price).sum();
            prop_assert_eq!(totals.subtotal, expected_subtotal);
            prop_assert!(totals.discount <= totals.subtotal);
            prop_assert_eq!(
                totals.total,
                (totals.subtotal - totals.discount + totals.tax).max(Decimal::ZERO)
            );
            prop_assert_eq!(totals.paid + totals.due, totals.total);
            prop_assert!(totals.paid >= Decimal::ZERO);
            prop_assert!(totals.due >= Decimal::ZERO);
        }

        /// A percentage discount never exceeds the subtotal for inputs
        /// up to 100 percent.
        #[test]
        fn percentage_discount_bounded(
            items in prop::collection::vec(line_strategy(), 1..=6),
            percent in 0u32..=100u32,
        ) {
            let totals = finalize_sale(
                &items,
                Decimal::from(percent),
                DiscountType::Percentage,
                Decimal::ZERO,
                Decimal::ZERO,
            )
            .unwrap();
            prop_assert!(totals.discount <= totals.subtotal);
            prop_assert!(totals.total >= Decimal::ZERO);
        }
    }
}
