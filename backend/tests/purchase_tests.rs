//! Purchase reconciliation tests
//!
//! Covers the derived financial fields of a stock purchase: unit price,
//! the paid/due split, payment status, and the quantity floor on edits.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::errors::DomainError;
use shared::payment::{check_edit_quantity, rebase_ledger_due, reconcile_purchase, split_payment};
use shared::types::PaymentStatus;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_fully_paid_purchase() {
        let rec = reconcile_purchase(dec("50"), dec("600"), dec("600")).unwrap();
        assert_eq!(rec.unit_price, dec("12"));
        assert_eq!(rec.split.paid, dec("600"));
        assert_eq!(rec.split.due, Decimal::ZERO);
        assert_eq!(rec.split.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_unpaid_purchase_is_pending() {
        let rec = reconcile_purchase(dec("50"), dec("600"), Decimal::ZERO).unwrap();
        assert_eq!(rec.split.due, dec("600"));
        assert_eq!(rec.split.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_partial_payment() {
        let rec = reconcile_purchase(dec("50"), dec("600"), dec("250")).unwrap();
        assert_eq!(rec.split.paid, dec("250"));
        assert_eq!(rec.split.due, dec("350"));
        assert_eq!(rec.split.status, PaymentStatus::Partial);
    }

    /// Paying more than the total clamps to the total instead of creating
    /// a negative due.
    #[test]
    fn test_overpayment_clamped_to_total() {
        let rec = reconcile_purchase(dec("50"), dec("600"), dec("900")).unwrap();
        assert_eq!(rec.split.paid, dec("600"));
        assert_eq!(rec.split.due, Decimal::ZERO);
        assert_eq!(rec.split.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_negative_paid_clamped_to_zero() {
        let split = split_payment(dec("600"), dec("-5")).unwrap();
        assert_eq!(split.paid, Decimal::ZERO);
        assert_eq!(split.due, dec("600"));
        assert_eq!(split.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = reconcile_purchase(Decimal::ZERO, dec("600"), dec("600")).unwrap_err();
        assert!(matches!(err, DomainError::ZeroQuantity { .. }));
    }

    #[test]
    fn test_negative_total_rejected() {
        let err = reconcile_purchase(dec("50"), dec("-600"), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, DomainError::NegativeAmount { .. }));
    }

    /// A batch of 100 with 60 still available has sold 40; the quantity
    /// cannot be edited below 40.
    #[test]
    fn test_edit_quantity_below_sold_rejected() {
        let err = check_edit_quantity(dec("30"), dec("100"), dec("60")).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientAvailableQuantity { .. }
        ));
    }

    #[test]
    fn test_edit_quantity_at_sold_floor_allowed() {
        assert!(check_edit_quantity(dec("40"), dec("100"), dec("60")).is_ok());
        assert!(check_edit_quantity(dec("120"), dec("100"), dec("60")).is_ok());
    }

    /// Purchase of 1000 unpaid, then 600 paid off through the vendor
    /// ledger (outstanding 400): re-saving the purchase with unchanged
    /// figures must keep those 600 settled, not resurrect them.
    #[test]
    fn test_edit_keeps_ledger_payments_settled() {
        let (due_after, status) = rebase_ledger_due(dec("1000"), dec("1000"), dec("1000"), dec("400"));
        assert_eq!(due_after, dec("400"));
        assert_eq!(status, PaymentStatus::Partial);
    }

    #[test]
    fn test_edit_raising_total_adds_only_the_increase() {
        // 600 already settled; raising the due to 1500 owes 900 more
        let (due_after, status) = rebase_ledger_due(dec("1500"), dec("1500"), dec("1000"), dec("400"));
        assert_eq!(due_after, dec("900"));
        assert_eq!(status, PaymentStatus::Partial);
    }

    #[test]
    fn test_edit_shrinking_total_below_settled_clears_due() {
        // 600 already settled; the edited due of 500 is fully covered
        let (due_after, status) = rebase_ledger_due(dec("500"), dec("500"), dec("1000"), dec("400"));
        assert_eq!(due_after, Decimal::ZERO);
        assert_eq!(status, PaymentStatus::Paid);
    }

    #[test]
    fn test_edit_without_prior_payments_takes_new_due() {
        let (due_after, status) = rebase_ledger_due(dec("800"), dec("300"), dec("600"), dec("600"));
        assert_eq!(due_after, dec("300"));
        assert_eq!(status, PaymentStatus::Partial);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating positive quantities
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for generating non-negative amounts
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10000000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for arbitrary paid inputs, including negatives and
    /// amounts above any plausible total
    fn paid_input_strategy() -> impl Strategy<Value = Decimal> {
        (-1000000i64..=20000000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// paid + due always reconstructs the total exactly
        #[test]
        fn paid_plus_due_equals_total(
            qty in quantity_strategy(),
            total in amount_strategy(),
            paid_input in paid_input_strategy(),
        ) {
            let rec = reconcile_purchase(qty, total, paid_input).unwrap();
            prop_assert_eq!(rec.split.paid + rec.split.due, total);
            prop_assert!(rec.split.paid >= Decimal::ZERO);
            prop_assert!(rec.split.due >= Decimal::ZERO);
        }

        /// An edit never un-settles ledger payments: the portion of the new
        /// due considered covered is exactly what payments already settled,
        /// capped at the new due itself.
        #[test]
        fn rebased_due_preserves_settled_portion(
            new_due in amount_strategy(),
            prev_due in amount_strategy(),
            outstanding_percent in 0u32..=100u32,
        ) {
            let prev_outstanding = (prev_due * Decimal::from(outstanding_percent)
                / Decimal::from(100))
                .round_dp(2);
            let (due_after, _) = rebase_ledger_due(new_due, new_due, prev_due, prev_outstanding);
            let settled = prev_due - prev_outstanding;
            prop_assert!(due_after <= new_due);
            prop_assert_eq!(new_due - due_after, settled.min(new_due));
        }

        /// Status is paid iff nothing is due, pending iff nothing is paid
        /// (on a positive total), partial otherwise.
        #[test]
        fn status_matches_split(
            total in amount_strategy(),
            paid_input in paid_input_strategy(),
        ) {
            let split = split_payment(total, paid_input).unwrap();
            match split.status {
                PaymentStatus::Paid => prop_assert_eq!(split.due, Decimal::ZERO),
                PaymentStatus::Pending => prop_assert_eq!(split.paid, Decimal::ZERO),
                PaymentStatus::Partial => {
                    prop_assert!(split.paid > Decimal::ZERO);
                    prop_assert!(split.due > Decimal::ZERO);
                }
            }
        }
    }
}
