//! Vendor ledger tests
//!
//! Covers oldest-due-first payment allocation across selected outstanding
//! transactions and credit utilization derivation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::errors::DomainError;
use shared::ledger::{
    allocate_payment, check_payment_within_balance, credit_utilization, OutstandingDue,
};
use shared::types::PaymentStatus;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn due(due_date: NaiveDate, amount: &str, due_amount: &str) -> OutstandingDue {
    OutstandingDue {
        transaction_id: Uuid::new_v4(),
        due_date,
        amount: dec(amount),
        due_amount: dec(due_amount),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Paying 2000 against dues of 1200 (older) and 1500: the older
    /// transaction is settled in full, the newer absorbs the remaining 800.
    #[test]
    fn test_allocation_oldest_first() {
        let older = due(date(2026, 1, 10), "1200", "1200");
        let newer = due(date(2026, 2, 10), "1500", "1500");
        // Input order deliberately newest-first
        let allocations = allocate_payment(dec("2000"), &[newer.clone(), older.clone()]).unwrap();

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].transaction_id, older.transaction_id);
        assert_eq!(allocations[0].allocated, dec("1200"));
        assert_eq!(allocations[0].due_after, Decimal::ZERO);
        assert_eq!(allocations[0].status_after, PaymentStatus::Paid);

        assert_eq!(allocations[1].transaction_id, newer.transaction_id);
        assert_eq!(allocations[1].allocated, dec("800"));
        assert_eq!(allocations[1].due_after, dec("700"));
        assert_eq!(allocations[1].status_after, PaymentStatus::Partial);
    }

    /// Equal due dates fall back to transaction id so the result is
    /// deterministic regardless of input order.
    #[test]
    fn test_allocation_tie_broken_by_id() {
        let a = due(date(2026, 3, 1), "500", "500");
        let b = due(date(2026, 3, 1), "500", "500");
        let first_id = a.transaction_id.min(b.transaction_id);

        let allocations = allocate_payment(dec("300"), &[a, b]).unwrap();
        assert_eq!(allocations[0].transaction_id, first_id);
        assert_eq!(allocations[0].allocated, dec("300"));
    }

    /// A payment above the vendor's running balance is rejected outright;
    /// one equal to the balance passes.
    #[test]
    fn test_payment_above_balance_rejected() {
        let err = check_payment_within_balance(dec("6000"), dec("5000")).unwrap_err();
        assert_eq!(
            err,
            DomainError::PaymentExceedsBalance {
                amount: dec("6000"),
                balance: dec("5000"),
            }
        );
        assert!(check_payment_within_balance(dec("5000"), dec("5000")).is_ok());
        assert!(check_payment_within_balance(dec("2000"), dec("5000")).is_ok());
    }

    /// A payment larger than the selected dues is rejected, not dropped
    #[test]
    fn test_payment_exceeding_dues_rejected() {
        let txns = [due(date(2026, 1, 10), "1200", "1200")];
        let err = allocate_payment(dec("1500"), &txns).unwrap_err();
        assert_eq!(
            err,
            DomainError::PaymentExceedsDue {
                remainder: dec("300")
            }
        );
    }

    #[test]
    fn test_settled_transaction_rejected() {
        let txns = [
            due(date(2026, 1, 10), "1200", "1200"),
            due(date(2026, 1, 20), "900", "0"),
        ];
        let err = allocate_payment(dec("100"), &txns).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn test_zero_payment_rejected() {
        let txns = [due(date(2026, 1, 10), "1200", "1200")];
        let err = allocate_payment(Decimal::ZERO, &txns).unwrap_err();
        assert!(matches!(err, DomainError::ZeroQuantity { .. }));
    }

    #[test]
    fn test_partially_settled_transaction_reaches_paid() {
        // 400 of 1000 already paid; covering the remaining 600 settles it
        let txns = [due(date(2026, 1, 10), "1000", "600")];
        let allocations = allocate_payment(dec("600"), &txns).unwrap();
        assert_eq!(allocations[0].due_after, Decimal::ZERO);
        assert_eq!(allocations[0].status_after, PaymentStatus::Paid);
    }

    #[test]
    fn test_credit_utilization() {
        assert_eq!(credit_utilization(dec("2500"), dec("10000")), dec("25"));
        assert_eq!(
            credit_utilization(dec("12000"), dec("10000")),
            dec("120")
        );
    }

    /// No limit configured means utilization reads as zero, never a
    /// division by zero.
    #[test]
    fn test_credit_utilization_without_limit() {
        assert_eq!(credit_utilization(dec("2500"), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(credit_utilization(dec("2500"), dec("-1")), Decimal::ZERO);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for a set of outstanding transactions with positive dues
    fn outstanding_strategy() -> impl Strategy<Value = Vec<OutstandingDue>> {
        prop::collection::vec(
            ((1i64..=100000i64), (0u32..=3650u32)),
            1..=8,
        )
        .prop_map(|entries| {
            let base = date(2026, 1, 1);
            entries
                .into_iter()
                .map(|(cents, offset)| {
                    let amount = Decimal::new(cents, 2);
                    OutstandingDue {
                        transaction_id: Uuid::new_v4(),
                        due_date: base + chrono::Duration::days(offset as i64),
                        amount,
                        due_amount: amount,
                    }
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// When allocation succeeds, the allocated parts sum to the payment
        /// and no transaction is driven below zero due.
        #[test]
        fn allocations_conserve_amount(
            txns in outstanding_strategy(),
            numerator in 1u32..=100u32,
        ) {
            let total_due: Decimal = txns.iter().map(|t| t.due_amount).sum();
            // A payment somewhere in (0, total_due]
            let amount = (total_due * Decimal::from(numerator) / Decimal::from(100))
                .round_dp(2)
                .max(Decimal::new(1, 2));

            let allocations = allocate_payment(amount, &txns).unwrap();
            let allocated: Decimal = allocations.iter().map(|a| a.allocated).sum();
            prop_assert_eq!(allocated, amount);
            for a in &allocations {
                prop_assert!(a.allocated > Decimal::ZERO);
                prop_assert!(a.due_after >= Decimal::ZERO);
            }
        }

        /// Allocations come back in due-date order and only the last one
        /// may leave a partial due behind.
        #[test]
        fn allocations_ordered_oldest_first(
            txns in outstanding_strategy(),
        ) {
            let total_due: Decimal = txns.iter().map(|t| t.due_amount).sum();
            let amount = (total_due / Decimal::from(2)).round_dp(2).max(Decimal::new(1, 2));

            let allocations = allocate_payment(amount, &txns).unwrap();
            let dates: std::collections::HashMap<Uuid, NaiveDate> =
                txns.iter().map(|t| (t.transaction_id, t.due_date)).collect();

            for pair in allocations.windows(2) {
                prop_assert!(dates[&pair[0].transaction_id] <= dates[&pair[1].transaction_id]);
            }
            for a in &allocations[..allocations.len() - 1] {
                prop_assert_eq!(a.due_after, Decimal::ZERO);
            }
        }
    }
}
