//! Per-member balance aggregation.
//!
//! A balance is never stored: it is a pure function of the approved ledger
//! entries and the settlements visible at one snapshot. The persistence
//! layer reads members, entries, and settlements inside a single database
//! transaction and hands them to [`compute_balances`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::ledger::types::EntryStatus;

/// A group member as needed for balance reporting.
#[derive(Debug, Clone)]
pub struct MemberRef {
    /// The member's user ID.
    pub user_id: Uuid,
    /// The member's display name (used for presentation ordering).
    pub name: String,
}

/// The balance-relevant slice of a ledger entry.
#[derive(Debug, Clone, Copy)]
pub struct EntryAmount {
    /// The user the entry credits.
    pub beneficiary_id: Uuid,
    /// The entry's status; only approved entries contribute.
    pub status: EntryStatus,
    /// The entry's amount.
    pub amount: Decimal,
}

/// The balance-relevant slice of a settlement.
#[derive(Debug, Clone, Copy)]
pub struct SettlementAmount {
    /// The user the settlement was paid to.
    pub user_id: Uuid,
    /// The settlement's amount (always reduces the balance).
    pub amount: Decimal,
}

/// A member's net balance in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberBalance {
    /// The member's user ID.
    pub user_id: Uuid,
    /// The member's display name.
    pub name: String,
    /// Net amount owed to (positive) or by (negative) the member.
    pub balance: Decimal,
}

/// Computes the balance of every group member from one snapshot.
///
/// For each member: `sum(approved entries crediting them)` minus
/// `sum(settlements paid to them)`. Members with no activity are reported
/// with a zero balance, not omitted. Pending and rejected entries contribute
/// nothing. Output is ordered by display name (a presentation convenience,
/// with the user ID as tiebreaker for determinism).
#[must_use]
pub fn compute_balances(
    members: &[MemberRef],
    entries: &[EntryAmount],
    settlements: &[SettlementAmount],
) -> Vec<MemberBalance> {
    let mut credits: HashMap<Uuid, Decimal> = HashMap::new();
    for entry in entries {
        if entry.status == EntryStatus::Approved {
            *credits.entry(entry.beneficiary_id).or_default() += entry.amount;
        }
    }

    let mut debits: HashMap<Uuid, Decimal> = HashMap::new();
    for settlement in settlements {
        *debits.entry(settlement.user_id).or_default() += settlement.amount;
    }

    let mut balances: Vec<MemberBalance> = members
        .iter()
        .map(|member| {
            let credit = credits.get(&member.user_id).copied().unwrap_or_default();
            let debit = debits.get(&member.user_id).copied().unwrap_or_default();
            MemberBalance {
                user_id: member.user_id,
                name: member.name.clone(),
                balance: credit - debit,
            }
        })
        .collect();

    balances.sort_by(|a, b| a.name.cmp(&b.name).then(a.user_id.cmp(&b.user_id)));
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn member(name: &str) -> MemberRef {
        MemberRef {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    fn approved(user: Uuid, amount: Decimal) -> EntryAmount {
        EntryAmount {
            beneficiary_id: user,
            status: EntryStatus::Approved,
            amount,
        }
    }

    fn balance_of(balances: &[MemberBalance], user: Uuid) -> Decimal {
        balances
            .iter()
            .find(|b| b.user_id == user)
            .expect("member missing from balances")
            .balance
    }

    #[test]
    fn test_member_with_no_activity_is_zero() {
        let m = member("Alex");
        let balances = compute_balances(&[m.clone()], &[], &[]);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].user_id, m.user_id);
        assert_eq!(balances[0].balance, dec!(0));
    }

    #[test]
    fn test_approved_entries_credit_settlements_debit() {
        let m = member("Alex");
        let entries = [approved(m.user_id, dec!(20)), approved(m.user_id, dec!(5))];
        let settlements = [SettlementAmount {
            user_id: m.user_id,
            amount: dec!(10),
        }];

        let balances = compute_balances(&[m.clone()], &entries, &settlements);
        assert_eq!(balance_of(&balances, m.user_id), dec!(15));
    }

    #[test]
    fn test_pending_and_rejected_contribute_nothing() {
        let m = member("Alex");
        let entries = [
            approved(m.user_id, dec!(20)),
            EntryAmount {
                beneficiary_id: m.user_id,
                status: EntryStatus::PendingApproval,
                amount: dec!(100),
            },
            EntryAmount {
                beneficiary_id: m.user_id,
                status: EntryStatus::Rejected,
                amount: dec!(100),
            },
        ];

        let balances = compute_balances(&[m.clone()], &entries, &[]);
        assert_eq!(balance_of(&balances, m.user_id), dec!(20));
    }

    #[test]
    fn test_settlement_can_push_balance_negative() {
        let m = member("Alex");
        let settlements = [SettlementAmount {
            user_id: m.user_id,
            amount: dec!(30),
        }];

        let balances = compute_balances(&[m.clone()], &[], &settlements);
        assert_eq!(balance_of(&balances, m.user_id), dec!(-30));
    }

    #[test]
    fn test_ordered_by_display_name() {
        let zoe = member("Zoe");
        let alex = member("Alex");
        let mia = member("Mia");

        let balances = compute_balances(&[zoe, alex, mia], &[], &[]);
        let names: Vec<&str> = balances.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Alex", "Mia", "Zoe"]);
    }

    #[test]
    fn test_chore_scenario_settles_to_zero() {
        // M's approved entry worth 20, then a settlement of 20: back to zero.
        let head = member("Hana");
        let m = member("Milo");

        let entries = [approved(m.user_id, dec!(20))];
        let balances = compute_balances(&[head.clone(), m.clone()], &entries, &[]);
        assert_eq!(balance_of(&balances, m.user_id), dec!(20));
        assert_eq!(balance_of(&balances, head.user_id), dec!(0));

        let settlements = [SettlementAmount {
            user_id: m.user_id,
            amount: dec!(20),
        }];
        let balances = compute_balances(&[head.clone(), m.clone()], &entries, &settlements);
        assert_eq!(balance_of(&balances, m.user_id), dec!(0));
    }

    // ========================================================================
    // Property tests: balance purity
    // ========================================================================

    /// Strategy for positive amounts with two decimal places.
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn status_strategy() -> impl Strategy<Value = EntryStatus> {
        prop_oneof![
            Just(EntryStatus::PendingApproval),
            Just(EntryStatus::Approved),
            Just(EntryStatus::Rejected),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Balance equals the sum of approved amounts minus settlements,
        /// whatever mix of statuses the snapshot holds.
        #[test]
        fn prop_balance_is_approved_minus_settled(
            amounts in prop::collection::vec((status_strategy(), amount_strategy()), 0..20),
            settled in prop::collection::vec(amount_strategy(), 0..10),
        ) {
            let m = MemberRef { user_id: Uuid::new_v4(), name: "P".into() };
            let entries: Vec<EntryAmount> = amounts
                .iter()
                .map(|&(status, amount)| EntryAmount {
                    beneficiary_id: m.user_id,
                    status,
                    amount,
                })
                .collect();
            let settlements: Vec<SettlementAmount> = settled
                .iter()
                .map(|&amount| SettlementAmount { user_id: m.user_id, amount })
                .collect();

            let expected: Decimal = amounts
                .iter()
                .filter(|(status, _)| *status == EntryStatus::Approved)
                .map(|&(_, amount)| amount)
                .sum::<Decimal>()
                - settled.iter().copied().sum::<Decimal>();

            let balances = compute_balances(&[m.clone()], &entries, &settlements);
            prop_assert_eq!(balances[0].balance, expected);
        }

        /// Adding a pending or rejected entry never changes any balance.
        #[test]
        fn prop_non_approved_entries_are_invisible(
            base in prop::collection::vec((status_strategy(), amount_strategy()), 0..20),
            extra_amount in amount_strategy(),
            extra_pending in proptest::bool::ANY,
        ) {
            let m = MemberRef { user_id: Uuid::new_v4(), name: "P".into() };
            let mut entries: Vec<EntryAmount> = base
                .iter()
                .map(|&(status, amount)| EntryAmount {
                    beneficiary_id: m.user_id,
                    status,
                    amount,
                })
                .collect();

            let before = compute_balances(&[m.clone()], &entries, &[]);

            entries.push(EntryAmount {
                beneficiary_id: m.user_id,
                status: if extra_pending {
                    EntryStatus::PendingApproval
                } else {
                    EntryStatus::Rejected
                },
                amount: extra_amount,
            });

            let after = compute_balances(&[m.clone()], &entries, &[]);
            prop_assert_eq!(before, after);
        }

        /// Every member appears exactly once, entries or not.
        #[test]
        fn prop_every_member_reported_once(
            member_count in 1usize..8,
        ) {
            let members: Vec<MemberRef> = (0..member_count)
                .map(|i| MemberRef { user_id: Uuid::new_v4(), name: format!("m{i}") })
                .collect();

            let balances = compute_balances(&members, &[], &[]);
            prop_assert_eq!(balances.len(), members.len());
            for member in &members {
                prop_assert!(balances.iter().any(|b| b.user_id == member.user_id));
            }
        }

        /// Same snapshot in, same balances out.
        #[test]
        fn prop_deterministic(
            amounts in prop::collection::vec((status_strategy(), amount_strategy()), 0..20),
        ) {
            let m = MemberRef { user_id: Uuid::new_v4(), name: "P".into() };
            let entries: Vec<EntryAmount> = amounts
                .iter()
                .map(|&(status, amount)| EntryAmount {
                    beneficiary_id: m.user_id,
                    status,
                    amount,
                })
                .collect();

            let first = compute_balances(&[m.clone()], &entries, &[]);
            let second = compute_balances(&[m.clone()], &entries, &[]);
            prop_assert_eq!(first, second);
        }
    }
}
