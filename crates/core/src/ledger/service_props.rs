//! Property-based tests for the creation policy and the approval state
//! machine.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::group::Role;
use crate::ledger::error::LedgerError;
use crate::ledger::policy::decide_creation;
use crate::ledger::service::LedgerService;
use crate::ledger::types::{EntryStatus, Resolution};

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Head), Just(Role::Member)]
}

fn status_strategy() -> impl Strategy<Value = EntryStatus> {
    prop_oneof![
        Just(EntryStatus::PendingApproval),
        Just(EntryStatus::Approved),
        Just(EntryStatus::Rejected),
    ]
}

fn uuid_strategy() -> impl Strategy<Value = Uuid> {
    prop::array::uniform16(any::<u8>()).prop_map(Uuid::from_bytes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A member's entry always credits the member and is always pending,
    /// whatever beneficiary the payload requested.
    #[test]
    fn prop_member_creation_forced_to_self(
        caller in uuid_strategy(),
        requested in prop::option::of(uuid_strategy()),
    ) {
        let decision = decide_creation(Role::Member, caller, requested);
        prop_assert_eq!(decision.beneficiary, caller);
        prop_assert_eq!(decision.status, EntryStatus::PendingApproval);
        prop_assert_eq!(decision.resolution, Resolution::Unresolved);
    }

    /// A head's entry is always born approved with the head as approver,
    /// crediting the requested user or the head itself.
    #[test]
    fn prop_head_creation_self_approved(
        caller in uuid_strategy(),
        requested in prop::option::of(uuid_strategy()),
    ) {
        let decision = decide_creation(Role::Head, caller, requested);
        prop_assert_eq!(decision.beneficiary, requested.unwrap_or(caller));
        prop_assert_eq!(decision.status, EntryStatus::Approved);
        prop_assert_eq!(decision.resolution, Resolution::Approved { by: caller });
    }

    /// The decision's status and resolution never disagree.
    #[test]
    fn prop_decision_internally_consistent(
        role in role_strategy(),
        caller in uuid_strategy(),
        requested in prop::option::of(uuid_strategy()),
    ) {
        let decision = decide_creation(role, caller, requested);
        prop_assert_eq!(decision.resolution.status(), decision.status);
    }

    /// Approve succeeds exactly for (head, pending); every other combination
    /// fails with the matching error, and the error side never fabricates a
    /// resolution.
    #[test]
    fn prop_approve_succeeds_only_for_head_on_pending(
        role in role_strategy(),
        status in status_strategy(),
        caller in uuid_strategy(),
    ) {
        let result = LedgerService::approve(role, status, caller);
        match (role, status) {
            (Role::Head, EntryStatus::PendingApproval) => {
                prop_assert_eq!(result.unwrap(), Resolution::Approved { by: caller });
            }
            (Role::Member, _) => {
                prop_assert!(matches!(result, Err(LedgerError::HeadRequired)));
            }
            (Role::Head, _) => {
                prop_assert!(matches!(result, Err(LedgerError::EntryNotPending)));
            }
        }
    }

    /// Reject mirrors approve exactly.
    #[test]
    fn prop_reject_mirrors_approve(
        role in role_strategy(),
        status in status_strategy(),
        caller in uuid_strategy(),
    ) {
        let approve = LedgerService::approve(role, status, caller);
        let reject = LedgerService::reject(role, status, caller);
        prop_assert_eq!(approve.is_ok(), reject.is_ok());
        if let Ok(resolution) = reject {
            prop_assert_eq!(resolution, Resolution::Rejected { by: caller });
        }
    }

    /// Terminal states have no outgoing transitions; the only valid
    /// transitions leave the pending state.
    #[test]
    fn prop_terminal_states_are_absorbing(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        let valid = LedgerService::is_valid_transition(from, to);
        if from.is_terminal() {
            prop_assert!(!valid);
        }
        if valid {
            prop_assert_eq!(from, EntryStatus::PendingApproval);
            prop_assert!(to.is_terminal());
        }
    }

    /// Positive amounts pass, everything else is rejected.
    #[test]
    fn prop_amount_validation(cents in -1_000_000i64..1_000_000i64) {
        let amount = Decimal::new(cents, 2);
        let result = LedgerService::validate_amount(amount);
        if cents > 0 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(LedgerError::NonPositiveAmount(_))));
        }
    }
}
