//! Ledger service for entry validation and state transitions.
//!
//! This service contains pure business logic with no database dependencies.
//! Lookups (chore resolution, membership checks) are injected as closures so
//! the rules can be exercised against an in-memory model in tests; the
//! persistence layer supplies the real implementations.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::group::Role;
use crate::ledger::error::LedgerError;
use crate::ledger::policy::decide_creation;
use crate::ledger::types::{ChoreRef, CreateEntryInput, CreationDecision, EntryStatus, Resolution};

/// Stateless service for ledger entry decisions.
pub struct LedgerService;

impl LedgerService {
    /// Validates a creation request and decides the entry's shape.
    ///
    /// Checks, in order:
    /// 1. The amount is strictly positive (the HTTP edge validates this too;
    ///    the rule holds here regardless of the caller).
    /// 2. The chore exists and belongs to the entry's group.
    /// 3. A head-chosen beneficiary is a member of the group.
    ///
    /// Membership of the caller must already be resolved; `input.caller_role`
    /// is the caller's role in `input.group_id`.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount`, `ChoreNotFound`, `ChoreOutsideGroup`, or
    /// `BeneficiaryNotMember` when the corresponding check fails.
    pub fn validate_create<C, M>(
        input: &CreateEntryInput,
        chore_lookup: C,
        is_member: M,
    ) -> Result<CreationDecision, LedgerError>
    where
        C: Fn(Uuid) -> Option<ChoreRef>,
        M: Fn(Uuid) -> bool,
    {
        Self::validate_amount(input.amount)?;

        let chore = chore_lookup(input.chore_id)
            .ok_or(LedgerError::ChoreNotFound(input.chore_id))?;
        if chore.group_id != input.group_id {
            return Err(LedgerError::ChoreOutsideGroup);
        }

        // Only a head's explicit choice needs validating: members are forced
        // to self-credit, and the head itself is a member by definition.
        if input.caller_role.is_head()
            && let Some(beneficiary) = input.beneficiary_id
            && beneficiary != input.caller_id
            && !is_member(beneficiary)
        {
            return Err(LedgerError::BeneficiaryNotMember(beneficiary));
        }

        Ok(decide_creation(
            input.caller_role,
            input.caller_id,
            input.beneficiary_id,
        ))
    }

    /// Approves a pending entry.
    ///
    /// # Errors
    ///
    /// Returns `HeadRequired` unless the caller is the head of the entry's
    /// group - the beneficiary of a pending entry cannot approve it.
    /// Returns `EntryNotPending` unless the entry is pending; approving an
    /// already-approved entry is a conflict, never a silent success.
    pub fn approve(
        role: Role,
        current_status: EntryStatus,
        caller: Uuid,
    ) -> Result<Resolution, LedgerError> {
        Self::resolve(role, current_status, Resolution::Approved { by: caller })
    }

    /// Rejects a pending entry. Mirror of [`LedgerService::approve`].
    ///
    /// # Errors
    ///
    /// Same preconditions as `approve`.
    pub fn reject(
        role: Role,
        current_status: EntryStatus,
        caller: Uuid,
    ) -> Result<Resolution, LedgerError> {
        Self::resolve(role, current_status, Resolution::Rejected { by: caller })
    }

    fn resolve(
        role: Role,
        current_status: EntryStatus,
        resolution: Resolution,
    ) -> Result<Resolution, LedgerError> {
        if !role.is_head() {
            return Err(LedgerError::HeadRequired);
        }
        if current_status != EntryStatus::PendingApproval {
            return Err(LedgerError::EntryNotPending);
        }
        Ok(resolution)
    }

    /// Validates that an amount is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` for zero or negative amounts.
    pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        Ok(())
    }

    /// Parses an optional status filter from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStatusFilter` for unrecognized values.
    pub fn parse_status_filter(filter: Option<&str>) -> Result<Option<EntryStatus>, LedgerError> {
        match filter {
            None | Some("") => Ok(None),
            Some(s) => EntryStatus::parse(s)
                .map(Some)
                .ok_or_else(|| LedgerError::UnknownStatusFilter(s.to_string())),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - `PendingApproval` -> `Approved` (approve)
    /// - `PendingApproval` -> `Rejected` (reject)
    ///
    /// Terminal states have no outgoing transitions, and no transition skips
    /// the pending state.
    #[must_use]
    pub fn is_valid_transition(from: EntryStatus, to: EntryStatus) -> bool {
        matches!(
            (from, to),
            (
                EntryStatus::PendingApproval,
                EntryStatus::Approved | EntryStatus::Rejected
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn chore_in(group_id: Uuid, chore_id: Uuid) -> impl Fn(Uuid) -> Option<ChoreRef> {
        move |id| {
            (id == chore_id).then(|| ChoreRef {
                id,
                group_id,
                amount: dec!(20),
            })
        }
    }

    fn make_input(group_id: Uuid, role: Role) -> (CreateEntryInput, Uuid) {
        let chore_id = Uuid::new_v4();
        let input = CreateEntryInput {
            group_id,
            caller_id: Uuid::new_v4(),
            caller_role: role,
            beneficiary_id: None,
            chore_id,
            amount: dec!(20),
        };
        (input, chore_id)
    }

    #[test]
    fn test_create_member_pending_self() {
        let group_id = Uuid::new_v4();
        let (input, chore_id) = make_input(group_id, Role::Member);

        let decision = LedgerService::validate_create(
            &input,
            chore_in(group_id, chore_id),
            |_| true,
        )
        .unwrap();

        assert_eq!(decision.beneficiary, input.caller_id);
        assert_eq!(decision.status, EntryStatus::PendingApproval);
        assert_eq!(decision.resolution, Resolution::Unresolved);
    }

    #[test]
    fn test_create_head_auto_approved() {
        let group_id = Uuid::new_v4();
        let (input, chore_id) = make_input(group_id, Role::Head);

        let decision = LedgerService::validate_create(
            &input,
            chore_in(group_id, chore_id),
            |_| true,
        )
        .unwrap();

        assert_eq!(decision.beneficiary, input.caller_id);
        assert_eq!(decision.status, EntryStatus::Approved);
        assert_eq!(decision.resolution.approver(), Some(input.caller_id));
    }

    #[test]
    fn test_create_chore_not_found() {
        let group_id = Uuid::new_v4();
        let (input, _) = make_input(group_id, Role::Member);

        let result = LedgerService::validate_create(&input, |_| None, |_| true);
        assert!(matches!(result, Err(LedgerError::ChoreNotFound(id)) if id == input.chore_id));
    }

    #[test]
    fn test_create_chore_outside_group() {
        let group_id = Uuid::new_v4();
        let other_group = Uuid::new_v4();
        let (input, chore_id) = make_input(group_id, Role::Member);

        let result =
            LedgerService::validate_create(&input, chore_in(other_group, chore_id), |_| true);
        assert!(matches!(result, Err(LedgerError::ChoreOutsideGroup)));
    }

    #[test]
    fn test_create_head_beneficiary_must_be_member() {
        let group_id = Uuid::new_v4();
        let (mut input, chore_id) = make_input(group_id, Role::Head);
        let outsider = Uuid::new_v4();
        input.beneficiary_id = Some(outsider);

        let result =
            LedgerService::validate_create(&input, chore_in(group_id, chore_id), |_| false);
        assert!(matches!(
            result,
            Err(LedgerError::BeneficiaryNotMember(id)) if id == outsider
        ));
    }

    #[test]
    fn test_create_member_ignores_requested_beneficiary() {
        let group_id = Uuid::new_v4();
        let (mut input, chore_id) = make_input(group_id, Role::Member);
        input.beneficiary_id = Some(Uuid::new_v4());

        // Membership of the requested beneficiary is never consulted for
        // members - the entry credits the caller regardless.
        let decision = LedgerService::validate_create(
            &input,
            chore_in(group_id, chore_id),
            |_| panic!("membership lookup must not run for member creation"),
        )
        .unwrap();

        assert_eq!(decision.beneficiary, input.caller_id);
        assert_eq!(decision.status, EntryStatus::PendingApproval);
    }

    #[test]
    fn test_create_rejects_non_positive_amounts() {
        let group_id = Uuid::new_v4();
        let (mut input, chore_id) = make_input(group_id, Role::Member);

        for amount in [dec!(0), dec!(-5)] {
            input.amount = amount;
            let result =
                LedgerService::validate_create(&input, chore_in(group_id, chore_id), |_| true);
            assert!(matches!(result, Err(LedgerError::NonPositiveAmount(_))));
        }
    }

    #[test]
    fn test_approve_pending_as_head() {
        let head = Uuid::new_v4();
        let resolution =
            LedgerService::approve(Role::Head, EntryStatus::PendingApproval, head).unwrap();
        assert_eq!(resolution, Resolution::Approved { by: head });
    }

    #[test]
    fn test_reject_pending_as_head() {
        let head = Uuid::new_v4();
        let resolution =
            LedgerService::reject(Role::Head, EntryStatus::PendingApproval, head).unwrap();
        assert_eq!(resolution, Resolution::Rejected { by: head });
        assert_eq!(resolution.approver(), None);
    }

    #[test]
    fn test_member_cannot_approve_own_entry() {
        // Even the beneficiary of a pending entry cannot approve it.
        let member = Uuid::new_v4();
        let result = LedgerService::approve(Role::Member, EntryStatus::PendingApproval, member);
        assert!(matches!(result, Err(LedgerError::HeadRequired)));

        let result = LedgerService::reject(Role::Member, EntryStatus::PendingApproval, member);
        assert!(matches!(result, Err(LedgerError::HeadRequired)));
    }

    #[test]
    fn test_double_approve_is_conflict() {
        let head = Uuid::new_v4();
        let result = LedgerService::approve(Role::Head, EntryStatus::Approved, head);
        assert!(matches!(result, Err(LedgerError::EntryNotPending)));
    }

    #[test]
    fn test_resolving_rejected_entry_is_conflict() {
        let head = Uuid::new_v4();
        assert!(matches!(
            LedgerService::approve(Role::Head, EntryStatus::Rejected, head),
            Err(LedgerError::EntryNotPending)
        ));
        assert!(matches!(
            LedgerService::reject(Role::Head, EntryStatus::Rejected, head),
            Err(LedgerError::EntryNotPending)
        ));
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(LedgerService::parse_status_filter(None).unwrap(), None);
        assert_eq!(LedgerService::parse_status_filter(Some("")).unwrap(), None);
        assert_eq!(
            LedgerService::parse_status_filter(Some("approved")).unwrap(),
            Some(EntryStatus::Approved)
        );
        assert_eq!(
            LedgerService::parse_status_filter(Some("pending_approval")).unwrap(),
            Some(EntryStatus::PendingApproval)
        );
        assert!(matches!(
            LedgerService::parse_status_filter(Some("archived")),
            Err(LedgerError::UnknownStatusFilter(_))
        ));
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(LedgerService::is_valid_transition(
            EntryStatus::PendingApproval,
            EntryStatus::Approved
        ));
        assert!(LedgerService::is_valid_transition(
            EntryStatus::PendingApproval,
            EntryStatus::Rejected
        ));

        // Terminal states have no exits.
        assert!(!LedgerService::is_valid_transition(
            EntryStatus::Approved,
            EntryStatus::Rejected
        ));
        assert!(!LedgerService::is_valid_transition(
            EntryStatus::Rejected,
            EntryStatus::Approved
        ));
        assert!(!LedgerService::is_valid_transition(
            EntryStatus::Approved,
            EntryStatus::PendingApproval
        ));
    }
}
