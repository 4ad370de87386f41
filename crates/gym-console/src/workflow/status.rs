//! Status updates for memberships and payments.

use tracing::info;

use super::{expect_one_row, Bracket, UpdateOutcome, Workflows};
use crate::db::models::{MembershipStatus, PaymentStatus};
use crate::error::{AppError, AppResult};
use crate::validation;

impl Workflows {
    /// Set the status of a member's most recent membership.
    pub async fn update_membership_status(
        &self,
        member_id: i32,
        status: MembershipStatus,
    ) -> AppResult<UpdateOutcome<MembershipStatus>> {
        let member_id = validation::require_id("member ID", member_id)?;

        let mut bracket = self.open("update_membership_status").await?;
        let outcome = membership_status_steps(&mut bracket, member_id, status).await;
        let outcome = bracket.close(outcome).await?;

        if let UpdateOutcome::Updated { before, after } = &outcome {
            info!(member_id, %before, %after, "Membership status updated");
        }
        Ok(outcome)
    }

    pub async fn update_payment_status(
        &self,
        payment_id: i32,
        status: PaymentStatus,
    ) -> AppResult<UpdateOutcome<PaymentStatus>> {
        let payment_id = validation::require_id("payment ID", payment_id)?;

        let mut bracket = self.open("update_payment_status").await?;
        let outcome = payment_status_steps(&mut bracket, payment_id, status).await;
        bracket.close(outcome).await
    }
}

async fn membership_status_steps(
    bracket: &mut Bracket,
    member_id: i32,
    status: MembershipStatus,
) -> AppResult<UpdateOutcome<MembershipStatus>> {
    let membership = bracket
        .uow()
        .latest_membership(member_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No membership found for member ID {}", member_id))
        })?;

    if membership.status == status {
        return Ok(UpdateOutcome::Unchanged(status));
    }
    // The latest membership is not Active here, so any Active row is another one.
    if status == MembershipStatus::Active && bracket.uow().has_active_membership(member_id).await?
    {
        return Err(AppError::Precondition(
            "Member already has an Active membership.".to_string(),
        ));
    }

    bracket.committing();
    let updated = bracket
        .uow()
        .update_membership_status(membership.membership_id, status)
        .await?;
    expect_one_row(updated, "gym.membership")?;
    Ok(UpdateOutcome::Updated {
        before: membership.status,
        after: status,
    })
}

async fn payment_status_steps(
    bracket: &mut Bracket,
    payment_id: i32,
    status: PaymentStatus,
) -> AppResult<UpdateOutcome<PaymentStatus>> {
    let payment = bracket
        .uow()
        .find_payment(payment_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Payment with ID {} does not exist.", payment_id))
        })?;

    if payment.status == status {
        return Ok(UpdateOutcome::Unchanged(status));
    }

    bracket.committing();
    let updated = bracket
        .uow()
        .update_payment_status(payment_id, status)
        .await?;
    expect_one_row(updated, "gym.payment")?;
    Ok(UpdateOutcome::Updated {
        before: payment.status,
        after: status,
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::{member_request, seeded};
    use super::super::PurchaseRequest;
    use super::*;
    use crate::db::models::Membership;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    async fn with_purchase() -> (MemoryStore, Workflows) {
        let (store, workflows) = seeded().await;
        workflows
            .register_member(member_request("Ana", "Lopez", "2000-01-01"))
            .await
            .unwrap();
        workflows
            .purchase_membership(PurchaseRequest {
                member_id: 1,
                plan_id: 1,
                start_date: None,
                staff_id: 1,
                payment_type: "CARD".to_string(),
            })
            .await
            .unwrap();
        (store, workflows)
    }

    #[tokio::test]
    async fn test_pause_and_reactivate() {
        let (store, workflows) = with_purchase().await;

        let paused = workflows
            .update_membership_status(1, MembershipStatus::Paused)
            .await
            .unwrap();
        assert_eq!(
            paused,
            UpdateOutcome::Updated {
                before: MembershipStatus::Active,
                after: MembershipStatus::Paused,
            }
        );
        assert_eq!(
            store.snapshot().await.memberships[&1].status,
            MembershipStatus::Paused
        );

        let again = workflows
            .update_membership_status(1, MembershipStatus::Paused)
            .await
            .unwrap();
        assert_eq!(again, UpdateOutcome::Unchanged(MembershipStatus::Paused));

        workflows
            .update_membership_status(1, MembershipStatus::Active)
            .await
            .unwrap();
        assert_eq!(
            store.snapshot().await.memberships[&1].status,
            MembershipStatus::Active
        );
    }

    #[tokio::test]
    async fn test_activation_blocked_by_other_active_membership() {
        let (store, workflows) = with_purchase().await;
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        store
            .with_tables(|t| {
                t.memberships.insert(
                    7,
                    Membership {
                        membership_id: 7,
                        member_id: 1,
                        plan_id: 2,
                        start_date: date,
                        end_date: date,
                        status: MembershipStatus::Cancelled,
                    },
                )
            })
            .await;

        let err = workflows
            .update_membership_status(1, MembershipStatus::Active)
            .await
            .unwrap_err();
        assert_eq!(
            err.operator_message(),
            "Error: Member already has an Active membership."
        );
        assert_eq!(
            store.snapshot().await.memberships[&7].status,
            MembershipStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_member_without_membership() {
        let (_, workflows) = seeded().await;
        let err = workflows
            .update_membership_status(4, MembershipStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(err.operator_message(), "Error: No membership found for member ID 4");
    }

    #[tokio::test]
    async fn test_payment_status() {
        let (store, workflows) = with_purchase().await;

        let outcome = workflows
            .update_payment_status(1, PaymentStatus::Refunded)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                before: PaymentStatus::Success,
                after: PaymentStatus::Refunded,
            }
        );
        assert_eq!(
            store.snapshot().await.payments[&1].status,
            PaymentStatus::Refunded
        );
        assert!(matches!(
            workflows
                .update_payment_status(1, PaymentStatus::Refunded)
                .await
                .unwrap(),
            UpdateOutcome::Unchanged(_)
        ));

        let err = workflows
            .update_payment_status(42, PaymentStatus::Failed)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.operator_message(), "Error: Payment with ID 42 does not exist.");
    }
}
