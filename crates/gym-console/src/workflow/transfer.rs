//! Move an Active membership to a different plan and charge the new price.
//!
//! The membership restarts today with an end date recomputed from the new
//! plan type. The plan change and the payment commit together or not at all.

use tracing::info;

use super::purchase::{require_desk_staff, resolve_plan};
use super::{expect_one_row, Bracket, Workflows};
use crate::db::models::{Membership, MembershipStatus, NewPayment, Payment, PlanOffer};
use crate::error::{AppError, AppResult};
use crate::validation;

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub membership_id: i32,
    pub new_plan_id: i32,
    pub staff_id: i32,
    /// CASH, CARD or ONLINE (case-insensitive)
    pub payment_type: String,
}

#[derive(Debug, Clone)]
pub struct TransferReceipt {
    /// Membership as it reads after the transfer.
    pub membership: Membership,
    pub plan: PlanOffer,
    pub payment: Payment,
}

impl Workflows {
    pub async fn transfer_membership(&self, request: TransferRequest) -> AppResult<TransferReceipt> {
        let mut bracket = self.open("transfer_membership").await?;
        let outcome = self.transfer_steps(&mut bracket, &request).await;
        let receipt = bracket.close(outcome).await?;

        info!(
            membership_id = receipt.membership.membership_id,
            plan_id = receipt.plan.plan_id,
            payment_id = receipt.payment.payment_id,
            "Membership transferred"
        );
        Ok(receipt)
    }

    async fn transfer_steps(
        &self,
        bracket: &mut Bracket,
        request: &TransferRequest,
    ) -> AppResult<TransferReceipt> {
        let membership_id = validation::require_id("membership ID", request.membership_id)?;
        let membership = bracket
            .uow()
            .find_membership(membership_id)
            .await?
            .filter(|m| m.status == MembershipStatus::Active)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Active membership with ID {} not found.",
                    membership_id
                ))
            })?;

        if membership.plan_id == request.new_plan_id {
            return Err(AppError::Precondition(
                "Member is already on this plan.".to_string(),
            ));
        }

        let (plan, plan_type) = resolve_plan(bracket, request.new_plan_id).await?;
        require_desk_staff(bracket, request.staff_id).await?;
        let payment_type = validation::require_payment_type(&request.payment_type)?;

        let start_date = self.today();
        let end_date = validation::calculate_end_date(start_date, plan_type.as_str());

        bracket.committing();
        let updated = bracket
            .uow()
            .update_membership_plan(membership_id, plan.plan_id, start_date, end_date)
            .await?;
        expect_one_row(updated, "gym.membership")?;

        let payment = bracket
            .uow()
            .insert_payment(&NewPayment {
                staff_id: request.staff_id,
                member_id: membership.member_id,
                amount: plan.price,
                payment_type,
            })
            .await?;

        Ok(TransferReceipt {
            membership: Membership {
                plan_id: plan.plan_id,
                start_date,
                end_date,
                ..membership
            },
            plan,
            payment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{member_request, seeded, today};
    use super::super::PurchaseRequest;
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::{FailPoint, MemoryStore};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    /// Member 1 on the Monthly plan (membership 1, payment 1).
    async fn with_monthly_member() -> (MemoryStore, Workflows) {
        let (store, workflows) = seeded().await;
        workflows
            .register_member(member_request("Ana", "Lopez", "2000-05-20"))
            .await
            .unwrap();
        workflows
            .purchase_membership(PurchaseRequest {
                member_id: 1,
                plan_id: 1,
                start_date: Some("2026-09-01".to_string()),
                staff_id: 1,
                payment_type: "cash".to_string(),
            })
            .await
            .unwrap();
        (store, workflows)
    }

    fn transfer(plan_id: i32) -> TransferRequest {
        TransferRequest {
            membership_id: 1,
            new_plan_id: plan_id,
            staff_id: 1,
            payment_type: "CARD".to_string(),
        }
    }

    #[tokio::test]
    async fn test_transfer_to_annual() {
        let (store, workflows) = with_monthly_member().await;
        let receipt = workflows.transfer_membership(transfer(3)).await.unwrap();

        assert_eq!(receipt.membership.plan_id, 3);
        assert_eq!(receipt.membership.start_date, today());
        assert_eq!(
            receipt.membership.end_date,
            NaiveDate::from_ymd_opt(2027, 10, 16).unwrap()
        );
        assert_eq!(receipt.payment.amount, Decimal::new(29999, 2));

        let tables = store.snapshot().await;
        assert_eq!(tables.memberships[&1].plan_id, 3);
        assert_eq!(tables.memberships[&1].status, MembershipStatus::Active);
        assert_eq!(tables.payments.len(), 2);
    }

    #[tokio::test]
    async fn test_same_plan_is_rejected_without_writes() {
        let (store, workflows) = with_monthly_member().await;
        let before = store.snapshot().await;

        let err = workflows.transfer_membership(transfer(1)).await.unwrap_err();
        assert_eq!(err.operator_message(), "Error: Member is already on this plan.");

        let after = store.snapshot().await;
        assert_eq!(after.payments.len(), before.payments.len());
        assert_eq!(after.memberships[&1].start_date, before.memberships[&1].start_date);
    }

    #[tokio::test]
    async fn test_payment_failure_keeps_old_plan() {
        let (store, workflows) = with_monthly_member().await;
        store.fail_on(FailPoint::InsertPayment).await;

        let err = workflows.transfer_membership(transfer(2)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationalFailure);

        let tables = store.snapshot().await;
        assert_eq!(tables.memberships[&1].plan_id, 1);
        assert_eq!(tables.payments.len(), 1);
    }

    #[tokio::test]
    async fn test_transfer_preconditions() {
        let (store, workflows) = with_monthly_member().await;

        let missing = TransferRequest {
            membership_id: 9,
            ..transfer(2)
        };
        assert_eq!(
            workflows
                .transfer_membership(missing)
                .await
                .unwrap_err()
                .operator_message(),
            "Error: Active membership with ID 9 not found."
        );

        let trainer = TransferRequest {
            staff_id: 2,
            ..transfer(2)
        };
        assert_eq!(
            workflows.transfer_membership(trainer).await.unwrap_err().kind(),
            ErrorKind::Precondition
        );

        let bad_payment = TransferRequest {
            payment_type: "cheque".to_string(),
            ..transfer(2)
        };
        assert_eq!(
            workflows
                .transfer_membership(bad_payment)
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::Validation
        );

        store
            .with_tables(|t| {
                if let Some(m) = t.memberships.get_mut(&1) {
                    m.status = MembershipStatus::Paused;
                }
            })
            .await;
        assert_eq!(
            workflows.transfer_membership(transfer(2)).await.unwrap_err().kind(),
            ErrorKind::Precondition
        );
    }
}
