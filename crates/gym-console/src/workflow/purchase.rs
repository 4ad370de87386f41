//! Membership purchase: the full transactional protocol.
//!
//! Steps, each a hard precondition:
//!
//! 1. the member exists;
//! 2. the member is at least 16 on today's date;
//! 3. the member has no Active membership;
//! 4. the plan exists and has a known plan type;
//! 5. the start date is valid (default today) and the end date follows from the plan type;
//! 6. the processing staff member is desk staff;
//! 7. the payment type is CASH, CARD or ONLINE;
//! 8. insert the Active membership;
//! 9. insert the Success payment for the plan price;
//! 10. commit.
//!
//! Any failure rolls the whole purchase back.

use std::str::FromStr;

use tracing::info;

use super::member::member_not_found;
use super::{Bracket, Workflows};
use crate::db::models::{
    GymMember, Membership, NewMembership, NewPayment, Payment, PlanOffer, PlanType,
};
use crate::error::{AppError, AppResult};
use crate::validation::{self, MINIMUM_MEMBER_AGE};

#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub member_id: i32,
    pub plan_id: i32,
    /// `YYYY-MM-DD`; `None` or empty means today
    pub start_date: Option<String>,
    pub staff_id: i32,
    /// CASH, CARD or ONLINE (case-insensitive)
    pub payment_type: String,
}

#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub member: GymMember,
    pub plan: PlanOffer,
    pub membership: Membership,
    pub payment: Payment,
}

impl Workflows {
    /// Steps 1-3 of a purchase, run in a transaction that is always rolled back.
    pub async fn purchase_eligibility(&self, member_id: i32) -> AppResult<GymMember> {
        let mut bracket = self.open("purchase_eligibility").await?;
        match check_member_eligible(&mut bracket, member_id, self.today()).await {
            Ok(member) => {
                bracket.release().await?;
                Ok(member)
            }
            Err(e) => bracket.close(Err(e)).await,
        }
    }

    /// Buy a membership and record its payment, atomically.
    pub async fn purchase_membership(&self, request: PurchaseRequest) -> AppResult<PurchaseReceipt> {
        let mut bracket = self.open("purchase_membership").await?;
        let outcome = self.purchase_steps(&mut bracket, &request).await;
        let receipt = bracket.close(outcome).await?;

        info!(
            member_id = receipt.member.member_id,
            membership_id = receipt.membership.membership_id,
            payment_id = receipt.payment.payment_id,
            plan_type = %receipt.plan.plan_type,
            "Membership purchased"
        );
        Ok(receipt)
    }

    async fn purchase_steps(
        &self,
        bracket: &mut Bracket,
        request: &PurchaseRequest,
    ) -> AppResult<PurchaseReceipt> {
        let today = self.today();
        let member = check_member_eligible(bracket, request.member_id, today).await?;

        let (plan, plan_type) = resolve_plan(bracket, request.plan_id).await?;

        let start_date = validation::date_or_default(request.start_date.as_deref(), today)?;
        let end_date = validation::calculate_end_date(start_date, plan_type.as_str());

        require_desk_staff(bracket, request.staff_id).await?;

        let payment_type = validation::require_payment_type(&request.payment_type)?;

        bracket.validated();
        bracket.committing();

        let membership = bracket
            .uow()
            .insert_membership(&NewMembership {
                member_id: member.member_id,
                plan_id: plan.plan_id,
                start_date,
                end_date,
            })
            .await?;

        let payment = bracket
            .uow()
            .insert_payment(&NewPayment {
                staff_id: request.staff_id,
                member_id: member.member_id,
                amount: plan.price,
                payment_type,
            })
            .await?;

        Ok(PurchaseReceipt {
            member,
            plan,
            membership,
            payment,
        })
    }
}

async fn check_member_eligible(
    bracket: &mut Bracket,
    member_id: i32,
    today: chrono::NaiveDate,
) -> AppResult<GymMember> {
    let member_id = validation::require_id("member ID", member_id)?;
    let member = bracket
        .uow()
        .find_member(member_id)
        .await?
        .ok_or_else(|| member_not_found(member_id))?;

    let age = validation::calculate_age(member.birthday, today);
    if age < MINIMUM_MEMBER_AGE {
        return Err(AppError::Precondition(format!(
            "Member must be at least 16 years old to purchase a membership (member is {}).",
            age
        )));
    }

    if bracket.uow().has_active_membership(member_id).await? {
        return Err(AppError::Precondition(
            "Member already has an Active membership. A member can only have one Active membership at a time."
                .to_string(),
        ));
    }

    Ok(member)
}

/// Look up a plan and decode its plan type.
pub(super) async fn resolve_plan(
    bracket: &mut Bracket,
    plan_id: i32,
) -> AppResult<(PlanOffer, PlanType)> {
    let plan = bracket
        .uow()
        .find_plan(plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Plan ID {} does not exist.", plan_id)))?;
    let plan_type = PlanType::from_str(&plan.plan_type).map_err(|_| {
        AppError::Precondition(format!("Plan type '{}' is not offered.", plan.plan_type))
    })?;
    Ok((plan, plan_type))
}

/// Only desk staff may process payments.
pub(super) async fn require_desk_staff(bracket: &mut Bracket, staff_id: i32) -> AppResult<()> {
    if bracket.uow().find_staff(staff_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Staff ID {} does not exist.",
            staff_id
        )));
    }
    if !bracket.uow().is_desk_staff(staff_id).await? {
        return Err(AppError::Precondition(format!(
            "Staff ID {} is not a desk staff member.",
            staff_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::{member_request, seeded, today};
    use super::*;
    use crate::db::models::{MembershipStatus, PaymentStatus, PaymentType};
    use crate::error::ErrorKind;
    use crate::store::{FailPoint, MemoryStore};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn request(member_id: i32, plan_id: i32) -> PurchaseRequest {
        PurchaseRequest {
            member_id,
            plan_id,
            start_date: None,
            staff_id: 1,
            payment_type: "CARD".to_string(),
        }
    }

    async fn counts(store: &MemoryStore) -> (usize, usize) {
        let tables = store.snapshot().await;
        (tables.memberships.len(), tables.payments.len())
    }

    #[tokio::test]
    async fn test_ana_lopez_purchases_monthly() {
        let (store, workflows) = seeded().await;
        let ana = workflows
            .register_member(member_request("Ana", "Lopez", "2000-01-01"))
            .await
            .unwrap();
        assert_eq!(ana.date_joined, today());

        let receipt = workflows
            .purchase_membership(request(ana.member_id, 1))
            .await
            .unwrap();

        assert_eq!(receipt.plan.plan_type, "Monthly");
        assert_eq!(receipt.membership.status, MembershipStatus::Active);
        assert_eq!(receipt.membership.start_date, today());
        assert_eq!(
            receipt.membership.end_date,
            NaiveDate::from_ymd_opt(2026, 11, 16).unwrap()
        );
        assert_eq!(receipt.payment.status, PaymentStatus::Success);
        assert_eq!(receipt.payment.payment_type, PaymentType::Card);
        assert_eq!(receipt.payment.amount, Decimal::new(2999, 2));
        assert_eq!(counts(&store).await, (1, 1));
    }

    #[tokio::test]
    async fn test_explicit_start_date_annual() {
        let (_, workflows) = seeded().await;
        let ana = workflows
            .register_member(member_request("Ana", "Lopez", "2000-01-01"))
            .await
            .unwrap();
        let receipt = workflows
            .purchase_membership(PurchaseRequest {
                start_date: Some("2027-01-31".to_string()),
                payment_type: "cash".to_string(),
                ..request(ana.member_id, 3)
            })
            .await
            .unwrap();
        assert_eq!(
            receipt.membership.end_date,
            NaiveDate::from_ymd_opt(2028, 1, 31).unwrap()
        );
        assert_eq!(receipt.payment.amount, Decimal::new(29999, 2));
    }

    #[tokio::test]
    async fn test_active_membership_blocks_second_purchase() {
        let (store, workflows) = seeded().await;
        let ana = workflows
            .register_member(member_request("Ana", "Lopez", "2000-01-01"))
            .await
            .unwrap();
        workflows
            .purchase_membership(request(ana.member_id, 1))
            .await
            .unwrap();
        let before = counts(&store).await;

        let err = workflows
            .purchase_membership(request(ana.member_id, 2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(counts(&store).await, before);

        let err = workflows
            .purchase_eligibility(ana.member_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[tokio::test]
    async fn test_failure_after_membership_insert_rolls_back() {
        let (store, workflows) = seeded().await;
        let ana = workflows
            .register_member(member_request("Ana", "Lopez", "2000-01-01"))
            .await
            .unwrap();
        store.fail_on(FailPoint::InsertPayment).await;

        let err = workflows
            .purchase_membership(request(ana.member_id, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationalFailure);
        assert_eq!(counts(&store).await, (0, 0));

        store.clear_failures().await;
        workflows
            .purchase_membership(request(ana.member_id, 1))
            .await
            .unwrap();
        assert_eq!(counts(&store).await, (1, 1));
    }

    #[tokio::test]
    async fn test_trainer_cannot_process_purchase() {
        let (store, workflows) = seeded().await;
        let ana = workflows
            .register_member(member_request("Ana", "Lopez", "2000-01-01"))
            .await
            .unwrap();
        let err = workflows
            .purchase_membership(PurchaseRequest {
                staff_id: 2,
                ..request(ana.member_id, 1)
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.operator_message(),
            "Error: Staff ID 2 is not a desk staff member."
        );
        assert_eq!(counts(&store).await, (0, 0));
    }

    #[tokio::test]
    async fn test_rejections_leave_no_rows() {
        let (store, workflows) = seeded().await;
        let ana = workflows
            .register_member(member_request("Ana", "Lopez", "2000-01-01"))
            .await
            .unwrap();

        let cases = [
            (request(99, 1), ErrorKind::Precondition),
            (request(ana.member_id, 99), ErrorKind::Precondition),
            (
                PurchaseRequest {
                    staff_id: 42,
                    ..request(ana.member_id, 1)
                },
                ErrorKind::Precondition,
            ),
            (
                PurchaseRequest {
                    payment_type: "CHEQUE".to_string(),
                    ..request(ana.member_id, 1)
                },
                ErrorKind::Validation,
            ),
            (
                PurchaseRequest {
                    start_date: Some("2026-13-01".to_string()),
                    ..request(ana.member_id, 1)
                },
                ErrorKind::Validation,
            ),
        ];
        for (req, kind) in cases {
            let err = workflows.purchase_membership(req).await.unwrap_err();
            assert_eq!(err.kind(), kind);
        }
        assert_eq!(counts(&store).await, (0, 0));
    }

    #[tokio::test]
    async fn test_member_who_aged_below_limit_is_refused() {
        let (store, workflows) = seeded().await;
        // Seeded directly; registration would refuse this birthday.
        store
            .with_tables(|t| {
                t.members.insert(
                    50,
                    GymMember {
                        member_id: 50,
                        first_name: "Kid".to_string(),
                        last_name: "Young".to_string(),
                        birthday: NaiveDate::from_ymd_opt(2012, 6, 1).unwrap(),
                        phone_number: None,
                        email: None,
                        date_joined: today(),
                    },
                )
            })
            .await;

        let err = workflows
            .purchase_membership(request(50, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(counts(&store).await, (0, 0));
    }

    #[tokio::test]
    async fn test_unknown_plan_type_is_refused() {
        let (store, workflows) = seeded().await;
        let ana = workflows
            .register_member(member_request("Ana", "Lopez", "2000-01-01"))
            .await
            .unwrap();
        store
            .with_tables(|t| {
                t.plan_types.insert("Weekly".to_string(), Decimal::new(999, 2));
                t.plans.insert(9, "Weekly".to_string());
            })
            .await;

        let err = workflows
            .purchase_membership(request(ana.member_id, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }
}
