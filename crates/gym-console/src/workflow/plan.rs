//! Plan types, plans and the default plan setup.

use tracing::info;

use super::{Bracket, Workflows};
use crate::db::models::{PlanOffer, PlanType, PlanTypeInfo};
use crate::error::{AppError, AppResult};
use crate::validation;

/// Operator's answer to the "Select plan type" menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanTypeChoice {
    Cancel,
    Type(PlanType),
}

impl PlanTypeChoice {
    /// `1`-`3` pick a plan type in [`PlanType::ALL`] order, `0` cancels.
    pub fn parse(input: &str) -> AppResult<Self> {
        match input.trim() {
            "0" => Ok(PlanTypeChoice::Cancel),
            "1" => Ok(PlanTypeChoice::Type(PlanType::Monthly)),
            "2" => Ok(PlanTypeChoice::Type(PlanType::MonthlyPremium)),
            "3" => Ok(PlanTypeChoice::Type(PlanType::Annual)),
            _ => Err(AppError::Validation("Invalid choice.".to_string())),
        }
    }
}

/// What [`Workflows::setup_default_plans`] created.
#[derive(Debug, Clone, Default)]
pub struct DefaultPlansReceipt {
    /// Plan types that did not exist before.
    pub created_types: Vec<PlanTypeInfo>,
    pub plans: Vec<PlanOffer>,
}

impl Workflows {
    /// Price list, cheapest first.
    pub async fn list_plan_types(&self) -> AppResult<Vec<PlanTypeInfo>> {
        let mut bracket = self.open("list_plan_types").await?;
        let outcome = bracket.uow().list_plan_types().await;
        bracket.release().await?;
        let mut types = outcome?;
        types.sort_by(|a, b| a.price.cmp(&b.price).then(a.plan_type.cmp(&b.plan_type)));
        Ok(types)
    }

    /// Plans currently on offer, by plan ID.
    pub async fn list_plans(&self) -> AppResult<Vec<PlanOffer>> {
        let mut bracket = self.open("list_plans").await?;
        let outcome = bracket.uow().list_plans().await;
        bracket.release().await?;
        outcome
    }

    pub async fn add_plan_type(&self, plan_type: PlanType, price: &str) -> AppResult<PlanTypeInfo> {
        let price = validation::require_price(price)?;

        let mut bracket = self.open("add_plan_type").await?;
        bracket.committing();
        let outcome = bracket.uow().insert_plan_type(plan_type, price).await;
        let info = bracket.close(outcome).await?;

        info!(plan_type = %plan_type, price = %info.price, "Plan type created");
        Ok(info)
    }

    /// Offer a new plan of an existing plan type.
    pub async fn add_plan(&self, plan_type: PlanType) -> AppResult<PlanOffer> {
        let mut bracket = self.open("add_plan").await?;
        let outcome = add_plan_steps(&mut bracket, plan_type).await;
        let plan = bracket.close(outcome).await?;

        info!(plan_id = plan.plan_id, plan_type = %plan_type, "Plan created");
        Ok(plan)
    }

    /// Create any missing default plan type, then one plan per type.
    pub async fn setup_default_plans(&self) -> AppResult<DefaultPlansReceipt> {
        let mut bracket = self.open("setup_default_plans").await?;
        let outcome = setup_default_steps(&mut bracket).await;
        let receipt = bracket.close(outcome).await?;

        info!(
            created_types = receipt.created_types.len(),
            plans = receipt.plans.len(),
            "Default plans set up"
        );
        Ok(receipt)
    }
}

async fn add_plan_steps(bracket: &mut Bracket, plan_type: PlanType) -> AppResult<PlanOffer> {
    if bracket.uow().find_plan_type(plan_type).await?.is_none() {
        return Err(AppError::Precondition(format!(
            "Plan type '{}' does not exist. Create the plan type first.",
            plan_type
        )));
    }
    bracket.committing();
    bracket.uow().insert_plan(plan_type).await
}

async fn setup_default_steps(bracket: &mut Bracket) -> AppResult<DefaultPlansReceipt> {
    let mut missing = Vec::new();
    for plan_type in PlanType::ALL {
        if bracket.uow().find_plan_type(plan_type).await?.is_none() {
            missing.push(plan_type);
        }
    }

    bracket.committing();
    let mut receipt = DefaultPlansReceipt::default();
    for plan_type in missing {
        let info = bracket
            .uow()
            .insert_plan_type(plan_type, plan_type.default_price())
            .await?;
        receipt.created_types.push(info);
    }
    for plan_type in PlanType::ALL {
        receipt.plans.push(bracket.uow().insert_plan(plan_type).await?);
    }
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::super::testing::fixture;
    use super::*;
    use crate::error::{ConstrainedField, ErrorKind};
    use crate::store::FailPoint;
    use rust_decimal::Decimal;

    #[test]
    fn test_plan_type_choice() {
        assert_eq!(
            PlanTypeChoice::parse(" 2 ").unwrap(),
            PlanTypeChoice::Type(PlanType::MonthlyPremium)
        );
        assert_eq!(PlanTypeChoice::parse("0").unwrap(), PlanTypeChoice::Cancel);
        assert!(PlanTypeChoice::parse("4").is_err());
    }

    #[tokio::test]
    async fn test_setup_default_plans() {
        let (store, workflows) = fixture();
        let receipt = workflows.setup_default_plans().await.unwrap();
        assert_eq!(receipt.created_types.len(), 3);
        assert_eq!(receipt.plans.len(), 3);

        let plans = workflows.list_plans().await.unwrap();
        assert_eq!(plans[0].plan_type, "Monthly");
        assert_eq!(plans[0].price, Decimal::new(2999, 2));
        assert_eq!(plans[2].plan_type, "Annual");

        // Existing types are kept; only plans are added.
        let again = workflows.setup_default_plans().await.unwrap();
        assert!(again.created_types.is_empty());
        assert_eq!(store.snapshot().await.plans.len(), 6);
    }

    #[tokio::test]
    async fn test_setup_is_all_or_nothing() {
        let (store, workflows) = fixture();
        store.fail_on(FailPoint::InsertPlan).await;
        assert!(workflows.setup_default_plans().await.is_err());

        let tables = store.snapshot().await;
        assert!(tables.plan_types.is_empty());
        assert!(tables.plans.is_empty());
    }

    #[tokio::test]
    async fn test_add_plan_type_and_plan() {
        let (_, workflows) = fixture();

        let err = workflows.add_plan(PlanType::Annual).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);

        let info = workflows
            .add_plan_type(PlanType::Annual, "$250")
            .await
            .unwrap();
        assert_eq!(info.price, Decimal::new(250, 0));

        let plan = workflows.add_plan(PlanType::Annual).await.unwrap();
        assert_eq!(plan.plan_id, 1);
        assert_eq!(plan.price, Decimal::new(250, 0));

        let AppError::Constraint(violation) = workflows
            .add_plan_type(PlanType::Annual, "199")
            .await
            .unwrap_err()
        else {
            panic!("expected constraint violation");
        };
        assert_eq!(violation.field, Some(ConstrainedField::PlanType));
    }

    #[tokio::test]
    async fn test_price_must_be_positive() {
        let (_, workflows) = fixture();
        for price in ["0", "-5", "abc", ""] {
            let err = workflows
                .add_plan_type(PlanType::Monthly, price)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[tokio::test]
    async fn test_list_plan_types_cheapest_first() {
        let (_, workflows) = fixture();
        workflows.setup_default_plans().await.unwrap();
        let types: Vec<String> = workflows
            .list_plan_types()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.plan_type)
            .collect();
        assert_eq!(types, ["Monthly", "Monthly Premium", "Annual"]);
    }
}
