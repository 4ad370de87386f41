//! Plan and plan type queries.

use rust_decimal::Decimal;
use sqlx::PgConnection;

use super::expect_inserted;
use crate::db::models::{PlanOffer, PlanType, PlanTypeInfo};
use crate::error::AppResult;

/// Plans on offer with their prices.
pub async fn list_plans(conn: &mut PgConnection) -> AppResult<Vec<PlanOffer>> {
    let plans = sqlx::query_as::<_, PlanOffer>(
        r#"
        SELECT p.plan_id, p.plan_type, pt.price
        FROM gym.plan p
        JOIN gym.plan_type_info pt ON p.plan_type = pt.plan_type
        ORDER BY p.plan_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(plans)
}

pub async fn get_plan(conn: &mut PgConnection, plan_id: i32) -> AppResult<Option<PlanOffer>> {
    let plan = sqlx::query_as::<_, PlanOffer>(
        r#"
        SELECT p.plan_id, p.plan_type, pt.price
        FROM gym.plan p
        JOIN gym.plan_type_info pt ON p.plan_type = pt.plan_type
        WHERE p.plan_id = $1
        "#,
    )
    .bind(plan_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(plan)
}

/// Insert a plan for an existing plan type.
pub async fn insert_plan(conn: &mut PgConnection, plan_type: PlanType) -> AppResult<PlanOffer> {
    let row = sqlx::query_as::<_, PlanOffer>(
        r#"
        WITH inserted AS (
            INSERT INTO gym.plan (plan_type) VALUES ($1)
            RETURNING plan_id, plan_type
        )
        SELECT i.plan_id, i.plan_type, pt.price
        FROM inserted i
        JOIN gym.plan_type_info pt ON pt.plan_type = i.plan_type
        "#,
    )
    .bind(plan_type.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    expect_inserted(row, "gym.plan")
}

pub async fn list_plan_types(conn: &mut PgConnection) -> AppResult<Vec<PlanTypeInfo>> {
    let types = sqlx::query_as::<_, PlanTypeInfo>(
        r#"SELECT plan_type, price FROM gym.plan_type_info ORDER BY plan_type"#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(types)
}

pub async fn get_plan_type(
    conn: &mut PgConnection,
    plan_type: PlanType,
) -> AppResult<Option<PlanTypeInfo>> {
    let info = sqlx::query_as::<_, PlanTypeInfo>(
        r#"SELECT plan_type, price FROM gym.plan_type_info WHERE plan_type = $1"#,
    )
    .bind(plan_type.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(info)
}

/// Insert a price list entry. A duplicate type fails on the primary key.
pub async fn insert_plan_type(
    conn: &mut PgConnection,
    plan_type: PlanType,
    price: Decimal,
) -> AppResult<PlanTypeInfo> {
    let row = sqlx::query_as::<_, PlanTypeInfo>(
        r#"
        INSERT INTO gym.plan_type_info (plan_type, price)
        VALUES ($1, $2)
        RETURNING plan_type, price
        "#,
    )
    .bind(plan_type.as_str())
    .bind(price)
    .fetch_optional(&mut *conn)
    .await?;

    expect_inserted(row, "gym.plan_type_info")
}
