//! Membership queries.

use chrono::NaiveDate;
use sqlx::PgConnection;

use super::expect_inserted;
use crate::db::models::{Membership, MembershipRow, MembershipStatus, NewMembership};
use crate::error::AppResult;

/// Insert a membership with status `Active`.
pub async fn insert_membership(
    conn: &mut PgConnection,
    membership: &NewMembership,
) -> AppResult<Membership> {
    let row = sqlx::query_as::<_, Membership>(
        r#"
        INSERT INTO gym.membership (member_id, plan_id, start_date, end_date, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING membership_id, member_id, plan_id, start_date, end_date, status
        "#,
    )
    .bind(membership.member_id)
    .bind(membership.plan_id)
    .bind(membership.start_date)
    .bind(membership.end_date)
    .bind(MembershipStatus::Active.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    expect_inserted(row, "gym.membership")
}

pub async fn get_membership(
    conn: &mut PgConnection,
    membership_id: i32,
) -> AppResult<Option<Membership>> {
    let membership = sqlx::query_as::<_, Membership>(
        r#"
        SELECT membership_id, member_id, plan_id, start_date, end_date, status
        FROM gym.membership
        WHERE membership_id = $1
        "#,
    )
    .bind(membership_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(membership)
}

/// Most recent membership (highest ID) for a member.
pub async fn get_latest_membership(
    conn: &mut PgConnection,
    member_id: i32,
) -> AppResult<Option<Membership>> {
    let membership = sqlx::query_as::<_, Membership>(
        r#"
        SELECT membership_id, member_id, plan_id, start_date, end_date, status
        FROM gym.membership
        WHERE member_id = $1
        ORDER BY membership_id DESC
        LIMIT 1
        "#,
    )
    .bind(member_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(membership)
}

pub async fn has_active_membership(conn: &mut PgConnection, member_id: i32) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM gym.membership WHERE member_id = $1 AND status = $2
        )
        "#,
    )
    .bind(member_id)
    .bind(MembershipStatus::Active.as_str())
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// Move a membership onto another plan with a fresh term.
pub async fn update_membership_plan(
    conn: &mut PgConnection,
    membership_id: i32,
    plan_id: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE gym.membership
        SET plan_id = $2, start_date = $3, end_date = $4
        WHERE membership_id = $1
        "#,
    )
    .bind(membership_id)
    .bind(plan_id)
    .bind(start_date)
    .bind(end_date)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn update_membership_status(
    conn: &mut PgConnection,
    membership_id: i32,
    status: MembershipStatus,
) -> AppResult<u64> {
    let result = sqlx::query(r#"UPDATE gym.membership SET status = $2 WHERE membership_id = $1"#)
        .bind(membership_id)
        .bind(status.as_str())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// All memberships joined with member names and plan prices.
pub async fn list_memberships(conn: &mut PgConnection) -> AppResult<Vec<MembershipRow>> {
    let rows = sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT ms.membership_id, ms.member_id, gm.first_name, gm.last_name, ms.status,
               pt.plan_type, pt.price, ms.start_date, ms.end_date
        FROM gym.membership ms
        LEFT JOIN gym.gym_member gm ON ms.member_id = gm.member_id
        LEFT JOIN gym.plan p ON ms.plan_id = p.plan_id
        LEFT JOIN gym.plan_type_info pt ON p.plan_type = pt.plan_type
        ORDER BY ms.membership_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}
