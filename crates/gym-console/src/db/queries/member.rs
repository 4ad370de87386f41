//! Gym member queries.

use sqlx::PgConnection;

use super::expect_inserted;
use crate::db::models::{GymMember, MemberChange, NewGymMember};
use crate::error::AppResult;

/// Insert a member; `date_joined` defaults to the current date.
pub async fn insert_member(conn: &mut PgConnection, member: &NewGymMember) -> AppResult<GymMember> {
    let row = sqlx::query_as::<_, GymMember>(
        r#"
        INSERT INTO gym.gym_member (first_name, last_name, birthday, phone_number, email)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING member_id, first_name, last_name, birthday, phone_number, email, date_joined
        "#,
    )
    .bind(&member.first_name)
    .bind(&member.last_name)
    .bind(member.birthday)
    .bind(member.phone_number.as_deref())
    .bind(member.email.as_deref())
    .fetch_optional(&mut *conn)
    .await?;

    expect_inserted(row, "gym.gym_member")
}

/// Get a member by ID.
pub async fn get_member(conn: &mut PgConnection, member_id: i32) -> AppResult<Option<GymMember>> {
    let member = sqlx::query_as::<_, GymMember>(
        r#"
        SELECT member_id, first_name, last_name, birthday, phone_number, email, date_joined
        FROM gym.gym_member
        WHERE member_id = $1
        "#,
    )
    .bind(member_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(member)
}

pub async fn member_exists(conn: &mut PgConnection, member_id: i32) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"SELECT EXISTS (SELECT 1 FROM gym.gym_member WHERE member_id = $1)"#,
    )
    .bind(member_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// Apply a single-field change. Returns the number of rows updated.
pub async fn update_member(
    conn: &mut PgConnection,
    member_id: i32,
    change: &MemberChange,
) -> AppResult<u64> {
    let (sql, value) = match change {
        MemberChange::FirstName(v) => (
            r#"UPDATE gym.gym_member SET first_name = $2 WHERE member_id = $1"#,
            Some(v.as_str()),
        ),
        MemberChange::LastName(v) => (
            r#"UPDATE gym.gym_member SET last_name = $2 WHERE member_id = $1"#,
            Some(v.as_str()),
        ),
        MemberChange::PhoneNumber(v) => (
            r#"UPDATE gym.gym_member SET phone_number = $2 WHERE member_id = $1"#,
            v.as_deref(),
        ),
        MemberChange::Email(v) => (
            r#"UPDATE gym.gym_member SET email = $2 WHERE member_id = $1"#,
            v.as_deref(),
        ),
    };

    let result = sqlx::query(sql)
        .bind(member_id)
        .bind(value)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Delete a member. Memberships, payments, check-ins and visits cascade.
pub async fn delete_member(conn: &mut PgConnection, member_id: i32) -> AppResult<u64> {
    let result = sqlx::query(r#"DELETE FROM gym.gym_member WHERE member_id = $1"#)
        .bind(member_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn list_members(conn: &mut PgConnection) -> AppResult<Vec<GymMember>> {
    let members = sqlx::query_as::<_, GymMember>(
        r#"
        SELECT member_id, first_name, last_name, birthday, phone_number, email, date_joined
        FROM gym.gym_member
        ORDER BY member_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(members)
}

/// Members with an Active membership, read through the `gym.active_members` view.
pub async fn list_active_members(conn: &mut PgConnection) -> AppResult<Vec<GymMember>> {
    let members = sqlx::query_as::<_, GymMember>(
        r#"
        SELECT member_id, first_name, last_name, birthday, phone_number, email, date_joined
        FROM gym.active_members
        ORDER BY member_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(members)
}
