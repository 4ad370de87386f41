//! Check-in, guest and trainer assignment queries. Read-only.

use sqlx::PgConnection;

use crate::db::models::{CheckIn, Guest, GuestVisit, TrainerAssignment};
use crate::error::AppResult;

pub async fn list_check_ins(conn: &mut PgConnection) -> AppResult<Vec<CheckIn>> {
    let rows = sqlx::query_as::<_, CheckIn>(
        r#"
        SELECT check_in_id, membership_id, staff_id, ts, location
        FROM gym.check_in
        ORDER BY check_in_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

pub async fn list_guests(conn: &mut PgConnection) -> AppResult<Vec<Guest>> {
    let rows = sqlx::query_as::<_, Guest>(
        r#"
        SELECT guest_id, first_name, last_name, phone_number, email
        FROM gym.guest
        ORDER BY guest_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

pub async fn list_guest_visits(conn: &mut PgConnection) -> AppResult<Vec<GuestVisit>> {
    let rows = sqlx::query_as::<_, GuestVisit>(
        r#"
        SELECT gv.visit_id, gv.guest_id, g.first_name AS guest_first_name,
               g.last_name AS guest_last_name, gv.member_id, gv.visit_date
        FROM gym.guest_visit gv
        INNER JOIN gym.guest g ON gv.guest_id = g.guest_id
        ORDER BY gv.visit_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

pub async fn list_trainer_assignments(conn: &mut PgConnection) -> AppResult<Vec<TrainerAssignment>> {
    let rows = sqlx::query_as::<_, TrainerAssignment>(
        r#"
        SELECT ttm.trainer_id, sm.first_name AS trainer_first_name,
               sm.last_name AS trainer_last_name, ttm.member_id,
               gm.first_name AS member_first_name, gm.last_name AS member_last_name
        FROM gym.trainer_trains_member ttm
        INNER JOIN gym.staff_member sm ON ttm.trainer_id = sm.staff_id
        INNER JOIN gym.gym_member gm ON ttm.member_id = gm.member_id
        ORDER BY ttm.trainer_id, ttm.member_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}
