//! Staff member and role queries.

use rust_decimal::Decimal;
use sqlx::PgConnection;

use super::expect_inserted;
use crate::db::models::{NewStaffMember, Role, RoleKind, StaffMember, StaffRecord, StaffRoleRow};
use crate::error::{AppError, AppResult};

/// Insert the shared staff fields. The role row is inserted separately.
pub async fn insert_staff(
    conn: &mut PgConnection,
    staff: &NewStaffMember,
) -> AppResult<StaffMember> {
    let row = sqlx::query_as::<_, StaffMember>(
        r#"
        INSERT INTO gym.staff_member (first_name, last_name, phone_number, email, hire_date, salary)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING staff_id, first_name, last_name, phone_number, email, hire_date, salary
        "#,
    )
    .bind(&staff.first_name)
    .bind(&staff.last_name)
    .bind(staff.phone_number.as_deref())
    .bind(staff.email.as_deref())
    .bind(staff.hire_date)
    .bind(staff.salary)
    .fetch_optional(&mut *conn)
    .await?;

    expect_inserted(row, "gym.staff_member")
}

/// Insert the role child row for a staff member.
pub async fn insert_role(conn: &mut PgConnection, staff_id: i32, role: &Role) -> AppResult<()> {
    let (table, result) = match role {
        Role::Desk(desk) => (
            "gym.desk",
            sqlx::query(
                r#"
                INSERT INTO gym.desk (staff_id, schedule, desk_location, responsibility)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(staff_id)
            .bind(&desk.schedule)
            .bind(&desk.desk_location)
            .bind(&desk.responsibility)
            .execute(&mut *conn)
            .await?,
        ),
        Role::Trainer(trainer) => (
            "gym.trainer",
            sqlx::query(
                r#"
                INSERT INTO gym.trainer (staff_id, specialty, schedule, certification_level, experience)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(staff_id)
            .bind(trainer.specialty.as_deref())
            .bind(&trainer.schedule)
            .bind(&trainer.certification_level)
            .bind(trainer.experience)
            .execute(&mut *conn)
            .await?,
        ),
        Role::Manager(manager) => (
            "gym.manager",
            sqlx::query(
                r#"
                INSERT INTO gym.manager (staff_id, department, office_location, experience)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(staff_id)
            .bind(&manager.department)
            .bind(&manager.office_location)
            .bind(manager.experience)
            .execute(&mut *conn)
            .await?,
        ),
    };

    if result.rows_affected() != 1 {
        return Err(AppError::Internal(format!(
            "insert into {} affected {} rows",
            table,
            result.rows_affected()
        )));
    }
    Ok(())
}

pub async fn get_staff(conn: &mut PgConnection, staff_id: i32) -> AppResult<Option<StaffMember>> {
    let staff = sqlx::query_as::<_, StaffMember>(
        r#"
        SELECT staff_id, first_name, last_name, phone_number, email, hire_date, salary
        FROM gym.staff_member
        WHERE staff_id = $1
        "#,
    )
    .bind(staff_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(staff)
}

pub async fn is_desk_staff(conn: &mut PgConnection, staff_id: i32) -> AppResult<bool> {
    let exists: bool =
        sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM gym.desk WHERE staff_id = $1)"#)
            .bind(staff_id)
            .fetch_one(&mut *conn)
            .await?;

    Ok(exists)
}

/// Staff members allowed to process payments.
pub async fn list_desk_staff(conn: &mut PgConnection) -> AppResult<Vec<StaffMember>> {
    let staff = sqlx::query_as::<_, StaffMember>(
        r#"
        SELECT sm.staff_id, sm.first_name, sm.last_name, sm.phone_number, sm.email,
               sm.hire_date, sm.salary
        FROM gym.staff_member sm
        INNER JOIN gym.desk d ON sm.staff_id = d.staff_id
        ORDER BY sm.staff_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(staff)
}

pub async fn update_staff_salary(
    conn: &mut PgConnection,
    staff_id: i32,
    salary: Decimal,
) -> AppResult<u64> {
    let result = sqlx::query(r#"UPDATE gym.staff_member SET salary = $2 WHERE staff_id = $1"#)
        .bind(staff_id)
        .bind(salary)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Staff with their role, optionally restricted to one role.
pub async fn list_staff(
    conn: &mut PgConnection,
    role: Option<RoleKind>,
) -> AppResult<Vec<StaffRecord>> {
    let filter = role.map(|r| r.to_string());
    let rows = sqlx::query_as::<_, StaffRoleRow>(
        r#"
        SELECT sm.staff_id, sm.first_name, sm.last_name, sm.phone_number, sm.email,
               sm.hire_date, sm.salary,
               d.schedule AS desk_schedule, d.desk_location, d.responsibility,
               t.staff_id AS trainer_id, t.specialty, t.schedule AS trainer_schedule,
               t.certification_level, t.experience AS trainer_experience,
               m.staff_id AS manager_id, m.department, m.office_location,
               m.experience AS manager_experience
        FROM gym.staff_member sm
        LEFT JOIN gym.desk d ON sm.staff_id = d.staff_id
        LEFT JOIN gym.trainer t ON sm.staff_id = t.staff_id
        LEFT JOIN gym.manager m ON sm.staff_id = m.staff_id
        WHERE $1::text IS NULL
           OR ($1 = 'Desk' AND d.staff_id IS NOT NULL)
           OR ($1 = 'Trainer' AND t.staff_id IS NOT NULL)
           OR ($1 = 'Manager' AND m.staff_id IS NOT NULL)
        ORDER BY sm.staff_id
        "#,
    )
    .bind(filter)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(StaffRecord::from).collect())
}
