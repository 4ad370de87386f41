//! Payment queries, including the payment history and revenue functions.

use rust_decimal::Decimal;
use sqlx::PgConnection;

use super::expect_inserted;
use crate::db::models::{NewPayment, Payment, PaymentHistoryRow, PaymentStatus};
use crate::error::AppResult;

/// Insert a payment with status `Success`; `date_of_payment` defaults to today.
pub async fn insert_payment(conn: &mut PgConnection, payment: &NewPayment) -> AppResult<Payment> {
    let row = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO gym.payment (staff_id, member_id, amount, payment_type, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING payment_id, staff_id, member_id, amount, payment_type, date_of_payment, status
        "#,
    )
    .bind(payment.staff_id)
    .bind(payment.member_id)
    .bind(payment.amount)
    .bind(payment.payment_type.as_str())
    .bind(PaymentStatus::Success.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    expect_inserted(row, "gym.payment")
}

pub async fn get_payment(conn: &mut PgConnection, payment_id: i32) -> AppResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        SELECT payment_id, staff_id, member_id, amount, payment_type, date_of_payment, status
        FROM gym.payment
        WHERE payment_id = $1
        "#,
    )
    .bind(payment_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(payment)
}

pub async fn update_payment_status(
    conn: &mut PgConnection,
    payment_id: i32,
    status: PaymentStatus,
) -> AppResult<u64> {
    let result = sqlx::query(r#"UPDATE gym.payment SET status = $2 WHERE payment_id = $1"#)
        .bind(payment_id)
        .bind(status.as_str())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn list_payments(conn: &mut PgConnection) -> AppResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT payment_id, staff_id, member_id, amount, payment_type, date_of_payment, status
        FROM gym.payment
        ORDER BY payment_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(payments)
}

/// Payments for one member via `gym.member_payment_history`.
pub async fn member_payment_history(
    conn: &mut PgConnection,
    member_id: i32,
) -> AppResult<Vec<PaymentHistoryRow>> {
    let rows = sqlx::query_as::<_, PaymentHistoryRow>(
        r#"
        SELECT payment_id, date_of_payment, amount, payment_type, status, staff_id
        FROM gym.member_payment_history($1)
        "#,
    )
    .bind(member_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Sum of payment amounts via `gym.total_revenue`; `None` sums every status.
pub async fn total_revenue(
    conn: &mut PgConnection,
    status: Option<PaymentStatus>,
) -> AppResult<Decimal> {
    let total: Decimal = sqlx::query_scalar(r#"SELECT gym.total_revenue($1)"#)
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&mut *conn)
        .await?;

    Ok(total)
}
