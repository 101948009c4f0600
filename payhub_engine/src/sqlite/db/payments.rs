use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, Payment},
    traits::{AccountApiError, PaymentGatewayError},
};

pub async fn idempotent_insert(
    payment: NewPayment,
    conn: &mut SqliteConnection,
) -> Result<Payment, PaymentGatewayError> {
    let transaction_id = payment.transaction_id.clone();
    let payment = sqlx::query_as::<_, Payment>(
        r#"
            INSERT INTO payments (transaction_id, amount, account_id) VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(payment.transaction_id)
    .bind(payment.amount)
    .bind(payment.account_id)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            PaymentGatewayError::PaymentAlreadyExists(transaction_id)
        },
        _ => PaymentGatewayError::from(e),
    })?;
    Ok(payment)
}

pub async fn payment_by_transaction_id(
    transaction_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, PaymentGatewayError> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE transaction_id = $1")
        .bind(transaction_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

pub async fn payments_for_account(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payment>, AccountApiError> {
    let payments = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE account_id = $1 ORDER BY id")
        .bind(account_id)
        .fetch_all(conn)
        .await?;
    Ok(payments)
}

pub async fn payments_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Payment>, AccountApiError> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
            SELECT payments.* FROM payments
            INNER JOIN accounts ON payments.account_id = accounts.id
            WHERE accounts.owner_id = $1
            ORDER BY payments.id
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(payments)
}
