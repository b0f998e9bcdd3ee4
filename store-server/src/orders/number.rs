//! Order number generation
//!
//! Human-readable order identifiers: a date prefix plus a random 6-digit
//! suffix, e.g. `MC-20260806-031847`. Uniqueness is checked against the
//! orders table with a bounded retry; the unique index is the backstop for
//! the residual race between concurrent checkouts.

use chrono::Utc;
use rand::Rng;
use shared::error::{AppError, ErrorCode};
use sqlx::SqliteConnection;

const PREFIX: &str = "MC";
const MAX_ATTEMPTS: usize = 20;

/// Generate one candidate order number
pub fn generate_order_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{PREFIX}-{date}-{suffix:06}")
}

/// Generate an order number that is unique at the time of the check
pub async fn unique_order_number(conn: &mut SqliteConnection) -> Result<String, AppError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = generate_order_number();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_number = ?")
            .bind(&candidate)
            .fetch_one(&mut *conn)
            .await?;
        if count == 0 {
            return Ok(candidate);
        }
    }
    Err(AppError::new(ErrorCode::OrderNumberExhausted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_has_expected_shape() {
        let number = generate_order_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "MC");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn date_prefix_matches_today() {
        let number = generate_order_number();
        let today = Utc::now().format("%Y%m%d").to_string();
        assert!(number.starts_with(&format!("MC-{today}-")));
    }
}
