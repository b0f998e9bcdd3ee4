//! Money calculation utilities using rust_decimal for precision
//!
//! All monetary arithmetic is done in `Decimal` internally and converted to
//! `f64` only at the storage/serialization edge.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::error::{AppError, ErrorCode};
use shared::models::CartItemRequest;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 9999;

/// Validate that an f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field_name} must be a finite number, got {value}"
        ))
        .with_detail("field", field_name));
    }
    Ok(())
}

/// Validate one cart line before it reaches the placement transaction
///
/// Quantity bounds are enforced here; the advisory client price is only
/// sanity-checked, since the server snapshots the catalog price anyway.
pub fn validate_cart_item(item: &CartItemRequest) -> Result<(), AppError> {
    if item.quantity < 1 {
        return Err(
            AppError::validation(format!(
                "quantity must be at least 1, got {} for product {}",
                item.quantity, item.id
            ))
            .with_detail("productId", item.id),
        );
    }
    if item.quantity > MAX_QUANTITY {
        return Err(
            AppError::validation(format!(
                "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {}",
                item.quantity
            ))
            .with_detail("productId", item.id),
        );
    }
    if let Some(price) = item.price {
        require_finite(price, "price")?;
        if !(0.0..=MAX_PRICE).contains(&price) {
            return Err(AppError::validation(format!(
                "price out of range for product {}: {price}",
                item.id
            ))
            .with_detail("productId", item.id));
        }
    }
    Ok(())
}

/// Validate a catalog price coming from the admin CRUD
pub fn validate_catalog_price(price: f64) -> Result<(), AppError> {
    require_finite(price, "price")?;
    if !(0.0..=MAX_PRICE).contains(&price) {
        return Err(AppError::with_message(
            ErrorCode::ValidationFailed,
            format!("price out of range: {price}"),
        ));
    }
    Ok(())
}

/// Convert a stored price into a `Decimal`, rejecting non-representable values
pub fn to_decimal(price: f64) -> Result<Decimal, AppError> {
    Decimal::from_f64(price)
        .ok_or_else(|| AppError::internal(format!("price {price} is not representable")))
}

/// `price * quantity` as an exact decimal
pub fn line_total(price: f64, quantity: i64) -> Result<Decimal, AppError> {
    Ok(to_decimal(price)? * Decimal::from(quantity))
}

/// Round to 2 decimal places, half-up, and convert back to `f64`
pub fn round_to_currency(amount: Decimal) -> f64 {
    amount
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(id: i64, quantity: i64, price: Option<f64>) -> CartItemRequest {
        CartItemRequest {
            id,
            quantity,
            price,
            name: None,
        }
    }

    #[test]
    fn rejects_zero_and_negative_quantities() {
        assert!(validate_cart_item(&item(1, 0, None)).is_err());
        assert!(validate_cart_item(&item(1, -3, None)).is_err());
        assert!(validate_cart_item(&item(1, 1, None)).is_ok());
    }

    #[test]
    fn rejects_non_finite_prices() {
        assert!(validate_cart_item(&item(1, 1, Some(f64::NAN))).is_err());
        assert!(validate_cart_item(&item(1, 1, Some(f64::INFINITY))).is_err());
        assert!(validate_cart_item(&item(1, 1, Some(-1.0))).is_err());
    }

    #[test]
    fn line_totals_are_exact() {
        // 0.1 + 0.2 style drift must not appear in totals
        let total = line_total(19.99, 3).unwrap();
        assert_eq!(round_to_currency(total), 59.97);
    }

    #[test]
    fn totals_accumulate_exactly() {
        let mut total = Decimal::ZERO;
        total += line_total(100.0, 2).unwrap();
        total += line_total(50.0, 1).unwrap();
        assert_eq!(round_to_currency(total), 250.0);
    }

    #[test]
    fn rounding_is_half_up() {
        let d = Decimal::from_str("10.005").unwrap();
        assert_eq!(round_to_currency(d), 10.01);
    }
}
