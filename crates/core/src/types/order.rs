//! Order records produced by checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::cart::{CartLine, subtotal};
use super::id::OrderId;
use super::price::Price;
use super::status::OrderStatus;

/// Contact and shipping data collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// Immutable snapshot of a cart at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<CartLine>,
    pub customer_info: CustomerInfo,
    /// Full-precision total; round only for display.
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient_total"
    )]
    pub total: Decimal,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    /// Persisted timestamp (epoch ms) of the cart this order consumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_timestamp: Option<i64>,
}

impl Order {
    /// Build a completed order from the current cart lines.
    ///
    /// Returns `None` when `lines` is empty.
    #[must_use]
    pub fn from_cart(
        lines: &[CartLine],
        customer_info: CustomerInfo,
        now: DateTime<Utc>,
        cart_timestamp: Option<i64>,
    ) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }

        Some(Self {
            id: OrderId::generate(now),
            items: lines.to_vec(),
            customer_info,
            total: subtotal(lines).amount(),
            date: now,
            status: OrderStatus::Completed,
            cart_timestamp,
        })
    }

    /// The total as a price, for display.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        Price::new(self.total)
    }
}

/// Read a stored total written by any client.
///
/// `null` (a `NaN` total serialized by a browser) and unparsable values read
/// as zero. Floats beyond the decimal range, such as a saturated total after
/// its `f64` round-trip, clamp to the range.
fn lenient_total<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => match Price::parse(&n.to_string()) {
            Ok(price) => price.amount(),
            Err(_) => match n.as_f64() {
                Some(f) if f.is_finite() && f >= 1.0 => Decimal::MAX,
                Some(f) if f.is_finite() && f <= -1.0 => Decimal::MIN,
                _ => Decimal::ZERO,
            },
        },
        Some(serde_json::Value::String(s)) => Price::parse_or_zero(&s).amount(),
        _ => Decimal::ZERO,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::cart::{LineKey, Quantity};
    use crate::types::id::ProductId;
    use crate::types::product::{OptionCode, Product};

    fn line(price: &str, quantity: u32) -> CartLine {
        let details: Product = serde_json::from_value(json!({ "id": "p", "price": price })).unwrap();
        CartLine::new(
            LineKey {
                product_id: ProductId::new(price),
                color_code: OptionCode::new(1),
                storage_code: OptionCode::new(1),
            },
            Quantity::new(quantity).unwrap(),
            Some(details),
        )
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "A".to_string(),
            email: "a@b.com".to_string(),
            address: "X".to_string(),
        }
    }

    #[test]
    fn test_from_cart_empty_is_none() {
        assert!(Order::from_cart(&[], customer(), Utc::now(), None).is_none());
    }

    #[test]
    fn test_from_cart_computes_total() {
        let lines = vec![line("100.00", 2), line("49.99", 1)];
        let order = Order::from_cart(&lines, customer(), Utc::now(), Some(5)).unwrap();

        assert_eq!(order.total, Decimal::new(24999, 2));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.items, lines);
        assert_eq!(order.cart_timestamp, Some(5));
        assert_eq!(order.total_price().to_string(), "249.99€");
    }

    #[test]
    fn test_order_wire_format() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let order = Order::from_cart(&[line("500", 1)], customer(), now, None).unwrap();
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["total"], json!(500.0));
        assert_eq!(value["status"], json!("completed"));
        assert_eq!(value["customerInfo"]["email"], json!("a@b.com"));
        assert_eq!(value["date"], json!("2023-11-14T22:13:20Z"));
        assert!(value.get("cartTimestamp").is_none());

        let back: Order = serde_json::from_value(value).unwrap();
        assert_eq!(back.id, order.id);
        assert_eq!(back.total, Decimal::from(500));
    }

    #[test]
    fn test_stored_total_is_lenient() {
        let mut value = serde_json::to_value(
            Order::from_cart(&[line("500", 1)], customer(), Utc::now(), None).unwrap(),
        )
        .unwrap();

        value["total"] = json!(null);
        let order: Order = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(order.total, Decimal::ZERO);

        value["total"] = json!("12.50");
        let order: Order = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(order.total, Decimal::new(1250, 2));

        value.as_object_mut().unwrap().remove("total");
        let order: Order = serde_json::from_value(value).unwrap();
        assert_eq!(order.total, Decimal::ZERO);
    }

    #[test]
    fn test_saturated_total_survives_round_trip() {
        let huge = "79228162514264337593543950335";
        let order =
            Order::from_cart(&[line(huge, 2), line(huge, 1)], customer(), Utc::now(), None)
                .unwrap();
        assert_eq!(order.total, Decimal::MAX);

        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total, Decimal::MAX);
    }
}
