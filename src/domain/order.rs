use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::lifecycle::{transition, LifecycleEvent, OrderState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: BigDecimal,
    pub qty: i32,
    /// Farmer or supplier who supplied the item.
    pub vendor_id: Uuid,
}

impl OrderItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.price * &BigDecimal::from(self.qty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prices {
    pub items_price: BigDecimal,
    pub shipping_price: BigDecimal,
    pub tax_price: BigDecimal,
    pub total_price: BigDecimal,
}

/// Record issued by the payment processor once a payment completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    pub id: String,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
}

impl PaymentProof {
    /// Checks the proof is well formed and reports one of `accepted_statuses`.
    /// The processor itself is trusted; nothing is verified cryptographically.
    pub fn verify(&self, accepted_statuses: &[String]) -> Result<(), DomainError> {
        if self.id.trim().is_empty() {
            return Err(DomainError::InvalidPaymentProof(
                "payment id is missing".to_string(),
            ));
        }
        let status = match self.status.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => {
                return Err(DomainError::InvalidPaymentProof(
                    "payment status is missing".to_string(),
                ))
            }
        };
        if !accepted_statuses.iter().any(|accepted| accepted == status) {
            return Err(DomainError::InvalidPaymentProof(format!(
                "payment status '{}' is not a success status",
                status
            )));
        }
        Ok(())
    }
}

/// Column widths of `orders` and `order_items`; keep in step with the migration.
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_CODE_LEN: usize = 50;

fn check_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::InvalidInput(format!(
            "{} exceeds {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Checkout input, before a buyer and an id are attached.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub prices: Prices,
}

impl OrderDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }

        let zero = BigDecimal::from(0);
        for item in &self.items {
            if item.qty <= 0 {
                return Err(DomainError::InvalidInput(format!(
                    "quantity of '{}' must be positive",
                    item.name
                )));
            }
            if item.price < zero {
                return Err(DomainError::InvalidPrice(format!(
                    "price of '{}' is negative",
                    item.name
                )));
            }
            check_length("item name", &item.name, MAX_NAME_LEN)?;
        }

        let address = &self.shipping_address;
        for (field, value) in [
            ("address", &address.address),
            ("city", &address.city),
            ("postal_code", &address.postal_code),
            ("country", &address.country),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::InvalidInput(format!(
                    "shipping {} is required",
                    field
                )));
            }
        }
        if self.payment_method.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "payment method is required".to_string(),
            ));
        }
        check_length("shipping city", &address.city, MAX_NAME_LEN)?;
        check_length("shipping country", &address.country, MAX_NAME_LEN)?;
        check_length("shipping postal_code", &address.postal_code, MAX_CODE_LEN)?;
        check_length("payment method", &self.payment_method, MAX_CODE_LEN)?;

        let prices = &self.prices;
        for (field, value) in [
            ("items_price", &prices.items_price),
            ("shipping_price", &prices.shipping_price),
            ("tax_price", &prices.tax_price),
            ("total_price", &prices.total_price),
        ] {
            if *value < zero {
                return Err(DomainError::InvalidPrice(format!("{} is negative", field)));
            }
        }

        let items_sum = self
            .items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + item.line_total());
        if !within_tolerance(&items_sum, &prices.items_price) {
            return Err(DomainError::InvalidPrice(format!(
                "items_price {} does not match item total {}",
                prices.items_price, items_sum
            )));
        }

        let expected_total = &prices.items_price + &prices.shipping_price + &prices.tax_price;
        if !within_tolerance(&expected_total, &prices.total_price) {
            return Err(DomainError::InvalidPrice(format!(
                "total_price {} does not match {}",
                prices.total_price, expected_total
            )));
        }

        Ok(())
    }
}

/// Prices may disagree by at most one cent.
pub fn within_tolerance(a: &BigDecimal, b: &BigDecimal) -> bool {
    let tolerance = BigDecimal::from(1) / BigDecimal::from(100);
    (a - b).abs() <= tolerance
}

/// A validated draft with its buyer, id and creation time assigned.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub draft: OrderDraft,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(buyer_id: Uuid, draft: OrderDraft, created_at: DateTime<Utc>) -> Result<Self, DomainError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            buyer_id,
            draft,
            created_at,
        })
    }

    pub fn into_order(self) -> Order {
        Order {
            id: self.id,
            buyer_id: self.buyer_id,
            items: self.draft.items,
            shipping_address: self.draft.shipping_address,
            payment_method: self.draft.payment_method,
            prices: self.draft.prices,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub prices: Prices,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentProof>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn state(&self) -> OrderState {
        OrderState::from_flags(self.is_paid, self.is_delivered)
    }

    pub fn has_items_from(&self, vendor_id: Uuid) -> bool {
        self.items.iter().any(|item| item.vendor_id == vendor_id)
    }

    pub fn apply_payment(&mut self, proof: PaymentProof, at: DateTime<Utc>) -> Result<(), DomainError> {
        transition(self.state(), LifecycleEvent::PaymentConfirmed)?;
        self.is_paid = true;
        self.paid_at = Some(at);
        self.payment_result = Some(proof);
        Ok(())
    }

    pub fn apply_delivery(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        transition(self.state(), LifecycleEvent::DeliveryConfirmed)?;
        self.is_delivered = true;
        self.delivered_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{dec, draft, item, proof};

    #[test]
    fn valid_draft_passes() {
        let vendor = Uuid::new_v4();
        let d = draft(vec![item(vendor, "10.00", 2), item(vendor, "5.00", 1)], "3.00", "1.50");
        assert!(d.validate().is_ok());
        assert_eq!(d.prices.total_price, dec("29.50"));
    }

    #[test]
    fn empty_draft_is_rejected() {
        let d = draft(vec![], "0", "0");
        assert!(matches!(d.validate(), Err(DomainError::EmptyOrder)));
    }

    #[test]
    fn negative_item_price_is_rejected() {
        let d = draft(vec![item(Uuid::new_v4(), "-1.00", 1)], "0", "0");
        assert!(matches!(d.validate(), Err(DomainError::InvalidPrice(_))));
    }

    #[test]
    fn negative_shipping_price_is_rejected() {
        let d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "-2.00", "0");
        assert!(matches!(d.validate(), Err(DomainError::InvalidPrice(_))));
    }

    #[test]
    fn zero_quantity_is_invalid_input() {
        let d = draft(vec![item(Uuid::new_v4(), "4.00", 0)], "0", "0");
        assert!(matches!(d.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn blank_city_is_invalid_input() {
        let mut d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "0", "0");
        d.shipping_address.city = "  ".to_string();
        let err = d.validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.contains("city")));
    }

    #[test]
    fn overlong_payment_method_is_invalid_input() {
        let mut d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "0", "0");
        d.payment_method = "P".repeat(MAX_CODE_LEN + 10);
        let err = d.validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.contains("payment method")));
    }

    #[test]
    fn overlong_postal_code_and_item_name_are_invalid_input() {
        let mut d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "0", "0");
        d.shipping_address.postal_code = "9".repeat(60);
        assert!(matches!(d.validate(), Err(DomainError::InvalidInput(_))));

        let mut d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "0", "0");
        d.items[0].name = "n".repeat(300);
        let err = d.validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.contains("item name")));
    }

    #[test]
    fn fields_at_column_width_are_accepted() {
        let mut d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "0", "0");
        d.payment_method = "é".repeat(MAX_CODE_LEN);
        d.shipping_address.city = "c".repeat(MAX_NAME_LEN);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn total_mismatch_is_rejected() {
        let mut d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "1.00", "0");
        d.prices.total_price = dec("6.00");
        assert!(matches!(d.validate(), Err(DomainError::InvalidPrice(_))));
    }

    #[test]
    fn total_within_a_cent_is_accepted() {
        let mut d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "1.00", "0.333");
        d.prices.total_price = dec("5.33");
        assert!(d.validate().is_ok());
    }

    #[test]
    fn items_price_must_match_lines() {
        let mut d = draft(vec![item(Uuid::new_v4(), "4.00", 2)], "0", "0");
        d.prices.items_price = dec("4.00");
        d.prices.total_price = dec("4.00");
        assert!(matches!(d.validate(), Err(DomainError::InvalidPrice(_))));
    }

    #[test]
    fn new_order_starts_created() {
        let d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "0", "0");
        let order = NewOrder::new(Uuid::new_v4(), d, Utc::now())
            .expect("valid draft")
            .into_order();
        assert_eq!(order.state(), OrderState::Created);
        assert!(!order.is_paid && !order.is_delivered);
        assert!(order.paid_at.is_none() && order.delivered_at.is_none());
    }

    #[test]
    fn payment_then_delivery_sets_timestamps_once() {
        let d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "0", "0");
        let mut order = NewOrder::new(Uuid::new_v4(), d, Utc::now())
            .expect("valid draft")
            .into_order();

        let paid_at = Utc::now();
        order.apply_payment(proof("COMPLETED"), paid_at).expect("pay");
        let err = order.apply_payment(proof("COMPLETED"), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::AlreadyInState(OrderState::Paid)));
        assert_eq!(order.paid_at, Some(paid_at));

        order.apply_delivery(Utc::now()).expect("deliver");
        assert_eq!(order.state(), OrderState::Delivered);
        assert!(order.is_paid);
    }

    #[test]
    fn delivery_before_payment_is_not_paid() {
        let d = draft(vec![item(Uuid::new_v4(), "4.00", 1)], "0", "0");
        let mut order = NewOrder::new(Uuid::new_v4(), d, Utc::now())
            .expect("valid draft")
            .into_order();
        assert!(matches!(order.apply_delivery(Utc::now()), Err(DomainError::NotPaid)));
        assert!(!order.is_delivered);
    }

    #[test]
    fn proof_without_status_is_invalid() {
        let mut p = proof("COMPLETED");
        p.status = None;
        let accepted = vec!["COMPLETED".to_string()];
        assert!(matches!(p.verify(&accepted), Err(DomainError::InvalidPaymentProof(_))));
    }

    #[test]
    fn proof_with_unknown_status_is_invalid() {
        let accepted = vec!["COMPLETED".to_string()];
        assert!(matches!(
            proof("PENDING").verify(&accepted),
            Err(DomainError::InvalidPaymentProof(_))
        ));
        assert!(proof("COMPLETED").verify(&accepted).is_ok());
    }

    #[test]
    fn proof_without_id_is_invalid() {
        let mut p = proof("COMPLETED");
        p.id = String::new();
        let accepted = vec!["COMPLETED".to_string()];
        assert!(matches!(p.verify(&accepted), Err(DomainError::InvalidPaymentProof(_))));
    }
}
