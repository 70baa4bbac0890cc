/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{OrderType, PegPriceType, Side, StopTrigger};

/// Body of `POST /v1/orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub contract_code: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: Side,
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_trigger: Option<StopTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peg_price_type: Option<PegPriceType>,
    #[serde(with = "rust_decimal::serde::str_option")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peg_offset_value: Option<Decimal>,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub post_only: bool,
}

impl NewOrderRequest {
    /// Market order with no optional fields set
    pub fn market(contract_code: impl Into<String>, side: Side, size: Decimal) -> Self {
        Self {
            client_id: None,
            contract_code: contract_code.into(),
            order_type: OrderType::Market,
            side,
            size,
            price: None,
            stop_price: None,
            stop_trigger: None,
            peg_price_type: None,
            peg_offset_value: None,
            reduce_only: false,
            post_only: false,
        }
    }

    /// Limit order at `price`
    pub fn limit(
        contract_code: impl Into<String>,
        side: Side,
        size: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::Limit,
            price: Some(price),
            ..Self::market(contract_code, side, size)
        }
    }

    /// Check field combinations the exchange would reject.
    ///
    /// Returns the reason as a message for `EmxError::InvalidOrder`.
    pub fn validate(&self) -> Result<(), String> {
        if self.contract_code.trim().is_empty() {
            return Err("contract_code is required".to_string());
        }
        if self.size <= Decimal::ZERO {
            return Err(format!("size must be positive, got {}", self.size));
        }
        if self.order_type.requires_price() && self.price.is_none() {
            return Err(format!(
                "price is required for {} orders",
                order_type_name(self.order_type)
            ));
        }
        if self.order_type.is_conditional() {
            if self.stop_price.is_none() {
                return Err(format!(
                    "stop_price is required for {} orders",
                    order_type_name(self.order_type)
                ));
            }
        } else if self.stop_trigger.is_some() || self.peg_price_type.is_some() {
            return Err("stop_trigger and peg_price_type apply only to stop/take orders".to_string());
        }
        if self.peg_offset_value.is_some() && self.peg_price_type.is_none() {
            return Err("peg_offset_value requires peg_price_type".to_string());
        }
        Ok(())
    }
}

fn order_type_name(order_type: OrderType) -> String {
    serde_json::to_value(order_type)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Body of `PATCH /v1/orders/{order_id}`; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifyOrderRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(with = "rust_decimal::serde::str_option")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
}

impl ModifyOrderRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Body of `DELETE /v1/orders/{order_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    pub order_id: String,
}

/// Filters for `GET /v1/orders`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrdersQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl OrdersQuery {
    pub(crate) fn pairs(&self) -> Vec<(&'static str, &str)> {
        query_pairs(&[
            ("contract_code", self.contract_code.as_deref()),
            ("status", self.status.as_deref()),
            ("before", self.before.as_deref()),
            ("after", self.after.as_deref()),
        ])
    }
}

/// Filters for `GET /v1/fills`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl FillsQuery {
    pub(crate) fn pairs(&self) -> Vec<(&'static str, &str)> {
        query_pairs(&[
            ("contract_code", self.contract_code.as_deref()),
            ("order_id", self.order_id.as_deref()),
            ("before", self.before.as_deref()),
            ("after", self.after.as_deref()),
        ])
    }
}

fn query_pairs<'a>(fields: &[(&'static str, Option<&'a str>)]) -> Vec<(&'static str, &'a str)> {
    fields
        .iter()
        .filter_map(|(name, value)| match value {
            Some(value) if !value.is_empty() => Some((*name, *value)),
            _ => None,
        })
        .collect()
}

/// WebSocket subscribe/unsubscribe frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    #[serde(rename = "type")]
    pub action: String,
    pub contract_codes: Vec<String>,
    pub channels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}
