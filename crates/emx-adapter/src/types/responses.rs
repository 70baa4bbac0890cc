/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::models::{ApiKey, Contract, Fill, Order, Position, TraderAccount};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<TraderAccount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionsResponse {
    #[serde(default)]
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillsResponse {
    #[serde(default)]
    pub fills: Vec<Fill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Key listing, returned either bare or wrapped in `{"keys": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeysResponse {
    Wrapped { keys: Vec<ApiKey> },
    List(Vec<ApiKey>),
}

impl KeysResponse {
    pub fn into_keys(self) -> Vec<ApiKey> {
        match self {
            KeysResponse::Wrapped { keys } | KeysResponse::List(keys) => keys,
        }
    }
}

/// Contract listing, returned either bare or wrapped in `{"contracts": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContractsResponse {
    Wrapped { contracts: Vec<Contract> },
    List(Vec<Contract>),
}

impl ContractsResponse {
    pub fn into_contracts(self) -> Vec<Contract> {
        match self {
            ContractsResponse::Wrapped { contracts } | ContractsResponse::List(contracts) => {
                contracts
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteKeyResponse {
    pub key: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderResponse {
    #[serde(default)]
    pub message: String,
    pub order: serde_json::Value,
    #[serde(default)]
    pub timestamp: String,
}

impl NewOrderResponse {
    /// Exchange-assigned id of the accepted order
    pub fn order_id(&self) -> Option<&str> {
        self.order.get("order_id").and_then(|value| value.as_str())
    }
}

/// Acknowledgement of a modify or cancel request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAckResponse {
    #[serde(default)]
    pub message: String,
    pub order_id: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelAllResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub contract_code: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_response_accepts_both_shapes() {
        let wrapped: KeysResponse =
            serde_json::from_value(json!({"keys": [{"key": "k1"}]})).unwrap();
        let bare: KeysResponse = serde_json::from_value(json!([{"key": "k1"}])).unwrap();
        assert_eq!(wrapped.into_keys(), bare.into_keys());
    }

    #[test]
    fn contracts_response_accepts_both_shapes() {
        let wrapped: ContractsResponse = serde_json::from_value(json!({
            "contracts": [{"contract_code": "BTCZ19", "type": "future"}]
        }))
        .unwrap();
        let contracts = wrapped.into_contracts();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].contract_code, "BTCZ19");
        assert_eq!(contracts[0].fields.get("type"), Some(&json!("future")));

        let bare: ContractsResponse =
            serde_json::from_value(json!([{"contract_code": "ETHH19"}])).unwrap();
        assert_eq!(bare.into_contracts()[0].contract_code, "ETHH19");
    }

    #[test]
    fn new_order_response_exposes_order_id() {
        let response: NewOrderResponse = serde_json::from_value(json!({
            "message": "New order request received.",
            "order": {"order_id": "abc", "contract_code": "BTCZ19"},
            "timestamp": "2019-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(response.order_id(), Some("abc"));
    }
}
