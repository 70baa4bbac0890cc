/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    StopMarket,
    TakeMarket,
    StopLimit,
    TakeLimit,
}

impl OrderType {
    /// Order types that rest on the book at a limit price
    pub fn requires_price(self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit | OrderType::TakeLimit)
    }

    /// Stop and take-profit order types, triggered by `stop_price`
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            OrderType::StopMarket
                | OrderType::TakeMarket
                | OrderType::StopLimit
                | OrderType::TakeLimit
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopTrigger {
    Mark,
    Index,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PegPriceType {
    #[serde(rename = "trailing-stop")]
    TrailingStop,
    #[serde(rename = "trailing-stop-pct")]
    TrailingStopPct,
}

/// WebSocket subscription channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Level2,
    Ticker,
    Trading,
    Orders,
    Balances,
    Positions,
    Auction,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Level2 => "level2",
            Channel::Ticker => "ticker",
            Channel::Trading => "trading",
            Channel::Orders => "orders",
            Channel::Balances => "balances",
            Channel::Positions => "positions",
            Channel::Auction => "auction",
        }
    }

    /// Channels that carry per-trader data and need a signed subscription
    pub fn is_private(self) -> bool {
        matches!(self, Channel::Orders | Channel::Balances | Channel::Positions)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "level2" => Ok(Channel::Level2),
            "ticker" => Ok(Channel::Ticker),
            "trading" => Ok(Channel::Trading),
            "orders" => Ok(Channel::Orders),
            "balances" => Ok(Channel::Balances),
            "positions" => Ok(Channel::Positions),
            "auction" => Ok(Channel::Auction),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

/// EMX deployment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Testnet,
    Production,
}

impl Environment {
    pub fn rest_url(self) -> &'static str {
        match self {
            Environment::Testnet => "https://api.testnet.emx.com",
            Environment::Production => "https://api.emx.com",
        }
    }

    pub fn ws_url(self) -> &'static str {
        match self {
            Environment::Testnet => "wss://api.testnet.emx.com",
            Environment::Production => "wss://api.emx.com",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OrderType::Market, false, false)]
    #[case(OrderType::Limit, true, false)]
    #[case(OrderType::StopMarket, false, true)]
    #[case(OrderType::TakeMarket, false, true)]
    #[case(OrderType::StopLimit, true, true)]
    #[case(OrderType::TakeLimit, true, true)]
    fn test_order_type_rules(
        #[case] order_type: OrderType,
        #[case] requires_price: bool,
        #[case] conditional: bool,
    ) {
        assert_eq!(order_type.requires_price(), requires_price);
        assert_eq!(order_type.is_conditional(), conditional);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&OrderType::StopLimit).unwrap(), r#""stop_limit""#);
        assert_eq!(
            serde_json::to_string(&PegPriceType::TrailingStopPct).unwrap(),
            r#""trailing-stop-pct""#
        );
        assert_eq!(serde_json::to_string(&Channel::Level2).unwrap(), r#""level2""#);
        let trigger: StopTrigger = serde_json::from_str(r#""index""#).unwrap();
        assert_eq!(trigger, StopTrigger::Index);
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("Orders".parse::<Channel>().unwrap(), Channel::Orders);
        assert!("candles".parse::<Channel>().is_err());
        assert!(Channel::Balances.is_private());
        assert!(!Channel::Ticker.is_private());
    }
}
