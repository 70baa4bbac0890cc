/*
[INPUT]:  Contract codes
[OUTPUT]: Market data (contracts, funding, summary, quote, book)
[POS]:    HTTP layer - public market data endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
*/

use crate::http::client::path_segment;
use crate::http::{EmxClient, Result};
use crate::types::{Contract, ContractData, ContractsResponse};
use reqwest::Method;

impl EmxClient {
    /// List all contracts
    ///
    /// GET /v1/contracts
    pub async fn get_contracts(&self) -> Result<Vec<Contract>> {
        let builder = self.public_request(Method::GET, "/v1/contracts")?;
        let response: ContractsResponse = self.send_json(builder).await?;
        Ok(response.into_contracts())
    }

    /// List contracts currently open for trading
    ///
    /// GET /v1/contracts/active
    pub async fn get_active_contracts(&self) -> Result<Vec<Contract>> {
        let builder = self.public_request(Method::GET, "/v1/contracts/active")?;
        let response: ContractsResponse = self.send_json(builder).await?;
        Ok(response.into_contracts())
    }

    /// Details of a single contract
    ///
    /// GET /v1/contracts/{contract_code}
    pub async fn get_contract(&self, contract_code: &str) -> Result<ContractData> {
        self.get_contract_route(contract_code, None).await
    }

    /// Funding rate history of a perpetual contract
    ///
    /// GET /v1/contracts/{contract_code}/funding
    pub async fn get_contract_funding(&self, contract_code: &str) -> Result<ContractData> {
        self.get_contract_route(contract_code, Some("funding")).await
    }

    /// 24h trading summary
    ///
    /// GET /v1/contracts/{contract_code}/summary
    pub async fn get_contract_summary(&self, contract_code: &str) -> Result<ContractData> {
        self.get_contract_route(contract_code, Some("summary")).await
    }

    /// Best bid/ask and last trade
    ///
    /// GET /v1/contracts/{contract_code}/quote
    pub async fn get_contract_quote(&self, contract_code: &str) -> Result<ContractData> {
        self.get_contract_route(contract_code, Some("quote")).await
    }

    /// Aggregated order book
    ///
    /// GET /v1/contracts/{contract_code}/book
    pub async fn get_contract_book(&self, contract_code: &str) -> Result<ContractData> {
        self.get_contract_route(contract_code, Some("book")).await
    }

    async fn get_contract_route(
        &self,
        contract_code: &str,
        suffix: Option<&str>,
    ) -> Result<ContractData> {
        let mut endpoint = format!("/v1/contracts/{}", path_segment(contract_code)?);
        if let Some(suffix) = suffix {
            endpoint.push('/');
            endpoint.push_str(suffix);
        }
        let builder = self.public_request(Method::GET, &endpoint)?;
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, EmxClient};
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> EmxClient {
        EmxClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .expect("client init")
    }

    #[tokio::test]
    async fn test_get_contracts() {
        let server = MockServer::start().await;
        let mock_response = r#"{
            "contracts": [
                {"contract_code": "BTCZ19", "base_currency": "BTC", "minimum_price_increment": "0.5"},
                {"contract_code": "ETHH19", "base_currency": "ETH", "minimum_price_increment": "0.05"}
            ]
        }"#;

        Mock::given(method("GET"))
            .and(path("/v1/contracts"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(mock_response, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let contracts = client_for(&server)
            .get_contracts()
            .await
            .expect("get_contracts failed");

        assert_eq!(contracts.len(), 2);
        assert_eq!(contracts[0].contract_code, "BTCZ19");
        assert_eq!(contracts[1].fields.get("base_currency"), Some(&json!("ETH")));
        assert_eq!(
            contracts[0].decimal("minimum_price_increment"),
            Some(Decimal::new(5, 1))
        );
    }

    #[tokio::test]
    async fn test_get_active_contracts_bare_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/contracts/active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"contract_code": "BTC-PERP"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let contracts = client_for(&server)
            .get_active_contracts()
            .await
            .expect("get_active_contracts failed");

        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].contract_code, "BTC-PERP");
    }

    #[tokio::test]
    async fn test_contract_routes() {
        let server = MockServer::start().await;
        for (route, body) in [
            ("/v1/contracts/BTCZ19", json!({"contract_code": "BTCZ19", "type": "future"})),
            ("/v1/contracts/BTCZ19/funding", json!({"contract_code": "BTCZ19", "funding_rate": "0.0001"})),
            ("/v1/contracts/BTCZ19/summary", json!({"contract_code": "BTCZ19", "volume_24h": "1520.5"})),
            ("/v1/contracts/BTCZ19/quote", json!({"contract_code": "BTCZ19", "bid": "3600", "ask": "3600.5"})),
            ("/v1/contracts/BTCZ19/book", json!({"contract_code": "BTCZ19", "bids": [["3600", "2"]], "asks": []})),
        ] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = client_for(&server);

        let contract = client.get_contract("BTCZ19").await.expect("contract");
        assert_eq!(contract.get("type"), Some(&json!("future")));

        let funding = client.get_contract_funding("BTCZ19").await.expect("funding");
        assert_eq!(funding.decimal("funding_rate"), Some(Decimal::new(1, 4)));

        let summary = client.get_contract_summary("BTCZ19").await.expect("summary");
        assert_eq!(summary.decimal("volume_24h"), Some(Decimal::new(15205, 1)));

        let quote = client.get_contract_quote("BTCZ19").await.expect("quote");
        assert_eq!(quote.decimal("ask"), Some(Decimal::new(36005, 1)));

        let book = client.get_contract_book("BTCZ19").await.expect("book");
        assert_eq!(book.contract_code.as_deref(), Some("BTCZ19"));
        assert_eq!(book.get("bids"), Some(&json!([["3600", "2"]])));
    }

    #[tokio::test]
    async fn test_public_routes_are_unsigned() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/contracts/BTCZ19/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"contract_code": "BTCZ19"})))
            .expect(1)
            .mount(&server)
            .await;

        let quote = client_for(&server)
            .get_contract_quote("BTCZ19")
            .await
            .expect("quote");
        assert_eq!(quote.contract_code.as_deref(), Some("BTCZ19"));

        let received = server.received_requests().await.expect("recording enabled");
        assert!(received.iter().all(|request| !request.headers.contains_key("emx-access-sig")));
    }

    #[tokio::test]
    async fn test_invalid_json_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/contracts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_contracts().await.unwrap_err();
        assert!(matches!(err, crate::http::EmxError::InvalidResponse(_)));
    }
}
