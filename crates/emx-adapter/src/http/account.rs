/*
[INPUT]:  Trader ids, fill filters, and API key signatures
[OUTPUT]: Trader accounts, balances, positions, fills
[POS]:    HTTP layer - account endpoints (require API key auth)
[UPDATE]: When adding new account endpoints or changing query parameters
*/

// ### Account Endpoints

use crate::http::client::{path_segment, with_query};
use crate::http::{EmxClient, Result};
use crate::types::{
    AccountBalances, AccountsResponse, Fill, FillsQuery, FillsResponse, Position,
    PositionsResponse, TraderAccount,
};
use reqwest::Method;

impl EmxClient {
    /// List all trader accounts of the current user
    ///
    /// GET /v1/accounts
    pub async fn get_account(&self) -> Result<Vec<TraderAccount>> {
        let builder = self.signed_request(Method::GET, "/v1/accounts", None)?;
        let response: AccountsResponse = self.send_json(builder).await?;
        Ok(response.accounts)
    }

    /// Balances, margin requirements and net liquidation value of one account
    ///
    /// GET /v1/accounts/{trader_id}
    pub async fn get_balances(&self, trader_id: &str) -> Result<AccountBalances> {
        let endpoint = format!("/v1/accounts/{}", path_segment(trader_id)?);
        let builder = self.signed_request(Method::GET, &endpoint, None)?;
        self.send_json(builder).await
    }

    /// Positions across all trading accounts
    ///
    /// GET /v1/positions
    pub async fn get_positions(&self) -> Result<Vec<Position>> {
        let builder = self.signed_request(Method::GET, "/v1/positions", None)?;
        let response: PositionsResponse = self.send_json(builder).await?;
        Ok(response.positions)
    }

    /// Fills for the current trading account, newest first
    ///
    /// GET /v1/fills?contract_code={}&order_id={}&before={}&after={}
    pub async fn list_fills(&self, query: &FillsQuery) -> Result<Vec<Fill>> {
        let endpoint = with_query("/v1/fills", &query.pairs());
        let builder = self.signed_request(Method::GET, &endpoint, None)?;
        let response: FillsResponse = self.send_json(builder).await?;
        Ok(response.fills)
    }
}
