/*
[INPUT]:  Order requests signed with the API secret
[OUTPUT]: Order listings and create/modify/cancel acknowledgements
[POS]:    HTTP layer - trading endpoints (require auth + body signature)
[UPDATE]: When adding new trading endpoints or changing order flow
*/

use tracing::{debug, info};

use crate::auth::body_to_string;
use crate::http::client::{path_segment, with_query};
use crate::http::{EmxClient, EmxError, Result};
use crate::types::{
    CancelAllResponse, CancelOrderRequest, ModifyOrderRequest, NewOrderRequest, NewOrderResponse,
    Order, OrderAckResponse, OrdersQuery, OrdersResponse,
};
use reqwest::Method;

impl EmxClient {
    /// Orders for the current trading account, newest first
    ///
    /// GET /v1/orders?contract_code={}&status={}&before={}&after={}
    pub async fn list_orders(&self, query: &OrdersQuery) -> Result<Vec<Order>> {
        let endpoint = with_query("/v1/orders", &query.pairs());
        let builder = self.signed_request(Method::GET, &endpoint, None)?;
        let response: OrdersResponse = self.send_json(builder).await?;
        Ok(response.orders)
    }

    /// Create a new order
    ///
    /// POST /v1/orders
    /// The order is validated locally first; nothing is sent when it is rejected.
    pub async fn create_order(&self, req: &NewOrderRequest) -> Result<NewOrderResponse> {
        req.validate().map_err(EmxError::InvalidOrder)?;

        let body = body_to_string(req)?;
        let builder = self.signed_request(Method::POST, "/v1/orders", Some(body))?;
        let response: NewOrderResponse = self.send_json(builder).await?;

        info!(
            contract_code = %req.contract_code,
            side = ?req.side,
            order_type = ?req.order_type,
            size = %req.size,
            order_id = response.order_id().unwrap_or_default(),
            "order submitted"
        );
        Ok(response)
    }

    /// Modify an existing order
    ///
    /// PATCH /v1/orders/{order_id}
    pub async fn modify_order(
        &self,
        order_id: &str,
        req: &ModifyOrderRequest,
    ) -> Result<OrderAckResponse> {
        if req.is_empty() {
            return Err(EmxError::InvalidOrder(
                "modify request does not change any field".to_string(),
            ));
        }

        let endpoint = format!("/v1/orders/{}", path_segment(order_id)?);
        let body = body_to_string(req)?;
        let builder = self.signed_request(Method::PATCH, &endpoint, Some(body))?;
        let response: OrderAckResponse = self.send_json(builder).await?;
        debug!(order_id, message = %response.message, "order modify acknowledged");
        Ok(response)
    }

    /// Cancel an existing order
    ///
    /// DELETE /v1/orders/{order_id}
    pub async fn cancel_order(&self, order_id: &str) -> Result<OrderAckResponse> {
        let endpoint = format!("/v1/orders/{}", path_segment(order_id)?);
        let body = body_to_string(&CancelOrderRequest {
            order_id: order_id.to_string(),
        })?;
        let builder = self.signed_request(Method::DELETE, &endpoint, Some(body))?;
        let response: OrderAckResponse = self.send_json(builder).await?;
        debug!(order_id, message = %response.message, "order cancel acknowledged");
        Ok(response)
    }

    /// Cancel all active orders, optionally only for one contract
    ///
    /// DELETE /v1/orders?contract_code={contract_code}
    pub async fn cancel_all(&self, contract_code: Option<&str>) -> Result<CancelAllResponse> {
        let pairs: Vec<(&str, &str)> = contract_code
            .map(|code| vec![("contract_code", code)])
            .unwrap_or_default();
        let endpoint = with_query("/v1/orders", &pairs);
        let builder = self.signed_request(Method::DELETE, &endpoint, None)?;
        let response: CancelAllResponse = self.send_json(builder).await?;
        info!(contract_code = contract_code.unwrap_or("*"), "cancel all requested");
        Ok(response)
    }
}
