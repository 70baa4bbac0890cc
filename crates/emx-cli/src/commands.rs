/*
[INPUT]:  Parsed subcommand, CLI configuration, shutdown token
[OUTPUT]: Pretty JSON on stdout
[POS]:    Command layer - maps subcommands onto adapter calls
[UPDATE]: When adding new subcommands
*/

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use emx_adapter::{Channel, EmxClient, EmxError, FillsQuery, OrdersQuery, WebSocketMessage};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::CliConfig;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List contracts
    Contracts {
        /// Only contracts that are currently trading
        #[arg(long)]
        active: bool,
    },
    /// Contract details
    Contract { code: String },
    /// Best bid and ask
    Quote { code: String },
    /// Order book snapshot
    Book { code: String },
    /// Funding rate history
    Funding { code: String },
    /// 24h summary
    Summary { code: String },
    /// Trader accounts of the current user
    Accounts,
    /// Balances of one trader account
    Balances { trader_id: String },
    /// Open positions
    Positions,
    /// Recent fills
    Fills {
        #[arg(long = "contract")]
        contract: Option<String>,
    },
    /// Orders
    Orders {
        #[arg(long = "contract")]
        contract: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// API keys
    Keys,
    /// Cancel all open orders, optionally for one contract
    CancelAll {
        #[arg(long = "contract")]
        contract: Option<String>,
    },
    /// Subscribe and print messages until idle or interrupted
    Stream {
        #[arg(long = "contract", required = true)]
        contracts: Vec<String>,
        #[arg(long = "channel", required = true)]
        channels: Vec<Channel>,
    },
}

impl Command {
    pub fn is_stream(&self) -> bool {
        matches!(self, Command::Stream { .. })
    }
}

/// Run one command against the configured endpoints
pub async fn run(command: Command, config: &CliConfig, shutdown: CancellationToken) -> Result<()> {
    match command {
        Command::Stream { contracts, channels } => {
            stream(config, &contracts, &channels, shutdown).await
        }
        other => {
            let client = config.rest_client()?;
            let value = fetch(&other, &client).await?;
            println!("{}", render(&value)?);
            Ok(())
        }
    }
}

/// Execute a REST command and return its result as JSON
pub async fn fetch(command: &Command, client: &EmxClient) -> Result<Value> {
    debug!(?command, "executing command");
    match command {
        Command::Contracts { active: false } => {
            to_json(client.get_contracts().await.context("list contracts")?)
        }
        Command::Contracts { active: true } => to_json(
            client
                .get_active_contracts()
                .await
                .context("list active contracts")?,
        ),
        Command::Contract { code } => to_json(
            client
                .get_contract(code)
                .await
                .with_context(|| format!("get contract {code}"))?,
        ),
        Command::Quote { code } => to_json(
            client
                .get_contract_quote(code)
                .await
                .with_context(|| format!("get quote for {code}"))?,
        ),
        Command::Book { code } => to_json(
            client
                .get_contract_book(code)
                .await
                .with_context(|| format!("get book for {code}"))?,
        ),
        Command::Funding { code } => to_json(
            client
                .get_contract_funding(code)
                .await
                .with_context(|| format!("get funding for {code}"))?,
        ),
        Command::Summary { code } => to_json(
            client
                .get_contract_summary(code)
                .await
                .with_context(|| format!("get summary for {code}"))?,
        ),
        Command::Accounts => to_json(client.get_account().await.context("list accounts")?),
        Command::Balances { trader_id } => to_json(
            client
                .get_balances(trader_id)
                .await
                .with_context(|| format!("get balances for {trader_id}"))?,
        ),
        Command::Positions => to_json(client.get_positions().await.context("list positions")?),
        Command::Fills { contract } => {
            let query = FillsQuery {
                contract_code: contract.clone(),
                ..Default::default()
            };
            to_json(client.list_fills(&query).await.context("list fills")?)
        }
        Command::Orders { contract, status } => {
            let query = OrdersQuery {
                contract_code: contract.clone(),
                status: status.clone(),
                ..Default::default()
            };
            to_json(client.list_orders(&query).await.context("list orders")?)
        }
        Command::Keys => to_json(client.list_keys().await.context("list api keys")?),
        Command::CancelAll { contract } => to_json(
            client
                .cancel_all(contract.as_deref())
                .await
                .context("cancel all orders")?,
        ),
        Command::Stream { .. } => bail!("stream is not a REST command"),
    }
}

async fn stream(
    config: &CliConfig,
    contracts: &[String],
    channels: &[Channel],
    shutdown: CancellationToken,
) -> Result<()> {
    let mut ws = config.websocket()?;
    let url = config.ws_url();
    ws.connect(url)
        .await
        .with_context(|| format!("connect to {url}"))?;

    let codes: Vec<&str> = contracts.iter().map(String::as_str).collect();
    ws.subscribe(&codes, channels).await.context("subscribe")?;
    info!(contracts = ?codes, channels = ?channels, "streaming");

    let result = loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => None,
            message = ws.recv() => Some(message),
        };

        match next {
            None => {
                info!("stream interrupted");
                break Ok(());
            }
            Some(Ok(message)) => {
                if let Err(err) = print_message(&message) {
                    break Err(err);
                }
            }
            Some(Err(EmxError::Timeout { duration })) => {
                info!(?duration, "no messages, stopping stream");
                break Ok(());
            }
            Some(Err(err)) => break Err(err).context("receive message"),
        }
    };

    ws.close().await;
    result
}

fn print_message(message: &WebSocketMessage) -> Result<()> {
    println!("{}", render(&to_json(message)?)?);
    Ok(())
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).context("encode response")
}

/// Pretty-printed JSON text
pub fn render(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("render json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use emx_adapter::{ApiCredentials, ClientConfig};
    use serde_json::json;
    use tokio_test::assert_ok;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> EmxClient {
        EmxClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .unwrap()
            .with_credentials(ApiCredentials::new("key", "ZW14LXRlc3Qtc2VjcmV0").unwrap())
    }

    #[tokio::test]
    async fn test_fetch_active_contracts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/contracts/active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contracts": [{"contract_code": "BTCZ19", "tick_size": "0.5"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let value = assert_ok!(fetch(&Command::Contracts { active: true }, &client(&server)).await);
        assert_eq!(value[0]["contract_code"], "BTCZ19");
        assert_eq!(value[0]["tick_size"], "0.5");
    }

    #[tokio::test]
    async fn test_fetch_orders_with_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/orders"))
            .and(query_param("contract_code", "ETHH19"))
            .and(query_param("status", "accepted"))
            .and(header_exists("emx-access-sig"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orders": []})))
            .expect(1)
            .mount(&server)
            .await;

        let command = Command::Orders {
            contract: Some("ETHH19".to_string()),
            status: Some("accepted".to_string()),
        };
        let value = assert_ok!(fetch(&command, &client(&server)).await);
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_fetch_error_has_context() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/positions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad key"})))
            .mount(&server)
            .await;

        let err = fetch(&Command::Positions, &client(&server)).await.unwrap_err();
        assert_eq!(err.to_string(), "list positions");
        assert!(format!("{err:#}").contains("Authentication failed: bad key"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_stream() {
        let server = MockServer::start().await;
        let command = Command::Stream {
            contracts: vec!["BTCZ19".to_string()],
            channels: vec![Channel::Ticker],
        };
        assert!(command.is_stream());
        assert!(fetch(&command, &client(&server)).await.is_err());
    }

    #[test]
    fn test_render_is_pretty() {
        let text = assert_ok!(render(&json!({"a": 1})));
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }
}
