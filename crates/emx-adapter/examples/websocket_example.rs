/*
[INPUT]:  API key and base64 secret from the environment
[OUTPUT]: Channel messages printed until the stream goes quiet
[POS]:    Examples - WebSocket stream handling
[UPDATE]: When WebSocket API changes
*/

use emx_adapter::*;

/// Example: subscribe to order and trade events for one contract
#[tokio::main]
async fn main() -> Result<()> {
    println!("=== EMX WebSocket Example ===\n");

    let mut ws = match (std::env::var("EMX_API_KEY"), std::env::var("EMX_API_SECRET")) {
        (Ok(key), Ok(secret)) => EmxWebSocket::with_credentials(ApiCredentials::new(key, &secret)?),
        _ => {
            println!("No credentials set, private channels will be rejected");
            EmxWebSocket::new()
        }
    };

    ws.connect_environment(Environment::Testnet).await?;
    ws.subscribe(&["ETHH19"], &[Channel::Orders, Channel::Trading])
        .await?;

    loop {
        match ws.recv().await {
            Ok(message) => println!("{message:?}"),
            Err(err) => {
                println!("{err}");
                break;
            }
        }
    }

    ws.close().await;
    Ok(())
}
