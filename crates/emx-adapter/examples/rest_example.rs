/*
[INPUT]:  API key and base64 secret from the environment
[OUTPUT]: Trader accounts and public contract data printed to stdout
[POS]:    Examples - REST usage
[UPDATE]: When REST API changes
*/

use emx_adapter::*;

/// Example: REST API basics
///
/// Reads `EMX_API_KEY` / `EMX_API_SECRET`; without them only the public
/// contract listing is fetched.
#[tokio::main]
async fn main() -> Result<()> {
    println!("=== EMX REST Example ===\n");

    let client = EmxClient::with_environment(ClientConfig::default(), Environment::Testnet)?;

    match client.get_active_contracts().await {
        Ok(contracts) => {
            println!("Active contracts: {}", contracts.len());
            for contract in contracts.iter().take(5) {
                println!("  {}", contract.contract_code);
            }
        }
        Err(err) => println!("Failed to fetch contracts: {err}"),
    }

    let (Ok(key), Ok(secret)) = (std::env::var("EMX_API_KEY"), std::env::var("EMX_API_SECRET"))
    else {
        println!("\nSet EMX_API_KEY and EMX_API_SECRET to query account data");
        return Ok(());
    };

    let client = client.with_credentials(ApiCredentials::new(key, &secret)?);
    match client.get_account().await {
        Ok(accounts) => {
            for account in accounts {
                println!("Trader {} ({})", account.trader_id, account.alias);
            }
        }
        Err(err) if err.is_auth_error() => println!("Credentials rejected: {err}"),
        Err(err) => println!("Request failed: {err}"),
    }

    Ok(())
}
