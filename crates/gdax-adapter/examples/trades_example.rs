/*
[INPUT]:  Product identifier (e.g., "BTC-USD") and page size
[OUTPUT]: Recent public trades, page by page
[POS]:    Examples - paginated public market data
[UPDATE]: When listing endpoints or cursor API change
*/

use gdax_adapter::*;
use tracing_subscriber::EnvFilter;

/// Example: walk the most recent trades of a product (no authentication required)
///
/// Run with `RUST_LOG=gdax_adapter=debug` to see each page fetch.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== GDAX Trades Example ===\n");

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };
    let client = match GdaxClient::with_config(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };

    let product_id = "BTC-USD";
    let mut cursor = client.list_trades(product_id, PaginationParams::new().with_limit(50));
    let mut trades: Vec<Trade> = Vec::new();

    // Three pages are plenty for a demo; the full history is very long.
    for _ in 0..3 {
        if !cursor.has_more() {
            break;
        }
        match cursor.next_page(&mut trades).await {
            Ok(()) => println!("✓ {} trades so far (next token: {:?})", trades.len(), cursor.after()),
            Err(e) if e.is_retryable() => {
                println!("✗ Retryable error, stopping here: {}", e);
                break;
            }
            Err(e) => {
                println!("✗ Error: {}", e);
                return;
            }
        }
    }

    for trade in trades.iter().take(5) {
        println!("  #{} {} {} @ {}", trade.trade_id, trade.side, trade.size, trade.price);
    }

    println!("\nResume later with: Cursor::resume(client, {:?}, &saved)", cursor.path());
    println!("Saved position: {:?}", cursor.params());
}
