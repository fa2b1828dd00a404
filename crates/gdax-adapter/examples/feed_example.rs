/*
[INPUT]:  Feed URL and product identifiers
[OUTPUT]: Typed real-time events (level2 book, matches, heartbeats)
[POS]:    Examples - feed subscription and decoding
[UPDATE]: When feed API changes
*/

use gdax_adapter::feed::FeedConnection;
use gdax_adapter::*;
use tokio::time::{timeout, Duration};
use tracing_subscriber::EnvFilter;

/// Example: subscribe to the public feed and print a handful of events
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== GDAX Feed Example ===\n");

    let connection = match FeedConnection::connect(&FeedConfig::default()).await {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("Failed to connect: {}", e);
            return;
        }
    };
    println!("✓ Connected");

    let request = SubscribeRequest::subscribe(["BTC-USD"])
        .with_channel("heartbeat")
        .with_channel("level2")
        .with_channel("matches");
    if let Err(e) = connection.send(&request).await {
        eprintln!("Failed to subscribe: {}", e);
        return;
    }
    println!("✓ Subscribed\n");

    let mut reader = FeedReader::new(connection);
    for _ in 0..20 {
        let next = match timeout(Duration::from_secs(10), reader.next_event()).await {
            Ok(Some(next)) => next,
            Ok(None) => {
                println!("Feed closed");
                break;
            }
            Err(_) => {
                println!("No message within 10 seconds");
                break;
            }
        };

        match next {
            Ok(FeedEvent::Snapshot(book)) => println!(
                "snapshot {}: {} bids / {} asks",
                book.product_id,
                book.bids.len(),
                book.asks.len()
            ),
            Ok(FeedEvent::L2Update(update)) => {
                for change in &update.changes {
                    println!("l2update {} {} {} -> {}", update.product_id, change.side, change.price, change.size);
                }
            }
            Ok(FeedEvent::Match(trade)) => println!(
                "match #{} {} {} @ {}",
                trade.trade_id, trade.side, trade.size, trade.price
            ),
            Ok(FeedEvent::Error { message }) => {
                println!("feed error: {}", message);
                break;
            }
            Ok(other) => println!("{:?} (sequence {:?})", other.product_id(), other.sequence()),
            Err(e) => {
                println!("✗ Transport error: {}", e);
                break;
            }
        }
    }

    println!("\nSkipped {} undecodable frames", reader.skipped());
    reader.get_mut().close();
}
