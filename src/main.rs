//! Send a single notification and report how the connection ended.

mod cli;

use std::time::Duration;

use clap::Parser;
use pushframe::{Connection, Notification, Payload};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let stream = TcpStream::connect(&cli.addr).await?;
    let mut conn = Connection::new(stream, 16)?;

    let notification = Notification::new(cli.token, cli.body)
        .with_priority(cli.priority)
        .with_expiration(cli.expiry);
    conn.submit(notification).await?;

    tokio::time::sleep(Duration::from_millis(cli.linger)).await;
    conn.disconnect().await;

    match conn.close_notifications().recv().await {
        Some(close) => {
            println!("connection ended: {}", close.error);
            if let Some(failed) = &close.error_payload {
                println!("rejected notification for token {}", failed.token());
            }
            println!("unsent notifications: {}", close.unsent_payloads.len());
        }
        None => println!("connection ended without a report"),
    }
    Ok(())
}
