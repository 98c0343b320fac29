use banking_support_core::{
    api::start_server,
    tickets::{InMemoryTicketStore, TicketDesk},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("Banking Support Core - API Server");
    info!("Port: {}", api_port);

    // Create components
    let store = Box::new(InMemoryTicketStore::new());
    let desk = Arc::new(TicketDesk::new(store));

    info!("Ticket desk initialized");
    info!("Starting API server...");

    // Start API server
    start_server(desk, api_port).await?;

    Ok(())
}
