//! Ticket persistence layer
//!
//! Responsible for storing and loading tickets.
//! Currently uses in-memory; can be replaced with a database-backed store.

use crate::error::SupportError;
use crate::models::{Ticket, TicketStatus};
use crate::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Trait for ticket persistence
#[async_trait::async_trait]
pub trait TicketStore: Send + Sync {
    async fn persist_ticket(&self, ticket: Ticket) -> Result<()>;
    async fn load_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>>;
    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Ticket>>;
    async fn update_status(&self, ticket_id: Uuid, status: TicketStatus) -> Result<Ticket>;
}

/// In-memory ticket store for development
pub struct InMemoryTicketStore {
    tickets: Arc<RwLock<HashMap<Uuid, Ticket>>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TicketStore for InMemoryTicketStore {

    async fn persist_ticket(&self, ticket: Ticket) -> Result<()> {
        let mut tickets = self.tickets.write().await;
        tickets.insert(ticket.ticket_id, ticket);
        Ok(())
    }

    async fn load_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>> {
        let tickets = self.tickets.read().await;
        Ok(tickets.get(&ticket_id).cloned())
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Ticket>> {
        let tickets = self.tickets.read().await;

        let mut items: Vec<Ticket> = tickets
            .values()
            .filter(|ticket| ticket.customer_id == customer_id)
            .cloned()
            .collect();

        // Sort by creation time ascending
        items.sort_by_key(|ticket| ticket.created_at);

        Ok(items)
    }

    async fn update_status(&self, ticket_id: Uuid, status: TicketStatus) -> Result<Ticket> {
        let mut tickets = self.tickets.write().await;

        let ticket = tickets
            .get_mut(&ticket_id)
            .ok_or(SupportError::TicketNotFound(ticket_id))?;

        ticket.status = status;
        ticket.updated_at = Utc::now();

        Ok(ticket.clone())
    }
}
