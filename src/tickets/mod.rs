//! Support ticket desk
//!
//! Files and tracks support tickets. Every submission is classified for
//! urgency before it is persisted, so routing never sees an unscored ticket.

pub mod store;
pub use store::{InMemoryTicketStore, TicketStore};

use crate::error::SupportError;
use crate::models::{Ticket, TicketDraft, TicketStatus};
use crate::urgency::UrgencyClassifier;
use crate::Result;
use chrono::{Local, Utc};
use tracing::{debug, info};
use uuid::Uuid;

/// Front desk for the ticket flow: validation, urgency classification,
/// persistence and status tracking.
pub struct TicketDesk {
    store: Box<dyn TicketStore>,
}

impl TicketDesk {
    pub fn new(store: Box<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// File a new ticket. The urgency level is derived from the category,
    /// subcategory and local submission time before the ticket is stored.
    pub async fn submit(&self, draft: TicketDraft) -> Result<Ticket> {
        if draft.category.trim().is_empty() {
            return Err(SupportError::InvalidInput(
                "category must not be empty".to_string(),
            ));
        }
        if draft.description.trim().is_empty() {
            return Err(SupportError::InvalidInput(
                "description must not be empty".to_string(),
            ));
        }

        let urgency = UrgencyClassifier::classify_at(
            &draft.category,
            &draft.sub_category,
            Local::now().naive_local(),
        );

        let now = Utc::now();
        let ticket = Ticket {
            ticket_id: Uuid::new_v4(),
            customer_id: draft.customer_id,
            category: draft.category,
            sub_category: draft.sub_category,
            description: draft.description,
            attachments: draft.attachments,
            urgency,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        };

        info!(
            ticket_id = ?ticket.ticket_id,
            category = %ticket.category,
            urgency = %ticket.urgency,
            "Ticket filed"
        );

        self.store.persist_ticket(ticket.clone()).await?;

        Ok(ticket)
    }

    pub async fn ticket(&self, ticket_id: Uuid) -> Result<Ticket> {
        self.store
            .load_ticket(ticket_id)
            .await?
            .ok_or(SupportError::TicketNotFound(ticket_id))
    }

    pub async fn tickets_for_customer(&self, customer_id: Uuid) -> Result<Vec<Ticket>> {
        self.store.list_for_customer(customer_id).await
    }

    pub async fn set_status(&self, ticket_id: Uuid, status: TicketStatus) -> Result<Ticket> {
        debug!(ticket_id = ?ticket_id, status = %status, "Updating ticket status");
        self.store.update_status(ticket_id, status).await
    }
}
