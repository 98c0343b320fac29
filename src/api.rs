//! REST API Server for the Banking Support Core
//!
//! Exposes the ticket desk via HTTP endpoints.
//! Liveness sessions are deliberately not exposed here: camera frames are an
//! in-process contract with the analysis pipeline, not a wire format.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

use crate::error::SupportError;
use crate::models::{Attachment, TicketDraft, TicketStatus};
use crate::tickets::TicketDesk;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitTicketRequest {
    /// Free-form customer reference; resolved to a stable uuid.
    pub customer_ref: Option<String>,
    pub category: String,
    pub sub_category: String,
    pub description: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub desk: Arc<TicketDesk>,
}

/// =============================
/// Helpers — Parsing
/// =============================

fn parse_status(status: &str) -> Option<TicketStatus> {
    match status.to_lowercase().as_str() {
        "open" => Some(TicketStatus::Open),
        "in_progress" | "in-progress" => Some(TicketStatus::InProgress),
        "resolved" => Some(TicketStatus::Resolved),
        "closed" => Some(TicketStatus::Closed),
        _ => None,
    }
}

fn stable_uuid_from_string(input: &str) -> Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

fn parse_or_stable_uuid(value: Option<&str>, fallback_seed: &str) -> Uuid {
    match value {
        Some(v) if !v.trim().is_empty() => {
            Uuid::parse_str(v).unwrap_or_else(|_| stable_uuid_from_string(v))
        }
        _ => stable_uuid_from_string(fallback_seed),
    }
}

fn error_response(error: SupportError) -> (StatusCode, Json<ApiResponse>) {
    let status = match &error {
        SupportError::InvalidInput(_) | SupportError::InvalidTimestamp(_) => {
            StatusCode::BAD_REQUEST
        }
        SupportError::TicketNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ApiResponse::error(error.to_string())))
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Ticket Endpoints
/// =============================

async fn submit_ticket(
    State(state): State<ApiState>,
    Json(req): Json<SubmitTicketRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!(category = %req.category, "Received ticket submission");

    let customer_id = parse_or_stable_uuid(req.customer_ref.as_deref(), "anonymous-customer");

    let draft = TicketDraft {
        customer_id,
        category: req.category,
        sub_category: req.sub_category,
        description: req.description,
        attachments: req.attachments,
    };

    match state.desk.submit(draft).await {
        Ok(ticket) => (StatusCode::CREATED, Json(ApiResponse::success(ticket))),
        Err(e) => error_response(e),
    }
}

async fn get_ticket(
    State(state): State<ApiState>,
    Path(ticket_id): Path<Uuid>,
) -> (StatusCode, Json<ApiResponse>) {
    match state.desk.ticket(ticket_id).await {
        Ok(ticket) => (StatusCode::OK, Json(ApiResponse::success(ticket))),
        Err(e) => error_response(e),
    }
}

async fn list_customer_tickets(
    State(state): State<ApiState>,
    Path(customer_ref): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    let customer_id = parse_or_stable_uuid(Some(&customer_ref), "anonymous-customer");

    match state.desk.tickets_for_customer(customer_id).await {
        Ok(tickets) => (StatusCode::OK, Json(ApiResponse::success(tickets))),
        Err(e) => error_response(e),
    }
}

async fn update_ticket_status(
    State(state): State<ApiState>,
    Path(ticket_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let Some(status) = parse_status(&req.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "Unknown ticket status: {}",
                req.status
            ))),
        );
    };

    match state.desk.set_status(ticket_id, status).await {
        Ok(ticket) => (StatusCode::OK, Json(ApiResponse::success(ticket))),
        Err(e) => error_response(e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(desk: Arc<TicketDesk>) -> Router {
    let state = ApiState { desk };

    Router::new()
        .route("/health", get(health))
        .route("/api/tickets", post(submit_ticket))
        .route("/api/tickets/:id", get(get_ticket))
        .route("/api/tickets/:id/status", post(update_ticket_status))
        .route("/api/customers/:customer/tickets", get(list_customer_tickets))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    desk: Arc<TicketDesk>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(desk);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("open"), Some(TicketStatus::Open));
        assert_eq!(parse_status("In-Progress"), Some(TicketStatus::InProgress));
        assert_eq!(parse_status("RESOLVED"), Some(TicketStatus::Resolved));
        assert_eq!(parse_status("archived"), None);
    }

    #[test]
    fn test_stable_uuid_is_deterministic() {
        let a = stable_uuid_from_string("customer-42");
        let b = stable_uuid_from_string("customer-42");
        let c = stable_uuid_from_string("customer-43");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.get_version_num(), 4);
    }

    #[test]
    fn test_parse_or_stable_uuid_accepts_literal_uuids() {
        let literal = Uuid::new_v4();
        assert_eq!(
            parse_or_stable_uuid(Some(&literal.to_string()), "fallback"),
            literal
        );
        assert_eq!(
            parse_or_stable_uuid(None, "fallback"),
            stable_uuid_from_string("fallback")
        );
    }
}
