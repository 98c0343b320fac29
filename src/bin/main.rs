use banking_support_core::{
    liveness::LivenessSession,
    models::{FaceMetrics, TicketDraft},
    tickets::{InMemoryTicketStore, TicketDesk},
};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Synthetic frame trickle: a left turn, a right turn, with enough distance
/// variation to pass the consistency check.
const DEMO_FRAMES: &[(f32, f32)] = &[
    (-20.0, 0.40),
    (-21.0, 0.50),
    (2.0, 0.60),
    (20.0, 0.45),
    (22.0, 0.55),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("Banking Support Core demo starting");

    // === Liveness session ===
    let session = LivenessSession::new();
    session.start().await;

    // Wait out the camera-settle delay before the first challenge activates.
    tokio::time::sleep(Duration::from_millis(1100)).await;

    println!("\n=== LIVENESS SESSION ===");
    for (yaw, distance) in DEMO_FRAMES {
        let state = session
            .process_frame(FaceMetrics {
                face_detected: true,
                head_yaw_angle: *yaw,
                face_distance: *distance,
            })
            .await;

        println!("frame yaw={:>6.1}° distance={:.2} -> {:?}", yaw, distance, state);
    }

    // === Ticket desk ===
    let desk = TicketDesk::new(Box::new(InMemoryTicketStore::new()));
    let customer_id = Uuid::new_v4();

    let outage = desk
        .submit(TicketDraft {
            customer_id,
            category: "IT Support".to_string(),
            sub_category: "System Outage".to_string(),
            description: "Mobile app shows a blank screen after login".to_string(),
            attachments: vec![],
        })
        .await?;

    let feedback = desk
        .submit(TicketDraft {
            customer_id,
            category: "Customer Support".to_string(),
            sub_category: "Feedback".to_string(),
            description: "The new statement layout is much easier to read".to_string(),
            attachments: vec![],
        })
        .await?;

    println!("\n=== TICKETS ===");
    for ticket in desk.tickets_for_customer(customer_id).await? {
        println!(
            "{} [{}] {} / {} -> {}",
            ticket.ticket_id, ticket.urgency, ticket.category, ticket.sub_category, ticket.status
        );
    }

    info!(
        outage_urgency = %outage.urgency,
        feedback_urgency = %feedback.urgency,
        "Demo complete"
    );

    Ok(())
}
