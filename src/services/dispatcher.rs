use futures::future::join_all;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};

use crate::channels::{Notification, NotificationChannel, NotificationKind};
use crate::clock::Clock;
use crate::models::form::{QuestionRequest, ReservationRequest};
use crate::models::notification::{
    ChannelResult, DispatchStatus, NotificationOutcome, ReservationDispatch,
};
use crate::services::time_parser::parse_reservation_time;

const SENT_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const ALL_DELIVERED_MESSAGE: &str = "all channels succeeded";
pub const DELIVERY_FAILED_MESSAGE: &str = "delivery failed";

/// Fans a notification out to every configured channel and folds the
/// per-channel results into one [`NotificationOutcome`].
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
    clock: Arc<dyn Clock>,
}

impl NotificationDispatcher {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>, clock: Arc<dyn Clock>) -> Self {
        if channels.is_empty() {
            warn!("Notification dispatcher created without channels; every dispatch will fail");
        }
        Self { channels, clock }
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|channel| channel.name()).collect()
    }

    /// Forward a student question to every channel
    pub async fn dispatch_question(&self, question: &QuestionRequest) -> NotificationOutcome {
        info!(
            "Dispatching question from {} to {} channels",
            question.student_name,
            self.channels.len()
        );

        let sent_at = self.clock.now().format(SENT_AT_FORMAT).to_string();
        let notification = question_message(question, &sent_at);
        self.dispatch(&notification).await
    }

    /// Forward a ride reservation to every channel.
    ///
    /// The requested time is normalized once so every channel shows the same
    /// pickup time and booking reference.
    pub async fn dispatch_reservation(&self, reservation: &ReservationRequest) -> ReservationDispatch {
        let parsed = parse_reservation_time(&reservation.requested_time, self.clock.as_ref());
        if parsed.is_defaulted() {
            warn!(
                "Could not parse requested time '{}' for {}, using current time",
                reservation.requested_time, reservation.customer_name
            );
        }

        let normalized_time = parsed.normalized_text();
        let reference = booking_reference(&reservation.customer_name, &normalized_time);

        info!(
            "Dispatching reservation {} for {} at {}",
            reference, reservation.customer_name, normalized_time
        );

        let sent_at = self.clock.now().format(SENT_AT_FORMAT).to_string();
        let notification = reservation_message(reservation, &normalized_time, &reference, &sent_at);
        let outcome = self.dispatch(&notification).await;

        ReservationDispatch {
            outcome,
            booking_reference: reference,
            normalized_time,
            time_defaulted: parsed.is_defaulted(),
        }
    }

    /// Send one notification through every channel.
    ///
    /// Sends run concurrently; results keep channel order. A failing channel
    /// never prevents the others from being attempted.
    pub async fn dispatch(&self, notification: &Notification) -> NotificationOutcome {
        let sends = self.channels.iter().map(|channel| async move {
            let delivered = channel.send(notification).await;
            ChannelResult {
                channel: channel.name().to_string(),
                delivered,
            }
        });

        let outcome = aggregate(join_all(sends).await);

        info!(
            "Dispatch finished with status {:?}: {}",
            outcome.status, outcome.message
        );

        outcome
    }
}

/// Fold per-channel results into an outcome.
///
/// Partial delivery counts as success; the message names the channels that
/// delivered.
pub fn aggregate(results: Vec<ChannelResult>) -> NotificationOutcome {
    let (status, message) = {
        let delivered: Vec<&str> = results
            .iter()
            .filter(|result| result.delivered)
            .map(|result| result.channel.as_str())
            .collect();

        if delivered.is_empty() {
            (DispatchStatus::Failed, DELIVERY_FAILED_MESSAGE.to_string())
        } else if delivered.len() == results.len() {
            (DispatchStatus::Delivered, ALL_DELIVERED_MESSAGE.to_string())
        } else {
            (DispatchStatus::Partial, format!("{} only", delivered.join(", ")))
        }
    };

    NotificationOutcome {
        success: status != DispatchStatus::Failed,
        status,
        message,
        channels: results,
    }
}

/// Display-only six digit reference derived from the customer name and the
/// normalized time. Stable across processes; not unique.
pub fn booking_reference(customer_name: &str, normalized_time: &str) -> String {
    let digest = Sha256::digest(format!("{}{}", customer_name, normalized_time).as_bytes());

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);

    format!("{:06}", u64::from_be_bytes(prefix) % 1_000_000)
}

pub fn question_message(question: &QuestionRequest, sent_at: &str) -> Notification {
    Notification {
        kind: NotificationKind::Question,
        text: format!(
            "📚 New study question\n\n\
             Student: {}\n\
             Kakao ID: {}\n\
             Question: {}\n\n\
             Sent at: {}",
            question.student_name, question.kakao_id, question.question, sent_at
        ),
    }
}

pub fn reservation_message(
    reservation: &ReservationRequest,
    normalized_time: &str,
    reference: &str,
    sent_at: &str,
) -> Notification {
    Notification {
        kind: NotificationKind::Reservation,
        text: format!(
            "🚕 New ride reservation\n\n\
             Booking reference: {}\n\
             Customer: {}\n\
             Pickup time: {}\n\
             Departure: {}\n\
             Destination: {}\n\n\
             Sent at: {}",
            reference,
            reservation.customer_name,
            normalized_time,
            reservation.departure,
            reservation.destination,
            sent_at
        ),
    }
}
