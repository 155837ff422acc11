use axum::{
    extract::{rejection::JsonRejection, Json as ExtractJson, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::chat::{ChatRequest, ChatResponse};
use crate::models::common::ErrorResponse;
use crate::models::form::{QuestionRequest, ReservationRequest};
use crate::models::notification::{NotificationOutcome, ReservationDispatch};
use crate::services::chat::{ChatError, ChatReply, ChatService, WELCOME_MESSAGE};
use crate::services::dispatcher::NotificationDispatcher;

// AppState struct containing shared resources
pub struct AppState {
    pub dispatcher: NotificationDispatcher,
    // None when no inference provider is configured
    pub chat: Option<ChatService>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

// Malformed or incomplete JSON is reported like any other validation failure
fn parse_body<T>(payload: Result<ExtractJson<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(ExtractJson(body)) => Ok(body),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(api_error(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}

// Question form submission
pub async fn submit_question(
    State(state): State<Arc<AppState>>,
    payload: Result<ExtractJson<QuestionRequest>, JsonRejection>,
) -> Result<Json<NotificationOutcome>, ApiError> {
    let question = parse_body(payload)?;
    info!("Received question from student: {}", question.student_name);

    if let Err(message) = question.validate() {
        warn!("Rejected question submission: {}", message);
        return Err(api_error(StatusCode::BAD_REQUEST, message));
    }

    let outcome = state.dispatcher.dispatch_question(&question).await;
    if !outcome.success {
        error!("Question from {} was not delivered", question.student_name);
    }

    Ok(Json(outcome))
}

// Ride reservation form submission
pub async fn submit_reservation(
    State(state): State<Arc<AppState>>,
    payload: Result<ExtractJson<ReservationRequest>, JsonRejection>,
) -> Result<Json<ReservationDispatch>, ApiError> {
    let reservation = parse_body(payload)?;
    info!(
        "Received reservation for {} (requested time: '{}')",
        reservation.customer_name, reservation.requested_time
    );

    if let Err(message) = reservation.validate() {
        warn!("Rejected reservation submission: {}", message);
        return Err(api_error(StatusCode::BAD_REQUEST, message));
    }

    let dispatch = state.dispatcher.dispatch_reservation(&reservation).await;
    if !dispatch.outcome.success {
        error!(
            "Reservation {} for {} was not delivered",
            dispatch.booking_reference, reservation.customer_name
        );
    }

    Ok(Json(dispatch))
}

// One chat turn against the course assistant
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<ExtractJson<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = parse_body(payload)?;
    let Some(chat) = state.chat.as_ref() else {
        warn!("Chat request received but no inference provider is configured");
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "the assistant is not configured",
        ));
    };

    match chat.respond(&request.messages).await {
        Ok(ChatReply::Answer(reply)) => Ok(Json(ChatResponse {
            reply,
            retry_later: false,
        })),
        Ok(ChatReply::RetryLater(reply)) => Ok(Json(ChatResponse {
            reply,
            retry_later: true,
        })),
        Err(ChatError::NoMaterials) => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "course materials are not loaded",
        )),
        Err(err @ ChatError::NoUserPrompt) => {
            Err(api_error(StatusCode::BAD_REQUEST, err.to_string()))
        }
        // Details are already logged by the chat service
        Err(ChatError::Inference(_)) => Err(api_error(
            StatusCode::BAD_GATEWAY,
            "the assistant could not answer right now",
        )),
    }
}

// Greeting shown before the first chat turn
pub async fn chat_welcome() -> Json<ChatResponse> {
    Json(ChatResponse {
        reply: WELCOME_MESSAGE.to_string(),
        retry_later: false,
    })
}
