use axum_test::{TestServer, TestServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::channels::NotificationChannel;
use crate::handlers::api::AppState;
use crate::inference::{InferenceError, MockInferenceClient};
use crate::routes::create_router;
use crate::services::chat::{ChatService, RATE_LIMIT_APOLOGY};
use crate::services::dispatcher::{booking_reference, NotificationDispatcher};
use crate::services::materials::CourseMaterials;
use crate::tests::fixtures::{fixed_clock, StubChannel};

/// API integration tests
#[cfg(test)]
mod api_tests {
    use super::*;

    fn materials() -> CourseMaterials {
        CourseMaterials {
            text: "\n[lecture01.pdf]\nScheduling basics\n\n".to_string(),
            file_count: 1,
            total_bytes: 1024,
        }
    }

    // Helper function to set up a test server with stub channels and an optional assistant
    fn setup_test_server(
        channels: &[Arc<StubChannel>],
        chat: Option<ChatService>,
        is_production: bool,
    ) -> TestServer {
        let channels: Vec<Arc<dyn NotificationChannel>> = channels
            .iter()
            .map(|channel| Arc::clone(channel) as Arc<dyn NotificationChannel>)
            .collect();

        let app_state = Arc::new(AppState {
            dispatcher: NotificationDispatcher::new(channels, fixed_clock()),
            chat,
        });

        let app = create_router(app_state, is_production);
        let config = TestServerConfig::builder().mock_transport().build();

        TestServer::new_with_config(app, config).unwrap()
    }

    fn chat_service(mock: MockInferenceClient) -> Option<ChatService> {
        Some(ChatService::new(Arc::new(mock), materials()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = setup_test_server(&[], None, false);

        let response = server.get("/health").await;
        assert_eq!(response.status_code().as_u16(), 200);
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_question_delivered_to_all_channels() {
        let telegram = StubChannel::new("telegram", true);
        let kakao = StubChannel::new("kakao", true);
        let server = setup_test_server(&[telegram.clone(), kakao.clone()], None, false);

        let response = server
            .post("/questions")
            .json(&json!({
                "student_name": "Kim Minji",
                "kakao_id": "minji_k",
                "question": "What is a page fault?",
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 200);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "delivered");
        assert_eq!(body["message"], "all channels succeeded");
        assert_eq!(telegram.attempts(), 1);
        assert_eq!(kakao.attempts(), 1);
    }

    #[tokio::test]
    async fn test_question_partial_delivery_reports_success() {
        let telegram = StubChannel::new("telegram", false);
        let kakao = StubChannel::new("kakao", true);
        let server = setup_test_server(&[telegram, kakao], None, false);

        let response = server
            .post("/questions")
            .json(&json!({
                "student_name": "Kim Minji",
                "kakao_id": "minji_k",
                "question": "What is a page fault?",
            }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "partial");
        assert_eq!(body["message"], "kakao only");
        assert_eq!(
            body["channels"],
            json!([
                {"channel": "telegram", "delivered": false},
                {"channel": "kakao", "delivered": true},
            ])
        );
    }

    #[tokio::test]
    async fn test_question_with_blank_field_is_rejected() {
        let telegram = StubChannel::new("telegram", true);
        let server = setup_test_server(&[telegram.clone()], None, false);

        let response = server
            .post("/questions")
            .json(&json!({
                "student_name": "Kim Minji",
                "kakao_id": "   ",
                "question": "What is a page fault?",
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 400);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "all fields are required");
        assert_eq!(telegram.attempts(), 0);
    }

    #[tokio::test]
    async fn test_reservation_dispatch() {
        let telegram = StubChannel::new("telegram", true);
        let kakao = StubChannel::new("kakao", false);
        let server = setup_test_server(&[telegram.clone(), kakao.clone()], None, false);

        let response = server
            .post("/reservations")
            .json(&json!({
                "customer_name": "Lee Jun",
                "requested_time": "2025.08.01 07:15",
                "departure": "Seoul Station",
                "destination": "Incheon Airport",
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 200);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "telegram only");
        assert_eq!(body["normalized_time"], "2025-08-01 07:15");
        assert_eq!(body["time_defaulted"], false);
        assert_eq!(
            body["booking_reference"],
            booking_reference("Lee Jun", "2025-08-01 07:15")
        );
        assert!(telegram
            .last_text()
            .unwrap()
            .contains("Pickup time: 2025-08-01 07:15"));
    }

    #[tokio::test]
    async fn test_reservation_with_free_text_time_falls_back_to_now() {
        let telegram = StubChannel::new("telegram", true);
        let server = setup_test_server(&[telegram], None, false);

        let response = server
            .post("/reservations")
            .json(&json!({
                "customer_name": "Lee Jun",
                "requested_time": "next tuesday",
                "departure": "Seoul Station",
                "destination": "Incheon Airport",
            }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["time_defaulted"], true);
        assert_eq!(body["normalized_time"], "2025-06-15 14:45");
    }

    #[tokio::test]
    async fn test_reservation_without_destination_is_rejected() {
        let server = setup_test_server(&[StubChannel::new("telegram", true)], None, false);

        let response = server
            .post("/reservations")
            .json(&json!({
                "customer_name": "Lee Jun",
                "requested_time": "2025-08-01 07:15",
                "departure": "Seoul Station",
                "destination": "",
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_reservation_missing_field_is_a_bad_request() {
        let telegram = StubChannel::new("telegram", true);
        let server = setup_test_server(&[telegram.clone()], None, false);

        let response = server
            .post("/reservations")
            .json(&json!({
                "customer_name": "Lee Jun",
                "requested_time": "2025-08-01 07:15",
                "departure": "Seoul Station",
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 400);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("destination"));
        assert_eq!(telegram.attempts(), 0);
    }

    #[tokio::test]
    async fn test_question_with_wrong_field_type_is_a_bad_request() {
        let server = setup_test_server(&[StubChannel::new("telegram", true)], None, false);

        let response = server
            .post("/questions")
            .json(&json!({
                "student_name": "Kim Minji",
                "kakao_id": 42,
                "question": "What is a page fault?",
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 400);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_reservation_every_channel_down() {
        let server = setup_test_server(
            &[
                StubChannel::new("telegram", false),
                StubChannel::new("kakao", false),
            ],
            None,
            false,
        );

        let response = server
            .post("/reservations")
            .json(&json!({
                "customer_name": "Lee Jun",
                "requested_time": "2025-08-01",
                "departure": "Seoul Station",
                "destination": "Incheon Airport",
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 200);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["message"], "delivery failed");
        assert_eq!(body["normalized_time"], "2025-08-01 14:45");
    }

    #[tokio::test]
    async fn test_chat_answer() {
        let mut mock = MockInferenceClient::new();
        mock.expect_complete()
            .times(1)
            .returning(|_, _| Ok("Round robin gives each process a time slice.".to_string()));

        let server = setup_test_server(&[], chat_service(mock), false);

        let response = server
            .post("/chat")
            .json(&json!({
                "messages": [{"role": "user", "content": "What is round robin?"}],
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 200);
        let body: Value = response.json();
        assert_eq!(body["reply"], "Round robin gives each process a time slice.");
        assert_eq!(body["retry_later"], false);
    }

    #[tokio::test]
    async fn test_chat_rate_limited() {
        let mut mock = MockInferenceClient::new();
        mock.expect_complete()
            .returning(|_, _| Err(InferenceError::RateLimited("rate_limit_exceeded".to_string())));

        let server = setup_test_server(&[], chat_service(mock), false);

        let response = server
            .post("/chat")
            .json(&json!({
                "messages": [{"role": "user", "content": "Hi"}],
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 200);
        let body: Value = response.json();
        assert_eq!(body["reply"], RATE_LIMIT_APOLOGY);
        assert_eq!(body["retry_later"], true);
    }

    #[tokio::test]
    async fn test_chat_inference_failure_hides_details() {
        let mut mock = MockInferenceClient::new();
        mock.expect_complete().returning(|_, _| {
            Err(InferenceError::Api {
                status: 401,
                body: "invalid x-api-key".to_string(),
            })
        });

        let server = setup_test_server(&[], chat_service(mock), false);

        let response = server
            .post("/chat")
            .json(&json!({
                "messages": [{"role": "user", "content": "Hi"}],
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 502);
        assert!(!response.text().contains("x-api-key"));
    }

    #[tokio::test]
    async fn test_chat_without_materials() {
        let mock = MockInferenceClient::new();
        let chat = Some(ChatService::new(Arc::new(mock), CourseMaterials::default()));
        let server = setup_test_server(&[], chat, false);

        let response = server
            .post("/chat")
            .json(&json!({
                "messages": [{"role": "user", "content": "Hi"}],
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 503);
        let body: Value = response.json();
        assert_eq!(body["message"], "course materials are not loaded");
    }

    #[tokio::test]
    async fn test_chat_without_provider() {
        let server = setup_test_server(&[], None, false);

        let response = server
            .post("/chat")
            .json(&json!({
                "messages": [{"role": "user", "content": "Hi"}],
            }))
            .await;

        assert_eq!(response.status_code().as_u16(), 503);
    }

    #[tokio::test]
    async fn test_chat_welcome() {
        let server = setup_test_server(&[], None, false);

        let response = server.get("/chat/welcome").await;
        let body: Value = response.json();
        assert!(body["reply"].as_str().unwrap().contains("AI teaching assistant"));
    }

    #[tokio::test]
    async fn test_samples_only_in_development() {
        let dev = setup_test_server(&[], None, false);
        let response = dev.get("/samples").await;
        assert_eq!(response.status_code().as_u16(), 200);
        let body: Value = response.json();
        assert_eq!(body["reservation_example"]["customer_name"], "Lee Jun");

        let prod = setup_test_server(&[], None, true);
        let response = prod.get("/samples").await;
        assert_eq!(response.status_code().as_u16(), 404);
    }
}
