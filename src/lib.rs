//! Assistant Relay Service
//!
//! Backend for a course-assistant chat and two intake forms. Chat turns are
//! answered by an LLM (Claude or Gemini) grounded in text extracted from
//! local PDF course materials. Question and ride-reservation submissions are
//! forwarded to operators over Telegram and KakaoTalk.
//!
//! # Modules
//!
//! - `services::time_parser`: best-effort parsing of human-entered reservation times
//! - `services::dispatcher`: multi-channel fan-out with partial-success aggregation
//! - `channels`: Telegram and KakaoTalk notification channels
//! - `inference`: Claude and Gemini completion clients
//! - `services::materials`: PDF text extraction for course materials
//!
//! # Delivery policy
//!
//! A dispatch is reported as successful when at least one channel delivered.
//! The outcome's status and message tell full delivery apart from partial.

pub mod channels;
pub mod clock;
pub mod config;
pub mod handlers;
pub mod inference;
pub mod models;
pub mod routes;
pub mod services;


// Re-export the main types for ease of use
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use handlers::api::AppState;
pub use routes::create_router;
pub use services::dispatcher::NotificationDispatcher;
pub use services::time_parser::{parse_reservation_time, TimeParse};
