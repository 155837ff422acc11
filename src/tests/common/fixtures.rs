use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::channels::{ChannelError, Notification, NotificationChannel};
use crate::clock::FixedClock;
use crate::models::form::{QuestionRequest, ReservationRequest};

/// The instant every fixed-clock test runs at: 2025-06-15 14:45:30
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 15)
        .unwrap()
        .and_hms_opt(14, 45, 30)
        .unwrap()
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(fixed_now()))
}

/// Channel double that records every attempt and succeeds or fails on demand
pub struct StubChannel {
    name: String,
    succeed: bool,
    attempts: AtomicUsize,
    last_text: Mutex<Option<String>>,
}

impl StubChannel {
    pub fn new(name: &str, succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            succeed,
            attempts: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for StubChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn try_send(&self, notification: &Notification) -> Result<(), ChannelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(notification.text.clone());

        if self.succeed {
            Ok(())
        } else {
            Err(ChannelError::Api(format!("{} is down", self.name)))
        }
    }
}

pub fn sample_question() -> QuestionRequest {
    QuestionRequest {
        student_name: "Kim Minji".to_string(),
        kakao_id: "minji_k".to_string(),
        question: "What is a page fault?".to_string(),
    }
}

pub fn sample_reservation(requested_time: &str) -> ReservationRequest {
    ReservationRequest {
        customer_name: "Lee Jun".to_string(),
        requested_time: requested_time.to_string(),
        departure: "Seoul Station".to_string(),
        destination: "Incheon Airport".to_string(),
    }
}
