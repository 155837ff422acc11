use serde::{Deserialize, Serialize};

/// A student's question to be forwarded to the course operator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuestionRequest {
    pub student_name: String,
    pub kakao_id: String,
    pub question: String,
}

impl QuestionRequest {
    pub fn validate(&self) -> Result<(), String> {
        if [&self.student_name, &self.kakao_id, &self.question]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err("all fields are required".to_string());
        }
        Ok(())
    }
}

/// A ride-booking request. `requested_time` is free text typed by the customer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReservationRequest {
    pub customer_name: String,
    #[serde(default)]
    pub requested_time: String,
    pub departure: String,
    pub destination: String,
}

impl ReservationRequest {
    // The time field is never validated; unparseable text falls back to the current time
    pub fn validate(&self) -> Result<(), String> {
        if [&self.customer_name, &self.departure, &self.destination]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err("customer name, departure and destination are required".to_string());
        }
        Ok(())
    }
}
