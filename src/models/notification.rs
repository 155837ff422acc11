use serde::Serialize;

// Delivery result for one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelResult {
    pub channel: String,
    pub delivered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    /// Every channel delivered
    Delivered,
    /// Some but not all channels delivered
    Partial,
    /// No channel delivered
    Failed,
}

/// Aggregated result of one dispatch.
///
/// `success` is true for partial delivery as well; callers that need to tell
/// a degraded outcome apart must look at `status` or `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOutcome {
    pub success: bool,
    pub status: DispatchStatus,
    pub message: String,
    pub channels: Vec<ChannelResult>,
}

// Reservation dispatch also reports the values shown in the outbound message
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDispatch {
    #[serde(flatten)]
    pub outcome: NotificationOutcome,
    pub booking_reference: String,
    pub normalized_time: String,
    pub time_defaulted: bool,
}
