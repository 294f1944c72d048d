use serde::Deserialize;

// Enum-valued fields arrive as plain strings so that an unknown value is a
// field-level validation error rather than a body rejection.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub service: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub notes: Option<String>,

    pub booking_source: Option<String>,
    pub staff_assigned: Option<String>,
    pub customer_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub preferred_staff: Option<String>,
    pub service_preferences: Option<String>,
    pub allergic_reactions: Option<String>,
    pub skin_type: Option<String>,
    pub hair_type: Option<String>,

    pub call_id: Option<String>,
    pub call_transcript: Option<String>,
    pub call_summary: Option<String>,
    pub call_duration: Option<i64>,
    pub call_recording_url: Option<String>,
    pub call_status: Option<String>,
    pub call_outcome: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub rescheduling_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub actual_duration: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallUpdate {
    pub call_id: Option<String>,
    pub call_transcript: Option<String>,
    pub call_summary: Option<String>,
    pub call_duration: Option<i64>,
    pub call_recording_url: Option<String>,
    pub call_status: Option<String>,
    pub call_outcome: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub payment_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackUpdate {
    pub customer_satisfaction: Option<i64>,
    pub feedback: Option<String>,
    pub would_recommend: Option<bool>,
    pub revisit_intent: Option<String>,
}
