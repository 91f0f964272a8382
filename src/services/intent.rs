/// Booking-intent classification is pluggable: the augmentation pipeline only
/// asks "is this exchange steering toward scheduling an appointment?". The
/// keyword baseline below is deliberately simple; a model-backed detector can
/// be swapped in without touching the pipeline.
pub trait IntentDetector: Send + Sync {
    fn booking_intent(&self, reply_text: &str, last_user_message: Option<&str>) -> bool;
}

const REPLY_KEYWORDS: &[&str] = &[
    "schedule",
    "appointment",
    "book a time",
    "booking",
    "available times",
    "time slot",
    "pick a time",
    "come in for a visit",
];

const USER_KEYWORDS: &[&str] = &["book", "appointment", "schedule", "reschedule"];

pub struct KeywordIntentDetector;

impl IntentDetector for KeywordIntentDetector {
    fn booking_intent(&self, reply_text: &str, last_user_message: Option<&str>) -> bool {
        let reply = reply_text.to_lowercase();
        if REPLY_KEYWORDS.iter().any(|k| reply.contains(k)) {
            return true;
        }

        if let Some(user) = last_user_message {
            let user = user.to_lowercase();
            return USER_KEYWORDS.iter().any(|k| user.contains(k));
        }

        false
    }
}
