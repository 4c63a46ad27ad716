//! Fixed reply texts.

/// Sent once to each member who joins the conversation.
pub const WELCOME_MESSAGE: &str = "Welcome to the dental office assistant! I can book an appointment, \
check availability, or answer questions about the practice. How can I help you today?";

/// Sent when neither an intent nor the knowledge base produced an answer.
pub const FALLBACK_MESSAGE: &str =
    "Sorry, I didn't quite get that. You can ask me to book an appointment, check availability, \
or ask a question about our office.";

/// Sent by the transport boundary when turn processing fails.
pub const ERROR_MESSAGE: &str = "Sorry, an error occurred. Please try again.";

/// Sent when a booking request carries no recognizable date or time.
pub const TIME_PROMPT_MESSAGE: &str =
    "What day and time would you like your appointment? For example: \"next Tuesday at 3pm\".";
