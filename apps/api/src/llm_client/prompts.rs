// Shared system instructions for chat calls.
// Feature prompts live next to the feature (see pitch::prompts).

/// System message for every career-coaching call.
pub const CAREER_COACH_SYSTEM: &str = "You are a helpful career coach.";
