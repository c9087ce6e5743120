//! Reflection prompts and duration wording shown on the overlay.

/// Prompts shown during the pause, one per presentation.
pub const MINDFUL_PROMPTS: [&str; 20] = [
    "Is this a conscious choice?",
    "What are you avoiding right now?",
    "Take a deep breath.",
    "Will this bring you closer to your goals?",
    "How will you feel after spending time here?",
    "What could you be doing instead?",
    "Is this the best use of your time?",
    "Are you running toward something or away from something?",
    "What would your future self say?",
    "Is this scroll going to add value to your day?",
    "Pause. Breathe. Choose intentionally.",
    "What brought you here right now?",
    "Is this a habit or a decision?",
    "How much time do you want to spend here?",
    "Are you seeking connection or distraction?",
    "What do you really need right now?",
    "Is there something more meaningful calling you?",
    "This moment is a choice. Choose wisely.",
    "Breathe in possibility. Breathe out distraction.",
    "You are in control of your attention.",
];

/// Pick a prompt from a seed (the current epoch millis in practice).
pub fn prompt_for(seed: i64) -> &'static str {
    let index = seed.rem_euclid(MINDFUL_PROMPTS.len() as i64) as usize;
    MINDFUL_PROMPTS[index]
}

/// "1 second", "10 seconds".
pub fn format_seconds(seconds: u32) -> String {
    pluralize(seconds, "second")
}

/// "1 minute", "15 minutes".
pub fn format_minutes(minutes: u32) -> String {
    pluralize(minutes, "minute")
}

fn pluralize(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}
