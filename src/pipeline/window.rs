//! Conversation windowing: a bounded transcript from caller-owned history.

use super::{Role, Turn};

/// Number of turns (3 student/tutor exchanges) kept in the prompt. Older
/// turns are dropped, not summarized.
pub const HISTORY_WINDOW_TURNS: usize = 6;

/// Render the last [`HISTORY_WINDOW_TURNS`] turns as a newline-separated
/// transcript, preserving order. Pure; empty history renders empty.
pub fn window_history(history: &[Turn]) -> String {
    let start = history.len().saturating_sub(HISTORY_WINDOW_TURNS);
    history[start..]
        .iter()
        .map(|turn| match turn.role {
            Role::User => format!("Student: {}", turn.content),
            Role::Assistant => format!("Tutor: {}", turn.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
