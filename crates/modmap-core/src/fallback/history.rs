//! Conversation history trimming for long investigations.

use crate::config::AgentLimits;

/// Bound history growth while keeping the original task framing.
///
/// Once `history` exceeds `limits.max_history_messages`, keep the first
/// message plus the most recent `limits.history_keep_recent`. Leading messages
/// of the recent window are dropped until `starts_turn` accepts one, so a
/// request/response pair is never split across the cut.
pub fn trim_history<T, F>(history: &mut Vec<T>, limits: &AgentLimits, starts_turn: F)
where
    F: Fn(&T) -> bool,
{
    if history.len() <= limits.max_history_messages {
        return;
    }
    let keep = limits.history_keep_recent.min(history.len() - 1);
    let mut cut = history.len() - keep;
    while cut < history.len() && !starts_turn(&history[cut]) {
        cut += 1;
    }
    history.drain(1..cut);
}
