//! Output adapters for delivering the digest to a messaging channel

pub mod telegram;

pub use telegram::TelegramClient;

use crate::Result;
use async_trait::async_trait;
use movers_types::DeliveryReceipt;

/// Marker appended to a message cut at the channel limit
pub const TRUNCATION_MARKER: &str = "\n…(truncated)";

/// Characters reserved at the end of a truncated message for the marker
const TRUNCATION_RESERVE: usize = 20;

/// Messaging collaborator
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver `text` to `chat_id`, truncating to the channel limit first
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<DeliveryReceipt>;
}

/// Cut `text` to at most `limit` characters
///
/// Text within the limit is returned unchanged. Longer text keeps its first
/// `limit - 20` characters followed by [`TRUNCATION_MARKER`].
pub fn truncate_message(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let keep = limit.saturating_sub(TRUNCATION_RESERVE);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);

    if out.chars().count() > limit {
        // Only reachable for limits smaller than the marker itself
        out = out.chars().take(limit).collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate_message("hello", 4096), "hello");
        let exact = "x".repeat(4096);
        assert_eq!(truncate_message(&exact, 4096), exact);
    }

    #[test]
    fn test_long_text_truncated_with_marker() {
        let long = "a".repeat(5000);
        let out = truncate_message(&long, 4096);

        assert!(out.chars().count() <= 4096);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert!(out.starts_with(&"a".repeat(4076)));
        assert_eq!(out.chars().count(), 4076 + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Multi-byte emoji must not split or overcount
        let long = "📊".repeat(100);
        let out = truncate_message(&long, 64);
        assert!(out.chars().count() <= 64);
        assert!(out.starts_with(&"📊".repeat(44)));
    }

    #[test]
    fn test_tiny_limit_still_bounded() {
        let out = truncate_message("abcdefghijklmnopqrstuvwxyz", 5);
        assert_eq!(out.chars().count(), 5);
    }
}
