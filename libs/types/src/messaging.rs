//! Messaging delivery types

use serde::{Deserialize, Serialize};

/// Acknowledgement returned by the messaging channel after `sendMessage`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Message id assigned by the channel
    pub message_id: Option<i64>,
    /// Chat the message landed in
    pub chat_id: Option<i64>,
    /// Characters actually sent (after truncation)
    pub chars_sent: usize,
}
