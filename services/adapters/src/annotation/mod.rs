//! Annotation collaborator: short natural-language reasons per mover

pub mod openai;

pub use openai::{parse_reasons, OpenAiAnnotator};

use crate::Result;
use async_trait::async_trait;
use movers_types::{AnnotationInput, ReasonMap};

/// Longest reason kept from the service, in characters
pub const MAX_REASON_CHARS: usize = 60;

/// Reasons kept per symbol
pub const REASONS_PER_SYMBOL: usize = 2;

/// Black-box text generator over the fixed numeric schema
///
/// The returned map may omit symbols or carry fewer than two reasons; the
/// caller fills gaps from its deterministic fallback.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Annotate every item in one request
    async fn summarize(&self, items: &[AnnotationInput]) -> Result<ReasonMap>;
}
