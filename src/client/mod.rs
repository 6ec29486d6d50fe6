// Reply-completion backend
//
// The chat backend answers a user message with reply text and, optionally,
// its own stress level. `ReplyBackend` is the seam; `ReplyClient` is the
// HTTP implementation.

mod reply_client;
mod types;

pub use reply_client::ReplyClient;
pub use types::{ChatRequest, ChatResponse, ReplyCompletion};

use async_trait::async_trait;

use crate::errors::TurnError;

/// Anything that can complete a user message into an assistant reply
#[async_trait]
pub trait ReplyBackend: Send + Sync {
    /// Request a reply for one user message.
    ///
    /// Failures come back as `TransportFailure`, `ServerFailure` or
    /// `MalformedReply`; the caller turns them into fallback text.
    async fn complete(&self, message: &str) -> Result<ReplyCompletion, TurnError>;

    /// Short name for logs
    fn name(&self) -> &str;
}
