//! Chat transport seam.
//!
//! The game core never talks to Matrix directly; everything user-visible
//! goes through the [`ChatClient`] trait so the command logic can be tested
//! against a mock. Both operations are fire-and-forget: the implementation
//! is expected to dispatch the actual network send in the background, and
//! no caller ever waits for delivery.

use mockall::automock;

use crate::players::PlayerIdentity;

/// Outbound side of the chat transport.
#[automock]
pub trait ChatClient: Send + Sync {
    /// Posts `text` to a channel.
    fn say(&self, channel: &str, text: &str);

    /// Delivers `text` privately to one participant.
    fn notice(&self, recipient: &PlayerIdentity, text: &str);
}
