//! Player identity and per-game player state.
//!
//! A participant is identified by the stable `(account, host)` pair taken
//! from their Matrix user id. The display name shown in chat is cosmetic
//! and can change at any time, so it is deliberately not part of identity:
//! two commands from the same account and host must resolve to the same
//! [`PlayerRecord`] even if the sender renamed themselves in between.

use std::fmt;

use crate::game::cards::Hand;

/// Stable identity of a participant, independent of their display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerIdentity {
    /// Account part of the user id (the localpart of `@account:host`).
    pub account: String,
    /// Homeserver part of the user id.
    pub host: String,
}

impl PlayerIdentity {
    pub fn new(account: &str, host: &str) -> Self {
        PlayerIdentity {
            account: account.to_owned(),
            host: host.to_owned(),
        }
    }

    /// Splits a Matrix user id of the form `@account:host` into an identity.
    ///
    /// Returns `None` when the id is not in that shape; such senders cannot
    /// participate and their commands are dropped upstream.
    pub fn from_user_id(user_id: &str) -> Option<Self> {
        let rest = user_id.strip_prefix('@')?;
        let (account, host) = rest.split_once(':')?;
        if account.is_empty() || host.is_empty() {
            return None;
        }
        Some(PlayerIdentity::new(account, host))
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "@{}:{}", self.account, self.host)
    }
}

/// Mutable per-game state of one player.
///
/// Owned exclusively by the game session the player joined. There is at
/// most one record per [`PlayerIdentity`] within a session; records are
/// created on the join/start path and removed on the quit/stop path only.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    identity: PlayerIdentity,
    /// Name used when talking about this player in the channel.
    pub display_name: String,
    /// Answer cards currently held by this player.
    pub hand: Hand,
    /// Whether this player has submitted cards in the current round.
    pub has_played: bool,
    /// Whether this player judges the current round.
    pub is_round_judge: bool,
    /// Rounds won so far.
    pub score: u32,
    /// Completed rounds in a row this player sat out.
    pub idle_rounds: u32,
    /// Whether private messages to this player use decorated formatting.
    pub colors_enabled: bool,
}

impl PlayerRecord {
    pub fn new(identity: PlayerIdentity, display_name: &str) -> Self {
        PlayerRecord {
            identity,
            display_name: display_name.to_owned(),
            hand: Hand::default(),
            has_played: false,
            is_round_judge: false,
            score: 0,
            idle_rounds: 0,
            colors_enabled: true,
        }
    }

    /// The identity this record was created for. Immutable for the lifetime
    /// of the record.
    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    /// Identity equality check, ignoring the display name.
    pub fn is(&self, identity: &PlayerIdentity) -> bool {
        &self.identity == identity
    }
}

impl fmt::Display for PlayerRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} points)",
            self.display_name, self.identity, self.score
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_user_id() {
        let identity = PlayerIdentity::from_user_id("@alice:example.org").unwrap();
        assert_eq!(identity.account, "alice");
        assert_eq!(identity.host, "example.org");
    }

    #[test]
    fn test_from_user_id_invalid() {
        assert!(PlayerIdentity::from_user_id("alice:example.org").is_none());
        assert!(PlayerIdentity::from_user_id("@alice").is_none());
        assert!(PlayerIdentity::from_user_id("@:example.org").is_none());
        assert!(PlayerIdentity::from_user_id("@alice:").is_none());
    }

    #[test]
    fn test_identity_ignores_display_name() {
        let identity = PlayerIdentity::new("alice", "example.org");
        let mut record = PlayerRecord::new(identity.clone(), "Alice");
        record.display_name = "TotallyNotAlice".to_owned();

        assert!(record.is(&identity));
        assert!(!record.is(&PlayerIdentity::new("alice", "example.com")));
        assert!(!record.is(&PlayerIdentity::new("bob", "example.org")));
    }

    #[test]
    fn test_new_record_defaults() {
        let record = PlayerRecord::new(PlayerIdentity::new("bob", "example.org"), "Bob");

        assert_eq!(record.score, 0);
        assert_eq!(record.idle_rounds, 0);
        assert!(record.hand.is_empty());
        assert!(!record.has_played);
        assert!(!record.is_round_judge);
        assert!(record.colors_enabled);
    }

    #[test]
    fn test_identity_display() {
        let identity = PlayerIdentity::new("alice", "example.org");
        assert_eq!(identity.to_string(), "@alice:example.org");
    }
}
