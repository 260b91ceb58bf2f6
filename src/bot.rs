//! Bot wiring: inbound messages → command parsing → session registry.
//!
//! The registry is the only shared mutable state. It lives behind one
//! async mutex and every inbound command is handled to completion under
//! that lock, so commands are processed strictly one at a time and no two
//! commands ever interleave against the same game. Outbound chat traffic
//! is fire-and-forget and happens outside the lock's critical path.

use std::path::PathBuf;
use std::sync::Arc;

use command_parser::Parser;
use log::{debug, warn};
use tokio::sync::Mutex;

use crate::{
    Args,
    commands::{Command, CommandParsingError},
    config::Config,
    matrix::{MatrixChatClient, UserCredentials},
    players::PlayerIdentity,
    registry::{CommandContext, SessionRegistry},
};

/// The running bot: one Matrix client, one session registry.
pub struct Bot {
    client: Arc<MatrixChatClient>,
    registry: Arc<Mutex<SessionRegistry<MatrixChatClient>>>,
}

impl Bot {
    /// Connects to Matrix (login or session restore) and sets up an empty
    /// registry.
    pub async fn new(config: Config, args: &Args) -> Result<Self, anyhow::Error> {
        let session_dir: PathBuf = [args.data.as_str(), "session"].iter().collect();
        tokio::fs::create_dir_all(&session_dir).await?;

        let client = Arc::new(
            MatrixChatClient::new(
                &UserCredentials {
                    user_id: config.matrix.user_id,
                    password: config.matrix.password,
                },
                &session_dir.to_string_lossy(),
            )
            .await?,
        );

        let registry = Arc::new(Mutex::new(SessionRegistry::new(
            Arc::clone(&client),
            config.game,
        )));

        Ok(Bot { client, registry })
    }

    /// Runs the sync loop until it fails fatally; each inbound message is
    /// handled in its own task.
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let registry = Arc::clone(&self.registry);
        let on_message =
            move |body: String, channel: String, sender_id: String, display_name: String| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    Self::handle_message(registry, body, channel, sender_id, display_name).await;
                });
            };

        self.client.sync(on_message).await
    }

    /// Processes one inbound message: parse it, derive the caller's
    /// identity, dispatch into the registry.
    ///
    /// Chatter that is no command — and `!`-commands of other bots — is
    /// dropped without a reply.
    async fn handle_message(
        registry: Arc<Mutex<SessionRegistry<MatrixChatClient>>>,
        body: String,
        channel: String,
        sender_id: String,
        display_name: String,
    ) {
        let parser = Parser::new('!', '-');
        let command = match Command::parse(&parser, &body) {
            Ok(command) => command,
            Err(CommandParsingError::Unknown) => {
                debug!("ignoring unknown command {:?} in {}", body, channel);
                return;
            }
            Err(CommandParsingError::NotACommand) => return,
        };

        let Some(identity) = PlayerIdentity::from_user_id(&sender_id) else {
            warn!("cannot derive an identity from sender {}", sender_id);
            return;
        };

        let ctx = CommandContext {
            channel,
            identity,
            display_name,
        };
        registry.lock().await.handle(&command, &ctx);
    }
}
