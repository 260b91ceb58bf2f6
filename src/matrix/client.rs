//! Outbound Matrix client implementing the chat transport seam.

use log::{error, info, warn};
use matrix_sdk::{
    Client,
    ruma::{OwnedUserId, RoomId, UserId, events::room::message::RoomMessageEventContent},
};

use crate::{
    chat::ChatClient,
    matrix::{UserCredentials, session::SessionStore, sync::MatrixSync},
    players::PlayerIdentity,
};

/// Matrix-backed [`ChatClient`].
///
/// Logs in on first run and restores the persisted session afterwards.
/// Both transport operations hand the actual network send to a spawned
/// task; the game core never waits for delivery.
pub struct MatrixChatClient {
    client: Client,
    store: SessionStore,
}

impl MatrixChatClient {
    /// Creates the client, logging in or restoring the session persisted
    /// under `data_path`.
    pub async fn new(
        credentials: &UserCredentials,
        data_path: &str,
    ) -> Result<Self, anyhow::Error> {
        let store = SessionStore::new(data_path).await?;
        let user: OwnedUserId = credentials.user_id.clone().try_into()?;

        let client = Client::builder()
            .server_name(user.server_name())
            .sqlite_store(store.sqlite_path(), None)
            .build()
            .await?;

        if let Some(auth) = store.auth() {
            info!("restoring matrix session from disk");
            client.restore_session(auth.clone()).await?;
        } else {
            info!("logging in as {}", credentials.user_id);
            client
                .matrix_auth()
                .login_username(user, &credentials.password)
                .initial_device_display_name("blanks bot")
                .send()
                .await?;

            let auth = client
                .matrix_auth()
                .session()
                .ok_or_else(|| anyhow::anyhow!("login did not produce a session"))?;
            store.persist_auth(&auth).await?;
        }

        client.account().set_display_name(Some("Blanks")).await?;

        Ok(MatrixChatClient { client, store })
    }

    /// Starts the sync loop, invoking `on_message` with
    /// `(body, room_id, sender_id, display_name)` for each inbound text
    /// message. Runs until the sync fails fatally.
    pub async fn sync<F>(&self, on_message: F) -> Result<(), anyhow::Error>
    where
        F: Fn(String, String, String, String) + Send + Sync + 'static + Clone,
    {
        MatrixSync::new(&self.client, &self.store).sync(on_message).await
    }
}

impl ChatClient for MatrixChatClient {
    fn say(&self, channel: &str, text: &str) {
        let Ok(room_id) = RoomId::parse(channel) else {
            error!("cannot send to invalid room id {}", channel);
            return;
        };
        let Some(room) = self.client.get_room(&room_id) else {
            warn!("not joined to room {}", channel);
            return;
        };

        let content = RoomMessageEventContent::text_markdown(text);
        tokio::spawn(async move {
            if let Err(e) = room.send(content).await {
                error!("failed to send message to {}: {:?}", room.room_id(), e);
            }
        });
    }

    fn notice(&self, recipient: &PlayerIdentity, text: &str) {
        let Ok(user_id) = UserId::parse(recipient.to_string()) else {
            error!("cannot notice invalid user id {}", recipient);
            return;
        };

        let client = self.client.clone();
        let content = RoomMessageEventContent::text_markdown(text);
        tokio::spawn(async move {
            // Reuse the existing direct room, or open one on first contact.
            let room = match client.get_dm_room(&user_id) {
                Some(room) => room,
                None => match client.create_dm(&user_id).await {
                    Ok(room) => room,
                    Err(e) => {
                        error!("failed to open a direct room with {}: {:?}", user_id, e);
                        return;
                    }
                },
            };

            if let Err(e) = room.send(content).await {
                error!("failed to send notice to {}: {:?}", user_id, e);
            }
        });
    }
}
