//! Matrix synchronization and inbound event handling.
//!
//! [`MatrixSync::sync`] catches up once before listening (so commands sent
//! while the bot was offline are not replayed into running games), then
//! enters the continuous sync loop, persisting the sync token after every
//! batch. Invitations are accepted automatically; only text messages from
//! joined rooms reach the message callback.

use std::sync::Arc;

use anyhow::Result;
use log::{error, info, warn};
use matrix_sdk::{
    Client, LoopCtrl, Room, RoomState,
    config::SyncSettings,
    ruma::{
        api::client::filter::FilterDefinition,
        events::room::{
            member::StrippedRoomMemberEvent,
            message::{MessageType, OriginalSyncRoomMessageEvent},
        },
    },
};
use tokio::time::{Duration, sleep};

use crate::matrix::session::SessionStore;

/// Drives the sync loop for one client.
pub struct MatrixSync {
    client: Client,
    store: SessionStore,
}

impl MatrixSync {
    pub fn new(client: &Client, store: &SessionStore) -> Self {
        MatrixSync {
            client: client.to_owned(),
            store: store.to_owned(),
        }
    }

    /// Runs the sync loop, forwarding each inbound text message to
    /// `on_message` as `(body, room_id, sender_id, display_name)`.
    pub async fn sync<F>(&self, on_message: F) -> Result<()>
    where
        F: Fn(String, String, String, String) + Send + Sync + 'static + Clone,
    {
        info!("start syncing");

        // Auto join rooms when invited
        self.client.add_event_handler(auto_join_rooms);

        // Enable room members lazy-loading
        // See <https://spec.matrix.org/v1.6/client-server-api/#lazy-loading-room-members>.
        let filter = FilterDefinition::with_lazy_loading();
        let mut sync_settings = SyncSettings::default().filter(filter.into());
        if let Some(token) = self.store.sync_token() {
            sync_settings = sync_settings.token(token);
        }

        // Catch up before registering the message handler; everything in
        // this first batch stays unprocessed.
        let response = loop {
            match self.client.sync_once(sync_settings.clone()).await {
                Ok(response) => break response,
                Err(error) => {
                    error!("initial sync failed: {error}, retrying");
                    sleep(Duration::from_secs(2)).await;
                }
            }
        };
        if let Err(err) = self.store.persist_sync_token(response.next_batch.clone()).await {
            error!("failed to persist sync token: {:?}", err);
        }

        let on_message = Arc::new(on_message);
        self.client.add_event_handler({
            let on_message = Arc::clone(&on_message);
            move |event: OriginalSyncRoomMessageEvent, room: Room, client: Client| {
                let on_message = Arc::clone(&on_message);
                async move { on_room_message(event, room, client, &on_message).await }
            }
        });

        // Hand the bootstrap token to the continuous loop and keep
        // persisting it after every batch.
        sync_settings = sync_settings.token(response.next_batch);
        self.client
            .sync_with_result_callback(sync_settings, |sync_result| async move {
                let response = sync_result?;
                if let Err(err) = self.store.persist_sync_token(response.next_batch).await {
                    error!("failed to persist sync token: {:?}", err);
                }
                Ok(LoopCtrl::Continue)
            })
            .await?;

        Ok(())
    }
}

/// Joins a room as soon as the bot is invited.
///
/// Retries with backoff; see <https://github.com/matrix-org/synapse/issues/4345>
/// for why the invite can arrive before the join is possible.
async fn auto_join_rooms(room_member: StrippedRoomMemberEvent, client: Client, room: Room) {
    let Some(user_id) = client.user_id() else {
        warn!("could not get user id from client");
        return;
    };

    // Ignore if the invite is not for us
    if room_member.state_key != user_id {
        return;
    }

    tokio::spawn(async move {
        info!("auto joining room {}", room.room_id());
        let mut delay = 2;

        while let Err(err) = room.join().await {
            error!(
                "failed to join room {} ({err:?}), retrying in {delay}s",
                room.room_id()
            );

            sleep(Duration::from_secs(delay)).await;
            delay *= 2;

            if delay > 3600 {
                error!("can't join room {} ({err:?})", room.room_id());
                return;
            }
        }
        info!("successfully joined room {}", room.room_id());
    });
}

/// Surfaces a text message to the callback, with the sender's current
/// display name resolved (falling back to the localpart).
async fn on_room_message<F>(
    event: OriginalSyncRoomMessageEvent,
    room: Room,
    client: Client,
    on_message: &Arc<F>,
) where
    F: Fn(String, String, String, String) + Send + Sync + 'static,
{
    // Ignore messages from non-joined rooms
    if room.state() != RoomState::Joined {
        return;
    }

    // Never react to our own messages
    if client.user_id().is_some_and(|us| us == event.sender) {
        return;
    }

    // Only handle text messages
    let MessageType::Text(text_content) = event.content.msgtype else {
        return;
    };

    let display_name = match room.get_member(&event.sender).await {
        Ok(Some(member)) => member.display_name().map(ToOwned::to_owned),
        Ok(None) => None,
        Err(e) => {
            warn!("could not fetch member {}: {:?}", event.sender, e);
            None
        }
    }
    .unwrap_or_else(|| event.sender.localpart().to_owned());

    on_message(
        text_content.body,
        room.room_id().to_string(),
        event.sender.to_string(),
        display_name,
    );
}
