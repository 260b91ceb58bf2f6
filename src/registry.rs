//! Session registry and command dispatcher.
//!
//! The registry maps each channel to at most one running [`Game`] — that is
//! its central invariant — and routes every parsed command to the right
//! session and the right player inside it. Each operation enforces its own
//! preconditions before anything is forwarded:
//!
//! - commands against a channel without a game get a single "no game
//!   running" notice and change nothing (`start` is the inverse: a second
//!   game on the same channel is refused with a notice);
//! - membership-gated commands (`stop`, `pause`, `resume`, `play`,
//!   `winner`, `cards`, `pick`, `nocolor`) from a caller who never joined
//!   are dropped silently — no notice, no mutation — so strangers cannot
//!   probe who is playing;
//! - argument validation belongs to the session; arguments are forwarded
//!   untouched.
//!
//! `pick` is the one state-dependent alias: depending on the session's
//! [`Phase`] it acts as `winner` or as `play`, so users don't need to know
//! which half of the round is running.
//!
//! Nothing here returns errors; every outcome is either a notice through
//! the [`ChatClient`] or a silent no-op (spelled out with a debug log).

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use crate::{
    chat::ChatClient,
    commands::Command,
    config::GameSettings,
    game::{Game, Phase},
    players::{PlayerIdentity, PlayerRecord},
    responses,
};

/// Everything known about an inbound command besides the command itself.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Channel the command was issued on.
    pub channel: String,
    /// Stable identity of the caller.
    pub identity: PlayerIdentity,
    /// Display name of the caller at the time of the command.
    pub display_name: String,
}

/// All running games, addressable by channel.
pub struct SessionRegistry<C: ChatClient> {
    client: Arc<C>,
    settings: GameSettings,
    games: HashMap<String, Game<C>>,
}

impl<C: ChatClient> SessionRegistry<C> {
    pub fn new(client: Arc<C>, settings: GameSettings) -> Self {
        SessionRegistry {
            client,
            settings,
            games: HashMap::new(),
        }
    }

    /// The session bound to `channel`, if any. Pure lookup.
    pub fn find_by_channel(&self, channel: &str) -> Option<&Game<C>> {
        self.games.get(channel)
    }

    /// Routes a parsed command to the matching operation.
    pub fn handle(&mut self, command: &Command, ctx: &CommandContext) {
        debug!(
            "dispatching {:?} from {} in {}",
            command, ctx.identity, ctx.channel
        );

        match command {
            Command::Start(args) => self.start(&ctx.channel, &ctx.identity, &ctx.display_name, args),
            Command::Stop => self.stop(&ctx.channel, &ctx.identity),
            Command::Pause => self.pause(&ctx.channel, &ctx.identity),
            Command::Resume => self.resume(&ctx.channel, &ctx.identity),
            Command::Join => self.join(&ctx.channel, &ctx.identity, &ctx.display_name),
            Command::Quit => self.quit(&ctx.channel, &ctx.identity),
            Command::Cards => self.cards(&ctx.channel, &ctx.identity),
            Command::Play(args) => self.play(&ctx.channel, &ctx.identity, args),
            Command::Winner(args) => self.winner(&ctx.channel, &ctx.identity, args),
            Command::Pick(args) => self.pick(&ctx.channel, &ctx.identity, args),
            Command::List => self.list(&ctx.channel),
            Command::Points => self.points(&ctx.channel),
            Command::Status => self.status(&ctx.channel),
            Command::Help => self.help(&ctx.channel),
            Command::NoColor => self.nocolor(&ctx.channel, &ctx.identity),
        }
    }

    /// Starts a game on `channel` with the caller as its first player.
    ///
    /// A channel with a running game keeps it untouched; the caller is told
    /// to `!join` instead.
    pub fn start(
        &mut self,
        channel: &str,
        who: &PlayerIdentity,
        display_name: &str,
        args: &[String],
    ) {
        if self.games.contains_key(channel) {
            self.client.say(channel, &responses::already_running());
            return;
        }

        info!("starting a game in {}", channel);
        let game = Game::new(channel, Arc::clone(&self.client), self.settings.clone(), args);
        self.games.insert(channel.to_owned(), game);
        if let Some(game) = self.games.get_mut(channel) {
            game.add_player(PlayerRecord::new(who.clone(), display_name));
        }
    }

    /// Stops the game and unregisters it, as one step — observers never see
    /// a stopped game that is still registered. Members only.
    pub fn stop(&mut self, channel: &str, who: &PlayerIdentity) {
        let Some(game) = self.member_game_mut(channel, who) else {
            return;
        };
        game.stop(who);
        self.games.remove(channel);
        info!("stopped and unregistered the game in {}", channel);
    }

    pub fn pause(&mut self, channel: &str, who: &PlayerIdentity) {
        if let Some(game) = self.member_game_mut(channel, who) {
            game.pause();
        }
    }

    pub fn resume(&mut self, channel: &str, who: &PlayerIdentity) {
        if let Some(game) = self.member_game_mut(channel, who) {
            game.resume();
        }
    }

    /// Adds the caller to the game. The only player command without a
    /// membership precondition.
    pub fn join(&mut self, channel: &str, who: &PlayerIdentity, display_name: &str) {
        let record = PlayerRecord::new(who.clone(), display_name);
        if let Some(game) = self.game_mut_or_notice(channel) {
            game.add_player(record);
        }
    }

    pub fn quit(&mut self, channel: &str, who: &PlayerIdentity) {
        if let Some(game) = self.game_mut_or_notice(channel) {
            game.remove_player(who);
        }
    }

    pub fn cards(&mut self, channel: &str, who: &PlayerIdentity) {
        if let Some(game) = self.member_game_mut(channel, who) {
            game.show_cards(who);
        }
    }

    pub fn play(&mut self, channel: &str, who: &PlayerIdentity, args: &[String]) {
        if let Some(game) = self.member_game_mut(channel, who) {
            game.play_card(args, who);
        }
    }

    pub fn winner(&mut self, channel: &str, who: &PlayerIdentity, args: &[String]) {
        if let Some(game) = self.member_game_mut(channel, who) {
            game.select_winner(args.first().map(String::as_str), who);
        }
        self.reap_if_ended(channel);
    }

    /// Phase-dependent alias: judging picks a winner, an open round plays
    /// cards, anything else is refused with a notice.
    pub fn pick(&mut self, channel: &str, who: &PlayerIdentity, args: &[String]) {
        let Some(game) = self.member_game_mut(channel, who) else {
            return;
        };

        match game.phase() {
            Phase::AwaitingJudgment => game.select_winner(args.first().map(String::as_str), who),
            Phase::AwaitingPlays => game.play_card(args, who),
            _ => {
                self.client.say(channel, &responses::pick_unavailable());
                return;
            }
        }
        self.reap_if_ended(channel);
    }

    pub fn list(&mut self, channel: &str) {
        if let Some(game) = self.game_mut_or_notice(channel) {
            game.list_players();
        }
    }

    pub fn points(&mut self, channel: &str) {
        if let Some(game) = self.game_mut_or_notice(channel) {
            game.show_points();
        }
    }

    pub fn status(&mut self, channel: &str) {
        if let Some(game) = self.game_mut_or_notice(channel) {
            game.show_status();
        }
    }

    pub fn help(&self, channel: &str) {
        self.client.say(channel, &responses::help_text());
    }

    /// Flips the caller's color preference and confirms privately. Unknown
    /// callers are a silent no-op like every other membership-gated command.
    pub fn nocolor(&mut self, channel: &str, who: &PlayerIdentity) {
        let Some(game) = self.game_mut_or_notice(channel) else {
            return;
        };
        let Some(record) = game.get_player_mut(who) else {
            debug!("color toggle from non-player {} in {}", who, channel);
            return;
        };

        record.colors_enabled = !record.colors_enabled;
        let text = if record.colors_enabled {
            responses::colors_on()
        } else {
            responses::colors_off()
        };
        self.client.notice(who, &text);
    }

    /// Looks up the game for `channel`, telling the channel there is none
    /// when the lookup fails.
    fn game_mut_or_notice(&mut self, channel: &str) -> Option<&mut Game<C>> {
        if !self.games.contains_key(channel) {
            self.client.say(channel, &responses::no_game_running());
            return None;
        }
        self.games.get_mut(channel)
    }

    /// Like [`Self::game_mut_or_notice`] but additionally requires the
    /// caller to be a player of that game; unknown callers are dropped
    /// without a notice.
    fn member_game_mut(&mut self, channel: &str, who: &PlayerIdentity) -> Option<&mut Game<C>> {
        let game = self.game_mut_or_notice(channel)?;
        if game.get_player(who).is_none() {
            debug!("{} is not a player in {}", who, channel);
            return None;
        }
        Some(game)
    }

    /// Unregisters a session that finished naturally, so it cannot block a
    /// later `!start`.
    fn reap_if_ended(&mut self, channel: &str) {
        if self
            .games
            .get(channel)
            .is_some_and(|game| game.phase() == Phase::Ended)
        {
            self.games.remove(channel);
            info!("game in {} finished and was unregistered", channel);
        }
    }
}
