//! One running game, bound to one channel.
//!
//! The session owns its players and the round machinery: dealing, collecting
//! plays, revealing them and letting the round judge pick a winner. All
//! argument validation for plays and winner picks happens here; the command
//! dispatcher forwards arguments untouched. Everything user-visible goes out
//! through the [`ChatClient`] seam.

use std::sync::Arc;

use log::debug;
use rand::seq::SliceRandom;

use crate::{
    chat::ChatClient,
    config::GameSettings,
    game::cards::{AnswerCard, Deck, PromptCard},
    players::{PlayerIdentity, PlayerRecord},
};

/// Stage of the round lifecycle a game is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not enough players yet; no round is running.
    Lobby,
    /// A prompt is out and plays are being collected.
    AwaitingPlays,
    /// All plays are in; the judge has to pick a winner.
    AwaitingJudgment,
    /// Suspended by `!pause`.
    Paused,
    /// Stopped or won; kept only until the registry drops the session.
    Ended,
}

/// One player's cards for the current round.
#[derive(Debug)]
struct Submission {
    identity: PlayerIdentity,
    cards: Vec<AnswerCard>,
}

/// A running game on a single channel.
pub struct Game<C: ChatClient> {
    channel: String,
    client: Arc<C>,
    settings: GameSettings,
    /// Score that ends the game, when given to `!start`.
    point_limit: Option<u32>,
    players: Vec<PlayerRecord>,
    deck: Deck,
    phase: Phase,
    /// Phase to restore on `!resume`.
    paused_phase: Option<Phase>,
    round: u32,
    prompt: Option<PromptCard>,
    submissions: Vec<Submission>,
    /// Players whose play is still outstanding this round.
    awaiting: Vec<PlayerIdentity>,
}

impl<C: ChatClient> Game<C> {
    /// Creates a game bound to `channel` and announces it.
    ///
    /// The first `args` entry is an optional point limit; anything
    /// unparsable is ignored and the game runs open-ended.
    pub fn new(channel: &str, client: Arc<C>, settings: GameSettings, args: &[String]) -> Self {
        let point_limit = args
            .first()
            .and_then(|a| a.parse::<u32>().ok())
            .filter(|&limit| limit > 0);

        let game = Game {
            channel: channel.to_owned(),
            client,
            settings,
            point_limit,
            players: Vec::new(),
            deck: Deck::builtin(),
            phase: Phase::Lobby,
            paused_phase: None,
            round: 0,
            prompt: None,
            submissions: Vec::new(),
            awaiting: Vec::new(),
        };

        match game.point_limit {
            Some(limit) => game.client.say(
                &game.channel,
                &format!(
                    "A new game of Blanks! First to {} points wins. Type `!join` to play.",
                    limit
                ),
            ),
            None => game
                .client
                .say(&game.channel, "A new game of Blanks! Type `!join` to play."),
        }

        game
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn current_prompt(&self) -> Option<&PromptCard> {
        self.prompt.as_ref()
    }

    pub fn get_player(&self, who: &PlayerIdentity) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.is(who))
    }

    pub fn get_player_mut(&mut self, who: &PlayerIdentity) -> Option<&mut PlayerRecord> {
        self.players.iter_mut().find(|p| p.is(who))
    }

    /// Adds a player to the game.
    ///
    /// A record whose identity is already registered is not duplicated: the
    /// existing record keeps its score and hand, only the display name is
    /// refreshed. Mid-round joiners are dealt in immediately and, while
    /// plays are still open, expected to play like everyone else.
    pub fn add_player(&mut self, record: PlayerRecord) {
        if let Some(existing) = self.players.iter_mut().find(|p| p.is(record.identity())) {
            existing.display_name = record.display_name.clone();
            let text = format!("{} is already in the game.", record.display_name);
            self.client.say(&self.channel, &text);
            return;
        }

        let mut record = record;
        if matches!(self.phase, Phase::AwaitingPlays | Phase::AwaitingJudgment) {
            Self::refill_hand(&mut record, &mut self.deck, self.settings.hand_size);
        }
        if self.phase == Phase::AwaitingPlays {
            self.awaiting.push(record.identity().clone());
        }

        let name = record.display_name.clone();
        self.players.push(record);
        self.client.say(
            &self.channel,
            &format!("{} has joined the game ({} players).", name, self.players.len()),
        );

        if self.phase == Phase::Lobby && self.players.len() >= self.settings.min_players {
            self.start_round();
        }
    }

    /// Removes a player, returning their cards to the deck. Unknown
    /// identities are a no-op.
    pub fn remove_player(&mut self, who: &PlayerIdentity) {
        let Some(index) = self.players.iter().position(|p| p.is(who)) else {
            debug!("quit from non-player {} in {}", who, self.channel);
            return;
        };

        let mut record = self.players.remove(index);
        self.deck.discard_answers(record.hand.surrender());
        self.awaiting.retain(|i| i != who);

        // An unrevealed submission goes back to the discards; revealed
        // entries keep their announced numbers even if the player leaves.
        if self.phase == Phase::AwaitingPlays {
            let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.submissions)
                .into_iter()
                .partition(|s| &s.identity == who);
            self.submissions = kept;
            for submission in gone {
                self.deck.discard_answers(submission.cards);
            }
        }

        self.client
            .say(&self.channel, &format!("{} has left the game.", record.display_name));

        if record.is_round_judge && matches!(self.phase, Phase::AwaitingPlays | Phase::AwaitingJudgment)
        {
            self.client
                .say(&self.channel, "The judge left; the round is abandoned.");
            self.abandon_round();
        } else if self.phase == Phase::AwaitingPlays {
            if self.players.len() < self.settings.min_players {
                self.client
                    .say(&self.channel, "Not enough players left to finish the round.");
                self.abandon_round();
            } else if self.awaiting.is_empty() {
                if self.submissions.is_empty() {
                    self.abandon_round();
                } else {
                    self.reveal_submissions();
                }
            }
        }
    }

    /// Plays the cards at the 1-based hand positions in `args`.
    pub fn play_card(&mut self, args: &[String], who: &PlayerIdentity) {
        if self.phase != Phase::AwaitingPlays {
            self.client
                .say(&self.channel, "Cards cannot be played right now.");
            return;
        }
        let Some(index) = self.players.iter().position(|p| p.is(who)) else {
            debug!("play from unknown player {} in {}", who, self.channel);
            return;
        };
        if self.players[index].is_round_judge {
            let text = format!(
                "{} is judging this round and cannot play.",
                self.players[index].display_name
            );
            self.client.say(&self.channel, &text);
            return;
        }
        if self.players[index].has_played {
            let text = format!(
                "{} has already played this round.",
                self.players[index].display_name
            );
            self.client.say(&self.channel, &text);
            return;
        }

        let Some(prompt) = self.prompt.clone() else {
            return;
        };
        let Some(positions) = parse_positions(args) else {
            self.client.say(
                &self.channel,
                "Play cards by their number in your hand, e.g. `!play 2`.",
            );
            return;
        };
        if positions.len() != prompt.pick {
            let text = format!(
                "This prompt needs exactly {} card{}.",
                prompt.pick,
                plural(prompt.pick)
            );
            self.client.say(&self.channel, &text);
            return;
        }
        let Some(cards) = self.players[index].hand.take(&positions) else {
            self.client
                .say(&self.channel, "You don't have those cards. Check `!cards` again.");
            return;
        };

        self.players[index].has_played = true;
        self.players[index].idle_rounds = 0;
        self.submissions.push(Submission {
            identity: who.clone(),
            cards,
        });
        self.awaiting.retain(|i| i != who);

        let name = self.players[index].display_name.clone();
        self.client.say(&self.channel, &format!("{} has played.", name));

        if self.awaiting.is_empty() {
            self.reveal_submissions();
        }
    }

    /// Awards the round to the 1-based entry number in `choice`. Only the
    /// round judge may pick, and only once every play is in.
    pub fn select_winner(&mut self, choice: Option<&str>, who: &PlayerIdentity) {
        if self.phase != Phase::AwaitingJudgment {
            self.client
                .say(&self.channel, "There is nothing to judge right now.");
            return;
        }
        let Some(index) = self.players.iter().position(|p| p.is(who)) else {
            debug!("winner pick from unknown player {} in {}", who, self.channel);
            return;
        };
        if !self.players[index].is_round_judge {
            let text = format!("Only {} picks the winner this round.", self.judge_name());
            self.client.say(&self.channel, &text);
            return;
        }

        let entry = choice
            .and_then(|c| c.parse::<usize>().ok())
            .filter(|&n| n >= 1 && n <= self.submissions.len());
        let Some(entry) = entry else {
            let text = format!(
                "Pick an entry between 1 and {}, e.g. `!winner 1`.",
                self.submissions.len()
            );
            self.client.say(&self.channel, &text);
            return;
        };

        let winning_identity = self.submissions[entry - 1].identity.clone();
        let filled = match &self.prompt {
            Some(prompt) => prompt.fill(&self.submissions[entry - 1].cards),
            None => return,
        };

        match self.players.iter_mut().find(|p| p.is(&winning_identity)) {
            Some(winner) => {
                winner.score += 1;
                let text = format!(
                    "**{}** wins round {} with: {} ({} point{})",
                    winner.display_name,
                    self.round,
                    filled,
                    winner.score,
                    plural(winner.score as usize)
                );
                self.client.say(&self.channel, &text);
            }
            None => {
                let text = format!(
                    "The winning entry was {} — played by someone who already left.",
                    filled
                );
                self.client.say(&self.channel, &text);
            }
        }

        self.finish_round();
    }

    /// Sends the caller their hand as a private notice.
    pub fn show_cards(&self, who: &PlayerIdentity) {
        let Some(record) = self.get_player(who) else {
            debug!("cards request from unknown player {} in {}", who, self.channel);
            return;
        };

        let text = if record.hand.is_empty() {
            "Your hand is empty.".to_owned()
        } else {
            let rows = record
                .hand
                .cards()
                .iter()
                .enumerate()
                .map(|(n, card)| {
                    if record.colors_enabled {
                        format!("**[{}]** {}", n + 1, card)
                    } else {
                        format!("[{}] {}", n + 1, card)
                    }
                })
                .collect::<Vec<String>>()
                .join("\n");
            format!("Your cards:\n{}", rows)
        };

        self.client.notice(who, &text);
    }

    pub fn list_players(&self) {
        if self.players.is_empty() {
            self.client.say(&self.channel, "Nobody has joined yet.");
            return;
        }

        let names = self
            .players
            .iter()
            .map(|p| {
                if p.is_round_judge {
                    format!("{} (judge)", p.display_name)
                } else {
                    p.display_name.clone()
                }
            })
            .collect::<Vec<String>>()
            .join(", ");
        self.client.say(
            &self.channel,
            &format!("Players ({}): {}", self.players.len(), names),
        );
    }

    pub fn show_points(&self) {
        if self.players.is_empty() {
            self.client.say(&self.channel, "Nobody is playing.");
            return;
        }

        let mut rows: Vec<&PlayerRecord> = self.players.iter().collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        let scores = rows
            .iter()
            .map(|p| format!("{}: {}", p.display_name, p.score))
            .collect::<Vec<String>>()
            .join(", ");

        let text = match self.point_limit {
            Some(limit) => format!("Scores — {} (playing to {})", scores, limit),
            None => format!("Scores — {}", scores),
        };
        self.client.say(&self.channel, &text);
    }

    pub fn show_status(&self) {
        let text = match self.phase {
            Phase::Lobby => format!(
                "Waiting for players — {} of {} needed. Type `!join`.",
                self.players.len(),
                self.settings.min_players
            ),
            Phase::AwaitingPlays => {
                let waiting = self
                    .awaiting
                    .iter()
                    .filter_map(|i| self.get_player(i))
                    .map(|p| p.display_name.clone())
                    .collect::<Vec<String>>()
                    .join(", ");
                format!("Round {} — waiting for plays from: {}", self.round, waiting)
            }
            Phase::AwaitingJudgment => format!(
                "Round {} — waiting for {} to pick a winner.",
                self.round,
                self.judge_name()
            ),
            Phase::Paused => "The game is paused. Type `!resume` to continue.".to_owned(),
            Phase::Ended => "The game is over.".to_owned(),
        };
        self.client.say(&self.channel, &text);
    }

    /// Stops the game on behalf of `who` and announces the final scores.
    pub fn stop(&mut self, who: &PlayerIdentity) {
        let name = self
            .get_player(who)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| who.to_string());
        self.client
            .say(&self.channel, &format!("The game has been stopped by {}.", name));
        if self.players.iter().any(|p| p.score > 0) {
            self.show_points();
        }
        self.phase = Phase::Ended;
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Paused {
            self.client.say(&self.channel, "The game is already paused.");
            return;
        }
        self.paused_phase = Some(self.phase);
        self.phase = Phase::Paused;
        self.client
            .say(&self.channel, "Game paused. Type `!resume` to continue.");
    }

    pub fn resume(&mut self) {
        if self.phase != Phase::Paused {
            self.client.say(&self.channel, "The game is not paused.");
            return;
        }
        self.phase = self.paused_phase.take().unwrap_or(Phase::Lobby);
        self.client.say(&self.channel, "Game resumed.");
    }

    fn refill_hand(record: &mut PlayerRecord, deck: &mut Deck, hand_size: usize) {
        while record.hand.len() < hand_size {
            match deck.draw_answer() {
                Some(card) => record.hand.add(card),
                None => break,
            }
        }
    }

    fn judge_name(&self) -> String {
        self.players
            .iter()
            .find(|p| p.is_round_judge)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| "the judge".to_owned())
    }

    fn start_round(&mut self) {
        self.round += 1;

        let next = self
            .players
            .iter()
            .position(|p| p.is_round_judge)
            .map(|i| (i + 1) % self.players.len())
            .unwrap_or(0);
        for record in self.players.iter_mut() {
            record.is_round_judge = false;
            record.has_played = false;
        }
        self.players[next].is_round_judge = true;

        let hand_size = self.settings.hand_size;
        for record in self.players.iter_mut() {
            Self::refill_hand(record, &mut self.deck, hand_size);
        }

        self.prompt = self.deck.draw_prompt();
        let Some(prompt) = self.prompt.clone() else {
            self.client
                .say(&self.channel, "The deck ran out of prompts. Game over!");
            self.show_points();
            self.phase = Phase::Ended;
            return;
        };

        self.submissions.clear();
        self.awaiting = self
            .players
            .iter()
            .filter(|p| !p.is_round_judge)
            .map(|p| p.identity().clone())
            .collect();
        self.phase = Phase::AwaitingPlays;

        let judge = self.players[next].display_name.clone();
        self.client.say(
            &self.channel,
            &format!("**Round {}!** {} is judging.", self.round, judge),
        );
        self.client.say(
            &self.channel,
            &format!(
                "The prompt: **{}** — play {} card{} with `!play`, `!cards` shows your hand.",
                prompt.text,
                prompt.pick,
                plural(prompt.pick)
            ),
        );
    }

    fn reveal_submissions(&mut self) {
        self.submissions.shuffle(&mut rand::rng());
        self.phase = Phase::AwaitingJudgment;

        let Some(prompt) = self.prompt.clone() else {
            return;
        };
        let mut lines = vec!["Everyone has played! The entries:".to_owned()];
        for (n, submission) in self.submissions.iter().enumerate() {
            lines.push(format!("{}. {}", n + 1, prompt.fill(&submission.cards)));
        }
        lines.push(format!(
            "{}: pick the winner with `!winner <number>`.",
            self.judge_name()
        ));
        self.client.say(&self.channel, &lines.join("\n"));
    }

    /// Returns the round's cards to the discards and clears round state.
    fn teardown_round(&mut self) {
        if let Some(prompt) = self.prompt.take() {
            self.deck.discard_prompt(prompt);
        }
        for submission in self.submissions.drain(..) {
            self.deck.discard_answers(submission.cards);
        }
        self.awaiting.clear();
    }

    fn sweep_idle(&mut self) {
        let max_idle = self.settings.max_idle_rounds;
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.players)
            .into_iter()
            .partition(|p| p.idle_rounds < max_idle);
        self.players = kept;
        for mut record in dropped {
            self.deck.discard_answers(record.hand.surrender());
            self.client.say(
                &self.channel,
                &format!(
                    "{} was removed after sitting out {} round{}.",
                    record.display_name,
                    max_idle,
                    plural(max_idle as usize)
                ),
            );
        }
    }

    /// Ends a judged round: updates inactivity counters, drops players who
    /// sat out too long, then either crowns a champion or deals the next
    /// round.
    fn finish_round(&mut self) {
        for record in self.players.iter_mut() {
            if record.is_round_judge {
                continue;
            }
            if record.has_played {
                record.idle_rounds = 0;
            } else {
                record.idle_rounds += 1;
            }
        }

        self.teardown_round();
        self.sweep_idle();

        let champion = self.point_limit.and_then(|limit| {
            self.players
                .iter()
                .find(|p| p.score >= limit)
                .map(|p| p.display_name.clone())
        });
        if let Some(champion) = champion {
            self.client
                .say(&self.channel, &format!("**{}** wins the game! 🎉", champion));
            self.show_points();
            self.phase = Phase::Ended;
            return;
        }

        self.next_round_or_lobby();
    }

    /// Tears down an unfinished round. Everyone who had not played yet gets
    /// an inactive round counted.
    fn abandon_round(&mut self) {
        for record in self.players.iter_mut() {
            if !record.is_round_judge && !record.has_played {
                record.idle_rounds += 1;
            }
        }

        self.teardown_round();
        self.sweep_idle();
        self.next_round_or_lobby();
    }

    fn next_round_or_lobby(&mut self) {
        if self.players.len() >= self.settings.min_players {
            self.start_round();
        } else {
            self.phase = Phase::Lobby;
            self.client.say(
                &self.channel,
                &format!(
                    "Waiting for players — {} of {} needed. Type `!join`.",
                    self.players.len(),
                    self.settings.min_players
                ),
            );
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Parses 1-based card numbers into hand positions. Empty input, zeros and
/// non-numbers are rejected wholesale.
fn parse_positions(args: &[String]) -> Option<Vec<usize>> {
    if args.is_empty() {
        return None;
    }
    args.iter()
        .map(|a| match a.parse::<usize>() {
            Ok(n) if n >= 1 => Some(n - 1),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MockChatClient;

    fn permissive_client() -> Arc<MockChatClient> {
        let mut mock = MockChatClient::new();
        mock.expect_say().returning(|_, _| ());
        mock.expect_notice().returning(|_, _| ());
        Arc::new(mock)
    }

    fn settings() -> GameSettings {
        GameSettings {
            hand_size: 5,
            min_players: 3,
            max_idle_rounds: 2,
        }
    }

    fn identity(name: &str) -> PlayerIdentity {
        PlayerIdentity::new(name, "example.org")
    }

    fn record(name: &str) -> PlayerRecord {
        PlayerRecord::new(identity(name), name)
    }

    fn game_with_players(names: &[&str]) -> Game<MockChatClient> {
        let mut game = Game::new("!room:example.org", permissive_client(), settings(), &[]);
        for name in names {
            game.add_player(record(name));
        }
        game
    }

    /// Plays a full set of valid cards for `who`, however many the prompt asks.
    fn play_valid(game: &mut Game<MockChatClient>, who: &PlayerIdentity) {
        let pick = game.current_prompt().expect("round running").pick;
        let args: Vec<String> = (1..=pick).map(|n| n.to_string()).collect();
        game.play_card(&args, who);
    }

    fn non_judges(game: &Game<MockChatClient>) -> Vec<PlayerIdentity> {
        game.players()
            .iter()
            .filter(|p| !p.is_round_judge)
            .map(|p| p.identity().clone())
            .collect()
    }

    fn judge(game: &Game<MockChatClient>) -> PlayerIdentity {
        game.players()
            .iter()
            .find(|p| p.is_round_judge)
            .map(|p| p.identity().clone())
            .expect("round has a judge")
    }

    fn play_out_round(game: &mut Game<MockChatClient>) {
        for who in non_judges(game) {
            play_valid(game, &who);
        }
        assert_eq!(game.phase(), Phase::AwaitingJudgment);
    }

    #[test]
    fn test_stays_in_lobby_below_min_players() {
        let game = game_with_players(&["alice", "bob"]);
        assert_eq!(game.phase(), Phase::Lobby);
        assert_eq!(game.round(), 0);
    }

    #[test]
    fn test_round_starts_at_min_players() {
        let game = game_with_players(&["alice", "bob", "carol"]);

        assert_eq!(game.phase(), Phase::AwaitingPlays);
        assert_eq!(game.round(), 1);
        assert!(game.current_prompt().is_some());
        assert_eq!(
            game.players().iter().filter(|p| p.is_round_judge).count(),
            1
        );
        for player in game.players() {
            assert_eq!(player.hand.len(), settings().hand_size);
        }
    }

    #[test]
    fn test_rejoin_keeps_existing_record() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        game.get_player_mut(&identity("alice")).unwrap().score = 2;

        game.add_player(PlayerRecord::new(identity("alice"), "AliceTheSecond"));

        assert_eq!(game.players().len(), 3);
        let alice = game.get_player(&identity("alice")).unwrap();
        assert_eq!(alice.score, 2);
        assert_eq!(alice.display_name, "AliceTheSecond");
    }

    #[test]
    fn test_judge_cannot_play() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        let judge = judge(&game);

        play_valid(&mut game, &judge);

        assert!(!game.get_player(&judge).unwrap().has_played);
        assert_eq!(game.phase(), Phase::AwaitingPlays);
    }

    #[test]
    fn test_play_from_stranger_is_ignored() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);

        game.play_card(&["1".to_string()], &identity("mallory"));

        assert_eq!(game.players().len(), 3);
        assert_eq!(game.phase(), Phase::AwaitingPlays);
    }

    #[test]
    fn test_double_play_is_rejected() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        let who = non_judges(&game).remove(0);

        play_valid(&mut game, &who);
        let hand_after_first = game.get_player(&who).unwrap().hand.len();
        play_valid(&mut game, &who);

        assert_eq!(game.get_player(&who).unwrap().hand.len(), hand_after_first);
    }

    #[test]
    fn test_wrong_card_count_is_rejected() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        let who = non_judges(&game).remove(0);
        let pick = game.current_prompt().unwrap().pick;

        let args: Vec<String> = (1..=pick + 1).map(|n| n.to_string()).collect();
        game.play_card(&args, &who);

        assert!(!game.get_player(&who).unwrap().has_played);
    }

    #[test]
    fn test_out_of_range_card_is_rejected() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        let who = non_judges(&game).remove(0);

        game.play_card(&["99".to_string()], &who);

        assert!(!game.get_player(&who).unwrap().has_played);
        assert_eq!(game.get_player(&who).unwrap().hand.len(), settings().hand_size);
    }

    #[test]
    fn test_all_plays_move_to_judgment() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        play_out_round(&mut game);
    }

    #[test]
    fn test_winner_gets_point_and_next_round_starts() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        let first_judge = judge(&game);
        play_out_round(&mut game);

        game.select_winner(Some("1"), &first_judge);

        let total: u32 = game.players().iter().map(|p| p.score).sum();
        assert_eq!(total, 1);
        assert_eq!(game.phase(), Phase::AwaitingPlays);
        assert_eq!(game.round(), 2);
        // The judge seat moved on.
        assert_ne!(judge(&game), first_judge);
    }

    #[test]
    fn test_non_judge_cannot_pick_winner() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        play_out_round(&mut game);
        let who = non_judges(&game).remove(0);

        game.select_winner(Some("1"), &who);

        assert_eq!(game.phase(), Phase::AwaitingJudgment);
        assert_eq!(game.players().iter().map(|p| p.score).sum::<u32>(), 0);
    }

    #[test]
    fn test_invalid_entry_number_is_rejected() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        let judge = judge(&game);
        play_out_round(&mut game);

        game.select_winner(Some("99"), &judge);
        game.select_winner(Some("zero"), &judge);
        game.select_winner(None, &judge);

        assert_eq!(game.phase(), Phase::AwaitingJudgment);
    }

    #[test]
    fn test_point_limit_ends_game() {
        let mut game = Game::new(
            "!room:example.org",
            permissive_client(),
            settings(),
            &["1".to_string()],
        );
        for name in ["alice", "bob", "carol"] {
            game.add_player(record(name));
        }
        let judge = judge(&game);
        play_out_round(&mut game);

        game.select_winner(Some("1"), &judge);

        assert_eq!(game.phase(), Phase::Ended);
    }

    #[test]
    fn test_unparsable_point_limit_is_ignored() {
        let game = Game::new(
            "!room:example.org",
            permissive_client(),
            settings(),
            &["soon".to_string()],
        );
        assert!(game.point_limit.is_none());
    }

    #[test]
    fn test_pause_and_resume_restore_phase() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        let who = non_judges(&game).remove(0);

        game.pause();
        assert_eq!(game.phase(), Phase::Paused);

        // Plays are refused while paused.
        play_valid(&mut game, &who);
        assert!(!game.get_player(&who).unwrap().has_played);

        game.resume();
        assert_eq!(game.phase(), Phase::AwaitingPlays);
    }

    #[test]
    fn test_resume_without_pause_changes_nothing() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        game.resume();
        assert_eq!(game.phase(), Phase::AwaitingPlays);
    }

    #[test]
    fn test_stop_ends_game() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        game.stop(&identity("alice"));
        assert_eq!(game.phase(), Phase::Ended);
    }

    #[test]
    fn test_judge_quit_abandons_round() {
        let mut game = game_with_players(&["alice", "bob", "carol", "dave"]);
        let first_judge = judge(&game);

        game.remove_player(&first_judge);

        // Three players remain, so a fresh round was dealt.
        assert_eq!(game.players().len(), 3);
        assert_eq!(game.phase(), Phase::AwaitingPlays);
        assert_eq!(game.round(), 2);
        assert_ne!(judge(&game), first_judge);
    }

    #[test]
    fn test_falls_back_to_lobby_when_players_leave() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        let mut others = non_judges(&game);

        game.remove_player(&others.remove(0));

        assert_eq!(game.players().len(), 2);
        assert_eq!(game.phase(), Phase::Lobby);
    }

    #[test]
    fn test_last_straggler_quit_reveals_round() {
        let mut game = game_with_players(&["alice", "bob", "carol", "dave"]);
        let mut others = non_judges(&game);
        let quitter = others.remove(0);

        for who in &others {
            play_valid(&mut game, who);
        }
        assert_eq!(game.phase(), Phase::AwaitingPlays);

        game.remove_player(&quitter);

        assert_eq!(game.phase(), Phase::AwaitingJudgment);
    }

    #[test]
    fn test_mid_round_joiner_is_dealt_and_awaited() {
        let mut game = game_with_players(&["alice", "bob", "carol"]);
        let others = non_judges(&game);

        game.add_player(record("dave"));
        assert_eq!(game.get_player(&identity("dave")).unwrap().hand.len(), settings().hand_size);

        for who in &others {
            play_valid(&mut game, who);
        }
        // Dave still has to play before the reveal.
        assert_eq!(game.phase(), Phase::AwaitingPlays);

        play_valid(&mut game, &identity("dave"));
        assert_eq!(game.phase(), Phase::AwaitingJudgment);
    }

    #[test]
    fn test_show_cards_notices_the_caller() {
        let mut mock = MockChatClient::new();
        mock.expect_say().returning(|_, _| ());
        mock.expect_notice()
            .withf(|who, text| who == &PlayerIdentity::new("bob", "example.org") && text.contains("[1]"))
            .times(1)
            .returning(|_, _| ());

        let mut game = Game::new("!room:example.org", Arc::new(mock), settings(), &[]);
        for name in ["alice", "bob", "carol"] {
            game.add_player(record(name));
        }

        game.show_cards(&identity("bob"));
    }

    #[test]
    fn test_parse_positions() {
        let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<String>>();

        assert_eq!(parse_positions(&args(&["1", "3"])), Some(vec![0, 2]));
        assert_eq!(parse_positions(&args(&["0"])), None);
        assert_eq!(parse_positions(&args(&["two"])), None);
        assert_eq!(parse_positions(&[]), None);
    }
}
