//! Canned response texts for the command dispatcher.
//!
//! Everything the registry itself says to users lives here; the game
//! session formats its own announcements. All texts are Markdown.

/// Notice for `!start` on a channel that already has a game.
pub fn already_running() -> String {
    "A game is already running. Type `!join` to join the game.".to_owned()
}

/// Notice for any game command on a channel without a game.
pub fn no_game_running() -> String {
    "No game running. Start the game by typing `!start`.".to_owned()
}

/// Notice for `!pick` in a phase where neither playing nor judging applies.
pub fn pick_unavailable() -> String {
    "`!pick` is not available in the current game state.".to_owned()
}

/// Private confirmation after turning decorated output off.
pub fn colors_off() -> String {
    "Colors have been turned off for you.".to_owned()
}

/// Private confirmation after turning decorated output back on.
pub fn colors_on() -> String {
    "🌈 **Colors enabled again!** 🌈".to_owned()
}

/// The `!help` text.
pub fn help_text() -> String {
    "**Blanks** — a fill-in-the-blanks card game.\n\
        - `!start <points>`: start a new game, optionally playing to a point limit (e.g. `!start 10`)\n\
        - `!stop`: stop the currently running game\n\
        - `!pause` / `!resume`: pause or resume the game\n\
        - `!join` / `!quit`: join or leave the game\n\
        - `!cards`: see your hand (sent privately)\n\
        - `!play <number> (<number>)`: play cards from your hand, as many as the prompt needs\n\
        - `!winner <number>`: pick the winning entry — judge only\n\
        - `!pick <number...>`: shorthand for `!play` or `!winner`, depending on the round\n\
        - `!list`: list the players in the game\n\
        - `!points`: show the scores\n\
        - `!status`: show what the game is waiting for\n\
        - `!nocolor`: toggle decorated messages sent to you"
        .to_owned()
}
