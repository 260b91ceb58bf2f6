//! Card types, the built-in deck and the hand container.
//!
//! The deck ships embedded in the binary as JSON. Prompt cards contain
//! `____` blanks; `pick` tells how many answer cards a play must contain
//! and defaults to the number most prompts need, one.

use log::debug;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::fmt;

/// Placeholder marking a blank inside a prompt text.
const BLANK: &str = "____";

fn default_pick() -> usize {
    1
}

/// A prompt card read out at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromptCard {
    /// Prompt text, possibly containing `____` blanks.
    pub text: String,
    /// Number of answer cards a play must contain.
    #[serde(default = "default_pick")]
    pub pick: usize,
}

impl PromptCard {
    /// Renders the prompt with `answers` substituted into its blanks.
    ///
    /// Answers beyond the available blanks (including all answers for a
    /// blank-free prompt) are appended after a dash.
    pub fn fill(&self, answers: &[AnswerCard]) -> String {
        let mut parts = self.text.split(BLANK);
        let mut out = parts.next().unwrap_or_default().to_owned();
        let mut used = 0;

        for part in parts {
            match answers.get(used) {
                Some(answer) => out.push_str(&format!("**{}**", answer)),
                None => out.push_str(BLANK),
            }
            used += 1;
            out.push_str(part);
        }

        if used < answers.len() {
            let rest = answers[used..]
                .iter()
                .map(|a| format!("**{}**", a))
                .collect::<Vec<String>>()
                .join(", ");
            out = format!("{} — {}", out.trim_end(), rest);
        }

        out
    }
}

impl fmt::Display for PromptCard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A single answer card.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AnswerCard(pub String);

impl fmt::Display for AnswerCard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Deserialize)]
struct DeckFile {
    prompts: Vec<PromptCard>,
    answers: Vec<AnswerCard>,
}

/// Draw piles plus discard piles. A dry pile is refilled by shuffling its
/// discards back in; a pile that is dry with no discards yields nothing.
#[derive(Debug)]
pub struct Deck {
    prompts: Vec<PromptCard>,
    answers: Vec<AnswerCard>,
    prompt_discards: Vec<PromptCard>,
    answer_discards: Vec<AnswerCard>,
}

impl Deck {
    /// The deck embedded in the binary, shuffled.
    pub fn builtin() -> Self {
        let file: DeckFile = serde_json::from_str(include_str!("../../assets/cards.json"))
            .expect("embedded deck is valid JSON");
        debug!(
            "loaded builtin deck: {} prompts, {} answers",
            file.prompts.len(),
            file.answers.len()
        );

        let mut deck = Deck {
            prompts: file.prompts,
            answers: file.answers,
            prompt_discards: Vec::new(),
            answer_discards: Vec::new(),
        };
        let mut rng = rand::rng();
        deck.prompts.shuffle(&mut rng);
        deck.answers.shuffle(&mut rng);
        deck
    }

    pub fn draw_prompt(&mut self) -> Option<PromptCard> {
        if self.prompts.is_empty() {
            debug!("prompt pile dry, reshuffling discards");
            self.prompts.append(&mut self.prompt_discards);
            self.prompts.shuffle(&mut rand::rng());
        }
        self.prompts.pop()
    }

    pub fn draw_answer(&mut self) -> Option<AnswerCard> {
        if self.answers.is_empty() {
            debug!("answer pile dry, reshuffling discards");
            self.answers.append(&mut self.answer_discards);
            self.answers.shuffle(&mut rand::rng());
        }
        self.answers.pop()
    }

    pub fn discard_prompt(&mut self, prompt: PromptCard) {
        self.prompt_discards.push(prompt);
    }

    pub fn discard_answers(&mut self, answers: Vec<AnswerCard>) {
        self.answer_discards.extend(answers);
    }
}

/// The answer cards one player holds. Owned exclusively by that player's
/// record; cards leave the hand only by being played or discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<AnswerCard>,
}

impl Hand {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn add(&mut self, card: AnswerCard) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[AnswerCard] {
        &self.cards
    }

    /// Removes the cards at the given zero-based positions, preserving the
    /// requested order. Returns `None` — leaving the hand untouched — if any
    /// position is out of range or repeated.
    pub fn take(&mut self, positions: &[usize]) -> Option<Vec<AnswerCard>> {
        let mut unique = positions.to_vec();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() != positions.len() || unique.last().is_some_and(|&p| p >= self.cards.len())
        {
            return None;
        }

        let picked = positions.iter().map(|&p| self.cards[p].clone()).collect();
        for &p in unique.iter().rev() {
            self.cards.remove(p);
        }
        Some(picked)
    }

    /// Empties the hand, handing the cards back for discarding.
    pub fn surrender(&mut self) -> Vec<AnswerCard> {
        std::mem::take(&mut self.cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(texts: &[&str]) -> Vec<AnswerCard> {
        texts.iter().map(|t| AnswerCard(t.to_string())).collect()
    }

    #[test]
    fn test_builtin_deck_loads() {
        let mut deck = Deck::builtin();
        assert!(deck.draw_prompt().is_some());
        assert!(deck.draw_answer().is_some());
    }

    #[test]
    fn test_builtin_prompt_picks_are_sane() {
        let mut deck = Deck::builtin();
        while let Some(prompt) = deck.draw_prompt() {
            assert!(prompt.pick >= 1, "prompt {:?} has pick 0", prompt.text);
            assert!(prompt.pick <= 3, "prompt {:?} asks too many cards", prompt.text);
        }
    }

    #[test]
    fn test_draw_recycles_discards() {
        let mut deck = Deck {
            prompts: Vec::new(),
            answers: Vec::new(),
            prompt_discards: vec![PromptCard {
                text: "____!".to_string(),
                pick: 1,
            }],
            answer_discards: answers(&["a card"]),
        };

        assert!(deck.draw_prompt().is_some());
        assert!(deck.draw_answer().is_some());
        // Both piles and both discards are dry now.
        assert!(deck.draw_prompt().is_none());
        assert!(deck.draw_answer().is_none());
    }

    #[test]
    fn test_fill_single_blank() {
        let prompt = PromptCard {
            text: "Nothing beats ____.".to_string(),
            pick: 1,
        };
        assert_eq!(
            prompt.fill(&answers(&["a decorative cabbage"])),
            "Nothing beats **a decorative cabbage**."
        );
    }

    #[test]
    fn test_fill_two_blanks() {
        let prompt = PromptCard {
            text: "____ and ____.".to_string(),
            pick: 2,
        };
        assert_eq!(prompt.fill(&answers(&["this", "that"])), "**this** and **that**.");
    }

    #[test]
    fn test_fill_without_blanks_appends() {
        let prompt = PromptCard {
            text: "The award goes to...".to_string(),
            pick: 1,
        };
        assert_eq!(
            prompt.fill(&answers(&["lukewarm oatmeal"])),
            "The award goes to... — **lukewarm oatmeal**"
        );
    }

    #[test]
    fn test_hand_take_in_requested_order() {
        let mut hand = Hand::default();
        for card in answers(&["zero", "one", "two"]) {
            hand.add(card);
        }

        let taken = hand.take(&[2, 0]).unwrap();
        assert_eq!(taken, answers(&["two", "zero"]));
        assert_eq!(hand.cards(), answers(&["one"]).as_slice());
    }

    #[test]
    fn test_hand_take_rejects_bad_positions() {
        let mut hand = Hand::default();
        for card in answers(&["zero", "one"]) {
            hand.add(card);
        }

        assert!(hand.take(&[2]).is_none());
        assert!(hand.take(&[0, 0]).is_none());
        // Rejections leave the hand untouched.
        assert_eq!(hand.len(), 2);
    }

    #[test]
    fn test_hand_surrender() {
        let mut hand = Hand::default();
        hand.add(AnswerCard("a card".to_string()));

        let cards = hand.surrender();
        assert_eq!(cards.len(), 1);
        assert!(hand.is_empty());
    }
}
