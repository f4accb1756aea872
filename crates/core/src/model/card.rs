use serde::{Deserialize, Serialize};

use super::node::NodeKind;

/// Number of cards a fresh or reset timeline starts with.
pub const DEFAULT_CARD_COUNT: usize = 4;

pub const DEFAULT_TIMELINE_TITLE: &str = "Nieuwe tijdlijn";
pub const DEFAULT_CARD_DESCRIPTION: &str = "Voeg een beschrijving toe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    #[default]
    In,
    Out,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }

    /// `START`/`IN` → in, `STOP`/`OUT` → out, anything else → in.
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "STOP" | "OUT" => Direction::Out,
            _ => Direction::In,
        }
    }
}

impl From<String> for Direction {
    fn from(s: String) -> Self {
        Self::from_status(&s)
    }
}

impl From<Direction> for String {
    fn from(d: Direction) -> Self {
        d.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Right,
}

/// One event entry in a timeline. Its position is its index.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub kind: NodeKind,
    pub direction: Direction,
    pub title: String,
    pub description: String,
}

impl Card {
    /// Default card as created by "add" and "reset": `Tikking {n}`.
    pub fn numbered(n: usize) -> Self {
        Self {
            kind: NodeKind::Prikklok,
            direction: Direction::In,
            title: format!("Tikking {n}"),
            description: DEFAULT_CARD_DESCRIPTION.to_string(),
        }
    }
}

/// A titled, ordered card sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub title: String,
    cards: Vec<Card>,
}

impl Timeline {
    /// A new timeline with the default title and four numbered cards.
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TIMELINE_TITLE.to_string(),
            cards: default_cards(),
        }
    }

    pub fn with_cards(title: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            title: title.into(),
            cards,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Swap the card with its neighbour. Returns the card's new index, or
    /// `None` when there is no neighbour in that direction.
    pub fn move_card(&mut self, index: usize, direction: MoveDirection) -> Option<usize> {
        if index >= self.cards.len() {
            return None;
        }
        let target = match direction {
            MoveDirection::Left => index.checked_sub(1)?,
            MoveDirection::Right => {
                let next = index + 1;
                if next >= self.cards.len() {
                    return None;
                }
                next
            }
        };
        self.cards.swap(index, target);
        Some(target)
    }

    /// Append `Tikking {len + 1}`.
    pub fn add_card(&mut self) {
        let n = self.cards.len() + 1;
        self.cards.push(Card::numbered(n));
    }

    /// Drop the last card; refuses to go below one card.
    pub fn remove_last(&mut self) -> bool {
        if self.cards.len() <= 1 {
            return false;
        }
        self.cards.pop();
        true
    }

    pub fn reset(&mut self) {
        self.cards = default_cards();
    }

    pub fn toggle_kind(&mut self, index: usize) -> Option<NodeKind> {
        let card = self.cards.get_mut(index)?;
        card.kind = card.kind.toggled();
        Some(card.kind)
    }

    pub fn toggle_direction(&mut self, index: usize) -> Option<Direction> {
        let card = self.cards.get_mut(index)?;
        card.direction = card.direction.toggled();
        Some(card.direction)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

fn default_cards() -> Vec<Card> {
    (1..=DEFAULT_CARD_COUNT).map(Card::numbered).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(tl: &Timeline) -> Vec<&str> {
        tl.cards().iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn new_timeline_has_four_numbered_cards() {
        let tl = Timeline::new();
        assert_eq!(tl.title, "Nieuwe tijdlijn");
        assert_eq!(
            titles(&tl),
            vec!["Tikking 1", "Tikking 2", "Tikking 3", "Tikking 4"]
        );
    }

    #[test]
    fn move_swaps_with_neighbour() {
        let mut tl = Timeline::new();
        assert_eq!(tl.move_card(1, MoveDirection::Left), Some(0));
        assert_eq!(
            titles(&tl),
            vec!["Tikking 2", "Tikking 1", "Tikking 3", "Tikking 4"]
        );
        assert_eq!(tl.move_card(2, MoveDirection::Right), Some(3));
        assert_eq!(
            titles(&tl),
            vec!["Tikking 2", "Tikking 1", "Tikking 4", "Tikking 3"]
        );
    }

    #[test]
    fn move_at_edges_is_noop() {
        let mut tl = Timeline::new();
        assert_eq!(tl.move_card(0, MoveDirection::Left), None);
        assert_eq!(tl.move_card(3, MoveDirection::Right), None);
        assert_eq!(tl.move_card(9, MoveDirection::Left), None);
        assert_eq!(titles(&tl)[0], "Tikking 1");
    }

    #[test]
    fn remove_last_keeps_one_card() {
        let mut tl = Timeline::new();
        assert!(tl.remove_last());
        assert!(tl.remove_last());
        assert!(tl.remove_last());
        assert!(!tl.remove_last());
        assert_eq!(tl.len(), 1);
    }

    #[test]
    fn add_numbers_after_current_length() {
        let mut tl = Timeline::new();
        tl.remove_last();
        tl.add_card();
        assert_eq!(titles(&tl)[3], "Tikking 4");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut tl = Timeline::new();
        tl.add_card();
        tl.toggle_kind(0);
        tl.reset();
        assert_eq!(tl, Timeline::with_cards("Nieuwe tijdlijn", default_cards()));
    }

    #[test]
    fn direction_from_status() {
        assert_eq!(Direction::from_status("start"), Direction::In);
        assert_eq!(Direction::from_status(" STOP "), Direction::Out);
        assert_eq!(Direction::from_status("OUT"), Direction::Out);
        assert_eq!(Direction::from_status("pause"), Direction::In);
    }
}
