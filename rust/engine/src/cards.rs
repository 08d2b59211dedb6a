use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::EngineError;

/// One of the four suits in a standard 52-card deck.
/// The wire encoding is the lowercase initial: `c`, `d`, `h`, `s`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub fn to_char(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }

    pub fn from_char(c: char) -> Result<Suit, EngineError> {
        match c {
            'c' => Ok(Suit::Clubs),
            'd' => Ok(Suit::Diamonds),
            'h' => Ok(Suit::Hearts),
            's' => Ok(Suit::Spades),
            _ => Err(EngineError::BadCard(c.to_string())),
        }
    }
}

/// Card rank from Two through Ace. The numeric value (2..=14) is used
/// directly by the hand evaluator for kicker comparison.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    pub fn from_char(c: char) -> Result<Rank, EngineError> {
        match c {
            '2' => Ok(Rank::Two),
            '3' => Ok(Rank::Three),
            '4' => Ok(Rank::Four),
            '5' => Ok(Rank::Five),
            '6' => Ok(Rank::Six),
            '7' => Ok(Rank::Seven),
            '8' => Ok(Rank::Eight),
            '9' => Ok(Rank::Nine),
            'T' => Ok(Rank::Ten),
            'J' => Ok(Rank::Jack),
            'Q' => Ok(Rank::Queen),
            'K' => Ok(Rank::King),
            'A' => Ok(Rank::Ace),
            _ => Err(EngineError::BadCard(c.to_string())),
        }
    }
}

/// A single playing card. Crosses the wire as the two-character string
/// `RS` (rank then suit), e.g. `"As"` or `"Td"`.
///
/// ```
/// use pokerd_engine::cards::Card;
///
/// let card: Card = "Kh".parse().unwrap();
/// assert_eq!(card.to_string(), "Kh");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

impl FromStr for Card {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (rank, suit) = match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(su), None) => (r, su),
            _ => return Err(EngineError::BadCard(s.to_string())),
        };
        Ok(Card {
            rank: Rank::from_char(rank)?,
            suit: Suit::from_char(suit)?,
        })
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
}

pub fn all_ranks() -> [Rank; 13] {
    [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ]
}

pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(52);
    for &suit in &all_suits() {
        for &rank in &all_ranks() {
            v.push(Card { rank, suit });
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_deck_has_52_distinct_cards() {
        let deck = full_deck();
        assert_eq!(deck.len(), 52);
        let mut seen = std::collections::HashSet::new();
        for c in deck {
            assert!(seen.insert(c));
        }
    }

    #[test]
    fn card_round_trips_through_wire_form() {
        for &s in &["2c", "9d", "Th", "As"] {
            let card: Card = s.parse().unwrap();
            assert_eq!(card.to_string(), s);
        }
    }

    #[test]
    fn bad_card_strings_are_rejected() {
        assert!("".parse::<Card>().is_err());
        assert!("A".parse::<Card>().is_err());
        assert!("1s".parse::<Card>().is_err());
        assert!("Ax".parse::<Card>().is_err());
        assert!("Asx".parse::<Card>().is_err());
    }

    #[test]
    fn serde_uses_the_wire_form() {
        let card: Card = "Qd".parse().unwrap();
        assert_eq!(serde_json::to_string(&card).unwrap(), "\"Qd\"");
        let back: Card = serde_json::from_str("\"Qd\"").unwrap();
        assert_eq!(back, card);
    }
}
