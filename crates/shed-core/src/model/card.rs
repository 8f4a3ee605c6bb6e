use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;

/// Compact id reserved for the pickup action in encoded form.
pub const PICKUP_ID: u8 = 52;
/// Compact id reserved for "no card" (empty stack, unknown slot).
pub const NO_CARD_ID: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    /// Canonical index in 0..52: `(rank - 2) + 13 * suit`.
    pub const fn to_id(self) -> u8 {
        (self.rank.value() - 2) + 13 * self.suit.index() as u8
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        if id >= 52 {
            return None;
        }
        let rank = match Rank::from_value(id % 13 + 2) {
            Some(rank) => rank,
            None => return None,
        };
        let suit = match Suit::from_index((id / 13) as usize) {
            Some(suit) => suit,
            None => return None,
        };
        Some(Self { suit, rank })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError(pub String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card literal '{}'", self.0)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses the two-part literal form: suit letter then zero-padded rank
    /// (`h02`, `s14`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let suit = chars
            .next()
            .and_then(Suit::from_letter)
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        let rank = chars
            .as_str()
            .parse::<u8>()
            .ok()
            .and_then(Rank::from_value)
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, NO_CARD_ID, PICKUP_ID};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn id_roundtrip_covers_all_cards() {
        for id in 0..52u8 {
            let card = Card::from_id(id).expect("id in range");
            assert_eq!(card.to_id(), id);
        }
    }

    #[test]
    fn sentinel_ids_are_not_cards() {
        assert_eq!(Card::from_id(PICKUP_ID), None);
        assert_eq!(Card::from_id(NO_CARD_ID), None);
    }

    #[test]
    fn known_ids_match_layout() {
        assert_eq!(Card::new(Rank::Two, Suit::Hearts).to_id(), 0);
        assert_eq!(Card::new(Rank::Ace, Suit::Hearts).to_id(), 12);
        assert_eq!(Card::new(Rank::Two, Suit::Diamonds).to_id(), 13);
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).to_id(), 51);
    }

    #[test]
    fn literal_roundtrip() {
        let jack = Card::new(Rank::Jack, Suit::Hearts);
        assert_eq!(jack.to_string(), "h11");
        assert_eq!("h11".parse::<Card>().unwrap(), jack);
        assert_eq!("s02".parse::<Card>().unwrap().to_string(), "s02");
    }

    #[test]
    fn bad_literals_are_rejected() {
        assert!("".parse::<Card>().is_err());
        assert!("x11".parse::<Card>().is_err());
        assert!("h15".parse::<Card>().is_err());
        assert!("h1x".parse::<Card>().is_err());
    }
}
