use crate::model::card::Card;
use core::fmt;
use core::str::FromStr;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// An atomic move a player can submit: play one card, or pick the stack up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Play(Card),
    Pickup,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Play(card) => write!(f, "{card}"),
            Action::Pickup => f.write_str("#"),
        }
    }
}

impl FromStr for Action {
    type Err = crate::model::card::ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "#" {
            return Ok(Action::Pickup);
        }
        s.parse::<Card>().map(Action::Play)
    }
}

/// One entry in the recorded history: the submitted actions plus the burn
/// marker the engine emits when a play clears the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnEvent {
    Play(Card),
    Pickup,
    Burn,
}

impl TurnEvent {
    pub const fn from_action(action: Action) -> Self {
        match action {
            Action::Play(card) => TurnEvent::Play(card),
            Action::Pickup => TurnEvent::Pickup,
        }
    }
}

impl fmt::Display for TurnEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnEvent::Play(card) => write!(f, "{card}"),
            TurnEvent::Pickup => f.write_str("#"),
            TurnEvent::Burn => f.write_str("*"),
        }
    }
}

impl FromStr for TurnEvent {
    type Err = crate::model::card::ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "#" => Ok(TurnEvent::Pickup),
            "*" => Ok(TurnEvent::Burn),
            _ => s.parse::<Card>().map(TurnEvent::Play),
        }
    }
}

// History exports use the two-character literal form (`h11`, `#`, `*`).
impl Serialize for TurnEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TurnEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, TurnEvent};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn action_literals_roundtrip() {
        let play = Action::Play(Card::new(Rank::Jack, Suit::Hearts));
        assert_eq!(play.to_string(), "h11");
        assert_eq!("h11".parse::<Action>().unwrap(), play);
        assert_eq!("#".parse::<Action>().unwrap(), Action::Pickup);
        assert!("*".parse::<Action>().is_err());
    }

    #[test]
    fn event_literals_roundtrip() {
        assert_eq!("*".parse::<TurnEvent>().unwrap(), TurnEvent::Burn);
        assert_eq!("#".parse::<TurnEvent>().unwrap(), TurnEvent::Pickup);
        let event = TurnEvent::Play(Card::new(Rank::Ace, Suit::Spades));
        assert_eq!(event.to_string().parse::<TurnEvent>().unwrap(), event);
    }

    #[test]
    fn events_serialize_as_literals() {
        let events = vec![
            TurnEvent::Play(Card::new(Rank::Ten, Suit::Clubs)),
            TurnEvent::Burn,
            TurnEvent::Pickup,
        ];
        let json = serde_json::to_string(&events).unwrap();
        assert_eq!(json, r##"["c10","*","#"]"##);
        let back: Vec<TurnEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, events);
    }
}
