use core::fmt;

/// The nine locations an unseen card can be tracked in, from the viewpoint
/// of one observer in a two-seat game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Location {
    OwnHand = 0,
    OpponentHand = 1,
    OwnFaceUp = 2,
    OpponentFaceUp = 3,
    OwnFaceDown = 4,
    OpponentFaceDown = 5,
    Discard = 6,
    PlayStack = 7,
    Deck = 8,
}

impl Location {
    pub const COUNT: usize = 9;

    pub const LOOP: [Location; Location::COUNT] = [
        Location::OwnHand,
        Location::OpponentHand,
        Location::OwnFaceUp,
        Location::OpponentFaceUp,
        Location::OwnFaceDown,
        Location::OpponentFaceDown,
        Location::Discard,
        Location::PlayStack,
        Location::Deck,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Buckets that can receive blind cards without revealing identity.
    pub const fn is_hidden_bucket(self) -> bool {
        matches!(
            self,
            Location::OwnHand
                | Location::OpponentHand
                | Location::OwnFaceDown
                | Location::OpponentFaceDown
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Location::OwnHand => "own hand",
            Location::OpponentHand => "opponent hand",
            Location::OwnFaceUp => "own face-up",
            Location::OpponentFaceUp => "opponent face-up",
            Location::OwnFaceDown => "own face-down",
            Location::OpponentFaceDown => "opponent face-down",
            Location::Discard => "discard",
            Location::PlayStack => "play stack",
            Location::Deck => "deck",
        };
        f.write_str(label)
    }
}
