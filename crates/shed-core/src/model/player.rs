use crate::model::pile::Pile;
use core::fmt;

/// Which of a player's three piles is currently in play. Strict priority:
/// hand first, face-up once the hand is empty, face-down once both are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PileKind {
    Hand,
    FaceUp,
    FaceDown,
}

impl fmt::Display for PileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PileKind::Hand => "hand",
            PileKind::FaceUp => "face-up",
            PileKind::FaceDown => "face-down",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    name: String,
    hand: Pile,
    face_up: Pile,
    face_down: Pile,
}

impl PlayerState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Pile::new(),
            face_up: Pile::new(),
            face_down: Pile::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Pile {
        &self.hand
    }

    pub fn face_up(&self) -> &Pile {
        &self.face_up
    }

    pub fn face_down(&self) -> &Pile {
        &self.face_down
    }

    pub fn hand_mut(&mut self) -> &mut Pile {
        &mut self.hand
    }

    pub fn face_up_mut(&mut self) -> &mut Pile {
        &mut self.face_up
    }

    pub fn face_down_mut(&mut self) -> &mut Pile {
        &mut self.face_down
    }

    /// All three piles empty.
    pub fn is_finished(&self) -> bool {
        self.hand.is_empty() && self.face_up.is_empty() && self.face_down.is_empty()
    }

    /// The pile the player must currently play from, or None when finished.
    pub fn active_pile(&self) -> Option<PileKind> {
        if !self.hand.is_empty() {
            Some(PileKind::Hand)
        } else if !self.face_up.is_empty() {
            Some(PileKind::FaceUp)
        } else if !self.face_down.is_empty() {
            Some(PileKind::FaceDown)
        } else {
            None
        }
    }

    pub fn pile(&self, kind: PileKind) -> &Pile {
        match kind {
            PileKind::Hand => &self.hand,
            PileKind::FaceUp => &self.face_up,
            PileKind::FaceDown => &self.face_down,
        }
    }

    pub fn pile_mut(&mut self, kind: PileKind) -> &mut Pile {
        match kind {
            PileKind::Hand => &mut self.hand,
            PileKind::FaceUp => &mut self.face_up,
            PileKind::FaceDown => &mut self.face_down,
        }
    }

    pub fn card_count(&self) -> usize {
        self.hand.len() + self.face_up.len() + self.face_down.len()
    }
}
