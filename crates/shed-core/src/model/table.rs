use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::pile::Pile;
use crate::model::rules::RuleCatalog;

/// The shared table: draw pile, play stack (most-recent last) and the
/// discard pile holding burned cards.
#[derive(Debug, Clone)]
pub struct TableCards {
    deck: Deck,
    stack_play: Pile,
    stack_discard: Pile,
}

impl TableCards {
    pub fn new(deck: Deck) -> Self {
        Self {
            deck,
            stack_play: Pile::new(),
            stack_discard: Pile::new(),
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }

    pub fn stack_play(&self) -> &Pile {
        &self.stack_play
    }

    pub fn stack_play_mut(&mut self) -> &mut Pile {
        &mut self.stack_play
    }

    pub fn stack_discard(&self) -> &Pile {
        &self.stack_discard
    }

    /// Literal top of the play stack.
    pub fn top_card(&self) -> Option<Card> {
        self.stack_play.top()
    }

    /// First non-invisible card scanning from the top; legality is always
    /// judged against this, not the literal top.
    pub fn effective_top_card(&self, catalog: &RuleCatalog) -> Option<Card> {
        self.stack_play
            .iter()
            .rev()
            .find(|card| !catalog.is_invisible(card.rank))
            .copied()
    }

    /// Moves the entire play stack to the discard pile.
    pub fn burn_play_stack(&mut self) {
        let burned = self.stack_play.drain();
        self.stack_discard.extend(burned);
    }

    /// True when the last four stack cards share one rank.
    pub fn last_four_match(&self) -> bool {
        let cards = self.stack_play.cards();
        if cards.len() < 4 {
            return false;
        }
        let tail = &cards[cards.len() - 4..];
        tail.iter().all(|card| card.rank == tail[0].rank)
    }
}

#[cfg(test)]
mod tests {
    use super::TableCards;
    use crate::model::card::Card;
    use crate::model::deck::Deck;
    use crate::model::rank::Rank;
    use crate::model::rules::RuleCatalog;
    use crate::model::suit::Suit;

    fn table_with_stack(ranks: &[Rank]) -> TableCards {
        let mut table = TableCards::new(Deck::standard());
        for (i, rank) in ranks.iter().enumerate() {
            let suit = Suit::ALL[i % 4];
            table.stack_play_mut().push(Card::new(*rank, suit));
        }
        table
    }

    #[test]
    fn effective_top_skips_invisible_cards() {
        let catalog = RuleCatalog::standard();
        let table = table_with_stack(&[Rank::Nine, Rank::Three]);
        assert_eq!(table.top_card().unwrap().rank, Rank::Three);
        assert_eq!(
            table.effective_top_card(&catalog).unwrap().rank,
            Rank::Nine
        );
    }

    #[test]
    fn all_invisible_stack_has_no_effective_top() {
        let catalog = RuleCatalog::standard();
        let table = table_with_stack(&[Rank::Three, Rank::Three]);
        assert!(table.effective_top_card(&catalog).is_none());
    }

    #[test]
    fn burn_moves_stack_to_discard() {
        let mut table = table_with_stack(&[Rank::Five, Rank::Six]);
        table.burn_play_stack();
        assert!(table.stack_play().is_empty());
        assert_eq!(table.stack_discard().len(), 2);
    }

    #[test]
    fn last_four_match_detects_runs() {
        let table = table_with_stack(&[Rank::Nine, Rank::Five, Rank::Five, Rank::Five, Rank::Five]);
        assert!(table.last_four_match());
        let table = table_with_stack(&[Rank::Five, Rank::Five, Rank::Five]);
        assert!(!table.last_four_match());
        let table = table_with_stack(&[Rank::Five, Rank::Five, Rank::Six, Rank::Five]);
        assert!(!table.last_four_match());
    }
}
