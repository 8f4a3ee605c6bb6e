use crate::belief::{BeliefError, BeliefModel, Location};
use shed_core::model::card::Card;
use tracing::{Level, event};

/// A candidate play at a node with its estimated presence probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub card: Card,
    pub probability: f32,
}

/// A ranked move out of [`SearchNode::best_moves`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMove {
    pub card: Card,
    pub score: f32,
}

/// One node of the hypothetical-continuation tree. Each child owns an
/// independent copy of the parent's belief snapshot, so sibling branches
/// never share mutable state.
#[derive(Debug, Clone)]
pub struct SearchNode {
    belief: BeliefModel,
    layer: u8,
    candidates: Vec<Candidate>,
    playable: f32,
    children: Vec<SearchNode>,
}

impl SearchNode {
    pub fn new(belief: BeliefModel, layer: u8) -> Self {
        Self {
            belief,
            layer,
            candidates: Vec::new(),
            playable: 0.0,
            children: Vec::new(),
        }
    }

    pub fn belief(&self) -> &BeliefModel {
        &self.belief
    }

    pub fn layer(&self) -> u8 {
        self.layer
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn children(&self) -> &[SearchNode] {
        &self.children
    }

    /// Probability that at least one candidate at the expanded location is
    /// actually playable.
    pub fn playable_probability(&self) -> f32 {
        self.playable
    }

    /// Populates the candidate list from the snapshot's known top card.
    pub fn expand_playable(&mut self, location: Location) {
        let top = self.belief.top_card();
        let estimate = self.belief.playable_probability(location, top);
        self.playable = estimate.at_least_one;
        self.candidates = estimate
            .candidates
            .into_iter()
            .map(|(card, probability)| Candidate { card, probability })
            .collect();
        event!(
            Level::DEBUG,
            layer = self.layer,
            candidates = self.candidates.len(),
            playable = self.playable,
            "expanded search node"
        );
    }

    /// Attaches one child per candidate: the candidate hypothetically played
    /// from `location`, a blind replacement drawn back (an exhausted deck
    /// means no replacement), probabilities re-estimated.
    pub fn simulate(&mut self, location: Location) -> Result<(), BeliefError> {
        self.children.clear();
        for candidate in &self.candidates {
            let mut belief = self.belief.clone();
            belief.move_card(candidate.card, location, Location::PlayStack)?;
            match belief.deal_unseen(1, location) {
                Ok(()) | Err(BeliefError::DeckExhausted { .. }) => {}
                Err(err) => return Err(err),
            }
            belief.update_probabilities();
            self.children.push(SearchNode::new(belief, self.layer + 1));
        }
        Ok(())
    }

    /// Ranks the candidates after [`simulate`](Self::simulate): a move
    /// scores one minus the chance the opponent still has a reply in the
    /// resulting position, so plays that leave the opponent stuck rank
    /// first. Ties prefer the lower rank, keeping strong cards for later.
    pub fn best_moves(&self, opponent_location: Location) -> Vec<ScoredMove> {
        let mut scored: Vec<ScoredMove> = self
            .candidates
            .iter()
            .zip(&self.children)
            .map(|(candidate, child)| {
                let reply = child
                    .belief
                    .playable_probability(opponent_location, child.belief.top_card());
                ScoredMove {
                    card: candidate.card,
                    score: 1.0 - reply.at_least_one,
                }
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.card.rank.cmp(&b.card.rank))
        });
        scored
    }
}
