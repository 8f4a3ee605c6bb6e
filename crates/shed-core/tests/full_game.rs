use shed_core::game::engine::GameState;
use shed_core::model::action::Action;
use shed_core::model::rank::Rank;
use shed_core::model::rules::RuleCatalog;

/// Every card of the 52-card deck appears exactly once across the deck, both
/// table stacks and every player's three piles.
fn assert_card_conservation(state: &GameState) {
    let mut ids: Vec<u8> = Vec::with_capacity(52);
    ids.extend(state.table().deck().cards().iter().map(|c| c.to_id()));
    ids.extend(state.table().stack_play().iter().map(|c| c.to_id()));
    ids.extend(state.table().stack_discard().iter().map(|c| c.to_id()));
    for player in state.players() {
        ids.extend(player.hand().iter().map(|c| c.to_id()));
        ids.extend(player.face_up().iter().map(|c| c.to_id()));
        ids.extend(player.face_down().iter().map(|c| c.to_id()));
    }
    ids.sort_unstable();
    let expected: Vec<u8> = (0..52).collect();
    assert_eq!(ids, expected, "card multiset drifted");
}

fn lowest_free_rank(state: &GameState, player_index: usize) -> Option<Rank> {
    state.players()[player_index]
        .hand()
        .iter()
        .map(|c| c.rank)
        .filter(|rank| !state.catalog().is_ability_rank(*rank))
        .min()
}

/// Greedy driver: play every legal card of the first option's rank in one
/// batch, or pick up when forced.
fn choose_batch(moves: &[Action]) -> Vec<Action> {
    match moves.first() {
        Some(Action::Play(first)) => moves
            .iter()
            .filter(|action| matches!(action, Action::Play(card) if card.rank == first.rank))
            .copied()
            .collect(),
        _ => vec![Action::Pickup],
    }
}

#[test]
fn seeded_games_run_to_completion_with_invariants_held() {
    for seed in [1u64, 7, 42, 1234] {
        let mut state = GameState::new(vec!["Ada", "Ben"], RuleCatalog::standard()).unwrap();
        state.start_with_seed(seed).unwrap();
        assert_card_conservation(&state);

        let opening_rank = lowest_free_rank(&state, state.start_index());

        let mut turns = 0;
        while !state.is_game_over() {
            turns += 1;
            assert!(turns < 10_000, "seed {seed} failed to terminate");

            let actor = state.turn_index();
            let moves = state.legal_moves(actor);
            assert!(!moves.is_empty(), "the acting player always has an option");

            let opening = state.round_index() == 0
                && actor == state.start_index()
                && state.table().stack_play().is_empty();
            let top = state
                .table()
                .effective_top_card(state.catalog())
                .map(|c| c.rank);
            for action in &moves {
                if let Action::Play(card) = action {
                    if opening {
                        if let Some(rank) = opening_rank {
                            assert_eq!(card.rank, rank);
                        }
                    } else {
                        assert!(
                            state.catalog().can_play(card.rank, top),
                            "seed {seed}: illegal option {card} offered on {top:?}"
                        );
                    }
                }
            }

            let batch = choose_batch(&moves);
            state.play(actor, &batch).unwrap();
            assert_card_conservation(&state);
        }

        if !state.ended_in_stalemate() {
            let unfinished = state
                .players()
                .iter()
                .filter(|player| !player.is_finished())
                .count();
            assert_eq!(unfinished, 1, "exactly one player is left holding cards");
            assert_eq!(state.winning_order().len(), 1);
        }

        let json = state.history().unwrap().to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("rounds").is_some());
        assert!(parsed.get("final_snapshot").is_some());
    }
}

#[test]
fn opening_lead_is_the_lowest_free_card() {
    let mut state = GameState::new(vec!["Ada", "Ben"], RuleCatalog::standard()).unwrap();
    state.start_with_seed(99).unwrap();

    let starter = state.start_index();
    let expected = lowest_free_rank(&state, starter);
    let moves = state.legal_moves(starter);
    for action in moves {
        match action {
            Action::Play(card) => assert_eq!(Some(card.rank), expected),
            Action::Pickup => panic!("the opening lead is never a pickup"),
        }
    }
}

#[test]
fn same_seed_gives_identical_deals() {
    let mut a = GameState::new(vec!["Ada", "Ben"], RuleCatalog::standard()).unwrap();
    let mut b = GameState::new(vec!["Ada", "Ben"], RuleCatalog::standard()).unwrap();
    a.start_with_seed(2024).unwrap();
    b.start_with_seed(2024).unwrap();

    for (left, right) in a.players().iter().zip(b.players()) {
        assert_eq!(left.hand(), right.hand());
        assert_eq!(left.face_up(), right.face_up());
        assert_eq!(left.face_down(), right.face_down());
    }
    assert_eq!(a.start_index(), b.start_index());
}
