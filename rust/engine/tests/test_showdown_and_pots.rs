use pokerd_engine::deck::Deck;
use pokerd_engine::hand::evaluate_hand;
use pokerd_engine::hand_engine::{HandEngine, HandPlayer};
use pokerd_engine::rules::Action;

fn roster(stacks: &[u32]) -> Vec<HandPlayer> {
    stacks
        .iter()
        .enumerate()
        .map(|(seat, &stack)| HandPlayer {
            seat,
            name: format!("bot{seat}"),
            stack,
        })
        .collect()
}

#[test]
fn three_way_all_in_builds_and_settles_side_pots() {
    // stacks 300 / 1000 / 2000, everyone shoves preflop
    let mut deck = Deck::new_with_seed(11);
    let mut hand =
        HandEngine::new(&roster(&[300, 1000, 2000]), 0, (50, 100), 1, 3, &mut deck).unwrap();

    hand.apply(0, Action::Raise { amount: 300 }).unwrap();
    hand.apply(1, Action::Raise { amount: 1000 }).unwrap();
    hand.apply(2, Action::Raise { amount: 2000 }).unwrap();
    assert!(hand.is_over());

    let snap = hand.snapshot();
    assert_eq!(snap.pot_total, 3300);
    assert_eq!(snap.pots.len(), 3);
    assert_eq!(snap.pots[0].amount, 900);
    assert_eq!(snap.pots[0].eligible_seats, vec![0, 1, 2]);
    assert_eq!(snap.pots[1].amount, 1400);
    assert_eq!(snap.pots[1].eligible_seats, vec![1, 2]);
    assert_eq!(snap.pots[2].amount, 1000);
    assert_eq!(snap.pots[2].eligible_seats, vec![2]);

    let result = hand.result().unwrap();
    assert_eq!(result.community_cards.len(), 5);
    assert_eq!(result.hole_cards_revealed.len(), 3);
    let total: u32 = result.final_stacks.iter().map(|&(_, s)| s).sum();
    assert_eq!(total, 3300);
}

#[test]
fn all_in_call_runs_out_the_board_without_more_decisions() {
    let mut deck = Deck::new_with_seed(12);
    let mut hand = HandEngine::new(&roster(&[500, 500]), 0, (50, 100), 1, 2, &mut deck).unwrap();

    hand.apply(0, Action::Raise { amount: 500 }).unwrap();
    assert!(!hand.is_over());
    hand.apply(1, Action::Call).unwrap();
    assert!(hand.is_over());
    assert_eq!(hand.actor_seat(), None);
    assert_eq!(hand.result().unwrap().community_cards.len(), 5);
}

#[test]
fn showdown_winner_matches_the_evaluator() {
    let mut deck = Deck::new_with_seed(13);
    let mut hand =
        HandEngine::new(&roster(&[10_000, 10_000]), 0, (50, 100), 1, 2, &mut deck).unwrap();

    hand.apply(0, Action::Call).unwrap();
    hand.apply(1, Action::Check).unwrap();
    for _ in 0..3 {
        hand.apply(1, Action::Check).unwrap();
        hand.apply(0, Action::Check).unwrap();
    }

    let snap = hand.snapshot();
    let result = hand.result().unwrap();

    let strength = |seat: usize| {
        let p = snap.players.iter().find(|p| p.seat == seat).unwrap();
        let mut cards = p.hole_cards.to_vec();
        cards.extend_from_slice(&result.community_cards);
        evaluate_hand(&cards)
    };

    let a = strength(0);
    let b = strength(1);
    if a == b {
        // split pot: each gets their blind back, no net winners
        assert!(result.winners.is_empty());
    } else {
        let expected = if a > b { 0 } else { 1 };
        assert_eq!(result.winners.len(), 1);
        assert_eq!(result.winners[0].seat, expected);
        assert_eq!(result.winners[0].amount_won, 100);
    }
}

#[test]
fn folded_players_never_show_and_never_win() {
    let mut deck = Deck::new_with_seed(14);
    let mut hand = HandEngine::new(
        &roster(&[10_000, 10_000, 10_000]),
        0,
        (50, 100),
        1,
        3,
        &mut deck,
    )
    .unwrap();

    hand.apply(0, Action::Fold).unwrap();
    hand.apply(1, Action::Call).unwrap();
    hand.apply(2, Action::Check).unwrap();
    for _ in 0..3 {
        hand.apply(1, Action::Check).unwrap();
        hand.apply(2, Action::Check).unwrap();
    }
    assert!(hand.is_over());

    let result = hand.result().unwrap();
    let shown: Vec<usize> = result.hole_cards_revealed.iter().map(|r| r.seat).collect();
    assert!(!shown.contains(&0));
    assert!(result.winners.iter().all(|w| w.seat != 0));
}

#[test]
fn winners_report_net_gains() {
    let mut deck = Deck::new_with_seed(15);
    let mut hand = HandEngine::new(&roster(&[400, 400]), 0, (50, 100), 1, 2, &mut deck).unwrap();

    hand.apply(0, Action::Raise { amount: 400 }).unwrap();
    hand.apply(1, Action::Call).unwrap();
    let result = hand.result().unwrap();

    match result.winners.as_slice() {
        // one side scoops: net gain is the loser's 400
        [w] => {
            assert_eq!(w.amount_won, 400);
            let loser = 1 - w.seat;
            assert_eq!(
                result.final_stacks,
                if w.seat == 0 {
                    vec![(0, 800), (1, 0)]
                } else {
                    vec![(0, 0), (1, 800)]
                }
            );
            assert_eq!(loser + w.seat, 1);
        }
        // chopped: both stacks return to 400 and nobody nets chips
        [] => assert_eq!(result.final_stacks, vec![(0, 400), (1, 400)]),
        other => panic!("unexpected winners: {other:?}"),
    }
}

#[test]
fn fold_win_mid_street_skips_remaining_streets() {
    let mut deck = Deck::new_with_seed(16);
    let mut hand =
        HandEngine::new(&roster(&[10_000, 10_000]), 0, (50, 100), 1, 2, &mut deck).unwrap();

    hand.apply(0, Action::Call).unwrap();
    hand.apply(1, Action::Check).unwrap();
    // flop betting: a bet and a fold end the hand on three cards
    hand.apply(1, Action::Raise { amount: 200 }).unwrap();
    hand.apply(0, Action::Fold).unwrap();
    assert!(hand.is_over());

    let result = hand.result().unwrap();
    assert_eq!(result.community_cards.len(), 3);
    assert_eq!(result.winners.len(), 1);
    assert_eq!(result.winners[0].seat, 1);
    assert_eq!(result.winners[0].amount_won, 100);
    assert!(result.hole_cards_revealed.is_empty());
}
