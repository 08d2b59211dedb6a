use pokerd_engine::deck::Deck;
use pokerd_engine::hand_engine::HandEngine;
use pokerd_engine::rules::Action;
use pokerd_engine::tournament::Tournament;

/// Plays whole hands by folding every decision to the big blind, which
/// is enough to exercise rotation, escalation and elimination.
fn fold_out_hand(t: &mut Tournament, deck: &mut Deck) {
    let total_seats = t.player_count();
    let (roster, dealer, blinds) = t.next_hand();
    let mut hand = HandEngine::new(
        &roster,
        dealer,
        blinds,
        t.hand_number(),
        total_seats,
        deck,
    )
    .unwrap();
    while let Some(seat) = hand.actor_seat() {
        hand.apply(seat, Action::Fold).unwrap();
    }
    let result = hand.result().unwrap();
    t.apply_hand_result(&result.final_stacks);
}

#[test]
fn blinds_bleed_stacks_and_chips_conserve() {
    let mut t = Tournament::new();
    t.register("alice").unwrap();
    t.register("bob").unwrap();
    t.register("carol").unwrap();
    t.start();

    let mut deck = Deck::new_with_seed(21);
    for _ in 0..12 {
        fold_out_hand(&mut t, &mut deck);
        let total: u32 = t.stacks().iter().sum();
        assert_eq!(total, 30_000);
    }
    assert_eq!(t.hand_number(), 12);
}

/// Shoves every stack in at every decision, forcing showdowns until
/// somebody busts.
fn shove_out_hand(t: &mut Tournament, deck: &mut Deck) {
    let total_seats = t.player_count();
    let (roster, dealer, blinds) = t.next_hand();
    let mut hand = HandEngine::new(
        &roster,
        dealer,
        blinds,
        t.hand_number(),
        total_seats,
        deck,
    )
    .unwrap();
    while let Some(seat) = hand.actor_seat() {
        let v = hand.valid_actions().unwrap();
        let action = if v.raise_bounds.is_some() {
            Action::Raise { amount: u32::MAX }
        } else if v.call_amount.is_some() {
            Action::Call
        } else {
            Action::Check
        };
        hand.apply(seat, action).unwrap();
    }
    let result = hand.result().unwrap();
    t.apply_hand_result(&result.final_stacks);
}

#[test]
fn tournament_ends_when_one_player_holds_the_chips() {
    let mut t = Tournament::new();
    t.register("alice").unwrap();
    t.register("bob").unwrap();
    t.start();

    let mut deck = Deck::new_with_seed(22);
    let mut guard = 0;
    while !t.is_over() {
        shove_out_hand(&mut t, &mut deck);
        guard += 1;
        assert!(guard < 200, "tournament must terminate");
    }

    let winner = t.winner().expect("sole survivor");
    assert_eq!(winner.stack, 20_000);
    let loser = t
        .players()
        .iter()
        .find(|p| p.seat != winner.seat)
        .unwrap();
    assert!(loser.is_eliminated);
    assert_eq!(loser.stack, 0);
}

#[test]
fn seats_survive_elimination() {
    let mut t = Tournament::new();
    t.register("alice").unwrap();
    t.register("bob").unwrap();
    t.register("carol").unwrap();
    t.start();
    t.next_hand();
    t.apply_hand_result(&[(1, 0)]);

    // the roster keeps three entries; seat numbers never shift
    assert_eq!(t.players().len(), 3);
    assert_eq!(t.player(1).unwrap().name, "bob");
    assert!(t.player(1).unwrap().is_eliminated);
    assert_eq!(t.player(2).unwrap().name, "carol");
    assert_eq!(t.player(2).unwrap().seat, 2);
}
