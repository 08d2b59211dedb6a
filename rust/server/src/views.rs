//! Per-recipient projection of the canonical hand snapshot.
//!
//! The engine's snapshot carries every hole card; nothing derived from
//! it may be shared between recipients. Each outbound `game_state` is
//! built fresh here with only the recipient's own cards in cleartext.

use pokerd_engine::hand_engine::HandSnapshot;

use crate::protocol::{valid_action_views, GameStateView, PlayerView, PotEntry, PotView};

pub const MASKED_CARD: &str = "??";

/// Project the canonical snapshot for one recipient seat.
pub fn project_game_state(snapshot: &HandSnapshot, perspective_seat: usize) -> GameStateView {
    let players = snapshot
        .players
        .iter()
        .map(|p| {
            let known = p.seat == perspective_seat;
            let hole_cards = if known {
                p.hole_cards.iter().map(|c| c.to_string()).collect()
            } else {
                vec![MASKED_CARD.to_string(), MASKED_CARD.to_string()]
            };
            PlayerView {
                seat: p.seat,
                name: p.name.clone(),
                stack: p.stack,
                current_bet: p.current_bet,
                is_active: p.is_active,
                is_all_in: p.is_all_in,
                is_dealer: p.is_dealer,
                is_small_blind: p.is_small_blind,
                is_big_blind: p.is_big_blind,
                hole_cards,
                hole_cards_known: known,
            }
        })
        .collect();

    GameStateView {
        street: snapshot.street.as_str().to_string(),
        hand_number: snapshot.hand_number,
        community_cards: snapshot
            .community_cards
            .iter()
            .map(|c| c.to_string())
            .collect(),
        pot: PotView {
            total: snapshot.pot_total,
            pots: snapshot
                .pots
                .iter()
                .map(|p| PotEntry {
                    amount: p.amount,
                    eligible_seats: p.eligible_seats.clone(),
                })
                .collect(),
        },
        players,
        actor_seat: snapshot.actor_seat,
        valid_actions: snapshot
            .valid_actions
            .as_ref()
            .map(valid_action_views)
            .unwrap_or_default(),
        dealer_seat: snapshot.dealer_seat,
        small_blind_seat: snapshot.small_blind_seat,
        big_blind_seat: snapshot.big_blind_seat,
        small_blind_amount: snapshot.small_blind_amount,
        big_blind_amount: snapshot.big_blind_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokerd_engine::deck::Deck;
    use pokerd_engine::hand_engine::{HandEngine, HandPlayer};

    fn snapshot() -> HandSnapshot {
        let roster: Vec<HandPlayer> = (0..3)
            .map(|seat| HandPlayer {
                seat,
                name: format!("bot{seat}"),
                stack: 10_000,
            })
            .collect();
        let mut deck = Deck::new_with_seed(1);
        HandEngine::new(&roster, 0, (50, 100), 1, 3, &mut deck)
            .unwrap()
            .snapshot()
    }

    #[test]
    fn only_the_recipient_sees_its_cards() {
        let snap = snapshot();
        for perspective in 0..3 {
            let view = project_game_state(&snap, perspective);
            for p in &view.players {
                if p.seat == perspective {
                    assert!(p.hole_cards_known);
                    assert!(p.hole_cards.iter().all(|c| c != MASKED_CARD));
                } else {
                    assert!(!p.hole_cards_known);
                    assert_eq!(p.hole_cards, vec![MASKED_CARD, MASKED_CARD]);
                }
            }
        }
    }

    #[test]
    fn projections_share_everything_but_the_cards() {
        let snap = snapshot();
        let a = project_game_state(&snap, 0);
        let b = project_game_state(&snap, 1);
        assert_eq!(a.street, b.street);
        assert_eq!(a.pot, b.pot);
        assert_eq!(a.actor_seat, b.actor_seat);
        assert_eq!(a.valid_actions, b.valid_actions);
        assert_eq!(a.community_cards, b.community_cards);
    }

    #[test]
    fn view_carries_positions_and_blinds() {
        let view = project_game_state(&snapshot(), 0);
        assert_eq!(view.street, "preflop");
        assert_eq!(view.dealer_seat, 0);
        assert_eq!(view.small_blind_seat, 1);
        assert_eq!(view.big_blind_seat, 2);
        assert_eq!(view.small_blind_amount, 50);
        assert_eq!(view.big_blind_amount, 100);
        assert_eq!(view.pot.total, 150);
    }
}
