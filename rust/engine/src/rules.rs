/// A wagering decision as submitted by a player. Raise amounts are the
/// total bet the street goes to, not the increment.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise { amount: u32 },
}

/// The legal action set at one decision point, as advertised to the
/// actor. `call.amount` is what the actor still owes (capped at stack);
/// `raise` bounds are total bet sizes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ValidActions {
    pub can_check: bool,
    pub call_amount: Option<u32>,
    pub raise_bounds: Option<(u32, u32)>,
}

/// Compute the legal actions for a player facing `max_bet` this street.
///
/// Fold is always legal during a betting round. Check requires a
/// matched bet. A raise requires chips beyond the call and, after a
/// short all-in, may be withheld (`raise_barred`) for players whose
/// action was already closed.
pub fn valid_actions(
    stack: u32,
    current_bet: u32,
    max_bet: u32,
    min_raise_increment: u32,
    raise_barred: bool,
) -> ValidActions {
    let owed = max_bet.saturating_sub(current_bet);
    let can_check = owed == 0;
    let call_amount = if can_check { None } else { Some(owed.min(stack)) };

    let raise_bounds = if stack > owed && !raise_barred {
        let all_in_to = current_bet + stack;
        let min_to = all_in_to.min(max_bet + min_raise_increment);
        Some((min_to, all_in_to))
    } else {
        None
    };

    ValidActions {
        can_check,
        call_amount,
        raise_bounds,
    }
}

/// Blinds by hand number (1-indexed). Levels step at hands 10, 20, 30,
/// 40 and 50; later hands stay at the final level.
pub fn blinds_for_hand(hand_number: u32) -> (u32, u32) {
    match hand_number {
        0..=9 => (50, 100),
        10..=19 => (100, 200),
        20..=29 => (200, 400),
        30..=39 => (400, 800),
        40..=49 => (800, 1600),
        _ => (1600, 3200),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_bet_allows_check_not_call() {
        let v = valid_actions(1000, 100, 100, 100, false);
        assert!(v.can_check);
        assert_eq!(v.call_amount, None);
        assert_eq!(v.raise_bounds, Some((200, 1100)));
    }

    #[test]
    fn unmatched_bet_allows_call_not_check() {
        let v = valid_actions(1000, 0, 100, 100, false);
        assert!(!v.can_check);
        assert_eq!(v.call_amount, Some(100));
        assert_eq!(v.raise_bounds, Some((200, 1000)));
    }

    #[test]
    fn call_amount_caps_at_stack() {
        let v = valid_actions(60, 0, 100, 100, false);
        assert_eq!(v.call_amount, Some(60));
        assert_eq!(v.raise_bounds, None);
    }

    #[test]
    fn short_stack_min_raise_is_its_all_in() {
        // full min-raise would be to 400, but the stack only reaches 310
        let v = valid_actions(300, 10, 200, 200, false);
        assert_eq!(v.raise_bounds, Some((310, 310)));
    }

    #[test]
    fn raise_barred_removes_the_raise_option_only() {
        let v = valid_actions(1000, 200, 250, 100, true);
        assert_eq!(v.call_amount, Some(50));
        assert_eq!(v.raise_bounds, None);
    }

    #[test]
    fn blind_schedule_steps_and_caps() {
        assert_eq!(blinds_for_hand(1), (50, 100));
        assert_eq!(blinds_for_hand(9), (50, 100));
        assert_eq!(blinds_for_hand(10), (100, 200));
        assert_eq!(blinds_for_hand(20), (200, 400));
        assert_eq!(blinds_for_hand(30), (400, 800));
        assert_eq!(blinds_for_hand(40), (800, 1600));
        assert_eq!(blinds_for_hand(50), (1600, 3200));
        assert_eq!(blinds_for_hand(500), (1600, 3200));
    }
}
