use crate::cards::{Card, Suit};

/// Hand category in ascending strength order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Category {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// Totally ordered rank key for a best five-card hand.
///
/// Ordering is category first, then the kicker array lexicographically
/// (kickers are stored high to low), so `Ord` alone decides showdowns and
/// `==` means a split pot.
///
/// ```
/// use pokerd_engine::cards::Card;
/// use pokerd_engine::hand::{evaluate_hand, Category};
///
/// let cards: Vec<Card> = ["Ah", "Kh", "Qh", "Jh", "Th", "2c", "3d"]
///     .iter()
///     .map(|s| s.parse().unwrap())
///     .collect();
/// assert_eq!(evaluate_hand(&cards).category, Category::StraightFlush);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct HandStrength {
    pub category: Category,
    // kickers: ordered high -> low for tiebreaks
    pub kickers: [u8; 5],
}

/// Evaluates the best five-card poker hand from 5 to 7 cards
/// (2 hole cards plus a 3-to-5 card board).
///
/// The wheel (A-2-3-4-5) counts as a 5-high straight. Callers must pass
/// at least five distinct cards; this is enforced upstream by the deal.
pub fn evaluate_hand(cards: &[Card]) -> HandStrength {
    debug_assert!((5..=7).contains(&cards.len()));

    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut by_suit: [Vec<u8>; 4] = [vec![], vec![], vec![], vec![]];
    for &c in cards {
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        by_suit[suit_index(c.suit)].push(r);
    }

    let flush_suit = (0..4usize).find(|&s| by_suit[s].len() >= 5);

    if let Some(s) = flush_suit {
        let mut suited = by_suit[s].clone();
        suited.sort_unstable();
        suited.dedup();
        if let Some(high) = straight_high(&suited) {
            return HandStrength {
                category: Category::StraightFlush,
                kickers: [high, 0, 0, 0, 0],
            };
        }
    }

    if let Some((quad, kicker)) = find_quads(&rank_counts) {
        return HandStrength {
            category: Category::FourOfAKind,
            kickers: [quad, kicker, 0, 0, 0],
        };
    }

    if let Some((trip, pair)) = find_full_house(&rank_counts) {
        return HandStrength {
            category: Category::FullHouse,
            kickers: [trip, pair, 0, 0, 0],
        };
    }

    if let Some(s) = flush_suit {
        let mut suited = by_suit[s].clone();
        suited.sort_unstable_by(|a, b| b.cmp(a));
        let mut kickers = [0u8; 5];
        kickers.copy_from_slice(&suited[..5]);
        return HandStrength {
            category: Category::Flush,
            kickers,
        };
    }

    let mut uniq: Vec<u8> = (2..=14).filter(|&r| rank_counts[r as usize] > 0).collect();
    uniq.dedup();
    if let Some(high) = straight_high(&uniq) {
        return HandStrength {
            category: Category::Straight,
            kickers: [high, 0, 0, 0, 0],
        };
    }

    let (trips, pairs, singles) = group_by_count(&rank_counts);

    if let Some(&t) = trips.first() {
        let mut rest: Vec<u8> = pairs.iter().chain(singles.iter()).copied().collect();
        rest.sort_unstable_by(|a, b| b.cmp(a));
        let mut kickers = [t, 0, 0, 0, 0];
        kickers[1] = rest.first().copied().unwrap_or(0);
        kickers[2] = rest.get(1).copied().unwrap_or(0);
        return HandStrength {
            category: Category::ThreeOfAKind,
            kickers,
        };
    }

    if pairs.len() >= 2 {
        let mut prs = pairs.clone();
        prs.sort_unstable_by(|a, b| b.cmp(a));
        // with three pairs in 7 cards, the lowest pair rank competes as a kicker
        let mut rest: Vec<u8> = prs[2..].iter().chain(singles.iter()).copied().collect();
        rest.sort_unstable_by(|a, b| b.cmp(a));
        let mut kickers = [prs[0], prs[1], 0, 0, 0];
        kickers[2] = rest.first().copied().unwrap_or(0);
        return HandStrength {
            category: Category::TwoPair,
            kickers,
        };
    }

    if let Some(&p) = pairs.first() {
        let mut rest = singles.clone();
        rest.sort_unstable_by(|a, b| b.cmp(a));
        let mut kickers = [p, 0, 0, 0, 0];
        for i in 0..3 {
            kickers[i + 1] = rest.get(i).copied().unwrap_or(0);
        }
        return HandStrength {
            category: Category::OnePair,
            kickers,
        };
    }

    let mut highs = singles;
    highs.sort_unstable_by(|a, b| b.cmp(a));
    let mut kickers = [0u8; 5];
    for (i, k) in kickers.iter_mut().enumerate() {
        *k = highs.get(i).copied().unwrap_or(0);
    }
    HandStrength {
        category: Category::HighCard,
        kickers,
    }
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

/// Highest straight top card in a sorted, deduplicated ascending rank
/// list, or None. An Ace additionally counts as 1 for the wheel.
fn straight_high(sorted_unique: &[u8]) -> Option<u8> {
    let mut ranks = sorted_unique.to_vec();
    if ranks.binary_search(&14).is_ok() {
        ranks.insert(0, 1);
    }

    let mut run = 1u8;
    let mut best = None;
    for i in 1..ranks.len() {
        if ranks[i] == ranks[i - 1] + 1 {
            run += 1;
            if run >= 5 {
                best = Some(ranks[i]);
            }
        } else {
            run = 1;
        }
    }
    best
}

fn find_quads(rank_counts: &[u8; 15]) -> Option<(u8, u8)> {
    let quad = (2..=14u8).rev().find(|&r| rank_counts[r as usize] == 4)?;
    let kicker = (2..=14u8)
        .rev()
        .find(|&r| r != quad && rank_counts[r as usize] > 0)
        .unwrap_or(0);
    Some((quad, kicker))
}

fn find_full_house(rank_counts: &[u8; 15]) -> Option<(u8, u8)> {
    let mut trips: Vec<u8> = (2..=14u8)
        .rev()
        .filter(|&r| rank_counts[r as usize] == 3)
        .collect();
    let top_trip = *trips.first()?;
    // a second set of trips supplies the pair half
    if trips.len() >= 2 {
        return Some((top_trip, trips.remove(1)));
    }
    let top_pair = (2..=14u8).rev().find(|&r| rank_counts[r as usize] == 2)?;
    Some((top_trip, top_pair))
}

fn group_by_count(rank_counts: &[u8; 15]) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut trips = vec![];
    let mut pairs = vec![];
    let mut singles = vec![];
    for r in 2..=14u8 {
        match rank_counts[r as usize] {
            3 => trips.push(r),
            2 => pairs.push(r),
            1 => singles.push(r),
            _ => {}
        }
    }
    trips.sort_unstable_by(|a, b| b.cmp(a));
    pairs.sort_unstable_by(|a, b| b.cmp(a));
    (trips, pairs, singles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(strs: &[&str]) -> Vec<Card> {
        strs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn categories_order_as_poker_rules() {
        assert!(Category::HighCard < Category::OnePair);
        assert!(Category::OnePair < Category::TwoPair);
        assert!(Category::TwoPair < Category::ThreeOfAKind);
        assert!(Category::ThreeOfAKind < Category::Straight);
        assert!(Category::Straight < Category::Flush);
        assert!(Category::Flush < Category::FullHouse);
        assert!(Category::FullHouse < Category::FourOfAKind);
        assert!(Category::FourOfAKind < Category::StraightFlush);
    }

    #[test]
    fn wheel_is_a_five_high_straight() {
        let s = evaluate_hand(&hand(&["Ah", "2c", "3d", "4s", "5h", "9c", "Jd"]));
        assert_eq!(s.category, Category::Straight);
        assert_eq!(s.kickers[0], 5);
    }

    #[test]
    fn ace_high_straight_beats_wheel() {
        let wheel = evaluate_hand(&hand(&["Ah", "2c", "3d", "4s", "5h"]));
        let broadway = evaluate_hand(&hand(&["Ah", "Kc", "Qd", "Js", "Th"]));
        assert!(broadway > wheel);
    }

    #[test]
    fn five_card_board_only_evaluates() {
        let s = evaluate_hand(&hand(&["2c", "2d", "9h", "9s", "Kd"]));
        assert_eq!(s.category, Category::TwoPair);
        assert_eq!(s.kickers[..3], [9, 2, 13]);
    }

    #[test]
    fn three_pairs_keep_the_best_two() {
        let s = evaluate_hand(&hand(&["5c", "5d", "9h", "9s", "Kd", "Kc", "3h"]));
        assert_eq!(s.category, Category::TwoPair);
        // third pair's five outkicks the loose three
        assert_eq!(s.kickers[..3], [13, 9, 5]);
    }

    #[test]
    fn full_house_from_two_sets_of_trips() {
        let s = evaluate_hand(&hand(&["7c", "7d", "7h", "4s", "4d", "4c", "Ah"]));
        assert_eq!(s.category, Category::FullHouse);
        assert_eq!(s.kickers[..2], [7, 4]);
    }

    #[test]
    fn flush_picks_the_five_highest_suited() {
        let s = evaluate_hand(&hand(&["2h", "5h", "9h", "Jh", "Kh", "Ah", "3c"]));
        assert_eq!(s.category, Category::Flush);
        assert_eq!(s.kickers, [14, 13, 11, 9, 5]);
    }

    #[test]
    fn straight_flush_outranks_plain_quads() {
        let sf = evaluate_hand(&hand(&["5h", "6h", "7h", "8h", "9h", "Ac", "Ad"]));
        let quads = evaluate_hand(&hand(&["Ac", "Ad", "Ah", "As", "Kc", "Qd", "2h"]));
        assert!(sf > quads);
    }

    #[test]
    fn kickers_break_pair_ties() {
        let a = evaluate_hand(&hand(&["Ac", "Ad", "Kh", "8s", "4c", "3d", "2h"]));
        let b = evaluate_hand(&hand(&["Ah", "As", "Qh", "8d", "4d", "3c", "2s"]));
        assert!(a > b);
    }

    #[test]
    fn identical_boards_split() {
        let board = ["Ac", "Kd", "Qh", "Js", "Tc"];
        let a = evaluate_hand(&hand(&[&board[..], &["2c", "3d"][..]].concat()));
        let b = evaluate_hand(&hand(&[&board[..], &["2h", "3s"][..]].concat()));
        assert_eq!(a, b);
    }
}
