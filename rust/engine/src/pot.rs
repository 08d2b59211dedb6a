use std::collections::BTreeMap;

/// One pot tier: the chips in it and the seats that can win it.
/// `eligible_seats` is sorted ascending for stable wire output.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Pot {
    pub amount: u32,
    pub eligible_seats: Vec<usize>,
}

/// Partitions committed chips into a main pot and side pots.
///
/// Built from each seat's total commitment across all streets of one
/// hand. Distinct commitment levels, ascending, cut the chips into
/// tiers; a tier is winnable only by non-folded seats committed at or
/// above its level. Tiers nobody can win (their contributors all
/// folded) collapse into the neighbouring contested pot, so every chip
/// ends up in exactly one winnable pot.
#[derive(Debug, Clone)]
pub struct PotLedger {
    committed: BTreeMap<usize, u32>,
}

impl PotLedger {
    pub fn new() -> Self {
        Self {
            committed: BTreeMap::new(),
        }
    }

    /// Sweep a seat's street bet into its total commitment.
    pub fn commit(&mut self, seat: usize, chips: u32) {
        if chips > 0 {
            *self.committed.entry(seat).or_insert(0) += chips;
        }
    }

    pub fn committed(&self, seat: usize) -> u32 {
        self.committed.get(&seat).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.committed.values().sum()
    }

    /// Build the pot list. `live` must report false for folded seats.
    pub fn pots(&self, live: impl Fn(usize) -> bool) -> Vec<Pot> {
        let mut levels: Vec<u32> = self.committed.values().copied().filter(|&c| c > 0).collect();
        levels.sort_unstable();
        levels.dedup();

        let mut pots: Vec<Pot> = Vec::new();
        let mut carry = 0u32;
        let mut prev_level = 0u32;
        for &level in &levels {
            let mut amount = carry;
            let mut eligible = Vec::new();
            for (&seat, &c) in &self.committed {
                amount += c.min(level) - c.min(prev_level);
                if live(seat) && c >= level {
                    eligible.push(seat);
                }
            }
            prev_level = level;
            if eligible.is_empty() {
                // nobody can win this tier; roll it into the next one
                carry = amount;
                continue;
            }
            carry = 0;
            pots.push(Pot {
                amount,
                eligible_seats: eligible,
            });
        }
        // a top tier whose sole contributors folded falls to the last
        // contested pot
        if carry > 0 {
            if let Some(last) = pots.last_mut() {
                last.amount += carry;
            }
        }
        pots
    }

    /// Distribute every pot to its winners and return gross payouts per
    /// seat.
    ///
    /// `best_seats` picks the winning subset of a pot's eligible seats
    /// (showdown comparison, or the sole survivor on a fold-out). Equal
    /// shares round down; odd chips go one at a time to winners in
    /// clockwise order starting at the first seat after the dealer.
    pub fn distribute(
        &self,
        live: impl Fn(usize) -> bool,
        best_seats: impl Fn(&[usize]) -> Vec<usize>,
        dealer_seat: usize,
        total_seats: usize,
    ) -> BTreeMap<usize, u32> {
        let mut payouts: BTreeMap<usize, u32> = BTreeMap::new();
        for pot in self.pots(live) {
            let winners = best_seats(&pot.eligible_seats);
            debug_assert!(!winners.is_empty());
            let share = pot.amount / winners.len() as u32;
            let mut remainder = pot.amount % winners.len() as u32;

            for &seat in &winners {
                *payouts.entry(seat).or_insert(0) += share;
            }
            // odd chips clockwise from dealer+1
            let mut ordered = winners.clone();
            ordered.sort_unstable_by_key(|&seat| {
                (seat + total_seats - (dealer_seat + 1) % total_seats) % total_seats
            });
            for &seat in ordered.iter().cycle() {
                if remainder == 0 {
                    break;
                }
                *payouts.entry(seat).or_insert(0) += 1;
                remainder -= 1;
            }
        }
        payouts
    }
}

impl Default for PotLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(contribs: &[(usize, u32)]) -> PotLedger {
        let mut l = PotLedger::new();
        for &(seat, chips) in contribs {
            l.commit(seat, chips);
        }
        l
    }

    #[test]
    fn equal_commitments_make_one_pot() {
        let l = ledger(&[(0, 1000), (1, 1000)]);
        let pots = l.pots(|_| true);
        assert_eq!(
            pots,
            vec![Pot {
                amount: 2000,
                eligible_seats: vec![0, 1],
            }]
        );
    }

    #[test]
    fn three_way_all_in_builds_tiered_side_pots() {
        // stacks 300 / 1000 / 2000, everyone all-in
        let l = ledger(&[(0, 300), (1, 1000), (2, 2000)]);
        let pots = l.pots(|_| true);
        assert_eq!(pots.len(), 3);
        assert_eq!(pots[0].amount, 900);
        assert_eq!(pots[0].eligible_seats, vec![0, 1, 2]);
        assert_eq!(pots[1].amount, 1400);
        assert_eq!(pots[1].eligible_seats, vec![1, 2]);
        assert_eq!(pots[2].amount, 1000);
        assert_eq!(pots[2].eligible_seats, vec![2]);
    }

    #[test]
    fn folded_seats_fund_pots_they_cannot_win() {
        let l = ledger(&[(0, 500), (1, 500), (2, 200)]);
        let pots = l.pots(|seat| seat != 2);
        assert_eq!(
            pots,
            vec![Pot {
                amount: 1200,
                eligible_seats: vec![0, 1],
            }]
        );
    }

    #[test]
    fn overcommitted_folder_tops_up_the_last_contested_pot() {
        // seat 2 raised beyond everyone then folded
        let l = ledger(&[(0, 400), (1, 400), (2, 900)]);
        let pots = l.pots(|seat| seat != 2);
        assert_eq!(
            pots,
            vec![Pot {
                amount: 1700,
                eligible_seats: vec![0, 1],
            }]
        );
    }

    #[test]
    fn distribution_conserves_chips() {
        let l = ledger(&[(0, 300), (1, 1000), (2, 2000)]);
        let payouts = l.distribute(|_| true, |eligible| vec![eligible[0]], 0, 3);
        let total: u32 = payouts.values().sum();
        assert_eq!(total, l.total());
    }

    #[test]
    fn uncontested_side_pot_returns_to_its_owner() {
        let l = ledger(&[(0, 300), (1, 1000), (2, 2000)]);
        // seat 0 wins everything it can contest
        let payouts = l.distribute(|_| true, |eligible| vec![eligible[0]], 0, 3);
        assert_eq!(payouts[&0], 900);
        assert_eq!(payouts[&1], 1400);
        assert_eq!(payouts[&2], 1000);
    }

    #[test]
    fn odd_chip_goes_clockwise_from_dealer_plus_one() {
        // 201-chip pot split two ways leaves one odd chip; with the
        // dealer at seat 1, seat 2 is first in the clockwise rotation
        let l = ledger(&[(0, 67), (1, 67), (2, 67)]);
        let payouts = l.distribute(|_| true, |_| vec![0, 2], 1, 3);
        assert_eq!(payouts[&2], 101);
        assert_eq!(payouts[&0], 100);
        assert_eq!(payouts.get(&1), None);
    }

    #[test]
    fn three_way_tie_remainder_rotates_from_dealer_left() {
        // seat 3 folded after matching, so 268 chips split three ways
        // leaves one odd chip for seat 1, nearest left of dealer 0
        let l = ledger(&[(0, 67), (1, 67), (2, 67), (3, 67)]);
        let payouts = l.distribute(|seat| seat != 3, |e| e.to_vec(), 0, 4);
        assert_eq!(payouts[&1], 90);
        assert_eq!(payouts[&2], 89);
        assert_eq!(payouts[&0], 89);
    }
}
