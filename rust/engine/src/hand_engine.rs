use std::collections::BTreeSet;

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::EngineError;
use crate::hand::evaluate_hand;
use crate::pot::{Pot, PotLedger};
use crate::rules::{valid_actions, Action, ValidActions};

/// Betting street, including the terminal showdown state reported once
/// the hand is over.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    pub fn as_str(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
            Street::Showdown => "showdown",
        }
    }

    fn community_len(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River | Street::Showdown => 5,
        }
    }
}

/// Roster entry handed to a new hand: permanent seat, display name and
/// the stack the player brings in.
#[derive(Debug, Clone)]
pub struct HandPlayer {
    pub seat: usize,
    pub name: String,
    pub stack: u32,
}

#[derive(Debug, Clone)]
struct SeatState {
    seat: usize,
    name: String,
    stack: u32,
    hole_cards: [Card; 2],
    is_active: bool,
    is_all_in: bool,
    current_bet: u32,
}

/// The action as actually applied, after server-side normalization.
/// `raise_to` carries the clamped total for raises.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AppliedAction {
    Fold,
    Check,
    Call { paid: u32 },
    Raise { to: u32 },
}

/// Canonical per-seat view in a snapshot. Hole cards are always present
/// here; masking for opponents happens at the session layer.
#[derive(Debug, Clone)]
pub struct SeatSnapshot {
    pub seat: usize,
    pub name: String,
    pub stack: u32,
    pub current_bet: u32,
    pub is_active: bool,
    pub is_all_in: bool,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub hole_cards: [Card; 2],
}

/// Canonical snapshot of a hand in progress, from which all outbound
/// game states are projected.
#[derive(Debug, Clone)]
pub struct HandSnapshot {
    pub hand_number: u32,
    pub street: Street,
    pub community_cards: Vec<Card>,
    pub pot_total: u32,
    pub pots: Vec<Pot>,
    pub players: Vec<SeatSnapshot>,
    pub actor_seat: Option<usize>,
    pub valid_actions: Option<ValidActions>,
    pub dealer_seat: usize,
    pub small_blind_seat: usize,
    pub big_blind_seat: usize,
    pub small_blind_amount: u32,
    pub big_blind_amount: u32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HandWinner {
    pub seat: usize,
    pub name: String,
    pub amount_won: u32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RevealedCards {
    pub seat: usize,
    pub name: String,
    pub hole_cards: [Card; 2],
}

/// Outcome of a finished hand. `winners` report net gains (chips won
/// minus own commitment); `final_stacks` are keyed by roster order.
#[derive(Debug, Clone)]
pub struct HandResult {
    pub winners: Vec<HandWinner>,
    pub hole_cards_revealed: Vec<RevealedCards>,
    pub community_cards: Vec<Card>,
    pub final_stacks: Vec<(usize, u32)>,
}

/// One hand of no-limit hold'em from deal to payout.
///
/// Owns the betting micro-machine for each street: who is pending, what
/// the minimum raise is, and whether a short all-in has barred anyone
/// from re-raising. The session layer drives it through `actor_seat` /
/// `valid_actions` / `apply` until `is_over`, then reads `result`.
#[derive(Debug)]
pub struct HandEngine {
    hand_number: u32,
    dealer_seat: usize,
    sb_seat: usize,
    bb_seat: usize,
    sb_amount: u32,
    bb_amount: u32,
    total_seats: usize,
    seats: Vec<SeatState>,
    board: [Card; 5],
    street: Street,
    // community cards actually dealt; lags the street on a fold-win
    dealt: usize,
    ledger: PotLedger,
    min_raise_increment: u32,
    last_aggressor_seat: Option<usize>,
    pending: BTreeSet<usize>,
    raise_barred: BTreeSet<usize>,
    actor: Option<usize>,
    over: bool,
}

impl HandEngine {
    /// Shuffle, post blinds, and deal a new hand.
    ///
    /// `roster` must hold 2-9 players in ascending seat order with the
    /// dealer among them; `total_seats` is the tournament's seat count,
    /// used for clockwise arithmetic on permanent seat numbers.
    pub fn new(
        roster: &[HandPlayer],
        dealer_seat: usize,
        blinds: (u32, u32),
        hand_number: u32,
        total_seats: usize,
        deck: &mut Deck,
    ) -> Result<Self, EngineError> {
        let n = roster.len();
        if !(2..=9).contains(&n) {
            return Err(EngineError::BadPlayerCount(n));
        }
        let dealer_idx = roster
            .iter()
            .position(|p| p.seat == dealer_seat)
            .ok_or(EngineError::UnknownSeat(dealer_seat))?;

        // heads-up: the dealer posts the small blind
        let (sb_idx, bb_idx) = if n == 2 {
            (dealer_idx, (dealer_idx + 1) % n)
        } else {
            ((dealer_idx + 1) % n, (dealer_idx + 2) % n)
        };

        deck.shuffle();
        let mut seats: Vec<SeatState> = Vec::with_capacity(n);
        for p in roster {
            seats.push(SeatState {
                seat: p.seat,
                name: p.name.clone(),
                stack: p.stack,
                hole_cards: [deck.deal_card()?, deck.deal_card()?],
                is_active: true,
                is_all_in: false,
                current_bet: 0,
            });
        }
        deck.burn_card()?;
        let flop = [deck.deal_card()?, deck.deal_card()?, deck.deal_card()?];
        deck.burn_card()?;
        let turn = deck.deal_card()?;
        deck.burn_card()?;
        let river = deck.deal_card()?;
        let board = [flop[0], flop[1], flop[2], turn, river];

        let (sb_amount, bb_amount) = blinds;
        let sb_seat = seats[sb_idx].seat;
        let bb_seat = seats[bb_idx].seat;

        let mut engine = HandEngine {
            hand_number,
            dealer_seat,
            sb_seat,
            bb_seat,
            sb_amount,
            bb_amount,
            total_seats,
            seats,
            board,
            street: Street::Preflop,
            dealt: 0,
            ledger: PotLedger::new(),
            min_raise_increment: bb_amount,
            last_aggressor_seat: Some(bb_seat),
            pending: BTreeSet::new(),
            raise_barred: BTreeSet::new(),
            actor: None,
            over: false,
        };

        engine.post_blind(sb_idx, sb_amount);
        engine.post_blind(bb_idx, bb_amount);

        engine.pending = engine
            .seats
            .iter()
            .filter(|s| s.is_active && !s.is_all_in)
            .map(|s| s.seat)
            .collect();

        // preflop order: heads-up the dealer/SB opens, otherwise UTG
        let first = if n == 2 { sb_seat } else { engine.seat_after(bb_seat) };
        engine.actor = engine.next_to_act_from(first);
        if engine.actor.is_none() {
            engine.close_street()?;
        }
        Ok(engine)
    }

    fn post_blind(&mut self, idx: usize, amount: u32) {
        let seat = &mut self.seats[idx];
        let posted = amount.min(seat.stack);
        seat.stack -= posted;
        seat.current_bet = posted;
        if seat.stack == 0 {
            seat.is_all_in = true;
        }
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn actor_seat(&self) -> Option<usize> {
        self.actor
    }

    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }

    /// The seat that most recently bet or raised this street, or None
    /// before any aggression (preflop the big blind opens as the
    /// nominal aggressor).
    pub fn last_aggressor_seat(&self) -> Option<usize> {
        self.last_aggressor_seat
    }

    /// The legal action set for the current actor, or None between
    /// decisions.
    pub fn valid_actions(&self) -> Option<ValidActions> {
        let seat = self.actor?;
        let s = self.seat_state(seat)?;
        Some(valid_actions(
            s.stack,
            s.current_bet,
            self.max_bet(),
            self.min_raise_increment,
            self.raise_barred.contains(&seat),
        ))
    }

    /// Apply the actor's decision and advance the hand as far as it can
    /// go without another decision (street sweeps, run-outs, showdown).
    pub fn apply(&mut self, seat: usize, action: Action) -> Result<AppliedAction, EngineError> {
        if self.over {
            return Err(EngineError::HandAlreadyComplete);
        }
        let expected = self.actor.ok_or(EngineError::NoDecisionPending)?;
        if seat != expected {
            return Err(EngineError::NotSeatsTurn {
                expected,
                actual: seat,
            });
        }
        let legal = self.valid_actions().ok_or(EngineError::NoDecisionPending)?;
        let max_bet = self.max_bet();

        let applied = match action {
            Action::Fold => {
                let idx = self.seat_index(seat)?;
                self.seats[idx].is_active = false;
                self.pending.remove(&seat);
                self.raise_barred.remove(&seat);
                AppliedAction::Fold
            }
            Action::Check => {
                if !legal.can_check {
                    return Err(EngineError::IllegalAction {
                        action: "check".into(),
                    });
                }
                self.pending.remove(&seat);
                AppliedAction::Check
            }
            Action::Call => {
                let owed = legal.call_amount.ok_or(EngineError::IllegalAction {
                    action: "call".into(),
                })?;
                let idx = self.seat_index(seat)?;
                let s = &mut self.seats[idx];
                s.stack -= owed;
                s.current_bet += owed;
                if s.stack == 0 {
                    s.is_all_in = true;
                }
                self.pending.remove(&seat);
                AppliedAction::Call { paid: owed }
            }
            Action::Raise { amount } => {
                let (min_to, max_to) = legal.raise_bounds.ok_or(EngineError::IllegalAction {
                    action: "raise".into(),
                })?;
                // off-range amounts are corrected, not rejected
                let to = amount.clamp(min_to, max_to);
                let idx = self.seat_index(seat)?;
                let s = &mut self.seats[idx];
                let delta = to - s.current_bet;
                s.stack -= delta;
                s.current_bet = to;
                if s.stack == 0 {
                    s.is_all_in = true;
                }
                self.pending.remove(&seat);

                let increment = to - max_bet;
                if increment >= self.min_raise_increment {
                    // a full raise reopens everyone else
                    self.min_raise_increment = increment;
                    self.last_aggressor_seat = Some(seat);
                    self.raise_barred.clear();
                    self.pending = self
                        .seats
                        .iter()
                        .filter(|s| s.seat != seat && s.is_active && !s.is_all_in)
                        .map(|s| s.seat)
                        .collect();
                } else {
                    // short all-in: closed players may call the extra
                    // but not re-raise
                    let closed: Vec<usize> = self
                        .seats
                        .iter()
                        .filter(|s| {
                            s.seat != seat
                                && s.is_active
                                && !s.is_all_in
                                && !self.pending.contains(&s.seat)
                        })
                        .map(|s| s.seat)
                        .collect();
                    for c in closed {
                        self.pending.insert(c);
                        self.raise_barred.insert(c);
                    }
                }
                AppliedAction::Raise { to }
            }
        };

        if self.active_count() == 1 {
            self.finish_by_fold()?;
            return Ok(applied);
        }

        let next = self.next_to_act_from(self.seat_after(expected));
        self.actor = next;
        if self.actor.is_none() {
            self.close_street()?;
        }
        Ok(applied)
    }

    /// Sweep street bets into the ledger, advance the street, and keep
    /// advancing (run-out) while no further decisions are possible.
    fn close_street(&mut self) -> Result<(), EngineError> {
        loop {
            for s in &mut self.seats {
                let bet = std::mem::take(&mut s.current_bet);
                self.ledger.commit(s.seat, bet);
            }
            self.pending.clear();
            self.raise_barred.clear();
            self.last_aggressor_seat = None;

            if self.street == Street::River {
                self.street = Street::Showdown;
                self.over = true;
                return Ok(());
            }
            self.street = match self.street {
                Street::Preflop => Street::Flop,
                Street::Flop => Street::Turn,
                Street::Turn => Street::River,
                s => s,
            };
            self.dealt = self.street.community_len();
            self.min_raise_increment = self.bb_amount;

            if self.can_act_count() <= 1 {
                // all-in run-out: no more betting on any street
                continue;
            }

            self.pending = self
                .seats
                .iter()
                .filter(|s| s.is_active && !s.is_all_in)
                .map(|s| s.seat)
                .collect();
            let first = self.seat_after(self.dealer_seat);
            self.actor = self.next_to_act_from(first);
            debug_assert!(self.actor.is_some());
            return Ok(());
        }
    }

    fn finish_by_fold(&mut self) -> Result<(), EngineError> {
        for s in &mut self.seats {
            let bet = std::mem::take(&mut s.current_bet);
            self.ledger.commit(s.seat, bet);
        }
        self.pending.clear();
        self.raise_barred.clear();
        self.actor = None;
        self.street = Street::Showdown;
        self.over = true;
        Ok(())
    }

    /// Canonical snapshot, all hole cards included.
    pub fn snapshot(&self) -> HandSnapshot {
        let players = self
            .seats
            .iter()
            .map(|s| SeatSnapshot {
                seat: s.seat,
                name: s.name.clone(),
                stack: s.stack,
                current_bet: s.current_bet,
                is_active: s.is_active,
                is_all_in: s.is_all_in,
                is_dealer: s.seat == self.dealer_seat,
                is_small_blind: s.seat == self.sb_seat,
                is_big_blind: s.seat == self.bb_seat,
                hole_cards: s.hole_cards,
            })
            .collect();

        let pots = if self.ledger.total() > 0 {
            self.ledger.pots(|seat| self.is_live(seat))
        } else {
            Vec::new()
        };
        let bets: u32 = self.seats.iter().map(|s| s.current_bet).sum();

        HandSnapshot {
            hand_number: self.hand_number,
            street: self.street,
            community_cards: self.board[..self.dealt].to_vec(),
            pot_total: self.ledger.total() + bets,
            pots,
            players,
            actor_seat: self.actor,
            valid_actions: self.valid_actions(),
            dealer_seat: self.dealer_seat,
            small_blind_seat: self.sb_seat,
            big_blind_seat: self.bb_seat,
            small_blind_amount: self.sb_amount,
            big_blind_amount: self.bb_amount,
        }
    }

    /// Settle the hand. Only meaningful once `is_over` is true.
    pub fn result(&self) -> Result<HandResult, EngineError> {
        if !self.over {
            return Err(EngineError::NoDecisionPending);
        }

        let showdown = self.active_count() > 1;
        let community = &self.board[..];

        let best_seats = |eligible: &[usize]| -> Vec<usize> {
            if eligible.len() == 1 {
                return eligible.to_vec();
            }
            let mut ranked: Vec<(usize, crate::hand::HandStrength)> = eligible
                .iter()
                .map(|&seat| {
                    let s = self.seat_state(seat).expect("eligible seat in roster");
                    let mut cards = s.hole_cards.to_vec();
                    cards.extend_from_slice(community);
                    (seat, evaluate_hand(&cards))
                })
                .collect();
            let top = ranked
                .iter()
                .map(|(_, h)| h.clone())
                .max()
                .expect("non-empty pot eligibility");
            ranked.retain(|(_, h)| *h == top);
            ranked.into_iter().map(|(seat, _)| seat).collect()
        };

        let payouts = self.ledger.distribute(
            |seat| self.is_live(seat),
            best_seats,
            self.dealer_seat,
            self.total_seats,
        );

        let mut winners = Vec::new();
        let mut final_stacks = Vec::new();
        for s in &self.seats {
            let paid_out = payouts.get(&s.seat).copied().unwrap_or(0);
            final_stacks.push((s.seat, s.stack + paid_out));
            let committed = self.ledger.committed(s.seat);
            if paid_out > committed {
                winners.push(HandWinner {
                    seat: s.seat,
                    name: s.name.clone(),
                    amount_won: paid_out - committed,
                });
            }
        }

        let hole_cards_revealed = if showdown {
            self.seats
                .iter()
                .filter(|s| s.is_active)
                .map(|s| RevealedCards {
                    seat: s.seat,
                    name: s.name.clone(),
                    hole_cards: s.hole_cards,
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(HandResult {
            winners,
            hole_cards_revealed,
            community_cards: self.board[..self.dealt].to_vec(),
            final_stacks,
        })
    }

    /// Chips under this hand's control; the tournament constant minus
    /// the stacks of players not in the hand.
    pub fn chips_in_play(&self) -> u32 {
        self.seats.iter().map(|s| s.stack + s.current_bet).sum::<u32>() + self.ledger.total()
    }

    fn max_bet(&self) -> u32 {
        self.seats.iter().map(|s| s.current_bet).max().unwrap_or(0)
    }

    fn active_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_active).count()
    }

    fn can_act_count(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| s.is_active && !s.is_all_in)
            .count()
    }

    fn is_live(&self, seat: usize) -> bool {
        self.seat_state(seat).map(|s| s.is_active).unwrap_or(false)
    }

    fn seat_state(&self, seat: usize) -> Option<&SeatState> {
        self.seats.iter().find(|s| s.seat == seat)
    }

    fn seat_index(&self, seat: usize) -> Result<usize, EngineError> {
        self.seats
            .iter()
            .position(|s| s.seat == seat)
            .ok_or(EngineError::UnknownSeat(seat))
    }

    /// Next roster seat clockwise of `seat` (wrapping on permanent seat
    /// numbers).
    fn seat_after(&self, seat: usize) -> usize {
        let mut candidate = (seat + 1) % self.total_seats;
        loop {
            if self.seats.iter().any(|s| s.seat == candidate) {
                return candidate;
            }
            candidate = (candidate + 1) % self.total_seats;
        }
    }

    /// First seat at or clockwise after `from` that still owes action.
    fn next_to_act_from(&self, from: usize) -> Option<usize> {
        let mut candidate = from;
        for _ in 0..self.total_seats {
            if let Some(s) = self.seats.iter().find(|s| s.seat == candidate) {
                if s.is_active && !s.is_all_in && self.pending.contains(&candidate) {
                    return Some(candidate);
                }
            }
            candidate = (candidate + 1) % self.total_seats;
        }
        None
    }
}
