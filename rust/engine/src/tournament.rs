use crate::hand_engine::HandPlayer;
use crate::rules::blinds_for_hand;

pub const STARTING_STACK: u32 = 10_000;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 9;
pub const MAX_NAME_LEN: usize = 32;

/// A registered player. The seat index is permanent for the tournament;
/// elimination is monotone and never renumbers seats.
#[derive(Debug, Clone)]
pub struct Player {
    pub seat: usize,
    pub name: String,
    pub stack: u32,
    pub is_eliminated: bool,
}

/// Why a join attempt was refused.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JoinRefusal {
    AlreadyStarted,
    Full,
    BadName,
}

/// The durable tournament state: the seat roster, stacks across hands,
/// the dealer button, and the hand counter that drives blind
/// escalation.
#[derive(Debug)]
pub struct Tournament {
    players: Vec<Player>,
    started: bool,
    hand_number: u32,
    dealer_seat: usize,
}

impl Tournament {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            started: false,
            hand_number: 0,
            dealer_seat: 0,
        }
    }

    /// Admit a player during the lobby. Names must be 1-32 code points
    /// and unique among registered players; the returned seat is
    /// permanent.
    pub fn register(&mut self, name: &str) -> Result<usize, JoinRefusal> {
        if self.started {
            return Err(JoinRefusal::AlreadyStarted);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(JoinRefusal::Full);
        }
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(JoinRefusal::BadName);
        }
        if self.players.iter().any(|p| p.name == name) {
            return Err(JoinRefusal::BadName);
        }
        let seat = self.players.len();
        self.players.push(Player {
            seat,
            name: name.to_string(),
            stack: STARTING_STACK,
            is_eliminated: false,
        });
        Ok(seat)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> Option<&Player> {
        self.players.get(seat)
    }

    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn stacks(&self) -> Vec<u32> {
        self.players.iter().map(|p| p.stack).collect()
    }

    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }

    /// Non-eliminated players in seat order.
    pub fn active_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| !p.is_eliminated).collect()
    }

    pub fn is_over(&self) -> bool {
        self.started && self.active_players().len() <= 1
    }

    pub fn winner(&self) -> Option<&Player> {
        let active = self.active_players();
        match active.as_slice() {
            [sole] => Some(sole),
            _ => None,
        }
    }

    /// Begin the next hand: bump the counter, rotate the button to the
    /// next non-eliminated seat, and look up the blind level. Returns
    /// the roster slice, dealer seat, and blinds for the hand engine.
    pub fn next_hand(&mut self) -> (Vec<HandPlayer>, usize, (u32, u32)) {
        self.hand_number += 1;
        if self.hand_number == 1 {
            self.dealer_seat = self
                .active_players()
                .first()
                .map(|p| p.seat)
                .unwrap_or(0);
        } else {
            self.dealer_seat = self.next_active_seat(self.dealer_seat);
        }
        let roster = self
            .active_players()
            .iter()
            .map(|p| HandPlayer {
                seat: p.seat,
                name: p.name.clone(),
                stack: p.stack,
            })
            .collect();
        (roster, self.dealer_seat, blinds_for_hand(self.hand_number))
    }

    /// Fold the hand's final stacks back into the roster and mark
    /// busted players eliminated. Returns the seats newly eliminated by
    /// this hand.
    pub fn apply_hand_result(&mut self, final_stacks: &[(usize, u32)]) -> Vec<usize> {
        let mut newly_eliminated = Vec::new();
        for &(seat, stack) in final_stacks {
            if let Some(p) = self.players.get_mut(seat) {
                p.stack = stack;
                if p.stack == 0 && !p.is_eliminated {
                    p.is_eliminated = true;
                    newly_eliminated.push(seat);
                }
            }
        }
        newly_eliminated
    }

    fn next_active_seat(&self, from: usize) -> usize {
        let n = self.players.len();
        let mut candidate = (from + 1) % n;
        for _ in 0..n {
            if !self.players[candidate].is_eliminated {
                return candidate;
            }
            candidate = (candidate + 1) % n;
        }
        from
    }
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new()
    }
}
