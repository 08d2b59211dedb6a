//! The session coordinator: one task owning the lobby, the tournament,
//! and every turn decision.
//!
//! All tournament state lives behind this task; connections talk to it
//! through a single command channel and receive fan-out through
//! per-connection bounded queues. A queue that overflows costs that
//! connection its seat feed, never the engine its pace.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use pokerd_engine::deck::Deck;
use pokerd_engine::errors::EngineError;
use pokerd_engine::hand_engine::{AppliedAction, HandEngine};
use pokerd_engine::rules::{Action, ValidActions};
use pokerd_engine::tournament::{JoinRefusal, Tournament, MAX_PLAYERS, MIN_PLAYERS};

use crate::protocol::{
    parse_action, ActionEcho, ErrorCode, RevealedEntry, ServerMessage, WinnerEntry,
};
use crate::views::project_game_state;

/// Outbound frames buffered per connection before the slow consumer is
/// cut loose.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;
pub const COMMAND_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub min_players: usize,
    pub max_players: usize,
    pub action_timeout: Duration,
    pub lobby_wait: Duration,
    pub shuffle_seed: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            action_timeout: Duration::from_secs(30),
            lobby_wait: Duration::from_secs(5),
            shuffle_seed: rand::random(),
        }
    }
}

/// A registered connection's outbound queue, handed over at join time.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    tx: mpsc::Sender<ServerMessage>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::Sender<ServerMessage>) -> Self {
        Self { tx }
    }
}

/// Commands from connection tasks into the coordinator.
#[derive(Debug)]
pub enum Command {
    Join {
        name: String,
        handle: ConnectionHandle,
        reply: oneshot::Sender<Result<usize, (ErrorCode, String)>>,
    },
    Action {
        seat: usize,
        payload: Value,
    },
    Disconnect {
        seat: usize,
    },
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("engine failure: {0}")]
    Engine(#[from] EngineError),
}

pub struct Coordinator {
    config: CoordinatorConfig,
    rx: mpsc::Receiver<Command>,
    tournament: Tournament,
    deck: Deck,
    conns: HashMap<usize, mpsc::Sender<ServerMessage>>,
    // set once every command sender is gone; the tournament winds down
    closed: bool,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> (mpsc::Sender<Command>, Self) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let deck = Deck::new_with_seed(config.shuffle_seed);
        let coordinator = Self {
            config,
            rx,
            tournament: Tournament::new(),
            deck,
            conns: HashMap::new(),
            closed: false,
        };
        (tx, coordinator)
    }

    /// Run the lobby, then the tournament, to completion. Returns when
    /// the tournament ends or every command sender is gone.
    pub async fn run(mut self) {
        if !self.run_lobby().await {
            info!("coordinator shutting down before game start");
            return;
        }

        self.tournament.start();
        let (small_blind, big_blind) = pokerd_engine::rules::blinds_for_hand(1);
        info!(
            players = self.tournament.player_count(),
            "tournament starting"
        );
        self.broadcast(ServerMessage::GameStart {
            player_names: self.tournament.names(),
            starting_stacks: self.tournament.stacks(),
            small_blind,
            big_blind,
        });

        if let Err(err) = self.run_tournament().await {
            // invariant breakage is fatal for the whole tournament
            tracing::error!(error = %err, "tournament aborted");
        }
        self.conns.clear();
    }

    /// Returns true once the player set is locked in, false on
    /// shutdown.
    async fn run_lobby(&mut self) -> bool {
        let mut deadline: Option<Instant> = None;
        loop {
            let cmd = match deadline {
                Some(at) => tokio::select! {
                    cmd = self.rx.recv() => match cmd {
                        Some(cmd) => cmd,
                        None => return false,
                    },
                    _ = time::sleep_until(at) => {
                        info!("lobby settled; starting");
                        return true;
                    }
                },
                None => match self.rx.recv().await {
                    Some(cmd) => cmd,
                    None => return false,
                },
            };

            match cmd {
                Command::Join {
                    name,
                    handle,
                    reply,
                } => match self.tournament.register(&name) {
                    Ok(seat) => {
                        info!(seat, name = %name, "player joined");
                        self.conns.insert(seat, handle.tx);
                        let _ = reply.send(Ok(seat));
                        self.broadcast(ServerMessage::Waiting {
                            current_players: self.tournament.player_count(),
                            min_players: self.config.min_players,
                            max_players: self.config.max_players,
                        });
                        let count = self.tournament.player_count();
                        if count >= self.config.max_players {
                            info!("table full; starting immediately");
                            return true;
                        }
                        if count >= self.config.min_players {
                            // each join restarts the settle timer
                            deadline = Some(Instant::now() + self.config.lobby_wait);
                        }
                    }
                    Err(refusal) => {
                        let _ = reply.send(Err(refusal_to_error(refusal, &name)));
                    }
                },
                Command::Disconnect { seat } => {
                    // the seat stays registered; its bets will fold out
                    warn!(seat, "player disconnected in the lobby");
                    self.conns.remove(&seat);
                }
                Command::Action { seat, .. } => {
                    debug!(seat, "action before game start discarded");
                }
            }
        }
    }

    async fn run_tournament(&mut self) -> Result<(), CoordinatorError> {
        while !self.tournament.is_over() {
            self.run_hand().await?;
            if self.closed {
                return Ok(());
            }
        }

        let Some(winner) = self.tournament.winner() else {
            return Ok(());
        };
        info!(seat = winner.seat, name = %winner.name, "tournament over");
        self.broadcast(ServerMessage::GameEnd {
            winner: winner.name.clone(),
            winner_seat: winner.seat,
            final_stacks: self.tournament.stacks(),
            player_names: self.tournament.names(),
            total_hands: self.tournament.hand_number(),
        });
        Ok(())
    }

    async fn run_hand(&mut self) -> Result<(), CoordinatorError> {
        let total_seats = self.tournament.player_count();
        let (roster, dealer_seat, blinds) = self.tournament.next_hand();
        let hand_number = self.tournament.hand_number();
        let mut hand = HandEngine::new(
            &roster,
            dealer_seat,
            blinds,
            hand_number,
            total_seats,
            &mut self.deck,
        )?;

        let snap = hand.snapshot();
        info!(
            hand = hand_number,
            dealer = dealer_seat,
            players = roster.len(),
            sb = blinds.0,
            bb = blinds.1,
            "hand starting"
        );

        let player_names: Vec<String> = roster.iter().map(|p| p.name.clone()).collect();
        let stacks: Vec<u32> = roster.iter().map(|p| p.stack).collect();
        for p in &roster {
            let hole_cards = snap
                .players
                .iter()
                .find(|s| s.seat == p.seat)
                .map(|s| s.hole_cards.iter().map(|c| c.to_string()).collect())
                .unwrap_or_default();
            self.send_to(
                p.seat,
                ServerMessage::HandStart {
                    hand_number,
                    dealer_seat,
                    small_blind_seat: snap.small_blind_seat,
                    big_blind_seat: snap.big_blind_seat,
                    small_blind_amount: blinds.0,
                    big_blind_amount: blinds.1,
                    player_names: player_names.clone(),
                    stacks: stacks.clone(),
                    hole_cards,
                },
            );
        }

        while !hand.is_over() {
            let Some(actor_seat) = hand.actor_seat() else {
                break;
            };
            let valid = hand
                .valid_actions()
                .ok_or(EngineError::NoDecisionPending)?;

            let snap = hand.snapshot();
            for p in &roster {
                self.send_to(
                    p.seat,
                    ServerMessage::ActionRequest {
                        actor_seat,
                        timeout_seconds: self.config.action_timeout.as_secs(),
                        game_state: project_game_state(&snap, p.seat),
                    },
                );
            }

            let (action, submitted_amount, timed_out) = self.await_action(actor_seat, &valid).await;
            if self.closed {
                return Ok(());
            }
            let applied = hand.apply(actor_seat, action)?;

            let (kind, amount) = match applied {
                AppliedAction::Fold => ("fold", None),
                AppliedAction::Check => ("check", None),
                // calls echo whatever the bot supplied, raises the
                // clamped total
                AppliedAction::Call { .. } => ("call", submitted_amount),
                AppliedAction::Raise { to } => ("raise", Some(to)),
            };
            debug!(
                hand = hand_number,
                seat = actor_seat,
                action = kind,
                amount,
                timed_out,
                "action applied"
            );

            let actor_name = roster
                .iter()
                .find(|p| p.seat == actor_seat)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            let snap = hand.snapshot();
            for p in &roster {
                self.send_to(
                    p.seat,
                    ServerMessage::ActionResult {
                        actor_seat,
                        player_name: actor_name.clone(),
                        action: ActionEcho {
                            kind: kind.to_string(),
                            amount,
                        },
                        timed_out,
                        game_state: project_game_state(&snap, p.seat),
                    },
                );
            }
        }

        let result = hand.result()?;
        let eliminated_seats = self.tournament.apply_hand_result(&result.final_stacks);
        for &seat in &eliminated_seats {
            info!(seat, "player eliminated");
        }

        let hand_end = ServerMessage::HandEnd {
            hand_number,
            winners: result
                .winners
                .iter()
                .map(|w| WinnerEntry {
                    seat: w.seat,
                    name: w.name.clone(),
                    amount_won: w.amount_won,
                })
                .collect(),
            hole_cards_revealed: result
                .hole_cards_revealed
                .iter()
                .map(|r| RevealedEntry {
                    seat: r.seat,
                    name: r.name.clone(),
                    hole_cards: r.hole_cards.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
            community_cards: result
                .community_cards
                .iter()
                .map(|c| c.to_string())
                .collect(),
            final_stacks: self.tournament.stacks(),
            player_names: self.tournament.names(),
            eliminated_seats,
        };
        self.broadcast(hand_end);
        Ok(())
    }

    /// The turn rendezvous: resolve on the first of the actor's valid
    /// answer, the timeout, or the actor's disconnect. Non-actor
    /// traffic is discarded; late joiners are refused.
    async fn await_action(
        &mut self,
        actor_seat: usize,
        valid: &ValidActions,
    ) -> (Action, Option<u32>, bool) {
        if !self.conns.contains_key(&actor_seat) {
            info!(seat = actor_seat, "actor not connected; auto-folding");
            return (Action::Fold, None, true);
        }
        let deadline = Instant::now() + self.config.action_timeout;
        loop {
            let cmd = tokio::select! {
                _ = time::sleep_until(deadline) => {
                    info!(seat = actor_seat, "action timed out; auto-folding");
                    return (Action::Fold, None, true);
                }
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => cmd,
                    // all senders gone: the server is shutting down
                    None => {
                        self.closed = true;
                        return (Action::Fold, None, true);
                    }
                },
            };

            match cmd {
                Command::Join { name, reply, .. } => {
                    let refusal = if self.tournament.player_count() >= self.config.max_players {
                        JoinRefusal::Full
                    } else {
                        JoinRefusal::AlreadyStarted
                    };
                    let _ = reply.send(Err(refusal_to_error(refusal, &name)));
                }
                Command::Disconnect { seat } => {
                    warn!(seat, "player disconnected mid-hand");
                    self.conns.remove(&seat);
                    if seat == actor_seat {
                        return (Action::Fold, None, true);
                    }
                }
                Command::Action { seat, payload } => {
                    if seat != actor_seat {
                        debug!(seat, "out-of-turn action discarded");
                        continue;
                    }
                    match parse_action(&payload, valid) {
                        Ok((action, submitted_amount)) => {
                            return (action, submitted_amount, false);
                        }
                        Err(rejected) => {
                            warn!(seat, reason = %rejected.message, "bad action; auto-folding");
                            self.send_to(
                                seat,
                                ServerMessage::error(ErrorCode::BadAction, rejected.message),
                            );
                            return (Action::Fold, None, true);
                        }
                    }
                }
            }
        }
    }

    /// Queue a message for one seat. A full or closed queue drops the
    /// connection; the seat plays on as an auto-folder.
    fn send_to(&mut self, seat: usize, msg: ServerMessage) {
        let Some(tx) = self.conns.get(&seat) else {
            return;
        };
        if let Err(err) = tx.try_send(msg) {
            warn!(seat, error = %err, "outbound queue unusable; dropping connection");
            self.conns.remove(&seat);
        }
    }

    /// Queue a message for every connected, non-eliminated player.
    /// Elimination is marked before this runs, so a seat busted by a
    /// hand is already excluded from that hand's `hand_end`.
    fn broadcast(&mut self, msg: ServerMessage) {
        let seats: Vec<usize> = self
            .conns
            .keys()
            .copied()
            .filter(|&seat| {
                self.tournament
                    .player(seat)
                    .map(|p| !p.is_eliminated)
                    .unwrap_or(false)
            })
            .collect();
        for seat in seats {
            self.send_to(seat, msg.clone());
        }
    }
}

fn refusal_to_error(refusal: JoinRefusal, name: &str) -> (ErrorCode, String) {
    match refusal {
        JoinRefusal::AlreadyStarted => (
            ErrorCode::TournamentStarted,
            "Tournament already in progress.".to_string(),
        ),
        JoinRefusal::Full => (
            ErrorCode::TournamentFull,
            format!("Table is full ({MAX_PLAYERS} players)."),
        ),
        JoinRefusal::BadName => (
            ErrorCode::BadName,
            format!("Name {name:?} is already taken or not 1-32 characters."),
        ),
    }
}
