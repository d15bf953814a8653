use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{oneshot, watch};

use crate::config::GameConfig;
use crate::roulette::{
    self, BetRejection, BetRequest, Color, Resolution, RoundResult, SpinOutcome,
};
use crate::scheduler::{Scheduler, TokioScheduler};

/// Source of spin outcomes.
pub trait Wheel: Send {
    fn spin(&mut self) -> SpinOutcome;
}

/// Draws uniformly with any `rand` generator.
pub struct RandomWheel<R>(pub R);

impl RandomWheel<StdRng> {
    pub fn from_entropy() -> Self {
        RandomWheel(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> Wheel for RandomWheel<R> {
    fn spin(&mut self) -> SpinOutcome {
        roulette::draw(&mut self.0)
    }
}

/// Everything the table shows. Only the controller writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub balance: i64,
    pub is_spinning: bool,
    pub last_result: Option<RoundResult>,
}

/// A round as it landed: this round's resolution and the balance right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub resolution: Resolution,
    pub balance: i64,
}

/// An accepted wager waiting for its spin to finish.
#[derive(Debug)]
pub struct PendingSpin {
    pub request: BetRequest,
    settled: oneshot::Receiver<Settlement>,
}

impl PendingSpin {
    /// Resolves with this round's settlement, whatever other rounds follow it.
    pub async fn settled(self) -> Result<Settlement, oneshot::error::RecvError> {
        self.settled.await
    }
}

/// What happened to a `place_bet` call.
#[derive(Debug)]
pub enum Placement {
    /// The wager was accepted; the result lands once the spin delay elapses.
    Spinning(PendingSpin),
    Rejected(BetRejection),
    /// A spin was already in flight, nothing changed.
    Ignored,
}

pub struct SessionController {
    state: Arc<watch::Sender<SessionState>>,
    wheel: Arc<Mutex<Box<dyn Wheel>>>,
    scheduler: Arc<dyn Scheduler>,
    spin_delay: Duration,
}

impl SessionController {
    pub fn new(
        starting_balance: i64,
        spin_delay: Duration,
        wheel: impl Wheel + 'static,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState {
            balance: starting_balance,
            is_spinning: false,
            last_result: None,
        });
        info!(
            "session opened with balance {} and a {:?} spin",
            starting_balance, spin_delay
        );
        Self {
            state: Arc::new(state),
            wheel: Arc::new(Mutex::new(Box::new(wheel))),
            scheduler,
            spin_delay,
        }
    }

    /// Production session: entropy-seeded wheel, spins timed on tokio.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.starting_balance,
            config.spin_delay(),
            RandomWheel::from_entropy(),
            Arc::new(TokioScheduler),
        )
    }

    pub fn place_bet(&self, amount: i64, chosen_color: Option<Color>) -> Placement {
        let mut accepted = None;
        let mut placement = Placement::Ignored;
        self.state.send_if_modified(|state| {
            if state.is_spinning {
                debug!("bet of {amount} ignored, spin in progress");
                return false;
            }
            match roulette::validate(amount, chosen_color, state.balance) {
                Err(reason) => {
                    info!(
                        "bet rejected ({reason:?}): amount {amount}, balance {}",
                        state.balance
                    );
                    state.last_result = Some(RoundResult::Rejected(reason));
                    placement = Placement::Rejected(reason);
                }
                Ok(request) => {
                    state.is_spinning = true;
                    state.last_result = None;
                    accepted = Some(request);
                }
            }
            true
        });

        let Some(request) = accepted else {
            return placement;
        };
        info!(
            "spinning: {} on {}",
            request.amount, request.chosen_color
        );
        let (tx, rx) = oneshot::channel();
        let state = Arc::clone(&self.state);
        let wheel = Arc::clone(&self.wheel);
        self.scheduler.schedule(
            self.spin_delay,
            Box::new(move || {
                let settlement = settle(&state, &wheel, request);
                // the bettor may have stopped listening
                let _ = tx.send(settlement);
            }),
        );
        Placement::Spinning(PendingSpin {
            request,
            settled: rx,
        })
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn balance(&self) -> i64 {
        self.state.borrow().balance
    }

    pub fn is_spinning(&self) -> bool {
        self.state.borrow().is_spinning
    }

    pub fn last_result(&self) -> Option<RoundResult> {
        self.state.borrow().last_result
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn multipliers(&self) -> &'static [(Color, i64)] {
        &roulette::MULTIPLIERS
    }
}

fn settle(
    state: &watch::Sender<SessionState>,
    wheel: &Mutex<Box<dyn Wheel>>,
    request: BetRequest,
) -> Settlement {
    let outcome = wheel.lock().unwrap_or_else(PoisonError::into_inner).spin();
    let resolution = roulette::resolve(&request, outcome.drawn_color);
    let mut balance = 0;
    state.send_modify(|state| {
        state.balance = state.balance.saturating_add(resolution.balance_delta());
        state.last_result = Some(RoundResult::Settled(resolution));
        state.is_spinning = false;
        balance = state.balance;
    });
    info!(
        "settled on {}: won={} delta={} balance={}",
        resolution.drawn_color,
        resolution.won,
        resolution.balance_delta(),
        balance
    );
    Settlement {
        resolution,
        balance,
    }
}
