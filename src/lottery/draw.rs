use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use super::{AgencyId, Bet};

#[derive(Debug, Default)]
struct DrawState {
    notified: HashSet<AgencyId>,
    drawn: bool,
}

/// Tracks which agencies have finished submitting and flips to "drawn"
/// exactly once, when the count of distinct notified agencies reaches
/// the quorum
#[derive(Debug, Clone)]
pub struct DrawBarrier {
    state: Arc<Mutex<DrawState>>,
    quorum: usize,
}

impl DrawBarrier {
    pub fn new(quorum: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(DrawState::default())),
            quorum,
        }
    }

    /// Records that an agency has finished submitting bets
    ///
    /// returns true only for the notification that performed the draw,
    /// so the caller can log the event exactly once. repeated notifications
    /// from the same agency do not move the barrier.
    pub fn notify(&self, agency: AgencyId) -> bool {
        let mut state = self.state.lock().unwrap();
        state.notified.insert(agency);

        if !state.drawn && state.notified.len() >= self.quorum {
            state.drawn = true;
            return true;
        }

        false
    }

    pub fn is_drawn(&self) -> bool {
        self.state.lock().unwrap().drawn
    }

    /// Checks the draw state under the same lock `notify` takes, so a batch
    /// can never slip in between the deciding notification and the flip
    pub fn reject_if_drawn(&self) -> bool {
        self.state.lock().unwrap().drawn
    }
}

/// Decides whether a stored bet won the lottery
pub trait WinEvaluator: Send + Sync {
    fn is_winner(&self, bet: &Bet) -> bool;
}

/// The production rule: a bet wins when it hit the drawn number
#[derive(Debug)]
pub struct NumberMatchEvaluator {
    winning_number: u32,
}

impl NumberMatchEvaluator {
    pub fn new(winning_number: u32) -> Self {
        Self { winning_number }
    }
}

impl WinEvaluator for NumberMatchEvaluator {
    fn is_winner(&self, bet: &Bet) -> bool {
        bet.number == self.winning_number
    }
}
