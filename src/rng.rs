use std::collections::VecDeque;

/// Source of randomness for state selection.
///
/// Production uses `fastrand::Rng`; tests and replays feed a [`Scripted`]
/// sequence so transitions are exact.
pub trait RandomSource: Send {
    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Fair coin.
    fn coin(&mut self) -> bool;
}

impl RandomSource for fastrand::Rng {
    fn pick(&mut self, len: usize) -> usize {
        self.usize(0..len)
    }

    fn coin(&mut self) -> bool {
        self.bool()
    }
}

/// Replays a fixed sequence of picks and coin flips.
///
/// Once a queue runs dry it keeps returning 0 / `true`. Picks are reduced
/// modulo `len` so a script never indexes out of range.
#[derive(Debug, Default, Clone)]
pub struct Scripted {
    picks: VecDeque<usize>,
    coins: VecDeque<bool>,
}

impl Scripted {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
            coins: VecDeque::new(),
        }
    }

    pub fn with_coins(mut self, coins: impl IntoIterator<Item = bool>) -> Self {
        self.coins = coins.into_iter().collect();
        self
    }
}

impl RandomSource for Scripted {
    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len.max(1)
    }

    fn coin(&mut self) -> bool {
        self.coins.pop_front().unwrap_or(true)
    }
}
