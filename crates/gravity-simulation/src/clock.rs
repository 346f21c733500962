//! Simulated time bookkeeping
//!
//! Time is derived, not accumulated: `time = epoch_start + steps_in_epoch * dt`.
//! A change of `dt` closes the current epoch.

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    epoch_start: f64,
    dt: f64,
    steps_in_epoch: u64,
    total_steps: u64,
    paused: bool,
}

impl SimulationClock {
    pub fn new(initial_time: f64, dt: f64) -> Self {
        Self {
            epoch_start: initial_time,
            dt,
            steps_in_epoch: 0,
            total_steps: 0,
            paused: false,
        }
    }

    /// Simulated seconds elapsed
    pub fn time(&self) -> f64 {
        self.epoch_start + self.steps_in_epoch as f64 * self.dt
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Steps run since construction, across every `dt` change
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(crate) fn advance(&mut self, steps: u64) {
        self.steps_in_epoch += steps;
        self.total_steps += steps;
    }

    pub(crate) fn set_dt(&mut self, dt: f64) {
        if dt == self.dt {
            return;
        }
        self.epoch_start = self.time();
        self.steps_in_epoch = 0;
        self.dt = dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_is_exact_multiple_of_dt() {
        let mut clock = SimulationClock::new(0.0, 0.1);
        for _ in 0..1000 {
            clock.advance(1);
        }
        assert_eq!(clock.time(), 1000.0 * 0.1);
        assert_eq!(clock.total_steps(), 1000);
    }

    #[test]
    fn test_dt_change_starts_new_epoch() {
        let mut clock = SimulationClock::new(5.0, 0.5);
        clock.advance(4);
        assert_eq!(clock.time(), 7.0);

        clock.set_dt(2.0);
        assert_eq!(clock.time(), 7.0);
        clock.advance(3);
        assert_eq!(clock.time(), 13.0);
        assert_eq!(clock.total_steps(), 7);
    }
}
