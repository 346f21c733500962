//! Change requests from the input layer
//!
//! Input handling never touches the simulation directly. It queues commands
//! while processing window events, and the frame loop applies them between
//! integration batches.

use crate::simulation::IntegratorKind;
use crate::spawn::SpawnRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    SetPaused(bool),
    TogglePause,
    SetIntegrator(IntegratorKind),
    SetTimeStep(f64),
    SetStepsPerFrame(u32),
    SetGravitationalConstant(f64),
    Spawn(SpawnRequest),
    /// Run exactly one step, even while paused
    StepOnce,
}

#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<SimCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: SimCommand) {
        self.pending.push(command);
    }

    /// Take every pending command in submission order
    pub fn drain(&mut self) -> std::vec::Drain<'_, SimCommand> {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = CommandQueue::new();
        queue.push(SimCommand::TogglePause);
        queue.push(SimCommand::SetStepsPerFrame(3));
        assert_eq!(queue.len(), 2);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![SimCommand::TogglePause, SimCommand::SetStepsPerFrame(3)]
        );
        assert!(queue.is_empty());
    }
}
