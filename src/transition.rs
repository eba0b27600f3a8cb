use std::rc::Rc;
use std::time::Duration;

use crate::id::ComponentId;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransitionPhase {
    Settled,
    Transitioning,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeightChange {
    pub field: ComponentId,
    pub from: f32,
    pub to: f32,
}

pub type HeightChangeHandler = Rc<dyn Fn(&HeightChange)>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionContext {
    pub old_height: f32,
    pub new_height: f32,
    pub animated: bool,
    pub duration: Duration,
    generation: u64,
}

impl TransitionContext {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Overlapping transitions each settle exactly once; the phase is `Settled`
/// only after the last one.
#[derive(Debug)]
pub struct HeightTransitionController {
    in_flight: Vec<u64>,
    next_generation: u64,
}

impl Default for HeightTransitionController {
    fn default() -> Self {
        Self::new()
    }
}

impl HeightTransitionController {
    pub fn new() -> Self {
        Self {
            in_flight: Vec::new(),
            next_generation: 1,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        if self.in_flight.is_empty() {
            TransitionPhase::Settled
        } else {
            TransitionPhase::Transitioning
        }
    }

    pub fn begin(
        &mut self,
        old_height: f32,
        new_height: f32,
        animated: bool,
        duration: Duration,
    ) -> Option<TransitionContext> {
        if old_height == new_height {
            return None;
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.in_flight.push(generation);
        tracing::debug!(
            old_height,
            new_height,
            animated,
            generation,
            "height transition started"
        );
        Some(TransitionContext {
            old_height,
            new_height,
            animated,
            duration: if animated { duration } else { Duration::ZERO },
            generation,
        })
    }

    /// Marks `context` as finished. Returns `false` when it was already settled
    /// or never began here, in which case nothing should be notified.
    pub fn settle(&mut self, context: &TransitionContext) -> bool {
        let Some(position) = self
            .in_flight
            .iter()
            .position(|generation| *generation == context.generation)
        else {
            return false;
        };
        self.in_flight.remove(position);
        tracing::debug!(
            generation = context.generation,
            superseded = self.is_superseded(context),
            "height transition settled"
        );
        true
    }

    pub fn is_superseded(&self, context: &TransitionContext) -> bool {
        context.generation + 1 < self.next_generation
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_heights_do_not_start_a_transition() {
        let mut controller = HeightTransitionController::new();
        assert!(
            controller
                .begin(40.0, 40.0, true, Duration::from_millis(350))
                .is_none()
        );
        assert_eq!(controller.phase(), TransitionPhase::Settled);
    }

    #[test]
    fn phase_returns_to_settled_after_every_transition_settles() {
        let mut controller = HeightTransitionController::new();
        let first = controller
            .begin(40.0, 60.0, true, Duration::from_millis(350))
            .unwrap();
        let second = controller
            .begin(60.0, 80.0, true, Duration::from_millis(350))
            .unwrap();
        assert_eq!(controller.phase(), TransitionPhase::Transitioning);
        assert!(controller.is_superseded(&first));
        assert!(!controller.is_superseded(&second));

        assert!(controller.settle(&first));
        assert_eq!(controller.phase(), TransitionPhase::Transitioning);
        assert!(controller.settle(&second));
        assert_eq!(controller.phase(), TransitionPhase::Settled);
    }

    #[test]
    fn settling_twice_is_rejected() {
        let mut controller = HeightTransitionController::new();
        let context = controller
            .begin(20.0, 40.0, false, Duration::from_millis(350))
            .unwrap();
        assert_eq!(context.duration, Duration::ZERO);
        assert!(controller.settle(&context));
        assert!(!controller.settle(&context));
    }
}
