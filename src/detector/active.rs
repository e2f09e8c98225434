//! Fires when the watched surface is in use.
//!
//! Deferred mode (the default) reports at the period boundary that closes
//! a period containing at least one interaction. Immediate mode reports at
//! the first interaction after a quiet period boundary and stays silent at
//! the boundary itself, so each quiet-to-active edge fires exactly once.

use super::{Policy, Reaction, TimerAction};
use crate::ActivityState;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct Active {
    immediate: bool,
    interacted: bool,
}

impl Active {
    pub fn immediate(&self) -> bool {
        self.immediate
    }

    /// Whether an interaction happened since the last period boundary.
    pub fn interacted(&self) -> bool {
        self.interacted
    }

    pub(crate) fn set_immediate(&mut self, immediate: bool) {
        self.immediate = immediate;
    }
}

impl Policy for Active {
    fn on_interaction(&mut self) -> Reaction {
        let fire = self.immediate && !self.interacted;
        self.interacted = true;
        Reaction {
            fire,
            timer: TimerAction::Keep,
        }
    }

    fn on_tick(&mut self) -> Reaction {
        let fire = !self.immediate && self.interacted;
        self.interacted = false;
        Reaction {
            fire,
            timer: TimerAction::Keep,
        }
    }

    fn signal(_last_interaction: DateTime<Utc>) -> ActivityState {
        ActivityState::Active
    }
}
