//! Fires once the watched surface has been quiet for a whole timeout.
//!
//! Each interaction cancels the running countdown and arms a fresh one, so
//! the callback fires a full `period_count × unit_ms` after the most recent
//! interaction. With repeating enabled the interval keeps running after a
//! firing, so the callback fires again at every further multiple of the
//! timeout until the next interaction.

use super::{Policy, Reaction, TimerAction};
use crate::ActivityState;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct Idle {
    repeat: bool,
}

impl Idle {
    pub fn repeating(&self) -> bool {
        self.repeat
    }

    pub(crate) fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }
}

impl Policy for Idle {
    fn on_interaction(&mut self) -> Reaction {
        Reaction {
            fire: false,
            timer: TimerAction::Rearm,
        }
    }

    fn on_tick(&mut self) -> Reaction {
        let timer = if self.repeat {
            TimerAction::Keep
        } else {
            TimerAction::Disarm
        };
        Reaction { fire: true, timer }
    }

    fn signal(last_interaction: DateTime<Utc>) -> ActivityState {
        ActivityState::Idle {
            since: last_interaction,
        }
    }
}
