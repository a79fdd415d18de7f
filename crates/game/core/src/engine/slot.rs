//! Live state of one slot during replay.

use crate::job::Job;
use crate::resource::{ResourceId, ResourceStore};
use crate::rng::ProcRoller;
use crate::time::Millis;
use crate::timeline::WarningMark;
use crate::timing::MANA_TICK_INTERVAL;

/// Resources, clock, animation lock and proc stream of one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotState<R: ResourceId> {
    pub(crate) store: ResourceStore<R>,
    pub(crate) now: Millis,
    pub(crate) lock_until: Millis,
    pub(crate) next_mana_tick: Millis,
    pub(crate) roller: ProcRoller,
}

impl<R: ResourceId> SlotState<R> {
    /// State at `start`, with mana ticks phased so one lands at `first_tick`.
    pub(crate) fn new(
        store: ResourceStore<R>,
        start: Millis,
        first_tick: Millis,
        roller: ProcRoller,
    ) -> Self {
        let interval = MANA_TICK_INTERVAL.as_millis();
        let behind = (first_tick - start).as_millis().div_euclid(interval);
        Self {
            store,
            now: start,
            lock_until: start,
            next_mana_tick: first_tick - Millis(behind * interval),
            roller,
        }
    }

    pub fn store(&self) -> &ResourceStore<R> {
        &self.store
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn lock_until(&self) -> Millis {
        self.lock_until
    }

    pub fn proc_draws(&self) -> u64 {
        self.roller.draws()
    }

    /// Earliest time the next action could start.
    pub fn next_free(&self) -> Millis {
        self.now.max(self.lock_until)
    }

    /// Moves the clock to `target`, stopping at every mana tick and
    /// resource event so warnings carry their exact time.
    pub(crate) fn advance_to<J: Job<Resource = R>>(
        &mut self,
        target: Millis,
        mp_per_tick: u32,
        warnings: &mut Vec<WarningMark<R>>,
    ) {
        while self.now < target {
            let mut step_end = target.min(self.next_mana_tick);
            if let Some(next) = self.store.next_event_in() {
                step_end = step_end.min(self.now + next);
            }
            for kind in self.store.advance(step_end - self.now) {
                warnings.push(WarningMark { at: step_end, kind });
            }
            self.now = step_end;

            if self.now == self.next_mana_tick {
                self.mana_tick::<J>(mp_per_tick);
                self.next_mana_tick += MANA_TICK_INTERVAL;
            }
        }
    }

    fn mana_tick<J: Job<Resource = R>>(&mut self, mp_per_tick: u32) {
        let Some(mana) = J::MANA else {
            return;
        };
        if J::regenerates_mana(&self.store) {
            // Natural regeneration at full mana is not worth a warning.
            let _ = self.store.gain(mana, mp_per_tick);
        }
    }
}
