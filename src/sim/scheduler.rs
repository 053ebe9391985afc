//! Unified timer queue
//!
//! Every periodic driver and delayed callback of a session is an entry here,
//! keyed by a caller-defined job value. Nothing runs on its own: the owner
//! polls `pop_due` with the current time and executes what comes back, and
//! `clear` tears the whole session's timers down in one sweep.

#[derive(Debug, Clone)]
struct Timer<J> {
    /// Insertion order, breaks due-time ties
    seq: u64,
    due: f64,
    /// Repeat interval; `None` for one-shots
    period: Option<f64>,
    job: J,
}

/// Smallest accepted period, so a zero interval can't spin forever
const MIN_PERIOD_MS: f64 = 1.0;

/// Timer queue over job values of type `J`
#[derive(Debug, Clone)]
pub struct Scheduler<J> {
    timers: Vec<Timer<J>>,
    next_seq: u64,
}

impl<J> Default for Scheduler<J> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<J: Clone + PartialEq> Scheduler<J> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: f64, period: Option<f64>, job: J) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            seq,
            due,
            period,
            job,
        });
    }

    /// Run `job` once, `delay` ms from `now`
    pub fn after(&mut self, now: f64, delay: f64, job: J) {
        self.push(now + delay.max(0.0), None, job);
    }

    /// Run `job` every `period` ms, first at `now + period`
    pub fn every(&mut self, now: f64, period: f64, job: J) {
        let period = period.max(MIN_PERIOD_MS);
        self.push(now + period, Some(period), job);
    }

    /// Cancel every timer carrying `job`. Returns how many were removed.
    pub fn cancel_job(&mut self, job: &J) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| &t.job != job);
        before - self.timers.len()
    }

    /// Change the interval of the periodic timers carrying `job`; the next
    /// firing moves to `now + period`. Returns false if none exist.
    pub fn set_period(&mut self, job: &J, now: f64, period: f64) -> bool {
        let period = period.max(MIN_PERIOD_MS);
        let mut found = false;
        for timer in self.timers.iter_mut().filter(|t| &t.job == job) {
            if timer.period.is_some() {
                timer.period = Some(period);
                timer.due = now + period;
                found = true;
            }
        }
        found
    }

    /// Interval of the first periodic timer carrying `job`
    pub fn period_of(&self, job: &J) -> Option<f64> {
        self.timers
            .iter()
            .find(|t| &t.job == job)
            .and_then(|t| t.period)
    }

    pub fn is_scheduled(&self, job: &J) -> bool {
        self.timers.iter().any(|t| &t.job == job)
    }

    /// Take the earliest timer due at or before `now`. Periodic timers are
    /// re-armed one period later; ties go to the timer scheduled first.
    pub fn pop_due(&mut self, now: f64) -> Option<J> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
            .map(|(idx, _)| idx)?;

        match self.timers[idx].period {
            Some(period) => {
                let timer = &mut self.timers[idx];
                timer.due += period;
                Some(timer.job.clone())
            }
            None => Some(self.timers.remove(idx).job),
        }
    }

    /// Drop every timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
