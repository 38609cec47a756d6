use std::time::{Duration, Instant};

/// What a fired debounce slot asks the container to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTrigger {
    /// Blank query: reload the full collection.
    Load,
    /// Non-blank query: run a remote search.
    Search(String),
}

/// Single-slot debounce timer for the search box.
///
/// At most one trigger is pending at a time; every `schedule` replaces the
/// slot and restarts the quiet period, so only the slot that survives an
/// uninterrupted quiet period ever fires.
#[derive(Debug, Default)]
pub struct Debounce {
    pending: Option<(Instant, SearchTrigger)>,
}

impl Debounce {
    pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Arm (or re-arm) the slot for `query`, starting a fresh quiet period.
    pub fn schedule(&mut self, query: &str, now: Instant) {
        let trigger = if query.trim().is_empty() {
            SearchTrigger::Load
        } else {
            SearchTrigger::Search(query.to_string())
        };
        self.pending = Some((now + Self::QUIET_PERIOD, trigger));
    }

    /// Drop any pending trigger without firing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the trigger once its quiet period has elapsed.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<SearchTrigger> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => {
                self.pending.take().map(|(_, trigger)| trigger)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_last_schedule_fires() {
        let mut debounce = Debounce::new();
        let start = Instant::now();

        debounce.schedule("a", start);
        debounce.schedule("ab", start + Duration::from_millis(100));
        debounce.schedule("abc", start + Duration::from_millis(200));

        // Not due yet relative to the last re-arm.
        assert_eq!(
            debounce.fire_if_due(start + Duration::from_millis(400)),
            None
        );

        let fired = debounce.fire_if_due(start + Duration::from_millis(500));
        assert_eq!(fired, Some(SearchTrigger::Search("abc".to_string())));

        // The slot is consumed: a second poll yields nothing.
        assert_eq!(debounce.fire_if_due(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn blank_query_reverts_to_load() {
        let mut debounce = Debounce::new();
        let start = Instant::now();

        debounce.schedule("", start);
        assert_eq!(
            debounce.fire_if_due(start + Debounce::QUIET_PERIOD),
            Some(SearchTrigger::Load)
        );

        debounce.schedule("   ", start);
        assert_eq!(
            debounce.fire_if_due(start + Debounce::QUIET_PERIOD),
            Some(SearchTrigger::Load)
        );
    }

    #[test]
    fn cancel_clears_the_slot() {
        let mut debounce = Debounce::new();
        let start = Instant::now();

        debounce.schedule("query", start);
        assert!(debounce.is_armed());

        debounce.cancel();
        assert!(!debounce.is_armed());
        assert_eq!(debounce.fire_if_due(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn does_not_fire_before_the_quiet_period() {
        let mut debounce = Debounce::new();
        let start = Instant::now();

        debounce.schedule("query", start);
        assert_eq!(
            debounce.fire_if_due(start + Duration::from_millis(299)),
            None
        );
        assert!(debounce.is_armed());
    }
}
