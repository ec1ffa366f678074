//! Run-time configuration for the [`Scheduler`](crate::scheduler::Scheduler).

/// Configuration knobs for a single scheduler run.
///
/// There is exactly one knob today: an optional safety cap on the number of
/// phases a run may take. The scheduler does not otherwise bound how long a
/// pathological chain of progressions (one that always returns another
/// sequence) can run.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    /// Maximum number of phases to execute before giving up with
    /// [`Error::PhaseLimitExceeded`](crate::error::Error::PhaseLimitExceeded).
    /// `None` (the default) means unbounded.
    pub max_phases: Option<usize>,
}

impl SchedulerConfig {
    /// Creates a config with no phase limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of phases a run may take.
    pub fn with_max_phases(mut self, max_phases: usize) -> Self {
        self.max_phases = Some(max_phases);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        assert_eq!(SchedulerConfig::default().max_phases, None);
    }

    #[test]
    fn test_with_max_phases_sets_the_cap() {
        let config = SchedulerConfig::new().with_max_phases(3);
        assert_eq!(config.max_phases, Some(3));
    }
}
