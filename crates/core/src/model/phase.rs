use std::fmt;

/// Coarse lifecycle state of a quiz session.
///
/// Legal transitions: `Loading → InProgress → Scoring → Finished`, and
/// `Finished → Loading` on restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Loading,
    InProgress,
    Scoring,
    Finished,
}

impl Phase {
    #[must_use]
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Loading, Phase::InProgress)
                | (Phase::InProgress, Phase::Scoring)
                | (Phase::Scoring, Phase::Finished)
                | (Phase::Finished, Phase::Loading)
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::InProgress => "in progress",
            Phase::Scoring => "scoring",
            Phase::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
