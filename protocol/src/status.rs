use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid job status: {0}")]
pub struct ParseStatusError(pub String);

/// A job's position in the render pipeline.
///
/// `Created` is a legacy synonym for `Pending` observed in some active-set
/// queries upstream; the submit worker treats both as "awaiting submission
/// work" but intake never writes `Created` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Created,
    Submitted,
    Queued,
    Rendering,
    Completed,
    Failed,
}

impl JobStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Created => "created",
            JobStatus::Submitted => "submitted",
            JobStatus::Queued => "queued",
            JobStatus::Rendering => "rendering",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ParseStatusError> {
        match value {
            "pending" => Ok(Self::Pending),
            "created" => Ok(Self::Created),
            "submitted" => Ok(Self::Submitted),
            "queued" => Ok(Self::Queued),
            "rendering" => Ok(Self::Rendering),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }

    /// `pending` and its legacy synonym `created`: not yet handed to the provider.
    pub fn is_awaiting_submission(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Created)
    }

    /// Known to the provider and not yet terminal.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            JobStatus::Submitted | JobStatus::Queued | JobStatus::Rendering
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether `self -> next` is a legal edge in the status DAG.
    ///
    /// Terminal states are immutable; any non-terminal state may fail;
    /// otherwise the DAG only moves forward one step at a time.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobStatus::Failed {
            return true;
        }
        matches!(
            (self, next),
            (JobStatus::Pending | JobStatus::Created, JobStatus::Submitted)
                | (JobStatus::Pending | JobStatus::Created, JobStatus::Queued)
                | (JobStatus::Pending | JobStatus::Created, JobStatus::Rendering)
                | (JobStatus::Submitted, JobStatus::Queued)
                | (JobStatus::Submitted, JobStatus::Rendering)
                | (JobStatus::Submitted, JobStatus::Completed)
                | (JobStatus::Queued, JobStatus::Rendering)
                | (JobStatus::Queued, JobStatus::Completed)
                | (JobStatus::Rendering, JobStatus::Completed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for status in [
            JobStatus::Pending,
            JobStatus::Created,
            JobStatus::Submitted,
            JobStatus::Queued,
            JobStatus::Rendering,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn terminal_states_reject_every_transition() {
        for terminal in [JobStatus::Completed, JobStatus::Failed] {
            for next in [JobStatus::Pending, JobStatus::Queued, JobStatus::Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn any_non_terminal_state_may_fail() {
        for state in [
            JobStatus::Pending,
            JobStatus::Created,
            JobStatus::Submitted,
            JobStatus::Queued,
            JobStatus::Rendering,
        ] {
            assert!(state.can_transition_to(JobStatus::Failed));
        }
    }

    #[test]
    fn pending_cannot_skip_straight_to_completed_implicitly_via_queued_only() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Submitted));
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Submitted));
    }
}
