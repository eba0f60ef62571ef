use std::time::Duration;

use videogen_protocol::JobStatus;

/// Server-side cache-control directive for a status response. Terminal
/// statuses are safe to cache at the edge since they never change again;
/// non-terminal statuses must not be cached so polling clients observe
/// progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDirective {
    SMaxAge(u32),
    NoCache,
}

impl CacheDirective {
    pub fn for_status(status: JobStatus) -> Self {
        if status.is_terminal() {
            CacheDirective::SMaxAge(60)
        } else {
            CacheDirective::NoCache
        }
    }

    pub fn header_value(self) -> String {
        match self {
            CacheDirective::SMaxAge(secs) => format!("s-maxage={secs}"),
            CacheDirective::NoCache => "no-cache".to_string(),
        }
    }
}

/// The client-side adaptive polling schedule: first read at 10s, then 15s
/// until the 3-minute mark, 30s until the 10-minute mark, 60s after that.
/// Polling stops on terminal status, which callers detect from the response
/// itself rather than from this function.
pub fn next_poll_delay(elapsed_since_first_request: Duration) -> Duration {
    const THREE_MINUTES: Duration = Duration::from_secs(3 * 60);
    const TEN_MINUTES: Duration = Duration::from_secs(10 * 60);

    if elapsed_since_first_request < THREE_MINUTES {
        Duration::from_secs(15)
    } else if elapsed_since_first_request < TEN_MINUTES {
        Duration::from_secs(30)
    } else {
        Duration::from_secs(60)
    }
}

pub const FIRST_POLL_DELAY: Duration = Duration::from_secs(10);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_are_cacheable() {
        assert_eq!(CacheDirective::for_status(JobStatus::Completed), CacheDirective::SMaxAge(60));
        assert_eq!(CacheDirective::for_status(JobStatus::Failed), CacheDirective::SMaxAge(60));
    }

    #[test]
    fn non_terminal_statuses_are_never_cached() {
        for status in [JobStatus::Pending, JobStatus::Submitted, JobStatus::Queued, JobStatus::Rendering] {
            assert_eq!(CacheDirective::for_status(status), CacheDirective::NoCache);
        }
    }

    #[test]
    fn header_values_match_the_documented_format() {
        assert_eq!(CacheDirective::SMaxAge(60).header_value(), "s-maxage=60");
        assert_eq!(CacheDirective::NoCache.header_value(), "no-cache");
    }

    #[test]
    fn poll_schedule_widens_over_time() {
        assert_eq!(next_poll_delay(Duration::from_secs(0)), Duration::from_secs(15));
        assert_eq!(next_poll_delay(Duration::from_secs(179)), Duration::from_secs(15));
        assert_eq!(next_poll_delay(Duration::from_secs(180)), Duration::from_secs(30));
        assert_eq!(next_poll_delay(Duration::from_secs(599)), Duration::from_secs(30));
        assert_eq!(next_poll_delay(Duration::from_secs(600)), Duration::from_secs(60));
    }
}
