use crate::addresses::{Coordinate, RejectedRow};
use crate::fetcher::Outcome;

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub index: usize,
    pub coordinate: Coordinate,
    pub error: String,
}

/// Summary of a batch: what succeeded, what failed and which input rows were
/// never submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub successes: usize,
    pub failures: Vec<Failure>,
    pub rejected: Vec<RejectedRow>,
}

impl FetchReport {
    pub fn new(outcomes: &[Outcome], rejected: &[RejectedRow]) -> Self {
        let failures = outcomes
            .iter()
            .filter_map(|outcome| {
                outcome.result.as_ref().err().map(|e| Failure {
                    index: outcome.index,
                    coordinate: outcome.coordinate,
                    error: e.to_string(),
                })
            })
            .collect::<Vec<_>>();

        Self {
            successes: outcomes.len() - failures.len(),
            failures,
            rejected: rejected.to_vec(),
        }
    }

    pub fn total(&self) -> usize {
        self.successes + self.failures.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty() && self.rejected.is_empty()
    }

    pub fn log(&self) {
        log::info!("{self}");
        for failure in &self.failures {
            log::warn!(
                "Failed #{} {}: {}",
                failure.index,
                failure.coordinate,
                failure.error
            );
        }
        for row in &self.rejected {
            log::warn!("Rejected line {}: {}", row.line, row.reason);
        }
    }
}

impl std::fmt::Display for FetchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} isochrones fetched, {} failed, {} rows rejected",
            self.successes,
            self.total(),
            self.failures.len(),
            self.rejected.len()
        )
    }
}
