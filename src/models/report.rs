/// Terminal state of one instrument within a sync run.
///
/// Failures are data, not control flow: a failed instrument lands in the
/// run report while its siblings keep going.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Archive persisted with `inserted` previously-absent dates
    Updated { inserted: usize },

    /// Nothing new to persist (already current, or all windows were empty)
    NoData,

    /// Instrument has never traded; no archive was written
    NoHistory,

    /// Transport, parse or persistence failure scoped to this instrument
    Failed { reason: String },
}

/// Tally of per-instrument outcomes for one backfill or update run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    outcomes: Vec<(String, SyncOutcome)>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, code: impl Into<String>, outcome: SyncOutcome) {
        self.outcomes.push((code.into(), outcome));
    }

    pub fn outcomes(&self) -> &[(String, SyncOutcome)] {
        &self.outcomes
    }

    /// Instruments whose archive was written
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SyncOutcome::Updated { .. }))
            .count()
    }

    /// Instruments with nothing new, including never-traded ones
    pub fn no_new_data(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SyncOutcome::NoData | SyncOutcome::NoHistory))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SyncOutcome::Failed { .. }))
            .count()
    }

    /// Total records inserted across all instruments
    pub fn inserted_total(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                SyncOutcome::Updated { inserted } => *inserted,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_group_outcomes() {
        let mut report = RunReport::new();
        report.record("ALK", SyncOutcome::Updated { inserted: 3 });
        report.record("KMB", SyncOutcome::NoData);
        report.record("GRNT", SyncOutcome::NoHistory);
        report.record("TEL", SyncOutcome::Failed { reason: "timeout".into() });

        assert_eq!(report.updated(), 1);
        assert_eq!(report.no_new_data(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.inserted_total(), 3);
    }
}
