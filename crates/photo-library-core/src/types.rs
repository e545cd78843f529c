use serde::Serialize;

/// Counters reported to the operator at the end of a batch.
///
/// Per-record errors are converted into a skip and counted here; they never
/// abort the batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Files matched by the scan
    pub files_matched: usize,

    /// Records newly created (indexed or library)
    pub records_created: usize,

    /// Indexed records linked to a library record
    pub records_imported: usize,

    /// Canonical files written under the library root
    pub files_copied: usize,

    /// Missing-flag transitions on either record kind
    pub missing_flag_changes: usize,

    /// Records skipped because of a per-record error
    pub errors: usize,
}

impl BatchSummary {
    /// Fold the counters of another pass into this summary.
    pub fn merge(&mut self, other: &BatchSummary) {
        self.files_matched += other.files_matched;
        self.records_created += other.records_created;
        self.records_imported += other.records_imported;
        self.files_copied += other.files_copied;
        self.missing_flag_changes += other.missing_flag_changes;
        self.errors += other.errors;
    }
}
