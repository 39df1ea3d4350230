//! Paired record lists for a query or a batch

use super::types::*;

/// Raw and extracted records kept in lockstep, with their counters
///
/// Records only enter through [`RecordContainer::push`], which takes both
/// halves of a pair, so the two lists always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordContainer {
    raw: Vec<RawRecord>,
    extracted: Vec<ExtractedRecord>,
    counters: RunCounters,
}

impl RecordContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw record and its extracted counterpart
    pub fn push(&mut self, raw: RawRecord, extracted: ExtractedRecord) {
        self.raw.push(raw);
        self.extracted.push(extracted);
        self.counters.raw_saved += 1;
    }

    /// Count one extraction attempt against a link
    pub fn record_extraction(&mut self, succeeded: bool) {
        self.counters.urls_processed += 1;
        if succeeded {
            self.counters.extractions_success += 1;
        }
    }

    /// Append everything from another container, summing counters
    pub fn extend(&mut self, other: RecordContainer) {
        self.raw.extend(other.raw);
        self.extracted.extend(other.extracted);
        self.counters += other.counters;
    }

    pub fn raw(&self) -> &[RawRecord] {
        &self.raw
    }

    pub fn extracted(&self) -> &[ExtractedRecord] {
        &self.extracted
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// Number of record pairs
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Split into raw records, extracted records and counters
    pub fn into_parts(self) -> (Vec<RawRecord>, Vec<ExtractedRecord>, RunCounters) {
        (self.raw, self.extracted, self.counters)
    }
}
