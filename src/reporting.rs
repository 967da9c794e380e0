use std::collections::VecDeque;

use serde::Serialize;

use crate::episode::{EpisodeReport, TerminationReason};

/// Distribution of one generation's fitness ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FitnessSummary {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub p50: f32,
    pub p90: f32,
}

impl FitnessSummary {
    pub fn from_ledger(fitness: &[f32]) -> Self {
        if fitness.is_empty() {
            return Self::default();
        }

        let mut sorted = fitness.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let sum: f64 = sorted.iter().map(|v| *v as f64).sum();

        Self {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: (sum / sorted.len() as f64) as f32,
            p50: nearest_rank(&sorted, 0.50),
            p90: nearest_rank(&sorted, 0.90),
        }
    }
}

fn nearest_rank(sorted: &[f32], p: f64) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((p.clamp(0.0, 1.0) * sorted.len() as f64).ceil() as usize).saturating_sub(1);
    sorted[rank.min(sorted.len() - 1)]
}

/// One line of the per-generation log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRecord {
    pub generation: u32,
    pub ticks: u64,
    pub score: u32,
    pub reason: TerminationReason,
    pub fitness: FitnessSummary,
}

impl From<&EpisodeReport> for GenerationRecord {
    fn from(report: &EpisodeReport) -> Self {
        Self {
            generation: report.generation,
            ticks: report.ticks,
            score: report.score,
            reason: report.reason,
            fitness: FitnessSummary::from_ledger(&report.fitness),
        }
    }
}

/// Keeps the most recent `capacity` generation records.
pub struct GenerationHistory {
    records: VecDeque<GenerationRecord>,
    capacity: usize,
}

impl GenerationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: GenerationRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &GenerationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.back()
    }

    /// Record with the highest best-individual fitness still in the window.
    pub fn best(&self) -> Option<&GenerationRecord> {
        self.records
            .iter()
            .max_by(|a, b| a.fitness.max.total_cmp(&b.fitness.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(generation: u32, fitness: Vec<f32>) -> EpisodeReport {
        EpisodeReport {
            generation,
            ticks: 10,
            score: 0,
            reason: TerminationReason::Extinct,
            fitness,
        }
    }

    #[test]
    fn summary_uses_nearest_rank_percentiles() {
        let ledger: Vec<f32> = (1..=100).rev().map(|i| i as f32).collect();
        let s = FitnessSummary::from_ledger(&ledger);
        assert_eq!(s.count, 100);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 100.0);
        assert!((s.mean - 50.5).abs() < 1e-4);
        assert_eq!(s.p50, 50.0);
        assert_eq!(s.p90, 90.0);
    }

    #[test]
    fn empty_ledger_summarises_to_zero() {
        assert_eq!(FitnessSummary::from_ledger(&[]), FitnessSummary::default());
    }

    #[test]
    fn history_drops_oldest_and_tracks_best() {
        let mut history = GenerationHistory::new(2);
        history.push(GenerationRecord::from(&report(1, vec![9.0])));
        history.push(GenerationRecord::from(&report(2, vec![3.0, 4.0])));
        history.push(GenerationRecord::from(&report(3, vec![5.0])));

        let gens: Vec<u32> = history.iter().map(|r| r.generation).collect();
        assert_eq!(gens, vec![2, 3]);
        assert_eq!(history.best().map(|r| r.generation), Some(3));
        assert_eq!(history.last().map(|r| r.fitness.count), Some(1));
    }
}
