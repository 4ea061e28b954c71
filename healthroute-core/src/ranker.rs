//! Total ordering of scored candidates.

use std::cmp::Ordering;

use crate::ScoredCandidate;

/// Ranked survivors split into the recommendation and its alternatives.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ranking {
    /// Best candidate, if any survived.
    pub recommended: Option<ScoredCandidate>,
    /// Runners-up in rank order.
    pub alternatives: Vec<ScoredCandidate>,
}

/// Orders candidates by score, then duration, then provenance, then
/// generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranker {
    alternatives: usize,
}

impl Ranker {
    /// Keep up to `alternatives` runners-up.
    #[must_use]
    pub const fn new(alternatives: usize) -> Self {
        Self { alternatives }
    }

    /// The comparator used by [`Ranker::rank`]; `Less` sorts first.
    #[must_use]
    pub fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
        b.score()
            .total_cmp(&a.score())
            .then_with(|| {
                a.candidate
                    .metrics
                    .total_duration_minutes
                    .total_cmp(&b.candidate.metrics.total_duration_minutes)
            })
            .then_with(|| a.candidate.provenance.cmp(&b.candidate.provenance))
            .then_with(|| a.candidate.ordinal.cmp(&b.candidate.ordinal))
    }

    /// Sort `scored` and split off the recommendation.
    #[must_use]
    pub fn rank(&self, mut scored: Vec<ScoredCandidate>) -> Ranking {
        scored.sort_by(Self::compare);
        let mut ranked = scored.into_iter();
        let recommended = ranked.next();
        let alternatives = ranked.take(self.alternatives).collect();
        Ranking {
            recommended,
            alternatives,
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Candidate, CandidateMetrics, ComfortFlags, EvaluationMetrics, Provenance, RoutePlan,
        ScoreBreakdown,
    };
    use rstest::rstest;

    fn scored(provenance: Provenance, ordinal: usize, score: f64, duration: f64) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate {
                provenance,
                ordinal,
                plan: RoutePlan::default(),
                comfort: ComfortFlags::default(),
                metrics: CandidateMetrics {
                    total_duration_minutes: duration,
                    ..CandidateMetrics::default()
                },
            },
            breakdown: ScoreBreakdown {
                total: score,
                ..ScoreBreakdown::default()
            },
            evaluation: EvaluationMetrics::default(),
        }
    }

    fn order(ranking: &Ranking) -> Vec<(Provenance, usize)> {
        ranking
            .recommended
            .iter()
            .chain(&ranking.alternatives)
            .map(|s| (s.candidate.provenance, s.candidate.ordinal))
            .collect()
    }

    #[rstest]
    fn sorts_by_score_then_duration_then_provenance() {
        let ranking = Ranker::new(3).rank(vec![
            scored(Provenance::LoopPadding, 0, 80.0, 30.0),
            scored(Provenance::WaypointInsertion, 0, 80.0, 30.0),
            scored(Provenance::WaitToWalk, 0, 80.0, 35.0),
            scored(Provenance::LoopPadding, 1, 90.0, 50.0),
        ]);
        assert_eq!(
            order(&ranking),
            vec![
                (Provenance::LoopPadding, 1),
                (Provenance::WaypointInsertion, 0),
                (Provenance::LoopPadding, 0),
                (Provenance::WaitToWalk, 0),
            ]
        );
    }

    #[rstest]
    fn ordinal_breaks_remaining_ties() {
        let ranking = Ranker::new(2).rank(vec![
            scored(Provenance::WaypointInsertion, 2, 70.0, 30.0),
            scored(Provenance::WaypointInsertion, 1, 70.0, 30.0),
        ]);
        assert_eq!(
            order(&ranking),
            vec![
                (Provenance::WaypointInsertion, 1),
                (Provenance::WaypointInsertion, 2)
            ]
        );
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    #[case(5, 2)]
    fn alternatives_are_capped(#[case] survivors: usize, #[case] expected: usize) {
        let candidates = (0..survivors)
            .map(|i| scored(Provenance::WaitToWalk, i, 50.0, 30.0))
            .collect();
        let ranking = Ranker::default().rank(candidates);
        assert_eq!(ranking.recommended.is_some(), survivors > 0);
        assert_eq!(ranking.alternatives.len(), expected);
    }
}
