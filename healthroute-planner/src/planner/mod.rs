//! Request-scoped orchestration of the planning pipeline.
//!
//! The baseline runs first. The three strategies then run as independent
//! tasks under one generation deadline, and their merged candidates flow
//! through validation, scoring, ranking and explanation.

use std::collections::BTreeMap;
use std::sync::Arc;

use healthroute_core::{
    CallPolicy, Candidate, CandidateMetrics, ComfortFlags, ConstraintValidator,
    ExplanationGenerator, GenerationDiagnostics, MobilityClient, Plan, PlanOutcome, PlanRequest,
    PlanResponse, PlannerConfig, Provenance, Ranker, RoutingClient, RoutingProfile,
    ScoredCandidate, ScoringEngine, StrategyReport, StrategyStatus, UpstreamError,
};
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::PlanError;
use crate::baseline::{BaselineAnalysis, BaselineAnalyzer};
use crate::policy::Collaborators;
use crate::strategy::{self, StrategyContext, StrategyOutcome};

/// Merged strategy output.
#[derive(Debug, Default)]
struct Generation {
    candidates: Vec<Candidate>,
    reports: Vec<StrategyReport>,
    deadline_expired: bool,
}

/// The trip-enrichment planner.
///
/// Holds the collaborator clients and the engine configuration; every call to
/// [`Planner::generate_plan`] is independent.
pub struct Planner {
    routing: Arc<dyn RoutingClient>,
    mobility: Arc<dyn MobilityClient>,
    config: PlannerConfig,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Planner {
    /// Construct a planner using default configuration.
    #[must_use]
    pub fn new(routing: Arc<dyn RoutingClient>, mobility: Arc<dyn MobilityClient>) -> Self {
        Self::with_config(routing, mobility, PlannerConfig::default())
    }

    /// Construct a planner with explicit configuration.
    #[must_use]
    pub const fn with_config(
        routing: Arc<dyn RoutingClient>,
        mobility: Arc<dyn MobilityClient>,
        config: PlannerConfig,
    ) -> Self {
        Self {
            routing,
            mobility,
            config,
        }
    }

    /// Engine configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Produce the recommended plan, alternatives and fallback for `request`.
    ///
    /// Strategy failures degrade the response rather than failing it. When
    /// the baseline itinerary cannot be obtained, a best-effort fallback is
    /// returned with [`PlanOutcome::EnrichmentUnavailable`].
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidRequest`] when validation fails and
    /// [`PlanError::BaselineUnavailable`] when not even the fallback could be
    /// obtained.
    pub async fn generate_plan(&self, request: &PlanRequest) -> Result<PlanResponse, PlanError> {
        request.validate()?;
        let calls = Collaborators::new(
            Arc::clone(&self.routing),
            Arc::clone(&self.mobility),
            self.config.calls,
            request.request_id.clone(),
        );
        let analyzer = BaselineAnalyzer::new(self.config.baseline);
        let baseline = match analyzer.fetch(&calls, request).await {
            Ok(baseline) => baseline,
            Err(err) => return self.without_enrichment(&calls, request, err).await,
        };
        log::info!(
            "request_id={} baseline duration={:.1}min distance={:.2}km waits={}",
            request.request_id,
            baseline.metrics.duration_minutes,
            baseline.metrics.distance_km,
            baseline.waits.len()
        );
        let generation = self.generate(request, &baseline, calls).await;
        Ok(self.select(request, &baseline, generation))
    }

    async fn without_enrichment(
        &self,
        calls: &Collaborators,
        request: &PlanRequest,
        err: UpstreamError,
    ) -> Result<PlanResponse, PlanError> {
        log::warn!(
            "request_id={} baseline unavailable, skipping enrichment: {err}",
            request.request_id
        );
        let single_attempt = calls.with_policy(CallPolicy {
            retries: 0,
            ..self.config.calls
        });
        for profile in [RoutingProfile::Transit, RoutingProfile::Walk] {
            match single_attempt
                .route(
                    profile,
                    &request.origin,
                    &request.destination,
                    request.departure,
                )
                .await
            {
                Ok(plan) if !plan.is_empty() => {
                    log::info!(
                        "request_id={} fallback obtained via {}",
                        request.request_id,
                        profile.as_str()
                    );
                    let normalised = BaselineAnalyzer::new(self.config.baseline)
                        .analyze(plan.pinned(&request.origin, &request.destination));
                    return Ok(PlanResponse {
                        request_id: request.request_id.clone(),
                        outcome: PlanOutcome::EnrichmentUnavailable,
                        recommended: None,
                        alternatives: Vec::new(),
                        fallback: Plan::normal(&normalised.plan),
                        evaluation_metrics: None,
                        explanation: self.explainer().enrichment_unavailable(),
                        diagnostics: GenerationDiagnostics::default(),
                    });
                }
                Ok(_) => {}
                Err(fallback_err) => log::debug!(
                    "request_id={} {} fallback failed: {fallback_err}",
                    request.request_id,
                    profile.as_str()
                ),
            }
        }
        Err(PlanError::BaselineUnavailable { source: err })
    }

    async fn generate(
        &self,
        request: &PlanRequest,
        baseline: &BaselineAnalysis,
        calls: Collaborators,
    ) -> Generation {
        let context = Arc::new(StrategyContext {
            request: request.clone(),
            baseline: baseline.clone(),
            config: self.config,
            calls,
        });
        let mut tasks = JoinSet::new();
        for provenance in Provenance::ALL {
            let task_context = Arc::clone(&context);
            tasks.spawn(async move { (provenance, strategy::run(provenance, &task_context).await) });
        }

        let deadline = Instant::now() + self.config.generation_deadline();
        let mut outcomes = BTreeMap::new();
        let mut generation = Generation::default();
        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((provenance, outcome)))) => {
                    outcomes.insert(provenance, outcome);
                }
                Ok(Some(Err(err))) => log::warn!(
                    "request_id={} strategy task failed: {err}",
                    request.request_id
                ),
                Ok(None) => break,
                Err(_elapsed) => {
                    log::warn!(
                        "request_id={} generation deadline of {}ms elapsed with {} strategies running",
                        request.request_id,
                        self.config.generation_deadline_ms,
                        tasks.len()
                    );
                    tasks.abort_all();
                    generation.deadline_expired = true;
                    break;
                }
            }
        }

        for provenance in Provenance::ALL {
            let outcome = outcomes
                .remove(&provenance)
                .unwrap_or(StrategyOutcome::Cancelled);
            let (status, error) = match &outcome {
                StrategyOutcome::Generated(_) => (StrategyStatus::Generated, None),
                StrategyOutcome::Unavailable(err) => {
                    log::warn!(
                        "request_id={} strategy={} unavailable: {err}",
                        request.request_id,
                        provenance.as_str()
                    );
                    (StrategyStatus::Unavailable, Some(err.to_string()))
                }
                StrategyOutcome::Cancelled => (StrategyStatus::Cancelled, None),
            };
            let found = outcome.into_candidates();
            log::debug!(
                "request_id={} strategy={} candidates={}",
                request.request_id,
                provenance.as_str(),
                found.len()
            );
            generation.reports.push(StrategyReport {
                strategy: provenance,
                status,
                candidates: found.len(),
                error,
            });
            generation.candidates.extend(found);
        }
        generation
            .candidates
            .sort_by_key(|candidate| (candidate.provenance, candidate.ordinal));
        generation
    }

    fn select(
        &self,
        request: &PlanRequest,
        baseline: &BaselineAnalysis,
        generation: Generation,
    ) -> PlanResponse {
        let Generation {
            candidates,
            reports,
            deadline_expired,
        } = generation;
        let generated = candidates.len();
        let survivors =
            ConstraintValidator::new(request.constraints).filter(candidates, &baseline.metrics);
        let rejected = generated.saturating_sub(survivors.len());
        if rejected > 0 {
            log::debug!(
                "request_id={} constraints rejected {rejected} of {generated} candidates",
                request.request_id
            );
        }
        let engine = ScoringEngine::new(self.config.scoring, request.goals, request.preferences);
        let ranking = Ranker::new(self.config.alternatives)
            .rank(engine.score_all(survivors, &baseline.metrics));
        let diagnostics = GenerationDiagnostics {
            candidates_generated: generated,
            candidates_rejected: rejected,
            strategies: reports,
            deadline_expired,
        };
        let fallback = Plan::normal(&baseline.plan);
        let Some(best) = ranking.recommended else {
            log::info!(
                "request_id={} no viable candidate among {generated}",
                request.request_id
            );
            return self.unenriched(request, baseline, &engine, fallback, diagnostics);
        };
        log::info!(
            "request_id={} recommended strategy={} score={:.2}",
            request.request_id,
            best.candidate.provenance.as_str(),
            best.score()
        );
        let explainer = self.explainer();
        PlanResponse {
            request_id: request.request_id.clone(),
            outcome: PlanOutcome::Enriched,
            recommended: Some(enriched(&explainer, &best)),
            alternatives: ranking
                .alternatives
                .iter()
                .map(|alternative| enriched(&explainer, alternative))
                .collect(),
            fallback,
            evaluation_metrics: Some(best.evaluation),
            explanation: explainer.explain(&best.candidate, &baseline.metrics),
            diagnostics,
        }
    }

    /// The fallback as recommendation, scored like a candidate.
    fn unenriched(
        &self,
        request: &PlanRequest,
        baseline: &BaselineAnalysis,
        engine: &ScoringEngine,
        fallback: Plan,
        diagnostics: GenerationDiagnostics,
    ) -> PlanResponse {
        let metrics = CandidateMetrics::measure(&baseline.plan, &baseline.metrics);
        let comfort = ComfortFlags {
            includes_stairs: baseline.plan.includes_stairs(),
            uses_confirmed_parking: false,
        };
        let breakdown = engine.breakdown(&metrics, comfort, &baseline.metrics);
        let recommended = Plan {
            score: Some(breakdown.total),
            ..fallback.clone()
        };
        PlanResponse {
            request_id: request.request_id.clone(),
            outcome: PlanOutcome::NoViableCandidate,
            recommended: Some(recommended),
            alternatives: Vec::new(),
            fallback,
            evaluation_metrics: Some(engine.evaluate(&metrics, &breakdown)),
            explanation: self
                .explainer()
                .no_viable_candidate(diagnostics.candidates_generated),
            diagnostics,
        }
    }

    const fn explainer(&self) -> ExplanationGenerator {
        ExplanationGenerator::new(self.config.significant_detour_minutes)
    }
}

fn enriched(explainer: &ExplanationGenerator, scored: &ScoredCandidate) -> Plan {
    Plan::enriched(scored, explainer.why(&scored.candidate))
}
