use crate::{
    decision::DispatchDecision,
    error::DispatchError,
    evaluation::Evaluator,
    metrics::{DispatchMetrics, DispatchStats},
    ranking::{argument_types, Ranking},
    source::InstanceSource,
    Dispatcher,
};
use dashmap::DashMap;
use polyface_resolver::{CandidateMethod, ModelId, OperationBinding, ResolutionModel};
use polyface_types::{members::MethodDescription, runtime::RuntimeType, value::Value};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct RankingKey {
    pub model: ModelId,
    pub operation: MethodDescription,
    pub argument_types: Box<[Option<RuntimeType>]>,
}

/// The compatible candidates of one operation for one argument-type signature.
#[derive(Debug)]
pub struct StaticRankingEntry {
    /// Static rank order, best first.
    pub candidates: Vec<Arc<CandidateMethod>>,
    /// Binding order, scanned when caller code must be evaluated.
    pub compatible: Vec<Arc<CandidateMethod>>,
    pub has_validity: bool,
    pub has_dynamic_priority: bool,
}

impl StaticRankingEntry {
    /// Whether a dispatch through this entry must evaluate caller code.
    pub fn needs_evaluation(&self) -> bool {
        self.has_validity || self.has_dynamic_priority
    }
}

/// Memoizes the static part of the ranking per argument-type signature.
///
/// Entries are pure functions of their key and are never invalidated; two threads
/// missing on the same key both compute it and the last insert wins.
#[derive(Debug, Default)]
pub struct CachedDispatcher {
    rankings: DashMap<RankingKey, Arc<StaticRankingEntry>>,
    metrics: DispatchMetrics,
}

impl CachedDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    pub fn cache_len(&self) -> usize {
        self.rankings.len()
    }

    pub fn ranking(
        &self,
        model: &ResolutionModel,
        binding: &OperationBinding,
        argument_types: Box<[Option<RuntimeType>]>,
    ) -> Arc<StaticRankingEntry> {
        let key = RankingKey {
            model: model.id(),
            operation: binding.operation.method,
            argument_types,
        };
        if let Some(cached) = self.rankings.get(&key) {
            self.metrics.record_ranking_cache_hit();
            return cached.clone();
        }

        self.metrics.record_ranking_cache_miss();
        let ranking = Ranking::new(model);
        let compatible: Vec<_> = binding
            .candidates
            .iter()
            .filter(|c| ranking.is_compatible(c, &key.argument_types))
            .cloned()
            .collect();
        let candidates = ranking.static_order(&compatible, &key.argument_types);
        let entry = Arc::new(StaticRankingEntry {
            has_validity: candidates.iter().any(|c| c.has_validity()),
            has_dynamic_priority: candidates.iter().any(|c| c.has_dynamic_priority()),
            candidates,
            compatible,
        });
        trace!(
            operation = %binding.operation.signature,
            candidates = entry.candidates.len(),
            needs_evaluation = entry.needs_evaluation(),
            "computed static ranking"
        );
        self.rankings.insert(key, entry.clone());
        entry
    }
}

impl Dispatcher for CachedDispatcher {
    fn dispatch(
        &self,
        model: &ResolutionModel,
        operation: MethodDescription,
        args: &[Value],
        source: &dyn InstanceSource,
    ) -> Result<Option<DispatchDecision>, DispatchError> {
        let Some(binding) = model.binding(operation) else {
            debug!(?operation, "operation is not part of the model");
            self.metrics.record_unresolved();
            return Ok(None);
        };
        let entry = self.ranking(model, binding, argument_types(args));

        if !entry.needs_evaluation() {
            self.metrics.record_short_circuit();
            for candidate in &entry.candidates {
                let instance = if candidate.is_static() {
                    None
                } else {
                    match source
                        .instances(candidate.provider)
                        .and_then(|found| found.into_iter().next())
                    {
                        Some(instance) => Some(instance),
                        None => continue,
                    }
                };
                debug!(
                    operation = %binding.operation.signature,
                    candidate = %model.universe().method_name(candidate.method),
                    "dispatched from static ranking"
                );
                return Ok(Some(DispatchDecision::new(
                    candidate.clone(),
                    instance,
                    args.to_vec(),
                )));
            }
            debug!(operation = %binding.operation.signature, "unresolved");
            self.metrics.record_unresolved();
            return Ok(None);
        }

        self.metrics.record_dynamic();
        let ranking = Ranking::new(model);
        let evaluator = Evaluator::new(&ranking, model.universe(), &self.metrics);
        // the running-best scan needs binding order for last-equal-wins
        match evaluator.select(&entry.compatible, args, source)? {
            Some(best) => {
                debug!(
                    operation = %binding.operation.signature,
                    candidate = %model.universe().method_name(best.candidate.method),
                    priority = best.priority,
                    "dispatched"
                );
                Ok(Some(DispatchDecision::new(
                    best.candidate,
                    best.instance,
                    args.to_vec(),
                )))
            }
            None => {
                debug!(operation = %binding.operation.signature, "unresolved");
                self.metrics.record_unresolved();
                Ok(None)
            }
        }
    }

    fn statistics(&self) -> DispatchStats {
        self.metrics.statistics(self.rankings.len())
    }
}
