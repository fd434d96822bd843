use crate::{
    error::DispatchError, metrics::DispatchMetrics, ranking::Ranking, source::InstanceSource,
};
use polyface_resolver::CandidateMethod;
use polyface_types::{value::Value, TypeUniverse};
use std::sync::Arc;
use tracing::trace;

/// The running best (candidate, instance) pair of a dynamic scan.
pub(crate) struct Selection {
    pub candidate: Arc<CandidateMethod>,
    pub instance: Option<Value>,
    pub priority: i32,
}

/// Evaluates validity gates and dynamic priorities for (candidate, instance) pairs.
pub(crate) struct Evaluator<'a> {
    ranking: &'a Ranking<'a>,
    universe: &'a TypeUniverse,
    metrics: &'a DispatchMetrics,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        ranking: &'a Ranking<'a>,
        universe: &'a TypeUniverse,
        metrics: &'a DispatchMetrics,
    ) -> Self {
        Self {
            ranking,
            universe,
            metrics,
        }
    }

    /// Effective priority of the pair, or `None` when its validity gate rejects it.
    fn effective_priority(
        &self,
        candidate: &CandidateMethod,
        instance: Option<&Value>,
        args: &[Value],
    ) -> Result<Option<i32>, DispatchError> {
        if let Some(validity) = &candidate.validity {
            self.metrics.record_validity_evaluation();
            let verdict = validity.evaluate(instance, args)?;
            if verdict.as_bool() != Some(true) {
                trace!(
                    candidate = %self.universe.method_name(candidate.method),
                    "validity check rejected candidate"
                );
                return Ok(None);
            }
        }
        match &candidate.priority_descriptor {
            Some(descriptor) => {
                self.metrics.record_priority_evaluation();
                let value = descriptor.evaluate(instance, args)?;
                value
                    .to_priority()
                    .map(Some)
                    .ok_or_else(|| DispatchError::InvalidPriority {
                        method: self.universe.method_name(descriptor.method),
                        value: format!("{value:?}"),
                    })
            }
            None => Ok(Some(candidate.priority)),
        }
    }

    fn consider(
        &self,
        best: &mut Option<Selection>,
        candidate: &Arc<CandidateMethod>,
        instance: Option<Value>,
        args: &[Value],
    ) -> Result<(), DispatchError> {
        let Some(priority) = self.effective_priority(candidate, instance.as_ref(), args)? else {
            return Ok(());
        };
        let replace = match best {
            None => true,
            Some(current) => {
                self.ranking
                    .displaces(candidate, priority, &current.candidate, current.priority)
            }
        };
        if replace {
            *best = Some(Selection {
                candidate: candidate.clone(),
                instance,
                priority,
            });
        }
        Ok(())
    }

    /// Scans every (candidate, instance) pair in order and keeps the best one. Static
    /// candidates are evaluated once, without an instance.
    pub fn select<'c>(
        &self,
        candidates: impl IntoIterator<Item = &'c Arc<CandidateMethod>>,
        args: &[Value],
        source: &dyn InstanceSource,
    ) -> Result<Option<Selection>, DispatchError> {
        let mut best = None;
        for candidate in candidates {
            if candidate.is_static() {
                self.consider(&mut best, candidate, None, args)?;
                continue;
            }
            let instances = source.instances(candidate.provider).unwrap_or_default();
            if instances.is_empty() {
                trace!(
                    provider = %self.universe.type_name(candidate.provider),
                    "no provider instance available"
                );
                continue;
            }
            for instance in instances {
                self.consider(&mut best, candidate, Some(instance), args)?;
            }
        }
        Ok(best)
    }
}
