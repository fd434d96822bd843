use crate::{
    decision::DispatchDecision,
    error::DispatchError,
    evaluation::Evaluator,
    metrics::{DispatchMetrics, DispatchStats},
    ranking::{argument_types, Ranking},
    source::InstanceSource,
    Dispatcher,
};
use polyface_resolver::ResolutionModel;
use polyface_types::{members::MethodDescription, value::Value};
use tracing::debug;

/// Filters, evaluates and ranks every candidate on every call. Holds no state besides
/// its counters.
#[derive(Debug, Default)]
pub struct DirectDispatcher {
    metrics: DispatchMetrics,
}

impl DirectDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }
}

impl Dispatcher for DirectDispatcher {
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
        let ranking = Ranking::new(model);
        let types = argument_types(args);
        let compatible = binding
            .candidates
            .iter()
            .filter(|c| ranking.is_compatible(c, &types));

        self.metrics.record_dynamic();
        let evaluator = Evaluator::new(&ranking, model.universe(), &self.metrics);
        match evaluator.select(compatible, args, source)? {
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
        self.metrics.statistics(0)
    }
}
