use crate::{error::FacadeError, source::InstanceSource, Dispatcher};
use polyface_resolver::ResolutionModel;
use polyface_types::{members::MethodDescription, value::Value};
use std::sync::Arc;

/// Stands in for a facade instance: every call is dispatched and the decision invoked.
#[derive(Clone)]
pub struct FacadeProxy {
    model: Arc<ResolutionModel>,
    dispatcher: Arc<dyn Dispatcher>,
    source: Arc<dyn InstanceSource>,
}

impl FacadeProxy {
    pub fn new(
        model: Arc<ResolutionModel>,
        dispatcher: Arc<dyn Dispatcher>,
        source: Arc<dyn InstanceSource>,
    ) -> Self {
        Self {
            model,
            dispatcher,
            source,
        }
    }

    pub fn model(&self) -> &Arc<ResolutionModel> {
        &self.model
    }

    /// Calls the first operation named `name` taking `args.len()` arguments.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, FacadeError> {
        let operation = self
            .model
            .find_operation(name, args.len())
            .ok_or_else(|| FacadeError::UnknownOperation {
                name: name.to_string(),
                arity: args.len(),
            })?;
        self.call_operation(operation, args)
    }

    pub fn call_operation(
        &self,
        operation: MethodDescription,
        args: Vec<Value>,
    ) -> Result<Value, FacadeError> {
        let decision = self
            .dispatcher
            .dispatch(&self.model, operation, &args, self.source.as_ref())?;
        match decision {
            Some(decision) => Ok(decision.invoke()?),
            None => Err(FacadeError::Unsupported {
                operation: match self.model.binding(operation) {
                    Some(binding) => binding.operation.signature.clone(),
                    None => format!("{operation:?}"),
                },
            }),
        }
    }
}

impl std::fmt::Debug for FacadeProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacadeProxy")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
