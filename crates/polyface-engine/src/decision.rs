use polyface_resolver::CandidateMethod;
use polyface_types::{members::InvokeResult, value::Value};
use std::sync::Arc;

/// The candidate and provider instance chosen for one call, with the call's arguments.
#[derive(Clone, Debug)]
pub struct DispatchDecision {
    candidate: Arc<CandidateMethod>,
    instance: Option<Value>,
    arguments: Vec<Value>,
}

impl DispatchDecision {
    pub fn new(
        candidate: Arc<CandidateMethod>,
        instance: Option<Value>,
        arguments: Vec<Value>,
    ) -> Self {
        Self {
            candidate,
            instance,
            arguments,
        }
    }

    pub fn candidate(&self) -> &Arc<CandidateMethod> {
        &self.candidate
    }

    /// `None` when the candidate is static.
    pub fn instance(&self) -> Option<&Value> {
        self.instance.as_ref()
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Invokes the chosen candidate with the arguments remapped through its `param_index`.
    pub fn invoke(&self) -> InvokeResult {
        self.candidate
            .invoke(self.instance.as_ref(), &self.arguments)
    }
}
