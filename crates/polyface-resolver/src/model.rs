use polyface_types::{
    generics::GenericType,
    members::{Callable, Invoke, InvokeResult, MethodDescription},
    runtime::RuntimeType,
    value::Value,
    TypeDescription, TypeUniverse,
};
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`ResolutionModel`], used to key dispatch caches.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ModelId(u64);

impl ModelId {
    fn next() -> Self {
        Self(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Picks `args[param_index[i]]` for every position `i`. Missing arguments read as null.
pub fn select_arguments(args: &[Value], param_index: &[usize]) -> Vec<Value> {
    param_index
        .iter()
        .map(|&index| args.get(index).cloned().unwrap_or(Value::Null))
        .collect()
}

/// A helper method named by a validity or priority tag, with its own argument mapping.
#[derive(Clone, Debug)]
pub struct TagDescriptor {
    pub method: MethodDescription,
    pub callable: Callable,
    pub param_index: Box<[usize]>,
}

pub type ValidityDescriptor = TagDescriptor;
pub type PriorityDescriptor = TagDescriptor;

impl TagDescriptor {
    pub fn evaluate(&self, instance: Option<&Value>, args: &[Value]) -> InvokeResult {
        self.callable
            .invoke(instance, &select_arguments(args, &self.param_index))
    }
}

impl PartialEq for TagDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method && self.param_index == other.param_index
    }
}

impl Eq for TagDescriptor {}

impl Hash for TagDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.method.hash(state);
        self.param_index.hash(state);
    }
}

/// One provider method able to serve one facade operation.
#[derive(Clone, Debug)]
pub struct CandidateMethod {
    pub provider: TypeDescription,
    pub method: MethodDescription,
    pub callable: Callable,
    /// Erased parameter types, in the candidate's own parameter order.
    pub parameter_types: Box<[RuntimeType]>,
    /// Declared parameter types when the method comes from a generic ancestor.
    pub generic_parameter_types: Option<Box<[GenericType]>>,
    /// Candidate parameter position -> facade argument position.
    pub param_index: Box<[usize]>,
    pub validity: Option<ValidityDescriptor>,
    pub priority: i32,
    pub priority_descriptor: Option<PriorityDescriptor>,
}

impl CandidateMethod {
    pub fn is_static(&self) -> bool {
        self.callable.is_static()
    }

    pub fn has_validity(&self) -> bool {
        self.validity.is_some()
    }

    pub fn has_dynamic_priority(&self) -> bool {
        self.priority_descriptor.is_some()
    }

    pub fn select_arguments(&self, args: &[Value]) -> Vec<Value> {
        select_arguments(args, &self.param_index)
    }

    /// Calls the candidate with the facade arguments remapped through `param_index`.
    pub fn invoke(&self, instance: Option<&Value>, args: &[Value]) -> InvokeResult {
        self.callable.invoke(instance, &self.select_arguments(args))
    }
}

impl PartialEq for CandidateMethod {
    fn eq(&self, other: &Self) -> bool {
        self.provider == other.provider
            && self.method == other.method
            && self.param_index == other.param_index
            && self.priority == other.priority
            && self.validity == other.validity
            && self.priority_descriptor == other.priority_descriptor
    }
}

impl Eq for CandidateMethod {}

impl Hash for CandidateMethod {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.provider.hash(state);
        self.method.hash(state);
        self.param_index.hash(state);
        self.priority.hash(state);
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FacadeOperation {
    pub method: MethodDescription,
    pub name: String,
    pub parameter_types: Box<[RuntimeType]>,
    pub return_type: RuntimeType,
    pub refered: Option<String>,
    /// `name(qualified.P1,qualified.P2)`
    pub signature: String,
}

impl FacadeOperation {
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

/// A facade operation and its candidates, in resolution-pass order.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct OperationBinding {
    pub operation: FacadeOperation,
    pub candidates: Vec<Arc<CandidateMethod>>,
}

/// Immutable mapping from the operations of one facade type to their candidate methods.
pub struct ResolutionModel {
    id: ModelId,
    universe: Arc<TypeUniverse>,
    facade: TypeDescription,
    bindings: Vec<OperationBinding>,
    by_operation: HashMap<MethodDescription, usize>,
}

impl ResolutionModel {
    pub(crate) fn new(
        universe: Arc<TypeUniverse>,
        facade: TypeDescription,
        bindings: Vec<OperationBinding>,
    ) -> Self {
        let by_operation = bindings
            .iter()
            .enumerate()
            .map(|(index, binding)| (binding.operation.method, index))
            .collect();
        Self {
            id: ModelId::next(),
            universe,
            facade,
            bindings,
            by_operation,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn universe(&self) -> &Arc<TypeUniverse> {
        &self.universe
    }

    pub fn facade(&self) -> TypeDescription {
        self.facade
    }

    pub fn facade_namespace(&self) -> &str {
        &self.universe.definition(self.facade).namespace
    }

    pub fn bindings(&self) -> &[OperationBinding] {
        &self.bindings
    }

    pub fn binding(&self, operation: MethodDescription) -> Option<&OperationBinding> {
        self.by_operation
            .get(&operation)
            .map(|&index| &self.bindings[index])
    }

    /// First operation declared with this name and arity.
    pub fn find_operation(&self, name: &str, arity: usize) -> Option<MethodDescription> {
        self.bindings
            .iter()
            .find(|b| b.operation.name == name && b.operation.arity() == arity)
            .map(|b| b.operation.method)
    }

    pub fn candidate_count(&self) -> usize {
        self.bindings.iter().map(|b| b.candidates.len()).sum()
    }
}

impl PartialEq for ResolutionModel {
    fn eq(&self, other: &Self) -> bool {
        self.facade == other.facade && self.bindings == other.bindings
    }
}

impl Eq for ResolutionModel {}

impl Hash for ResolutionModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.facade.hash(state);
        self.bindings.hash(state);
    }
}

impl Debug for ResolutionModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionModel")
            .field("id", &self.id)
            .field("facade", &self.universe.type_name(self.facade))
            .field("operations", &self.bindings.len())
            .field("candidates", &self.candidate_count())
            .finish()
    }
}
