use crate::{
    error::InvocationError, generics::GenericType, value::Value, Builtin, TypeDescription,
};
use enum_dispatch::enum_dispatch;
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// Priority assumed when a method carries no priority tag.
pub const DEFAULT_PRIORITY: i32 = 0;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodDescription {
    pub parent: TypeDescription,
    pub index: u32,
}

impl MethodDescription {
    pub const fn new(parent: TypeDescription, index: usize) -> Self {
        Self {
            parent,
            index: index as u32,
        }
    }
}

impl Debug for MethodDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MethodDescription({:?}::{})", self.parent, self.index)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PriorityTag {
    pub value: i32,
    /// Name of a method on the same provider computing the priority at dispatch time.
    pub method: Option<String>,
}

impl Default for PriorityTag {
    fn default() -> Self {
        Self {
            value: DEFAULT_PRIORITY,
            method: None,
        }
    }
}

/// Declarative metadata attached to provider and facade methods.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct MethodTags {
    pub implement: Option<String>,
    pub refered: Option<String>,
    pub validity: Option<String>,
    pub priority: Option<PriorityTag>,
    /// Per-parameter facade argument positions; `None` entries keep the identity mapping.
    pub param_index: Vec<Option<usize>>,
}

pub type InvokeResult = Result<Value, InvocationError>;

type InstanceFn = dyn Fn(&Value, &[Value]) -> InvokeResult + Send + Sync;
type StaticFn = dyn Fn(&[Value]) -> InvokeResult + Send + Sync;

#[enum_dispatch]
pub trait Invoke {
    fn invoke(&self, receiver: Option<&Value>, args: &[Value]) -> InvokeResult;
    fn is_static(&self) -> bool;
}

#[derive(Clone)]
pub struct InstanceMethod(Arc<InstanceFn>);

impl InstanceMethod {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> InvokeResult + Send + Sync + 'static,
    {
        Self(Arc::new(body))
    }
}

impl Invoke for InstanceMethod {
    fn invoke(&self, receiver: Option<&Value>, args: &[Value]) -> InvokeResult {
        match receiver {
            Some(receiver) => (self.0)(receiver, args),
            None => Err(InvocationError::MissingReceiver),
        }
    }

    fn is_static(&self) -> bool {
        false
    }
}

impl Debug for InstanceMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "InstanceMethod({:p})", Arc::as_ptr(&self.0))
    }
}

#[derive(Clone)]
pub struct StaticMethod(Arc<StaticFn>);

impl StaticMethod {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> InvokeResult + Send + Sync + 'static,
    {
        Self(Arc::new(body))
    }
}

impl Invoke for StaticMethod {
    fn invoke(&self, _receiver: Option<&Value>, args: &[Value]) -> InvokeResult {
        (self.0)(args)
    }

    fn is_static(&self) -> bool {
        true
    }
}

impl Debug for StaticMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StaticMethod({:p})", Arc::as_ptr(&self.0))
    }
}

/// Invocation trampoline for a method body.
#[enum_dispatch(Invoke)]
#[derive(Clone, Debug)]
pub enum Callable {
    InstanceMethod,
    StaticMethod,
}

#[derive(Clone, Debug)]
pub struct MethodDefinition {
    pub name: String,
    pub parameters: Vec<GenericType>,
    pub return_type: GenericType,
    pub visibility: Visibility,
    pub is_static: bool,
    pub tags: MethodTags,
    /// `None` for abstract methods.
    pub callable: Option<Callable>,
}

impl MethodDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: vec![],
            return_type: Builtin::PrimitiveVoid.into(),
            visibility: Visibility::Public,
            is_static: false,
            tags: MethodTags::default(),
            callable: None,
        }
    }

    pub fn param(mut self, ty: impl Into<GenericType>) -> Self {
        self.parameters.push(ty.into());
        self
    }

    pub fn returns(mut self, ty: impl Into<GenericType>) -> Self {
        self.return_type = ty.into();
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> InvokeResult + Send + Sync + 'static,
    {
        self.is_static = false;
        self.callable = Some(InstanceMethod::new(body).into());
        self
    }

    pub fn static_body<F>(mut self, body: F) -> Self
    where
        F: Fn(&[Value]) -> InvokeResult + Send + Sync + 'static,
    {
        self.is_static = true;
        self.callable = Some(StaticMethod::new(body).into());
        self
    }

    pub fn implement(mut self, value: &str) -> Self {
        self.tags.implement = Some(value.to_string());
        self
    }

    pub fn refered(mut self, value: &str) -> Self {
        self.tags.refered = Some(value.to_string());
        self
    }

    pub fn validity(mut self, method: &str) -> Self {
        self.tags.validity = Some(method.to_string());
        self
    }

    pub fn priority(mut self, value: i32) -> Self {
        self.tags.priority.get_or_insert_with(PriorityTag::default).value = value;
        self
    }

    pub fn priority_method(mut self, method: &str) -> Self {
        self.tags.priority.get_or_insert_with(PriorityTag::default).method =
            Some(method.to_string());
        self
    }

    /// Maps parameter `position` to facade argument `index`.
    pub fn param_index(mut self, position: usize, index: usize) -> Self {
        if self.tags.param_index.len() <= position {
            self.tags.param_index.resize(position + 1, None);
        }
        self.tags.param_index[position] = Some(index);
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.callable.is_none()
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Facade argument position each parameter reads from.
    pub fn argument_positions(&self) -> Vec<usize> {
        (0..self.parameters.len())
            .map(|position| {
                self.tags
                    .param_index
                    .get(position)
                    .copied()
                    .flatten()
                    .unwrap_or(position)
            })
            .collect()
    }
}
