use crate::{Builtin, PrimitiveKind, TypeDescription, TypeUniverse};
use std::fmt::Debug;

/// An erased type: generic arguments are gone, only the raw type or array shape remains.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum RuntimeType {
    Type(TypeDescription),
    Array(Box<RuntimeType>),
}

impl RuntimeType {
    pub fn array_of(component: impl Into<RuntimeType>) -> Self {
        RuntimeType::Array(Box::new(component.into()))
    }

    pub fn description(&self) -> Option<TypeDescription> {
        match self {
            RuntimeType::Type(td) => Some(*td),
            RuntimeType::Array(_) => None,
        }
    }

    pub fn component(&self) -> Option<&RuntimeType> {
        match self {
            RuntimeType::Array(component) => Some(component),
            RuntimeType::Type(_) => None,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.description()
            .and_then(TypeDescription::builtin)
            .and_then(Builtin::primitive_kind)
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive_kind().is_some()
    }

    /// Qualified name; arrays render as `component[]`.
    pub fn get_name(&self, universe: &TypeUniverse) -> String {
        match self {
            RuntimeType::Type(td) => universe.type_name(*td),
            RuntimeType::Array(component) => format!("{}[]", component.get_name(universe)),
        }
    }
}

impl From<TypeDescription> for RuntimeType {
    fn from(value: TypeDescription) -> Self {
        RuntimeType::Type(value)
    }
}

impl From<Builtin> for RuntimeType {
    fn from(value: Builtin) -> Self {
        RuntimeType::Type(value.ty())
    }
}
