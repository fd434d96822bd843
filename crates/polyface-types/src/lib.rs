//! # polyface-types
//!
//! Host object model for the polyface dispatch engine.
//! This crate provides the type and method descriptors, assignability rules and generic
//! erasure used by the resolver and the dispatch engines.
//!
//! ## Core Types
//!
//! - **[`TypeDescription`]**: Handle to a type registered in a [`TypeUniverse`].
//! - **[`MethodDescription`](members::MethodDescription)**: Handle to a method declared on a type.
//! - **[`RuntimeType`](runtime::RuntimeType)**: An erased type, as carried by values and
//!   parameters.
//! - **[`TypeComparer`](comparer::TypeComparer)**: Handles assignability, boxing and subtyping.
//! - **[`GenericResolver`](generics::GenericResolver)**: Accumulates type-variable bindings
//!   and erases generic types.
use std::fmt::{Debug, Formatter};

#[macro_use]
mod macros;

pub mod comparer;
pub mod error;
pub mod generics;
pub mod members;
pub mod runtime;
pub mod universe;
pub mod value;

pub use universe::{TypeBuilder, TypeDefinition, TypeUniverse, TypeUniverseBuilder};

/// Namespace of the reference builtins (`core.Object`, `core.Integer`, ...).
pub const BUILTIN_NAMESPACE: &str = "core";

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescription(u32);

impl TypeDescription {
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub fn builtin(self) -> Option<Builtin> {
        Builtin::from_type(self)
    }

    pub fn is_primitive(self) -> bool {
        self.builtin().and_then(Builtin::primitive_kind).is_some()
    }
}

impl Debug for TypeDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.builtin() {
            Some(b) => write!(f, "TypeDescription({})", b.name()),
            None => write!(f, "TypeDescription(#{})", self.0),
        }
    }
}

impl From<Builtin> for TypeDescription {
    fn from(value: Builtin) -> Self {
        value.ty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypeKind {
    Class { is_abstract: bool },
    Interface,
    Primitive(PrimitiveKind),
}

impl TypeKind {
    pub fn is_interface(self) -> bool {
        matches!(self, TypeKind::Interface)
    }

    pub fn is_class(self) -> bool {
        matches!(self, TypeKind::Class { .. })
    }
}

builtin_types! {
    reference_types: {
        Object => "Object" extends None,
        Number => "Number" extends Some(Builtin::Object),
        String => "String" extends Some(Builtin::Object),
        Boolean => "Boolean" extends Some(Builtin::Object),
        Character => "Character" extends Some(Builtin::Object),
        Byte => "Byte" extends Some(Builtin::Number),
        Short => "Short" extends Some(Builtin::Number),
        Integer => "Integer" extends Some(Builtin::Number),
        Long => "Long" extends Some(Builtin::Number),
        Float => "Float" extends Some(Builtin::Number),
        Double => "Double" extends Some(Builtin::Number),
        Void => "Void" extends Some(Builtin::Object),
    },
    primitive_types: {
        PrimitiveBoolean => "boolean" as Boolean boxed Boolean,
        PrimitiveChar => "char" as Char boxed Character,
        PrimitiveByte => "byte" as Byte boxed Byte,
        PrimitiveShort => "short" as Short boxed Short,
        PrimitiveInt => "int" as Int boxed Integer,
        PrimitiveLong => "long" as Long boxed Long,
        PrimitiveFloat => "float" as Float boxed Float,
        PrimitiveDouble => "double" as Double boxed Double,
        PrimitiveVoid => "void" as Void boxed Void,
    }
}

impl PrimitiveKind {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte
                | PrimitiveKind::Short
                | PrimitiveKind::Int
                | PrimitiveKind::Long
                | PrimitiveKind::Float
                | PrimitiveKind::Double
        )
    }
}

impl Builtin {
    pub fn is_abstract(self) -> bool {
        matches!(self, Builtin::Number)
    }

    pub fn qualified_name(self) -> std::string::String {
        match self.namespace() {
            "" => self.name().to_string(),
            ns => format!("{ns}.{}", self.name()),
        }
    }
}
