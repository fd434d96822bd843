use crate::{runtime::RuntimeType, Builtin, TypeDescription, TypeUniverse};
use std::collections::HashMap;

/// The `index`-th generic parameter declared by `owner`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeVariable {
    pub owner: TypeDescription,
    pub index: usize,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct GenericParameter {
    pub name: String,
    pub bounds: Vec<GenericType>,
}

/// A declared, possibly generic, type as written in a signature or supertype list.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum GenericType {
    Type(TypeDescription),
    Variable(TypeVariable),
    Parameterized {
        raw: TypeDescription,
        arguments: Vec<GenericType>,
    },
    Array(Box<GenericType>),
    Wildcard {
        upper_bounds: Vec<GenericType>,
        lower_bounds: Vec<GenericType>,
    },
}

impl GenericType {
    pub fn parameterized(raw: TypeDescription, arguments: Vec<GenericType>) -> Self {
        GenericType::Parameterized { raw, arguments }
    }

    pub fn array_of(component: impl Into<GenericType>) -> Self {
        GenericType::Array(Box::new(component.into()))
    }

    /// `? extends bound`
    pub fn wildcard_extends(bound: impl Into<GenericType>) -> Self {
        GenericType::Wildcard {
            upper_bounds: vec![bound.into()],
            lower_bounds: vec![],
        }
    }

    /// `? super bound`
    pub fn wildcard_super(bound: impl Into<GenericType>) -> Self {
        GenericType::Wildcard {
            upper_bounds: vec![],
            lower_bounds: vec![bound.into()],
        }
    }

    /// The named type this generic type is rooted at, if any.
    pub fn raw_type(&self) -> Option<TypeDescription> {
        match self {
            GenericType::Type(td) => Some(*td),
            GenericType::Parameterized { raw, .. } => Some(*raw),
            _ => None,
        }
    }

    /// True when erasure cannot change this type.
    pub fn is_concrete(&self) -> bool {
        match self {
            GenericType::Type(_) => true,
            GenericType::Array(component) => component.is_concrete(),
            _ => false,
        }
    }
}

impl From<TypeDescription> for GenericType {
    fn from(value: TypeDescription) -> Self {
        GenericType::Type(value)
    }
}

impl From<Builtin> for GenericType {
    fn from(value: Builtin) -> Self {
        GenericType::Type(value.ty())
    }
}

impl From<RuntimeType> for GenericType {
    fn from(value: RuntimeType) -> Self {
        match value {
            RuntimeType::Type(td) => GenericType::Type(td),
            RuntimeType::Array(component) => GenericType::array_of(*component),
        }
    }
}

/// Type-variable bindings accumulated over a type hierarchy. The first binding
/// recorded for a variable is kept.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Substitutions {
    bindings: HashMap<TypeVariable, GenericType>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, variable: &TypeVariable) -> Option<&GenericType> {
        self.bindings.get(variable)
    }

    /// Records `variable := ty` unless the variable is already bound.
    /// Returns whether the binding was inserted.
    pub fn bind(&mut self, variable: TypeVariable, ty: GenericType) -> bool {
        use std::collections::hash_map::Entry;
        match self.bindings.entry(variable) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ty);
                true
            }
        }
    }

    /// Follows variable-to-variable bindings until reaching a non-variable type or an
    /// unbound variable.
    pub fn follow_chain(&self, variable: &TypeVariable) -> GenericType {
        let mut current = variable.clone();
        loop {
            match self.bindings.get(&current) {
                Some(GenericType::Variable(next)) => current = next.clone(),
                Some(resolved) => return resolved.clone(),
                None => return GenericType::Variable(current),
            }
        }
    }
}

pub struct GenericResolver<'a> {
    universe: &'a TypeUniverse,
}

impl<'a> GenericResolver<'a> {
    pub fn new(universe: &'a TypeUniverse) -> Self {
        Self { universe }
    }

    /// Accumulates how every ancestor's generic parameters are bound when viewed from
    /// `ty`. The walk is depth-first: interfaces, then the superclass, then (for inner
    /// types) the enclosing type.
    pub fn resolve_substitutions(&self, ty: TypeDescription) -> Substitutions {
        let mut substitutions = Substitutions::new();
        self.accumulate(ty, &mut substitutions);
        substitutions
    }

    fn accumulate(&self, ty: TypeDescription, substitutions: &mut Substitutions) {
        let definition = self.universe.definition(ty);
        for interface in &definition.interfaces {
            self.accumulate_supertype(interface, substitutions);
        }
        if let Some(superclass) = &definition.superclass {
            self.accumulate_supertype(superclass, substitutions);
        }
        if let Some(enclosing) = definition.enclosing {
            if !definition.is_static_nested {
                self.accumulate(enclosing, substitutions);
            }
        }
    }

    fn accumulate_supertype(&self, supertype: &GenericType, substitutions: &mut Substitutions) {
        match supertype {
            GenericType::Parameterized { raw, arguments } => {
                for (index, argument) in arguments.iter().enumerate() {
                    substitutions.bind(TypeVariable { owner: *raw, index }, argument.clone());
                }
                self.accumulate(*raw, substitutions);
            }
            GenericType::Type(raw) => self.accumulate(*raw, substitutions),
            _ => {}
        }
    }

    pub fn erase(&self, ty: &GenericType, substitutions: &Substitutions) -> RuntimeType {
        match ty {
            GenericType::Type(td) => RuntimeType::Type(*td),
            GenericType::Variable(variable) => match substitutions.follow_chain(variable) {
                GenericType::Variable(unresolved) => {
                    self.erase_to_bound(&unresolved, substitutions)
                }
                resolved => self.erase(&resolved, substitutions),
            },
            GenericType::Parameterized { raw, .. } => RuntimeType::Type(*raw),
            GenericType::Array(component) => {
                RuntimeType::array_of(self.erase(component, substitutions))
            }
            GenericType::Wildcard { upper_bounds, .. } => match upper_bounds.first() {
                Some(bound) => self.erase(bound, substitutions),
                None => Builtin::Object.into(),
            },
        }
    }

    fn erase_to_bound(
        &self,
        variable: &TypeVariable,
        substitutions: &Substitutions,
    ) -> RuntimeType {
        let bound = self
            .universe
            .definition(variable.owner)
            .generic_parameters
            .get(variable.index)
            .and_then(|parameter| parameter.bounds.first());
        match bound {
            Some(bound) => self.erase(bound, substitutions),
            None => Builtin::Object.into(),
        }
    }

    /// Erases every type in `types` against the substitutions of `context`.
    pub fn erase_all(&self, context: TypeDescription, types: &[GenericType]) -> Vec<RuntimeType> {
        if types.iter().all(GenericType::is_concrete) {
            return types.iter().map(|t| self.erase(t, &Substitutions::new())).collect();
        }
        let substitutions = self.resolve_substitutions(context);
        types.iter().map(|t| self.erase(t, &substitutions)).collect()
    }
}
