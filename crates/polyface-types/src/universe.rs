use crate::{
    error::TypeError,
    generics::{GenericParameter, GenericResolver, GenericType, TypeVariable},
    members::{MethodDefinition, MethodDescription},
    runtime::RuntimeType,
    value::Value,
    Builtin, TypeDescription, TypeKind,
};
use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    sync::Arc,
};

#[derive(Clone, Debug)]
pub struct TypeDefinition {
    pub namespace: String,
    pub name: String,
    pub kind: TypeKind,
    pub generic_parameters: Vec<GenericParameter>,
    pub superclass: Option<GenericType>,
    pub interfaces: Vec<GenericType>,
    pub enclosing: Option<TypeDescription>,
    pub is_static_nested: bool,
    /// Facade types this provider declares it serves, independent of its supertypes.
    pub implements_facades: Vec<TypeDescription>,
    pub methods: Vec<MethodDefinition>,
}

impl TypeDefinition {
    fn new(namespace: &str, name: &str, kind: TypeKind) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind,
            generic_parameters: vec![],
            superclass: None,
            interfaces: vec![],
            enclosing: None,
            is_static_nested: false,
            implements_facades: vec![],
            methods: vec![],
        }
    }

    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn is_abstract(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Interface | TypeKind::Class { is_abstract: true }
        )
    }
}

/// Immutable registry of every type the engine can reason about.
pub struct TypeUniverse {
    types: Vec<TypeDefinition>,
    by_name: HashMap<String, TypeDescription>,
    /// Strict ancestors of each type, through superclasses and interfaces.
    ancestors: Vec<HashSet<TypeDescription>>,
}

impl Debug for TypeUniverse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeUniverse")
            .field("types", &self.types.len())
            .finish()
    }
}

impl TypeUniverse {
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `ty` was registered by the builder that produced this universe.
    pub fn contains(&self, ty: TypeDescription) -> bool {
        ty.index() < self.types.len()
    }

    /// # Panics
    ///
    /// When `ty` is not [contained](Self::contains) in this universe.
    pub fn definition(&self, ty: TypeDescription) -> &TypeDefinition {
        &self.types[ty.index()]
    }

    /// # Panics
    ///
    /// When `method` was not declared on a type of this universe.
    pub fn method(&self, method: MethodDescription) -> &MethodDefinition {
        &self.definition(method.parent).methods[method.index as usize]
    }

    pub fn find(&self, qualified_name: &str) -> Result<TypeDescription, TypeError> {
        self.by_name
            .get(qualified_name)
            .copied()
            .ok_or_else(|| TypeError::TypeNotFound(qualified_name.to_string()))
    }

    pub fn type_name(&self, ty: TypeDescription) -> String {
        self.definition(ty).qualified_name()
    }

    pub fn method_name(&self, method: MethodDescription) -> String {
        format!(
            "{}::{}",
            self.type_name(method.parent),
            self.method(method).name
        )
    }

    /// The superclass as written, or the implicit `core.Object` for classes without one.
    pub fn superclass(&self, ty: TypeDescription) -> Option<TypeDescription> {
        let definition = self.definition(ty);
        match &definition.superclass {
            Some(superclass) => superclass.raw_type(),
            None if definition.kind.is_class() && ty != Builtin::Object.ty() => {
                Some(Builtin::Object.ty())
            }
            None => None,
        }
    }

    pub fn interfaces(&self, ty: TypeDescription) -> impl Iterator<Item = TypeDescription> + '_ {
        self.definition(ty)
            .interfaces
            .iter()
            .filter_map(GenericType::raw_type)
    }

    /// Reflexive: every type is a `ty` of itself.
    pub fn is_a(&self, child: TypeDescription, parent: TypeDescription) -> bool {
        child == parent || self.ancestors[child.index()].contains(&parent)
    }

    pub fn ancestors(&self, ty: TypeDescription) -> &HashSet<TypeDescription> {
        &self.ancestors[ty.index()]
    }

    pub fn declared_methods(
        &self,
        ty: TypeDescription,
    ) -> impl Iterator<Item = MethodDescription> + '_ {
        (0..self.definition(ty).methods.len()).map(move |index| MethodDescription::new(ty, index))
    }

    /// Public methods of `ty`: its own, then its superclass chain's, then its interfaces',
    /// keeping the most specific declaration for each name and erased parameter list.
    /// Abstract methods are only listed when `include_abstract` is set, but still shadow
    /// inherited declarations with the same erased signature.
    pub fn public_methods(
        &self,
        ty: TypeDescription,
        include_abstract: bool,
    ) -> Vec<MethodDescription> {
        let resolver = GenericResolver::new(self);
        let substitutions = resolver.resolve_substitutions(ty);
        let mut walk = MethodWalk {
            resolver,
            substitutions,
            include_abstract,
            seen_signatures: HashSet::new(),
            visited: HashSet::new(),
            out: vec![],
        };
        self.collect_public_methods(ty, &mut walk);
        walk.out
    }

    fn collect_public_methods(&self, ty: TypeDescription, walk: &mut MethodWalk<'_>) {
        if !walk.visited.insert(ty) {
            return;
        }
        for method in self.declared_methods(ty) {
            let definition = self.method(method);
            if !definition.is_public() {
                continue;
            }
            let erased: Vec<RuntimeType> = definition
                .parameters
                .iter()
                .map(|p| walk.resolver.erase(p, &walk.substitutions))
                .collect();
            if !walk.seen_signatures.insert((definition.name.clone(), erased)) {
                continue;
            }
            if definition.is_abstract() && !walk.include_abstract {
                continue;
            }
            walk.out.push(method);
        }
        if let Some(superclass) = self.superclass(ty) {
            self.collect_public_methods(superclass, walk);
        }
        let interfaces: Vec<_> = self.interfaces(ty).collect();
        for interface in interfaces {
            self.collect_public_methods(interface, walk);
        }
        // interfaces still expose the universal base type's operations
        if self.definition(ty).kind.is_interface() {
            self.collect_public_methods(Builtin::Object.ty(), walk);
        }
    }
}

struct MethodWalk<'a> {
    resolver: GenericResolver<'a>,
    substitutions: crate::generics::Substitutions,
    include_abstract: bool,
    seen_signatures: HashSet<(String, Vec<RuntimeType>)>,
    visited: HashSet<TypeDescription>,
    out: Vec<MethodDescription>,
}

pub struct TypeUniverseBuilder {
    types: Vec<TypeDefinition>,
}

impl Default for TypeUniverseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeUniverseBuilder {
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(Builtin::ALL.len());
        for builtin in Builtin::ALL {
            let kind = match builtin.primitive_kind() {
                Some(kind) => TypeKind::Primitive(kind),
                None => TypeKind::Class {
                    is_abstract: builtin.is_abstract(),
                },
            };
            let mut definition = TypeDefinition::new(builtin.namespace(), builtin.name(), kind);
            definition.superclass = builtin.superclass().map(GenericType::from);
            types.push(definition);
        }
        types[Builtin::Object.ty().index()].methods = object_methods();
        Self { types }
    }

    fn push(&mut self, namespace: &str, name: &str, kind: TypeKind) -> TypeBuilder<'_> {
        let ty = TypeDescription::from_index(self.types.len());
        self.types.push(TypeDefinition::new(namespace, name, kind));
        TypeBuilder { builder: self, ty }
    }

    pub fn class(&mut self, namespace: &str, name: &str) -> TypeBuilder<'_> {
        self.push(namespace, name, TypeKind::Class { is_abstract: false })
    }

    pub fn abstract_class(&mut self, namespace: &str, name: &str) -> TypeBuilder<'_> {
        self.push(namespace, name, TypeKind::Class { is_abstract: true })
    }

    pub fn interface(&mut self, namespace: &str, name: &str) -> TypeBuilder<'_> {
        self.push(namespace, name, TypeKind::Interface)
    }

    /// Reopens an already declared type, e.g. to add members referring to a type
    /// declared after it.
    pub fn reopen(&mut self, ty: TypeDescription) -> TypeBuilder<'_> {
        TypeBuilder { builder: self, ty }
    }

    pub fn build(self) -> Result<Arc<TypeUniverse>, TypeError> {
        let mut by_name = HashMap::with_capacity(self.types.len());
        for (index, definition) in self.types.iter().enumerate() {
            let qualified = definition.qualified_name();
            if by_name
                .insert(qualified.clone(), TypeDescription::from_index(index))
                .is_some()
            {
                return Err(TypeError::DuplicateType(qualified));
            }
        }
        for definition in &self.types {
            self.validate(definition)?;
        }
        let ancestors = self.compute_ancestors()?;
        Ok(Arc::new(TypeUniverse {
            types: self.types,
            by_name,
            ancestors,
        }))
    }

    fn definition(&self, ty: TypeDescription) -> Result<&TypeDefinition, TypeError> {
        self.types
            .get(ty.index())
            .ok_or_else(|| TypeError::TypeNotFound(format!("{ty:?}")))
    }

    fn validate(&self, definition: &TypeDefinition) -> Result<(), TypeError> {
        let type_name = definition.qualified_name();
        if let Some(superclass) = &definition.superclass {
            if let Some(raw) = superclass.raw_type() {
                let target = self.definition(raw)?;
                if !target.kind.is_class() {
                    return Err(TypeError::InvalidSuperclass {
                        type_name,
                        superclass: target.qualified_name(),
                    });
                }
            }
        }
        for interface in &definition.interfaces {
            if let Some(raw) = interface.raw_type() {
                let target = self.definition(raw)?;
                if !target.kind.is_interface() {
                    return Err(TypeError::InvalidInterface {
                        type_name,
                        interface: target.qualified_name(),
                    });
                }
            }
        }
        if let Some(enclosing) = definition.enclosing {
            self.definition(enclosing)?;
        }
        for facade in &definition.implements_facades {
            self.definition(*facade)?;
        }

        let signatures = definition
            .superclass
            .iter()
            .chain(&definition.interfaces)
            .chain(definition.generic_parameters.iter().flat_map(|p| &p.bounds))
            .chain(
                definition
                    .methods
                    .iter()
                    .flat_map(|m| m.parameters.iter().chain(std::iter::once(&m.return_type))),
            );
        for ty in signatures {
            self.check_generic(ty)?;
        }
        Ok(())
    }

    fn check_generic(&self, ty: &GenericType) -> Result<(), TypeError> {
        match ty {
            GenericType::Type(td) => self.definition(*td).map(|_| ()),
            GenericType::Variable(TypeVariable { owner, index }) => {
                let owner = self.definition(*owner)?;
                if *index >= owner.generic_parameters.len() {
                    return Err(TypeError::GenericArity {
                        type_name: owner.qualified_name(),
                        expected: owner.generic_parameters.len(),
                        found: index + 1,
                    });
                }
                Ok(())
            }
            GenericType::Parameterized { raw, arguments } => {
                let definition = self.definition(*raw)?;
                if definition.generic_parameters.len() != arguments.len() {
                    return Err(TypeError::GenericArity {
                        type_name: definition.qualified_name(),
                        expected: definition.generic_parameters.len(),
                        found: arguments.len(),
                    });
                }
                arguments.iter().try_for_each(|a| self.check_generic(a))
            }
            GenericType::Array(component) => self.check_generic(component),
            GenericType::Wildcard {
                upper_bounds,
                lower_bounds,
            } => upper_bounds
                .iter()
                .chain(lower_bounds)
                .try_for_each(|b| self.check_generic(b)),
        }
    }

    fn direct_supertypes(&self, ty: TypeDescription) -> Vec<TypeDescription> {
        let definition = &self.types[ty.index()];
        let mut supertypes: Vec<_> = definition
            .superclass
            .iter()
            .chain(&definition.interfaces)
            .filter_map(GenericType::raw_type)
            .collect();
        if definition.superclass.is_none()
            && definition.kind.is_class()
            && ty != Builtin::Object.ty()
        {
            supertypes.push(Builtin::Object.ty());
        }
        supertypes
    }

    fn compute_ancestors(&self) -> Result<Vec<HashSet<TypeDescription>>, TypeError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            builder: &TypeUniverseBuilder,
            ty: TypeDescription,
            marks: &mut [Mark],
            ancestors: &mut [HashSet<TypeDescription>],
        ) -> Result<(), TypeError> {
            match marks[ty.index()] {
                Mark::Done => return Ok(()),
                Mark::InProgress => {
                    return Err(TypeError::CyclicHierarchy(
                        builder.types[ty.index()].qualified_name(),
                    ))
                }
                Mark::Unvisited => {}
            }
            marks[ty.index()] = Mark::InProgress;
            let mut set = HashSet::new();
            for supertype in builder.direct_supertypes(ty) {
                visit(builder, supertype, marks, ancestors)?;
                set.insert(supertype);
                set.extend(ancestors[supertype.index()].iter().copied());
            }
            ancestors[ty.index()] = set;
            marks[ty.index()] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.types.len()];
        let mut ancestors = vec![HashSet::new(); self.types.len()];
        for index in 0..self.types.len() {
            visit(
                self,
                TypeDescription::from_index(index),
                &mut marks,
                &mut ancestors,
            )?;
        }
        Ok(ancestors)
    }
}

pub struct TypeBuilder<'b> {
    builder: &'b mut TypeUniverseBuilder,
    ty: TypeDescription,
}

impl TypeBuilder<'_> {
    pub fn id(&self) -> TypeDescription {
        self.ty
    }

    fn definition_mut(&mut self) -> &mut TypeDefinition {
        &mut self.builder.types[self.ty.index()]
    }

    /// Declares the next generic parameter and returns it as a type variable.
    pub fn generic_parameter(&mut self, name: &str, bounds: Vec<GenericType>) -> GenericType {
        let owner = self.ty;
        let parameters = &mut self.definition_mut().generic_parameters;
        parameters.push(GenericParameter {
            name: name.to_string(),
            bounds,
        });
        GenericType::Variable(TypeVariable {
            owner,
            index: parameters.len() - 1,
        })
    }

    pub fn extends(&mut self, superclass: impl Into<GenericType>) -> &mut Self {
        self.definition_mut().superclass = Some(superclass.into());
        self
    }

    pub fn implements(&mut self, interface: impl Into<GenericType>) -> &mut Self {
        self.definition_mut().interfaces.push(interface.into());
        self
    }

    pub fn nested_in(&mut self, enclosing: TypeDescription, is_static: bool) -> &mut Self {
        let definition = self.definition_mut();
        definition.enclosing = Some(enclosing);
        definition.is_static_nested = is_static;
        self
    }

    pub fn implements_facade(&mut self, facade: TypeDescription) -> &mut Self {
        self.definition_mut().implements_facades.push(facade);
        self
    }

    pub fn method(&mut self, method: MethodDefinition) -> &mut Self {
        self.definition_mut().methods.push(method);
        self
    }

    /// Handle of the most recently declared method.
    pub fn last_method(&self) -> Option<MethodDescription> {
        let count = self.builder.types[self.ty.index()].methods.len();
        count.checked_sub(1).map(|index| MethodDescription::new(self.ty, index))
    }

    pub fn finish(self) -> TypeDescription {
        self.ty
    }
}

fn object_methods() -> Vec<MethodDefinition> {
    vec![
        MethodDefinition::new("toString")
            .returns(Builtin::String)
            .body(|receiver, _| Ok(Value::string(&format!("{receiver:?}")))),
        MethodDefinition::new("equals")
            .param(Builtin::Object)
            .returns(Builtin::PrimitiveBoolean)
            .body(|receiver, args| {
                let other = crate::value::argument(args, 0, 1)?;
                Ok(Value::Boolean(receiver.same(other)))
            }),
        MethodDefinition::new("hashCode")
            .returns(Builtin::PrimitiveInt)
            .body(|receiver, _| {
                let hash = match receiver {
                    Value::Object(o) => o.identity() as i32,
                    _ => 0,
                };
                Ok(Value::Int(hash))
            }),
    ]
}
