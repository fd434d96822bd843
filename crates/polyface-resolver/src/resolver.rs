use crate::{
    error::{ResolutionError, TagKind},
    model::{CandidateMethod, FacadeOperation, OperationBinding, ResolutionModel},
};
use polyface_types::{
    comparer::TypeComparer,
    generics::{GenericResolver, GenericType, Substitutions},
    members::{MethodDefinition, MethodDescription, DEFAULT_PRIORITY},
    runtime::RuntimeType,
    Builtin, TypeDescription, TypeUniverse,
};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, trace};

/// Builds [`ResolutionModel`]s for facade types over a shared [`TypeUniverse`].
#[derive(Clone, Debug)]
pub struct StaticResolver {
    universe: Arc<TypeUniverse>,
}

impl StaticResolver {
    pub fn new(universe: Arc<TypeUniverse>) -> Self {
        Self { universe }
    }

    pub fn universe(&self) -> &Arc<TypeUniverse> {
        &self.universe
    }

    pub fn resolve(
        &self,
        facade: TypeDescription,
        providers: &[TypeDescription],
    ) -> Result<ResolutionModel, ResolutionError> {
        let universe = self.universe.as_ref();
        if let Some(unknown) = std::iter::once(&facade)
            .chain(providers)
            .find(|ty| !universe.contains(**ty))
        {
            return Err(ResolutionError::UnknownType {
                index: unknown.index(),
            });
        }
        let operations = self.facade_operations(facade);

        let mut seen = HashSet::new();
        let scans: Vec<ProviderScan<'_>> = providers
            .iter()
            .copied()
            .filter(|p| seen.insert(*p))
            .filter(|p| {
                let compatible = self.is_compatible_provider(facade, *p);
                if !compatible {
                    trace!(
                        provider = %universe.type_name(*p),
                        facade = %universe.type_name(facade),
                        "provider is not compatible with facade"
                    );
                }
                compatible
            })
            .map(|p| ProviderScan::new(universe, p))
            .collect();

        let mut bindings = Vec::with_capacity(operations.len());
        for operation in operations {
            let mut candidates = vec![];
            for scan in &scans {
                for &method in scan.methods() {
                    if let Some(candidate) = scan.candidate_for(&operation, method)? {
                        trace!(
                            operation = %operation.signature,
                            candidate = %universe.method_name(method),
                            priority = candidate.priority,
                            "accepted candidate"
                        );
                        candidates.push(Arc::new(candidate));
                    }
                }
            }
            debug!(
                operation = %operation.signature,
                candidates = candidates.len(),
                "bound facade operation"
            );
            bindings.push(OperationBinding {
                operation,
                candidates,
            });
        }

        let model = ResolutionModel::new(self.universe.clone(), facade, bindings);
        debug!(?model, "built resolution model");
        Ok(model)
    }

    /// Public, non-static operations of `facade`, excluding those of the universal base type.
    pub fn facade_operations(&self, facade: TypeDescription) -> Vec<FacadeOperation> {
        let universe = self.universe.as_ref();
        let resolver = GenericResolver::new(universe);
        let substitutions = resolver.resolve_substitutions(facade);
        universe
            .public_methods(facade, true)
            .into_iter()
            .filter(|m| m.parent != Builtin::Object.ty())
            .filter(|m| !universe.method(*m).is_static)
            .map(|method| {
                let definition = universe.method(method);
                let parameter_types: Box<[RuntimeType]> = definition
                    .parameters
                    .iter()
                    .map(|p| resolver.erase(p, &substitutions))
                    .collect();
                let signature = format!(
                    "{}({})",
                    definition.name,
                    parameter_types
                        .iter()
                        .map(|p| p.get_name(universe))
                        .collect::<Vec<_>>()
                        .join(",")
                );
                FacadeOperation {
                    method,
                    name: definition.name.clone(),
                    return_type: resolver.erase(&definition.return_type, &substitutions),
                    parameter_types,
                    refered: definition.tags.refered.clone(),
                    signature,
                }
            })
            .collect()
    }

    /// A provider serves a facade when it is a subtype of it, or when it (or an ancestor)
    /// declares the facade, or a descendant of it, in `implements_facades`.
    pub fn is_compatible_provider(
        &self,
        facade: TypeDescription,
        provider: TypeDescription,
    ) -> bool {
        let universe = self.universe.as_ref();
        if universe.is_a(provider, facade) {
            return true;
        }
        std::iter::once(provider)
            .chain(universe.ancestors(provider).iter().copied())
            .flat_map(|ty| universe.definition(ty).implements_facades.iter())
            .any(|declared| universe.is_a(*declared, facade))
    }
}

/// The callable public methods of one provider, with its generic substitutions.
pub(crate) struct ProviderScan<'u> {
    universe: &'u TypeUniverse,
    provider: TypeDescription,
    resolver: GenericResolver<'u>,
    substitutions: Substitutions,
    methods: Vec<MethodDescription>,
}

impl<'u> ProviderScan<'u> {
    fn new(universe: &'u TypeUniverse, provider: TypeDescription) -> Self {
        let resolver = GenericResolver::new(universe);
        let substitutions = resolver.resolve_substitutions(provider);
        let methods = universe
            .public_methods(provider, false)
            .into_iter()
            .filter(|m| m.parent != Builtin::Object.ty())
            .collect();
        Self {
            universe,
            provider,
            resolver,
            substitutions,
            methods,
        }
    }

    pub(crate) fn universe(&self) -> &'u TypeUniverse {
        self.universe
    }

    pub(crate) fn methods(&self) -> &[MethodDescription] {
        &self.methods
    }

    pub(crate) fn provider_name(&self) -> String {
        self.universe.type_name(self.provider)
    }

    pub(crate) fn erase(&self, ty: &GenericType) -> RuntimeType {
        self.resolver.erase(ty, &self.substitutions)
    }

    /// Argument positions of `method`, checked against the arity of `operation`.
    pub(crate) fn param_index(
        &self,
        method: MethodDescription,
        operation: &FacadeOperation,
    ) -> Result<Box<[usize]>, ResolutionError> {
        let positions = self.universe.method(method).argument_positions();
        for (position, &index) in positions.iter().enumerate() {
            if index >= operation.arity() {
                return Err(ResolutionError::ParamIndexOutOfBounds {
                    method: self.universe.method_name(method),
                    operation: operation.signature.clone(),
                    position,
                    index,
                    arity: operation.arity(),
                });
            }
        }
        Ok(positions.into())
    }

    fn is_overriding_match(
        &self,
        operation: &FacadeOperation,
        definition: &MethodDefinition,
        parameters: &[RuntimeType],
        return_type: &RuntimeType,
    ) -> bool {
        let comparer = TypeComparer::new(self.universe);
        definition.name == operation.name
            && parameters == &*operation.parameter_types
            && comparer.is_assignable(&operation.return_type, return_type)
    }

    fn is_invoke_feasible(
        &self,
        operation: &FacadeOperation,
        definition: &MethodDefinition,
        parameters: &[RuntimeType],
        return_type: &RuntimeType,
    ) -> bool {
        let comparer = TypeComparer::new(self.universe);
        if !comparer.is_boxed_assignable(&operation.return_type, return_type)
            || parameters.len() > operation.arity()
        {
            return false;
        }
        definition
            .argument_positions()
            .into_iter()
            .zip(parameters)
            .all(|(index, parameter)| match operation.parameter_types.get(index) {
                Some(target) => {
                    comparer.is_boxed_assignable(parameter, target)
                        || comparer.is_boxed_assignable(target, parameter)
                }
                None => false,
            })
    }

    /// Decides whether `method` serves `operation` and, if so, builds its candidate.
    pub(crate) fn candidate_for(
        &self,
        operation: &FacadeOperation,
        method: MethodDescription,
    ) -> Result<Option<CandidateMethod>, ResolutionError> {
        let definition = self.universe.method(method);
        let Some(callable) = definition.callable.clone() else {
            return Ok(None);
        };
        let parameters: Vec<RuntimeType> =
            definition.parameters.iter().map(|p| self.erase(p)).collect();
        let return_type = self.erase(&definition.return_type);

        let accepted = match definition.tags.implement.as_deref() {
            None | Some("") => {
                self.is_overriding_match(operation, definition, &parameters, &return_type)
            }
            Some(value)
                if value == operation.signature || Some(value) == operation.refered.as_deref() =>
            {
                self.param_index(method, operation)?;
                if !self.is_invoke_feasible(operation, definition, &parameters, &return_type) {
                    return Err(ResolutionError::Infeasible {
                        method: self.universe.method_name(method),
                        operation: operation.signature.clone(),
                    });
                }
                true
            }
            Some(value) if value == operation.name => {
                self.is_invoke_feasible(operation, definition, &parameters, &return_type)
            }
            Some(_) => false,
        };
        if !accepted {
            return Ok(None);
        }

        let param_index = self.param_index(method, operation)?;
        let generic_parameter_types = if method.parent != self.provider
            && !definition.parameters.iter().all(GenericType::is_concrete)
        {
            Some(definition.parameters.clone().into_boxed_slice())
        } else {
            None
        };
        let validity = match &definition.tags.validity {
            Some(reference) => Some(self.descriptor(TagKind::Validity, reference, operation)?),
            None => None,
        };
        let (priority, priority_descriptor) = match &definition.tags.priority {
            Some(tag) => (
                tag.value,
                match &tag.method {
                    Some(reference) => {
                        Some(self.descriptor(TagKind::Priority, reference, operation)?)
                    }
                    None => None,
                },
            ),
            None => (DEFAULT_PRIORITY, None),
        };

        Ok(Some(CandidateMethod {
            provider: self.provider,
            method,
            callable,
            parameter_types: parameters.into_boxed_slice(),
            generic_parameter_types,
            param_index,
            validity,
            priority,
            priority_descriptor,
        }))
    }
}
