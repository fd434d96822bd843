use crate::{
    error::{ResolutionError, TagKind},
    model::{FacadeOperation, TagDescriptor},
    resolver::ProviderScan,
};
use polyface_types::{
    comparer::TypeComparer, members::MethodDescription, runtime::RuntimeType, Builtin,
    PrimitiveKind,
};

impl TagKind {
    /// Return types a helper referenced by this tag may declare.
    fn accepts_return(self, comparer: &TypeComparer<'_>, ty: &RuntimeType) -> bool {
        match self {
            TagKind::Validity => {
                ty.primitive_kind() == Some(PrimitiveKind::Boolean)
                    || *ty == RuntimeType::from(Builtin::Boolean)
            }
            TagKind::Priority => match ty.primitive_kind() {
                Some(kind) => kind.is_numeric(),
                None => comparer.is_assignable(&Builtin::Number.into(), ty),
            },
        }
    }
}

impl ProviderScan<'_> {
    /// Finds the helper a tag names: a method whose refered tag equals `reference`,
    /// otherwise the single same-named method with an acceptable return type.
    pub(crate) fn resolve_reference(
        &self,
        tag: TagKind,
        reference: &str,
    ) -> Result<MethodDescription, ResolutionError> {
        let by_refered: Vec<_> = self
            .methods()
            .iter()
            .copied()
            .filter(|m| self.universe().method(*m).tags.refered.as_deref() == Some(reference))
            .collect();
        let matches: Vec<MethodDescription> = if by_refered.is_empty() {
            let comparer = TypeComparer::new(self.universe());
            self.methods()
                .iter()
                .copied()
                .filter(|m| {
                    let definition = self.universe().method(*m);
                    definition.name == reference
                        && tag.accepts_return(&comparer, &self.erase(&definition.return_type))
                })
                .collect()
        } else {
            by_refered
        };

        match matches.as_slice() {
            [single] => Ok(*single),
            [] => Err(ResolutionError::MissingReference {
                provider: self.provider_name(),
                tag,
                reference: reference.to_string(),
            }),
            many => Err(ResolutionError::AmbiguousReference {
                provider: self.provider_name(),
                tag,
                reference: reference.to_string(),
                matches: many.len(),
            }),
        }
    }

    /// Resolves a tag reference into an invocable descriptor whose argument mapping is
    /// checked against `operation`.
    pub(crate) fn descriptor(
        &self,
        tag: TagKind,
        reference: &str,
        operation: &FacadeOperation,
    ) -> Result<TagDescriptor, ResolutionError> {
        let method = self.resolve_reference(tag, reference)?;
        let definition = self.universe().method(method);
        let param_index = self.param_index(method, operation)?;
        match &definition.callable {
            Some(callable) => Ok(TagDescriptor {
                method,
                callable: callable.clone(),
                param_index,
            }),
            // provider scans only list callable methods
            None => Err(ResolutionError::MissingReference {
                provider: self.provider_name(),
                tag,
                reference: reference.to_string(),
            }),
        }
    }
}
