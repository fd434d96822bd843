use parking_lot::RwLock;
use polyface_types::{value::Value, TypeDescription};
use std::collections::HashMap;

/// Supplies provider instances to the dispatch engines.
///
/// `None` and an empty vector both mean "no instance available".
pub trait InstanceSource: Send + Sync {
    fn instances(&self, provider: TypeDescription) -> Option<Vec<Value>>;
}

impl<F> InstanceSource for F
where
    F: Fn(TypeDescription) -> Option<Vec<Value>> + Send + Sync,
{
    fn instances(&self, provider: TypeDescription) -> Option<Vec<Value>> {
        self(provider)
    }
}

/// Keyed multi-map of provider instances, in registration order.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: RwLock<HashMap<TypeDescription, Vec<Value>>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, provider: TypeDescription, instance: Value) {
        self.instances
            .write()
            .entry(provider)
            .or_default()
            .push(instance);
    }

    /// Drops every instance registered for `provider`, returning them.
    pub fn unregister_all(&self, provider: TypeDescription) -> Vec<Value> {
        self.instances.write().remove(&provider).unwrap_or_default()
    }

    /// Total number of registered instances.
    pub fn len(&self) -> usize {
        self.instances.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InstanceSource for InstanceRegistry {
    fn instances(&self, provider: TypeDescription) -> Option<Vec<Value>> {
        self.instances.read().get(&provider).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyface_types::Builtin;

    #[test]
    fn test_registry_multimap() {
        let registry = InstanceRegistry::new();
        let provider = Builtin::Object.ty();
        assert!(registry.is_empty());
        assert!(registry.instances(provider).is_none());

        registry.register(provider, Value::Int(1));
        registry.register(provider, Value::Int(2));
        registry.register(Builtin::String.ty(), Value::string("s"));
        assert_eq!(registry.len(), 3);

        let found = registry.instances(provider).unwrap();
        assert!(found[0].same(&Value::Int(1)));
        assert!(found[1].same(&Value::Int(2)));

        assert_eq!(registry.unregister_all(provider).len(), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister_all(provider).is_empty());
    }

    #[test]
    fn test_closure_source() {
        let target = Builtin::Number.ty();
        let source = move |ty: TypeDescription| (ty == target).then(|| vec![Value::Int(5)]);
        assert_eq!(source.instances(target).map(|v| v.len()), Some(1));
        assert!(source.instances(Builtin::String.ty()).is_none());
    }
}
