#![allow(dead_code)]

use polyface::{
    engine::{CachedDispatcher, DirectDispatcher, Dispatcher, InstanceRegistry, InstanceSource},
    resolver::{ResolutionModel, StaticResolver},
    types::{
        error::InvocationError,
        members::{MethodDefinition, MethodDescription},
        value::{argument, Value},
        Builtin, TypeDescription, TypeUniverseBuilder,
    },
};
use std::sync::Arc;

pub const FACADE_NAMESPACE: &str = "acme.api";

/// Declares `acme.api.Calculator`:
///
/// - `handle(core.Number,core.Number) -> core.Object`
/// - `combine(core.String,core.Integer) -> core.String`
pub fn calculator(builder: &mut TypeUniverseBuilder) -> TypeDescription {
    let mut facade = builder.interface(FACADE_NAMESPACE, "Calculator");
    facade
        .method(
            MethodDefinition::new("handle")
                .param(Builtin::Number)
                .param(Builtin::Number)
                .returns(Builtin::Object),
        )
        .method(
            MethodDefinition::new("combine")
                .param(Builtin::String)
                .param(Builtin::Integer)
                .returns(Builtin::String),
        );
    facade.finish()
}

/// A `handle` implementation tagged by simple name whose body answers `label`.
pub fn handle(label: &str, params: [Builtin; 2]) -> MethodDefinition {
    let label = label.to_string();
    MethodDefinition::new("handle")
        .implement("handle")
        .param(params[0])
        .param(params[1])
        .returns(Builtin::Object)
        .body(move |_, _| Ok(Value::string(&label)))
}

/// `name(core.Integer) -> boolean`, true when the argument is positive.
pub fn positive_check(name: &str) -> MethodDefinition {
    MethodDefinition::new(name)
        .param(Builtin::Integer)
        .returns(Builtin::PrimitiveBoolean)
        .body(|_, args| {
            let value = argument(args, 0, 1)?;
            let n = value
                .as_i64()
                .ok_or_else(|| InvocationError::failed("expected an integer"))?;
            Ok(Value::Boolean(n > 0))
        })
}

/// Declares a provider class implementing `facade` with the given methods.
pub fn provider(
    builder: &mut TypeUniverseBuilder,
    facade: TypeDescription,
    namespace: &str,
    name: &str,
    methods: Vec<MethodDefinition>,
) -> TypeDescription {
    let mut provider = builder.class(namespace, name);
    provider.implements(facade);
    for method in methods {
        provider.method(method);
    }
    provider.finish()
}

pub struct Scenario {
    pub model: Arc<ResolutionModel>,
    pub providers: Vec<TypeDescription>,
}

impl Scenario {
    /// Builds the universe and resolves `acme.api.Calculator` over every provider
    /// `declare` returns.
    pub fn new(
        declare: impl FnOnce(&mut TypeUniverseBuilder, TypeDescription) -> Vec<TypeDescription>,
    ) -> Self {
        let mut builder = TypeUniverseBuilder::new();
        let facade = calculator(&mut builder);
        let providers = declare(&mut builder, facade);
        let universe = builder.build().unwrap();
        let model = StaticResolver::new(universe)
            .resolve(facade, &providers)
            .unwrap();
        Self {
            model: Arc::new(model),
            providers,
        }
    }

    pub fn operation(&self, name: &str, arity: usize) -> MethodDescription {
        self.model.find_operation(name, arity).unwrap()
    }

    /// One unit instance per provider.
    pub fn registry(&self) -> InstanceRegistry {
        let registry = InstanceRegistry::new();
        for provider in &self.providers {
            registry.register(*provider, Value::object(*provider, ()));
        }
        registry
    }

    /// Label answered by the candidate `engine` picks for `handle(args)`.
    pub fn handled_by(
        &self,
        engine: &dyn Dispatcher,
        args: &[Value],
        source: &dyn InstanceSource,
    ) -> Option<String> {
        engine
            .dispatch(&self.model, self.operation("handle", 2), args, source)
            .unwrap()
            .map(|decision| decision.invoke().unwrap().as_str().unwrap().to_string())
    }
}

pub fn engines() -> Vec<(&'static str, Arc<dyn Dispatcher>)> {
    vec![
        ("direct", Arc::new(DirectDispatcher::new())),
        ("cached", Arc::new(CachedDispatcher::new())),
    ]
}

pub fn ints(a: i32, b: i32) -> [Value; 2] {
    [Value::Int(a), Value::Int(b)]
}
