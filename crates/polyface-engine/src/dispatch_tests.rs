use crate::{CachedDispatcher, DirectDispatcher, DispatchError, Dispatcher, InstanceRegistry};
use polyface_resolver::{ResolutionModel, StaticResolver};
use polyface_types::{
    error::InvocationError,
    members::{MethodDefinition, MethodDescription},
    value::Value,
    Builtin, TypeDescription, TypeUniverseBuilder,
};

struct Fixture {
    model: ResolutionModel,
    providers: Vec<TypeDescription>,
    handle: MethodDescription,
}

type Configure = fn(MethodDefinition) -> MethodDefinition;

/// A `vendor` class serving `handle` with the given parameter types. Its handle
/// method returns the class name.
struct Provider {
    name: &'static str,
    params: [Builtin; 2],
    configure: Configure,
    helpers: Vec<MethodDefinition>,
}

impl Provider {
    fn new(name: &'static str, params: [Builtin; 2]) -> Self {
        Self {
            name,
            params,
            configure: plain,
            helpers: vec![],
        }
    }

    fn with(mut self, configure: Configure) -> Self {
        self.configure = configure;
        self
    }

    fn helper(mut self, method: MethodDefinition) -> Self {
        self.helpers.push(method);
        self
    }
}

fn plain(method: MethodDefinition) -> MethodDefinition {
    method
}

fn fixture(providers: Vec<Provider>) -> Fixture {
    let mut builder = TypeUniverseBuilder::new();
    let mut facade = builder.interface("acme.api", "Calculator");
    facade.method(
        MethodDefinition::new("handle")
            .param(Builtin::Number)
            .param(Builtin::Number)
            .returns(Builtin::Object),
    );
    let facade = facade.finish();

    let mut ids = vec![];
    for spec in providers {
        let label = spec.name.to_string();
        let method = MethodDefinition::new("handle")
            .implement("handle")
            .param(spec.params[0])
            .param(spec.params[1])
            .returns(Builtin::Object)
            .body(move |_, _| Ok(Value::string(&label)));
        let mut provider = builder.class("vendor", spec.name);
        provider.implements(facade).method((spec.configure)(method));
        for helper in spec.helpers {
            provider.method(helper);
        }
        ids.push(provider.finish());
    }
    let universe = builder.build().unwrap();
    let model = StaticResolver::new(universe).resolve(facade, &ids).unwrap();
    let handle = model.find_operation("handle", 2).unwrap();
    Fixture {
        model,
        providers: ids,
        handle,
    }
}

fn registry_for(providers: &[TypeDescription]) -> InstanceRegistry {
    let registry = InstanceRegistry::new();
    for provider in providers {
        registry.register(*provider, Value::object(*provider, ()));
    }
    registry
}

fn chosen(
    dispatcher: &dyn Dispatcher,
    fixture: &Fixture,
    registry: &InstanceRegistry,
    args: &[Value],
) -> Option<String> {
    dispatcher
        .dispatch(&fixture.model, fixture.handle, args, registry)
        .unwrap()
        .map(|decision| decision.invoke().unwrap().as_str().unwrap().to_string())
}

#[test]
fn test_cached_short_circuit_and_hits() {
    let fixture = fixture(vec![
        Provider::new("Generic", [Builtin::Number, Builtin::Number]),
        Provider::new("Ints", [Builtin::Integer, Builtin::Integer]),
    ]);
    let registry = registry_for(&fixture.providers);
    let cached = CachedDispatcher::new();
    let args = [Value::Int(1), Value::Int(2)];

    assert_eq!(chosen(&cached, &fixture, &registry, &args).as_deref(), Some("Ints"));
    assert_eq!(
        chosen(&cached, &fixture, &registry, &[Value::Int(7), Value::Int(8)]).as_deref(),
        Some("Ints")
    );
    assert_eq!(
        chosen(&cached, &fixture, &registry, &[Value::Double(1.0), Value::Int(8)]).as_deref(),
        Some("Generic")
    );

    let stats = cached.statistics();
    assert_eq!(stats.ranking_cache.misses, 2);
    assert_eq!(stats.ranking_cache.hits, 1);
    assert_eq!(stats.ranking_cache.size, 2);
    assert_eq!(stats.short_circuit_dispatches, 3);
    assert_eq!(stats.dynamic_dispatches, 0);
}

#[test]
fn test_static_candidate_needs_no_instance() {
    fn make_static(method: MethodDefinition) -> MethodDefinition {
        method.static_body(|args| Ok(Value::Int(args.len() as i32)))
    }
    let fixture = fixture(vec![
        Provider::new("Static", [Builtin::Number, Builtin::Number]).with(make_static),
    ]);
    let empty = InstanceRegistry::new();
    let args = [Value::Int(1), Value::Int(2)];

    let engines: [&dyn Dispatcher; 2] = [&DirectDispatcher::new(), &CachedDispatcher::new()];
    for engine in engines {
        let decision = engine
            .dispatch(&fixture.model, fixture.handle, &args, &empty)
            .unwrap()
            .unwrap();
        assert!(decision.instance().is_none());
        assert!(decision.invoke().unwrap().same(&Value::Int(2)));
    }
}

#[test]
fn test_dynamic_priority_outranks_static_order() {
    fn weighted(method: MethodDefinition) -> MethodDefinition {
        method.priority_method("weight")
    }
    let fixture = fixture(vec![
        Provider::new("Ints", [Builtin::Integer, Builtin::Integer]),
        Provider::new("Weighted", [Builtin::Number, Builtin::Number])
            .with(weighted)
            .helper(
                MethodDefinition::new("weight")
                    .returns(Builtin::PrimitiveInt)
                    .body(|_, _| Ok(Value::Long(10))),
            ),
    ]);
    let registry = registry_for(&fixture.providers);
    let args = [Value::Int(1), Value::Int(2)];

    let cached = CachedDispatcher::new();
    let direct = DirectDispatcher::new();
    assert_eq!(chosen(&cached, &fixture, &registry, &args).as_deref(), Some("Weighted"));
    assert_eq!(chosen(&direct, &fixture, &registry, &args).as_deref(), Some("Weighted"));
    assert_eq!(cached.statistics().dynamic_dispatches, 1);
    assert_eq!(cached.statistics().priority_evaluations, 1);
}

#[test]
fn test_non_numeric_priority_is_an_error() {
    fn weighted(method: MethodDefinition) -> MethodDefinition {
        method.priority_method("weight")
    }
    let fixture = fixture(vec![
        Provider::new("Weird", [Builtin::Number, Builtin::Number])
            .with(weighted)
            .helper(
                MethodDefinition::new("weight")
                    .refered("weight")
                    .returns(Builtin::Object)
                    .body(|_, _| Ok(Value::string("high"))),
            ),
    ]);
    let registry = registry_for(&fixture.providers);
    let args = [Value::Int(1), Value::Int(2)];
    let err = DirectDispatcher::new()
        .dispatch(&fixture.model, fixture.handle, &args, &registry)
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::InvalidPriority {
            method: "vendor.Weird::weight".into(),
            value: "String(\"high\")".into(),
        }
    );
}

#[test]
fn test_validity_failure_propagates_untouched() {
    fn guarded(method: MethodDefinition) -> MethodDefinition {
        method.validity("check")
    }
    let fixture = fixture(vec![
        Provider::new("Failing", [Builtin::Number, Builtin::Number])
            .with(guarded)
            .helper(
                MethodDefinition::new("check")
                    .returns(Builtin::PrimitiveBoolean)
                    .body(|_, _| Err(InvocationError::failed("boom"))),
            ),
    ]);
    let registry = registry_for(&fixture.providers);
    let args = [Value::Int(1), Value::Int(2)];
    let engines: [&dyn Dispatcher; 2] = [&DirectDispatcher::new(), &CachedDispatcher::new()];
    for engine in engines {
        let err = engine
            .dispatch(&fixture.model, fixture.handle, &args, &registry)
            .unwrap_err();
        assert_eq!(err, DispatchError::Invocation(InvocationError::failed("boom")));
    }
}

#[test]
fn test_non_boolean_validity_rejects() {
    fn guarded(method: MethodDefinition) -> MethodDefinition {
        method.validity("check")
    }
    let fixture = fixture(vec![
        Provider::new("Sloppy", [Builtin::Number, Builtin::Number])
            .with(guarded)
            .helper(
                MethodDefinition::new("check")
                    .returns(Builtin::Boolean)
                    .body(|_, _| Ok(Value::Null)),
            ),
    ]);
    let registry = registry_for(&fixture.providers);
    let direct = DirectDispatcher::new();
    assert_eq!(
        chosen(&direct, &fixture, &registry, &[Value::Int(1), Value::Int(2)]),
        None
    );
    let stats = direct.statistics();
    assert_eq!(stats.validity_evaluations, 1);
    assert_eq!(stats.unresolved_dispatches, 1);
}

#[test]
fn test_operation_outside_model_is_unresolved() {
    let fixture = fixture(vec![Provider::new(
        "Generic",
        [Builtin::Number, Builtin::Number],
    )]);
    let registry = registry_for(&fixture.providers);
    let foreign = MethodDescription::new(Builtin::Object.ty(), 0);
    let engines: [&dyn Dispatcher; 2] = [&DirectDispatcher::new(), &CachedDispatcher::new()];
    for engine in engines {
        let decision = engine
            .dispatch(&fixture.model, foreign, &[], &registry)
            .unwrap();
        assert!(decision.is_none());
    }
}

#[test]
fn test_every_instance_is_evaluated() {
    fn guarded(method: MethodDefinition) -> MethodDefinition {
        method.validity("accepts")
    }
    // only the instance carrying `true` passes its own validity check
    let fixture = fixture(vec![
        Provider::new("PerInstance", [Builtin::Number, Builtin::Number])
            .with(guarded)
            .helper(
                MethodDefinition::new("accepts")
                    .returns(Builtin::PrimitiveBoolean)
                    .body(|receiver, _| {
                        let flag = receiver
                            .as_object()
                            .and_then(|o| o.downcast_ref::<bool>())
                            .copied()
                            .unwrap_or(false);
                        Ok(Value::Boolean(flag))
                    }),
            ),
    ]);
    let provider = fixture.providers[0];
    let registry = InstanceRegistry::new();
    registry.register(provider, Value::object(provider, false));
    let accepted = Value::object(provider, true);
    registry.register(provider, accepted.clone());
    registry.register(provider, Value::object(provider, false));

    let args = [Value::Int(1), Value::Int(2)];
    let engines: [&dyn Dispatcher; 2] = [&DirectDispatcher::new(), &CachedDispatcher::new()];
    for engine in engines {
        let decision = engine
            .dispatch(&fixture.model, fixture.handle, &args, &registry)
            .unwrap()
            .unwrap();
        assert!(decision.instance().unwrap().same(&accepted));
    }
}

#[test]
fn test_equal_fixed_and_dynamic_priority_keep_binding_order() {
    fn fixed(method: MethodDefinition) -> MethodDefinition {
        method.priority(3)
    }
    fn weighted(method: MethodDefinition) -> MethodDefinition {
        method.priority_method("weight")
    }
    let weight = || {
        MethodDefinition::new("weight")
            .returns(Builtin::PrimitiveInt)
            .body(|_, _| Ok(Value::Int(3)))
    };
    for reversed in [false, true] {
        let first = Provider::new("Fixed", [Builtin::Number, Builtin::Number]).with(fixed);
        let second = Provider::new("Weighted", [Builtin::Number, Builtin::Number])
            .with(weighted)
            .helper(weight());
        let (providers, expected) = if reversed {
            (vec![second, first], "Fixed")
        } else {
            (vec![first, second], "Weighted")
        };
        let fixture = fixture(providers);
        let registry = registry_for(&fixture.providers);
        let args = [Value::Int(1), Value::Int(2)];

        let engines: [&dyn Dispatcher; 2] = [&DirectDispatcher::new(), &CachedDispatcher::new()];
        for engine in engines {
            assert_eq!(
                chosen(engine, &fixture, &registry, &args).as_deref(),
                Some(expected),
                "reversed: {reversed}"
            );
        }
    }
}
