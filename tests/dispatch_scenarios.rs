mod common;

use common::{engines, handle, ints, positive_check, provider, Scenario};
use polyface::{
    engine::{CachedDispatcher, Dispatcher, InstanceRegistry},
    types::{members::MethodDefinition, value::Value, Builtin},
};

#[test]
fn test_closer_parameters_win() {
    let scenario = Scenario::new(|builder, facade| {
        let generic = MethodDefinition::new("handle")
            .param(Builtin::Number)
            .param(Builtin::Number)
            .returns(Builtin::Object)
            .body(|_, _| Ok(Value::string("C1")));
        vec![
            provider(builder, facade, "vendor", "GenericCalc", vec![generic]),
            provider(
                builder,
                facade,
                "vendor",
                "IntCalc",
                vec![handle("C2", [Builtin::Integer, Builtin::Integer])],
            ),
        ]
    });
    let registry = scenario.registry();
    for (name, engine) in engines() {
        assert_eq!(
            scenario.handled_by(engine.as_ref(), &ints(1, 2), &registry).as_deref(),
            Some("C2"),
            "{name}"
        );
        assert_eq!(
            scenario
                .handled_by(engine.as_ref(), &[Value::Double(1.5), Value::Int(2)], &registry)
                .as_deref(),
            Some("C1"),
            "{name}"
        );
    }
}

#[test]
fn test_validity_rejection_falls_through() {
    let scenario = Scenario::new(|builder, facade| {
        vec![
            provider(
                builder,
                facade,
                "vendor",
                "PositiveCalc",
                vec![
                    handle("C3", [Builtin::Integer, Builtin::Integer]).validity("positive"),
                    positive_check("positive"),
                ],
            ),
            provider(
                builder,
                facade,
                "vendor",
                "GenericCalc",
                vec![handle("C1", [Builtin::Number, Builtin::Number])],
            ),
        ]
    });
    let registry = scenario.registry();
    for (name, engine) in engines() {
        assert_eq!(
            scenario.handled_by(engine.as_ref(), &ints(-1, 2), &registry).as_deref(),
            Some("C1"),
            "{name}"
        );
        assert_eq!(
            scenario.handled_by(engine.as_ref(), &ints(1, 2), &registry).as_deref(),
            Some("C3"),
            "{name}"
        );
    }
}

#[test]
fn test_maximum_priority_beats_closeness() {
    let scenario = Scenario::new(|builder, facade| {
        vec![
            provider(
                builder,
                facade,
                "vendor",
                "IntCalc",
                vec![handle("C2", [Builtin::Integer, Builtin::Integer])],
            ),
            provider(
                builder,
                facade,
                "vendor",
                "PriorityCalc",
                vec![handle("C4", [Builtin::Number, Builtin::Number]).priority(i32::MAX)],
            ),
            provider(
                builder,
                facade,
                "vendor",
                "PositiveCalc",
                vec![
                    handle("C3", [Builtin::Integer, Builtin::Integer]).validity("positive"),
                    positive_check("positive"),
                ],
            ),
        ]
    });
    let registry = scenario.registry();
    for (name, engine) in engines() {
        assert_eq!(
            scenario.handled_by(engine.as_ref(), &ints(1, 2), &registry).as_deref(),
            Some("C4"),
            "{name}"
        );
    }
}

#[test]
fn test_foreign_namespace_breaks_ties() {
    for reversed in [false, true] {
        let scenario = Scenario::new(|builder, facade| {
            let local = provider(
                builder,
                facade,
                "acme.api.impl",
                "LocalCalc",
                vec![handle("local", [Builtin::Number, Builtin::Number])],
            );
            let remote = provider(
                builder,
                facade,
                "vendor",
                "RemoteCalc",
                vec![handle("remote", [Builtin::Number, Builtin::Number])],
            );
            if reversed {
                vec![remote, local]
            } else {
                vec![local, remote]
            }
        });
        let registry = scenario.registry();
        for (name, engine) in engines() {
            assert_eq!(
                scenario.handled_by(engine.as_ref(), &ints(1, 2), &registry).as_deref(),
                Some("remote"),
                "{name}, reversed: {reversed}"
            );
        }
    }
}

#[test]
fn test_no_instances_is_unresolved() {
    let scenario = Scenario::new(|builder, facade| {
        vec![
            provider(
                builder,
                facade,
                "vendor",
                "IntCalc",
                vec![handle("C2", [Builtin::Integer, Builtin::Integer])],
            ),
            provider(
                builder,
                facade,
                "vendor",
                "GenericCalc",
                vec![handle("C1", [Builtin::Number, Builtin::Number])],
            ),
        ]
    });
    let empty = InstanceRegistry::new();
    for (name, engine) in engines() {
        assert_eq!(scenario.handled_by(engine.as_ref(), &ints(1, 2), &empty), None, "{name}");
        assert_eq!(engine.statistics().unresolved_dispatches, 1, "{name}");
    }
}

#[test]
fn test_missing_instance_skips_to_next_candidate() {
    let scenario = Scenario::new(|builder, facade| {
        vec![
            provider(
                builder,
                facade,
                "vendor",
                "IntCalc",
                vec![handle("C2", [Builtin::Integer, Builtin::Integer])],
            ),
            provider(
                builder,
                facade,
                "vendor",
                "GenericCalc",
                vec![handle("C1", [Builtin::Number, Builtin::Number])],
            ),
        ]
    });
    let registry = InstanceRegistry::new();
    let generic = scenario.providers[1];
    registry.register(generic, Value::object(generic, ()));
    for (name, engine) in engines() {
        assert_eq!(
            scenario.handled_by(engine.as_ref(), &ints(1, 2), &registry).as_deref(),
            Some("C1"),
            "{name}"
        );
    }
}

fn equal_pair(guarded: bool, reversed: bool) -> Scenario {
    Scenario::new(|builder, facade| {
        let mut declared = vec![];
        for label in ["first", "second"] {
            let method = handle(label, [Builtin::Number, Builtin::Number]);
            let methods = if guarded {
                vec![method.validity("positive"), positive_check("positive")]
            } else {
                vec![method]
            };
            let name = if label == "first" { "First" } else { "Second" };
            declared.push(provider(builder, facade, "vendor", name, methods));
        }
        if reversed {
            declared.reverse();
        }
        declared
    })
}

#[test]
fn test_last_equal_candidate_wins() {
    for guarded in [false, true] {
        for reversed in [false, true] {
            let scenario = equal_pair(guarded, reversed);
            let expected = if reversed { "first" } else { "second" };
            let registry = scenario.registry();
            for (name, engine) in engines() {
                assert_eq!(
                    scenario.handled_by(engine.as_ref(), &ints(1, 2), &registry).as_deref(),
                    Some(expected),
                    "{name}, guarded: {guarded}, reversed: {reversed}"
                );
            }
        }
    }
}

fn weight_of(receiver: &Value) -> Option<i32> {
    receiver
        .as_object()
        .and_then(|o| o.downcast_ref::<i32>())
        .copied()
}

#[test]
fn test_dynamic_priority_picks_instance() {
    let scenario = Scenario::new(|builder, facade| {
        vec![provider(
            builder,
            facade,
            "vendor",
            "WeightedCalc",
            vec![
                MethodDefinition::new("handle")
                    .implement("handle")
                    .param(Builtin::Number)
                    .param(Builtin::Number)
                    .returns(Builtin::Object)
                    .priority_method("weight")
                    .body(|receiver, _| Ok(Value::Int(weight_of(receiver).unwrap_or(-1)))),
                MethodDefinition::new("weight")
                    .returns(Builtin::PrimitiveInt)
                    .body(|receiver, _| Ok(Value::Int(weight_of(receiver).unwrap_or(0)))),
            ],
        )]
    });
    let provider = scenario.providers[0];
    let registry = InstanceRegistry::new();
    for weight in [3, 7, 5] {
        registry.register(provider, Value::object(provider, weight));
    }
    let handle = scenario.operation("handle", 2);
    for (name, engine) in engines() {
        let decision = engine
            .dispatch(&scenario.model, handle, &ints(1, 2), &registry)
            .unwrap()
            .unwrap();
        assert!(decision.invoke().unwrap().same(&Value::Int(7)), "{name}");
    }
}

#[test]
fn test_repeated_dispatch_is_stable() {
    let scenario = Scenario::new(|builder, facade| {
        vec![
            provider(
                builder,
                facade,
                "vendor",
                "IntCalc",
                vec![handle("C2", [Builtin::Integer, Builtin::Integer])],
            ),
            provider(
                builder,
                facade,
                "vendor",
                "GenericCalc",
                vec![handle("C1", [Builtin::Number, Builtin::Number])],
            ),
        ]
    });
    let registry = scenario.registry();
    let cached = CachedDispatcher::new();
    let handle = scenario.operation("handle", 2);
    let first = cached
        .dispatch(&scenario.model, handle, &ints(1, 2), &registry)
        .unwrap()
        .unwrap();
    for _ in 0..10 {
        let again = cached
            .dispatch(&scenario.model, handle, &ints(1, 2), &registry)
            .unwrap()
            .unwrap();
        assert_eq!(again.candidate(), first.candidate());
    }
    let stats = cached.statistics();
    assert_eq!(stats.ranking_cache.misses, 1);
    assert_eq!(stats.ranking_cache.hits, 10);
    assert_eq!(stats.short_circuit_dispatches, 11);
}

#[test]
fn test_null_argument_matches_reference_parameters() {
    let scenario = Scenario::new(|builder, facade| {
        vec![provider(
            builder,
            facade,
            "vendor",
            "IntCalc",
            vec![handle("C2", [Builtin::Integer, Builtin::Integer])],
        )]
    });
    let registry = scenario.registry();
    for (name, engine) in engines() {
        assert_eq!(
            scenario
                .handled_by(engine.as_ref(), &[Value::Null, Value::Int(2)], &registry)
                .as_deref(),
            Some("C2"),
            "{name}"
        );
        assert_eq!(
            scenario.handled_by(engine.as_ref(), &[Value::Int(1)], &registry),
            None,
            "{name}"
        );
    }
}

#[test]
fn test_statistics_render() {
    let cached = CachedDispatcher::new();
    let rendered = cached.statistics().to_string();
    assert!(rendered.contains("Dispatch Statistics"));
    let json = serde_json::to_value(cached.statistics()).unwrap();
    assert_eq!(json["ranking_cache"]["hits"], 0);
    assert_eq!(json["unresolved_dispatches"], 0);
}
