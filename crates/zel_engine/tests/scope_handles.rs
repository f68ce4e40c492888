use zel_engine::{ElementId, Engine, EngineConfig, HandleData, Shape};

#[test]
fn scope_exit_reclaims_transient_handles() {
    let mut engine = Engine::new();
    let baseline = engine.live_handles();

    let scope = engine.enter_scope();
    let a = engine.alloc_int(1);
    let b = engine.alloc_str("two");
    assert!(engine.is_live(a));
    assert!(engine.is_live(b));
    engine.exit_scope(scope);

    assert!(!engine.is_live(a));
    assert!(!engine.is_live(b));
    assert_eq!(engine.live_handles(), baseline);
}

#[test]
fn pinned_handle_survives_scope_and_frees_on_release() {
    let mut engine = Engine::new();

    let scope = engine.enter_scope();
    let kept = engine.alloc_str("kept");
    engine.pin(kept);
    engine.exit_scope(scope);

    assert!(engine.is_live(kept));
    assert!(matches!(engine.data(kept), HandleData::Str(s) if s == "kept"));

    engine.release(kept);
    assert!(!engine.is_live(kept));
}

#[test]
fn nested_scopes_reclaim_in_lifo_order() {
    let mut engine = Engine::new();

    assert_eq!(engine.scope_depth(), 0);
    let outer = engine.enter_scope();
    let outer_handle = engine.alloc_int(1);

    let inner = engine.enter_scope();
    assert_eq!(engine.scope_depth(), 2);
    let inner_handle = engine.alloc_int(2);
    engine.exit_scope(inner);

    assert!(!engine.is_live(inner_handle));
    assert!(engine.is_live(outer_handle));
    engine.exit_scope(outer);
    assert!(!engine.is_live(outer_handle));
}

#[test]
#[should_panic(expected = "LIFO")]
fn out_of_order_scope_exit_panics() {
    let mut engine = Engine::new();
    let outer = engine.enter_scope();
    let _inner = engine.enter_scope();
    engine.exit_scope(outer);
}

#[test]
fn with_scope_reclaims_on_return() {
    let mut engine = Engine::new();
    let handle = engine.with_scope(|engine| engine.alloc_number(2.5));
    assert!(!engine.is_live(handle));
}

#[test]
fn singletons_are_shared_and_survive_scopes() {
    let mut engine = Engine::new();
    let undef = engine.undefined();
    let t = engine.alloc_bool(true);

    engine.with_scope(|engine| {
        assert_eq!(engine.undefined(), undef);
        assert_eq!(engine.alloc_bool(true), t);
    });
    assert!(engine.is_live(undef));
    assert!(engine.is_live(t));
    assert_eq!(engine.shape_of(undef), Shape::Undefined);
}

#[test]
fn element_registry_is_get_or_create() {
    let mut engine = Engine::new();
    let el = ElementId::new(7).unwrap();

    assert_eq!(engine.element_handle(el), None);
    let handle = engine.expose_element(el);
    assert_eq!(engine.expose_element(el), handle);
    assert_eq!(engine.element_handle(el), Some(handle));
    assert_eq!(engine.element_of(handle), Some(el));
    assert_eq!(engine.shape_of(handle), Shape::Object);
}

#[test]
fn element_objects_outlive_scopes() {
    let mut engine = Engine::new();
    let el = ElementId::new(3).unwrap();

    let handle = engine.with_scope(|engine| engine.expose_element(el));
    assert!(engine.is_live(handle));

    engine.retire_element(el);
    assert!(!engine.is_live(handle));
    assert_eq!(engine.element_handle(el), None);
}

#[test]
fn retired_element_is_recreated_on_next_expose() {
    let mut engine = Engine::new();
    let el = ElementId::new(9).unwrap();

    let first = engine.expose_element(el);
    engine.retire_element(el);
    let second = engine.expose_element(el);
    assert!(engine.is_live(second));
    assert_eq!(engine.element_of(second), Some(el));
    let _ = first;
}

#[test]
fn reported_errors_record_coerced_message_and_context() {
    let mut engine = Engine::new();
    let handle = engine.alloc_str("boom");
    engine.report_error(handle, "convert element");

    let errors = engine.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "boom");
    assert_eq!(errors[0].context, "convert element");
    assert!(engine.pending_errors().is_empty());
}

#[test]
fn error_sink_drops_oldest_past_cap() {
    let mut engine = Engine::with_config(EngineConfig {
        max_reported_errors: 2,
        ..EngineConfig::default()
    });
    for i in 0..3 {
        let handle = engine.alloc_int(i);
        engine.report_error(handle, "ctx");
    }
    let errors = engine.take_errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].message, "1");
    assert_eq!(errors[1].message, "2");
}

#[test]
fn object_properties_keep_insertion_order() {
    let mut engine = Engine::new();
    let obj = engine.alloc_object();
    let one = engine.alloc_int(1);
    let two = engine.alloc_int(2);
    engine.object_set(obj, "b", one);
    engine.object_set(obj, "a", two);

    assert_eq!(engine.object_get(obj, "b"), Some(one));
    assert_eq!(engine.object_get(obj, "a"), Some(two));
    assert_eq!(engine.object_get(obj, "missing"), None);

    match engine.data(obj) {
        HandleData::Object(o) => {
            let keys: Vec<&str> = o.properties.keys().map(String::as_str).collect();
            assert_eq!(keys, ["b", "a"]);
        }
        _ => unreachable!(),
    }
}
