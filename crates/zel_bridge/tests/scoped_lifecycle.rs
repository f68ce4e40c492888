use zel_bridge::{Buffer, Engine, Object, ScopedValue};

#[test]
fn clones_share_one_slot() {
    let mut engine = Engine::new();
    let a = ScopedValue::from_i32(&mut engine, 7);
    assert_eq!(a.share_count(), 1);

    let b = a.clone();
    let c = b.clone();
    assert_eq!(a.share_count(), 3);
    assert_eq!(a, b);
    assert_eq!(b, c);

    drop(b);
    drop(c);
    assert_eq!(a.share_count(), 1);
    assert!(engine.is_live(a.handle()));
}

#[test]
fn equality_is_slot_identity_not_value_equality() {
    let mut engine = Engine::new();
    let handle = engine.alloc_int(7);
    let a = ScopedValue::from_handle(handle);
    let b = ScopedValue::from_handle(handle);

    // Same handle, separately built records.
    assert_eq!(a.handle(), b.handle());
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn literal_constructors_allocate_fresh_handles() {
    let mut engine = Engine::new();
    let before = engine.total_allocations();
    let s = ScopedValue::from_str(&mut engine, "hi");
    let n = ScopedValue::from_f64(&mut engine, 1.5);
    assert_eq!(engine.total_allocations(), before + 2);
    assert_ne!(s.handle(), n.handle());
}

#[test]
fn wrapper_constructors_reuse_the_wrapped_handle() {
    let mut engine = Engine::new();
    let object = Object::new(&mut engine);
    let before = engine.total_allocations();

    let scoped = ScopedValue::from_object(&object);
    assert_eq!(scoped.handle(), object.handle());
    assert_eq!(engine.total_allocations(), before);
}

#[test]
fn buffer_constructor_copies_into_a_new_handle() {
    let mut engine = Engine::new();
    let buffer = Buffer::with_bytes(&mut engine, &[1, 2, 3]);
    let scoped = ScopedValue::from_buffer(&mut engine, &buffer);

    assert_ne!(scoped.handle(), buffer.handle());
    let copy = scoped.to_buffer(&mut engine).unwrap();
    assert_eq!(copy.bytes(&engine), &[1, 2, 3]);
}

#[test]
fn scope_exit_invalidates_scoped_handles() {
    let mut engine = Engine::new();
    let scope = engine.enter_scope();
    let scoped = ScopedValue::from_str(&mut engine, "transient");
    let handle = scoped.handle();
    drop(scoped);
    engine.exit_scope(scope);

    assert!(!engine.is_live(handle));
}

#[test]
fn pinned_wrappers_survive_the_scope_their_handle_came_from() {
    let mut engine = Engine::new();

    let object = engine.with_scope(|engine| {
        let scoped = ScopedValue::from_str(&mut *engine, "kept");
        scoped.to_object(engine).unwrap()
    });

    assert!(engine.is_live(object.handle()));
    let scoped = ScopedValue::from_object(&object);
    assert_eq!(scoped.to_std_string(&engine), "kept");

    object.release(&mut engine);
    assert!(!engine.is_live(scoped.handle()));
}
