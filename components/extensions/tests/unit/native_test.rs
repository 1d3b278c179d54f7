use core_types::{NativeFunction, Value};
use extensions::{Extension, ExtensionRegistry, NativeCallback};

#[test]
fn table_callback_resolves_declared_functions() {
    let ext = Extension::builder(
        "math/native",
        "native function double(x);\nnative function triple(x);",
    )
    .callback(NativeCallback::table([
        NativeFunction::new("double", |args| {
            let n = args.first().and_then(Value::as_number).unwrap_or(0.0);
            Ok(Value::Number(n * 2.0))
        }),
        NativeFunction::new("triple", |args| {
            let n = args.first().and_then(Value::as_number).unwrap_or(0.0);
            Ok(Value::Number(n * 3.0))
        }),
    ]))
    .build();

    let double = ext.resolve_native("double").unwrap();
    assert_eq!(double.call(vec![Value::from(4)]).unwrap(), Value::from(8));
    let triple = ext.resolve_native("triple").unwrap();
    assert_eq!(triple.call(vec![Value::from(2)]).unwrap(), Value::from(6));
}

#[test]
fn table_missing_entry_resolves_to_none() {
    let ext = Extension::builder("partial", "native function present();\nnative function absent();")
        .callback(NativeCallback::table([NativeFunction::new("present", |_| {
            Ok(Value::Undefined)
        })]))
        .build();

    assert!(ext.resolve_native("present").is_some());
    assert!(ext.resolve_native("absent").is_none());
}

#[test]
fn resolver_sees_each_declared_name() {
    let ext = Extension::builder("echo", "native function a();\nnative function b();")
        .callback(NativeCallback::resolver(|name| {
            let owned = name.to_string();
            Some(NativeFunction::new(name, move |_| Ok(Value::String(owned.clone()))))
        }))
        .build();

    for name in ext.native_declarations() {
        let f = ext.resolve_native(&name).unwrap();
        assert_eq!(f.call(vec![]).unwrap(), Value::String(name.clone()));
    }
}

#[test]
fn listing_reflects_auto_enable_changes() {
    let registry = ExtensionRegistry::new();
    let ext = registry
        .create(Extension::builder("listed", "var x = 1;"), true)
        .unwrap();

    assert!(!registry.entries()[0].auto_enable);
    ext.set_auto_enable(true);
    let entry = &registry.entries()[0];
    assert!(entry.auto_enable);
    assert_eq!(entry.source, "var x = 1;");
}
