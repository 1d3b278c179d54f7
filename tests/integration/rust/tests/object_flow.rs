//! Host objects reached from scripts through a context global

use std::sync::Arc;

use bridge::{Runtime, RuntimeConfig};
use core_types::{Error, NativeFunction, ObjectRef, Value};
use integration_tests::ScriptedEngine;
use object_model::{ClassDescriptor, PropertyAttributes, ScriptObject};
use support::Recorder;

mod support {
    use std::sync::Mutex;

    use core_types::Value;

    /// Collects setter invocations
    #[derive(Default)]
    pub struct Recorder(Mutex<Vec<Value>>);

    impl Recorder {
        pub fn push(&self, value: Value) {
            self.0.lock().unwrap().push(value);
        }

        pub fn values(&self) -> Vec<Value> {
            self.0.lock().unwrap().clone()
        }
    }
}

fn world() -> (Arc<ScriptObject>, Arc<ScriptObject>) {
    let global = ClassDescriptor::plain("Global").instantiate();
    let obj = ClassDescriptor::plain("Foo").instantiate();
    global.set("obj", Value::Object(obj.clone())).unwrap();
    (global, obj)
}

#[test]
fn getter_and_setter_run_on_script_access() {
    let runtime = Runtime::initialize(RuntimeConfig::default(), ScriptedEngine::new()).unwrap();
    let (global, obj) = world();
    let seen = Arc::new(Recorder::default());

    obj.define_getter("x", NativeFunction::new("get x", |_| Ok(Value::from(7))));
    let sink = Arc::clone(&seen);
    obj.define_setter(
        "x",
        NativeFunction::new("set x", move |args| {
            sink.push(args.into_iter().next().unwrap_or(Value::Undefined));
            Ok(Value::Undefined)
        }),
    );

    let global_ref: ObjectRef = global;
    let context = runtime.context().global(global_ref).build().unwrap();
    let scope = context.scope().unwrap();

    assert_eq!(scope.eval("get obj.x").unwrap(), Value::from(7));
    scope.eval("set obj.x = 5").unwrap();
    assert_eq!(seen.values(), vec![Value::from(5)]);
    assert_eq!(obj.get("x").unwrap(), Value::from(7));
}

#[test]
fn missing_attribute_surfaces_as_undefined_to_scripts_and_error_to_host() {
    let runtime = Runtime::initialize(RuntimeConfig::default(), ScriptedEngine::new()).unwrap();
    let (global, obj) = world();
    let context = runtime.context().global(global).build().unwrap();
    let scope = context.scope().unwrap();

    assert_eq!(scope.eval("get obj.nothing").unwrap(), Value::Undefined);
    assert_eq!(obj.get("nothing").unwrap_err(), Error::Attribute("nothing".into()));
}

#[test]
fn constructor_and_prototype_identity_through_scripts() {
    let runtime = Runtime::initialize(RuntimeConfig::default(), ScriptedEngine::new()).unwrap();
    let (global, _obj) = world();
    let context = runtime.context().global(global).build().unwrap();
    let scope = context.scope().unwrap();

    assert_eq!(scope.eval("get obj.constructor.name").unwrap(), Value::from("Foo"));
    assert_eq!(
        scope.eval("get obj.prototype.constructor.name").unwrap(),
        Value::from("Foo")
    );

    let ctor = scope.eval("get obj.constructor").unwrap();
    let ctor = ctor.as_object().unwrap();
    let rendered = ctor.get_property("toString").unwrap().unwrap();
    assert_eq!(
        rendered.as_function().unwrap().call(vec![]).unwrap(),
        Value::from("function Foo() {\n  [native code]\n}")
    );

    let built = ctor.call(vec![]).unwrap();
    assert_eq!(built.to_string(), "[object Foo]");
}

#[test]
fn read_only_fields_resist_script_assignment() {
    let runtime = Runtime::initialize(RuntimeConfig::default(), ScriptedEngine::new()).unwrap();
    let (global, obj) = world();
    obj.define_field("id", Value::from(1), PropertyAttributes::READ_ONLY);

    let context = runtime.context().global(global).build().unwrap();
    let scope = context.scope().unwrap();
    scope.eval("set obj.id = 2").unwrap();
    assert_eq!(scope.eval("get obj.id").unwrap(), Value::from(1));
}

#[test]
fn is_prototype_of_is_not_supported() {
    let (_global, obj) = world();
    let method = obj.get("isPrototypeOf").unwrap();
    let err = method
        .as_function()
        .unwrap()
        .call(vec![Value::Null])
        .unwrap_err();
    assert!(matches!(err, Error::NotSupported(_)));
}
