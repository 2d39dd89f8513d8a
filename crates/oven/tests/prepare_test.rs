//! Integration tests for module resolution through the SkeletonBuilder API.

use proptest::prelude::*;

use oven::{
    OvenError, SkeletonBuilder,
    artifact::OutputKind,
    ast::{Ast, NodeId, NodeKind},
    identifier::Id,
    resolve::{CallbackFlavor, Primitive, Resolution, ResolveError, TypeClass},
};

fn resolve(source: &str, module: &str) -> (Ast, Resolution) {
    let builder = SkeletonBuilder::default();
    let ast = builder.parse(source).expect("Failed to parse");
    let resolution = builder
        .prepare(&ast, module)
        .expect("Failed to resolve");
    (ast, resolution)
}

fn interface(resolution: &Resolution, name: &str) -> NodeId {
    resolution
        .tables()
        .interface(Id::new(name))
        .unwrap_or_else(|| panic!("interface {name} not declared"))
}

fn operation(ast: &Ast, iface: NodeId, name: &str) -> NodeId {
    ast.child_named(iface, NodeKind::Operation, Id::new(name))
        .unwrap_or_else(|| panic!("operation {name} not declared"))
}

fn attribute(ast: &Ast, iface: NodeId, name: &str) -> NodeId {
    ast.child_named(iface, NodeKind::Attribute, Id::new(name))
        .unwrap_or_else(|| panic!("attribute {name} not declared"))
}

fn names(ids: &[Id]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

const BADGE: &str = r#"
    module badge {
        typedef DOMString ApplicationId;

        [NoInterfaceObject] interface BadgeManagerObject {
            readonly attribute BadgeManager badge;
        };
        Tizen implements BadgeManagerObject;

        [NoInterfaceObject] interface BadgeManager {
            void setBadgeCount(ApplicationId appId, long count) raises(WebAPIException);
            long getBadgeCount(ApplicationId appId) raises(WebAPIException);
            void addChangeListener(ApplicationId[] appIdList, BadgeChangeCallback successCallback);
        };

        [Callback=FunctionOnly, NoInterfaceObject] interface BadgeChangeCallback {
            void onsuccess(ApplicationId appId, long count);
        };
    };
"#;

#[test]
fn test_constructor_interface_commands() {
    let source = r#"
        [Constructor]
        interface Foo {
            readonly attribute DOMString name;
            long getValue();
        };
    "#;

    let (ast, resolution) = resolve(source, "Foo");

    let commands = resolution.command_table();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands["FooGetValue"], "Foo_getValue");

    let foo = interface(&resolution, "Foo");
    let name = resolution
        .annotations()
        .attribute(attribute(&ast, foo, "name"))
        .expect("name annotation");
    assert_eq!(name.class, Some(TypeClass::Primitive(Primitive::String)));

    let get_value = resolution
        .annotations()
        .operation(operation(&ast, foo, "getValue"))
        .expect("getValue annotation");
    assert!(!get_value.is_async);
    assert_eq!(
        get_value.return_class,
        Some(TypeClass::Primitive(Primitive::Long))
    );
    assert!(!resolution.is_async());
}

#[test]
fn test_error_only_listener_is_async() {
    let source = r#"
        module demo {
            callback interface ErrorCallback {
                void onerror(DOMString message);
            };

            [Constructor]
            interface Demo {
                void run(long times, ErrorCallback errorCallback);
            };
        };
    "#;

    let (ast, resolution) = resolve(source, "demo");

    let demo = interface(&resolution, "Demo");
    let run = operation(&ast, demo, "run");
    let annotation = resolution.annotations().operation(run).expect("run annotation");
    assert!(annotation.is_async);
    assert_eq!(names(&annotation.argnames), vec!["times", "errorCallback"]);
    assert_eq!(names(&annotation.primitive_args), vec!["times"]);

    let callback_arg = ast.arguments(run)[1];
    assert_eq!(
        resolution.annotations().argument(callback_arg),
        Some(&TypeClass::Listener {
            operations: vec![Id::new("onerror")],
            flavor: Some(CallbackFlavor::Error),
        })
    );

    let module = resolution.module_roots()[0];
    assert!(resolution.annotations().is_async_root(module));
    assert!(resolution.is_async());
}

#[test]
fn test_unresolved_type_is_fatal() {
    let source = "interface Foo { void configure(Mystery settings); };";

    let builder = SkeletonBuilder::default();
    let ast = builder.parse(source).expect("Failed to parse");
    let err = builder.prepare(&ast, "Foo").expect_err("Should fail to resolve");

    match err {
        ResolveError::UnresolvedType { name, site, span } => {
            assert_eq!(name, "Mystery");
            assert!(site.contains("settings"), "site was {site}");
            assert_eq!(&source[span.start()..span.end()], "Mystery settings");
        }
        other => panic!("Expected unresolved type, got {other:?}"),
    }
}

#[test]
fn test_unresolved_type_reports_base_name() {
    let source = "interface Foo { void f(Mystery[]? x); };";

    let builder = SkeletonBuilder::default();
    let ast = builder.parse(source).expect("Failed to parse");
    let err = builder.prepare(&ast, "Foo").expect_err("Should fail to resolve");

    assert!(
        matches!(&err, ResolveError::UnresolvedType { name, .. } if name == "Mystery"),
        "got {err:?}"
    );
}

#[test]
fn test_build_context_keeps_source_for_resolve_errors() {
    let source = "interface Foo { attribute Mystery mystery; };";

    let err = SkeletonBuilder::default()
        .build_context(source, "Foo", OutputKind::Both)
        .expect_err("Should fail to resolve");

    match err {
        OvenError::Resolve { err, src } => {
            assert_eq!(src, source);
            let span = err.span();
            assert_eq!(&src[span.start()..span.end()], "attribute Mystery mystery;");
        }
        other => panic!("Expected resolve error, got {other:?}"),
    }
}

#[test]
fn test_unresolved_type_outside_module_is_ignored() {
    let source = r#"
        interface Other { void configure(Mystery settings); };
        [Constructor] interface Foo { void start(); };
    "#;

    let (_, resolution) = resolve(source, "foo");
    assert_eq!(resolution.command_table()["FooStart"], "Foo_start");
}

#[test]
fn test_enum_union_typedef() {
    let source = r#"
        enum Red { "crimson", "scarlet" };
        enum Green { "lime" };
        typedef (Red or Green) Shade;

        [Constructor]
        interface Paint {
            void fill(Shade shade);
        };
    "#;

    let (ast, resolution) = resolve(source, "Paint");

    let paint = interface(&resolution, "Paint");
    let fill = operation(&ast, paint, "fill");
    let class = resolution
        .annotations()
        .argument(ast.arguments(fill)[0])
        .expect("shade class");
    assert_eq!(
        class,
        &TypeClass::Enum(vec![Id::new("crimson"), Id::new("scarlet"), Id::new("lime")])
    );
}

#[test]
fn test_mixed_union_is_rejected() {
    let source = r#"
        enum Red { "crimson" };
        [Constructor]
        interface Paint {
            void fill((Red or long) shade);
        };
    "#;

    let builder = SkeletonBuilder::default();
    let ast = builder.parse(source).expect("Failed to parse");
    let err = builder.prepare(&ast, "Paint").expect_err("Should fail to resolve");
    assert!(
        matches!(err, ResolveError::UnsupportedUnion { .. }),
        "got {err:?}"
    );
}

#[test]
fn test_host_root_exports_attribute_type() {
    let (ast, resolution) = resolve(BADGE, "badge");
    let tables = resolution.tables();

    assert_eq!(
        tables.implemented_host(Id::new("BadgeManagerObject")),
        Some(Id::new("Tizen"))
    );
    assert_eq!(tables.implemented_object(), Some(Id::new("badge")));
    assert_eq!(names(resolution.exported_interfaces()), vec!["BadgeManager"]);

    let manager = interface(&resolution, "BadgeManager");
    let manager_annotation = resolution.annotations().interface(manager).expect("manager");
    assert_eq!(manager_annotation.exported, Some(Id::new("Tizen")));

    let object = interface(&resolution, "BadgeManagerObject");
    let object_annotation = resolution.annotations().interface(object).expect("object");
    assert_eq!(object_annotation.implements, Some(Id::new("Tizen")));

    let commands: Vec<(&str, &str)> = resolution
        .command_table()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        commands,
        vec![
            ("BadgeManagerSetBadgeCount", "BadgeManager_setBadgeCount"),
            ("BadgeManagerGetBadgeCount", "BadgeManager_getBadgeCount"),
            ("BadgeManagerAddChangeListener", "BadgeManager_addChangeListener"),
        ]
    );

    let listener = operation(&ast, manager, "addChangeListener");
    let annotation = resolution.annotations().operation(listener).expect("listener");
    assert!(annotation.is_async);
    assert_eq!(
        resolution.annotations().argument(ast.arguments(listener)[1]),
        Some(&TypeClass::Function)
    );
    assert!(resolution.is_async());
}

#[test]
fn test_exports_follow_member_order() {
    let source = r#"
        module m {
            interface A {};
            interface B {};
            interface C {};
            [NoInterfaceObject] interface Host {
                attribute A a;
                B getB();
                attribute C c;
            };
            Tizen implements Host;
        };
    "#;

    let (_, resolution) = resolve(source, "m");
    assert_eq!(names(resolution.exported_interfaces()), vec!["A", "B", "C"]);
}

#[test]
fn test_implements_for_unknown_host_is_ignored() {
    let source = r#"
        module badge {
            interface BadgeManagerObject { readonly attribute BadgeManager badge; };
            Navigator implements BadgeManagerObject;
            interface BadgeManager { void clear(); };
        };
    "#;

    let (_, resolution) = resolve(source, "badge");
    assert!(resolution.tables().implemented_classes().is_empty());
    assert!(resolution.exported_interfaces().is_empty());
    assert!(resolution.command_table().is_empty());
}

#[test]
fn test_command_collision_last_wins() {
    let source = r#"
        [Constructor]
        interface Foo {
            void get();
            void Get();
        };
    "#;

    let (_, resolution) = resolve(source, "Foo");
    let commands = resolution.command_table();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands["FooGet"], "Foo_Get");
}

#[test]
fn test_private_interface_and_returned_object() {
    let source = r#"
        module shapes {
            [Constructor]
            interface Factory {
                Shape create(DOMString kind);
            };
            interface Shape {
                readonly attribute double area;
            };
            interface Circle : Shape {
                double radius();
            };
        };
    "#;

    let (ast, resolution) = resolve(source, "shapes");
    let tables = resolution.tables();

    assert!(tables.active_objects().contains(&Id::new("Shape")));
    assert!(tables.is_exported_interface(Id::new("Shape")));

    let circle = interface(&resolution, "Circle");
    assert!(resolution.annotations().interface(circle).is_some_and(|a| a.private));

    let factory = interface(&resolution, "Factory");
    let create = resolution
        .annotations()
        .operation(operation(&ast, factory, "create"))
        .expect("create");
    assert_eq!(create.return_internal, Some(Id::new("Shape")));
    assert_eq!(
        create.return_class,
        Some(TypeClass::PlatformObject(vec![Id::new("Shape")]))
    );
}

#[test]
fn test_constructor_provenance() {
    let source = r#"
        dictionary WidgetOptions {
            DOMString label;
        };

        [Constructor(DOMString id, WidgetOptions options)]
        interface Widget {
            readonly attribute DOMString id;
            readonly attribute DOMString label;
            readonly attribute long size;
        };
    "#;

    let (ast, resolution) = resolve(source, "widget");

    let widget = interface(&resolution, "Widget");
    let annotation = resolution.annotations().interface(widget).expect("widget");
    assert!(annotation.constructor.is_some());
    assert_eq!(annotation.exported, Some(Id::new("Widget")));
    assert_eq!(names(&annotation.constructor_primitive_args), vec!["id"]);

    let exist_in = |name: &str| {
        resolution
            .annotations()
            .attribute(attribute(&ast, widget, name))
            .and_then(|a| a.exist_in.clone())
    };
    assert_eq!(exist_in("id").as_deref(), Some("ctor"));
    assert_eq!(exist_in("label").as_deref(), Some("options.label"));
    assert_eq!(exist_in("size"), None);
}

#[test]
fn test_partial_declarations_are_skipped() {
    let source = r#"
        [Constructor] interface Foo { void start(); };
        partial interface Foo { void stop(Mystery m); };
    "#;

    let (_, resolution) = resolve(source, "Foo");
    assert_eq!(resolution.command_table().len(), 1);
}

#[test]
fn test_module_without_declarations() {
    let (_, resolution) = resolve("interface Foo { void start(); };", "bar");

    assert!(resolution.module_roots().is_empty());
    assert!(resolution.command_table().is_empty());
    assert!(!resolution.is_async());
}

#[test]
fn test_emission_context_serializes() {
    let builder = SkeletonBuilder::default().with_year(2026);
    let context = builder
        .build_context(BADGE, "badge", OutputKind::Both)
        .expect("Failed to build context");

    let json = serde_json::to_value(&context).expect("Failed to serialize");
    assert_eq!(json["module"]["name"], "badge");
    assert_eq!(json["module"]["upper"], "BADGE");
    assert_eq!(json["module"]["title"], "Badge");
    assert_eq!(json["module"]["year"], 2026);
    assert_eq!(json["module"]["async"], true);
    assert_eq!(json["output"], "both");
    assert_eq!(json["implemented_object"], "badge");
    assert_eq!(json["implemented_classes"]["BadgeManagerObject"], "Tizen");
    assert_eq!(
        json["command_table"]["BadgeManagerGetBadgeCount"],
        "BadgeManager_getBadgeCount"
    );
    assert_eq!(json["callbacks"]["BadgeChangeCallback"]["function_only"], true);
    assert_eq!(json["callbacks"]["BadgeChangeCallback"]["flavor"], "success");

    let artifacts = json["artifacts"].as_array().expect("artifacts");
    assert!(artifacts.iter().any(|a| a == "badge_api.js"));
    assert!(artifacts.iter().any(|a| a == "badge_instance.cc"));

    let module = &json["declarations"][0];
    assert_eq!(module["kind"], "module");
    let manager = module["declarations"]
        .as_array()
        .expect("module declarations")
        .iter()
        .find(|d| d["name"] == "BadgeManager")
        .expect("BadgeManager context");
    assert_eq!(manager["kind"], "interface");
    assert_eq!(manager["exported"], "Tizen");

    let add = &manager["operations"][2];
    assert_eq!(add["name"], "addChangeListener");
    assert_eq!(add["async"], true);
    assert_eq!(add["native_cmd"], "BadgeManager_addChangeListener");
    assert_eq!(add["arguments"][0]["type"]["name"], "ApplicationId[]");
    assert_eq!(add["arguments"][1]["validation"]["kind"], "FUNCTION");
}

#[test]
fn test_extended_attributes_reach_context() {
    let source = r#"
        module m {
            [Constructor(DOMString id), NoInterfaceObject, Conditional=NFC]
            interface Foo {
                void set([Clamp] long level, long count);
            };
        };
    "#;

    let context = SkeletonBuilder::default()
        .with_year(2026)
        .build_context(source, "m", OutputKind::Both)
        .expect("Failed to build context");
    let json = serde_json::to_value(&context).expect("Failed to serialize");

    let foo = &json["declarations"][0]["declarations"][0];
    assert_eq!(foo["name"], "Foo");

    let attrs = foo["extended_attributes"].as_array().expect("extended attributes");
    assert_eq!(attrs.len(), 3);
    assert_eq!(attrs[0]["name"], "Constructor");
    assert_eq!(attrs[0]["has_arguments"], true);
    assert_eq!(attrs[0]["arguments"][0]["name"], "id");
    assert_eq!(attrs[1]["name"], "NoInterfaceObject");
    assert_eq!(attrs[1]["has_arguments"], false);
    assert_eq!(attrs[1]["identity"], serde_json::Value::Null);
    assert_eq!(attrs[2]["identity"], "NFC");

    let arguments = &foo["operations"][0]["arguments"];
    assert_eq!(arguments[0]["extended_attributes"][0]["name"], "Clamp");
    assert_eq!(arguments[1]["extended_attributes"], serde_json::json!([]));
}

#[test]
fn test_js_only_artifacts() {
    let builder = SkeletonBuilder::default().with_year(2026);
    let context = builder
        .build_context(BADGE, "badge", OutputKind::Js)
        .expect("Failed to build context");

    assert_eq!(context.artifacts, vec!["badge_api.js"]);
}

const SHUFFLED: [&str; 5] = [
    "enum Mode { \"fast\", \"slow\" };",
    "typedef Mode Speed;",
    "dictionary Options { Speed speed; };",
    "callback interface Done { void onsuccess(); };",
    "[Constructor] interface Runner { void run(Speed speed, Options options, Done done); };",
];

proptest! {
    #[test]
    fn prop_declaration_order_does_not_matter(order in Just(SHUFFLED.to_vec()).prop_shuffle()) {
        let source = order.join("\n");
        let (ast, resolution) = resolve(&source, "Runner");

        let runner = interface(&resolution, "Runner");
        let run = operation(&ast, runner, "run");
        let classes: Vec<Option<&TypeClass>> = ast
            .arguments(run)
            .iter()
            .map(|arg| resolution.annotations().argument(*arg))
            .collect();

        let expected_enum = TypeClass::Enum(vec![Id::new("fast"), Id::new("slow")]);
        let expected_listener = TypeClass::Listener {
            operations: vec![Id::new("onsuccess")],
            flavor: Some(CallbackFlavor::Success),
        };
        prop_assert_eq!(
            classes,
            vec![
                Some(&expected_enum),
                Some(&TypeClass::Dictionary),
                Some(&expected_listener),
            ]
        );
        prop_assert_eq!(&resolution.command_table()["RunnerRun"], "Runner_run");
        prop_assert!(resolution.is_async());
    }

    #[test]
    fn prop_command_per_operation(ops in prop::collection::btree_set("op[a-z]{1,4}", 1..8)) {
        let body: String = ops.iter().map(|op| format!("void {op}();")).collect();
        let source = format!("[Constructor] interface Foo {{ {body} }};");
        let (_, resolution) = resolve(&source, "Foo");

        let commands = resolution.command_table();
        prop_assert_eq!(commands.len(), ops.len());
        for op in &ops {
            let key = format!("FooO{}", &op[1..]);
            prop_assert_eq!(&commands[&key], &format!("Foo_{op}"));
        }
    }
}
