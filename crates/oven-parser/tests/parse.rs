use oven_core::{
    ast::{Decl, NodeKind},
    identifier::Id,
};
use oven_parser::{
    error::{ErrorCode, ParseError, Severity},
    parse,
};

#[test]
fn test_badge_module() {
    let source = r#"
        module badge {
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

    let parsed = parse(source).expect("Failed to parse");
    assert!(parsed.warnings.is_empty());

    let ast = &parsed.ast;
    assert_eq!(ast.roots().len(), 1);
    let module = ast.roots()[0];
    assert_eq!(ast.node(module).name(), "badge");

    let ifaces = ast.children_of_kind(module, NodeKind::Interface);
    assert_eq!(ifaces.len(), 3);

    let implements = ast.children_of_kind(module, NodeKind::Implements);
    assert_eq!(implements.len(), 1);
    assert_eq!(
        ast.node(implements[0]).decl(),
        &Decl::Implements {
            implemented: Id::new("BadgeManagerObject"),
        }
    );

    let manager = ast
        .child_named(module, NodeKind::Interface, Id::new("BadgeManager"))
        .expect("BadgeManager");
    let ops: Vec<String> = ast
        .children_of_kind(manager, NodeKind::Operation)
        .iter()
        .map(|op| ast.node(*op).name().to_string())
        .collect();
    assert_eq!(
        ops,
        vec!["setBadgeCount", "getBadgeCount", "addChangeListener"]
    );

    let add = ast
        .child_named(manager, NodeKind::Operation, Id::new("addChangeListener"))
        .expect("addChangeListener");
    let list = ast.arguments(add)[0];
    let list_type = ast.node(list).decl().value_type().expect("typed argument");
    assert_eq!(list_type.base_name(), "ApplicationId");
    assert_eq!(list_type.array_depth(), 1);

    let callback = ast
        .child_named(module, NodeKind::Interface, Id::new("BadgeChangeCallback"))
        .expect("BadgeChangeCallback");
    let marker = ast
        .extended_attribute(callback, "Callback")
        .expect("Callback attribute");
    assert_eq!(
        marker.decl(),
        &Decl::ExtendedAttribute {
            identity: Some(Id::new("FunctionOnly")),
            has_arguments: false,
        }
    );
}

#[test]
fn test_illegal_characters_are_warnings() {
    let parsed = parse("interface Foo { $ long getValue(); # };").expect("Failed to parse");

    assert_eq!(parsed.warnings.len(), 2);
    for warning in &parsed.warnings {
        assert_eq!(warning.severity(), Severity::Warning);
        assert_eq!(warning.code(), Some(ErrorCode::E002));
    }
    assert_eq!(parsed.warnings[0].message(), "illegal character '$' on line 1");

    let iface = parsed.ast.roots()[0];
    assert_eq!(
        parsed
            .ast
            .children_of_kind(iface, NodeKind::Operation)
            .len(),
        1
    );
}

#[test]
fn test_syntax_error_is_fatal() {
    let err = parse("interface Foo {\n  long getValue()\n};").unwrap_err();

    assert!(matches!(err, ParseError::Syntax(_)), "got {err:?}");
    assert_eq!(err.diagnostics().len(), 1);
    let diag = &err.diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E100));
    assert_eq!(diag.message(), "syntax error at '}' on line 3");
}

#[test]
fn test_comments_and_line_tracking() {
    let source = "/* header\n * spans lines\n */\n// interface Hidden {};\ninterface Foo {\n  long f() ?\n};";
    let err = parse(source).unwrap_err();

    assert_eq!(
        err.diagnostics()[0].message(),
        "syntax error at '?' on line 6"
    );
}

#[test]
fn test_integer_overflow_is_fatal() {
    let err = parse("interface Foo { const long BIG = 99999999999999999999; };").unwrap_err();

    assert!(matches!(err, ParseError::Lexical(_)), "got {err:?}");
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E004));
}

#[test]
fn test_empty_source() {
    let parsed = parse("  // nothing here\n").expect("Failed to parse");
    assert!(parsed.ast.is_empty());
    assert!(parsed.ast.roots().is_empty());
}
