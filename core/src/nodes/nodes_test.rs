use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use chrono::DateTime;
use pretty_assertions::assert_eq;

use super::*;
use crate::error::{Error, NodeError};
use crate::scope::{Context, Scope};
use crate::test_utils::init_test_logging;
use crate::values::{Function, Kind, Value};

#[derive(Clone)]
struct Person {
    age: i64,
    name: String,
    nickname: Option<String>,
}

crate::object!(Person {
    "age" => age,
    "name" => name,
    "nickname" => nickname,
});

fn not_found(key: &str) -> Error {
    Error::DefinitionNotFound {
        key: key.to_string(),
    }
}

fn chain(scalars: &[&str], cause: Error) -> Error {
    scalars
        .iter()
        .rev()
        .fold(cause, |cause, scalar| Error::Node(NodeError::new(*scalar, cause)))
}

fn person_scope(age: i64) -> Scope {
    Scope::builder()
        .definition(
            "person",
            Value::object(Person {
                age,
                name: "ana".to_string(),
                nickname: None,
            }),
        )
        .build()
        .unwrap()
}

fn age_rule() -> Expr {
    if_then_else(
        greater_or_equal(reference("person.age"), literal(18_i64)),
        literal("pass"),
        literal("fail"),
    )
}

// ============================================================================
// Literals and references
// ============================================================================

#[test]
fn test_literal_evaluates_to_itself() {
    let scope = Scope::new();
    assert_eq!(scope.compute(&literal(5_i64)), Ok(Value::I64(5)));
    assert_eq!(scope.compute(&literal("x")), Ok(Value::from("x")));
}

#[test]
fn test_lazy_literal_is_invoked_on_every_eval() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let node = literal(Function::new(move || {
        counter.fetch_add(1, Ordering::SeqCst) as i64 + 1
    }));

    let scope = Scope::new();
    assert_eq!(scope.compute(&node), Ok(Value::I64(1)));
    assert_eq!(scope.compute(&node), Ok(Value::I64(2)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_non_lazy_function_literal_is_returned() {
    let node = literal(Function::new(|x: i64| x));
    let value = Scope::new().compute(&node).unwrap();
    assert_eq!(value.kind(), Kind::Function);
}

#[test]
fn test_reference_resolves_dotted_path() {
    let scope = person_scope(19);
    assert_eq!(scope.compute(&reference("person.age")), Ok(Value::I64(19)));
    assert_eq!(
        scope.compute(&reference("person.name")),
        Ok(Value::from("ana"))
    );
}

#[test]
fn test_reference_reports_full_path() {
    let scope = person_scope(19);
    assert_eq!(
        scope.compute(&reference("person.height")),
        Err(not_found("person.height"))
    );
    assert_eq!(
        scope.compute(&reference("person.age.value")),
        Err(not_found("person.age.value"))
    );
    assert_eq!(scope.compute(&reference("ghost")), Err(not_found("ghost")));
}

#[test]
fn test_nil_field_is_missing() {
    let scope = person_scope(19);
    assert_eq!(
        scope.compute(&reference("person.nickname")),
        Err(not_found("person.nickname"))
    );
}

#[test]
fn test_reference_sees_live_object_state() {
    let person = Arc::new(RwLock::new(Person {
        age: 19,
        name: "ana".to_string(),
        nickname: None,
    }));
    let scope = Scope::builder()
        .definition("person", person.clone())
        .build()
        .unwrap();
    let rule = age_rule();

    assert_eq!(scope.compute(&rule), Ok(Value::from("pass")));
    person.write().unwrap().age = 5;
    assert_eq!(scope.compute(&rule), Ok(Value::from("fail")));
}

#[test]
fn test_reference_into_nested_map() {
    let mut inner = BTreeMap::new();
    inner.insert("city".to_string(), Value::from("Lisbon"));
    let mut outer = BTreeMap::new();
    outer.insert("address".to_string(), Value::Map(inner));

    let scope = Scope::builder().definition("user", outer).build().unwrap();
    assert_eq!(
        scope.compute(&reference("user.address.city")),
        Ok(Value::from("Lisbon"))
    );
}

#[test]
fn test_exists() {
    let scope = person_scope(19);
    assert_eq!(scope.compute(&exists("person.age")), Ok(Value::Bool(true)));
    assert_eq!(scope.compute(&exists("person.x")), Ok(Value::Bool(false)));
    assert_eq!(scope.compute(&exists("nobody")), Ok(Value::Bool(false)));
}

#[test]
fn test_coalesce() {
    let scope = person_scope(19);
    assert_eq!(
        scope.compute(&coalesce("person.age", literal(0_i64))),
        Ok(Value::I64(19))
    );
    assert_eq!(
        scope.compute(&coalesce("person.height", literal(170_i64))),
        Ok(Value::I64(170))
    );
    assert_eq!(
        scope.compute(&coalesce("person.height", reference("ghost"))),
        Err(chain(&["coalesce"], not_found("ghost")))
    );
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_if_branches() {
    init_test_logging();

    assert_eq!(person_scope(19).compute(&age_rule()), Ok(Value::from("pass")));
    assert_eq!(person_scope(5).compute(&age_rule()), Ok(Value::from("fail")));
}

#[test]
fn test_if_without_else_yields_false() {
    let rule = if_then(literal(false), literal("never"));
    assert_eq!(Scope::new().compute(&rule), Ok(Value::Bool(false)));
}

#[test]
fn test_if_requires_boolean_condition() {
    let rule = if_then(literal("yes"), literal(1_i64));
    assert_eq!(
        Scope::new().compute(&rule),
        Err(chain(
            &["if"],
            Error::UnexpectedKind {
                expected: Kind::Bool,
                got: Kind::Str,
            }
        ))
    );
}

#[test]
fn test_if_rejects_extra_else_branches() {
    let rule = If::build(
        literal(true),
        literal(1_i64),
        vec![literal(2_i64), literal(3_i64)],
    );
    assert_eq!(
        rule.as_invalid(),
        Some(&NodeError::new("if", Error::ExtraElseBranch))
    );
    assert_eq!(
        Scope::new().compute(&rule),
        Err(chain(&["if"], Error::ExtraElseBranch))
    );
}

#[test]
fn test_error_chain_names_every_node() {
    let err = Scope::new().compute(&age_rule()).unwrap_err();
    assert_eq!(err.to_string(), "if.gte: definition not found: person.age");
    assert_eq!(err.root_cause(), &not_found("person.age"));
}

#[test]
fn test_not() {
    let scope = Scope::new();
    assert_eq!(scope.compute(&not(literal(true))), Ok(Value::Bool(false)));
    assert_eq!(
        scope.compute(&not(literal(1_i64))),
        Err(chain(
            &["not"],
            Error::UnexpectedKind {
                expected: Kind::Bool,
                got: Kind::I64,
            }
        ))
    );
}

#[test]
fn test_or_coalesces() {
    let scope = Scope::new();
    assert_eq!(
        scope.compute(&or(vec![literal(false), literal(true)])),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        scope.compute(&or(vec![literal(false), literal("fallback"), literal(true)])),
        Ok(Value::from("fallback"))
    );
    assert_eq!(
        scope.compute(&or(vec![literal(false), literal(false)])),
        Ok(Value::Bool(false))
    );
}

#[test]
fn test_or_stops_at_first_error() {
    let scope = Scope::new();
    assert_eq!(
        scope.compute(&or(vec![literal(false), reference("ghost"), literal(true)])),
        Err(chain(&["or"], not_found("ghost")))
    );
    assert_eq!(
        scope.compute(&or(vec![literal(true), reference("ghost")])),
        Ok(Value::Bool(true))
    );
}

#[test]
fn test_variadic_nodes_need_arguments() {
    assert_eq!(
        or(vec![]).as_invalid(),
        Some(&NodeError::new("or", Error::MissingArguments))
    );
    assert_eq!(
        sum(vec![]).as_invalid(),
        Some(&NodeError::new("sum", Error::MissingArguments))
    );
    assert_eq!(
        avg(vec![]).as_invalid(),
        Some(&NodeError::new("avg", Error::MissingArguments))
    );
}

// ============================================================================
// Comparison and arithmetic
// ============================================================================

#[test]
fn test_comparisons() {
    let scope = Scope::new();
    let one = || literal(1_i64);
    let two = || literal(2_i64);

    let cases = [
        (equal(one(), one()), true),
        (equal(one(), two()), false),
        (greater(two(), one()), true),
        (greater(one(), one()), false),
        (greater_or_equal(one(), one()), true),
        (smaller(one(), two()), true),
        (smaller(two(), two()), false),
        (smaller_or_equal(two(), two()), true),
    ];
    for (node, expected) in cases {
        assert_eq!(scope.compute(&node), Ok(Value::Bool(expected)), "{node:?}");
    }
}

#[test]
fn test_comparison_of_times() {
    let early = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
    let late = DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z").unwrap();
    let rule = smaller(time(early), time(late));
    assert_eq!(Scope::new().compute(&rule), Ok(Value::Bool(true)));
}

#[test]
fn test_comparison_rejects_mixed_kinds() {
    let rule = equal(literal(1_i64), literal(1.0_f64));
    let err = Scope::new().compute(&rule).unwrap_err();
    assert_eq!(
        err,
        chain(
            &["equal"],
            Error::IncompatiblePair {
                first: Value::I64(1),
                second: Value::F64(1.0),
            }
        )
    );
    assert_eq!(err.to_string(), "equal: incompatible pair: 1 (i64) and 1 (f64)");
}

#[test]
fn test_sum_and_avg() {
    let scope = Scope::new();
    assert_eq!(
        scope.compute(&sum(vec![literal(1_i64), literal(2_i64), literal(4_i64)])),
        Ok(Value::I64(7))
    );
    assert_eq!(
        scope.compute(&avg(vec![literal(1_i64), literal(2_i64)])),
        Ok(Value::I64(1))
    );
    assert_eq!(
        scope.compute(&avg(vec![literal(1.0_f64), literal(2.0_f64)])),
        Ok(Value::F64(1.5))
    );
    assert_eq!(
        scope.compute(&sum(vec![literal(1_i64), literal(1_i32)])),
        Err(chain(&["sum"], Error::KindMismatch))
    );
}

#[test]
fn test_affixes() {
    let scope = Scope::new();
    assert_eq!(
        scope.compute(&has_prefix(literal("gon rules"), literal("gon"))),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        scope.compute(&has_suffix(literal("gon rules"), literal("gon"))),
        Ok(Value::Bool(false))
    );
    assert_eq!(
        scope.compute(&has_suffix(literal(1_i64), literal("1"))),
        Err(chain(
            &["hasSuffix"],
            Error::UnexpectedKind {
                expected: Kind::Str,
                got: Kind::I64,
            }
        ))
    );
}

#[test]
fn test_is_empty() {
    let scope = Scope::new();
    assert_eq!(scope.compute(&is_empty(literal(""))), Ok(Value::Bool(true)));
    assert_eq!(
        scope.compute(&is_empty(literal(vec![1_i64]))),
        Ok(Value::Bool(false))
    );
    assert_eq!(
        scope.compute(&is_empty(literal(BTreeMap::<String, Value>::new()))),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        scope.compute(&is_empty(literal(3_i64))),
        Err(chain(&["isEmpty"], Error::NotEmptiable { kind: Kind::I64 }))
    );
}

// ============================================================================
// Calls
// ============================================================================

fn math_scope() -> Scope {
    Scope::builder()
        .definition("double", Function::new(|x: i64| x * 2))
        .definition(
            "guarded",
            Function::with_context(|ctx: &Context, x: i64| ctx.check().map(|_| x)),
        )
        .definition("limit", 10_i64)
        .build()
        .unwrap()
}

#[test]
fn test_call_invokes_host_function() {
    let scope = math_scope();
    assert_eq!(
        scope.compute(&call("double", vec![literal(21_i64)])),
        Ok(Value::I64(42))
    );
    assert_eq!(
        scope.compute(&call("guarded", vec![literal(7_i64)])),
        Ok(Value::I64(7))
    );
}

#[test]
fn test_call_failures() {
    let scope = math_scope();
    assert_eq!(
        scope.compute(&call("missing", vec![])),
        Err(chain(&["call"], not_found("missing")))
    );
    assert_eq!(
        scope.compute(&call("limit", vec![])),
        Err(chain(
            &["call"],
            Error::DefinitionNotCallable {
                key: "limit".to_string()
            }
        ))
    );
    assert_eq!(
        scope.compute(&call("double", vec![literal("x")])),
        Err(chain(
            &["call"],
            Error::ArgumentMismatch {
                index: 0,
                expected: Kind::I64,
                got: Kind::Str,
            }
        ))
    );
    assert_eq!(
        scope.compute(&call("double", vec![])),
        Err(chain(&["call"], Error::Arity { expected: 1, got: 0 }))
    );
}

#[test]
fn test_call_evaluates_arguments_before_resolving() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let scope = Scope::builder()
        .definition(
            "tick",
            Function::new(move || counter.fetch_add(1, Ordering::SeqCst) as i64),
        )
        .build()
        .unwrap();

    let result = scope.compute(&call("missing", vec![reference("tick")]));
    assert_eq!(result, Err(chain(&["call"], not_found("missing"))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_call_sees_cancelled_context() {
    let ctx = Context::new();
    let scope = math_scope().child().context(ctx.clone()).build().unwrap();
    ctx.cancel();
    assert_eq!(
        scope.compute(&call("guarded", vec![literal(1_i64)])),
        Err(chain(&["call"], Error::Cancelled))
    );
}

// ============================================================================
// Shapes and traversal
// ============================================================================

#[test]
fn test_shapes() {
    let node = has_prefix(reference("name"), literal("a"));
    assert_eq!(node.scalar(), "hasPrefix");
    assert_eq!(node.node_type(), NodeType::Expression);
    assert_eq!(
        node.shape(),
        vec![
            KeyNode::new("text", reference("name")),
            KeyNode::new("prefix", literal("a")),
        ]
    );

    let node = call("fn", vec![literal(1_i64)]);
    assert_eq!(
        node.shape(),
        vec![
            KeyNode::positional(literal("fn")),
            KeyNode::positional(literal(1_i64)),
        ]
    );

    let node = reference("a.b");
    assert_eq!(node.scalar(), "a.b");
    assert_eq!(node.node_type(), NodeType::Reference);
    assert!(node.shape().is_empty());
}

#[test]
fn test_time_literal_shape() {
    let at = DateTime::parse_from_rfc3339("2024-03-01T10:00:00+02:00").unwrap();
    let node = time(at);
    assert_eq!(node.scalar(), "time");
    assert_eq!(node.node_type(), NodeType::Expression);
    assert_eq!(
        node.shape(),
        vec![KeyNode::positional(literal("2024-03-01T10:00:00+02:00"))]
    );
    assert!(time("not a time").as_invalid().is_some());
}

#[test]
fn test_structural_equality() {
    assert_eq!(age_rule(), age_rule());
    assert_ne!(
        greater(literal(1_i64), literal(2_i64)),
        greater_or_equal(literal(1_i64), literal(2_i64))
    );
    assert_ne!(literal(1_i64), literal(1_i32));
}

#[test]
fn test_walk_visits_pre_order() {
    let mut scalars = Vec::new();
    let completed = age_rule().walk(&mut |node| {
        scalars.push(node.scalar().to_string());
        true
    });
    assert!(completed);
    assert_eq!(
        scalars,
        vec!["if", "gte", "person.age", "literal", "literal", "literal"]
    );
}

#[test]
fn test_walk_stops_early() {
    let mut visited = 0;
    let completed = age_rule().walk(&mut |node| {
        visited += 1;
        node.node_type() != NodeType::Reference
    });
    assert!(!completed);
    assert_eq!(visited, 3);
}

// ============================================================================
// Custom nodes
// ============================================================================

#[derive(Debug)]
struct Double(Expr);

impl Node for Double {
    fn scalar(&self) -> &str {
        "double"
    }

    fn node_type(&self) -> NodeType {
        NodeType::Expression
    }

    fn shape(&self) -> Vec<KeyNode> {
        vec![KeyNode::positional(self.0.clone())]
    }

    fn eval(&self, scope: &Scope) -> Result<Literal, Error> {
        match scope.compute(&self.0) {
            Ok(Value::I64(value)) => Ok(Literal::new(value * 2)),
            Ok(other) => Err(Error::custom(format!("cannot double {}", other.kind()))),
            Err(err) => Err(Error::Node(NodeError::new("double", err))),
        }
    }
}

#[test]
fn test_custom_node_composes_with_builtins() {
    let rule = equal(Expr::custom(Double(literal(4_i64))), literal(8_i64));
    assert_eq!(Scope::new().compute(&rule), Ok(Value::Bool(true)));
    assert_eq!(
        Expr::custom(Double(literal(1_i64))),
        Expr::custom(Double(literal(1_i64)))
    );
}
