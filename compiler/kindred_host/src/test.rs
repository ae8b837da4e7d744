use kindred_instance::{Generator, InstanceRequest};
use kindred_registry::{
    options::InstanceOptions,
    template::{Stub, TypeclassDeclaration},
    Registry,
};
use kindred_term::{
    binding::Binding,
    constructor::Constructor,
    declaration::{Declaration, Parameter, Signature},
    expression::{Call, Callee, Expr, Lambda, Sequence},
    predicate::Predicate,
    Placeholder, TypeExpr, Variable,
};
use proptest::{collection::vec, prop_assert_eq, proptest};

use crate::{
    diagnostic::{EvaluationError, ResolutionError},
    scope::Origin,
    Evaluator, Scope, Value,
};

fn a() -> TypeExpr { TypeExpr::placeholder("A") }

fn t() -> TypeExpr { TypeExpr::variable("T") }

fn int() -> TypeExpr { TypeExpr::symbol("int") }

fn string() -> TypeExpr { TypeExpr::symbol("string") }

fn seq(element: TypeExpr) -> TypeExpr { TypeExpr::applied("seq", vec![element]) }

fn parameter(name: &str, ty: TypeExpr) -> Parameter {
    Parameter::new(name.to_owned(), ty)
}

fn signature(
    generics: &[&str],
    parameters: Vec<Parameter>,
    return_type: TypeExpr,
) -> Signature {
    Signature::new(
        generics.iter().map(|name| Variable::from(*name)).collect(),
        parameters,
        return_type,
        Vec::new(),
    )
}

fn declaration(name: &str, signature: Signature, body: Expr) -> Declaration {
    Declaration::new(name.to_owned(), signature, body)
}

fn ints(items: &[i64]) -> Value {
    Value::sequence(int(), items.iter().copied().map(Value::Int).collect())
}

fn monoid() -> TypeclassDeclaration {
    TypeclassDeclaration::new(
        "Monoid".to_owned(),
        vec![Placeholder::ordinary("A")],
        vec![
            Stub::new("mempty".to_owned(), signature(&[], vec![], a())).into(),
            Stub::new(
                "mappend".to_owned(),
                signature(&[], vec![parameter("a", a()), parameter("b", a())], a()),
            )
            .into(),
            declaration(
                "mconcat",
                signature(&[], vec![parameter("items", seq(a()))], a()),
                Expr::call("fold", vec![
                    Expr::function("mappend"),
                    Expr::call("mempty", Vec::new()),
                    Expr::local("items"),
                ]),
            )
            .into(),
        ],
        true,
    )
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.declare(monoid()).unwrap();
    registry
}

fn define_string_monoid(scope: &mut Scope) {
    scope
        .define(declaration(
            "mempty",
            signature(&[], vec![], string()),
            Expr::string(""),
        ))
        .unwrap();
    scope
        .define(declaration(
            "mappend",
            signature(
                &[],
                vec![parameter("a", string()), parameter("b", string())],
                string(),
            ),
            Expr::call("concat", vec![Expr::local("a"), Expr::local("b")]),
        ))
        .unwrap();
}

fn instantiate(registry: &Registry, scope: &mut Scope, request: &InstanceRequest) {
    let instance = Generator::new(registry, &*scope).instantiate(request).unwrap();
    scope.commit(instance).unwrap();
}

#[test]
fn builtins() {
    let scope = Scope::with_builtins();
    let evaluator = Evaluator::new(&scope);

    assert_eq!(
        evaluator
            .call("concat", Vec::new(), vec![Value::string("a"), Value::string("b")])
            .unwrap(),
        Value::string("ab")
    );
    assert_eq!(
        evaluator
            .call("fold", Vec::new(), vec![
                evaluator.evaluate(&Expr::function("add")).unwrap(),
                Value::Int(0),
                ints(&[1, 2, 3]),
            ])
            .unwrap(),
        Value::Int(6)
    );
    assert_eq!(
        evaluator.call("none", vec![int()], Vec::new()).unwrap(),
        Value::none(int())
    );
    assert!(evaluator
        .call("add", Vec::new(), vec![Value::Int(i64::MAX), Value::Int(1)])
        .unwrap_err()
        .is_arithmetic_overflow());
}

#[test]
fn undetermined_generic_parameter() {
    let scope = Scope::with_builtins();
    let error = Evaluator::new(&scope).call("none", Vec::new(), Vec::new());

    let Err(EvaluationError::Resolution(ResolutionError::CannotInfer(error))) =
        error
    else {
        panic!("expected an inference failure, got {error:?}");
    };

    assert_eq!(error.name, "none");
    assert_eq!(error.variable, Variable::from("T"));
}

#[test]
fn redefinition() {
    let mut scope = Scope::new();
    let show = |generics: &[&str], ty: TypeExpr, name: &str| {
        declaration(
            "show",
            signature(generics, vec![parameter(name, ty)], string()),
            Expr::string("x"),
        )
    };

    scope.define(show(&["T"], t(), "x")).unwrap();
    scope.define(show(&[], int(), "x")).unwrap();

    let error = scope
        .define(show(&["U"], TypeExpr::variable("U"), "y"))
        .unwrap_err();

    assert_eq!(error.name, "show");
    assert_eq!(error.existing, signature(&["T"], vec![parameter("x", t())], string()));
    assert_eq!(scope.overloads("show").count(), 2);
}

#[test]
fn most_specific_overload() {
    let mut scope = Scope::with_builtins();
    scope
        .define(declaration(
            "show",
            signature(&["T"], vec![parameter("x", t())], string()),
            Expr::string("any"),
        ))
        .unwrap();
    scope
        .define(declaration(
            "show",
            signature(&[], vec![parameter("x", int())], string()),
            Expr::string("int"),
        ))
        .unwrap();

    let evaluator = Evaluator::new(&scope);

    assert_eq!(
        evaluator.call("show", Vec::new(), vec![Value::Int(1)]).unwrap(),
        Value::string("int")
    );
    assert_eq!(
        evaluator.call("show", Vec::new(), vec![Value::string("a")]).unwrap(),
        Value::string("any")
    );
}

#[test]
fn ambiguous_overload() {
    let mut scope = Scope::new();
    scope
        .define(declaration(
            "pick",
            signature(
                &["T"],
                vec![parameter("x", t()), parameter("y", int())],
                int(),
            ),
            Expr::local("y"),
        ))
        .unwrap();
    scope
        .define(declaration(
            "pick",
            signature(
                &["T"],
                vec![parameter("x", int()), parameter("y", t())],
                int(),
            ),
            Expr::local("x"),
        ))
        .unwrap();

    let error = Evaluator::new(&scope)
        .call("pick", Vec::new(), vec![Value::Int(1), Value::Int(2)])
        .unwrap_err();

    let EvaluationError::Resolution(ResolutionError::AmbiguousOverload(error)) =
        error
    else {
        panic!("expected an ambiguity, got {error:?}");
    };

    assert_eq!(error.candidates.len(), 2);
}

#[test]
fn generated_members_run() {
    let registry = registry();
    let mut scope = Scope::with_builtins();
    define_string_monoid(&mut scope);

    instantiate(
        &registry,
        &mut scope,
        &InstanceRequest::concrete(
            "Monoid",
            Binding::new().with("A", Constructor::concrete(string())),
        ),
    );

    let evaluator = Evaluator::new(&scope);
    let words = |items: &[&str]| {
        Value::sequence(string(), items.iter().copied().map(Value::string).collect())
    };

    assert_eq!(
        evaluator.call("mconcat", Vec::new(), vec![words(&["a", "b", "c"])]).unwrap(),
        Value::string("abc")
    );
    assert_eq!(
        evaluator.call("mconcat", Vec::new(), vec![words(&[])]).unwrap(),
        Value::string("")
    );

    let (_, mconcat) = scope
        .functions()
        .find(|(_, function)| function.name() == "mconcat")
        .unwrap();
    assert_eq!(mconcat.origin(), &Origin::Generated("Monoid".to_owned()));
    assert_eq!(scope.exported().count(), 2);
}

#[test]
fn partial_instance_uses_the_caller_generics() {
    let registry = registry();
    let mut scope = Scope::with_builtins();
    define_string_monoid(&mut scope);

    scope
        .define(declaration(
            "mempty",
            signature(&["T"], vec![], seq(t())),
            Expr::Call(Call::new(Callee::new("empty".to_owned(), vec![t()], None), Vec::new())),
        ))
        .unwrap();
    scope
        .define(declaration(
            "mappend",
            signature(
                &["T"],
                vec![parameter("a", seq(t())), parameter("b", seq(t()))],
                seq(t()),
            ),
            Expr::call("fold", vec![
                Expr::Function(Callee::new("append".to_owned(), vec![t()], None)),
                Expr::local("a"),
                Expr::local("b"),
            ]),
        ))
        .unwrap();

    for request in [
        InstanceRequest::concrete(
            "Monoid",
            Binding::new().with("A", Constructor::concrete(string())),
        ),
        InstanceRequest::new(
            "Monoid".to_owned(),
            Binding::new().with("A", Constructor::concrete(seq(t()))),
            vec![Variable::from("T")],
            Vec::new(),
            InstanceOptions::default(),
        ),
    ] {
        instantiate(&registry, &mut scope, &request);
    }

    let evaluator = Evaluator::new(&scope);
    let nested = Value::sequence(seq(int()), vec![ints(&[1, 2]), ints(&[]), ints(&[3])]);

    assert_eq!(
        evaluator.call("mconcat", Vec::new(), vec![nested]).unwrap(),
        ints(&[1, 2, 3])
    );
    assert_eq!(
        evaluator
            .call("mconcat", Vec::new(), vec![Value::sequence(seq(int()), Vec::new())])
            .unwrap(),
        ints(&[])
    );
}

#[test]
fn where_clause_filters_candidates() {
    let registry = registry();
    let mut scope = Scope::with_builtins();
    define_string_monoid(&mut scope);

    scope
        .define(declaration(
            "combine",
            Signature::new(
                vec![Variable::from("T")],
                vec![parameter("x", t())],
                t(),
                vec![Predicate::new("Monoid".to_owned(), vec![Constructor::concrete(t())])],
            ),
            Expr::local("x"),
        ))
        .unwrap();

    assert!(Evaluator::new(&scope)
        .call("combine", Vec::new(), vec![Value::string("a")])
        .unwrap_err()
        .as_resolution()
        .is_some_and(ResolutionError::is_no_matching_overload));

    instantiate(
        &registry,
        &mut scope,
        &InstanceRequest::concrete(
            "Monoid",
            Binding::new().with("A", Constructor::concrete(string())),
        ),
    );

    let evaluator = Evaluator::new(&scope);

    assert_eq!(
        evaluator.call("combine", Vec::new(), vec![Value::string("a")]).unwrap(),
        Value::string("a")
    );
    assert!(evaluator
        .call("combine", Vec::new(), vec![Value::Int(1)])
        .is_err());
}

#[test]
fn commit_is_all_or_nothing() {
    let registry = registry();
    let mut scope = Scope::with_builtins();
    define_string_monoid(&mut scope);
    scope
        .define(declaration(
            "mconcat",
            signature(&[], vec![parameter("words", seq(string()))], string()),
            Expr::string("hand-written"),
        ))
        .unwrap();

    let instance = Generator::new(&registry, &scope)
        .instantiate(&InstanceRequest::concrete(
            "Monoid",
            Binding::new().with("A", Constructor::concrete(string())),
        ))
        .unwrap();

    let before = scope.functions().count();
    let error = scope.commit(instance).unwrap_err();

    assert_eq!(error.name, "mconcat");
    assert_eq!(scope.functions().count(), before);
    assert!(scope.markers().is_empty());
}

#[test]
fn lambdas_capture_locals() {
    let mut scope = Scope::with_builtins();
    scope
        .define(declaration(
            "scale",
            signature(
                &[],
                vec![parameter("k", int()), parameter("items", seq(int()))],
                seq(int()),
            ),
            Expr::call("map_seq", vec![
                Expr::local("items"),
                Expr::Lambda(Lambda::new(
                    vec![parameter("x", int())],
                    int(),
                    Box::new(Expr::call("mul", vec![
                        Expr::local("k"),
                        Expr::local("x"),
                    ])),
                )),
            ]),
        ))
        .unwrap();

    let evaluator = Evaluator::new(&scope);

    assert_eq!(
        evaluator
            .call("scale", Vec::new(), vec![Value::Int(3), ints(&[1, 2])])
            .unwrap(),
        ints(&[3, 6])
    );
    assert_eq!(
        evaluator
            .evaluate(&Expr::call("scale", vec![
                Expr::int(2),
                Expr::Sequence(Sequence::new(int(), vec![Expr::int(5)])),
            ]))
            .unwrap(),
        ints(&[10])
    );
}

#[test]
fn call_depth_is_bounded() {
    let mut scope = Scope::new();
    scope
        .define(declaration(
            "spin",
            signature(&[], vec![parameter("x", int())], int()),
            Expr::call("spin", vec![Expr::local("x")]),
        ))
        .unwrap();

    let error = Evaluator::new(&scope)
        .with_max_depth(16)
        .call("spin", Vec::new(), vec![Value::Int(0)])
        .unwrap_err();

    assert_eq!(
        error.as_call_depth_exceeded().map(|error| error.max_depth),
        Some(16)
    );
}

#[test]
fn local_that_is_not_a_function() {
    let mut scope = Scope::new();
    scope
        .define(declaration(
            "apply",
            signature(&[], vec![parameter("f", int())], int()),
            Expr::call("f", Vec::new()),
        ))
        .unwrap();

    assert!(Evaluator::new(&scope)
        .call("apply", Vec::new(), vec![Value::Int(1)])
        .unwrap_err()
        .is_not_callable());
}

proptest! {
    #[test]
    fn fold_add_sums(items in vec(-1000i64..1000, 0..16)) {
        let scope = Scope::with_builtins();
        let evaluator = Evaluator::new(&scope);
        let add = evaluator.evaluate(&Expr::function("add")).unwrap();

        let sum = evaluator
            .call("fold", Vec::new(), vec![add, Value::Int(0), ints(&items)])
            .unwrap();

        prop_assert_eq!(sum, Value::Int(items.iter().sum()));
    }
}

#[test]
fn repeated_instance_keeps_one_marker() {
    let registry = registry();
    let mut scope = Scope::with_builtins();
    define_string_monoid(&mut scope);

    let request = InstanceRequest::concrete(
        "Monoid",
        Binding::new().with("A", Constructor::concrete(string())),
    )
    .with_options(InstanceOptions::default().skipping(["mconcat"]));

    instantiate(&registry, &mut scope, &request);
    instantiate(&registry, &mut scope, &request);

    assert_eq!(scope.markers().len(), 1);
    assert!(scope
        .satisfies(&Predicate::new("Monoid".to_owned(), vec![
            Constructor::concrete(string())
        ]))
        .unwrap());
}
