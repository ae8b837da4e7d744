use std::collections::BTreeSet;

use kindred_registry::{
    template::{Stub, TypeclassDeclaration},
    Registry,
};
use kindred_term::{
    binding::Binding, constructor::Constructor, declaration::Signature,
    predicate::Predicate, Placeholder, TypeExpr, Variable,
};
use proptest::{prop_assert_eq, proptest, sample::subsequence};

use crate::{
    diagnostic::QueryError, marker_name, synthesize, Constraint, Marker,
    MarkerTable,
};

fn ty(name: &str) -> TypeExpr { TypeExpr::symbol(name) }

fn concrete(name: &str) -> Constructor { Constructor::concrete(ty(name)) }

fn option_of(ty: TypeExpr) -> Constructor {
    Constructor::concrete(TypeExpr::applied("Option", vec![ty]))
}

fn predicate(typeclass: &str, arguments: Vec<Constructor>) -> Predicate {
    Predicate::new(typeclass.to_owned(), arguments)
}

fn marker(
    typeclass: &str,
    generic_parameters: &[&str],
    where_clause: Vec<Predicate>,
    subject: Vec<Constructor>,
) -> Marker {
    Marker::new(
        marker_name(typeclass),
        typeclass.to_owned(),
        generic_parameters.iter().map(|name| Variable::from(*name)).collect(),
        where_clause,
        subject,
        true,
    )
}

fn t() -> TypeExpr { TypeExpr::variable("T") }

#[test]
fn name_is_derived_from_typeclass() {
    assert_eq!(marker_name("Monoid"), "isMonoid");
    assert_eq!(marker_name("Functor"), "isFunctor");
}

#[test]
fn synthesize_from_template() {
    let mut registry = Registry::new();
    let template = registry
        .declare(TypeclassDeclaration::new(
            "Monoid".to_owned(),
            vec![Placeholder::ordinary("A")],
            vec![Stub::new(
                "mempty".to_owned(),
                Signature::monomorphic(Vec::new(), TypeExpr::placeholder("A")),
            )
            .into()],
            true,
        ))
        .unwrap();

    let binding = Binding::new().with("A", concrete("string"));
    let marker = synthesize(&template, &binding, &[], &[]).unwrap();

    assert_eq!(marker.name, "isMonoid");
    assert_eq!(marker.subject, vec![concrete("string")]);
    assert!(marker.exported);
    assert_eq!(marker.to_string(), "marker isMonoid[string]");

    assert_eq!(synthesize(&template, &Binding::new(), &[], &[]), None);
}

#[test]
fn concrete_marker() {
    let mut table = MarkerTable::new();
    assert!(table.insert(marker("Monoid", &[], vec![], vec![concrete(
        "string"
    )])));

    assert!(table
        .satisfies(&predicate("Monoid", vec![concrete("string")]))
        .unwrap());
    assert!(!table
        .satisfies(&predicate("Monoid", vec![concrete("int")]))
        .unwrap());
    assert!(!table
        .satisfies(&predicate("Semigroup", vec![concrete("string")]))
        .unwrap());
}

#[test]
fn duplicate_marker_is_not_inserted() {
    let mut table = MarkerTable::new();
    let generic = marker(
        "Monoid",
        &["T"],
        vec![predicate("Monoid", vec![Constructor::concrete(t())])],
        vec![option_of(t())],
    );
    let renamed = marker(
        "Monoid",
        &["U"],
        vec![],
        vec![option_of(TypeExpr::variable("U"))],
    );

    assert!(table.insert(generic));
    assert!(table.contains(&renamed));
    assert!(!table.insert(renamed));
    assert_eq!(table.len(), 1);
}

#[test]
fn partial_marker_checks_where_clause() {
    let mut table = MarkerTable::new();
    table.insert(marker("Monoid", &[], vec![], vec![concrete("string")]));
    table.insert(marker(
        "Monoid",
        &["T"],
        vec![predicate("Monoid", vec![Constructor::concrete(t())])],
        vec![option_of(t())],
    ));

    assert!(table
        .satisfies(&predicate("Monoid", vec![option_of(ty("string"))]))
        .unwrap());
    assert!(table
        .satisfies(&predicate("Monoid", vec![option_of(TypeExpr::applied(
            "Option",
            vec![ty("string")]
        ))]))
        .unwrap());
    assert!(!table
        .satisfies(&predicate("Monoid", vec![option_of(ty("int"))]))
        .unwrap());
}

#[test]
fn most_specific_marker_wins() {
    let mut table = MarkerTable::new();
    table.insert(marker("Show", &["T"], vec![], vec![option_of(t())]));
    table.insert(marker("Show", &[], vec![], vec![option_of(ty("int"))]));

    let resolution = table
        .resolve(&predicate("Show", vec![option_of(ty("int"))]))
        .unwrap()
        .unwrap();

    assert!(resolution.marker.generic_parameters.is_empty());

    let resolution = table
        .resolve(&predicate("Show", vec![option_of(ty("bool"))]))
        .unwrap()
        .unwrap();

    assert_eq!(
        resolution.instantiation.get(&Variable::from("T")),
        Some(&ty("bool"))
    );
}

#[test]
fn incomparable_markers_are_ambiguous() {
    let mut table = MarkerTable::new();
    table.insert(marker("Convert", &["T"], vec![], vec![
        Constructor::concrete(t()),
        concrete("int"),
    ]));
    table.insert(marker("Convert", &["U"], vec![], vec![
        concrete("int"),
        Constructor::concrete(TypeExpr::variable("U")),
    ]));

    assert!(matches!(
        table.resolve(&predicate("Convert", vec![
            concrete("int"),
            concrete("int")
        ])),
        Err(QueryError::Ambiguous(_))
    ));

    assert!(table
        .satisfies(&predicate("Convert", vec![
            concrete("string"),
            concrete("int")
        ]))
        .unwrap());
}

#[test]
fn recursive_where_clause_overflows() {
    let mut table = MarkerTable::new().with_max_depth(8);
    table.insert(marker(
        "Loop",
        &["T"],
        vec![predicate("Loop", vec![option_of(t())])],
        vec![Constructor::concrete(t())],
    ));

    let error =
        table.resolve(&predicate("Loop", vec![concrete("int")])).unwrap_err();

    assert_eq!(error.as_overflow().map(|x| x.max_depth), Some(8));
}

#[test]
fn constructor_marker() {
    let mut table = MarkerTable::new();
    table.insert(marker("Functor", &[], vec![], vec![Constructor::symbol(
        "Option", 1,
    )]));

    assert!(table
        .satisfies(&predicate("Functor", vec![Constructor::symbol(
            "Option", 1
        )]))
        .unwrap());
    assert!(!table
        .satisfies(&predicate("Functor", vec![Constructor::symbol("seq", 1)]))
        .unwrap());
    // same template but a plain type, not a constructor
    assert!(!table
        .satisfies(&predicate("Functor", vec![concrete("Option")]))
        .unwrap());
}

#[test]
fn constraints() {
    let mut table = MarkerTable::new();
    table.insert(marker("Monoid", &[], vec![], vec![concrete("string")]));
    table.insert(marker("Show", &[], vec![], vec![concrete("int")]));

    let monoid_string: Constraint =
        predicate("Monoid", vec![concrete("string")]).into();
    let monoid_int: Constraint =
        predicate("Monoid", vec![concrete("int")]).into();
    let show_int: Constraint = predicate("Show", vec![concrete("int")]).into();

    assert!(table
        .holds(&monoid_string.clone().and(show_int.clone()))
        .unwrap());
    assert!(!table.holds(&monoid_int.clone().and(show_int.clone())).unwrap());
    assert!(table.holds(&monoid_int.clone().or(show_int)).unwrap());
    assert!(table.holds(&monoid_int.clone().negate()).unwrap());
    assert!(!table.holds(&monoid_string.clone().negate()).unwrap());
    assert!(table.holds(&Constraint::All(Vec::new())).unwrap());
    assert!(!table.holds(&Constraint::Any(Vec::new())).unwrap());

    assert_eq!(
        monoid_string.clone().and(monoid_int.clone().or(monoid_string).negate())
            .to_string(),
        "Monoid[string] & !(Monoid[int] | Monoid[string])"
    );
    assert_eq!(monoid_int.negate().negate().to_string(), "!!Monoid[int]");
}

const TYPES: &[&str] = &["int", "string", "bool", "float", "char", "unit"];

proptest! {
    #[test]
    fn marker_presence(
        instantiated in subsequence(TYPES, 0..=TYPES.len()),
        query in proptest::sample::select(TYPES),
    ) {
        let mut table = MarkerTable::new();

        for name in &instantiated {
            table.insert(marker("Monoid", &[], vec![], vec![concrete(name)]));
        }

        let expected =
            instantiated.iter().copied().collect::<BTreeSet<_>>().contains(query);

        prop_assert_eq!(
            table.satisfies(&predicate("Monoid", vec![concrete(query)])),
            Ok(expected)
        );
    }
}
