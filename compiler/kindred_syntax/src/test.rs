use kindred_marker::Constraint;
use kindred_registry::{options::ExportSet, template::MemberTemplate};
use kindred_term::{
    constructor::Constructor, expression::Expr, predicate::Predicate, Hole,
    Placeholder, Tuple, TypeExpr, Variable,
};
use proptest::{
    collection::vec, prop_assert_eq, prop_oneof, proptest, strategy::Just,
    strategy::Strategy,
};

use crate::{
    error::Error, parse_constraint, parse_constructor, parse_expression,
    parse_options, parse_placeholders, parse_type, parse_unit,
    parser::DEFAULT_MAX_NESTING_DEPTH, Item, Parser,
};

const PRELUDE: &str = r#"
# the classic one
export typeclass Monoid[A] {
    required mempty(): A;
    required mappend(a: A, b: A): A;
    default mconcat(items: seq[A]): A = fold(mappend, mempty(), items);
}

typeclass Functor[F[_]] {
    required fmap[A, B](fa: F[A], f: (A) -> B): F[B];
    default fmap2[A, B](fa: F[A], b: B): F[B] = fmap(fa, const[A, B](b));
}

typeclass Traversable[T[_]] {
    instance Functor[T] exporting(_);
}

def mempty(): string = "";
def mappend(a: string, b: string): string = concat(a, b);
instance Monoid[string] exporting(_);
instance[T] Monoid[Option[T]] where Monoid[T] skipping(mconcat);
"#;

fn int() -> TypeExpr { TypeExpr::symbol("int") }

#[test]
fn types() {
    assert_eq!(
        parse_type("seq[Option[int]]").unwrap(),
        TypeExpr::applied("seq", vec![TypeExpr::applied("Option", vec![int()])])
    );
    assert_eq!(
        parse_type("(int, string) -> bool").unwrap(),
        TypeExpr::function(
            vec![int(), TypeExpr::symbol("string")],
            TypeExpr::symbol("bool")
        )
    );
    assert_eq!(parse_type("()").unwrap(), TypeExpr::default());
    assert_eq!(
        parse_type("(int,)").unwrap(),
        TypeExpr::Tuple(Tuple::new(vec![int()]))
    );
    assert_eq!(parse_type("(int)").unwrap(), int());
}

#[test]
fn constructors() {
    let option = parse_constructor("Option[_]").unwrap();
    assert_eq!(option.arity(), 1);
    assert_eq!(option.apply(&[int()]), Some(TypeExpr::applied("Option", vec![int()])));

    let flipped = parse_constructor("Pair[_1, _0]").unwrap();
    assert_eq!(
        flipped.apply(&[int(), TypeExpr::symbol("string")]),
        Some(TypeExpr::applied("Pair", vec![TypeExpr::symbol("string"), int()]))
    );

    let sequential = parse_constructor("Pair[_, _]").unwrap();
    assert_eq!(sequential.arity(), 2);
    assert_eq!(sequential.to_string(), "Pair[_, _1]");

    assert_eq!(parse_constructor("int").unwrap(), Constructor::concrete(int()));
}

#[test]
fn hole_outside_of_a_constructor() {
    let error = parse_type("Option[_]").unwrap_err();

    assert_eq!(error.as_unexpected_hole().map(|error| error.span.start), Some(7));
}

#[test]
fn placeholders() {
    assert_eq!(
        parse_placeholders("[A, F[_], G[_, _]]").unwrap(),
        vec![
            Placeholder::ordinary("A"),
            Placeholder::constructor("F", 1),
            Placeholder::constructor("G", 2),
        ]
    );
    assert!(parse_placeholders("[F[A]]").unwrap_err().is_unexpected_token());
}

#[test]
fn options() {
    let options = parse_options("skipping(mconcat, mempty) exporting(_)").unwrap();

    assert!(options.is_skipped("mconcat"));
    assert!(options.is_skipped("mempty"));
    assert_eq!(options.export, ExportSet::All);

    let options = parse_options("exporting(fmap2)").unwrap();
    assert!(options.is_exported("fmap2"));
    assert!(!options.is_exported("fmap"));

    assert_eq!(parse_options("").unwrap(), Default::default());
}

#[test]
fn constraints() {
    let monoid = Predicate::new("Monoid".to_owned(), vec![Constructor::concrete(int())]);
    let functor = Predicate::new(
        "Functor".to_owned(),
        vec![Constructor::symbol("seq", 1)],
    );

    assert_eq!(
        parse_constraint("Monoid[int] & !Functor[seq[_]] | false").unwrap(),
        Constraint::Any(vec![
            Constraint::All(vec![
                monoid.clone().into(),
                Constraint::from(functor).negate(),
            ]),
            Constraint::Any(Vec::new()),
        ])
    );
    assert_eq!(
        parse_constraint("(true)").unwrap(),
        Constraint::All(Vec::new())
    );
    assert_eq!(parse_constraint("Monoid[int]").unwrap(), monoid.into());
}

#[test]
fn expressions() {
    let expression =
        parse_expression("map_seq([1, -2; int], fn(x: int): int => mul(x, x))")
            .unwrap();

    assert_eq!(
        expression.to_string(),
        "map_seq([1, -2; int], fn(x: int): int => mul(x, x))"
    );

    let lambda = expression.as_call().unwrap().arguments[1].as_lambda().unwrap();
    let body = lambda.body.as_call().unwrap();
    assert_eq!(body.arguments, vec![Expr::local("x"), Expr::local("x")]);

    assert_eq!(
        parse_expression("[; string]").unwrap().to_string(),
        "[; string]"
    );
    assert!(parse_expression("add").unwrap().is_function());
}

#[test]
fn unit() {
    let items = parse_unit(PRELUDE).unwrap();
    assert_eq!(items.len(), 7);

    let monoid = items[0].as_typeclass().unwrap().declaration();
    assert!(monoid.exported);
    assert_eq!(monoid.placeholders, vec![Placeholder::ordinary("A")]);
    assert_eq!(
        monoid.members.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec![
            "required mempty(): A;",
            "required mappend(a: A, b: A): A;",
            "default mconcat(items: seq[A]): A = fold(mappend, mempty(), items);",
        ]
    );

    let mconcat = monoid.members[2].as_default().unwrap();
    let fold = mconcat.body.as_call().unwrap();
    assert!(fold.arguments[0].is_function());
    assert!(fold.arguments[1].is_call());
    assert!(fold.arguments[2].is_local());

    let functor = items[1].as_typeclass().unwrap().declaration();
    assert!(!functor.exported);
    let fmap = functor.members[0].as_required().unwrap();
    assert_eq!(
        fmap.signature.parameters[0].r#type,
        TypeExpr::applied_placeholder("F", vec![TypeExpr::variable("A")])
    );
    assert_eq!(
        fmap.signature.describe(&fmap.name),
        "fmap[A, B](fa: F[A], f: (A) -> B): F[B]"
    );

    let traversable = items[2].as_typeclass().unwrap().declaration();
    let MemberTemplate::Instance(nested) = &traversable.members[0] else {
        panic!("expected a nested instance");
    };
    assert_eq!(nested.typeclass, "Functor");
    assert_eq!(
        nested.arguments,
        vec![Constructor::template_of(
            1,
            TypeExpr::applied_placeholder("T", vec![TypeExpr::Hole(Hole(0))])
        )]
    );
    assert_eq!(nested.options.export, ExportSet::All);

    let mempty = items[3].as_definition().unwrap().declaration();
    assert_eq!(mempty.to_string(), "mempty(): string = \"\"");

    let partial = items[6].as_instance().unwrap();
    assert_eq!(partial.typeclass(), "Monoid");
    assert_eq!(partial.generic_parameters(), &vec![Variable::from("T")]);
    assert_eq!(
        partial.arguments(),
        &vec![Constructor::concrete(TypeExpr::applied(
            "Option",
            vec![TypeExpr::variable("T")]
        ))]
    );
    assert_eq!(
        partial.where_clause(),
        &vec![Predicate::new(
            "Monoid".to_owned(),
            vec![Constructor::concrete(TypeExpr::variable("T"))]
        )]
    );
    assert!(partial.options().is_skipped("mconcat"));

    let span = items[4].span();
    assert_eq!(
        &PRELUDE[span.start..span.end],
        "def mappend(a: string, b: string): string = concat(a, b);"
    );
}

#[test]
fn variables_take_no_arguments() {
    let error = parse_unit("def f[T](x: T[int]): int = 1;").unwrap_err();

    let Error::AppliedVariable(error) = error else {
        panic!("expected an applied variable, got {error:?}");
    };
    assert_eq!(error.name, "T");
}

#[test]
fn syntax_errors() {
    let error = parse_unit("def f(): int = 1").unwrap_err();
    assert_eq!(error.to_string(), "expected `;`, found the end of the input");

    let error = parse_unit("typeclass Show[A] { show(a: A): string; }").unwrap_err();
    assert_eq!(
        error.to_string(),
        "expected a typeclass member, found identifier `show`"
    );

    let error = parse_expression("\"open").unwrap_err();
    assert!(error.is_unterminated_string_literal());
    assert_eq!(
        kindred_diagnostic::Report::report(&error, ()).span,
        Some(kindred_diagnostic::Span::new(0, 5))
    );

    assert!(parse_expression("1 $ 2").unwrap_err().is_unexpected_character());
    assert!(parse_expression("99999999999999999999")
        .unwrap_err()
        .is_integer_overflow());
}

#[test]
fn deep_nesting_is_an_error() {
    let depth = 200_000;
    let ty = format!("{}int{}", "seq[".repeat(depth), "]".repeat(depth));

    let error = parse_type(&ty).unwrap_err();
    let error = error.into_nesting_too_deep().unwrap();
    assert_eq!(error.max_depth, DEFAULT_MAX_NESTING_DEPTH);
    assert_eq!(
        error.span.start,
        "seq[".len() * DEFAULT_MAX_NESTING_DEPTH
    );

    let constraint = format!("{}Eq[int]", "!(".repeat(depth));
    assert!(parse_constraint(&constraint).unwrap_err().is_nesting_too_deep());

    let expression = format!("{}1{}", "f(".repeat(depth), ")".repeat(depth));
    assert!(parse_expression(&expression).unwrap_err().is_nesting_too_deep());
}

#[test]
fn nesting_limit_is_configurable() {
    let parse = |source: &str| {
        Parser::new(source)
            .unwrap()
            .with_max_nesting_depth(3)
            .finish(Parser::parse_type)
    };

    assert_eq!(
        parse("seq[seq[int]]").unwrap(),
        TypeExpr::applied("seq", vec![TypeExpr::applied("seq", vec![int()])])
    );
    assert!(parse("seq[seq[seq[int]]]").unwrap_err().is_nesting_too_deep());
    assert!(parse("(int, (int, (int)))").unwrap_err().is_nesting_too_deep());

    let error = Parser::new("def f(): seq[seq[int]] = 1;")
        .unwrap()
        .with_max_nesting_depth(2)
        .finish(Parser::parse_items)
        .unwrap_err();
    assert!(error.is_nesting_too_deep());
    assert!(
        kindred_diagnostic::Report::report(&error, ()).help_message.is_some()
    );
}

fn concrete_type() -> impl Strategy<Value = TypeExpr> {
    let leaf = prop_oneof![Just("int"), Just("string"), Just("bool")]
        .prop_map(TypeExpr::symbol);

    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (
                prop_oneof![Just("seq"), Just("Option"), Just("Pair")],
                vec(inner.clone(), 1..3)
            )
                .prop_map(|(name, arguments)| TypeExpr::applied(name, arguments)),
            (vec(inner.clone(), 0..3), inner.clone()).prop_map(
                |(parameters, return_type)| {
                    TypeExpr::function(parameters, return_type)
                }
            ),
            vec(inner, 0..3)
                .prop_map(|elements| TypeExpr::Tuple(Tuple::new(elements))),
        ]
    })
}

proptest! {
    #[test]
    fn displayed_types_parse_back(ty in concrete_type()) {
        prop_assert_eq!(parse_type(&ty.to_string()).unwrap(), ty);
    }
}
