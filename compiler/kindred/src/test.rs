use kindred_diagnostic::Diagnostic;
use kindred_handler::{Handler, Logger, Panic, Storage};
use kindred_host::{scope::Origin, Value};
use kindred_instance::InstanceRequest;
use kindred_registry::options::InstanceOptions;
use kindred_term::{binding::Binding, constructor::Constructor, TypeExpr};
use proptest::{prop_assert, prop_assert_eq, proptest};

use crate::{Config, Unit};

const MONOID: &str = r#"
export typeclass Monoid[A] {
    required mempty(): A;
    required mappend(a: A, b: A): A;
    default mconcat(items: seq[A]): A = fold(mappend, mempty(), items);
}
"#;

const STRING_MONOID: &str = r#"
def mempty(): string = "";
def mappend(a: string, b: string): string = concat(a, b);
"#;

fn unit(handler: &dyn Handler<Diagnostic>) -> Unit<'_> {
    let _ = env_logger::builder().is_test(true).try_init();

    Unit::new(Config::default(), handler)
}

fn int() -> TypeExpr { TypeExpr::symbol("int") }

fn string() -> TypeExpr { TypeExpr::symbol("string") }

fn seq(element: TypeExpr) -> TypeExpr { TypeExpr::applied("seq", vec![element]) }

fn ints(items: &[i64]) -> Value {
    Value::sequence(int(), items.iter().copied().map(Value::Int).collect())
}

#[test]
fn monoid() {
    let mut unit = unit(&Panic);
    unit.declare_source(MONOID).unwrap();
    unit.declare_source(STRING_MONOID).unwrap();
    unit.declare_source("instance Monoid[string];").unwrap();

    assert_eq!(
        unit.evaluate(r#"mconcat(["a", "b", "c"; string])"#).unwrap(),
        Value::string("abc")
    );
    assert_eq!(
        unit.evaluate("mconcat([; string])").unwrap(),
        Value::string("")
    );

    let (_, mconcat) = unit
        .scope()
        .functions()
        .find(|(_, function)| function.name() == "mconcat")
        .unwrap();
    assert_eq!(mconcat.origin(), &Origin::Generated("Monoid".to_owned()));
    assert!(mconcat.visibility().is_local());

    assert!(unit.satisfies("Monoid[string]").unwrap());
    assert!(!unit.satisfies("Monoid[int]").unwrap());
}

#[test]
fn functor() {
    let mut unit = unit(&Panic);
    unit.declare_source(
        r"
        typeclass Functor[F[_]] {
            required fmap[A, B](fa: F[A], f: (A) -> B): F[B];
            default fmap2[A, B](fa: F[A], b: B): F[B] = fmap(fa, const[A, B](b));
        }

        def fmap[A, B](fa: Option[A], f: (A) -> B): Option[B] = map_option(fa, f);
        instance Functor[Option];
        ",
    )
    .unwrap();

    let fmap2 = unit.scope().overloads("fmap2").next().unwrap();
    assert_eq!(
        unit.scope().function(fmap2).signature().describe("fmap2"),
        "fmap2[A, B](fa: Option[A], b: B): Option[B]"
    );

    assert_eq!(
        unit.evaluate(r#"fmap2(some("x"), 7)"#).unwrap(),
        Value::some(Value::Int(7))
    );
    assert_eq!(
        unit.evaluate("fmap2(none[string](), true)").unwrap(),
        Value::none(TypeExpr::symbol("bool"))
    );

    assert!(unit.satisfies("Functor[Option]").unwrap());
    assert!(unit.satisfies("Functor[Option[_]]").unwrap());
    assert!(!unit.satisfies("Functor[seq]").unwrap());
}

#[test]
fn skipping_keeps_the_user_definition() {
    let mut unit = unit(&Panic);
    unit.declare_source(MONOID).unwrap();
    unit.declare_source(STRING_MONOID).unwrap();
    unit.declare_source(
        r#"
        def mconcat(items: seq[string]): string = "custom";
        instance Monoid[string] skipping(mconcat);
        "#,
    )
    .unwrap();

    assert_eq!(unit.scope().overloads("mconcat").count(), 1);
    assert_eq!(
        unit.evaluate(r#"mconcat(["a"; string])"#).unwrap(),
        Value::string("custom")
    );
    assert!(unit.satisfies("Monoid[string]").unwrap());
}

#[test]
fn generated_member_colliding_with_a_definition() {
    let storage = Storage::<Diagnostic>::new();
    let mut unit = unit(&storage);
    unit.declare_source(MONOID).unwrap();
    unit.declare_source(STRING_MONOID).unwrap();

    assert!(unit
        .declare_source(
            r#"
            def mconcat(items: seq[string]): string = "custom";
            instance Monoid[string];
            "#,
        )
        .is_err());

    let diagnostics = storage.as_vec();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.starts_with("the function `mconcat"));
    assert!(!unit.satisfies("Monoid[string]").unwrap());
}

#[test]
fn missing_implementation_generates_nothing() {
    let storage = Storage::<Diagnostic>::new();
    let mut unit = unit(&storage);
    unit.declare_source(MONOID).unwrap();

    let source = "def mempty(): int = 0;\ninstance Monoid[int];";
    assert!(unit.declare_source(source).is_err());

    let diagnostics = storage.as_vec();
    assert_eq!(diagnostics.len(), 1);

    let diagnostic = &diagnostics[0];
    assert!(diagnostic.message.contains("`mappend`"));
    assert!(diagnostic.message.contains("mappend(a: int, b: int): int"));

    let span = diagnostic.span.unwrap();
    assert_eq!(&source[span.start..span.end], "instance Monoid[int];");
    assert_eq!(span.location_in(source).unwrap().line_number, 2);

    assert_eq!(unit.scope().overloads("mempty").count(), 1);
    assert_eq!(unit.scope().overloads("mconcat").count(), 0);
    assert!(unit.scope().markers().is_empty());
}

#[test]
fn placeholders_are_bound_independently() {
    let mut unit = unit(&Panic);
    unit.declare_source(
        r"
        typeclass Convert[A, B] {
            required convert(a: A): B;
            default convert_all(items: seq[A]): seq[B] = map_seq(items, convert);
        }

        def convert(a: int): Option[int] = some(a);
        def convert(a: string): seq[string] = append(empty[string](), a);

        instance Convert[int, Option[int]];
        instance Convert[string, seq[string]];
        ",
    )
    .unwrap();

    let option_int = TypeExpr::applied("Option", vec![int()]);

    assert_eq!(
        unit.evaluate("convert_all([1, 2; int])").unwrap(),
        Value::sequence(option_int, vec![
            Value::some(Value::Int(1)),
            Value::some(Value::Int(2)),
        ])
    );
    assert_eq!(
        unit.evaluate(r#"convert_all(["x"; string])"#).unwrap(),
        Value::sequence(seq(string()), vec![Value::sequence(string(), vec![
            Value::string("x")
        ])])
    );

    assert!(unit.satisfies("Convert[int, Option[int]]").unwrap());
    assert!(!unit.satisfies("Convert[Option[int], int]").unwrap());
    assert!(unit
        .satisfies("Convert[string, seq[string]] & !Convert[int, seq[string]]")
        .unwrap());
}

const SEMIGROUP_MONOID: &str = r"
typeclass Semigroup[A] {
    required combine(a: A, b: A): A;
    default twice(a: A): A = combine(a, a);
}

export typeclass Monoid[A] {
    required empty_of(): A;
    required combine(a: A, b: A): A;
    instance Semigroup[A];
    default combine_all(items: seq[A]): A = fold(combine, empty_of(), items);
}
";

#[test]
fn nested_instance() {
    let mut unit = unit(&Panic);
    unit.declare_source(SEMIGROUP_MONOID).unwrap();
    unit.declare_source(
        r"
        def empty_of(): int = 0;
        def combine(a: int, b: int): int = add(a, b);
        instance Monoid[int];
        ",
    )
    .unwrap();

    assert_eq!(unit.evaluate("twice(21)").unwrap(), Value::Int(42));
    assert_eq!(
        unit.evaluate("combine_all([1, 2, 3; int])").unwrap(),
        Value::Int(6)
    );

    let (_, twice) = unit
        .scope()
        .functions()
        .find(|(_, function)| function.name() == "twice")
        .unwrap();
    assert_eq!(twice.origin(), &Origin::Generated("Semigroup".to_owned()));

    assert!(unit.satisfies("Semigroup[int] & Monoid[int]").unwrap());

    let markers = unit.scope().markers();
    assert_eq!(markers.len(), 2);
    assert!(markers
        .iter()
        .all(|marker| marker.exported == (marker.typeclass == "Monoid")));
}

#[test]
fn partial_instance() {
    let mut unit = unit(&Panic);
    unit.declare_source(SEMIGROUP_MONOID).unwrap();
    unit.declare_source(
        r"
        def empty_of[T](): seq[T] = empty[T]();
        def combine[T](a: seq[T], b: seq[T]): seq[T] = fold(append[T], a, b);
        instance[T] Monoid[seq[T]];
        ",
    )
    .unwrap();

    assert_eq!(
        unit.evaluate("combine_all([[1; int], [; int], [2, 3; int]; seq[int]])")
            .unwrap(),
        ints(&[1, 2, 3])
    );
    assert_eq!(
        unit.evaluate(r#"twice(["a"; string])"#).unwrap(),
        Value::sequence(string(), vec![Value::string("a"), Value::string("a")])
    );

    assert!(unit.satisfies("Monoid[seq[bool]]").unwrap());
    assert!(unit.satisfies("Semigroup[seq[seq[int]]]").unwrap());
    assert!(!unit.satisfies("Monoid[int]").unwrap());
}

#[test]
fn where_clause_of_a_partial_instance() {
    let mut unit = unit(&Panic);
    unit.declare_source(
        r"
        typeclass Eq[A] {}

        instance Eq[int];
        instance[T] Eq[seq[T]] where Eq[T];
        instance[T] Eq[Option[T]] where Eq[T];
        ",
    )
    .unwrap();

    assert!(unit.satisfies("Eq[seq[seq[int]]]").unwrap());
    assert!(unit.satisfies("Eq[Option[seq[int]]]").unwrap());
    assert!(!unit.satisfies("Eq[seq[string]]").unwrap());
    assert!(unit.satisfies("Eq[int] & (Eq[string] | !Eq[bool])").unwrap());
}

#[test]
fn exported_members() {
    let mut unit = unit(&Panic);
    unit.declare_source(MONOID).unwrap();
    unit.declare_source(STRING_MONOID).unwrap();
    unit.declare_instance(
        &InstanceRequest::concrete(
            "Monoid",
            Binding::new().with("A", Constructor::concrete(string())),
        )
        .with_options(InstanceOptions::default().exporting_all()),
    )
    .unwrap();

    let exported = unit
        .scope()
        .exported()
        .map(|function| function.name().as_str())
        .collect::<Vec<_>>();
    assert_eq!(exported, ["mempty", "mappend", "mconcat"]);
}

#[test]
fn syntax_errors_are_reported_with_a_span() {
    let storage = Storage::<Diagnostic>::new();
    let mut unit = unit(&storage);

    assert!(unit.declare_source("def f(): int = 1").is_err());
    assert!(unit.evaluate("add(1,").is_err());

    let diagnostics = storage.as_vec();
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|diagnostic| diagnostic.span.is_some()));
    assert!(unit.scope().overloads("f").next().is_none());
}

#[test]
fn instance_of_an_unknown_typeclass() {
    let storage = Storage::<Diagnostic>::new();
    let mut unit = unit(&storage);

    assert!(unit.declare_source("instance Show[int];").is_err());
    assert!(unit.declare_source(MONOID).is_ok());
    assert!(unit.declare_source("instance Monoid[int, string];").is_err());

    let diagnostics = storage.as_vec();
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics[0].message.contains("`Show`"));
    assert!(diagnostics[1].message.contains("expected 1 type argument(s)"));
}

#[test]
fn call_depth_follows_the_config() {
    let storage = Storage::<Diagnostic>::new();
    let config = Config::from_toml("max_call_depth = 8").unwrap();
    let mut unit = Unit::new(config, &storage);

    unit.declare_source("def spin(n: int): int = spin(n);").unwrap();

    assert!(unit.call("spin", Vec::new(), vec![Value::Int(0)]).is_err());
    assert_eq!(storage.len(), 1);
    assert!(storage.as_vec()[0].message.contains('8'));
}

#[test]
fn nesting_depth_follows_the_config() {
    let storage = Storage::<Diagnostic>::new();
    let config = Config::from_toml("max_nesting_depth = 4").unwrap();
    let mut unit = Unit::new(config, &storage);

    unit.declare_source("def shallow(x: seq[seq[int]]): int = 1;").unwrap();

    let source = "def deep(x: seq[seq[seq[seq[int]]]]): int = 1;";
    assert!(unit.declare_source(source).is_err());
    assert!(unit.evaluate("f(f(f(f(f(1)))))").is_err());
    assert!(unit.satisfies("!!!!!Monoid[int]").is_err());

    let diagnostics = storage.as_vec();
    assert_eq!(diagnostics.len(), 3);
    assert!(diagnostics
        .iter()
        .all(|diagnostic| diagnostic.message.contains("limit of 4 levels")));

    let span = diagnostics[0].span.unwrap();
    assert_eq!(&source[span.start..span.end], "int");

    let rendered = diagnostics[0].render("deep.kd", source).unwrap();
    assert!(rendered.contains("deep.kd:1:"));
    assert!(rendered.contains("max_nesting_depth"));

    assert_eq!(unit.scope().overloads("shallow").count(), 1);
    assert_eq!(unit.scope().overloads("deep").count(), 0);
}

#[test]
fn deeply_nested_source_is_reported() {
    let storage = Storage::<Diagnostic>::new();
    let mut unit = unit(&storage);

    let depth = 100_000;
    let source = format!(
        "def deep(x: {}int{}): int = 1;",
        "seq[".repeat(depth),
        "]".repeat(depth)
    );

    assert!(unit.declare_source(&source).is_err());
    assert_eq!(storage.len(), 1);
    assert!(storage.as_vec()[0].message.contains("nesting"));
}

#[test]
fn diagnostics_can_be_logged() {
    let logger = Logger::default();
    let mut unit = unit(&logger);

    assert!(unit.declare_source("instance Show[int];").is_err());
    assert!(unit.evaluate("missing()").is_err());
}

#[test]
fn config() {
    assert_eq!(Config::from_toml("").unwrap(), Config::default());

    let config = Config::from_toml(
        "max_instantiation_depth = 4\nmax_query_depth = 16",
    )
    .unwrap();
    assert_eq!(config.max_instantiation_depth, 4);
    assert_eq!(config.max_query_depth, 16);
    assert_eq!(config.max_call_depth, Config::default().max_call_depth);
    assert_eq!(
        config.max_nesting_depth,
        kindred_syntax::parser::DEFAULT_MAX_NESTING_DEPTH
    );

    assert!(Config::from_toml("max_depth = 4").is_err());
    assert!(Config::from_toml("max_call_depth = \"deep\"").is_err());

    let config = Config::default();
    assert_eq!(Config::from_toml(&config.to_toml().unwrap()).unwrap(), config);
}

proptest! {
    #[test]
    fn mconcat_concatenates(words in proptest::collection::vec("[a-z]{0,4}", 0..6)) {
        let mut unit = unit(&Panic);
        unit.declare_source(MONOID).unwrap();
        unit.declare_source(STRING_MONOID).unwrap();
        unit.declare_source("instance Monoid[string];").unwrap();

        let items = Value::sequence(
            string(),
            words.iter().map(|word| Value::string(word.as_str())).collect(),
        );
        let result = unit.call("mconcat", Vec::new(), vec![items]).unwrap();

        prop_assert_eq!(result, Value::string(words.concat()));
    }

    #[test]
    fn skipped_members_are_never_generated(skip_mconcat: bool) {
        let mut unit = unit(&Panic);
        unit.declare_source(MONOID).unwrap();
        unit.declare_source(STRING_MONOID).unwrap();

        let source = if skip_mconcat {
            "instance Monoid[string] skipping(mconcat);"
        } else {
            "instance Monoid[string];"
        };
        unit.declare_source(source).unwrap();

        prop_assert!(unit.satisfies("Monoid[string]").unwrap());
        prop_assert_eq!(
            unit.scope().overloads("mconcat").count(),
            usize::from(!skip_mconcat)
        );
    }
}
