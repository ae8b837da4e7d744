use proptest::{
    prelude::{BoxedStrategy, Just, Strategy},
    prop_oneof,
    sample::select,
};

use crate::{
    binding::Binding, constructor::Constructor, Hole, Placeholder, Tuple,
    TypeExpr,
};

const SYMBOLS: &[&str] = &["int", "string", "bool", "seq", "Option"];
const VARIABLES: &[&str] = &["T", "U"];

/// The placeholders the generated templates draw from.
pub fn placeholders() -> Vec<Placeholder> {
    vec![
        Placeholder::ordinary("A"),
        Placeholder::ordinary("B"),
        Placeholder::constructor("F", 1),
        Placeholder::constructor("G", 2),
    ]
}

fn compose(
    leaf: BoxedStrategy<TypeExpr>,
    extra: impl Fn(BoxedStrategy<TypeExpr>) -> Vec<BoxedStrategy<TypeExpr>>
        + 'static,
) -> BoxedStrategy<TypeExpr> {
    leaf.prop_recursive(3, 24, 3, move |inner| {
        let mut choices = vec![
            (select(SYMBOLS), proptest::collection::vec(inner.clone(), 1..=2))
                .prop_map(|(name, arguments)| {
                    TypeExpr::applied(name, arguments)
                })
                .boxed(),
            (proptest::collection::vec(inner.clone(), 0..=2), inner.clone())
                .prop_map(|(parameters, return_type)| {
                    TypeExpr::function(parameters, return_type)
                })
                .boxed(),
            proptest::collection::vec(inner.clone(), 0..=3)
                .prop_map(|elements| TypeExpr::Tuple(Tuple::new(elements)))
                .boxed(),
        ];
        choices.extend(extra(inner));

        proptest::strategy::Union::new(choices)
    })
    .boxed()
}

/// Types mentioning neither placeholders nor holes.
pub fn concrete_type() -> BoxedStrategy<TypeExpr> {
    let leaf = prop_oneof![
        select(SYMBOLS).prop_map(|name| TypeExpr::symbol(name)),
        select(VARIABLES).prop_map(|name| TypeExpr::variable(name)),
    ]
    .boxed();

    compose(leaf, |_| Vec::new())
}

/// Types mentioning the given placeholders, each occurrence applied to as many
/// arguments as the placeholder's arity.
pub fn template_type(placeholders: Vec<Placeholder>) -> BoxedStrategy<TypeExpr> {
    let ordinary = placeholders
        .iter()
        .filter(|placeholder| placeholder.arity == 0)
        .map(|placeholder| placeholder.name.clone())
        .collect::<Vec<_>>();
    let constructors = placeholders
        .into_iter()
        .filter(|placeholder| placeholder.arity > 0)
        .collect::<Vec<_>>();

    let leaf = prop_oneof![
        select(SYMBOLS).prop_map(|name| TypeExpr::symbol(name)),
        select(VARIABLES).prop_map(|name| TypeExpr::variable(name)),
        select(ordinary).prop_map(|name| TypeExpr::placeholder(name)),
    ]
    .boxed();

    compose(leaf, move |inner| {
        if constructors.is_empty() {
            return Vec::new();
        }

        vec![select(constructors.clone())
            .prop_flat_map(move |placeholder| {
                proptest::collection::vec(inner.clone(), placeholder.arity)
                    .prop_map(move |arguments| {
                        TypeExpr::applied_placeholder(
                            placeholder.name.clone(),
                            arguments,
                        )
                    })
            })
            .boxed()]
    })
}

/// A well formed constructor of the given arity.
pub fn constructor(arity: usize) -> BoxedStrategy<Constructor> {
    if arity == 0 {
        return concrete_type().prop_map(Constructor::concrete).boxed();
    }

    let holes = (0..arity)
        .map(|index| TypeExpr::Hole(Hole(index)))
        .collect::<Vec<_>>();

    prop_oneof![
        (select(SYMBOLS), concrete_type()).prop_map({
            let holes = holes.clone();
            move |(name, extra)| {
                let mut arguments = holes.clone();
                arguments.push(extra);
                TypeExpr::applied(name, arguments)
            }
        }),
        Just(TypeExpr::function(
            holes[..arity - 1].to_vec(),
            holes[arity - 1].clone()
        )),
        Just(TypeExpr::Tuple(Tuple::new(holes.into_iter().rev().collect()))),
    ]
    .prop_map(move |template| {
        Constructor::new(arity, template).expect("holes are in range")
    })
    .boxed()
}

/// A binding covering every given placeholder.
pub fn binding_for(placeholders: &[Placeholder]) -> BoxedStrategy<Binding> {
    placeholders
        .iter()
        .map(|placeholder| {
            let name = placeholder.name.clone();
            constructor(placeholder.arity)
                .prop_map(move |constructor| (name.clone(), constructor))
        })
        .collect::<Vec<_>>()
        .prop_map(|entries| entries.into_iter().collect::<Binding>())
        .boxed()
}
