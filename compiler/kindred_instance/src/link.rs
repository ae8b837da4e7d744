//! Pins the references to template members found in generated bodies.

use std::collections::HashMap;

use kindred_term::{
    declaration::Signature,
    expression::{Callee, Expr},
};

/// Pins every call and function reference naming one of `members` to the
/// member's signature, unless a parameter or lambda binding of the same name
/// shadows it.
pub(crate) fn pin_members(
    expr: &mut Expr,
    members: &HashMap<String, Signature>,
    locals: &mut Vec<String>,
) {
    match expr {
        Expr::Literal(_) | Expr::Local(_) => {}

        Expr::Call(call) => {
            pin(&mut call.callee, members, locals);

            for argument in &mut call.arguments {
                pin_members(argument, members, locals);
            }
        }

        Expr::Function(callee) => pin(callee, members, locals),

        Expr::Lambda(lambda) => {
            let scope = locals.len();
            locals.extend(
                lambda.parameters.iter().map(|parameter| parameter.name.clone()),
            );

            pin_members(&mut lambda.body, members, locals);

            locals.truncate(scope);
        }

        Expr::Sequence(sequence) => {
            for item in &mut sequence.items {
                pin_members(item, members, locals);
            }
        }
    }
}

fn pin(
    callee: &mut Callee,
    members: &HashMap<String, Signature>,
    locals: &[String],
) {
    if callee.pinned.is_some() || locals.contains(&callee.name) {
        return;
    }

    if let Some(signature) = members.get(&callee.name) {
        callee.pinned = Some(Box::new(signature.clone()));
    }
}
