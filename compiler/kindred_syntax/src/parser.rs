//! Contains the recursive descent [`Parser`] over a token sequence.

use std::collections::HashMap;

use kindred_diagnostic::Span;
use kindred_marker::Constraint;
use kindred_registry::{
    options::InstanceOptions,
    template::{MemberTemplate, NestedInstance, Stub, TypeclassDeclaration},
};
use kindred_term::{
    constructor::Constructor,
    declaration::{Declaration, Parameter, Signature},
    expression::{Call, Callee, Expr, Lambda, Literal, Sequence},
    predicate::Predicate,
    Hole, Placeholder, Tuple, TypeExpr, Variable,
};

use crate::{
    error::{
        AppliedVariable, Error, MalformedConstructor, NestingTooDeep,
        UnexpectedHole, UnexpectedToken,
    },
    item::{Definition, Instance, Item, Typeclass},
    token::{Keyword, Kind, Token, Tokenizer},
};

/// The default limit of nested types, constraints and expressions.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Counts the holes of the constructor argument being parsed.
#[derive(Debug, Clone, Copy, Default)]
struct Holes {
    next: usize,
    count: usize,
}

/// Parses declaration sources into the engine's data model.
///
/// Identifiers in type position are classified by the names in scope: the
/// placeholders of the enclosing typeclass, then the generic parameters in
/// scope, and every other name is a concrete symbol.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    end: usize,
    last_span: Span,
    placeholders: HashMap<String, usize>,
    variables: Vec<Variable>,
    locals: Vec<String>,
    holes: Option<Holes>,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    /// Tokenizes the source and creates a parser positioned at its start.
    ///
    /// # Errors
    ///
    /// Returns the first lexical error of the source.
    pub fn new(source: &str) -> Result<Self, Error> {
        Ok(Self {
            tokens: Tokenizer::tokenize(source)?,
            position: 0,
            end: source.len(),
            last_span: Span::new(0, 0),
            placeholders: HashMap::new(),
            variables: Vec::new(),
            locals: Vec::new(),
            holes: None,
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        })
    }

    /// Sets the limit of nested types, constraints and expressions.
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Runs the given parsing function and checks that it consumed every
    /// token.
    ///
    /// # Errors
    ///
    /// Returns the error of `parse` or an [`UnexpectedToken`] error for the
    /// first token left over.
    pub fn finish<T>(
        mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let result = parse(&mut self)?;

        if self.peek().is_some() {
            return Err(self.unexpected("the end of the input"));
        }

        Ok(result)
    }

    fn peek(&self) -> Option<&Token> { self.tokens.get(self.position) }

    /// Runs `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if self.depth >= self.max_depth {
            return Err(NestingTooDeep {
                span: self.peek_span(),
                max_depth: self.max_depth,
            }
            .into());
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;

        result
    }

    fn peek_span(&self) -> Span {
        self.peek().map_or(Span::new(self.end, self.end), |token| token.span)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        self.last_span = token.span;

        Some(token)
    }

    fn unexpected(&self, expected: &str) -> Error {
        UnexpectedToken {
            span: self.peek_span(),
            expected: expected.to_owned(),
            found: self
                .peek()
                .map_or_else(|| "the end of the input".to_owned(), |token| {
                    token.kind.to_string()
                }),
        }
        .into()
    }

    fn peek_punctuation(&self, expected: char) -> bool {
        matches!(
            self.peek(),
            Some(Token { kind: Kind::Punctuation(character), .. })
                if *character == expected
        )
    }

    fn peek_keyword(&self, expected: Keyword) -> bool {
        matches!(
            self.peek(),
            Some(Token { kind: Kind::Keyword(keyword), .. })
                if *keyword == expected
        )
    }

    fn eat_punctuation(&mut self, expected: char) -> bool {
        let found = self.peek_punctuation(expected);
        if found {
            self.next();
        }

        found
    }

    fn eat_keyword(&mut self, expected: Keyword) -> bool {
        let found = self.peek_keyword(expected);
        if found {
            self.next();
        }

        found
    }

    fn eat_kind(&mut self, expected: &Kind) -> bool {
        let found = self.peek().is_some_and(|token| token.kind == *expected);
        if found {
            self.next();
        }

        found
    }

    fn expect_punctuation(&mut self, expected: char) -> Result<Span, Error> {
        if self.eat_punctuation(expected) {
            Ok(self.last_span)
        } else {
            Err(self.unexpected(&format!("`{expected}`")))
        }
    }

    fn expect_keyword(&mut self, expected: Keyword) -> Result<Span, Error> {
        if self.eat_keyword(expected) {
            Ok(self.last_span)
        } else {
            Err(self.unexpected(&format!("`{expected}`")))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, Span), Error> {
        if let Some(Token { kind: Kind::Identifier(name), span }) = self.peek() {
            let identifier = (name.clone(), *span);
            self.next();

            return Ok(identifier);
        }

        Err(self.unexpected("an identifier"))
    }

    /// Parses `item, item, .. close` after the opening delimiter, allowing a
    /// trailing comma.
    ///
    /// Returns the items and whether a trailing comma was written.
    fn separated<T>(
        &mut self,
        close: char,
        mut parse: impl FnMut(&mut Self) -> Result<T, Error>,
    ) -> Result<(Vec<T>, bool), Error> {
        let mut items = Vec::new();

        loop {
            if self.eat_punctuation(close) {
                let trailing = !items.is_empty();
                return Ok((items, trailing));
            }

            items.push(parse(self)?);

            if !self.eat_punctuation(',') {
                self.expect_punctuation(close)?;
                return Ok((items, false));
            }
        }
    }

    fn list<T>(
        &mut self,
        close: char,
        parse: impl FnMut(&mut Self) -> Result<T, Error>,
    ) -> Result<Vec<T>, Error> {
        self.separated(close, parse).map(|(items, _)| items)
    }

    fn with_variables<T>(
        &mut self,
        variables: &[Variable],
        parse: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let length = self.variables.len();
        self.variables.extend(variables.iter().cloned());

        let result = parse(self);
        self.variables.truncate(length);

        result
    }

    fn with_locals<T>(
        &mut self,
        locals: impl IntoIterator<Item = String>,
        parse: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let length = self.locals.len();
        self.locals.extend(locals);

        let result = parse(self);
        self.locals.truncate(length);

        result
    }

    fn hole(&mut self, name: &str, span: Span) -> Result<Option<Hole>, Error> {
        let Some(index) = name.strip_prefix('_') else {
            return Ok(None);
        };

        if !index.is_empty() && !index.chars().all(|x| x.is_ascii_digit()) {
            return Ok(None);
        }

        let Some(holes) = &mut self.holes else {
            return Err(UnexpectedHole { span }.into());
        };

        let hole = if index.is_empty() {
            let hole = Hole(holes.next);
            holes.next += 1;
            hole
        } else {
            Hole(index.parse().map_err(|_| UnexpectedHole { span })?)
        };

        holes.count = holes.count.max(hole.0 + 1);

        Ok(Some(hole))
    }

    /// Parses a type.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens do not form a type or nest deeper than
    /// the limit.
    pub fn parse_type(&mut self) -> Result<TypeExpr, Error> {
        self.nested(Self::parse_type_unchecked)
    }

    fn parse_type_unchecked(&mut self) -> Result<TypeExpr, Error> {
        if self.eat_punctuation('(') {
            let (elements, trailing) = self.separated(')', Self::parse_type)?;

            if self.eat_kind(&Kind::Arrow) {
                return Ok(TypeExpr::function(elements, self.parse_type()?));
            }

            return Ok(match <[TypeExpr; 1]>::try_from(elements) {
                Ok([element]) if !trailing => element,
                Ok(elements) => TypeExpr::Tuple(Tuple::new(elements.into())),
                Err(elements) => TypeExpr::Tuple(Tuple::new(elements)),
            });
        }

        let (name, span) = self.expect_identifier()?;

        if let Some(hole) = self.hole(&name, span)? {
            return Ok(TypeExpr::Hole(hole));
        }

        let arguments = if self.eat_punctuation('[') {
            self.list(']', Self::parse_type)?
        } else {
            Vec::new()
        };

        if self.placeholders.contains_key(&name) {
            Ok(TypeExpr::applied_placeholder(name, arguments))
        } else if self.variables.iter().any(|variable| variable.0 == name) {
            if arguments.is_empty() {
                Ok(TypeExpr::variable(name))
            } else {
                Err(AppliedVariable { span: span.join(self.last_span), name }
                    .into())
            }
        } else {
            Ok(TypeExpr::applied(name, arguments))
        }
    }

    /// Parses a type written where a constructor is expected.
    ///
    /// The arity is the number of distinct holes; a bare placeholder of a
    /// constructor placeholder stands for itself applied to all of its holes.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens do not form a well formed constructor.
    pub fn parse_constructor(&mut self) -> Result<Constructor, Error> {
        let start = self.peek_span();
        let outer = self.holes.replace(Holes::default());
        let ty = self.parse_type();
        let holes = std::mem::replace(&mut self.holes, outer).unwrap_or_default();
        let ty = ty?;

        if holes.count == 0 {
            if let TypeExpr::Placeholder(placeholder) = &ty {
                let arity =
                    self.placeholders.get(&placeholder.name).copied().unwrap_or(0);

                if placeholder.arguments.is_empty() && arity > 0 {
                    return Ok(Constructor::template_of(
                        arity,
                        TypeExpr::applied_placeholder(
                            placeholder.name.clone(),
                            (0..arity).map(|index| TypeExpr::Hole(Hole(index))).collect(),
                        ),
                    ));
                }
            }
        }

        if ty.contains_placeholder() {
            return Ok(Constructor::template_of(holes.count, ty));
        }

        Constructor::new(holes.count, ty).map_err(|error| {
            MalformedConstructor { span: start.join(self.last_span), error }.into()
        })
    }

    fn parse_constructor_arguments(&mut self) -> Result<Vec<Constructor>, Error> {
        self.expect_punctuation('[')?;
        self.list(']', Self::parse_constructor)
    }

    /// Parses a predicate `Name[arguments..]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens do not form a predicate.
    pub fn parse_predicate(&mut self) -> Result<Predicate, Error> {
        let (typeclass, _) = self.expect_identifier()?;

        Ok(Predicate::new(typeclass, self.parse_constructor_arguments()?))
    }

    fn parse_where_clause(&mut self) -> Result<Vec<Predicate>, Error> {
        let mut predicates = Vec::new();

        if self.eat_keyword(Keyword::Where) {
            loop {
                predicates.push(self.parse_predicate()?);

                if !self.eat_punctuation(',') {
                    break;
                }
            }
        }

        Ok(predicates)
    }

    /// Parses a constraint built from predicates with `&`, `|`, `!`,
    /// parentheses and the literals `true` and `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens do not form a constraint.
    pub fn parse_constraint(&mut self) -> Result<Constraint, Error> {
        let mut operands = vec![self.parse_conjunction()?];

        while self.eat_punctuation('|') {
            operands.push(self.parse_conjunction()?);
        }

        Ok(match <[Constraint; 1]>::try_from(operands) {
            Ok([operand]) => operand,
            Err(operands) => Constraint::Any(operands),
        })
    }

    fn parse_conjunction(&mut self) -> Result<Constraint, Error> {
        let mut operands = vec![self.parse_negation()?];

        while self.eat_punctuation('&') {
            operands.push(self.parse_negation()?);
        }

        Ok(match <[Constraint; 1]>::try_from(operands) {
            Ok([operand]) => operand,
            Err(operands) => Constraint::All(operands),
        })
    }

    fn parse_negation(&mut self) -> Result<Constraint, Error> {
        self.nested(Self::parse_negation_unchecked)
    }

    fn parse_negation_unchecked(&mut self) -> Result<Constraint, Error> {
        if self.eat_punctuation('!') {
            return Ok(self.parse_negation()?.negate());
        }

        if self.eat_punctuation('(') {
            let constraint = self.parse_constraint()?;
            self.expect_punctuation(')')?;

            return Ok(constraint);
        }

        if self.eat_keyword(Keyword::True) {
            return Ok(Constraint::All(Vec::new()));
        }

        if self.eat_keyword(Keyword::False) {
            return Ok(Constraint::Any(Vec::new()));
        }

        Ok(Constraint::Satisfies(self.parse_predicate()?))
    }

    fn parse_generic_parameters(&mut self) -> Result<Vec<Variable>, Error> {
        if !self.eat_punctuation('[') {
            return Ok(Vec::new());
        }

        self.list(']', |parser| {
            parser.expect_identifier().map(|(name, _)| Variable(name))
        })
    }

    /// Parses a placeholder list `[A, F[_], ..]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens do not form a placeholder list.
    pub fn parse_placeholders(&mut self) -> Result<Vec<Placeholder>, Error> {
        self.expect_punctuation('[')?;
        self.list(']', |parser| {
            let (name, _) = parser.expect_identifier()?;

            if !parser.eat_punctuation('[') {
                return Ok(Placeholder::ordinary(name));
            }

            let holes = parser.list(']', |parser| match parser.peek() {
                Some(Token { kind: Kind::Identifier(hole), .. }) if hole == "_" => {
                    parser.next();
                    Ok(())
                }
                _ => Err(parser.unexpected("`_`")),
            })?;

            Ok(Placeholder::constructor(name, holes.len()))
        })
    }

    /// Parses any number of `skipping(..)` and `exporting(..)` clauses.
    ///
    /// # Errors
    ///
    /// Returns an error if a clause is malformed.
    pub fn parse_options(&mut self) -> Result<InstanceOptions, Error> {
        let mut options = InstanceOptions::default();

        loop {
            if self.eat_keyword(Keyword::Skipping) {
                self.expect_punctuation('(')?;
                let names = self.list(')', |parser| {
                    parser.expect_identifier().map(|(name, _)| name)
                })?;

                options = options.skipping(names);
            } else if self.eat_keyword(Keyword::Exporting) {
                self.expect_punctuation('(')?;
                let names = self.list(')', |parser| {
                    parser.expect_identifier().map(|(name, _)| name)
                })?;

                options = if names.iter().any(|name| name == "_") {
                    options.exporting_all()
                } else {
                    options.exporting(names)
                };
            } else {
                return Ok(options);
            }
        }
    }

    fn parse_parameter(&mut self) -> Result<Parameter, Error> {
        let (name, _) = self.expect_identifier()?;
        self.expect_punctuation(':')?;

        Ok(Parameter::new(name, self.parse_type()?))
    }

    /// Parses `name[generics](parameters): R where ..` followed by the rest
    /// of the member within the scope of its generic parameters.
    fn parse_function<T>(
        &mut self,
        rest: impl FnOnce(&mut Self, String, Signature) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let (name, _) = self.expect_identifier()?;
        let generic_parameters = self.parse_generic_parameters()?;

        self.with_variables(&generic_parameters.clone(), |parser| {
            parser.expect_punctuation('(')?;
            let parameters = parser.list(')', Self::parse_parameter)?;
            parser.expect_punctuation(':')?;
            let return_type = parser.parse_type()?;
            let where_clause = parser.parse_where_clause()?;

            rest(
                parser,
                name,
                Signature::new(
                    generic_parameters,
                    parameters,
                    return_type,
                    where_clause,
                ),
            )
        })
    }

    fn parse_body(&mut self, signature: &Signature) -> Result<Expr, Error> {
        self.expect_punctuation('=')?;

        let body = self.with_locals(
            signature.parameters.iter().map(|parameter| parameter.name.clone()),
            Self::parse_expression,
        )?;
        self.expect_punctuation(';')?;

        Ok(body)
    }

    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens do not form an expression or nest
    /// deeper than the limit.
    pub fn parse_expression(&mut self) -> Result<Expr, Error> {
        self.nested(Self::parse_expression_unchecked)
    }

    fn parse_expression_unchecked(&mut self) -> Result<Expr, Error> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.unexpected("an expression"));
        };

        match token.kind {
            Kind::Integer(value) => {
                self.next();
                Ok(Expr::int(value))
            }

            Kind::Punctuation('-') => {
                self.next();

                match self.peek().map(|token| &token.kind) {
                    Some(Kind::Integer(value)) => {
                        let value = -*value;
                        self.next();
                        Ok(Expr::int(value))
                    }
                    _ => Err(self.unexpected("an integer")),
                }
            }

            Kind::String(value) => {
                self.next();
                Ok(Expr::Literal(Literal::String(value)))
            }

            Kind::Keyword(keyword @ (Keyword::True | Keyword::False)) => {
                self.next();
                Ok(Expr::Literal(Literal::Bool(keyword == Keyword::True)))
            }

            Kind::Keyword(Keyword::Fn) => {
                self.next();
                self.parse_lambda()
            }

            Kind::Punctuation('(') => {
                self.next();
                let expression = self.parse_expression()?;
                self.expect_punctuation(')')?;

                Ok(expression)
            }

            Kind::Punctuation('[') => {
                self.next();
                self.parse_sequence()
            }

            Kind::Identifier(name) => {
                self.next();

                let type_arguments = if self.eat_punctuation('[') {
                    self.list(']', Self::parse_type)?
                } else {
                    Vec::new()
                };

                if self.eat_punctuation('(') {
                    let arguments = self.list(')', Self::parse_expression)?;

                    Ok(Expr::Call(Call::new(
                        Callee::new(name, type_arguments, None),
                        arguments,
                    )))
                } else if type_arguments.is_empty() && self.locals.contains(&name) {
                    Ok(Expr::Local(name))
                } else {
                    Ok(Expr::Function(Callee::new(name, type_arguments, None)))
                }
            }

            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_lambda(&mut self) -> Result<Expr, Error> {
        self.expect_punctuation('(')?;
        let parameters = self.list(')', Self::parse_parameter)?;
        self.expect_punctuation(':')?;
        let return_type = self.parse_type()?;

        if !self.eat_kind(&Kind::FatArrow) {
            return Err(self.unexpected("`=>`"));
        }

        let body = self.with_locals(
            parameters.iter().map(|parameter| parameter.name.clone()),
            Self::parse_expression,
        )?;

        Ok(Expr::Lambda(Lambda::new(parameters, return_type, Box::new(body))))
    }

    fn parse_sequence(&mut self) -> Result<Expr, Error> {
        let mut items = Vec::new();

        while !self.eat_punctuation(';') {
            items.push(self.parse_expression()?);

            if !self.eat_punctuation(',') {
                self.expect_punctuation(';')?;
                break;
            }
        }

        let element = self.parse_type()?;
        self.expect_punctuation(']')?;

        Ok(Expr::Sequence(Sequence::new(element, items)))
    }

    fn parse_member(&mut self) -> Result<MemberTemplate, Error> {
        if self.eat_keyword(Keyword::Required) {
            return self.parse_function(|parser, name, signature| {
                parser.expect_punctuation(';')?;
                Ok(Stub::new(name, signature).into())
            });
        }

        if self.eat_keyword(Keyword::Default) {
            return self.parse_function(|parser, name, signature| {
                let body = parser.parse_body(&signature)?;
                Ok(Declaration::new(name, signature, body).into())
            });
        }

        if self.eat_keyword(Keyword::Instance) {
            let (typeclass, _) = self.expect_identifier()?;
            let arguments = self.parse_constructor_arguments()?;
            let options = self.parse_options()?;
            self.expect_punctuation(';')?;

            return Ok(NestedInstance::new(typeclass, arguments, options).into());
        }

        Err(self.unexpected("a typeclass member"))
    }

    fn parse_members(&mut self) -> Result<Vec<MemberTemplate>, Error> {
        self.expect_punctuation('{')?;

        let mut members = Vec::new();
        while !self.eat_punctuation('}') {
            members.push(self.parse_member()?);
        }

        Ok(members)
    }

    fn parse_typeclass(&mut self, start: Span) -> Result<Typeclass, Error> {
        let exported = self.eat_keyword(Keyword::Export);
        self.expect_keyword(Keyword::Typeclass)?;

        let (name, _) = self.expect_identifier()?;
        let placeholders = self.parse_placeholders()?;

        self.placeholders = placeholders
            .iter()
            .map(|placeholder| (placeholder.name.clone(), placeholder.arity))
            .collect();

        let members = self.parse_members();
        self.placeholders.clear();

        Ok(Typeclass::new(
            TypeclassDeclaration::new(name, placeholders, members?, exported),
            start.join(self.last_span),
        ))
    }

    fn parse_definition(&mut self, start: Span) -> Result<Definition, Error> {
        self.expect_keyword(Keyword::Def)?;

        let declaration = self.parse_function(|parser, name, signature| {
            let body = parser.parse_body(&signature)?;
            Ok(Declaration::new(name, signature, body))
        })?;

        Ok(Definition::new(declaration, start.join(self.last_span)))
    }

    fn parse_instance(&mut self, start: Span) -> Result<Instance, Error> {
        self.expect_keyword(Keyword::Instance)?;

        let generic_parameters = self.parse_generic_parameters()?;
        let (typeclass, arguments, where_clause, options) =
            self.with_variables(&generic_parameters.clone(), |parser| {
                let (typeclass, _) = parser.expect_identifier()?;
                let arguments = parser.parse_constructor_arguments()?;
                let where_clause = parser.parse_where_clause()?;
                let options = parser.parse_options()?;
                parser.expect_punctuation(';')?;

                Ok((typeclass, arguments, where_clause, options))
            })?;

        Ok(Instance::new(
            typeclass,
            arguments,
            generic_parameters,
            where_clause,
            options,
            start.join(self.last_span),
        ))
    }

    /// Parses a top-level item.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens do not form an item.
    pub fn parse_item(&mut self) -> Result<Item, Error> {
        let start = self.peek_span();

        if self.peek_keyword(Keyword::Export) || self.peek_keyword(Keyword::Typeclass)
        {
            return self.parse_typeclass(start).map(Item::Typeclass);
        }

        if self.peek_keyword(Keyword::Def) {
            return self.parse_definition(start).map(Item::Definition);
        }

        if self.peek_keyword(Keyword::Instance) {
            return self.parse_instance(start).map(Item::Instance);
        }

        Err(self.unexpected("`typeclass`, `def` or `instance`"))
    }

    /// Parses items until the end of the input.
    ///
    /// # Errors
    ///
    /// Returns the first error found.
    pub fn parse_items(&mut self) -> Result<Vec<Item>, Error> {
        let mut items = Vec::new();

        while self.peek().is_some() {
            items.push(self.parse_item()?);
        }

        log::debug!("parsed {} item(s)", items.len());

        Ok(items)
    }
}
