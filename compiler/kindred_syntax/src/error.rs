//! Contains all kinds of errors that can occur while tokenizing and parsing
//! declaration sources.

use enum_as_inner::EnumAsInner;
use kindred_diagnostic::{Diagnostic, Report, Span};
use kindred_term::constructor::InvalidConstructor;

/// The source contains a string literal without its closing quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("found an unterminated string literal")]
pub struct UnterminatedStringLiteral {
    /// The span from the opening quote to the end of the source.
    pub span: Span,
}

/// The source contains an unknown escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("found an invalid escape sequence")]
pub struct InvalidEscapeSequence {
    /// The span of the escape sequence including the backslash.
    pub span: Span,
}

/// The source contains a character that starts no token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("found an unexpected character `{character}`")]
#[allow(missing_docs)]
pub struct UnexpectedCharacter {
    pub span: Span,
    pub character: char,
}

/// An integer literal does not fit in 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the integer literal is too large")]
pub struct IntegerOverflow {
    /// The span of the literal.
    pub span: Span,
}

/// The parser found a token other than the expected one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("expected {expected}, found {found}")]
pub struct UnexpectedToken {
    /// The span of the found token, or the end of the source.
    pub span: Span,

    /// A description of what was expected.
    pub expected: String,

    /// A description of what was found.
    pub found: String,
}

/// A hole `_` is written outside of a constructor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("a hole is only allowed in a constructor argument")]
pub struct UnexpectedHole {
    /// The span of the hole.
    pub span: Span,
}

/// A type variable is applied to arguments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the type variable `{name}` takes no arguments")]
#[allow(missing_docs)]
pub struct AppliedVariable {
    pub span: Span,
    pub name: String,
}

/// A constructor argument is not well formed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid constructor: {error}")]
#[allow(missing_docs)]
pub struct MalformedConstructor {
    pub span: Span,
    pub error: InvalidConstructor,
}

/// Types, constraints or expressions are nested deeper than the parser
/// allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("the nesting exceeds the limit of {max_depth} levels")]
pub struct NestingTooDeep {
    /// The span of the first token past the limit.
    pub span: Span,

    /// The nesting limit the parser runs with.
    pub max_depth: usize,
}

/// The error raised by the tokenizer or the parser.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    EnumAsInner,
    thiserror::Error,
    derive_more::From,
)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    UnterminatedStringLiteral(UnterminatedStringLiteral),

    #[error(transparent)]
    InvalidEscapeSequence(InvalidEscapeSequence),

    #[error(transparent)]
    UnexpectedCharacter(UnexpectedCharacter),

    #[error(transparent)]
    IntegerOverflow(IntegerOverflow),

    #[error(transparent)]
    UnexpectedToken(UnexpectedToken),

    #[error(transparent)]
    UnexpectedHole(UnexpectedHole),

    #[error(transparent)]
    AppliedVariable(AppliedVariable),

    #[error(transparent)]
    MalformedConstructor(MalformedConstructor),

    #[error(transparent)]
    NestingTooDeep(NestingTooDeep),
}

impl Error {
    /// Returns the span the error points at.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::UnterminatedStringLiteral(error) => error.span,
            Self::InvalidEscapeSequence(error) => error.span,
            Self::UnexpectedCharacter(error) => error.span,
            Self::IntegerOverflow(error) => error.span,
            Self::UnexpectedToken(error) => error.span,
            Self::UnexpectedHole(error) => error.span,
            Self::AppliedVariable(error) => error.span,
            Self::MalformedConstructor(error) => error.span,
            Self::NestingTooDeep(error) => error.span,
        }
    }
}

impl Report<()> for Error {
    fn report(&self, (): ()) -> Diagnostic {
        let help_message = match self {
            Self::UnterminatedStringLiteral(_) => {
                Some("close the literal with a double quote")
            }
            Self::InvalidEscapeSequence(_) => Some(
                "the known escapes are `\\n`, `\\t`, `\\r`, `\\0`, `\\\\` and \
                 `\\\"`",
            ),
            Self::UnexpectedHole(_) => Some(
                "holes stand for the arguments of a type constructor, e.g. \
                 `Pair[int, _]`",
            ),
            Self::NestingTooDeep(_) => Some(
                "raise `max_nesting_depth` in the configuration or split the \
                 declaration",
            ),
            _ => None,
        };

        Diagnostic {
            span: Some(self.span()),
            help_message: help_message.map(str::to_owned),
            ..Diagnostic::error(self.to_string())
        }
    }
}
