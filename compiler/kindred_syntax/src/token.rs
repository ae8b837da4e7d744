//! Is a module containing the [`Token`] type and the [`Tokenizer`] producing
//! it.

use std::{
    fmt,
    iter::Peekable,
    str::{CharIndices, FromStr},
};

use enum_as_inner::EnumAsInner;
use kindred_diagnostic::Span;
use serde::{Deserialize, Serialize};

use crate::error::{
    Error, IntegerOverflow, InvalidEscapeSequence, UnexpectedCharacter,
    UnterminatedStringLiteral,
};

/// A reserved word of the declaration language.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[allow(missing_docs)]
pub enum Keyword {
    #[display(fmt = "typeclass")]
    Typeclass,
    #[display(fmt = "export")]
    Export,
    #[display(fmt = "required")]
    Required,
    #[display(fmt = "default")]
    Default,
    #[display(fmt = "instance")]
    Instance,
    #[display(fmt = "def")]
    Def,
    #[display(fmt = "where")]
    Where,
    #[display(fmt = "skipping")]
    Skipping,
    #[display(fmt = "exporting")]
    Exporting,
    #[display(fmt = "fn")]
    Fn,
    #[display(fmt = "true")]
    True,
    #[display(fmt = "false")]
    False,
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        Ok(match word {
            "typeclass" => Self::Typeclass,
            "export" => Self::Export,
            "required" => Self::Required,
            "default" => Self::Default,
            "instance" => Self::Instance,
            "def" => Self::Def,
            "where" => Self::Where,
            "skipping" => Self::Skipping,
            "exporting" => Self::Exporting,
            "fn" => Self::Fn,
            "true" => Self::True,
            "false" => Self::False,
            _ => return Err(()),
        })
    }
}

/// The kind of a [`Token`].
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumAsInner, Serialize,
    Deserialize,
)]
pub enum Kind {
    /// A name such as `Monoid`, `mempty` or `_1`.
    Identifier(String),

    /// A reserved word.
    Keyword(Keyword),

    /// A non-negative integer literal.
    Integer(i64),

    /// A string literal with its escapes resolved.
    String(String),

    /// A single punctuation character.
    Punctuation(char),

    /// `->`
    Arrow,

    /// `=>`
    FatArrow,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "identifier `{name}`"),
            Self::Keyword(keyword) => write!(f, "keyword `{keyword}`"),
            Self::Integer(value) => write!(f, "integer `{value}`"),
            Self::String(value) => write!(f, "string {value:?}"),
            Self::Punctuation(character) => write!(f, "`{character}`"),
            Self::Arrow => f.write_str("`->`"),
            Self::FatArrow => f.write_str("`=>`"),
        }
    }
}

/// A significant piece of the source together with its location.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Token {
    /// Specifies the kind of the token.
    pub kind: Kind,

    /// The span of the token.
    pub span: Span,
}

/// Increments the iterator until the predicate returns false.
fn walk_iter(
    iter: &mut Peekable<CharIndices<'_>>,
    predicate: impl Fn(char) -> bool,
) {
    while let Some((_, character)) = iter.peek() {
        if !predicate(*character) {
            break;
        }

        iter.next();
    }
}

/// Checks if the given character is a valid first character of an
/// identifier.
fn is_first_identifier_character(character: char) -> bool {
    character == '_' || character.is_alphabetic()
}

/// Checks if the given character is a valid character of an identifier.
fn is_identifier_character(character: char) -> bool {
    character == '_' || character.is_alphanumeric()
}

/// Iterates over the tokens of a source, skipping whitespaces and `#`
/// comments.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a new [`Tokenizer`] over the given source.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self { source, iter: source.char_indices().peekable() }
    }

    /// Tokenizes the whole source, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first lexical error found.
    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, Error> {
        Self::new(source).collect()
    }

    /// Returns the byte index of the next character.
    fn position(&mut self) -> usize {
        self.iter.peek().map_or(self.source.len(), |(index, _)| *index)
    }

    /// Creates a span from the given start location to the current location
    /// of the iterator.
    fn create_span(&mut self, start: usize) -> Span {
        Span::new(start, self.position())
    }

    fn skip_insignificant(&mut self) {
        while let Some((_, character)) = self.iter.peek().copied() {
            if character.is_whitespace() {
                walk_iter(&mut self.iter, char::is_whitespace);
            } else if character == '#' {
                walk_iter(&mut self.iter, |x| x != '\n');
            } else {
                break;
            }
        }
    }

    fn handle_identifier_and_keyword(&mut self, start: usize) -> Token {
        walk_iter(&mut self.iter, is_identifier_character);

        let span = self.create_span(start);
        let word = &self.source[span.start..span.end];

        let kind = word.parse::<Keyword>().map_or_else(
            |()| Kind::Identifier(word.to_owned()),
            Kind::Keyword,
        );

        Token { kind, span }
    }

    fn handle_integer_literal(&mut self, start: usize) -> Result<Token, Error> {
        walk_iter(&mut self.iter, |character| character.is_ascii_digit());

        let span = self.create_span(start);
        let value = self.source[span.start..span.end]
            .parse::<i64>()
            .map_err(|_| IntegerOverflow { span })?;

        Ok(Token { kind: Kind::Integer(value), span })
    }

    fn handle_string_literal(&mut self, start: usize) -> Result<Token, Error> {
        let mut string = String::new();

        loop {
            let Some((index, character)) = self.iter.next() else {
                return Err(UnterminatedStringLiteral {
                    span: Span::new(start, self.source.len()),
                }
                .into());
            };

            match character {
                // end the string
                '"' => {
                    return Ok(Token {
                        kind: Kind::String(string),
                        span: self.create_span(start),
                    });
                }

                // escape sequence
                '\\' => {
                    let escaped = match self.iter.next() {
                        Some((_, 'n')) => '\n',
                        Some((_, 't')) => '\t',
                        Some((_, 'r')) => '\r',
                        Some((_, '0')) => '\0',
                        Some((_, '\\')) => '\\',
                        Some((_, '"')) => '"',
                        Some((_, _)) => {
                            return Err(InvalidEscapeSequence {
                                span: self.create_span(index),
                            }
                            .into());
                        }
                        None => {
                            return Err(UnterminatedStringLiteral {
                                span: Span::new(start, self.source.len()),
                            }
                            .into());
                        }
                    };

                    string.push(escaped);
                }

                _ => string.push(character),
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_insignificant();

        let (start, character) = self.iter.next()?;

        Some(match character {
            '"' => self.handle_string_literal(start),

            character if character.is_ascii_digit() => {
                self.handle_integer_literal(start)
            }

            character if is_first_identifier_character(character) => {
                Ok(self.handle_identifier_and_keyword(start))
            }

            '-' | '=' if matches!(self.iter.peek(), Some((_, '>'))) => {
                self.iter.next();

                Ok(Token {
                    kind: if character == '-' { Kind::Arrow } else { Kind::FatArrow },
                    span: self.create_span(start),
                })
            }

            '[' | ']' | '(' | ')' | '{' | '}' | ',' | ';' | ':' | '=' | '&'
            | '|' | '!' | '-' => Ok(Token {
                kind: Kind::Punctuation(character),
                span: self.create_span(start),
            }),

            character => Err(UnexpectedCharacter {
                span: self.create_span(start),
                character,
            }
            .into()),
        })
    }
}
