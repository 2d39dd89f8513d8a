//! Token definitions produced by the [`lexer`](super::lexer).

use std::fmt;

use winnow::stream::Location;

use crate::Span;

/// Reserved words.
///
/// The first group may also be used as argument names; the second group are
/// the predefined type names and literal words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Argument-name keywords
    Module,
    Raises,
    SetRaises,
    GetRaises,
    Inherits,
    Attribute,
    Callback,
    Const,
    Creator,
    Deleter,
    Dictionary,
    Enum,
    Exception,
    Getter,
    Implements,
    Inherit,
    Interface,
    LegacyCaller,
    Partial,
    Setter,
    Static,
    Stringifier,
    Typedef,
    Unrestricted,
    ReadOnly,

    // Predefined types and literal words
    Date,
    DOMString,
    Infinity,
    NaN,
    Any,
    Boolean,
    Byte,
    Double,
    False,
    Float,
    Long,
    Null,
    Object,
    Octet,
    Or,
    Optional,
    Sequence,
    Short,
    True,
    Unsigned,
    Void,
}

impl Keyword {
    /// Looks up the keyword spelled `ident`, if it is reserved.
    pub fn from_ident(ident: &str) -> Option<Self> {
        let keyword = match ident {
            "module" => Keyword::Module,
            "raises" => Keyword::Raises,
            "setraises" => Keyword::SetRaises,
            "getraises" => Keyword::GetRaises,
            "inherits" => Keyword::Inherits,
            "attribute" => Keyword::Attribute,
            "callback" => Keyword::Callback,
            "const" => Keyword::Const,
            "creator" => Keyword::Creator,
            "deleter" => Keyword::Deleter,
            "dictionary" => Keyword::Dictionary,
            "enum" => Keyword::Enum,
            "exception" => Keyword::Exception,
            "getter" => Keyword::Getter,
            "implements" => Keyword::Implements,
            "inherit" => Keyword::Inherit,
            "interface" => Keyword::Interface,
            "legacycaller" => Keyword::LegacyCaller,
            "partial" => Keyword::Partial,
            "setter" => Keyword::Setter,
            "static" => Keyword::Static,
            "stringifier" => Keyword::Stringifier,
            "typedef" => Keyword::Typedef,
            "unrestricted" => Keyword::Unrestricted,
            "readonly" => Keyword::ReadOnly,
            "Date" => Keyword::Date,
            "DOMString" => Keyword::DOMString,
            "Infinity" => Keyword::Infinity,
            "NaN" => Keyword::NaN,
            "any" => Keyword::Any,
            "boolean" => Keyword::Boolean,
            "byte" => Keyword::Byte,
            "double" => Keyword::Double,
            "false" => Keyword::False,
            "float" => Keyword::Float,
            "long" => Keyword::Long,
            "null" => Keyword::Null,
            "object" => Keyword::Object,
            "octet" => Keyword::Octet,
            "or" => Keyword::Or,
            "optional" => Keyword::Optional,
            "sequence" => Keyword::Sequence,
            "short" => Keyword::Short,
            "true" => Keyword::True,
            "unsigned" => Keyword::Unsigned,
            "void" => Keyword::Void,
            _ => return None,
        };
        Some(keyword)
    }

    /// Source spelling of the keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Module => "module",
            Keyword::Raises => "raises",
            Keyword::SetRaises => "setraises",
            Keyword::GetRaises => "getraises",
            Keyword::Inherits => "inherits",
            Keyword::Attribute => "attribute",
            Keyword::Callback => "callback",
            Keyword::Const => "const",
            Keyword::Creator => "creator",
            Keyword::Deleter => "deleter",
            Keyword::Dictionary => "dictionary",
            Keyword::Enum => "enum",
            Keyword::Exception => "exception",
            Keyword::Getter => "getter",
            Keyword::Implements => "implements",
            Keyword::Inherit => "inherit",
            Keyword::Interface => "interface",
            Keyword::LegacyCaller => "legacycaller",
            Keyword::Partial => "partial",
            Keyword::Setter => "setter",
            Keyword::Static => "static",
            Keyword::Stringifier => "stringifier",
            Keyword::Typedef => "typedef",
            Keyword::Unrestricted => "unrestricted",
            Keyword::ReadOnly => "readonly",
            Keyword::Date => "Date",
            Keyword::DOMString => "DOMString",
            Keyword::Infinity => "Infinity",
            Keyword::NaN => "NaN",
            Keyword::Any => "any",
            Keyword::Boolean => "boolean",
            Keyword::Byte => "byte",
            Keyword::Double => "double",
            Keyword::False => "false",
            Keyword::Float => "float",
            Keyword::Long => "long",
            Keyword::Null => "null",
            Keyword::Object => "object",
            Keyword::Octet => "octet",
            Keyword::Or => "or",
            Keyword::Optional => "optional",
            Keyword::Sequence => "sequence",
            Keyword::Short => "short",
            Keyword::True => "true",
            Keyword::Unsigned => "unsigned",
            Keyword::Void => "void",
        }
    }

    /// Returns `true` for keywords that may name an argument.
    pub fn is_argument_name(&self) -> bool {
        matches!(
            self,
            Keyword::Attribute
                | Keyword::Callback
                | Keyword::Const
                | Keyword::Creator
                | Keyword::Deleter
                | Keyword::Dictionary
                | Keyword::Enum
                | Keyword::Exception
                | Keyword::Getter
                | Keyword::Implements
                | Keyword::Inherit
                | Keyword::Interface
                | Keyword::LegacyCaller
                | Keyword::Partial
                | Keyword::Setter
                | Keyword::Static
                | Keyword::Stringifier
                | Keyword::Typedef
                | Keyword::Unrestricted
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    Keyword(Keyword),
    Identifier(&'src str),
    /// Hexadecimal, octal or decimal integer, sign included.
    Integer(i64),
    Float(f64),
    /// String contents without the surrounding quotes.
    String(&'src str),

    Ellipsis,
    Scope,
    Minus,
    Comma,
    Colon,
    Semicolon,
    LessThan,
    Equals,
    GreaterThan,
    Question,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
}

impl Token<'_> {
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Token::Keyword(k) if *k == keyword)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(keyword) => write!(f, "{keyword}"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Integer(value) => write!(f, "{value}"),
            Token::Float(value) => write!(f, "{value}"),
            Token::String(value) => write!(f, "{value}"),

            Token::Ellipsis => write!(f, "..."),
            Token::Scope => write!(f, "::"),
            Token::Minus => write!(f, "-"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::LessThan => write!(f, "<"),
            Token::Equals => write!(f, "="),
            Token::GreaterThan => write!(f, ">"),
            Token::Question => write!(f, "?"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
        }
    }
}

/// A token with its source span and 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
    pub line: usize,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span, line: usize) -> Self {
        Self { token, span, line }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_spelling_round_trips() {
        for word in ["module", "legacycaller", "DOMString", "float", "readonly"] {
            let keyword = Keyword::from_ident(word).unwrap();
            assert_eq!(keyword.as_str(), word);
        }
        assert_eq!(Keyword::from_ident("Module"), None);
        assert_eq!(Keyword::from_ident("BadgeManager"), None);
    }

    #[test]
    fn test_argument_name_keywords() {
        assert!(Keyword::Callback.is_argument_name());
        assert!(Keyword::Unrestricted.is_argument_name());
        assert!(!Keyword::ReadOnly.is_argument_name());
        assert!(!Keyword::Module.is_argument_name());
        assert!(!Keyword::DOMString.is_argument_name());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::Keyword(Keyword::Interface).to_string(), "interface");
        assert_eq!(Token::String("ok").to_string(), "ok");
        assert_eq!(Token::Integer(-16).to_string(), "-16");
        assert_eq!(Token::LeftBrace.to_string(), "{");
        assert_eq!(Token::Scope.to_string(), "::");
    }
}
