//! Parser for interface definition tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the parse tree defined in [`parser_types`](super::parser_types). The public
//! entry point is [`build_definitions`].
//!
//! Every construct is selected by its first token. A parser backtracks only
//! when that token cannot start it; everything after it is wrapped in
//! `cut_err`, so the first token that does not fit aborts parsing.

use winnow::{
    Parser,
    combinator::{alt, cut_err, delimited, eof, opt, preceded, repeat, separated, terminated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use oven_core::{
    ast::{PartialTarget, Special},
    identifier::Id,
    span::Span,
    types::{Literal, TypeRef},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types as types,
    tokens::{Keyword, PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what was expected at the failing token
    Label(&'static str),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type Error = ErrMode<ContextError<Context>>;
type IResult<O> = Result<O, Error>;

/// The next token, when it equals `expected`.
fn token<'src>(expected: Token<'static>) -> impl Parser<Input<'src>, (), Error> {
    any.verify(move |token: &PositionedToken<'_>| token.token == expected)
        .void()
}

fn keyword<'src>(keyword: Keyword) -> impl Parser<Input<'src>, (), Error> {
    any.verify(move |token: &PositionedToken<'_>| token.is_keyword(keyword))
        .void()
}

/// Commit to `parser`, naming it in the error when it does not match.
fn expect<'src, O>(
    parser: impl Parser<Input<'src>, O, Error>,
    label: &'static str,
) -> impl Parser<Input<'src>, O, Error> {
    cut_err(parser.context(Context::Label(label)))
}

fn semicolon<'src>(input: &mut Input<'src>) -> IResult<()> {
    expect(token(Token::Semicolon), "`;`").parse_next(input)
}

/// Run `parser` and also return the span from its first to its last token.
fn spanned<'src, O>(
    mut parser: impl Parser<Input<'src>, O, Error>,
) -> impl Parser<Input<'src>, (O, Span), Error> {
    move |input: &mut Input<'src>| -> IResult<(O, Span)> {
        let remaining: &'src [PositionedToken<'src>] = input.peek_slice(input.eof_offset());
        let value = parser.parse_next(input)?;
        let consumed = remaining.len() - input.eof_offset();
        let last = consumed.checked_sub(1).and_then(|index| remaining.get(index));
        let span = match (remaining.first(), last) {
            (Some(first), Some(last)) => first.span.union(last.span),
            _ => Span::default(),
        };
        Ok((value, span))
    }
}

fn identifier<'src>(input: &mut Input<'src>) -> IResult<Id> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::Identifier(name) => Some(Id::new(name)),
        _ => None,
    })
    .parse_next(input)
}

fn expect_identifier<'src>(input: &mut Input<'src>) -> IResult<Id> {
    expect(identifier, "identifier").parse_next(input)
}

/// Identifiers plus the keywords that are allowed to name an argument.
fn argument_name<'src>(input: &mut Input<'src>) -> IResult<Id> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::Identifier(name) => Some(Id::new(name)),
        Token::Keyword(keyword) if keyword.is_argument_name() => {
            Some(Id::new(keyword.as_str()))
        }
        _ => None,
    })
    .context(Context::Label("argument name"))
    .parse_next(input)
}

fn string_literal<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    any.verify_map(|token: &'src PositionedToken<'src>| match token.token {
        Token::String(value) => Some(value),
        _ => None,
    })
    .parse_next(input)
}

/// `ns::Name`, `::ns::Name` or `Name`, joined back into one identifier.
fn scoped_name<'src>(input: &mut Input<'src>) -> IResult<Id> {
    (
        opt(token(Token::Scope)),
        separated(1.., identifier, token(Token::Scope)),
    )
        .map(|(global, parts): (Option<()>, Vec<Id>)| {
            let joined = parts
                .iter()
                .map(Id::to_string)
                .collect::<Vec<_>>()
                .join("::");
            match global {
                Some(()) => Id::new(&format!("::{joined}")),
                None => Id::new(&joined),
            }
        })
        .parse_next(input)
}

/// `( ScopedName, ... )`
fn exception_list<'src>(input: &mut Input<'src>) -> IResult<Vec<Id>> {
    delimited(
        expect(token(Token::LeftParen), "`(`"),
        separated(1.., scoped_name, token(Token::Comma))
            .context(Context::Label("exception name")),
        expect(token(Token::RightParen), "`)`"),
    )
    .parse_next(input)
}

/// Optional exception clause introduced by `clause`.
fn raises<'src>(clause: Keyword) -> impl Parser<Input<'src>, Vec<Id>, Error> {
    opt(preceded(keyword(clause), cut_err(exception_list))).map(Option::unwrap_or_default)
}

/// Parse a chain of `[]` and `?` suffixes in any order.
///
/// Returns the number of `[]` pairs and whether any `?` was seen.
fn type_suffix<'src>(input: &mut Input<'src>) -> IResult<(usize, bool)> {
    repeat(
        0..,
        alt((
            preceded(
                token(Token::LeftBracket),
                expect(token(Token::RightBracket), "`]`"),
            )
            .value(true),
            token(Token::Question).value(false),
        )),
    )
    .fold(
        || (0, false),
        |(depth, nullable), array| {
            if array {
                (depth + 1, nullable)
            } else {
                (depth, true)
            }
        },
    )
    .parse_next(input)
}

fn suffixed<'src>(
    base: impl Parser<Input<'src>, TypeRef, Error>,
) -> impl Parser<Input<'src>, TypeRef, Error> {
    (base, type_suffix).map(|(ty, (depth, nullable))| ty.with_suffix(depth, nullable))
}

/// Types spelled by a single keyword out of `keywords`.
fn keyword_type<'src>(keywords: &'static [Keyword]) -> impl Parser<Input<'src>, TypeRef, Error> {
    any.verify_map(move |token: &PositionedToken<'_>| match token.token {
        Token::Keyword(keyword) if keywords.contains(&keyword) => {
            Some(TypeRef::named(keyword.as_str()))
        }
        _ => None,
    })
}

/// `short`, `long` or `long long`.
fn integer_width<'src>(input: &mut Input<'src>) -> IResult<&'static str> {
    alt((
        keyword(Keyword::Short).value("short"),
        preceded(keyword(Keyword::Long), opt(keyword(Keyword::Long)))
            .map(|long| if long.is_some() { "long long" } else { "long" }),
    ))
    .parse_next(input)
}

/// `[unsigned] short`, `[unsigned] long [long]`.
fn integer_type<'src>(input: &mut Input<'src>) -> IResult<TypeRef> {
    alt((
        preceded(
            keyword(Keyword::Unsigned),
            expect(integer_width, "`short` or `long`"),
        )
        .map(|name| TypeRef::named(name).with_unsigned(true)),
        integer_width.map(TypeRef::named),
    ))
    .parse_next(input)
}

/// `[unrestricted] float` or `[unrestricted] double`.
fn float_type<'src>(input: &mut Input<'src>) -> IResult<TypeRef> {
    let precision = || keyword_type(&[Keyword::Float, Keyword::Double]);
    alt((
        preceded(
            keyword(Keyword::Unrestricted),
            expect(precision(), "`float` or `double`"),
        )
        .map(|ty| ty.with_unrestricted(true)),
        precision(),
    ))
    .parse_next(input)
}

/// Primitive types without suffixes.
fn primitive_type<'src>(input: &mut Input<'src>) -> IResult<TypeRef> {
    alt((
        integer_type,
        float_type,
        keyword_type(&[Keyword::Boolean, Keyword::Byte, Keyword::Octet]),
    ))
    .parse_next(input)
}

/// `sequence<T>` with an optional trailing `?`.
fn sequence_type<'src>(input: &mut Input<'src>) -> IResult<TypeRef> {
    preceded(
        keyword(Keyword::Sequence),
        cut_err((
            delimited(
                expect(token(Token::LessThan), "`<`"),
                type_,
                expect(token(Token::GreaterThan), "`>`"),
            ),
            opt(token(Token::Question)),
        )),
    )
    .map(|(element, nullable)| element.into_sequence(nullable.is_some()))
    .parse_next(input)
}

/// `( A or B [or C ...] )`
fn union_type<'src>(input: &mut Input<'src>) -> IResult<TypeRef> {
    preceded(
        token(Token::LeftParen),
        cut_err(terminated(
            (
                type_,
                expect(keyword(Keyword::Or), "`or`"),
                separated(1.., type_, keyword(Keyword::Or)),
            ),
            expect(token(Token::RightParen), "`)`"),
        )),
    )
    .map(|(first, (), rest): (TypeRef, (), Vec<TypeRef>)| {
        let mut members = vec![first];
        members.extend(rest);
        TypeRef::union(members)
    })
    .parse_next(input)
}

/// Any type, including unions and `any`.
fn type_<'src>(input: &mut Input<'src>) -> IResult<TypeRef> {
    alt((
        sequence_type,
        suffixed(alt((
            union_type,
            keyword(Keyword::Any).map(|()| TypeRef::named("any")),
            primitive_type,
            keyword_type(&[Keyword::DOMString, Keyword::Object, Keyword::Date]),
            identifier.map(TypeRef::named),
        ))),
    ))
    .context(Context::Label("type"))
    .parse_next(input)
}

fn return_type<'src>(input: &mut Input<'src>) -> IResult<TypeRef> {
    alt((keyword(Keyword::Void).map(|()| TypeRef::void()), type_)).parse_next(input)
}

/// `PrimitiveType [?]` or `identifier [?]`.
fn const_type<'src>(input: &mut Input<'src>) -> IResult<TypeRef> {
    (
        alt((primitive_type, identifier.map(TypeRef::named))),
        opt(token(Token::Question)),
    )
        .map(|(base, nullable)| base.with_suffix(0, nullable.is_some()))
        .context(Context::Label("constant type"))
        .parse_next(input)
}

fn const_value<'src>(input: &mut Input<'src>) -> IResult<Literal> {
    alt((
        any.verify_map(|token: &PositionedToken<'_>| match token.token {
            Token::Keyword(Keyword::True) => Some(Literal::Boolean(true)),
            Token::Keyword(Keyword::False) => Some(Literal::Boolean(false)),
            Token::Keyword(Keyword::Null) => Some(Literal::Null),
            Token::Keyword(Keyword::Infinity) => Some(Literal::Infinity),
            Token::Keyword(Keyword::NaN) => Some(Literal::NaN),
            Token::Integer(value) => Some(Literal::Integer(value)),
            Token::Float(value) => Some(Literal::Float(value)),
            _ => None,
        }),
        preceded(
            token(Token::Minus),
            expect(keyword(Keyword::Infinity), "`Infinity`"),
        )
        .map(|()| Literal::NegativeInfinity),
    ))
    .context(Context::Label("constant value"))
    .parse_next(input)
}

/// Optional `= DefaultValue`.
fn default_value<'src>(input: &mut Input<'src>) -> IResult<Option<Literal>> {
    opt(preceded(
        token(Token::Equals),
        cut_err(alt((
            string_literal.map(|value| Literal::String(value.to_owned())),
            const_value,
        ))),
    ))
    .parse_next(input)
}

/// Extended attributes followed by `body`, and the span covering both.
///
/// Once an attribute was read, `body` is mandatory.
fn with_attributes<'src, O>(
    mut body: impl Parser<Input<'src>, O, Error>,
) -> impl Parser<Input<'src>, (Vec<types::ExtendedAttribute>, O, Span), Error> {
    spanned(
        move |input: &mut Input<'src>| -> IResult<(Vec<types::ExtendedAttribute>, O)> {
            let attributes = extended_attribute_list(input)?;
            let value = if attributes.is_empty() {
                body.parse_next(input)?
            } else {
                cut_err(body.by_ref()).parse_next(input)?
            };
            Ok((attributes, value))
        },
    )
    .map(|((attributes, value), span)| (attributes, value, span))
}

fn optional_argument<'src>(input: &mut Input<'src>) -> IResult<types::Argument> {
    preceded(
        keyword(Keyword::Optional),
        cut_err((type_, argument_name, default_value)),
    )
    .map(|(value_type, name, default)| types::Argument {
        attributes: Vec::new(),
        name,
        value_type,
        default,
        optional: true,
        variadic: false,
        span: Span::default(),
    })
    .parse_next(input)
}

fn required_argument<'src>(input: &mut Input<'src>) -> IResult<types::Argument> {
    (
        type_,
        cut_err((opt(token(Token::Ellipsis)), argument_name)),
    )
        .map(|(value_type, (variadic, name))| types::Argument {
            attributes: Vec::new(),
            name,
            value_type,
            default: None,
            optional: false,
            variadic: variadic.is_some(),
            span: Span::default(),
        })
        .parse_next(input)
}

/// `[ExtAttrs] optional Type Name [= Default]` or `[ExtAttrs] Type [...] Name`.
fn argument<'src>(input: &mut Input<'src>) -> IResult<types::Argument> {
    with_attributes(alt((optional_argument, required_argument)))
        .map(|(attributes, argument, span)| types::Argument {
            attributes,
            span,
            ..argument
        })
        .parse_next(input)
}

/// `( Argument, ... )`
fn parenthesized_arguments<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Argument>> {
    delimited(
        expect(token(Token::LeftParen), "`(`"),
        separated(0.., argument, token(Token::Comma)),
        expect(token(Token::RightParen), "`)`"),
    )
    .parse_next(input)
}

/// `Name`, `Name=Identity`, `Name(args)` or `Name=Identity(args)`.
fn extended_attribute<'src>(input: &mut Input<'src>) -> IResult<types::ExtendedAttribute> {
    (
        identifier,
        opt(preceded(token(Token::Equals), expect_identifier)),
        opt(delimited(
            token(Token::LeftParen),
            separated(0.., argument, token(Token::Comma)),
            expect(token(Token::RightParen), "`)`"),
        )),
    )
        .map(|(name, identity, arguments)| types::ExtendedAttribute {
            name,
            identity,
            arguments,
        })
        .parse_next(input)
}

/// Optional `[A, B=C, D(args), ...]`.
fn extended_attribute_list<'src>(
    input: &mut Input<'src>,
) -> IResult<Vec<types::ExtendedAttribute>> {
    opt(delimited(
        token(Token::LeftBracket),
        cut_err(
            separated(1.., extended_attribute, token(Token::Comma))
                .context(Context::Label("extended attribute")),
        ),
        expect(token(Token::RightBracket), "`]`"),
    ))
    .map(Option::unwrap_or_default)
    .parse_next(input)
}

/// Optional `: Parent`.
fn inheritance<'src>(input: &mut Input<'src>) -> IResult<Option<Id>> {
    opt(preceded(token(Token::Colon), expect_identifier)).parse_next(input)
}

/// `const ConstType Name = ConstValue ;`
fn const_member<'src>(input: &mut Input<'src>) -> IResult<(Id, types::MemberKind)> {
    preceded(
        keyword(Keyword::Const),
        cut_err((
            const_type,
            expect_identifier,
            expect(token(Token::Equals), "`=`"),
            const_value,
            semicolon,
        )),
    )
    .map(|(value_type, name, (), value, ())| {
        (name, types::MemberKind::Const { value_type, value })
    })
    .parse_next(input)
}

/// `[inherit] [readonly] attribute Type Name [getraises] [setraises] [raises] ;`
fn attribute<'src>(input: &mut Input<'src>) -> IResult<(Id, types::MemberKind)> {
    let inherited = opt(keyword(Keyword::Inherit)).parse_next(input)?.is_some();
    let readonly = opt(keyword(Keyword::ReadOnly)).parse_next(input)?.is_some();
    if inherited || readonly {
        expect(keyword(Keyword::Attribute), "`attribute`").parse_next(input)?;
    } else {
        keyword(Keyword::Attribute).parse_next(input)?;
    }

    cut_err((
        type_,
        expect_identifier,
        raises(Keyword::GetRaises),
        raises(Keyword::SetRaises),
        raises(Keyword::Raises),
        semicolon,
    ))
    .map(|(value_type, name, ..)| {
        let kind = types::MemberKind::Attribute {
            value_type,
            inherited,
            readonly,
        };
        (name, kind)
    })
    .parse_next(input)
}

/// `ReturnType [Name] ( Arguments ) [raises (...)] ;`
fn operation_rest<'src>(
    is_static: bool,
    specials: Vec<Special>,
) -> impl Parser<Input<'src>, (Id, types::MemberKind), Error> {
    (
        return_type,
        cut_err((
            opt(identifier),
            parenthesized_arguments,
            raises(Keyword::Raises),
            semicolon,
        )),
    )
        .map(move |(return_type, (name, arguments, raises, ()))| {
            let kind = types::MemberKind::Operation {
                return_type,
                is_static,
                specials: specials.clone(),
                arguments,
                raises,
            };
            (name.unwrap_or_else(|| Id::new("")), kind)
        })
}

fn special<'src>(input: &mut Input<'src>) -> IResult<Special> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::Keyword(Keyword::Getter) => Some(Special::Getter),
        Token::Keyword(Keyword::Setter) => Some(Special::Setter),
        Token::Keyword(Keyword::Creator) => Some(Special::Creator),
        Token::Keyword(Keyword::Deleter) => Some(Special::Deleter),
        Token::Keyword(Keyword::LegacyCaller) => Some(Special::LegacyCaller),
        _ => None,
    })
    .parse_next(input)
}

/// Regular, `static` and special operations.
fn operation<'src>(input: &mut Input<'src>) -> IResult<(Id, types::MemberKind)> {
    if opt(keyword(Keyword::Static)).parse_next(input)?.is_some() {
        return cut_err(operation_rest(true, Vec::new())).parse_next(input);
    }

    let specials: Vec<Special> = repeat(0.., special).parse_next(input)?;
    if specials.is_empty() {
        operation_rest(false, specials).parse_next(input)
    } else {
        cut_err(operation_rest(false, specials)).parse_next(input)
    }
}

/// `stringifier ;`, `stringifier attribute ...` or `stringifier ReturnType ...`.
fn stringifier<'src>(input: &mut Input<'src>) -> IResult<(Id, types::MemberKind)> {
    preceded(
        keyword(Keyword::Stringifier),
        cut_err(alt((
            token(Token::Semicolon).map(|()| {
                let kind = types::MemberKind::Operation {
                    return_type: TypeRef::named("DOMString"),
                    is_static: false,
                    specials: vec![Special::Stringifier],
                    arguments: Vec::new(),
                    raises: Vec::new(),
                };
                (Id::new(""), kind)
            }),
            attribute,
            operation_rest(false, vec![Special::Stringifier]),
        ))),
    )
    .parse_next(input)
}

fn member(
    (attributes, (name, kind), span): (
        Vec<types::ExtendedAttribute>,
        (Id, types::MemberKind),
        Span,
    ),
) -> types::Member {
    types::Member {
        attributes,
        name,
        kind,
        span,
    }
}

fn interface_member<'src>(input: &mut Input<'src>) -> IResult<types::Member> {
    with_attributes(alt((const_member, stringifier, attribute, operation)))
        .map(member)
        .parse_next(input)
}

/// `[ExtAttrs] Type Name [= Default] ;`
fn dictionary_member<'src>(input: &mut Input<'src>) -> IResult<types::Member> {
    with_attributes(
        (
            type_,
            cut_err((expect_identifier, default_value, semicolon)),
        )
            .map(|(value_type, (name, default, ()))| {
                let kind = types::MemberKind::DictionaryMember {
                    value_type,
                    default,
                };
                (name, kind)
            }),
    )
    .map(member)
    .parse_next(input)
}

/// `[ExtAttrs] const ...` or `[ExtAttrs] Type Name ;`
fn exception_member<'src>(input: &mut Input<'src>) -> IResult<types::Member> {
    let field = (type_, cut_err(terminated(expect_identifier, semicolon)))
        .map(|(value_type, name)| (name, types::MemberKind::Field { value_type }));
    with_attributes(alt((const_member, field)))
        .map(member)
        .parse_next(input)
}

fn interface_members<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Member>> {
    repeat(0.., interface_member).parse_next(input)
}

fn dictionary_members<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Member>> {
    repeat(0.., dictionary_member).parse_next(input)
}

fn exception_members<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Member>> {
    repeat(0.., exception_member).parse_next(input)
}

/// `{ body } ;`
fn braced<'src, O>(
    body: impl Parser<Input<'src>, O, Error>,
) -> impl Parser<Input<'src>, O, Error> {
    terminated(
        delimited(
            expect(token(Token::LeftBrace), "`{`"),
            body,
            expect(token(Token::RightBrace), "`}`"),
        ),
        semicolon,
    )
}

/// A definition without attributes; [`definition`] fills them in.
fn bare(name: Id, kind: types::DefinitionKind) -> types::Definition {
    types::Definition {
        attributes: Vec::new(),
        name,
        kind,
        span: Span::default(),
    }
}

fn module<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    preceded(
        keyword(Keyword::Module),
        cut_err((expect_identifier, braced(nested_definitions))),
    )
    .map(|(name, definitions)| bare(name, types::DefinitionKind::Module { definitions }))
    .parse_next(input)
}

/// `Name [: Parent] { members } ;` after the `interface` keyword.
fn interface_rest<'src>(callback: bool) -> impl Parser<Input<'src>, types::Definition, Error> {
    (expect_identifier, inheritance, braced(interface_members)).map(
        move |(name, inherit, members)| {
            let kind = types::DefinitionKind::Interface {
                inherit,
                callback,
                members,
            };
            bare(name, kind)
        },
    )
}

fn interface<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    preceded(keyword(Keyword::Interface), cut_err(interface_rest(false))).parse_next(input)
}

/// `callback interface ...` or `callback Name = ReturnType ( args ) ;`
fn callback<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    let function = (
        identifier,
        cut_err((
            expect(token(Token::Equals), "`=`"),
            return_type,
            parenthesized_arguments,
            semicolon,
        )),
    )
        .map(|(name, ((), return_type, arguments, ()))| {
            let kind = types::DefinitionKind::Callback {
                return_type,
                arguments,
            };
            bare(name, kind)
        });

    preceded(
        keyword(Keyword::Callback),
        cut_err(
            alt((
                preceded(keyword(Keyword::Interface), interface_rest(true)),
                function,
            ))
            .context(Context::Label("`interface` or identifier")),
        ),
    )
    .parse_next(input)
}

fn partial<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    let lower = |target: PartialTarget, (name, members): (Id, Vec<types::Member>)| {
        bare(name, types::DefinitionKind::Partial { target, members })
    };

    preceded(
        keyword(Keyword::Partial),
        cut_err(
            alt((
                preceded(
                    keyword(Keyword::Interface),
                    (expect_identifier, braced(interface_members)),
                )
                .map(move |body| lower(PartialTarget::Interface, body)),
                preceded(
                    keyword(Keyword::Dictionary),
                    (expect_identifier, braced(dictionary_members)),
                )
                .map(move |body| lower(PartialTarget::Dictionary, body)),
            ))
            .context(Context::Label("`interface` or `dictionary`")),
        ),
    )
    .parse_next(input)
}

fn dictionary<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    preceded(
        keyword(Keyword::Dictionary),
        cut_err((expect_identifier, inheritance, braced(dictionary_members))),
    )
    .map(|(name, inherit, members)| {
        bare(name, types::DefinitionKind::Dictionary { inherit, members })
    })
    .parse_next(input)
}

fn exception<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    preceded(
        keyword(Keyword::Exception),
        cut_err((expect_identifier, inheritance, braced(exception_members))),
    )
    .map(|(name, inherit, members)| {
        bare(name, types::DefinitionKind::Exception { inherit, members })
    })
    .parse_next(input)
}

/// `enum Name { "a", "b" } ;`
fn enumeration<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    preceded(
        keyword(Keyword::Enum),
        cut_err((
            expect_identifier,
            braced(
                separated(1.., string_literal.map(Id::new), token(Token::Comma))
                    .context(Context::Label("string")),
            ),
        )),
    )
    .map(|(name, values)| bare(name, types::DefinitionKind::Enum { values }))
    .parse_next(input)
}

/// `typedef [ExtAttrs] Type Name ;`; the inner attributes stay with the typedef.
fn typedef<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    preceded(
        keyword(Keyword::Typedef),
        cut_err((extended_attribute_list, type_, expect_identifier, semicolon)),
    )
    .map(|(attributes, aliased, name, ())| types::Definition {
        attributes,
        name,
        kind: types::DefinitionKind::Typedef { aliased },
        span: Span::default(),
    })
    .parse_next(input)
}

/// `Subject implements Interface ;`
fn implements<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    (
        identifier,
        cut_err((
            expect(keyword(Keyword::Implements), "`implements`"),
            expect_identifier,
            semicolon,
        )),
    )
        .map(|(name, ((), implemented, ()))| {
            bare(name, types::DefinitionKind::Implements { implemented })
        })
        .parse_next(input)
}

fn definition<'src>(input: &mut Input<'src>) -> IResult<types::Definition> {
    with_attributes(
        alt((
            module,
            callback,
            interface,
            partial,
            dictionary,
            exception,
            enumeration,
            typedef,
            implements,
        ))
        .context(Context::Label("definition")),
    )
    .map(|(mut attributes, mut definition, span)| {
        attributes.append(&mut definition.attributes);
        types::Definition {
            attributes,
            span,
            ..definition
        }
    })
    .parse_next(input)
}

/// Definitions inside a module body.
fn nested_definitions<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Definition>> {
    repeat(0.., definition).parse_next(input)
}

/// Definitions up to the end of input.
fn definitions<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Definition>> {
    terminated(nested_definitions, expect(eof, "definition")).parse_next(input)
}

/// Convert a parser failure into a syntax error diagnostic.
///
/// The failing token is the one the stream was positioned at when the
/// parser gave up; the innermost label becomes the help text.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let expected = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            e.context().next().map(|Context::Label(label)| *label)
        }
        ErrMode::Incomplete(_) => None,
    };

    let offset = tokens.len().saturating_sub(current_remaining);
    let diagnostic = match tokens.get(offset) {
        Some(token) => Diagnostic::error(format!(
            "syntax error at '{}' on line {}",
            token.token, token.line
        ))
        .with_code(ErrorCode::E100)
        .with_label(token.span, ErrorCode::E100.description()),
        None => {
            let end = tokens.last().map(|t| t.span.end()).unwrap_or_default();
            Diagnostic::error("syntax error at end of input")
                .with_code(ErrorCode::E101)
                .with_label(Span::new(end..end), ErrorCode::E101.description())
        }
    };

    match expected {
        Some(label) => diagnostic.with_help(format!("expected {label}")),
        None => diagnostic,
    }
}

/// Parse the token stream into top-level definitions.
pub fn build_definitions<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<Vec<types::Definition>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    definitions(&mut token_slice).map_err(|e| {
        let current_remaining = token_slice.eof_offset();
        convert_error(e, tokens, current_remaining)
    })
}
