//! Lexical analyzer for interface definition sources.
//!
//! The lexer converts source text into [`PositionedToken`]s. Whitespace and
//! comments are consumed here and never reach the parser; every token carries
//! its byte span and the line it starts on.
//!
//! The public entry point is [`tokenize`]. Illegal characters do not stop
//! lexing: each one is reported as a warning and skipped.

use winnow::{
    Parser as _,
    ascii::{digit0, digit1, hex_digit1, multispace1},
    combinator::{alt, cut_err, opt, preceded, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, take_till, take_until, take_while},
};

use crate::{
    Span,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    tokens::{Keyword, PositionedToken, Token},
};

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// Offset where the offending lexeme starts.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn whitespace(input: &mut Input<'_>) -> IResult<()> {
    multispace1.void().parse_next(input)
}

fn line_comment(input: &mut Input<'_>) -> IResult<()> {
    ("//", take_till(0.., '\n')).void().parse_next(input)
}

fn block_comment(input: &mut Input<'_>) -> IResult<()> {
    let start = input.current_token_start();
    "/*".parse_next(input)?;

    cut_err(terminated(take_until(0.., "*/"), "*/"))
        .void()
        .context(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "unterminated block comment",
            help: Some("close the comment with `*/`"),
            start,
        })
        .parse_next(input)
}

/// Whitespace and comments.
fn trivia(input: &mut Input<'_>) -> IResult<()> {
    alt((whitespace, line_comment, block_comment)).parse_next(input)
}

/// `"..."` without escape processing; the quotes are stripped.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    '"'.parse_next(input)?;

    cut_err(terminated(take_till(0.., '"'), '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start,
        })
        .map(Token::String)
        .parse_next(input)
}

fn exponent(input: &mut Input<'_>) -> IResult<()> {
    (one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)
        .void()
        .parse_next(input)
}

/// `-?(digits.digits? | .digits)(exp)?` or `-?digits exp`.
fn float_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        (
            opt('-'),
            alt(((digit1, '.', digit0).void(), ('.', digit1).void())),
            opt(exponent),
        )
            .take(),
        (opt('-'), digit1, exponent).take(),
    ))
    .try_map(str::parse::<f64>)
    .map(Token::Float)
    .parse_next(input)
}

fn hex_integer<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let (sign, digits) = (
        opt('-'),
        preceded(('0', one_of(['x', 'X'])), hex_digit1),
    )
        .parse_next(input)?;
    integer_value(input, start, sign.is_some(), digits, 16)
}

fn octal_integer<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let (sign, digits) = (
        opt('-'),
        preceded('0', take_while(1.., '0'..='7')),
    )
        .parse_next(input)?;
    integer_value(input, start, sign.is_some(), digits, 8)
}

fn decimal_integer<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let (sign, digits) = alt((
        (opt('-'), (one_of('1'..='9'), digit0).take()),
        "0".map(|zero| (None, zero)),
    ))
    .parse_next(input)?;
    integer_value(input, start, sign.is_some(), digits, 10)
}

/// Converts integer digits to `i64`, failing with E004 when out of range.
fn integer_value<'a>(
    input: &mut Input<'a>,
    start: usize,
    negative: bool,
    digits: &str,
    radix: u32,
) -> IResult<Token<'a>> {
    let signed = if negative {
        format!("-{digits}")
    } else {
        digits.to_owned()
    };

    match i64::from_str_radix(&signed, radix) {
        Ok(value) => Ok(Token::Integer(value)),
        Err(_) => Err(ErrMode::Cut(ContextError::new().add_context(
            input,
            &input.checkpoint(),
            LexerDiagnostic {
                code: ErrorCode::E004,
                message: "integer literal out of range",
                help: Some("integer literals must fit in a signed 64-bit value"),
                start,
            },
        ))),
    }
}

/// Identifiers, re-tagged as keywords when their spelling is reserved.
fn identifier_or_keyword<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(|ident: &'a str| {
            Keyword::from_ident(ident).map_or(Token::Identifier(ident), Token::Keyword)
        })
        .parse_next(input)
}

fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        "...".value(Token::Ellipsis),
        "::".value(Token::Scope),
        '-'.value(Token::Minus),
        ','.value(Token::Comma),
        ':'.value(Token::Colon),
        ';'.value(Token::Semicolon),
        '<'.value(Token::LessThan),
        '='.value(Token::Equals),
        '>'.value(Token::GreaterThan),
        '?'.value(Token::Question),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
    ))
    .parse_next(input)
}

/// Parse a single token.
fn token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        string_literal,
        float_literal, // Must come before integers so `1.5` stays one literal
        hex_integer,   // Must come before octal and decimal
        octal_integer,
        decimal_integer,
        identifier_or_keyword,
        punctuation, // `-` only after signed literals had their chance
    ))
    .parse_next(input)
}

/// Parse either trivia (`None`) or a token.
fn lexeme<'a>(input: &mut Input<'a>) -> IResult<Option<Token<'a>>> {
    alt((trivia.value(None), token.map(Some))).parse_next(input)
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
    /// Line number at `line_offset`.
    line: usize,
    line_offset: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            line: 1,
            line_offset: 0,
        }
    }

    /// Tokenize the input, collecting tokens and diagnostics.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            let checkpoint = input.checkpoint();
            let start = input.current_token_start();

            match lexeme(&mut input) {
                Ok(Some(token)) => {
                    let end = input.current_token_start();
                    let line = self.line_at(start);
                    self.tokens
                        .push(PositionedToken::new(token, Span::new(start..end), line));
                }
                Ok(None) => {}
                Err(err) => {
                    let error_pos = input.current_token_start();
                    let (diagnostic, resume) = self.convert_err_mode(err, start, error_pos);
                    self.diagnostics.emit(diagnostic);

                    input.reset(&checkpoint);
                    input.next_slice(resume - start);
                }
            }
        }
    }

    /// Line number of `offset`; offsets must be queried in increasing order.
    fn line_at(&mut self, offset: usize) -> usize {
        let offset = offset.min(self.source.len());
        if offset > self.line_offset {
            self.line += self.source[self.line_offset..offset]
                .bytes()
                .filter(|b| *b == b'\n')
                .count();
            self.line_offset = offset;
        }
        self.line
    }

    /// Finish lexing and return the tokens with any warnings.
    fn finish(self) -> Result<(Vec<PositionedToken<'a>>, Vec<Diagnostic>), ParseError> {
        let Self {
            tokens,
            diagnostics,
            ..
        } = self;
        diagnostics.finish().map(|warnings| (tokens, warnings))
    }

    /// Convert a lexer failure into a diagnostic and the offset to resume at.
    ///
    /// Out-of-range integers are errors and skip the whole literal. Every
    /// other failure is a warning that skips only the character at `start`.
    fn convert_err_mode(
        &mut self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        start: usize,
        error_pos: usize,
    ) -> (Diagnostic, usize) {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        let line = self.line_at(start);
        let ch = self.source[start..].chars().next().unwrap_or('\0');
        let char_end = start + ch.len_utf8();

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start: lexeme_start,
        }) = context_error.context().next()
        {
            let (diagnostic, resume) = if *code == ErrorCode::E004 {
                let span = Span::new(*lexeme_start..error_pos);
                let diag = Diagnostic::error(format!("{message} on line {line}"))
                    .with_code(*code)
                    .with_label(span, code.description());
                (diag, error_pos.max(char_end))
            } else {
                let span = Span::new(*lexeme_start..char_end);
                let diag = Diagnostic::warning(format!("{message} on line {line}"))
                    .with_code(*code)
                    .with_label(span, code.description());
                (diag, char_end)
            };
            let diagnostic = match help {
                Some(h) => diagnostic.with_help(*h),
                None => diagnostic,
            };
            return (diagnostic, resume);
        }

        let span = Span::new(start..char_end);
        let diagnostic = Diagnostic::warning(format!("illegal character '{ch}' on line {line}"))
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description());
        (diagnostic, char_end)
    }
}

/// Tokenize `input`, skipping illegal characters.
///
/// # Returns
///
/// - `Ok((tokens, warnings))` - tokens in source order plus recovered problems
/// - `Err(ParseError)` - an unrecoverable literal was found; holds every diagnostic
pub fn tokenize(input: &str) -> Result<(Vec<PositionedToken<'_>>, Vec<Diagnostic>), ParseError> {
    let mut lexer = Lexer::new(input);
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
