//! Lexer for the form file format using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Declarations
    #[token("container")]
    Container,
    #[token("horizontal")]
    Horizontal,
    #[token("vertical")]
    Vertical,

    // Intervals
    #[token("parallel")]
    Parallel,
    #[token("sequential")]
    Sequential,
    #[token("component")]
    Component,
    #[token("gap")]
    Gap,

    // Punctuation
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // Literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_$.]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""[^"\n]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    String(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i32>().ok())]
    Number(i32),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,

    /// Input the lexer could not match
    Invalid,
}

/// Tokenize input, turning unrecognized input into [`Token::Invalid`]
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| (tok.unwrap_or(Token::Invalid), span))
}

/// Whether a name can be written without quotes
pub fn is_bare_name(name: &str) -> bool {
    let mut lexer = Token::lexer(name);
    matches!(lexer.next(), Some(Ok(Token::Ident(_)))) && lexer.next().is_none()
}
