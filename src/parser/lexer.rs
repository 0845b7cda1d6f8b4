//! Script lexer/tokenizer
//!
//! Converts source text into tokens one at a time. Whether a `/` starts a
//! regular expression or is the division operator cannot be decided by the
//! lexer alone, so [`Lexer::next_token`] takes a hint from the caller.

use std::fmt;

use crate::error::{ScriptError, ScriptResult};

/// Punctuation and operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    Plus,       // +
    PlusPlus,   // ++
    PlusEq,     // +=
    Minus,      // -
    MinusMinus, // --
    MinusEq,    // -=
    Star,       // *
    StarEq,     // *=
    Slash,      // /
    SlashEq,    // /=
    Percent,    // %

    Eq,     // =
    EqEq,   // ==
    Bang,   // !
    BangEq, // !=

    Lt,   // <
    LtEq, // <=
    LtLt, // <<
    Gt,   // >
    GtEq, // >=
    GtGt, // >>

    Amp,      // &
    AmpAmp,   // &&
    Pipe,     // |
    PipePipe, // ||
    Caret,    // ^

    Semicolon, // ;
    Comma,     // ,
    Dot,       // .

    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }

    /// Any other single character
    Other(char),
}

impl Punct {
    fn single(c: char) -> Punct {
        match c {
            '+' => Punct::Plus,
            '-' => Punct::Minus,
            '*' => Punct::Star,
            '/' => Punct::Slash,
            '%' => Punct::Percent,
            '=' => Punct::Eq,
            '!' => Punct::Bang,
            '<' => Punct::Lt,
            '>' => Punct::Gt,
            '&' => Punct::Amp,
            '|' => Punct::Pipe,
            '^' => Punct::Caret,
            ';' => Punct::Semicolon,
            ',' => Punct::Comma,
            '.' => Punct::Dot,
            '(' => Punct::LParen,
            ')' => Punct::RParen,
            '[' => Punct::LBracket,
            ']' => Punct::RBracket,
            '{' => Punct::LBrace,
            '}' => Punct::RBrace,
            other => Punct::Other(other),
        }
    }

    /// Two-character operators are preferred over their one-character prefix
    fn double(first: char, second: char) -> Option<Punct> {
        let punct = match (first, second) {
            ('!', '=') => Punct::BangEq,
            ('=', '=') => Punct::EqEq,
            ('>', '=') => Punct::GtEq,
            ('<', '=') => Punct::LtEq,
            ('&', '&') => Punct::AmpAmp,
            ('|', '|') => Punct::PipePipe,
            ('+', '=') => Punct::PlusEq,
            ('-', '=') => Punct::MinusEq,
            ('+', '+') => Punct::PlusPlus,
            ('-', '-') => Punct::MinusMinus,
            ('*', '=') => Punct::StarEq,
            ('/', '=') => Punct::SlashEq,
            ('<', '<') => Punct::LtLt,
            ('>', '>') => Punct::GtGt,
            _ => return None,
        };
        Some(punct)
    }
}

impl fmt::Display for Punct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Punct::Plus => "+",
            Punct::PlusPlus => "++",
            Punct::PlusEq => "+=",
            Punct::Minus => "-",
            Punct::MinusMinus => "--",
            Punct::MinusEq => "-=",
            Punct::Star => "*",
            Punct::StarEq => "*=",
            Punct::Slash => "/",
            Punct::SlashEq => "/=",
            Punct::Percent => "%",
            Punct::Eq => "=",
            Punct::EqEq => "==",
            Punct::Bang => "!",
            Punct::BangEq => "!=",
            Punct::Lt => "<",
            Punct::LtEq => "<=",
            Punct::LtLt => "<<",
            Punct::Gt => ">",
            Punct::GtEq => ">=",
            Punct::GtGt => ">>",
            Punct::Amp => "&",
            Punct::AmpAmp => "&&",
            Punct::Pipe => "|",
            Punct::PipePipe => "||",
            Punct::Caret => "^",
            Punct::Semicolon => ";",
            Punct::Comma => ",",
            Punct::Dot => ".",
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::LBracket => "[",
            Punct::RBracket => "]",
            Punct::LBrace => "{",
            Punct::RBrace => "}",
            Punct::Other(c) => return write!(f, "{}", c),
        };
        f.write_str(text)
    }
}

/// Token types
///
/// Keywords are not distinguished from identifiers here; the interpreter
/// recognizes them by name where a statement or operator may start.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Punct(Punct),
    String(String),
    Int(i64),
    Float(f64),
    Ident(String),
    RegExp {
        pattern: String,
        global: bool,
        insensitive: bool,
    },
}

impl Token {
    /// Check whether this is the given punctuation
    #[inline]
    pub fn is_punct(&self, punct: Punct) -> bool {
        matches!(self, Token::Punct(p) if *p == punct)
    }

    /// Check whether this is an identifier with the given name
    #[inline]
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Token::Ident(s) if s == name)
    }

    /// Get the identifier name, if this is an identifier
    #[inline]
    pub fn ident(&self) -> Option<&str> {
        match self {
            Token::Ident(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable description used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Punct(p) => format!("Punctuation: {}", p),
            Token::String(s) => format!("String: '{}'", s),
            Token::Int(i) => format!("Int: {}", i),
            Token::Float(v) => format!("Float: {}", v),
            Token::Ident(s) => format!("Symbol: {}", s),
            Token::RegExp {
                pattern,
                global,
                insensitive,
            } => format!("Regexp: {}({})", pattern, flags(*global, *insensitive)),
        }
    }
}

fn flags(global: bool, insensitive: bool) -> &'static str {
    match (global, insensitive) {
        (true, true) => "gi",
        (true, false) => "g",
        (false, true) => "i",
        (false, false) => "",
    }
}

/// Source form; lexing the output again yields an equal token
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Punct(p) => write!(f, "{}", p),
            Token::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '"' => f.write_str("\\\"")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")
            }
            Token::Int(i) => write!(f, "{}", i),
            Token::Float(v) => {
                let text = v.to_string();
                if text.contains('.') {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
            Token::Ident(s) => f.write_str(s),
            Token::RegExp {
                pattern,
                global,
                insensitive,
            } => write!(f, "/{}/{}", pattern, flags(*global, *insensitive)),
        }
    }
}

/// Source position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourcePos {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourcePos {
    /// Compute line and column (both 1-based) of a byte offset
    pub fn locate(source: &str, offset: usize) -> Self {
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before.get(line_start..).map_or(0, |s| s.chars().count()) + 1;
        SourcePos {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Lexer for script source code
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source
    pub fn new(source: &'a str) -> Self {
        Lexer { source, pos: 0 }
    }

    /// The full source text
    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Current byte offset
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to a byte offset previously obtained from [`Lexer::position`]
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.source.len());
    }

    fn rest(&self) -> &'a str {
        self.source.get(self.pos..).unwrap_or("")
    }

    /// Peek at the current character without consuming it
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume the current character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace (any control character or space) and comments
    fn skip_whitespace(&mut self) {
        loop {
            let rest = self.rest();
            if rest.starts_with("/*") {
                self.pos = match rest.get(2..).and_then(|s| s.find("*/")) {
                    Some(end) => self.pos + 2 + end + 2,
                    None => self.source.len(),
                };
            } else if rest.starts_with("//") {
                // Stop at the newline; it is skipped as whitespace next round
                self.pos = match rest.find('\n') {
                    Some(end) => self.pos + end,
                    None => self.source.len(),
                };
            } else {
                match self.peek() {
                    Some(c) if c <= ' ' => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }
    }

    /// Read the next token, or `None` at end of input
    ///
    /// `slash_is_legal` is set by the caller when a `/` at this point can only
    /// be an operator. Otherwise a `/` starts a regular expression literal.
    pub fn next_token(&mut self, slash_is_legal: bool) -> ScriptResult<Option<Token>> {
        self.skip_whitespace();

        let Some(c) = self.advance() else {
            return Ok(None);
        };

        let token = match c {
            '\'' | '"' => self.read_string(c),
            '0'..='9' => self.read_number(c)?,
            'a'..='z' | 'A'..='Z' | '_' => self.read_identifier(),
            '/' if !slash_is_legal => self.read_regexp(),
            _ => {
                let double = self.peek().and_then(|next| Punct::double(c, next));
                match double {
                    Some(punct) => {
                        self.advance();
                        Token::Punct(punct)
                    }
                    None => Token::Punct(Punct::single(c)),
                }
            }
        };
        Ok(Some(token))
    }

    /// Read a string literal whose opening quote has been consumed
    ///
    /// Two literals separated only by whitespace are one token, and an
    /// unterminated literal runs to end of input.
    fn read_string(&mut self, mut quote: char) -> Token {
        let mut s = String::new();

        while let Some(c) = self.advance() {
            if c == '\\' {
                match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('r') => s.push('\r'),
                    Some('t') => s.push('\t'),
                    Some(other) => s.push(other),
                    None => {}
                }
            } else if c == quote {
                while matches!(self.peek(), Some(w) if w <= ' ') {
                    self.advance();
                }
                match self.peek() {
                    Some(next @ ('\'' | '"')) => {
                        self.advance();
                        quote = next;
                    }
                    _ => break,
                }
            } else {
                s.push(c);
            }
        }

        Token::String(s)
    }

    /// Read a number literal; a `.` anywhere makes it a float (no exponents)
    fn read_number(&mut self, first: char) -> ScriptResult<Token> {
        let start = self.pos - first.len_utf8();
        let mut is_float = false;

        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {}
                '.' => is_float = true,
                _ => break,
            }
            self.advance();
        }

        let text = self.source.get(start..self.pos).unwrap_or("");
        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| ScriptError::syntax(format!("Malformed number literal '{}'", text)))
        } else {
            text.parse::<i64>()
                .map(Token::Int)
                .map_err(|_| ScriptError::syntax(format!("Integer literal '{}' out of range", text)))
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let start = self.pos - 1;

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        Token::Ident(self.source.get(start..self.pos).unwrap_or("").to_string())
    }

    /// Read a regular expression literal whose opening `/` has been consumed
    ///
    /// Escapes are kept verbatim for the regex engine. At most one `g` and one
    /// `i` flag are taken, in either order.
    fn read_regexp(&mut self) -> Token {
        let mut pattern = String::new();

        while let Some(c) = self.advance() {
            match c {
                '\\' => {
                    pattern.push('\\');
                    if let Some(escaped) = self.advance() {
                        pattern.push(escaped);
                    }
                }
                '/' => break,
                c => pattern.push(c),
            }
        }

        let mut global = false;
        let mut insensitive = false;
        for _ in 0..2 {
            match self.peek() {
                Some('g') if !global => global = true,
                Some('i') if !insensitive => insensitive = true,
                _ => break,
            }
            self.advance();
        }

        Token::RegExp {
            pattern,
            global,
            insensitive,
        }
    }
}

/// Tokenize a whole source text, treating every `/` as a regex start
pub fn tokenize(source: &str) -> ScriptResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token(false)? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("42 3.14 7.").unwrap();
        assert_eq!(tokens[0], Token::Int(42));
        assert!(matches!(tokens[1], Token::Float(n) if (n - 3.14).abs() < 1e-9));
        assert_eq!(tokens[2], Token::Float(7.0));
    }

    #[test]
    fn test_malformed_number() {
        assert!(matches!(tokenize("1.2.3"), Err(ScriptError::Syntax(_))));
    }

    #[test]
    fn test_strings_and_escapes() {
        let tokens = tokenize(r#""a\tb\n" 'it\'s'"#).unwrap();
        // Adjacent literals merge into a single token
        assert_eq!(tokens, vec![Token::String("a\tb\nit's".to_string())]);
    }

    #[test]
    fn test_string_concatenation_switches_quote() {
        let tokens = tokenize("'one'\n   \"two\" ; 'three'").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::String("onetwo".to_string()),
                Token::Punct(Punct::Semicolon),
                Token::String("three".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        assert_eq!(tokenize("'abc").unwrap(), vec![Token::String("abc".to_string())]);
    }

    #[test]
    fn test_identifiers() {
        let tokens = tokenize("foo _bar9 var").unwrap();
        assert_eq!(tokens, vec![ident("foo"), ident("_bar9"), ident("var")]);
    }

    #[test]
    fn test_operators_prefer_two_chars() {
        let mut lexer = Lexer::new("+ ++ += == != >= <= && || -- -= *= << >> /=");
        let mut found = Vec::new();
        while let Some(token) = lexer.next_token(true).unwrap() {
            found.push(token);
        }
        let expected = [
            Punct::Plus,
            Punct::PlusPlus,
            Punct::PlusEq,
            Punct::EqEq,
            Punct::BangEq,
            Punct::GtEq,
            Punct::LtEq,
            Punct::AmpAmp,
            Punct::PipePipe,
            Punct::MinusMinus,
            Punct::MinusEq,
            Punct::StarEq,
            Punct::LtLt,
            Punct::GtGt,
            Punct::SlashEq,
        ];
        assert_eq!(found, expected.map(Token::Punct).to_vec());
    }

    #[test]
    fn test_comments() {
        let tokens = tokenize("1 // comment\n2 /* block */ 3 /* open").unwrap();
        assert_eq!(tokens, vec![Token::Int(1), Token::Int(2), Token::Int(3)]);
    }

    #[test]
    fn test_slash_hint() {
        let mut lexer = Lexer::new("/ab\\/c/gi x");
        assert_eq!(
            lexer.next_token(false).unwrap(),
            Some(Token::RegExp {
                pattern: "ab\\/c".to_string(),
                global: true,
                insensitive: true,
            })
        );

        let mut lexer = Lexer::new("/ 2");
        assert_eq!(lexer.next_token(true).unwrap(), Some(Token::Punct(Punct::Slash)));
        assert_eq!(lexer.next_token(true).unwrap(), Some(Token::Int(2)));
    }

    #[test]
    fn test_regexp_flags_at_most_one_each() {
        let tokens = tokenize("/a/ggx").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::RegExp {
                    pattern: "a".to_string(),
                    global: true,
                    insensitive: false,
                },
                ident("gx"),
            ]
        );
    }

    #[test]
    fn test_unknown_characters_are_punctuation() {
        assert_eq!(
            tokenize("# é").unwrap(),
            vec![Token::Punct(Punct::Other('#')), Token::Punct(Punct::Other('é'))]
        );
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::Punct(Punct::Semicolon).describe(), "Punctuation: ;");
        assert_eq!(ident("x").describe(), "Symbol: x");
        assert_eq!(Token::String("s".into()).describe(), "String: 's'");
    }

    #[test]
    fn test_display_source_form() {
        assert_eq!(Token::Float(2.0).to_string(), "2.0");
        assert_eq!(Token::String("a\"b\\".into()).to_string(), r#""a\"b\\""#);
        assert_eq!(
            Token::RegExp {
                pattern: "x+".into(),
                global: false,
                insensitive: true
            }
            .to_string(),
            "/x+/i"
        );
    }

    #[test]
    fn test_source_pos() {
        let pos = SourcePos::locate("ab\ncde", 5);
        assert_eq!((pos.line, pos.column), (2, 3));
    }

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z_][a-zA-Z0-9_]{0,8}",
            any::<u32>().prop_map(|n| n.to_string()),
            (0u32..100_000, 0u32..1000).prop_map(|(a, b)| format!("{}.{}", a, b)),
            "[ -~]{0,10}".prop_map(|s| format!("{:?}", s)),
            prop::sample::select(vec![
                "+", "++", "+=", "-", "--", "-=", "*", "*=", "%", "=", "==", "!", "!=", "<",
                "<=", "<<", ">", ">=", ">>", "&", "&&", "|", "||", "^", ";", ",", ".", "(",
                ")", "[", "]", "{", "}",
            ])
            .prop_map(str::to_string),
        ]
    }

    proptest! {
        #[test]
        fn prop_display_round_trips(fragments in prop::collection::vec(fragment(), 0..24)) {
            let source = fragments.join(" ");
            let tokens = tokenize(&source).unwrap();
            let rendered: Vec<String> = tokens.iter().map(Token::to_string).collect();
            let again = tokenize(&rendered.join(" ")).unwrap();
            prop_assert_eq!(tokens, again);
        }
    }
}
