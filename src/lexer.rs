//! Tokenizer shared by the file-level object parser and the
//! content-stream interpreter — both consume the same token set, the
//! interpreter just stops treating bare keywords as errors and
//! dispatches on them as operators instead.

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Integer(i64),
    Real(f64),
    Name(String),
    /// A literal or hex string, already unescaped/undecoded-from-hex.
    String(Vec<u8>),
    /// A bare keyword: `true`, `false`, `null`, `obj`, `endobj`, `stream`,
    /// `endstream`, `R`, `xref`, `trailer`, `startxref`, or (in content
    /// streams) an operator such as `Tj`, `re`, `BI`.
    Keyword(String),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
    Eof,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

/// A cursor over an in-memory buffer producing [`Token`]s. The buffer is
/// the whole file; restarting at any offset is just constructing a
/// fresh `Lexer` at that `pos`.
pub struct Lexer<'a> {
    buf: &'a [u8],
    pub pos: usize,
    /// Start offset of the token returned by the most recent
    /// `next_token` call, i.e. `pos` with leading whitespace and
    /// comments already skipped. Lets callers slice out a token's exact
    /// raw source bytes via `buf()[token_start..pos]`.
    pub token_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(buf: &'a [u8], pos: usize) -> Self {
        Lexer { buf, pos, token_start: pos }
    }

    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    fn peek_byte(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b) if is_whitespace(b) => {
                    self.pos += 1;
                }
                Some(b'%') => {
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' || b == b'\r' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Consumes exactly one EOL (`\n` or `\r\n`, never bare `\r`) right
    /// after `stream`. Returns whether one was found.
    pub fn eat_stream_eol(&mut self) -> bool {
        match self.peek_byte() {
            Some(b'\n') => {
                self.pos += 1;
                true
            }
            Some(b'\r') => {
                if self.buf.get(self.pos + 1) == Some(&b'\n') {
                    self.pos += 2;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        self.token_start = start;
        let Some(b) = self.peek_byte() else {
            return Ok(Token::Eof);
        };
        match b {
            b'/' => self.lex_name(),
            b'(' => self.lex_literal_string(),
            b'<' => {
                if self.buf.get(self.pos + 1) == Some(&b'<') {
                    self.pos += 2;
                    Ok(Token::DictStart)
                } else {
                    self.lex_hex_string()
                }
            }
            b'>' => {
                if self.buf.get(self.pos + 1) == Some(&b'>') {
                    self.pos += 2;
                    Ok(Token::DictEnd)
                } else {
                    Err(ParseError::lexical(start as u64, "stray '>'"))
                }
            }
            b'[' => {
                self.pos += 1;
                Ok(Token::ArrayStart)
            }
            b']' => {
                self.pos += 1;
                Ok(Token::ArrayEnd)
            }
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.lex_number(),
            b'{' | b'}' => {
                // Only meaningful inside Type4 (PostScript calculator)
                // functions, which are opaque to this engine; surface as
                // keywords so callers that do care can recognise them.
                self.pos += 1;
                Ok(Token::Keyword((b as char).to_string()))
            }
            _ if is_regular(b) => self.lex_keyword(),
            _ => Err(ParseError::lexical(start as u64, format!("unexpected byte {b:#x}"))),
        }
    }

    fn lex_name(&mut self) -> Result<Token, ParseError> {
        self.pos += 1; // '/'
        let mut out = String::new();
        while let Some(b) = self.peek_byte() {
            if !is_regular(b) {
                break;
            }
            if b == b'#' {
                let hi = self.buf.get(self.pos + 1).copied();
                let lo = self.buf.get(self.pos + 2).copied();
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    if let (Some(h), Some(l)) = (hex_val(hi), hex_val(lo)) {
                        out.push((h * 16 + l) as char);
                        self.pos += 3;
                        continue;
                    }
                }
                out.push('#');
                self.pos += 1;
            } else {
                out.push(b as char);
                self.pos += 1;
            }
        }
        Ok(Token::Name(out))
    }

    fn lex_literal_string(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += 1; // '('
        let mut out = Vec::new();
        let mut depth = 1;
        loop {
            let Some(b) = self.bump() else {
                return Err(ParseError::lexical(start as u64, "unterminated literal string"));
            };
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    out.push(b);
                }
                b'\\' => match self.bump() {
                    Some(b'n') => out.push(b'\n'),
                    Some(b'r') => out.push(b'\r'),
                    Some(b't') => out.push(b'\t'),
                    Some(b'b') => out.push(0x08),
                    Some(b'f') => out.push(0x0c),
                    Some(b'(') => out.push(b'('),
                    Some(b')') => out.push(b')'),
                    Some(b'\\') => out.push(b'\\'),
                    Some(b'\n') => {}
                    Some(b'\r') => {
                        if self.peek_byte() == Some(b'\n') {
                            self.pos += 1;
                        }
                    }
                    Some(d @ b'0'..=b'7') => {
                        let mut val = (d - b'0') as u32;
                        for _ in 0..2 {
                            match self.peek_byte() {
                                Some(o @ b'0'..=b'7') => {
                                    val = val * 8 + (o - b'0') as u32;
                                    self.pos += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push((val & 0xff) as u8);
                    }
                    Some(other) => out.push(other),
                    None => return Err(ParseError::lexical(start as u64, "unterminated literal string")),
                },
                other => out.push(other),
            }
        }
        Ok(Token::String(out))
    }

    fn lex_hex_string(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += 1; // '<'
        let mut digits = Vec::new();
        loop {
            match self.bump() {
                Some(b'>') => break,
                Some(b) if b.is_ascii_hexdigit() => digits.push(b),
                Some(b) if is_whitespace(b) => {}
                Some(_) => return Err(ParseError::lexical(start as u64, "invalid hex string digit")),
                None => return Err(ParseError::lexical(start as u64, "unterminated hex string")),
            }
        }
        if digits.len() % 2 == 1 {
            digits.push(b'0');
        }
        let mut out = Vec::with_capacity(digits.len() / 2);
        for pair in digits.chunks(2) {
            let hi = hex_val(pair[0]).unwrap();
            let lo = hex_val(pair[1]).unwrap();
            out.push(hi * 16 + lo);
        }
        Ok(Token::String(out))
    }

    fn lex_number(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        let mut is_real = false;
        if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        while let Some(b) = self.peek_byte() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' => {
                    is_real = true;
                    self.pos += 1;
                }
                b'-' | b'+' => {
                    // malformed numbers like "1-2" appear in the wild; stop
                    // rather than error.
                    break;
                }
                _ => break,
            }
        }
        let text = std::str::from_utf8(&self.buf[start..self.pos])
            .map_err(|_| ParseError::lexical(start as u64, "non-utf8 number"))?;
        if is_real {
            let value: f64 = text
                .parse()
                .or_else(|_| text.trim_end_matches('.').parse())
                .map_err(|_| ParseError::lexical(start as u64, format!("malformed real {text:?}")))?;
            Ok(Token::Real(value))
        } else {
            match text.parse::<i64>() {
                Ok(v) => Ok(Token::Integer(v)),
                Err(_) => Ok(Token::Real(text.parse().map_err(|_| {
                    ParseError::lexical(start as u64, format!("malformed number {text:?}"))
                })?)),
            }
        }
    }

    fn lex_keyword(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if !is_regular(b) {
                break;
            }
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.buf[start..self.pos]).into_owned();
        Ok(Token::Keyword(text))
    }
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        let buf = src.as_bytes();
        let mut lexer = Lexer::new(buf, 0);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            if tok == Token::Eof {
                break;
            }
            out.push(tok);
        }
        out
    }

    #[test]
    fn numbers() {
        assert_eq!(tokens("12 -3 4.5 -.5"), vec![
            Token::Integer(12),
            Token::Integer(-3),
            Token::Real(4.5),
            Token::Real(-0.5),
        ]);
    }

    #[test]
    fn name_with_hex_escape() {
        assert_eq!(tokens("/A#20B"), vec![Token::Name("A B".to_string())]);
    }

    #[test]
    fn literal_string_escapes() {
        assert_eq!(
            tokens("(a\\(b\\)c\\n\\101)"),
            vec![Token::String(b"a(b)c\nA".to_vec())]
        );
    }

    #[test]
    fn hex_string_odd_digit() {
        assert_eq!(tokens("<48656C6C6F1>"), vec![Token::String(
            {
                let mut v = b"Hello".to_vec();
                v.push(0x10);
                v
            }
        )]);
    }

    #[test]
    fn dict_and_array_delimiters() {
        assert_eq!(
            tokens("<< /A [1 2] >>"),
            vec![
                Token::DictStart,
                Token::Name("A".into()),
                Token::ArrayStart,
                Token::Integer(1),
                Token::Integer(2),
                Token::ArrayEnd,
                Token::DictEnd,
            ]
        );
    }

    #[test]
    fn comment_is_skipped() {
        assert_eq!(
            tokens("1 % comment\n2"),
            vec![Token::Integer(1), Token::Integer(2)]
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(
            tokens("true false null obj endobj R"),
            vec![
                Token::Keyword("true".into()),
                Token::Keyword("false".into()),
                Token::Keyword("null".into()),
                Token::Keyword("obj".into()),
                Token::Keyword("endobj".into()),
                Token::Keyword("R".into()),
            ]
        );
    }
}
