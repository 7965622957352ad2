//! Assembles [`Token`]s into [`Object`]s, including the two-token
//! lookahead needed to tell an indirect reference (`12 0 R`) from a pair
//! of bare integers, and the stream-body handling with its
//! exact-one-EOL rule.

use crate::error::ParseError;
use crate::lexer::{Lexer, Token};
use crate::object::{Dictionary, Name, Object, Reference, Stream};

pub struct ObjectParser<'a> {
    pub lexer: Lexer<'a>,
}

impl<'a> ObjectParser<'a> {
    pub fn new(buf: &'a [u8], pos: usize) -> Self {
        ObjectParser {
            lexer: Lexer::new(buf, pos),
        }
    }

    pub fn pos(&self) -> usize {
        self.lexer.pos
    }

    /// Parses one value, consuming tokens. Does not resolve indirect
    /// references — that is the document's job.
    pub fn parse_object(&mut self) -> Result<Object, ParseError> {
        let tok = self.lexer.next_token()?;
        self.parse_object_from(tok)
    }

    fn parse_object_from(&mut self, tok: Token) -> Result<Object, ParseError> {
        match tok {
            Token::Eof => Err(ParseError::UnexpectedEof),
            Token::Integer(n) => self.parse_number_or_reference(n),
            Token::Real(r) => Ok(Object::Real(r)),
            Token::Name(n) => Ok(Object::Name(Name(n))),
            Token::String(s) => Ok(Object::String(s)),
            Token::ArrayStart => self.parse_array(),
            Token::DictStart => self.parse_dict_or_stream(),
            Token::Keyword(k) => match k.as_str() {
                "true" => Ok(Object::Boolean(true)),
                "false" => Ok(Object::Boolean(false)),
                "null" => Ok(Object::Null),
                other => Err(ParseError::lexical(self.lexer.pos as u64, format!("unexpected keyword {other:?}"))),
            },
            other => Err(ParseError::lexical(self.lexer.pos as u64, format!("unexpected token {other:?}"))),
        }
    }

    /// After an integer, looks ahead for `<int> R` (an indirect
    /// reference); otherwise the integer stands alone.
    fn parse_number_or_reference(&mut self, first: i64) -> Result<Object, ParseError> {
        let save = self.lexer.pos;
        if let Ok(Token::Integer(gen)) = self.lexer.next_token() {
            let save2 = self.lexer.pos;
            if let Ok(Token::Keyword(k)) = self.lexer.next_token() {
                if k == "R" {
                    if first < 0 || gen < 0 {
                        return Err(ParseError::lexical(save as u64, "negative object/generation number"));
                    }
                    return Ok(Object::Reference(Reference::new(first as u32, gen as u16)));
                }
            }
            self.lexer.pos = save2;
        }
        self.lexer.pos = save;
        Ok(Object::Integer(first))
    }

    fn parse_array(&mut self) -> Result<Object, ParseError> {
        let mut items = Vec::new();
        loop {
            let tok = self.lexer.next_token()?;
            if tok == Token::ArrayEnd {
                break;
            }
            if tok == Token::Eof {
                return Err(ParseError::UnexpectedEof);
            }
            items.push(self.parse_object_from(tok)?);
        }
        Ok(Object::Array(items))
    }

    fn parse_dict_or_stream(&mut self) -> Result<Object, ParseError> {
        let dict = self.parse_dict_body()?;

        // Lookahead for `stream` keyword.
        let save = self.lexer.pos;
        match self.lexer.next_token() {
            Ok(Token::Keyword(k)) if k == "stream" => {
                if !self.lexer.eat_stream_eol() {
                    return Err(ParseError::lexical(self.lexer.pos as u64, "missing EOL after 'stream'"));
                }
                let length = dict
                    .get("Length")
                    .and_then(Object::as_integer)
                    .unwrap_or(-1);
                let data_start = self.lexer.pos;
                let buf = self.lexer_buf();

                let (raw, end_of_data) = if length >= 0 && (data_start + length as usize) <= buf.len() {
                    let candidate_end = data_start + length as usize;
                    if Self::matches_endstream(buf, candidate_end) {
                        (buf[data_start..candidate_end].to_vec(), candidate_end)
                    } else {
                        Self::scan_for_endstream(buf, data_start)?
                    }
                } else {
                    Self::scan_for_endstream(buf, data_start)?
                };

                self.lexer.pos = end_of_data;
                self.skip_whitespace_to(b's');
                self.expect_keyword("endstream")?;
                Ok(Object::Stream(Stream { dict, raw }))
            }
            _ => {
                self.lexer.pos = save;
                Ok(Object::Dictionary(dict))
            }
        }
    }

    fn lexer_buf(&self) -> &'a [u8] {
        self.lexer.buf()
    }

    fn matches_endstream(buf: &[u8], at: usize) -> bool {
        let mut p = at;
        while p < buf.len() && matches!(buf[p], b' ' | b'\t' | b'\r' | b'\n') {
            p += 1;
        }
        buf[p..].starts_with(b"endstream")
    }

    fn scan_for_endstream(buf: &[u8], data_start: usize) -> Result<(Vec<u8>, usize), ParseError> {
        let marker = b"endstream";
        let mut i = data_start;
        while i + marker.len() <= buf.len() {
            if &buf[i..i + marker.len()] == marker {
                let mut end = i;
                // trailing EOL before 'endstream' is not part of the data
                if end > data_start && buf[end - 1] == b'\n' {
                    end -= 1;
                    if end > data_start && buf[end - 1] == b'\r' {
                        end -= 1;
                    }
                }
                return Ok((buf[data_start..end].to_vec(), i));
            }
            i += 1;
        }
        Err(ParseError::lexical(data_start as u64, "no matching 'endstream'"))
    }

    fn skip_whitespace_to(&mut self, _hint: u8) {
        while matches!(
            self.lexer.buf().get(self.lexer.pos),
            Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n')
        ) {
            self.lexer.pos += 1;
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<(), ParseError> {
        match self.lexer.next_token()? {
            Token::Keyword(k) if k == kw => Ok(()),
            other => Err(ParseError::lexical(
                self.lexer.pos as u64,
                format!("expected keyword {kw:?}, found {other:?}"),
            )),
        }
    }

    /// Parses `N G obj <object> endobj` at the current position, as used
    /// when materializing an `InUse` xref entry.
    pub fn parse_indirect_object(&mut self) -> Result<(Reference, Object), ParseError> {
        let num = match self.lexer.next_token()? {
            Token::Integer(n) if n >= 0 => n as u32,
            other => {
                return Err(ParseError::lexical(
                    self.lexer.pos as u64,
                    format!("expected object number, found {other:?}"),
                ))
            }
        };
        let gen = match self.lexer.next_token()? {
            Token::Integer(n) if n >= 0 => n as u16,
            other => {
                return Err(ParseError::lexical(
                    self.lexer.pos as u64,
                    format!("expected generation number, found {other:?}"),
                ))
            }
        };
        self.expect_keyword("obj")?;
        let value = self.parse_object()?;
        // Tolerate a missing `endobj` — some producers omit it before EOF
        // or before the next object; only consume it if present.
        let save = self.lexer.pos;
        match self.lexer.next_token() {
            Ok(Token::Keyword(k)) if k == "endobj" => {}
            _ => self.lexer.pos = save,
        }
        Ok((Reference::new(num, gen), value))
    }

    fn parse_dict_body(&mut self) -> Result<Dictionary, ParseError> {
        let mut dict = Dictionary::new();
        loop {
            let tok = self.lexer.next_token()?;
            match tok {
                Token::DictEnd => break,
                Token::Name(key) => {
                    let value = self.parse_object()?;
                    if dict.insert(Name(key.clone()), value) {
                        tracing::warn!(key, "duplicate dictionary key, last wins");
                    }
                }
                Token::Eof => return Err(ParseError::UnexpectedEof),
                other => {
                    return Err(ParseError::lexical(
                        self.lexer.pos as u64,
                        format!("expected dictionary key, found {other:?}"),
                    ))
                }
            }
        }
        Ok(dict)
    }
}
