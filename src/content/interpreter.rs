//! The content-stream interpreter: an explicit stack machine that
//! consumes tokens and dispatches on the operator keyword, with
//! recursion handling nested Form XObjects.

use std::collections::HashMap;
use std::rc::Rc;

use crate::canvas::{Canvas, DrawnForm, DrawnImage, InlineImage};
use crate::catalog::XObject;
use crate::error::{ParseError, PdfResult, Warning};
use crate::font::Font;
use crate::lexer::{Lexer, Token};
use crate::object::{Dictionary, Name, Object, Reference, Resolve};
use crate::render::graphics_state::{concat, GraphicsStateStack, Matrix};

/// Text-object state machine: starts in `Page`, `BT` enters `Text`
/// (where only text operators are valid), `ET` returns to `Page`.
/// Violations are reported rather than enforced strictly, since the
/// engine's purpose is extraction, not validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Page,
    Text,
}

#[derive(Debug, Clone)]
enum Operand {
    Number(f64),
    Name(String),
    /// A literal/hex string operand, decoded to Unicode once at the
    /// point the token is lexed (under whatever font is current then,
    /// which for any legal content stream is the font a preceding `Tf`
    /// already set). Carrying both forms lets the same decode feed
    /// both `canvas.strings` and the `text_content` reproduction
    /// without decoding twice or warning on an unmapped code twice.
    String { bytes: Vec<u8>, unicode: String },
    Array(Vec<Operand>),
    Dict(Dictionary),
    Bool(bool),
    Null,
}

impl Operand {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }
}

const MAX_FORM_DEPTH: usize = 16;

pub struct Interpreter<'a> {
    resolver: &'a mut dyn Resolve,
    canvas: &'a mut Canvas,
    warnings: &'a mut Vec<Warning>,
    state: GraphicsStateStack,
    font_cache: HashMap<Reference, Rc<Font>>,
    mode: Mode,
    compatibility_depth: u32,
    form_depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(resolver: &'a mut dyn Resolve, canvas: &'a mut Canvas, warnings: &'a mut Vec<Warning>, resources: Dictionary) -> Self {
        Interpreter {
            resolver,
            canvas,
            warnings,
            state: GraphicsStateStack::new(resources),
            font_cache: HashMap::new(),
            mode: Mode::Page,
            compatibility_depth: 0,
            form_depth: 0,
        }
    }

    pub fn run(&mut self, data: &[u8]) -> PdfResult<()> {
        let mut lexer = Lexer::new(data, 0);
        let mut operands: Vec<Operand> = Vec::new();
        // `text_content` is rebuilt as a byte-exact reproduction of
        // `data`: `stmt_start` is the offset already flushed, and
        // `pending` records the raw span of every string token read
        // since then so `flush_statement` can splice in its decoded
        // Unicode form in place of the original string bytes while
        // copying everything else (whitespace, comments, other
        // operands, the operator keyword) verbatim.
        let mut stmt_start: usize = 0;
        let mut pending: Vec<(usize, usize, String)> = Vec::new();
        loop {
            let before = lexer.pos;
            let token = match lexer.next_token() {
                Ok(t) => t,
                Err(_) => {
                    // Resynchronize past a malformed byte rather than
                    // abandoning the whole content stream.
                    if lexer.pos <= before {
                        lexer.pos = before + 1;
                    }
                    if lexer.pos >= data.len() {
                        break;
                    }
                    continue;
                }
            };
            let start = lexer.token_start;
            match token {
                Token::Eof => break,
                Token::Integer(n) => operands.push(Operand::Number(n as f64)),
                Token::Real(n) => operands.push(Operand::Number(n)),
                Token::Name(n) => operands.push(Operand::Name(n)),
                Token::String(bytes) => {
                    let unicode = self.decode_string_operand(&bytes);
                    pending.push((start, lexer.pos, unicode.clone()));
                    operands.push(Operand::String { bytes, unicode });
                }
                Token::ArrayStart => operands.push(self.parse_array(&mut lexer, &mut pending)?),
                Token::DictStart => operands.push(self.parse_dict(&mut lexer)?),
                Token::ArrayEnd | Token::DictEnd => {
                    // Stray closer outside an array/dict we started
                    // parsing; drop it and keep going.
                }
                Token::Keyword(kw) => match kw.as_str() {
                    "true" => operands.push(Operand::Bool(true)),
                    "false" => operands.push(Operand::Bool(false)),
                    "null" => operands.push(Operand::Null),
                    "BI" => {
                        self.flush_statement(data, &mut stmt_start, &mut pending, start);
                        self.run_inline_image(&mut lexer)?;
                        // Inline image payloads are opaque bytes, not
                        // text; reproduce the whole `BI…EI` span as-is.
                        if lexer.pos > stmt_start {
                            self.canvas.text_content.push_str(&String::from_utf8_lossy(&data[stmt_start..lexer.pos]));
                        }
                        stmt_start = lexer.pos;
                        operands.clear();
                    }
                    op => {
                        self.dispatch(op, &mut operands, &mut lexer)?;
                        self.flush_statement(data, &mut stmt_start, &mut pending, lexer.pos);
                        operands.clear();
                    }
                },
            }
        }
        Ok(())
    }

    /// Appends `data[*stmt_start..end]` to `text_content`, substituting
    /// each recorded string-token span with its already-decoded Unicode
    /// form and copying every other byte (whitespace, comments,
    /// numbers, names, the operator keyword) unchanged.
    fn flush_statement(&mut self, data: &[u8], stmt_start: &mut usize, pending: &mut Vec<(usize, usize, String)>, end: usize) {
        let mut cursor = *stmt_start;
        for (s, e, unicode) in pending.drain(..) {
            if s > cursor {
                self.canvas.text_content.push_str(&String::from_utf8_lossy(&data[cursor..s]));
            }
            self.canvas.text_content.push_str(&unicode);
            cursor = e;
        }
        if end > cursor {
            self.canvas.text_content.push_str(&String::from_utf8_lossy(&data[cursor..end]));
        }
        *stmt_start = end;
    }

    fn parse_array(&mut self, lexer: &mut Lexer, pending: &mut Vec<(usize, usize, String)>) -> PdfResult<Operand> {
        let mut items = Vec::new();
        loop {
            let tok = lexer.next_token().map_err(anyhow::Error::from)?;
            let start = lexer.token_start;
            match tok {
                Token::ArrayEnd | Token::Eof => break,
                Token::Integer(n) => items.push(Operand::Number(n as f64)),
                Token::Real(n) => items.push(Operand::Number(n)),
                Token::Name(n) => items.push(Operand::Name(n)),
                Token::String(bytes) => {
                    let unicode = self.decode_string_operand(&bytes);
                    pending.push((start, lexer.pos, unicode.clone()));
                    items.push(Operand::String { bytes, unicode });
                }
                Token::ArrayStart => items.push(self.parse_array(lexer, pending)?),
                Token::DictStart => items.push(self.parse_dict(lexer)?),
                Token::Keyword(k) if k == "true" => items.push(Operand::Bool(true)),
                Token::Keyword(k) if k == "false" => items.push(Operand::Bool(false)),
                Token::Keyword(_) | Token::DictEnd => {}
            }
        }
        Ok(Operand::Array(items))
    }

    fn parse_dict(&mut self, lexer: &mut Lexer) -> PdfResult<Operand> {
        let mut dict = Dictionary::new();
        loop {
            let key_tok = lexer.next_token().map_err(anyhow::Error::from)?;
            let key = match key_tok {
                Token::DictEnd | Token::Eof => break,
                Token::Name(n) => n,
                _ => continue,
            };
            let value_tok = lexer.next_token().map_err(anyhow::Error::from)?;
            let value = match value_tok {
                Token::Integer(n) => Object::Integer(n),
                Token::Real(n) => Object::Real(n),
                Token::Name(n) => Object::Name(Name::from(n)),
                Token::String(s) => Object::String(s),
                Token::Keyword(k) if k == "true" => Object::Boolean(true),
                Token::Keyword(k) if k == "false" => Object::Boolean(false),
                Token::Keyword(k) if k == "null" => Object::Null,
                Token::ArrayStart => Object::Array(self.parse_plain_array(lexer)?),
                _ => Object::Null,
            };
            dict.insert(Name::from(key), value);
        }
        Ok(Operand::Dict(dict))
    }

    fn parse_plain_array(&mut self, lexer: &mut Lexer) -> PdfResult<Vec<Object>> {
        let mut items = Vec::new();
        loop {
            let tok = lexer.next_token().map_err(anyhow::Error::from)?;
            match tok {
                Token::ArrayEnd | Token::Eof => break,
                Token::Integer(n) => items.push(Object::Integer(n)),
                Token::Real(n) => items.push(Object::Real(n)),
                Token::Name(n) => items.push(Object::Name(Name::from(n))),
                Token::String(s) => items.push(Object::String(s)),
                _ => {}
            }
        }
        Ok(items)
    }

    fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn dispatch(&mut self, op: &str, operands: &mut Vec<Operand>, lexer: &mut Lexer) -> PdfResult<()> {
        let nums: Vec<f64> = operands.iter().filter_map(Operand::as_f64).collect();
        match op {
            "q" => self.state.push(),
            "Q" => {
                if !self.state.pop() {
                    self.warn(Warning::UnbalancedGraphicsState);
                }
            }
            "cm" => {
                if nums.len() == 6 {
                    let m: Matrix = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                    let ctm = self.state.current().ctm;
                    self.state.current_mut().ctm = concat(m, ctm);
                }
            }
            "w" => {
                if let Some(v) = nums.first() {
                    self.state.current_mut().line.width = *v;
                }
            }
            "J" => {
                if let Some(v) = nums.first() {
                    self.state.current_mut().line.cap = *v as i64;
                }
            }
            "j" => {
                if let Some(v) = nums.first() {
                    self.state.current_mut().line.join = *v as i64;
                }
            }
            "M" => {
                if let Some(v) = nums.first() {
                    self.state.current_mut().line.miter_limit = *v;
                }
            }
            "d" => {
                if let [Operand::Array(items), Operand::Number(phase)] = operands.as_slice() {
                    self.state.current_mut().line.dash_pattern = items.iter().filter_map(Operand::as_f64).collect();
                    self.state.current_mut().line.dash_phase = *phase;
                }
            }
            "ri" | "i" | "gs" => {
                // Rendering intent, flatness, and ExtGState parameters
                // only affect rasterization, so they are accepted and
                // otherwise ignored.
            }
            "m" | "l" | "c" | "v" | "y" | "h" | "re" => {
                // Path construction: this engine never paints, so path
                // geometry itself is not retained.
            }
            "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" | "n" => {
                // Path painting: ends the current path, nothing to extract.
            }
            "W" | "W*" => {
                self.state.current_mut().has_clip = true;
            }
            "CS" | "cs" | "SC" | "SCN" | "sc" | "scn" | "G" | "g" | "RG" | "rg" | "K" | "k" => {
                // Color operators affect only rasterized appearance.
            }
            "BT" => {
                self.mode = Mode::Text;
                let text = &mut self.state.current_mut().text;
                text.text_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
                text.line_matrix = text.text_matrix;
            }
            "ET" => {
                self.mode = Mode::Page;
            }
            "Tc" => self.set_text_num(nums.first().copied(), |t, v| t.char_spacing = v),
            "Tw" => self.set_text_num(nums.first().copied(), |t, v| t.word_spacing = v),
            "Tz" => self.set_text_num(nums.first().copied(), |t, v| t.horizontal_scaling = v),
            "TL" => self.set_text_num(nums.first().copied(), |t, v| t.leading = v),
            "Ts" => self.set_text_num(nums.first().copied(), |t, v| t.rise = v),
            "Tr" => self.set_text_num(nums.first().copied(), |t, v| t.render_mode = v as i64),
            "Tf" => {
                if let [Operand::Name(name), Operand::Number(size)] = operands.as_slice() {
                    self.state.current_mut().text.font_resource_name = Some(name.clone());
                    self.state.current_mut().text.font_size = *size;
                }
            }
            "Td" => {
                if nums.len() == 2 {
                    self.translate_line_matrix(nums[0], nums[1]);
                }
            }
            "TD" => {
                if nums.len() == 2 {
                    self.state.current_mut().text.leading = -nums[1];
                    self.translate_line_matrix(nums[0], nums[1]);
                }
            }
            "Tm" => {
                if nums.len() == 6 {
                    let m: Matrix = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                    let text = &mut self.state.current_mut().text;
                    text.text_matrix = m;
                    text.line_matrix = m;
                }
            }
            "T*" => {
                let leading = self.state.current().text.leading;
                self.translate_line_matrix(0.0, -leading);
            }
            "Tj" => {
                if let [Operand::String { unicode, .. }] = operands.as_slice() {
                    self.show_text(unicode);
                }
            }
            "TJ" => {
                if let [Operand::Array(items)] = operands.as_slice() {
                    for item in items {
                        match item {
                            Operand::String { unicode, .. } => self.show_text(unicode),
                            Operand::Number(_) => {
                                // Horizontal offset only; no canvas emission.
                            }
                            _ => {}
                        }
                    }
                }
            }
            "'" => {
                let leading = self.state.current().text.leading;
                self.translate_line_matrix(0.0, -leading);
                if let [Operand::String { unicode, .. }] = operands.as_slice() {
                    self.show_text(unicode);
                }
            }
            "\"" => {
                if let [Operand::Number(aw), Operand::Number(ac), Operand::String { unicode, .. }] = operands.as_slice() {
                    self.state.current_mut().text.word_spacing = *aw;
                    self.state.current_mut().text.char_spacing = *ac;
                    let leading = self.state.current().text.leading;
                    self.translate_line_matrix(0.0, -leading);
                    self.show_text(unicode);
                }
            }
            "Do" => {
                if let Some(name) = operands.first().and_then(Operand::as_name) {
                    self.invoke_xobject(name)?;
                }
            }
            "BMC" | "BDC" | "MP" | "DP" => {
                // Marked content: passed through to `text_content`, not
                // otherwise interpreted.
            }
            "EMC" => {}
            "BX" => self.compatibility_depth += 1,
            "EX" => self.compatibility_depth = self.compatibility_depth.saturating_sub(1),
            "{" | "}" => {}
            other => {
                if self.compatibility_depth == 0 {
                    self.warn(Warning::UnknownOperator { op: other.to_owned() });
                }
            }
        }
        let _ = lexer;
        Ok(())
    }

    fn set_text_num(&mut self, value: Option<f64>, apply: impl FnOnce(&mut crate::render::graphics_state::TextState, f64)) {
        if let Some(v) = value {
            apply(&mut self.state.current_mut().text, v);
        }
    }

    fn translate_line_matrix(&mut self, tx: f64, ty: f64) {
        let text = &mut self.state.current_mut().text;
        let translation: Matrix = [1.0, 0.0, 0.0, 1.0, tx, ty];
        text.line_matrix = concat(translation, text.line_matrix);
        text.text_matrix = text.line_matrix;
    }

    fn current_font(&mut self) -> PdfResult<Option<Rc<Font>>> {
        let Some(name) = self.state.current().text.font_resource_name.clone() else {
            return Ok(None);
        };
        let Some(font_dict_obj) = self
            .state
            .current()
            .resources
            .get("Font")
            .cloned()
            .and_then(|o| o.as_dict().cloned())
            .and_then(|d| d.get(&name).cloned())
        else {
            return Ok(None);
        };
        if let Some(reference) = font_dict_obj.as_reference() {
            if let Some(font) = self.font_cache.get(&reference) {
                return Ok(Some(font.clone()));
            }
            let dict = self.resolver.assert_dict(font_dict_obj)?;
            let font = Rc::new(Font::load(&dict, self.resolver)?);
            self.font_cache.insert(reference, font.clone());
            Ok(Some(font))
        } else {
            let dict = self.resolver.assert_dict(font_dict_obj)?;
            Ok(Some(Rc::new(Font::load(&dict, self.resolver)?)))
        }
    }

    /// Pushes one `canvas.strings` entry for the whole decoded string
    /// operand, per the one-push-per-`Tj`/per-`TJ`-array-element rule.
    fn show_text(&mut self, unicode: &str) {
        self.canvas.strings.push(unicode.to_owned());
    }

    /// Decodes a full string operand's bytes to Unicode under whatever
    /// font is current, concatenating the per-code results into one
    /// `String`. Unmapped codes become `U+FFFD` and are warned once
    /// each. With no font set (no `Tf` yet issued), falls back to
    /// PDFDocEncoding byte-by-byte, same as a simple font with no
    /// `Encoding`/`ToUnicode` would.
    fn decode_string_operand(&mut self, bytes: &[u8]) -> String {
        let font = match self.current_font() {
            Ok(f) => f,
            Err(_) => None,
        };
        match font {
            Some(font) => {
                let mut out = String::new();
                for (code, unicode) in font.decode(bytes) {
                    match unicode {
                        Some(s) => out.push_str(&s),
                        None => {
                            self.warn(Warning::UnmappedCode { code });
                            out.push(char::REPLACEMENT_CHARACTER);
                        }
                    }
                }
                out
            }
            None => bytes.iter().map(|&b| crate::font::encoding::pdf_doc_encoded_to_utf8(&[b])).collect(),
        }
    }

    fn invoke_xobject(&mut self, name: &str) -> PdfResult<()> {
        let Some(xobject_dict) = self
            .state
            .current()
            .resources
            .get("XObject")
            .cloned()
            .and_then(|o| o.as_dict().cloned())
        else {
            return Ok(());
        };
        let Some(entry) = xobject_dict.get(name).cloned() else {
            return Ok(());
        };
        let reference = entry.as_reference();
        let stream = self.resolver.assert_stream(entry)?;
        let xobject = XObject::load(stream, self.resolver)?;
        match xobject {
            XObject::Image(_) => {
                self.canvas.images.push(DrawnImage {
                    name: Name::from(name),
                    reference,
                });
            }
            XObject::Form(form) => {
                self.canvas.forms.push(DrawnForm {
                    name: Name::from(name),
                    reference,
                });
                if self.form_depth >= MAX_FORM_DEPTH {
                    self.warn(Warning::Recovered {
                        reason: format!("Form XObject {name:?} recursion depth exceeded"),
                    });
                    return Ok(());
                }
                let content = form.content_bytes()?;
                let resources = form.resources.clone().unwrap_or_else(|| self.state.current().resources.clone());
                let matrix = form.matrix.unwrap_or([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

                self.state.push();
                self.state.current_mut().resources = resources;
                let ctm = self.state.current().ctm;
                self.state.current_mut().ctm = concat(matrix, ctm);
                self.form_depth += 1;
                self.run(&content)?;
                self.form_depth -= 1;
                self.state.pop();
            }
        }
        Ok(())
    }

    fn run_inline_image(&mut self, lexer: &mut Lexer) -> PdfResult<()> {
        let mut dict = Dictionary::new();
        loop {
            let key_tok = lexer.next_token().map_err(anyhow::Error::from)?;
            let key = match key_tok {
                Token::Keyword(k) if k == "ID" => break,
                Token::Name(n) => n,
                Token::Eof => return Ok(()),
                _ => continue,
            };
            let value_tok = lexer.next_token().map_err(anyhow::Error::from)?;
            let value = match value_tok {
                Token::Integer(n) => Object::Integer(n),
                Token::Real(n) => Object::Real(n),
                Token::Name(n) => Object::Name(Name::from(n)),
                Token::String(s) => Object::String(s),
                Token::Keyword(k) if k == "true" => Object::Boolean(true),
                Token::Keyword(k) if k == "false" => Object::Boolean(false),
                Token::ArrayStart => Object::Array(self.parse_plain_array(lexer)?),
                _ => Object::Null,
            };
            dict.insert(Name::from(expand_inline_key(&key)), value);
        }
        // Exactly one whitespace byte follows `ID` (ISO 32000-1 §8.9.7).
        let buf = lexer.buf();
        let mut data_start = lexer.pos;
        if buf.get(data_start).is_some() {
            data_start += 1;
        }
        let data_end = find_ei(buf, data_start);
        let raw = buf[data_start..data_end].to_vec();
        lexer.pos = (data_end + 2).min(buf.len());

        let filter = dict
            .get("Filter")
            .and_then(Object::as_name)
            .map(|n| expand_inline_filter(n.as_str()));
        let decoded = decode_inline(&raw, &dict).unwrap_or(raw);
        self.canvas.inline_images.push(InlineImage {
            width: dict.get("Width").and_then(Object::as_integer).unwrap_or(0),
            height: dict.get("Height").and_then(Object::as_integer).unwrap_or(0),
            bits_per_component: dict.get("BitsPerComponent").and_then(Object::as_integer).unwrap_or(8),
            color_space: dict.get("ColorSpace").and_then(Object::as_name).map(|n| n.as_str().to_owned()),
            filter,
            data: decoded,
        });
        Ok(())
    }
}

fn decode_inline(raw: &[u8], dict: &Dictionary) -> Result<Vec<u8>, ParseError> {
    let mut normalized = Dictionary::new();
    if let Some(f) = dict.get("Filter").cloned() {
        normalized.insert(Name::from("Filter"), f);
    }
    if let Some(p) = dict.get("DecodeParms").cloned() {
        normalized.insert(Name::from("DecodeParms"), p);
    }
    crate::filter::decode_stream_raw(raw, &normalized)
}

/// Finds the byte offset of an `EI` token that is preceded and followed
/// by whitespace (or start/end of buffer), i.e. at a token boundary.
fn find_ei(buf: &[u8], start: usize) -> usize {
    let mut i = start;
    while i + 1 < buf.len() {
        if &buf[i..i + 2] == b"EI" {
            let before_ok = i == start || buf[i - 1].is_ascii_whitespace();
            let after_ok = i + 2 >= buf.len() || buf[i + 2].is_ascii_whitespace();
            if before_ok && after_ok {
                let mut end = i;
                if end > start && buf[end - 1].is_ascii_whitespace() {
                    end -= 1;
                }
                return end;
            }
        }
        i += 1;
    }
    buf.len()
}

fn expand_inline_key(key: &str) -> String {
    match key {
        "BPC" => "BitsPerComponent",
        "CS" => "ColorSpace",
        "D" => "Decode",
        "DP" => "DecodeParms",
        "F" => "Filter",
        "H" => "Height",
        "W" => "Width",
        "IM" => "ImageMask",
        "I" => "Interpolate",
        "L" => "Length",
        other => return other.to_owned(),
    }
    .to_owned()
}

fn expand_inline_filter(name: &str) -> String {
    match name {
        "AHx" => "ASCIIHexDecode",
        "A85" => "ASCII85Decode",
        "LZW" => "LZWDecode",
        "Fl" => "FlateDecode",
        "RL" => "RunLengthDecode",
        "CCF" => "CCITTFaxDecode",
        "DCT" => "DCTDecode",
        other => return other.to_owned(),
    }
    .to_owned()
}
