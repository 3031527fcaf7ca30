//! Pull-style JSON token stream.
//!
//! [`JsonTokens`] reads one or more concatenated JSON documents and yields
//! their structural tokens one at a time, without buffering a document and
//! without recursion: open containers live on an explicit stack, so nesting
//! depth is bounded only by memory. String and number literals are decoded
//! with `serde_json`. `Ok(None)` is the clean end of the stream.

use std::{
    fmt,
    io::{self, BufReader, Read},
    vec,
};

use crate::keys::KeyError;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Key(String),
    Scalar(Scalar),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::ObjectStart => f.write_str("{"),
            Token::ObjectEnd => f.write_str("}"),
            Token::ArrayStart => f.write_str("["),
            Token::ArrayEnd => f.write_str("]"),
            Token::Key(key) => write!(f, "key {}", quoted(key)),
            Token::Scalar(Scalar::Null) => f.write_str("null"),
            Token::Scalar(Scalar::Bool(flag)) => write!(f, "{flag}"),
            Token::Scalar(Scalar::Number(number)) => write!(f, "{number}"),
            Token::Scalar(Scalar::String(text)) => f.write_str(&quoted(text)),
        }
    }
}

fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{text:?}"))
}

pub trait TokenSource {
    /// Returns the next token, or `Ok(None)` once the input is exhausted.
    fn next_token(&mut self) -> Result<Option<Token>, KeyError>;
}

impl TokenSource for vec::IntoIter<Token> {
    fn next_token(&mut self) -> Result<Option<Token>, KeyError> {
        Ok(self.next())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the tokenizer accepts next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    DocumentStart,
    ArrayFirst,
    ArrayValue,
    ArrayNext,
    ObjectFirst,
    ObjectKey,
    ObjectColon,
    ObjectValue,
    ObjectNext,
}

pub struct JsonTokens<R: Read> {
    bytes: io::Bytes<BufReader<R>>,
    peeked: Option<u8>,
    offset: u64,
    containers: Vec<Container>,
    expect: Expect,
    documents_read: usize,
}

impl<R: Read> JsonTokens<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            peeked: None,
            offset: 0,
            containers: Vec::new(),
            expect: Expect::DocumentStart,
            documents_read: 0,
        }
    }

    /// Number of complete documents tokenized so far.
    pub fn documents_read(&self) -> usize {
        self.documents_read
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    fn peek(&mut self) -> Result<Option<u8>, KeyError> {
        if self.peeked.is_none() {
            self.peeked = self.bytes.next().transpose()?;
        }
        Ok(self.peeked)
    }

    fn bump(&mut self) -> Result<Option<u8>, KeyError> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.peeked = None;
            self.offset += 1;
        }
        Ok(byte)
    }

    fn skip_whitespace(&mut self) -> Result<(), KeyError> {
        while matches!(self.peek()?, Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.bump()?;
        }
        Ok(())
    }

    fn unexpected(&self, found: Option<u8>, expected: &'static str) -> KeyError {
        KeyError::Syntax {
            expected,
            found: match found {
                Some(byte) => format!("{:?}", char::from(byte)),
                None => "end of input".to_string(),
            },
            offset: self.offset,
        }
    }

    fn value(&mut self) -> Result<Token, KeyError> {
        let token = match self.bump()? {
            Some(b'{') => {
                self.containers.push(Container::Object);
                self.expect = Expect::ObjectFirst;
                return Ok(Token::ObjectStart);
            }
            Some(b'[') => {
                self.containers.push(Container::Array);
                self.expect = Expect::ArrayFirst;
                return Ok(Token::ArrayStart);
            }
            Some(b'"') => Token::Scalar(Scalar::String(self.string()?)),
            Some(first @ (b't' | b'f' | b'n')) => Token::Scalar(self.literal(first)?),
            Some(first @ (b'-' | b'0'..=b'9')) => Token::Scalar(Scalar::Number(self.number(first)?)),
            other => return Err(self.unexpected(other, "a JSON value")),
        };
        self.finish_value();
        Ok(token)
    }

    fn close(&mut self) -> Token {
        let token = match self.containers.pop() {
            Some(Container::Object) => Token::ObjectEnd,
            _ => Token::ArrayEnd,
        };
        self.finish_value();
        token
    }

    fn finish_value(&mut self) {
        self.expect = match self.containers.last() {
            None => {
                self.documents_read += 1;
                Expect::DocumentStart
            }
            Some(Container::Array) => Expect::ArrayNext,
            Some(Container::Object) => Expect::ObjectNext,
        };
    }

    fn key(&mut self) -> Result<Token, KeyError> {
        let key = self.string()?;
        self.expect = Expect::ObjectColon;
        Ok(Token::Key(key))
    }

    /// Reads a string whose opening quote was already consumed.
    fn string(&mut self) -> Result<String, KeyError> {
        let mut raw = vec![b'"'];
        loop {
            match self.bump()? {
                None => return Err(self.unexpected(None, "a closing '\"'")),
                Some(b'"') => {
                    raw.push(b'"');
                    break;
                }
                Some(b'\\') => {
                    raw.push(b'\\');
                    match self.bump()? {
                        Some(escaped) => raw.push(escaped),
                        None => return Err(self.unexpected(None, "an escape sequence")),
                    }
                }
                Some(byte) => raw.push(byte),
            }
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    fn number(&mut self, first: u8) -> Result<serde_json::Number, KeyError> {
        let mut raw = vec![first];
        while let Some(byte @ (b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')) = self.peek()? {
            raw.push(byte);
            self.bump()?;
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    fn literal(&mut self, first: u8) -> Result<Scalar, KeyError> {
        let (word, scalar) = match first {
            b't' => ("true", Scalar::Bool(true)),
            b'f' => ("false", Scalar::Bool(false)),
            _ => ("null", Scalar::Null),
        };
        for &expected in &word.as_bytes()[1..] {
            let found = self.bump()?;
            if found != Some(expected) {
                return Err(self.unexpected(found, "a literal true, false or null"));
            }
        }
        Ok(scalar)
    }
}

impl<R: Read> TokenSource for JsonTokens<R> {
    fn next_token(&mut self) -> Result<Option<Token>, KeyError> {
        loop {
            self.skip_whitespace()?;
            match self.expect {
                Expect::DocumentStart => {
                    if self.peek()?.is_none() {
                        return Ok(None);
                    }
                    return self.value().map(Some);
                }
                Expect::ArrayFirst => {
                    if self.peek()? == Some(b']') {
                        self.bump()?;
                        return Ok(Some(self.close()));
                    }
                    return self.value().map(Some);
                }
                Expect::ArrayValue | Expect::ObjectValue => return self.value().map(Some),
                Expect::ArrayNext => match self.bump()? {
                    Some(b',') => self.expect = Expect::ArrayValue,
                    Some(b']') => return Ok(Some(self.close())),
                    other => return Err(self.unexpected(other, "',' or ']'")),
                },
                Expect::ObjectFirst => match self.bump()? {
                    Some(b'}') => return Ok(Some(self.close())),
                    Some(b'"') => return self.key().map(Some),
                    other => return Err(self.unexpected(other, "an object key or '}'")),
                },
                Expect::ObjectKey => match self.bump()? {
                    Some(b'"') => return self.key().map(Some),
                    other => return Err(self.unexpected(other, "an object key")),
                },
                Expect::ObjectColon => match self.bump()? {
                    Some(b':') => self.expect = Expect::ObjectValue,
                    other => return Err(self.unexpected(other, "':'")),
                },
                Expect::ObjectNext => match self.bump()? {
                    Some(b',') => self.expect = Expect::ObjectKey,
                    Some(b'}') => return Ok(Some(self.close())),
                    other => return Err(self.unexpected(other, "',' or '}'")),
                },
            }
        }
    }
}

/// Drains `source`, returning every token it yields.
pub fn collect_tokens<S: TokenSource>(source: &mut S) -> Result<Vec<Token>, KeyError> {
    let mut tokens = Vec::new();
    while let Some(token) = source.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
