//! Leaf key-path discovery over JSON token streams.
//!
//! Every object key contributes `parent + "/" + key`; every array contributes
//! `parent + "/"` (the empty segment stands for "an element of this array").
//! Paths are kept in first-discovery order without duplicates, and once the
//! whole stream has been walked only leaf paths are returned.
//!
//! The walk keeps an explicit stack of open containers instead of recursing,
//! so a deep document costs heap frames rather than call stack.

use std::{collections::HashSet, io, io::Read};

use log::{debug, trace};
use thiserror::Error;

use crate::tokens::{JsonTokens, Token, TokenSource};

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("malformed JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("malformed JSON: expected {expected}, found {found} at byte {offset}")]
    Syntax {
        expected: &'static str,
        found: String,
        offset: u64,
    },
    #[error("failed to read JSON input: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected token {found} (expected {expected})")]
    UnexpectedToken { expected: &'static str, found: Token },
    #[error("token stream ended inside an open object or array")]
    UnexpectedEnd,
}

impl From<serde_json::Error> for KeyError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            KeyError::Io(err.into())
        } else {
            KeyError::Parse(err)
        }
    }
}

/// Insertion-ordered set of key-paths.
#[derive(Debug, Clone, Default)]
pub struct UniquePaths {
    present: HashSet<String>,
    values: Vec<String>,
}

impl UniquePaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` unless it is already present. Returns whether it was new.
    pub fn insert(&mut self, path: &str) -> bool {
        if self.present.contains(path) {
            return false;
        }
        self.present.insert(path.to_string());
        self.values.push(path.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    /// Drops every path that is a string prefix of another recorded path.
    ///
    /// The test is a raw string prefix, not a segment boundary: `/ab` counts
    /// as a parent of `/abc`.
    pub fn into_leaves(self) -> Vec<String> {
        let values = self.values;
        values
            .iter()
            .filter(|path| !is_parent_path(path, &values))
            .cloned()
            .collect()
    }
}

fn is_parent_path(path: &str, all_paths: &[String]) -> bool {
    all_paths
        .iter()
        .any(|other| other != path && other.starts_with(path))
}

enum Frame {
    Object(String),
    Array(String),
}

/// Reads every JSON document in `reader` and returns its leaf key-paths.
pub fn get_keys<R: Read>(reader: R) -> Result<Vec<String>, KeyError> {
    let mut source = JsonTokens::new(reader);
    let keys = collect_keys(&mut source)?;
    debug!(
        "Collected {} leaf key-path(s) from {} document(s)",
        keys.len(),
        source.documents_read()
    );
    Ok(keys)
}

/// Walks every document `source` yields and returns the leaf key-paths.
pub fn collect_keys<S: TokenSource>(source: &mut S) -> Result<Vec<String>, KeyError> {
    let mut paths = UniquePaths::new();
    while let Some(token) = source.next_token()? {
        walk_document(source, token, &mut paths)?;
    }
    trace!("Recorded {} key-path(s) before leaf filtering", paths.len());
    Ok(paths.into_leaves())
}

fn walk_document<S: TokenSource>(
    source: &mut S,
    first: Token,
    paths: &mut UniquePaths,
) -> Result<(), KeyError> {
    let mut stack = Vec::new();
    match first {
        Token::ObjectStart => stack.push(Frame::Object(String::new())),
        Token::ArrayStart => stack.push(open_array("", paths)),
        Token::Scalar(_) => return Ok(()),
        found => {
            return Err(KeyError::UnexpectedToken {
                expected: "a JSON value",
                found,
            });
        }
    }

    while let Some(frame) = stack.last() {
        let token = source.next_token()?.ok_or(KeyError::UnexpectedEnd)?;
        match frame {
            Frame::Object(path) => match token {
                Token::ObjectEnd => {
                    stack.pop();
                }
                Token::Key(key) => {
                    let child = format!("{path}/{key}");
                    paths.insert(&child);
                    let value = source.next_token()?.ok_or(KeyError::UnexpectedEnd)?;
                    match value {
                        Token::ObjectStart => stack.push(Frame::Object(child)),
                        Token::ArrayStart => stack.push(open_array(&child, paths)),
                        Token::Scalar(_) => {}
                        found => {
                            return Err(KeyError::UnexpectedToken {
                                expected: "an object value",
                                found,
                            });
                        }
                    }
                }
                found => {
                    return Err(KeyError::UnexpectedToken {
                        expected: "an object key or '}'",
                        found,
                    });
                }
            },
            Frame::Array(path) => match token {
                Token::ArrayEnd => {
                    stack.pop();
                }
                Token::ObjectStart => {
                    let element = path.clone();
                    stack.push(Frame::Object(element));
                }
                // Nested arrays share the enclosing element path.
                Token::ArrayStart => {
                    let element = path.clone();
                    stack.push(Frame::Array(element));
                }
                Token::Scalar(_) => {}
                found => {
                    return Err(KeyError::UnexpectedToken {
                        expected: "an array element or ']'",
                        found,
                    });
                }
            },
        }
    }
    Ok(())
}

fn open_array(path: &str, paths: &mut UniquePaths) -> Frame {
    let element = format!("{path}/");
    paths.insert(&element);
    Frame::Array(element)
}
