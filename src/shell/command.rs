//! Shell command parsing

use crate::store::TrieStore;
use crate::trie::TaggedValue;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A parsed shell command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `put <key> <value>`
    Put { key: String, value: Literal },
    /// `get <key> [<type>]`
    Get {
        key: String,
        value_type: Option<ValueType>,
    },
    /// `remove <key>`
    Remove { key: String },
    /// `list [<prefix>]`
    List { prefix: String },
    /// `len`
    Len,
    /// `version`
    Version,
}

impl Command {
    /// Parse one script line
    ///
    /// Blank lines and lines starting with `#` yield `Ok(None)`. The token
    /// `""` stands for the empty key.
    pub fn parse(line: &str, line_no: usize) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let parse_error = |message: &str| Error::Parse {
            line: line_no,
            message: message.to_string(),
        };

        let (name, rest) = split_token(line);
        let command = match name {
            "put" | "set" => {
                let (key, rest) = split_token(rest);
                if key.is_empty() {
                    return Err(parse_error("put requires a key"));
                }
                let value = Literal::parse(rest).ok_or_else(|| parse_error("put requires a value"))?;
                Command::Put {
                    key: unquote_key(key),
                    value,
                }
            }
            "get" => {
                let (key, rest) = split_token(rest);
                if key.is_empty() {
                    return Err(parse_error("get requires a key"));
                }
                let (type_token, rest) = split_token(rest);
                if !rest.is_empty() {
                    return Err(parse_error("too many arguments to get"));
                }
                let value_type = if type_token.is_empty() {
                    None
                } else {
                    Some(type_token.parse::<ValueType>().map_err(|e: Error| parse_error(&e.to_string()))?)
                };
                Command::Get {
                    key: unquote_key(key),
                    value_type,
                }
            }
            "remove" | "rm" => {
                let (key, rest) = split_token(rest);
                if key.is_empty() {
                    return Err(parse_error("remove requires a key"));
                }
                if !rest.is_empty() {
                    return Err(parse_error("too many arguments to remove"));
                }
                Command::Remove {
                    key: unquote_key(key),
                }
            }
            "list" | "ls" => {
                let (prefix, rest) = split_token(rest);
                if !rest.is_empty() {
                    return Err(parse_error("too many arguments to list"));
                }
                Command::List {
                    prefix: unquote_key(prefix),
                }
            }
            "len" if rest.is_empty() => Command::Len,
            "version" if rest.is_empty() => Command::Version,
            "len" | "version" => return Err(parse_error("command takes no arguments")),
            other => {
                return Err(Error::UnknownCommand {
                    line: line_no,
                    command: other.to_string(),
                })
            }
        };

        Ok(Some(command))
    }
}

/// A value literal in a `put` command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Literal {
    /// Parse a literal: integers become `Int`, `true`/`false` become `Bool`,
    /// and anything else (optionally in double quotes) becomes `Str`.
    pub fn parse(text: &str) -> Option<Literal> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            return Some(Literal::Str(text[1..text.len() - 1].to_string()));
        }
        match text {
            "true" => Some(Literal::Bool(true)),
            "false" => Some(Literal::Bool(false)),
            _ => Some(
                text.parse::<i64>()
                    .map(Literal::Int)
                    .unwrap_or_else(|_| Literal::Str(text.to_string())),
            ),
        }
    }

    /// Type of this literal once stored
    pub fn value_type(&self) -> ValueType {
        match self {
            Literal::Int(_) => ValueType::Int,
            Literal::Bool(_) => ValueType::Bool,
            Literal::Str(_) => ValueType::Str,
        }
    }

    /// Store the literal under `key` with its native type
    pub fn put_into(self, store: &TrieStore, key: &str) {
        match self {
            Literal::Int(v) => store.put(key, v),
            Literal::Bool(v) => store.put(key, v),
            Literal::Str(v) => store.put(key, v),
        }
    }
}

/// The value types the shell can store and read back
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Bool,
    Str,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::Str => "str",
        }
    }

    /// Read `key` from the store as this type
    ///
    /// A value of a different type reads as absent.
    pub fn read(&self, store: &TrieStore, key: &str) -> Option<Value> {
        match self {
            ValueType::Int => store.get::<i64>(key).map(|g| Value::from(*g)),
            ValueType::Bool => store.get::<bool>(key).map(|g| Value::from(*g)),
            ValueType::Str => store.get::<String>(key).map(|g| Value::from(g.as_str())),
        }
    }

    /// Classify a stored value, if it is one of the shell's types
    pub fn classify(value: &TaggedValue) -> Option<(ValueType, Value)> {
        if let Some(v) = value.downcast_ref::<i64>() {
            return Some((ValueType::Int, Value::from(*v)));
        }
        if let Some(v) = value.downcast_ref::<bool>() {
            return Some((ValueType::Bool, Value::from(*v)));
        }
        value
            .downcast_ref::<String>()
            .map(|v| (ValueType::Str, Value::from(v.as_str())))
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" | "i64" => Ok(ValueType::Int),
            "bool" => Ok(ValueType::Bool),
            "str" | "string" => Ok(ValueType::Str),
            other => Err(Error::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split off the first whitespace-delimited token
fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

fn unquote_key(token: &str) -> String {
    if token == "\"\"" {
        String::new()
    } else {
        token.to_string()
    }
}
