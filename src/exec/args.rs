// src/exec/args.rs

//! Structured argument lists.
//!
//! Arguments are handed to the OS as separate argv entries and never pass
//! through a shell. Callers that only have a pre-joined argument string can
//! split it with [`ArgList::parse`], which understands POSIX-style quoting:
//!
//! - whitespace separates words,
//! - `'single quotes'` are fully literal,
//! - inside `"double quotes"` a backslash escapes `"`, `\`, `$` and `` ` ``
//!   and is kept literally before anything else,
//! - outside quotes a backslash escapes the next character.

use std::fmt;

use crate::errors::{CmdrunError, Result};

/// Ordered list of program arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList {
    args: Vec<String>,
}

impl ArgList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a pre-joined argument string into individual arguments.
    pub fn parse(input: &str) -> Result<Self> {
        split_args(input).map(|args| Self { args })
    }

    /// Append one argument verbatim.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag` only when `enabled` is true.
    pub fn flag(self, flag: impl Into<String>, enabled: bool) -> Self {
        if enabled { self.arg(flag) } else { self }
    }

    /// Append `name value` as two arguments when `value` is present.
    pub fn option(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.arg(name).arg(v),
            None => self,
        }
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    pub fn extend(&mut self, other: ArgList) {
        self.args.extend(other.args);
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    /// Render as a single string that [`ArgList::parse`] splits back into
    /// the same list.
    pub fn render(&self) -> String {
        self.args
            .iter()
            .map(|a| quote_arg(a))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ArgList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<S: Into<String>> FromIterator<S> for ArgList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new().args(iter)
    }
}

impl IntoIterator for ArgList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.into_iter()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

fn split_args(input: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    // Distinguishes `''` (an empty argument) from no argument at all.
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\' | '$' | '`')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => {
                        return Err(CmdrunError::ArgParse(
                            "unterminated double quote".to_string(),
                        ));
                    }
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_word = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_word = true;
                }
                '\\' => match chars.next() {
                    Some(next) => {
                        current.push(next);
                        in_word = true;
                    }
                    None => {
                        return Err(CmdrunError::ArgParse(
                            "trailing backslash".to_string(),
                        ));
                    }
                },
                c if c.is_whitespace() => {
                    if in_word {
                        args.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    match quote {
        Quote::Single => Err(CmdrunError::ArgParse(
            "unterminated single quote".to_string(),
        )),
        Quote::Double => Err(CmdrunError::ArgParse(
            "unterminated double quote".to_string(),
        )),
        Quote::None => {
            if in_word {
                args.push(current);
            }
            Ok(args)
        }
    }
}

/// Quote a single argument for display. Plain words are left alone.
pub fn quote_arg(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        return arg.to_string();
    }
    // Inside single quotes everything is literal; a quote closes, is escaped,
    // and reopens.
    format!("'{}'", arg.replace('\'', r"'\''"))
}
