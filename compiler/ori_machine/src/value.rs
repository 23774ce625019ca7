//! Runtime values passed through registers.
//!
//! Only the shapes the loader builds or inspects are modelled here: lists of
//! symbols, vectors of strings, procedures and code blocks, plus the scalars
//! running code needs to report results.

use std::fmt;
use std::sync::Arc;

use crate::{CodeVector, Procedure, Symbol};

/// A cons cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Pair {
    pub car: Value,
    pub cdr: Value,
}

impl Drop for Pair {
    /// Unlink uniquely owned tails one by one so long lists drop without recursion.
    fn drop(&mut self) {
        let mut tail = std::mem::take(&mut self.cdr);
        while let Value::Pair(next) = tail {
            match Arc::try_unwrap(next) {
                Ok(mut pair) => tail = std::mem::take(&mut pair.cdr),
                // Still shared; whoever holds the last reference unlinks the rest.
                Err(_) => break,
            }
        }
    }
}

/// A machine value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// The empty list.
    Null,
    /// Contents of a cleared register.
    #[default]
    Unspecified,
    Bool(bool),
    Fixnum(i64),
    Str(Arc<str>),
    Symbol(Symbol),
    Pair(Arc<Pair>),
    Vector(Arc<[Value]>),
    Procedure(Procedure),
    CodeVector(CodeVector),
}

impl Value {
    /// New pair of `car` and `cdr`.
    pub fn cons(car: Value, cdr: Value) -> Self {
        Value::Pair(Arc::new(Pair { car, cdr }))
    }

    /// String value holding a copy of `text`.
    pub fn string(text: &str) -> Self {
        Value::Str(Arc::from(text))
    }

    /// Vector holding `items` in order.
    pub fn vector(items: Vec<Value>) -> Self {
        Value::Vector(items.into())
    }

    /// True for the empty list.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The procedure, if this value is one.
    pub fn as_procedure(&self) -> Option<&Procedure> {
        match self {
            Value::Procedure(p) => Some(p),
            _ => None,
        }
    }

    pub fn car(&self) -> Option<&Value> {
        match self {
            Value::Pair(pair) => Some(&pair.car),
            _ => None,
        }
    }

    pub fn cdr(&self) -> Option<&Value> {
        match self {
            Value::Pair(pair) => Some(&pair.cdr),
            _ => None,
        }
    }

    /// Elements of a proper list, or `None` if `self` is not one.
    pub fn list_to_vec(&self) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                Value::Null => return Some(items),
                Value::Pair(pair) => {
                    items.push(pair.car.clone());
                    cursor = &pair.cdr;
                }
                _ => return None,
            }
        }
    }

    /// Name of the value's shape, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unspecified => "unspecified",
            Value::Bool(_) => "boolean",
            Value::Fixnum(_) => "fixnum",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Pair(_) => "pair",
            Value::Vector(_) => "vector",
            Value::Procedure(_) => "procedure",
            Value::CodeVector(_) => "code vector",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("()"),
            Value::Unspecified => f.write_str("#!unspecified"),
            Value::Bool(true) => f.write_str("#t"),
            Value::Bool(false) => f.write_str("#f"),
            Value::Fixnum(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Symbol(sym) => write!(f, "{sym}"),
            Value::Pair(pair) => {
                write!(f, "({}", pair.car)?;
                let mut rest = &pair.cdr;
                loop {
                    match rest {
                        Value::Null => break,
                        Value::Pair(next) => {
                            write!(f, " {}", next.car)?;
                            rest = &next.cdr;
                        }
                        tail => {
                            write!(f, " . {tail}")?;
                            break;
                        }
                    }
                }
                f.write_str(")")
            }
            Value::Vector(items) => {
                f.write_str("#(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Value::Procedure(p) => write!(f, "#<procedure {}>", p.name()),
            Value::CodeVector(cv) => write!(f, "#<code {}>", cv.label()),
        }
    }
}

#[cfg(test)]
mod tests;
