// Copyright 2026 the Patterns Authors
// SPDX-License-Identifier: Apache-2.0

//! A parser and matcher for the subset of CSS selectors used by the pattern widgets.
//!
//! Supported syntax:
//!
//! - selector lists separated by `,`
//! - descendant combinators (whitespace)
//! - type selectors (`a`, `button`, `*`), matched case-insensitively
//! - `.class`, `#id`
//! - attribute selectors `[attr]`, `[attr=v]`, `[attr~=v]`, `[attr*=v]`, `[attr^=v]` and
//!   `[attr$=v]`, where `v` is either a bare identifier or a `"` / `'` quoted string
//!
//! A parsed [`Selector`] can be matched against anything implementing [`SelectorSubject`],
//! and its [`Display`](fmt::Display) output is a canonical selector string that browsers accept
//! in `querySelectorAll`.

use std::fmt;

use smallvec::{SmallVec, smallvec};
use thiserror::Error;

/// Something a [`Selector`] can be matched against.
///
/// Ids and classes are read through the `id` and `class` attributes.
pub trait SelectorSubject: Sized {
    /// The element's tag name, in any case.
    fn tag_name(&self) -> &str;

    /// The value of the attribute `name`, if present.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// The parent element, if any.
    fn parent(&self) -> Option<Self>;
}

/// An error produced by [`Selector::parse`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The input contained nothing but whitespace.
    #[error("selector is empty")]
    Empty,
    /// A character that cannot start or continue the current construct.
    #[error("unexpected character {found:?} at offset {offset}")]
    Unexpected {
        /// The offending character.
        found: char,
        /// Byte offset into the input.
        offset: usize,
    },
    /// The input ended in the middle of a construct.
    #[error("unexpected end of selector at offset {offset}")]
    UnexpectedEnd {
        /// Byte offset into the input.
        offset: usize,
    },
    /// A quoted attribute value was never closed.
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        offset: usize,
    },
}

/// A parsed selector list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    alternatives: SmallVec<[Complex; 1]>,
}

/// Compound selectors joined by descendant combinators, left to right.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Complex {
    compounds: SmallVec<[Compound; 2]>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    /// Lowercased type name, `None` for the universal selector.
    tag: Option<String>,
    simple: SmallVec<[Simple; 2]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Simple {
    Id(String),
    Class(String),
    Attribute { name: String, op: AttrOp },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        if input.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = Parser { src: input, pos: 0 };
        let mut alternatives = SmallVec::new();
        loop {
            parser.skip_whitespace();
            alternatives.push(parser.complex()?);
            parser.skip_whitespace();
            match parser.peek() {
                None => break,
                Some(',') => parser.bump(),
                Some(found) => {
                    return Err(SelectorError::Unexpected {
                        found,
                        offset: parser.pos,
                    });
                }
            }
        }
        Ok(Self { alternatives })
    }

    /// `[name="value"]`, built without going through the parser so that `value` needs no escaping.
    pub fn attribute_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::single(Simple::Attribute {
            name: name.into(),
            op: AttrOp::Equals(value.into()),
        })
    }

    /// `[name]`
    pub fn has_attribute(name: impl Into<String>) -> Self {
        Self::single(Simple::Attribute {
            name: name.into(),
            op: AttrOp::Exists,
        })
    }

    fn single(simple: Simple) -> Self {
        Self {
            alternatives: smallvec![Complex {
                compounds: smallvec![Compound {
                    tag: None,
                    simple: smallvec![simple],
                }],
            }],
        }
    }

    /// A selector matching anything either `self` or `other` matches.
    #[must_use]
    pub fn or(mut self, other: Self) -> Self {
        self.alternatives.extend(other.alternatives);
        self
    }

    /// Whether `subject` matches any alternative of this selector list.
    pub fn matches<S: SelectorSubject>(&self, subject: &S) -> bool {
        self.alternatives.iter().any(|complex| complex.matches(subject))
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Complex {
    fn matches<S: SelectorSubject>(&self, subject: &S) -> bool {
        let Some((last, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(subject) {
            return false;
        }
        // Descendant combinators only, so matching each ancestor compound greedily is exact.
        let mut current = subject.parent();
        for compound in ancestors.iter().rev() {
            loop {
                let Some(node) = current else {
                    return false;
                };
                current = node.parent();
                if compound.matches(&node) {
                    break;
                }
            }
        }
        true
    }
}

impl Compound {
    fn matches<S: SelectorSubject>(&self, subject: &S) -> bool {
        if let Some(tag) = &self.tag {
            if !subject.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.simple.iter().all(|simple| match simple {
            Simple::Id(id) => subject.attribute("id") == Some(id.as_str()),
            Simple::Class(class) => subject
                .attribute("class")
                .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class)),
            Simple::Attribute { name, op } => {
                subject.attribute(name).is_some_and(|value| op.matches(value))
            }
        })
    }
}

impl AttrOp {
    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exists => true,
            Self::Equals(expected) => value == expected,
            Self::Includes(word) => value.split_ascii_whitespace().any(|w| w == word),
            // Per CSS, the substring operators never match an empty needle.
            Self::Contains(needle) => !needle.is_empty() && value.contains(needle.as_str()),
            Self::Prefix(needle) => !needle.is_empty() && value.starts_with(needle.as_str()),
            Self::Suffix(needle) => !needle.is_empty() && value.ends_with(needle.as_str()),
        }
    }
}

// --- MARK: PARSER ---

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Returns whether any whitespace was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.bump();
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                found,
                offset: self.pos,
            },
            None => SelectorError::UnexpectedEnd { offset: self.pos },
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn ident(&mut self) -> Result<&str, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        Ok(&self.src[start..self.pos])
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        let mut compounds = SmallVec::new();
        loop {
            compounds.push(self.compound()?);
            let had_whitespace = self.skip_whitespace();
            match self.peek() {
                Some(c) if had_whitespace && starts_compound(c) => {}
                _ => break,
            }
        }
        Ok(Complex { compounds })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut consumed = false;
        match self.peek() {
            Some('*') => {
                self.bump();
                consumed = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
                consumed = true;
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    compound.simple.push(Simple::Class(self.ident()?.to_owned()));
                }
                Some('#') => {
                    self.bump();
                    compound.simple.push(Simple::Id(self.ident()?.to_owned()));
                }
                Some('[') => compound.simple.push(self.attribute()?),
                _ => break,
            }
            consumed = true;
        }
        if consumed {
            Ok(compound)
        } else {
            Err(self.unexpected())
        }
    }

    fn attribute(&mut self) -> Result<Simple, SelectorError> {
        self.expect('[')?;
        self.skip_whitespace();
        let name = self.ident()?.to_owned();
        self.skip_whitespace();
        let op: fn(String) -> AttrOp = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(Simple::Attribute {
                    name,
                    op: AttrOp::Exists,
                });
            }
            Some('=') => {
                self.bump();
                AttrOp::Equals
            }
            Some(prefix @ ('~' | '*' | '^' | '$')) => {
                self.bump();
                self.expect('=')?;
                match prefix {
                    '~' => AttrOp::Includes,
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    _ => AttrOp::Suffix,
                }
            }
            _ => return Err(self.unexpected()),
        };
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => self.string(quote)?,
            _ => self.ident()?.to_owned(),
        };
        self.skip_whitespace();
        self.expect(']')?;
        Ok(Simple::Attribute {
            name,
            op: op(value),
        })
    }

    fn string(&mut self, quote: char) -> Result<String, SelectorError> {
        let offset = self.pos;
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorError::UnterminatedString { offset }),
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some(c) => {
                            value.push(c);
                            self.bump();
                        }
                        None => return Err(SelectorError::UnterminatedString { offset }),
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(value);
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }
}

fn starts_compound(c: char) -> bool {
    is_ident_char(c) || matches!(c, '*' | '.' | '#' | '[')
}

// --- MARK: DISPLAY ---

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            for (j, compound) in complex.compounds.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{compound}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => f.write_str(tag)?,
            None if self.simple.is_empty() => f.write_str("*")?,
            None => {}
        }
        for simple in &self.simple {
            match simple {
                Simple::Id(id) => write!(f, "#{id}")?,
                Simple::Class(class) => write!(f, ".{class}")?,
                Simple::Attribute { name, op } => {
                    let (symbol, value) = match op {
                        AttrOp::Exists => {
                            write!(f, "[{name}]")?;
                            continue;
                        }
                        AttrOp::Equals(v) => ("=", v),
                        AttrOp::Includes(v) => ("~=", v),
                        AttrOp::Contains(v) => ("*=", v),
                        AttrOp::Prefix(v) => ("^=", v),
                        AttrOp::Suffix(v) => ("$=", v),
                    };
                    write!(f, "[{name}{symbol}\"")?;
                    for c in value.chars() {
                        if matches!(c, '"' | '\\') {
                            f.write_str("\\")?;
                        }
                        write!(f, "{c}")?;
                    }
                    f.write_str("\"]")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        tag: &'static str,
        attrs: &'static [(&'static str, &'static str)],
        parent: Option<&'static Fake>,
    }

    impl SelectorSubject for &Fake {
        fn tag_name(&self) -> &str {
            self.tag
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
        }

        fn parent(&self) -> Option<Self> {
            self.parent
        }
    }

    static NAV: Fake = Fake {
        tag: "NAV",
        attrs: &[("data-js", "active-navigation sticky")],
        parent: None,
    };

    static LINK: Fake = Fake {
        tag: "A",
        attrs: &[("href", "#section-1"), ("class", "nav-link active")],
        parent: Some(&NAV),
    };

    #[test]
    fn toggle_selector_matches_substring() {
        let selector = Selector::parse(r#"[data-js*="toggle"]"#).unwrap();
        let trigger = Fake {
            tag: "button",
            attrs: &[("data-js", "dialog toggle")],
            parent: None,
        };
        assert!(selector.matches(&&trigger));
        assert!(!selector.matches(&&NAV));
    }

    #[test]
    fn descendant_and_compound() {
        let selector = Selector::parse(r##"[data-js*='active-navigation'] a.nav-link[href^="#"]"##)
            .unwrap();
        assert!(selector.matches(&&LINK));
        assert!(!selector.matches(&&NAV));
        let detached = Selector::parse("section a").unwrap();
        assert!(!detached.matches(&&LINK));
    }

    #[test]
    fn list_and_type_case() {
        let selector = Selector::parse("button, a[href], [tabindex]").unwrap();
        assert!(selector.matches(&&LINK));
        assert!(!selector.matches(&&NAV));
        assert_eq!(selector.to_string(), "button, a[href], [tabindex]");
    }

    #[test]
    fn display_escapes_values() {
        let selector = Selector::attribute_equals("href", "#a\"b");
        assert_eq!(selector.to_string(), r##"[href="#a\"b"]"##);
        assert_eq!(Selector::parse(&selector.to_string()).unwrap(), selector);
    }

    #[test]
    fn parse_errors_carry_offsets() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(
            Selector::parse("a, "),
            Err(SelectorError::UnexpectedEnd { offset: 3 })
        );
        assert_eq!(
            Selector::parse("[data-js*=\"toggle]"),
            Err(SelectorError::UnterminatedString { offset: 10 })
        );
        assert_eq!(
            Selector::parse("a > b"),
            Err(SelectorError::Unexpected {
                found: '>',
                offset: 2
            })
        );
    }

    #[test]
    fn empty_substring_never_matches() {
        let selector = Selector::parse(r#"[href*=""]"#).unwrap();
        assert!(!selector.matches(&&LINK));
    }
}
