// src/selector.rs
//! Keys-and-indices selectors such as `people[0].name."first name"`.
//!
//! A selector is only a compact way to spell a sequence of navigator calls;
//! it has no wildcards, filters or projections.
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::errors::{Result, SelectorError};
use crate::navigator::Navigator;
use crate::node::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Key(String),
    Index(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    steps: Vec<Step>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let mut p = Parser::new(input);
        let steps = p.parse_steps()?;
        if steps.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Walk the selector from `node`: each run of consecutive keys becomes one
    /// `at_path` call and each index one `at_index` call, so failures carry
    /// the same diagnostics as hand-written navigation.
    pub fn walk<'a>(&self, nav: &mut Navigator, node: &Node<'a>) -> Node<'a> {
        let mut current = node.clone();
        let mut keys: Vec<&str> = Vec::new();
        for step in &self.steps {
            match step {
                Step::Key(k) => keys.push(k),
                Step::Index(i) => {
                    if !keys.is_empty() {
                        current = nav.at_path(&current, keys.as_slice());
                        keys.clear();
                    }
                    current = nav.at_index(&current, *i);
                }
            }
        }
        if !keys.is_empty() {
            current = nav.at_path(&current, keys.as_slice());
        }
        current
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                Step::Key(k) if is_identifier(k) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
                Step::Key(k) => {
                    f.write_char('[')?;
                    write_quoted(f, k)?;
                    f.write_char(']')?;
                }
                Step::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}

/// Double-quote `key` using only escapes `Parser::parse_quoted_string` reads back.
fn write_quoted(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in key.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c.is_control() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(f, "\\u{unit:04x}")?;
                }
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c == '_' || c == '-' || c.is_ascii_alphanumeric())
}

struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn parse_steps(&mut self) -> Result<Vec<Step>> {
        let mut steps = Vec::new();
        self.skip_ws();
        if self.eof() {
            return Ok(steps);
        }
        // A selector may open with a bare key or a bracket.
        if self.peek_char() != Some('[') {
            steps.push(Step::Key(self.parse_key()?));
        }
        loop {
            self.skip_ws();
            if self.eof() {
                break;
            }
            if self.consume_char('.') {
                self.skip_ws();
                steps.push(Step::Key(self.parse_key()?));
                continue;
            }
            if self.consume_char('[') {
                self.skip_ws();
                let step = match self.peek_char() {
                    Some('"') | Some('\'') => Step::Key(self.parse_quoted_string()?),
                    _ => Step::Index(self.parse_int()?),
                };
                self.skip_ws();
                self.expect(']')?;
                steps.push(step);
                continue;
            }
            return Err(self.error("expected '.' or '['"));
        }
        Ok(steps)
    }

    fn parse_key(&mut self) -> Result<String> {
        match self.peek_char() {
            Some('"') | Some('\'') => self.parse_quoted_string(),
            _ => self.parse_identifier(),
        }
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '_' || c == '-' || c.is_ascii_alphanumeric() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(self.error("key expected"));
        }
        Ok(self.s[start..self.i].to_string())
    }

    fn parse_int(&mut self) -> Result<i64> {
        let start = self.i;
        if self.peek_char() == Some('-') {
            self.i += 1;
        }
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        let digits = &self.s[start..self.i];
        if digits.is_empty() || digits == "-" {
            return Err(self.error("expected integer index"));
        }
        digits.parse::<i64>().map_err(|_| SelectorError::Syntax {
            offset: start,
            message: "index out of range".into(),
        })
    }

    fn parse_quoted_string(&mut self) -> Result<String> {
        let quote = match self.peek_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected quoted key")),
        };
        self.i += 1;
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        '/' => out.push('/'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        'u' => out.push(self.parse_unicode_escape()?),
                        _ => {
                            out.push('\\');
                            out.push(nc);
                        }
                    }
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        Err(self.error("unterminated string"))
    }

    /// The code point of a `\uXXXX` escape (the `\u` already consumed),
    /// joining a UTF-16 surrogate pair when one follows.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let start = self.i.saturating_sub(2);
        let high = self.parse_hex4()?;
        let code = match high {
            0xD800..=0xDBFF => {
                if !self.s[self.i..].starts_with("\\u") {
                    return Err(self.escape_error(start));
                }
                self.i += 2;
                let low = self.parse_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.escape_error(start));
                }
                0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(self.escape_error(start)),
            _ => u32::from(high),
        };
        char::from_u32(code).ok_or_else(|| self.escape_error(start))
    }

    fn parse_hex4(&mut self) -> Result<u16> {
        let digits = self
            .s
            .get(self.i..self.i + 4)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("expected four hex digits"))?;
        let unit = u16::from_str_radix(digits, 16).map_err(|_| self.error("expected four hex digits"))?;
        self.i += 4;
        Ok(unit)
    }

    fn escape_error(&self, offset: usize) -> SelectorError {
        SelectorError::Syntax {
            offset,
            message: "invalid unicode escape".into(),
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    fn error(&self, message: &str) -> SelectorError {
        SelectorError::Syntax {
            offset: self.i,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorReason;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn key(k: &str) -> Step {
        Step::Key(k.to_string())
    }

    #[test]
    fn parses_keys_indices_and_quoted_keys() {
        let sel = Selector::parse(r#"people[0].name["first name"]['x.y'][-1]"#).unwrap();
        assert_eq!(
            sel.steps(),
            &[
                key("people"),
                Step::Index(0),
                key("name"),
                key("first name"),
                key("x.y"),
                Step::Index(-1),
            ]
        );
    }

    #[test]
    fn leading_index_and_quoted_first_key() {
        assert_eq!(Selector::parse("[2]").unwrap().steps(), &[Step::Index(2)]);
        assert_eq!(
            Selector::parse(r#""a b".c"#).unwrap().steps(),
            &[key("a b"), key("c")]
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("a[1"),
            Err(SelectorError::Syntax { offset: 3, .. })
        ));
        assert!(matches!(Selector::parse("a.[x]"), Err(SelectorError::Syntax { .. })));
        assert!(matches!(Selector::parse("a[\"b]"), Err(SelectorError::Syntax { .. })));
        assert!(matches!(Selector::parse("a b"), Err(SelectorError::Syntax { .. })));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let sel: Selector = r#"a.b[3]["c d"].e"#.parse().unwrap();
        assert_eq!(sel.to_string(), r#"a.b[3]["c d"].e"#);
        assert_eq!(sel.to_string().parse::<Selector>().unwrap(), sel);
    }

    #[test]
    fn control_characters_in_keys_round_trip() {
        let sel = Selector {
            steps: vec![key("a\u{8}b"), key("c\u{1}"), key("tab\there"), key("q\"\\")],
        };
        let text = sel.to_string();
        assert_eq!(text, r#"["a\u0008b"]["c\u0001"]["tab\there"]["q\"\\"]"#);
        assert_eq!(text.parse::<Selector>().unwrap(), sel);
    }

    #[test]
    fn json_escapes_in_quoted_keys() {
        let sel = Selector::parse(r#"["a\bb"]["\f\/"]["\u00e9"]["\ud83d\ude00"]"#).unwrap();
        assert_eq!(
            sel.steps(),
            &[key("a\u{8}b"), key("\u{c}/"), key("\u{e9}"), key("\u{1f600}")]
        );
        assert!(matches!(
            Selector::parse(r#"["\ud83d"]"#),
            Err(SelectorError::Syntax { offset: 2, .. })
        ));
        assert!(matches!(Selector::parse(r#"["\u12"]"#), Err(SelectorError::Syntax { .. })));
    }

    #[test]
    fn walk_groups_keys_into_paths() {
        let doc = json!({"a": {"b": [{"c": {"d": "deep"}}]}});
        let root = Node::new(&doc);
        let mut nav = Navigator::new();
        let sel = Selector::parse("a.b[0].c.d").unwrap();

        let leaf = sel.walk(&mut nav, &root);
        assert_eq!(nav.as_string(&leaf), "deep");

        let frames: Vec<String> = leaf
            .origin()
            .map(|o| o.iter().map(ToString::to_string).collect())
            .unwrap_or_default();
        assert_eq!(
            frames,
            vec![r#"at_path("c", "d")"#, "at_index(0)", r#"at_path("a", "b")"#]
        );
    }

    #[test]
    fn walk_stops_at_first_failure() {
        let doc = json!({"a": [1]});
        let root = Node::new(&doc);
        let mut nav = Navigator::new();
        let leaf = Selector::parse("a[4].b").unwrap().walk(&mut nav, &root);
        assert!(leaf.is_null());
        let err = nav.clear_error().unwrap();
        assert_eq!(err.method(), "at_index");
        assert_eq!(err.reason(), ErrorReason::InvalidInput);
    }
}
