//! Stylesheet tokenization and rule parsing.
//!
//! Grammar: `selector { prop: value; ... }` blocks, where selectors are
//! whitespace-separated words and declaration tokens accept alphanumerics plus
//! `# - . %`. Malformed rules and declarations are skipped by resynchronizing
//! on `}` (rule level) or `;`/`}` (declaration level); nothing is reported.

use crate::selector::Selector;

/// Ordered `property: value` pairs. Repeated properties keep their first
/// position and their last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    entries: Vec<(String, String)>,
}

impl Declarations {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn insert(&mut self, property: String, value: String) {
        match self.entries.iter_mut().find(|(key, _)| *key == property) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((property, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// A selector with the declarations it applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selector: Selector,
    pub declarations: Declarations,
}

impl StyleRule {
    pub fn priority(&self) -> u32 {
        self.selector.priority()
    }
}

/// Style rules compiled from source CSS, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub rules: Vec<StyleRule>,
}

impl StyleSheet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Appends another sheet's rules after this one's.
    pub fn extend(&mut self, other: StyleSheet) {
        self.rules.extend(other.rules);
    }
}

/// Parses CSS source text.
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn parse(&self, input: &str) -> StyleSheet {
        let mut cursor = Cursor::new(input);
        let mut rules = Vec::new();

        while !cursor.at_end() {
            match cursor.rule() {
                Ok(rule) => rules.push(rule),
                Err(Malformed) => match cursor.ignore_until(&['}']) {
                    Some(_) => {
                        cursor.bump();
                        cursor.whitespace();
                    }
                    None => break,
                },
            }
        }

        StyleSheet { rules }
    }
}

/// Parses the body of a `style` attribute.
pub fn parse_declarations(input: &str) -> Declarations {
    let mut cursor = Cursor::new(input);
    cursor.whitespace();
    cursor.body()
}

/// Parses a standalone selector, as used by selector queries.
pub fn parse_selector(input: &str) -> Option<Selector> {
    let mut cursor = Cursor::new(input);
    cursor.whitespace();
    cursor.selector().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Malformed;

type Parsed<T> = Result<T, Malformed>;

struct Cursor {
    chars: Vec<char>,
    idx: usize,
}

impl Cursor {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            idx: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.idx >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn bump(&mut self) {
        self.idx = self.idx.saturating_add(1);
    }

    fn whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn word(&mut self) -> Parsed<String> {
        let start = self.idx;
        while self.peek().is_some_and(is_word_char) {
            self.bump();
        }

        if self.idx == start {
            return Err(Malformed);
        }
        Ok(self.chars[start..self.idx].iter().collect())
    }

    fn literal(&mut self, expected: char) -> Parsed<()> {
        if self.peek() != Some(expected) {
            return Err(Malformed);
        }
        self.bump();
        Ok(())
    }

    /// Advances to the next char in `stops` and returns it without consuming it.
    fn ignore_until(&mut self, stops: &[char]) -> Option<char> {
        while let Some(ch) = self.peek() {
            if stops.contains(&ch) {
                return Some(ch);
            }
            self.bump();
        }
        None
    }

    fn rule(&mut self) -> Parsed<StyleRule> {
        self.whitespace();
        let selector = self.selector()?;
        self.literal('{')?;
        self.whitespace();
        let declarations = self.body();
        self.literal('}')?;
        Ok(StyleRule {
            selector,
            declarations,
        })
    }

    fn selector(&mut self) -> Parsed<Selector> {
        let mut out = Selector::tag(&self.word()?);
        self.whitespace();

        while self.peek().is_some_and(|ch| ch != '{') {
            let descendant = Selector::tag(&self.word()?);
            out = Selector::descendant(out, descendant);
            self.whitespace();
        }

        Ok(out)
    }

    fn body(&mut self) -> Declarations {
        let mut declarations = Declarations::default();

        while self.peek().is_some_and(|ch| ch != '}') {
            match self.declaration(&mut declarations) {
                Ok(()) => {}
                Err(Malformed) => match self.ignore_until(&[';', '}']) {
                    Some(';') => {
                        self.bump();
                        self.whitespace();
                    }
                    _ => break,
                },
            }
        }

        declarations
    }

    /// Reads one `prop: value;`. The pair is kept as soon as it parses, even
    /// if the terminating `;` is missing (the last declaration of a block).
    fn declaration(&mut self, out: &mut Declarations) -> Parsed<()> {
        let property = self.word()?.to_lowercase();
        self.whitespace();
        self.literal(':')?;
        self.whitespace();
        let value = self.word()?;
        out.insert(property, value);

        self.whitespace();
        self.literal(';')?;
        self.whitespace();
        Ok(())
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '#' | '-' | '.' | '%')
}
