//! Parser for generator search shards.
//!
//! A shard is a script unit of the form
//!
//! ```text
//! var searchData=
//! [
//!   ['define',['Define',['../classDynacoe_1_1Color.html#ae7fa',1,'Dynacoe::Color::Define(uint32_t c)']]],
//! ];
//! ```
//!
//! Each entry is `[key, [label, [url, flag, scope], ...]]`. Only the literal subset the
//! generator emits is understood: arrays, quoted strings and integers.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::{
    entities,
    types::{RawShard, SearchEntry, SearchResult, Shard, ShardId},
};

const DATA_VARIABLE: &str = "searchData";

/// Deepest array nesting accepted. Generated shards nest four levels.
const MAX_DEPTH: usize = 16;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:var|let|const)\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=")
        .expect("declaration pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShardError {
    #[error("no `searchData` declaration found")]
    MissingDeclaration,
    #[error("expected `searchData` but the shard declares `{0}`")]
    UnexpectedVariable(String),
    #[error("unexpected {found:?} at byte {offset}; expected {expected}")]
    UnexpectedToken {
        offset: usize,
        found: char,
        expected: &'static str,
    },
    #[error("input ended early; expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString { offset: usize },
    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape { offset: usize },
    #[error("invalid number at byte {offset}")]
    InvalidNumber { offset: usize },
    #[error("arrays nested deeper than 16 levels at byte {offset}")]
    NestingTooDeep { offset: usize },
    #[error("trailing content at byte {offset}")]
    TrailingContent { offset: usize },
    #[error("entry {index}: {reason}")]
    MalformedEntry { index: usize, reason: String },
    #[error("entry {index} (`{key}`) has no links")]
    EmptyEntry { index: usize, key: String },
}

/// Parses the text of one shard into its entries, keeping file order.
pub fn parse_shard(id: ShardId, source: &str) -> Result<Shard, ShardError> {
    let captures = DECLARATION
        .captures(source)
        .ok_or(ShardError::MissingDeclaration)?;
    let name = &captures[1];
    if name != DATA_VARIABLE {
        return Err(ShardError::UnexpectedVariable(name.to_string()));
    }
    let body_start = captures.get(0).map_or(0, |whole| whole.end());

    let mut parser = Parser::new(source, body_start);
    let root = parser.parse_value()?;
    parser.finish()?;

    let Literal::Array(items) = root else {
        return Err(ShardError::MalformedEntry {
            index: 0,
            reason: format!("`{DATA_VARIABLE}` must be an array"),
        });
    };

    let entries = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| build_entry(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Shard { id, entries })
}

impl TryFrom<RawShard> for Shard {
    type Error = ShardError;

    fn try_from(raw: RawShard) -> Result<Self, Self::Error> {
        parse_shard(raw.id, &raw.contents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Literal {
    Str(String),
    Int(i64),
    Array(Vec<Literal>),
}

impl Literal {
    fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Array(_) => "array",
        }
    }
}

fn build_entry(index: usize, item: Literal) -> Result<SearchEntry, ShardError> {
    let malformed = |reason: String| ShardError::MalformedEntry { index, reason };

    let parts = match item {
        Literal::Array(parts) => parts,
        other => return Err(malformed(format!("expected array, found {}", other.kind()))),
    };
    let [key, body]: [Literal; 2] = parts.try_into().map_err(|parts: Vec<Literal>| {
        malformed(format!("expected 2 fields, found {}", parts.len()))
    })?;

    let key = match key {
        Literal::Str(key) if key.is_empty() => return Err(malformed("key is empty".to_string())),
        Literal::Str(key) => key.to_lowercase(),
        other => {
            return Err(malformed(format!(
                "key must be a string, found {}",
                other.kind()
            )))
        }
    };

    let mut body = match body {
        Literal::Array(body) => body.into_iter(),
        other => {
            return Err(malformed(format!(
                "body must be an array, found {}",
                other.kind()
            )))
        }
    };
    let label = match body.next() {
        Some(Literal::Str(label)) => entities::decode(&label).into_owned(),
        Some(other) => {
            return Err(malformed(format!(
                "label must be a string, found {}",
                other.kind()
            )))
        }
        None => return Err(malformed("body is empty".to_string())),
    };

    let results = body
        .map(|link| build_result(&label, link).map_err(malformed))
        .collect::<Result<Vec<_>, _>>()?;
    if results.is_empty() {
        return Err(ShardError::EmptyEntry { index, key });
    }

    Ok(SearchEntry { key, results })
}

fn build_result(label: &str, link: Literal) -> Result<SearchResult, String> {
    let fields = match link {
        Literal::Array(fields) => fields,
        other => return Err(format!("link must be an array, found {}", other.kind())),
    };
    if !(2..=3).contains(&fields.len()) {
        return Err(format!("link must have 2 or 3 fields, found {}", fields.len()));
    }
    let mut fields = fields.into_iter();

    let target_url = match fields.next() {
        Some(Literal::Str(url)) if !url.is_empty() => url,
        Some(Literal::Str(_)) => return Err("link url is empty".to_string()),
        Some(other) => return Err(format!("link url must be a string, found {}", other.kind())),
        None => return Err("link url is missing".to_string()),
    };
    let open_in_parent = match fields.next() {
        Some(Literal::Int(flag)) => flag != 0,
        Some(other) => return Err(format!("link flag must be an integer, found {}", other.kind())),
        None => return Err("link flag is missing".to_string()),
    };
    let parent_scope = match fields.next() {
        Some(Literal::Str(scope)) if scope.is_empty() => None,
        Some(Literal::Str(scope)) => Some(entities::decode(&scope).into_owned()),
        Some(other) => return Err(format!("link scope must be a string, found {}", other.kind())),
        None => None,
    };

    Ok(SearchResult {
        label: label.to_string(),
        target_url,
        parent_scope,
        open_in_parent,
    })
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, pos: usize) -> Self {
        Self {
            source,
            pos,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let next = self.peek()?;
        self.pos += next.len_utf8();
        Some(next)
    }

    fn skip_whitespace(&mut self) {
        while let Some(next) = self.peek() {
            if !next.is_whitespace() {
                break;
            }
            self.pos += next.len_utf8();
        }
    }

    fn unexpected(&self, found: char, expected: &'static str) -> ShardError {
        ShardError::UnexpectedToken {
            offset: self.pos,
            found,
            expected,
        }
    }

    fn parse_value(&mut self) -> Result<Literal, ShardError> {
        const EXPECTED: &str = "an array, string or integer";
        self.skip_whitespace();
        match self.peek() {
            Some('[') => self.parse_array(),
            Some(quote @ ('\'' | '"')) => self.parse_string(quote).map(Literal::Str),
            Some(next) if next == '-' || next.is_ascii_digit() => self.parse_integer(),
            Some(found) => Err(self.unexpected(found, EXPECTED)),
            None => Err(ShardError::UnexpectedEnd { expected: EXPECTED }),
        }
    }

    fn parse_array(&mut self) -> Result<Literal, ShardError> {
        if self.depth >= MAX_DEPTH {
            return Err(ShardError::NestingTooDeep { offset: self.pos });
        }
        self.depth += 1;
        let array = self.parse_array_items();
        self.depth -= 1;
        array
    }

    fn parse_array_items(&mut self) -> Result<Literal, ShardError> {
        const EXPECTED: &str = "`,` or `]`";
        self.bump();
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(Literal::Array(items));
        }

        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    self.skip_whitespace();
                    if self.peek() == Some(']') {
                        self.bump();
                        break;
                    }
                }
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(found) => return Err(self.unexpected(found, EXPECTED)),
                None => return Err(ShardError::UnexpectedEnd { expected: EXPECTED }),
            }
        }

        Ok(Literal::Array(items))
    }

    fn parse_string(&mut self, quote: char) -> Result<String, ShardError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            let escape_at = self.pos;
            match self.bump() {
                None => return Err(ShardError::UnterminatedString { offset: start }),
                Some(next) if next == quote => return Ok(out),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('u') => self.parse_unicode_escape(escape_at)?,
                        Some(other @ ('\\' | '\'' | '"' | '/')) => other,
                        Some(_) => return Err(ShardError::InvalidEscape { offset: escape_at }),
                        None => return Err(ShardError::UnterminatedString { offset: start }),
                    };
                    out.push(escaped);
                }
                Some(next) => out.push(next),
            }
        }
    }

    fn parse_unicode_escape(&mut self, escape_at: usize) -> Result<char, ShardError> {
        let high = self.parse_hex4(escape_at)?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high).ok_or(ShardError::InvalidEscape { offset: escape_at });
        }

        // high surrogate must be followed by `\uDC00`..`\uDFFF`
        let low_at = self.pos;
        if self.bump() != Some('\\') || self.bump() != Some('u') {
            return Err(ShardError::InvalidEscape { offset: escape_at });
        }
        let low = self.parse_hex4(low_at)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(ShardError::InvalidEscape { offset: low_at });
        }
        char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
            .ok_or(ShardError::InvalidEscape { offset: escape_at })
    }

    fn parse_hex4(&mut self, escape_at: usize) -> Result<u32, ShardError> {
        let digits = self
            .source
            .get(self.pos..self.pos + 4)
            .filter(|digits| digits.bytes().all(|byte| byte.is_ascii_hexdigit()))
            .ok_or(ShardError::InvalidEscape { offset: escape_at })?;
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| ShardError::InvalidEscape { offset: escape_at })?;
        self.pos += 4;
        Ok(code)
    }

    fn parse_integer(&mut self) -> Result<Literal, ShardError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while self.peek().is_some_and(|next| next.is_ascii_digit()) {
            self.bump();
        }
        self.source[start..self.pos]
            .parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| ShardError::InvalidNumber { offset: start })
    }

    fn finish(&mut self) -> Result<(), ShardError> {
        self.skip_whitespace();
        if self.peek() == Some(';') {
            self.bump();
            self.skip_whitespace();
        }
        if self.pos < self.source.len() {
            return Err(ShardError::TrailingContent { offset: self.pos });
        }
        Ok(())
    }
}
