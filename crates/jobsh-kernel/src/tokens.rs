//! Word splitting for a raw input line.
//!
//! Whitespace separates words. Double quotes allow `\` escapes inside them,
//! single quotes are literal, and a bare backslash escapes the next character.
//! Adjacent pieces join into one word, so `a"b c"` is the single word `ab c`.
//! Operators are only recognised later, and only as whole unquoted words:
//! `"|"` is a plain argument.

use std::borrow::Cow;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    #[regex(r"[ \t\r\n\f]+")]
    Blank,

    #[regex(r#"[^ \t\r\n\f"'\\]+"#)]
    Bare,

    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    #[regex(r"\\.")]
    Escaped,
}

/// One word of input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Word {
    text: String,
    /// Some part of the word was quoted or escaped.
    quoted: bool,
}

impl Word {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// True when the word is exactly `op`, written without quotes.
    pub fn is_operator(&self, op: &str) -> bool {
        !self.quoted && self.text == op
    }

    fn push(&mut self, text: &str, quoted: bool) {
        self.text.push_str(text);
        self.quoted |= quoted;
    }
}

impl From<&str> for Word {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            quoted: false,
        }
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// An ordered sequence of words from one input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    words: Vec<Word>,
}

impl Tokens {
    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(Word::as_str)
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(Word::as_str)
    }
}

impl<'a> FromIterator<&'a str> for Tokens {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Word::from).collect(),
        }
    }
}

/// Split `line` into words.
///
/// Never fails: text the lexer cannot classify (an unterminated quote, a
/// trailing backslash) is kept literally.
pub fn tokenize(line: &str) -> Tokens {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;
    let mut lexer = Piece::lexer(line);

    while let Some(piece) = lexer.next() {
        let slice = lexer.slice();
        let (text, quoted) = match piece {
            Ok(Piece::Blank) => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
                continue;
            }
            Ok(Piece::Bare) | Err(()) => (Cow::Borrowed(slice), false),
            Ok(Piece::DoubleQuoted) => (Cow::Owned(unescape(&slice[1..slice.len() - 1])), true),
            Ok(Piece::SingleQuoted) => (Cow::Borrowed(&slice[1..slice.len() - 1]), true),
            Ok(Piece::Escaped) => (Cow::Borrowed(&slice[1..]), true),
        };
        current.get_or_insert_with(Word::default).push(&text, quoted);
    }

    if let Some(word) = current {
        words.push(word);
    }
    Tokens { words }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}
