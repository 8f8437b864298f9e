//! Syntax-only repair of near-valid JSON emitted by the model.
//!
//! The input is tokenized leniently, then re-emitted as compact JSON while a
//! container stack tracks what the grammar expects next. Fixes:
//! - `//` and `/* */` comments are dropped
//! - single-quoted and smart-quoted strings become double-quoted
//! - unquoted keys and unquoted string values are quoted
//! - `True` / `False` / `None` become `true` / `false` / `null`
//! - trailing commas are dropped and missing commas/colons inserted
//! - a key or colon with no value gets `null`
//! - unterminated strings and unclosed containers are closed at end of input
//! - raw control characters and invalid escapes inside strings are escaped
//!
//! Valid JSON comes out with the same values, minus insignificant whitespace.
//! Anything after the first complete top-level value is discarded.

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    /// String content, already escaped for a JSON double-quoted literal.
    Str(String),
    /// A bare run of text: a number, a literal, or an unquoted string.
    Word,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
    newline_before: bool,
}

fn is_structural(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | ':' | ',' | '"')
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}')
}

fn closers_for(open: char) -> &'static [char] {
    match open {
        '"' => &['"'],
        '\'' => &['\''],
        '\u{201C}' | '\u{201D}' => &['\u{201D}', '\u{201C}', '"'],
        _ => &['\u{2019}', '\u{2018}'],
    }
}

/// A quote closes its string only when what follows could continue the
/// surrounding JSON: a delimiter, a comment, a line break, or end of input.
fn closes_string(chars: &[(usize, char)], quote_at: usize) -> bool {
    let mut i = quote_at + 1;
    while let Some(&(_, c)) = chars.get(i) {
        match c {
            '\n' | '\r' => return true,
            c if c.is_whitespace() => i += 1,
            ',' | ':' | '}' | ']' => return true,
            '/' => return matches!(chars.get(i + 1), Some((_, '/' | '*'))),
            _ => return false,
        }
    }
    true
}

/// Reads a quoted string starting at `chars[open_at]`. Returns the escaped
/// content and the index just past the closing quote.
fn read_string(chars: &[(usize, char)], open_at: usize) -> (String, usize) {
    let closers = closers_for(chars[open_at].1);
    let mut content = String::new();
    let mut i = open_at + 1;

    while i < chars.len() {
        let c = chars[i].1;
        if c == '\\' {
            match chars.get(i + 1).map(|&(_, n)| n) {
                Some(n @ ('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')) => {
                    content.push('\\');
                    content.push(n);
                    i += 2;
                }
                Some('u')
                    if chars.len() > i + 5
                        && chars[i + 2..i + 6].iter().all(|&(_, h)| h.is_ascii_hexdigit()) =>
                {
                    content.push_str("\\u");
                    content.extend(chars[i + 2..i + 6].iter().map(|&(_, h)| h));
                    i += 6;
                }
                Some('\'') => {
                    content.push('\'');
                    i += 2;
                }
                _ => {
                    // Lone backslash: keep it as a literal character.
                    content.push_str("\\\\");
                    i += 1;
                }
            }
            continue;
        }

        if closers.contains(&c) && closes_string(chars, i) {
            return (content, i + 1);
        }

        match c {
            '"' => content.push_str("\\\""),
            '\n' => content.push_str("\\n"),
            '\r' => content.push_str("\\r"),
            '\t' => content.push_str("\\t"),
            c if (c as u32) < 0x20 => content.push_str(&format!("\\u{:04x}", c as u32)),
            c => content.push(c),
        }
        i += 1;
    }

    (content, chars.len())
}

fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map(|&(b, _)| b).unwrap_or(input.len());
    let mut tokens = Vec::new();
    let mut newline_before = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i].1;
        let next = chars.get(i + 1).map(|&(_, n)| n);

        if c.is_whitespace() {
            newline_before |= c == '\n';
            i += 1;
            continue;
        }

        // `//` directly after a colon is the tail of an unquoted URL, not a comment.
        let after_colon = i > 0 && chars[i - 1].1 == ':';
        if c == '/' && next == Some('/') && !after_colon {
            while i < chars.len() && chars[i].1 != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '/' && next == Some('*') {
            i += 2;
            while i < chars.len() && !(chars[i].1 == '*' && chars.get(i + 1).map(|p| p.1) == Some('/'))
            {
                i += 1;
            }
            i = (i + 2).min(chars.len());
            continue;
        }

        let start = i;
        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            q if is_quote(q) => {
                let (content, end) = read_string(&chars, i);
                tokens.push(Token {
                    kind: TokenKind::Str(content),
                    start: byte_at(start),
                    end: byte_at(end),
                    newline_before,
                });
                newline_before = false;
                i = end;
                continue;
            }
            _ => {
                while i < chars.len() && !chars[i].1.is_whitespace() && !is_structural(chars[i].1) {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Word,
                    start: byte_at(start),
                    end: byte_at(i),
                    newline_before,
                });
                newline_before = false;
                continue;
            }
        };

        i += 1;
        tokens.push(Token {
            kind,
            start: byte_at(start),
            end: byte_at(i),
            newline_before,
        });
        newline_before = false;
    }

    tokens
}

fn is_json_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let from = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i > from
    };

    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    if bytes.get(i) == Some(&b'0') {
        i += 1;
    } else if !digits(&mut i) {
        return false;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if !digits(&mut i) {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !digits(&mut i) {
            return false;
        }
    }
    i == bytes.len()
}

/// Renders a bare word as a JSON value.
fn bare_value(text: &str) -> String {
    match text {
        "true" | "false" | "null" => text.to_string(),
        "True" => "true".to_string(),
        "False" => "false".to_string(),
        "None" => "null".to_string(),
        _ if is_json_number(text) => text.to_string(),
        _ => quote(text),
    }
}

fn quote(text: &str) -> String {
    // Serializing a &str cannot fail.
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    Colon,
    Value,
    /// A value was just completed; a comma or the closer comes next.
    Separator,
}

#[derive(Debug)]
struct Frame {
    container: Container,
    expect: Expect,
    has_members: bool,
}

struct Repairer<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    out: String,
    stack: Vec<Frame>,
    root_done: bool,
}

impl<'a> Repairer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            tokens: tokenize(input),
            out: String::with_capacity(input.len()),
            stack: Vec::new(),
            root_done: false,
        }
    }

    fn run(mut self) -> String {
        let mut j = 0;
        while j < self.tokens.len() && !self.root_done {
            j = self.step(j);
        }
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.out
    }

    /// Joins consecutive words on one line into a single bare run. In value
    /// position a colon glued to words on both sides (`https://x`, `10:30`) is
    /// part of the run.
    fn merge_words(&self, j: usize, allow_colon: bool) -> (&'a str, usize) {
        let tokens = &self.tokens;
        let start = tokens[j].start;
        let mut end = tokens[j].end;
        let mut k = j + 1;

        while k < tokens.len() {
            let t = &tokens[k];
            match t.kind {
                TokenKind::Word if !t.newline_before => {
                    // A spaced word followed by a colon starts the next member.
                    let next_is_key_colon = tokens.get(k + 1).is_some_and(|c| {
                        c.kind == TokenKind::Colon
                            && !(c.start == t.end
                                && tokens.get(k + 2).is_some_and(|w| w.start == c.end))
                    });
                    if next_is_key_colon {
                        break;
                    }
                    end = t.end;
                    k += 1;
                }
                TokenKind::Colon
                    if allow_colon
                        && t.start == end
                        && tokens
                            .get(k + 1)
                            .is_some_and(|w| w.kind == TokenKind::Word && w.start == t.end) =>
                {
                    end = tokens[k + 1].end;
                    k += 2;
                }
                _ => break,
            }
        }

        let input: &'a str = self.input;
        (&input[start..end], k)
    }

    fn value_done(&mut self) {
        match self.stack.last_mut() {
            Some(frame) => frame.expect = Expect::Separator,
            None => self.root_done = true,
        }
    }

    /// Emits the value starting at token `j` and returns the next index.
    fn emit_value(&mut self, j: usize) -> usize {
        match &self.tokens[j].kind {
            TokenKind::LBrace => {
                self.out.push('{');
                self.stack.push(Frame {
                    container: Container::Object,
                    expect: Expect::Key,
                    has_members: false,
                });
                j + 1
            }
            TokenKind::LBracket => {
                self.out.push('[');
                self.stack.push(Frame {
                    container: Container::Array,
                    expect: Expect::Value,
                    has_members: false,
                });
                j + 1
            }
            TokenKind::Str(content) => {
                self.out.push('"');
                self.out.push_str(content);
                self.out.push('"');
                self.value_done();
                j + 1
            }
            TokenKind::Word => {
                let (text, next) = self.merge_words(j, true);
                self.out.push_str(&bare_value(text));
                self.value_done();
                next
            }
            _ => j + 1,
        }
    }

    fn close_top(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame.container {
            Container::Object => {
                match frame.expect {
                    Expect::Colon => self.out.push_str(":null"),
                    Expect::Value => self.out.push_str("null"),
                    Expect::Key | Expect::Separator => {}
                }
                self.out.push('}');
            }
            Container::Array => self.out.push(']'),
        }
        self.value_done();
    }

    /// Handles a closer: closes frames up to the nearest matching container,
    /// or ignores the closer when nothing open matches it.
    fn close_matching(&mut self, container: Container, j: usize) -> usize {
        if let Some(depth) = self.stack.iter().rposition(|f| f.container == container) {
            while self.stack.len() > depth {
                self.close_top();
            }
        }
        j + 1
    }

    fn step(&mut self, j: usize) -> usize {
        let kind = self.tokens[j].kind.clone();
        let is_value_start = matches!(
            kind,
            TokenKind::LBrace | TokenKind::LBracket | TokenKind::Str(_) | TokenKind::Word
        );

        let Some(frame) = self.stack.last_mut() else {
            return if is_value_start { self.emit_value(j) } else { j + 1 };
        };

        match (frame.container, frame.expect, &kind) {
            (_, _, TokenKind::RBrace) if frame.container == Container::Object => {
                self.close_top();
                j + 1
            }
            (_, _, TokenKind::RBracket) if frame.container == Container::Array => {
                self.close_top();
                j + 1
            }
            (_, _, TokenKind::RBrace) => self.close_matching(Container::Object, j),
            (_, _, TokenKind::RBracket) => self.close_matching(Container::Array, j),

            (Container::Object, Expect::Key, TokenKind::Str(content)) => {
                let key = format!("\"{content}\"");
                self.push_key(&key);
                j + 1
            }
            (Container::Object, Expect::Key, TokenKind::Word) => {
                let (text, next) = self.merge_words(j, false);
                let key = quote(text);
                self.push_key(&key);
                next
            }
            (Container::Object, Expect::Key, TokenKind::LBrace | TokenKind::LBracket) => {
                // A value with no key in front of it.
                self.push_key("\"\"");
                j
            }
            (Container::Object, Expect::Key, _) => j + 1,

            (Container::Object, Expect::Colon, TokenKind::Colon) => {
                self.out.push(':');
                frame.expect = Expect::Value;
                j + 1
            }
            (Container::Object, Expect::Colon, TokenKind::Comma) => {
                self.out.push_str(":null");
                frame.expect = Expect::Separator;
                j
            }
            (Container::Object, Expect::Colon, _) => {
                self.out.push(':');
                frame.expect = Expect::Value;
                j
            }

            (Container::Object, Expect::Value, TokenKind::Comma) => {
                self.out.push_str("null");
                frame.expect = Expect::Key;
                j + 1
            }
            (Container::Object, Expect::Value, TokenKind::Colon) => j + 1,
            (Container::Object, Expect::Value, _) => self.emit_value(j),

            (_, Expect::Separator, TokenKind::Comma) => {
                frame.expect = match frame.container {
                    Container::Object => Expect::Key,
                    Container::Array => Expect::Value,
                };
                j + 1
            }
            (_, Expect::Separator, TokenKind::Colon) => j + 1,
            (_, Expect::Separator, _) => {
                // Missing comma between members.
                frame.expect = match frame.container {
                    Container::Object => Expect::Key,
                    Container::Array => Expect::Value,
                };
                j
            }

            (Container::Array, _, TokenKind::Comma | TokenKind::Colon) => j + 1,
            (Container::Array, _, _) => {
                if frame.has_members {
                    self.out.push(',');
                }
                frame.has_members = true;
                self.emit_value(j)
            }
        }
    }

    fn push_key(&mut self, key: &str) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.has_members {
                self.out.push(',');
            }
            frame.has_members = true;
            frame.expect = Expect::Colon;
        }
        self.out.push_str(key);
    }
}

/// Repairs near-valid JSON text. Never fails; the result may still be
/// something other than an object when the input held no structure at all.
pub fn repair_json(input: &str) -> String {
    Repairer::new(input).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn repaired(input: &str) -> Value {
        let out = repair_json(input);
        serde_json::from_str(&out).unwrap_or_else(|e| panic!("{out:?} did not parse: {e}"))
    }

    #[test]
    fn test_valid_json_keeps_its_values() {
        let input = r#"{
            "name": "Ada \"The Countess\" Lovelace",
            "rating": 8.5,
            "tags": ["a", "b\\c", "\u00e9"],
            "nested": {"ok": true, "none": null, "neg": -1e3}
        }"#;
        let expected: Value = serde_json::from_str(input).unwrap();
        assert_eq!(repaired(input), expected);
    }

    #[test]
    fn test_repair_is_idempotent_on_its_output() {
        let once = repair_json("{name: 'Ada', skills: ['x', 'y',],}");
        assert_eq!(repair_json(&once), once);
    }

    #[test]
    fn test_unquoted_keys() {
        assert_eq!(
            repaired(r#"{name: "Ada", resume_rating: 7}"#),
            json!({"name": "Ada", "resume_rating": 7})
        );
    }

    #[test]
    fn test_single_quoted_strings() {
        assert_eq!(
            repaired("{'name': 'Ada', 'skills': ['Rust', 'Go']}"),
            json!({"name": "Ada", "skills": ["Rust", "Go"]})
        );
    }

    #[test]
    fn test_apostrophe_inside_single_quoted_string() {
        assert_eq!(
            repaired("{'summary': 'Ada's résumé'}"),
            json!({"summary": "Ada's résumé"})
        );
    }

    #[test]
    fn test_double_quote_inside_single_quoted_string_is_escaped() {
        assert_eq!(
            repaired(r#"{'title': 'The "Fast" Team'}"#),
            json!({"title": "The \"Fast\" Team"})
        );
    }

    #[test]
    fn test_smart_quotes() {
        assert_eq!(
            repaired("{\u{201C}name\u{201D}: \u{201C}Ada\u{201D}}"),
            json!({"name": "Ada"})
        );
    }

    #[test]
    fn test_trailing_commas() {
        assert_eq!(
            repaired(r#"{"skills": ["Rust", "Go",], "name": "Ada",}"#),
            json!({"skills": ["Rust", "Go"], "name": "Ada"})
        );
    }

    #[test]
    fn test_missing_closers() {
        assert_eq!(
            repaired(r#"{"name": "Ada", "skills": ["Rust", "Go""#),
            json!({"name": "Ada", "skills": ["Rust", "Go"]})
        );
    }

    #[test]
    fn test_unterminated_string_is_closed() {
        assert_eq!(
            repaired(r#"{"summary": "Builds compilers"#),
            json!({"summary": "Builds compilers"})
        );
    }

    #[test]
    fn test_dangling_key_gets_null() {
        assert_eq!(
            repaired(r#"{"name": "Ada", "email""#),
            json!({"name": "Ada", "email": null})
        );
        assert_eq!(
            repaired(r#"{"name": "Ada", "email":"#),
            json!({"name": "Ada", "email": null})
        );
    }

    #[test]
    fn test_comments_are_dropped() {
        let input = r#"{
            // identity
            "name": "Ada", /* inline */
            "portfolio_url": "https://ada.dev" // trailing
        }"#;
        assert_eq!(
            repaired(input),
            json!({"name": "Ada", "portfolio_url": "https://ada.dev"})
        );
    }

    #[test]
    fn test_comment_markers_inside_strings_are_content() {
        assert_eq!(
            repaired(r#"{"note": "a // b /* c */"}"#),
            json!({"note": "a // b /* c */"})
        );
    }

    #[test]
    fn test_unquoted_values() {
        assert_eq!(
            repaired("{name: Ada Lovelace, portfolio_url: https://ada.dev/work, rating: 9}"),
            json!({"name": "Ada Lovelace", "portfolio_url": "https://ada.dev/work", "rating": 9})
        );
    }

    #[test]
    fn test_python_literals() {
        assert_eq!(
            repaired("{'a': True, 'b': False, 'c': None}"),
            json!({"a": true, "b": false, "c": null})
        );
    }

    #[test]
    fn test_missing_comma_between_members_on_new_lines() {
        let input = "{\n  \"name\": \"Ada\"\n  \"email\": \"ada@example.com\"\n}";
        assert_eq!(
            repaired(input),
            json!({"name": "Ada", "email": "ada@example.com"})
        );
    }

    #[test]
    fn test_missing_comma_between_objects() {
        assert_eq!(
            repaired(r#"[{"a": 1} {"a": 2}]"#),
            json!([{"a": 1}, {"a": 2}])
        );
    }

    #[test]
    fn test_raw_newline_in_string_is_escaped() {
        assert_eq!(
            repaired("{\"summary\": \"line one\nline two\"}"),
            json!({"summary": "line one\nline two"})
        );
    }

    #[test]
    fn test_invalid_escape_is_made_literal() {
        assert_eq!(
            repaired(r#"{"path": "C:\Users\ada"}"#),
            json!({"path": "C:\\Users\\ada"})
        );
    }

    #[test]
    fn test_unescaped_inner_quotes_on_one_line() {
        assert_eq!(
            repaired(r#"{"summary": "Known as "the fixer" at work"}"#),
            json!({"summary": "Known as \"the fixer\" at work"})
        );
    }

    #[test]
    fn test_mismatched_closer_closes_inner_container() {
        assert_eq!(
            repaired(r#"{"skills": ["Rust", "Go"}"#),
            json!({"skills": ["Rust", "Go"]})
        );
    }

    #[test]
    fn test_trailing_text_after_root_is_ignored() {
        assert_eq!(repaired(r#"{"a": 1} and that's all"#), json!({"a": 1}));
    }

    #[test]
    fn test_number_like_words_that_are_not_json_numbers_are_quoted() {
        assert_eq!(
            repaired("{a: 01, b: .5, c: 2020-2023}"),
            json!({"a": "01", "b": ".5", "c": "2020-2023"})
        );
    }

    #[test]
    fn test_plain_prose_becomes_a_string() {
        assert_eq!(repaired("Sorry, I cannot help"), json!("Sorry"));
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert_eq!(repair_json("   "), "");
    }

    #[test]
    fn test_is_json_number() {
        for ok in ["0", "-1", "3.25", "1e9", "-2.5E-3"] {
            assert!(is_json_number(ok), "{ok}");
        }
        for bad in ["", "-", "01", "1.", ".5", "1e", "+1", "1,000"] {
            assert!(!is_json_number(bad), "{bad}");
        }
    }
}
