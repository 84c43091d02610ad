//! Line classification and a small nesting-aware lexer.
//!
//! The lexer only knows enough TypeScript to keep bracket depth honest: it skips string,
//! template, regex literal and comment contents so that a `{` inside `"..."`, `/[{]/` or
//! `// ...` never opens a scope.

use crate::domain::model::MethodSignature;
use regex::Regex;
use std::sync::LazyLock;

static SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+)\(").expect("signature pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Brace,
    Code,
}

/// 分類一行（呼叫前不需 trim）
pub fn classify_line(line: &str) -> LineKind {
    let line = line.trim();
    if line.is_empty() {
        LineKind::Blank
    } else if line.starts_with("//") || line.starts_with("/*") || line.starts_with('*') {
        LineKind::Comment
    } else if line.chars().all(|c| "{}[]();,".contains(c) || c.is_whitespace()) {
        LineKind::Brace
    } else {
        LineKind::Code
    }
}

/// Returns the method declared on `line`, if any.
///
/// A declaration is an identifier immediately followed by `(`. Anything else yields `None`.
pub fn scan_signature(line: &str) -> Option<MethodSignature> {
    if classify_line(line) != LineKind::Code {
        return None;
    }
    SIGNATURE
        .captures(line.trim())
        .map(|caps| MethodSignature::new(&caps[1]))
}

/// `// Users` → `Users`。空白標記不算。
pub fn section_marker(line: &str) -> Option<&str> {
    let title = line.trim().strip_prefix("//")?.trim();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStart {
    /// Bracket depth before the first character of the line.
    pub depth: usize,
    /// The line begins inside a block comment or template literal.
    pub continued: bool,
}

impl LineStart {
    pub fn is_member(&self) -> bool {
        self.depth == 0 && !self.continued
    }
}

#[derive(Debug, Clone, Default)]
pub struct Lexer {
    depth: usize,
    in_block_comment: bool,
    in_template: bool,
    // 上一個記號是運算元時，`/` 是除號；否則是 regex literal 的開頭
    after_operand: bool,
    word: String,
}

/// 這些關鍵字之後的 `/` 開始一個 regex literal
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "yield", "await", "instanceof",
];

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 吃進一整行，回傳該行開頭時的狀態
    pub fn feed_line(&mut self, line: &str) -> LineStart {
        let start = LineStart {
            depth: self.depth,
            continued: self.in_block_comment || self.in_template,
        };
        self.word.clear();
        self.advance(line, |_, _, _| false);
        start
    }

    /// Walks `text`, calling `stop(offset, char, depth)` for every character outside strings,
    /// templates, regex literals and comments. Returns the offset where `stop` said yes.
    fn advance<F>(&mut self, text: &str, mut stop: F) -> Option<usize>
    where
        F: FnMut(usize, char, usize) -> bool,
    {
        let mut chars = text.char_indices().peekable();
        let mut quote: Option<char> = None;
        // Some(在字元類別 [...] 內)
        let mut regex: Option<bool> = None;

        while let Some((idx, ch)) = chars.next() {
            if self.in_block_comment {
                if ch == '*' && matches!(chars.peek(), Some((_, '/'))) {
                    chars.next();
                    self.in_block_comment = false;
                }
                continue;
            }
            if self.in_template {
                match ch {
                    '\\' => {
                        chars.next();
                    }
                    '`' => {
                        self.in_template = false;
                        self.after_operand = true;
                    }
                    _ => {}
                }
                continue;
            }
            if let Some(q) = quote {
                match ch {
                    '\\' => {
                        chars.next();
                    }
                    '\n' => quote = None,
                    c if c == q => {
                        quote = None;
                        self.after_operand = true;
                    }
                    _ => {}
                }
                continue;
            }
            if let Some(in_class) = regex {
                regex = match ch {
                    '\\' => {
                        chars.next();
                        Some(in_class)
                    }
                    '\n' => None,
                    '[' => Some(true),
                    ']' => Some(false),
                    '/' if !in_class => {
                        self.after_operand = true;
                        None
                    }
                    _ => Some(in_class),
                };
                continue;
            }

            if is_word_char(ch) {
                self.word.push(ch);
                self.after_operand = !EXPRESSION_KEYWORDS.contains(&self.word.as_str());
            } else {
                self.word.clear();
                match ch {
                    '/' => match chars.peek() {
                        Some((_, '/')) => {
                            // 行註解：跳到行尾
                            for (_, c) in chars.by_ref() {
                                if c == '\n' {
                                    break;
                                }
                            }
                            continue;
                        }
                        Some((_, '*')) => {
                            chars.next();
                            self.in_block_comment = true;
                            continue;
                        }
                        _ if !self.after_operand => {
                            regex = Some(false);
                            continue;
                        }
                        _ => self.after_operand = false,
                    },
                    '"' | '\'' => {
                        quote = Some(ch);
                        continue;
                    }
                    '`' => {
                        self.in_template = true;
                        continue;
                    }
                    '(' | '[' | '{' => {
                        self.depth += 1;
                        self.after_operand = false;
                    }
                    ')' | ']' => {
                        self.depth = self.depth.saturating_sub(1);
                        self.after_operand = true;
                    }
                    '}' => {
                        self.depth = self.depth.saturating_sub(1);
                        self.after_operand = false;
                    }
                    c if c.is_whitespace() => {}
                    _ => self.after_operand = false,
                }
            }

            if stop(idx, ch, self.depth) {
                return Some(idx);
            }
        }
        None
    }
}

/// Byte offset of the bracket closing the one at `open`.
pub fn find_closing(text: &str, open: usize) -> Option<usize> {
    let tail = text.get(open..)?;
    if !tail.starts_with(['{', '(', '[']) {
        return None;
    }
    Lexer::new()
        .advance(tail, |_, ch, depth| matches!(ch, ')' | ']' | '}') && depth == 0)
        .map(|offset| open + offset)
}

/// Whether `offset` is real code, not inside a string, template, regex literal or comment.
pub fn is_code_at(text: &str, offset: usize) -> bool {
    Lexer::new().advance(text, |idx, _, _| idx >= offset) == Some(offset)
}

/// Offset of the `{` opening a declaration body, scanning from `from`.
///
/// Braces inside `<...>` type parameters or inside parentheses of a heritage clause are
/// skipped. A `;` at the top level ends the search.
pub fn find_body_open(text: &str, from: usize) -> Option<usize> {
    let tail = text.get(from..)?;
    let mut angle = 0usize;
    let offset = Lexer::new().advance(tail, |_, ch, depth| match ch {
        '<' => {
            angle += 1;
            false
        }
        '>' => {
            angle = angle.saturating_sub(1);
            false
        }
        '{' => angle == 0 && depth == 1,
        ';' => angle == 0 && depth == 0,
        _ => false,
    })?;
    tail[offset..].starts_with('{').then_some(from + offset)
}

/// Every line of `body` paired with the lexer state at its start.
pub fn annotate_lines(body: &str) -> Vec<(LineStart, &str)> {
    let mut lexer = Lexer::new();
    body.split('\n')
        .map(|line| (lexer.feed_line(line), line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_signature_accepts_method_lines() {
        let sig = scan_signature("  getUser(id: string): Promise<User | undefined>;").unwrap();
        assert_eq!(sig.name, "getUser");
        assert_eq!(scan_signature("seed_data2()").unwrap().name, "seed_data2");
    }

    #[test]
    fn test_scan_signature_rejects_other_shapes() {
        assert!(scan_signature("").is_none());
        assert!(scan_signature("   ").is_none());
        assert!(scan_signature("// getUser(id)").is_none());
        assert!(scan_signature("* getUser(id)").is_none());
        assert!(scan_signature("});").is_none());
        assert!(scan_signature("name: string;").is_none());
        assert!(scan_signature("getUser (id: string): void;").is_none());
        assert!(scan_signature("get-user(id)").is_none());
    }

    #[test]
    fn test_section_marker() {
        assert_eq!(section_marker("  // Users  "), Some("Users"));
        assert_eq!(section_marker("//Deals"), Some("Deals"));
        assert_eq!(section_marker("//"), None);
        assert_eq!(section_marker("getUser(): void; // trailing"), None);
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line(""), LineKind::Blank);
        assert_eq!(classify_line("/** docs */"), LineKind::Comment);
        assert_eq!(classify_line("  });"), LineKind::Brace);
        assert_eq!(classify_line("readonly id: string;"), LineKind::Code);
    }

    #[test]
    fn test_find_closing_skips_strings_and_comments() {
        let text = "{ a('}'); // }\n /* } */ b(`}`); }";
        let close = find_closing(text, 0).unwrap();
        assert_eq!(close, text.len() - 1);
        assert_eq!(find_closing("{ never closed", 0), None);
        assert_eq!(find_closing("abc", 0), None);
    }

    #[test]
    fn test_annotate_lines_tracks_depth() {
        let body = "\n  createUser(\n    user: { name: string }\n  ): Promise<User>;\n  getUser(id: string): User;";
        let starts: Vec<(usize, bool)> = annotate_lines(body)
            .into_iter()
            .map(|(start, _)| (start.depth, start.continued))
            .collect();
        assert_eq!(
            starts,
            vec![(0, false), (0, false), (1, false), (1, false), (0, false)]
        );
    }

    #[test]
    fn test_annotate_lines_marks_block_comment_continuation() {
        let lines = annotate_lines("/**\n getUser(id): void\n */\nlistUsers(): void;");
        assert!(lines[0].0.is_member());
        assert!(!lines[1].0.is_member());
        assert!(!lines[2].0.is_member());
        assert!(lines[3].0.is_member());
    }

    #[test]
    fn test_find_closing_skips_regex_literals() {
        let quote = "{ return s.replace(/'/g, \"\"); }";
        assert_eq!(find_closing(quote, 0), Some(quote.len() - 1));

        let class = "{ if (/[{]/g.test(s)) { a(); } }";
        assert_eq!(find_closing(class, 0), Some(class.len() - 1));

        let escaped = "{ x = /\\/}/; }";
        assert_eq!(find_closing(escaped, 0), Some(escaped.len() - 1));
    }

    #[test]
    fn test_division_is_not_a_regex() {
        let text = "{ a = b / c; d = (e) / f[0] / 2; }";
        assert_eq!(find_closing(text, 0), Some(text.len() - 1));
    }

    #[test]
    fn test_is_code_at() {
        let text = "// class A\nconst s = 'class A';\nclass A {}";
        let comment = text.find("class A").unwrap();
        let string = text.find("'class A'").unwrap() + 1;
        let code = text.rfind("class A").unwrap();
        assert!(!is_code_at(text, comment));
        assert!(!is_code_at(text, string));
        assert!(is_code_at(text, code));
    }

    #[test]
    fn test_find_body_open_skips_type_parameters() {
        let header = "class Repo<T extends { id: string }> extends Base<{ x: 1 }> implements I {\n}";
        assert_eq!(find_body_open(header, 0), Some(header.len() - 3));
        assert_eq!(find_body_open("class Repo implements I;", 0), None);
    }
}
