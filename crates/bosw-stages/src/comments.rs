//! Comment scanner for JavaScript, TypeScript and JSX sources.
//!
//! Finds `//` line comments and `/* */` block comments (JSX `{/* */}` is a
//! block comment inside an expression container) while stepping over string,
//! template and regex literals. A `/` opens a regex literal only where an
//! expression may begin (operators, opening punctuation, `return` and similar
//! keywords). After `}`, `<` or `>` it never does: `<img src={x} />`, `</p>`.

use bosw_core::{Comment, CommentMap, CommentScanner, ScanError};

/// Keywords after which an expression, and so a regex literal, may follow.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct JsCommentScanner;

impl CommentScanner for JsCommentScanner {
    fn scan(&self, source: &str) -> Result<CommentMap, ScanError> {
        Cursor::new(source).scan()
    }
}

/// Open template literals and the `${` expressions nested inside them.
enum Frame {
    Template { line: usize },
    Interpolation { depth: usize },
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    frames: Vec<Frame>,
    comments: CommentMap,
    regex_allowed: bool,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            frames: Vec::new(),
            comments: CommentMap::new(),
            regex_allowed: true,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.src[self.pos..].starts_with(pat)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn scan(mut self) -> Result<CommentMap, ScanError> {
        while let Some(c) = self.peek() {
            if let Some(Frame::Template { .. }) = self.frames.last() {
                self.template_char();
                continue;
            }
            match c {
                '/' if self.starts_with("//") => self.line_comment(),
                '/' if self.starts_with("/*") => self.block_comment()?,
                '/' if self.regex_allowed => self.regex_literal(),
                '"' | '\'' => self.quoted(c),
                '`' => {
                    self.frames.push(Frame::Template { line: self.line });
                    self.bump();
                }
                '{' => {
                    if let Some(Frame::Interpolation { depth }) = self.frames.last_mut() {
                        *depth += 1;
                    }
                    self.bump();
                    self.regex_allowed = true;
                }
                '}' => {
                    if matches!(self.frames.last(), Some(Frame::Interpolation { depth: 0 })) {
                        self.frames.pop();
                    } else if let Some(Frame::Interpolation { depth }) = self.frames.last_mut() {
                        *depth -= 1;
                    }
                    self.bump();
                    self.regex_allowed = false;
                }
                c if is_word_char(c) => self.word(),
                c if c.is_whitespace() => {
                    self.bump();
                }
                _ => {
                    self.bump();
                    self.regex_allowed = "=(,:[!&|?;+-*%^~".contains(c);
                }
            }
        }

        if let Some(Frame::Template { line }) = self
            .frames
            .iter()
            .rev()
            .find(|frame| matches!(frame, Frame::Template { .. }))
        {
            return Err(ScanError::UnterminatedLiteral {
                kind: "template",
                line: *line,
            });
        }
        Ok(self.comments)
    }

    fn template_char(&mut self) {
        if self.starts_with("${") {
            self.pos += 2;
            self.frames.push(Frame::Interpolation { depth: 0 });
            self.regex_allowed = true;
            return;
        }
        match self.bump() {
            Some('\\') => {
                self.bump();
            }
            Some('`') => {
                self.frames.pop();
                self.regex_allowed = false;
            }
            _ => {}
        }
    }

    /// Identifiers, keywords and number literals.
    fn word(&mut self) {
        let start = self.pos;
        while self.peek().is_some_and(is_word_char) {
            self.bump();
        }
        self.regex_allowed = EXPRESSION_KEYWORDS.contains(&&self.src[start..self.pos]);
    }

    /// Steps over `/body/flags`, honouring escapes and `[...]` classes. A
    /// body that runs into a newline or the end of input is division after
    /// all, and scanning resumes right after the `/`.
    fn regex_literal(&mut self) {
        let start = self.pos;
        self.bump();
        let mut in_class = false;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.pos = start + 1;
                    self.regex_allowed = true;
                    return;
                }
                Some('\\') => {
                    self.bump();
                    if self.peek() != Some('\n') {
                        self.bump();
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.bump();
                }
                Some(']') => {
                    in_class = false;
                    self.bump();
                }
                Some('/') if !in_class => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        while self.peek().is_some_and(is_word_char) {
            self.bump();
        }
        self.regex_allowed = false;
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let rest = &self.src[self.pos..];
        let len = rest.find('\n').unwrap_or(rest.len());
        let content = rest[..len].trim().to_string();
        self.pos += len;
        self.comments.insert(
            start,
            Comment {
                content,
                begin: self.line,
                end: self.line,
            },
        );
    }

    fn block_comment(&mut self) -> Result<(), ScanError> {
        let start = self.pos;
        let begin = self.line;
        self.pos += 2;
        let rest = &self.src[self.pos..];
        let len = rest
            .find("*/")
            .ok_or(ScanError::UnterminatedBlockComment { line: begin })?;
        let inner = &rest[..len];
        self.line += inner.matches('\n').count();
        self.pos += len + 2;
        self.comments.insert(
            start,
            Comment {
                content: block_content(inner),
                begin,
                end: self.line,
            },
        );
        Ok(())
    }

    /// Quote strings stop at an unescaped newline too, so a stray apostrophe
    /// in JSX text only hides the rest of its own line.
    fn quoted(&mut self, quote: char) {
        self.bump();
        while let Some(c) = self.peek() {
            match c {
                '\n' => return,
                '\\' => {
                    self.bump();
                    self.bump();
                }
                _ => {
                    self.bump();
                    if c == quote {
                        break;
                    }
                }
            }
        }
        self.regex_allowed = false;
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Strip JSDoc-style leading `*` from every line of a block comment.
fn block_content(inner: &str) -> String {
    inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Vec<Comment> {
        JsCommentScanner.scan(src).unwrap().into_values().collect()
    }

    #[test]
    fn test_line_and_block_comments() {
        let comments = scan("// @skip\nconst a = 1; /* note */\n/**\n * @name(x)\n */\nreturn a;");
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0], Comment { content: "@skip".into(), begin: 1, end: 1 });
        assert_eq!(comments[1], Comment { content: "note".into(), begin: 2, end: 2 });
        assert_eq!(comments[2], Comment { content: "@name(x)".into(), begin: 3, end: 5 });
    }

    #[test]
    fn test_jsx_comment() {
        let comments = scan("return (\n  <div>\n    {/* @todo */}\n  </div>\n);");
        assert_eq!(comments, vec![Comment { content: "@todo".into(), begin: 3, end: 3 }]);
    }

    #[test]
    fn test_comment_markers_in_strings_are_ignored() {
        let comments = scan("const url = \"https://ipfs.io\";\nconst s = '/* not */';\nconst t = `// ${a /* real */} //`;");
        assert_eq!(comments, vec![Comment { content: "real".into(), begin: 3, end: 3 }]);
    }

    #[test]
    fn test_nested_template_interpolation() {
        let src = "const x = `a ${`b ${ {k: 1}.k }`} c`; // after";
        let comments = scan(src);
        assert_eq!(comments, vec![Comment { content: "after".into(), begin: 1, end: 1 }]);
    }

    #[test]
    fn test_apostrophe_in_jsx_text() {
        let comments = scan("<p>Don't panic</p>\n// @skip\n");
        assert_eq!(comments, vec![Comment { content: "@skip".into(), begin: 2, end: 2 }]);
    }

    #[test]
    fn test_regex_literals_hide_comment_markers() {
        let comments = scan("const re = /\\/*/;\nreturn re; // done");
        assert_eq!(comments, vec![Comment { content: "done".into(), begin: 2, end: 2 }]);

        let comments = scan("const tick = /`/g;\n// @skip\nreturn /[/]\\//.test(tick);");
        assert_eq!(comments, vec![Comment { content: "@skip".into(), begin: 2, end: 2 }]);
    }

    #[test]
    fn test_division_is_not_a_regex() {
        let src = "const half = (a + b) / 2; // half\nconst r = total / count / 2; /* ratio */";
        let comments = scan(src);
        assert_eq!(
            comments,
            vec![
                Comment { content: "half".into(), begin: 1, end: 1 },
                Comment { content: "ratio".into(), begin: 2, end: 2 },
            ]
        );
    }

    #[test]
    fn test_jsx_self_closing_and_closing_tags() {
        let src = "return (\n  <p>\n    <img src={logo} /> {/* @todo */}\n  </p>\n);";
        assert_eq!(scan(src), vec![Comment { content: "@todo".into(), begin: 3, end: 3 }]);
    }

    #[test]
    fn test_unterminated_block_comment_is_fatal() {
        let err = JsCommentScanner.scan("a;\n/* never closed\n").unwrap_err();
        assert_eq!(err, ScanError::UnterminatedBlockComment { line: 2 });
    }

    #[test]
    fn test_unterminated_template_is_fatal() {
        let err = JsCommentScanner.scan("a;\nb;\nconst t = `open").unwrap_err();
        assert_eq!(err, ScanError::UnterminatedLiteral { kind: "template", line: 3 });
    }
}
