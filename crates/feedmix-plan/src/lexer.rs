use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted cell text, trimmed
    Cell,
    /// Quoted cell; `text` holds the unescaped contents
    Quoted,
    /// `,`, `;` or tab
    Separator,
    Newline,
    /// `#` to end of line
    Comment,
    Eof,
    /// Unterminated quoted cell
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// Tokenizer for delimited parameter sheets exported from a spreadsheet
pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | ';' | '\t')
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        Token::new(
            TokenKind::Comment,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn read_quoted(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    // "" is an escaped quote
                    if self.peek() == Some('"') {
                        self.advance();
                        text.push('"');
                    } else {
                        return Token::new(TokenKind::Quoted, Span::new(start, self.pos), text);
                    }
                }
                Some('\n') | None => {
                    return Token::new(
                        TokenKind::Error,
                        Span::new(start, self.pos),
                        &self.source[start..self.pos],
                    );
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
            }
        }
    }

    fn read_cell(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' || c == '#' || is_separator(c) {
                break;
            }
            self.advance();
        }
        let text = self.source[start..self.pos].trim_end();
        Token::new(TokenKind::Cell, Span::new(start, start + text.len()), text)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '\n' => {
                self.advance();
                Token::new(TokenKind::Newline, Span::new(start, self.pos), "\n")
            }
            '#' => self.skip_comment(),
            '"' => self.read_quoted(),
            c if is_separator(c) => {
                self.advance();
                Token::new(
                    TokenKind::Separator,
                    Span::new(start, self.pos),
                    &self.source[start..self.pos],
                )
            }
            _ => self.read_cell(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_row() {
        let tokens = Lexer::tokenize("resource_budget, 400\n");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["resource_budget", ",", "400", "\n", ""]);
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Cell,
                TokenKind::Separator,
                TokenKind::Cell,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_separators() {
        assert_eq!(
            kinds("a;b\tc,d"),
            vec![
                TokenKind::Cell,
                TokenKind::Separator,
                TokenKind::Cell,
                TokenKind::Separator,
                TokenKind::Cell,
                TokenKind::Separator,
                TokenKind::Cell,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_cell_keeps_inner_spaces() {
        let tokens = Lexer::tokenize("Pellets per duck (kg) ,2");
        assert_eq!(tokens[0].text, "Pellets per duck (kg)");
        assert_eq!(tokens[0].span, Span::new(0, 21));
    }

    #[test]
    fn test_quoted_cell() {
        let tokens = Lexer::tokenize(r#"item,"rubber ""duck"", yellow""#);
        assert_eq!(tokens[2].kind, TokenKind::Quoted);
        assert_eq!(tokens[2].text, r#"rubber "duck", yellow"#);
    }

    #[test]
    fn test_unterminated_quote() {
        let tokens = Lexer::tokenize("item,\"duck\nfish");
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert_eq!(tokens[3].kind, TokenKind::Newline);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("a # note, with comma\nb"),
            vec![
                TokenKind::Cell,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Cell,
                TokenKind::Eof,
            ]
        );
    }
}
