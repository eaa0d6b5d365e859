//! Line-oriented parser for generator source.

use super::super::LoadError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Text(String),
    LParen,
    RParen,
    Comma,
    Colon,
    Equals,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Expr {
    Ident(String),
    Text(String),
    Call { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum StatementKind {
    Assign { target: String, expr: Expr },
    Expr(Expr),
    Return(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Statement {
    pub line: usize,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct EntryPoint {
    pub line: usize,
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Module {
    pub entry: EntryPoint,
    pub body: Vec<Statement>,
}

/// Parse source text into an entry point and its body.
pub(super) fn parse_module(source: &str) -> Result<Module, LoadError> {
    let mut entry: Option<EntryPoint> = None;
    let mut body = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let tokens = tokenize(raw, line)?;
        if tokens.is_empty() {
            continue;
        }
        let indented = raw.starts_with([' ', '\t']);
        let is_def = matches!(&tokens[0], Token::Ident(word) if word == "def");
        if is_def {
            if entry.is_some() {
                return Err(LoadError::DuplicateEntryPoint { line });
            }
            if indented {
                return Err(syntax(line, "entry point must not be indented"));
            }
            entry = Some(parse_header(&tokens, line)?);
            continue;
        }
        if entry.is_none() {
            return Err(syntax(line, "statement before entry point"));
        }
        if !indented {
            return Err(syntax(line, "statement outside entry point body"));
        }
        body.push(parse_statement(&tokens, line)?);
    }

    let entry = entry.ok_or(LoadError::MissingEntryPoint)?;
    Ok(Module { entry, body })
}

fn syntax(line: usize, message: impl Into<String>) -> LoadError {
    LoadError::Syntax {
        line,
        message: message.into(),
    }
}

fn tokenize(raw: &str, line: usize) -> Result<Vec<Token>, LoadError> {
    let mut tokens = Vec::new();
    let mut chars = raw.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        match ch {
            '#' => break,
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            ',' => tokens.push(Token::Comma),
            ':' => tokens.push(Token::Colon),
            '=' => tokens.push(Token::Equals),
            '"' | '\'' => {
                let mut text = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == ch {
                        closed = true;
                        break;
                    }
                    text.push(next);
                }
                if !closed {
                    return Err(syntax(line, "unterminated string literal"));
                }
                tokens.push(Token::Text(text));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(syntax(line, format!("unexpected character `{other}`"))),
        }
    }
    Ok(tokens)
}

fn parse_header(tokens: &[Token], line: usize) -> Result<EntryPoint, LoadError> {
    let mut cursor = Cursor { tokens, pos: 1, line };
    let name = cursor.ident("expected entry point name after `def`")?;
    cursor.expect(&Token::LParen, "expected `(` after entry point name")?;
    let mut params = Vec::new();
    if !cursor.eat(&Token::RParen) {
        loop {
            params.push(cursor.ident("expected parameter name")?);
            if cursor.eat(&Token::RParen) {
                break;
            }
            cursor.expect(&Token::Comma, "expected `,` or `)` in parameter list")?;
        }
    }
    cursor.expect(&Token::Colon, "expected `:` after parameter list")?;
    cursor.finish()?;
    Ok(EntryPoint { line, name, params })
}

fn parse_statement(tokens: &[Token], line: usize) -> Result<Statement, LoadError> {
    let mut cursor = Cursor { tokens, pos: 0, line };
    let kind = match tokens {
        [Token::Ident(word), ..] if word == "return" => {
            cursor.pos = 1;
            StatementKind::Return(cursor.expr()?)
        }
        [Token::Ident(target), Token::Equals, ..] => {
            cursor.pos = 2;
            StatementKind::Assign {
                target: target.clone(),
                expr: cursor.expr()?,
            }
        }
        _ => StatementKind::Expr(cursor.expr()?),
    };
    cursor.finish()?;
    Ok(Statement { line, kind })
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
    line: usize,
}

impl<'t> Cursor<'t> {
    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, message: &str) -> Result<(), LoadError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(syntax(self.line, message))
        }
    }

    fn ident(&mut self, message: &str) -> Result<String, LoadError> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name.clone()),
            _ => Err(syntax(self.line, message)),
        }
    }

    fn finish(&self) -> Result<(), LoadError> {
        if self.pos < self.tokens.len() {
            return Err(syntax(self.line, "unexpected trailing tokens"));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, LoadError> {
        match self.next().cloned() {
            Some(Token::Text(text)) => Ok(Expr::Text(text)),
            Some(Token::Ident(name)) => {
                if !self.eat(&Token::LParen) {
                    return Ok(Expr::Ident(name));
                }
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.expr()?);
                        if self.eat(&Token::RParen) {
                            break;
                        }
                        self.expect(&Token::Comma, "expected `,` or `)` in argument list")?;
                    }
                }
                Ok(Expr::Call { name, args })
            }
            _ => Err(syntax(self.line, "expected an expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
# leading comment
def metric_generator(y_true, y_preds):
    # body comment
    classes = unique(y_true)

    return recall(y_true, y_preds, strategy(classes))  # trailing
";

    #[test]
    fn parses_header_and_body() {
        let module = parse_module(SOURCE).unwrap();
        assert_eq!(module.entry.name, "metric_generator");
        assert_eq!(module.entry.params, vec!["y_true", "y_preds"]);
        assert_eq!(module.entry.line, 2);
        assert_eq!(module.body.len(), 2);
        assert_eq!(module.body[0].line, 4);
        assert!(matches!(
            &module.body[0].kind,
            StatementKind::Assign { target, .. } if target == "classes"
        ));
    }

    #[test]
    fn nested_calls_keep_argument_order() {
        let module = parse_module(SOURCE).unwrap();
        let StatementKind::Return(Expr::Call { name, args }) = &module.body[1].kind else {
            panic!("expected return call");
        };
        assert_eq!(name, "recall");
        assert_eq!(args.len(), 3);
        assert_eq!(
            args[2],
            Expr::Call {
                name: "strategy".into(),
                args: vec![Expr::Ident("classes".into())]
            }
        );
    }

    #[test]
    fn string_literals_use_either_quote() {
        let module =
            parse_module("def f(a, b):\n    return recall(a, b, 'macro')\n").unwrap();
        let StatementKind::Return(Expr::Call { args, .. }) = &module.body[0].kind else {
            panic!("expected return call");
        };
        assert_eq!(args[2], Expr::Text("macro".into()));
    }

    #[test]
    fn missing_header_is_reported() {
        assert_eq!(parse_module("# nothing\n\n"), Err(LoadError::MissingEntryPoint));
    }

    #[test]
    fn second_header_is_rejected() {
        let err = parse_module("def f(a, b):\n    return accuracy(a, b)\ndef g(a, b):\n")
            .unwrap_err();
        assert_eq!(err, LoadError::DuplicateEntryPoint { line: 3 });
    }

    #[test]
    fn unindented_body_is_rejected() {
        let err = parse_module("def f(a, b):\nreturn accuracy(a, b)\n").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { line: 2, .. }));
    }

    #[test]
    fn unbalanced_call_is_rejected() {
        let err = parse_module("def f(a, b):\n    return accuracy(a, b\n").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { line: 2, .. }));
    }

    #[test]
    fn unterminated_string_is_rejected() {
        let err = parse_module("def f(a, b):\n    return recall(a, b, \"micro)\n").unwrap_err();
        assert_eq!(
            err,
            LoadError::Syntax {
                line: 2,
                message: "unterminated string literal".into()
            }
        );
    }

    #[test]
    fn stray_characters_are_rejected() {
        let err = parse_module("def f(a, b):\n    return a[0]\n").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { line: 2, .. }));
    }
}
