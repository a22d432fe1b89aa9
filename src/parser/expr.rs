use super::lexer::{tokenize, Token};
use crate::error::EvaluationError;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Var(String),
    Array(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Field(Box<Expr>, String),
    Call(String, Vec<Expr>),
    Assign(String, Box<Expr>),
}

/// Deepest expression tree the parser will build. Both parsing and
/// evaluation recurse on the tree, so operator input must not be able to
/// exhaust the stack.
const MAX_NESTING: usize = 128;

/// Parse one expression; trailing tokens are an error.
pub fn parse_expression(input: &str) -> Result<Expr, EvaluationError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(syntax("empty expression"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.assignment()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(syntax(format!("unexpected {:?}", tok))),
    }
}

fn syntax(msg: impl Into<String>) -> EvaluationError {
    EvaluationError::new(format!("syntax error: {}", msg.into()))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), EvaluationError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(syntax("expression nested too deeply"));
        }
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), EvaluationError> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(syntax(format!("expected {:?}", expected)))
        }
    }

    fn assignment(&mut self) -> Result<Expr, EvaluationError> {
        self.descend()?;
        let expr = self.assign_or_compare()?;
        self.depth -= 1;
        Ok(expr)
    }

    // assignment := IDENT '=' assignment | comparison
    fn assign_or_compare(&mut self) -> Result<Expr, EvaluationError> {
        if let (Some(Token::Ident(name)), Some(Token::Assign)) =
            (self.tokens.get(self.pos), self.tokens.get(self.pos + 1))
        {
            let name = name.clone();
            self.pos += 2;
            let value = self.assignment()?;
            return Ok(Expr::Assign(name, Box::new(value)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, EvaluationError> {
        let left = self.sum()?;
        let op = match self.peek() {
            Some(Token::Eq) => BinaryOp::Eq,
            Some(Token::NotEq) => BinaryOp::NotEq,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::LtEq) => BinaryOp::LtEq,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::GtEq) => BinaryOp::GtEq,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.sum()?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    // Each operator in a chain adds one level to the left-leaning tree.
    fn sum(&mut self) -> Result<Expr, EvaluationError> {
        let base = self.depth;
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => {
                    self.depth = base;
                    return Ok(left);
                }
            };
            self.pos += 1;
            self.descend()?;
            let right = self.term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn term(&mut self) -> Result<Expr, EvaluationError> {
        let base = self.depth;
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => {
                    self.depth = base;
                    return Ok(left);
                }
            };
            self.pos += 1;
            self.descend()?;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr, EvaluationError> {
        let op = if self.eat(&Token::Minus) {
            UnaryOp::Neg
        } else if self.eat(&Token::Bang) {
            UnaryOp::Not
        } else {
            return self.postfix();
        };
        self.descend()?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn postfix(&mut self) -> Result<Expr, EvaluationError> {
        let base = self.depth;
        let mut expr = self.primary()?;
        loop {
            if matches!(self.peek(), Some(Token::LBracket) | Some(Token::Dot)) {
                self.descend()?;
            }
            if self.eat(&Token::LBracket) {
                let index = self.assignment()?;
                self.expect(Token::RBracket)?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.eat(&Token::Dot) {
                match self.advance() {
                    Some(Token::Ident(name)) => expr = Expr::Field(Box::new(expr), name),
                    Some(Token::Int(n)) if n >= 0 => {
                        expr = Expr::Index(Box::new(expr), Box::new(Expr::Literal(Literal::Int(n))))
                    }
                    _ => return Err(syntax("expected field name after '.'")),
                }
            } else {
                self.depth = base;
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, EvaluationError> {
        match self.advance() {
            Some(Token::Int(n)) => Ok(Expr::Literal(Literal::Int(n))),
            Some(Token::Float(f)) => Ok(Expr::Literal(Literal::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Literal::Str(s))),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Expr::Literal(Literal::Bool(true))),
                "false" => Ok(Expr::Literal(Literal::Bool(false))),
                "null" | "nil" => Ok(Expr::Literal(Literal::Null)),
                _ if self.eat(&Token::LParen) => {
                    let args = self.list(Token::RParen)?;
                    Ok(Expr::Call(name, args))
                }
                _ => Ok(Expr::Var(name)),
            },
            Some(Token::LParen) => {
                let inner = self.assignment()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::LBracket) => Ok(Expr::Array(self.list(Token::RBracket)?)),
            Some(tok) => Err(syntax(format!("unexpected {:?}", tok))),
            None => Err(syntax("unexpected end of input")),
        }
    }

    /// Comma-separated expressions up to and including `close`.
    fn list(&mut self, close: Token) -> Result<Vec<Expr>, EvaluationError> {
        let mut items = Vec::new();
        if self.eat(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.assignment()?);
            if self.eat(&close) {
                return Ok(items);
            }
            self.expect(Token::Comma)?;
        }
    }
}
