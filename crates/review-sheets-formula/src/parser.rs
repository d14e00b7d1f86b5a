//! Formula parser
//!
//! A recursive descent parser for table formulas with proper operator
//! precedence. Formula text is tokenized once and turned into a
//! [`FormulaExpr`]; nothing is ever executed. A character outside the token
//! set is a parse error.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use review_sheets_core::{CellAddress, CellRange};

/// Deepest nesting of parentheses, function calls and prefix signs accepted
pub const MAX_NESTING_DEPTH: usize = 64;

/// Longest formula text accepted, in bytes
pub const MAX_FORMULA_LENGTH: usize = 4096;

/// Most cells a single range may cover
pub const MAX_RANGE_CELLS: u64 = 65_536;

/// Parse a formula string into an AST
///
/// The leading `=` is optional.
///
/// # Example
/// ```rust
/// use review_sheets_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=IF(A1>0,\"Yes\",\"No\")").unwrap();
/// assert!(parse_formula("=A1;1").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    if formula.len() > MAX_FORMULA_LENGTH {
        return Err(FormulaError::Parse(format!(
            "Formula is longer than {} characters",
            MAX_FORMULA_LENGTH
        )));
    }

    let formula = formula.trim();
    let formula = formula.strip_prefix('=').unwrap_or(formula);

    let mut parser = FormulaParser::new(formula);
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    match parser.current_token() {
        Token::Eof => Ok(expr),
        Token::Invalid(c) => Err(FormulaError::Parse(format!("Unexpected character '{}'", c))),
        token => Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            token
        ))),
    }
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    String(String),

    // Identifiers and references
    Identifier(String), // Function name
    CellRef(String),    // Cell reference like A1

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Colon,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    /// Character outside the formula alphabet
    Invalid(char),

    // End of input
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Option<Token>,
    depth: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: None,
            depth: 0,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        self.current_token = Some(self.scan_token());
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Token::Eof;
        };

        // Single-character tokens
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '%' => Some(Token::Percent),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return token;
        }

        // One- and two-character operators
        match c {
            '<' => {
                self.advance();
                return if self.eat('=') {
                    Token::LessEqual
                } else if self.eat('>') {
                    Token::NotEqual
                } else {
                    Token::LessThan
                };
            }
            '>' => {
                self.advance();
                return if self.eat('=') {
                    Token::GreaterEqual
                } else {
                    Token::GreaterThan
                };
            }
            '=' => {
                // `==` is accepted as an alias
                self.advance();
                self.eat('=');
                return Token::Equal;
            }
            '!' => {
                self.advance();
                return if self.eat('=') {
                    Token::NotEqual
                } else {
                    Token::Invalid('!')
                };
            }
            _ => {}
        }

        // String literal
        if c == '"' {
            return self.scan_string();
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Identifier or cell reference
        if c.is_ascii_alphabetic() || c == '_' {
            return self.scan_identifier_or_ref();
        }

        // Unknown character
        self.advance();
        Token::Invalid(c)
    }

    fn scan_string(&mut self) -> Token {
        self.advance(); // Skip opening quote

        let mut s = String::new();
        while let Some(c) = self.peek_char() {
            if c == '"' {
                // Check for escaped quote ("")
                if self.peek_char_at(1) == Some('"') {
                    s.push('"');
                    self.advance();
                    self.advance();
                } else {
                    break;
                }
            } else {
                s.push(c);
                self.advance();
            }
        }

        // Unterminated literal
        if !self.eat('"') {
            return Token::Invalid('"');
        }

        Token::String(s)
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.eat('.') {
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        match self.input[start..self.pos].parse() {
            Ok(num) => Token::Number(num),
            Err(_) => Token::Invalid('.'),
        }
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        // Letters followed by digits is a cell reference, unless it is
        // immediately called like a function
        if Self::is_cell_reference(text) && self.peek_char() != Some('(') {
            return Token::CellRef(text.to_string());
        }

        Token::Identifier(text.to_string())
    }

    fn is_cell_reference(text: &str) -> bool {
        let digits = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        digits.len() < text.len()
            && !digits.is_empty()
            && digits.chars().all(|c| c.is_ascii_digit())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    /// Consume `expected` if it is the next character
    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token();
        token
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume();
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> FormulaResult<T>,
    ) -> FormulaResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(FormulaError::Parse(format!(
                "Formula nests deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Comparison: =, <>, <, <=, >, >=
    // 2. Addition/Subtraction: +, -
    // 3. Multiplication/Division: *, /
    // 4. Unary: prefix -, +
    // 5. Postfix %
    // 6. Range: :
    // 7. Primary: literals, references, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        self.nested(Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current_token() {
                Token::Equal => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.consume();
            let right = self.parse_additive()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            let right = self.parse_unary()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        // Prefix unary minus
        if matches!(self.current_token(), Token::Minus) {
            self.consume();
            let operand = self.nested(Self::parse_unary)?;
            return Ok(FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        // Prefix plus (no-op)
        if matches!(self.current_token(), Token::Plus) {
            self.consume();
            return self.nested(Self::parse_unary);
        }

        self.parse_percent()
    }

    fn parse_percent(&mut self) -> FormulaResult<FormulaExpr> {
        let mut expr = self.parse_range()?;
        let mut levels = 0;

        while matches!(self.current_token(), Token::Percent) {
            levels += 1;
            if self.depth + levels > MAX_NESTING_DEPTH {
                return Err(FormulaError::Parse(format!(
                    "Formula nests deeper than {} levels",
                    MAX_NESTING_DEPTH
                )));
            }
            self.consume();
            expr = FormulaExpr::UnaryOp {
                op: UnaryOperator::Percent,
                operand: Box::new(expr),
            };
        }

        Ok(expr)
    }

    fn parse_range(&mut self) -> FormulaResult<FormulaExpr> {
        let left = self.parse_primary()?;

        if !matches!(self.current_token(), Token::Colon) {
            return Ok(left);
        }
        self.consume();
        let right = self.parse_primary()?;

        match (left, right) {
            (FormulaExpr::CellRef(start), FormulaExpr::CellRef(end)) => {
                let range = CellRange::new(start, end);
                if range.cell_count() > MAX_RANGE_CELLS {
                    return Err(FormulaError::Parse(format!(
                        "Range {} covers more than {} cells",
                        range, MAX_RANGE_CELLS
                    )));
                }
                Ok(FormulaExpr::RangeRef(range))
            }
            _ => Err(FormulaError::Parse(
                "Range endpoints must be cell references".into(),
            )),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume();
                Ok(FormulaExpr::Number(n))
            }

            Token::String(s) => {
                self.consume();
                Ok(FormulaExpr::String(s))
            }

            Token::LeftParen => {
                self.consume();
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::CellRef(ref_str) => {
                self.consume();
                let address = CellAddress::parse(&ref_str).map_err(|e| {
                    FormulaError::InvalidReference(format!("'{}': {}", ref_str, e))
                })?;
                Ok(FormulaExpr::CellRef(address))
            }

            Token::Identifier(name) => {
                self.consume();
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Err(FormulaError::Parse(format!("Unknown name '{}'", name)))
                }
            }

            Token::Invalid(c) => Err(FormulaError::Parse(format!("Unexpected character '{}'", c))),

            token => Err(FormulaError::Parse(format!("Unexpected token: {:?}", token))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();

        // Parse arguments
        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_expression()?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume();
                args.push(self.parse_expression()?);
            }
        }

        self.expect(&Token::RightParen)?;

        Ok(FormulaExpr::Function {
            name: name.to_uppercase(),
            args,
        })
    }
}
