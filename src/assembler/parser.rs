//! Assembly source parser
//!
//! Turns one line of tokens into an [`AssemblyLine`]: an optional label, then
//! an origin directive, a `DCB` data list, an instruction, or nothing. Operand
//! syntax is classified here; choosing an opcode for it is the encoder's job.

use crate::assembler::lexer::{tokenize, TokenStream, TokenType};

/// A parsed line of assembly source
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyLine {
    /// Line number in source file (1-indexed)
    pub line_number: usize,

    /// Original line text, for error messages
    pub text: String,

    /// Optional label definition (e.g., "start" from "start:")
    pub label: Option<String>,

    pub statement: Statement,

    /// Optional comment text (after semicolon)
    pub comment: Option<String>,
}

/// What a line asks the assembler to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Blank, comment-only or label-only line
    Empty,

    /// `* = $addr` moves the assembly cursor
    Origin(u64),

    /// `DCB v1,v2,...` emits literal cells
    Dcb(Vec<u64>),

    /// Mnemonic (upper-cased) and its operand
    Instruction { mnemonic: String, operand: Operand },
}

/// A numeric literal or a label reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Number(u64),
    Label(String),
}

/// Operand syntax, before an addressing mode is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// No operand
    None,
    /// `#value`
    Immediate(u64),
    /// `#<label`
    ImmediateLow(String),
    /// `#>label`
    ImmediateHigh(String),
    /// `value` (zero page, absolute, relative, or `A`)
    Direct(Value),
    /// `value,X`
    IndexedX(Value),
    /// `value,Y`
    IndexedY(Value),
    /// `(value)`
    Indirect(Value),
    /// `(value,X)`
    IndirectX(Value),
    /// `(value),Y`
    IndirectY(Value),
}

/// Parse one source line.
///
/// Errors are human-readable reasons; the caller attaches the line number.
///
/// ```
/// use sim6502::assembler::parser::{parse_line, Operand, Statement, Value};
///
/// let line = parse_line(3, "loop: STA $0200,X ; paint").unwrap();
/// assert_eq!(line.label.as_deref(), Some("loop"));
/// assert_eq!(
///     line.statement,
///     Statement::Instruction {
///         mnemonic: "STA".to_string(),
///         operand: Operand::IndexedX(Value::Number(0x200)),
///     }
/// );
/// ```
pub fn parse_line(line_number: usize, text: &str) -> Result<AssemblyLine, String> {
    let tokens = tokenize(text).map_err(|errors| {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    })?;
    let mut stream = TokenStream::new(tokens);

    stream.skip_whitespace();
    let label = parse_label(&mut stream);
    stream.skip_whitespace();

    let statement = match stream.peek().map(|t| t.token_type.clone()) {
        None | Some(TokenType::Eof) | Some(TokenType::Comment(_)) => Statement::Empty,
        Some(TokenType::Star) => {
            stream.advance();
            parse_origin(&mut stream)?
        }
        Some(TokenType::Identifier(name)) => {
            stream.advance();
            if name.eq_ignore_ascii_case("DCB") {
                Statement::Dcb(parse_dcb(&mut stream)?)
            } else {
                Statement::Instruction {
                    mnemonic: name.to_ascii_uppercase(),
                    operand: parse_operand(&mut stream)?,
                }
            }
        }
        Some(other) => {
            return Err(format!(
                "unexpected {} at column {}",
                describe(&other),
                stream.current_column()
            ))
        }
    };

    stream.skip_whitespace();
    let comment = match stream.consume().map(|t| t.token_type) {
        Some(TokenType::Comment(text)) => Some(text),
        None | Some(TokenType::Eof) => None,
        Some(other) => return Err(format!("unexpected trailing {}", describe(&other))),
    };

    Ok(AssemblyLine {
        line_number,
        text: text.to_string(),
        label,
        statement,
        comment,
    })
}

/// `name:` with no space before the colon.
fn parse_label(stream: &mut TokenStream) -> Option<String> {
    let name = match (stream.peek(), stream.peek_n(1)) {
        (Some(first), Some(second)) if second.token_type == TokenType::Colon => {
            match &first.token_type {
                TokenType::Identifier(name) => name.clone(),
                _ => return None,
            }
        }
        _ => return None,
    };
    stream.advance();
    stream.advance();
    Some(name)
}

fn parse_origin(stream: &mut TokenStream) -> Result<Statement, String> {
    stream.skip_whitespace();
    match stream.consume().map(|t| t.token_type) {
        Some(TokenType::Equal) => {}
        _ => return Err("expected '=' after '*'".to_string()),
    }
    stream.skip_whitespace();
    let address = expect_number(stream, "origin address")?;
    Ok(Statement::Origin(address))
}

/// Comma-separated numbers; empty items are skipped.
fn parse_dcb(stream: &mut TokenStream) -> Result<Vec<u64>, String> {
    let mut values = Vec::new();
    loop {
        stream.skip_whitespace();
        if stream.at_line_end() {
            break;
        }
        match stream.peek().map(|t| t.token_type.clone()) {
            Some(TokenType::Comma) => {
                stream.advance();
            }
            Some(token) => match token.number() {
                Some(value) => {
                    stream.advance();
                    values.push(value);
                    stream.skip_whitespace();
                    match stream.peek().map(|t| &t.token_type) {
                        Some(TokenType::Comma) => {
                            stream.advance();
                        }
                        _ if stream.at_line_end() => break,
                        _ => return Err("expected ',' between DCB values".to_string()),
                    }
                }
                None => return Err(format!("invalid DCB value: {}", describe(&token))),
            },
            None => break,
        }
    }
    Ok(values)
}

fn parse_operand(stream: &mut TokenStream) -> Result<Operand, String> {
    stream.skip_whitespace();
    if stream.at_line_end() {
        return Ok(Operand::None);
    }

    let Some(token) = stream.consume() else {
        return Ok(Operand::None);
    };

    match token.token_type {
        TokenType::Hash => {
            stream.skip_whitespace();
            match stream.consume().map(|t| t.token_type) {
                Some(TokenType::Less) => Ok(Operand::ImmediateLow(expect_label(stream)?)),
                Some(TokenType::Greater) => Ok(Operand::ImmediateHigh(expect_label(stream)?)),
                Some(other) => other
                    .number()
                    .map(Operand::Immediate)
                    .ok_or_else(|| format!("invalid immediate value: {}", describe(&other))),
                None => Err("missing immediate value".to_string()),
            }
        }
        TokenType::LParen => {
            stream.skip_whitespace();
            let value = expect_value(stream)?;
            stream.skip_whitespace();
            match stream.consume().map(|t| t.token_type) {
                Some(TokenType::Comma) => {
                    expect_register(stream, "X")?;
                    stream.skip_whitespace();
                    expect_token(stream, TokenType::RParen, "')'")?;
                    Ok(Operand::IndirectX(value))
                }
                Some(TokenType::RParen) => {
                    stream.skip_whitespace();
                    if stream.peek().map(|t| &t.token_type) == Some(&TokenType::Comma) {
                        stream.advance();
                        expect_register(stream, "Y")?;
                        Ok(Operand::IndirectY(value))
                    } else {
                        Ok(Operand::Indirect(value))
                    }
                }
                _ => Err("expected ',X)' or ')' in indirect operand".to_string()),
            }
        }
        other => {
            let value = token_value(other)?;
            stream.skip_whitespace();
            if stream.peek().map(|t| &t.token_type) != Some(&TokenType::Comma) {
                return Ok(Operand::Direct(value));
            }
            stream.advance();
            stream.skip_whitespace();
            match stream.consume().map(|t| t.token_type) {
                Some(TokenType::Identifier(reg)) if reg.eq_ignore_ascii_case("X") => {
                    Ok(Operand::IndexedX(value))
                }
                Some(TokenType::Identifier(reg)) if reg.eq_ignore_ascii_case("Y") => {
                    Ok(Operand::IndexedY(value))
                }
                _ => Err("expected X or Y after ','".to_string()),
            }
        }
    }
}

fn token_value(token: TokenType) -> Result<Value, String> {
    match token {
        TokenType::Identifier(name) => Ok(Value::Label(name)),
        other => other
            .number()
            .map(Value::Number)
            .ok_or_else(|| format!("unexpected {}", describe(&other))),
    }
}

fn expect_value(stream: &mut TokenStream) -> Result<Value, String> {
    match stream.consume() {
        Some(token) => token_value(token.token_type),
        None => Err("missing operand".to_string()),
    }
}

fn expect_number(stream: &mut TokenStream, what: &str) -> Result<u64, String> {
    stream
        .consume()
        .and_then(|t| t.token_type.number())
        .ok_or_else(|| format!("expected {}", what))
}

fn expect_label(stream: &mut TokenStream) -> Result<String, String> {
    match stream.consume().map(|t| t.token_type) {
        Some(TokenType::Identifier(name)) => Ok(name),
        _ => Err("expected label name".to_string()),
    }
}

fn expect_register(stream: &mut TokenStream, register: &str) -> Result<(), String> {
    stream.skip_whitespace();
    match stream.consume().map(|t| t.token_type) {
        Some(TokenType::Identifier(name)) if name.eq_ignore_ascii_case(register) => Ok(()),
        _ => Err(format!("expected index register {}", register)),
    }
}

fn expect_token(stream: &mut TokenStream, expected: TokenType, what: &str) -> Result<(), String> {
    match stream.consume() {
        Some(token) if token.token_type == expected => Ok(()),
        _ => Err(format!("expected {}", what)),
    }
}

fn describe(token: &TokenType) -> String {
    match token {
        TokenType::Identifier(name) => format!("identifier '{}'", name),
        TokenType::DecimalNumber(v) => format!("number {}", v),
        TokenType::HexNumber(v) => format!("number ${:X}", v),
        TokenType::BinaryNumber(v) => format!("number %{:b}", v),
        TokenType::Colon => "':'".to_string(),
        TokenType::Comma => "','".to_string(),
        TokenType::Hash => "'#'".to_string(),
        TokenType::Equal => "'='".to_string(),
        TokenType::LParen => "'('".to_string(),
        TokenType::RParen => "')'".to_string(),
        TokenType::Less => "'<'".to_string(),
        TokenType::Greater => "'>'".to_string(),
        TokenType::Star => "'*'".to_string(),
        TokenType::Whitespace => "whitespace".to_string(),
        TokenType::Comment(_) => "comment".to_string(),
        TokenType::Eof => "end of line".to_string(),
    }
}

/// Parse a number from a string (supports hex $XX or 0xXX, decimal, binary %XXXXXXXX)
pub fn parse_number(s: &str) -> Result<u64, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("empty number string".to_string());
    }

    if let Some(hex) = s.strip_prefix('$').or_else(|| s.strip_prefix("0x")) {
        u64::from_str_radix(hex, 16).map_err(|e| format!("invalid hex number: {}", e))
    } else if let Some(bin) = s.strip_prefix('%') {
        u64::from_str_radix(bin, 2).map_err(|e| format!("invalid binary number: {}", e))
    } else {
        s.parse::<u64>()
            .map_err(|e| format!("invalid decimal number: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operand(text: &str) -> Operand {
        match parse_line(1, text).unwrap().statement {
            Statement::Instruction { operand, .. } => operand,
            other => panic!("expected instruction, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_number_hex() {
        assert_eq!(parse_number("$FF").unwrap(), 255);
        assert_eq!(parse_number("0x1234").unwrap(), 0x1234);
    }

    #[test]
    fn test_parse_number_decimal_and_binary() {
        assert_eq!(parse_number("1234").unwrap(), 1234);
        assert_eq!(parse_number("%01000010").unwrap(), 66);
    }

    #[test]
    fn test_parse_number_invalid() {
        assert!(parse_number("$XY").is_err());
        assert!(parse_number("%202").is_err());
        assert!(parse_number("ABC").is_err());
        assert!(parse_number("").is_err());
    }

    #[test]
    fn test_empty_and_label_only_lines() {
        let line = parse_line(1, "   ; just a comment").unwrap();
        assert_eq!(line.statement, Statement::Empty);
        assert_eq!(line.comment.as_deref(), Some(" just a comment"));

        let line = parse_line(2, "end:").unwrap();
        assert_eq!(line.label.as_deref(), Some("end"));
        assert_eq!(line.statement, Statement::Empty);
    }

    #[test]
    fn test_mnemonic_is_upper_cased_label_is_not() {
        let line = parse_line(1, "Again: inx").unwrap();
        assert_eq!(line.label.as_deref(), Some("Again"));
        assert_eq!(
            line.statement,
            Statement::Instruction {
                mnemonic: "INX".to_string(),
                operand: Operand::None
            }
        );
    }

    #[test]
    fn test_operand_forms() {
        assert_eq!(operand("LDA #$10"), Operand::Immediate(0x10));
        assert_eq!(operand("LDA #<data"), Operand::ImmediateLow("data".to_string()));
        assert_eq!(operand("LDA #>data"), Operand::ImmediateHigh("data".to_string()));
        assert_eq!(operand("LDA $10"), Operand::Direct(Value::Number(0x10)));
        assert_eq!(operand("LDA $10,x"), Operand::IndexedX(Value::Number(0x10)));
        assert_eq!(operand("LDX $10, Y"), Operand::IndexedY(Value::Number(0x10)));
        assert_eq!(operand("JMP ($1234)"), Operand::Indirect(Value::Number(0x1234)));
        assert_eq!(operand("LDA ($10,X)"), Operand::IndirectX(Value::Number(0x10)));
        assert_eq!(operand("LDA ( $10 ) , Y"), Operand::IndirectY(Value::Number(0x10)));
        assert_eq!(operand("BNE loop"), Operand::Direct(Value::Label("loop".to_string())));
        assert_eq!(operand("ASL A"), Operand::Direct(Value::Label("A".to_string())));
    }

    #[test]
    fn test_origin_directive() {
        assert_eq!(
            parse_line(1, "*=$0800").unwrap().statement,
            Statement::Origin(0x800)
        );
        assert_eq!(
            parse_line(1, "* = 4096").unwrap().statement,
            Statement::Origin(4096)
        );
        assert!(parse_line(1, "* $0800").is_err());
    }

    #[test]
    fn test_dcb_lists() {
        assert_eq!(
            parse_line(1, "dcb $01, 2,,$FF,").unwrap().statement,
            Statement::Dcb(vec![1, 2, 0xFF])
        );
        assert_eq!(parse_line(1, "DCB").unwrap().statement, Statement::Dcb(vec![]));
        assert!(parse_line(1, "DCB label").is_err());
        assert!(parse_line(1, "DCB 1 2").is_err());
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse_line(1, "LDA #").is_err());
        assert!(parse_line(1, "LDA ($10,Y)").is_err());
        assert!(parse_line(1, "LDA $10,Z").is_err());
        assert!(parse_line(1, "LDA $10 $20").is_err());
        assert!(parse_line(1, "#$10").is_err());
        assert!(parse_line(1, "LDA $G0").is_err());
    }
}
