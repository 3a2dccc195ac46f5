use crate::expr::{BinaryOp, Expression, IntBank, StrBank, UnaryOp};
use std::str::FromStr;
use vn_core::{Error, Result};
use winnow::combinator::cut_err;
use winnow::error::{ContextError, ErrMode};
use winnow::token::{literal, take_while};
use winnow::{ModalResult, Parser};

const OR_OPS: &[(&str, BinaryOp)] = &[("||", BinaryOp::Or)];
const AND_OPS: &[(&str, BinaryOp)] = &[("&&", BinaryOp::And)];
const CMP_OPS: &[(&str, BinaryOp)] = &[
    ("==", BinaryOp::Eq),
    ("!=", BinaryOp::Ne),
    ("<=", BinaryOp::Le),
    (">=", BinaryOp::Ge),
    ("<", BinaryOp::Lt),
    (">", BinaryOp::Gt),
];
const SUM_OPS: &[(&str, BinaryOp)] = &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)];
const PRODUCT_OPS: &[(&str, BinaryOp)] = &[
    ("*", BinaryOp::Mul),
    ("/", BinaryOp::Div),
    ("%", BinaryOp::Rem),
];

/// Parse the text of one raw token into an [`Expression`].
///
/// The whole token must be consumed; anything left over is a malformed
/// parameter.
pub fn parse_expression(token: &str) -> Result<Expression> {
    let mut input = token;
    let expr = expression(&mut input).map_err(|err| describe(token, err))?;
    ws(&mut input).map_err(|err| describe(token, err))?;
    if !input.is_empty() {
        return Err(Error::malformed(format!(
            "unexpected `{}` after parameter `{}`",
            input,
            token.trim()
        )));
    }
    Ok(expr)
}

fn describe(token: &str, err: ErrMode<ContextError>) -> Error {
    let detail = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx.to_string(),
        ErrMode::Incomplete(_) => "incomplete input".to_string(),
    };
    if detail.is_empty() {
        Error::malformed(format!("cannot parse parameter `{}`", token.trim()))
    } else {
        Error::malformed(format!("cannot parse parameter `{}`: {}", token.trim(), detail))
    }
}

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .map(|_| ())
        .parse_next(input)
}

fn expression(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, OR_OPS, and_expr)
}

fn and_expr(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, AND_OPS, cmp_expr)
}

fn cmp_expr(input: &mut &str) -> ModalResult<Expression> {
    let lhs = sum_expr(input)?;
    ws(input)?;
    match operator(input, CMP_OPS) {
        Some(op) => {
            let rhs = cut_err(sum_expr).parse_next(input)?;
            Ok(Expression::binary(op, lhs, rhs))
        }
        None => Ok(lhs),
    }
}

fn sum_expr(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, SUM_OPS, product_expr)
}

fn product_expr(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, PRODUCT_OPS, unary_expr)
}

/// Left-associative chain of `next (op next)*`.
fn binary_level(
    input: &mut &str,
    ops: &[(&'static str, BinaryOp)],
    next: fn(&mut &str) -> ModalResult<Expression>,
) -> ModalResult<Expression> {
    let mut lhs = next(input)?;
    loop {
        ws(input)?;
        let Some(op) = operator(input, ops) else {
            break;
        };
        let rhs = cut_err(next).parse_next(input)?;
        lhs = Expression::binary(op, lhs, rhs);
    }
    Ok(lhs)
}

fn operator(input: &mut &str, ops: &[(&'static str, BinaryOp)]) -> Option<BinaryOp> {
    for (sym, op) in ops {
        if let Some(rest) = input.strip_prefix(sym) {
            *input = rest;
            return Some(*op);
        }
    }
    None
}

fn unary_expr(input: &mut &str) -> ModalResult<Expression> {
    ws(input)?;
    if let Some(rest) = input.strip_prefix('-') {
        *input = rest;
        ws(input)?;
        if input.starts_with(|c: char| c.is_ascii_digit()) {
            return negative_integer(input);
        }
        let operand = cut_err(unary_expr).parse_next(input)?;
        return Ok(Expression::unary(UnaryOp::Neg, operand));
    }
    if let Some(rest) = input.strip_prefix('!') {
        *input = rest;
        let operand = cut_err(unary_expr).parse_next(input)?;
        return Ok(Expression::unary(UnaryOp::Not, operand));
    }
    atom(input)
}

fn atom(input: &mut &str) -> ModalResult<Expression> {
    ws(input)?;
    let Some(first) = input.chars().next() else {
        return Err(backtrack_err());
    };
    match first {
        '0'..='9' => integer(input),
        '"' => string_literal(input).map(Expression::Str),
        '(' => {
            literal("(").parse_next(input)?;
            let inner = cut_err(expression).parse_next(input)?;
            expect(input, ")")?;
            Ok(inner)
        }
        c if is_ident_start(c) => variable(input),
        _ => Err(backtrack_err()),
    }
}

fn integer(input: &mut &str) -> ModalResult<Expression> {
    let value: i32 = digits(input)?.parse().map_err(|_| cut_err_mode())?;
    Ok(Expression::Int(value))
}

/// A literal directly after unary `-`; the only place `2147483648` fits.
fn negative_integer(input: &mut &str) -> ModalResult<Expression> {
    let magnitude: i64 = digits(input)?.parse().map_err(|_| cut_err_mode())?;
    let value = i32::try_from(-magnitude).map_err(|_| cut_err_mode())?;
    Ok(Expression::Int(value))
}

fn digits<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)
}

fn string_literal(input: &mut &str) -> ModalResult<String> {
    let Some(rest) = input.strip_prefix('"') else {
        return Err(backtrack_err());
    };
    let mut value = String::new();
    let mut chars = rest.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some((_, escaped)) => value.push(escaped),
                None => break,
            },
            '"' => {
                *input = &rest[idx + 1..];
                return Ok(value);
            }
            other => value.push(other),
        }
    }
    Err(cut_err_mode())
}

fn variable(input: &mut &str) -> ModalResult<Expression> {
    let name = identifier(input)?;
    if name == "store" {
        return Ok(Expression::Store);
    }
    if let Ok(bank) = IntBank::from_str(name) {
        let index = bracketed_index(input)?;
        return Ok(Expression::IntRef {
            bank,
            index: Box::new(index),
        });
    }
    if let Ok(bank) = StrBank::from_str(name) {
        let index = bracketed_index(input)?;
        return Ok(Expression::StrRef {
            bank,
            index: Box::new(index),
        });
    }
    Err(cut_err_mode())
}

fn bracketed_index(input: &mut &str) -> ModalResult<Expression> {
    expect(input, "[")?;
    let index = cut_err(expression).parse_next(input)?;
    expect(input, "]")?;
    Ok(index)
}

fn identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let original = *input;
    take_while(1.., is_ident_start).parse_next(input)?;
    take_while(0.., is_ident_continue).parse_next(input)?;
    let consumed = original.len() - input.len();
    Ok(&original[..consumed])
}

fn expect(input: &mut &str, sym: &'static str) -> ModalResult<()> {
    ws(input)?;
    cut_err(literal(sym)).parse_next(input)?;
    Ok(())
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

fn backtrack_err() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn cut_err_mode() -> ErrMode<ContextError> {
    ErrMode::Cut(ContextError::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::LiveState;
    use pretty_assertions::assert_eq;

    struct Banks {
        int_a: Vec<i32>,
        str_s: Vec<String>,
        store: i32,
    }

    impl LiveState for Banks {
        fn read_int(&self, bank: IntBank, index: i32) -> Result<i32> {
            match bank {
                IntBank::A => self
                    .int_a
                    .get(index as usize)
                    .copied()
                    .ok_or_else(|| Error::evaluation(format!("intA[{index}] out of range"))),
                _ => Ok(0),
            }
        }

        fn read_str(&self, _bank: StrBank, index: i32) -> Result<String> {
            self.str_s
                .get(index as usize)
                .cloned()
                .ok_or_else(|| Error::evaluation(format!("strS[{index}] out of range")))
        }

        fn store(&self) -> i32 {
            self.store
        }
    }

    fn banks() -> Banks {
        Banks {
            int_a: vec![5, 7, 1],
            str_s: vec!["Tomoya".to_string()],
            store: 42,
        }
    }

    fn eval(token: &str) -> i32 {
        parse_expression(token)
            .expect("parse")
            .eval_int(&banks())
            .expect("eval")
    }

    #[test]
    fn parses_literals() {
        assert_eq!(parse_expression("42").unwrap(), Expression::Int(42));
        assert_eq!(
            parse_expression(r#""say \"hi\"""#).unwrap(),
            Expression::Str("say \"hi\"".to_string())
        );
        assert_eq!(parse_expression(" store ").unwrap(), Expression::Store);
    }

    #[test]
    fn respects_precedence_and_associativity() {
        assert_eq!(eval("1 + 2 * 3"), 7);
        assert_eq!(eval("(1 + 2) * 3"), 9);
        assert_eq!(eval("10 - 4 - 3"), 3);
        assert_eq!(eval("-2147483648"), i32::MIN);
        assert_eq!(eval("- 5 * 2"), -10);
        assert_eq!(eval("-(2147483647) - 1"), i32::MIN);
        assert_eq!(eval("--3"), 3);
        assert_eq!(eval("1 + 1 == 2 && 3 > 2"), 1);
        assert_eq!(eval("!0 || 0"), 1);
    }

    #[test]
    fn reads_banks_with_nested_indices() {
        assert_eq!(eval("intA[2]"), 1);
        assert_eq!(eval("intA[intA[2]] + store"), 49);
        let name = parse_expression("strS[0]").unwrap();
        assert_eq!(name.eval_str(&banks()).unwrap(), "Tomoya");
    }

    #[test]
    fn logical_operators_short_circuit() {
        // intA[99] would fail if evaluated
        assert_eq!(eval("0 && intA[99]"), 0);
        assert_eq!(eval("1 || intA[99]"), 1);
    }

    #[test]
    fn evaluation_errors_are_reported() {
        let state = banks();
        let div = parse_expression("1 / (intA[0] - 5)").unwrap();
        assert!(matches!(div.eval_int(&state), Err(Error::Evaluation { .. })));
        let oob = parse_expression("intA[3]").unwrap();
        assert!(matches!(oob.eval_int(&state), Err(Error::Evaluation { .. })));
        let mixed = parse_expression("\"text\"").unwrap();
        assert!(matches!(mixed.eval_int(&state), Err(Error::Evaluation { .. })));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let malformed = [
            "",
            "1 +",
            "intQ[1]",
            "intA[1",
            "(1",
            "1 2",
            "\"open",
            "99999999999",
            "2147483648",
            "-2147483649",
        ];
        for token in malformed {
            let err = parse_expression(token).unwrap_err();
            assert!(err.is_malformed(), "`{token}` should be malformed, got {err}");
        }
    }
}
