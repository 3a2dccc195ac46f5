use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use vn_core::{eval_bail, Result};

/// Integer variable banks addressable from script expressions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum IntBank {
    #[strum(serialize = "intA")]
    A,
    #[strum(serialize = "intB")]
    B,
    #[strum(serialize = "intC")]
    C,
    #[strum(serialize = "intD")]
    D,
    #[strum(serialize = "intE")]
    E,
    #[strum(serialize = "intF")]
    F,
    #[strum(serialize = "intZ")]
    Z,
}

/// String variable banks addressable from script expressions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum StrBank {
    #[strum(serialize = "strS")]
    S,
    #[strum(serialize = "strM")]
    M,
}

/// Read access to interpreter-visible state used while evaluating expressions.
pub trait LiveState {
    fn read_int(&self, bank: IntBank, index: i32) -> Result<i32>;
    fn read_str(&self, bank: StrBank, index: i32) -> Result<String>;
    /// Value of the store register (the result slot of the last returning opcode).
    fn store(&self) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// A parsed but not yet evaluated parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Int(i32),
    Str(String),
    Store,
    IntRef {
        bank: IntBank,
        index: Box<Expression>,
    },
    StrRef {
        bank: StrBank,
        index: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

impl Expression {
    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Expression::Str(_) | Expression::StrRef { .. })
    }

    pub fn eval_int(&self, state: &dyn LiveState) -> Result<i32> {
        match self {
            Expression::Int(value) => Ok(*value),
            Expression::Store => Ok(state.store()),
            Expression::IntRef { bank, index } => {
                let index = index.eval_int(state)?;
                state.read_int(*bank, index)
            }
            Expression::Str(_) | Expression::StrRef { .. } => {
                eval_bail!("expected an integer expression, found a string")
            }
            Expression::Unary { op, operand } => {
                let value = operand.eval_int(state)?;
                Ok(match op {
                    UnaryOp::Neg => value.wrapping_neg(),
                    UnaryOp::Not => (value == 0) as i32,
                })
            }
            Expression::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, state),
        }
    }

    pub fn eval_str(&self, state: &dyn LiveState) -> Result<String> {
        match self {
            Expression::Str(value) => Ok(value.clone()),
            Expression::StrRef { bank, index } => {
                let index = index.eval_int(state)?;
                state.read_str(*bank, index)
            }
            _ => eval_bail!("expected a string expression, found an integer"),
        }
    }
}

fn eval_binary(
    op: BinaryOp,
    lhs: &Expression,
    rhs: &Expression,
    state: &dyn LiveState,
) -> Result<i32> {
    let a = lhs.eval_int(state)?;
    // && and || short-circuit
    match op {
        BinaryOp::And if a == 0 => return Ok(0),
        BinaryOp::Or if a != 0 => return Ok(1),
        _ => {}
    }

    let b = rhs.eval_int(state)?;
    let value = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                eval_bail!("division by zero");
            }
            a.wrapping_div(b)
        }
        BinaryOp::Rem => {
            if b == 0 {
                eval_bail!("remainder by zero");
            }
            a.wrapping_rem(b)
        }
        BinaryOp::Eq => (a == b) as i32,
        BinaryOp::Ne => (a != b) as i32,
        BinaryOp::Lt => (a < b) as i32,
        BinaryOp::Le => (a <= b) as i32,
        BinaryOp::Gt => (a > b) as i32,
        BinaryOp::Ge => (a >= b) as i32,
        BinaryOp::And | BinaryOp::Or => (b != 0) as i32,
    };
    Ok(value)
}
