//! Arithmetic and comparison operators: `+ - * / = != < > <= >=`.

use core::cmp::Ordering;

use crate::errors::{Result, ScenarioError};
use crate::interpreter::Ctx;
use crate::parser::Node;
use crate::values::{Number, Value};
use crate::world::World;

use super::resolve;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Operator {
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mul,
            "/" => Operator::Div,
            "=" | "==" => Operator::Eq,
            "!=" => Operator::Ne,
            "<" => Operator::Lt,
            ">" => Operator::Gt,
            "<=" => Operator::Le,
            ">=" => Operator::Ge,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
        }
    }

    fn is_arithmetic(self) -> bool {
        matches!(self, Operator::Add | Operator::Sub | Operator::Mul | Operator::Div)
    }
}

/// Evaluate `(op operands...)`. Arithmetic folds left over two or more
/// operands; comparisons take exactly two.
pub async fn apply(ctx: Ctx<'_>, world: &World, op: Operator, operands: &[Node]) -> Result<Value> {
    let mut values = Vec::with_capacity(operands.len());
    for operand in operands {
        values.push(resolve(ctx, world, operand).await?);
    }

    if op.is_arithmetic() {
        if values.len() < 2 {
            return Err(ScenarioError::resolution(
                op.symbol(),
                "expects at least two operands",
            ));
        }
        let mut acc = numeric(op, &values[0])?.clone();
        for value in &values[1..] {
            acc = arithmetic(op, &acc, numeric(op, value)?)?;
        }
        return Ok(Value::Number(acc));
    }

    match values.as_slice() {
        [left, right] => Ok(Value::Bool(compare(op, left, right)?)),
        _ => Err(ScenarioError::resolution(op.symbol(), "expects exactly two operands")),
    }
}

fn numeric<'v>(op: Operator, value: &'v Value) -> Result<&'v Number> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(ScenarioError::resolution(
            op.symbol(),
            format!("expected a number, found {} `{}`", other.type_name(), other.show()),
        )),
    }
}

/// `a op b` for the four arithmetic operators. Sums and differences keep
/// the display scale of their operands.
pub fn arithmetic(op: Operator, a: &Number, b: &Number) -> Result<Number> {
    let (x, y) = (a.magnitude(), b.magnitude());
    let magnitude = match op {
        Operator::Add => x.add(y),
        Operator::Sub => x.sub(y),
        Operator::Mul => x.mul(y),
        Operator::Div => x
            .checked_div(y)
            .ok_or_else(|| ScenarioError::resolution(op.symbol(), "division by zero"))?,
        _ => {
            return Err(ScenarioError::resolution(op.symbol(), "not an arithmetic operator"));
        }
    };
    let scale = match op {
        Operator::Add | Operator::Sub => a.display_scale().or(b.display_scale()),
        _ => None,
    };
    Ok(match scale {
        Some(scale) => Number::scaled(magnitude, scale),
        None => Number::new(magnitude),
    })
}

/// `left op right` for the comparison operators.
pub fn compare(op: Operator, left: &Value, right: &Value) -> Result<bool> {
    let ordering = |left: &Value, right: &Value| -> Result<Ordering> {
        Ok(numeric(op, left)?.magnitude().cmp(numeric(op, right)?.magnitude()))
    };
    match op {
        Operator::Eq => Ok(left.matches(right)?),
        Operator::Ne => Ok(!left.matches(right)?),
        Operator::Lt => Ok(ordering(left, right)? == Ordering::Less),
        Operator::Gt => Ok(ordering(left, right)? == Ordering::Greater),
        Operator::Le => Ok(ordering(left, right)? != Ordering::Greater),
        Operator::Ge => Ok(ordering(left, right)? != Ordering::Less),
        _ => Err(ScenarioError::resolution(op.symbol(), "not a comparison operator")),
    }
}
