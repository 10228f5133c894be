//! The standard operator set
//!
//! Each operator is declared once per hand-written implementation; mixed
//! argument types, swapped arguments and Int/BigInt widening come from the
//! tags and are filled in when the catalog is finalized.

use crate::body::{FromValue, IntoValue, OpBody, OpFormatter};
use crate::error::RuntimeError;
use crate::operator_map::{Catalog, LookupStrategy, OperatorMap};
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rcalc_ops::{CallDeclaration, DeclarationError, SourceLocation, Tag};
use std::panic::Location;

type Declaration = CallDeclaration<OpBody>;

/// The line that declared an operator. Helpers building declarations are
/// `#[track_caller]`, so their declarations point at the helper's caller.
#[track_caller]
fn here() -> SourceLocation {
    let caller = Location::caller();
    SourceLocation::new(caller.file(), caller.line() as usize)
}

const BIG: &str = "123456789012345678901234567890";

/// Every standard operator, not yet finalized
pub fn standard_catalog() -> Result<Catalog, DeclarationError> {
    let mut catalog = Catalog::new();

    register(&mut catalog, add(), OpFormatter::infix("+"))?;
    register(&mut catalog, sub(), OpFormatter::infix("-"))?;
    register(&mut catalog, mul(), OpFormatter::infix("*"))?;
    register(&mut catalog, div(), OpFormatter::infix("/"))?;
    register(&mut catalog, modulo(), OpFormatter::infix("%"))?;
    register(&mut catalog, neg(), OpFormatter::prefix("-"))?;
    register(&mut catalog, abs(), OpFormatter::call("abs"))?;
    register(&mut catalog, sqrt(), OpFormatter::call("sqrt"))?;
    register(&mut catalog, pow(), OpFormatter::infix("^"))?;
    register(&mut catalog, extremum("Min", "Smaller of two numbers", false), OpFormatter::call("min"))?;
    register(&mut catalog, extremum("Max", "Larger of two numbers", true), OpFormatter::call("max"))?;
    register(&mut catalog, dot(), OpFormatter::call("dot"))?;
    register(&mut catalog, cross(), OpFormatter::call("cross"))?;
    register(&mut catalog, det(), OpFormatter::call("det"))?;
    register(&mut catalog, transpose(), OpFormatter::call("transpose"))?;
    register(&mut catalog, pi(), OpFormatter::call("pi"))?;
    register(&mut catalog, count(), OpFormatter::call("count"))?;
    register(&mut catalog, pick(), pick_formatter())?;

    Ok(catalog)
}

/// The standard catalog, finalized and indexed
pub fn standard_operator_map(strategy: LookupStrategy) -> Result<OperatorMap, DeclarationError> {
    OperatorMap::new(standard_catalog()?, strategy)
}

#[track_caller]
fn register(
    catalog: &mut Catalog,
    declarations: Vec<Declaration>,
    formatter: OpFormatter,
) -> Result<(), DeclarationError> {
    let mut operator = None;
    let mut arity = 0;
    for declaration in declarations {
        arity = declaration.arity();
        operator.get_or_insert_with(|| declaration.operator.clone());
        catalog.declare(declaration)?;
    }

    if let Some(operator) = operator {
        catalog.declare_formatter(formatter.declare(&operator, arity).at(here()))?;
    }
    Ok(())
}

fn add() -> Vec<Declaration> {
    vec![
        OpBody::binary(|a: i64, b: i64| a.checked_add(b).ok_or(RuntimeError::Overflow))
            .declare("Add")
            .describe("Adds two values")
            .category("Arithmetic")
            .example(["2", "3"])
            .at(here()),
        OpBody::binary(|a: BigInt, b: BigInt| Ok(a + b))
            .declare("Add")
            .tag(Tag::BigIntCast)
            .example([BIG, "1"])
            .at(here()),
        OpBody::binary(|a: f64, b: f64| Ok(a + b))
            .declare("Add")
            .tag(Tag::RealCast)
            .example(["1.5", "2"])
            .at(here()),
        elementwise::<2>("Add", |x, y| x + y),
        elementwise::<3>("Add", |x, y| x + y),
        elementwise::<4>("Add", |x, y| x + y),
    ]
}

fn sub() -> Vec<Declaration> {
    vec![
        OpBody::binary(|a: i64, b: i64| a.checked_sub(b).ok_or(RuntimeError::Overflow))
            .declare("Sub")
            .describe("Subtracts the top value from the one below it")
            .category("Arithmetic")
            .example(["5", "3"])
            .at(here()),
        OpBody::binary(|a: BigInt, b: BigInt| Ok(a - b))
            .declare("Sub")
            .tag(Tag::BigIntCast)
            .example([BIG, "1"])
            .at(here()),
        OpBody::binary(|a: f64, b: f64| Ok(a - b))
            .declare("Sub")
            .tag(Tag::RealCast)
            .example(["2.5", "1"])
            .at(here()),
        elementwise::<2>("Sub", |x, y| x - y),
        elementwise::<3>("Sub", |x, y| x - y),
        elementwise::<4>("Sub", |x, y| x - y),
    ]
}

fn mul() -> Vec<Declaration> {
    vec![
        OpBody::binary(|a: i64, b: i64| a.checked_mul(b).ok_or(RuntimeError::Overflow))
            .declare("Mul")
            .describe("Multiplies two values")
            .category("Arithmetic")
            .example(["6", "7"])
            .at(here()),
        OpBody::binary(|a: BigInt, b: BigInt| Ok(a * b))
            .declare("Mul")
            .tag(Tag::BigIntCast)
            .example([BIG, "2"])
            .at(here()),
        OpBody::binary(|a: f64, b: f64| Ok(a * b))
            .declare("Mul")
            .tag(Tag::RealCast)
            .example(["1.5", "4"])
            .at(here()),
        scaled::<2>("Mul", |x, s| x * s)
            .tag(Tag::Reversible)
            .example(["3", "[1, 2]"]),
        scaled::<3>("Mul", |x, s| x * s).tag(Tag::Reversible),
        scaled::<4>("Mul", |x, s| x * s).tag(Tag::Reversible),
        OpBody::binary(|a: [[f64; 2]; 2], b: [[f64; 2]; 2]| Ok(mat_mul(a, b)))
            .declare("Mul")
            .example(["{[1, 2], [3, 4]}", "{[5, 6], [7, 8]}"])
            .at(here()),
        OpBody::binary(|a: [[f64; 3]; 3], b: [[f64; 3]; 3]| Ok(mat_mul(a, b)))
            .declare("Mul")
            .at(here()),
        OpBody::binary(|a: [[f64; 4]; 4], b: [[f64; 4]; 4]| Ok(mat_mul(a, b)))
            .declare("Mul")
            .at(here()),
        OpBody::binary(|m: [[f64; 2]; 2], v: [f64; 2]| Ok(mat_vec(m, v)))
            .declare("Mul")
            .example(["{[0, -1], [1, 0]}", "[3, 4]"])
            .at(here()),
        OpBody::binary(|m: [[f64; 3]; 3], v: [f64; 3]| Ok(mat_vec(m, v)))
            .declare("Mul")
            .at(here()),
        OpBody::binary(|m: [[f64; 4]; 4], v: [f64; 4]| Ok(mat_vec(m, v)))
            .declare("Mul")
            .at(here()),
    ]
}

fn div() -> Vec<Declaration> {
    vec![
        OpBody::binary(|a: f64, b: f64| {
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(a / b)
        })
        .declare("Div")
        .tag(Tag::RealCast)
        .describe("Divides the value below the top by the top value")
        .category("Arithmetic")
        .example(["7", "2"])
        .at(here()),
        divided::<2>().example(["[2, 4]", "2"]),
        divided::<3>(),
        divided::<4>(),
    ]
}

fn modulo() -> Vec<Declaration> {
    vec![
        OpBody::binary(|a: i64, b: i64| {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a.checked_rem(b).ok_or(RuntimeError::Overflow)
        })
        .declare("Mod")
        .describe("Remainder of dividing the value below the top by the top value")
        .category("Arithmetic")
        .example(["7", "3"])
        .at(here()),
        OpBody::binary(|a: BigInt, b: BigInt| {
            if b.is_zero() {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(a % b)
        })
        .declare("Mod")
        .tag(Tag::BigIntCast)
        .example([BIG, "7"])
        .at(here()),
        OpBody::binary(|a: f64, b: f64| {
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(a % b)
        })
        .declare("Mod")
        .tag(Tag::RealCast)
        .example(["7.5", "2"])
        .at(here()),
    ]
}

fn neg() -> Vec<Declaration> {
    vec![
        OpBody::unary(|a: i64| a.checked_neg().ok_or(RuntimeError::Overflow))
            .declare("Neg")
            .tag(Tag::NoExpr)
            .describe("Negates a value")
            .category("Arithmetic")
            .example(["5"])
            .at(here()),
        OpBody::unary(|a: BigInt| Ok(-a))
            .declare("Neg")
            .tag(Tag::NoExpr)
            .example([BIG])
            .at(here()),
        OpBody::unary(|a: f64| Ok(-a))
            .declare("Neg")
            .tag(Tag::NoExpr)
            .example(["2.5"])
            .at(here()),
        mapped::<2>("Neg", |x| -x).tag(Tag::NoExpr),
        mapped::<3>("Neg", |x| -x).tag(Tag::NoExpr),
        mapped::<4>("Neg", |x| -x).tag(Tag::NoExpr),
    ]
}

fn abs() -> Vec<Declaration> {
    vec![
        OpBody::unary(|a: i64| a.checked_abs().ok_or(RuntimeError::Overflow))
            .declare("Abs")
            .tag(Tag::NoExpr)
            .describe("Absolute value of a number, or the length of a vector")
            .category("Arithmetic")
            .example(["-5"])
            .at(here()),
        OpBody::unary(|a: BigInt| Ok(a.abs()))
            .declare("Abs")
            .tag(Tag::NoExpr)
            .example(["-123456789012345678901234567890"])
            .at(here()),
        OpBody::unary(|a: f64| Ok(a.abs()))
            .declare("Abs")
            .tag(Tag::NoExpr)
            .example(["-2.5"])
            .at(here()),
        length::<2>().example(["[3, 4]"]),
        length::<3>(),
        length::<4>(),
    ]
}

fn sqrt() -> Vec<Declaration> {
    vec![
        OpBody::unary(|a: f64| {
            if a < 0.0 {
                return Err(RuntimeError::domain("Cannot take the square root of a negative number"));
            }
            Ok(a.sqrt())
        })
        .declare("Sqrt")
        .tags([Tag::RealCast, Tag::NoExpr])
        .describe("Square root")
        .category("Arithmetic")
        .example(["16"])
        .example(["2.25"])
        .at(here()),
    ]
}

fn pow() -> Vec<Declaration> {
    vec![
        OpBody::binary(|base: i64, exponent: i64| {
            let exponent = non_negative_exponent(exponent)?;
            base.checked_pow(exponent).ok_or(RuntimeError::Overflow)
        })
        .declare("Pow")
        .describe("Raises the value below the top to the power of the top value")
        .category("Arithmetic")
        .example(["2", "10"])
        .at(here()),
        OpBody::binary(|base: BigInt, exponent: i64| {
            Ok(base.pow(non_negative_exponent(exponent)?))
        })
        .declare("Pow")
        .example([BIG, "2"])
        .at(here()),
        OpBody::binary(|base: f64, exponent: f64| Ok(base.powf(exponent)))
            .declare("Pow")
            .tag(Tag::RealCast)
            .example(["2", "0.5"])
            .at(here()),
    ]
}

fn non_negative_exponent(exponent: i64) -> Result<u32, RuntimeError> {
    if exponent < 0 {
        return Err(RuntimeError::domain(
            "Integer powers need a non-negative exponent, use a Real exponent instead",
        ));
    }
    u32::try_from(exponent).map_err(|_| RuntimeError::Overflow)
}

fn extremum(operator: &'static str, description: &str, larger: bool) -> Vec<Declaration> {
    vec![
        OpBody::binary(move |a: i64, b: i64| Ok(if larger { a.max(b) } else { a.min(b) }))
            .declare(operator)
            .tag(Tag::NoExpr)
            .describe(description)
            .category("Arithmetic")
            .example(["3", "7"])
            .at(here()),
        OpBody::binary(move |a: BigInt, b: BigInt| Ok(if larger { a.max(b) } else { a.min(b) }))
            .declare(operator)
            .tags([Tag::BigIntCast, Tag::NoExpr])
            .example([BIG, "7"])
            .at(here()),
        OpBody::binary(move |a: f64, b: f64| Ok(if larger { a.max(b) } else { a.min(b) }))
            .declare(operator)
            .tags([Tag::RealCast, Tag::NoExpr])
            .example(["2.5", "1"])
            .at(here()),
    ]
}

fn dot() -> Vec<Declaration> {
    vec![
        OpBody::binary(|a: [f64; 2], b: [f64; 2]| Ok(dot_product(a, b)))
            .declare("Dot")
            .tag(Tag::NoExpr)
            .describe("Dot product of two vectors")
            .category("Vector")
            .example(["[1, 2]", "[3, 4]"])
            .at(here()),
        OpBody::binary(|a: [f64; 3], b: [f64; 3]| Ok(dot_product(a, b)))
            .declare("Dot")
            .tag(Tag::NoExpr)
            .example(["[1, 2, 3]", "[4, 5, 6]"])
            .at(here()),
        OpBody::binary(|a: [f64; 4], b: [f64; 4]| Ok(dot_product(a, b)))
            .declare("Dot")
            .tag(Tag::NoExpr)
            .at(here()),
    ]
}

fn cross() -> Vec<Declaration> {
    vec![
        OpBody::binary(|a: [f64; 3], b: [f64; 3]| {
            Ok([
                a[1] * b[2] - a[2] * b[1],
                a[2] * b[0] - a[0] * b[2],
                a[0] * b[1] - a[1] * b[0],
            ])
        })
        .declare("Cross")
        .tag(Tag::NoExpr)
        .describe("Cross product of two 3D vectors")
        .category("Vector")
        .example(["[1, 0, 0]", "[0, 1, 0]"])
        .at(here()),
    ]
}

fn det() -> Vec<Declaration> {
    vec![
        OpBody::unary(|m: [[f64; 2]; 2]| Ok(determinant(m)))
            .declare("Det")
            .tag(Tag::NoExpr)
            .describe("Determinant of a square matrix")
            .category("Matrix")
            .example(["{[1, 2], [3, 4]}"])
            .at(here()),
        OpBody::unary(|m: [[f64; 3]; 3]| Ok(determinant(m)))
            .declare("Det")
            .tag(Tag::NoExpr)
            .example(["{[2, 0, 0], [0, 3, 0], [0, 0, 4]}"])
            .at(here()),
        OpBody::unary(|m: [[f64; 4]; 4]| Ok(determinant(m)))
            .declare("Det")
            .tag(Tag::NoExpr)
            .at(here()),
    ]
}

fn transpose() -> Vec<Declaration> {
    vec![
        OpBody::unary(|m: [[f64; 2]; 2]| Ok(transposed(m)))
            .declare("Transpose")
            .tag(Tag::NoExpr)
            .describe("Swaps the rows and columns of a matrix")
            .category("Matrix")
            .example(["{[1, 2], [3, 4]}"])
            .at(here()),
        OpBody::unary(|m: [[f64; 3]; 3]| Ok(transposed(m)))
            .declare("Transpose")
            .tag(Tag::NoExpr)
            .at(here()),
        OpBody::unary(|m: [[f64; 4]; 4]| Ok(transposed(m)))
            .declare("Transpose")
            .tag(Tag::NoExpr)
            .at(here()),
    ]
}

fn pi() -> Vec<Declaration> {
    vec![
        OpBody::nullary(|| Ok(std::f64::consts::PI))
            .declare("Pi")
            .tag(Tag::NoExpr)
            .describe("The constant pi")
            .category("Constants")
            .at(here()),
    ]
}

fn count() -> Vec<Declaration> {
    vec![
        OpBody::stack_nullary(|stack| i64::try_from(stack.len()).map_err(|_| RuntimeError::Overflow))
            .declare("Count")
            .tag(Tag::NoExpr)
            .describe("Number of items on the stack")
            .category("Stack")
            .at(here()),
    ]
}

fn pick() -> Vec<Declaration> {
    vec![
        OpBody::stack_unary(|stack, depth: i64| {
            usize::try_from(depth)
                .ok()
                .and_then(|depth| depth.checked_sub(1))
                .and_then(|depth| stack.peek(depth))
                .map(|item| item.value.clone())
                .ok_or_else(|| {
                    RuntimeError::domain(format!(
                        "Cannot pick item {depth} from a stack of {}",
                        stack.len()
                    ))
                })
        })
        .declare("Pick")
        .tag(Tag::NoExpr)
        .describe("Copies the item at the given depth, 1 being the top, to the top of the stack")
        .category("Stack")
        .example(["5", "6", "2"])
        .at(here()),
    ]
}

/// Pick echoes the input of the item it copied
fn pick_formatter() -> OpFormatter {
    OpFormatter::stack(|stack, items| {
        let picked = items.first().and_then(|item| match item.value {
            Value::Int(depth) => usize::try_from(depth)
                .ok()
                .and_then(|depth| depth.checked_sub(1))
                .and_then(|depth| stack.peek(depth)),
            _ => None,
        });
        match (picked, items.first()) {
            (Some(picked), _) => picked.input.clone(),
            (None, Some(depth)) => format!("pick({})", depth.input),
            (None, None) => "pick".to_string(),
        }
    })
}

fn vector_example(size: usize, offset: usize) -> String {
    let components: Vec<String> = (1..=size).map(|i| (i + offset).to_string()).collect();
    format!("[{}]", components.join(", "))
}

#[track_caller]
fn elementwise<const N: usize>(operator: &str, op: fn(f64, f64) -> f64) -> Declaration
where
    [f64; N]: FromValue + IntoValue,
{
    OpBody::binary(move |a: [f64; N], b: [f64; N]| Ok(zip(a, b, op)))
        .declare(operator)
        .example([vector_example(N, 0), vector_example(N, N)])
        .at(here())
}

#[track_caller]
fn scaled<const N: usize>(operator: &str, op: fn(f64, f64) -> f64) -> Declaration
where
    [f64; N]: FromValue + IntoValue,
{
    OpBody::binary(move |v: [f64; N], s: f64| Ok(v.map(|x| op(x, s))))
        .declare(operator)
        .tag(Tag::RealCast)
        .example([vector_example(N, 0), "2".to_string()])
        .at(here())
}

#[track_caller]
fn divided<const N: usize>() -> Declaration
where
    [f64; N]: FromValue + IntoValue,
{
    OpBody::binary(|v: [f64; N], s: f64| {
        if s == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        Ok(v.map(|x| x / s))
    })
    .declare("Div")
    .tag(Tag::RealCast)
    .at(here())
}

#[track_caller]
fn mapped<const N: usize>(operator: &str, op: fn(f64) -> f64) -> Declaration
where
    [f64; N]: FromValue + IntoValue,
{
    OpBody::unary(move |v: [f64; N]| Ok(v.map(op)))
        .declare(operator)
        .example([vector_example(N, 0)])
        .at(here())
}

#[track_caller]
fn length<const N: usize>() -> Declaration
where
    [f64; N]: FromValue,
{
    OpBody::unary(|v: [f64; N]| Ok(dot_product(v, v).sqrt()))
        .declare("Abs")
        .tag(Tag::NoExpr)
        .at(here())
}

fn zip<const N: usize>(a: [f64; N], b: [f64; N], op: fn(f64, f64) -> f64) -> [f64; N] {
    std::array::from_fn(|i| op(a[i], b[i]))
}

fn dot_product<const N: usize>(a: [f64; N], b: [f64; N]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn mat_mul<const N: usize>(a: [[f64; N]; N], b: [[f64; N]; N]) -> [[f64; N]; N] {
    std::array::from_fn(|row| {
        std::array::from_fn(|col| (0..N).map(|k| a[row][k] * b[k][col]).sum())
    })
}

fn mat_vec<const N: usize>(m: [[f64; N]; N], v: [f64; N]) -> [f64; N] {
    std::array::from_fn(|row| dot_product(m[row], v))
}

fn transposed<const N: usize>(m: [[f64; N]; N]) -> [[f64; N]; N] {
    std::array::from_fn(|row| std::array::from_fn(|col| m[col][row]))
}

/// Gaussian elimination with partial pivoting
fn determinant<const N: usize>(mut m: [[f64; N]; N]) -> f64 {
    let mut det = 1.0;
    for col in 0..N {
        let pivot = (col..N)
            .max_by(|a, b| m[*a][col].abs().total_cmp(&m[*b][col].abs()))
            .unwrap_or(col);
        if m[pivot][col] == 0.0 {
            return 0.0;
        }
        if pivot != col {
            m.swap(pivot, col);
            det = -det;
        }
        det *= m[col][col];
        for row in col + 1..N {
            let factor = m[row][col] / m[col][col];
            for k in col..N {
                m[row][k] -= factor * m[col][k];
            }
        }
    }
    det
}
