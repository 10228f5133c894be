//! Operator bodies and formatters
//!
//! Bodies are written as ordinary typed Rust closures and erased into an
//! [`OpBody`]. The closure's parameter types become the declaration's
//! signature, and registries reject a declaration whose types or
//! `stack_ref` tag disagree with its body:
//!
//! ```ignore
//! let add = OpBody::binary(|a: f64, b: f64| Ok(a + b));
//! assert_eq!(add.signature().types(), &[ValueType::Real, ValueType::Real]);
//! ```

use crate::error::{Result, RuntimeError};
use crate::stack::{RpnStack, StackItem};
use crate::value::Value;
use num_bigint::BigInt;
use rcalc_ops::{
    CallDeclaration, FormatterDeclaration, Implementation, Tag, TypeSignature, ValueType,
};
use std::fmt;
use std::sync::Arc;

/// A Rust type a body parameter can be declared as
pub trait FromValue: Sized {
    const TYPE: ValueType;

    fn from_value(value: Value) -> Result<Self>;
}

/// A Rust type a body can return
pub trait IntoValue {
    fn into_value(self) -> Value;
}

macro_rules! value_conversions {
    ($( $rust:ty => $variant:ident ),+ $(,)?) => {
        $(
            impl FromValue for $rust {
                const TYPE: ValueType = ValueType::$variant;

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(RuntimeError::TypeMismatch {
                            expected: ValueType::$variant,
                            found: other.value_type(),
                        }),
                    }
                }
            }

            impl IntoValue for $rust {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )+
    };
}

value_conversions! {
    i64 => Int,
    BigInt => BigInt,
    f64 => Real,
    [f64; 2] => Vec2,
    [f64; 3] => Vec3,
    [f64; 4] => Vec4,
    [[f64; 2]; 2] => Mat2,
    [[f64; 3]; 3] => Mat3,
    [[f64; 4]; 4] => Mat4,
    String => Unit,
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

type PlainFn = dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync;
type StackFn = dyn Fn(&mut RpnStack, Vec<Value>) -> Result<Value> + Send + Sync;

#[derive(Clone)]
enum BodyFn {
    Plain(Arc<PlainFn>),
    /// Receives the live stack, after the arguments were popped
    Stack(Arc<StackFn>),
}

/// A type-erased operator implementation
#[derive(Clone)]
pub struct OpBody {
    signature: TypeSignature,
    call: BodyFn,
}

impl fmt::Debug for OpBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpBody")
            .field("signature", &self.signature)
            .field("stack_ref", &self.is_stack_aware())
            .finish()
    }
}

fn expect_arity(args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(RuntimeError::ArgumentCount {
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn take<A: FromValue>(args: &mut std::vec::IntoIter<Value>, expected: usize) -> Result<A> {
    match args.next() {
        Some(value) => A::from_value(value),
        None => Err(RuntimeError::ArgumentCount { expected, found: 0 }),
    }
}

impl OpBody {
    fn plain(signature: Vec<ValueType>, call: Arc<PlainFn>) -> Self {
        Self {
            signature: TypeSignature::new(signature),
            call: BodyFn::Plain(call),
        }
    }

    fn stack(signature: Vec<ValueType>, call: Arc<StackFn>) -> Self {
        Self {
            signature: TypeSignature::new(signature),
            call: BodyFn::Stack(call),
        }
    }

    pub fn nullary<R, F>(body: F) -> Self
    where
        R: IntoValue,
        F: Fn() -> Result<R> + Send + Sync + 'static,
    {
        Self::plain(
            vec![],
            Arc::new(move |args: Vec<Value>| {
                expect_arity(&args, 0)?;
                body().map(IntoValue::into_value)
            }),
        )
    }

    pub fn unary<A, R, F>(body: F) -> Self
    where
        A: FromValue,
        R: IntoValue,
        F: Fn(A) -> Result<R> + Send + Sync + 'static,
    {
        Self::plain(
            vec![A::TYPE],
            Arc::new(move |args: Vec<Value>| {
                expect_arity(&args, 1)?;
                let mut args = args.into_iter();
                let a = take::<A>(&mut args, 1)?;
                body(a).map(IntoValue::into_value)
            }),
        )
    }

    pub fn binary<A, B, R, F>(body: F) -> Self
    where
        A: FromValue,
        B: FromValue,
        R: IntoValue,
        F: Fn(A, B) -> Result<R> + Send + Sync + 'static,
    {
        Self::plain(
            vec![A::TYPE, B::TYPE],
            Arc::new(move |args: Vec<Value>| {
                expect_arity(&args, 2)?;
                let mut args = args.into_iter();
                let a = take::<A>(&mut args, 2)?;
                let b = take::<B>(&mut args, 2)?;
                body(a, b).map(IntoValue::into_value)
            }),
        )
    }

    pub fn stack_nullary<R, F>(body: F) -> Self
    where
        R: IntoValue,
        F: Fn(&mut RpnStack) -> Result<R> + Send + Sync + 'static,
    {
        Self::stack(
            vec![],
            Arc::new(move |stack: &mut RpnStack, args: Vec<Value>| {
                expect_arity(&args, 0)?;
                body(stack).map(IntoValue::into_value)
            }),
        )
    }

    pub fn stack_unary<A, R, F>(body: F) -> Self
    where
        A: FromValue,
        R: IntoValue,
        F: Fn(&mut RpnStack, A) -> Result<R> + Send + Sync + 'static,
    {
        Self::stack(
            vec![A::TYPE],
            Arc::new(move |stack: &mut RpnStack, args: Vec<Value>| {
                expect_arity(&args, 1)?;
                let mut args = args.into_iter();
                let a = take::<A>(&mut args, 1)?;
                body(stack, a).map(IntoValue::into_value)
            }),
        )
    }

    pub fn signature(&self) -> &TypeSignature {
        &self.signature
    }

    pub fn is_stack_aware(&self) -> bool {
        matches!(self.call, BodyFn::Stack(_))
    }

    /// Run the body on already coerced arguments
    pub fn call(&self, stack: &mut RpnStack, args: Vec<Value>) -> Result<Value> {
        match &self.call {
            BodyFn::Plain(call) => call(args),
            BodyFn::Stack(call) => call(stack, args),
        }
    }

    /// A declaration of `operator` keyed by this body's signature.
    /// Stack-aware bodies are tagged `stack_ref`.
    pub fn declare(self, operator: &str) -> CallDeclaration<OpBody> {
        let stack_aware = self.is_stack_aware();
        let declaration = CallDeclaration::new(operator, self.signature.clone(), self);
        if stack_aware {
            declaration.tag(Tag::StackRef)
        } else {
            declaration
        }
    }
}

impl Implementation for OpBody {
    fn signature(&self) -> Option<&TypeSignature> {
        Some(&self.signature)
    }

    fn stack_aware(&self) -> Option<bool> {
        Some(self.is_stack_aware())
    }
}

type PlainFormat = dyn Fn(&[StackItem]) -> String + Send + Sync;
type StackFormat = dyn Fn(&RpnStack, &[StackItem]) -> String + Send + Sync;

/// Renders the input text of an operator's result from its arguments
#[derive(Clone)]
pub enum OpFormatter {
    Plain(Arc<PlainFormat>),
    /// Also sees the stack as the body left it
    Stack(Arc<StackFormat>),
}

impl fmt::Debug for OpFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpFormatter::Plain(_) => f.write_str("OpFormatter::Plain"),
            OpFormatter::Stack(_) => f.write_str("OpFormatter::Stack"),
        }
    }
}

impl OpFormatter {
    pub fn plain(format: impl Fn(&[StackItem]) -> String + Send + Sync + 'static) -> Self {
        OpFormatter::Plain(Arc::new(format))
    }

    pub fn stack(
        format: impl Fn(&RpnStack, &[StackItem]) -> String + Send + Sync + 'static,
    ) -> Self {
        OpFormatter::Stack(Arc::new(format))
    }

    /// `a + b`, wrapping expression arguments in parentheses
    pub fn infix(symbol: &'static str) -> Self {
        Self::plain(move |items| {
            items
                .iter()
                .map(StackItem::input_formatted)
                .collect::<Vec<_>>()
                .join(&format!(" {symbol} "))
        })
    }

    /// `-a`
    pub fn prefix(symbol: &'static str) -> Self {
        Self::plain(move |items| {
            let operand: String = items.iter().map(StackItem::input_formatted).collect();
            format!("{symbol}{operand}")
        })
    }

    /// `name(a, b)`, or just `name` without arguments
    pub fn call(name: &'static str) -> Self {
        Self::plain(move |items| {
            if items.is_empty() {
                return name.to_string();
            }
            let args: Vec<&str> = items.iter().map(|item| item.input.as_str()).collect();
            format!("{name}({})", args.join(", "))
        })
    }

    pub fn is_stack_aware(&self) -> bool {
        matches!(self, OpFormatter::Stack(_))
    }

    pub fn format(&self, stack: &RpnStack, items: &[StackItem]) -> String {
        match self {
            OpFormatter::Plain(format) => format(items),
            OpFormatter::Stack(format) => format(stack, items),
        }
    }

    /// The formatter declaration of `operator`
    pub fn declare(self, operator: &str, arity: usize) -> FormatterDeclaration<OpFormatter> {
        let stack_aware = self.is_stack_aware();
        let declaration = FormatterDeclaration::new(operator, arity, self);
        if stack_aware {
            declaration.stack_ref()
        } else {
            declaration
        }
    }
}
