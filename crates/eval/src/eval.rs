//! Expression evaluator.
//!
//! Evaluates a [`RawExpr`] against a [`Scope`]. Lambdas become closures that
//! hold the scope by reference. Procedures marked tail-recursive run as a
//! trampoline: a self call in tail position returns [`Bounce::Again`]
//! instead of growing the stack.
//!
//! Every closure call counts against a per-thread depth limit, so runaway
//! recursion fails with [`EvalError::RecursionLimit`] instead of
//! exhausting the native stack.

use std::cell::Cell;
use std::rc::Rc;

use lambdascript_core::{RawExpr, RawLiteral};

use crate::config::DEFAULT_RECURSION_LIMIT;
use crate::curry;
use crate::frame::Scope;
use crate::numeric;
use crate::types::{Closure, EvalError, Procedure, Value};

thread_local! {
    static CALL_DEPTH: Cell<usize> = const { Cell::new(0) };
    static CALL_LIMIT: Cell<usize> = const { Cell::new(DEFAULT_RECURSION_LIMIT) };
}

/// Run `f` with the call depth limited to `limit`, restoring the previous
/// limit afterwards.
pub fn with_recursion_limit<T>(limit: usize, f: impl FnOnce() -> T) -> T {
    struct Restore(usize);
    impl Drop for Restore {
        fn drop(&mut self) {
            CALL_LIMIT.with(|l| l.set(self.0));
        }
    }
    let _restore = Restore(CALL_LIMIT.with(|l| l.replace(limit)));
    f()
}

/// One active closure call. Dropping it releases the depth it holds.
struct CallFrame;

impl CallFrame {
    fn enter() -> Result<CallFrame, EvalError> {
        let limit = CALL_LIMIT.with(Cell::get);
        CALL_DEPTH.with(|depth| {
            if depth.get() >= limit {
                return Err(EvalError::RecursionLimit { limit });
            }
            depth.set(depth.get() + 1);
            Ok(CallFrame)
        })
    }
}

impl Drop for CallFrame {
    fn drop(&mut self) {
        CALL_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Evaluate `expr` in `scope`.
pub fn eval(expr: &RawExpr, scope: &Rc<Scope>) -> Result<Value, EvalError> {
    match expr {
        RawExpr::Literal(lit) => Ok(literal(lit)),

        RawExpr::Name { name, .. } => scope.lookup(name),

        RawExpr::List(items) => Ok(Value::list(eval_all(items, scope)?)),

        RawExpr::Tuple(items) => Ok(Value::tuple(eval_all(items, scope)?)),

        RawExpr::Lambda { params, body, .. } => Ok(Value::Proc(Rc::new(Procedure::Closure(
            Closure {
                name: None,
                params: params.clone(),
                body: Rc::clone(body),
                scope: Rc::clone(scope),
                tail_self: None,
            },
        )))),

        RawExpr::Call { callee, args, .. } => {
            let f = eval(callee, scope)?;
            let args = eval_all(args, scope)?;
            apply(&f, args)
        }

        RawExpr::Index { target, index, .. } => {
            let target = eval(target, scope)?;
            let index = eval(index, scope)?;
            numeric::index(&target, &index)
        }

        RawExpr::Unary { op, operand } => numeric::unary(*op, &eval(operand, scope)?),

        RawExpr::Binary {
            op, left, right, ..
        } => {
            let l = eval(left, scope)?;
            let r = eval(right, scope)?;
            numeric::binary(*op, &l, &r)
        }

        // and/or short-circuit and yield the deciding operand
        RawExpr::And(left, right) => {
            let l = eval(left, scope)?;
            if l.truthy() {
                eval(right, scope)
            } else {
                Ok(l)
            }
        }
        RawExpr::Or(left, right) => {
            let l = eval(left, scope)?;
            if l.truthy() {
                Ok(l)
            } else {
                eval(right, scope)
            }
        }

        RawExpr::IfElse {
            cond,
            then,
            otherwise,
        } => {
            if eval(cond, scope)?.truthy() {
                eval(then, scope)
            } else {
                eval(otherwise, scope)
            }
        }
    }
}

fn literal(lit: &RawLiteral) -> Value {
    match lit {
        RawLiteral::None => Value::None,
        RawLiteral::Bool(b) => Value::Bool(*b),
        RawLiteral::Int(i) => Value::Int(*i),
        RawLiteral::Float(f) => Value::Float(*f),
        RawLiteral::Str(s) => Value::str(s),
    }
}

fn eval_all(exprs: &[RawExpr], scope: &Rc<Scope>) -> Result<Vec<Value>, EvalError> {
    exprs.iter().map(|e| eval(e, scope)).collect()
}

/// Call `callee` with `args`.
pub fn apply(callee: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
    match callee {
        Value::Proc(p) => call(p, args),
        other => Err(EvalError::NotCallable {
            type_name: other.type_name().to_owned(),
        }),
    }
}

pub(crate) fn call(proc: &Rc<Procedure>, args: Vec<Value>) -> Result<Value, EvalError> {
    match &**proc {
        Procedure::Closure(c) => {
            check_arity(c, args.len())?;
            let _frame = CallFrame::enter()?;
            match &c.tail_self {
                Some(self_name) => trampoline(c, self_name, args),
                None => eval(&c.body, &Scope::bind(&c.params, args, &c.scope)),
            }
        }
        Procedure::Builtin(b) => {
            if !b.arity.accepts(args.len()) {
                return Err(EvalError::Arity {
                    callee: b.name.to_owned(),
                    expected: b.arity.to_string(),
                    got: args.len(),
                });
            }
            (b.func)(&args)
        }
        Procedure::Curried {
            target,
            arity,
            collected,
        } => curry::feed(target, *arity, collected, args),
    }
}

fn check_arity(c: &Closure, got: usize) -> Result<(), EvalError> {
    if got == c.params.len() {
        return Ok(());
    }
    Err(EvalError::Arity {
        callee: c.name.clone().unwrap_or_else(|| "<lambda>".to_owned()),
        expected: c.params.len().to_string(),
        got,
    })
}

/// Outcome of evaluating a body in tail position.
pub(crate) enum Bounce {
    Done(Value),
    /// Tail self call: run the body again with these arguments
    Again(Vec<Value>),
}

fn trampoline(c: &Closure, self_name: &str, mut args: Vec<Value>) -> Result<Value, EvalError> {
    loop {
        let frame = Scope::bind(&c.params, args, &c.scope);
        match eval_tail(&c.body, &frame, self_name)? {
            Bounce::Done(v) => return Ok(v),
            Bounce::Again(next) => args = next,
        }
    }
}

fn eval_tail(expr: &RawExpr, scope: &Rc<Scope>, self_name: &str) -> Result<Bounce, EvalError> {
    match expr {
        RawExpr::IfElse {
            cond,
            then,
            otherwise,
        } => {
            if eval(cond, scope)?.truthy() {
                eval_tail(then, scope, self_name)
            } else {
                eval_tail(otherwise, scope, self_name)
            }
        }
        RawExpr::Call { callee, args, .. }
            if matches!(&**callee, RawExpr::Name { name, .. } if name == self_name) =>
        {
            let args = eval_all(args, scope)?;
            let target = scope.lookup(self_name)?;
            // A self call with any other argument count keeps its normal
            // meaning (a partial application or an arity error).
            if is_full_self_call(&target, args.len()) {
                Ok(Bounce::Again(args))
            } else {
                apply(&target, args).map(Bounce::Done)
            }
        }
        other => eval(other, scope).map(Bounce::Done),
    }
}

fn is_full_self_call(target: &Value, argc: usize) -> bool {
    match target {
        Value::Proc(p) => match &**p {
            Procedure::Closure(c) => c.params.len() == argc,
            Procedure::Curried { arity, collected, .. } => {
                collected.is_empty() && *arity == argc
            }
            Procedure::Builtin(_) => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Environment;
    use lambdascript_core::parse_expression;

    fn run(src: &str) -> Result<Value, EvalError> {
        let env = Environment::new();
        let scope = Scope::declare(std::iter::empty(), None, &env);
        eval(&parse_expression(src).unwrap(), &scope)
    }

    #[test]
    fn arithmetic_and_precedence() {
        assert_eq!(run("1 + 2 * 3 ** 2"), Ok(Value::Int(19)));
        assert_eq!(run("-2 ** 2"), Ok(Value::Int(-4)));
        assert_eq!(run("(1 + 2) * 3"), Ok(Value::Int(9)));
        assert_eq!(run("7 // 2 + 7 % 2"), Ok(Value::Int(4)));
    }

    #[test]
    fn boolean_operators_return_the_deciding_operand() {
        assert_eq!(run("0 or 5"), Ok(Value::Int(5)));
        assert_eq!(run("[] and 1"), Ok(Value::list(vec![])));
        assert_eq!(run("not 0"), Ok(Value::Bool(true)));
        // right side never evaluated
        assert_eq!(run("False and undefined_name"), Ok(Value::Bool(false)));
    }

    #[test]
    fn conditional_expression() {
        assert_eq!(run("'a' if 1 < 2 else 'b'"), Ok(Value::str("a")));
        assert_eq!(run("'a' if 1 > 2 else 'b'"), Ok(Value::str("b")));
    }

    #[test]
    fn lambdas_close_over_their_scope() {
        assert_eq!(run("(lambda x: lambda y: x - y)(10)(3)"), Ok(Value::Int(7)));
        assert_eq!(run("(lambda: 42)()"), Ok(Value::Int(42)));
    }

    #[test]
    fn call_errors() {
        assert!(matches!(
            run("(lambda x: x)(1, 2)"),
            Err(EvalError::Arity { got: 2, .. })
        ));
        assert!(matches!(run("3(1)"), Err(EvalError::NotCallable { .. })));
        assert!(matches!(
            run("missing + 1"),
            Err(EvalError::UnboundName { .. })
        ));
    }

    #[test]
    fn runaway_recursion_is_an_error() {
        // The Y combinator keeps the recursion out of any binding
        let src = "(lambda f: f(f, 0))(lambda g, n: 1 + g(g, n + 1))";
        assert_eq!(
            with_recursion_limit(50, || run(src)),
            Err(EvalError::RecursionLimit { limit: 50 })
        );
        assert_eq!(CALL_DEPTH.with(Cell::get), 0);
        assert_eq!(CALL_LIMIT.with(Cell::get), DEFAULT_RECURSION_LIMIT);
    }

    #[test]
    fn recursion_below_the_limit_succeeds() {
        let src = "(lambda f: f(f, 30))(lambda g, n: 0 if n == 0 else 1 + g(g, n - 1))";
        assert_eq!(with_recursion_limit(32, || run(src)), Ok(Value::Int(30)));
        assert_eq!(
            with_recursion_limit(31, || run(src)),
            Err(EvalError::RecursionLimit { limit: 31 })
        );
    }

    #[test]
    fn collections_and_indexing() {
        assert_eq!(run("[1, 2, 3][-1]"), Ok(Value::Int(3)));
        assert_eq!(
            run("(1, 'a')"),
            Ok(Value::tuple(vec![Value::Int(1), Value::str("a")]))
        );
        assert_eq!(run("(5)"), Ok(Value::Int(5)));
    }
}
