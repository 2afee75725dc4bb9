//! Evaluates parsed snippets against a namespace of bindings.

use std::collections::HashMap;

use indexmap::IndexMap;
use stratus_core::snippet::{Expr, Literal, Script};

use crate::normalize::{normalize_as, BoxFuture, Naming};
use crate::value::{BoundMethod, Builtin, Output, ValueMethod};
use crate::ExecutorError;

/// Statement-by-statement evaluator.
///
/// Names resolve against the bindings first and the built-ins second;
/// anything else is a `NameError`.
#[derive(Debug, Default)]
pub struct Interpreter {
    locals: HashMap<String, Output>,
}

impl Interpreter {
    #[must_use]
    pub fn new(namespace: HashMap<String, Output>) -> Self {
        Self { locals: namespace }
    }

    /// Run every statement in order, stopping at the first error.
    ///
    /// # Errors
    /// Returns the first evaluation error; earlier assignments stay bound.
    pub async fn run(&mut self, script: &Script) -> Result<(), ExecutorError> {
        for statement in &script.statements {
            let value = self.eval(&statement.expr).await?;
            if let Some(target) = &statement.target {
                self.locals.insert(target.clone(), value);
            }
        }
        Ok(())
    }

    /// Remove and return a binding.
    pub fn take(&mut self, name: &str) -> Option<Output> {
        self.locals.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Output> {
        self.locals.get(name)
    }

    fn eval<'a>(&'a self, expr: &'a Expr) -> BoxFuture<'a, Result<Output, ExecutorError>> {
        Box::pin(async move {
            match expr {
                Expr::Literal(literal) => Ok(literal_value(literal)),
                Expr::Name(name) => self.lookup(name),
                Expr::Attribute { base, name } => self.eval(base).await?.get_attribute(name),
                Expr::Subscript { base, index } => {
                    let base = self.eval(base).await?;
                    let index = self.eval(index).await?;
                    base.subscript(&index)
                }
                Expr::Call { callee, args, kwargs } => {
                    let callee = self.eval(callee).await?;
                    let mut positional = Vec::with_capacity(args.len());
                    for arg in args {
                        positional.push(self.eval(arg).await?);
                    }
                    let mut keywords = Vec::with_capacity(kwargs.len());
                    for (name, arg) in kwargs {
                        keywords.push((name.clone(), self.eval(arg).await?));
                    }
                    call(callee, positional, keywords).await
                }
                Expr::List(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(self.eval(item).await?);
                    }
                    Ok(Output::List(values))
                }
                Expr::Dict(entries) => {
                    let mut map = IndexMap::with_capacity(entries.len());
                    for (key, value) in entries {
                        let key = self.eval(key).await?.key_string()?;
                        map.insert(key, self.eval(value).await?);
                    }
                    Ok(Output::Map(map))
                }
            }
        })
    }

    fn lookup(&self, name: &str) -> Result<Output, ExecutorError> {
        if let Some(value) = self.locals.get(name) {
            return Ok(value.clone());
        }
        Builtin::lookup(name)
            .map(Output::Builtin)
            .ok_or_else(|| ExecutorError::Name(name.to_owned()))
    }
}

fn literal_value(literal: &Literal) -> Output {
    match literal {
        Literal::None => Output::None,
        Literal::Bool(b) => Output::Bool(*b),
        Literal::Number(n) => Output::Number(n.clone()),
        Literal::Str(s) => Output::Str(s.clone()),
    }
}

async fn call(callee: Output, args: Vec<Output>, kwargs: Vec<(String, Output)>) -> Result<Output, ExecutorError> {
    match callee {
        Output::Method(BoundMethod::Operation { group, spec }) => group.client().invoke(spec, args, kwargs).await,
        Output::Method(BoundMethod::Value { receiver, method }) => call_value_method(*receiver, method, args, kwargs).await,
        Output::Builtin(builtin) => call_builtin(builtin, args, kwargs).await,
        other => Err(ExecutorError::type_error(format!(
            "'{}' object is not callable",
            other.type_name()
        ))),
    }
}

fn reject_keywords(name: &str, kwargs: &[(String, Output)]) -> Result<(), ExecutorError> {
    match kwargs.first() {
        Some((keyword, _)) => Err(ExecutorError::type_error(format!(
            "{name}() got an unexpected keyword argument '{keyword}'"
        ))),
        None => Ok(()),
    }
}

fn arity(name: &str, args: &[Output], min: usize, max: usize) -> Result<(), ExecutorError> {
    let given = args.len();
    if (min..=max).contains(&given) {
        return Ok(());
    }
    let expected = match (min, max) {
        (0, 0) => "no arguments".to_owned(),
        (lo, hi) if lo == hi => format!("exactly {lo} argument{}", if lo == 1 { "" } else { "s" }),
        (_, hi) => format!("at most {hi} argument{}", if hi == 1 { "" } else { "s" }),
    };
    Err(ExecutorError::type_error(format!("{name}() takes {expected} ({given} given)")))
}

async fn call_value_method(
    receiver: Output,
    method: ValueMethod,
    args: Vec<Output>,
    kwargs: Vec<(String, Output)>,
) -> Result<Output, ExecutorError> {
    let name = method.name();
    reject_keywords(name, &kwargs)?;

    match (receiver, method) {
        (Output::Poller(poller), ValueMethod::Result) => {
            arity(name, &args, 0, 0)?;
            poller.result().await
        }
        (Output::Poller(poller), ValueMethod::Wait) => {
            arity(name, &args, 0, 0)?;
            poller.wait().await.map(|()| Output::None)
        }
        (Output::Poller(poller), ValueMethod::Status) => {
            arity(name, &args, 0, 0)?;
            Ok(Output::Str(poller.status().await))
        }
        (Output::Poller(poller), ValueMethod::Done) => {
            arity(name, &args, 0, 0)?;
            Ok(Output::Bool(poller.done().await))
        }
        (model @ Output::Model(_), ValueMethod::AsDict) => {
            arity(name, &args, 0, 0)?;
            Ok(Output::from_plain(normalize_as(model, Naming::Attribute).await?))
        }
        (Output::Map(map), ValueMethod::Get) => {
            arity(name, &args, 1, 2)?;
            let mut args = args.into_iter();
            let key = args.next().map_or(Ok(String::new()), |k| k.key_string())?;
            let default = args.next().unwrap_or(Output::None);
            Ok(map.get(&key).cloned().unwrap_or(default))
        }
        (Output::Map(map), ValueMethod::Keys) => {
            arity(name, &args, 0, 0)?;
            Ok(Output::List(map.into_keys().map(Output::Str).collect()))
        }
        (Output::Map(map), ValueMethod::Values) => {
            arity(name, &args, 0, 0)?;
            Ok(Output::List(map.into_values().collect()))
        }
        (receiver, method) => Err(ExecutorError::attribute(receiver.type_name(), method.name())),
    }
}

async fn call_builtin(builtin: Builtin, args: Vec<Output>, kwargs: Vec<(String, Output)>) -> Result<Output, ExecutorError> {
    let name = builtin.name();
    match builtin {
        Builtin::Len => {
            reject_keywords(name, &kwargs)?;
            arity(name, &args, 1, 1)?;
            let len = match args.first() {
                Some(Output::List(items)) => items.len(),
                Some(Output::Map(map)) => map.len(),
                Some(Output::Str(s)) => s.chars().count(),
                Some(other) => {
                    return Err(ExecutorError::type_error(format!(
                        "object of type '{}' has no len()",
                        other.type_name()
                    )))
                }
                None => 0,
            };
            Ok(Output::Number(len.into()))
        }
        Builtin::List => {
            reject_keywords(name, &kwargs)?;
            arity(name, &args, 0, 1)?;
            match args.into_iter().next() {
                None => Ok(Output::List(Vec::new())),
                Some(Output::List(items)) => Ok(Output::List(items)),
                Some(Output::Map(map)) => Ok(Output::List(map.into_keys().map(Output::Str).collect())),
                Some(Output::Str(s)) => Ok(Output::List(s.chars().map(|c| Output::Str(c.to_string())).collect())),
                Some(Output::Paged(pager)) => Ok(Output::List(pager.collect_items().await?)),
                Some(other) => Err(ExecutorError::type_error(format!(
                    "'{}' object is not iterable",
                    other.type_name()
                ))),
            }
        }
        Builtin::Str => {
            reject_keywords(name, &kwargs)?;
            arity(name, &args, 0, 1)?;
            Ok(Output::Str(args.first().map(Output::to_display).unwrap_or_default()))
        }
        Builtin::Dict => {
            arity(name, &args, 0, 1)?;
            let mut map = match args.into_iter().next() {
                None => IndexMap::new(),
                Some(Output::Map(map)) => map,
                Some(model @ Output::Model(_)) => match Output::from_plain(normalize_as(model, Naming::Attribute).await?) {
                    Output::Map(map) => map,
                    _ => IndexMap::new(),
                },
                Some(other) => {
                    return Err(ExecutorError::type_error(format!(
                        "'{}' object is not iterable",
                        other.type_name()
                    )))
                }
            };
            map.extend(kwargs);
            Ok(Output::Map(map))
        }
        Builtin::Print => {
            reject_keywords(name, &kwargs)?;
            let line = args.iter().map(Output::to_display).collect::<Vec<_>>().join(" ");
            tracing::info!(output = %line, "snippet print");
            Ok(Output::None)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stratus_core::snippet::parse;

    use super::*;
    use crate::normalize::normalize;

    async fn run(source: &str) -> Result<Interpreter, ExecutorError> {
        let script = parse(source)?;
        let mut interpreter = Interpreter::default();
        interpreter.run(&script).await?;
        Ok(interpreter)
    }

    async fn result_of(source: &str) -> serde_json::Value {
        let mut interpreter = match run(source).await {
            Ok(i) => i,
            Err(e) => panic!("{source:?} failed: {e}"),
        };
        let Some(result) = interpreter.take("result") else {
            panic!("{source:?} bound no result");
        };
        match normalize(result).await {
            Ok(v) => v,
            Err(e) => panic!("normalize failed: {e}"),
        }
    }

    async fn error_of(source: &str) -> String {
        match run(source).await {
            Err(e) => e.to_string(),
            Ok(_) => panic!("{source:?} should fail"),
        }
    }

    #[tokio::test]
    async fn evaluates_literals_and_containers() {
        assert_eq!(
            result_of("xs = [1, 'two', None]\nresult = {'xs': xs, 'n': len(xs), 'last': xs[-1]}").await,
            json!({"xs": [1, "two", null], "n": 3, "last": null})
        );
    }

    #[tokio::test]
    async fn mapping_methods_work() {
        assert_eq!(
            result_of("d = {'a': 1}; result = [d.get('a'), d.get('b', 'fallback'), d.keys(), d.values()]").await,
            json!([1, "fallback", ["a"], [1]])
        );
    }

    #[tokio::test]
    async fn builtins_convert_values() {
        assert_eq!(
            result_of("result = [str(5), str(None), list('ab'), dict(a=1), dict({'b': 2}, c=3)]").await,
            json!(["5", "None", ["a", "b"], {"a": 1}, {"b": 2, "c": 3}])
        );
    }

    #[tokio::test]
    async fn print_returns_none() {
        assert_eq!(result_of("result = print('hello', 1)").await, json!(null));
    }

    #[tokio::test]
    async fn undefined_names_raise_name_error() {
        assert_eq!(error_of("result = missing_client.list()").await, "name 'missing_client' is not defined");
    }

    #[tokio::test]
    async fn bindings_shadow_builtins() {
        assert_eq!(result_of("len = 3\nresult = len").await, json!(3));
    }

    #[tokio::test]
    async fn calling_data_is_a_type_error() {
        assert_eq!(error_of("x = 1\nresult = x()").await, "'int' object is not callable");
        assert_eq!(error_of("result = len(1)").await, "object of type 'int' has no len()");
        assert_eq!(error_of("result = len()").await, "len() takes exactly 1 argument (0 given)");
    }

    #[tokio::test]
    async fn syntax_errors_surface_from_run() {
        let err = error_of("result = (").await;
        assert!(err.starts_with("invalid syntax"), "got {err}");
    }

    #[tokio::test]
    async fn statements_after_a_failure_do_not_run() {
        let script = match parse("a = 1\nb = nope\nc = 3") {
            Ok(s) => s,
            Err(e) => panic!("parse failed: {e}"),
        };
        let mut interpreter = Interpreter::default();
        assert!(interpreter.run(&script).await.is_err());
        assert!(interpreter.get("a").is_some());
        assert!(interpreter.get("c").is_none());
    }
}
