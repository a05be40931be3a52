//! Static table from invocation target to hub method.
//!
//! The table is built once at startup and never mutated, so lookups need no
//! synchronisation.

use std::{collections::HashMap, sync::Arc};

use futures_util::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

use crate::{
    domain::{Connection, HubRepository},
    usecase::RoomError,
};

/// What a hub method can see while it runs
pub struct InvocationContext {
    pub connection: Arc<Connection>,
    pub repository: Arc<dyn HubRepository>,
}

/// Failure of a single invocation.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The client sent an argument of the wrong type (protocol violation)
    #[error("argument {index} of '{target}' must be a string")]
    InvalidArgument { target: &'static str, index: usize },

    /// The method rejected the request; the connection stays open
    #[error(transparent)]
    Room(#[from] RoomError),
}

pub type InvocationResult = Result<Option<Value>, InvocationError>;

pub type HandlerFn = for<'a> fn(&'a InvocationContext, HubArguments) -> BoxFuture<'a, InvocationResult>;

pub struct HubMethod {
    pub name: &'static str,
    pub arity: usize,
    pub handler: HandlerFn,
}

/// Positional arguments of one invocation, arity already checked.
#[derive(Debug)]
pub struct HubArguments {
    target: &'static str,
    values: Vec<Value>,
}

impl HubArguments {
    pub fn new(target: &'static str, values: Vec<Value>) -> Self {
        Self { target, values }
    }

    /// The argument at `index`, which must be a JSON string.
    pub fn string(&self, index: usize) -> Result<&str, InvocationError> {
        self.values
            .get(index)
            .and_then(Value::as_str)
            .ok_or(InvocationError::InvalidArgument {
                target: self.target,
                index,
            })
    }
}

#[derive(Default)]
pub struct DispatchTable {
    methods: HashMap<&'static str, HubMethod>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hub method.
    ///
    /// # Panics
    ///
    /// If `name` is already registered.
    pub fn register(&mut self, name: &'static str, arity: usize, handler: HandlerFn) {
        let previous = self.methods.insert(
            name,
            HubMethod {
                name,
                arity,
                handler,
            },
        );
        assert!(
            previous.is_none(),
            "hub method '{name}' is registered twice"
        );
    }

    pub fn lookup(&self, target: &str) -> Option<&HubMethod> {
        self.methods.get(target)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo<'a>(_context: &'a InvocationContext, arguments: HubArguments) -> BoxFuture<'a, InvocationResult> {
        Box::pin(async move { Ok(Some(Value::from(arguments.string(0)?))) })
    }

    #[test]
    fn test_lookup_registered_method() {
        // テスト項目: 登録したメソッドを名前で引ける
        // given (前提条件):
        let mut table = DispatchTable::new();
        table.register("Echo", 1, echo);

        // when (操作):
        let method = table.lookup("Echo");

        // then (期待する結果):
        let method = method.unwrap();
        assert_eq!(method.name, "Echo");
        assert_eq!(method.arity, 1);
        assert!(table.lookup("echo").is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        // テスト項目: 同じ名前の二重登録は起動時に panic する
        let mut table = DispatchTable::new();
        table.register("Echo", 1, echo);
        table.register("Echo", 2, echo);
    }

    #[test]
    fn test_arguments_must_be_strings() {
        // テスト項目: 文字列以外の引数は InvalidArgument になる
        let arguments = HubArguments::new("Echo", vec![json!("ok"), json!(42)]);

        assert_eq!(arguments.string(0).unwrap(), "ok");
        assert!(matches!(
            arguments.string(1),
            Err(InvocationError::InvalidArgument {
                target: "Echo",
                index: 1
            })
        ));
        assert!(arguments.string(2).is_err());
    }
}
