use std::collections::HashMap;
use std::rc::Rc;

use crate::builtins;
use crate::value::Value;

/// The single flat global environment. There is no lexical scoping, so
/// a plain map from name to value is the whole story.
pub struct Environment {
    store: HashMap<Rc<str>, Rc<Value>>,
}

impl Environment {
    pub fn new() -> Self {
        let mut store = HashMap::new();
        for builtin in builtins::all() {
            store.insert(
                Rc::from(builtin.name),
                Rc::new(Value::Procedure(*builtin)),
            );
        }
        Environment { store }
    }

    pub fn get(&self, name: &str) -> Option<Rc<Value>> {
        self.store.get(name).cloned()
    }

    pub fn set(&mut self, name: Rc<str>, value: Rc<Value>) {
        self.store.insert(name, value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}
