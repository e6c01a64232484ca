//! Jinja-compatible rendering with `minijinja`.

use std::collections::BTreeMap;

use minijinja::value::{Kwargs, Value};
use minijinja::{Environment, ErrorKind, UndefinedBehavior};

use super::{RenderContext, RenderError, TemplateEngine};
use crate::aggregate::{AggregatedNamespace, NamespaceEntry};
use crate::devicetree::{AddressError, AddressResolver, RegisterNode};

/// Template engine backed by `minijinja`.
///
/// Undefined variables render as empty, as in Jinja2, unless
/// [`strict`](Self::strict) is set.
#[derive(Debug, Clone, Default)]
pub struct MiniJinjaEngine {
    strict: bool,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes any use of an undefined variable a render error.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(if self.strict {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });

        let ctx = namespace_value(context.namespace());
        Ok(env.render_str(template, ctx)?)
    }
}

fn namespace_value(namespace: &AggregatedNamespace) -> Value {
    let map: BTreeMap<String, Value> = namespace
        .iter()
        .map(|(key, entry)| (key.to_string(), entry_value(entry)))
        .collect();
    Value::from(map)
}

fn entry_value(entry: &NamespaceEntry) -> Value {
    match entry {
        NamespaceEntry::Target(record) => Value::from_serialize(record),
        NamespaceEntry::AddressResolver(resolver) => resolver_function(*resolver),
        NamespaceEntry::Value(value) => Value::from(value.as_str()),
    }
}

/// `get_absolute_address(node, use_offset=true)`
fn resolver_function(resolver: AddressResolver) -> Value {
    Value::from_function(
        move |node: Value, use_offset: Option<bool>, kwargs: Kwargs| -> Result<Value, minijinja::Error> {
            let use_offset = match use_offset {
                Some(flag) => flag,
                None => kwargs.get::<Option<bool>>("use_offset")?.unwrap_or(true),
            };
            kwargs.assert_all_used()?;

            resolver
                .resolve(&node, use_offset)
                .map(Value::from)
                .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))
        },
    )
}

impl RegisterNode for Value {
    fn first_register_address(&self) -> Result<u64, AddressError> {
        let regs = self.get_attr("regs").map_err(|_| AddressError::NoRegisters)?;
        if regs.is_undefined() || regs.is_none() {
            return Err(AddressError::NoRegisters);
        }

        let first = regs
            .get_item_by_index(0)
            .map_err(|_| AddressError::NoRegisters)?;
        if first.is_undefined() {
            return Err(AddressError::NoRegisters);
        }

        let addr = first
            .get_attr("addr")
            .map_err(|_| AddressError::InvalidAddress)?;
        u64::try_from(addr).map_err(|_| AddressError::InvalidAddress)
    }

    fn parent(&self) -> Option<Self> {
        self.get_attr("parent")
            .ok()
            .filter(|p| !p.is_undefined() && !p.is_none())
    }
}
