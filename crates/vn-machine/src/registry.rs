use crate::context::Context;
use crate::error::MachineError;
use std::collections::HashMap;
use vn_bytecode::{DecodedValue, FromParams, OpcodeKey, ParameterList, TypeDescriptor};
use vn_core::{Error, Result};

pub type Handler = Box<dyn Fn(&mut Context<'_>, Vec<DecodedValue>) -> Result<()>>;

pub struct OpcodeEntry {
    pub name: &'static str,
    pub params: ParameterList,
    handler: Handler,
}

impl OpcodeEntry {
    pub fn call(&self, ctx: &mut Context<'_>, values: Vec<DecodedValue>) -> Result<()> {
        (self.handler)(ctx, values)
    }
}

impl std::fmt::Debug for OpcodeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpcodeEntry")
            .field("name", &self.name)
            .field("params", &self.params.describe())
            .finish()
    }
}

/// `(module, opcode, overload)` to parameter signature plus handler.
#[derive(Debug, Default)]
pub struct OpcodeRegistry {
    entries: HashMap<OpcodeKey, OpcodeEntry>,
}

impl OpcodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler whose arguments are extracted from the decoded
    /// values as `P`, e.g. `(Rect, i32)`.
    pub fn register<P, F>(
        &mut self,
        key: OpcodeKey,
        name: &'static str,
        shape: &[&'static TypeDescriptor],
        handler: F,
    ) -> std::result::Result<(), MachineError>
    where
        P: FromParams + 'static,
        F: Fn(&mut Context<'_>, P) -> Result<()> + 'static,
    {
        if let Some(existing) = self.entries.get(&key) {
            return Err(MachineError::registry(format!(
                "{} already registered as {}",
                key, existing.name
            )));
        }
        let params = ParameterList::new(shape)
            .map_err(|err| MachineError::registry(format!("{} ({}): {}", name, key, err)))?;
        let handler: Handler = Box::new(
            move |ctx: &mut Context<'_>, values: Vec<DecodedValue>| {
                handler(ctx, P::from_params(values)?)
            },
        );
        self.entries.insert(
            key,
            OpcodeEntry {
                name,
                params,
                handler,
            },
        );
        Ok(())
    }

    pub fn get(&self, key: OpcodeKey) -> Option<&OpcodeEntry> {
        self.entries.get(&key)
    }

    pub fn lookup(&self, key: OpcodeKey) -> Result<&OpcodeEntry> {
        self.entries.get(&key).ok_or(Error::UnknownOpcode {
            module: key.module,
            opcode: key.opcode,
            overload: key.overload,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered entries sorted by key.
    pub fn entries(&self) -> Vec<(OpcodeKey, &OpcodeEntry)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(key, entry)| (*key, entry)).collect();
        entries.sort_by_key(|(key, _)| *key);
        entries
    }
}
