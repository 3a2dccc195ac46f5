use crate::descriptor::TypeDescriptor;
use crate::expr::{Expression, LiveState};
use crate::token::TokenStream;
use crate::value::DecodedValue;
use itertools::Itertools;
use vn_core::{malformed_bail, Error, Result};

/// Ordered sequence of descriptors forming one opcode's parameter signature.
///
/// Only the last descriptor may be variadic, and defaulted descriptors may
/// only be followed by other defaulted ones.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterList {
    shape: Vec<&'static TypeDescriptor>,
}

/// Expressions for a whole parameter list, produced without touching live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedParameters {
    pub pieces: Vec<Expression>,
    /// Raw tokens consumed from the stream.
    pub consumed: usize,
}

impl ParameterList {
    pub fn new(shape: &[&'static TypeDescriptor]) -> Result<Self> {
        let mut defaulted: Option<usize> = None;
        for (position, descriptor) in shape.iter().enumerate() {
            match (descriptor, defaulted) {
                (TypeDescriptor::DefaultInt(_), None) => defaulted = Some(position),
                (TypeDescriptor::DefaultInt(_), Some(_)) => {}
                (_, Some(first)) => malformed_bail!(
                    "required parameter {} at position {} follows defaulted parameter at position {}",
                    descriptor.name(),
                    position,
                    first
                ),
                (_, None) => {}
            }
            if let TypeDescriptor::Argc(inner) = descriptor {
                if position + 1 != shape.len() {
                    malformed_bail!(
                        "variadic parameter {} must be last, found at position {} of {}",
                        descriptor.name(),
                        position,
                        shape.len()
                    );
                }
                if inner.is_complex() {
                    malformed_bail!("nested variadic parameter {}", descriptor.name());
                }
            }
        }
        Ok(Self {
            shape: shape.to_vec(),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn shape(&self) -> &[&'static TypeDescriptor] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Human-readable signature such as `(int, rect_grp, str...)`.
    pub fn describe(&self) -> String {
        format!("({})", self.shape.iter().map(|d| d.name()).join(", "))
    }

    pub fn parse(&self, stream: &mut TokenStream<'_>) -> Result<ParsedParameters> {
        let start = stream.consumed();
        let mut pieces = Vec::new();
        for descriptor in &self.shape {
            descriptor.parse(stream, &mut pieces)?;
        }
        Ok(ParsedParameters {
            pieces,
            consumed: stream.consumed() - start,
        })
    }

    pub fn evaluate(
        &self,
        parsed: &ParsedParameters,
        state: &dyn LiveState,
    ) -> Result<Vec<DecodedValue>> {
        let mut cursor = 0;
        let mut values = Vec::with_capacity(self.shape.len());
        for descriptor in &self.shape {
            values.push(descriptor.evaluate(&parsed.pieces, &mut cursor, state)?);
        }
        if cursor != parsed.pieces.len() {
            return Err(Error::malformed(format!(
                "parameter list {} left {} parsed pieces unused",
                self.describe(),
                parsed.pieces.len() - cursor
            )));
        }
        Ok(values)
    }

    /// Decode every parameter, or none: a failure anywhere yields no values.
    pub fn decode(
        &self,
        stream: &mut TokenStream<'_>,
        state: &dyn LiveState,
    ) -> Result<Vec<DecodedValue>> {
        let parsed = self.parse(stream)?;
        self.evaluate(&parsed, state)
    }
}
