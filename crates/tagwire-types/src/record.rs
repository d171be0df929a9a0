//! Schema-validated field containers.
//!
//! A [`Record`] owns the values of one message instance. Every mutation is
//! checked against the record's schema (field exists, cardinality agrees,
//! value kind matches), which is what lets the encoder run infallibly: a
//! record that exists is a record that encodes.

use std::collections::BTreeMap;
use std::sync::Arc;

use tagwire_error::{Result, WireError};

use crate::schema::{FieldDescriptor, Label, MessageSchema};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Single(Value),
    Repeated(Vec<Value>),
}

/// One message instance: a schema handle plus the fields currently set.
///
/// Field presence is explicit. A singular field set to zero is present and
/// encodes; an unset field does not. Keys are held in a `BTreeMap` so field
/// iteration is ordered by number in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: Arc<MessageSchema>,
    fields: BTreeMap<u32, FieldValue>,
}

impl Record {
    /// Create an empty record of the given schema.
    pub fn new(schema: Arc<MessageSchema>) -> Self {
        Self {
            schema,
            fields: BTreeMap::new(),
        }
    }

    /// The schema this record is typed by.
    #[inline]
    pub fn schema(&self) -> &Arc<MessageSchema> {
        &self.schema
    }

    /// Set a singular field, overwriting any previous value.
    ///
    /// Fails with [`WireError::UnknownField`] for numbers the schema does
    /// not declare, [`WireError::NotSingular`] for repeated fields, and
    /// [`WireError::KindMismatch`] when the value's kind disagrees with the
    /// declaration.
    pub fn set(&mut self, number: u32, value: Value) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let desc = self.lookup(&schema, number)?;
        if desc.label() == Label::Repeated {
            return Err(WireError::NotSingular {
                field: desc.name().to_owned(),
            });
        }
        Self::check_kind(desc, &value)?;
        self.fields.insert(number, FieldValue::Single(value));
        Ok(())
    }

    /// Append an occurrence to a repeated field.
    ///
    /// Fails with [`WireError::UnknownField`], [`WireError::NotRepeated`]
    /// for singular fields, or [`WireError::KindMismatch`].
    pub fn push(&mut self, number: u32, value: Value) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let desc = self.lookup(&schema, number)?;
        if desc.label() == Label::Singular {
            return Err(WireError::NotRepeated {
                field: desc.name().to_owned(),
            });
        }
        Self::check_kind(desc, &value)?;
        match self
            .fields
            .entry(number)
            .or_insert_with(|| FieldValue::Repeated(Vec::new()))
        {
            FieldValue::Repeated(values) => values.push(value),
            // `set` refuses repeated fields, so a singular slot cannot
            // exist under a repeated number.
            FieldValue::Single(_) => unreachable!("repeated field stored as singular"),
        }
        Ok(())
    }

    /// Get a singular field's value. Returns `None` for unset and for
    /// repeated fields (use [`get_repeated`](Self::get_repeated)).
    pub fn get(&self, number: u32) -> Option<&Value> {
        match self.fields.get(&number) {
            Some(FieldValue::Single(value)) => Some(value),
            _ => None,
        }
    }

    /// Get a repeated field's occurrences in insertion order. Empty for
    /// unset and for singular fields.
    pub fn get_repeated(&self, number: u32) -> &[Value] {
        match self.fields.get(&number) {
            Some(FieldValue::Repeated(values)) => values,
            _ => &[],
        }
    }

    /// All occurrences of a field, singular or repeated: a one-element
    /// slice for a set singular field, every occurrence for a repeated one,
    /// empty when unset.
    pub fn values(&self, number: u32) -> &[Value] {
        match self.fields.get(&number) {
            Some(FieldValue::Single(value)) => std::slice::from_ref(value),
            Some(FieldValue::Repeated(values)) => values,
            None => &[],
        }
    }

    /// Whether the field is set (singular) or has at least one occurrence
    /// (repeated).
    pub fn has(&self, number: u32) -> bool {
        match self.fields.get(&number) {
            Some(FieldValue::Single(_)) => true,
            Some(FieldValue::Repeated(values)) => !values.is_empty(),
            None => false,
        }
    }

    /// Unset a field. Returns whether anything was removed.
    pub fn clear(&mut self, number: u32) -> bool {
        self.fields.remove(&number).is_some()
    }

    /// Numbers of the fields currently set, ascending.
    pub fn field_numbers(&self) -> impl DoubleEndedIterator<Item = u32> + '_ {
        self.fields.keys().copied()
    }

    /// Set fields paired with their descriptors, ascending by field number.
    /// Each item carries every occurrence of the field, in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&FieldDescriptor, &[Value])> {
        self.fields.iter().filter_map(|(number, slot)| {
            let values = match slot {
                FieldValue::Single(value) => std::slice::from_ref(value),
                FieldValue::Repeated(values) => values.as_slice(),
            };
            self.schema.field(*number).map(|descriptor| (descriptor, values))
        })
    }

    /// Number of distinct fields set.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn lookup<'s>(&self, schema: &'s MessageSchema, number: u32) -> Result<&'s FieldDescriptor> {
        schema
            .field(number)
            .ok_or_else(|| WireError::unknown_field(schema.name(), number))
    }

    fn check_kind(desc: &FieldDescriptor, value: &Value) -> Result<()> {
        if desc.kind().matches(value) {
            return Ok(());
        }
        Err(WireError::KindMismatch {
            field: desc.name().to_owned(),
            expected: desc.kind().describe(),
            found: value.describe(),
        })
    }
}
