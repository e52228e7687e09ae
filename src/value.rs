//! Dynamically typed values and heterogeneous records.
//!
//! [`SpecType`] outputs are statically typed. [`Packed`] mixes types, so its
//! members go through the object-safe [`DynSpecType`] and produce [`Value`]s.

use crate::bits::Bits;
use crate::cursor::BitCursor;
use crate::error::{Error, Result};
use crate::source::BufferSource;
use crate::spec_type::SpecType;

/// A decoded value of any built-in type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(u64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    Bits(Bits),
    List(Vec<Value>),
    /// Named members in declaration order.
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Looks up a member of a [`Value::Record`] by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Conversion of a [`SpecType::Output`] into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for u64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for Bits {
    fn into_value(self) -> Value {
        Value::Bits(self)
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

/// Object-safe view of a [`SpecType`] that yields [`Value`]s.
///
/// Implemented for every spec type whose output converts into a value.
pub trait DynSpecType {
    fn dyn_bit_length(&self) -> usize;

    fn parse_value(&self, bits: &Bits) -> Result<Value>;

    fn dyn_type_name(&self) -> &'static str;
}

impl<T> DynSpecType for T
where
    T: SpecType,
    T::Output: IntoValue,
{
    fn dyn_bit_length(&self) -> usize {
        self.bit_length()
    }

    fn parse_value(&self, bits: &Bits) -> Result<Value> {
        self.parse(bits).map(IntoValue::into_value)
    }

    fn dyn_type_name(&self) -> &'static str {
        self.type_name()
    }
}

/// A sequence of differently typed fields decoded back to back.
///
/// Unnamed members produce a [`Value::List`], named ones a
/// [`Value::Record`].
pub struct Packed {
    members: Vec<Box<dyn DynSpecType>>,
    names: Option<Vec<String>>,
}

impl Packed {
    /// Packs unnamed members.
    pub fn new(members: Vec<Box<dyn DynSpecType>>) -> Self {
        Self {
            members,
            names: None,
        }
    }

    /// Packs named members, kept in the given order.
    pub fn named<I, N>(members: I) -> Self
    where
        I: IntoIterator<Item = (N, Box<dyn DynSpecType>)>,
        N: Into<String>,
    {
        let (names, members): (Vec<String>, Vec<_>) = members
            .into_iter()
            .map(|(name, member)| (name.into(), member))
            .unzip();

        Self {
            members,
            names: Some(names),
        }
    }

    /// Attaches names to an existing member list.
    pub fn with_names<N: Into<String>>(
        members: Vec<Box<dyn DynSpecType>>,
        names: Vec<N>,
    ) -> Result<Self> {
        if members.len() != names.len() {
            return Err(Error::invalid_spec_type(
                "Packed",
                format!(
                    "{} members but {} names",
                    members.len(),
                    names.len()
                ),
            ));
        }

        Ok(Self {
            members,
            names: Some(names.into_iter().map(Into::into).collect()),
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl SpecType for Packed {
    type Output = Value;

    fn bit_length(&self) -> usize {
        self.members
            .iter()
            .fold(0usize, |total, m| total.saturating_add(m.dyn_bit_length()))
    }

    fn parse(&self, bits: &Bits) -> Result<Value> {
        let mut cursor = BitCursor::new(BufferSource::new(bits.as_packed()));
        let mut values = Vec::with_capacity(self.members.len());

        for member in &self.members {
            let start = cursor.bit_offset();
            let raw = cursor.extract(member.dyn_bit_length())?;
            let value = member.parse_value(&raw).map_err(|e| e.offset_by(start))?;
            values.push(value);
        }

        Ok(match &self.names {
            None => Value::List(values),
            Some(names) => Value::Record(names.iter().cloned().zip(values).collect()),
        })
    }

    fn type_name(&self) -> &'static str {
        "Packed"
    }
}
