use crate::expr::IntBank;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use vn_core::{malformed_bail, malformed_ensure, Error, Point, Rect, Result};

/// Address of an integer variable, produced by reference parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntLocation {
    pub bank: IntBank,
    pub index: i32,
}

impl Display for IntLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.bank, self.index)
    }
}

/// A parameter after evaluation against live state.
///
/// Values are recomputed on every dispatch and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodedValue {
    Int(i32),
    Str(String),
    IntLocation(IntLocation),
    Point(Point),
    Rect(Rect),
    List(Vec<DecodedValue>),
}

impl DecodedValue {
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedValue::Int(_) => "int",
            DecodedValue::Str(_) => "str",
            DecodedValue::IntLocation(_) => "intref",
            DecodedValue::Point(_) => "point",
            DecodedValue::Rect(_) => "rect",
            DecodedValue::List(_) => "list",
        }
    }
}

impl Display for DecodedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodedValue::Int(value) => write!(f, "{}", value),
            DecodedValue::Str(value) => write!(f, "{:?}", value),
            DecodedValue::IntLocation(location) => write!(f, "{}", location),
            DecodedValue::Point(point) => write!(f, "{}", point),
            DecodedValue::Rect(rect) => write!(f, "{}", rect),
            DecodedValue::List(items) => write!(f, "[{}]", items.iter().join(", ")),
        }
    }
}

/// Conversion from one decoded parameter into a handler argument type.
pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: DecodedValue) -> Option<Self>;

    fn extract(value: DecodedValue) -> Result<Self> {
        let kind = value.kind();
        Self::from_value(value).ok_or_else(|| {
            Error::malformed(format!("expected {} parameter, decoded {}", Self::EXPECTED, kind))
        })
    }
}

impl FromValue for DecodedValue {
    const EXPECTED: &'static str = "any";

    fn from_value(value: DecodedValue) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: DecodedValue) -> Option<Self> {
        match value {
            DecodedValue::Int(value) => Some(value),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "str";

    fn from_value(value: DecodedValue) -> Option<Self> {
        match value {
            DecodedValue::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl FromValue for IntLocation {
    const EXPECTED: &'static str = "intref";

    fn from_value(value: DecodedValue) -> Option<Self> {
        match value {
            DecodedValue::IntLocation(location) => Some(location),
            _ => None,
        }
    }
}

impl FromValue for Point {
    const EXPECTED: &'static str = "point";

    fn from_value(value: DecodedValue) -> Option<Self> {
        match value {
            DecodedValue::Point(point) => Some(point),
            _ => None,
        }
    }
}

impl FromValue for Rect {
    const EXPECTED: &'static str = "rect";

    fn from_value(value: DecodedValue) -> Option<Self> {
        match value {
            DecodedValue::Rect(rect) => Some(rect),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: DecodedValue) -> Option<Self> {
        match value {
            DecodedValue::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

/// Conversion from a whole decoded parameter list into a typed tuple.
pub trait FromParams: Sized {
    fn from_params(values: Vec<DecodedValue>) -> Result<Self>;
}

impl FromParams for () {
    fn from_params(values: Vec<DecodedValue>) -> Result<Self> {
        malformed_ensure!(
            values.is_empty(),
            "expected no parameters, decoded {}",
            values.len()
        );
        Ok(())
    }
}

impl FromParams for Vec<DecodedValue> {
    fn from_params(values: Vec<DecodedValue>) -> Result<Self> {
        Ok(values)
    }
}

macro_rules! tuple_from_params {
    ($count:expr; $($name:ident),+) => {
        impl<$($name: FromValue),+> FromParams for ($($name,)+) {
            fn from_params(values: Vec<DecodedValue>) -> Result<Self> {
                if values.len() != $count {
                    malformed_bail!(
                        "expected {} parameters, decoded {}",
                        $count,
                        values.len()
                    );
                }
                let mut values = values.into_iter();
                Ok(($(
                    match values.next() {
                        Some(value) => $name::extract(value)?,
                        None => malformed_bail!("parameter list ended early"),
                    },
                )+))
            }
        }
    };
}

tuple_from_params!(1; A);
tuple_from_params!(2; A, B);
tuple_from_params!(3; A, B, C);
tuple_from_params!(4; A, B, C, D);
tuple_from_params!(5; A, B, C, D, E);
tuple_from_params!(6; A, B, C, D, E, F);
