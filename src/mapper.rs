//! Maps [`DataType`]s onto TypeScript type expressions.
//!
//! Both the JavaScript and the TypeScript generator name parameters through [`param_name`] and
//! the declaration generator types them through [`map_type`], so the two outputs can never
//! disagree about an endpoint's signature.

use crate::{DataType, PrimitiveType};

macro_rules! primitive_def {
    ($($t:ident)+) => {
        $(PrimitiveType::$t)|+
    }
}

fn primitive(ty: PrimitiveType) -> &'static str {
    match ty {
        primitive_def!(i8 i16 i32 i64 i128 isize u8 u16 u32 u64 u128 usize f32 f64) => "number",
        primitive_def!(String char) => "string",
        PrimitiveType::bool => "boolean",
    }
}

/// Renders the TypeScript type expression for `ty`.
///
/// Never fails: anything without a dedicated rule becomes `any`.
pub fn map_type(ty: &DataType) -> String {
    match ty {
        DataType::Blob => "base64".into(),
        DataType::List(inner) => match &**inner {
            DataType::Nullable(_) => format!("({})[]", map_type(inner)),
            inner => format!("{}[]", map_type(inner)),
        },
        DataType::Nullable(inner) => match &**inner {
            DataType::Nullable(_) => map_type(inner),
            inner => format!("{} | null", map_type(inner)),
        },
        DataType::Primitive(ty) => primitive(*ty).into(),
        DataType::Record(record) => record.name().into(),
        DataType::Any => "any".into(),
    }
}

/// The identifier fragment used to name a value of type `ty`.
///
/// Nullability is dropped and every list layer appends `_arr`, so `Option<Vec<Vec<i32>>>`
/// becomes `number_arr_arr`.
pub fn base_name(ty: &DataType) -> String {
    match ty {
        DataType::List(inner) => format!("{}_arr", base_name(inner)),
        DataType::Nullable(inner) => base_name(inner),
        DataType::Blob => "base64".into(),
        DataType::Primitive(ty) => primitive(*ty).into(),
        DataType::Record(record) => record.name().into(),
        DataType::Any => "any".into(),
    }
}

/// Name of the positional parameter at `index`, eg. `v0_number`.
pub fn param_name(index: usize, ty: &DataType) -> String {
    format!("v{index}_{}", base_name(ty))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{Blob, Describe, Field, RecordType};

    struct Point;

    impl Describe for Point {
        fn describe() -> DataType {
            DataType::Record(RecordType::new::<Self>("Point", || {
                vec![Field::new::<f64>("X"), Field::new::<f64>("Y")]
            }))
        }
    }

    #[test]
    fn fixture_table() {
        let fixtures: Vec<(DataType, &str, &str)> = vec![
            (i8::describe(), "number", "v0_number"),
            (u64::describe(), "number", "v0_number"),
            (usize::describe(), "number", "v0_number"),
            (f32::describe(), "number", "v0_number"),
            (String::describe(), "string", "v0_string"),
            (char::describe(), "string", "v0_string"),
            (bool::describe(), "boolean", "v0_boolean"),
            (Blob::describe(), "base64", "v0_base64"),
            (<Vec<u8>>::describe(), "number[]", "v0_number_arr"),
            (<Vec<Blob>>::describe(), "base64[]", "v0_base64_arr"),
            (<Vec<Vec<String>>>::describe(), "string[][]", "v0_string_arr_arr"),
            (Point::describe(), "Point", "v0_Point"),
            (<Vec<Point>>::describe(), "Point[]", "v0_Point_arr"),
            (<Option<Point>>::describe(), "Point | null", "v0_Point"),
            (<Vec<Option<i32>>>::describe(), "(number | null)[]", "v0_number_arr"),
            (<Option<Option<bool>>>::describe(), "boolean | null", "v0_boolean"),
            (<HashMap<String, i32>>::describe(), "any", "v0_any"),
            (serde_json::Value::describe(), "any", "v0_any"),
        ];

        for (ty, ts, name) in fixtures {
            assert_eq!(map_type(&ty), ts, "{ty:?}");
            assert_eq!(param_name(0, &ty), name, "{ty:?}");
        }
    }

    #[test]
    fn index_is_positional() {
        assert_eq!(param_name(3, &i32::describe()), "v3_number");
    }
}
