//! Conversion between the judge's textual value notation and [`Value`].

pub mod error;
pub mod list;
pub mod split;
pub mod tree;
pub mod value;

pub use error::{DecodeError, EncodeError};
pub use list::{LinkedList, ListNode, NodeId};
pub use split::split_array;
pub use tree::{BinaryTree, TreeNode};
pub use value::Value;

use crate::problem::{CanonicalType, ElemType, ScalarType};

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

pub fn decode(ty: &CanonicalType, raw: &str) -> DecodeResult<Value> {
    let raw = raw.trim();
    match *ty {
        CanonicalType::Void => Err(DecodeError::new(raw, "void", "void has no value")),
        CanonicalType::Elem(elem) => decode_elem(elem, raw),
        CanonicalType::Array { depth, elem } => {
            let elem_ty = CanonicalType::array_of(elem, depth - 1);
            split_array(raw)
                .map_err(|e| DecodeError::new(raw, ty.to_string(), e.reason))?
                .into_iter()
                .map(|s| decode(&elem_ty, s))
                .collect::<DecodeResult<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

fn decode_elem(elem: ElemType, raw: &str) -> DecodeResult<Value> {
    match elem {
        ElemType::Scalar(s) => decode_scalar(s, raw),
        ElemType::ListNode => decode_list(raw).map(Value::List),
        ElemType::TreeNode => {
            let slots = decode_node_values(raw, "TreeNode")?;
            BinaryTree::from_level_order(&slots)
                .map(Value::Tree)
                .map_err(|reason| DecodeError::new(raw, "TreeNode", reason))
        }
    }
}

/// Decodes a list whose tail links back to the `pos`-th node (0-based).
///
/// `pos == -1` means the list has no cycle.
pub fn decode_cyclic_list(raw: &str, pos: i32) -> DecodeResult<LinkedList> {
    let mut list = decode_list(raw.trim())?;
    if pos == -1 {
        return Ok(list);
    }
    let linked = usize::try_from(pos)
        .map(|pos| list.close_cycle(pos))
        .unwrap_or(false);
    if !linked {
        return Err(DecodeError::new(
            raw.trim(),
            "ListNode",
            format!("cycle position {} is out of range", pos),
        ));
    }
    Ok(list)
}

fn decode_list(raw: &str) -> DecodeResult<LinkedList> {
    decode_node_values(raw, "ListNode")?
        .into_iter()
        .collect::<Option<Vec<i32>>>()
        .map(LinkedList::from_values)
        .ok_or_else(|| DecodeError::new(raw, "ListNode", "null is not allowed in a list"))
}

fn decode_node_values(raw: &str, expected: &'static str) -> DecodeResult<Vec<Option<i32>>> {
    split_array(raw)
        .map_err(|e| DecodeError::new(raw, expected, e.reason))?
        .into_iter()
        .map(|s| match s {
            "null" => Ok(None),
            _ => s.parse::<i32>().map(Some).map_err(|e| {
                DecodeError::new(raw, expected, format!("invalid node value '{}': {}", s, e))
            }),
        })
        .collect()
}

fn decode_scalar(ty: ScalarType, raw: &str) -> DecodeResult<Value> {
    let err = |reason: String| DecodeError::new(raw, ty.to_string(), reason);
    match ty {
        ScalarType::Integer => raw
            .parse::<i32>()
            .map(Value::Integer)
            .map_err(|e| err(e.to_string())),
        ScalarType::Long => raw
            .parse::<i64>()
            .map(Value::Long)
            .map_err(|e| err(e.to_string())),
        ScalarType::Double => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Double(f)),
            Ok(_) => Err(err("not a finite number".to_owned())),
            Err(e) => Err(err(e.to_string())),
        },
        ScalarType::Boolean => match raw {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(err("expected `true` or `false`".to_owned())),
        },
        ScalarType::Character => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next(), chars.next(), chars.next()) {
                (Some(q @ ('"' | '\'')), Some(c), Some(q2), None) if q == q2 => {
                    Ok(Value::Character(c))
                }
                _ => Err(err("expected a single character in quotes".to_owned())),
            }
        }
        ScalarType::String => unquote(raw).map(Value::String).map_err(err),
    }
}

fn unquote(raw: &str) -> Result<String, String> {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| "not enclosed in double quotes".to_owned())?;

    let mut s = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = match chars.next() {
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some('/') => '/',
                    Some('b') => '\u{8}',
                    Some('f') => '\u{c}',
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some(c) => return Err(format!("unknown escape sequence '\\{}'", c)),
                    None => return Err("dangling backslash".to_owned()),
                };
                s.push(escaped);
            }
            '"' => return Err("unescaped double quote".to_owned()),
            _ => s.push(c),
        }
    }
    Ok(s)
}

fn quote(s: &str, buf: &mut String) {
    buf.push('"');
    for c in s.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\u{8}' => buf.push_str("\\b"),
            '\u{c}' => buf.push_str("\\f"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            _ => buf.push(c),
        }
    }
    buf.push('"');
}

/// Canonical textual form of `value`.
///
/// Fails only when the value cannot be written out, e.g. a cyclic list.
pub fn encode(value: &Value) -> Result<String, EncodeError> {
    let mut buf = String::new();
    encode_into(value, &mut buf)?;
    Ok(buf)
}

fn encode_into(value: &Value, buf: &mut String) -> Result<(), EncodeError> {
    match value {
        Value::Integer(v) => buf.push_str(&v.to_string()),
        Value::Long(v) => buf.push_str(&v.to_string()),
        Value::Double(v) if !v.is_finite() => return Err(EncodeError::NonFiniteDouble(*v)),
        Value::Double(v) => buf.push_str(&format!("{:.5}", v)),
        Value::Boolean(v) => buf.push_str(if *v { "true" } else { "false" }),
        Value::Character(c) => {
            buf.push('"');
            buf.push(*c);
            buf.push('"');
        }
        Value::String(s) => quote(s, buf),
        Value::Array(elems) => {
            buf.push('[');
            for (i, e) in elems.iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                encode_into(e, buf)?;
            }
            buf.push(']');
        }
        Value::List(list) => {
            let vals = list.values()?;
            write_joined(buf, vals.iter().map(|v| v.to_string()));
        }
        Value::Tree(tree) => {
            let slots = tree.level_order()?;
            write_joined(
                buf,
                slots.iter().map(|slot| match slot {
                    Some(v) => v.to_string(),
                    None => "null".to_owned(),
                }),
            );
        }
    }
    Ok(())
}

fn write_joined(buf: &mut String, items: impl Iterator<Item = String>) {
    buf.push('[');
    for (i, item) in items.enumerate() {
        if i > 0 {
            buf.push(',');
        }
        buf.push_str(&item);
    }
    buf.push(']');
}

/// Decodes then re-encodes `raw`, yielding its canonical spelling.
pub fn canonicalize(ty: &CanonicalType, raw: &str) -> anyhow::Result<String> {
    let v = decode(ty, raw)?;
    Ok(encode(&v)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::problem::normalize;

    fn ty(raw: &str) -> CanonicalType {
        normalize(raw).unwrap()
    }

    #[test]
    fn decode_scalars() {
        assert_eq!(decode(&ty("integer"), "-42").unwrap(), Value::Integer(-42));
        assert_eq!(
            decode(&ty("long"), "9007199254740993").unwrap(),
            Value::Long(9007199254740993)
        );
        assert_eq!(decode(&ty("double"), "2.5").unwrap(), Value::Double(2.5));
        assert_eq!(decode(&ty("boolean"), "true").unwrap(), Value::Boolean(true));
        assert_eq!(decode(&ty("character"), "'a'").unwrap(), Value::Character('a'));
        assert_eq!(decode(&ty("character"), r#""b""#).unwrap(), Value::Character('b'));
        assert_eq!(
            decode(&ty("string"), r#""a\"b\\c\/d\n\t""#).unwrap(),
            Value::String("a\"b\\c/d\n\t".to_owned())
        );
    }

    #[test]
    fn decode_scalars_ng() {
        let cases = [
            ("integer", "1.5"),
            ("integer", "2147483648"),
            ("integer", ""),
            ("double", "abc"),
            ("double", "NaN"),
            ("boolean", "True"),
            ("boolean", "1"),
            ("character", "a"),
            ("character", "'ab'"),
            ("character", r#"'a""#),
            ("string", "abc"),
            ("string", r#""abc"#),
            ("string", r#""a\qb""#),
            ("string", r#""a"b""#),
            ("void", "null"),
        ];
        for (t, raw) in cases {
            assert!(decode(&ty(t), raw).is_err(), "{} should reject {}", t, raw);
        }
    }

    #[test]
    fn decode_error_carries_value_and_reason() {
        let e = decode(&ty("integer[]"), "[1,x]").unwrap_err();
        assert_eq!(e.value, "x");
        assert_eq!(e.expected, "integer");
        assert!(e.to_string().starts_with("cannot parse x as integer"));
    }

    #[test]
    fn decode_arrays() {
        assert_eq!(decode(&ty("integer[]"), "[]").unwrap(), Value::Array(vec![]));
        assert_eq!(
            decode(&ty("integer[][]"), "[[1,2],[],[3]]").unwrap(),
            Value::from(vec![vec![1, 2], vec![], vec![3]])
        );
        assert_eq!(
            decode(&ty("string[]"), r#"["a,b", "c"]"#).unwrap(),
            Value::from(vec!["a,b", "c"])
        );
        assert_eq!(
            decode(&ty("character[][]"), r#"[["a","."],[",","'"]]"#).unwrap(),
            Value::from(vec![vec!['a', '.'], vec![',', '\'']])
        );
        assert!(decode(&ty("integer[][]"), "[1,2]").is_err());
        assert!(decode(&ty("integer[]"), "1,2").is_err());
    }

    #[test]
    fn roundtrip_canonical_text() {
        let cases = [
            ("integer", "7"),
            ("long", "-12345678901"),
            ("double", "2.50000"),
            ("boolean", "false"),
            ("character", r#""x""#),
            ("string", r#""he said \"hi\"\n""#),
            ("integer[]", "[1,2,3]"),
            ("integer[][]", "[[1],[2,3],[]]"),
            ("integer[][][]", "[[[1,2]],[[3],[]]]"),
            ("string[][]", r#"[["a","b,c"],[]]"#),
            ("boolean[]", "[true,false]"),
            ("ListNode", "[1,2,3]"),
            ("ListNode", "[]"),
            ("ListNode[]", "[[1,2],[3]]"),
            ("TreeNode", "[1,2,3]"),
            ("TreeNode", "[1,null,2,3]"),
            ("TreeNode", "[]"),
        ];
        for (t, raw) in cases {
            let v = decode(&ty(t), raw).unwrap();
            assert_eq!(encode(&v).unwrap(), raw, "type={}", t);
            assert_eq!(decode(&ty(t), &encode(&v).unwrap()).unwrap(), v);
        }
    }

    #[test]
    fn encode_normalizes_spacing_and_trailing_nulls() {
        assert_eq!(canonicalize(&ty("integer[]"), "[1, 2 ,3]").unwrap(), "[1,2,3]");
        assert_eq!(canonicalize(&ty("TreeNode"), "[1,2,null]").unwrap(), "[1,2]");
        assert_eq!(canonicalize(&ty("TreeNode"), "[null]").unwrap(), "[]");
        assert_eq!(canonicalize(&ty("double"), "1.5").unwrap(), "1.50000");
        assert_eq!(canonicalize(&ty("character"), "'c'").unwrap(), r#""c""#);
    }

    #[test]
    fn list_with_null_is_rejected() {
        assert!(decode(&ty("ListNode"), "[1,null]").is_err());
    }

    #[test]
    fn cyclic_list_encode_fails() {
        let list = decode_cyclic_list("[3,2,0,-4]", 1).unwrap();
        assert!(list.has_cycle());
        assert_eq!(
            encode(&Value::List(list)),
            Err(EncodeError::InfiniteLoopDetected("ListNode"))
        );

        let list = decode_cyclic_list("[1,2]", -1).unwrap();
        assert_eq!(encode(&Value::List(list)).unwrap(), "[1,2]");

        assert!(decode_cyclic_list("[1,2]", 2).is_err());
        assert!(decode_cyclic_list("[1,2]", -2).is_err());
        assert!(decode_cyclic_list("[]", 0).is_err());
    }

    #[test]
    fn cyclic_value_inside_array_fails() {
        let list = decode_cyclic_list("[1]", 0).unwrap();
        let v = Value::Array(vec![Value::List(LinkedList::from_values([5])), Value::List(list)]);
        assert!(encode(&v).is_err());
    }
}
