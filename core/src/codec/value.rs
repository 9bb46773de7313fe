use super::{list::LinkedList, tree::BinaryTree};

/// A decoded test-case value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Character(char),
    String(String),
    Array(Vec<Value>),
    List(LinkedList),
    Tree(BinaryTree),
}

impl Value {
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn len(&self) -> Option<usize> {
        self.as_array().map(<[Value]>::len)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Character(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<LinkedList> for Value {
    fn from(v: LinkedList) -> Self {
        Self::List(v)
    }
}

impl From<BinaryTree> for Value {
    fn from(v: BinaryTree) -> Self {
        Self::Tree(v)
    }
}
