use std::fmt;

use serde::{de, Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("Unknown type '{0}'")]
    Unknown(String),

    #[error("Output parameter index {index} is out of range (the function has {nparams} params)")]
    OutputParamOutOfRange { index: usize, nparams: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ScalarType {
    Integer,
    Long,
    Double,
    Boolean,
    Character,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElemType {
    Scalar(ScalarType),
    ListNode,
    TreeNode,
}

/// Normalized parameter/return type.
///
/// Arrays keep their nesting depth next to the innermost element type, so
/// `integer[][]` is `Array { depth: 2, elem: Scalar(Integer) }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalType {
    Void,
    Elem(ElemType),
    Array { depth: usize, elem: ElemType },
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ElemType::*;
        match self {
            Scalar(s) => write!(f, "{}", s),
            ListNode => write!(f, "ListNode"),
            TreeNode => write!(f, "TreeNode"),
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use CanonicalType::*;
        match self {
            Void => write!(f, "void"),
            Elem(e) => write!(f, "{}", e),
            Array { depth, elem } => write!(f, "{}{}", elem, "[]".repeat(*depth)),
        }
    }
}

impl CanonicalType {
    pub const STRING_LIST: Self = Self::array_of(ElemType::Scalar(ScalarType::String), 1);

    pub const fn array_of(elem: ElemType, depth: usize) -> Self {
        if depth == 0 {
            Self::Elem(elem)
        } else {
            Self::Array { depth, elem }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Array { depth, .. } => *depth,
            _ => 0,
        }
    }

    pub fn is_array(&self) -> bool {
        self.depth() > 0
    }

    /// Type of one element of this array type, or `None` if not an array.
    pub fn element(&self) -> Option<Self> {
        match *self {
            Self::Array { depth, elem } => Some(Self::array_of(elem, depth - 1)),
            _ => None,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        self::normalize(raw)
    }
}

/// Maps the judge's type spellings to [`CanonicalType`].
///
/// ```
/// use leetrun_core::problem::{normalize, CanonicalType, ElemType, ScalarType};
///
/// let t = normalize("list<list<String>>").unwrap();
/// assert_eq!(t, CanonicalType::Array { depth: 2, elem: ElemType::Scalar(ScalarType::String) });
/// assert_eq!(t.to_string(), "string[][]");
/// assert_eq!(normalize("").unwrap(), CanonicalType::Void);
/// ```
pub fn normalize(raw: &str) -> Result<CanonicalType, TypeError> {
    let raw = raw.trim();
    let unknown = || TypeError::Unknown(raw.to_owned());

    let mut depth = 0;
    let mut base = raw;
    loop {
        if let Some(inner) = base.strip_suffix("[]") {
            depth += 1;
            base = inner.trim_end();
        } else if let Some(inner) = base
            .strip_prefix("list<")
            .and_then(|s| s.strip_suffix('>'))
        {
            depth += 1;
            base = inner.trim();
        } else {
            break;
        }
    }

    use ScalarType::*;
    let elem = match base {
        "" | "void" if depth == 0 => return Ok(CanonicalType::Void),
        "integer" | "int" => ElemType::Scalar(Integer),
        "long" => ElemType::Scalar(Long),
        "double" | "float" => ElemType::Scalar(Double),
        "boolean" | "bool" => ElemType::Scalar(Boolean),
        "character" | "char" => ElemType::Scalar(Character),
        "string" | "String" => ElemType::Scalar(String),
        "ListNode" => ElemType::ListNode,
        "TreeNode" => ElemType::TreeNode,
        _ => return Err(unknown()),
    };
    Ok(CanonicalType::array_of(elem, depth))
}

fn deserialize_canonical<'de, D>(deserializer: D) -> Result<CanonicalType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    normalize(&raw).map_err(de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "deserialize_canonical")]
    pub ty: CanonicalType,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(rename = "return", default)]
    pub ret: Return,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Return {
    #[serde(rename = "type", deserialize_with = "deserialize_canonical")]
    pub ty: CanonicalType,
}

impl Default for Return {
    fn default() -> Self {
        Self {
            ty: CanonicalType::Void,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct Constructor {
    #[serde(default)]
    params: Vec<Param>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
struct Output {
    #[serde(rename = "paramindex")]
    param_index: usize,
}

/// The judge's `metaData` object as it arrives over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct ProblemMeta {
    #[serde(default)]
    name: String,
    #[serde(default)]
    params: Vec<Param>,
    #[serde(rename = "return", default)]
    ret: Return,
    #[serde(default)]
    output: Option<Output>,
    #[serde(rename = "systemdesign", default)]
    system_design: bool,
    #[serde(rename = "classname", default)]
    class_name: String,
    #[serde(default)]
    constructor: Constructor,
    #[serde(default)]
    methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub class_name: String,
    pub constructor_params: Vec<Param>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemSignature {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: CanonicalType,
    pub output_param: Option<usize>,
    pub class: Option<ClassSignature>,
}

impl ProblemSignature {
    fn from_meta(m: ProblemMeta) -> Result<Self, TypeError> {
        let output_param = m.output.map(|o| o.param_index);
        if let Some(index) = output_param {
            if index >= m.params.len() && !m.system_design {
                return Err(TypeError::OutputParamOutOfRange {
                    index,
                    nparams: m.params.len(),
                });
            }
        }
        let class = m.system_design.then(|| ClassSignature {
            class_name: m.class_name,
            constructor_params: m.constructor.params,
            methods: m.methods,
        });
        Ok(Self {
            name: m.name,
            params: m.params,
            return_type: m.ret.ty,
            output_param,
            class,
        })
    }
}

impl<'de> Deserialize<'de> for ProblemSignature {
    /// Accepts the metadata object itself, or the same object encoded as a JSON string.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let meta: ProblemMeta = match value {
            serde_json::Value::String(s) => serde_json::from_str(&s),
            v => serde_json::from_value(v),
        }
        .map_err(de::Error::custom)?;
        Self::from_meta(meta).map_err(de::Error::custom)
    }
}

impl ProblemSignature {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn is_stateful(&self) -> bool {
        self.class.is_some()
    }

    pub fn arity(&self) -> usize {
        if self.is_stateful() {
            2
        } else {
            self.params.len()
        }
    }

    /// Type of the value a solution reports.
    ///
    /// In-place problems return `void` and report through the parameter at `output_param`.
    pub fn result_type(&self) -> CanonicalType {
        match (self.return_type, self.output_param) {
            (CanonicalType::Void, Some(i)) => self
                .params
                .get(i)
                .map(|p| p.ty)
                .unwrap_or(CanonicalType::Void),
            (ty, _) => ty,
        }
    }

    /// Input indices of a linked list and the `pos` argument that closes it into a cycle.
    pub fn cycle_params(&self) -> Option<(usize, usize)> {
        if self.is_stateful() {
            return None;
        }
        let list = self
            .params
            .iter()
            .position(|p| p.ty == CanonicalType::Elem(ElemType::ListNode))?;
        let pos = self.params.iter().position(|p| {
            p.name == "pos" && p.ty == CanonicalType::Elem(ElemType::Scalar(ScalarType::Integer))
        })?;
        Some((list, pos))
    }

    /// Declared type of the `i`-th input line.
    pub fn input_type(&self, i: usize) -> Option<CanonicalType> {
        if self.is_stateful() {
            return None;
        }
        self.params.get(i).map(|p| p.ty)
    }
}

/// Problem record stored in a workspace: metadata plus the natural-language statement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default)]
    pub title_slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "metaData")]
    pub signature: ProblemSignature,
}
