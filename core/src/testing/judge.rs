use std::collections::HashMap;

use lazy_regex::{lazy_regex, Lazy, Regex};

use super::testcase::OUTPUT_MARK;
use crate::{
    codec::{self, split_array, DecodeError, EncodeError},
    problem::{CanonicalType, ElemType, ProblemSignature, ScalarType},
};

static RE_HTML_TAG: Lazy<Regex> = lazy_regex!(r"<[^>]*>");

const ANY_ORDER_PHRASE: &str = "return the answer in any order";

const FLOAT_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Mismatch(pub String);

pub type JudgeResult = Result<(), Mismatch>;

/// Compares an expected answer with the actual one.
///
/// Both sides are single lines in canonical notation; `input` is the case's input lines.
pub trait Judge {
    fn judge(&self, input: &[String], expected: &str, actual: &str) -> JudgeResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderPolicy {
    #[default]
    Strict,
    AnyOrder,
}

impl OrderPolicy {
    /// Looks for the any-order phrase in an HTML problem statement.
    ///
    /// Only the exact English phrase is recognized; a statement that words it
    /// differently is judged in strict order.
    pub fn from_statement(html: &str) -> Self {
        let text = RE_HTML_TAG.replace_all(html, "").replace("&nbsp;", " ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.contains(ANY_ORDER_PHRASE) {
            Self::AnyOrder
        } else {
            Self::Strict
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactJudge;

impl Judge for ExactJudge {
    fn judge(&self, _: &[String], expected: &str, actual: &str) -> JudgeResult {
        if expected == actual {
            Ok(())
        } else {
            Err(Mismatch(format!("expected {:?}, got {:?}", expected, actual)))
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatJudge;

impl Judge for FloatJudge {
    fn judge(&self, _: &[String], expected: &str, actual: &str) -> JudgeResult {
        let (Ok(a), Ok(b)) = (expected.parse::<f64>(), actual.parse::<f64>()) else {
            return Err(Mismatch(format!("expected {:?}, got {:?}", expected, actual)));
        };
        if (a - b).abs() >= FLOAT_TOLERANCE {
            return Err(Mismatch(format!("expected {:.5}, got {:.5}", a, b)));
        }
        Ok(())
    }
}

pub struct SliceJudge {
    ignore_order: bool,
    elem: Box<dyn Judge + Send + Sync>,
}

impl SliceJudge {
    pub fn new(ignore_order: bool, elem: Box<dyn Judge + Send + Sync>) -> Self {
        Self { ignore_order, elem }
    }
}

impl Judge for SliceJudge {
    fn judge(&self, input: &[String], expected: &str, actual: &str) -> JudgeResult {
        if expected == actual {
            return Ok(());
        }
        let (a, b) = match (split_array(expected), split_array(actual)) {
            (Ok(a), Ok(b)) => (a, b),
            _ => return ExactJudge.judge(input, expected, actual),
        };
        if a.len() != b.len() {
            return Err(Mismatch(format!(
                "expected {} elements, got {}",
                a.len(),
                b.len()
            )));
        }

        if self.ignore_order {
            return if same_multiset(&a, &b) {
                Ok(())
            } else {
                Err(Mismatch(format!(
                    "expected {:?} in any order, got {:?}",
                    expected, actual
                )))
            };
        }

        a.iter().zip(&b).enumerate().try_for_each(|(i, (x, y))| {
            self.elem
                .judge(input, x, y)
                .map_err(|Mismatch(m)| Mismatch(format!("{} at index {}", m, i)))
        })
    }
}

fn same_multiset(a: &[&str], b: &[&str]) -> bool {
    let mut cnt: HashMap<&str, i64> = HashMap::new();
    for x in a {
        *cnt.entry(*x).or_default() += 1;
    }
    for y in b {
        *cnt.entry(*y).or_default() -= 1;
    }
    cnt.values().all(|&c| c == 0)
}

/// Exact comparison of the whole call-result array.
///
/// A mismatch names the first differing call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDesignJudge;

impl Judge for SystemDesignJudge {
    fn judge(&self, input: &[String], expected: &str, actual: &str) -> JudgeResult {
        if expected == actual {
            return Ok(());
        }
        let calls = input
            .first()
            .and_then(|l| codec::decode(&CanonicalType::STRING_LIST, l).ok());
        let args = input.get(1).and_then(|l| split_array(l).ok());
        let (Some(codec::Value::Array(calls)), Some(args), Ok(a), Ok(b)) =
            (calls, args, split_array(expected), split_array(actual))
        else {
            return ExactJudge.judge(input, expected, actual);
        };
        if a.len() != b.len() || a.len() != calls.len() {
            return Err(Mismatch(format!(
                "expected {} results, got {}",
                a.len(),
                b.len()
            )));
        }

        for i in 0..a.len() {
            if a[i] == b[i] {
                continue;
            }
            let name = match &calls[i] {
                codec::Value::String(s) => s.as_str(),
                _ => "?",
            };
            let params = args
                .get(i)
                .map(|&p| p.strip_prefix('[').and_then(|p| p.strip_suffix(']')).unwrap_or(p))
                .unwrap_or_default();
            return Err(Mismatch(format!(
                "expected {:?}, got {:?} at index {} [{}({})]",
                a[i], b[i], i, name, params
            )));
        }
        // same elements, different spelling
        ExactJudge.judge(input, expected, actual)
    }
}

/// Picks the comparison for `sig`'s result.
pub fn new_judge(sig: &ProblemSignature, policy: OrderPolicy) -> Box<dyn Judge + Send + Sync> {
    if sig.is_stateful() {
        return Box::new(SystemDesignJudge);
    }
    judge_for(sig.result_type(), policy == OrderPolicy::AnyOrder)
}

fn judge_for(ty: CanonicalType, ignore_order: bool) -> Box<dyn Judge + Send + Sync> {
    match ty {
        CanonicalType::Elem(ElemType::Scalar(ScalarType::Double)) => Box::new(FloatJudge),
        CanonicalType::Array { depth, elem } => Box::new(SliceJudge::new(
            ignore_order,
            // only the outermost level may be reordered
            judge_for(CanonicalType::array_of(elem, depth - 1), false),
        )),
        _ => Box::new(ExactJudge),
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("no output found")]
    Empty,

    #[error("invalid output: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid output: {calls} calls but {outputs} results")]
    CallCount { calls: usize, outputs: usize },

    #[error("invalid output: {0}")]
    Encode(#[from] EncodeError),
}

/// Structural validation of an answer line before it is judged.
pub fn check_output_shape(
    sig: &ProblemSignature,
    input: &[String],
    line: &str,
) -> Result<(), ShapeError> {
    if line.is_empty() {
        return Err(ShapeError::Empty);
    }
    if sig.is_stateful() {
        let outputs = split_array(line)?.len();
        let calls = match input.first() {
            Some(l) => split_array(l)?.len(),
            None => 0,
        };
        if calls != outputs {
            return Err(ShapeError::CallCount { calls, outputs });
        }
        return Ok(());
    }
    let ty = sig.result_type();
    if ty != CanonicalType::Void {
        codec::decode(&ty, line)?;
    }
    Ok(())
}

/// Rewrites an answer in canonical notation so spacing and number formatting do not matter.
///
/// Stateful answers are returned trimmed but otherwise untouched.
pub fn canonical_output(sig: &ProblemSignature, line: &str) -> Result<String, ShapeError> {
    let ty = sig.result_type();
    if sig.is_stateful() || ty == CanonicalType::Void {
        return Ok(line.trim().to_owned());
    }
    let value = codec::decode(&ty, line)?;
    Ok(codec::encode(&value)?)
}

/// Splits captured stdout into the answer (text after the last output marker) and the other lines.
pub fn extract_output(stdout: &str) -> (String, String) {
    let mut answer = String::new();
    let mut others = Vec::new();
    for line in stdout.lines() {
        match line.strip_prefix(OUTPUT_MARK) {
            Some(rest) => answer = rest.trim().to_owned(),
            None => others.push(line),
        }
    }
    (answer, others.join("\n"))
}
