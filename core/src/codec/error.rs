use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse {value} as {expected}: {reason}")]
pub struct DecodeError {
    pub value: String,
    pub expected: Cow<'static, str>,
    pub reason: Cow<'static, str>,
}

impl DecodeError {
    pub fn new(
        value: impl Into<String>,
        expected: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            value: value.into(),
            expected: expected.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// A list or tree links back to a node that was already emitted.
    #[error("infinite loop detected while encoding {0}")]
    InfiniteLoopDetected(&'static str),

    #[error("cannot encode non-finite double {0}")]
    NonFiniteDouble(f64),
}
