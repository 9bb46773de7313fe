//! `#{name}` placeholders in command templates.

use std::{borrow::Borrow, collections::HashMap, ffi::OsStr, hash::Hash};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpError {
    #[error("Undefined variable '{name}' at column {col}")]
    UndefinedVar { name: String, col: usize },

    #[error("Unclosed '#{{' at column {col}")]
    UnclosedBrace { col: usize },
}

/// Expands `#{name}` with `variables[name]`; `##` stands for a literal `#`.
///
/// ```
/// # use std::collections::HashMap;
/// # use leetrun_core::str_interp::interp;
/// let vars = HashMap::from([("fileStem", "main")]);
/// assert_eq!(interp("./#{fileStem}.out ##1", &vars).unwrap(), "./main.out #1");
/// ```
pub fn interp<K, V>(template: &str, variables: &HashMap<K, V>) -> Result<String, InterpError>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<OsStr>,
{
    let mut res = String::with_capacity(template.len() * 2);
    let mut chars = template.chars().enumerate().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '#' {
            res.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '#')) => {
                chars.next();
                res.push('#');
            }
            Some(&(open, '{')) => {
                chars.next();
                let mut name = String::new();
                let closed = loop {
                    match chars.next() {
                        Some((_, '}')) => break true,
                        Some((_, c)) => name.push(c),
                        None => break false,
                    }
                };
                if !closed {
                    return Err(InterpError::UnclosedBrace { col: open });
                }
                let Some(value) = variables.get(name.as_str()) else {
                    return Err(InterpError::UndefinedVar { name, col: open });
                };
                res.push_str(&value.as_ref().to_string_lossy());
            }
            _ => res.push('#'),
        }
    }
    Ok(res)
}
