//! Blocking input collection
//!
//! Fields are asked one at a time in a fixed order. Cancelling or leaving a
//! required field blank aborts the whole form; numeric fields fall back to
//! their documented default when blank or unparseable.

use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::io::{self, Write};

/// Source of answers to prompts. `None` means the user cancelled.
pub trait Prompter: Send {
    fn prompt(&mut self, label: &str) -> Option<String>;
}

/// How a field's answer becomes a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Non-blank text; blank or cancelled aborts the form
    Required,
    /// Free text; cancelled is sent as `null`
    Text,
    /// Decimal number with a fallback
    Number { default: f64 },
    /// Whole number with a fallback; decimals are truncated
    Integer { default: i64 },
}

/// One prompted field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { key, label, kind }
    }
}

/// Outcome of collecting a form
#[derive(Debug, Clone, PartialEq)]
pub enum Collected {
    Params(Map<String, Value>),
    Cancelled,
}

/// Ask every field in order
pub fn collect_input(prompter: &mut dyn Prompter, fields: &[FieldSpec]) -> Collected {
    let mut params = Map::new();

    for field in fields {
        let answer = prompter.prompt(field.label);
        let value = match field.kind {
            FieldKind::Required => match answer {
                Some(text) if !text.trim().is_empty() => Value::String(text),
                _ => {
                    tracing::debug!(field = field.key, "Required field left empty, form cancelled");
                    return Collected::Cancelled;
                }
            },
            FieldKind::Text => answer.map(Value::String).unwrap_or(Value::Null),
            FieldKind::Number { default } => {
                number_value(answer.as_deref().and_then(parse_number).unwrap_or(default))
            }
            FieldKind::Integer { default } => {
                Value::from(answer.as_deref().and_then(parse_integer).unwrap_or(default))
            }
        };
        params.insert(field.key.to_string(), value);
    }

    Collected::Params(params)
}

fn parse_number(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_integer(input: &str) -> Option<i64> {
    let input = input.trim();
    input
        .parse::<i64>()
        .ok()
        .or_else(|| parse_number(input).map(|f| f.trunc() as i64))
}

/// Integral values serialize without a fraction (`0`, not `0.0`)
fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        Value::from(f as i64)
    } else {
        Value::from(f)
    }
}

/// Prompts on stdout and reads answers from stdin. End of input cancels.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for StdinPrompter {
    fn prompt(&mut self, label: &str) -> Option<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{} ", label).ok()?;
        stdout.flush().ok()?;

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                writeln!(stdout).ok();
                None
            }
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read prompt answer");
                None
            }
        }
    }
}

/// Replays canned answers; running out counts as cancelling
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
            asked: Vec::new(),
        }
    }

    /// Labels prompted so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, label: &str) -> Option<String> {
        self.asked.push(label.to_string());
        self.answers.pop_front().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: [FieldSpec; 4] = [
        FieldSpec::new("titulo", "Título:", FieldKind::Required),
        FieldSpec::new("nota", "Nota:", FieldKind::Text),
        FieldSpec::new("valor", "Valor:", FieldKind::Number { default: 0.0 }),
        FieldSpec::new("probabilidad", "Probabilidad:", FieldKind::Integer { default: 50 }),
    ];

    fn collect(answers: Vec<Option<&str>>) -> (Collected, Vec<String>) {
        let mut prompter = ScriptedPrompter::new(answers);
        let collected = collect_input(&mut prompter, &FIELDS);
        (collected, prompter.asked().to_vec())
    }

    fn params(collected: Collected) -> Map<String, Value> {
        match collected {
            Collected::Params(params) => params,
            Collected::Cancelled => panic!("form was cancelled"),
        }
    }

    #[test]
    fn test_all_answers() {
        let (collected, asked) = collect(vec![Some("Venta"), Some("hola"), Some("1200.5"), Some("80")]);
        assert_eq!(asked, vec!["Título:", "Nota:", "Valor:", "Probabilidad:"]);
        assert_eq!(
            Value::Object(params(collected)),
            json!({"titulo": "Venta", "nota": "hola", "valor": 1200.5, "probabilidad": 80})
        );
    }

    #[test]
    fn test_blank_numbers_use_defaults() {
        let (collected, _) = collect(vec![Some("Venta"), Some(""), Some(""), Some("")]);
        let params = params(collected);
        assert_eq!(params["valor"], 0);
        assert_eq!(params["probabilidad"], 50);
        assert_eq!(params["nota"], "");
    }

    #[test]
    fn test_invalid_and_cancelled_numbers_use_defaults() {
        let (collected, _) = collect(vec![Some("Venta"), None, Some("mucho"), None]);
        let params = params(collected);
        assert_eq!(params["nota"], Value::Null);
        assert_eq!(params["valor"], 0);
        assert_eq!(params["probabilidad"], 50);
    }

    #[test]
    fn test_integer_truncates() {
        let (collected, _) = collect(vec![Some("Venta"), Some(""), Some(" 300 "), Some("75.9")]);
        let params = params(collected);
        assert_eq!(params["valor"], 300);
        assert_eq!(params["probabilidad"], 75);
    }

    #[test]
    fn test_required_cancelled_aborts_before_other_prompts() {
        let (collected, asked) = collect(vec![None, Some("x")]);
        assert_eq!(collected, Collected::Cancelled);
        assert_eq!(asked, vec!["Título:"]);

        let (collected, _) = collect(vec![Some("   ")]);
        assert_eq!(collected, Collected::Cancelled);
    }
}
