//! Helpers for reading loosely-shaped JSON records

use serde_json::Value;

/// Placeholder for a missing or null scalar
pub const MISSING: &str = "-";

/// Display form of a JSON value. Strings are shown verbatim, integral
/// numbers without a fractional part, null as [`MISSING`].
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => MISSING.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            }
        }
        other => other.to_string(),
    }
}

/// Display form of `record[key]`
pub fn field(record: &Value, key: &str) -> String {
    record.get(key).map(display_value).unwrap_or_else(|| MISSING.to_string())
}

/// Array under `key`, empty when absent or not an array
pub fn collection<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// JSON equality where numbers compare by value (`1 == 1.0`)
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Number of records whose `key` equals `target`
pub fn count_where(records: &[Value], key: &str, target: &Value) -> usize {
    records
        .iter()
        .filter(|r| r.get(key).is_some_and(|v| json_eq(v, target)))
        .count()
}

/// JavaScript-style truthiness
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Acme")), "Acme");
        assert_eq!(display_value(&json!(50)), "50");
        assert_eq!(display_value(&json!(1500.0)), "1500");
        assert_eq!(display_value(&json!(12.5)), "12.5");
        assert_eq!(display_value(&json!(-3)), "-3");
        assert_eq!(display_value(&json!(null)), "-");
        assert_eq!(display_value(&json!(true)), "true");
    }

    #[test]
    fn test_field_missing() {
        let record = json!({"nombre": "Ana", "email": null});
        assert_eq!(field(&record, "nombre"), "Ana");
        assert_eq!(field(&record, "email"), "-");
        assert_eq!(field(&record, "telefono"), "-");
    }

    #[test]
    fn test_collection_tolerates_absence() {
        let payload = json!({"clientes": [1, 2], "otro": "x"});
        assert_eq!(collection(&payload, "clientes").len(), 2);
        assert!(collection(&payload, "otro").is_empty());
        assert!(collection(&payload, "nada").is_empty());
        assert!(collection(&json!(null), "clientes").is_empty());
    }

    #[test]
    fn test_count_where() {
        let tareas = vec![
            json!({"proyecto_id": "P1"}),
            json!({"proyecto_id": "P1"}),
            json!({"proyecto_id": "P2"}),
            json!({"titulo": "sin proyecto"}),
        ];
        assert_eq!(count_where(&tareas, "proyecto_id", &json!("P1")), 2);
        assert_eq!(count_where(&tareas, "proyecto_id", &json!("P2")), 1);
        assert_eq!(count_where(&tareas, "proyecto_id", &json!("P3")), 0);
    }

    #[test]
    fn test_numeric_ids_compare_by_value() {
        let tareas = vec![json!({"proyecto_id": 1}), json!({"proyecto_id": 1.0})];
        assert_eq!(count_where(&tareas, "proyecto_id", &json!(1)), 2);
        // No string/number coercion
        assert_eq!(count_where(&tareas, "proyecto_id", &json!("1")), 0);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(is_truthy(Some(&json!("si"))));
        assert!(!is_truthy(Some(&json!(""))));
    }
}
