use serde_json::Value;

/// Headline fields, most specific first.
const PRIORITY_KEYS: [&str; 8] = [
    "monthly_payment",
    "optimal",
    "eligibility_trend",
    "status",
    "risk_level",
    "affordability_score",
    "lender_name",
    "remaining_balance",
];

/// Print just the headline value of a result.
///
/// Unwraps the `result` envelope, takes the first element of an array, then
/// looks for a priority key before falling back to the first field.
pub fn print_minimal(value: &Value) {
    let mut target = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Array(items) = target {
        match items.first() {
            Some(first) => target = first,
            None => {
                println!("(none)");
                return;
            }
        }
    }

    if let Value::Object(map) = target {
        // analyze nests the payment one level down
        let emi = map.get("emi").and_then(|e| e.get("monthly_payment"));
        let found = emi.or_else(|| {
            PRIORITY_KEYS
                .iter()
                .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
        });

        if let Some(val) = found {
            println!("{}", format_minimal(val));
        } else if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
        }
        return;
    }

    println!("{}", format_minimal(target));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
