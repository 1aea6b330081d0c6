//! Non-interactive form filling from a JSON object of field id to value

use anyhow::{Context, Result, bail};
use campusreport::{Form, FormState, Violation};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub fn load<P: AsRef<Path>>(path: P) -> Result<Map<String, Value>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read values from {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse values from {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

/// Apply every value in form field order, so a region lands before its campus.
///
/// Returns the warnings raised while applying.
pub fn apply(form: &Form<'_>, state: &mut FormState, values: &Map<String, Value>) -> Result<Vec<Violation>> {
    if let Some(unknown) = values.keys().find(|key| form.spec.field(key).is_none()) {
        bail!("Unknown field '{}' for the {} form", unknown, form.spec.kind.key());
    }

    let mut warnings = Vec::new();
    for field in &form.spec.fields {
        let raw = match values.get(field.id) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => bail!("Field '{}' has an unsupported value: {}", field.id, other),
        };
        let feedback = form
            .apply_raw(state, field.id, &raw)
            .with_context(|| format!("Invalid value for {}", field.label))?;
        warnings.extend(feedback);
    }
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusreport::form::fields;
    use campusreport::{FormSpec, RegionIndex};
    use rust_decimal::Decimal;
    use serde_json::json;

    fn index() -> RegionIndex {
        RegionIndex::from_pairs([("North", "Alpha"), ("South", "Gamma")])
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_apply_in_field_order() {
        let spec = FormSpec::attendance(2025, true);
        let index = index();
        let form = Form::new(&spec, &index);
        let mut state = form.blank();

        // Campus listed before region still resolves
        let values = object(json!({
            "campus": "Gamma",
            "region": "South",
            "period": "May 2025",
            "name": "ama",
            "baptized": 3,
            "offering": 12.5,
            "visitors_male": null
        }));
        let warnings = apply(&form, &mut state, &values).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(state.choice(fields::CAMPUS), "Gamma");
        assert_eq!(state.count(fields::BAPTIZED), 3);
        assert_eq!(state.amount(fields::OFFERING), Decimal::new(125, 1));
        assert_eq!(state.name(), "Ama");
    }

    #[test]
    fn test_string_amount_is_exact() {
        let spec = FormSpec::attendance(2025, true);
        let index = index();
        let form = Form::new(&spec, &index);
        let mut state = form.blank();

        apply(&form, &mut state, &object(json!({"offering": "12345678901234567.89"}))).unwrap();
        assert_eq!(state.amount(fields::OFFERING).to_string(), "12345678901234567.89");
    }

    #[test]
    fn test_rejects_unknown_and_invalid() {
        let spec = FormSpec::membership(2025);
        let index = index();
        let form = Form::new(&spec, &index);

        let mut state = form.blank();
        let err = apply(&form, &mut state, &object(json!({"offering": 5}))).unwrap_err();
        assert!(err.to_string().contains("offering"));

        let err = apply(&form, &mut state, &object(json!({"brothers": -2}))).unwrap_err();
        assert!(err.to_string().contains("Brothers"));

        let err = apply(&form, &mut state, &object(json!({"brothers": [1]}))).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_name_warning_is_returned() {
        let spec = FormSpec::membership(2025);
        let index = index();
        let form = Form::new(&spec, &index);
        let mut state = form.blank();

        let warnings = apply(&form, &mut state, &object(json!({"name": "b3n"}))).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(state.name(), "");
    }
}
