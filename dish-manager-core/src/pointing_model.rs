//! `ApplyPointingModel` JSON validation (spec §6, §7): antenna-id match,
//! supported band, and the 18-coefficient canonical order/range check.
//!
//! Deliberately narrow: the spec's Non-goals exclude a general pointing-model
//! JSON *schema* parser, only the canonical-order/range checks it names.

use dish_manager_types::DishManagerConfig;

/// Coefficient names in the order spec.md §6 requires them to appear.
const CANONICAL_ORDER: [&str; 18] = [
    "IA", "CA", "NPAE", "AN", "AN0", "AW", "AW0", "ACEC", "ACES", "ABA", "ABphi", "IE", "ECEC",
    "ECES", "HECE4", "HESE4", "HECE8", "HESE8",
];

const SUPPORTED_BANDS: [&str; 6] = ["Band_1", "Band_2", "Band_3", "Band_4", "Band_5a", "Band_5b"];

/// Validates an `ApplyPointingModel` payload, returning the DS attribute
/// band suffix (e.g. `"1"`, `"5a"`) and the 18 coefficient values in
/// canonical order on success.
pub fn validate(config: &DishManagerConfig, json: &serde_json::Value) -> Result<(String, Vec<f64>), String> {
    let antenna = json.get("antenna").and_then(|v| v.as_str()).unwrap_or("");
    if antenna != config.validation.antenna_id {
        return Err(format!(
            "Command rejected. The Dish id {} and the Antenna's value {} are not equal.",
            config.validation.antenna_id, antenna
        ));
    }

    let band = json.get("band").and_then(|v| v.as_str()).unwrap_or("");
    if !SUPPORTED_BANDS.contains(&band) {
        return Err(format!("Unsupported Band: {band}"));
    }

    let Some(coefficients) = json.get("coefficients").and_then(|v| v.as_object()) else {
        return Err(coefficients_error(&[]));
    };

    let found: Vec<&str> = coefficients.keys().map(String::as_str).collect();
    if found != CANONICAL_ORDER {
        return Err(coefficients_error(&found));
    }

    let mut values = Vec::with_capacity(CANONICAL_ORDER.len());
    for (index, name) in CANONICAL_ORDER.iter().enumerate() {
        let Some(value) = coefficients.get(*name).and_then(|v| v.get("value")).and_then(|v| v.as_f64()) else {
            return Err(coefficients_error(&found));
        };
        let in_range = if *name == "ABphi" {
            (0.0..=360.0).contains(&value)
        } else {
            (-2000.0..=2000.0).contains(&value)
        };
        if !in_range {
            return Err(format!("{name} value {value} is out of range"));
        }
        values.push(value);
    }

    Ok((band.trim_start_matches("Band_").to_lowercase(), values))
}

fn coefficients_error(found: &[&str]) -> String {
    format!(
        "Coefficients are missing or not in the correct order. The coefficients found in the JSON object were {found:?}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coefficient_payload(band: &str) -> serde_json::Value {
        let mut coefficients = serde_json::Map::new();
        for name in CANONICAL_ORDER {
            let value = if name == "ABphi" { 10.0 } else { 1.0 };
            coefficients.insert(name.to_string(), json!({"value": value}));
        }
        json!({
            "interface": "https://skao.int/ska-telmodel-schema/0-1",
            "antenna": "SKA001",
            "band": band,
            "coefficients": coefficients,
        })
    }

    #[test]
    fn valid_payload_is_accepted() {
        let config = DishManagerConfig::default();
        let (band, values) = validate(&config, &coefficient_payload("Band_2")).unwrap();
        assert_eq!(band, "2");
        assert_eq!(values.len(), 18);
    }

    #[test]
    fn mismatched_antenna_is_rejected() {
        let config = DishManagerConfig::default();
        let mut payload = coefficient_payload("Band_1");
        payload["antenna"] = json!("SKA999");
        let err = validate(&config, &payload).unwrap_err();
        assert_eq!(
            err,
            "Command rejected. The Dish id SKA001 and the Antenna's value SKA999 are not equal."
        );
    }

    #[test]
    fn unsupported_band_is_rejected() {
        let config = DishManagerConfig::default();
        let err = validate(&config, &coefficient_payload("Band_9")).unwrap_err();
        assert_eq!(err, "Unsupported Band: Band_9");
    }

    #[test]
    fn out_of_order_coefficients_are_rejected() {
        let config = DishManagerConfig::default();
        let mut payload = coefficient_payload("Band_1");
        let coefficients = payload["coefficients"].as_object_mut().unwrap();
        let ia = coefficients.shift_remove("IA").unwrap();
        coefficients.insert("IA".to_string(), ia);
        let err = validate(&config, &payload).unwrap_err();
        assert!(err.starts_with("Coefficients are missing or not in the correct order."));
    }

    #[test]
    fn abphi_out_of_range_is_rejected() {
        let config = DishManagerConfig::default();
        let mut payload = coefficient_payload("Band_1");
        payload["coefficients"]["ABphi"] = json!({"value": 400.0});
        let err = validate(&config, &payload).unwrap_err();
        assert!(err.contains("ABphi"));
    }
}
