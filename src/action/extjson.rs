//! Lenient field decoders for action documents exported as (extended) JSON.
//!
//! Exports of the action log may wrap numbers and dates the way `mongoexport` does
//! (`{"$numberInt": "3"}`, `{"$date": "..."}`). Values that cannot be interpreted decode to
//! `None` so the record stays drawable or inert instead of failing the whole stream.

use chrono::{DateTime, TimeZone as _, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(number_from_value))
}

pub(crate) fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(datetime_from_value))
}

pub(crate) fn number_from_value(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => ["$numberInt", "$numberLong", "$numberDouble", "$numberDecimal"]
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(number_from_value),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

pub(crate) fn datetime_from_value(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(map) => {
            let inner = map.get("$date")?;
            match inner {
                Value::Object(_) => number_from_value(inner)
                    .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single()),
                _ => datetime_from_value(inner),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn numbers_plain_wrapped_and_stringly() {
        assert_eq!(number_from_value(&json!(3)), Some(3.0));
        assert_eq!(number_from_value(&json!(2.75)), Some(2.75));
        assert_eq!(number_from_value(&json!({"$numberInt": "7"})), Some(7.0));
        assert_eq!(number_from_value(&json!({"$numberDouble": "1.5"})), Some(1.5));
        assert_eq!(number_from_value(&json!(" 12 ")), Some(12.0));
    }

    #[test]
    fn non_numbers_and_non_finite_are_none() {
        assert_eq!(number_from_value(&json!(true)), None);
        assert_eq!(number_from_value(&json!([1])), None);
        assert_eq!(number_from_value(&json!("abc")), None);
        assert_eq!(number_from_value(&json!({"$numberDouble": "NaN"})), None);
        assert_eq!(number_from_value(&json!({"$numberDouble": "Infinity"})), None);
    }

    #[test]
    fn dates_in_every_export_shape() {
        let want = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(datetime_from_value(&json!("2024-03-01T12:30:05Z")), Some(want));
        assert_eq!(
            datetime_from_value(&json!("2024-03-01T20:30:05+08:00")),
            Some(want)
        );
        assert_eq!(
            datetime_from_value(&json!({"$date": "2024-03-01T12:30:05.000Z"})),
            Some(want)
        );
        let ms = want.timestamp_millis();
        assert_eq!(datetime_from_value(&json!({"$date": ms})), Some(want));
        assert_eq!(
            datetime_from_value(&json!({"$date": {"$numberLong": ms.to_string()}})),
            Some(want)
        );
    }

    #[test]
    fn bad_dates_are_none() {
        assert_eq!(datetime_from_value(&json!("yesterday")), None);
        assert_eq!(datetime_from_value(&json!({"when": 1})), None);
        assert_eq!(datetime_from_value(&json!(null)), None);
    }
}
