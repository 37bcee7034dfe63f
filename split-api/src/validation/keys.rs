use super::ValidationError;
use super::key::validate_json_key;
use super::traffic_type::validate_json_traffic_type;
use serde::Serialize;
use serde_json::Value;

/// A validated `matchingKey`/`trafficType`/`bucketingKey` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    pub matching_key: String,
    pub traffic_type: String,
    /// `None` means the matching key is also used for bucketing.
    pub bucketing_key: Option<String>,
}

/// Validates the serialized `keys` parameter of the bulk endpoints.
///
/// Any invalid element fails the whole list with a single generic error;
/// which element or field was wrong is only reported through debug logs.
pub fn validate_keys(raw: Option<&str>) -> Result<Vec<KeyRecord>, ValidationError> {
    let Some(raw) = raw else {
        return Err(ValidationError::MissingKeys);
    };

    let elements = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(elements)) => elements,
        _ => return Err(ValidationError::InvalidFormat),
    };

    if elements.is_empty() {
        return Err(ValidationError::EmptyArray);
    }

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            validate_element(element).map_err(|err| {
                tracing::debug!(index, error = %err, "Invalid element in keys");
                ValidationError::ElementInvalid
            })
        })
        .collect()
}

fn validate_element(element: &Value) -> Result<KeyRecord, ValidationError> {
    // `Value::get` yields `None` for non-object elements, which then fail as missing fields
    let traffic_type = validate_json_traffic_type(element.get("trafficType"))?;
    let matching_key = validate_json_key(element.get("matchingKey"), "matchingKey")?;
    let bucketing_key = element
        .get("bucketingKey")
        .map(|raw| validate_json_key(Some(raw), "bucketingKey"))
        .transpose()?;

    Ok(KeyRecord {
        matching_key,
        traffic_type,
        bucketing_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_element_invalid(raw: &str) {
        assert_eq!(
            validate_keys(Some(raw)).unwrap_err(),
            ValidationError::ElementInvalid,
            "expected {raw} to be rejected"
        );
    }

    #[test]
    fn test_missing() {
        assert_eq!(
            validate_keys(None).unwrap_err().to_string(),
            "you passed null or undefined keys, keys must be a non-empty array."
        );
    }

    #[test]
    fn test_invalid_format() {
        for raw in ["", "{}", "lalala", "\"keys\"", "42", "[{\"matchingKey\""] {
            assert_eq!(
                validate_keys(Some(raw)).unwrap_err().to_string(),
                "keys must be a valid format.",
                "input: {raw}"
            );
        }
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(
            validate_keys(Some("[]")).unwrap_err().to_string(),
            "There should be at least one matchingKey-trafficType element."
        );
    }

    #[test]
    fn test_invalid_elements() {
        assert_eq!(
            validate_keys(Some("[1,2,3,4]")).unwrap_err().to_string(),
            "keys is array but there are errors inside of it. keys must be an array with at least one element that contain a valid matchingKey and trafficType. It can also includes bucketingKey."
        );

        let long_key = "a".repeat(251);
        let cases = [
            r#"[{"matchingKey":"my-key"}]"#.to_string(),
            r#"[{"matchingKey":"my-key","trafficType":true}]"#.to_string(),
            r#"[{"matchingKey":"my-key","trafficType":""}]"#.to_string(),
            r#"[{"trafficType":"my-tt"}]"#.to_string(),
            r#"[{"matchingKey":true,"trafficType":"my-tt"}]"#.to_string(),
            r#"[{"matchingKey":"","trafficType":"my-tt"}]"#.to_string(),
            r#"[{"matchingKey":"    ","trafficType":"my-tt"}]"#.to_string(),
            format!(r#"[{{"matchingKey":"{long_key}","trafficType":"my-tt"}}]"#),
            r#"[{"matchingKey":"my-key","trafficType":"my-tt","bucketingKey":[]}]"#.to_string(),
            r#"[{"matchingKey":"my-key","trafficType":"my-tt","bucketingKey":""}]"#.to_string(),
            r#"[{"matchingKey":"my-key","trafficType":"my-tt","bucketingKey":"   "}]"#.to_string(),
            r#"[{"matchingKey":"my-key","trafficType":"my-tt","bucketingKey":null}]"#.to_string(),
            format!(r#"[{{"matchingKey":"my-key","bucketingKey":"{long_key}","trafficType":"my-tt"}}]"#),
        ];
        for raw in &cases {
            assert_element_invalid(raw);
        }
    }

    #[test]
    fn test_one_bad_element_fails_all() {
        assert_element_invalid(
            r#"[{"matchingKey":"k","trafficType":"tt"},{"matchingKey":"k2"}]"#,
        );
    }

    #[test]
    fn test_valid_single_key() {
        let keys = validate_keys(Some(r#"[{"matchingKey":"k","trafficType":"tt"}]"#)).unwrap();
        assert_eq!(
            keys,
            vec![KeyRecord {
                matching_key: "k".into(),
                traffic_type: "tt".into(),
                bucketing_key: None,
            }]
        );
    }

    #[test]
    fn test_normalizes_and_keeps_order() {
        let keys = validate_keys(Some(
            r#"[
                {"matchingKey":12345,"trafficType":"Localhost"},
                {"matchingKey":" user-1 ","trafficType":"USER","bucketingKey":" b "}
            ]"#,
        ))
        .unwrap();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].matching_key, "12345");
        assert_eq!(keys[0].traffic_type, "localhost");
        assert_eq!(keys[0].bucketing_key, None);
        assert_eq!(keys[1].matching_key, "user-1");
        assert_eq!(keys[1].traffic_type, "user");
        assert_eq!(keys[1].bucketing_key.as_deref(), Some("b"));
    }
}
