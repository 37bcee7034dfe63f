use super::{ApiResponse, ok_json};
use crate::errors::Result;
use crate::evaluator::{Evaluator, Event, Key, Treatment};
use crate::query::QueryParams;
use crate::validation::{
    Validation, ValidationError, validate_attributes, validate_key, validate_keys,
    validate_split_name, validate_split_names, validate_string, validate_traffic_type,
    validate_value,
};
use indexmap::IndexMap;
use serde::Serialize;

/// Treatment of one split as returned to the caller.
#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SplitTreatment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_name: Option<String>,
    pub treatment: String,
    // Outer `None` leaves the field out; `Some(None)` renders `null`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Option<String>>,
}

impl SplitTreatment {
    fn new(split_name: Option<String>, treatment: Treatment, with_config: bool) -> Self {
        SplitTreatment {
            split_name,
            treatment: treatment.treatment,
            config: with_config.then_some(treatment.config),
        }
    }
}

#[derive(Serialize)]
struct TrackResponse {
    result: bool,
}

fn validate_bucketing_key(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    raw.map(|raw| validate_key(Some(raw), "bucketingKey"))
        .transpose()
}

/// `GET /get-treatment[-with-config]?key=&bucketing-key=&split-name=&attributes=`
pub async fn get_treatment(
    evaluator: &dyn Evaluator,
    params: &QueryParams,
    with_config: bool,
) -> Result<ApiResponse> {
    let mut validation = Validation::default();
    let matching_key = validation.check(validate_key(params.get("key"), "key"));
    let bucketing_key = validation.check(validate_bucketing_key(params.get("bucketing-key")));
    let attributes = validation.check(validate_attributes(params.get("attributes")));
    let split_name = validation.check(validate_split_name(params.get("split-name")));
    let (((matching_key, bucketing_key), attributes), split_name) = validation.finish(
        matching_key
            .zip(bucketing_key)
            .zip(attributes)
            .zip(split_name),
    )?;

    let key = Key::new(matching_key, bucketing_key);
    let treatment = evaluator
        .treatment(&key, &split_name, attributes.as_ref())
        .await;

    ok_json(&SplitTreatment::new(Some(split_name), treatment, with_config))
}

/// `GET /get-treatments[-with-config]?key=&bucketing-key=&split-names=&attributes=`
pub async fn get_treatments(
    evaluator: &dyn Evaluator,
    params: &QueryParams,
    with_config: bool,
) -> Result<ApiResponse> {
    let mut validation = Validation::default();
    let matching_key = validation.check(validate_key(params.get("key"), "key"));
    let bucketing_key = validation.check(validate_bucketing_key(params.get("bucketing-key")));
    let attributes = validation.check(validate_attributes(params.get("attributes")));
    let split_names = validation.check(validate_split_names(params.get("split-names")));
    let (((matching_key, bucketing_key), attributes), split_names) = validation.finish(
        matching_key
            .zip(bucketing_key)
            .zip(attributes)
            .zip(split_names),
    )?;

    let key = Key::new(matching_key, bucketing_key);
    let mut treatments = IndexMap::with_capacity(split_names.len());
    for split_name in split_names {
        let treatment = evaluator
            .treatment(&key, &split_name, attributes.as_ref())
            .await;
        treatments.insert(split_name, SplitTreatment::new(None, treatment, with_config));
    }

    ok_json(&treatments)
}

/// `GET /get-all-treatments[-with-config]?keys=&attributes=`
///
/// Evaluates every split of each key's traffic type. Results are grouped by
/// traffic type; a later key with the same traffic type replaces the earlier one.
pub async fn get_all_treatments(
    evaluator: &dyn Evaluator,
    params: &QueryParams,
    with_config: bool,
) -> Result<ApiResponse> {
    let mut validation = Validation::default();
    let keys = validation.check(validate_keys(params.get("keys")));
    let attributes = validation.check(validate_attributes(params.get("attributes")));
    let (keys, attributes) = validation.finish(keys.zip(attributes))?;

    let splits = evaluator.splits().await;
    let mut results: IndexMap<String, Vec<SplitTreatment>> = IndexMap::new();

    for record in &keys {
        let key = Key::from(record);
        let mut treatments = Vec::new();
        for split in splits
            .iter()
            .filter(|split| split.traffic_type == record.traffic_type)
        {
            let treatment = evaluator
                .treatment(&key, &split.name, attributes.as_ref())
                .await;
            treatments.push(SplitTreatment::new(
                Some(split.name.clone()),
                treatment,
                with_config,
            ));
        }
        results.insert(record.traffic_type.clone(), treatments);
    }

    ok_json(&results)
}

/// `GET /track?key=&traffic-type=&event-type=&value=`
pub async fn track(evaluator: &dyn Evaluator, params: &QueryParams) -> Result<ApiResponse> {
    let mut validation = Validation::default();
    let key = validation.check(validate_key(params.get("key"), "key"));
    let traffic_type = validation.check(validate_traffic_type(params.get("traffic-type")));
    let event_type = validation.check(validate_string(params.get("event-type"), "event-type"));
    let value = validation.check(validate_value(params.get("value")));
    let (((key, traffic_type), event_type), value) =
        validation.finish(key.zip(traffic_type).zip(event_type).zip(value))?;

    let result = evaluator
        .track(Event {
            key,
            traffic_type,
            event_type,
            value,
        })
        .await;

    ok_json(&TrackResponse { result })
}
