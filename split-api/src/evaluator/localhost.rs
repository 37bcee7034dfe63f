use super::{CONTROL, Evaluator, EvaluatorError, Event, Key, SplitView, Treatment};
use crate::validation::Attributes;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const LOCALHOST_TRAFFIC_TYPE: &str = "localhost";

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct YamlEntry {
    treatment: String,
    #[serde(default)]
    keys: Option<OneOrMany>,
    #[serde(default)]
    config: Option<String>,
}

#[derive(Debug, Clone)]
struct Rule {
    treatment: String,
    // `None` applies to every key
    keys: Option<Vec<String>>,
    config: Option<String>,
}

impl Rule {
    fn matches(&self, matching_key: &str) -> bool {
        self.keys
            .as_ref()
            .is_some_and(|keys| keys.iter().any(|k| k == matching_key))
    }
}

impl From<YamlEntry> for Rule {
    fn from(entry: YamlEntry) -> Self {
        let keys = entry.keys.map(|keys| match keys {
            OneOrMany::One(key) => vec![key],
            OneOrMany::Many(keys) => keys,
        });

        Rule {
            treatment: entry.treatment,
            keys,
            config: entry.config,
        }
    }
}

/// Evaluator backed by a local file of split definitions.
///
/// Two formats are understood, picked by file extension:
///
/// `.yaml` / `.yml`:
/// ```yaml
/// - my-experiment:
///     treatment: "on"
///     keys: ["user-1", "user-2"]
///     config: '{"color": "blue"}'
/// - my-experiment:
///     treatment: "off"
/// ```
///
/// anything else, one `<split> <treatment>` pair per line:
/// ```text
/// # comment
/// my-experiment on
/// ```
///
/// For a given key the first rule listing that key wins, then the first rule
/// without keys. Splits without a matching rule evaluate to `control`.
#[derive(Debug, Default)]
pub struct LocalhostEvaluator {
    splits: IndexMap<String, Vec<Rule>>,
}

impl LocalhostEvaluator {
    pub fn from_file(path: &Path) -> Result<Self, EvaluatorError> {
        let contents = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&contents),
            _ => Self::from_split_lines(&contents),
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, EvaluatorError> {
        let mut evaluator = Self::default();
        if contents.trim().is_empty() {
            return Ok(evaluator);
        }

        let entries: Vec<IndexMap<String, YamlEntry>> = serde_yaml::from_str(contents)?;
        for (name, entry) in entries.into_iter().flatten() {
            evaluator.add_rule(name, entry.into());
        }

        Ok(evaluator)
    }

    pub fn from_split_lines(contents: &str) -> Result<Self, EvaluatorError> {
        let mut evaluator = Self::default();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(name), Some(treatment), None) => evaluator.add_rule(
                    name.to_string(),
                    Rule {
                        treatment: treatment.to_string(),
                        keys: None,
                        config: None,
                    },
                ),
                _ => {
                    return Err(EvaluatorError::InvalidLine {
                        line: index + 1,
                        content: line.to_string(),
                    });
                }
            }
        }

        Ok(evaluator)
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    fn add_rule(&mut self, name: String, rule: Rule) {
        self.splits.entry(name).or_default().push(rule);
    }

    fn resolve(&self, split_name: &str, matching_key: &str) -> Treatment {
        let Some(rules) = self.splits.get(split_name) else {
            return Treatment::control();
        };

        rules
            .iter()
            .find(|rule| rule.matches(matching_key))
            .or_else(|| rules.iter().find(|rule| rule.keys.is_none()))
            .map(|rule| Treatment {
                treatment: rule.treatment.clone(),
                config: rule.config.clone(),
            })
            .unwrap_or_else(Treatment::control)
    }

    fn view(name: &str, rules: &[Rule]) -> SplitView {
        let mut treatments: Vec<String> = Vec::new();
        let mut configs = IndexMap::new();

        for rule in rules {
            if !treatments.contains(&rule.treatment) {
                treatments.push(rule.treatment.clone());
            }
            if let Some(config) = &rule.config {
                configs
                    .entry(rule.treatment.clone())
                    .or_insert_with(|| config.clone());
            }
        }

        SplitView {
            name: name.to_string(),
            traffic_type: LOCALHOST_TRAFFIC_TYPE.to_string(),
            killed: false,
            treatments,
            change_number: 0,
            configs,
        }
    }
}

#[async_trait]
impl Evaluator for LocalhostEvaluator {
    async fn treatment(
        &self,
        key: &Key,
        split_name: &str,
        _attributes: Option<&Attributes>,
    ) -> Treatment {
        let treatment = self.resolve(split_name, &key.matching_key);
        if treatment.treatment == CONTROL {
            tracing::debug!(split_name, "No localhost rule applies, returning control");
        }
        treatment
    }

    async fn split_names(&self) -> Vec<String> {
        self.splits.keys().cloned().collect()
    }

    async fn split(&self, split_name: &str) -> Option<SplitView> {
        self.splits
            .get(split_name)
            .map(|rules| Self::view(split_name, rules))
    }

    async fn splits(&self) -> Vec<SplitView> {
        self.splits
            .iter()
            .map(|(name, rules)| Self::view(name, rules))
            .collect()
    }

    async fn track(&self, event: Event) -> bool {
        tracing::info!(
            key = %event.key,
            traffic_type = %event.traffic_type,
            event_type = %event.event_type,
            value = ?event.value,
            "Tracked event"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::SPLITS_YAML;
    use std::io::Write;

    fn key(matching_key: &str) -> Key {
        Key::new(matching_key, None)
    }

    #[tokio::test]
    async fn test_yaml_resolution() {
        let evaluator = LocalhostEvaluator::from_yaml(SPLITS_YAML).unwrap();

        let on = evaluator.treatment(&key("test"), "my-experiment", None).await;
        assert_eq!(on.treatment, "on");
        assert_eq!(
            on.config.as_deref(),
            Some(r#"{"desc" : "this applies only to ON treatment"}"#)
        );

        // Keyed rule exists but does not match and there is no default
        let other = evaluator.treatment(&key("12345"), "my-experiment", None).await;
        assert_eq!(other, Treatment::control());

        let default = evaluator
            .treatment(&key("anyone"), "other-experiment-3", None)
            .await;
        assert_eq!(default.treatment, "off");
        assert_eq!(default.config, None);

        let unknown = evaluator.treatment(&key("test"), "missing", None).await;
        assert_eq!(unknown, Treatment::control());
    }

    #[tokio::test]
    async fn test_keyed_rule_wins_over_default() {
        let evaluator = LocalhostEvaluator::from_yaml(
            r#"
- feature:
    treatment: "off"
- feature:
    treatment: "on"
    keys: ["vip-1", "vip-2"]
"#,
        )
        .unwrap();

        assert_eq!(
            evaluator.treatment(&key("vip-2"), "feature", None).await.treatment,
            "on"
        );
        assert_eq!(
            evaluator.treatment(&key("regular"), "feature", None).await.treatment,
            "off"
        );
    }

    #[tokio::test]
    async fn test_manager_views() {
        let evaluator = LocalhostEvaluator::from_yaml(SPLITS_YAML).unwrap();

        assert_eq!(
            evaluator.split_names().await,
            vec![
                "my-experiment",
                "other-experiment-3",
                "other-experiment",
                "other-experiment-2"
            ]
        );

        let view = evaluator.split("my-experiment").await.unwrap();
        assert_eq!(view.traffic_type, "localhost");
        assert_eq!(view.treatments, vec!["on"]);
        assert_eq!(
            view.configs.get("on").map(String::as_str),
            Some(r#"{"desc" : "this applies only to ON treatment"}"#)
        );
        assert!(evaluator.split("missing").await.is_none());
        assert_eq!(evaluator.splits().await.len(), 4);
    }

    #[test]
    fn test_split_lines() {
        let evaluator = LocalhostEvaluator::from_split_lines(
            "# flags\n\nfeature-a on\n  feature-b   off  \n",
        )
        .unwrap();
        assert_eq!(evaluator.len(), 2);
        assert_eq!(evaluator.resolve("feature-b", "k").treatment, "off");

        let err = LocalhostEvaluator::from_split_lines("feature-a on\nbroken\n").unwrap_err();
        assert!(matches!(err, EvaluatorError::InvalidLine { line: 2, .. }));
    }

    #[test]
    fn test_empty_and_invalid_yaml() {
        assert!(LocalhostEvaluator::from_yaml("  \n").unwrap().is_empty());
        assert!(matches!(
            LocalhostEvaluator::from_yaml("- feature: {keys: a}").unwrap_err(),
            EvaluatorError::Yaml(_)
        ));
    }

    #[test]
    fn test_from_file_picks_format_by_extension() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(yaml, "{}", SPLITS_YAML).unwrap();
        assert_eq!(LocalhostEvaluator::from_file(yaml.path()).unwrap().len(), 4);

        let mut lines = tempfile::Builder::new().suffix(".split").tempfile().unwrap();
        writeln!(lines, "feature on").unwrap();
        assert_eq!(LocalhostEvaluator::from_file(lines.path()).unwrap().len(), 1);

        assert!(matches!(
            LocalhostEvaluator::from_file(Path::new("/nonexistent/splits.yaml")).unwrap_err(),
            EvaluatorError::Io(_)
        ));
    }
}
