//! GitHub Actions workflow input.
//!
//! Each entry of the top-level `jobs` mapping becomes one node, in file
//! order. `needs` (a string or a list) becomes the node's dependencies.
//! Node metadata carries:
//!
//! | key             | value |
//! |-----------------|-------|
//! | `condition`     | the job's `if:` expression as a string, or `null` |
//! | `has_condition` | whether an `if:` is present |
//! | `runs_on`       | the job's `runs-on`, defaulting to `"ubuntu-latest"` |

use anyhow::{Context, Result, bail};
use depstage_core::{Metadata, NodeEntry};
use serde::Deserialize;
use serde_json::json;
use serde_yaml::{Mapping, Value};

use super::ParsedInput;

/// Runner label assumed when a job has no `runs-on`.
pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

#[derive(Debug, Deserialize)]
struct WorkflowFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    jobs: Option<Mapping>,
}

#[derive(Debug, Default, Deserialize)]
struct Job {
    #[serde(default)]
    needs: Option<Needs>,
    #[serde(default, rename = "if")]
    condition: Option<Value>,
    #[serde(default, rename = "runs-on")]
    runs_on: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Needs {
    One(String),
    Many(Vec<String>),
}

impl Needs {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(name) => vec![name],
            Self::Many(names) => names,
        }
    }
}

/// `true` if `content` is a YAML mapping with a top-level `jobs` key.
pub fn looks_like_workflow(content: &str) -> bool {
    serde_yaml::from_str::<Value>(content)
        .ok()
        .and_then(|value| value.as_mapping().map(|map| map.contains_key("jobs")))
        .unwrap_or(false)
}

pub fn parse(content: &str) -> Result<ParsedInput> {
    let workflow: WorkflowFile = serde_yaml::from_str(content)?;
    let Some(jobs) = workflow.jobs else {
        bail!("No jobs found in workflow file");
    };

    let mut entries = Vec::with_capacity(jobs.len());
    for (key, body) in jobs {
        let Some(name) = key.as_str().map(str::to_string) else {
            bail!("job id must be a string, found {key:?}");
        };
        let job: Job = if body.is_null() {
            Job::default()
        } else {
            serde_yaml::from_value(body).with_context(|| format!("invalid job '{name}'"))?
        };

        let depends_on = job.needs.map(Needs::into_vec).unwrap_or_default();
        entries.push(NodeEntry {
            name,
            depends_on,
            metadata: job_metadata(job.condition.as_ref(), job.runs_on.as_ref()),
        });
    }

    Ok(ParsedInput {
        title: workflow.name,
        entries,
    })
}

fn job_metadata(condition: Option<&Value>, runs_on: Option<&Value>) -> Metadata {
    let condition = condition.and_then(scalar_text);
    let runs_on = runs_on.map_or_else(
        || json!(DEFAULT_RUNNER),
        |value| serde_json::to_value(value).unwrap_or_else(|_| json!(DEFAULT_RUNNER)),
    );

    Metadata::from([
        ("has_condition".to_string(), json!(condition.is_some())),
        ("condition".to_string(), json!(condition)),
        ("runs_on".to_string(), runs_on),
    ])
}

/// Text of a scalar `if:` value; `if: true` is kept as `"true"`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Null => None,
        other => serde_yaml::to_string(other)
            .ok()
            .map(|text| text.trim().to_string()),
    }
}

/// Condition string stored by [`parse`], if the job has one.
pub fn condition_of(metadata: &Metadata) -> Option<&str> {
    metadata.get("condition").and_then(serde_json::Value::as_str)
}
