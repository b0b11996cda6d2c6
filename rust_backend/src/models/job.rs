use serde::{Deserialize, Deserializer, Serialize};

/// Accept a job ID given either as a JSON number or as a numeric string.
pub fn deserialize_job_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Int(i64),
        Float(f64),
        String(String),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Int(i) => Ok(i),
        StringOrNumber::Float(f) if f.fract() == 0.0 => Ok(f as i64),
        StringOrNumber::Float(f) => Err(D::Error::custom(format!("non-integer job id {}", f))),
        StringOrNumber::String(s) => s.trim().parse::<i64>().map_err(D::Error::custom),
    }
}

/// Job metadata as listed in the job fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "Job ID", deserialize_with = "deserialize_job_id")]
    pub job_id: i64,
    #[serde(rename = "User", default)]
    pub user: String,
    #[serde(rename = "Project", default)]
    pub project: String,
    #[serde(rename = "Partition", default)]
    pub partition: String,
    #[serde(rename = "QOS", default)]
    pub qos: String,
    #[serde(rename = "Start Time", default)]
    pub start_time: String,
    #[serde(rename = "End Time", default)]
    pub end_time: String,
    #[serde(rename = "Hostname", default)]
    pub hostname: String,
    #[serde(rename = "Charged Node Hours", default)]
    pub charged_node_hours: f64,
}

impl JobRecord {
    pub fn new(job_id: i64) -> Self {
        Self {
            job_id,
            user: String::new(),
            project: String::new(),
            partition: String::new(),
            qos: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            hostname: String::new(),
            charged_node_hours: 0.0,
        }
    }

    pub fn id_string(&self) -> String {
        self.job_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_record_optional_fields_default() {
        let record: JobRecord =
            serde_json::from_str(r#"{"Job ID": 42, "Project": "m1234", "QOS": "regular"}"#).unwrap();
        assert_eq!(record.job_id, 42);
        assert_eq!(record.project, "m1234");
        assert_eq!(record.qos, "regular");
        assert!(record.user.is_empty());
        assert_eq!(record.charged_node_hours, 0.0);
        assert_eq!(record.id_string(), "42");
    }

    #[test]
    fn test_job_id_accepts_string() {
        let record: JobRecord = serde_json::from_str(r#"{"Job ID": "1001"}"#).unwrap();
        assert_eq!(record.job_id, 1001);
        let bad: Result<JobRecord, _> = serde_json::from_str(r#"{"Job ID": "abc"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_job_record_requires_id() {
        let result: Result<JobRecord, _> = serde_json::from_str(r#"{"Project": "m1234"}"#);
        assert!(result.is_err());
    }
}
