use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Lifecycle status of a job
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    /// Stored text form, identical to the JSON form
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::InProgress => "In Progress",
            JobStatus::Completed => "Completed",
            JobStatus::Cancelled => "Cancelled",
        }
    }
}

/// Columns a job listing can be ordered by
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    StartDate,
    Customer,
    Status,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::StartDate => "start_date",
            SortField::Customer => "customer",
            SortField::Status => "status",
        }
    }
}

/// Job model for creating and validating jobs
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_date_order", skip_on_field_errors = false))]
pub struct CreateJob {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Customer must be between 1 and 100 characters"
    ))]
    pub customer: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<JobStatus>,
}

fn validate_date_order(job: &CreateJob) -> Result<(), ValidationError> {
    match (job.start_date, job.end_date) {
        (Some(start), Some(end)) if end < start => {
            let mut err = ValidationError::new("date_order");
            err.message = Some(Cow::from("end_date must not be earlier than start_date"));
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Query string accepted by the job listing
#[derive(Deserialize, Debug, Default, Clone, Validate)]
pub struct JobQuery {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Keyword must be between 1 and 100 characters"
    ))]
    pub keyword: Option<String>,
    pub status: Option<JobStatus>,
    pub start_after: Option<NaiveDate>,
    pub end_before: Option<NaiveDate>,
    pub sort_by: Option<SortField>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub desc: bool,
}

/// Accept the usual query string spellings of a boolean
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean such as true/false, 1/0, yes/no or on/off")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Unsigned(other), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
            }
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}
