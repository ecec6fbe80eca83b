//! Client-side validation of resources and search parameters.
//!
//! # Design
//! Validators are pure and report every violated rule, in rule order, rather
//! than stopping at the first. Resource validators only check that required
//! fields are present and non-blank; format and cross-field consistency are
//! left to the server. The same validators run on outbound payloads and on
//! decoded responses.

use crate::error::ClientError;
use crate::params::{
    EventSearch, ProgramSearch, ReportSearch, ResourceSearch, SubscriptionSearch, VenSearch,
    MAX_LIMIT,
};
use crate::types::{Event, Program, Report, Resource, Subscription, Ven};

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

pub trait Validate {
    /// Name used in error messages, e.g. `program`.
    const SUBJECT: &'static str;

    fn validate(&self) -> ValidationResult;
}

fn require(errors: &mut Vec<String>, value: &str, field: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    }
}

fn check_pagination(errors: &mut Vec<String>, skip: Option<i32>, limit: Option<i32>) {
    if skip.is_some_and(|skip| skip < 0) {
        errors.push("skip must be non-negative".to_string());
    }
    if limit.is_some_and(|limit| !(0..=MAX_LIMIT).contains(&limit)) {
        errors.push(format!("limit must be between 0 and {MAX_LIMIT}"));
    }
}

/// Reject an identifier that cannot name a single path segment, before
/// anything else about the call is checked.
///
/// URL parsing resolves `.` and `..` (in any percent-encoded spelling), so
/// such ids would address a different resource than the one named.
pub fn require_id(name: &str, id: &str) -> Result<(), ClientError> {
    let error = if id.trim().is_empty() {
        format!("{name} cannot be empty")
    } else if id == "." || id == ".." {
        format!("{name} cannot be a dot segment")
    } else {
        return Ok(());
    };
    Err(ClientError::InvalidInput {
        subject: name.to_string(),
        errors: vec![error],
    })
}

/// Turn a failed result into a request-side error.
pub fn check_input<T: Validate + ?Sized>(value: &T) -> Result<(), ClientError> {
    let result = value.validate();
    if result.is_valid() {
        Ok(())
    } else {
        Err(ClientError::InvalidInput {
            subject: T::SUBJECT.to_string(),
            errors: result.into_errors(),
        })
    }
}

/// Turn a failed result into a response-side error.
pub fn check_response<T: Validate + ?Sized>(value: &T) -> Result<(), ClientError> {
    let result = value.validate();
    if result.is_valid() {
        Ok(())
    } else {
        Err(ClientError::InvalidResponse {
            subject: T::SUBJECT.to_string(),
            errors: result.into_errors(),
        })
    }
}

impl Validate for Program {
    const SUBJECT: &'static str = "program";

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require(&mut errors, &self.program_name, "programName");
        require(&mut errors, &self.retailer_name, "retailerName");
        require(&mut errors, &self.program_type, "programType");
        ValidationResult::from_errors(errors)
    }
}

impl Validate for Event {
    const SUBJECT: &'static str = "event";

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require(&mut errors, &self.program_id, "programId");
        require(&mut errors, &self.event_name, "eventName");
        ValidationResult::from_errors(errors)
    }
}

impl Validate for Report {
    const SUBJECT: &'static str = "report";

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require(&mut errors, &self.program_id, "programId");
        require(&mut errors, &self.client_name, "clientName");
        require(&mut errors, &self.report_name, "reportName");
        ValidationResult::from_errors(errors)
    }
}

impl Validate for Subscription {
    const SUBJECT: &'static str = "subscription";

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require(&mut errors, &self.client_name, "clientName");
        require(&mut errors, &self.program_id, "programId");
        for (i, op) in self.object_operations.iter().enumerate() {
            require(&mut errors, &op.callback_url, &format!("objectOperations[{i}].callbackUrl"));
        }
        ValidationResult::from_errors(errors)
    }
}

impl Validate for Ven {
    const SUBJECT: &'static str = "ven";

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require(&mut errors, &self.ven_name, "venName");
        ValidationResult::from_errors(errors)
    }
}

impl Validate for Resource {
    const SUBJECT: &'static str = "resource";

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require(&mut errors, &self.resource_name, "resourceName");
        ValidationResult::from_errors(errors)
    }
}

/// A list is valid only if every element is; the first invalid element
/// decides the result.
impl<T: Validate> Validate for Vec<T> {
    const SUBJECT: &'static str = T::SUBJECT;

    fn validate(&self) -> ValidationResult {
        for (i, item) in self.iter().enumerate() {
            let result = item.validate();
            if !result.is_valid() {
                let errors = result
                    .into_errors()
                    .into_iter()
                    .map(|e| format!("item {i}: {e}"))
                    .collect();
                return ValidationResult::from_errors(errors);
            }
        }
        ValidationResult::default()
    }
}

macro_rules! paginated {
    ($($ty:ty => $subject:literal),* $(,)?) => {
        $(
            impl Validate for $ty {
                const SUBJECT: &'static str = $subject;

                fn validate(&self) -> ValidationResult {
                    let mut errors = Vec::new();
                    check_pagination(&mut errors, self.skip, self.limit);
                    ValidationResult::from_errors(errors)
                }
            }
        )*
    };
}

paginated! {
    ProgramSearch => "program search parameters",
    EventSearch => "event search parameters",
    ReportSearch => "report search parameters",
    SubscriptionSearch => "subscription search parameters",
    VenSearch => "ven search parameters",
    ResourceSearch => "resource search parameters",
}
