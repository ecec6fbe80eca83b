//! Query parameters for the search operations.
//!
//! Every filter is optional: `None` (or an empty list) leaves the parameter
//! out of the URL, while `Some(0)` or `Some(String::new())` is sent as given.
//! `Default` yields a search with no filters and no pagination.

use crate::http::{QueryParams, QueryValue};
use crate::validation::Validate;

/// Largest page size the VTN accepts.
pub const MAX_LIMIT: i32 = 50;

/// A validated, URL-encodable set of search filters.
pub trait SearchParams: Validate {
    /// Parameters in wire order (pagination first), with absent filters as
    /// `None`.
    fn query(&self) -> QueryParams;
}

fn text(value: &Option<String>) -> Option<QueryValue> {
    value.as_deref().map(QueryValue::from)
}

fn list(values: &[String]) -> Option<QueryValue> {
    if values.is_empty() {
        None
    } else {
        Some(QueryValue::List(values.to_vec()))
    }
}

fn number(value: Option<i32>) -> Option<QueryValue> {
    value.map(QueryValue::from)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSearch {
    pub targets: Vec<String>,
    pub skip: Option<i32>,
    pub limit: Option<i32>,
}

impl SearchParams for ProgramSearch {
    fn query(&self) -> QueryParams {
        vec![
            ("skip", number(self.skip)),
            ("limit", number(self.limit)),
            ("targets", list(&self.targets)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSearch {
    pub program_id: Option<String>,
    pub targets: Vec<String>,
    pub skip: Option<i32>,
    pub limit: Option<i32>,
}

impl SearchParams for EventSearch {
    fn query(&self) -> QueryParams {
        vec![
            ("skip", number(self.skip)),
            ("limit", number(self.limit)),
            ("programID", text(&self.program_id)),
            ("targets", list(&self.targets)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSearch {
    pub program_id: Option<String>,
    pub event_id: Option<String>,
    pub client_name: Option<String>,
    pub skip: Option<i32>,
    pub limit: Option<i32>,
}

impl SearchParams for ReportSearch {
    fn query(&self) -> QueryParams {
        vec![
            ("skip", number(self.skip)),
            ("limit", number(self.limit)),
            ("programID", text(&self.program_id)),
            ("eventID", text(&self.event_id)),
            ("clientName", text(&self.client_name)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSearch {
    pub program_id: Option<String>,
    pub client_name: Option<String>,
    pub objects: Vec<String>,
    pub skip: Option<i32>,
    pub limit: Option<i32>,
}

impl SearchParams for SubscriptionSearch {
    fn query(&self) -> QueryParams {
        vec![
            ("skip", number(self.skip)),
            ("limit", number(self.limit)),
            ("programID", text(&self.program_id)),
            ("clientName", text(&self.client_name)),
            ("objects", list(&self.objects)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenSearch {
    pub ven_name: Option<String>,
    pub targets: Vec<String>,
    pub skip: Option<i32>,
    pub limit: Option<i32>,
}

impl SearchParams for VenSearch {
    fn query(&self) -> QueryParams {
        vec![
            ("skip", number(self.skip)),
            ("limit", number(self.limit)),
            ("venName", text(&self.ven_name)),
            ("targets", list(&self.targets)),
        ]
    }
}

/// Filters for the resources under a single VEN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSearch {
    pub resource_name: Option<String>,
    pub targets: Vec<String>,
    pub skip: Option<i32>,
    pub limit: Option<i32>,
}

impl SearchParams for ResourceSearch {
    fn query(&self) -> QueryParams {
        vec![
            ("skip", number(self.skip)),
            ("limit", number(self.limit)),
            ("resourceName", text(&self.resource_name)),
            ("targets", list(&self.targets)),
        ]
    }
}
