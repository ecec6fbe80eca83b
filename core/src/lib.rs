//! Synchronous OpenADR 3 client core.
//!
//! # Overview
//! Typed operations against a VTN (the server side of OpenADR 3) for
//! programs, events, reports, subscriptions, VENs and VEN resources. Every
//! call returns an [`Envelope`] holding either the decoded payload or the
//! [`ProblemDetail`] the server reported.
//!
//! # Design
//! - `OpenAdrClient` is stateless apart from its transport; it holds the
//!   normalized base URL and nothing else.
//! - Requests are plain data (`HttpRequest` / `HttpResponse`). The network
//!   round-trip sits behind the [`Transport`] trait, so the whole pipeline
//!   can be exercised with a stub.
//! - Inputs are validated before anything is sent, and decoded payloads are
//!   validated again before they are handed back.
//! - OAuth2 client credentials are handled by [`AuthenticatedTransport`],
//!   which caches the bearer token until shortly before it expires.
//! - DTOs are defined independently from the mock VTN crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod params;
pub mod transport;
pub mod types;
pub mod validation;

pub use auth::{AuthenticatedTransport, ClientCredentials, TokenSource};
pub use client::{DefaultTransport, OpenAdrClient};
pub use config::ClientConfig;
pub use envelope::{handle_response, Envelope, ProblemDetail};
pub use error::{ClientError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, QueryValue};
pub use params::{
    EventSearch, ProgramSearch, ReportSearch, ResourceSearch, SearchParams, SubscriptionSearch,
    VenSearch, MAX_LIMIT,
};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Event, IntervalPeriod, ObjectOperation, Program, Report, Resource, Subscription, Ven,
};
pub use validation::{Validate, ValidationResult};
