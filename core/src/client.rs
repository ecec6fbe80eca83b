//! Typed OpenADR 3 operations over an authenticated transport.
//!
//! # Design
//! `OpenAdrClient` holds only the normalized base URL and a transport; it
//! keeps no state between calls. Every operation runs the same steps:
//!
//! 1. reject a blank identifier, then validate the parameters or payload;
//! 2. build the request;
//! 3. send it through the transport;
//! 4. classify and decode the response into an [`Envelope`];
//! 5. validate any decoded payload (every element, for searches).
//!
//! Nothing is sent when step 1 fails. A payload that fails step 5 fails the
//! call even though the HTTP exchange succeeded.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{AuthenticatedTransport, ClientCredentials};
use crate::config::{normalize_base_url, ClientConfig};
use crate::envelope::{handle_response, Envelope};
use crate::error::Result;
use crate::http::{build_request, HttpMethod, QueryValue};
use crate::params::{
    EventSearch, ProgramSearch, ReportSearch, ResourceSearch, SearchParams, SubscriptionSearch,
    VenSearch,
};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Event, Program, Report, Resource, Subscription, Ven};
use crate::validation::{check_input, check_response, require_id, Validate};

/// Transport used by [`OpenAdrClient::new`].
pub type DefaultTransport = AuthenticatedTransport<UreqTransport, ClientCredentials>;

/// Client for one VTN.
#[derive(Debug)]
pub struct OpenAdrClient<T = DefaultTransport> {
    base_url: String,
    transport: T,
}

impl OpenAdrClient {
    /// Client over `ureq` that authenticates with the client-credentials
    /// grant at `{base_url}/auth/token`.
    pub fn new(config: ClientConfig) -> Self {
        let tokens = ClientCredentials::from_config(&config);
        let transport = AuthenticatedTransport::new(UreqTransport::new(config.timeout), tokens);
        Self {
            base_url: normalize_base_url(&config.base_url),
            transport,
        }
    }
}

impl<T: Transport> OpenAdrClient<T> {
    /// Client over a caller-supplied transport, which is responsible for any
    /// authentication.
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn execute<B, R>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, Option<QueryValue>)],
        body: Option<&B>,
    ) -> Result<Envelope<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = build_request(&self.base_url, method, path, query, body)?;
        debug!(method = method.as_str(), url = %request.url, "sending request");
        let response = self.transport.send(request)?;
        handle_response(response)
    }

    fn search<P, R>(&self, path: &str, params: &P) -> Result<Envelope<Vec<R>>>
    where
        P: SearchParams,
        R: Validate + DeserializeOwned,
    {
        check_input(params)?;
        let Envelope {
            status,
            response,
            problem,
        } = self.execute::<(), Option<Vec<R>>>(HttpMethod::Get, path, &params.query(), None)?;
        // A `null` or empty success body means no results.
        let response = problem.is_none().then(|| response.flatten().unwrap_or_default());
        validated(Envelope {
            status,
            response,
            problem,
        })
    }

    fn fetch<R>(&self, path: &str) -> Result<Envelope<R>>
    where
        R: Validate + DeserializeOwned,
    {
        let envelope = self.execute::<(), R>(HttpMethod::Get, path, &[], None)?;
        validated(envelope)
    }

    fn send_body<R>(&self, method: HttpMethod, path: &str, body: &R) -> Result<Envelope<R>>
    where
        R: Validate + Serialize + DeserializeOwned,
    {
        check_input(body)?;
        let envelope = self.execute(method, path, &[], Some(body))?;
        validated(envelope)
    }

    fn remove(&self, path: &str) -> Result<Envelope<serde_json::Value>> {
        self.execute::<(), _>(HttpMethod::Delete, path, &[], None)
    }

    // -----------------------------------------------------------------------
    // Programs
    // -----------------------------------------------------------------------

    pub fn search_all_programs(&self, params: &ProgramSearch) -> Result<Envelope<Vec<Program>>> {
        self.search("/programs", params)
    }

    pub fn search_program_by_id(&self, program_id: &str) -> Result<Envelope<Program>> {
        require_id("programID", program_id)?;
        self.fetch(&format!("/programs/{}", segment(program_id)))
    }

    pub fn create_program(&self, program: &Program) -> Result<Envelope<Program>> {
        self.send_body(HttpMethod::Post, "/programs", program)
    }

    /// Replace a program. `program_id` addresses the resource; the body's own
    /// `id`, if any, is sent as given.
    pub fn update_program(&self, program_id: &str, program: &Program) -> Result<Envelope<Program>> {
        require_id("programID", program_id)?;
        self.send_body(HttpMethod::Put, &format!("/programs/{}", segment(program_id)), program)
    }

    pub fn delete_program(&self, program_id: &str) -> Result<Envelope<serde_json::Value>> {
        require_id("programID", program_id)?;
        self.remove(&format!("/programs/{}", segment(program_id)))
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn search_all_events(&self, params: &EventSearch) -> Result<Envelope<Vec<Event>>> {
        self.search("/events", params)
    }

    pub fn search_event_by_id(&self, event_id: &str) -> Result<Envelope<Event>> {
        require_id("eventID", event_id)?;
        self.fetch(&format!("/events/{}", segment(event_id)))
    }

    pub fn create_event(&self, event: &Event) -> Result<Envelope<Event>> {
        self.send_body(HttpMethod::Post, "/events", event)
    }

    pub fn update_event(&self, event_id: &str, event: &Event) -> Result<Envelope<Event>> {
        require_id("eventID", event_id)?;
        self.send_body(HttpMethod::Put, &format!("/events/{}", segment(event_id)), event)
    }

    pub fn delete_event(&self, event_id: &str) -> Result<Envelope<serde_json::Value>> {
        require_id("eventID", event_id)?;
        self.remove(&format!("/events/{}", segment(event_id)))
    }

    // -----------------------------------------------------------------------
    // Reports
    // -----------------------------------------------------------------------

    pub fn search_all_reports(&self, params: &ReportSearch) -> Result<Envelope<Vec<Report>>> {
        self.search("/reports", params)
    }

    pub fn search_report_by_id(&self, report_id: &str) -> Result<Envelope<Report>> {
        require_id("reportID", report_id)?;
        self.fetch(&format!("/reports/{}", segment(report_id)))
    }

    pub fn create_report(&self, report: &Report) -> Result<Envelope<Report>> {
        self.send_body(HttpMethod::Post, "/reports", report)
    }

    pub fn update_report(&self, report_id: &str, report: &Report) -> Result<Envelope<Report>> {
        require_id("reportID", report_id)?;
        self.send_body(HttpMethod::Put, &format!("/reports/{}", segment(report_id)), report)
    }

    pub fn delete_report(&self, report_id: &str) -> Result<Envelope<serde_json::Value>> {
        require_id("reportID", report_id)?;
        self.remove(&format!("/reports/{}", segment(report_id)))
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    pub fn search_subscriptions(
        &self,
        params: &SubscriptionSearch,
    ) -> Result<Envelope<Vec<Subscription>>> {
        self.search("/subscriptions", params)
    }

    pub fn search_subscription_by_id(&self, subscription_id: &str) -> Result<Envelope<Subscription>> {
        require_id("subscriptionID", subscription_id)?;
        self.fetch(&format!("/subscriptions/{}", segment(subscription_id)))
    }

    pub fn create_subscription(&self, subscription: &Subscription) -> Result<Envelope<Subscription>> {
        self.send_body(HttpMethod::Post, "/subscriptions", subscription)
    }

    pub fn update_subscription(
        &self,
        subscription_id: &str,
        subscription: &Subscription,
    ) -> Result<Envelope<Subscription>> {
        require_id("subscriptionID", subscription_id)?;
        self.send_body(
            HttpMethod::Put,
            &format!("/subscriptions/{}", segment(subscription_id)),
            subscription,
        )
    }

    pub fn delete_subscription(&self, subscription_id: &str) -> Result<Envelope<serde_json::Value>> {
        require_id("subscriptionID", subscription_id)?;
        self.remove(&format!("/subscriptions/{}", segment(subscription_id)))
    }

    // -----------------------------------------------------------------------
    // VENs
    // -----------------------------------------------------------------------

    pub fn search_vens(&self, params: &VenSearch) -> Result<Envelope<Vec<Ven>>> {
        self.search("/vens", params)
    }

    pub fn search_ven_by_id(&self, ven_id: &str) -> Result<Envelope<Ven>> {
        require_id("venID", ven_id)?;
        self.fetch(&format!("/vens/{}", segment(ven_id)))
    }

    pub fn create_ven(&self, ven: &Ven) -> Result<Envelope<Ven>> {
        self.send_body(HttpMethod::Post, "/vens", ven)
    }

    pub fn update_ven(&self, ven_id: &str, ven: &Ven) -> Result<Envelope<Ven>> {
        require_id("venID", ven_id)?;
        self.send_body(HttpMethod::Put, &format!("/vens/{}", segment(ven_id)), ven)
    }

    pub fn delete_ven(&self, ven_id: &str) -> Result<Envelope<serde_json::Value>> {
        require_id("venID", ven_id)?;
        self.remove(&format!("/vens/{}", segment(ven_id)))
    }

    // -----------------------------------------------------------------------
    // VEN resources
    // -----------------------------------------------------------------------

    pub fn search_ven_resources(
        &self,
        ven_id: &str,
        params: &ResourceSearch,
    ) -> Result<Envelope<Vec<Resource>>> {
        require_id("venID", ven_id)?;
        self.search(&format!("/vens/{}/resources", segment(ven_id)), params)
    }

    pub fn search_ven_resource_by_id(
        &self,
        ven_id: &str,
        resource_id: &str,
    ) -> Result<Envelope<Resource>> {
        require_id("venID", ven_id)?;
        require_id("resourceID", resource_id)?;
        self.fetch(&format!("/vens/{}/resources/{}", segment(ven_id), segment(resource_id)))
    }

    pub fn create_ven_resource(&self, ven_id: &str, resource: &Resource) -> Result<Envelope<Resource>> {
        require_id("venID", ven_id)?;
        self.send_body(HttpMethod::Post, &format!("/vens/{}/resources", segment(ven_id)), resource)
    }

    pub fn update_ven_resource(
        &self,
        ven_id: &str,
        resource_id: &str,
        resource: &Resource,
    ) -> Result<Envelope<Resource>> {
        require_id("venID", ven_id)?;
        require_id("resourceID", resource_id)?;
        self.send_body(
            HttpMethod::Put,
            &format!("/vens/{}/resources/{}", segment(ven_id), segment(resource_id)),
            resource,
        )
    }

    pub fn delete_ven_resource(
        &self,
        ven_id: &str,
        resource_id: &str,
    ) -> Result<Envelope<serde_json::Value>> {
        require_id("venID", ven_id)?;
        require_id("resourceID", resource_id)?;
        self.remove(&format!("/vens/{}/resources/{}", segment(ven_id), segment(resource_id)))
    }
}

/// Percent-encode a caller-supplied id so it stays one path segment.
fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Fail the call when a decoded payload does not validate.
fn validated<R: Validate>(envelope: Envelope<R>) -> Result<Envelope<R>> {
    if let Some(payload) = &envelope.response {
        if let Err(err) = check_response(payload) {
            warn!(status = envelope.status, subject = R::SUBJECT, error = %err, "response failed validation");
            return Err(err);
        }
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;

    use super::*;
    use crate::envelope::ProblemDetail;
    use crate::error::{ClientError, TransportError};
    use crate::http::{HttpRequest, HttpResponse};
    use crate::types::IntervalPeriod;

    const BASE: &str = "https://vtn.example/oadr3";

    /// Records every request and answers from a queue of canned responses.
    #[derive(Default)]
    struct RecordingTransport {
        responses: Mutex<VecDeque<std::result::Result<HttpResponse, TransportError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingTransport {
        fn answering(status: u16, body: &str) -> Self {
            let transport = Self::default();
            transport.push(status, body);
            transport
        }

        fn push(&self, status: u16, body: &str) {
            self.responses.lock().push_back(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }));
        }

        fn calls(&self) -> usize {
            self.requests.lock().len()
        }

        fn last(&self) -> HttpRequest {
            self.requests.lock().last().cloned().unwrap()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            self.requests.lock().push(request);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Connection("no canned response".to_string())))
        }
    }

    fn client(transport: RecordingTransport) -> OpenAdrClient<RecordingTransport> {
        OpenAdrClient::with_transport(BASE, transport)
    }

    fn program(name: &str) -> Program {
        Program {
            program_name: name.to_string(),
            retailer_name: "X".to_string(),
            program_type: "Y".to_string(),
            ..Program::default()
        }
    }

    const PROGRAMS: &str = r#"[
        {"id":"p1","programName":"A","retailerName":"R","programType":"T"},
        {"id":"p2","programName":"B","retailerName":"R","programType":"T"}
    ]"#;

    #[test]
    fn base_url_is_normalized() {
        let c = OpenAdrClient::with_transport("https://vtn.example/", RecordingTransport::default());
        assert_eq!(c.base_url(), "https://vtn.example");
    }

    #[test]
    fn config_base_url_is_normalized() {
        let config = ClientConfig {
            base_url: format!("{BASE}/"),
            ..ClientConfig::new(BASE, "id", "secret").unwrap()
        };
        let c = OpenAdrClient::new(config);
        assert_eq!(c.base_url(), BASE);
        assert_eq!(
            c.transport().tokens().token_url(),
            "https://vtn.example/oadr3/auth/token"
        );
    }

    #[test]
    fn default_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OpenAdrClient<DefaultTransport>>();
    }

    #[test]
    fn create_program_with_blank_name_sends_nothing() {
        let c = client(RecordingTransport::default());
        let err = c.create_program(&program("")).unwrap_err();
        match err {
            ClientError::InvalidInput { subject, errors } => {
                assert_eq!(subject, "program");
                assert_eq!(errors, vec!["programName is required".to_string()]);
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert_eq!(c.transport().calls(), 0);
    }

    #[test]
    fn out_of_range_pagination_sends_nothing() {
        let c = client(RecordingTransport::default());
        let cases = [
            ProgramSearch {
                limit: Some(51),
                ..ProgramSearch::default()
            },
            ProgramSearch {
                limit: Some(-1),
                ..ProgramSearch::default()
            },
            ProgramSearch {
                skip: Some(-5),
                ..ProgramSearch::default()
            },
        ];
        for params in &cases {
            let err = c.search_all_programs(params).unwrap_err();
            assert!(err.is_validation(), "{params:?}");
        }
        let err = c
            .search_ven_resources(
                "ven-1",
                &ResourceSearch {
                    limit: Some(100),
                    ..ResourceSearch::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(c.transport().calls(), 0);
    }

    #[test]
    fn blank_ids_send_nothing() {
        let c = client(RecordingTransport::default());
        assert!(c.search_program_by_id("").unwrap_err().is_validation());
        assert!(c.delete_event("").unwrap_err().is_validation());
        assert!(c.search_report_by_id("").unwrap_err().is_validation());
        assert!(c.delete_subscription(" ").unwrap_err().is_validation());
        assert!(c.search_ven_by_id("").unwrap_err().is_validation());
        assert!(c.search_ven_resource_by_id("ven-1", "").unwrap_err().is_validation());
        assert!(c.delete_ven_resource("", "res-1").unwrap_err().is_validation());
        assert_eq!(c.transport().calls(), 0);
    }

    #[test]
    fn dot_segment_ids_send_nothing() {
        let c = client(RecordingTransport::default());
        for id in ["..", "."] {
            match c.delete_program(id).unwrap_err() {
                ClientError::InvalidInput { subject, errors } => {
                    assert_eq!(subject, "programID");
                    assert_eq!(errors, vec!["programID cannot be a dot segment".to_string()]);
                }
                other => panic!("expected InvalidInput, got {other:?}"),
            }
        }
        assert!(c.delete_ven_resource("ven-1", "..").unwrap_err().is_validation());
        assert!(c.search_ven_resources("..", &ResourceSearch::default()).unwrap_err().is_validation());
        assert_eq!(c.transport().calls(), 0);
    }

    #[test]
    fn ids_stay_a_single_path_segment() {
        let c = client(RecordingTransport::default());
        c.transport().push(204, "");
        c.transport().push(204, "");
        c.transport().push(204, "");

        c.delete_program("a\\b").unwrap();
        assert_eq!(c.transport().last().url, format!("{BASE}/programs/a%5Cb"));

        c.delete_program("a/../b").unwrap();
        assert_eq!(c.transport().last().url, format!("{BASE}/programs/a%2F..%2Fb"));

        c.delete_ven_resource("ven 1", "r?1#x").unwrap();
        assert_eq!(
            c.transport().last().url,
            format!("{BASE}/vens/ven%201/resources/r%3F1%23x")
        );
    }

    #[test]
    fn update_checks_id_before_body() {
        let c = client(RecordingTransport::default());
        let err = c.update_program("", &program("")).unwrap_err();
        match err {
            ClientError::InvalidInput { subject, .. } => assert_eq!(subject, "programID"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        let err = c.update_program("p1", &program("")).unwrap_err();
        match err {
            ClientError::InvalidInput { subject, .. } => assert_eq!(subject, "program"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert_eq!(c.transport().calls(), 0);
    }

    #[test]
    fn search_builds_request_and_decodes_list() {
        let c = client(RecordingTransport::answering(200, PROGRAMS));
        let params = ProgramSearch {
            targets: vec!["a".to_string(), "b".to_string()],
            skip: Some(0),
            limit: Some(10),
        };
        let env = c.search_all_programs(&params).unwrap();

        assert_eq!(env.status, 200);
        assert!(env.problem.is_none());
        assert_eq!(env.response.as_ref().unwrap().len(), 2);

        let req = c.transport().last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, format!("{BASE}/programs?skip=0&limit=10&targets=a&targets=b"));
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn not_found_is_returned_as_problem() {
        let c = client(RecordingTransport::answering(404, r#"{"title":"Not Found"}"#));
        let env = c.search_program_by_id("missing").unwrap();
        assert_eq!(env.status, 404);
        assert!(env.response.is_none());
        assert_eq!(
            env.problem,
            Some(ProblemDetail {
                title: Some("Not Found".to_string()),
                ..ProblemDetail::default()
            })
        );
        assert_eq!(c.transport().last().url, format!("{BASE}/programs/missing"));
    }

    #[test]
    fn server_error_without_problem_body_is_synthesized() {
        let c = client(RecordingTransport::answering(500, "oops"));
        let env = c.search_vens(&VenSearch::default()).unwrap();
        let problem = env.problem.unwrap();
        assert_eq!(problem.status, Some(500));
        assert_eq!(problem.title.as_deref(), Some("500 Internal Server Error"));
        assert!(env.response.is_none());
    }

    #[test]
    fn unparseable_success_is_a_decode_error() {
        let c = client(RecordingTransport::answering(200, "{not json"));
        let err = c.search_all_programs(&ProgramSearch::default()).unwrap_err();
        assert!(matches!(err, ClientError::Decode { status: 200, .. }));
    }

    #[test]
    fn null_or_empty_search_body_is_an_empty_list() {
        let c = client(RecordingTransport::default());
        c.transport().push(200, "null");
        c.transport().push(200, "");

        for _ in 0..2 {
            let env = c.search_all_programs(&ProgramSearch::default()).unwrap();
            assert_eq!(env.status, 200);
            assert!(env.problem.is_none());
            assert_eq!(env.response, Some(Vec::new()));
        }
    }

    #[test]
    fn null_body_for_single_payload_is_a_decode_error() {
        let c = client(RecordingTransport::answering(200, "null"));
        let err = c.search_program_by_id("p1").unwrap_err();
        assert!(matches!(err, ClientError::Decode { status: 200, .. }));
    }

    #[test]
    fn one_invalid_element_fails_the_whole_search() {
        let body = r#"[
            {"id":"p1","programName":"A","retailerName":"R","programType":"T"},
            {"id":"p2","retailerName":"R","programType":"T"}
        ]"#;
        let c = client(RecordingTransport::answering(200, body));
        let err = c.search_all_programs(&ProgramSearch::default()).unwrap_err();
        match err {
            ClientError::InvalidResponse { subject, errors } => {
                assert_eq!(subject, "program");
                assert_eq!(errors, vec!["item 1: programName is required".to_string()]);
            }
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
        assert_eq!(c.transport().calls(), 1);
    }

    #[test]
    fn invalid_single_payload_fails_the_call() {
        let c = client(RecordingTransport::answering(201, r#"{"id":"v1","venName":""}"#));
        let err = c
            .create_ven(&Ven {
                ven_name: "ven-1".to_string(),
                ..Ven::default()
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse { .. }));
    }

    #[test]
    fn create_sends_json_body() {
        let c = client(RecordingTransport::answering(
            201,
            r#"{"id":"p9","programName":"Summer","retailerName":"X","programType":"Y"}"#,
        ));
        let env = c.create_program(&program("Summer")).unwrap();
        assert_eq!(env.status, 201);
        assert_eq!(env.response.unwrap().id.as_deref(), Some("p9"));

        let req = c.transport().last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, format!("{BASE}/programs"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        let sent: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["programName"], "Summer");
        assert!(sent.get("id").is_none());
    }

    #[test]
    fn update_event_puts_to_item_path() {
        let event = Event {
            id: Some("evt-1".to_string()),
            created_date_time: None,
            modification_date_time: None,
            program_id: "p1".to_string(),
            event_name: "Peak".to_string(),
            priority: Some(1),
            interval_period: IntervalPeriod {
                start: Utc.with_ymd_and_hms(2024, 7, 1, 17, 0, 0).unwrap(),
                duration: Some("PT3H".to_string()),
            },
        };
        let body = serde_json::to_string(&event).unwrap();
        let c = client(RecordingTransport::answering(200, &body));
        let env = c.update_event("evt-1", &event).unwrap();
        assert_eq!(env.response.unwrap(), event);

        let req = c.transport().last();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, format!("{BASE}/events/evt-1"));
    }

    #[test]
    fn delete_has_no_body_and_tolerates_empty_response() {
        let c = client(RecordingTransport::answering(204, ""));
        let env = c.delete_program("p1").unwrap();
        assert_eq!(env.status, 204);
        assert!(env.response.is_none());
        assert!(env.problem.is_none());

        let req = c.transport().last();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, format!("{BASE}/programs/p1"));
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[test]
    fn delete_returns_untyped_payload() {
        let c = client(RecordingTransport::answering(200, r#"{"id":"v1","venName":"gone"}"#));
        let env = c.delete_ven("v1").unwrap();
        assert_eq!(env.response.unwrap()["venName"], "gone");
    }

    #[test]
    fn resource_paths_nest_under_ven() {
        let c = client(RecordingTransport::default());
        c.transport().push(200, "[]");
        c.transport().push(200, r#"{"id":"r1","resourceName":"meter"}"#);

        let params = ResourceSearch {
            resource_name: Some("meter".to_string()),
            ..ResourceSearch::default()
        };
        let env = c.search_ven_resources("ven-1", &params).unwrap();
        assert!(env.response.unwrap().is_empty());
        assert_eq!(
            c.transport().last().url,
            format!("{BASE}/vens/ven-1/resources?resourceName=meter")
        );

        let resource = Resource {
            resource_name: "meter".to_string(),
            ..Resource::default()
        };
        c.update_ven_resource("ven-1", "r1", &resource).unwrap();
        assert_eq!(c.transport().last().url, format!("{BASE}/vens/ven-1/resources/r1"));
    }

    #[test]
    fn report_and_subscription_searches_use_wire_names() {
        let c = client(RecordingTransport::default());
        c.transport().push(200, "[]");
        c.transport().push(200, "[]");

        c.search_all_reports(&ReportSearch {
            program_id: Some("p1".to_string()),
            client_name: Some("client-9".to_string()),
            ..ReportSearch::default()
        })
        .unwrap();
        assert_eq!(
            c.transport().last().url,
            format!("{BASE}/reports?programID=p1&clientName=client-9")
        );

        c.search_subscriptions(&SubscriptionSearch {
            client_name: Some("c".to_string()),
            objects: vec!["EVENT".to_string()],
            ..SubscriptionSearch::default()
        })
        .unwrap();
        assert_eq!(
            c.transport().last().url,
            format!("{BASE}/subscriptions?clientName=c&objects=EVENT")
        );
    }

    #[test]
    fn transport_failure_is_propagated() {
        let c = client(RecordingTransport::default());
        let err = c.search_all_events(&EventSearch::default()).unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Connection(_))));
    }

    #[test]
    fn repeated_search_yields_identical_envelopes() {
        let c = client(RecordingTransport::default());
        c.transport().push(200, PROGRAMS);
        c.transport().push(200, PROGRAMS);
        let params = ProgramSearch::default();

        let first = c.search_all_programs(&params).unwrap();
        let second = c.search_all_programs(&params).unwrap();
        assert_eq!(first, second);

        let requests = c.transport().requests.lock();
        assert_eq!(requests[0], requests[1]);
    }
}
