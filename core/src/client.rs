//! Stateless request builder and response parser for the PDFrePRO API.
//!
//! # Design
//! `PdfreproClient` holds only validated credentials and a host and carries
//! no per-call state. Each operation is split into a `build_*` method that
//! produces a signed `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller (or `blocking::Client`) executes the actual
//! HTTP round-trip, keeping this layer deterministic and free of I/O.
//!
//! Every `parse_*` runs the same pipeline: envelope check with the
//! operation's accepted codes, then the resource shape check.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::endpoint::{self, Operation};
use crate::envelope::{self, NO_CONTENT};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::RequestBuilder;
use crate::resource;
use crate::types::{
    CopyRequest, NewPlaceholder, NewTemplate, PdfRequest, Placeholder, PlaceholderChanges,
    Template, TemplateChanges,
};

/// Synchronous, stateless client for the PDFrePRO API.
#[derive(Debug, Clone)]
pub struct PdfreproClient {
    requests: RequestBuilder,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Reject text that is not JSON before it is sent anywhere.
///
/// Parsing uses `serde_json`'s default recursion limit of 128 nested
/// arrays/objects. Deeper documents are valid JSON but are rejected here with
/// `ApiError::Json` ("recursion limit exceeded"), so they never reach the
/// server.
fn check_json(data: &str) -> Result<(), ApiError> {
    serde_json::from_str::<Value>(data)
        .map(|_| ())
        .map_err(|e| ApiError::Json(e.to_string()))
}

impl PdfreproClient {
    /// A client for the default host.
    pub fn new(api_key: &str, shared_key: &str) -> Result<Self, ApiError> {
        Ok(Self::with_credentials(Credentials::new(api_key, shared_key)?))
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            requests: RequestBuilder::new(credentials),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut client = Self::with_credentials(config.credentials()?);
        client.set_host(config.host());
        Ok(client)
    }

    pub fn host(&self) -> &str {
        self.requests.host()
    }

    /// Point the client at another host. Empty strings are ignored.
    pub fn set_host(&mut self, host: &str) {
        self.requests.set_host(host);
    }

    fn open(&self, op: Operation, response: &HttpResponse) -> Result<Map<String, Value>, ApiError> {
        debug!(?op, status = response.status, "received response");
        envelope::open(response, op.accepted_codes())
    }

    // -----------------------------------------------------------------------
    // Placeholders
    // -----------------------------------------------------------------------

    /// `data` must be JSON text nested at most 128 levels deep; it is checked
    /// here, before any request exists.
    pub fn build_create_placeholder(&self, name: &str, data: &str) -> Result<HttpRequest, ApiError> {
        check_json(data)?;
        let op = Operation::CreatePlaceholder;
        let payload = NewPlaceholder {
            name: name.to_string(),
            data: data.to_string(),
        };
        self.requests.request_with_body(op.method(), &op.path(""), &payload)
    }

    /// Returns the relative URL of the new placeholder.
    pub fn parse_create_placeholder(&self, response: HttpResponse) -> Result<String, ApiError> {
        let data = self.open(Operation::CreatePlaceholder, &response)?;
        resource::url(&data, endpoint::PLACEHOLDERS, None, "/")
    }

    pub fn build_get_placeholder(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let op = Operation::GetPlaceholder;
        self.requests.request(op.method(), &op.path(id))
    }

    pub fn parse_get_placeholder(&self, id: &str, response: HttpResponse) -> Result<Placeholder, ApiError> {
        let data = self.open(Operation::GetPlaceholder, &response)?;
        resource::placeholder(&data, Some(id))
    }

    pub fn build_get_all_placeholders(&self) -> Result<HttpRequest, ApiError> {
        let op = Operation::GetAllPlaceholders;
        self.requests.request(op.method(), &op.path(""))
    }

    pub fn parse_get_all_placeholders(&self, response: HttpResponse) -> Result<Vec<Placeholder>, ApiError> {
        self.parse_placeholder_list(Operation::GetAllPlaceholders, response)
    }

    /// Empty `name`/`data` are left out of the payload; non-empty `data` must be JSON.
    pub fn build_update_placeholder(
        &self,
        id: &str,
        name: Option<&str>,
        data: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let data = non_empty(data);
        if let Some(data) = &data {
            check_json(data)?;
        }
        let op = Operation::UpdatePlaceholder;
        let payload = PlaceholderChanges {
            name: non_empty(name),
            data,
        };
        self.requests.request_with_body(op.method(), &op.path(id), &payload)
    }

    pub fn parse_update_placeholder(&self, id: &str, response: HttpResponse) -> Result<(), ApiError> {
        let data = self.open(Operation::UpdatePlaceholder, &response)?;
        resource::url(&data, endpoint::PLACEHOLDERS_ID, Some(id), "/").map(|_| ())
    }

    pub fn build_delete_placeholder(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let op = Operation::DeletePlaceholder;
        self.requests.request(op.method(), &op.path(id))
    }

    pub fn parse_delete_placeholder(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.open(Operation::DeletePlaceholder, &response).map(|_| ())
    }

    pub fn build_copy_placeholder(&self, id: &str, name: Option<&str>) -> Result<HttpRequest, ApiError> {
        let op = Operation::CopyPlaceholder;
        let payload = CopyRequest {
            name: non_empty(name),
            description: None,
        };
        self.requests.request_with_body(op.method(), &op.path(id), &payload)
    }

    /// Returns the relative URL of the copy.
    pub fn parse_copy_placeholder(&self, response: HttpResponse) -> Result<String, ApiError> {
        let data = self.open(Operation::CopyPlaceholder, &response)?;
        resource::url(&data, endpoint::PLACEHOLDERS, None, "/")
    }

    pub fn build_get_templates_by_placeholder(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let op = Operation::GetTemplatesByPlaceholder;
        self.requests.request(op.method(), &op.path(id))
    }

    pub fn parse_get_templates_by_placeholder(&self, response: HttpResponse) -> Result<Vec<Template>, ApiError> {
        self.parse_template_list(Operation::GetTemplatesByPlaceholder, response)
    }

    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    pub fn build_create_template(
        &self,
        name: &str,
        description: Option<&str>,
        placeholder_ids: &[String],
    ) -> Result<HttpRequest, ApiError> {
        let op = Operation::CreateTemplate;
        let payload = NewTemplate {
            name: name.to_string(),
            description: description.unwrap_or_default().to_string(),
            placeholder_ids: placeholder_ids.to_vec(),
        };
        self.requests.request_with_body(op.method(), &op.path(""), &payload)
    }

    /// Returns the relative URL of the new template.
    pub fn parse_create_template(&self, response: HttpResponse) -> Result<String, ApiError> {
        let data = self.open(Operation::CreateTemplate, &response)?;
        resource::url(&data, endpoint::TEMPLATES, None, "/")
    }

    pub fn build_get_template(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let op = Operation::GetTemplate;
        self.requests.request(op.method(), &op.path(id))
    }

    pub fn parse_get_template(&self, id: &str, response: HttpResponse) -> Result<Template, ApiError> {
        let data = self.open(Operation::GetTemplate, &response)?;
        resource::template(&data, Some(id))
    }

    pub fn build_get_all_templates(&self) -> Result<HttpRequest, ApiError> {
        let op = Operation::GetAllTemplates;
        self.requests.request(op.method(), &op.path(""))
    }

    pub fn parse_get_all_templates(&self, response: HttpResponse) -> Result<Vec<Template>, ApiError> {
        self.parse_template_list(Operation::GetAllTemplates, response)
    }

    /// An empty `name` is left out; `description` and `placeholder_ids` are
    /// sent whenever they are `Some`, even if empty.
    pub fn build_update_template(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
        placeholder_ids: Option<&[String]>,
    ) -> Result<HttpRequest, ApiError> {
        let op = Operation::UpdateTemplate;
        let payload = TemplateChanges {
            name: non_empty(name),
            description: description.map(str::to_string),
            placeholder_ids: placeholder_ids.map(<[String]>::to_vec),
        };
        self.requests.request_with_body(op.method(), &op.path(id), &payload)
    }

    pub fn parse_update_template(&self, id: &str, response: HttpResponse) -> Result<(), ApiError> {
        let data = self.open(Operation::UpdateTemplate, &response)?;
        resource::url(&data, endpoint::TEMPLATES_ID, Some(id), "/").map(|_| ())
    }

    pub fn build_delete_template(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let op = Operation::DeleteTemplate;
        self.requests.request(op.method(), &op.path(id))
    }

    pub fn parse_delete_template(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.open(Operation::DeleteTemplate, &response).map(|_| ())
    }

    pub fn build_copy_template(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let op = Operation::CopyTemplate;
        let payload = CopyRequest {
            name: non_empty(name),
            description: description.map(str::to_string),
        };
        self.requests.request_with_body(op.method(), &op.path(id), &payload)
    }

    /// Returns the relative URL of the copy.
    pub fn parse_copy_template(&self, response: HttpResponse) -> Result<String, ApiError> {
        let data = self.open(Operation::CopyTemplate, &response)?;
        resource::url(&data, endpoint::TEMPLATES, None, "/")
    }

    pub fn build_get_placeholders_by_template(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let op = Operation::GetPlaceholdersByTemplate;
        self.requests.request(op.method(), &op.path(id))
    }

    pub fn parse_get_placeholders_by_template(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Placeholder>, ApiError> {
        self.parse_placeholder_list(Operation::GetPlaceholdersByTemplate, response)
    }

    pub fn build_get_editor_url(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let op = Operation::GetEditorUrl;
        self.requests.request(op.method(), &op.path(id))
    }

    /// The editor lives on another host, so any URL string is accepted.
    pub fn parse_get_editor_url(&self, response: HttpResponse) -> Result<String, ApiError> {
        let data = self.open(Operation::GetEditorUrl, &response)?;
        resource::url(&data, "", None, "")
    }

    /// `data` is merged into the template server-side. It travels as JSON
    /// text inside the JSON body: `{"data": "<json>", "language": "<code>"}`.
    pub fn build_get_pdf(&self, id: &str, data: Option<&Value>, language: &str) -> Result<HttpRequest, ApiError> {
        let data = match data {
            Some(data) => serde_json::to_string(data),
            None => serde_json::to_string(&Map::new()),
        }
        .map_err(|e| ApiError::Json(e.to_string()))?;
        let op = Operation::GetPdf;
        let payload = PdfRequest {
            data,
            language: language.to_string(),
        };
        self.requests.request_with_body(op.method(), &op.path(id), &payload)
    }

    /// Returns the PDF as Base64 text. See `types::decode_pdf` for the bytes.
    pub fn parse_get_pdf(&self, response: HttpResponse) -> Result<String, ApiError> {
        let data = self.open(Operation::GetPdf, &response)?;
        resource::pdf(&data)
    }

    // -----------------------------------------------------------------------
    // Shared list handling
    // -----------------------------------------------------------------------

    fn parse_placeholder_list(&self, op: Operation, response: HttpResponse) -> Result<Vec<Placeholder>, ApiError> {
        let data = self.open(op, &response)?;
        if response.status == NO_CONTENT {
            return Ok(Vec::new());
        }
        resource::placeholders(&data)
    }

    fn parse_template_list(&self, op: Operation, response: HttpResponse) -> Result<Vec<Template>, ApiError> {
        let data = self.open(op, &response)?;
        if response.status == NO_CONTENT {
            return Ok(Vec::new());
        }
        resource::templates(&data)
    }
}
