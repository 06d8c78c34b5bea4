//! Executing façade over `PdfreproClient`.
//!
//! Each method is one build, one `Transport::execute`, one parse. Nothing is
//! retried or cached, and any error from any stage is returned as-is.

use serde_json::Value;

use crate::client::PdfreproClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, Transport};
use crate::transport::UreqTransport;
use crate::types::{Placeholder, Template};

#[derive(Debug, Clone)]
pub struct Client<T = UreqTransport> {
    inner: PdfreproClient,
    transport: T,
}

impl Client<UreqTransport> {
    /// A client for the default host over HTTPS.
    pub fn new(api_key: &str, shared_key: &str) -> Result<Self, ApiError> {
        Ok(Self::with_transport(
            PdfreproClient::new(api_key, shared_key)?,
            UreqTransport::new(),
        ))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::with_transport(
            PdfreproClient::from_config(config)?,
            UreqTransport::new(),
        ))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(inner: PdfreproClient, transport: T) -> Self {
        Self { inner, transport }
    }

    pub fn inner(&self) -> &PdfreproClient {
        &self.inner
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn host(&self) -> &str {
        self.inner.host()
    }

    pub fn set_host(&mut self, host: &str) {
        self.inner.set_host(host);
    }

    fn send(&self, request: Result<HttpRequest, ApiError>) -> Result<crate::http::HttpResponse, ApiError> {
        self.transport.execute(&request?)
    }

    // -- placeholders --

    /// Returns the relative URL of the new placeholder. Fails with
    /// `ApiError::Json` without touching the network if `data` is not JSON.
    pub fn create_placeholder(&self, name: &str, data: &str) -> Result<String, ApiError> {
        let response = self.send(self.inner.build_create_placeholder(name, data))?;
        self.inner.parse_create_placeholder(response)
    }

    pub fn get_placeholder(&self, id: &str) -> Result<Placeholder, ApiError> {
        let response = self.send(self.inner.build_get_placeholder(id))?;
        self.inner.parse_get_placeholder(id, response)
    }

    pub fn get_all_placeholders(&self) -> Result<Vec<Placeholder>, ApiError> {
        let response = self.send(self.inner.build_get_all_placeholders())?;
        self.inner.parse_get_all_placeholders(response)
    }

    pub fn update_placeholder(&self, id: &str, name: Option<&str>, data: Option<&str>) -> Result<(), ApiError> {
        let response = self.send(self.inner.build_update_placeholder(id, name, data))?;
        self.inner.parse_update_placeholder(id, response)
    }

    pub fn delete_placeholder(&self, id: &str) -> Result<(), ApiError> {
        let response = self.send(self.inner.build_delete_placeholder(id))?;
        self.inner.parse_delete_placeholder(response)
    }

    pub fn copy_placeholder(&self, id: &str, name: Option<&str>) -> Result<String, ApiError> {
        let response = self.send(self.inner.build_copy_placeholder(id, name))?;
        self.inner.parse_copy_placeholder(response)
    }

    pub fn get_templates_by_placeholder(&self, id: &str) -> Result<Vec<Template>, ApiError> {
        let response = self.send(self.inner.build_get_templates_by_placeholder(id))?;
        self.inner.parse_get_templates_by_placeholder(response)
    }

    // -- templates --

    pub fn create_template(
        &self,
        name: &str,
        description: Option<&str>,
        placeholder_ids: &[String],
    ) -> Result<String, ApiError> {
        let response = self.send(self.inner.build_create_template(name, description, placeholder_ids))?;
        self.inner.parse_create_template(response)
    }

    pub fn get_template(&self, id: &str) -> Result<Template, ApiError> {
        let response = self.send(self.inner.build_get_template(id))?;
        self.inner.parse_get_template(id, response)
    }

    pub fn get_all_templates(&self) -> Result<Vec<Template>, ApiError> {
        let response = self.send(self.inner.build_get_all_templates())?;
        self.inner.parse_get_all_templates(response)
    }

    pub fn update_template(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
        placeholder_ids: Option<&[String]>,
    ) -> Result<(), ApiError> {
        let request = self
            .inner
            .build_update_template(id, name, description, placeholder_ids);
        let response = self.send(request)?;
        self.inner.parse_update_template(id, response)
    }

    pub fn delete_template(&self, id: &str) -> Result<(), ApiError> {
        let response = self.send(self.inner.build_delete_template(id))?;
        self.inner.parse_delete_template(response)
    }

    pub fn copy_template(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<String, ApiError> {
        let response = self.send(self.inner.build_copy_template(id, name, description))?;
        self.inner.parse_copy_template(response)
    }

    pub fn get_placeholders_by_template(&self, id: &str) -> Result<Vec<Placeholder>, ApiError> {
        let response = self.send(self.inner.build_get_placeholders_by_template(id))?;
        self.inner.parse_get_placeholders_by_template(response)
    }

    pub fn get_editor_url(&self, id: &str) -> Result<String, ApiError> {
        let response = self.send(self.inner.build_get_editor_url(id))?;
        self.inner.parse_get_editor_url(response)
    }

    /// Returns the rendered PDF as Base64 text.
    pub fn get_pdf(&self, id: &str, data: Option<&Value>, language: &str) -> Result<String, ApiError> {
        let response = self.send(self.inner.build_get_pdf(id, data, language))?;
        self.inner.parse_get_pdf(response)
    }
}
