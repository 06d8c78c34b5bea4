//! Endpoint templates and the per-operation request table.
//!
//! Every operation the client exposes is a row here: which method it uses,
//! which URI template it targets, and which `code` values count as success
//! in the response envelope. Accepted codes are data on the operation, not
//! defaults buried in a shared helper.

use crate::http::HttpMethod;

pub const PLACEHOLDERS: &str = "/v3/placeholders";
pub const PLACEHOLDERS_ID: &str = "/v3/placeholders/{id}";
pub const PLACEHOLDERS_ID_TEMPLATES: &str = "/v3/placeholders/{id}/templates";
pub const TEMPLATES: &str = "/v3/templates";
pub const TEMPLATES_ID: &str = "/v3/templates/{id}";
pub const TEMPLATES_ID_PLACEHOLDERS: &str = "/v3/templates/{id}/placeholders";
pub const TEMPLATES_ID_EDITOR_URL: &str = "/v3/templates/{id}/editor-url";
pub const TEMPLATES_ID_PDF: &str = "/v3/templates/{id}/pdf";

/// Substitute `{id}` in a URI template. Templates without `{id}` are returned as-is.
pub fn expand(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreatePlaceholder,
    GetPlaceholder,
    GetAllPlaceholders,
    UpdatePlaceholder,
    DeletePlaceholder,
    CopyPlaceholder,
    GetTemplatesByPlaceholder,
    CreateTemplate,
    GetTemplate,
    GetAllTemplates,
    UpdateTemplate,
    DeleteTemplate,
    CopyTemplate,
    GetPlaceholdersByTemplate,
    GetEditorUrl,
    GetPdf,
}

impl Operation {
    pub const ALL: [Operation; 16] = [
        Operation::CreatePlaceholder,
        Operation::GetPlaceholder,
        Operation::GetAllPlaceholders,
        Operation::UpdatePlaceholder,
        Operation::DeletePlaceholder,
        Operation::CopyPlaceholder,
        Operation::GetTemplatesByPlaceholder,
        Operation::CreateTemplate,
        Operation::GetTemplate,
        Operation::GetAllTemplates,
        Operation::UpdateTemplate,
        Operation::DeleteTemplate,
        Operation::CopyTemplate,
        Operation::GetPlaceholdersByTemplate,
        Operation::GetEditorUrl,
        Operation::GetPdf,
    ];

    pub fn method(self) -> HttpMethod {
        use Operation::*;
        match self {
            CreatePlaceholder | CopyPlaceholder | CreateTemplate | CopyTemplate | GetPdf => {
                HttpMethod::Post
            }
            UpdatePlaceholder | UpdateTemplate => HttpMethod::Put,
            DeletePlaceholder | DeleteTemplate => HttpMethod::Delete,
            GetPlaceholder | GetAllPlaceholders | GetTemplatesByPlaceholder | GetTemplate
            | GetAllTemplates | GetPlaceholdersByTemplate | GetEditorUrl => HttpMethod::Get,
        }
    }

    pub fn endpoint(self) -> &'static str {
        use Operation::*;
        match self {
            CreatePlaceholder | GetAllPlaceholders => PLACEHOLDERS,
            GetPlaceholder | UpdatePlaceholder | DeletePlaceholder | CopyPlaceholder => {
                PLACEHOLDERS_ID
            }
            GetTemplatesByPlaceholder => PLACEHOLDERS_ID_TEMPLATES,
            CreateTemplate | GetAllTemplates => TEMPLATES,
            GetTemplate | UpdateTemplate | DeleteTemplate | CopyTemplate => TEMPLATES_ID,
            GetPlaceholdersByTemplate => TEMPLATES_ID_PLACEHOLDERS,
            GetEditorUrl => TEMPLATES_ID_EDITOR_URL,
            GetPdf => TEMPLATES_ID_PDF,
        }
    }

    /// Envelope `code` values that count as success for this operation.
    ///
    /// 429 on PDF generation is the API's own throttling answer and goes
    /// through normal envelope validation rather than being treated as an
    /// HTTP-level failure.
    pub fn accepted_codes(self) -> &'static [u16] {
        use Operation::*;
        match self {
            CreatePlaceholder | CreateTemplate | CopyPlaceholder | CopyTemplate => &[201],
            GetPlaceholder | GetTemplate | UpdatePlaceholder | UpdateTemplate | GetEditorUrl => {
                &[200]
            }
            GetAllPlaceholders | GetAllTemplates | GetTemplatesByPlaceholder
            | GetPlaceholdersByTemplate => &[200, 204],
            DeletePlaceholder | DeleteTemplate => &[204],
            GetPdf => &[201, 429],
        }
    }

    /// The resource path for this operation, with `{id}` filled in.
    pub fn path(self, id: &str) -> String {
        expand(self.endpoint(), id)
    }
}
