//! Request bodies and content-type negotiation.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::error::{ApiError, Result};

/// Body of an outgoing request.
///
/// Every variant can be sent more than once, which is what lets the auth
/// interceptor replay a request after a token refresh.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// JSON body.
    Json(serde_json::Value),
    /// `multipart/form-data` body.
    Multipart(MultipartForm),
}

impl Payload {
    /// Serialize `value` as a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Json` if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Whether this is a multipart body.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// Attach the body to a request builder.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        Ok(match self {
            Self::Empty => builder,
            Self::Json(value) => builder.body(serde_json::to_vec(value)?),
            Self::Multipart(form) => builder.multipart(form.to_form()?),
        })
    }
}

impl From<MultipartForm> for Payload {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// Uploaded file.
    File {
        /// Field name.
        name: String,
        /// File name reported to the server.
        file_name: String,
        /// MIME type such as `image/png`.
        mime: String,
        /// File contents.
        bytes: Vec<u8>,
    },
}

/// A multipart form that owns its parts.
///
/// `reqwest::multipart::Form` is consumed when sent, so the parts are kept
/// here and turned into a fresh form for every attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a file field.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    /// Fields in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    fn to_form(&self) -> Result<Form> {
        self.parts.iter().try_fold(Form::new(), |form, part| {
            Ok(match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    file_name,
                    mime,
                    bytes,
                } => {
                    let file = Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime)
                        .map_err(|e| ApiError::InvalidRequest(format!("{file_name}: {e}")))?;
                    form.part(name.clone(), file)
                }
            })
        })
    }
}

/// Set the request content type from the payload shape.
///
/// Multipart bodies get no explicit `Content-Type` so the transport can add
/// the boundary; everything else is sent as `application/json`.
pub fn negotiate_content_type(payload: &Payload, headers: &mut HeaderMap) {
    if payload.is_multipart() {
        headers.remove(CONTENT_TYPE);
    } else {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
}
