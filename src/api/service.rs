//! In-process request routing for the editor endpoints. A request names an
//! endpoint path and carries a JSON body; every outcome, success or failure,
//! is turned into the JSON response shape the browser controller expects.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::session::{EditorSession, FusionRequest};
use crate::core::params::{EditorParams, FilterRequest};
use crate::core::processing::histogram::Histogram;
use crate::error::{Error, Result};
use crate::io::data_url::{parse_data_url, raster_from_data_url};

pub const UPLOAD: &str = "/upload/";
pub const APPLY_FILTER: &str = "/apply-filter/";
pub const APPLY_MULTIPLE_FILTERS: &str = "/apply-multiple-filters/";
pub const FUSION: &str = "/fusion/";
pub const HISTOGRAM: &str = "/histogram/";
pub const RESET: &str = "/reset/";

fn default_method() -> String {
    "POST".to_string()
}

/// One endpoint call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    /// Value of the `X-CSRFToken` header
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default)]
    pub body: Value,
}

impl Request {
    pub fn post(path: &str, body: Value) -> Self {
        Self {
            method: default_method(),
            path: path.to_string(),
            csrf_token: None,
            body,
        }
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }
}

/// `/upload/` body. `data` is a data URL or a bare base64 payload.
#[derive(Debug, Clone, Deserialize)]
struct UploadBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

/// `/fusion/` body: two data URLs plus the fusion options.
#[derive(Debug, Clone, Deserialize)]
struct FusionBody {
    image1: String,
    image2: String,
    #[serde(flatten)]
    options: FusionRequest,
}

/// JSON response. Only the fields relevant to the endpoint are serialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    /// HTTP-like status, not part of the JSON body
    #[serde(skip)]
    pub status: u16,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// `[width, height]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<[usize; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Histogram>,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: 200,
            success: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn from_error(err: &Error) -> Self {
        let status = match err {
            Error::MethodNotAllowed => 405,
            Error::Csrf => 403,
            Error::UnknownEndpoint(_) => 404,
            _ => 400,
        };
        Self {
            status,
            success: false,
            error: Some(err.to_string()),
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Routes requests to one `EditorSession`.
#[derive(Debug, Default)]
pub struct EditorService {
    session: EditorSession,
}

impl EditorService {
    pub fn new(session: EditorSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn into_session(self) -> EditorSession {
        self.session
    }

    /// Handle one request. Never fails: errors become `success: false`.
    pub fn handle(&mut self, request: &Request) -> Response {
        debug!("{} {}", request.method, request.path);
        match self.dispatch(request) {
            Ok(response) => response,
            Err(e) => {
                warn!("{} failed: {}", request.path, e);
                Response::from_error(&e)
            }
        }
    }

    fn check_csrf(&self, request: &Request) -> Result<()> {
        match self.session.csrf_token() {
            Some(expected) if request.csrf_token.as_deref() != Some(expected) => Err(Error::Csrf),
            _ => Ok(()),
        }
    }

    fn dispatch(&mut self, request: &Request) -> Result<Response> {
        if !request.method.eq_ignore_ascii_case("POST") {
            return Err(Error::MethodNotAllowed);
        }
        self.check_csrf(request)?;

        match request.path.as_str() {
            UPLOAD => self.upload(&request.body),
            APPLY_FILTER => {
                let filter = FilterRequest::from_value(request.body.clone())?;
                self.session.apply_filter(&filter)?;
                self.image_response(format!("filter {} applied", filter.tag()))
            }
            APPLY_MULTIPLE_FILTERS => {
                let params: EditorParams = match &request.body {
                    Value::Null => EditorParams::default(),
                    body => serde_json::from_value(body.clone())?,
                };
                self.session.apply_multiple_filters(&params)?;
                self.image_response("filters applied")
            }
            FUSION => {
                let body: FusionBody = serde_json::from_value(request.body.clone())?;
                let first = raster_from_data_url(&body.image1)?;
                let second = raster_from_data_url(&body.image2)?;
                self.session.fuse(&first, &second, &body.options)?;
                self.image_response(format!("{} fusion applied", body.options.fusion_type))
            }
            HISTOGRAM => {
                let histogram = self.session.histogram()?;
                Ok(Response {
                    histogram: Some(histogram),
                    ..Response::ok("histogram computed")
                })
            }
            RESET => {
                self.session.reset()?;
                self.image_response("image reset to original")
            }
            other => Err(Error::UnknownEndpoint(other.to_string())),
        }
    }

    fn upload(&mut self, body: &Value) -> Result<Response> {
        let body: UploadBody = serde_json::from_value(body.clone())?;
        let data = body.data.ok_or_else(|| Error::MissingArgument {
            arg: "image".to_string(),
        })?;
        let (mime, bytes) = parse_data_url(&data)?;
        let content_type = body
            .content_type
            .or((!mime.is_empty()).then_some(mime))
            .unwrap_or_else(|| "image/jpeg".to_string());
        let name = body.name.unwrap_or_else(|| "upload".to_string());

        let info = self.session.upload(&name, &content_type, &bytes)?.clone();
        Ok(Response {
            image_url: Some(self.session.current_data_url()?),
            image_name: Some(info.name),
            image_size: Some([info.width, info.height]),
            ..Response::ok("image uploaded")
        })
    }

    fn image_response(&self, message: impl Into<String>) -> Result<Response> {
        Ok(Response {
            filtered_image_url: Some(self.session.current_data_url()?),
            ..Response::ok(message)
        })
    }
}
