use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{BodyEncoder, DtoShape, EmptyBody, HttpMethod, Query, TypedDto};

/// Description of one outbound call, relative to a room's base URL.
#[derive(Debug, Clone)]
pub struct Request {
    method: HttpMethod,
    path: String,
    query: Query,
    headers: HeaderMap,
    body: Arc<dyn BodyEncoder>,
    concurrency_tag: Option<String>,
    dto: Option<Arc<dyn DtoShape>>,
}

impl Request {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query: Query::new(),
            headers: HeaderMap::new(),
            body: Arc::new(EmptyBody),
            concurrency_tag: None,
            dto: None,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body<B>(mut self, body: B) -> Self
    where
        B: BodyEncoder + 'static,
    {
        self.body = Arc::new(body);
        self
    }

    #[must_use]
    pub fn with_concurrency_tag(mut self, tag: impl Into<String>) -> Self {
        self.concurrency_tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_dto<T>(mut self) -> Self
    where
        T: DeserializeOwned + Serialize + 'static,
    {
        self.dto = Some(Arc::new(TypedDto::<T>::new()));
        self
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    #[must_use]
    pub fn body(&self) -> &dyn BodyEncoder {
        self.body.as_ref()
    }

    #[must_use]
    pub fn concurrency_tag(&self) -> Option<&str> {
        self.concurrency_tag.as_deref()
    }

    #[must_use]
    pub fn dto(&self) -> Option<&dyn DtoShape> {
        self.dto.as_deref()
    }

    pub fn set_body(&mut self, body: Arc<dyn BodyEncoder>) {
        self.body = body;
    }

    pub fn set_query(&mut self, query: Query) {
        self.query = query;
    }

    pub fn set_dto(&mut self, dto: Arc<dyn DtoShape>) {
        self.dto = Some(dto);
    }
}

/// The request a room sends before its main call to obtain credentials.
///
/// `Request` has no pre-request slot of its own, so a pre-request can never
/// chain further.
#[derive(Debug, Clone)]
pub struct PreAuthRequest(Request);

impl PreAuthRequest {
    #[must_use]
    pub const fn new(request: Request) -> Self {
        Self(request)
    }

    #[must_use]
    pub const fn request(&self) -> &Request {
        &self.0
    }
}

impl From<Request> for PreAuthRequest {
    fn from(request: Request) -> Self {
        Self(request)
    }
}
