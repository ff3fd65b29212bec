//! Request/response pipeline: encoders, decoders, the per-room connector and
//! the normalized response snapshot.
mod body;
mod connector;
mod decode;
mod method;
mod query;
mod request;
mod response;


pub use body::{
    BodyEncoder, BodyKind, EmptyBody, EncodedBody, FormBody, FormPart, JsonBody, MultipartBody,
};
pub use connector::{Connector, ConnectorBuilder, DEFAULT_TIMEOUT};
pub use decode::{DecodeFormat, DtoShape, TypedDto, decode};
pub use method::HttpMethod;
pub use query::Query;
pub use request::{PreAuthRequest, Request};
pub use response::{Outcome, RequestEcho, Response, TRANSPORT_FAILURE_STATUS};

pub(crate) use body::value_to_text;
