//! Client core for the localization service's REST API.
//!
//! # Overview
//! Builds authenticated `HttpRequest` values and decodes `HttpResponse`
//! values (host-does-IO pattern). Network I/O is delegated to a
//! caller-supplied [`Transport`], which keeps request building and envelope
//! decoding deterministic and testable.
//!
//! # Design
//! - `Client` is stateless: credentials plus a derived base URL.
//! - Resource clients expose a pure `build_*` method per operation and an
//!   async method that builds, sends exactly once, and decodes.
//! - Responses keep the server's `{"data": ...}` nesting in `Item<T>`,
//!   `ListEnvelope<T>` and `BatchEnvelope<T>`.
//! - Partial updates use typed JSON-Patch documents (`PatchOperation`).

pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod patch;
pub mod query;
pub mod resources;

pub use client::{Client, ClientConfig, Credentials};
pub use envelope::{BatchEnvelope, Item, ListEnvelope, Pagination};
pub use error::{ApiError, Error, Result, ValidationIssue};
pub use http::{BoxError, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use patch::{PatchOperation, PatchPath};
pub use resources::string_comments::{
    AddStringCommentRequest, Comment, CommentField, CommentType, IssueStatus, IssueType,
    ListStringCommentsParams,
};
pub use resources::StringComments;
