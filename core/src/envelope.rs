//! Response envelopes and decoders.
//!
//! # Design
//! Every payload is wrapped one level deep under `data`: a single resource
//! is `{"data": T}` and a list is `{"data": [{"data": T}, ...], "pagination":
//! {...}}`. The decoders keep that nesting in the returned types
//! (`list.data[i].data`) and check the status before looking at the body,
//! so a failed call can never produce a partially decoded value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Error, Result};
use crate::http::HttpResponse;

/// A single resource, as returned by get/create/edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<T> {
    pub data: T,
}

/// Offset/limit of the page that was just returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<Item<T>>,
    pub pagination: Pagination,
}

impl<T> ListEnvelope<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Unwrapped payloads, in order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.data.iter().map(|item| &item.data)
    }

    /// Offset of the following page, if this one came back full.
    ///
    /// A short page means the collection is exhausted. A full page may still
    /// be the last one; the next request then returns an empty page.
    pub fn next_offset(&self) -> Option<u32> {
        let returned = u32::try_from(self.data.len()).ok()?;
        if returned < self.pagination.limit {
            return None;
        }
        self.pagination.offset.checked_add(self.pagination.limit)
    }
}

/// Result of a collection-level batch patch. Same shape as a list, but the
/// server may omit the pagination block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEnvelope<T> {
    pub data: Vec<Item<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> BatchEnvelope<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.data.iter().map(|item| &item.data)
    }
}

/// Map a non-2xx response to `Error::Api`.
pub fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let err = ApiError::from_response(response.status, &response.body);
    tracing::debug!(status = err.status, message = %err.message, "api error");
    Err(Error::Api(err))
}

pub fn decode_single<T: DeserializeOwned>(response: &HttpResponse) -> Result<Item<T>> {
    check_status(response)?;
    parse_body(&response.body)
}

pub fn decode_list<T: DeserializeOwned>(response: &HttpResponse) -> Result<ListEnvelope<T>> {
    check_status(response)?;
    let envelope: ListEnvelope<T> = parse_body(&response.body)?;
    validate_pagination(&envelope.pagination)?;
    Ok(envelope)
}

pub fn decode_batch<T: DeserializeOwned>(response: &HttpResponse) -> Result<BatchEnvelope<T>> {
    check_status(response)?;
    let envelope: BatchEnvelope<T> = parse_body(&response.body)?;
    if let Some(pagination) = &envelope.pagination {
        validate_pagination(pagination)?;
    }
    Ok(envelope)
}

/// For calls that answer 2xx with no payload (delete). The body is ignored.
pub fn decode_empty(response: &HttpResponse) -> Result<()> {
    check_status(response)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    if body.trim().is_empty() {
        return Err(Error::Decode("expected a JSON envelope, got an empty body".to_string()));
    }
    serde_json::from_str(body).map_err(|e| Error::Decode(e.to_string()))
}

fn validate_pagination(pagination: &Pagination) -> Result<()> {
    if pagination.limit == 0 {
        return Err(Error::Decode("pagination limit must be positive".to_string()));
    }
    Ok(())
}
