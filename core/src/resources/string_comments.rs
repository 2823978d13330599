//! String comments: comments and issues attached to a source string.
//!
//! Endpoints live under `/projects/{projectId}/comments`. Single-comment
//! edits and collection batches both take a patch document; the difference
//! is the target path and the shape of the reply.

use serde::{Deserialize, Serialize};

use crate::client::{Client, NONE};
use crate::envelope::{self, BatchEnvelope, Item, ListEnvelope};
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, Transport};
use crate::patch::{self, PatchOperation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentType {
    Comment,
    Issue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    GeneralQuestion,
    TranslationMistake,
    ContextRequest,
    SourceMistake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Resolved,
    Unresolved,
}

/// A comment as returned by the server.
///
/// Only `id` is guaranteed; replies to create and batch calls often carry
/// a subset of the fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub text: Option<String>,
    pub user_id: Option<u64>,
    pub string_id: Option<u64>,
    pub user: Option<CommentUser>,
    pub string: Option<CommentString>,
    pub language_id: Option<String>,
    #[serde(rename = "type")]
    pub comment_type: Option<CommentType>,
    pub issue_type: Option<IssueType>,
    pub issue_status: Option<IssueStatus>,
    pub resolver_id: Option<u64>,
    pub resolver: Option<CommentUser>,
    pub resolved_at: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentUser {
    pub id: u64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// The source string a comment is attached to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentString {
    pub id: u64,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub string_type: Option<String>,
    pub has_plurals: Option<bool>,
    pub is_icu: Option<bool>,
    pub context: Option<String>,
    pub file_id: Option<u64>,
}

/// Creation payload, sent verbatim as the POST body or as the value of a
/// batch `add` at `/-`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStringCommentRequest {
    pub text: String,
    #[serde(rename = "type")]
    pub comment_type: CommentType,
    pub target_language_id: String,
    pub string_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
}

impl AddStringCommentRequest {
    pub fn comment(
        string_id: u64,
        target_language_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            comment_type: CommentType::Comment,
            target_language_id: target_language_id.into(),
            string_id,
            issue_type: None,
        }
    }

    pub fn issue(
        string_id: u64,
        target_language_id: impl Into<String>,
        text: impl Into<String>,
        issue_type: IssueType,
    ) -> Self {
        Self {
            text: text.into(),
            comment_type: CommentType::Issue,
            target_language_id: target_language_id.into(),
            string_id,
            issue_type: Some(issue_type),
        }
    }
}

/// Filters for listing. `None` fields never appear in the query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStringCommentsParams {
    pub string_id: u64,
    #[serde(rename = "type")]
    pub comment_type: Option<CommentType>,
    pub target_language_id: Option<String>,
    pub issue_type: Option<IssueType>,
    pub issue_status: Option<IssueStatus>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListStringCommentsParams {
    pub fn for_string(string_id: u64) -> Self {
        Self {
            string_id,
            comment_type: None,
            target_language_id: None,
            issue_type: None,
            issue_status: None,
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Parameters for the page after `page`, or `None` when `page` was short.
    pub fn next_page<T>(&self, page: &ListEnvelope<T>) -> Option<Self> {
        let offset = page.next_offset()?;
        Some(Self {
            limit: Some(page.pagination.limit),
            offset: Some(offset),
            ..self.clone()
        })
    }
}

/// Fields of a single comment that can be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentField {
    Text,
    IssueStatus,
}

impl CommentField {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentField::Text => "text",
            CommentField::IssueStatus => "issueStatus",
        }
    }

    /// `replace` on this field, for `StringComments::edit`.
    pub fn replace(self, value: impl Serialize) -> Result<PatchOperation> {
        PatchOperation::replace(format!("/{}", self.as_str()), value)
    }

    /// `replace` on this field of comment `comment_id`, for a batch.
    pub fn replace_in(self, comment_id: u64, value: impl Serialize) -> Result<PatchOperation> {
        PatchOperation::replace(format!("/{comment_id}/{}", self.as_str()), value)
    }
}

/// Batch operation creating a new comment.
pub fn batch_add(request: &AddStringCommentRequest) -> Result<PatchOperation> {
    PatchOperation::append(request)
}

/// Batch operation deleting comment `comment_id`.
pub fn batch_remove(comment_id: u64) -> Result<PatchOperation> {
    PatchOperation::remove(format!("/{comment_id}"))
}

fn collection_path(project_id: u64) -> String {
    format!("/projects/{project_id}/comments")
}

fn item_path(project_id: u64, comment_id: u64) -> String {
    format!("/projects/{project_id}/comments/{comment_id}")
}

/// String comments endpoints bound to a client and a transport.
///
/// The `build_*` methods are pure; the async methods build, send once and
/// decode.
pub struct StringComments<'a, T: ?Sized> {
    client: &'a Client,
    transport: &'a T,
}

impl Client {
    pub fn string_comments<'a, T: Transport + ?Sized>(
        &'a self,
        transport: &'a T,
    ) -> StringComments<'a, T> {
        StringComments::new(self, transport)
    }
}

impl<'a, T: Transport + ?Sized> StringComments<'a, T> {
    pub fn new(client: &'a Client, transport: &'a T) -> Self {
        Self { client, transport }
    }

    pub fn build_list(
        &self,
        project_id: u64,
        params: &ListStringCommentsParams,
    ) -> Result<HttpRequest> {
        self.client
            .build_request(HttpMethod::Get, &collection_path(project_id), Some(params), NONE)
    }

    pub fn build_get(&self, project_id: u64, comment_id: u64) -> Result<HttpRequest> {
        self.client
            .build_request(HttpMethod::Get, &item_path(project_id, comment_id), NONE, NONE)
    }

    pub fn build_add(
        &self,
        project_id: u64,
        request: &AddStringCommentRequest,
    ) -> Result<HttpRequest> {
        self.client
            .build_request(HttpMethod::Post, &collection_path(project_id), NONE, Some(request))
    }

    pub fn build_delete(&self, project_id: u64, comment_id: u64) -> Result<HttpRequest> {
        self.client
            .build_request(HttpMethod::Delete, &item_path(project_id, comment_id), NONE, NONE)
    }

    pub fn build_edit(
        &self,
        project_id: u64,
        comment_id: u64,
        ops: &[PatchOperation],
    ) -> Result<HttpRequest> {
        patch::ensure_not_empty(ops)?;
        self.client
            .build_request(HttpMethod::Patch, &item_path(project_id, comment_id), NONE, Some(ops))
    }

    pub fn build_batch(&self, project_id: u64, ops: &[PatchOperation]) -> Result<HttpRequest> {
        patch::ensure_not_empty(ops)?;
        self.client
            .build_request(HttpMethod::Patch, &collection_path(project_id), NONE, Some(ops))
    }

    pub async fn list(
        &self,
        project_id: u64,
        params: &ListStringCommentsParams,
    ) -> Result<ListEnvelope<Comment>> {
        let request = self.build_list(project_id, params)?;
        let response = self.client.send(self.transport, request).await?;
        envelope::decode_list(&response)
    }

    pub async fn get(&self, project_id: u64, comment_id: u64) -> Result<Item<Comment>> {
        let request = self.build_get(project_id, comment_id)?;
        let response = self.client.send(self.transport, request).await?;
        envelope::decode_single(&response)
    }

    pub async fn add(
        &self,
        project_id: u64,
        request: &AddStringCommentRequest,
    ) -> Result<Item<Comment>> {
        let request = self.build_add(project_id, request)?;
        let response = self.client.send(self.transport, request).await?;
        envelope::decode_single(&response)
    }

    pub async fn delete(&self, project_id: u64, comment_id: u64) -> Result<()> {
        let request = self.build_delete(project_id, comment_id)?;
        let response = self.client.send(self.transport, request).await?;
        envelope::decode_empty(&response)
    }

    pub async fn edit(
        &self,
        project_id: u64,
        comment_id: u64,
        ops: &[PatchOperation],
    ) -> Result<Item<Comment>> {
        let request = self.build_edit(project_id, comment_id, ops)?;
        let response = self.client.send(self.transport, request).await?;
        envelope::decode_single(&response)
    }

    pub async fn batch_operations(
        &self,
        project_id: u64,
        ops: &[PatchOperation],
    ) -> Result<BatchEnvelope<Comment>> {
        let request = self.build_batch(project_id, ops)?;
        let response = self.client.send(self.transport, request).await?;
        envelope::decode_batch(&response)
    }
}
