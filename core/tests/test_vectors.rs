//! Verify build/decode against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names an operation, its inputs, the request it must produce, a
//! simulated response, and either the decoded ids or the expected error
//! kind. Bodies are compared as parsed JSON so field order does not matter.

use crowdin_core::envelope::{decode_batch, decode_empty, decode_list, decode_single};
use crowdin_core::{
    AddStringCommentRequest, Client, ClientConfig, Comment, Credentials, Error, HttpMethod,
    HttpRequest, HttpResponse, ListStringCommentsParams, Pagination, PatchOperation, Transport,
};
use serde_json::Value;

/// The vectors only exercise the pure `build_*` methods; nothing is sent.
struct NoTransport;

#[async_trait::async_trait]
impl Transport for NoTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, crowdin_core::BoxError> {
        Err("test vectors never send".into())
    }
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn id_list(case: &Value) -> Vec<u64> {
    case["expected_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .collect()
}

fn check_error(name: &str, err: Error, expected: &str) {
    match expected {
        "NotFound" => assert!(err.is_not_found(), "{name}: expected NotFound, got {err:?}"),
        "Decode" => {
            assert!(matches!(err, Error::Decode(_)), "{name}: expected Decode, got {err:?}")
        }
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

#[test]
fn string_comment_vectors() {
    let raw = include_str!("../../test-vectors/string_comments.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();
    let token = vectors["token"].as_str().unwrap();

    let client = Client::with_config(
        Credentials::new(token),
        ClientConfig {
            base_url: Some(base_url.to_string()),
            user_agent: None,
        },
    );
    let comments = client.string_comments(&NoTransport);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let operation = case["operation"].as_str().unwrap();
        let project_id = case["project_id"].as_u64().unwrap();
        let comment_id = case["comment_id"].as_u64();
        let input = case["input"].clone();

        let req = match operation {
            "list" => {
                let params: ListStringCommentsParams = serde_json::from_value(input).unwrap();
                comments.build_list(project_id, &params)
            }
            "get" => comments.build_get(project_id, comment_id.unwrap()),
            "add" => {
                let body: AddStringCommentRequest = serde_json::from_value(input).unwrap();
                comments.build_add(project_id, &body)
            }
            "delete" => comments.build_delete(project_id, comment_id.unwrap()),
            "edit" => {
                let ops: Vec<PatchOperation> = serde_json::from_value(input).unwrap();
                comments.build_edit(project_id, comment_id.unwrap(), &ops)
            }
            "batch" => {
                let ops: Vec<PatchOperation> = serde_json::from_value(input).unwrap();
                comments.build_batch(project_id, &ops)
            }
            other => panic!("{name}: unknown operation {other}"),
        }
        .unwrap();

        // Verify build
        let expected_req = &case["expected_request"];
        let method = parse_method(expected_req["method"].as_str().unwrap());
        assert_eq!(req.method, method, "{name}: method");
        let url = format!("{base_url}{}", expected_req["path"].as_str().unwrap());
        assert_eq!(req.url, url, "{name}: url");
        let bearer = format!("Bearer {}", client.token());
        assert_eq!(req.header("authorization"), Some(bearer.as_str()), "{name}: auth");
        match req.body.as_deref() {
            Some(body) => {
                let sent: Value = serde_json::from_str(body).unwrap();
                assert_eq!(sent, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body should be present"),
        }

        // Verify decode
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };

        let decoded: Result<(Vec<u64>, Option<Pagination>), Error> = match operation {
            "list" => decode_list::<Comment>(&response)
                .map(|page| (page.items().map(|c| c.id).collect(), Some(page.pagination))),
            "get" | "add" | "edit" => {
                decode_single::<Comment>(&response).map(|item| (vec![item.data.id], None))
            }
            "delete" => decode_empty(&response).map(|()| (Vec::new(), None)),
            "batch" => decode_batch::<Comment>(&response)
                .map(|batch| (batch.items().map(|c| c.id).collect(), batch.pagination)),
            _ => unreachable!(),
        };

        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, decoded.unwrap_err(), expected_error.as_str().unwrap());
            continue;
        }

        let (ids, pagination) = decoded.unwrap();
        assert_eq!(ids, id_list(case), "{name}: ids");
        if let Some(expected) = case.get("expected_pagination") {
            let expected: Pagination = serde_json::from_value(expected.clone()).unwrap();
            assert_eq!(pagination, Some(expected), "{name}: pagination");
        }
    }
}
