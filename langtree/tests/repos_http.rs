//! OrgRepoClient over real HTTP against a wiremock GitHub stand-in.


use std::sync::Arc;

use langtree::repos::GITHUB_ACCEPT;
use langtree::{OrgRepoClient, RepoFetchError, ReqwestHttpClient};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repos_page(prefix: &str, n: usize) -> serde_json::Value {
    let repos: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            json!({
                "name": format!("{}-{}", prefix, i),
                "language": "Rust",
                "stargazers_count": i,
                "forks_count": 1,
                "open_issues_count": 0,
                "archived": false,
                "pushed_at": "2025-01-29T12:00:00Z"
            })
        })
        .collect();
    serde_json::Value::Array(repos)
}

fn client(server: &MockServer, token: Option<&str>) -> OrgRepoClient {
    let http = ReqwestHttpClient::new()
        .with_accept(GITHUB_ACCEPT)
        .with_bearer_token(token.map(str::to_string));
    OrgRepoClient::with_client(server.uri(), Arc::new(http))
}

#[tokio::test]
async fn fetches_all_pages_with_github_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/philips-software/repos"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "1"))
        .and(header("accept", GITHUB_ACCEPT))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repos_page("a", 100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/philips-software/repos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repos_page("b", 12)))
        .expect(1)
        .mount(&server)
        .await;

    let repos = client(&server, Some("secret"))
        .fetch_org_repos("philips-software")
        .await
        .unwrap();

    assert_eq!(repos.len(), 112);
    assert_eq!(repos[111].name, "b-11");
    assert_eq!(repos[0].last_push_date(), "2025-01-29");
}

#[tokio::test]
async fn missing_org_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/no-such-org/repos"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .fetch_org_repos("no-such-org")
        .await
        .unwrap_err();
    assert_eq!(err, RepoFetchError::OrgNotFound("no-such-org".to_string()));
    assert_eq!(err.user_message(), "Organization \"no-such-org\" not found");
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client(&server, None).fetch_org_repos("acme").await.unwrap_err();
    assert_eq!(err, RepoFetchError::Api { status: 502 });
    assert_eq!(err.user_message(), "⚠ Network or API error.");
}
