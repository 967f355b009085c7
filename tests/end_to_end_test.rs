use radio_search_mcp::client::RadioDirectoryClient;
use radio_search_mcp::{Config, RadioSearch, Server};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct RunningServer {
    server: Arc<Server>,
    addr: SocketAddr,
    handle: JoinHandle<radio_search_mcp::Result<()>>,
}

impl RunningServer {
    async fn start(base_url: &str) -> Self {
        let mut config = Config::default();
        config.upstream.base_url = base_url.to_string();
        config.upstream.site_url = "https://radio.example".to_string();
        config.server.graceful_shutdown_timeout_secs = 1;

        let server = Arc::new(Server::new(config).unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let running = Arc::clone(&server);
        let handle = tokio::spawn(async move { running.serve(listener).await });

        Self {
            server,
            addr,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn call(&self, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(self.url("/mcp"))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "application/json"
        );
        (status, response.json().await.unwrap())
    }

    async fn stop(self) {
        self.server.shutdown();
        let result = tokio::time::timeout(Duration::from_secs(3), self.handle).await;
        assert!(result.is_ok(), "server should shut down gracefully");
    }
}

fn search_call(id: i64, query: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "method": "tools/call",
           "params": {"name": "search_radio_stations", "arguments": {"query": query}}})
}

#[tokio::test]
async fn test_search_workflow_against_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/new_combo_search.php"))
        .and(query_param("srch", "BBC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"Data": [
                {"type": "station", "data": [
                    {"st_name": "BBC Radio 1", "st_genre": "Pop", "st_shorturl": "bbc1"},
                    {"st_name": "BBC Radio 2", "st_genre": "Adult", "st_shorturl": "bbc2"}
                ]},
                {"type": "podcast", "data": [
                    {"podcast_name": "Desert Island Discs", "category_name": "Music",
                     "deeplink": "https://pods.example/did"}
                ]}
            ]}
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let running = RunningServer::start(&upstream.uri()).await;
    let (status, body) = running.call(search_call(1, "BBC")).await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], 1);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert_eq!(
        text,
        "Results for BBC:\n\n\
         🎧 STATION\n\
         1. BBC Radio 1(Pop) - https://radio.example/radioplay/bbc1\n\
         2. BBC Radio 2(Adult) - https://radio.example/radioplay/bbc2\n\n\
         🎧 PODCAST\n\
         1. Desert Island Discs(Music) - https://pods.example/did"
    );

    running.stop().await;
    upstream.verify().await;
}

#[tokio::test]
async fn test_query_is_percent_encoded_once() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/new_combo_search.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"Data": []}})))
        .expect(1)
        .mount(&upstream)
        .await;

    let running = RunningServer::start(&upstream.uri()).await;
    let (status, body) = running.call(search_call(2, "Rock & Roll 90s")).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["result"]["content"][0]["text"],
        "No results found for Rock & Roll 90s."
    );

    let requests = upstream.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("srch=Rock%20%26%20Roll%2090s"));

    running.stop().await;
}

#[tokio::test]
async fn test_missing_data_array_is_no_results() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/new_combo_search.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&upstream)
        .await;

    let running = RunningServer::start(&upstream.uri()).await;
    let (status, body) = running.call(search_call(3, "nothing")).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["result"]["content"][0]["text"],
        "No results found for nothing."
    );

    running.stop().await;
}

#[tokio::test]
async fn test_malformed_upstream_body() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/new_combo_search.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&upstream)
        .await;

    let running = RunningServer::start(&upstream.uri()).await;
    let (status, body) = running.call(search_call(4, "BBC")).await;
    assert_eq!(status, 500);
    assert_eq!(body["id"], 4);
    assert_eq!(body["error"]["code"], -32000);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Malformed upstream response"));

    running.stop().await;
}

#[tokio::test]
async fn test_upstream_http_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&upstream)
        .await;

    let running = RunningServer::start(&upstream.uri()).await;
    let (status, body) = running.call(search_call(5, "BBC")).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"]["code"], -32000);
    assert!(body["error"]["message"].as_str().unwrap().contains("503"));

    running.stop().await;
}

#[tokio::test]
async fn test_network_error_then_recovery() {
    // Reserve a port, then free it so nothing is listening there
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_base = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    let running = RunningServer::start(&dead_base).await;
    let (status, body) = running.call(search_call(6, "BBC")).await;
    assert_eq!(status, 500);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 6);
    assert_eq!(body["error"]["code"], -32000);
    assert!(!body["error"]["message"].as_str().unwrap().is_empty());

    let (status, body) = running
        .call(json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["tools"][0]["name"], "search_radio_stations");

    running.stop().await;
}

#[tokio::test]
async fn test_client_reports_unreachable_upstream() {
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = Config::default();
    config.upstream.base_url = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    let client = RadioDirectoryClient::new(&config.upstream).unwrap();
    let err = client.search("BBC").await.unwrap_err();
    assert!(matches!(err, radio_search_mcp::Error::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn test_sse_stream_over_socket() {
    let upstream = MockServer::start().await;
    let running = RunningServer::start(&upstream.uri()).await;

    let mut response = reqwest::Client::new()
        .get(running.url("/mcp"))
        .header("user-agent", "mcp-inspector/0.9")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let first = tokio::time::timeout(Duration::from_secs(5), response.chunk())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let frame = String::from_utf8(first.to_vec()).unwrap();
    assert!(frame.starts_with("event: endpoint\ndata: /mcp?sessionId="));
    assert_eq!(running.server.connections().len(), 1);

    drop(response);
    // the server notices the disconnect on its next write; shutdown closes the rest
    running.stop().await;
}
