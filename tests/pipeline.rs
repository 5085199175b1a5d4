//! Request pipeline behaviour against an in-process spy transport.

use async_trait::async_trait;
use network_kit::{
    AsyncTransport, Client, CredentialName, CredentialStore, Error, ErrorKind, Fetchable,
    MemoryCredentialStore, Postable, TokenGated, TransportErrorKind, TransportRequest,
    TransportResponse,
};
use serde::{Deserialize, Serialize, Serializer, ser::Error as _};
use serde_json::json;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Fixture {
    id: u64,
    label: String,
    score: f64,
    active: bool,
}

/// Serializes into an error every time.
struct Unencodable;

impl Serialize for Unencodable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("refusing to encode"))
    }
}

enum Reply {
    Status(u16, Option<String>),
    Echo(u16),
    Refused,
}

/// Records every request and answers from a script.
struct Spy {
    requests: Mutex<Vec<TransportRequest>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl Spy {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into_iter().collect()),
        })
    }

    fn json(status: u16, body: &str) -> Arc<Self> {
        Self::new([Reply::Status(status, Some(body.to_owned()))])
    }

    fn invocations(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AsyncTransport for Spy {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Status(200, Some("{}".into())));
        let echoed = req.body.clone();
        let method = req.method.clone();
        let path = req.url.path().to_owned();
        self.requests.lock().unwrap().push(req);

        match reply {
            Reply::Status(status, Some(body)) => Ok(TransportResponse::json(status, body)),
            Reply::Status(status, None) => Ok(TransportResponse::new(status, None)),
            Reply::Echo(status) => Ok(TransportResponse::new(status, echoed)),
            Reply::Refused => Err(Error::Transport {
                method,
                path: path.into_boxed_str(),
                kind: TransportErrorKind::Connect,
                source: "connection refused".into(),
            }),
        }
    }
}

fn client(spy: &Arc<Spy>, token: Option<&str>) -> Client {
    let store = MemoryCredentialStore::new();
    if let Some(token) = token {
        store.save(CredentialName::AccessToken, token).unwrap();
    }
    Client::builder()
        .transport(spy.clone())
        .credential_store(store)
        .build()
        .unwrap()
}

const MALFORMED: &[&str] = &[
    "",
    "not a url",
    "users/1",
    "://missing-scheme",
    "http://",
    "ftp://api.test/users",
];

#[tokio::test]
async fn malformed_urls_never_reach_the_transport() {
    let spy = Spy::new([]);
    let client = client(&spy, Some("tok"));
    let body = json!({ "a": 1 });

    for url in MALFORMED {
        let results: Vec<Result<User, Error>> = vec![
            client.fetch(url).await,
            client.post(url, &body).await,
            client.delete(url).await,
            client.fetch_with_token(url).await,
            client.post_with_token(url, &body).await,
            client.delete_with_token(url).await,
            client.patch_with_token(url, &body).await,
        ];
        for result in results {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidUrl, "url {url:?}");
        }
    }

    assert_eq!(spy.invocations(), 0);
}

#[tokio::test]
async fn unencodable_bodies_fail_before_dispatch() {
    let spy = Spy::new([]);
    let client = client(&spy, Some("tok"));
    let url = "https://api.test/users";

    let errors = [
        client.post::<User, _>(url, &Unencodable).await.unwrap_err(),
        client
            .post_with_token::<User, _>(url, &Unencodable)
            .await
            .unwrap_err(),
        client
            .patch_with_token::<User, _>(url, &Unencodable)
            .await
            .unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert!(err.to_string().contains("refusing to encode"));
    }

    assert_eq!(spy.invocations(), 0);
}

#[tokio::test]
async fn unauthenticated_success_iff_status_at_most_210() {
    let body = r#"{"id":1,"name":"Ann"}"#;
    for status in [100, 200, 201, 204, 209, 210, 211, 226, 299, 302, 400, 401, 404, 500, 599] {
        let spy = Spy::json(status, body);
        let result = client(&spy, None)
            .fetch::<User>("https://api.test/users/1")
            .await;

        if status <= 210 {
            assert!(result.is_ok(), "status {status}: {result:?}");
        } else {
            match result.unwrap_err() {
                Error::Http(http) => assert_eq!(http.code(), status),
                other => panic!("status {status}: unexpected {other:?}"),
            }
        }
    }
}

#[tokio::test]
async fn token_gated_success_iff_status_below_210() {
    let body = r#"{"id":1,"name":"Ann"}"#;
    for status in [200, 201, 204, 209, 210, 211, 299, 401, 500] {
        let spy = Spy::json(status, body);
        let result = client(&spy, Some("tok"))
            .fetch_with_token::<User>("https://api.test/users/1")
            .await;

        if status < 210 {
            assert!(result.is_ok(), "status {status}: {result:?}");
        } else {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ServerError, "status {status}");
        }
    }
}

#[tokio::test]
async fn missing_token_blocks_every_gated_operation() {
    let spy = Spy::new([]);
    let client = client(&spy, None);
    let url = "https://api.test/users/1";
    let body = json!({ "name": "Ann" });

    let results: Vec<Result<User, Error>> = vec![
        client.fetch_with_token(url).await,
        client.post_with_token(url, &body).await,
        client.delete_with_token(url).await,
        client.patch_with_token(url, &body).await,
    ];
    for result in results {
        assert!(matches!(result, Err(Error::MissingToken)));
    }

    assert_eq!(spy.invocations(), 0);
}

#[tokio::test]
async fn encoded_body_round_trips_through_echo() {
    let fixture = Fixture {
        id: 42,
        label: "déjà vu".into(),
        score: 0.5,
        active: true,
    };

    let spy = Spy::new([Reply::Echo(200), Reply::Echo(201)]);
    let client = client(&spy, Some("tok"));

    let plain: Fixture = client.post("https://api.test/echo", &fixture).await.unwrap();
    let gated: Fixture = client
        .post_with_token("https://api.test/echo", &fixture)
        .await
        .unwrap();

    assert_eq!(plain, fixture);
    assert_eq!(gated, fixture);
}

#[tokio::test]
async fn fetch_user_scenario() {
    let spy = Spy::json(200, r#"{"id":1,"name":"Ann"}"#);
    let user: User = client(&spy, None)
        .fetch("https://api.test/users/1")
        .await
        .unwrap();

    assert_eq!(
        user,
        User {
            id: 1,
            name: "Ann".into()
        }
    );
    let requests = spy.requests.lock().unwrap();
    assert_eq!(requests[0].method, http::Method::GET);
    assert!(requests[0].headers.is_empty());
}

#[tokio::test]
async fn delete_with_token_no_content_scenario() {
    let spy = Spy::new([Reply::Status(204, None)]);
    let err = client(&spy, Some("tok"))
        .delete_with_token::<User>("https://api.test/users/1")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ServerError { .. }));
    assert_eq!(spy.invocations(), 1);
}

#[tokio::test]
async fn rejected_token_is_reported_as_auth_error() {
    for status in [401, 403] {
        let spy = Spy::json(status, r#"{"error":"token expired"}"#);
        let err = client(&spy, Some("stale"))
            .fetch_with_token::<User>("https://api.test/me")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ServerError, "status {status}");
        assert_eq!(err.status().map(|s| s.as_u16()), Some(status));
        assert!(err.is_auth_error(), "status {status}");
    }
}

#[tokio::test]
async fn unauthenticated_no_content_is_empty_body() {
    let spy = Spy::new([Reply::Status(204, None)]);
    let err = client(&spy, None)
        .delete::<User>("https://api.test/users/1")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptyBody);
}

#[tokio::test]
async fn transport_failure_is_reported_once() {
    let spy = Spy::new([Reply::Refused, Reply::Status(200, Some("{}".into()))]);
    let err = client(&spy, None)
        .fetch::<serde_json::Value>("https://api.test/users/1")
        .await
        .unwrap_err();

    match err {
        Error::Transport { kind, path, .. } => {
            assert_eq!(kind, TransportErrorKind::Connect);
            assert_eq!(&*path, "/users/1");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(spy.invocations(), 1);
}

#[tokio::test]
async fn malformed_status_line_is_reported() {
    let spy = Spy::new([Reply::Status(0, Some("{}".into()))]);
    let err = client(&spy, Some("tok"))
        .fetch_with_token::<serde_json::Value>("https://api.test/x")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { status: 0 }));
}

#[tokio::test]
async fn decoding_failure_is_typed() {
    let spy = Spy::json(200, r#"{"id":"not-a-number","name":"Ann"}"#);
    let err = client(&spy, None)
        .fetch::<User>("https://api.test/users/1")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decoding);
    assert!(std::error::Error::source(&err).is_some());
}

async fn load_profile(api: &impl Fetchable) -> Result<User, Error> {
    api.fetch("https://api.test/users/1").await
}

async fn create_then_read(api: &(impl Postable + TokenGated)) -> Result<User, Error> {
    let created: User = api
        .post("https://api.test/users", &json!({ "name": "Ann" }))
        .await?;
    api.fetch_with_token(&format!("https://api.test/users/{}", created.id))
        .await
}

#[tokio::test]
async fn client_satisfies_service_traits() {
    let spy = Spy::new([
        Reply::Status(200, Some(r#"{"id":1,"name":"Ann"}"#.into())),
        Reply::Status(201, Some(r#"{"id":5,"name":"Ann"}"#.into())),
        Reply::Status(200, Some(r#"{"id":5,"name":"Ann"}"#.into())),
    ]);
    let client = client(&spy, Some("tok"));

    assert_eq!(load_profile(&client).await.unwrap().id, 1);
    assert_eq!(create_then_read(&client).await.unwrap().id, 5);

    let requests = spy.requests.lock().unwrap();
    assert_eq!(requests[2].url.path(), "/users/5");
}

#[tokio::test]
async fn concurrent_calls_do_not_share_state() {
    let spy = Spy::new((0..8).map(|_| Reply::Echo(200)));
    let client = client(&spy, Some("tok"));

    let mut handles = Vec::new();
    for id in 0..8u32 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let user = User {
                id,
                name: format!("user-{id}"),
            };
            let echoed: User = client
                .post_with_token("https://api.test/echo", &user)
                .await?;
            Ok::<_, Error>((user, echoed))
        }));
    }

    for handle in handles {
        let (sent, echoed) = handle.await.unwrap().unwrap();
        assert_eq!(sent, echoed);
    }
    assert_eq!(spy.invocations(), 8);
}
