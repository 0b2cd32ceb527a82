use citylist::ProducerConfig;
use citylist_server::server::{
    config::ServerConfig,
    supervisor::{ListenError, Listeners, serve},
};
use citylist_tonic_core::proto::{EmptyMessage, cities_service_client::CitiesServiceClient};
use std::{net::SocketAddr, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::oneshot,
    task::JoinHandle,
};
use tonic::{Code, Request, transport::Channel};

struct Harness {
    grpc: SocketAddr,
    rest: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), ListenError>>,
}

impl Harness {
    async fn start(count: u32, pacing_ms: u64, rest_timeout: Option<Duration>) -> Self {
        let config = ServerConfig {
            grpc_addr: "127.0.0.1:0".parse().unwrap(),
            rest_addr: "127.0.0.1:0".parse().unwrap(),
            producer: ProducerConfig {
                count,
                pacing: Duration::from_millis(pacing_ms),
                seed: Some(11),
            },
            rest_timeout,
            stream_buffer_size: 8,
        };
        let listeners = Listeners::bind(&config).await.unwrap();
        let grpc = listeners.grpc_addr().unwrap();
        let rest = listeners.rest_addr().unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(serve(listeners, config, async move {
            let _ = stopped.await;
        }));

        Self {
            grpc,
            rest,
            stop,
            task,
        }
    }

    async fn client(&self) -> CitiesServiceClient<Channel> {
        CitiesServiceClient::connect(format!("http://{}", self.grpc))
            .await
            .unwrap()
    }

    async fn stop(self) {
        self.stop.send(()).unwrap();
        self.task.await.unwrap().unwrap();
    }
}

fn request(timeout: Option<Duration>) -> Request<EmptyMessage> {
    let mut req = Request::new(EmptyMessage {});
    if let Some(timeout) = timeout {
        req.set_timeout(timeout);
    }
    req
}

#[tokio::test]
async fn unary_returns_every_city() {
    let server = Harness::start(5, 10, None).await;
    let mut client = server.client().await;

    let cities = client.list(request(None)).await.unwrap().into_inner().city;
    let ids: Vec<u32> = cities.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert!(cities.iter().all(|c| c.name.len() == 10));

    server.stop().await;
}

#[tokio::test]
async fn stream_returns_every_city_in_order() {
    let server = Harness::start(5, 10, None).await;
    let mut client = server.client().await;

    let mut stream = client
        .list_stream(request(Some(Duration::from_secs(10))))
        .await
        .unwrap()
        .into_inner();

    let mut ids = Vec::new();
    while let Some(msg) = stream.message().await.unwrap() {
        ids.push(msg.city.unwrap().id);
    }
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    server.stop().await;
}

#[tokio::test]
async fn stream_deadline_keeps_the_prefix() {
    let server = Harness::start(49, 50, None).await;
    let mut client = server.client().await;

    let mut stream = client
        .list_stream(request(Some(Duration::from_millis(275))))
        .await
        .unwrap()
        .into_inner();

    let mut ids = Vec::new();
    let status = loop {
        match stream.message().await {
            Ok(Some(msg)) => ids.push(msg.city.unwrap().id),
            Ok(None) => panic!("stream finished without an error after {ids:?}"),
            Err(status) => break status,
        }
    };

    assert_eq!(status.code(), Code::DeadlineExceeded);
    assert_eq!(status.message(), "deadline is exceeded");
    assert!(!ids.is_empty() && ids.len() < 49);
    let expected: Vec<u32> = (1..=ids.len() as u32).collect();
    assert_eq!(ids, expected);

    server.stop().await;
}

#[tokio::test]
async fn unary_deadline_returns_no_cities() {
    let server = Harness::start(49, 50, None).await;
    let mut client = server.client().await;

    let status = client
        .list(request(Some(Duration::from_millis(275))))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::DeadlineExceeded, "{status:?}");
    assert_eq!(status.message(), "deadline is exceeded");

    server.stop().await;
}

#[tokio::test]
async fn unary_deadline_is_reported_consistently() {
    let server = Harness::start(49, 100, None).await;
    let mut client = server.client().await;

    for _ in 0..3 {
        let status = client
            .list(request(Some(Duration::from_millis(450))))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::DeadlineExceeded, "{status:?}");
    }

    server.stop().await;
}

#[tokio::test]
async fn empty_producer_is_not_an_error() {
    let server = Harness::start(0, 50, None).await;
    let mut client = server.client().await;

    let cities = client
        .list(request(Some(Duration::from_millis(500))))
        .await
        .unwrap()
        .into_inner()
        .city;
    assert!(cities.is_empty());

    let mut stream = client
        .list_stream(request(Some(Duration::from_millis(500))))
        .await
        .unwrap()
        .into_inner();
    assert!(stream.message().await.unwrap().is_none());

    server.stop().await;
}

#[tokio::test]
async fn shutdown_cancels_open_streams() {
    let server = Harness::start(49, 20, None).await;
    let mut client = server.client().await;

    let mut stream = client
        .list_stream(request(None))
        .await
        .unwrap()
        .into_inner();
    for expected in 1..=2 {
        let msg = stream.message().await.unwrap().unwrap();
        assert_eq!(msg.city.unwrap().id, expected);
    }

    let stopping = tokio::spawn(server.stop());

    let status = loop {
        match stream.message().await {
            Ok(Some(_)) => continue,
            Ok(None) => panic!("stream finished without an error"),
            Err(status) => break status,
        }
    };
    assert_eq!(status.code(), Code::Cancelled);
    assert_eq!(status.message(), "request is canceled");

    stopping.await.unwrap();
}

async fn http_get(addr: SocketAddr) -> String {
    let mut conn = TcpStream::connect(addr).await.unwrap();
    conn.write_all(b"GET /cities HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    conn.read_to_end(&mut raw).await.unwrap();
    String::from_utf8(raw).unwrap()
}

#[tokio::test]
async fn http_returns_json_list() {
    let server = Harness::start(3, 10, None).await;

    let resp = http_get(server.rest).await;
    assert!(resp.starts_with("HTTP/1.1 200"), "{resp}");
    assert!(
        resp.to_ascii_lowercase()
            .contains("content-type: application/json; charset=utf-8"),
        "{resp}"
    );

    let body = resp.split("\r\n\r\n").nth(1).unwrap();
    let cities: Vec<serde_json::Value> = serde_json::from_str(body).unwrap();
    let ids: Vec<u64> = cities.iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    server.stop().await;
}

#[tokio::test]
async fn http_timeout_is_an_empty_server_error() {
    let server = Harness::start(49, 50, Some(Duration::from_millis(120))).await;

    let resp = http_get(server.rest).await;
    assert!(resp.starts_with("HTTP/1.1 500"), "{resp}");
    assert_eq!(resp.split("\r\n\r\n").nth(1), Some(""));

    server.stop().await;
}
