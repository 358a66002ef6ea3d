#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::Value;

use onlycats::devserver::{DevServer, DevSettings};
use onlycats::models::{AuthResponseData, RegisterRequest, UserType};
use onlycats::{ApiClient, ClientConfig};

pub const PASSWORD: &str = "whiskers-123";

pub fn client_for(base_url: &str) -> ApiClient {
    let config = ClientConfig::new(base_url).unwrap();
    ApiClient::in_memory(config).unwrap()
}

pub async fn start_devserver(settings: DevSettings) -> DevServer {
    DevServer::start(settings, ("127.0.0.1", 0)).await.unwrap()
}

pub async fn register(client: &ApiClient, email: &str, user_type: UserType) -> AuthResponseData {
    let request = RegisterRequest {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        name: email.split('@').next().unwrap_or("someone").to_string(),
        user_type,
        phone: None,
        location: Some("Lisbon".to_string()),
    };
    client.auth().register(&request).await.unwrap()
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

type Responder = dyn Fn(&Recorded) -> (u16, Value) + Send + Sync;

struct Script {
    log: Arc<Mutex<Vec<Recorded>>>,
    respond: Arc<Responder>,
    delays: Vec<(String, Duration)>,
}

/// Records every request and answers from a closure.
pub struct ScriptedServer {
    pub base_url: String,
    log: Arc<Mutex<Vec<Recorded>>>,
    handle: ServerHandle,
}

async fn answer(req: HttpRequest, body: web::Bytes, script: web::Data<Script>) -> HttpResponse {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = Recorded {
        method: req.method().to_string(),
        path: req.path().to_string(),
        query: req.query_string().to_string(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let (status, payload) = (script.respond)(&recorded);
    let delay = script
        .delays
        .iter()
        .find(|(path, _)| *path == recorded.path)
        .map(|(_, delay)| *delay);
    script.log.lock().unwrap().push(recorded);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let status = actix_web::http::StatusCode::from_u16(status).unwrap();
    HttpResponse::build(status).json(payload)
}

impl ScriptedServer {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, Value) + Send + Sync + 'static,
    {
        Self::start_delayed(&[], respond).await
    }

    /// Like `start`, but answers on the listed paths only after the delay.
    /// The request is recorded as soon as it arrives.
    pub async fn start_delayed<F>(delays: &[(&str, Duration)], respond: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, Value) + Send + Sync + 'static,
    {
        let log = Arc::new(Mutex::new(Vec::new()));
        let script = web::Data::new(Script {
            log: log.clone(),
            respond: Arc::new(respond),
            delays: delays
                .iter()
                .map(|(path, delay)| (path.to_string(), *delay))
                .collect(),
        });
        let server = HttpServer::new(move || {
            App::new()
                .app_data(script.clone())
                .default_service(web::to(answer))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        tokio::spawn(server);

        Self {
            base_url: format!("http://{}", addr),
            log,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }

    pub fn last(&self) -> Recorded {
        self.requests().last().cloned().expect("no request recorded")
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}
