use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use concord::rest::{
    CacheRegistry, Client, TransportError,
    transport::{HttpRequest, HttpResponse, Method, Transport},
};

/// Answers from a per-route queue of canned responses and records every
/// request it receives. The last queued response for a route is reused.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<HttpResponse>>>,
    seen: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(self, method: Method, endpoint: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, endpoint.to_string()))
            .or_default()
            .push_back(HttpResponse::new(status, body.as_bytes().to_vec()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut routes = self.routes.lock().unwrap();
        let Some(queue) = routes.get_mut(&(request.method, request.endpoint.clone())) else {
            return Err(TransportError::new(format!(
                "no scripted response for {} {}",
                request.method, request.endpoint
            )));
        };
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        response.ok_or_else(|| TransportError::new("scripted queue is empty"))
    }
}

pub fn client_with(transport: ScriptedTransport) -> (Client, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let client = Client::new(transport.clone(), Arc::new(CacheRegistry::new()));
    (client, transport)
}

pub const GUILD: u64 = 41_771_983_423_143_937;

pub const ROLES_BODY: &str = r#"[
    {"id": "41771983423143937", "name": "@everyone", "position": 0, "permissions": "2048"},
    {"id": "41771983423143938", "name": "mods", "position": 3, "permissions": "268435456"},
    {"id": "41771983423143939", "name": "admins", "position": 5, "permissions": "8"}
]"#;

pub const MEMBER_BODY: &str = r#"{
    "user": {"id": "80351110224678912", "username": "Nelly"},
    "nick": "NOT API SUPPORT",
    "roles": ["41771983423143938", "41771983423143939", "99"],
    "joined_at": "2015-04-26T06:26:56.936000+00:00",
    "deaf": false,
    "mute": false
}"#;
