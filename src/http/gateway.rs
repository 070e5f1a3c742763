use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// Non-success status; the message is the server's `error` field when
    /// the body carries one, otherwise status-derived.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
    Patch,
}

/// One logical request: a path-like name plus an optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn post_empty(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self {
            method: Method::Patch,
            path: path.into(),
            body: None,
        }
    }
}

/// Narrow contract the core needs from the backend. Once issued, a request
/// is neither cancellable nor subject to a client-side timeout.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, GatewayError>;

    /// Multipart upload of one audio file; resolves to the served URL.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<Value, GatewayError>;
}

/// Production gateway speaking the backend's JSON routes over reqwest.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse(response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        let body = response.json::<Value>().await;

        if status.is_success() {
            body.map_err(|e| GatewayError::InvalidResponse(e.to_string()))
        } else {
            let message = body
                .ok()
                .as_ref()
                .and_then(|v| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            Err(GatewayError::Http {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn send(&self, request: ApiRequest) -> Result<Value, GatewayError> {
        let url = self.url(&request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
            Method::Patch => self.client.patch(&url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::parse(response).await
    }

    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<Value, GatewayError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::parse(response).await
    }
}
