//! The logical beer operations as one async interface.
//!
//! `BeerApi` is what the synchronizer depends on. `HttpBeerApi` is the real
//! implementation: it joins `BeerClient` (request shapes, status mapping) with
//! a `Transport` (the round-trip). Each call completes exactly once.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::client::BeerClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::Beer;

#[async_trait]
pub trait BeerApi: Send + Sync + 'static {
    async fn list_all(&self) -> Result<Vec<Beer>, ApiError>;

    async fn list_by_user(&self, username: &str) -> Result<Vec<Beer>, ApiError>;

    async fn get(&self, id: i32) -> Result<Beer, ApiError>;

    async fn create(&self, beer: &Beer) -> Result<Beer, ApiError>;

    async fn update(&self, id: i32, beer: &Beer) -> Result<Beer, ApiError>;

    async fn delete(&self, id: i32) -> Result<Option<Beer>, ApiError>;
}

pub struct HttpBeerApi<T = ReqwestTransport> {
    client: BeerClient,
    transport: T,
}

impl HttpBeerApi<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(BeerClient::new(&config.base_url), ReqwestTransport::new(config)?))
    }
}

impl<T: Transport> HttpBeerApi<T> {
    pub fn new(client: BeerClient, transport: T) -> Self {
        Self { client, transport }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        self.transport.execute(request).await
    }
}

#[async_trait]
impl<T: Transport> BeerApi for HttpBeerApi<T> {
    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Beer>, ApiError> {
        let response = self.send(self.client.build_list_all()).await?;
        self.client.parse_list_all(response)
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, username: &str) -> Result<Vec<Beer>, ApiError> {
        let response = self.send(self.client.build_list_by_user(username)).await?;
        self.client.parse_list_by_user(response)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i32) -> Result<Beer, ApiError> {
        let response = self.send(self.client.build_get(id)).await?;
        self.client.parse_get(response)
    }

    #[instrument(skip(self, beer), fields(name = %beer.name))]
    async fn create(&self, beer: &Beer) -> Result<Beer, ApiError> {
        let response = self.send(self.client.build_create(beer)?).await?;
        self.client.parse_create(response)
    }

    #[instrument(skip(self, beer))]
    async fn update(&self, id: i32, beer: &Beer) -> Result<Beer, ApiError> {
        let response = self.send(self.client.build_update(id, beer)?).await?;
        self.client.parse_update(response)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<Option<Beer>, ApiError> {
        let response = self.send(self.client.build_delete(id)).await?;
        self.client.parse_delete(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpMethod;

    /// Replies with a fixed response and records every request it sees.
    struct CannedTransport {
        reply: Result<HttpResponse, ApiError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(reply: Result<HttpResponse, ApiError>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    fn api(reply: Result<HttpResponse, ApiError>) -> HttpBeerApi<CannedTransport> {
        HttpBeerApi::new(BeerClient::new("http://test/api"), CannedTransport::new(reply))
    }

    fn ok(status: u16, body: &str) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse {
            status,
            reason: String::new(),
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    #[tokio::test]
    async fn list_by_user_hits_user_path() {
        let api = api(ok(200, "[]"));
        assert!(api.list_by_user("a@x.com").await.unwrap().is_empty());
        let seen = api.transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].path, "http://test/api/beers/a@x.com");
    }

    #[tokio::test]
    async fn transport_failure_passes_through() {
        let api = api(Err(ApiError::Transport(None)));
        let err = api.list_all().await.unwrap_err();
        assert_eq!(err, ApiError::Transport(None));
    }

    #[tokio::test]
    async fn protocol_failure_on_update() {
        let api = api(ok(404, ""));
        let err = api.update(5, &Beer::placeholder()).await.unwrap_err();
        assert_eq!(err.to_string(), "404 Not Found");
        assert_eq!(api.transport.seen.lock().unwrap()[0].method, HttpMethod::Put);
    }
}
