//! REST gateway for the tour service.
//!
//! Requires the `http` feature. Uses reqwest.
//!
//! ## Routes
//!
//! - `GET /tours`, `GET /tours/{id}`, `GET /tours/search?...`
//! - `POST /tours`, `PUT /tours/{id}`, `DELETE /tours/{id}`
//! - `GET /comments/{tourId}`, `POST /comments`, `PUT /comments/{id}`,
//!   `DELETE /comments/{id}`
//! - `GET /bookings`, `POST /bookings`, `DELETE /bookings/{id}`
//!
//! ## Example
//!
//! ```ignore
//! use tourdesk::{ClientConfig, HttpClient, OptimisticCollection, Tour, TracingChannel};
//!
//! let config = ClientConfig::default().with_base_url("http://localhost:8080");
//! let http = HttpClient::from_config(&config)?;
//! let tours: OptimisticCollection<Tour, _, _> =
//!     OptimisticCollection::new(http.tours(), TracingChannel::new())
//!         .with_config(&config);
//! tours.load().await?;
//! ```

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Gateway, GatewayError, UpdateGateway};
use crate::config::ClientConfig;
use crate::model::{
    Booking, BookingDraft, Comment, CommentDraft, EntityId, Tour, TourDraft, TourSearch,
};

/// Shared HTTP plumbing: base URL, auth, and error mapping.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpClient {
    /// Client with default settings for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: None,
        }
    }

    /// Client built from `config` (base URL, token, request timeout).
    pub fn from_config(config: &ClientConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Gateway for `/tours`.
    pub fn tours(&self) -> HttpTourGateway {
        HttpTourGateway { http: self.clone() }
    }

    /// Gateway for the comments of one tour.
    pub fn comments(&self, tour_id: EntityId) -> HttpCommentGateway {
        HttpCommentGateway {
            http: self.clone(),
            tour_id,
        }
    }

    /// Gateway for the signed-in user's `/bookings`.
    pub fn bookings(&self) -> HttpBookingGateway {
        HttpBookingGateway { http: self.clone() }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "gateway request");
        let builder = self.client.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, GatewayError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, GatewayError> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_decode() {
        GatewayError::Decode(err.to_string())
    } else {
        GatewayError::Transport(err.to_string())
    }
}

/// `/tours` on the REST service.
#[derive(Clone)]
pub struct HttpTourGateway {
    http: HttpClient,
}

impl HttpTourGateway {
    /// `GET /tours/{id}`.
    pub async fn get(&self, id: EntityId) -> Result<Tour, GatewayError> {
        let builder = self.http.request(Method::GET, &format!("/tours/{}", id));
        self.http.send_json(builder).await
    }

    /// `GET /tours/search`. An empty search is sent as a plain list request.
    pub async fn search(&self, search: &TourSearch) -> Result<Vec<Tour>, GatewayError> {
        if search.is_empty() {
            return self.list().await;
        }
        let builder = self.http.request(Method::GET, "/tours/search").query(search);
        self.http.send_json(builder).await
    }
}

impl Gateway<Tour> for HttpTourGateway {
    async fn list(&self) -> Result<Vec<Tour>, GatewayError> {
        let builder = self.http.request(Method::GET, "/tours");
        self.http.send_json(builder).await
    }

    async fn delete(&self, id: EntityId) -> Result<(), GatewayError> {
        let builder = self.http.request(Method::DELETE, &format!("/tours/{}", id));
        self.http.send(builder).await.map(|_| ())
    }

    async fn create(&self, draft: TourDraft) -> Result<Tour, GatewayError> {
        let builder = self.http.request(Method::POST, "/tours").json(&draft);
        self.http.send_json(builder).await
    }
}

impl UpdateGateway<Tour> for HttpTourGateway {
    async fn update(&self, tour: Tour) -> Result<Tour, GatewayError> {
        let builder = self
            .http
            .request(Method::PUT, &format!("/tours/{}", tour.id))
            .json(&tour);
        self.http.send_json(builder).await
    }
}

/// Comments of a single tour on the REST service.
#[derive(Clone)]
pub struct HttpCommentGateway {
    http: HttpClient,
    tour_id: EntityId,
}

impl HttpCommentGateway {
    pub fn tour_id(&self) -> EntityId {
        self.tour_id
    }
}

impl Gateway<Comment> for HttpCommentGateway {
    async fn list(&self) -> Result<Vec<Comment>, GatewayError> {
        let builder = self
            .http
            .request(Method::GET, &format!("/comments/{}", self.tour_id));
        self.http.send_json(builder).await
    }

    async fn delete(&self, id: EntityId) -> Result<(), GatewayError> {
        let builder = self.http.request(Method::DELETE, &format!("/comments/{}", id));
        self.http.send(builder).await.map(|_| ())
    }

    async fn create(&self, draft: CommentDraft) -> Result<Comment, GatewayError> {
        let draft = CommentDraft {
            tour_id: self.tour_id,
            ..draft
        };
        let builder = self.http.request(Method::POST, "/comments").json(&draft);
        self.http.send_json(builder).await
    }
}

impl UpdateGateway<Comment> for HttpCommentGateway {
    async fn update(&self, comment: Comment) -> Result<Comment, GatewayError> {
        let builder = self
            .http
            .request(Method::PUT, &format!("/comments/{}", comment.id))
            .json(&comment);
        self.http.send_json(builder).await
    }
}

/// The signed-in user's bookings. Needs a bearer token on a real backend.
#[derive(Clone)]
pub struct HttpBookingGateway {
    http: HttpClient,
}

impl Gateway<Booking> for HttpBookingGateway {
    async fn list(&self) -> Result<Vec<Booking>, GatewayError> {
        let builder = self.http.request(Method::GET, "/bookings");
        self.http.send_json(builder).await
    }

    /// Cancels the booking.
    async fn delete(&self, id: EntityId) -> Result<(), GatewayError> {
        let builder = self.http.request(Method::DELETE, &format!("/bookings/{}", id));
        self.http.send(builder).await.map(|_| ())
    }

    async fn create(&self, draft: BookingDraft) -> Result<Booking, GatewayError> {
        let builder = self.http.request(Method::POST, "/bookings").json(&draft);
        self.http.send_json(builder).await
    }
}
