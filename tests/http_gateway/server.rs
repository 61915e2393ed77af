//! Mock REST backend.
//!
//! Serves the tour, comment and booking routes from memory and records
//! what the client sent.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tourdesk::{
    Booking, BookingDraft, Comment, CommentDraft, Draft, EntityId, Tour, TourDraft, TourSearch,
};

/// Tour id the backend refuses to delete.
pub const BOOKED_TOUR: EntityId = 13;

#[derive(Default)]
struct Inner {
    tours: Vec<Tour>,
    comments: Vec<Comment>,
    bookings: Vec<Booking>,
    auth: Vec<Option<String>>,
    queries: Vec<String>,
    broken_json: bool,
}

#[derive(Clone, Default)]
pub struct Mock {
    inner: Arc<Mutex<Inner>>,
}

impl Mock {
    pub fn new(tours: Vec<Tour>, comments: Vec<Comment>) -> Self {
        let mock = Mock::default();
        {
            let mut inner = mock.lock();
            inner.tours = tours;
            inner.comments = comments;
        }
        mock
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Authorization headers seen so far, one per request.
    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.lock().auth.clone()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    pub fn tour_ids(&self) -> Vec<EntityId> {
        self.lock().tours.iter().map(|t| t.id).collect()
    }

    pub fn comment_ids(&self) -> Vec<EntityId> {
        self.lock().comments.iter().map(|c| c.id).collect()
    }

    pub fn booking_ids(&self) -> Vec<EntityId> {
        self.lock().bookings.iter().map(|b| b.id).collect()
    }

    pub fn tour(&self, id: EntityId) -> Option<Tour> {
        self.lock().tours.iter().find(|t| t.id == id).cloned()
    }

    /// Make `GET /tours` answer 200 with a body that is not JSON.
    pub fn break_json(&self) {
        self.lock().broken_json = true;
    }

    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.lock().auth.push(value);
    }
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, String::new())
}

fn unauthorized() -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, String::new())
}

fn signed_in(headers: &HeaderMap) -> bool {
    headers.contains_key(header::AUTHORIZATION)
}

async fn list_tours(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    mock.record_auth(&headers);
    let inner = mock.lock();
    if inner.broken_json {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    Json(inner.tours.clone()).into_response()
}

async fn get_tour(
    State(mock): State<Mock>,
    Path(id): Path<EntityId>,
) -> Result<Json<Tour>, (StatusCode, String)> {
    let inner = mock.lock();
    inner
        .tours
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Tour {} not found", id)))
}

async fn search_tours(
    State(mock): State<Mock>,
    RawQuery(raw): RawQuery,
    Query(search): Query<TourSearch>,
) -> Json<Vec<Tour>> {
    let mut inner = mock.lock();
    inner.queries.push(raw.unwrap_or_default());
    let found = inner
        .tours
        .iter()
        .filter(|t| search.matches(t))
        .cloned()
        .collect();
    Json(found)
}

async fn create_tour(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(draft): Json<TourDraft>,
) -> Result<(StatusCode, Json<Tour>), (StatusCode, String)> {
    mock.record_auth(&headers);
    let mut inner = mock.lock();
    if inner.tours.iter().any(|t| t.name == draft.name) {
        return Err((StatusCode::BAD_REQUEST, "Tour name already taken".into()));
    }
    let id = inner.tours.iter().map(|t| t.id).max().unwrap_or(0) + 1;
    let tour = draft.into_entity(id);
    inner.tours.push(tour.clone());
    Ok((StatusCode::CREATED, Json(tour)))
}

async fn delete_tour(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<EntityId>,
) -> Result<StatusCode, (StatusCode, String)> {
    mock.record_auth(&headers);
    if id == BOOKED_TOUR {
        return Err((StatusCode::CONFLICT, "Tour has active bookings".into()));
    }
    let mut inner = mock.lock();
    let before = inner.tours.len();
    inner.tours.retain(|t| t.id != id);
    if inner.tours.len() == before {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn update_tour(
    State(mock): State<Mock>,
    Path(id): Path<EntityId>,
    Json(tour): Json<Tour>,
) -> Result<Json<Tour>, (StatusCode, String)> {
    if tour.price < 0.0 {
        return Err((StatusCode::BAD_REQUEST, "Price must be a positive number!".into()));
    }
    let mut inner = mock.lock();
    let stored = inner
        .tours
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(not_found)?;
    *stored = Tour { id, ..tour };
    Ok(Json(stored.clone()))
}

async fn list_comments(State(mock): State<Mock>, Path(tour_id): Path<EntityId>) -> Json<Vec<Comment>> {
    let inner = mock.lock();
    Json(
        inner
            .comments
            .iter()
            .filter(|c| c.tour_id == tour_id)
            .cloned()
            .collect(),
    )
}

async fn create_comment(
    State(mock): State<Mock>,
    Json(draft): Json<CommentDraft>,
) -> (StatusCode, Json<Comment>) {
    let mut inner = mock.lock();
    let id = inner.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1;
    let comment = draft.into_entity(id);
    inner.comments.push(comment.clone());
    (StatusCode::CREATED, Json(comment))
}

async fn delete_comment(
    State(mock): State<Mock>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut inner = mock.lock();
    let before = inner.comments.len();
    inner.comments.retain(|c| c.id != id);
    if inner.comments.len() == before {
        return Err(not_found());
    }
    Ok(StatusCode::OK)
}

async fn update_comment(
    State(mock): State<Mock>,
    Path(id): Path<EntityId>,
    Json(comment): Json<Comment>,
) -> Result<Json<Comment>, (StatusCode, String)> {
    let mut inner = mock.lock();
    let stored = inner
        .comments
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(not_found)?;
    // Only the text is editable.
    stored.content = comment.content;
    Ok(Json(stored.clone()))
}

async fn list_bookings(
    State(mock): State<Mock>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, (StatusCode, String)> {
    if !signed_in(&headers) {
        return Err(unauthorized());
    }
    Ok(Json(mock.lock().bookings.clone()))
}

async fn create_booking(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(draft): Json<BookingDraft>,
) -> Result<(StatusCode, Json<Booking>), (StatusCode, String)> {
    if !signed_in(&headers) {
        return Err(unauthorized());
    }
    let mut inner = mock.lock();
    let id = inner.bookings.iter().map(|b| b.id).max().unwrap_or(0) + 1;
    let tour = inner
        .tours
        .iter_mut()
        .find(|t| t.id == draft.tour_id)
        .ok_or((StatusCode::NOT_FOUND, format!("Tour {} not found", draft.tour_id)))?;
    if draft.seats_booked > tour.available_spots {
        return Err((StatusCode::BAD_REQUEST, "Not enough available spots".into()));
    }
    tour.available_spots -= draft.seats_booked;
    let booking = Booking {
        tour: Some(tour.clone()),
        status: Some("confirmed".into()),
        ..draft.into_entity(id)
    };
    inner.bookings.push(booking.clone());
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn cancel_booking(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<EntityId>,
) -> Result<Json<Booking>, (StatusCode, String)> {
    if !signed_in(&headers) {
        return Err(unauthorized());
    }
    let mut inner = mock.lock();
    let index = inner
        .bookings
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(not_found)?;
    let booking = inner.bookings.remove(index);
    if let Some(tour_id) = booking.booked_tour_id() {
        if let Some(tour) = inner.tours.iter_mut().find(|t| t.id == tour_id) {
            tour.available_spots += booking.seats_booked;
        }
    }
    Ok(Json(booking))
}

fn router(mock: Mock) -> Router {
    Router::new()
        .route("/tours", get(list_tours).post(create_tour))
        .route("/tours/search", get(search_tours))
        .route(
            "/tours/:id",
            get(get_tour).put(update_tour).delete(delete_tour),
        )
        .route("/comments", post(create_comment))
        .route(
            "/comments/:id",
            get(list_comments).put(update_comment).delete(delete_comment),
        )
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/:id", delete(cancel_booking))
        .with_state(mock)
}

/// Bind to port 0 and return the base URL.
pub async fn start(mock: Mock) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(mock);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
