//! HTTP gateway integration tests.
//!
//! Starts an axum mock backend and exercises the reqwest gateways against it.

#[path = "../support/mod.rs"]
mod support;
mod server;

use std::time::Duration;

use server::{Mock, BOOKED_TOUR};
use support::{comment, comment_draft, tour, tour_draft, tours};
use tourdesk::{
    Booking, BookingDraft, ClientConfig, Comment, FlowError, Gateway, GatewayError, GraceWindows,
    HttpClient, IntentState, OptimisticCollection, RecordingChannel, Tour, TourSearch,
    UpdateGateway,
};

async fn backend() -> (Mock, String) {
    support::init_tracing();
    let mock = Mock::new(
        tours(&[1, 2, 3, BOOKED_TOUR]),
        vec![comment(1, 2), comment(2, 2), comment(3, 1)],
    );
    let base = server::start(mock.clone()).await;
    (mock, base)
}

#[tokio::test]
async fn lists_and_fetches_tours() {
    let (_mock, base) = backend().await;
    let gateway = HttpClient::new(&base).tours();

    let listed = gateway.list().await.unwrap();
    assert_eq!(listed.len(), 4);
    assert_eq!(listed[1], tour(2));

    assert_eq!(gateway.get(3).await.unwrap().name, "Tour 3");
    assert_eq!(
        gateway.get(99).await.unwrap_err(),
        GatewayError::rejected(404, "Tour 99 not found")
    );
}

#[tokio::test]
async fn search_sends_only_set_fields() {
    let (mock, base) = backend().await;
    let gateway = HttpClient::new(&base).tours();

    let search = TourSearch::new().country("Norway").min_rating(5);
    let found = gateway.search(&search).await.unwrap();
    assert_eq!(found.len(), 4);
    assert_eq!(mock.search_queries(), vec!["country=Norway&rating=5".to_string()]);

    let none = gateway
        .search(&TourSearch::new().country("Peru"))
        .await
        .unwrap();
    assert!(none.is_empty());

    // An empty search is a plain list.
    assert_eq!(gateway.search(&TourSearch::new()).await.unwrap().len(), 4);
    assert_eq!(mock.search_queries().len(), 2);
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let (mock, base) = backend().await;

    HttpClient::new(&base).tours().list().await.unwrap();
    HttpClient::new(&base)
        .with_bearer_token("secret")
        .tours()
        .list()
        .await
        .unwrap();

    let config = ClientConfig::default()
        .with_base_url(format!("{base}/"))
        .with_bearer_token("from-config");
    HttpClient::from_config(&config)
        .unwrap()
        .tours()
        .list()
        .await
        .unwrap();

    assert_eq!(
        mock.auth_headers(),
        vec![
            None,
            Some("Bearer secret".to_string()),
            Some("Bearer from-config".to_string()),
        ]
    );
}

#[tokio::test]
async fn create_returns_server_assigned_id() {
    let (mock, base) = backend().await;
    let gateway = HttpClient::new(&base).tours();

    let created = gateway.create(tour_draft("Fjord Cruise")).await.unwrap();
    assert_eq!(created.id, BOOKED_TOUR + 1);
    assert_eq!(created.name, "Fjord Cruise");
    assert!(mock.tour_ids().contains(&created.id));

    let err = gateway.create(tour_draft("Fjord Cruise")).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), Some("Tour name already taken"));
}

#[tokio::test]
async fn delete_maps_rejections() {
    let (mock, base) = backend().await;
    let gateway = HttpClient::new(&base).tours();

    gateway.delete(1).await.unwrap();
    assert_eq!(mock.tour_ids(), vec![2, 3, BOOKED_TOUR]);

    let booked = gateway.delete(BOOKED_TOUR).await.unwrap_err();
    assert_eq!(booked, GatewayError::rejected(409, "Tour has active bookings"));

    let missing = gateway.delete(1).await.unwrap_err();
    assert_eq!(missing.status(), Some(404));
    assert_eq!(missing.display_message("Could not delete tour!"), "Could not delete tour!");
}

#[tokio::test]
async fn comments_are_scoped_to_their_tour() {
    let (mock, base) = backend().await;
    let gateway = HttpClient::new(&base).comments(2);
    assert_eq!(gateway.tour_id(), 2);

    let ids: Vec<_> = gateway.list().await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2]);

    // The gateway pins the tour id, whatever the draft says.
    let created = gateway.create(comment_draft(99, "Great food")).await.unwrap();
    assert_eq!(created.id, 4);
    assert_eq!(created.tour_id, 2);

    gateway.delete(1).await.unwrap();
    assert_eq!(mock.comment_ids(), vec![2, 3, 4]);
}

#[tokio::test]
async fn tours_and_comments_are_updated_with_put() {
    let (mock, base) = backend().await;
    let http = HttpClient::new(&base);

    let edited = Tour {
        price: 1500.0,
        ..tour(2)
    };
    let saved = http.tours().update(edited.clone()).await.unwrap();
    assert_eq!(saved, edited);
    assert_eq!(mock.tour(2).unwrap().price, 1500.0);

    let refused = http
        .tours()
        .update(Tour {
            price: -1.0,
            ..tour(3)
        })
        .await
        .unwrap_err();
    assert_eq!(refused.status(), Some(400));
    assert_eq!(mock.tour(3).unwrap(), tour(3));

    let missing = http.tours().update(tour(99)).await.unwrap_err();
    assert_eq!(missing.status(), Some(404));

    let note = Comment {
        content: "Guide was wonderful".into(),
        username: "mallory".into(),
        ..comment(1, 2)
    };
    let saved = http.comments(2).update(note).await.unwrap();
    assert_eq!(saved.content, "Guide was wonderful");
    assert_eq!(saved.username, "alice");
}

#[tokio::test]
async fn optimistic_update_over_http() {
    let (_mock, base) = backend().await;
    let channel = RecordingChannel::new();
    let comments: OptimisticCollection<Comment, _, _> =
        OptimisticCollection::new(HttpClient::new(&base).comments(2), channel.clone());
    comments.load().await.unwrap();

    let edited = Comment {
        content: "Second visit was even better".into(),
        ..comment(2, 2)
    };
    comments.update(edited.clone()).await.unwrap();
    assert_eq!(comments.items().unwrap()[1], edited);

    let added = comments
        .create_now(comment_draft(2, "Bring a warm coat"))
        .await
        .unwrap();
    assert_eq!(comments.ids().unwrap(), vec![1, 2, added.id]);
    assert!(channel.prompts().is_empty());
}

#[tokio::test]
async fn bookings_need_a_token() {
    let (mock, base) = backend().await;

    let err = HttpClient::new(&base).bookings().list().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let err = HttpClient::new(&base)
        .bookings()
        .create(BookingDraft::new(1, 2))
        .await
        .unwrap_err();
    assert_eq!(err.display_message("Unauthorized"), "Unauthorized");
    assert!(mock.booking_ids().is_empty());
}

#[tokio::test]
async fn bookings_are_made_listed_and_cancelled() {
    let (mock, base) = backend().await;
    let bookings = HttpClient::new(&base).with_bearer_token("secret").bookings();

    let booked = bookings
        .create(BookingDraft::for_tour(&tour(1), 3))
        .await
        .unwrap();
    assert_eq!(booked.id, 1);
    assert_eq!(booked.booked_tour_id(), Some(1));
    assert_eq!(booked.total_price(), Some(3600.0));
    assert_eq!(mock.tour(1).unwrap().available_spots, 1);

    let overbooked = bookings.create(BookingDraft::new(1, 2)).await.unwrap_err();
    assert_eq!(overbooked, GatewayError::rejected(400, "Not enough available spots"));

    let listed: Vec<Booking> = bookings.list().await.unwrap();
    assert_eq!(listed, vec![booked]);

    bookings.delete(1).await.unwrap();
    assert!(mock.booking_ids().is_empty());
    assert_eq!(mock.tour(1).unwrap().available_spots, 4);

    let again = bookings.delete(1).await.unwrap_err();
    assert_eq!(again.display_message("Cancel failed"), "Cancel failed");
}

#[tokio::test]
async fn booking_cancel_has_an_undo_window() {
    let (mock, base) = backend().await;
    let http = HttpClient::new(&base).with_bearer_token("secret");
    let channel = RecordingChannel::new();
    let bookings: OptimisticCollection<Booking, _, _> =
        OptimisticCollection::new(http.bookings(), channel.clone()).with_windows(GraceWindows {
            delete: Duration::from_millis(50),
            create: Duration::from_millis(50),
        });

    let booked = bookings
        .create_now(BookingDraft::for_tour(&tour(2), 2))
        .await
        .unwrap();
    assert_eq!(bookings.ids().unwrap(), vec![booked.id]);

    let refused = bookings
        .create_now(BookingDraft::for_tour(&tour(2), 9))
        .await
        .unwrap_err();
    assert!(matches!(refused, FlowError::Invalid(_)), "got {refused:?}");

    let handle = bookings.delete(booked.id).unwrap().unwrap();
    assert!(bookings.items().unwrap().is_empty());
    assert_eq!(handle.settled().await, IntentState::Committed);
    assert!(mock.booking_ids().is_empty());
    assert_eq!(channel.notices().last().unwrap().message, "Booking cancelled!");
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let (mock, base) = backend().await;
    mock.break_json();

    let err = HttpClient::new(&base).tours().list().await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let base = server::dead_url().await;
    let config = ClientConfig::default()
        .with_base_url(base)
        .with_request_timeout(Duration::from_secs(2));

    let err = HttpClient::from_config(&config)
        .unwrap()
        .tours()
        .delete(1)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)), "got {err:?}");
    assert_eq!(err.display_message("Could not delete tour!"), "Could not delete tour!");
}

#[tokio::test]
async fn optimistic_flows_over_http() {
    let (mock, base) = backend().await;
    let channel = RecordingChannel::new();
    let windows = GraceWindows {
        delete: Duration::from_millis(50),
        create: Duration::from_millis(50),
    };
    let tours: OptimisticCollection<Tour, _, _> =
        OptimisticCollection::new(HttpClient::new(&base).tours(), channel.clone())
            .with_windows(windows);
    tours.load().await.unwrap();
    assert_eq!(tours.ids().unwrap(), vec![1, 2, 3, BOOKED_TOUR]);

    let booked = tours.delete(BOOKED_TOUR).unwrap().unwrap();
    let plain = tours.delete(2).unwrap().unwrap();
    assert_eq!(tours.ids().unwrap(), vec![1, 3]);

    assert_eq!(booked.settled().await, IntentState::Failed);
    assert_eq!(plain.settled().await, IntentState::Committed);
    assert_eq!(tours.ids().unwrap(), vec![1, 3, BOOKED_TOUR]);
    assert_eq!(mock.tour_ids(), vec![1, 3, BOOKED_TOUR]);

    let errors = channel.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Tour has active bookings");

    let created = tours.create(tour_draft("Midnight Sun")).unwrap();
    assert_eq!(created.settled().await, IntentState::Committed);
    assert_eq!(tours.ids().unwrap(), vec![1, 3, BOOKED_TOUR, BOOKED_TOUR + 1]);
}
