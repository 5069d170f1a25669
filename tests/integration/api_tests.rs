//! API integration tests
//!
//! These run against a live server with a migrated database:
//! `cargo test --test api_tests -- --ignored`

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:3000/api";

/// Register a throwaway user and return (token, user id)
async fn register_user(client: &Client) -> (String, String) {
    let suffix = Uuid::new_v4().simple().to_string();
    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "email": format!("fan-{}@example.com", &suffix[..12]),
            "username": format!("fan_{}", &suffix[..12]),
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse register response");
    let token = body["data"]["token"].as_str().expect("No token in response").to_string();
    let id = body["data"]["user"]["id"].as_str().expect("No user id").to_string();
    (token, id)
}

async fn create_venue(client: &Client) -> String {
    let response = client
        .post(format!("{}/venues", BASE_URL))
        .json(&json!({
            "name": format!("Basement {}", Uuid::new_v4().simple()),
            "city": "Austin",
            "latitude": 30.2672,
            "longitude": -97.7431
        }))
        .send()
        .await
        .expect("Failed to create venue");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_band(client: &Client) -> String {
    let response = client
        .post(format!("{}/bands", BASE_URL))
        .json(&json!({
            "name": format!("The Feedback {}", Uuid::new_v4().simple()),
            "genre": "punk"
        }))
        .send()
        .await
        .expect("Failed to create band");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_and_me() {
    let client = Client::new();
    let suffix = Uuid::new_v4().simple().to_string();
    let email = format!("login-{}@example.com", &suffix[..12]);

    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "email": email,
            "username": format!("login_{}", &suffix[..12]),
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({"email": email, "password": "correct-horse-battery"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap();
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let response = client
        .get(format!("{}/users/me", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["stats"]["reviewCount"], 0);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({
            "email": "nobody@example.com",
            "password": "wrong-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_missing_token_is_unauthorized() {
    let client = Client::new();
    let response = client.get(format!("{}/users/me", BASE_URL)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_review_updates_aggregate_and_rejects_duplicate() {
    let client = Client::new();
    let (token, _) = register_user(&client).await;
    let venue_id = create_venue(&client).await;

    let response = client
        .post(format!("{}/reviews", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"venueId": venue_id, "rating": 4, "title": "Loud and sweaty"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let venue: Value = client
        .get(format!("{}/venues/{}", BASE_URL, venue_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(venue["data"]["averageRating"], 4.0);
    assert_eq!(venue["data"]["totalReviews"], 1);

    let response = client
        .post(format!("{}/reviews", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"venueId": venue_id, "rating": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("already reviewed"));

    let venue: Value = client
        .get(format!("{}/venues/{}", BASE_URL, venue_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(venue["data"]["averageRating"], 4.0);
    assert_eq!(venue["data"]["totalReviews"], 1);
}

#[tokio::test]
#[ignore]
async fn test_review_target_and_rating_validation() {
    let client = Client::new();
    let (token, _) = register_user(&client).await;
    let venue_id = create_venue(&client).await;
    let band_id = create_band(&client).await;

    let cases = [
        json!({"venueId": venue_id, "bandId": band_id, "rating": 3}),
        json!({"rating": 3}),
        json!({"venueId": venue_id, "rating": 0}),
        json!({"venueId": venue_id, "rating": 6}),
        json!({"venueId": venue_id, "rating": 4.5}),
    ];
    for payload in cases {
        let response = client
            .post(format!("{}/reviews", BASE_URL))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
#[ignore]
async fn test_event_resolve_or_create_is_deduplicated() {
    let client = Client::new();
    let (token, _) = register_user(&client).await;
    let venue_id = create_venue(&client).await;
    let band_id = create_band(&client).await;
    let payload = json!({"venueId": venue_id, "bandId": band_id, "eventDate": "2024-06-01"});

    let first: Value = client
        .post(format!("{}/events", BASE_URL))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = client
        .post(format!("{}/events", BASE_URL))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first["data"]["id"], second["data"]["id"]);
    assert_eq!(first["data"]["checkinCount"], 0);
}

#[tokio::test]
#[ignore]
async fn test_checkin_flow() {
    let client = Client::new();
    let (token, _) = register_user(&client).await;
    let (friend_token, _) = register_user(&client).await;
    let venue_id = create_venue(&client).await;
    let band_id = create_band(&client).await;
    let payload = json!({
        "venueId": venue_id,
        "bandId": band_id,
        "eventDate": "2024-06-01",
        "bandRating": 5
    });

    let response = client
        .post(format!("{}/checkins", BASE_URL))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let checkin_id = body["data"]["id"].as_str().unwrap().to_string();
    let event_id = body["data"]["event"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["toastCount"], 0);
    assert_eq!(body["data"]["hasUserToasted"], false);

    // Second check-in to the same show
    let response = client
        .post(format!("{}/checkins", BASE_URL))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Band aggregate catches up in the background
    let mut band = Value::Null;
    for _ in 0..20 {
        band = client
            .get(format!("{}/bands/{}", BASE_URL, band_id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if band["data"]["totalReviews"] == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(band["data"]["averageRating"], 5.0);
    assert_eq!(band["data"]["totalReviews"], 1);

    // Toasts
    let toast_url = format!("{}/checkins/{}/toast", BASE_URL, checkin_id);
    let response = client.post(&toast_url).bearer_auth(&friend_token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = client.post(&toast_url).bearer_auth(&friend_token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let details: Value = client
        .get(format!("{}/checkins/{}", BASE_URL, checkin_id))
        .bearer_auth(&friend_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details["data"]["toastCount"], 1);
    assert_eq!(details["data"]["hasUserToasted"], true);

    let response = client.delete(&toast_url).bearer_auth(&friend_token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = client.delete(&toast_url).bearer_auth(&friend_token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Comments
    let comments_url = format!("{}/checkins/{}/comments", BASE_URL, checkin_id);
    let response = client
        .post(&comments_url)
        .bearer_auth(&friend_token)
        .json(&json!({"commentText": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = client
        .post(&comments_url)
        .bearer_auth(&friend_token)
        .json(&json!({"commentText": "What a set"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Events with check-ins cannot be deleted
    let response = client
        .delete(format!("{}/events/{}", BASE_URL, event_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let response = client.get(format!("{}/events/{}", BASE_URL, event_id)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Only the owner may delete the check-in
    let url = format!("{}/checkins/{}", BASE_URL, checkin_id);
    let response = client.delete(&url).bearer_auth(&friend_token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = client.delete(&url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_badge_awards_are_idempotent() {
    let client = Client::new();
    let (token, _) = register_user(&client).await;
    let venue_id = create_venue(&client).await;

    client
        .post(format!("{}/reviews", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"venueId": venue_id, "rating": 5}))
        .send()
        .await
        .unwrap();

    let url = format!("{}/badges/check-awards", BASE_URL);
    let first: Value = client.post(&url).bearer_auth(&token).send().await.unwrap().json().await.unwrap();
    assert!(first["data"]["count"].as_u64().is_some());

    let second: Value = client.post(&url).bearer_auth(&token).send().await.unwrap().json().await.unwrap();
    assert_eq!(second["data"]["count"], 0);
    assert_eq!(second["data"]["badges"], json!([]));
}

#[tokio::test]
#[ignore]
async fn test_nearby_venue_coordinates_are_validated() {
    let client = Client::new();
    let response = client
        .get(format!("{}/venues/near?lat=91&lng=0", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/venues/near?lat=30.2672&lng=-97.7431&radius=10", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn check_in(client: &Client, token: &str, venue_id: &str, band_id: &str) -> String {
    let response = client
        .post(format!("{}/checkins", BASE_URL))
        .bearer_auth(token)
        .json(&json!({"venueId": venue_id, "bandId": band_id, "eventDate": "2024-06-01"}))
        .send()
        .await
        .expect("Failed to check in");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn feed_ids(client: &Client, token: &str, query: &str) -> Vec<String> {
    let response = client
        .get(format!("{}/checkins/feed?{}", BASE_URL, query))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let items = body["data"].as_array().expect("feed is a list");

    let times: Vec<_> = items
        .iter()
        .map(|c| chrono::DateTime::parse_from_rfc3339(c["createdAt"].as_str().unwrap()).unwrap())
        .collect();
    assert!(times.windows(2).all(|w| w[0] >= w[1]), "feed is newest first");

    items.iter().map(|c| c["id"].as_str().unwrap().to_string()).collect()
}

async fn venue_rating(client: &Client, venue_id: &str) -> (f64, i64) {
    let body: Value = client
        .get(format!("{}/venues/{}", BASE_URL, venue_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    (
        body["data"]["averageRating"].as_f64().unwrap(),
        body["data"]["totalReviews"].as_i64().unwrap(),
    )
}

#[tokio::test]
#[ignore]
async fn test_activity_feed_filters() {
    let client = Client::new();
    let (fan_token, _) = register_user(&client).await;
    let (friend_token, friend_id) = register_user(&client).await;
    let (stranger_token, _) = register_user(&client).await;

    let response = client
        .post(format!("{}/users/{}/follow", BASE_URL, friend_id))
        .bearer_auth(&fan_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (venue_id, band_id) = (create_venue(&client).await, create_band(&client).await);
    let friend_checkin = check_in(&client, &friend_token, &venue_id, &band_id).await;
    let (venue_id, band_id) = (create_venue(&client).await, create_band(&client).await);
    let stranger_checkin = check_in(&client, &stranger_token, &venue_id, &band_id).await;

    // Only followed users show up in the friends feed
    let friends = feed_ids(&client, &fan_token, "filter=friends").await;
    assert_eq!(friends, vec![friend_checkin.clone()]);

    // Global feed has both, newest first
    let global = feed_ids(&client, &fan_token, "filter=global&limit=100").await;
    let friend_pos = global.iter().position(|id| *id == friend_checkin).unwrap();
    let stranger_pos = global.iter().position(|id| *id == stranger_checkin).unwrap();
    assert!(stranger_pos < friend_pos);

    // Nearby around the venues' coordinates, far away, and without coordinates
    let near = feed_ids(&client, &fan_token, "filter=nearby&lat=30.2672&lng=-97.7431&radius=10&limit=100").await;
    assert!(near.contains(&friend_checkin));
    assert!(near.contains(&stranger_checkin));

    let far = feed_ids(&client, &fan_token, "filter=nearby&lat=35.6762&lng=139.6503&radius=10&limit=100").await;
    assert!(!far.contains(&friend_checkin));
    assert!(!far.contains(&stranger_checkin));

    let anywhere = feed_ids(&client, &fan_token, "filter=nearby&limit=100").await;
    assert!(anywhere.contains(&friend_checkin));
    assert!(anywhere.contains(&stranger_checkin));

    let response = client
        .get(format!("{}/checkins/feed?filter=nearby&lat=95&lng=0", BASE_URL))
        .bearer_auth(&fan_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_aggregate_tracks_review_updates_and_deletes() {
    let client = Client::new();
    let (first_token, _) = register_user(&client).await;
    let (second_token, _) = register_user(&client).await;
    let venue_id = create_venue(&client).await;

    let mut review_ids = Vec::new();
    for (token, rating) in [(&first_token, 2), (&second_token, 5)] {
        let response = client
            .post(format!("{}/reviews", BASE_URL))
            .bearer_auth(token)
            .json(&json!({"venueId": venue_id, "rating": rating}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        review_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }
    assert_eq!(venue_rating(&client, &venue_id).await, (3.5, 2));

    let response = client
        .put(format!("{}/reviews/{}", BASE_URL, review_ids[0]))
        .bearer_auth(&first_token)
        .json(&json!({"rating": 4}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(venue_rating(&client, &venue_id).await, (4.5, 2));

    let response = client
        .delete(format!("{}/reviews/{}", BASE_URL, review_ids[1]))
        .bearer_auth(&second_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(venue_rating(&client, &venue_id).await, (4.0, 1));
}

#[tokio::test]
#[ignore]
async fn test_deactivated_account_cannot_write() {
    let client = Client::new();
    let (token, _) = register_user(&client).await;
    let venue_id = create_venue(&client).await;
    let band_id = create_band(&client).await;

    let response = client
        .delete(format!("{}/users/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(format!("{}/reviews", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"venueId": venue_id, "rating": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(format!("{}/checkins", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"venueId": venue_id, "bandId": band_id, "eventDate": "2024-06-01"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
