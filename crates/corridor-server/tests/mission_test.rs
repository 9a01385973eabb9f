//! Mission relay integration tests against a running server.
//!
//! Run with: cargo test --test mission_test -- --ignored

use reqwest::Client;

fn base_url() -> String {
    std::env::var("CORRIDOR_TEST_URL").unwrap_or_else(|_| "http://localhost:5006".to_string())
}

fn mission() -> serde_json::Value {
    serde_json::json!({
        "droneData": {"lat": 55.75, "lng": 37.599},
        "routePoints": [
            {"lat": 55.75, "lng": 37.599, "altitude": 40.0},
            {"lat": 55.75, "lng": 37.601, "altitude": 50.0}
        ],
        "savedPolygons": {
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [37.5997, 55.7498],
                        [37.6003, 55.7498],
                        [37.6003, 55.7502],
                        [37.5997, 55.7502],
                        [37.5997, 55.7498]
                    ]]
                }
            }]
        }
    })
}

/// Upload a mission, compute its corridor and fetch the published route.
#[tokio::test]
#[ignore]
async fn test_mission_compute_and_publish() {
    let client = Client::new();
    let base = base_url();

    let resp = client
        .post(format!("{}/update-mission", base))
        .json(&mission())
        .send()
        .await
        .expect("Failed to update mission");
    assert!(resp.status().is_success(), "Should store the mission");

    let stored: serde_json::Value = client
        .get(format!("{}/get-mission", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["routePoints"].as_array().unwrap().len(), 2);

    let resp = client
        .post(format!("{}/compute-route", base))
        .json(&serde_json::json!({"offset": 4.0}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success(), "Should compute the route");
    let summary: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(summary["success"], true);

    let route: Vec<serde_json::Value> = client
        .get(format!("{}/offset_route.json", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(Some(route.len() as u64), summary["points"].as_u64());
}

/// Non-numeric offsets are rejected before any computation.
#[tokio::test]
#[ignore]
async fn test_invalid_offset_rejected() {
    let client = Client::new();
    let resp = client
        .post(format!("{}/compute-route", base_url()))
        .json(&serde_json::json!({"offset": "wide"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}
