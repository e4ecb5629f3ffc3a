use std::time::Duration;

use mockito::Matcher;
use reqwest::StatusCode;
use spotpipe::{
    fetch::{FetchError, FetchRequest, ReqwestTransport, RetryPolicy, RetryingFetcher, TokioSleeper},
    spotify::{SpotifyClient, SpotifyError},
};

fn fetcher(max_retries: u32) -> RetryingFetcher {
    RetryingFetcher::with_parts(
        ReqwestTransport::default(),
        TokioSleeper,
        RetryPolicy::new(max_retries, Duration::from_millis(10)),
    )
}

fn client(server: &mockito::Server) -> SpotifyClient {
    SpotifyClient::new(fetcher(3), &server.url(), "test-token")
}

#[tokio::test]
async fn test_server_errors_are_retried_until_exhausted() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/flaky")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let request = FetchRequest::get(format!("{}/flaky", server.url()));
    let err = fetcher(3).fetch(&request).await.unwrap_err();

    mock.assert_async().await;
    match err {
        FetchError::ExhaustedRetries { attempts, last, .. } => {
            assert_eq!(attempts, 3);
            assert_eq!(last.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body(r#"{"error":{"status":404,"message":"Not found."}}"#)
        .expect(1)
        .create_async()
        .await;

    let request = FetchRequest::get(format!("{}/missing", server.url()));
    let err = fetcher(3).fetch(&request).await.unwrap_err();

    mock.assert_async().await;
    assert!(err.is_fatal());
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/limited")
        .with_status(429)
        .with_header("Retry-After", "0")
        .expect(2)
        .create_async()
        .await;

    let request = FetchRequest::get(format!("{}/limited", server.url()));
    let err = fetcher(2).fetch(&request).await.unwrap_err();

    mock.assert_async().await;
    assert!(err.is_exhausted());
}

#[tokio::test]
async fn test_query_and_headers_reach_the_server() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/echo")
        .match_query(Matcher::UrlEncoded("limit".into(), "50".into()))
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let request = FetchRequest::get(format!("{}/echo", server.url()))
        .bearer("secret")
        .query("limit", 50);
    let result = fetcher(3).fetch(&request).await.unwrap();

    mock.assert_async().await;
    assert!(result.succeeded);
    assert_eq!(result.status, StatusCode::OK);
    let body: serde_json::Value = result.json().unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_several_artists_keeps_unknown_ids() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/artists")
        .match_query(Matcher::UrlEncoded("ids".into(), "a1,zz".into()))
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body(
            r#"{"artists":[
                {"id":"a1","name":"First","external_urls":{"spotify":"https://open.spotify.com/artist/a1"},
                 "followers":{"total":12},"popularity":40,"genres":["pop"],"images":[]},
                null
            ]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let found = client(&server)
        .several_artists(&["a1".to_string(), "zz".to_string()])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(found.len(), 2);
    let first = found[0].as_ref().unwrap();
    assert_eq!(first.name, "First");
    assert_eq!(first.followers.total, 12);
    assert!(found[1].is_none());
}

#[tokio::test]
async fn test_more_than_fifty_artist_ids_are_rejected() {
    let server = mockito::Server::new_async().await;
    let ids: Vec<String> = (0..51).map(|i| format!("id{}", i)).collect();

    let err = client(&server).several_artists(&ids).await.unwrap_err();
    assert!(matches!(err, SpotifyError::InvalidInput(_)));
}

#[tokio::test]
async fn test_album_tracks_follow_next_until_null() {
    let mut server = mockito::Server::new_async().await;
    let next = format!("{}/albums/al1/tracks/page2", server.url());

    let first = server
        .mock("GET", "/albums/al1/tracks")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(format!(
            r#"{{"items":[{{"id":"t1","name":"One","artists":[{{"name":"A"}}],"duration_ms":1000}}],
                "next":"{}","total":2,"limit":1,"offset":0}}"#,
            next
        ))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/albums/al1/tracks/page2")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"items":[{"id":"t2","name":"Two","artists":[{"name":"A"},{"name":"B"}],"duration_ms":2000,"explicit":true}],
                "next":null,"total":2,"limit":1,"offset":1}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let tracks = client(&server).album_tracks("al1").await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let names: Vec<&str> = tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["One", "Two"]);
    assert!(tracks[1].explicit);
}

#[tokio::test]
async fn test_endless_listing_is_cut_off() {
    let mut server = mockito::Server::new_async().await;
    let next = format!("{}/albums/loop/tracks", server.url());
    let _m = server
        .mock("GET", "/albums/loop/tracks")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(format!(r#"{{"items":[],"next":"{}"}}"#, next))
        .create_async()
        .await;

    let err = client(&server)
        .with_max_pages(3)
        .album_tracks("loop")
        .await
        .unwrap_err();
    assert!(matches!(err, SpotifyError::TooManyPages { max_pages: 3, .. }));
}

#[tokio::test]
async fn test_malformed_success_body_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/albums/al1/tracks")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .expect(1)
        .create_async()
        .await;

    let err = client(&server).album_tracks("al1").await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, SpotifyError::Decode { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_short_artist_response_is_unexpected_body() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/artists")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"artists":[{"id":"a1","name":"First"}]}"#)
        .create_async()
        .await;

    let err = client(&server)
        .several_artists(&["a1".to_string(), "a2".to_string()])
        .await
        .unwrap_err();

    match err {
        SpotifyError::UnexpectedBody { reason, .. } => {
            assert!(reason.contains("asked for 2 artists, received 1"))
        }
        other => panic!("expected unexpected body, got {:?}", other),
    }
}
