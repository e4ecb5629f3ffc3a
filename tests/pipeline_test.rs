use std::time::Duration;

use mockito::Matcher;
use spotpipe::{
    fetch::{ReqwestTransport, RetryPolicy, RetryingFetcher, TokioSleeper},
    management::{BlobLayout, Stage},
    pipeline::{self, ArtistBatch, StageOptions},
    spotify::SpotifyClient,
    storage::{self, DryRunStore, LocalStore},
    types::{AlbumRecord, ArtistRecord, FailedEntity, SeedArtist, SongRecord, SpotifyArtist},
    utils,
};

fn client(server: &mockito::Server) -> SpotifyClient {
    let fetcher = RetryingFetcher::with_parts(
        ReqwestTransport::default(),
        TokioSleeper,
        RetryPolicy::new(2, Duration::from_millis(5)),
    );
    SpotifyClient::new(fetcher, &server.url(), "test-token")
}

fn quiet() -> StageOptions {
    StageOptions {
        fail_fast: false,
        pacing: Duration::ZERO,
        show_progress: false,
    }
}

fn seed(id: &str, name: &str) -> SeedArtist {
    SeedArtist {
        spotify_id: id.to_string(),
        artist_name: name.to_string(),
        monthly_listeners: 1_000,
    }
}

fn artist(id: &str, name: &str) -> ArtistRecord {
    let spotify: SpotifyArtist = serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
    }))
    .unwrap();
    utils::artist_record(&seed(id, name), &spotify, "2024-01-01 00:00:00")
}

fn album_page(id: &str, album_type: &str) -> String {
    format!(
        r#"{{"items":[{{"id":"{id}","name":"Album {id}","album_type":"{album_type}",
            "release_date":"2020-05-01","total_tracks":1,
            "external_urls":{{"spotify":"https://open.spotify.com/album/{id}"}},"images":[]}}],
            "next":null}}"#
    )
}

#[tokio::test]
async fn test_artists_stage_enriches_seed_and_records_unknown_ids() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/artists")
        .match_query(Matcher::UrlEncoded("ids".into(), "a1,gone".into()))
        .with_status(200)
        .with_body(
            r#"{"artists":[{"id":"a1","name":"First",
                "external_urls":{"spotify":"https://open.spotify.com/artist/a1"},
                "followers":{"total":77},"popularity":55,"genres":["rock"],"images":[]},null]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "bucket");
    let layout = BlobLayout::for_page(1);
    storage::write_json(&store, &layout.seed(), &vec![seed("a1", "First"), seed("gone", "Gone")])
        .await
        .unwrap();

    let report = pipeline::run_artists(&client(&server), &store, &layout, &quiet())
        .await
        .unwrap();

    assert_eq!(report.processed, 1);
    assert!(report.failures.has("gone"));

    let artists: Vec<ArtistRecord> = storage::read_json(&store, &layout.artists()).await.unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].metrics.spotify.followers, 77);
    assert_eq!(artists[0].metrics.kworb.monthly_listeners, 1_000);
    assert_eq!(artists[0].spotify_meta.genres, vec!["rock"]);

    let failures: Vec<FailedEntity> = storage::read_json(&store, &layout.failures(Stage::Artists))
        .await
        .unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].entity_name, "Gone");
}

#[tokio::test]
async fn test_albums_stage_isolates_a_failing_artist() {
    let mut server = mockito::Server::new_async().await;
    let good = server
        .mock("GET", "/artists/good/albums")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(album_page("al1", "album"))
        .expect(1)
        .create_async()
        .await;
    let bad = server
        .mock("GET", "/artists/bad/albums")
        .match_query(Matcher::Any)
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "bucket");
    let layout = BlobLayout::for_page(1);
    let artists = vec![artist("bad", "Bad Artist"), artist("good", "Good Artist")];
    storage::write_json(&store, &layout.artists(), &artists)
        .await
        .unwrap();

    let report = pipeline::run_albums(&client(&server), &store, &layout, 0, &quiet())
        .await
        .unwrap();

    good.assert_async().await;
    bad.assert_async().await;
    assert_eq!(report.processed, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures.has("bad"));

    let albums: Vec<AlbumRecord> =
        storage::read_json(&store, &layout.albums("good", "Good Artist"))
            .await
            .unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].artist_name, "Good Artist");
    assert!(!albums[0].is_processed);

    let failures: Vec<FailedEntity> = storage::read_json(&store, &layout.failures(Stage::Albums))
        .await
        .unwrap();
    assert_eq!(failures[0].entity_id, "bad");
    assert!(failures[0].error.contains("404"));
}

#[tokio::test]
async fn test_albums_stage_fail_fast_stops_at_first_failure() {
    let mut server = mockito::Server::new_async().await;
    let _bad = server
        .mock("GET", "/artists/bad/albums")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;
    let good = server
        .mock("GET", "/artists/good/albums")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(album_page("al1", "album"))
        .expect(0)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "bucket");
    let layout = BlobLayout::for_page(1);
    let artists = vec![artist("bad", "Bad Artist"), artist("good", "Good Artist")];
    storage::write_json(&store, &layout.artists(), &artists)
        .await
        .unwrap();

    let options = StageOptions {
        fail_fast: true,
        ..quiet()
    };
    let err = pipeline::run_albums(&client(&server), &store, &layout, 0, &options)
        .await
        .unwrap_err();

    good.assert_async().await;
    assert!(err.to_string().contains("Bad Artist"));
    assert!(!err.is_cancelled());
}

#[tokio::test]
async fn test_songs_stage_only_fetches_full_albums() {
    let mut server = mockito::Server::new_async().await;
    let tracks = server
        .mock("GET", "/albums/al1/tracks")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"items":[{"id":"t1","name":"Song","artists":[{"name":"Lead"},{"name":"Guest"}],
                "duration_ms":180000,"explicit":false}],"next":null}"#,
        )
        .expect(1)
        .create_async()
        .await;
    let single = server
        .mock("GET", "/albums/sg1/tracks")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "bucket");
    let layout = BlobLayout::for_page(2);
    let lead = artist("a1", "Lead");
    storage::write_json(&store, &layout.artists(), &vec![lead.clone()])
        .await
        .unwrap();

    let albums: Vec<AlbumRecord> = ["album", "single"]
        .iter()
        .zip(["al1", "sg1"])
        .map(|(kind, id)| {
            let page: serde_json::Value = serde_json::from_str(&album_page(id, kind)).unwrap();
            let album = serde_json::from_value(page["items"][0].clone()).unwrap();
            utils::album_record("Lead", album)
        })
        .collect();
    storage::write_json(&store, &layout.albums("a1", "Lead"), &albums)
        .await
        .unwrap();

    let report = pipeline::run_songs(
        &client(&server),
        &store,
        &layout,
        ArtistBatch::default(),
        &quiet(),
    )
    .await
    .unwrap();

    tracks.assert_async().await;
    single.assert_async().await;
    assert_eq!(report.processed, 1);
    assert!(report.failures.is_empty());

    let songs: Vec<SongRecord> = storage::read_json(&store, &layout.songs("a1", "Lead", "al1"))
        .await
        .unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].primary_artist, "Lead");
    assert_eq!(songs[0].artists, vec!["Lead", "Guest"]);
    assert_eq!(songs[0].release_date, "2020-05-01");
    assert_eq!(songs[0].album, "Album al1");
}

#[tokio::test]
async fn test_songs_stage_isolates_missing_albums_and_failing_albums() {
    let mut server = mockito::Server::new_async().await;
    let broken = server
        .mock("GET", "/albums/bad1/tracks")
        .match_query(Matcher::Any)
        .with_status(404)
        .expect(1)
        .create_async()
        .await;
    let working = server
        .mock("GET", "/albums/ok1/tracks")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"items":[{"id":"t9","name":"Still Here","artists":[{"name":"Second"}],
                "duration_ms":200000}],"next":null}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "bucket");
    let layout = BlobLayout::for_page(1);
    let artists = vec![artist("noalb", "No Albums"), artist("a2", "Second")];
    storage::write_json(&store, &layout.artists(), &artists)
        .await
        .unwrap();

    let albums: Vec<AlbumRecord> = ["bad1", "ok1"]
        .iter()
        .map(|id| {
            let page: serde_json::Value = serde_json::from_str(&album_page(id, "album")).unwrap();
            let album = serde_json::from_value(page["items"][0].clone()).unwrap();
            utils::album_record("Second", album)
        })
        .collect();
    storage::write_json(&store, &layout.albums("a2", "Second"), &albums)
        .await
        .unwrap();

    let report = pipeline::run_songs(
        &client(&server),
        &store,
        &layout,
        ArtistBatch::default(),
        &quiet(),
    )
    .await
    .unwrap();

    broken.assert_async().await;
    working.assert_async().await;
    assert_eq!(report.processed, 1);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.has("noalb"));
    assert!(report.failures.has("bad1"));

    let songs: Vec<SongRecord> = storage::read_json(&store, &layout.songs("a2", "Second", "ok1"))
        .await
        .unwrap();
    assert_eq!(songs[0].name, "Still Here");

    let failures: Vec<FailedEntity> = storage::read_json(&store, &layout.failures(Stage::Songs))
        .await
        .unwrap();
    let names: Vec<&str> = failures.iter().map(|f| f.entity_name.as_str()).collect();
    assert_eq!(names, vec!["No Albums", "Album bad1"]);
    assert!(failures[0].error.contains("not found"));
}

#[tokio::test]
async fn test_dry_run_leaves_the_bucket_untouched() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/artists")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"artists":[{"id":"a1","name":"First"}]}"#)
        .create_async()
        .await;

    let bucket_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let local = LocalStore::new(bucket_dir.path(), "bucket");
    let layout = BlobLayout::for_page(1);
    storage::write_json(&local, &layout.seed(), &vec![seed("a1", "First")])
        .await
        .unwrap();

    let store = DryRunStore::new(local.clone(), out_dir.path());
    let report = pipeline::run_artists(&client(&server), &store, &layout, &quiet())
        .await
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(store.written_keys(), vec![layout.artists()]);
    assert!(!local.path_for(&layout.artists()).unwrap().exists());

    let diverted = out_dir
        .path()
        .join(DryRunStore::<LocalStore>::file_name_for(&layout.artists()));
    let artists: Vec<ArtistRecord> =
        serde_json::from_slice(&std::fs::read(diverted).unwrap()).unwrap();
    assert_eq!(artists[0].spotify_id, "a1");
}

#[tokio::test]
async fn test_missing_stage_input_fails_the_stage() {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), "bucket");

    let err = pipeline::run_albums(&client(&server), &store, &BlobLayout::for_page(9), 0, &quiet())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}
