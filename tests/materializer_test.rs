mod common;

use std::collections::HashSet;

use common::{FakeService, track, tracks, uris};
use mixcli::{
    Error,
    materializer::{
        Materializer, Preset, RunConfig, RunObserver, RunState, SampleWidth, SourceStrategy,
        clear_playlist, find_playlist_by_name, write_tracks,
    },
    mood::Mood,
    types::{PlaylistHandle, TrackRef},
};
use rand::{SeedableRng, rngs::StdRng};

fn materializer(service: FakeService, seed: u64) -> Materializer<FakeService, StdRng> {
    Materializer::with_rng(service, StdRng::seed_from_u64(seed))
}

fn uri_set(tracks: &[TrackRef]) -> HashSet<String> {
    tracks.iter().map(|t| t.uri.clone()).collect()
}

fn radio_config(sample: Option<SampleWidth>, target: usize) -> RunConfig {
    RunConfig::new(
        "Radio picks",
        SourceStrategy::RandomPlaylists {
            patterns: vec!["Radio".to_string()],
            base_playlist: None,
            sample,
            force_first: sample.is_some(),
        },
    )
    .with_target_size(target)
}

#[derive(Default)]
struct RecordingObserver {
    states: Vec<RunState>,
    sources: Vec<String>,
}

impl RunObserver for RecordingObserver {
    fn on_state(&mut self, state: RunState) {
        self.states.push(state);
    }

    fn on_source(&mut self, name: &str) {
        self.sources.push(name.to_string());
    }
}

#[tokio::test]
async fn test_clear_removes_everything_in_pages() {
    let service = FakeService::new().with_playlist("Old", tracks(0..150));
    let handle = PlaylistHandle {
        id: service.playlist_id("Old").unwrap(),
        name: "Old".to_string(),
    };

    let stats = clear_playlist(&service, &handle).await.unwrap();

    assert_eq!(stats.cycles, 2);
    assert_eq!(stats.removed, 150);
    assert!(service.contents("Old").unwrap().is_empty());
    assert_eq!(service.calls().delete_tracks, 2);
    assert_eq!(service.calls().get_playlist_tracks, 3);
}

#[tokio::test]
async fn test_clear_empty_playlist_deletes_nothing() {
    let service = FakeService::new().with_playlist("Empty", Vec::new());
    let handle = PlaylistHandle {
        id: service.playlist_id("Empty").unwrap(),
        name: "Empty".to_string(),
    };

    let stats = clear_playlist(&service, &handle).await.unwrap();

    assert_eq!(stats.cycles, 0);
    assert_eq!(service.calls().delete_tracks, 0);
}

#[tokio::test]
async fn test_clear_unreadable_playlist_stops() {
    let service = FakeService::new()
        .with_playlist("Broken", tracks(0..10))
        .unreadable("Broken");
    let handle = PlaylistHandle {
        id: service.playlist_id("Broken").unwrap(),
        name: "Broken".to_string(),
    };

    let stats = clear_playlist(&service, &handle).await.unwrap();

    assert_eq!(stats.cycles, 0);
    assert_eq!(service.calls().delete_tracks, 0);
}

#[tokio::test]
async fn test_write_tracks_in_batches_of_100() {
    let service = FakeService::new().with_playlist("Target", Vec::new());
    let handle = PlaylistHandle {
        id: service.playlist_id("Target").unwrap(),
        name: "Target".to_string(),
    };
    let written = tracks(0..120);

    let batches = write_tracks(&service, &handle, &uris(&written)).await.unwrap();

    assert_eq!(batches, 2);
    assert_eq!(service.calls().appends, vec![100, 20]);
    assert_eq!(service.contents("Target").unwrap(), written);
}

#[tokio::test]
async fn test_write_nothing_makes_no_calls() {
    let service = FakeService::new().with_playlist("Target", Vec::new());
    let handle = PlaylistHandle {
        id: service.playlist_id("Target").unwrap(),
        name: "Target".to_string(),
    };

    let batches = write_tracks(&service, &handle, &[]).await.unwrap();

    assert_eq!(batches, 0);
    assert!(service.calls().appends.is_empty());
}

#[tokio::test]
async fn test_find_playlist_pages_through_the_list() {
    let mut service = FakeService::new();
    for i in 0..120 {
        service = service.with_playlist(&format!("Playlist {}", i), Vec::new());
    }

    let found = find_playlist_by_name(&service, "Playlist 75").await.unwrap();
    assert_eq!(found.map(|p| p.name), Some("Playlist 75".to_string()));
    assert_eq!(service.calls().list_playlists, 2);

    service.reset_calls();
    let missing = find_playlist_by_name(&service, "Nope").await.unwrap();
    assert!(missing.is_none());
    assert_eq!(service.calls().list_playlists, 4);
}

#[tokio::test]
async fn test_failed_playlist_list_does_not_create_a_duplicate() {
    let mut service = FakeService::new();
    for i in 0..60 {
        service = service.with_playlist(&format!("Playlist {}", i), Vec::new());
    }
    let service = service
        .with_playlist("All liked", tracks(0..10))
        .with_liked(tracks(100..105))
        .failing_playlist_list_from(50);
    let mut materializer = materializer(service, 21);
    let mut observer = RecordingObserver::default();

    let result = materializer.run(&Preset::Liked.config(), &mut observer).await;

    assert!(matches!(result, Err(Error::Remote { status: 503, .. })));
    assert_eq!(observer.states.last(), Some(&RunState::Failed));
    let service = materializer.service();
    assert_eq!(service.calls().create_playlist, 0);
    assert!(service.calls().appends.is_empty());
    assert_eq!(service.playlist_count(), 61);
    assert_eq!(service.contents("All liked").unwrap(), tracks(0..10));
}

#[tokio::test]
async fn test_failed_playlist_list_is_not_a_missing_playlist() {
    let mut service = FakeService::new();
    for i in 0..60 {
        service = service.with_playlist(&format!("Playlist {}", i), Vec::new());
    }
    let service = service.failing_playlist_list_from(50);

    let found = find_playlist_by_name(&service, "Playlist 10").await.unwrap();
    assert_eq!(found.map(|p| p.name), Some("Playlist 10".to_string()));

    let result = find_playlist_by_name(&service, "Playlist 55").await;
    assert!(matches!(result, Err(Error::Remote { status: 503, .. })));
}

#[tokio::test]
async fn test_failed_liked_page_aborts_instead_of_truncating() {
    let service = FakeService::new()
        .with_playlist("All liked", tracks(0..10))
        .with_liked(tracks(100..220))
        .failing_liked_from(100);
    let mut materializer = materializer(service, 22);

    let result = materializer.run(&Preset::Liked.config(), &mut ()).await;

    assert!(matches!(result, Err(Error::Remote { status: 503, .. })));
    let service = materializer.service();
    assert_eq!(service.calls().list_user_tracks, 3);
    assert!(service.calls().appends.is_empty());
    assert_eq!(service.playlist_count(), 1);
}

#[tokio::test]
async fn test_liked_preset_drains_every_page() {
    let liked = tracks(0..120);
    let service = FakeService::new().with_liked(liked.clone());
    let mut materializer = materializer(service, 1);

    let report = materializer
        .run(&Preset::Liked.config(), &mut ())
        .await
        .unwrap();

    let service = materializer.service();
    // 50 + 50 + 20, then the empty page ending the stream
    assert_eq!(service.calls().list_user_tracks, 4);
    assert!(report.created);
    assert_eq!(report.batches, 2);
    assert_eq!(report.tracks.len(), 120);

    let written = service.contents("All liked").unwrap();
    assert_eq!(written, report.tracks);
    assert_eq!(uri_set(&written), uri_set(&liked));
    assert_ne!(written, liked);
}

#[tokio::test]
async fn test_rerun_replaces_previous_contents() {
    let liked = tracks(0..120);
    let service = FakeService::new().with_liked(liked.clone());
    let mut materializer = materializer(service, 7);

    let first = materializer.run(&Preset::Liked.config(), &mut ()).await.unwrap();
    assert!(first.created);
    assert_eq!(first.cleared.cycles, 0);

    let second = materializer.run(&Preset::Liked.config(), &mut ()).await.unwrap();
    let service = materializer.service();
    assert!(!second.created);
    assert_eq!(second.cleared.cycles, 2);
    assert_eq!(second.cleared.removed, 120);
    assert_eq!(service.playlist_count(), 1);

    let contents = service.contents("All liked").unwrap();
    assert_eq!(contents, second.tracks);
    assert_eq!(uri_set(&contents), uri_set(&liked));
}

#[tokio::test]
async fn test_same_seed_gives_same_playlist() {
    let build = || {
        FakeService::new()
            .with_liked(tracks(0..40))
            .with_playlist("Daily Mix 1", tracks(30..80))
            .with_playlist("Discover Weekly", tracks(70..90))
    };

    let mut a = materializer(build(), 42);
    let mut b = materializer(build(), 42);
    let report_a = a.run(&Preset::MergedMixes.config(), &mut ()).await.unwrap();
    let report_b = b.run(&Preset::MergedMixes.config(), &mut ()).await.unwrap();

    assert_eq!(report_a.tracks, report_b.tracks);
}

#[tokio::test]
async fn test_merged_mixes_deduplicates_sources() {
    let service = FakeService::new()
        .with_liked(tracks(0..40))
        .with_playlist("Daily Mix 1", tracks(30..80))
        .with_playlist("Discover Weekly", tracks(70..90))
        .with_playlist("Road trip", tracks(200..210));
    let mut materializer = materializer(service, 3);
    let mut observer = RecordingObserver::default();

    let report = materializer
        .run(&Preset::MergedMixes.config(), &mut observer)
        .await
        .unwrap();

    assert_eq!(report.tracks.len(), 90);
    assert_eq!(uri_set(&report.tracks), uri_set(&tracks(0..90)));
    assert!(!observer.sources.contains(&"Road trip".to_string()));
    assert_eq!(
        observer.states,
        vec![
            RunState::Clearing,
            RunState::Collecting,
            RunState::Sampling,
            RunState::Shuffling,
            RunState::Writing,
            RunState::Idle,
        ]
    );
}

#[tokio::test]
async fn test_long_playlists_are_read_past_the_first_page() {
    let service = FakeService::new().with_playlist("Daily Mix 1", tracks(0..250));
    let mut materializer = materializer(service, 4);

    let report = materializer
        .run(&Preset::DailyMixes.config(), &mut ())
        .await
        .unwrap();

    assert_eq!(report.tracks.len(), 250);
    assert_eq!(report.batches, 3);
}

#[tokio::test]
async fn test_radios_reach_target_with_cached_sources() {
    let mut service = FakeService::new();
    for i in 0..23 {
        service = service.with_playlist(&format!("Radio {}", i), tracks(i * 30..(i + 1) * 30));
    }
    let mut materializer = materializer(service, 5);

    let report = materializer
        .run(&radio_config(Some(SampleWidth::fixed(9)), 200), &mut ())
        .await
        .unwrap();

    assert!(report.tracks.len() >= 200);
    assert!(report.tracks.len() <= 210);
    assert_eq!(uri_set(&report.tracks).len(), report.tracks.len());
    assert!(materializer.service().calls().get_playlist <= 23);
}

#[tokio::test]
async fn test_radios_stop_right_after_target_in_a_large_pool() {
    let mut service = FakeService::new();
    for i in 0..1000 {
        service = service.with_playlist(&format!("Radio {}", i), tracks(i * 30..(i + 1) * 30));
    }
    let mut materializer = materializer(service, 23);

    let report = materializer
        .run(&radio_config(Some(SampleWidth::fixed(9)), 200), &mut ())
        .await
        .unwrap();

    assert!(report.tracks.len() >= 200);
    assert!(report.tracks.len() <= 210);
    assert_eq!(uri_set(&report.tracks).len(), report.tracks.len());
    // nine sampled plus the forced first track, about ten new tracks per draw
    let fetched = materializer.service().calls().get_playlist;
    assert!((19..=25).contains(&fetched), "fetched {} playlists", fetched);
}

#[tokio::test]
async fn test_force_first_adds_the_opening_track() {
    let service = FakeService::new().with_playlist("Radio A", tracks(0..40));
    let mut materializer = materializer(service, 6);

    let report = materializer
        .run(&radio_config(Some(SampleWidth::fixed(1)), 5), &mut ())
        .await
        .unwrap();

    assert!(report.tracks.contains(&track(0)));
}

#[tokio::test]
async fn test_random_source_stops_when_exhausted() {
    let service = FakeService::new()
        .with_playlist("Radio A", tracks(0..20))
        .with_playlist("Radio B", tracks(10..30));
    let mut materializer = materializer(service, 8);

    let report = materializer
        .run(&radio_config(None, 2000), &mut ())
        .await
        .unwrap();

    assert_eq!(report.tracks.len(), 30);
    assert_eq!(materializer.service().calls().get_playlist, 2);
}

#[tokio::test]
async fn test_random_source_without_playlists_fails() {
    let service = FakeService::new().with_playlist("Road trip", tracks(0..10));
    let mut materializer = materializer(service, 9);
    let mut observer = RecordingObserver::default();

    let result = materializer
        .run(&Preset::Radios.config(), &mut observer)
        .await;

    assert!(matches!(result, Err(Error::NoSources(_))));
    assert_eq!(observer.states.last(), Some(&RunState::Failed));
    assert!(materializer.service().playlist_id("Just radios").is_some());
}

#[tokio::test]
async fn test_super_random_starts_from_combined_mix() {
    let mut service = FakeService::new().with_playlist("Combined daily mix", tracks(0..50));
    for i in 0..5 {
        service = service.with_playlist(
            &format!("Radio {}", i),
            tracks(100 + i * 50..100 + (i + 1) * 50),
        );
    }
    let mut materializer = materializer(service, 10);

    let report = materializer
        .run(&Preset::SuperRandom.config().with_target_size(120), &mut ())
        .await
        .unwrap();

    let collected = uri_set(&report.tracks);
    assert!(report.tracks.len() >= 120);
    assert!(uri_set(&tracks(0..50)).is_subset(&collected));
}

#[tokio::test]
async fn test_unreadable_source_is_skipped() {
    let service = FakeService::new()
        .with_playlist("Daily Mix 1", tracks(0..10))
        .with_playlist("Daily Mix 2", tracks(10..20))
        .unreadable("Daily Mix 2");
    let mut materializer = materializer(service, 11);

    let report = materializer
        .run(&Preset::DailyMixes.config(), &mut ())
        .await
        .unwrap();

    assert_eq!(uri_set(&report.tracks), uri_set(&tracks(0..10)));
}

#[tokio::test]
async fn test_mood_filter_keeps_matching_tracks() {
    let mut service = FakeService::new().with_playlist("Super random", tracks(0..10));
    for i in 0..9 {
        service = service.with_features(&format!("t{}", i), i as f32 / 10.0, 0.2);
    }
    let mut materializer = materializer(service, 12);

    let report = materializer
        .run(&Preset::Mood(Mood::Energetic).config(), &mut ())
        .await
        .unwrap();

    // t9 has no features and is dropped
    assert_eq!(uri_set(&report.tracks), uri_set(&tracks(5..9)));
    assert_eq!(report.filtered_out, 6);
    assert_eq!(report.destination.name, "Super random energetic");
}

#[tokio::test]
async fn test_popular_mood_uses_track_popularity() {
    let service = FakeService::new()
        .with_playlist("Super random", tracks(0..4))
        .with_features("t0", 0.5, 0.5)
        .with_features("t1", 0.5, 0.5)
        .with_features("t2", 0.5, 0.5)
        .with_features("t3", 0.5, 0.5)
        .with_popularity("t0", 80)
        .with_popularity("t1", 50)
        .with_popularity("t2", 49);
    let mut materializer = materializer(service, 13);

    let report = materializer
        .run(&Preset::Mood(Mood::Popular).config(), &mut ())
        .await
        .unwrap();

    assert_eq!(uri_set(&report.tracks), uri_set(&tracks(0..2)));
}

#[tokio::test]
async fn test_mood_without_source_playlist_fails() {
    let service = FakeService::new();
    let mut materializer = materializer(service, 14);

    let result = materializer
        .run(&Preset::Mood(Mood::Calm).config(), &mut ())
        .await;

    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_recommendations_fill_target() {
    let service = FakeService::new()
        .with_liked(tracks(0..10))
        .with_recommendations(tracks(1000..1300));
    let mut materializer = materializer(service, 15);

    let report = materializer
        .run(&Preset::Recommended.config(), &mut ())
        .await
        .unwrap();

    assert_eq!(report.tracks.len(), 200);
    assert_eq!(materializer.service().calls().get_recommendations, 10);
}

#[tokio::test]
async fn test_recommendations_need_liked_tracks() {
    let service = FakeService::new().with_recommendations(tracks(1000..1300));
    let mut materializer = materializer(service, 16);

    let result = materializer.run(&Preset::Recommended.config(), &mut ()).await;

    assert!(matches!(result, Err(Error::NoSources(_))));
}

#[tokio::test]
async fn test_discover_samples_search_results() {
    let mut service = FakeService::new();
    for i in 0..5 {
        service = service.with_playlist(&format!("lofi {}", i), tracks(i * 60..(i + 1) * 60));
    }
    let mut materializer = materializer(service, 17);
    let mut observer = RecordingObserver::default();

    let report = materializer
        .run(
            &Preset::Discover("lofi".to_string())
                .config()
                .with_target_size(20),
            &mut observer,
        )
        .await
        .unwrap();

    assert!(report.tracks.len() >= 20);
    assert!(report.tracks.len() <= 28);
    assert_eq!(report.destination.name, "Discovered: lofi");
    assert!(!observer.sources.contains(&"Discovered: lofi".to_string()));
}

#[tokio::test]
async fn test_discover_stops_when_results_run_out() {
    let service = FakeService::new().with_playlist("jazz night", tracks(0..6));
    let mut materializer = materializer(service, 18);

    let report = materializer
        .run(&Preset::Discover("jazz".to_string()).config(), &mut ())
        .await
        .unwrap();

    assert!(report.tracks.len() >= 4);
    assert!(report.tracks.len() <= 6);
}

#[tokio::test]
async fn test_credential_failure_aborts_run() {
    let service = FakeService::new().with_liked(tracks(0..10));
    service.reject_credentials();
    let mut materializer = materializer(service, 19);

    let result = materializer.run(&Preset::Liked.config(), &mut ()).await;

    match result {
        Err(e) => assert!(e.is_credential()),
        Ok(_) => panic!("Expected a credential error"),
    }
}

#[tokio::test]
async fn test_invalid_config_touches_nothing() {
    let service = FakeService::new();
    let mut materializer = materializer(service, 20);
    let config = RunConfig::new("", SourceStrategy::LikedTracks);

    let result = materializer.run(&config, &mut ()).await;

    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert_eq!(materializer.service().calls().list_playlists, 0);
}
