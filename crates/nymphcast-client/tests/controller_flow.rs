//! End-to-end controller scenarios against an in-process transport and
//! content provider.

mod common;

use common::{Call, FakeTransport, MemoryProvider};
use nymphcast_client::{
    CastOutcome, ChannelError, ChannelHandler, ConnectionState, ContentReference, Controller,
    ControllerEvent, PlaybackStatus, RemoteId, ResolutionError,
};
use nymphcast_core::content::{DOWNLOADS_AUTHORITY, EXTERNAL_STORAGE_AUTHORITY, MEDIA_AUTHORITY};
use nymphcast_core::MediaType;
use std::sync::Arc;
use std::time::Duration;

const ROOT: &str = "/storage/emulated/0";

fn build(transport: &Arc<FakeTransport>, provider: MemoryProvider) -> Controller {
    Controller::builder()
        .shared_transport(transport.clone())
        .content_provider(provider)
        .external_storage_root(ROOT)
        .discovery_timeout(Duration::from_millis(200))
        .build()
        .unwrap()
}

fn media_provider() -> MemoryProvider {
    let downloads = ContentReference::content("downloads", "/public_downloads");
    MemoryProvider::new()
        .table(
            &MediaType::Audio.external_collection(),
            &["_id", "title", "album", "artist", "_data"],
            &[
                &[Some("7"), Some("Lighthouse"), Some("Coast"), Some("Marlo"), Some("/storage/emulated/0/Music/lighthouse.flac")],
                &[Some("8"), Some("Harbour"), Some("Coast"), Some("Marlo"), Some("/storage/emulated/0/Music/harbour.flac")],
            ],
        )
        .table(
            &downloads.with_appended_id(42),
            &["_data"],
            &[&[Some("/storage/emulated/0/Download/talk.mp3")]],
        )
        .table(
            &MediaType::Audio.external_collection().with_appended_id(7),
            &["_data"],
            &[&[Some("/storage/emulated/0/Music/lighthouse.flac")]],
        )
        .table(
            &MediaType::Audio.external_collection().with_appended_id(8),
            &["_data"],
            &[&[Some("/storage/emulated/0/Music/harbour.flac")]],
        )
}

async fn connected(transport: &Arc<FakeTransport>, provider: MemoryProvider) -> Controller {
    let controller = build(transport, provider);
    controller.discover().await.unwrap();
    assert!(controller.connect(RemoteId(0)).await);
    controller
}

mod casting {
    use super::*;

    #[tokio::test]
    async fn external_storage_primary_volume() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        let controller = connected(&transport, MemoryProvider::new()).await;

        let reference = ContentReference::document(EXTERNAL_STORAGE_AUTHORITY, "primary:Music/song.mp3");
        assert_eq!(controller.cast_selected(&reference).await, CastOutcome::Sent);
        assert!(transport
            .calls()
            .contains(&Call::CastFile(format!("{}/Music/song.mp3", ROOT))));
    }

    #[tokio::test]
    async fn external_storage_secondary_volume_is_unresolvable() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        let controller = connected(&transport, MemoryProvider::new()).await;

        let reference = ContentReference::document(EXTERNAL_STORAGE_AUTHORITY, "sdcard1:Music/song.mp3");
        assert_eq!(
            controller.cast_selected(&reference).await,
            CastOutcome::UnresolvedMedia(ResolutionError::UnsupportedVolume("sdcard1".into()))
        );
        assert_eq!(transport.count(|c| matches!(c, Call::CastFile(_))), 0);
    }

    #[tokio::test]
    async fn parsed_document_uri_from_picker() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        let controller = connected(&transport, MemoryProvider::new()).await;

        let reference = ContentReference::parse(
            "content://com.android.externalstorage.documents/document/primary%3AMusic%2Fmy%20song.mp3",
        )
        .unwrap();
        assert_eq!(controller.cast_selected(&reference).await, CastOutcome::Sent);
        assert!(transport
            .calls()
            .contains(&Call::CastFile(format!("{}/Music/my song.mp3", ROOT))));
    }

    #[tokio::test]
    async fn downloads_document_uses_companion_collection() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        let controller = connected(&transport, media_provider()).await;

        let reference = ContentReference::document(DOWNLOADS_AUTHORITY, "42");
        assert_eq!(controller.cast_selected(&reference).await, CastOutcome::Sent);
        assert!(transport
            .calls()
            .contains(&Call::CastFile("/storage/emulated/0/Download/talk.mp3".into())));
    }

    #[tokio::test]
    async fn media_document_filters_by_row() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        let controller = connected(&transport, media_provider()).await;

        let reference = ContentReference::document(MEDIA_AUTHORITY, "audio:8");
        assert_eq!(controller.cast_selected(&reference).await, CastOutcome::Sent);
        assert!(transport
            .calls()
            .contains(&Call::CastFile("/storage/emulated/0/Music/harbour.flac".into())));
    }

    #[tokio::test]
    async fn file_reference_needs_no_query() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        let provider = Arc::new(MemoryProvider::new());
        let controller = Controller::builder()
            .shared_transport(transport.clone())
            .shared_content_provider(provider.clone())
            .build()
            .unwrap();
        controller.discover().await.unwrap();
        controller.connect(RemoteId(0)).await;

        let reference = ContentReference::file("/data/a.mp3");
        assert_eq!(controller.cast_selected(&reference).await, CastOutcome::Sent);
        assert_eq!(provider.query_count(), 0);
        assert!(transport.calls().contains(&Call::CastFile("/data/a.mp3".into())));
    }

    #[tokio::test]
    async fn missing_row_is_not_found_and_cursors_are_closed() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        let provider = Arc::new(media_provider());
        let controller = Controller::builder()
            .shared_transport(transport.clone())
            .shared_content_provider(provider.clone())
            .build()
            .unwrap();
        controller.discover().await.unwrap();
        controller.connect(RemoteId(0)).await;

        let reference = ContentReference::document(MEDIA_AUTHORITY, "audio:99");
        assert_eq!(
            controller.cast_selected(&reference).await,
            CastOutcome::UnresolvedMedia(ResolutionError::NotFound)
        );
        assert_eq!(provider.open_cursors(), 0);
    }

    #[tokio::test]
    async fn nothing_connected_never_reaches_transport() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();

        let reference = ContentReference::file("/data/a.mp3");
        assert_eq!(controller.cast_selected(&reference).await, CastOutcome::NoActiveConnection);
        assert_eq!(
            controller.cast_url("http://radio.example/live").await,
            CastOutcome::NoActiveConnection
        );
        assert_eq!(
            transport.count(|c| matches!(c, Call::CastFile(_) | Call::CastUrl(_))),
            0
        );
    }

    #[tokio::test]
    async fn rejected_cast_is_reported_and_recorded() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        transport.reject_casts();
        let controller = connected(&transport, MemoryProvider::new()).await;

        assert_eq!(
            controller.cast_url("http://radio.example/live").await,
            CastOutcome::TransportRejected
        );
        let session = controller.session().unwrap();
        assert!(!session.last_result);
    }

    #[tokio::test]
    async fn library_items_cast_by_reference() {
        let transport = Arc::new(FakeTransport::answering(&["living room"]));
        let controller = connected(&transport, media_provider()).await;

        let items = controller.media_library().load_audio().unwrap();
        assert_eq!(items.len(), 2);
        let harbour = items.iter().find(|item| item.title == "Harbour").unwrap();

        assert_eq!(controller.cast_selected(&harbour.reference).await, CastOutcome::Sent);
        assert!(transport
            .calls()
            .contains(&Call::CastFile("/storage/emulated/0/Music/harbour.flac".into())));
    }
}

mod connections {
    use super::*;

    #[tokio::test]
    async fn switching_remotes_disconnects_the_previous_one() {
        let transport = Arc::new(FakeTransport::answering(&["A", "B"]));
        let controller = connected(&transport, MemoryProvider::new()).await;

        assert!(controller.connect(RemoteId(1)).await);
        assert_eq!(controller.connection_state(RemoteId(0)), Some(ConnectionState::Disconnected));
        assert_eq!(controller.connection_state(RemoteId(1)), Some(ConnectionState::Connected));

        let calls = transport.calls();
        let disconnect_a = calls.iter().position(|c| *c == Call::Disconnect(RemoteId(0))).unwrap();
        let connect_b = calls.iter().position(|c| *c == Call::Connect(RemoteId(1))).unwrap();
        assert!(disconnect_a < connect_b);
    }

    #[tokio::test]
    async fn refused_switch_leaves_nothing_connected() {
        let transport = Arc::new(FakeTransport::answering(&["A", "B"]));
        transport.refuse(RemoteId(1));
        let controller = connected(&transport, MemoryProvider::new()).await;

        assert!(!controller.connect(RemoteId(1)).await);
        assert_eq!(controller.connection_state(RemoteId(0)), Some(ConnectionState::Disconnected));
        assert!(matches!(
            controller.connection_state(RemoteId(1)),
            Some(ConnectionState::Failed(_))
        ));
        assert!(controller.active_remote().is_none());
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn late_result_after_disconnect_is_ignored() {
        let transport = Arc::new(FakeTransport::answering(&["A"]));
        let gate = transport.hold_connect(RemoteId(0));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.try_connect(RemoteId(0)).await }
        });
        while controller.connection_state(RemoteId(0)) != Some(ConnectionState::Connecting) {
            tokio::task::yield_now().await;
        }

        controller.disconnect(RemoteId(0)).await;
        gate.notify_one();

        assert!(pending.await.unwrap().is_err());
        assert_eq!(controller.connection_state(RemoteId(0)), Some(ConnectionState::Disconnected));
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn late_result_after_new_round_is_ignored() {
        let transport = Arc::new(FakeTransport::answering(&["X", "Y"]));
        let gate = transport.hold_connect(RemoteId(1));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.connect(RemoteId(1)).await }
        });
        while controller.connection_state(RemoteId(1)) != Some(ConnectionState::Connecting) {
            tokio::task::yield_now().await;
        }

        transport.set_round(&["X", "Y"]);
        controller.discover().await.unwrap();
        gate.notify_one();

        assert!(!pending.await.unwrap());
        assert!(controller.active_remote().is_none());
    }

    #[tokio::test]
    async fn connect_while_connecting_is_rejected() {
        let transport = Arc::new(FakeTransport::answering(&["A"]));
        let gate = transport.hold_connect(RemoteId(0));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.connect(RemoteId(0)).await }
        });
        while controller.connection_state(RemoteId(0)) != Some(ConnectionState::Connecting) {
            tokio::task::yield_now().await;
        }

        let failure = controller.try_connect(RemoteId(0)).await.unwrap_err();
        assert!(failure.reason.contains("in progress"));

        gate.notify_one();
        assert!(pending.await.unwrap());
        assert_eq!(transport.count(|c| *c == Call::Connect(RemoteId(0))), 1);
    }

    #[tokio::test]
    async fn connect_timeout_marks_failed() {
        let transport = Arc::new(FakeTransport::answering(&["A"]));
        let gate = transport.hold_connect(RemoteId(0));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();

        let failure = controller
            .connect_with_timeout(RemoteId(0), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(failure.reason, "connect timed out");
        assert_eq!(
            controller.connection_state(RemoteId(0)),
            Some(ConnectionState::Failed("connect timed out".into()))
        );

        gate.notify_one();
        assert!(controller.active_remote().is_none());
    }

    #[tokio::test]
    async fn connect_within_timeout_succeeds() {
        let transport = Arc::new(FakeTransport::answering(&["A"]));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();

        controller
            .connect_with_timeout(RemoteId(0), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(controller.active_remote(), Some(RemoteId(0)));
    }

    #[tokio::test]
    async fn overtaken_connect_is_closed_when_accepted_late() {
        let transport = Arc::new(FakeTransport::answering(&["A", "B"]));
        let gate = transport.hold_connect(RemoteId(0));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.connect(RemoteId(0)).await }
        });
        while controller.connection_state(RemoteId(0)) != Some(ConnectionState::Connecting) {
            tokio::task::yield_now().await;
        }

        assert!(controller.connect(RemoteId(1)).await);
        gate.notify_one();
        assert!(!pending.await.unwrap());

        assert_eq!(controller.active_remote(), Some(RemoteId(1)));
        assert_eq!(transport.open_connections(), vec![RemoteId(1)]);
    }

    #[tokio::test]
    async fn timed_out_connect_is_closed_when_accepted_late() {
        let transport = Arc::new(FakeTransport::answering(&["A"]));
        let gate = transport.hold_connect(RemoteId(0));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();

        assert!(controller
            .connect_with_timeout(RemoteId(0), Duration::from_millis(20))
            .await
            .is_err());
        gate.notify_one();

        tokio::time::timeout(Duration::from_secs(1), async {
            while transport.count(|c| *c == Call::Disconnect(RemoteId(0))) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert!(transport.open_connections().is_empty());
        assert!(controller.active_remote().is_none());
    }
}

mod discovery {
    use super::*;

    #[tokio::test]
    async fn later_round_replaces_and_resets() {
        let transport = Arc::new(FakeTransport::answering(&["X", "Y"]));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();
        assert!(controller.connect(RemoteId(1)).await);

        transport.set_round(&["Y"]);
        controller.discover().await.unwrap();

        let remotes = controller.remotes();
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].descriptor.display_name, "Y");
        assert_eq!(remotes[0].state, ConnectionState::Disconnected);
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn last_delivered_round_wins() {
        let transport = Arc::new(FakeTransport::new());
        let controller = build(&transport, MemoryProvider::new());

        let first = controller.start_discovery();
        let second = controller.start_discovery();
        let mut sinks = transport.take_parked();
        assert_eq!(sinks.len(), 2);

        let older = sinks.remove(0);
        let newer = sinks.remove(0);
        newer.deliver_names(["new-1", "new-2"]);
        older.deliver_names(["old"]);

        assert_eq!(second.wait().await.unwrap().len(), 2);
        assert_eq!(first.wait().await.unwrap().len(), 1);
        let names: Vec<_> = controller
            .remotes()
            .into_iter()
            .map(|entry| entry.descriptor.display_name)
            .collect();
        assert_eq!(names, vec!["old"]);
    }

    #[tokio::test]
    async fn silent_transport_times_out() {
        let transport = Arc::new(FakeTransport::new());
        let controller = build(&transport, MemoryProvider::new());

        let err = controller.discover().await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(controller.remotes().is_empty());
    }
}

mod applications {
    use super::*;

    #[tokio::test]
    async fn messages_require_a_connection() {
        let transport = Arc::new(FakeTransport::answering(&["A"]));
        let controller = build(&transport, MemoryProvider::new());
        controller.discover().await.unwrap();

        assert_eq!(controller.list_applications().await, Err(ChannelError::NotConnected));
        assert_eq!(transport.count(|c| *c == Call::ListApplications), 0);
    }

    #[tokio::test]
    async fn messages_pass_through() {
        let transport = Arc::new(FakeTransport::answering(&["A"]));
        let controller = connected(&transport, MemoryProvider::new()).await;

        assert_eq!(controller.list_applications().await.unwrap(), "SoundCloud\nYouTube");
        assert_eq!(
            controller.send_app_message("soundcloud", "play 3").await.unwrap(),
            "soundcloud <- play 3"
        );
    }
}

#[tokio::test]
async fn session_lifecycle_emits_events() {
    let transport = Arc::new(FakeTransport::answering(&["A"]));
    let (handler, mut events) = ChannelHandler::new();
    let controller = Controller::builder()
        .shared_transport(transport.clone())
        .content_provider(MemoryProvider::new())
        .client_id("phone-1")
        .event_handler(handler)
        .build()
        .unwrap();

    controller.start();
    controller.discover().await.unwrap();
    controller.connect(RemoteId(0)).await;
    controller.playback_start().await;
    controller.status_sink().update(PlaybackStatus {
        playing: true,
        position: 3.0,
        duration: 180.0,
        volume: 100,
    });
    controller.shutdown().await;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    assert!(matches!(received[0], ControllerEvent::RemotesUpdated(_)));
    assert!(received.contains(&ControllerEvent::ConnectionChanged {
        remote: RemoteId(0),
        state: ConnectionState::Connected,
    }));
    assert!(received
        .iter()
        .any(|e| matches!(e, ControllerEvent::StatusUpdated(status) if status.playing)));
    assert_eq!(
        received.last(),
        Some(&ControllerEvent::ConnectionChanged {
            remote: RemoteId(0),
            state: ConnectionState::Disconnected,
        })
    );

    assert_eq!(transport.calls().first(), Some(&Call::ClientId("phone-1".into())));
    assert!(transport.calls().contains(&Call::Disconnect(RemoteId(0))));
}
