//! Integration tests: persistence bridge (sf-bridge).
//!
//! Drives a real `Editor` and checks what lands in the cache and the store,
//! with tokio's clock paused so debounce windows are exact.

use pretty_assertions::assert_eq;
use sf_bridge::{
    FileCache, GeneratedPayload, GenerationClient, GenerationError, GenerationJob, LocalCache,
    MemoryCache, MemoryStore, PersistConfig, PersistError, PersistenceBridge, ProjectRecord,
    ProjectStore, RestoreSource, SyncStatus, export_json, import_json, request_generation,
};
use sf_core::{CanvasDocument, Tool};
use sf_editor::{Editor, InputEvent, Modifiers};
use std::time::Duration;

const PROJECT: &str = "landing-page";

fn bridge() -> PersistenceBridge<MemoryStore, MemoryCache> {
    PersistenceBridge::new(
        PROJECT,
        MemoryStore::new(),
        MemoryCache::new(),
        PersistConfig::default(),
    )
}

fn draw(editor: &mut Editor, tool: Tool, from: (f64, f64), to: (f64, f64)) {
    editor.set_tool(tool);
    editor.handle_event(&InputEvent::pointer_down(from.0, from.1, Modifiers::NONE));
    editor.handle_event(&InputEvent::pointer_move(to.0, to.1, Modifiers::NONE));
    editor.handle_event(&InputEvent::pointer_up(to.0, to.1, Modifiers::NONE));
}

async fn cached_document(bridge: &PersistenceBridge<MemoryStore, MemoryCache>) -> Option<CanvasDocument> {
    let record = bridge.cache().load(PROJECT).await.unwrap()?;
    Some(record.into_document().unwrap())
}

// ─── Debounced cache ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn burst_of_edits_writes_the_cache_once() {
    let mut editor = Editor::default();
    let mut bridge = bridge();

    for i in 0..3 {
        let x = f64::from(i) * 100.0;
        draw(&mut editor, Tool::Rect, (x, 0.0), (x + 50.0, 50.0));
        assert!(bridge.observe(editor.revision(), || editor.document()));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!bridge.cache().contains(PROJECT), "written inside the quiet window");
    }
    // Nothing changed, nothing rescheduled.
    assert!(!bridge.observe(editor.revision(), || editor.document()));

    tokio::time::sleep(Duration::from_millis(501)).await;
    let cached = cached_document(&bridge).await.unwrap();
    assert_eq!(cached.shapes.shapes, editor.shapes().shapes);
    assert!(!bridge.cache_write_pending());
}

#[tokio::test(start_paused = true)]
async fn shutdown_drops_the_pending_write() {
    let mut editor = Editor::default();
    let mut bridge = bridge();
    draw(&mut editor, Tool::Ellipse, (0.0, 0.0), (40.0, 40.0));
    bridge.notify_changed(&editor.document());
    assert!(bridge.cache_write_pending());

    bridge.shutdown();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!bridge.cache().contains(PROJECT));
}

#[tokio::test(start_paused = true)]
async fn flush_writes_immediately() {
    let mut editor = Editor::default();
    let mut bridge = bridge();
    draw(&mut editor, Tool::Frame, (0.0, 0.0), (200.0, 100.0));
    bridge.notify_changed(&editor.document());
    bridge.flush(&editor.document()).await.unwrap();

    assert!(!bridge.cache_write_pending());
    let cached = cached_document(&bridge).await.unwrap();
    assert_eq!(cached.shapes.frame_counter, 2);
}

// ─── Remote store ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn remote_failure_is_reported_not_fatal() {
    let mut editor = Editor::default();
    let mut bridge = bridge();
    let mut status = bridge.subscribe();
    bridge.store().set_offline(true);

    draw(&mut editor, Tool::Rect, (0.0, 0.0), (50.0, 50.0));
    bridge.sync_remote(&editor.document());
    let seen = status
        .wait_for(|s| matches!(s, SyncStatus::Error(_)))
        .await
        .unwrap()
        .clone();
    assert!(matches!(seen, SyncStatus::Error(msg) if msg.contains("unavailable")));

    // Editing carries on and the next sync succeeds.
    draw(&mut editor, Tool::Rect, (100.0, 0.0), (150.0, 50.0));
    bridge.store().set_offline(false);
    bridge.sync_remote(&editor.document());
    status.wait_for(|s| *s == SyncStatus::Saved).await.unwrap();

    let stored = bridge.store().record(PROJECT).unwrap();
    assert_eq!(stored.into_document().unwrap().shapes.shapes.len(), 2);
    assert_eq!(bridge.store().write_count(), 1);
}

// ─── Restore ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn restore_prefers_cache_then_store_then_empty() {
    let mut editor = Editor::default();
    draw(&mut editor, Tool::Frame, (0.0, 0.0), (100.0, 100.0));
    let one_frame = ProjectRecord::from_document(&editor.document()).unwrap();
    draw(&mut editor, Tool::Frame, (200.0, 0.0), (300.0, 100.0));
    let two_frames = ProjectRecord::from_document(&editor.document()).unwrap();

    let bridge = bridge();
    let restored = bridge.restore().await;
    assert_eq!(restored.source, RestoreSource::Empty);
    assert_eq!(restored.document, CanvasDocument::default());
    assert!(restored.error.is_none());

    bridge.store().put(PROJECT, two_frames).await.unwrap();
    let restored = bridge.restore().await;
    assert_eq!(restored.source, RestoreSource::Remote);
    assert_eq!(restored.document.shapes.frame_counter, 3);

    bridge.cache().save(PROJECT, &one_frame).await.unwrap();
    let restored = bridge.restore().await;
    assert_eq!(restored.source, RestoreSource::Cache);
    assert_eq!(restored.document.shapes.shapes.len(), 1);
}

#[tokio::test]
async fn corrupt_cache_falls_through_to_store() {
    let mut editor = Editor::default();
    draw(&mut editor, Tool::Line, (0.0, 0.0), (80.0, 0.0));

    let bridge = bridge();
    bridge.cache().insert_raw(PROJECT, b"definitely not msgpack".to_vec());
    bridge
        .store()
        .put(PROJECT, ProjectRecord::from_document(&editor.document()).unwrap())
        .await
        .unwrap();

    let restored = bridge.restore().await;
    assert_eq!(restored.source, RestoreSource::Remote);
    assert!(matches!(restored.error, Some(PersistError::Cache(_))));
    assert_eq!(restored.document.shapes.shapes, editor.shapes().shapes);
}

#[tokio::test]
async fn invalid_store_record_yields_empty_canvas() {
    let bridge = bridge();
    let mut record = ProjectRecord::from_document(&CanvasDocument::default()).unwrap();
    record.sketches_data = serde_json::json!({ "ids": ["a", "a"], "entities": {} });
    bridge.store().put(PROJECT, record).await.unwrap();

    let restored = bridge.restore().await;
    assert_eq!(restored.source, RestoreSource::Empty);
    assert!(matches!(restored.error, Some(PersistError::Load(_))));
}

#[tokio::test]
async fn file_cache_survives_a_new_bridge() {
    let tmp = tempfile::tempdir().unwrap();
    let mut editor = Editor::default();
    draw(&mut editor, Tool::Arrow, (0.0, 0.0), (120.0, 60.0));

    let mut first = PersistenceBridge::new(
        PROJECT,
        MemoryStore::new(),
        FileCache::new(tmp.path()),
        PersistConfig::default(),
    );
    first.flush(&editor.document()).await.unwrap();
    drop(first);

    let second = PersistenceBridge::new(
        PROJECT,
        MemoryStore::new(),
        FileCache::new(tmp.path()),
        PersistConfig::default(),
    );
    let restored = second.restore().await;
    assert_eq!(restored.source, RestoreSource::Cache);

    let mut reopened = Editor::default();
    reopened.load_document(restored.document);
    assert_eq!(reopened.shapes().shapes, editor.shapes().shapes);
    assert!(!reopened.can_undo());
}

// ─── Import / export ─────────────────────────────────────────────────────

#[test]
fn import_replaces_live_state() {
    let mut source = Editor::default();
    draw(&mut source, Tool::Frame, (0.0, 0.0), (100.0, 100.0));
    draw(&mut source, Tool::Rect, (10.0, 10.0), (40.0, 40.0));
    let json = export_json(&source.document()).unwrap();

    let mut target = Editor::default();
    draw(&mut target, Tool::Ellipse, (500.0, 500.0), (520.0, 520.0));
    target.load_document(import_json(&json).unwrap());
    assert_eq!(target.shapes().shapes, source.shapes().shapes);
    assert_eq!(target.shapes().frame_counter, 2);
    assert!(!target.can_undo());

    assert!(import_json("{\"viewport\": 3}").is_err());
}

// ─── Generation ──────────────────────────────────────────────────────────

struct Scripted(Result<&'static str, &'static str>);

impl GenerationClient for Scripted {
    async fn generate(&self, job: GenerationJob) -> Result<GeneratedPayload, GenerationError> {
        assert!(job.description.contains("\"type\":\"rect\""));
        match self.0 {
            Ok(html) => Ok(GeneratedPayload(html.to_string())),
            Err(reason) => Err(GenerationError::Failed(reason.to_string())),
        }
    }
}

#[tokio::test]
async fn generation_fills_or_keeps_the_placeholder() {
    let mut editor = Editor::default();
    draw(&mut editor, Tool::Frame, (0.0, 0.0), (300.0, 200.0));
    let frame = editor.selected_ids()[0];
    draw(&mut editor, Tool::Rect, (20.0, 20.0), (120.0, 60.0));

    let (request, placeholder) = editor.begin_generation(frame).unwrap();
    assert_eq!(request.shape_ids.len(), 1);

    let failed = request_generation(&Scripted(Err("model overloaded")), &request).await;
    assert!(matches!(failed, Err(GenerationError::Failed(_))));
    assert_eq!(editor.pending_generations(), vec![placeholder]);

    let payload = request_generation(&Scripted(Ok("<main/>")), &request)
        .await
        .unwrap();
    assert!(editor.complete_generation(placeholder, payload.into_inner()));
    assert!(editor.pending_generations().is_empty());
    assert_eq!(editor.shapes().generated_from(frame), vec![placeholder]);
}
