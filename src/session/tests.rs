use super::*;
use crate::geometry::Rect;
use crate::input::{Key, Mode};
use crate::loader::test_support::png;
use crate::store::MemoryStore;
use datamark_canvas::{Scene, Shape, Tag};

const EPSILON: f64 = 1e-9;

/// A 500x500 image lands at (50, 50) with scale 0.5 on this scene.
fn scene() -> Scene {
    Scene::new(350.0, 350.0).with_fill_ratio(5.0 / 7.0)
}

fn store_with_images(n: usize) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for i in 0..n {
        store.insert_image(&format!("img{:02}.png", i), png(500, 500));
    }
    store
}

async fn session_on(store: &Arc<MemoryStore>) -> Session<Scene> {
    let mut session = Session::new(Arc::clone(store) as Arc<dyn AnnotationStore>, scene());
    session.resume().await;
    session
}

fn move_to(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove {
        x,
        y,
        dx: 0.0,
        dy: 0.0,
    }
}

fn key(key: Key) -> InputEvent {
    InputEvent::Key { key, repeat: false }
}

async fn drag(session: &mut Session<Scene>, from: (f64, f64), to: (f64, f64)) {
    session.process(move_to(from.0, from.1)).await;
    session
        .process(InputEvent::PointerDown {
            x: from.0,
            y: from.1,
        })
        .await;
    session
        .process(InputEvent::PointerMove {
            x: to.0,
            y: to.1,
            dx: to.0 - from.0,
            dy: to.1 - from.1,
        })
        .await;
    session.process(InputEvent::PointerUp { x: to.0, y: to.1 }).await;
}

async fn draw_mode(session: &mut Session<Scene>) {
    session
        .process(InputEvent::ModeButton { mode: Mode::Draw })
        .await;
}

fn assert_rect_eq(actual: Rect, expected: Rect) {
    assert!((actual.left - expected.left).abs() < EPSILON, "{:?}", actual);
    assert!((actual.top - expected.top).abs() < EPSILON, "{:?}", actual);
    assert!((actual.width - expected.width).abs() < EPSILON, "{:?}", actual);
    assert!((actual.height - expected.height).abs() < EPSILON, "{:?}", actual);
}

#[tokio::test]
async fn test_resume_shows_first_image() {
    let store = store_with_images(3);
    let session = session_on(&store).await;

    let loaded = session.loaded().unwrap();
    assert_eq!(loaded.name, "img00.png");
    assert_rect_eq(
        Rect::new(
            loaded.transform.left,
            loaded.transform.top,
            loaded.transform.width,
            loaded.transform.height,
        ),
        Rect::new(50.0, 50.0, 250.0, 250.0),
    );
    assert_eq!(session.surface().count_tagged(&Tag::Image), 1);
    assert_eq!(session.selected_image().unwrap().image_index, 0);
    assert_eq!(session.sequence().peek(), 0);
}

#[tokio::test]
async fn test_no_label_draws_nothing() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await;
    draw_mode(&mut session).await;

    drag(&mut session, (100.0, 100.0), (200.0, 150.0)).await;
    session.flush().await;

    assert!(session.annotations().is_empty());
    assert_eq!(session.sequence().peek(), 0);
    assert!(store.annotations("img00.png").await.unwrap().is_empty());
    assert_eq!(session.surface().count_tagged(&Tag::GuideLine), 0);
}

#[tokio::test]
async fn test_draw_commits_normalized_annotation() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await;
    session.add_label("cat").unwrap();
    assert!(session.select_label(0));
    draw_mode(&mut session).await;

    drag(&mut session, (100.0, 100.0), (200.0, 150.0)).await;
    session.flush().await;

    let stored = store.annotations("img00.png").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].annotation_id.as_str(), "annotation0");
    assert_eq!(stored[0].label_index, 0);
    assert_rect_eq(stored[0].rect, Rect::new(0.2, 0.2, 0.4, 0.2));
    assert_eq!(session.annotations(), stored.as_slice());

    let tag = Tag::object("annotation0");
    assert_eq!(session.surface().count_tagged(&tag), 3);
    let labelled = session.surface().shapes_tagged(&tag).any(|s| match s {
        Shape::Text { text, .. } => text == "cat",
        _ => false,
    });
    assert!(labelled);
    assert_eq!(store.labels().await.unwrap()[0].label_name, "cat");
}

#[tokio::test]
async fn test_ids_stay_monotonic_across_images() {
    let store = store_with_images(2);
    let mut session = session_on(&store).await;
    session.add_label("cat").unwrap();
    session.select_label(0);
    draw_mode(&mut session).await;

    drag(&mut session, (60.0, 60.0), (90.0, 90.0)).await;
    drag(&mut session, (100.0, 100.0), (120.0, 140.0)).await;
    session.process(key(Key::ArrowUp)).await;
    assert_eq!(session.loaded().unwrap().name, "img01.png");
    assert!(session.annotations().is_empty());
    drag(&mut session, (60.0, 60.0), (90.0, 90.0)).await;
    session.flush().await;

    let first: Vec<String> = store
        .annotations("img00.png")
        .await
        .unwrap()
        .iter()
        .map(|a| a.annotation_id.to_string())
        .collect();
    assert_eq!(first, ["annotation0", "annotation1"]);
    let second = store.annotations("img01.png").await.unwrap();
    assert_eq!(second[0].annotation_id.as_str(), "annotation2");
}

#[tokio::test]
async fn test_arrows_clamp_at_ends() {
    let store = store_with_images(2);
    let mut session = session_on(&store).await;

    session.process(key(Key::ArrowDown)).await;
    assert_eq!(session.selected_image().unwrap().image_index, 0);
    session.process(key(Key::ArrowUp)).await;
    session.process(key(Key::ArrowUp)).await;
    assert_eq!(session.selected_image().unwrap().image_index, 1);
    assert_eq!(session.loaded().unwrap().name, "img01.png");
}

#[tokio::test]
async fn test_pan_mode_moves_viewport_without_annotating() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await;
    session.add_label("cat").unwrap();
    session.select_label(0);

    drag(&mut session, (100.0, 100.0), (130.0, 80.0)).await;
    session.flush().await;

    assert!(session.annotations().is_empty());
    assert_eq!(session.surface().viewport().pan(), Point::new(30.0, -20.0));
    assert_eq!(session.surface().count_tagged(&Tag::Overlay), 0);
}

#[tokio::test]
async fn test_held_arrow_advances_once() {
    let store = store_with_images(3);
    let mut session = session_on(&store).await;

    session.process(key(Key::ArrowUp)).await;
    for _ in 0..3 {
        session
            .process(InputEvent::Key {
                key: Key::ArrowUp,
                repeat: true,
            })
            .await;
    }
    assert_eq!(session.selected_image().unwrap().image_index, 1);
    assert_eq!(session.loaded().unwrap().name, "img01.png");
}

#[tokio::test]
async fn test_mode_hotkey_switches_mode() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await;
    session.process(key(Key::Char('d'))).await;
    assert_eq!(session.state().mode(), Mode::Draw);
    session.process(key(Key::Char('p'))).await;
    assert_eq!(session.state().mode(), Mode::Pan);
}

#[tokio::test]
async fn test_label_hotkey_selects_label() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await;
    session.add_label("cat").unwrap();
    session.add_label("dog").unwrap();
    session.process(key(Key::Char('2'))).await;
    assert_eq!(session.labels().selected_name(), Some("dog"));
    session.process(key(Key::Char('9'))).await;
    assert_eq!(session.labels().selected_name(), Some("dog"));
}

#[tokio::test]
async fn test_delete_removes_from_surface_and_store() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await;
    session.add_label("cat").unwrap();
    session.select_label(0);
    draw_mode(&mut session).await;
    drag(&mut session, (100.0, 100.0), (200.0, 150.0)).await;
    drag(&mut session, (60.0, 60.0), (80.0, 80.0)).await;
    session.flush().await;

    let id = AnnotationId::from_sequence(0);
    assert!(session.delete_annotation(&id).await);
    assert_eq!(session.surface().count_tagged(&Tag::object("annotation0")), 0);
    assert_eq!(session.surface().count_tagged(&Tag::object("annotation1")), 3);

    let left = store.annotations("img00.png").await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].annotation_id.as_str(), "annotation1");
    assert_eq!(session.annotations().len(), 1);

    assert!(!session.delete_annotation(&id).await);
}

#[tokio::test]
async fn test_resume_continues_after_highest_id() {
    let store = store_with_images(1);
    store
        .create_annotation(
            "img00.png",
            &Annotation::new(
                AnnotationId::from_sequence(4),
                0,
                Rect::new(0.0, 0.0, 0.5, 0.5),
            ),
        )
        .await
        .unwrap();
    store.create_label("cat").await.unwrap();

    let mut session = session_on(&store).await;
    assert_eq!(session.sequence().peek(), 5);
    assert_eq!(session.labels().names(), ["cat"]);
    assert_eq!(session.surface().count_tagged(&Tag::object("annotation4")), 3);

    session.select_label(0);
    draw_mode(&mut session).await;
    drag(&mut session, (100.0, 100.0), (200.0, 150.0)).await;
    assert_eq!(session.annotations()[1].annotation_id.as_str(), "annotation5");
}

#[tokio::test]
async fn test_stored_annotation_with_unknown_label_uses_index() {
    let store = store_with_images(1);
    store
        .create_annotation(
            "img00.png",
            &Annotation::new(
                AnnotationId::from_sequence(0),
                7,
                Rect::new(0.0, 0.0, 0.5, 0.5),
            ),
        )
        .await
        .unwrap();
    let session = session_on(&store).await;

    let tag = Tag::object("annotation0");
    let text = session.surface().shapes_tagged(&tag).find_map(|s| match s {
        Shape::Text { text, .. } => Some(text.clone()),
        _ => None,
    });
    assert_eq!(text.as_deref(), Some("7"));
}

#[tokio::test]
async fn test_store_failure_keeps_optimistic_render() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await;
    session.add_label("cat").unwrap();
    session.select_label(0);
    session.flush().await;
    draw_mode(&mut session).await;

    store.set_unavailable(true);
    drag(&mut session, (100.0, 100.0), (200.0, 150.0)).await;
    session.flush().await;

    assert_eq!(session.annotations().len(), 1);
    assert_eq!(session.surface().count_tagged(&Tag::object("annotation0")), 3);
    assert_eq!(session.sequence().peek(), 1);

    store.set_unavailable(false);
    assert!(store.annotations("img00.png").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_undecodable_image_leaves_nothing_loaded() {
    let store = Arc::new(MemoryStore::new());
    store.insert_image("bad.png", b"not an image".to_vec());
    let mut session = session_on(&store).await;
    session.add_label("cat").unwrap();
    session.select_label(0);
    draw_mode(&mut session).await;

    assert!(session.loaded().is_none());
    assert_eq!(session.selected_image().unwrap().image.image_name, "bad.png");

    drag(&mut session, (100.0, 100.0), (200.0, 150.0)).await;
    assert!(session.annotations().is_empty());
    assert_eq!(session.sequence().peek(), 0);
}

#[tokio::test]
async fn test_change_page_keeps_index_and_ignores_empty_pages() {
    let store = store_with_images(13);
    let mut session = session_on(&store).await;
    session.select_image(5).await;

    session.process(key(Key::ArrowRight)).await;
    assert_eq!(session.navigator().page(), 1);
    // Page 1 only has three images.
    assert_eq!(session.selected_image().unwrap().image_index, 0);
    assert_eq!(session.loaded().unwrap().name, "img10.png");

    session.process(key(Key::ArrowRight)).await;
    assert_eq!(session.navigator().page(), 1);
    assert_eq!(session.loaded().unwrap().name, "img10.png");

    session.process(key(Key::ArrowLeft)).await;
    assert_eq!(session.navigator().page(), 0);
    assert_eq!(session.loaded().unwrap().name, "img00.png");

    session.change_page(PageStep::Previous).await;
    assert_eq!(session.navigator().page(), 0);
}

#[tokio::test]
async fn test_replace_images_clears_selection_and_surface() {
    let store = store_with_images(2);
    let mut session = session_on(&store).await;
    session.replace_images(0, vec![ImageFile::new("img01.png", "")]);

    assert!(session.selected_image().is_none());
    assert!(session.loaded().is_none());
    assert!(session.surface().is_empty());

    assert!(session.select_image(0).await);
    assert_eq!(session.loaded().unwrap().name, "img01.png");
    assert!(!session.select_image(4).await);
}

#[tokio::test]
async fn test_restart_wipes_store_and_counter() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await;
    session.add_label("cat").unwrap();
    session.select_label(0);
    draw_mode(&mut session).await;
    drag(&mut session, (100.0, 100.0), (200.0, 150.0)).await;
    session.flush().await;
    assert!(session.has_previous_data().await);

    session.restart().await;

    assert!(!session.has_previous_data().await);
    assert!(store.labels().await.unwrap().is_empty());
    assert!(session.labels().is_empty());
    assert!(session.loaded().is_none());
    assert_eq!(session.sequence().peek(), 0);
}

#[tokio::test]
async fn test_add_label_rejects_empty_and_duplicates() {
    let store = store_with_images(0);
    let mut session = session_on(&store).await;
    assert_eq!(session.add_label("   "), Err(LabelError::Empty));
    session.add_label(" cat ").unwrap();
    assert!(matches!(
        session.add_label("cat"),
        Err(LabelError::Duplicate(_))
    ));
    session.flush().await;
    assert_eq!(store.labels().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_wheel_zoom_maps_press_into_canvas() {
    let store = store_with_images(1);
    let mut session = session_on(&store)
        .await
        .with_zoom_step(2.0);
    session.add_label("cat").unwrap();
    session.select_label(0);
    draw_mode(&mut session).await;

    session
        .process(InputEvent::Wheel {
            x: 0.0,
            y: 0.0,
            delta_y: -1.0,
        })
        .await;
    assert_eq!(session.surface().viewport().zoom, 2.0);

    session
        .process(InputEvent::PointerDown { x: 200.0, y: 200.0 })
        .await;
    assert_eq!(session.state().pointer.rect_start, Point::new(100.0, 100.0));

    session
        .process(InputEvent::Wheel {
            x: 0.0,
            y: 0.0,
            delta_y: 0.0,
        })
        .await;
    assert_eq!(session.surface().viewport().zoom, 2.0);
}

#[tokio::test]
async fn test_run_drains_merged_sources() {
    let store = store_with_images(2);
    let mut session = session_on(&store).await;
    session.add_label("cat").unwrap();
    session.select_label(0);

    let (merger, sources) = EventMerger::new(16);
    let producer = tokio::spawn(async move {
        let sources = sources;
        sources.buttons.click(Mode::Draw).await.unwrap();
        sources.pointer.moved(100.0, 100.0, 0.0, 0.0).await.unwrap();
        sources.pointer.down(100.0, 100.0).await.unwrap();
        sources.pointer.moved(200.0, 150.0, 100.0, 50.0).await.unwrap();
        sources.pointer.up(200.0, 150.0).await.unwrap();
        sources.keyboard.key_down(Key::ArrowUp, false).await.unwrap();
    });

    session.run(merger).await;
    producer.await.unwrap();

    assert_eq!(store.annotations("img00.png").await.unwrap().len(), 1);
    assert_eq!(session.loaded().unwrap().name, "img01.png");
    assert_eq!(session.pending_writes(), 0);
}

async fn wheel_in(session: &mut Session<Scene>, x: f64, y: f64) {
    session
        .process(InputEvent::Wheel {
            x,
            y,
            delta_y: -1.0,
        })
        .await;
}

#[tokio::test]
async fn test_draw_after_zoom_normalizes_in_canvas_space() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await.with_zoom_step(2.0);
    session.add_label("cat").unwrap();
    session.select_label(0);
    draw_mode(&mut session).await;
    wheel_in(&mut session, 0.0, 0.0).await;

    // Screen (200, 200)..(300, 300) is canvas (100, 100)..(150, 150).
    drag(&mut session, (200.0, 200.0), (300.0, 300.0)).await;
    assert_rect_eq(session.annotations()[0].rect, Rect::new(0.2, 0.2, 0.2, 0.2));

    let lines: Vec<&Shape> = session.surface().shapes_tagged(&Tag::GuideLine).collect();
    match (lines[0], lines[1]) {
        (Shape::Line { x1, .. }, Shape::Line { y1, .. }) => {
            assert_eq!((*x1, *y1), (150.0, 150.0));
        }
        other => panic!("expected guide lines, got {:?}", other),
    }
}

#[tokio::test]
async fn test_click_after_pan_and_zoom_has_no_area() {
    let store = store_with_images(1);
    let mut session = session_on(&store).await.with_zoom_step(2.0);
    session.add_label("cat").unwrap();
    session.select_label(0);

    drag(&mut session, (10.0, 10.0), (40.0, 30.0)).await;
    wheel_in(&mut session, 0.0, 0.0).await;
    let viewport = session.surface().viewport();
    assert_eq!((viewport.zoom, viewport.pan()), (2.0, Point::new(60.0, 40.0)));

    draw_mode(&mut session).await;
    drag(&mut session, (260.0, 240.0), (260.0, 240.0)).await;

    let rect = session.annotations()[0].rect;
    assert_rect_eq(rect, Rect::new(0.2, 0.2, 0.0, 0.0));
}
