#![forbid(unsafe_code)]

//! End-to-end: several tilesets open at once behind one editor.
//!
//! Run:
//!   cargo test -p tileforge-editor --test e2e_multi_document

use std::cell::RefCell;
use std::rc::Rc;

use tileforge_editor::{AddTiles, Editor, EditorConfig, TilePixels};
use tileforge_palette::Color;
use tileforge_runtime::{CommandError, HistoryConfig, StateChangeKind};

const T: Color = Color::MAGENTA;
const R: Color = Color::new(0xff0000);
const G: Color = Color::new(0x00ff00);

fn pixels(colors: &[Color]) -> TilePixels {
    TilePixels::new(1, colors.to_vec()).unwrap()
}

fn select_all(editor: &mut Editor) {
    let doc = editor.document_mut().unwrap();
    for tile in &mut doc.tiles {
        tile.selected = true;
    }
}

#[test]
fn histories_are_independent() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let reds = editor.open(pixels(&[R, R, T]));
    let greens = editor.open(pixels(&[G, T]));

    select_all(&mut editor);
    editor.palettes().add().unwrap();
    assert!(editor.document().unwrap().palette(0).unwrap().contains(G));

    editor.switch_to(reds).unwrap();
    assert!(editor.document().unwrap().palettes.is_empty());
    assert!(!editor.can_undo());
    assert_eq!(editor.undo(), Ok(None));

    select_all(&mut editor);
    editor.palettes().add().unwrap();
    editor.palettes().add().unwrap();
    assert_eq!(editor.document().unwrap().palettes.len(), 2);
    // Sequence numbers are per document.
    assert_eq!(editor.history().unwrap().next_sequence_number(), 3);

    editor.switch_to(greens).unwrap();
    editor.undo().unwrap();
    assert!(editor.document().unwrap().palettes.is_empty());

    let red_doc = editor.router().history(reds).unwrap().document();
    assert_eq!(red_doc.palettes.len(), 2);
}

#[test]
fn one_feed_for_every_document() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let _sub = editor.subscribe(move |change| {
        sink.borrow_mut().push((change.kind, change.description.clone()));
    });

    let a = editor.open(pixels(&[R]));
    select_all(&mut editor);
    editor.palettes().add().unwrap();

    editor.open(pixels(&[G]));
    select_all(&mut editor);
    editor.palettes().add().unwrap();
    editor.undo().unwrap();

    editor.switch_to(a).unwrap();
    editor.redo().unwrap();
    editor.undo().unwrap();
    editor.redo().unwrap();

    let log = log.borrow();
    let kinds: Vec<StateChangeKind> = log.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            StateChangeKind::Execute,
            StateChangeKind::Execute,
            StateChangeKind::Undo,
            StateChangeKind::Undo,
            StateChangeKind::Redo,
        ]
    );
    assert!(log.iter().all(|(_, d)| d == "Added Palette"));
}

#[test]
fn closing_hands_back_the_document() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let a = editor.open(pixels(&[R]));
    let b = editor.open(pixels(&[G, G]));
    select_all(&mut editor);
    editor.palettes().add().unwrap();

    let closed = editor.close(b).unwrap();
    assert_eq!(closed.palettes.len(), 1);
    assert_eq!(editor.current_id(), Some(a));
    assert_eq!(editor.close(b).unwrap_err(), CommandError::UnknownDocument(b.raw()));
    assert_eq!(editor.switch_to(b), Err(CommandError::UnknownDocument(b.raw())));

    editor.close(a).unwrap();
    assert_eq!(editor.current_id(), None);
    assert_eq!(editor.palettes().add(), Err(CommandError::NoActiveDocument));
}

#[test]
fn history_bound_applies_to_every_document() {
    let mut editor = Editor::new(EditorConfig {
        history: HistoryConfig::new(2),
        ..EditorConfig::default()
    })
    .unwrap();
    editor.open(pixels(&[R, G]));
    select_all(&mut editor);
    for _ in 0..4 {
        editor.tiles().select_by_palette_colors(0, 0).unwrap_err();
    }
    editor.palettes().add().unwrap();
    for _ in 0..3 {
        editor.palettes().sort(0).unwrap();
    }

    let history = editor.history().unwrap();
    assert_eq!(history.history().len(), 2);
    assert_eq!(history.next_sequence_number(), 5);

    assert!(editor.undo().unwrap().is_some());
    assert!(editor.undo().unwrap().is_some());
    assert_eq!(editor.undo(), Ok(None));
    // The palette add was evicted, so its effect stays.
    assert_eq!(editor.document().unwrap().palettes.len(), 1);
}

#[test]
fn raw_execute_checks_payload_types() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    editor.open(pixels(&[R]));

    let err = editor.execute("palettes", "addTiles", 0usize).unwrap_err();
    assert!(matches!(err, CommandError::PayloadMismatch { .. }));
    let err = editor.execute("palettes", "rename", ()).unwrap_err();
    assert_eq!(err, CommandError::UnknownCommandType("palettes.rename".into()));

    select_all(&mut editor);
    editor.palettes().add().unwrap();
    editor.execute("palettes", "addTiles", AddTiles { palette_index: 0 }).unwrap();
    assert_eq!(editor.history().unwrap().history().len(), 2);
}
