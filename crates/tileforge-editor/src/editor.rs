#![forbid(unsafe_code)]

//! The editor context.
//!
//! [`Editor`] owns the document router with the `palettes`, `tiles` and
//! `image` namespaces registered, plus the color selection of the UI.
//! Typed handles ([`Editor::palettes`], [`Editor::tiles`],
//! [`Editor::image`]) run commands on the current document without spelling
//! out command types:
//!
//! ```
//! use tileforge_editor::{Editor, EditorConfig, TilePixels};
//! use tileforge_palette::Color;
//!
//! let red = Color::from_rgb(255, 0, 0);
//! let mut editor = Editor::new(EditorConfig::default()).unwrap();
//! editor.open(TilePixels::new(2, vec![red, Color::MAGENTA]).unwrap());
//!
//! editor.document_mut().unwrap().select_tile(0, true);
//! editor.palettes().add().unwrap();
//! assert!(editor.document().unwrap().palette(0).unwrap().contains(red));
//!
//! editor.undo().unwrap();
//! assert!(editor.document().unwrap().palettes.is_empty());
//! ```

use std::fmt;

use tileforge_palette::{ClusterSorter, Color, ColorSpace, RgbSpace};
use tileforge_runtime::{
    BoundCommand, CommandError, CommandHistory, CommandValue, DocumentCommandRouter, DocumentId,
    StateChange, Subscription,
};

use crate::commands::image::MergeColors;
use crate::commands::palettes::{
    AddPalette, AddTiles, DeletePalette, RemoveTiles, SetTransparencyColor, SortPalette,
};
use crate::commands::tiles::SelectByPaletteColors;
use crate::commands::{image, palettes, tiles};
use crate::config::EditorConfig;
use crate::document::{TilePixels, TilesetDocument};
use crate::error::EditorError;
use crate::selection::ColorSelection;

type Router = DocumentCommandRouter<TilesetDocument>;

/// Every built-in verb, bound once at startup.
#[derive(Debug)]
struct BuiltinCommands {
    add_palette: BoundCommand<AddPalette>,
    add_tiles: BoundCommand<AddTiles>,
    remove_tiles: BoundCommand<RemoveTiles>,
    delete_palette: BoundCommand<DeletePalette>,
    set_transparency_color: BoundCommand<SetTransparencyColor>,
    sort_palette: BoundCommand<SortPalette>,
    select_by_palette_colors: BoundCommand<SelectByPaletteColors>,
    merge_colors: BoundCommand<MergeColors>,
}

/// A multi-document tileset editor.
pub struct Editor {
    router: Router,
    commands: BuiltinCommands,
    config: EditorConfig,
    selection: ColorSelection,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("router", &self.router)
            .field("config", &self.config)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// An editor measuring color distance in plain RGB.
    ///
    /// # Errors
    ///
    /// [`EditorError::Config`] if `config` fails validation.
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        Self::with_color_space(config, RgbSpace)
    }

    /// An editor whose palette sorting measures distance in `space`.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn with_color_space<S: ColorSpace + 'static>(
        config: EditorConfig,
        space: S,
    ) -> Result<Self, EditorError> {
        let config = config.validated()?;
        let mut router = Router::new(config.history);

        let sorter = ClusterSorter::new(space, config.cluster);
        let palette_verbs = router.commands(palettes::namespace(sorter));
        let tile_verbs = router.commands(tiles::namespace());
        let image_verbs = router.commands(image::namespace());

        let commands = BuiltinCommands {
            add_palette: palette_verbs.bind("add")?,
            add_tiles: palette_verbs.bind("addTiles")?,
            remove_tiles: palette_verbs.bind("removeTiles")?,
            delete_palette: palette_verbs.bind("delete")?,
            set_transparency_color: palette_verbs.bind("setTransparencyColor")?,
            sort_palette: palette_verbs.bind("sort")?,
            select_by_palette_colors: tile_verbs.bind("selectByPaletteColors")?,
            merge_colors: image_verbs.bind("mergeColors")?,
        };
        tracing::info!(
            max_history_length = config.history.max_history_length,
            seeded = config.cluster.seed.is_some(),
            "editor ready"
        );
        Ok(Self {
            router,
            commands,
            config,
            selection: ColorSelection::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The router, for registering extra namespaces or reaching documents
    /// other than the current one.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Open a document over `pixels` with the configured transparency and
    /// make it current.
    pub fn open(&mut self, pixels: TilePixels) -> DocumentId {
        let document =
            TilesetDocument::new(pixels).with_transparency(self.config.default_transparency);
        self.open_document(document)
    }

    /// Open a prepared document and make it current.
    pub fn open_document(&mut self, document: TilesetDocument) -> DocumentId {
        self.selection.clear();
        self.router.open(document)
    }

    /// Close `id` and return its document.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownDocument`] if `id` is not open.
    pub fn close(&mut self, id: DocumentId) -> Result<TilesetDocument, CommandError> {
        let was_current = self.router.current_id() == Some(id);
        let document = self.router.close(id)?;
        if was_current {
            self.selection.clear();
        }
        Ok(document)
    }

    /// Make `id` current. The color selection is cleared when the current
    /// document changes.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownDocument`] if `id` is not open.
    pub fn switch_to(&mut self, id: DocumentId) -> Result<(), CommandError> {
        let changed = self.router.current_id() != Some(id);
        self.router.set_current(id)?;
        if changed {
            self.selection.clear();
        }
        Ok(())
    }

    #[must_use]
    pub fn current_id(&self) -> Option<DocumentId> {
        self.router.current_id()
    }

    /// The current document.
    #[must_use]
    pub fn document(&self) -> Option<&TilesetDocument> {
        self.router.current().map(CommandHistory::document)
    }

    /// The current document, for edits that bypass history such as tile
    /// selection.
    pub fn document_mut(&mut self) -> Option<&mut TilesetDocument> {
        self.router.current_mut().map(CommandHistory::document_mut)
    }

    /// The current document's history.
    #[must_use]
    pub fn history(&self) -> Option<&CommandHistory<TilesetDocument>> {
        self.router.current()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Run `namespace.verb` on the current document.
    ///
    /// # Errors
    ///
    /// As [`DocumentCommandRouter::execute`].
    pub fn execute<P: CommandValue>(
        &mut self,
        namespace: &str,
        verb: &str,
        payload: P,
    ) -> Result<u64, CommandError> {
        self.router.execute(namespace, verb, payload)
    }

    /// Undo on the current document; returns the undone description.
    ///
    /// # Errors
    ///
    /// As [`DocumentCommandRouter::undo`].
    pub fn undo(&mut self) -> Result<Option<String>, CommandError> {
        self.router.undo()
    }

    /// Redo on the current document; returns the redone description.
    ///
    /// # Errors
    ///
    /// As [`DocumentCommandRouter::redo`].
    pub fn redo(&mut self) -> Result<Option<String>, CommandError> {
        self.router.redo()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.router.current().is_some_and(CommandHistory::can_undo)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.router.current().is_some_and(CommandHistory::can_redo)
    }

    /// Subscribe to state changes of every document.
    pub fn subscribe(&self, callback: impl Fn(&StateChange) + 'static) -> Subscription {
        self.router.subscribe(callback)
    }

    pub fn palettes(&mut self) -> PaletteCommands<'_> {
        PaletteCommands {
            router: &mut self.router,
            commands: &self.commands,
        }
    }

    pub fn tiles(&mut self) -> TileCommands<'_> {
        TileCommands {
            router: &mut self.router,
            commands: &self.commands,
        }
    }

    pub fn image(&mut self) -> ImageCommands<'_> {
        ImageCommands {
            router: &mut self.router,
            commands: &self.commands,
        }
    }

    // ========================================================================
    // Color selection
    // ========================================================================

    #[must_use]
    pub fn selection(&self) -> &ColorSelection {
        &self.selection
    }

    /// Pick `color` in palette `palette_index`.
    pub fn select_color(&mut self, palette_index: usize, color: Color) {
        self.selection.select(palette_index, color);
    }

    /// Merge the two selected colors into `target`, then clear the
    /// selection. Returns `None` unless exactly two colors are selected.
    ///
    /// # Errors
    ///
    /// Whatever `image.mergeColors` returns; the selection is kept.
    pub fn merge_selected(&mut self, target: Color) -> Result<Option<u64>, CommandError> {
        let Some(merge) = self.selection.merge_into(target) else {
            return Ok(None);
        };
        let sequence = self.image().merge_colors(merge)?;
        self.selection.clear();
        Ok(Some(sequence))
    }
}

// ============================================================================
// Typed handles
// ============================================================================

/// `palettes.*` on the current document.
pub struct PaletteCommands<'a> {
    router: &'a mut Router,
    commands: &'a BuiltinCommands,
}

impl PaletteCommands<'_> {
    /// New palette from the selected tiles.
    pub fn add(self) -> Result<u64, CommandError> {
        self.router.run(&self.commands.add_palette, AddPalette)
    }

    pub fn add_tiles(self, palette_index: usize) -> Result<u64, CommandError> {
        self.router.run(&self.commands.add_tiles, AddTiles { palette_index })
    }

    pub fn remove_tiles(self, palette_index: usize) -> Result<u64, CommandError> {
        self.router.run(&self.commands.remove_tiles, RemoveTiles { palette_index })
    }

    pub fn delete(self, palette_index: usize) -> Result<u64, CommandError> {
        self.router.run(&self.commands.delete_palette, DeletePalette { palette_index })
    }

    pub fn set_transparency_color(self, color: Color) -> Result<u64, CommandError> {
        self.router.run(
            &self.commands.set_transparency_color,
            SetTransparencyColor { color },
        )
    }

    pub fn sort(self, palette_index: usize) -> Result<u64, CommandError> {
        self.router.run(&self.commands.sort_palette, SortPalette { palette_index })
    }
}

/// `tiles.*` on the current document.
pub struct TileCommands<'a> {
    router: &'a mut Router,
    commands: &'a BuiltinCommands,
}

impl TileCommands<'_> {
    pub fn select_by_palette_colors(
        self,
        palette_index: usize,
        num_extra: usize,
    ) -> Result<u64, CommandError> {
        self.router.run(
            &self.commands.select_by_palette_colors,
            SelectByPaletteColors {
                palette_index,
                num_extra,
            },
        )
    }
}

/// `image.*` on the current document.
pub struct ImageCommands<'a> {
    router: &'a mut Router,
    commands: &'a BuiltinCommands,
}

impl ImageCommands<'_> {
    pub fn merge_colors(self, merge: MergeColors) -> Result<u64, CommandError> {
        self.router.run(&self.commands.merge_colors, merge)
    }
}
