//! Interactive session state.
//!
//! [`Session`] is the one mutable record every command handler works on:
//! the open document, the shown page, its coordinate mapper, the selection
//! gesture, the aspect settings and the last vector extraction. Every
//! mutation bumps [`Session::version`], so observers can tell stale views
//! from fresh ones.

use std::path::Path;

use image::RgbaImage;
use thiserror::Error;

use crate::engine::{self, EngineError, PageEngine, Scale};
use crate::geometry::{Canvas, CoordinateMapper, Document, Point, Rect};
use crate::selection::{AspectSettings, SelectionBuilder};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no document is open")]
    NoDocument,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Vector text extracted for one page region.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub page: usize,
    pub rect: Rect<Document>,
    pub text: String,
}

impl Extraction {
    /// Nominal size in document units.
    pub fn size(&self) -> (f64, f64) {
        (self.rect.width(), self.rect.height())
    }
}

struct OpenDocument {
    engine: Box<dyn PageEngine>,
    page: usize,
    mapper: CoordinateMapper,
}

pub struct Session {
    version: u64,
    zoom: f64,
    viewport: (u32, u32),
    document: Option<OpenDocument>,
    selection: SelectionBuilder,
    aspect: AspectSettings,
    extraction: Option<Extraction>,
}

impl Session {
    /// Empty session; pages render at `zoom` and fit into `viewport`.
    pub fn new(zoom: f64, viewport: (u32, u32)) -> Self {
        Self {
            version: 0,
            zoom,
            viewport,
            document: None,
            selection: SelectionBuilder::new(),
            aspect: AspectSettings::default(),
            extraction: None,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Open `path` and show its first page.
    ///
    /// On failure the previously open document stays active.
    pub fn open(&mut self, path: &Path) -> Result<(), SessionError> {
        self.open_engine(engine::open(path)?)
    }

    /// Install an already opened engine.
    pub fn open_engine(&mut self, engine: Box<dyn PageEngine>) -> Result<(), SessionError> {
        let bounds = engine.page_bounds(0)?;
        self.document = Some(OpenDocument {
            engine,
            page: 0,
            mapper: CoordinateMapper::fit(bounds, self.zoom, self.viewport),
        });
        self.selection.reset();
        self.extraction = None;
        self.touch();
        Ok(())
    }

    fn document(&self) -> Result<&OpenDocument, SessionError> {
        self.document.as_ref().ok_or(SessionError::NoDocument)
    }

    pub fn engine(&self) -> Option<&dyn PageEngine> {
        self.document.as_ref().map(|d| d.engine.as_ref())
    }

    pub fn page(&self) -> Option<usize> {
        self.document.as_ref().map(|d| d.page)
    }

    pub fn page_count(&self) -> usize {
        self.document.as_ref().map_or(0, |d| d.engine.page_count())
    }

    pub fn mapper(&self) -> Option<&CoordinateMapper> {
        self.document.as_ref().map(|d| &d.mapper)
    }

    /// Show page `index`, discarding the selection and the extraction cache.
    pub fn show_page(&mut self, index: usize) -> Result<(), SessionError> {
        let zoom = self.zoom;
        let viewport = self.viewport;
        let doc = self.document.as_mut().ok_or(SessionError::NoDocument)?;
        let bounds = doc.engine.page_bounds(index)?;
        doc.page = index;
        doc.mapper = CoordinateMapper::fit(bounds, zoom, viewport);
        self.selection.reset();
        self.extraction = None;
        self.touch();
        Ok(())
    }

    /// Advance one page. Returns `false` on the last page.
    pub fn next_page(&mut self) -> Result<bool, SessionError> {
        let doc = self.document()?;
        let next = doc.page + 1;
        if next >= doc.engine.page_count() {
            return Ok(false);
        }
        self.show_page(next)?;
        Ok(true)
    }

    /// Go back one page. Returns `false` on the first page.
    pub fn prev_page(&mut self) -> Result<bool, SessionError> {
        let page = self.document()?.page;
        if page == 0 {
            return Ok(false);
        }
        self.show_page(page - 1)?;
        Ok(true)
    }

    pub fn aspect(&self) -> &AspectSettings {
        &self.aspect
    }

    /// Takes effect on the next pointer event.
    pub fn set_aspect(&mut self, aspect: AspectSettings) {
        self.aspect = aspect;
        self.touch();
    }

    pub fn selection(&self) -> &SelectionBuilder {
        &self.selection
    }

    pub fn press(&mut self, p: Point<Canvas>) {
        self.selection.press(p);
        self.touch();
    }

    pub fn drag(&mut self, p: Point<Canvas>) {
        self.selection.drag(p, self.aspect.constraint());
        self.touch();
    }

    pub fn release(&mut self, p: Point<Canvas>) {
        self.selection.release(p, self.aspect.constraint());
        self.touch();
    }

    /// The selected region in document space.
    ///
    /// Without a finished selection, or with a zero-area one, this is the
    /// whole page.
    pub fn selection_rect(&self) -> Result<Rect<Document>, SessionError> {
        let doc = self.document()?;
        let rect = self
            .selection
            .fixed()
            .map(|r| doc.mapper.rect_to_document(r))
            .filter(|r| !r.is_empty());
        Ok(rect.unwrap_or_else(|| doc.mapper.page()))
    }

    /// Rasterize the selected region at `zoom` device pixels per unit.
    pub fn rasterize_selection(&self, zoom: f64) -> Result<RgbaImage, SessionError> {
        let doc = self.document()?;
        let rect = self.selection_rect()?;
        Ok(doc
            .engine
            .rasterize(doc.page, Scale::uniform(zoom), Some(rect))?)
    }

    /// Vector text of the selected region, cached until the page, the
    /// selection or the document changes.
    pub fn extract_vector(&mut self) -> Result<&Extraction, SessionError> {
        let doc = self.document()?;
        let page = doc.page;
        let rect = self.selection_rect()?;

        let fresh = self
            .extraction
            .as_ref()
            .is_some_and(|e| e.page == page && e.rect == rect);
        if !fresh {
            let text = doc.engine.extract_vector(page, rect)?;
            self.extraction = Some(Extraction { page, rect, text });
            self.touch();
        }

        self.extraction.as_ref().ok_or(SessionError::NoDocument)
    }
}
