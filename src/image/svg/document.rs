//! Owned, editable SVG event tree.
//!
//! The document is kept as the flat list of XML events quick-xml reads, so
//! serializing an unedited document reproduces the input. Edits rewrite the
//! attributes of single elements in place; nodes are never added or removed.

use quick_xml::{
    Reader, Writer,
    events::{BytesStart, Event},
};
use svgtypes::ViewBox;
use thiserror::Error;

use super::bounds::user_length;

#[derive(Debug, Error)]
pub enum SvgError {
    #[error("malformed svg at byte {position}: {message}")]
    Parse { position: u64, message: String },

    #[error("svg has no root <svg> element")]
    NoRoot,

    #[error("failed to serialize svg: {0}")]
    Write(String),
}

/// Shape elements the background heuristic looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Polygon,
    Path,
}

impl ShapeKind {
    pub const ALL: [Self; 3] = [Self::Rect, Self::Polygon, Self::Path];

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Polygon => "polygon",
            Self::Path => "path",
        }
    }

    fn from_local_name(name: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag().as_bytes() == name)
    }
}

/// A shape element inside a [`VectorDocument`].
#[derive(Debug, Clone, Copy)]
pub struct ShapeNode<'a> {
    pub kind: ShapeKind,
    index: usize,
    element: &'a BytesStart<'static>,
}

impl ShapeNode<'_> {
    /// Event index, stable across attribute edits.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Unescaped attribute value.
    pub fn attr(&self, name: &str) -> Option<String> {
        element_attr(self.element, name)
    }
}

#[derive(Debug, Clone)]
pub struct VectorDocument {
    events: Vec<Event<'static>>,
    root: Option<usize>,
}

impl VectorDocument {
    pub fn parse(text: &str) -> Result<Self, SvgError> {
        let mut reader = Reader::from_str(text);
        let mut events = Vec::new();
        let mut root = None;

        loop {
            let event = reader.read_event().map_err(|e| SvgError::Parse {
                position: reader.error_position(),
                message: e.to_string(),
            })?;
            match &event {
                Event::Eof => break,
                Event::Start(e) | Event::Empty(e)
                    if root.is_none() && e.local_name().as_ref() == b"svg" =>
                {
                    root = Some(events.len());
                }
                _ => {}
            }
            events.push(event.into_owned());
        }

        Ok(Self { events, root })
    }

    /// Serialize back to text.
    pub fn to_text(&self) -> Result<String, SvgError> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.events {
            writer
                .write_event(event.borrow())
                .map_err(|e| SvgError::Write(e.to_string()))?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| SvgError::Write(e.to_string()))
    }

    /// All rect/polygon/path elements in document order.
    pub fn shapes(&self) -> impl Iterator<Item = ShapeNode<'_>> {
        self.events
            .iter()
            .enumerate()
            .filter_map(|(index, event)| {
                let element = start_of(event)?;
                let kind = ShapeKind::from_local_name(element.local_name().as_ref())?;
                Some(ShapeNode {
                    kind,
                    index,
                    element,
                })
            })
    }

    pub fn root_attr(&self, name: &str) -> Option<String> {
        let element = start_of(self.events.get(self.root?)?)?;
        element_attr(element, name)
    }

    /// Root `viewBox` as `(min_x, min_y, width, height)`.
    pub fn view_box(&self) -> Option<[f64; 4]> {
        parse_view_box(&self.root_attr("viewBox")?)
    }

    /// Size of the user coordinate system shapes are drawn in: the
    /// `viewBox` size, or the root `width`/`height` without one.
    pub fn canvas_size(&self) -> Option<(f64, f64)> {
        if let Some([_, _, w, h]) = self.view_box() {
            return Some((w, h));
        }
        let w = parse_absolute_length(&self.root_attr("width")?)?;
        let h = parse_absolute_length(&self.root_attr("height")?)?;
        (w > 0.0 && h > 0.0).then_some((w, h))
    }

    /// Origin of the user coordinate system (`viewBox` min corner).
    pub fn canvas_origin(&self) -> (f64, f64) {
        self.view_box().map_or((0.0, 0.0), |[x, y, _, _]| (x, y))
    }

    /// Set (`Some`) or remove (`None`) attributes on the element at `index`.
    pub fn set_attrs(&mut self, index: usize, updates: &[(&str, Option<&str>)]) {
        let Some(event) = self.events.get_mut(index) else {
            return;
        };
        *event = match event {
            Event::Start(e) => Event::Start(rewrite_attrs(e, updates)),
            Event::Empty(e) => Event::Empty(rewrite_attrs(e, updates)),
            _ => return,
        };
    }

    /// Set attributes on the root `<svg>` element.
    pub fn set_root_attrs(&mut self, updates: &[(&str, Option<&str>)]) -> Result<(), SvgError> {
        let root = self.root.ok_or(SvgError::NoRoot)?;
        self.set_attrs(root, updates);
        Ok(())
    }
}

fn start_of<'a>(event: &'a Event<'static>) -> Option<&'a BytesStart<'static>> {
    match event {
        Event::Start(e) | Event::Empty(e) => Some(e),
        _ => None,
    }
}

fn element_attr(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .attributes()
        .with_checks(false)
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value);
            match quick_xml::escape::unescape(&raw) {
                Ok(value) => value.into_owned(),
                Err(_) => raw.into_owned(),
            }
        })
}

fn rewrite_attrs(element: &BytesStart<'_>, updates: &[(&str, Option<&str>)]) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    let mut applied = vec![false; updates.len()];

    for attr in element.attributes().with_checks(false).flatten() {
        match updates
            .iter()
            .position(|(key, _)| key.as_bytes() == attr.key.as_ref())
        {
            Some(i) => {
                applied[i] = true;
                if let Some(value) = updates[i].1 {
                    out.push_attribute((updates[i].0, value));
                }
            }
            None => out.push_attribute(attr),
        }
    }

    for (&(key, value), done) in updates.iter().zip(applied) {
        if let (false, Some(value)) = (done, value) {
            out.push_attribute((key, value));
        }
    }

    out
}

/// A positive-size `viewBox` value.
pub fn parse_view_box(raw: &str) -> Option<[f64; 4]> {
    let ViewBox { x, y, w, h } = raw.trim().parse().ok()?;
    Some([x, y, w, h])
}

/// Parse a root length into user units. Relative units have no absolute size.
fn parse_absolute_length(value: &str) -> Option<f64> {
    if value.trim().ends_with('%') {
        return None;
    }
    user_length(value, 0.0)
}

/// A single start tag read on its own, for text that does not parse as a
/// whole document.
#[derive(Debug, Clone)]
pub struct LooseTag(BytesStart<'static>);

impl LooseTag {
    /// Read the first start or empty tag of `text`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut reader = Reader::from_str(text);
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) => Some(Self(e.into_owned())),
            _ => None,
        }
    }

    pub fn shape_kind(&self) -> Option<ShapeKind> {
        ShapeKind::from_local_name(self.0.local_name().as_ref())
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        element_attr(&self.0, name)
    }
}
