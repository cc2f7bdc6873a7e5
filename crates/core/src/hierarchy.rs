use anyhow::{anyhow, bail, Result};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::logger;
use crate::types::Rectangle;

/// resource-id -> bounds of the elements in one hierarchy dump.
///
/// Keeps document order so wildcard lookups pick the first element on
/// screen. A repeated id keeps its first position and the last bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewHierarchyIndex {
    entries: IndexMap<String, Rectangle>,
}

impl ViewHierarchyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every `<node>` element of a dump.
    ///
    /// Never fails: a bad node is logged and skipped, an unparsable
    /// document yields an empty index.
    pub fn parse(xml: &str) -> Self {
        let mut index = Self::new();
        let mut reader = Reader::from_str(xml);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"node" => {
                    match read_node(&e) {
                        Ok(Some((id, rect))) => index.insert(id, rect),
                        Ok(None) => {}
                        Err(err) => logger::warn_p(
                            "hierarchy",
                            &format!("skipped node at byte {}: {}", reader.buffer_position(), err),
                        ),
                    }
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    logger::error_p(
                        "hierarchy",
                        &format!("unparsable dump at byte {}: {}", reader.buffer_position(), err),
                    );
                    return Self::new();
                }
                _ => {}
            }
        }

        index
    }

    pub fn insert(&mut self, id: impl Into<String>, rect: Rectangle) {
        let id = id.into();
        if !id.is_empty() {
            self.entries.insert(id, rect);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rectangle> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rectangle)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Rectangle)> for ViewHierarchyIndex {
    fn from_iter<I: IntoIterator<Item = (S, Rectangle)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (id, rect) in iter {
            index.insert(id, rect);
        }
        index
    }
}

/// `Ok(None)` for nodes without a resource-id.
fn read_node(e: &BytesStart) -> Result<Option<(String, Rectangle)>> {
    let mut bounds = None;
    let mut id = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| anyhow!("attribute error: {}", e))?;
        match attr.key.as_ref() {
            b"bounds" => bounds = Some(attr.unescape_value()?.into_owned()),
            b"resource-id" => id = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }

    let Some(id) = id.filter(|id| !id.is_empty()) else { return Ok(None) };
    let Some(bounds) = bounds else { bail!("{} has no bounds", id) };
    let rect = parse_bounds(&bounds)?;

    Ok(Some((id, rect)))
}

/// Parse `[x1,y1][x2,y2]`.
pub fn parse_bounds(bounds: &str) -> Result<Rectangle> {
    let flat = bounds.replace("][", ",").replace(['[', ']'], "");
    let coords = flat
        .split(',')
        .map(|n| n.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("bad bounds {:?}: {}", bounds, e))?;

    match coords.as_slice() {
        [x1, y1, x2, y2] => Rectangle::from_corners(*x1, *y1, *x2, *y2)
            .ok_or_else(|| anyhow!("bad bounds {:?}: inverted or oversized", bounds)),
        _ => bail!("bad bounds {:?}: expected 4 coordinates", bounds),
    }
}
