//! In-memory page-set model
//!
//! A [`PageSet`] is an ordered sequence of owned [`Page`] values decoded
//! from one PDF. Each page carries its page dictionary plus a deep copy of
//! every object it references (content streams, resources, annotations),
//! renumbered into a private id space. Pages hold no back-reference to any
//! owning document, so copying a page across sets is a plain `Clone` and
//! mutating a copy can never leak into the source.

use crate::error::{DecodeError, EncodeError};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet};

/// Absolute clockwise page rotation.
///
/// Setting a rotation overwrites the previous value, it never accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalize an arbitrary `/Rotate` value. Multiples of 360 collapse to
    /// `None`; anything that is not a right angle is rejected.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i64 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// One page: its dictionary, its private object closure, and its rotation.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page dictionary with local references, `/Parent` and `/Rotate`
    /// stripped. Inherited attributes are resolved in at decode time.
    pub(crate) dict: Dictionary,
    /// Deep-copied dependency closure, keyed by page-local object ids.
    pub(crate) objects: BTreeMap<ObjectId, Object>,
    pub(crate) rotation: Rotation,
}

impl Page {
    /// A content-less page with the given media box, in points.
    pub(crate) fn blank(width: f32, height: f32) -> Self {
        let dict = dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(width),
                Object::Real(height),
            ],
        };
        Self {
            dict,
            objects: BTreeMap::new(),
            rotation: Rotation::None,
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// `[llx, lly, urx, ury]` of the page's media box, if present.
    pub fn media_box(&self) -> Option<[f64; 4]> {
        let arr = match self.dict.get(b"MediaBox").ok()? {
            Object::Array(arr) => arr,
            Object::Reference(id) => self.objects.get(id)?.as_array().ok()?,
            _ => return None,
        };
        if arr.len() != 4 {
            return None;
        }
        let mut rect = [0.0f64; 4];
        for (slot, obj) in rect.iter_mut().zip(arr) {
            *slot = match obj {
                Object::Integer(i) => *i as f64,
                Object::Real(r) => (*r).into(),
                _ => return None,
            };
        }
        Some(rect)
    }

    pub(crate) fn insert_object(&mut self, object: Object) -> ObjectId {
        let next = self.objects.keys().map(|&(n, _)| n).max().unwrap_or(0) + 1;
        let id = (next, 0);
        self.objects.insert(id, object);
        id
    }

    /// Draw a raster image onto the page: the RGB samples become an image
    /// XObject with `alpha` as its soft mask, registered in the page
    /// resources and invoked from an appended content stream. Coordinates
    /// are bottom-left-origin page units.
    pub(crate) fn draw_image(
        &mut self,
        rgb: Vec<u8>,
        alpha: Vec<u8>,
        pixel_size: (u32, u32),
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) {
        let (px_w, px_h) = pixel_size;
        let smask_id = self.insert_object(Object::Stream(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => px_w as i64,
                "Height" => px_h as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        )));
        let image_id = self.insert_object(Object::Stream(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => px_w as i64,
                "Height" => px_h as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "SMask" => smask_id,
            },
            rgb,
        )));

        let name = self.register_xobject(image_id);
        let operations = format!("q\n{width} 0 0 {height} {x} {y} cm\n/{name} Do\nQ");
        let content_id = self.insert_object(Object::Stream(Stream::new(
            Dictionary::new(),
            operations.into_bytes(),
        )));
        self.append_content(content_id);
    }

    /// Register an image XObject under a fresh `/SigN` name, preserving any
    /// existing resources. Resources and the XObject subdictionary may each
    /// be inline or live behind a local reference.
    fn register_xobject(&mut self, image_id: ObjectId) -> String {
        let mut resources = match self.dict.remove(b"Resources") {
            Some(Object::Dictionary(dict)) => dict,
            Some(Object::Reference(id)) => match self.objects.get(&id) {
                Some(Object::Dictionary(dict)) => dict.clone(),
                _ => Dictionary::new(),
            },
            _ => Dictionary::new(),
        };

        let mut xobjects = match resources.remove(b"XObject") {
            Some(Object::Dictionary(dict)) => dict,
            Some(Object::Reference(id)) => match self.objects.get(&id) {
                Some(Object::Dictionary(dict)) => dict.clone(),
                _ => Dictionary::new(),
            },
            _ => Dictionary::new(),
        };

        let mut index = 0usize;
        let name = loop {
            let candidate = format!("Sig{index}");
            if !xobjects.has(candidate.as_bytes()) {
                break candidate;
            }
            index += 1;
        };

        xobjects.set(name.clone(), Object::Reference(image_id));
        resources.set("XObject", Object::Dictionary(xobjects));
        self.dict.set("Resources", Object::Dictionary(resources));
        name
    }

    fn append_content(&mut self, content_id: ObjectId) {
        let contents = match self.dict.remove(b"Contents") {
            Some(Object::Array(mut items)) => {
                items.push(Object::Reference(content_id));
                Object::Array(items)
            }
            Some(existing) => Object::Array(vec![existing, Object::Reference(content_id)]),
            None => Object::Reference(content_id),
        };
        self.dict.set("Contents", contents);
    }
}

/// Ordered sequence of pages decoded from one document.
#[derive(Debug, Clone)]
pub struct PageSet {
    pages: Vec<Page>,
}

impl PageSet {
    /// Empty builder for transform outputs. A decoded input is never empty.
    pub(crate) fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Decode a PDF byte stream into an owned page set.
    ///
    /// Fails with [`DecodeError::Malformed`] on anything lopdf cannot load,
    /// and on documents with zero pages.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let doc = Document::load_mem(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(DecodeError::Malformed("document has no pages".into()));
        }

        let pages = page_ids
            .into_iter()
            .map(|id| lift_page(&doc, id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { pages })
    }

    /// Serialize back to PDF bytes, rebuilding the page tree from scratch.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.encode_with(false)
    }

    /// Like [`encode`](Self::encode) but packs the container (stream
    /// compression via lopdf). Content fidelity is unchanged.
    pub fn encode_compact(&self) -> Result<Vec<u8>, EncodeError> {
        self.encode_with(true)
    }

    fn encode_with(&self, compact: bool) -> Result<Vec<u8>, EncodeError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let offset = doc.max_id;
            let map: BTreeMap<ObjectId, ObjectId> = page
                .objects
                .keys()
                .map(|&(number, generation)| ((number, generation), (number + offset, 0)))
                .collect();

            for (old_id, object) in &page.objects {
                doc.objects
                    .insert(map[old_id], remap_refs(object.clone(), &map));
            }
            doc.max_id = map.values().map(|&(n, _)| n).max().unwrap_or(offset);

            let mut dict = remap_dict(page.dict.clone(), &map);
            dict.set("Parent", Object::Reference(pages_id));
            if page.rotation != Rotation::None {
                dict.set("Rotate", Object::Integer(page.rotation.degrees()));
            }
            let page_id = doc.add_object(Object::Dictionary(dict));
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.pages.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        if compact {
            doc.compress();
        }

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| EncodeError::Serialize(e.to_string()))?;
        Ok(buffer)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Overwrite the rotation of the page at `index` (0-based). Returns
    /// false when the index is out of range.
    pub fn set_rotation(&mut self, index: usize, rotation: Rotation) -> bool {
        match self.pages.get_mut(index) {
            Some(page) => {
                page.set_rotation(rotation);
                true
            }
            None => false,
        }
    }

    /// Deep-copy the pages at `indices` from `source` onto the end of this
    /// set. Out-of-range indices are skipped; callers validate ranges first.
    pub fn copy_pages(&mut self, source: &PageSet, indices: &[usize]) {
        for &index in indices {
            if let Some(page) = source.page(index) {
                self.pages.push(page.clone());
            }
        }
    }
}

/// Lift one page out of a loaded document into a self-contained value.
fn lift_page(doc: &Document, page_id: ObjectId) -> Result<Page, DecodeError> {
    let mut dict = doc
        .get_dictionary(page_id)
        .map_err(|e| DecodeError::Malformed(format!("bad page object: {e}")))?
        .clone();
    dict.remove(b"Parent");

    // Resolve inheritable attributes so the page stands alone.
    for key in [b"MediaBox".as_slice(), b"Resources".as_slice()] {
        if !dict.has(key) {
            if let Some(value) = inherited(doc, page_id, key) {
                dict.set(key, value.clone());
            }
        }
    }

    let rotate = dict
        .remove(b"Rotate")
        .or_else(|| inherited(doc, page_id, b"Rotate").cloned());
    let rotation = rotate
        .as_ref()
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_i64().ok())
        .and_then(Rotation::from_degrees)
        .unwrap_or(Rotation::None);

    // Dependency closure of the page, breadth-first over references.
    // Other pages of the tree are cut out of the walk: an annotation's
    // back-pointer must not drag the whole document into every page.
    let mut pending: Vec<ObjectId> = Vec::new();
    collect_dict_refs(&dict, &mut pending);

    let mut visited: BTreeSet<ObjectId> = BTreeSet::new();
    let mut closure: Vec<(ObjectId, Object)> = Vec::new();
    while let Some(id) = pending.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Ok(object) = doc.get_object(id) else {
            // Dangling reference: remapped to null below, as readers do.
            continue;
        };
        if is_page_tree_node(object) {
            continue;
        }
        collect_refs(object, &mut pending);
        closure.push((id, object.clone()));
    }

    // Renumber into a dense page-local id space, ordered for deterministic
    // re-encoding.
    closure.sort_by_key(|(id, _)| *id);
    let map: BTreeMap<ObjectId, ObjectId> = closure
        .iter()
        .enumerate()
        .map(|(i, (old_id, _))| (*old_id, ((i + 1) as u32, 0)))
        .collect();

    let objects: BTreeMap<ObjectId, Object> = closure
        .into_iter()
        .map(|(old_id, object)| (map[&old_id], remap_refs(object, &map)))
        .collect();
    let dict = remap_dict(dict, &map);

    Ok(Page {
        dict,
        objects,
        rotation,
    })
}

/// Walk the `/Parent` chain looking for an inheritable attribute.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict = doc.get_object(id).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    None
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return false,
    };
    matches!(
        dict.get(b"Type"),
        Ok(Object::Name(name)) if name == b"Page" || name == b"Pages"
    )
}

fn collect_refs(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        Object::Dictionary(dict) => collect_dict_refs(dict, out),
        Object::Stream(stream) => collect_dict_refs(&stream.dict, out),
        _ => {}
    }
}

fn collect_dict_refs(dict: &Dictionary, out: &mut Vec<ObjectId>) {
    for (_, value) in dict.iter() {
        collect_refs(value, out);
    }
}

/// Rewrite every reference in `object` through `map`; references to objects
/// outside the map become null.
fn remap_refs(object: Object, map: &BTreeMap<ObjectId, ObjectId>) -> Object {
    match object {
        Object::Reference(id) => match map.get(&id) {
            Some(&new_id) => Object::Reference(new_id),
            None => Object::Null,
        },
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| remap_refs(item, map))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(remap_dict(dict, map)),
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_refs(value.clone(), map);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

fn remap_dict(mut dict: Dictionary, map: &BTreeMap<ObjectId, ObjectId>) -> Dictionary {
    for (_, value) in dict.iter_mut() {
        *value = remap_refs(value.clone(), map);
    }
    dict
}
