//! Correspondence settings document model
use crate::correspondence::Region;
use crate::template_matching::{Point, Rect};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Schema tag written to new documents
pub const SETTINGS_VERSION: u32 = 1;

fn default_version() -> u32 {
    SETTINGS_VERSION
}

/// Per-video settings: tracked regions plus calibration metadata.
///
/// Serialized field order is fixed: version, objects, ruler, section, roi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub objects: Vec<RegionRecord>,
    /// Scale calibration, carried verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruler: Option<Value>,
    /// Frame range of interest, carried verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Value>,
    /// Crop rectangle, carried verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<Value>,
}

/// One tracked object as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub name: String,
    /// `[x, y, w, h]`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_pixels"
    )]
    pub rectangle: Option<[i32; 4]>,
    /// Anchor `[x, y]`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_pixels"
    )]
    pub point: Option<[i32; 2]>,
    /// Any other per-object keys, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts integer or float coordinates; floats are truncated to pixels
fn deserialize_pixels<'de, D, const N: usize>(deserializer: D) -> Result<Option<[i32; N]>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<f64>> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(values) if values.len() == N => {
            let mut out = [0i32; N];
            for (slot, v) in out.iter_mut().zip(values) {
                *slot = v.trunc() as i32;
            }
            Ok(Some(out))
        }
        Some(values) => Err(serde::de::Error::invalid_length(
            values.len(),
            &format!("{N} coordinates").as_str(),
        )),
    }
}

impl SettingsDocument {
    /// New document for a target video: matched objects plus the reference's
    /// ruler/section/roi.
    pub fn for_target(reference: &SettingsDocument, objects: Vec<RegionRecord>) -> Self {
        Self {
            version: SETTINGS_VERSION,
            objects,
            ruler: reference.ruler.clone(),
            section: reference.section.clone(),
            roi: reference.roi.clone(),
        }
    }

    /// Regions in document order. Objects without a rectangle become empty
    /// regions, which can never match.
    pub fn regions(&self) -> Vec<Region> {
        self.objects.iter().map(RegionRecord::to_region).collect()
    }
}

impl RegionRecord {
    pub fn new(name: impl Into<String>, rect: Rect, point: Option<Point>) -> Self {
        let mut record = Self {
            name: name.into(),
            rectangle: None,
            point: None,
            extra: Map::new(),
        };
        record.set_geometry(rect, point);
        record
    }

    pub fn to_region(&self) -> Region {
        let rect = match self.rectangle {
            Some([x, y, w, h]) => Rect::new(x, y, w.max(0) as u32, h.max(0) as u32),
            None => {
                log::warn!("Object '{}' has no rectangle", self.name);
                Rect::new(0, 0, 0, 0)
            }
        };
        let anchor = self.point.map(|[x, y]| Point::new(x, y));
        Region::new(self.name.clone(), rect, anchor)
    }

    /// Copy of this record relocated to a matched region
    pub fn relocated(&self, region: &Region) -> Self {
        let mut record = self.clone();
        record.set_geometry(region.rect, region.anchor);
        record
    }

    fn set_geometry(&mut self, rect: Rect, point: Option<Point>) {
        self.rectangle = Some([rect.x, rect.y, rect.width as i32, rect.height as i32]);
        self.point = point.map(|p| [p.x, p.y]);
    }
}
