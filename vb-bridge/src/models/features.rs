//! Visual feature vocabulary for the synchronous analyze endpoint

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Feature identifier outside the supported vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown visual feature '{0}' (expected one of: {list})", list = VisualFeature::vocabulary())]
pub struct UnknownFeature(pub String);

/// Analysis category accepted by `vision/v3.2/analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualFeature {
    Categories,
    Tags,
    Description,
    Faces,
    ImageType,
    Color,
    Adult,
    Objects,
    Brands,
}

impl VisualFeature {
    pub const ALL: [VisualFeature; 9] = [
        VisualFeature::Categories,
        VisualFeature::Tags,
        VisualFeature::Description,
        VisualFeature::Faces,
        VisualFeature::ImageType,
        VisualFeature::Color,
        VisualFeature::Adult,
        VisualFeature::Objects,
        VisualFeature::Brands,
    ];

    /// Canonical spelling used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualFeature::Categories => "Categories",
            VisualFeature::Tags => "Tags",
            VisualFeature::Description => "Description",
            VisualFeature::Faces => "Faces",
            VisualFeature::ImageType => "ImageType",
            VisualFeature::Color => "Color",
            VisualFeature::Adult => "Adult",
            VisualFeature::Objects => "Objects",
            VisualFeature::Brands => "Brands",
        }
    }

    fn vocabulary() -> String {
        Self::ALL
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for VisualFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualFeature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownFeature(needle.to_string()))
    }
}

/// Name of the query parameter carrying the feature list
///
/// The legacy route uses `visualFeatures`; the selectable route uses `features`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureParam {
    Features,
    VisualFeatures,
}

impl FeatureParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureParam::Features => "features",
            FeatureParam::VisualFeatures => "visualFeatures",
        }
    }
}

/// Ordered, duplicate-free set of requested features
///
/// An empty selection is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSelection(Vec<VisualFeature>);

impl FeatureSelection {
    pub fn new(features: impl IntoIterator<Item = VisualFeature>) -> Self {
        let mut selected = Vec::new();
        for feature in features {
            if !selected.contains(&feature) {
                selected.push(feature);
            }
        }
        Self(selected)
    }

    /// Parse the comma-joined form submitted by the UI
    ///
    /// Blank entries are skipped; any unknown identifier rejects the whole list.
    pub fn parse_list(raw: &str) -> Result<Self, UnknownFeature> {
        let features = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(VisualFeature::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(features))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Comma-joined value for the query string
    ///
    /// Vocabulary entries are plain ASCII letters, so no escaping is needed.
    pub fn to_query_value(&self) -> String {
        self.0
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}
