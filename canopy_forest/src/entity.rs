// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat, pre-tree records as delivered by the data layer.

use core::fmt;

/// Identifier of the company whose hierarchy is being browsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CompanyId(pub String);

impl CompanyId {
    /// Creates a company id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CompanyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A physical asset or component.
///
/// An asset hangs off its `parent_id` when set and otherwise off the location
/// named by `location_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Asset {
    /// Unique identifier.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Parent asset, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent_id: Option<String>,
    /// Owning location, used when `parent_id` is absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub location_id: Option<String>,
    /// Sensor attached to a component.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sensor_id: Option<String>,
    /// Sensor kind, for example `vibration` or `energy`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sensor_type: Option<String>,
    /// Operating status reported for a component.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Option<String>,
    /// Gateway the sensor reports through.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gateway_id: Option<String>,
}

impl Asset {
    /// Creates an asset with only the fields that matter for parentage.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the parent asset.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Sets the owning location.
    #[must_use]
    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    /// Returns `true` if this asset carries a sensor, i.e. is a component.
    #[must_use]
    pub fn is_component(&self) -> bool {
        non_empty(self.sensor_type.as_deref()).is_some()
    }
}

/// A location or sub-location.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Location {
    /// Unique identifier.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Parent location, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent_id: Option<String>,
}

impl Location {
    /// Creates a top-level location.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    /// Sets the parent location.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Either kind of record; the payload carried by every tree node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    /// An asset or component.
    Asset(Asset),
    /// A location.
    Location(Location),
}

impl Entity {
    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Asset(a) => &a.id,
            Self::Location(l) => &l.id,
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Asset(a) => &a.name,
            Self::Location(l) => &l.name,
        }
    }

    /// Identifier this entity hangs off, before resolution against the forest.
    ///
    /// Resolution order is the location's own parent, then the asset's parent,
    /// then the asset's owning location. Empty strings count as absent.
    #[must_use]
    pub fn parent_key(&self) -> Option<&str> {
        match self {
            Self::Location(l) => non_empty(l.parent_id.as_deref()),
            Self::Asset(a) => non_empty(a.parent_id.as_deref())
                .or_else(|| non_empty(a.location_id.as_deref())),
        }
    }

    /// Returns the asset payload, if this is an asset.
    #[must_use]
    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            Self::Asset(a) => Some(a),
            Self::Location(_) => None,
        }
    }

    /// Returns the location payload, if this is a location.
    #[must_use]
    pub fn as_location(&self) -> Option<&Location> {
        match self {
            Self::Location(l) => Some(l),
            Self::Asset(_) => None,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Asset, Entity, Location};

    #[test]
    fn parent_key_prefers_explicit_parent() {
        let asset = Asset::new("a", "Motor").with_parent("p").with_location("l");
        assert_eq!(Entity::Asset(asset).parent_key(), Some("p"));
    }

    #[test]
    fn parent_key_falls_back_to_location() {
        let asset = Asset::new("a", "Motor").with_location("l");
        assert_eq!(Entity::Asset(asset).parent_key(), Some("l"));

        let mut asset = Asset::new("a", "Motor").with_location("l");
        asset.parent_id = Some(String::new());
        assert_eq!(Entity::Asset(asset).parent_key(), Some("l"));
    }

    #[test]
    fn parent_key_absent_for_top_level_records() {
        assert_eq!(Entity::Asset(Asset::new("a", "Motor")).parent_key(), None);
        let loc = Location::new("l", "Plant");
        assert_eq!(Entity::Location(loc).parent_key(), None);
    }

    #[test]
    fn components_are_assets_with_a_sensor() {
        let mut asset = Asset::new("a", "Motor");
        assert!(!asset.is_component());
        asset.sensor_type = Some("vibration".into());
        assert!(asset.is_component());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn decodes_upstream_json() {
        let assets: Vec<Asset> = serde_json::from_str(
            r#"[
                {"id":"a1","name":"Motor","parentId":null,"locationId":"l1",
                 "sensorId":"s1","sensorType":"energy","status":"operating","gatewayId":"g1"},
                {"id":"a2","name":"Fan","parentId":"a1"}
            ]"#,
        )
        .unwrap();
        assert_eq!(assets[0].location_id.as_deref(), Some("l1"));
        assert!(assets[0].is_component());
        assert_eq!(assets[1].parent_id.as_deref(), Some("a1"));
        assert_eq!(assets[1].location_id, None);

        let locations: Vec<Location> =
            serde_json::from_str(r#"[{"id":"l1","name":"Plant","parentId":null}]"#).unwrap();
        assert_eq!(locations[0].parent_id, None);
    }
}
