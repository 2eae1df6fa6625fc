//! Tracked joint angles and a fixed-size table keyed by them
//!
//! The angle vocabulary is closed, so per-angle state lives in plain arrays
//! indexed by `AngleName` instead of string-keyed maps.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Number of tracked angles
pub const ANGLE_COUNT: usize = 4;

/// Joint angles reported by the pose layer, in feedback order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleName {
    ShoulderAbduction,
    ElbowFlexion,
    ShoulderInternalRotation,
    ShoulderExternalRotation,
}

impl AngleName {
    pub const ALL: [AngleName; ANGLE_COUNT] = [
        AngleName::ShoulderAbduction,
        AngleName::ElbowFlexion,
        AngleName::ShoulderInternalRotation,
        AngleName::ShoulderExternalRotation,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AngleName::ShoulderAbduction => "shoulder_abduction",
            AngleName::ElbowFlexion => "elbow_flexion",
            AngleName::ShoulderInternalRotation => "shoulder_internal_rotation",
            AngleName::ShoulderExternalRotation => "shoulder_external_rotation",
        }
    }
}

impl fmt::Display for AngleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Table with at most one value per angle
#[derive(Clone, Debug, PartialEq)]
pub struct AngleMap<T> {
    slots: [Option<T>; ANGLE_COUNT],
}

impl<T> AngleMap<T> {
    pub fn new() -> Self {
        AngleMap {
            slots: [None, None, None, None],
        }
    }

    pub fn insert(&mut self, angle: AngleName, value: T) -> Option<T> {
        self.slots[angle.index()].replace(value)
    }

    pub fn remove(&mut self, angle: AngleName) -> Option<T> {
        self.slots[angle.index()].take()
    }

    pub fn get(&self, angle: AngleName) -> Option<&T> {
        self.slots[angle.index()].as_ref()
    }

    pub fn contains(&self, angle: AngleName) -> bool {
        self.slots[angle.index()].is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present entries in fixed angle order
    pub fn iter(&self) -> impl Iterator<Item = (AngleName, &T)> + '_ {
        AngleName::ALL
            .into_iter()
            .filter_map(move |angle| self.get(angle).map(|value| (angle, value)))
    }

    pub fn keys(&self) -> impl Iterator<Item = AngleName> + '_ {
        self.iter().map(|(angle, _)| angle)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, value)| value)
    }
}

impl<T: Copy> AngleMap<T> {
    pub fn value(&self, angle: AngleName) -> Option<T> {
        self.get(angle).copied()
    }
}

impl<T> Default for AngleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(AngleName, T)> for AngleMap<T> {
    fn from_iter<I: IntoIterator<Item = (AngleName, T)>>(iter: I) -> Self {
        let mut map = AngleMap::new();
        for (angle, value) in iter {
            map.insert(angle, value);
        }
        map
    }
}

impl<T: Serialize> Serialize for AngleMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for AngleMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<AngleName, T>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
