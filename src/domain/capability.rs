//! Capability groups, presets and the resolver that turns configuration into
//! the concrete tool selection.

use std::fmt;
use std::str::FromStr;

use crate::core::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapabilityGroup {
    Posts,
    Pages,
    Tags,
    Images,
}

/// Every known group, in canonical order.
pub const ALL_GROUPS: [CapabilityGroup; 4] = [
    CapabilityGroup::Posts,
    CapabilityGroup::Pages,
    CapabilityGroup::Tags,
    CapabilityGroup::Images,
];

impl CapabilityGroup {
    pub const fn name(self) -> &'static str {
        match self {
            CapabilityGroup::Posts => "posts",
            CapabilityGroup::Pages => "pages",
            CapabilityGroup::Tags => "tags",
            CapabilityGroup::Images => "images",
        }
    }

    pub fn known_names() -> Vec<&'static str> {
        ALL_GROUPS.iter().map(|g| g.name()).collect()
    }
}

impl fmt::Display for CapabilityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CapabilityGroup {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_GROUPS.iter().copied().find(|g| g.name() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub groups: &'static [CapabilityGroup],
    pub read_only: bool,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "full",
        groups: &ALL_GROUPS,
        read_only: false,
    },
    Preset {
        name: "readonly",
        groups: &ALL_GROUPS,
        read_only: true,
    },
    Preset {
        name: "writer",
        groups: &[
            CapabilityGroup::Posts,
            CapabilityGroup::Tags,
            CapabilityGroup::Images,
        ],
        read_only: false,
    },
    Preset {
        name: "editor",
        groups: &[
            CapabilityGroup::Posts,
            CapabilityGroup::Pages,
            CapabilityGroup::Tags,
        ],
        read_only: false,
    },
];

pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// The resolved answer to "which groups, and may they mutate?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSelection {
    groups: Vec<CapabilityGroup>,
    pub read_only: bool,
}

impl ToolSelection {
    pub fn new(groups: impl IntoIterator<Item = CapabilityGroup>, read_only: bool) -> Self {
        let mut groups: Vec<CapabilityGroup> = groups.into_iter().collect();
        groups.sort();
        groups.dedup();
        Self { groups, read_only }
    }

    pub fn all() -> Self {
        Self::new(ALL_GROUPS, false)
    }

    pub fn groups(&self) -> &[CapabilityGroup] {
        &self.groups
    }

    pub fn contains(&self, group: CapabilityGroup) -> bool {
        self.groups.contains(&group)
    }
}

impl From<&Preset> for ToolSelection {
    fn from(p: &Preset) -> Self {
        ToolSelection::new(p.groups.iter().copied(), p.read_only)
    }
}

/// Resolve an explicit group list and/or preset name.
///
/// An explicit list wins over a preset and never implies read-only. With
/// neither, every group is exposed with mutation allowed. Unknown names fail
/// closed: nothing is silently dropped.
pub fn resolve(groups: Option<&str>, preset: Option<&str>) -> Result<ToolSelection, ConfigError> {
    let groups = groups.map(str::trim).filter(|s| !s.is_empty());
    let preset = preset.map(str::trim).filter(|s| !s.is_empty());

    if let Some(list) = groups {
        let mut selected = Vec::new();
        let mut invalid = Vec::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name.parse::<CapabilityGroup>() {
                Ok(g) => selected.push(g),
                Err(()) => invalid.push(name.to_string()),
            }
        }
        if !invalid.is_empty() {
            return Err(ConfigError::UnknownGroups {
                invalid,
                valid: CapabilityGroup::known_names(),
            });
        }
        return Ok(ToolSelection::new(selected, false));
    }

    if let Some(name) = preset {
        return find_preset(name)
            .map(ToolSelection::from)
            .ok_or_else(|| ConfigError::UnknownPreset {
                name: name.to_string(),
                available: PRESETS.iter().map(|p| p.name).collect(),
            });
    }

    Ok(ToolSelection::all())
}
