//! Role inference for the parts of an already-built rig.
//!
//! Parts arrive as unlabeled bounding boxes. The three largest are the
//! panels; among them the first one lying flat (thinnest along Z) is the
//! floor and the others are walls, ordered left to right by center X.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use trihedral_core::{Aabb, Axis};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Number of panel candidates taken from the volume ranking.
pub const PANEL_COUNT: usize = 3;

/// One input part: a name and its bounding box in scene units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartBounds {
    pub name: String,
    pub aabb: Aabb,
}

impl PartBounds {
    pub fn new(name: impl Into<String>, aabb: Aabb) -> Self {
        Self {
            name: name.into(),
            aabb,
        }
    }

    /// Bounds of a vertex list, `None` when it is empty.
    pub fn from_vertices<I>(name: impl Into<String>, vertices: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        Aabb::from_points(vertices).map(|aabb| Self::new(name, aabb))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyParams {
    /// Parts whose largest extent is at most this (mm) are `Small`.
    pub small_part_max_extent_mm: f64,
    /// Scene units to millimetres; 1000 for metre scenes.
    pub unit_to_mm: f64,
    /// Treat fewer than three panel candidates as an error.
    pub strict_panel_count: bool,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            small_part_max_extent_mm: 25.0,
            unit_to_mm: 1000.0,
            strict_panel_count: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    /// Tabs and hinges; rendered in dark laminate.
    Small,
    /// Panels; rendered in light laminate.
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartRole {
    Floor,
    WallLeft,
    WallRight,
}

impl fmt::Display for PartRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartRole::Floor => "floor",
            PartRole::WallLeft => "wall_left",
            PartRole::WallRight => "wall_right",
        };
        f.write_str(s)
    }
}

/// Per-part result, in input order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartClassification {
    pub name: String,
    pub normal_axis: Axis,
    pub size_class: SizeClass,
    pub role: Option<PartRole>,
    pub aabb: Aabb,
}

/// Outcome of `classify`; indices refer to the input slice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub parts: Vec<PartClassification>,
    pub floor: usize,
    pub wall_left: Option<usize>,
    pub wall_right: Option<usize>,
}

impl RoleAssignment {
    pub fn floor(&self) -> &PartClassification {
        &self.parts[self.floor]
    }

    pub fn wall_left(&self) -> Option<&PartClassification> {
        self.wall_left.map(|i| &self.parts[i])
    }

    pub fn wall_right(&self) -> Option<&PartClassification> {
        self.wall_right.map(|i| &self.parts[i])
    }

    pub fn role_of(&self, role: PartRole) -> Option<&PartClassification> {
        match role {
            PartRole::Floor => Some(self.floor()),
            PartRole::WallLeft => self.wall_left(),
            PartRole::WallRight => self.wall_right(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    #[error("no parts to classify")]
    NoParts,
    #[error("found {found} panel candidate(s), need {required}")]
    TooFewPanels { found: usize, required: usize },
    #[error("unit_to_mm must be positive and finite (got {0})")]
    InvalidUnitScale(f64),
}

/// Small/large split on the largest extent in millimetres.
pub fn size_class(aabb: &Aabb, params: &ClassifyParams) -> SizeClass {
    if aabb.max_extent() * params.unit_to_mm <= params.small_part_max_extent_mm {
        SizeClass::Small
    } else {
        SizeClass::Large
    }
}

/// Assign roles and size classes to `parts`.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(parts, params), fields(n = parts.len())))]
pub fn classify(
    parts: &[PartBounds],
    params: &ClassifyParams,
) -> Result<RoleAssignment, ClassifyError> {
    if parts.is_empty() {
        return Err(ClassifyError::NoParts);
    }
    if !params.unit_to_mm.is_finite() || params.unit_to_mm <= 0.0 {
        return Err(ClassifyError::InvalidUnitScale(params.unit_to_mm));
    }

    let mut out: Vec<PartClassification> = parts
        .iter()
        .map(|p| PartClassification {
            name: p.name.clone(),
            normal_axis: p.aabb.smallest_axis(),
            size_class: size_class(&p.aabb, params),
            role: None,
            aabb: p.aabb,
        })
        .collect();

    // stable: equal volumes keep input order
    let mut ranked: Vec<usize> = (0..parts.len()).collect();
    ranked.sort_by(|&a, &b| parts[b].aabb.volume().total_cmp(&parts[a].aabb.volume()));
    ranked.truncate(PANEL_COUNT);

    if ranked.len() < PANEL_COUNT {
        if params.strict_panel_count {
            return Err(ClassifyError::TooFewPanels {
                found: ranked.len(),
                required: PANEL_COUNT,
            });
        }
        log::warn!(
            "only {} panel candidate(s); missing walls are left unassigned",
            ranked.len()
        );
    }

    let floor = match ranked.iter().position(|&i| out[i].normal_axis == Axis::Z) {
        Some(pos) => ranked[pos],
        None => {
            log::warn!(
                "no panel candidate lies flat; using the largest part {:?} as floor",
                out[ranked[0]].name
            );
            ranked[0]
        }
    };

    let mut walls: Vec<usize> = ranked.iter().copied().filter(|&i| i != floor).collect();
    walls.sort_by(|&a, &b| {
        parts[a]
            .aabb
            .center()
            .x
            .total_cmp(&parts[b].aabb.center().x)
    });
    let wall_left = walls.first().copied();
    let wall_right = walls.get(1).copied();

    out[floor].role = Some(PartRole::Floor);
    if let Some(i) = wall_left {
        out[i].role = Some(PartRole::WallLeft);
    }
    if let Some(i) = wall_right {
        out[i].role = Some(PartRole::WallRight);
    }

    log::info!(
        "classified {} part(s): floor={:?} wall_left={:?} wall_right={:?}",
        out.len(),
        out[floor].name,
        wall_left.map(|i| out[i].name.as_str()),
        wall_right.map(|i| out[i].name.as_str())
    );

    Ok(RoleAssignment {
        parts: out,
        floor,
        wall_left,
        wall_right,
    })
}
