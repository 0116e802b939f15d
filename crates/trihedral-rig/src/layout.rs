//! Marker map of the assembled rig.

use crate::error::RigError;
use crate::marker::{MarkerId, MarkerPlacer, MarkerSlot, MarkerSpec};
use crate::panel::{PanelRole, PanelSet};
use crate::resources::MarkerImages;
use std::collections::BTreeSet;
use trihedral_core::{CornerLabel, RigConfig};

const FORWARD_SLOTS: [(u8, PanelRole, CornerLabel); 8] = [
    (8, PanelRole::Floor, CornerLabel::BL),
    (6, PanelRole::Floor, CornerLabel::BR),
    (7, PanelRole::Floor, CornerLabel::TL),
    (5, PanelRole::WallBack, CornerLabel::BL),
    (1, PanelRole::WallBack, CornerLabel::TL),
    (2, PanelRole::WallBack, CornerLabel::BR),
    (3, PanelRole::WallBack, CornerLabel::TR),
    (4, PanelRole::WallRight, CornerLabel::TR),
];

/// Marker slots of the assembled rig.
pub fn forward_layout() -> Vec<MarkerSlot> {
    FORWARD_SLOTS
        .iter()
        .filter_map(|&(id, panel, corner)| {
            MarkerId::new(id).map(|id| MarkerSlot { id, panel, corner })
        })
        .collect()
}

/// Fail on the first id that appears twice.
pub fn ensure_unique_ids<I>(ids: I) -> Result<(), RigError>
where
    I: IntoIterator<Item = MarkerId>,
{
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(RigError::DuplicateMarker { id });
        }
    }
    Ok(())
}

/// Place every slot on its panel.
///
/// Corner insets use each panel's own face size, so the right wall markers
/// are inset on its `H x H` face.
pub fn rig_markers(
    config: &RigConfig,
    panels: &PanelSet,
    slots: &[MarkerSlot],
    images: &MarkerImages,
) -> Result<Vec<MarkerSpec>, RigError> {
    ensure_unique_ids(slots.iter().map(|s| s.id))?;
    let placer = MarkerPlacer::new(&config.pattern);
    let size = config.pattern.marker_size_mm;

    Ok(slots
        .iter()
        .map(|slot| {
            let pose = placer.place(panels.get(slot.panel), slot.corner, size);
            log::debug!(
                "marker {} on {} {} at ({:.2}, {:.2}, {:.2})",
                slot.id,
                slot.panel,
                slot.corner,
                pose.position.x,
                pose.position.y,
                pose.position.z
            );
            MarkerSpec {
                id: slot.id,
                image: images.path_for(slot.id),
                size_mm: size,
                panel: slot.panel,
                corner: slot.corner,
                pose,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::assemble_panels;
    use crate::volume::AxisAlignedDifference;
    use approx::assert_relative_eq;

    #[test]
    fn layout_places_eight_unique_ids() {
        let slots = forward_layout();
        assert_eq!(slots.len(), 8);
        ensure_unique_ids(slots.iter().map(|s| s.id)).expect("unique");
        let ids: BTreeSet<_> = slots.iter().map(|s| s.id).collect();
        assert_eq!(ids, MarkerId::all().collect());
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut slots = forward_layout();
        slots[1].id = slots[0].id;
        let cfg = RigConfig::default();
        let panels = assemble_panels(&cfg, &AxisAlignedDifference).expect("panels");
        let err = rig_markers(&cfg, &panels, &slots, &MarkerImages::new("m")).unwrap_err();
        assert!(matches!(err, RigError::DuplicateMarker { .. }));
    }

    #[test]
    fn markers_lie_on_the_inside_faces() {
        let cfg = RigConfig::default();
        let panels = assemble_panels(&cfg, &AxisAlignedDifference).expect("panels");
        let markers =
            rig_markers(&cfg, &panels, &forward_layout(), &MarkerImages::new("m")).expect("markers");
        let eps = cfg.pattern.face_eps_mm;

        for m in &markers {
            let p = m.pose.position;
            match m.panel {
                PanelRole::Floor => assert_relative_eq!(p.z, 0.8 + eps, epsilon = 1e-12),
                PanelRole::WallBack => assert_relative_eq!(p.y, 94.0 - eps, epsilon = 1e-12),
                PanelRole::WallRight => assert_relative_eq!(p.x, 108.0 - eps, epsilon = 1e-12),
            }
        }

        let four = markers
            .iter()
            .find(|m| m.id.get() == 4)
            .expect("marker 4");
        // TR of the 94x94 right wall face
        assert_relative_eq!(four.pose.position.y, 94.0 - 17.25, epsilon = 1e-12);
        assert_relative_eq!(four.pose.position.z, 0.8 + 94.0 - 17.25, epsilon = 1e-12);
        assert!(four.image.ends_with("ArucoMarker4.png"));
    }
}
