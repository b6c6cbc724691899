//! One opacity slider per surface
//!
//! Sliders run over the integers 1 to 10; position `v` means opacity `v / 10`.

use log::info;

use crate::scene::SurfaceActor;

/// Title of the panel's window
pub const PANEL_TITLE: &str = "Opacity Control Panel";

pub const SLIDER_MIN: i32 = 1;
pub const SLIDER_MAX: i32 = 10;

/// An opacity edit made through the panel
#[derive(Debug, Clone, PartialEq)]
pub struct OpacityChange {
    pub index: usize,
    pub name: String,
    pub opacity: f32,
}

pub fn slider_to_opacity(value: i32) -> f32 {
    value as f32 / 10.0
}

/// Slider position showing `opacity`, kept inside the slider range
pub fn opacity_to_slider(opacity: f32) -> i32 {
    ((opacity * 10.0).round() as i32).clamp(SLIDER_MIN, SLIDER_MAX)
}

/// Current slider positions, in actor order
pub fn slider_values(actors: &[SurfaceActor]) -> Vec<i32> {
    actors
        .iter()
        .map(|actor| opacity_to_slider(actor.opacity()))
        .collect()
}

/// Applies slider `value` to the actor at `index` and logs the change.
///
/// Values outside the slider range are clamped into it. Returns `None` when
/// there is no such actor or its opacity already matches.
pub fn apply_slider(
    actors: &mut [SurfaceActor],
    index: usize,
    value: i32,
) -> Option<OpacityChange> {
    let actor = actors.get_mut(index)?;
    let opacity = slider_to_opacity(value.clamp(SLIDER_MIN, SLIDER_MAX));
    if !actor.set_opacity(opacity) {
        return None;
    }
    info!("Updated opacity of {} to {:.1}", actor.name(), opacity);
    Some(OpacityChange {
        index,
        name: actor.name().to_string(),
        opacity,
    })
}

/// Draws the panel filling the whole window. Returns the edits made this frame.
pub fn opacity_panel(ui: &imgui::Ui, actors: &mut [SurfaceActor]) -> Vec<OpacityChange> {
    let mut changes = Vec::new();
    let display_size = ui.io().display_size;

    ui.window(PANEL_TITLE)
        .position([0.0, 0.0], imgui::Condition::Always)
        .size(display_size, imgui::Condition::Always)
        .title_bar(false)
        .resizable(false)
        .movable(false)
        .collapsible(false)
        .build(|| {
            if actors.is_empty() {
                ui.text_disabled("No surfaces loaded");
                return;
            }
            let values = slider_values(actors);
            for (index, mut value) in values.into_iter().enumerate() {
                ui.text(actors[index].name());
                ui.set_next_item_width(-1.0);
                if ui.slider(format!("##opacity{index}"), SLIDER_MIN, SLIDER_MAX, &mut value) {
                    changes.extend(apply_slider(actors, index, value));
                }
                ui.spacing();
            }
        });

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::SurfaceMesh, io::NamedSurface, scene::build_actors};

    fn actors(names: &[&str]) -> Vec<SurfaceActor> {
        let surfaces = names
            .iter()
            .map(|name| NamedSurface {
                name: name.to_string(),
                mesh: SurfaceMesh::default(),
            })
            .collect();
        build_actors(surfaces, 0.8)
    }

    #[test]
    fn test_slider_maps_to_tenths() {
        for v in SLIDER_MIN..=SLIDER_MAX {
            assert_eq!(slider_to_opacity(v), v as f32 / 10.0);
        }
        assert_eq!(slider_to_opacity(1), 0.1);
        assert_eq!(slider_to_opacity(10), 1.0);
    }

    #[test]
    fn test_initial_slider_positions() {
        let actors = actors(&["cochlea.vtk", "nerve.vtk"]);
        assert_eq!(slider_values(&actors), vec![8, 8]);
        assert_eq!(opacity_to_slider(0.0), 1);
        assert_eq!(opacity_to_slider(0.04), 1);
        assert_eq!(opacity_to_slider(0.55), 6);
    }

    #[test]
    fn test_apply_slider_updates_one_actor() {
        let mut actors = actors(&["cochlea.vtk", "nerve.vtk"]);
        let change = apply_slider(&mut actors, 1, 3).unwrap();
        assert_eq!(change.name, "nerve.vtk");
        assert_eq!(change.opacity, 0.3);
        assert_eq!(actors[1].opacity(), 0.3);
        assert_eq!(actors[0].opacity(), 0.8);
    }

    #[test]
    fn test_apply_slider_ignores_no_ops() {
        let mut actors = actors(&["cochlea.vtk"]);
        assert_eq!(apply_slider(&mut actors, 0, 8), None);
        assert_eq!(apply_slider(&mut actors, 5, 3), None);
        let change = apply_slider(&mut actors, 0, 42).unwrap();
        assert_eq!(change.opacity, 1.0);
    }
}
