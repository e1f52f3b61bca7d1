use crate::config::PlotSettings;
use gibbsviz::engine::grid::SurfaceSet;
use plotly::common::{ColorScale, ColorScalePalette, Title};
use plotly::layout::{Axis, Camera, Eye, Layout, LayoutScene};
use plotly::surface::Lighting;
use plotly::{Plot, Surface};
use tracing::debug;

/// Colour scale convention: warm for the liquid, green for FCC, blue for BCC.
/// The boolean selects a reversed scale.
fn palette_for(phase: &str) -> (ColorScalePalette, bool) {
    let upper = phase.to_ascii_uppercase();
    if upper.contains("LIQ") {
        (ColorScalePalette::Reds, true)
    } else if upper.starts_with("FCC") {
        (ColorScalePalette::Greens, false)
    } else if upper.starts_with("BCC") {
        (ColorScalePalette::Blues, false)
    } else {
        (ColorScalePalette::Viridis, false)
    }
}

/// Builds the 3D figure: one surface trace per phase over the shared
/// temperature (x) and composition (y) axes, z clipped at zero so the
/// stable low-energy sheets stay in view.
pub fn build_figure(set: &SurfaceSet, settings: &PlotSettings) -> Plot {
    let z_floor = settings.z_floor.unwrap_or_else(|| set.global_min());
    debug!(z_floor, "Building figure for {} surfaces", set.surfaces.len());

    let mut plot = Plot::new();
    for surface in &set.surfaces {
        let (palette, reversed) = palette_for(&surface.phase);
        let z: Vec<Vec<f64>> = (0..set.compositions.len())
            .map(|i| {
                (0..set.temperatures.len())
                    .map(|j| surface.values[(i, j)])
                    .collect()
            })
            .collect();
        let trace = Surface::new(z)
            .x(set.temperatures.clone())
            .y(set.compositions.clone())
            .name(&surface.phase)
            .color_scale(ColorScale::Palette(palette))
            .reverse_scale(reversed)
            .show_scale(false)
            .opacity(1.0)
            .lighting(Lighting::new().ambient(0.8).diffuse(0.9));
        plot.add_trace(trace);
    }

    let scene = LayoutScene::new()
        .x_axis(Axis::new().title("Temperature (K)"))
        .y_axis(Axis::new().title("mole fraction"))
        .z_axis(
            Axis::new()
                .title("Gibbs Free Energy (J/mol)")
                .range(vec![z_floor, 0.0]),
        )
        .camera(Camera::new().eye(Eye::new().x(0.0).y(-2.5).z(0.5)));

    let layout = Layout::new()
        .title(Title::with_text(settings.title.clone()))
        .scene(scene)
        .width(settings.width)
        .height(settings.height);
    plot.set_layout(layout);
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use gibbsviz::engine::grid::PhaseSurface;
    use nalgebra::DMatrix;

    fn sample_set() -> SurfaceSet {
        SurfaceSet {
            compositions: vec![0.0, 0.5, 1.0],
            temperatures: vec![300.0, 900.0],
            surfaces: vec![
                PhaseSurface {
                    phase: "LIQUID".to_string(),
                    values: DMatrix::from_element(3, 2, -1000.0),
                },
                PhaseSurface {
                    phase: "BCC_A2".to_string(),
                    values: DMatrix::from_element(3, 2, -2500.0),
                },
            ],
        }
    }

    #[test]
    fn palettes_follow_the_phase_convention() {
        assert!(matches!(
            palette_for("LIQUID"),
            (ColorScalePalette::Reds, true)
        ));
        assert!(matches!(
            palette_for("FCC_A1"),
            (ColorScalePalette::Greens, false)
        ));
        assert!(matches!(
            palette_for("BCC_A2"),
            (ColorScalePalette::Blues, false)
        ));
        assert!(matches!(
            palette_for("SIGMA"),
            (ColorScalePalette::Viridis, false)
        ));
    }

    #[test]
    fn figure_contains_one_trace_per_phase() {
        let set = sample_set();
        let plot = build_figure(&set, &PlotSettings::default());
        let json = plot.to_json();
        assert!(json.contains("LIQUID"));
        assert!(json.contains("BCC_A2"));
        assert!(json.contains("Temperature (K)"));
    }

    #[test]
    fn explicit_z_floor_overrides_the_surface_minimum() {
        let set = sample_set();
        let settings = PlotSettings {
            z_floor: Some(-60000.0),
            ..PlotSettings::default()
        };
        let json = build_figure(&set, &settings).to_json();
        assert!(json.contains("-60000"));
    }
}
