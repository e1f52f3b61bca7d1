use crate::cli::PlotArgs;
use crate::error::{CliError, Result};
use gibbsviz::engine::config::SurfaceConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_ELEMENTS: [&str; 2] = ["FE", "NI"];
const DEFAULT_TITLE: &str = "Gibbs Free Energy vs Temperature and Composition";
const DEFAULT_WIDTH: usize = 900;
const DEFAULT_HEIGHT: usize = 700;

/// Optional TOML configuration file; every field can be overridden from the
/// command line.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub elements: Option<Vec<String>>,
    pub phases: Option<Vec<String>>,
    pub composition: Option<FileCompositionRange>,
    pub temperature: Option<FileTemperatureRange>,
    pub plot: Option<FilePlotSettings>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileCompositionRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub interval: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileTemperatureRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub points: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePlotSettings {
    pub title: Option<String>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub z_floor: Option<f64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| CliError::FileParsing {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
        debug!("Loaded configuration file: {:?}", config);
        Ok(config)
    }
}

/// Figure styling after merging defaults, file and CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub title: String,
    pub width: usize,
    pub height: usize,
    /// Overrides the z-axis floor; defaults to the global surface minimum.
    pub z_floor: Option<f64>,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            z_floor: None,
        }
    }
}

/// Everything the `plot` command needs after merging defaults, the optional
/// configuration file and CLI overrides (CLI wins).
#[derive(Debug)]
pub struct AppConfig {
    pub elements: [String; 2],
    pub surface: SurfaceConfig,
    pub plot: PlotSettings,
}

pub fn resolve(args: &PlotArgs) -> Result<AppConfig> {
    let file = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let elements = resolve_elements(args.elements.as_deref(), file.elements.as_deref())?;

    let file_comp = file.composition.unwrap_or_default();
    let file_temp = file.temperature.unwrap_or_default();

    let mut builder = SurfaceConfig::builder();
    if let Some(v) = args.comp_min.or(file_comp.min) {
        builder = builder.composition_min(v);
    }
    if let Some(v) = args.comp_max.or(file_comp.max) {
        builder = builder.composition_max(v);
    }
    if let Some(v) = args.comp_interval.or(file_comp.interval) {
        builder = builder.composition_interval(v);
    }
    if let Some(v) = args.t_min.or(file_temp.min) {
        builder = builder.temperature_min(v);
    }
    if let Some(v) = args.t_max.or(file_temp.max) {
        builder = builder.temperature_max(v);
    }
    if let Some(v) = args.t_points.or(file_temp.points) {
        builder = builder.temperature_points(v);
    }
    if let Some(phases) = args.phases.clone().or(file.phases) {
        builder = builder.phases(phases);
    }
    let surface = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let file_plot = file.plot.unwrap_or_default();
    let defaults = PlotSettings::default();
    let plot = PlotSettings {
        title: file_plot.title.unwrap_or(defaults.title),
        width: file_plot.width.unwrap_or(defaults.width),
        height: file_plot.height.unwrap_or(defaults.height),
        z_floor: file_plot.z_floor,
    };

    Ok(AppConfig {
        elements,
        surface,
        plot,
    })
}

fn resolve_elements(
    cli: Option<&[String]>,
    file: Option<&[String]>,
) -> Result<[String; 2]> {
    let chosen = cli.or(file);
    match chosen {
        None => Ok([
            DEFAULT_ELEMENTS[0].to_string(),
            DEFAULT_ELEMENTS[1].to_string(),
        ]),
        Some([a, b]) => {
            if a.eq_ignore_ascii_case(b) {
                return Err(CliError::Config(format!(
                    "the two elements must differ (got '{a}' twice)"
                )));
            }
            Ok([a.to_ascii_uppercase(), b.to_ascii_uppercase()])
        }
        Some(other) => Err(CliError::Config(format!(
            "expected exactly two elements, got {}",
            other.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn plot_args() -> PlotArgs {
        PlotArgs {
            database: PathBuf::from("FeNi.TDB"),
            output: PathBuf::from("out.html"),
            config: None,
            elements: None,
            phases: None,
            comp_min: None,
            comp_max: None,
            comp_interval: None,
            t_min: None,
            t_max: None,
            t_points: None,
            export_csv: None,
            open: false,
        }
    }

    #[test]
    fn resolves_defaults_without_a_config_file() {
        let config = resolve(&plot_args()).unwrap();
        assert_eq!(config.elements, ["FE", "NI"]);
        assert_eq!(config.surface.composition.interval, 0.05);
        assert_eq!(config.plot.width, 900);
        assert_eq!(config.plot.z_floor, None);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
elements = ["CR", "CO"]
phases = ["LIQUID"]

[temperature]
max = 2000.0

[plot]
title = "Cr-Co"
z-floor = -60000.0
"#,
        )
        .unwrap();

        let mut args = plot_args();
        args.config = Some(path);
        let config = resolve(&args).unwrap();
        assert_eq!(config.elements, ["CR", "CO"]);
        assert_eq!(config.surface.phases, vec!["LIQUID"]);
        assert_eq!(config.surface.temperature.max, 2000.0);
        assert_eq!(config.plot.title, "Cr-Co");
        assert_eq!(config.plot.z_floor, Some(-60000.0));
    }

    #[test]
    fn cli_overrides_beat_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[temperature]\nmax = 2000.0\n").unwrap();

        let mut args = plot_args();
        args.config = Some(path);
        args.t_max = Some(1800.0);
        args.elements = Some(vec!["AL".to_string(), "zn".to_string()]);
        let config = resolve(&args).unwrap();
        assert_eq!(config.surface.temperature.max, 1800.0);
        assert_eq!(config.elements, ["AL", "ZN"]);
    }

    #[test]
    fn invalid_merged_ranges_are_reported_as_config_errors() {
        let mut args = plot_args();
        args.comp_min = Some(0.9);
        args.comp_max = Some(0.1);
        let result = resolve(&args);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn identical_elements_are_rejected() {
        let mut args = plot_args();
        args.elements = Some(vec!["FE".to_string(), "fe".to_string()]);
        let result = resolve(&args);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_a_file_parsing_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not toml").unwrap();

        let mut args = plot_args();
        args.config = Some(path);
        let result = resolve(&args);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "no-such-key = 1\n").unwrap();

        let mut args = plot_args();
        args.config = Some(path);
        assert!(matches!(
            resolve(&args),
            Err(CliError::FileParsing { .. })
        ));
    }
}
