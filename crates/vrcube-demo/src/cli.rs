use clap::{Parser, ValueEnum};
use winit::dpi::LogicalSize;

use vrcube_app::config::{AppConfig, ColorScheme, LightOrbit, RenderMode, SceneConfig};
use vrcube_engine::logging::LoggingConfig;
use vrcube_engine::window::RuntimeConfig;

#[derive(Parser, Debug)]
#[command(
    name = "vrcube",
    author,
    version,
    about = "Lit, animated cube rendered on one or more windows"
)]
pub struct Cli {
    /// Number of windows, tiled left to right as one display wall.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=16))]
    pub windows: u32,

    /// Per-vertex color scheme of the cube.
    #[arg(long, value_enum, default_value_t = Colors::Face)]
    pub colors: Colors,

    /// `single`, or an instanced grid `grid:COLUMNSxROWS`.
    #[arg(long, value_name = "MODE", default_value = "single", value_parser = parse_mode)]
    pub mode: Mode,

    /// Distance between grid instances, in model units.
    #[arg(long, value_name = "UNITS", default_value_t = 3.0)]
    pub spacing: f32,

    /// Radius of the orbiting light.
    #[arg(long, value_name = "UNITS", default_value_t = 0.2)]
    pub orbit_radius: f32,

    /// Angular speed of the orbiting light, in radians per second.
    #[arg(long, value_name = "RAD_PER_S", default_value_t = 20.0)]
    pub orbit_speed: f32,

    /// Keep every light where it starts.
    #[arg(long)]
    pub no_orbit: bool,

    /// Seconds of simulated time between FPS reports.
    #[arg(long, value_name = "SECONDS", default_value_t = 3.0)]
    pub fps_delay: f64,

    /// Size of every window, in logical pixels.
    #[arg(long, value_name = "WIDTHxHEIGHT", default_value = "960x540", value_parser = parse_size)]
    pub size: LogicalSize<f64>,

    /// Log filter in `env_logger` syntax (e.g. `vrcube_app=debug`). Overrides `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum Colors {
    Corner,
    Face,
    White,
}

impl From<Colors> for ColorScheme {
    fn from(colors: Colors) -> Self {
        match colors {
            Colors::Corner => ColorScheme::Corner,
            Colors::Face => ColorScheme::Face,
            Colors::White => ColorScheme::Uniform,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Mode {
    Single,
    Grid { columns: u32, rows: u32 },
}

fn parse_mode(raw: &str) -> Result<Mode, String> {
    if raw.eq_ignore_ascii_case("single") {
        return Ok(Mode::Single);
    }
    let dims = raw
        .strip_prefix("grid:")
        .ok_or_else(|| format!("expected `single` or `grid:COLUMNSxROWS`, got `{raw}`"))?;
    let (columns, rows) = parse_pair(dims)?;
    if columns == 0 || rows == 0 {
        return Err("grid needs at least one column and one row".to_string());
    }
    Ok(Mode::Grid { columns, rows })
}

fn parse_size(raw: &str) -> Result<LogicalSize<f64>, String> {
    let (width, height) = parse_pair(raw)?;
    if width == 0 || height == 0 {
        return Err("window size must be non-zero".to_string());
    }
    Ok(LogicalSize::new(f64::from(width), f64::from(height)))
}

fn parse_pair(raw: &str) -> Result<(u32, u32), String> {
    let (a, b) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected `AxB`, got `{raw}`"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid number `{s}`: {e}"))
    };
    Ok((parse(a)?, parse(b)?))
}

impl Cli {
    pub fn app_config(&self) -> AppConfig {
        let render_mode = match self.mode {
            Mode::Single => RenderMode::Single,
            Mode::Grid { columns, rows } => RenderMode::Instanced {
                columns,
                rows,
                spacing: self.spacing,
            },
        };

        let light_orbit = (!self.no_orbit).then(|| LightOrbit {
            radius: self.orbit_radius,
            angular_speed: self.orbit_speed,
            ..LightOrbit::default()
        });

        AppConfig {
            scene: SceneConfig {
                color_scheme: self.colors.into(),
                render_mode,
                light_orbit,
                fps_delay: self.fps_delay,
            },
            ..AppConfig::default()
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            window_size: self.size,
            windows: self.windows,
            ..RuntimeConfig::default()
        }
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.clone(),
            ..LoggingConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_demo() {
        let cli = Cli::parse_from(["vrcube"]);
        let config = cli.app_config();

        assert_eq!(config, AppConfig::default());
        assert_eq!(cli.runtime_config().windows, 1);
    }

    #[test]
    fn grid_mode_becomes_instanced_rendering() {
        let cli = Cli::parse_from(["vrcube", "--mode", "grid:4x3", "--spacing", "2.5"]);
        assert_eq!(
            cli.app_config().scene.render_mode,
            RenderMode::Instanced {
                columns: 4,
                rows: 3,
                spacing: 2.5
            }
        );
    }

    #[test]
    fn white_colors_and_no_orbit() {
        let cli = Cli::parse_from(["vrcube", "--colors", "white", "--no-orbit"]);
        let scene = cli.app_config().scene;
        assert_eq!(scene.color_scheme, ColorScheme::Uniform);
        assert_eq!(scene.light_orbit, None);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(Cli::try_parse_from(["vrcube", "--mode", "grid:0x3"]).is_err());
        assert!(Cli::try_parse_from(["vrcube", "--mode", "tiles"]).is_err());
        assert!(Cli::try_parse_from(["vrcube", "--size", "800by600"]).is_err());
        assert!(Cli::try_parse_from(["vrcube", "--windows", "0"]).is_err());
    }

    #[test]
    fn size_parses_both_separators() {
        let cli = Cli::parse_from(["vrcube", "--size", "1280X720", "--windows", "3"]);
        let runtime = cli.runtime_config();
        assert_eq!(runtime.window_size, LogicalSize::new(1280.0, 720.0));
        assert_eq!(runtime.windows, 3);
    }
}
