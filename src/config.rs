// config.rs — viewer settings
//
// Layers, later wins:
// - built-in defaults
// - JSON file: --config <path>, else <exe_dir>/panorama.json, else ./panorama.json
// - env: PANORAMA_IMAGE
// - CLI: --stacks N --slices N --radius R --fov DEG --yaw DEG --pitch DEG [image]

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use serde::Deserialize;

use crate::camera::Camera;
use crate::error::ConfigurationError;
use crate::mesh::SphereSpec;

const CONFIG_FILE: &str = "panorama.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub stacks: u32,
    pub slices: u32,
    pub radius: f32,
    pub fov_deg: f32,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub image: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            stacks: 64,
            slices: 128,
            radius: 10.0,
            fov_deg: 75.0,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            image: None,
        }
    }
}

impl ViewerConfig {
    /// Resolve from the process arguments and environment.
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::from_sources(
            std::env::args().skip(1),
            std::env::var("PANORAMA_IMAGE").ok(),
        )
    }

    pub fn from_sources<I>(args: I, env_image: Option<String>) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        let file = match flag_value(&args, "--config") {
            Some(path) => Some(PathBuf::from(path)),
            None => find_config_file(),
        };
        let mut config = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(image) = env_image.filter(|v| !v.trim().is_empty()) {
            config.image = Some(PathBuf::from(image));
        }

        config.apply_args(&args)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let invalid = |err: String| ConfigurationError::InvalidValue {
            key: "config".to_string(),
            value: format!("{}: {err}", path.display()),
        };

        let text = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let config = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
        debug!("loaded viewer config from {}", path.display());
        Ok(config)
    }

    fn apply_args(&mut self, args: &[String]) -> Result<(), ConfigurationError> {
        let mut it = args.iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--stacks" => self.stacks = parse_value(arg, it.next())?,
                "--slices" => self.slices = parse_value(arg, it.next())?,
                "--radius" => self.radius = parse_value(arg, it.next())?,
                "--fov" => self.fov_deg = parse_value(arg, it.next())?,
                "--yaw" => self.yaw_deg = parse_value(arg, it.next())?,
                "--pitch" => self.pitch_deg = parse_value(arg, it.next())?,
                "--config" => {
                    it.next();
                }
                flag if flag.starts_with("--") => {
                    return Err(ConfigurationError::InvalidValue {
                        key: flag.to_string(),
                        value: "unknown option".to_string(),
                    });
                }
                path => self.image = Some(PathBuf::from(path)),
            }
        }
        Ok(())
    }

    pub fn sphere_spec(&self) -> Result<SphereSpec, ConfigurationError> {
        SphereSpec::new(self.stacks, self.slices, self.radius)
    }

    pub fn camera(&self, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(self.yaw_deg, self.pitch_deg, self.fov_deg, 1.0);
        camera.set_viewport(width, height);
        camera
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// <exe_dir>/panorama.json, then ./panorama.json
fn find_config_file() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join(CONFIG_FILE);
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from(CONFIG_FILE);
    if p.exists() {
        return Some(p);
    }

    None
}

fn parse_value<T: FromStr>(key: &str, value: Option<&String>) -> Result<T, ConfigurationError> {
    let invalid = |value: &str| ConfigurationError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    let raw = value.ok_or_else(|| invalid("<missing>"))?;
    raw.parse().map_err(|_| invalid(raw.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_build_valid_spec() {
        let config = ViewerConfig::default();
        let spec = config.sphere_spec().unwrap();
        assert_eq!((spec.stacks(), spec.slices()), (64, 128));
        assert_eq!(spec.radius(), 10.0);
    }

    #[test]
    fn test_cli_overrides() {
        let config = ViewerConfig::from_sources(
            args(&["--stacks", "8", "--slices", "16", "--radius", "2.5", "--fov", "90", "pano.jpg"]),
            None,
        )
        .unwrap();
        assert_eq!(config.stacks, 8);
        assert_eq!(config.slices, 16);
        assert_eq!(config.radius, 2.5);
        assert_eq!(config.fov_deg, 90.0);
        assert_eq!(config.image, Some(PathBuf::from("pano.jpg")));
    }

    #[test]
    fn test_env_image_then_cli_wins() {
        let from_env = ViewerConfig::from_sources(args(&[]), Some("env.png".into())).unwrap();
        assert_eq!(from_env.image, Some(PathBuf::from("env.png")));

        let blank = ViewerConfig::from_sources(args(&[]), Some("  ".into())).unwrap();
        assert_eq!(blank.image, None);

        let cli = ViewerConfig::from_sources(args(&["cli.png"]), Some("env.png".into())).unwrap();
        assert_eq!(cli.image, Some(PathBuf::from("cli.png")));
    }

    #[test]
    fn test_bad_values() {
        let err = ViewerConfig::from_sources(args(&["--stacks", "many"]), None).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidValue {
                key: "--stacks".into(),
                value: "many".into()
            }
        );

        let err = ViewerConfig::from_sources(args(&["--radius"]), None).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { ref value, .. } if value == "<missing>"));

        let err = ViewerConfig::from_sources(args(&["--wat"]), None).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { ref key, .. } if key == "--wat"));
    }

    #[test]
    fn test_invalid_spec_not_clamped() {
        let config = ViewerConfig::from_sources(args(&["--stacks", "1"]), None).unwrap();
        assert_eq!(config.sphere_spec(), Err(ConfigurationError::TooFewStacks(1)));
    }

    #[test]
    fn test_config_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(&path, r#"{ "slices": 48, "yaw_deg": 45.0, "image": "a.jpg" }"#).unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let config =
            ViewerConfig::from_sources(args(&["--config", &path_arg, "--stacks", "12"]), None)
                .unwrap();
        assert_eq!(config.slices, 48);
        assert_eq!(config.stacks, 12);
        assert_eq!(config.yaw_deg, 45.0);
        assert_eq!(config.radius, 10.0);
        assert_eq!(config.image, Some(PathBuf::from("a.jpg")));
    }

    #[test]
    fn test_config_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(ViewerConfig::from_file(&broken).is_err());
        assert!(ViewerConfig::from_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_camera_from_config() {
        let config = ViewerConfig {
            yaw_deg: 30.0,
            pitch_deg: -10.0,
            fov_deg: 60.0,
            ..ViewerConfig::default()
        };
        let camera = config.camera(1920, 1080);
        assert_eq!(camera.yaw, 30.0);
        assert_eq!(camera.pitch, -10.0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
