use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// What a click on a hole does while the jump tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoleJumpPolicy {
    /// Leave the hole untouched.
    #[default]
    Ignore,
    /// Replace the hole with a jumper on the same cube.
    ConvertToJumper,
}

impl HoleJumpPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ignore" | "none" | "noop" => Some(HoleJumpPolicy::Ignore),
            "convert" | "jumper" => Some(HoleJumpPolicy::ConvertToJumper),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Filter used when RUST_LOG is unset
    pub default_filter: String,
    /// Rolling log file; None keeps logging on stderr only
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            file: Some(PathBuf::from("logs/escher.log")),
        }
    }
}

/// An environment override that was present but could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOverride {
    pub key: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl RejectedOverride {
    /// Reports every rejection; call once the subscriber is installed.
    pub fn warn_all(rejected: &[RejectedOverride]) {
        for r in rejected {
            tracing::warn!("{r}");
        }
    }
}

impl fmt::Display for RejectedOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ignoring {}={:?}, expected {}", self.key, self.value, self.expected)
    }
}

/// Tunables for an editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Half-extent of a cube; the cube lattice step is twice this.
    pub cube_size: f32,
    /// Scale of holes, jumpers and actors.
    pub sub_object_size: f32,
    /// Cubes farther apart than this never occlude each other's contour.
    pub contour_range: f32,
    /// Occluding hits at or beyond this distance along an edge are ignored.
    pub occlusion_limit: f32,
    pub orbit_radius: f32,
    pub menu_drag_hold: Duration,
    /// Camera rotation per frame for a held key, in full turns.
    pub keyboard_rotation_step: f32,
    pub hole_click_with_jump: HoleJumpPolicy,
    pub log: LogConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            cube_size: 2.0,
            sub_object_size: 1.0,
            contour_range: 4.0,
            occlusion_limit: 4.0,
            orbit_radius: 20.0,
            menu_drag_hold: Duration::from_millis(300),
            keyboard_rotation_step: 0.005,
            hole_click_with_jump: HoleJumpPolicy::Ignore,
            log: LogConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Defaults overridden by ESCHER_* environment variables, plus the
    /// overrides that were skipped. Nothing is logged here since logging
    /// depends on the result; see [`RejectedOverride::warn_all`].
    pub fn from_env() -> (Self, Vec<RejectedOverride>) {
        let mut config = Self::default();
        let rejected = config.apply_overrides(|key| env::var(key).ok());
        (config, rejected)
    }

    /// Applies overrides from any key/value source. Bad values are skipped and returned.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<RejectedOverride>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        if let Some(value) = lookup("ESCHER_HOLE_JUMP") {
            match HoleJumpPolicy::parse(&value) {
                Some(policy) => self.hole_click_with_jump = policy,
                None => rejected.push(RejectedOverride { key: "ESCHER_HOLE_JUMP", value, expected: "ignore|convert" }),
            }
        }

        if let Some(value) = lookup("ESCHER_CUBE_SIZE") {
            match value.trim().parse::<f32>() {
                Ok(size) if size > 0.0 && size.is_finite() => self.cube_size = size,
                _ => rejected.push(RejectedOverride { key: "ESCHER_CUBE_SIZE", value, expected: "a positive number" }),
            }
        }

        if let Some(value) = lookup("ESCHER_LOG_FILE") {
            self.log.file = if value.trim().is_empty() { None } else { Some(PathBuf::from(value)) };
        }

        rejected
    }

    /// Spacing of the cube lattice.
    pub fn lattice_step(&self) -> f32 {
        2.0 * self.cube_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides_with_rejections(pairs: &[(&str, &str)]) -> (EditorConfig, Vec<RejectedOverride>) {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let mut config = EditorConfig::default();
        let rejected = config.apply_overrides(|key| map.get(key).cloned());
        (config, rejected)
    }

    fn overrides(pairs: &[(&str, &str)]) -> EditorConfig {
        overrides_with_rejections(pairs).0
    }

    #[test]
    fn hole_policy_is_configurable() {
        assert_eq!(overrides(&[]).hole_click_with_jump, HoleJumpPolicy::Ignore);
        assert_eq!(
            overrides(&[("ESCHER_HOLE_JUMP", "Convert")]).hole_click_with_jump,
            HoleJumpPolicy::ConvertToJumper
        );
    }

    #[test]
    fn invalid_overrides_keep_defaults() {
        let config = overrides(&[("ESCHER_HOLE_JUMP", "sometimes"), ("ESCHER_CUBE_SIZE", "-3")]);
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn rejected_overrides_are_reported_for_later_logging() {
        let (_, rejected) = overrides_with_rejections(&[
            ("ESCHER_HOLE_JUMP", "sometimes"),
            ("ESCHER_CUBE_SIZE", "-3"),
            ("ESCHER_LOG_FILE", "editor.log"),
        ]);
        let keys: Vec<_> = rejected.iter().map(|r| r.key).collect();
        assert_eq!(keys, ["ESCHER_HOLE_JUMP", "ESCHER_CUBE_SIZE"]);
        assert_eq!(rejected[0].value, "sometimes");
        assert_eq!(rejected[1].to_string(), "ignoring ESCHER_CUBE_SIZE=\"-3\", expected a positive number");

        let (_, none) = overrides_with_rejections(&[("ESCHER_HOLE_JUMP", "convert"), ("ESCHER_CUBE_SIZE", "1.5")]);
        assert!(none.is_empty());
    }

    #[test]
    fn empty_log_file_disables_file_logging() {
        assert!(overrides(&[("ESCHER_LOG_FILE", "")]).log.file.is_none());
        assert_eq!(overrides(&[("ESCHER_CUBE_SIZE", "1")]).lattice_step(), 2.0);
    }
}
