//! TOML config loading for the flow CLI.
//!
//! Deserializes `configs/flow.toml` which has `[session]` and `[flow]` sections,
//! then merges with CLI overrides.

use std::path::{Path, PathBuf};

use abc_repl::{CommandFlags, HelperCommand, ProtocolVersion, SessionConfig};
use anyhow::Context;
use serde::Deserialize;

/// Top-level structure matching `configs/flow.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct FlowToml {
    /// ABC session overrides (executable comes from auto-discovery when unset).
    #[serde(default)]
    pub session: SessionOverrides,
    /// Steps to run after the circuit is loaded.
    #[serde(default)]
    pub flow: FlowConfig,
}

/// Optional overrides for `SessionConfig` fields.
#[derive(Debug, Default, Deserialize)]
pub struct SessionOverrides {
    pub executable: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub working_dir: Option<PathBuf>,
    pub training: Option<bool>,
    pub protocol: Option<ProtocolVersion>,
    pub banner_lines: Option<usize>,
    pub quit_timeout_secs: Option<u64>,
    pub max_block_lines: Option<usize>,
    pub stats_helper: Option<HelperCommand>,
}

/// Ordered list of optimization steps.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    #[serde(default = "default_steps")]
    pub steps: Vec<FlowStep>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
        }
    }
}

/// One step of a flow, tagged by `op` in TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FlowStep {
    Stats,
    Balance,
    Rewrite {
        #[serde(default = "default_true")]
        preserve_levels: bool,
        #[serde(default)]
        zero_cost: bool,
        #[serde(default)]
        verbose: bool,
    },
    Resub {
        #[serde(default = "default_true")]
        preserve_levels: bool,
        #[serde(default)]
        zero_cost: bool,
    },
    Refactor {
        #[serde(default = "default_true")]
        preserve_levels: bool,
        #[serde(default)]
        zero_cost: bool,
    },
    Cec,
}

impl FlowStep {
    /// Switches for transformation steps; defaults for the rest.
    pub fn flags(&self) -> CommandFlags {
        match *self {
            FlowStep::Rewrite {
                preserve_levels,
                zero_cost,
                verbose,
            } => CommandFlags {
                preserve_levels,
                zero_cost,
                verbose,
            },
            FlowStep::Resub {
                preserve_levels,
                zero_cost,
            }
            | FlowStep::Refactor {
                preserve_levels,
                zero_cost,
            } => CommandFlags {
                preserve_levels,
                zero_cost,
                verbose: false,
            },
            _ => CommandFlags::default(),
        }
    }

    /// Human-readable label, e.g. `rewrite -lz`.
    pub fn label(&self) -> String {
        let (name, allow_verbose) = match self {
            FlowStep::Stats => return "print_stats".to_string(),
            FlowStep::Balance => return "balance".to_string(),
            FlowStep::Cec => return "cec".to_string(),
            FlowStep::Rewrite { .. } => ("rewrite", true),
            FlowStep::Resub { .. } => ("resub", false),
            FlowStep::Refactor { .. } => ("refactor", false),
        };
        let suffix = self.flags().suffix(allow_verbose);
        if suffix.is_empty() {
            name.to_string()
        } else {
            format!("{name} {suffix}")
        }
    }
}

fn default_true() -> bool {
    true
}

/// Balance and rewrite sequence used for i10-style benchmarks.
fn default_steps() -> Vec<FlowStep> {
    let rewrite = |zero_cost| FlowStep::Rewrite {
        preserve_levels: false,
        zero_cost,
        verbose: false,
    };
    vec![
        FlowStep::Stats,
        FlowStep::Balance,
        FlowStep::Stats,
        FlowStep::Balance,
        rewrite(false),
        rewrite(true),
        FlowStep::Balance,
        rewrite(true),
        FlowStep::Balance,
        FlowStep::Stats,
    ]
}

/// Load and deserialize a `FlowToml` from a TOML file.
pub fn load_flow_toml(path: &Path) -> anyhow::Result<FlowToml> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading flow config {}", path.display()))?;
    let config: FlowToml = toml::from_str(&contents)
        .with_context(|| format!("parsing flow config {}", path.display()))?;
    tracing::info!(path = %path.display(), steps = config.flow.steps.len(), "Loaded flow config");
    Ok(config)
}

/// Build a `SessionConfig` from auto-discovery, TOML overrides, and CLI flags.
///
/// Priority chain: defaults < TOML values < CLI `--executable` / `--train`.
pub fn build_session_config(
    overrides: &SessionOverrides,
    executable_cli: Option<PathBuf>,
    training_cli: Option<bool>,
) -> anyhow::Result<SessionConfig> {
    let executable = executable_cli
        .or_else(|| overrides.executable.clone())
        .or_else(abc_repl::discover_abc)
        .ok_or_else(|| {
            anyhow::anyhow!("ABC not found; pass --executable or set ABC_EXECUTABLE")
        })?;

    let mut config = SessionConfig::new(executable);
    apply_overrides(&mut config, overrides);

    if let Some(training) = training_cli {
        config.training = training;
    }

    Ok(config)
}

fn apply_overrides(config: &mut SessionConfig, overrides: &SessionOverrides) {
    if let Some(args) = &overrides.args {
        config.args = args.clone();
    }
    if let Some(dir) = &overrides.working_dir {
        config.working_dir = Some(dir.clone());
    }
    if let Some(training) = overrides.training {
        config.training = training;
    }
    if let Some(protocol) = overrides.protocol {
        config.protocol = protocol;
    }
    if let Some(n) = overrides.banner_lines {
        config.banner_lines = n;
    }
    if let Some(n) = overrides.quit_timeout_secs {
        config.quit_timeout_secs = n;
    }
    if let Some(n) = overrides.max_block_lines {
        config.max_block_lines = n;
    }
    if let Some(helper) = &overrides.stats_helper {
        config.stats_helper = Some(helper.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_flow_toml() {
        let toml_str = r#"
[session]
executable = "/opt/abc/abc"
training = false
protocol = "legacy"
banner_lines = 2
quit_timeout_secs = 3

[session.stats_helper]
program = "abc-flow"
args = ["aig-stats"]

[[flow.steps]]
op = "balance"

[[flow.steps]]
op = "rewrite"
preserve_levels = false
zero_cost = true
verbose = true

[[flow.steps]]
op = "refactor"
zero_cost = true

[[flow.steps]]
op = "cec"
"#;
        let config: FlowToml = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.executable, Some(PathBuf::from("/opt/abc/abc")));
        assert_eq!(config.session.training, Some(false));
        assert_eq!(config.session.protocol, Some(ProtocolVersion::Legacy));
        assert_eq!(config.session.banner_lines, Some(2));
        let helper = config.session.stats_helper.unwrap();
        assert_eq!(helper.program, PathBuf::from("abc-flow"));
        assert_eq!(helper.args, vec!["aig-stats"]);

        assert_eq!(
            config.flow.steps,
            vec![
                FlowStep::Balance,
                FlowStep::Rewrite {
                    preserve_levels: false,
                    zero_cost: true,
                    verbose: true
                },
                FlowStep::Refactor {
                    preserve_levels: true,
                    zero_cost: true
                },
                FlowStep::Cec,
            ]
        );
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: FlowToml = toml::from_str("").unwrap();
        assert!(config.session.executable.is_none());
        assert_eq!(config.flow.steps.len(), 10);
        assert_eq!(config.flow.steps[0], FlowStep::Stats);
        assert_eq!(config.flow.steps.last(), Some(&FlowStep::Stats));
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let toml_str = r#"
[[flow.steps]]
op = "fraig"
"#;
        assert!(toml::from_str::<FlowToml>(toml_str).is_err());
    }

    #[test]
    fn test_cli_override_priority() {
        let overrides = SessionOverrides {
            executable: Some(PathBuf::from("/from/toml/abc")),
            training: Some(false),
            quit_timeout_secs: Some(9),
            ..SessionOverrides::default()
        };

        let config = build_session_config(&overrides, None, None).unwrap();
        assert_eq!(config.executable, PathBuf::from("/from/toml/abc"));
        assert!(!config.training);
        assert_eq!(config.quit_timeout_secs, 9);
        // Untouched fields keep their defaults.
        assert_eq!(config.banner_lines, 3);

        let config =
            build_session_config(&overrides, Some(PathBuf::from("/from/cli/abc")), Some(true))
                .unwrap();
        assert_eq!(config.executable, PathBuf::from("/from/cli/abc"));
        assert!(config.training);
    }

    #[test]
    fn test_step_labels() {
        assert_eq!(FlowStep::Balance.label(), "balance");
        assert_eq!(
            FlowStep::Rewrite {
                preserve_levels: false,
                zero_cost: true,
                verbose: false
            }
            .label(),
            "rewrite -lz"
        );
        assert_eq!(
            FlowStep::Resub {
                preserve_levels: true,
                zero_cost: false
            }
            .label(),
            "resub"
        );
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/flow.toml");
        let config = load_flow_toml(&path).unwrap();
        assert_eq!(config.flow.steps, default_steps());
        assert_eq!(config.session.training, Some(true));
    }
}
