//! Configuration file loading and CLI override merging
//!
//! Precedence: CLI flags > TOML file (`--config`) > built-in defaults.
//!
//! The file uses the same option names as [`ExecConfig::from_options`] at
//! top level, plus an `[env]` table of variables to set and an `env_remove`
//! array of variables to delete:
//!
//! ```toml
//! trim = false
//! directory = "/srv/build"
//! redirect_out_path = "build.log"
//! redirect_out_mode = "append"
//! redirect_err_to_stdout = true
//! env_remove = ["HTTP_PROXY"]
//!
//! [env]
//! LC_ALL = "C"
//! ```
//!
//! Merged values go through [`ExecConfigBuilder`], so a file is held to the
//! same validation as any other source.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use taskexec_runner::config::{keys, parse_mode};
use taskexec_runner::{ConfigError, EnvChanges, ExecConfig, ExecConfigBuilder};
use tracing::debug;

/// Execution options as written in a TOML configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub trim: Option<bool>,
    pub directory: Option<PathBuf>,
    pub redirect_out_path: Option<PathBuf>,
    pub redirect_out_mode: Option<String>,
    pub redirect_err_path: Option<PathBuf>,
    pub redirect_err_mode: Option<String>,
    pub redirect_err_to_stdout: Option<bool>,
    pub env: BTreeMap<String, String>,
    pub env_remove: Vec<String>,
}

impl FileConfig {
    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// The file cannot be read or is not valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// # Errors
    ///
    /// `content` is not valid TOML for this schema.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Options given on the command line. `None` defers to the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub trim: Option<bool>,
    pub directory: Option<PathBuf>,
    pub out_path: Option<PathBuf>,
    pub out_mode: Option<String>,
    pub err_path: Option<PathBuf>,
    pub err_mode: Option<String>,
    pub merge_stderr: Option<bool>,
    pub env: Vec<(String, String)>,
    pub unset: Vec<String>,
}

/// Merge command-line overrides over file values into a validated
/// configuration and the environment changes to apply.
///
/// Each option is resolved on its own, so a path from the command line may
/// pair with a mode from the file. Variables set on the command line replace
/// file values of the same name; removals from both sources apply.
///
/// # Errors
///
/// Any validation failure of the merged options.
pub fn resolve(
    file: &FileConfig,
    cli: &Overrides,
) -> Result<(ExecConfig, EnvChanges), ConfigError> {
    let mut builder = ExecConfigBuilder::new();

    if let Some(trim) = cli.trim.or(file.trim) {
        builder = builder.trim(trim);
    }
    if let Some(dir) = cli.directory.as_ref().or(file.directory.as_ref()) {
        builder = builder.directory(dir);
    }
    if let Some(path) = cli.out_path.as_ref().or(file.redirect_out_path.as_ref()) {
        builder = builder.redirect_out_path(path);
    }
    if let Some(mode) = cli.out_mode.as_deref().or(file.redirect_out_mode.as_deref()) {
        builder = builder.redirect_out_mode(parse_mode(keys::REDIRECT_OUT_MODE, mode)?);
    }
    if let Some(path) = cli.err_path.as_ref().or(file.redirect_err_path.as_ref()) {
        builder = builder.redirect_err_path(path);
    }
    if let Some(mode) = cli.err_mode.as_deref().or(file.redirect_err_mode.as_deref()) {
        builder = builder.redirect_err_mode(parse_mode(keys::REDIRECT_ERR_MODE, mode)?);
    }
    if let Some(merge) = cli.merge_stderr.or(file.redirect_err_to_stdout) {
        builder = builder.redirect_err_to_stdout(merge);
    }

    let env = EnvChanges::new()
        .set_all(file.env.iter())
        .set_all(cli.env.iter().map(|(k, v)| (k, v)))
        .unset_all(file.env_remove.iter().chain(&cli.unset));

    Ok((builder.build()?, env))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use taskexec_runner::{ErrorTarget, OutputTarget, RedirectMode};

    #[test]
    fn test_empty_file_is_default() {
        let file = FileConfig::parse("").unwrap();
        assert_eq!(file, FileConfig::default());

        let (config, env) = resolve(&file, &Overrides::default()).unwrap();
        assert!(config.trim);
        assert_eq!(config.stdout, OutputTarget::Capture);
        assert_eq!(config.stderr, ErrorTarget::Capture);
        assert!(env.is_empty());
    }

    #[test]
    fn test_parse_full_file() {
        let file = FileConfig::parse(
            r#"
            trim = false
            directory = "/srv"
            redirect_out_path = "out.log"
            redirect_out_mode = "APPEND"
            redirect_err_to_stdout = true
            env_remove = ["HTTP_PROXY"]

            [env]
            LC_ALL = "C"
            "#,
        )
        .unwrap();

        let (config, env) = resolve(&file, &Overrides::default()).unwrap();
        assert!(!config.trim);
        assert_eq!(config.directory(), Some(Path::new("/srv")));
        let OutputTarget::File(redirect) = &config.stdout else {
            panic!("expected stdout file redirect");
        };
        assert_eq!(redirect.mode, RedirectMode::Append);
        assert_eq!(config.stderr, ErrorTarget::MergeIntoStdout);
        assert_eq!(
            env.add.get(&OsString::from("LC_ALL")),
            Some(&OsString::from("C"))
        );
        assert!(env.remove.contains(&OsString::from("HTTP_PROXY")));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            trim: Some(false),
            directory: Some(PathBuf::from("/from/file")),
            env: BTreeMap::from([("MODE".to_string(), "file".to_string())]),
            ..FileConfig::default()
        };
        let cli = Overrides {
            trim: Some(true),
            directory: Some(PathBuf::from("/from/cli")),
            env: vec![("MODE".to_string(), "cli".to_string())],
            ..Overrides::default()
        };

        let (config, env) = resolve(&file, &cli).unwrap();
        assert!(config.trim);
        assert_eq!(config.directory(), Some(Path::new("/from/cli")));
        assert_eq!(
            env.add.get(&OsString::from("MODE")),
            Some(&OsString::from("cli"))
        );
    }

    #[test]
    fn test_cli_path_pairs_with_file_mode() {
        let file = FileConfig {
            redirect_out_mode: Some("overwrite".to_string()),
            ..FileConfig::default()
        };
        let cli = Overrides {
            out_path: Some(PathBuf::from("run.log")),
            ..Overrides::default()
        };

        let (config, _) = resolve(&file, &cli).unwrap();
        assert!(matches!(config.stdout, OutputTarget::File(_)));
    }

    #[test]
    fn test_file_values_are_validated() {
        let file = FileConfig {
            redirect_err_path: Some(PathBuf::from("err.log")),
            ..FileConfig::default()
        };
        let err = resolve(&file, &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRedirectMode { .. }));

        let file = FileConfig {
            redirect_out_path: Some(PathBuf::from("out.log")),
            redirect_out_mode: Some("sideways".to_string()),
            ..FileConfig::default()
        };
        let err = resolve(&file, &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRedirectMode { .. }));
    }

    #[test]
    fn test_unset_from_both_sources() {
        let file = FileConfig {
            env_remove: vec!["A".to_string()],
            ..FileConfig::default()
        };
        let cli = Overrides {
            unset: vec!["B".to_string()],
            ..Overrides::default()
        };
        let (_, env) = resolve(&file, &cli).unwrap();
        assert!(env.remove.contains(&OsString::from("A")));
        assert!(env.remove.contains(&OsString::from("B")));
    }

    #[test]
    fn test_wrong_type_in_file_is_parse_error() {
        assert!(FileConfig::parse("trim = \"yes\"").is_err());
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = FileConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.toml"));
    }
}
