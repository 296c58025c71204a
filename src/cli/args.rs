use crate::config::DEFAULT_SETTINGS_PATH;
use clap::Parser;

/// Output directory used when none is given, remote mode
pub const DEFAULT_OUTPUT_DIR: &str = "docs";

/// Output directory used when none is given, local mode
pub const DEFAULT_LOCAL_OUTPUT_DIR: &str = "output";

/// Auth token used when none is given, remote mode
pub const DEFAULT_AUTH_TOKEN: &str = "default-token";

/// Auth token used when none is given, local mode
pub const DEFAULT_LOCAL_AUTH_TOKEN: &str = "local-test";

/// Command-line arguments for clashgraft
#[derive(Parser, Debug, Clone)]
#[command(name = "clashgraft")]
#[command(about = "Merge proxy subscriptions and rule lists into one Clash configuration")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Read categories from local directories instead of the repository API
    #[arg(long)]
    pub local: bool,

    /// Settings file path
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_PATH)]
    pub settings: String,

    /// Directory the generated files are written to [default: docs, or output with --local]
    #[arg(long, value_name = "DIR", env = "OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Token embedded in generated file names [default: default-token, or local-test with --local]
    #[arg(long, value_name = "TOKEN", env = "AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Repository API token, required unless --local
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Repository owner, overrides the settings file
    #[arg(long, value_name = "OWNER", env = "REPO_OWNER")]
    pub repo_owner: Option<String>,

    /// Repository name, overrides the settings file
    #[arg(long, value_name = "NAME", env = "REPO_NAME")]
    pub repo_name: Option<String>,

    /// Comma-separated absolute YAML URLs prefixed to every profile
    #[arg(long, value_name = "LIST", env = "REMOTE_YAMLS")]
    pub remote_yamls: Option<String>,

    /// Profile spec added to the settings file's, e.g. "home|fconfs;work|fconfs-work"
    #[arg(long, value_name = "SPEC", env = "FCONFS_DIRECTORIES")]
    pub fconfs_directories: Option<String>,

    /// Merge and report statistics without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Output directory after mode defaults
    #[must_use]
    pub fn output_dir(&self) -> &str {
        non_empty(self.output_dir.as_deref()).unwrap_or(if self.local {
            DEFAULT_LOCAL_OUTPUT_DIR
        } else {
            DEFAULT_OUTPUT_DIR
        })
    }

    /// Auth token after mode defaults
    #[must_use]
    pub fn auth_token(&self) -> &str {
        non_empty(self.auth_token.as_deref()).unwrap_or(if self.local {
            DEFAULT_LOCAL_AUTH_TOKEN
        } else {
            DEFAULT_AUTH_TOKEN
        })
    }

    /// Repository API token, if set and not blank
    #[must_use]
    pub fn github_token(&self) -> Option<&str> {
        non_empty(self.github_token.as_deref())
    }
}

/// Treat blank values, as left by empty environment variables, as unset
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("clashgraft").chain(args.iter().copied()))
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn local_mode_defaults() {
        let args = parse(&["--local", "--output-dir", "", "--auth-token", ""]);
        assert_eq!(args.output_dir(), "output");
        assert_eq!(args.auth_token(), "local-test");
        assert_eq!(args.settings, "config/settings.yaml");
    }

    #[test]
    fn remote_mode_defaults() {
        let args = parse(&["--output-dir", "", "--auth-token", ""]);
        assert_eq!(args.output_dir(), "docs");
        assert_eq!(args.auth_token(), "default-token");
    }

    #[test]
    fn explicit_values_win() {
        let args = parse(&["--local", "--output-dir", "out", "--auth-token", "abc"]);
        assert_eq!(args.output_dir(), "out");
        assert_eq!(args.auth_token(), "abc");
    }

    #[test]
    fn blank_github_token_is_unset() {
        let args = parse(&["--github-token", "  "]);
        assert_eq!(args.github_token(), None);
    }
}
