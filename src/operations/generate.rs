//! Generate operation coordination

use crate::cli::Args;
use crate::config::profiles::split_list;
use crate::config::validation::{validate_policy, validate_profile_spec, validate_remote_yamls};
use crate::config::{DEFAULT_SETTINGS_PATH, MergePolicy, Profile, Settings, parse_profiles};
use crate::error::MergeError;
use crate::http::HttpClient;
use crate::operations::assemble::{CategoryDirectories, ConfigAssembler};
use crate::operations::output::{OutputPaths, render_document, write_output};
use crate::operations::stats::Stats;
use crate::source::{ContentSource, LocalSource, RemoteSource};
use crate::system::System;
use crate::utils::redact::redact_all;
use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where category files are read from
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceMode {
    /// Directories relative to the working directory
    Local,

    /// Repository contents API, authenticated with a token
    Remote { token: String },
}

/// Coordinates the complete generate operation
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "GenerateOperation")]
pub struct GenerateOperation<'src> {
    settings: Settings,
    policy: MergePolicy,
    profiles: Vec<Profile>,
    mode: SourceMode,
    output_dir: PathBuf,
    auth_token: String,
    dry_run: bool,
    system: &'src dyn System,
}

impl<'src> GenerateOperation<'src> {
    /// Create a new generate operation from CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A non-default settings file is missing, or any settings file is invalid
    /// - The repository token is missing in remote mode
    /// - The remote YAML list or profile spec is invalid
    #[inline]
    pub fn new(args: &Args, system: &'src dyn System) -> Result<Self> {
        let mut settings = load_settings(args, system)?;

        if let Some(owner) = &args.repo_owner {
            settings.github.owner.clone_from(owner);
        }
        if let Some(repository) = &args.repo_name {
            settings.github.repository.clone_from(repository);
        }

        let mut remote_yamls = split_list(&settings.github.fconfs_remote_yamls);
        if let Some(extra) = &args.remote_yamls {
            for url in split_list(extra) {
                if !remote_yamls.contains(&url) {
                    remote_yamls.push(url);
                }
            }
        }
        validate_remote_yamls(&remote_yamls)?;

        let spec = [
            Some(settings.github.fconfs_directories.as_str()),
            args.fconfs_directories.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(";");
        validate_profile_spec(&spec, &remote_yamls)?;
        let profiles = parse_profiles(&spec, &remote_yamls)?;

        let policy = settings.merge_policy();
        validate_policy(&policy)?;

        let mode = if args.local {
            SourceMode::Local
        } else {
            let token = args.github_token().ok_or_else(|| {
                MergeError::configuration(
                    "GITHUB_TOKEN is not set. Provide --github-token or run with --local",
                )
            })?;
            SourceMode::Remote {
                token: token.to_owned(),
            }
        };

        debug!("Profiles: {profiles:?}");
        debug!("Policy: {policy:?}");

        Ok(GenerateOperation {
            settings,
            policy,
            profiles,
            mode,
            output_dir: PathBuf::from(args.output_dir()),
            auth_token: args.auth_token().to_owned(),
            dry_run: args.dry_run,
            system,
        })
    }

    /// Request timeout for the HTTP client
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.github.timeout_secs)
    }

    /// Profiles that will be generated, in order
    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Execute the generate operation
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A profile's full-settings category yields no document
    /// - A document cannot be rendered or written
    #[inline]
    pub fn execute(&self, http: &dyn HttpClient) -> Result<()> {
        match &self.mode {
            SourceMode::Local => {
                info!("Reading categories from local directories");
                let source = LocalSource::new(self.system).with_http(http);
                self.generate_all(&source, http)
            }
            SourceMode::Remote { token } => {
                let github = &self.settings.github;
                info!(
                    "Reading categories from {}/{}",
                    github.owner, github.repository
                );
                let source = RemoteSource::new(
                    http,
                    &github.api_url,
                    &github.owner,
                    &github.repository,
                    token,
                )?;
                self.generate_all(&source, http)
            }
        }
    }

    fn generate_all(&self, source: &dyn ContentSource, http: &dyn HttpClient) -> Result<()> {
        if self.dry_run {
            info!("Dry run - no files will be written");
        }

        let directories = CategoryDirectories::from(&self.settings.github);
        let assembler = ConfigAssembler::new(source, &self.policy, &directories);
        let provider_client = self
            .settings
            .output
            .count_provider_proxies
            .then_some(http);

        for (index, profile) in self.profiles.iter().enumerate() {
            info!(
                "\n=> Profile #{} '{}' from {}",
                index + 1,
                profile.name,
                redact_all(&profile.sources).join(", ")
            );

            let document = assembler.assemble(profile)?;
            let generated_at = Utc::now();
            let stats = Stats::collect(&document, &generated_at, provider_client);
            stats.log_summary(&profile.name);

            let paths = OutputPaths::new(
                &self.output_dir,
                &self.settings.output,
                &profile.name,
                &self.auth_token,
            );

            if self.dry_run {
                info!("Would write {}", paths.display_document);
                info!("Would write {}", paths.stats.display());
                continue;
            }

            let rendered = render_document(&document, &generated_at)?;
            write_output(self.system, &paths.document, &rendered)?;
            info!("\u{2713} Configuration saved to {}", paths.display_document);

            match stats
                .to_json()
                .and_then(|json| write_output(self.system, &paths.stats, &json))
            {
                Ok(()) => info!("\u{2713} Statistics saved to {}", paths.stats.display()),
                Err(e) => warn!("Failed to save statistics: {e:#}"),
            }
        }

        info!("\n\u{2713} Generated {} profile(s)", self.profiles.len());
        Ok(())
    }
}

/// Load the settings file; only the default path may be absent
fn load_settings(args: &Args, system: &dyn System) -> Result<Settings> {
    if args.settings == DEFAULT_SETTINGS_PATH && !system.exists(Path::new(&args.settings)) {
        info!("No settings file at {DEFAULT_SETTINGS_PATH}, using defaults");
        return Ok(Settings::default());
    }
    Settings::load_from_file(system, &args.settings)
}
