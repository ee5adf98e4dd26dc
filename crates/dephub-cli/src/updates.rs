use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;

use dephub::{
    ComposerUpdatesChecker, DepType, DependencySource, DirSource, GitSource, PipUpdatesChecker,
    Update, UpdatesChecker,
};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Manager {
    Composer,
    Pip,
}

impl From<Manager> for DepType {
    fn from(manager: Manager) -> Self {
        match manager {
            Manager::Composer => DepType::Composer,
            Manager::Pip => DepType::Pip,
        }
    }
}

#[derive(Args, Debug)]
pub struct UpdatesArgs {
    /// Local project directory to inspect
    #[arg(short, long, conflicts_with = "repo")]
    pub path: Option<PathBuf>,

    /// Git repository address (e.g. 'git@github.com:vendor/repo.git')
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Commit hash, branch or tag to read the manifests at
    #[arg(long, requires = "repo")]
    pub git_ref: Option<String>,

    /// Package manager to inspect
    #[arg(short, long, value_enum)]
    pub manager: Manager,

    /// Only show packages whose newest release falls outside the declared constraint
    #[arg(long)]
    pub incompatible_only: bool,
}

pub async fn execute(args: UpdatesArgs) -> Result<i32> {
    let client = reqwest::Client::new();

    let source: Box<dyn DependencySource> = match (&args.path, &args.repo) {
        (Some(path), _) => Box::new(DirSource::new(path.clone())),
        (None, Some(repo)) => Box::new(
            GitSource::new(client.clone(), repo, args.git_ref.clone())
                .context("invalid git repository address")?,
        ),
        (None, None) => bail!("either --path or --repo is required"),
    };

    let dep_type = DepType::from(args.manager);
    log::debug!("inspecting {dep_type} dependencies");

    let constraints = source
        .constraints(dep_type)
        .await
        .context("unable to read the project dependencies")?;

    let checker: Box<dyn UpdatesChecker> = match dep_type {
        DepType::Composer => Box::new(ComposerUpdatesChecker::new(client)),
        DepType::Pip => Box::new(PipUpdatesChecker::new(client)),
    };

    let updates = checker
        .last_updates(&constraints, args.incompatible_only)
        .await
        .context("unable to check for updates")?;

    if updates.is_empty() {
        println!("{}", "Everything is up to date.".green());
        return Ok(0);
    }

    for update in &updates {
        print_update(update);
    }
    println!();
    println!("{} of {} packages have newer releases", updates.len(), constraints.len());

    Ok(0)
}

fn print_update(update: &Update) {
    let mut line = format!("{} {}", update.name.bold(), update.version.green());
    if !update.current_constraint.is_empty() {
        line.push_str(&format!(
            " (constraint {})",
            update.current_constraint.yellow()
        ));
    }
    if !update.url.is_empty() {
        line.push_str(&format!(" {}", update.url.dimmed()));
    }
    println!("{line}");
}
