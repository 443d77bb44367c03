//! Repository wrapper running git primitives for the orchestrator.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use git2::ErrorCode;

use crate::error::{Error, Result};
use crate::output::CommandOutput;
use crate::traits::{ConfigScope, DiffView, GitOps, LogFormat, PushTarget};

/// A working tree plus, when one was found, its git metadata.
///
/// Branch and remote lookups go through libgit2; everything else shells out
/// to the `git` binary so hooks, credential helpers and `--force-with-lease`
/// behave exactly as they do on the command line.
pub struct Repository {
    workdir: PathBuf,
    inner: Option<git2::Repository>,
}

impl Repository {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    /// Returns `NotARepository` if no repository is found at path or any parent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Self::at(path);
        if repo.is_repository() {
            Ok(repo)
        } else {
            Err(Error::NotARepository)
        }
    }

    /// Wrap `path` whether or not it is inside a repository.
    ///
    /// Callers can then report `is_repository() == false` instead of failing.
    #[must_use]
    pub fn at(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match git2::Repository::discover(path) {
            Ok(inner) => {
                let workdir = inner
                    .workdir()
                    .map_or_else(|| path.to_path_buf(), Path::to_path_buf);
                Self {
                    workdir,
                    inner: Some(inner),
                }
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no repository found");
                Self {
                    workdir: path.to_path_buf(),
                    inner: None,
                }
            }
        }
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> Option<&Path> {
        self.inner.as_ref().map(git2::Repository::path)
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.workdir)
            .args(args)
            // Output is matched against English messages.
            .env("LC_ALL", "C")
            .stdin(Stdio::null());
        cmd
    }

    /// Run git to completion and capture its output.
    fn run_git(&self, args: &[&str]) -> Result<CommandOutput> {
        let command = display_command(args);
        tracing::debug!(%command, "running");

        let output = self
            .command(args)
            .output()
            .map_err(|source| Error::Spawn {
                command: command.clone(),
                source,
            })?;
        let output = CommandOutput::from(output);

        tracing::trace!(%command, status = ?output.status, lines = output.lines.len(), "finished");
        Ok(output)
    }

    /// Run git with an upper bound on wall-clock time; the child is killed on expiry.
    fn run_git_bounded(&self, args: &[&str], timeout: Duration) -> Result<CommandOutput> {
        let command = display_command(args);
        tracing::debug!(%command, timeout_secs = timeout.as_secs(), "running with timeout");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        let mut cmd = tokio::process::Command::from(self.command(args));
        cmd.env("GIT_TERMINAL_PROMPT", "0").kill_on_drop(true);

        runtime.block_on(async {
            match tokio::time::timeout(timeout, cmd.output()).await {
                Ok(Ok(output)) => Ok(CommandOutput::from(output)),
                Ok(Err(source)) => Err(Error::Spawn { command, source }),
                Err(_) => Err(Error::Timeout {
                    command,
                    secs: timeout.as_secs(),
                }),
            }
        })
    }

    fn head_branch(inner: &git2::Repository) -> Result<Option<String>> {
        match inner.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(String::from)),
            Ok(_) => Ok(None),
            // A fresh repository has HEAD pointing at a branch with no commits yet.
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = inner.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(String::from))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl GitOps for Repository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn is_repository(&self) -> bool {
        self.inner.is_some()
    }

    fn current_branch(&self) -> Result<CommandOutput> {
        let inner = self.inner.as_ref().ok_or(Error::NotARepository)?;
        Ok(CommandOutput::ok(Self::head_branch(inner)?))
    }

    fn remote_url(&self, remote: &str) -> Result<CommandOutput> {
        let inner = self.inner.as_ref().ok_or(Error::NotARepository)?;
        let url = inner
            .find_remote(remote)
            .ok()
            .and_then(|r| r.url().map(String::from));

        Ok(url.map_or_else(
            || CommandOutput::failed(2, [format!("no such remote '{remote}'")]),
            |url| CommandOutput::ok([url]),
        ))
    }

    fn upstream(&self) -> Result<CommandOutput> {
        self.run_git(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
    }

    fn status(&self) -> Result<CommandOutput> {
        self.run_git(&["status", "--porcelain"])
    }

    fn staged(&self) -> Result<CommandOutput> {
        self.run_git(&["diff", "--cached", "--name-only"])
    }

    fn conflicted(&self) -> Result<CommandOutput> {
        self.run_git(&["diff", "--name-only", "--diff-filter=U"])
    }

    fn fetch(&self, remote: &str, timeout: Duration) -> Result<CommandOutput> {
        self.run_git_bounded(&["fetch", "--quiet", remote], timeout)
    }

    fn divergence(&self, upstream: &str) -> Result<CommandOutput> {
        let range = format!("HEAD...{upstream}");
        self.run_git(&["rev-list", "--left-right", "--count", &range])
    }

    fn unpublished(&self, upstream: &str) -> Result<CommandOutput> {
        let range = format!("{upstream}..HEAD");
        self.run_git(&["log", "--format=%h %s", &range])
    }

    fn log(&self, limit: usize, format: LogFormat) -> Result<CommandOutput> {
        let limit = limit.to_string();
        let mut args = vec!["log", "-n", limit.as_str()];
        match format {
            LogFormat::Oneline => args.push("--format=%h %s"),
            LogFormat::Graph => args.extend(["--graph", "--oneline", "--decorate"]),
            LogFormat::Detailed => args.push("--format=%h | %an | %ar | %s"),
        }
        self.run_git(&args)
    }

    fn diff(&self, view: DiffView) -> Result<CommandOutput> {
        match view {
            DiffView::WorkingTree => self.run_git(&["diff"]),
            DiffView::Staged => self.run_git(&["diff", "--cached"]),
            DiffView::Stat => self.run_git(&["diff", "HEAD", "--stat"]),
        }
    }

    fn stash_list(&self) -> Result<CommandOutput> {
        self.run_git(&["stash", "list"])
    }

    fn config_get(&self, key: &str) -> Result<CommandOutput> {
        self.run_git(&["config", "--get", key])
    }

    fn add_all(&self) -> Result<CommandOutput> {
        self.run_git(&["add", "-A"])
    }

    fn commit(&self, message: &str) -> Result<CommandOutput> {
        self.run_git(&["commit", "-m", message])
    }

    fn push(&self, target: PushTarget<'_>, force_with_lease: bool) -> Result<CommandOutput> {
        let refspec = format!("HEAD:{}", target.branch());
        let mut args = vec!["push"];
        if force_with_lease {
            args.push("--force-with-lease");
        }
        match target {
            PushTarget::Upstream { remote, .. } => args.extend([remote, refspec.as_str()]),
            PushTarget::Publish { remote, branch } => args.extend(["-u", remote, branch]),
        }
        self.run_git(&args)
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<CommandOutput> {
        self.run_git(&["pull", "--no-rebase", "--no-edit", remote, branch])
    }

    fn stash_push(&self, label: &str) -> Result<CommandOutput> {
        self.run_git(&["stash", "push", "--include-untracked", "-m", label])
    }

    fn stash_pop(&self) -> Result<CommandOutput> {
        self.run_git(&["stash", "pop"])
    }

    fn clean_preview(&self) -> Result<CommandOutput> {
        self.run_git(&["-c", "core.quotePath=false", "clean", "-n", "-d"])
    }

    fn clean_paths(&self, paths: &[String]) -> Result<CommandOutput> {
        // Without a pathspec git would clean the whole tree.
        if paths.is_empty() {
            return Ok(CommandOutput::ok(Vec::<String>::new()));
        }
        let mut args = vec!["--literal-pathspecs", "clean", "-f", "-d", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args)
    }

    fn config_set(&self, key: &str, value: &str, scope: ConfigScope) -> Result<CommandOutput> {
        match scope {
            ConfigScope::Local => self.run_git(&["config", key, value]),
            ConfigScope::Global => self.run_git(&["config", "--global", key, value]),
        }
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("workdir", &self.workdir)
            .field("git_dir", &self.git_dir())
            .finish()
    }
}

fn display_command(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}
