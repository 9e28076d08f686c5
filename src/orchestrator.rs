//! One invocation: lock, name, claim a session, launch, then refill the pool.

use std::os::unix::process::CommandExt;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::launch::{self, TerminalSpec};
use crate::lock::LockGuard;
use crate::naming::{self, Identity, NamingStrategy};
use crate::placeholder::{Choice, Placeholder, SESSION_ENV};
use crate::split;
use crate::tmux::{self, pool, watcher, Multiplexer, TmuxClient};
use crate::wm::tree::{self, UnparsableNumber};
use crate::wm::{I3Client, Node, WindowManager, Workspace};

/// Where the new terminal goes and what it is called
#[derive(Debug, Clone)]
pub struct Target {
    pub workspace: Workspace,
    pub tree: Node,
    pub identity: Identity,
}

/// Read the focused workspace and derive a fresh identity on it.
///
/// Must run under the lock when the strategy counts existing terminals.
pub async fn resolve_target<W: WindowManager + ?Sized>(
    wm: &W,
    strategy: &mut dyn NamingStrategy,
    title_template: &str,
    unparsable: UnparsableNumber,
) -> crate::error::Result<Target> {
    let workspaces = wm.get_workspaces().await?;
    let workspace = tree::focused_workspace(&workspaces)?.clone();
    let tree = wm.get_tree().await?;

    let terminals = if strategy.needs_terminals() {
        tree::active_terminals(title_template, &tree, &workspace, unparsable)?
    } else {
        Vec::new()
    };
    debug!(workspace = %workspace.name, ?terminals, "active terminals");

    let identity = naming::derive_identity(strategy, &terminals, &workspace.name, title_template);
    info!(session = %identity.session, title = %identity.title, "new terminal");

    Ok(Target {
        workspace,
        tree,
        identity,
    })
}

/// Post-launch steps that talk to the new session
#[derive(Debug, Clone, Default)]
pub struct AfterLaunch {
    /// Clear the screen when the foreground command matches
    pub clear: Option<Regex>,
    /// Command line typed into the session
    pub execute: Option<String>,
    pub timeout: Option<Duration>,
}

pub async fn after_launch<M: Multiplexer + ?Sized>(
    mux: &M,
    session: &str,
    steps: &AfterLaunch,
) -> crate::error::Result<()> {
    if let Some(only_if) = &steps.clear {
        watcher::clear_screen(mux, session, only_if, steps.timeout).await?;
    }

    if let Some(cmdline) = &steps.execute {
        tmux::send_command(mux, session, cmdline, steps.timeout).await?;
    }

    Ok(())
}

pub async fn run(cli: Cli) -> Result<()> {
    let wm = I3Client::new(cli.wm_msg.clone());
    let mux = TmuxClient::new(cli.tmux_socket.clone());

    if cli.dummy {
        if let Ok(session) = std::env::var(SESSION_ENV) {
            return run_placeholder(&mux, &cli, session).await;
        }
    }

    let lock = LockGuard::acquire_async(&cli.lock)
        .await
        .with_context(|| format!("can't lock {}", cli.lock.display()))?;

    let mut strategy = cli.naming.strategy();
    let target = resolve_target(&wm, &mut *strategy, &cli.title, cli.unparsable_number)
        .await
        .context("can't name new terminal")?;
    let session = target.identity.session.clone();

    if cli.dummy {
        // the placeholder claims its session itself, under the lock
        lock.release();

        let exe = std::env::current_exe().context("can't find own executable")?;
        let mut command = vec![exe.to_string_lossy().into_owned()];
        command.extend(cli.placeholder_args());
        let env = [(SESSION_ENV.to_string(), session)];

        return launch_terminal(&wm, &cli, &target, &command, &env).await;
    }

    let ensured = pool::ensure_session(&mux, &session)
        .await
        .with_context(|| format!("can't prepare tmux session {}", session))?;
    debug!(?ensured, "session ready");

    let attach = mux.attach_command(&session);
    launch_terminal(&wm, &cli, &target, &attach, &[]).await?;

    let steps = AfterLaunch {
        clear: if cli.clear {
            Some(Regex::new(&cli.clear_re).context("invalid --clear-re")?)
        } else {
            None
        },
        execute: cli.execute.clone(),
        timeout: cli.attach_timeout(),
    };
    after_launch(&mux, &session, &steps).await?;

    if !cli.quiet {
        println!("{}", session);
    }

    pool::reserve_up_to(&mux, cli.reserving)
        .await
        .context("can't replenish reserved sessions")?;

    lock.release();
    Ok(())
}

async fn launch_terminal<W: WindowManager + ?Sized>(
    wm: &W,
    cli: &Cli,
    target: &Target,
    command: &[String],
    env: &[(String, String)],
) -> Result<()> {
    split::apply_split(wm, cli.split_mode(), &target.tree, &target.workspace)
        .await
        .context("can't split window")?;

    launch::spawn_terminal(&TerminalSpec {
        path: &cli.terminal,
        template: &cli.terminal_template,
        title: &target.identity.title,
        class: &cli.class,
        command,
        env,
    })
    .context("can't launch terminal")?;

    Ok(())
}

/// Runs inside the terminal started in dummy mode.
async fn run_placeholder(mux: &TmuxClient, cli: &Cli, session: String) -> Result<()> {
    let shown = session.clone();
    let choice = tokio::task::spawn_blocking(move || Placeholder::new(shown).run())
        .await
        .context("placeholder task failed")??;

    if choice == Choice::Dismiss {
        return Ok(());
    }

    let lock = LockGuard::acquire_async(&cli.lock)
        .await
        .with_context(|| format!("can't lock {}", cli.lock.display()))?;
    pool::ensure_session(mux, &session)
        .await
        .with_context(|| format!("can't prepare tmux session {}", session))?;
    pool::reserve_up_to(mux, cli.reserving)
        .await
        .context("can't replenish reserved sessions")?;
    lock.release();

    let argv = mux.attach_command(&session);
    let err = std::process::Command::new(&argv[0])
        .args(&argv[1..])
        .env_remove(SESSION_ENV)
        .exec();

    Err(err).with_context(|| format!("can't exec {}", argv.join(" ")))
}
