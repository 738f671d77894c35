//! Terminal host for the session guard
//!
//! Mounts a [`SessionGuard`], treats every stdin line as a key press and
//! renders the warning countdown. Exits once the guard logs out or on Ctrl-C.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use shevoices_core::auth::{RecordingSignOut, StaticSessionProvider};
use shevoices_core::{
    ActivityKind, GuardCollaborators, GuardConfig, HttpAuthClient, IdleState, Navigator,
    SessionGuard, SessionHandle, redirect_target,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::ConfigLoader;

/// Arguments for the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Site to guard a session for; an offline session is used when unset
    #[arg(long)]
    pub base_url: Option<String>,

    /// Session cookie to present to the site, as `name=value`
    #[arg(long)]
    pub cookie: Option<String>,

    /// Total idle time before logout, in seconds
    #[arg(long)]
    pub idle_timeout: Option<u64>,

    /// Length of the warning countdown, in seconds
    #[arg(long)]
    pub countdown: Option<u64>,

    /// Log out silently without a warning phase
    #[arg(long)]
    pub no_warning: bool,

    /// Login page to redirect to
    #[arg(long)]
    pub login_path: Option<String>,

    /// Lifetime of the offline session, in seconds
    #[arg(long, default_value_t = 3600)]
    pub session_ttl: u64,
}

impl WatchArgs {
    /// Apply command-line overrides on top of the loaded config
    pub fn apply(&self, mut config: GuardConfig) -> GuardConfig {
        if let Some(secs) = self.idle_timeout {
            config.idle_timeout_ms = secs.saturating_mul(1_000);
        }
        if let Some(secs) = self.countdown {
            config.countdown_ms = secs.saturating_mul(1_000);
        }
        if self.no_warning {
            config.warning_enabled = false;
        }
        if let Some(path) = &self.login_path {
            config.login_path = path.clone();
        }
        config
    }
}

/// What a line typed on stdin asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Stay,
    Logout,
    Activity,
}

fn parse_input(line: &str) -> Input {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "stay" => Input::Stay,
        "q" | "quit" | "logout" => Input::Logout,
        _ => Input::Activity,
    }
}

/// Prints redirect targets instead of opening them
struct TerminalNavigator {
    base_url: Option<String>,
}

impl TerminalNavigator {
    fn resolve(&self, target: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), target),
            None => target.to_string(),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, target: &str) {
        println!("Redirecting to {}", self.resolve(target));
    }
}

fn offline_collaborators(ttl: u64, navigator: Arc<dyn Navigator>) -> GuardCollaborators {
    let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
    let expires_at = Utc::now() + chrono::Duration::seconds(ttl);
    let mut session = SessionHandle::new(expires_at);
    if let Ok(user) = std::env::var("USER") {
        session = session.with_name(user);
    }
    GuardCollaborators::new(
        Arc::new(StaticSessionProvider::new(session)),
        Arc::new(RecordingSignOut::new()),
        navigator,
    )
}

fn site_collaborators(
    base_url: &str,
    cookie: Option<&str>,
    navigator: Arc<dyn Navigator>,
) -> Result<GuardCollaborators> {
    let client = Arc::new(
        HttpAuthClient::with_session_cookie(base_url, cookie)?
            .with_navigator(Arc::clone(&navigator)),
    );
    Ok(GuardCollaborators::new(client.clone(), client, navigator))
}

fn render(state: &IdleState, was_warning: bool, prompt_message: Option<String>) {
    match state {
        IdleState::Warning { .. } => {
            if let Some(message) = prompt_message {
                println!("{message} [y = stay signed in, q = log out]");
            }
        }
        IdleState::Idle if was_warning => println!("Welcome back, you are still signed in."),
        IdleState::Idle => {}
        IdleState::LoggedOut { reason } => println!("Signed out: {}", reason.message()),
    }
}

/// Run the watch command
pub async fn run(args: WatchArgs) -> Result<()> {
    let loaded = ConfigLoader::load()?;
    let config = args.apply(loaded.guard);
    let base_url = args.base_url.clone().or(loaded.site.base_url);

    let navigator: Arc<dyn Navigator> = Arc::new(TerminalNavigator {
        base_url: base_url.clone(),
    });
    let collaborators = match &base_url {
        Some(url) => site_collaborators(url, args.cookie.as_deref(), Arc::clone(&navigator))?,
        None => {
            info!(ttl_secs = args.session_ttl, "No site configured, using an offline session");
            offline_collaborators(args.session_ttl, Arc::clone(&navigator))
        }
    };

    let login_path = config.login_path.clone();
    let offline = base_url.is_none();
    let guard = SessionGuard::start(config, collaborators).await?;

    println!(
        "Session guard running (idle timeout {}s). Type anything to stay active, q to log out.",
        guard.config().idle_timeout().as_secs()
    );

    let mut prompt = guard.warning_prompt();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut was_warning = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            state = prompt.changed() => {
                let Some(state) = state else { break };
                render(&state, was_warning, prompt.message());
                was_warning = state.is_warning();
                if let IdleState::LoggedOut { reason } = state {
                    if offline {
                        navigator.navigate(&redirect_target(&login_path, reason));
                    }
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match parse_input(&line) {
                        Input::Stay => guard.stay_signed_in().await,
                        Input::Logout => {
                            guard.logout_now().await;
                        }
                        Input::Activity => guard.on_activity(ActivityKind::KeyPress),
                    },
                    Ok(None) => {
                        debug!("stdin closed, no more activity will be recorded");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        stdin_open = false;
                    }
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping session guard");
                break;
            }
        }
    }

    guard.stop().await;
    Ok(())
}
