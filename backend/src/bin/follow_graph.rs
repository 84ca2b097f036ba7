//! Resolve and edit the follow graph stored in a snapshot file.
//!
//! Read commands print pretty JSON on stdout. Mutating commands persist the
//! snapshot before printing the affected record. Domain failures are printed
//! as JSON on stderr and mapped to a non-zero exit status.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Builder;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use work_calendar::config::WorkCalendarSettings;
use work_calendar::domain::ports::{FollowCommand, FollowGraphQuery};
use work_calendar::domain::{
    DomainError, ErrorCode, FollowId, FollowOverrideDraft, FollowService, UserId,
};
use work_calendar::outbound::{
    InMemoryFollowOverrides, InMemoryRoster, Snapshot, SnapshotStore,
};

/// `follow-graph` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "follow-graph",
    about = "Resolve who follows whom from project overlap and explicit overrides",
    version
)]
struct CliArgs {
    /// Snapshot file. Falls back to `WORK_CALENDAR_SNAPSHOT_PATH`, then the bundled fixture.
    #[arg(long = "snapshot", value_name = "path", global = true)]
    snapshot: Option<PathBuf>,
    /// Emit JSON log lines. Overrides `WORK_CALENDAR_LOG_JSON`.
    #[arg(long = "log-json", value_name = "bool", global = true)]
    log_json: Option<bool>,
    /// `tracing` filter directive. Overrides `WORK_CALENDAR_LOG_FILTER`.
    #[arg(long = "log-filter", value_name = "directive", global = true)]
    log_filter: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print following, followers and override details for one user.
    Graph(UserSelector),
    /// Print the users one user follows.
    Following(UserSelector),
    /// Print the users following one user.
    Followers(UserSelector),
    /// Print every override naming one user on either side.
    Overrides(UserSelector),
    /// Create or delete follow overrides.
    #[command(subcommand)]
    Follow(FollowAction),
}

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
struct UserSelector {
    /// User identifier.
    #[arg(long = "user", value_name = "uuid")]
    user: Option<String>,
    /// Login matched against the mail nickname, ignoring case.
    #[arg(long = "login", value_name = "login")]
    login: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
enum FollowAction {
    /// Record an explicit follow or unfollow.
    Add {
        /// User whose following set is adjusted.
        #[arg(long = "follower", value_name = "uuid")]
        follower: String,
        /// User being followed or unfollowed.
        #[arg(long = "following", value_name = "uuid")]
        following: String,
        /// `add` or `remove`.
        #[arg(long = "type", value_name = "add|remove", default_value = "add")]
        follow_type: String,
    },
    /// Delete an override by identifier.
    Delete {
        /// Override identifier.
        #[arg(long = "id", value_name = "uuid")]
        id: String,
    },
}

type Service = FollowService<InMemoryRoster, InMemoryFollowOverrides>;

impl CliArgs {
    /// Layer flags given on the command line over the loaded settings.
    fn apply_to(&self, mut settings: WorkCalendarSettings) -> WorkCalendarSettings {
        if let Some(path) = &self.snapshot {
            settings.snapshot_path = Some(path.clone());
        }
        if let Some(log_json) = self.log_json {
            settings.log_json = log_json;
        }
        if let Some(filter) = &self.log_filter {
            settings.log_filter = Some(filter.clone());
        }
        settings
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let settings = WorkCalendarSettings::load_from_iter([OsString::from("follow-graph")])
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let settings = args.apply_to(settings);
    init_tracing(&settings);

    let snapshot_path = settings.snapshot_path();
    let snapshot_path = Utf8PathBuf::from_path_buf(snapshot_path)
        .map_err(|path| eyre!("snapshot path is not valid UTF-8: {}", path.display()))?;
    let store = SnapshotStore::open(&snapshot_path)
        .wrap_err_with(|| format!("failed to open snapshot at {snapshot_path}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build follow-graph runtime")?;
    match runtime.block_on(run(args.command, &store))? {
        Ok(output) => {
            println!("{}", render(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            eprintln!("{}", render(&error)?);
            Ok(ExitCode::from(exit_status(error.code())))
        }
    }
}

fn init_tracing(settings: &WorkCalendarSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter()));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = if settings.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

/// Execute `command` against the snapshot, persisting it after a mutation.
///
/// The outer result carries I/O failures; the inner one carries domain
/// failures reported to the caller.
async fn run(command: Command, store: &SnapshotStore) -> Result<Result<Value, DomainError>> {
    let snapshot = store.load()?;
    let users = snapshot.users.clone();
    let (roster, overrides) = snapshot.into_adapters();
    let overrides = Arc::new(overrides);
    let service = FollowService::new(
        Arc::new(roster),
        Arc::clone(&overrides),
        Arc::new(DefaultClock),
    );

    let mutates = matches!(command, Command::Follow(_));
    let outcome = execute(&service, command).await;
    if mutates && outcome.is_ok() {
        let records = overrides
            .records()
            .map_err(|err| eyre!("failed to read follow overrides: {err}"))?;
        store.save(&Snapshot::new(users, records))?;
        debug!(path = %store.path(), "snapshot updated");
    }
    Ok(outcome)
}

async fn execute(service: &Service, command: Command) -> Result<Value, DomainError> {
    match command {
        Command::Graph(selector) => {
            let user_id = resolve_user(service, selector).await?;
            to_value(&service.user_follow_graph(&user_id).await?)
        }
        Command::Following(selector) => {
            let user_id = resolve_user(service, selector).await?;
            to_value(&service.following(&user_id).await?)
        }
        Command::Followers(selector) => {
            let user_id = resolve_user(service, selector).await?;
            to_value(&service.followers(&user_id).await?)
        }
        Command::Overrides(selector) => {
            let user_id = resolve_user(service, selector).await?;
            to_value(&service.all_for_user(&user_id).await?)
        }
        Command::Follow(FollowAction::Add {
            follower,
            following,
            follow_type,
        }) => {
            let draft = FollowOverrideDraft {
                follower_id: follower,
                following_id: following,
                follow_type,
            };
            to_value(&service.add_follow(draft).await?)
        }
        Command::Follow(FollowAction::Delete { id }) => {
            let id = FollowId::new(&id).map_err(|err| {
                DomainError::invalid_request(format!("invalid follow id: {err}"))
            })?;
            to_value(&service.delete_follow(&id).await?)
        }
    }
}

async fn resolve_user(service: &Service, selector: UserSelector) -> Result<UserId, DomainError> {
    match (selector.user, selector.login) {
        (Some(raw), _) => UserId::new(&raw)
            .map_err(|err| DomainError::invalid_request(format!("invalid user id: {err}"))),
        (None, Some(login)) => Ok(service.resolve_login(&login).await?.id().clone()),
        (None, None) => Err(DomainError::invalid_request(
            "either --user or --login is required",
        )),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|err| DomainError::internal(format!("failed to encode output: {err}")))
}

fn render<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).wrap_err("failed to render JSON output")
}

fn exit_status(code: ErrorCode) -> u8 {
    match code {
        ErrorCode::InvalidRequest => 2,
        ErrorCode::NotFound => 3,
        ErrorCode::Upstream => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for argument parsing and command execution.

    use camino::Utf8PathBuf;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;
    use work_calendar::domain::{
        FollowType, NewFollowOverride, ProjectId, ProjectMembership, User, Username,
    };

    use super::*;

    const ADA: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const BOB: &str = "9b2e5d8c-1f0a-4c1e-8d3b-2a4f6e7c9d01";
    const CAROL: &str = "c56a4180-65aa-42ec-a945-5fd21dec0538";

    fn user(id: &str, name: &str, project: ProjectId) -> User {
        User::new(
            UserId::new(id).expect("valid id"),
            Username::new(name).expect("valid username"),
        )
        .with_projects(vec![ProjectMembership::open(project)])
    }

    struct Workspace {
        _dir: TempDir,
        store: SnapshotStore,
    }

    #[fixture]
    fn workspace() -> Workspace {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("snapshot.json"))
            .expect("utf-8 temp path");
        let store = SnapshotStore::open(path).expect("open store");
        let shared = ProjectId::random();
        let other = ProjectId::random();
        let follow = NewFollowOverride::new(
            UserId::new(ADA).expect("valid id"),
            UserId::new(CAROL).expect("valid id"),
            FollowType::Add,
        )
        .expect("valid payload")
        .into_override(
            FollowId::random(),
            Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        );
        store
            .save(&Snapshot::new(
                vec![
                    user(ADA, "Ada", shared),
                    user(BOB, "Bob", shared),
                    user(CAROL, "Carol", other),
                ],
                vec![follow],
            ))
            .expect("seed snapshot");
        Workspace { _dir: dir, store }
    }

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("follow-graph").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[rstest]
    fn selector_requires_exactly_one_option() {
        assert!(CliArgs::try_parse_from(["follow-graph", "graph"]).is_err());
        assert!(
            CliArgs::try_parse_from(["follow-graph", "graph", "--user", ADA, "--login", "ada"])
                .is_err()
        );
    }

    #[rstest]
    fn follow_add_defaults_to_add() {
        let args = parse(&["follow", "add", "--follower", ADA, "--following", BOB]);
        match args.command {
            Command::Follow(FollowAction::Add { follow_type, .. }) => {
                assert_eq!(follow_type, "add");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[rstest]
    fn snapshot_flag_is_global() {
        let args = parse(&["following", "--user", ADA, "--snapshot", "/tmp/s.json"]);
        assert_eq!(args.snapshot, Some(PathBuf::from("/tmp/s.json")));
    }

    fn loaded_settings() -> WorkCalendarSettings {
        WorkCalendarSettings {
            snapshot_path: Some(PathBuf::from("/srv/roster.json")),
            log_json: true,
            log_filter: None,
        }
    }

    #[rstest]
    fn flags_override_loaded_settings() {
        let args = parse(&[
            "following",
            "--user",
            ADA,
            "--snapshot",
            "/tmp/s.json",
            "--log-json",
            "false",
            "--log-filter",
            "work_calendar=debug",
        ]);
        let settings = args.apply_to(loaded_settings());
        assert_eq!(settings.snapshot_path(), PathBuf::from("/tmp/s.json"));
        assert!(!settings.log_json);
        assert_eq!(settings.log_filter(), "work_calendar=debug");
    }

    #[rstest]
    fn absent_flags_keep_loaded_settings() {
        let settings = parse(&["following", "--user", ADA]).apply_to(loaded_settings());
        assert_eq!(settings.snapshot_path(), PathBuf::from("/srv/roster.json"));
        assert!(settings.log_json);
        assert_eq!(settings.log_filter(), "info");
    }

    #[rstest]
    #[case(ErrorCode::InvalidRequest, 2)]
    #[case(ErrorCode::NotFound, 3)]
    #[case(ErrorCode::Upstream, 4)]
    #[case(ErrorCode::InternalError, 1)]
    fn exit_status_reflects_error_code(#[case] code: ErrorCode, #[case] expected: u8) {
        assert_eq!(exit_status(code), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn following_command_prints_resolved_users(workspace: Workspace) {
        let snapshot = workspace.store.load().expect("load");
        let (roster, overrides) = snapshot.into_adapters();
        let service = FollowService::new(
            Arc::new(roster),
            Arc::new(overrides),
            Arc::new(DefaultClock),
        );

        let output = execute(&service, parse(&["following", "--user", ADA]).command)
            .await
            .expect("following");
        let names: Vec<&str> = output
            .as_array()
            .expect("array output")
            .iter()
            .filter_map(|user| user.get("username").and_then(Value::as_str))
            .collect();
        assert_eq!(names, ["Bob", "Carol"]);
    }

    #[rstest]
    #[tokio::test]
    async fn follow_add_persists_snapshot(workspace: Workspace) {
        let output = run(
            parse(&[
                "follow",
                "add",
                "--follower",
                BOB,
                "--following",
                ADA,
                "--type",
                "remove",
            ])
            .command,
            &workspace.store,
        )
        .await
        .expect("run")
        .expect("created");
        assert_eq!(output.get("followType"), Some(&Value::from("remove")));

        let snapshot = workspace.store.load().expect("reload");
        assert_eq!(snapshot.follows.len(), 2);
        assert_eq!(snapshot.follows[1].follow_type, FollowType::Remove);
        assert_eq!(snapshot.users.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_add_leaves_snapshot_untouched(workspace: Workspace) {
        let before = workspace.store.load().expect("load");
        let error = run(
            parse(&["follow", "add", "--follower", ADA, "--following", ADA]).command,
            &workspace.store,
        )
        .await
        .expect("run")
        .expect_err("self follow");
        assert_eq!(exit_status(error.code()), 2);
        assert_eq!(workspace.store.load().expect("reload"), before);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_maps_to_not_found(workspace: Workspace) {
        let error = run(
            parse(&["graph", "--user", "0f8fad5b-d9cb-469f-a165-70867728950e"]).command,
            &workspace.store,
        )
        .await
        .expect("run")
        .expect_err("unknown user");
        assert_eq!(exit_status(error.code()), 3);
    }
}
