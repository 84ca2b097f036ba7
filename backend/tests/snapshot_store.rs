//! Integration tests for snapshot-backed follow resolution.
#![expect(
    clippy::expect_used,
    reason = "integration tests use expect for readable failure messages"
)]

use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use work_calendar::domain::ports::{FollowCommand, FollowGraphQuery};
use work_calendar::domain::{FollowOverrideDraft, FollowService, User, UserId};
use work_calendar::outbound::{
    InMemoryFollowOverrides, InMemoryRoster, Snapshot, SnapshotStore,
};
use work_calendar::test_support::{FixedClock, TempSnapshot};

const ADA: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
const BRIAN: &str = "9b2e5d8c-1f0a-4c1e-8d3b-2a4f6e7c9d01";
const CAROL: &str = "c56a4180-65aa-42ec-a945-5fd21dec0538";
const DENNIS: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

fn bundled_snapshot() -> Snapshot {
    let path = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("follow-graph")
        .join("snapshot.json");
    SnapshotStore::open(path)
        .expect("open bundled snapshot")
        .load()
        .expect("load bundled snapshot")
}

fn service_for(
    snapshot: Snapshot,
) -> FollowService<InMemoryRoster, InMemoryFollowOverrides> {
    let (roster, overrides) = snapshot.into_adapters();
    let now = Utc
        .with_ymd_and_hms(2024, 6, 3, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    FollowService::new(
        Arc::new(roster),
        Arc::new(overrides),
        FixedClock::shared(now),
    )
}

fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|user| user.username().as_ref()).collect()
}

fn id(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}

#[fixture]
fn runtime() -> Runtime {
    Runtime::new().expect("create runtime")
}

#[rstest]
#[case(ADA, vec!["Brian Kernighan", "Carol Shaw"])]
#[case(CAROL, vec![])]
#[case(DENNIS, vec!["Ada Lovelace", "Brian Kernighan", "Carol Shaw", "Edsger Dijkstra"])]
fn bundled_snapshot_resolves_following(
    runtime: Runtime,
    #[case] user: &str,
    #[case] expected: Vec<&str>,
) {
    let service = service_for(bundled_snapshot());
    let following = runtime
        .block_on(service.following(&id(user)))
        .expect("resolve following");
    assert_eq!(names(&following), expected);
}

#[rstest]
fn bundled_snapshot_appends_added_followers(runtime: Runtime) {
    let service = service_for(bundled_snapshot());
    let followers = runtime
        .block_on(service.followers(&id(CAROL)))
        .expect("resolve followers");
    assert_eq!(names(&followers), ["Brian Kernighan", "Ada Lovelace"]);
}

#[rstest]
fn bundled_snapshot_graph_lists_overrides(runtime: Runtime) {
    let service = service_for(bundled_snapshot());
    let login = runtime
        .block_on(service.resolve_login("Brian.K"))
        .expect("resolve login");
    assert_eq!(login.id(), &id(BRIAN));

    let graph = runtime
        .block_on(service.user_follow_graph(&id(CAROL)))
        .expect("resolve graph");
    assert!(graph.following.is_empty());
    assert_eq!(graph.all_for_user.len(), 2);
    assert!(
        graph
            .all_for_user
            .windows(2)
            .all(|pair| pair[0].created_at <= pair[1].created_at)
    );
}

#[rstest]
fn added_override_survives_a_save_and_reload(runtime: Runtime) {
    let temp = TempSnapshot::write(&bundled_snapshot()).expect("write temp snapshot");
    let store = temp.store().expect("open temp store");
    let snapshot = store.load().expect("load temp snapshot");
    let users = snapshot.users.clone();
    let (roster, overrides) = snapshot.into_adapters();
    let overrides = Arc::new(overrides);
    let service = FollowService::new(
        Arc::new(roster),
        Arc::clone(&overrides),
        FixedClock::shared(Utc::now()),
    );

    runtime
        .block_on(service.add_follow(FollowOverrideDraft {
            follower_id: CAROL.to_owned(),
            following_id: DENNIS.to_owned(),
            follow_type: "add".to_owned(),
        }))
        .expect("add override");
    store
        .save(&Snapshot::new(
            users,
            overrides.records().expect("read overrides"),
        ))
        .expect("save snapshot");

    let reloaded = service_for(store.load().expect("reload snapshot"));
    let following = runtime
        .block_on(reloaded.following(&id(CAROL)))
        .expect("resolve following");
    assert_eq!(names(&following), ["Dennis Ritchie"]);
}
