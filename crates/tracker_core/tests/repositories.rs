use chrono::NaiveTime;
use rusqlite::Connection;
use tracker_core::db::open_db_in_memory;
use tracker_core::model::routine::NewRoutine;
use tracker_core::model::scheduler::{Day, NewScheduler, Timing};
use tracker_core::model::snippet::NewSnippet;
use tracker_core::model::task::NewTask;
use tracker_core::repo::routine_repo::{
    RoutineListQuery, RoutineRepository, SqliteRoutineRepository,
};
use tracker_core::repo::scheduler_repo::{
    SchedulerListQuery, SchedulerRepository, SqliteSchedulerRepository,
};
use tracker_core::repo::snippet_repo::{
    SnippetListQuery, SnippetRepository, SqliteSnippetRepository,
};
use tracker_core::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use tracker_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use tracker_core::RepoError;

fn seed_user(conn: &Connection, username: &str) -> i64 {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(username)
        .unwrap()
        .id
}

fn seed_routine(conn: &Connection, owner_id: i64, title: &str) -> i64 {
    SqliteRoutineRepository::try_new(conn)
        .unwrap()
        .create_routine(&NewRoutine {
            title: title.to_string(),
            owner_id,
        })
        .unwrap()
}

fn seed_task(conn: &Connection, routine_id: i64, title: &str) -> i64 {
    SqliteTaskRepository::try_new(conn)
        .unwrap()
        .create_task(&NewTask {
            title: title.to_string(),
            routine_id,
            schedule_id: None,
        })
        .unwrap()
}

fn snippet_draft(owner_id: i64, title: &str) -> NewSnippet {
    let mut draft = NewSnippet {
        title: title.to_string(),
        code: "print('hi')\n".to_string(),
        linenos: false,
        language: "python".to_string(),
        style: "InspiredGitHub".to_string(),
        owner_id,
        highlighted: String::new(),
    };
    draft.refresh_highlighted().unwrap();
    draft
}

#[test]
fn repositories_refuse_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteRoutineRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
}

#[test]
fn tokens_are_issued_once_per_user_and_resolve_back() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let alice = repo.create_user("alice").unwrap();

    let token = repo.issue_token(alice.id).unwrap();
    assert_eq!(token.len(), 32);
    assert_eq!(repo.issue_token(alice.id).unwrap(), token);
    assert_eq!(repo.user_for_token(&token).unwrap(), Some(alice.clone()));
    assert_eq!(repo.user_for_token("").unwrap(), None);
    assert_eq!(repo.user_for_token("unknown").unwrap(), None);
    assert!(matches!(
        repo.issue_token(alice.id + 1),
        Err(RepoError::NotFound { entity: "user", .. })
    ));
}

#[test]
fn user_validation_runs_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.create_user("has space"),
        Err(RepoError::Validation(_))
    ));
    assert!(repo.list_users().unwrap().is_empty());
}

#[test]
fn routine_reads_carry_owner_username_and_filter_by_owner() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let morning = seed_routine(&conn, alice, "Morning");
    seed_routine(&conn, bob, "Evening");

    let repo = SqliteRoutineRepository::try_new(&conn).unwrap();
    let loaded = repo.get_routine(morning).unwrap().unwrap();
    assert_eq!(loaded.owner_username, "alice");
    assert_eq!(loaded.title, "Morning");

    let mine = repo
        .list_routines(&RoutineListQuery {
            owner_id: Some(alice),
        })
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(repo.list_routines(&RoutineListQuery::default()).unwrap().len(), 2);
}

#[test]
fn routine_update_keeps_owner_and_missing_rows_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let id = seed_routine(&conn, alice, "Morning");
    let repo = SqliteRoutineRepository::try_new(&conn).unwrap();

    let mut routine = repo.get_routine(id).unwrap().unwrap();
    routine.title = "Early morning".to_string();
    routine.owner_id = alice + 100;
    repo.update_routine(&routine).unwrap();

    let reloaded = repo.get_routine(id).unwrap().unwrap();
    assert_eq!(reloaded.title, "Early morning");
    assert_eq!(reloaded.owner_id, alice);

    assert!(matches!(
        repo.delete_routine(id + 1),
        Err(RepoError::NotFound { entity: "routine", .. })
    ));
    repo.delete_routine(id).unwrap();
    assert!(repo.get_routine(id).unwrap().is_none());
}

#[test]
fn tasks_list_per_routine_in_insert_order() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let morning = seed_routine(&conn, alice, "Morning");
    let evening = seed_routine(&conn, alice, "Evening");
    let stretch = seed_task(&conn, morning, "Stretch");
    let run = seed_task(&conn, morning, "Run");
    seed_task(&conn, evening, "Read");

    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    assert_eq!(repo.task_ids_for_routine(morning).unwrap(), vec![stretch, run]);
    let listed = repo
        .list_tasks(&TaskListQuery {
            routine_id: Some(evening),
        })
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Read");
}

#[test]
fn scheduler_round_trip_and_schedule_link_is_cleared_on_delete() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let routine = seed_routine(&conn, alice, "Morning");
    let task_id = seed_task(&conn, routine, "Stretch");

    let schedulers = SqliteSchedulerRepository::try_new(&conn).unwrap();
    let time = NaiveTime::from_hms_opt(7, 30, 0).unwrap();
    let scheduler_id = schedulers
        .create_scheduler(&NewScheduler {
            timing: Timing::Weekly,
            day: Some(Day::Monday),
            time,
            task_id,
        })
        .unwrap();

    let loaded = schedulers.get_scheduler(scheduler_id).unwrap().unwrap();
    assert_eq!(loaded.timing, Timing::Weekly);
    assert_eq!(loaded.day, Some(Day::Monday));
    assert_eq!(loaded.time, time);
    assert_eq!(
        schedulers
            .list_schedulers(&SchedulerListQuery {
                task_id: Some(task_id)
            })
            .unwrap()
            .len(),
        1
    );

    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut task = tasks.get_task(task_id).unwrap().unwrap();
    task.schedule_id = Some(scheduler_id);
    tasks.update_task(&task).unwrap();

    schedulers.delete_scheduler(scheduler_id).unwrap();
    assert_eq!(tasks.get_task(task_id).unwrap().unwrap().schedule_id, None);
}

#[test]
fn weekly_scheduler_without_day_is_rejected_by_repository() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let routine = seed_routine(&conn, alice, "Morning");
    let task_id = seed_task(&conn, routine, "Stretch");

    let repo = SqliteSchedulerRepository::try_new(&conn).unwrap();
    let result = repo.create_scheduler(&NewScheduler {
        timing: Timing::Weekly,
        day: None,
        time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        task_id,
    });
    assert!(matches!(result, Err(RepoError::Validation(err)) if err.field == "day"));
}

#[test]
fn corrupt_scheduler_time_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let routine = seed_routine(&conn, alice, "Morning");
    let task_id = seed_task(&conn, routine, "Stretch");
    conn.execute(
        "INSERT INTO schedulers (timing, time, task_id) VALUES ('daily', 'noonish', ?1);",
        [task_id],
    )
    .unwrap();

    let repo = SqliteSchedulerRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.get_scheduler(1),
        Err(RepoError::InvalidData(message)) if message.contains("noonish")
    ));
}

#[test]
fn snippets_list_in_creation_order_with_owner_username() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let repo = SqliteSnippetRepository::try_new(&conn).unwrap();

    let first = repo.create_snippet(&snippet_draft(alice, "first")).unwrap();
    let second = repo.create_snippet(&snippet_draft(bob, "second")).unwrap();
    let third = repo.create_snippet(&snippet_draft(alice, "third")).unwrap();

    let all = repo.list_snippets(&SnippetListQuery::default()).unwrap();
    let ids: Vec<i64> = all.iter().map(|snippet| snippet.id).collect();
    assert_eq!(ids, vec![first, second, third]);
    assert_eq!(all[1].owner_username, "bob");
    assert!(all[0].highlighted.contains("<title>first</title>"));
    assert_eq!(repo.snippet_ids_for_owner(alice).unwrap(), vec![first, third]);
}

#[test]
fn snippet_with_unknown_language_is_not_persisted() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let repo = SqliteSnippetRepository::try_new(&conn).unwrap();

    let mut draft = snippet_draft(alice, "bad");
    draft.language = "klingon".to_string();
    assert!(matches!(
        repo.create_snippet(&draft),
        Err(RepoError::Validation(err)) if err.field == "language"
    ));
    assert!(repo.list_snippets(&SnippetListQuery::default()).unwrap().is_empty());
}
