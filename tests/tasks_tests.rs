use chrono::{Duration, Utc};
use teamfold::{NewTask, Position, TaskId, TeamFold, TeamFoldError, User, UserId};

fn seed_user(tf: &TeamFold, id: &str, position: Position) -> User {
    let user = User {
        id: UserId::new(id),
        first_name: id.to_string(),
        last_name: "Test".to_string(),
        email: format!("{}@example.org", id),
        position,
        active: true,
    };
    tf.directory().create_user(user.clone()).unwrap();
    user
}

fn new_task(name: &str, assignee: &User, due_days: i64) -> NewTask {
    NewTask {
        name: name.to_string(),
        description: None,
        assignee: assignee.id.clone(),
        due_date: Utc::now() + Duration::days(due_days),
    }
}

#[test]
fn test_assignment_requires_elevated_creator() {
    let tf = TeamFold::temporary().unwrap();
    let member = seed_user(&tf, "member", Position::Member);

    let result = tf.tasks().assign_task(&member, new_task("tidy", &member, 1));
    assert!(matches!(result, Err(TeamFoldError::PermissionDenied(_))));
}

#[test]
fn test_assignment_rejects_unknown_assignee() {
    let tf = TeamFold::temporary().unwrap();
    let lead = seed_user(&tf, "lead", Position::Leader);

    let result = tf.tasks().assign_task(
        &lead,
        NewTask {
            name: "phantom".to_string(),
            description: None,
            assignee: UserId::new("nobody"),
            due_date: Utc::now(),
        },
    );
    assert!(matches!(result, Err(TeamFoldError::UnknownUser(_))));
}

#[test]
fn test_assignment_trims_fields() {
    let tf = TeamFold::temporary().unwrap();
    let lead = seed_user(&tf, "lead", Position::Leader);
    let alice = seed_user(&tf, "alice", Position::Member);

    let mut params = new_task("  write minutes ", &alice, 2);
    params.description = Some("  ".to_string());
    let task = tf.tasks().assign_task(&lead, params).unwrap();
    assert_eq!(task.name, "write minutes");
    assert!(task.description.is_none());
    assert!(!task.completed);
}

#[test]
fn test_pending_and_completed_split_sorted_by_due_date() {
    let tf = TeamFold::temporary().unwrap();
    let lead = seed_user(&tf, "lead", Position::Leader);
    let alice = seed_user(&tf, "alice", Position::Member);
    let bob = seed_user(&tf, "bob", Position::Member);

    let late = tf.tasks().assign_task(&lead, new_task("late", &alice, 9)).unwrap();
    let soon = tf.tasks().assign_task(&lead, new_task("soon", &alice, 1)).unwrap();
    tf.tasks().assign_task(&lead, new_task("other", &bob, 3)).unwrap();

    let pending = tf.tasks().pending_tasks(&alice.id).unwrap();
    let names: Vec<&str> = pending.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["soon", "late"]);

    tf.tasks().complete_task(&alice, &soon.id).unwrap();
    let pending = tf.tasks().pending_tasks(&alice.id).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, late.id);
    let completed = tf.tasks().completed_tasks(&alice.id).unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, soon.id);
}

#[test]
fn test_completion_by_assignee_or_elevated_only() {
    let tf = TeamFold::temporary().unwrap();
    let lead = seed_user(&tf, "lead", Position::Leader);
    let alice = seed_user(&tf, "alice", Position::Member);
    let bob = seed_user(&tf, "bob", Position::Member);

    let task = tf.tasks().assign_task(&lead, new_task("sweep", &alice, 1)).unwrap();

    let denied = tf.tasks().complete_task(&bob, &task.id);
    assert!(matches!(denied, Err(TeamFoldError::PermissionDenied(_))));

    // The elevated creator may close it out on the assignee's behalf.
    let done = tf.tasks().complete_task(&lead, &task.id).unwrap();
    assert!(done.completed);

    assert!(matches!(
        tf.tasks().complete_task(&alice, &TaskId::new("t-missing")),
        Err(TeamFoldError::NotFound(_))
    ));
}
