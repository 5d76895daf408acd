use teamfold::{
    Audience, Group, GroupId, GroupRule, Position, RawAudience, TeamFold, TeamFoldError, User,
    UserId,
};

fn seed_user(tf: &TeamFold, id: &str) -> User {
    let user = User {
        id: UserId::new(id),
        first_name: id.to_string(),
        last_name: "Test".to_string(),
        email: format!("{}@example.org", id),
        position: Position::Member,
        active: true,
    };
    tf.directory().create_user(user.clone()).unwrap();
    user
}

fn define_stored(tf: &TeamFold, id: &str, name: &str, members: &[&User]) {
    tf.directory()
        .define_group(Group::new(
            GroupId::new(id),
            name,
            GroupRule::stored(members.iter().map(|u| u.id.clone())),
        ))
        .unwrap();
}

fn raw(users: &[&User], groups: &[&str]) -> RawAudience {
    RawAudience {
        users: users.iter().map(|u| u.id.clone()).collect(),
        groups: groups.iter().map(|g| GroupId::new(*g)).collect(),
    }
}

#[test]
fn test_expand_unions_explicit_users_and_group_members() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    let bob = seed_user(&tf, "bob");
    let carol = seed_user(&tf, "carol");
    let dave = seed_user(&tf, "dave");
    define_stored(&tf, "g-eng", "Engineering", &[&alice, &bob]);

    // Alice is both listed explicitly and a member of the group; she must
    // appear exactly once in the expansion.
    let audience = tf
        .resolver()
        .normalize(raw(&[&carol, &alice], &["g-eng"]))
        .unwrap();
    let members = tf.resolver().expand(&audience).unwrap();
    let expected: std::collections::BTreeSet<UserId> =
        [&alice, &bob, &carol].iter().map(|u| u.id.clone()).collect();
    assert_eq!(members, expected);
    // Stable with no intervening directory change.
    assert_eq!(tf.resolver().expand(&audience).unwrap(), members);

    assert!(tf.resolver().contains(&audience, &carol.id).unwrap());
    assert!(tf.resolver().contains(&audience, &alice.id).unwrap());
    assert!(!tf.resolver().contains(&audience, &dave.id).unwrap());
}

#[test]
fn test_normalize_deduplicates_members() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    define_stored(&tf, "g-eng", "Engineering", &[&alice]);

    let audience = tf
        .resolver()
        .normalize(RawAudience {
            users: vec![alice.id.clone(), alice.id.clone()],
            groups: vec![GroupId::new("g-eng"), GroupId::new("g-eng")],
        })
        .unwrap();
    assert_eq!(audience.users.len(), 1);
    assert_eq!(audience.groups.len(), 1);
}

#[test]
fn test_normalize_rejects_unknown_group() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    let result = tf.resolver().normalize(raw(&[&alice], &["g-nope"]));
    assert!(matches!(result, Err(TeamFoldError::InvalidAudience(_))));
}

#[test]
fn test_normalize_rejects_empty_expansion() {
    let tf = TeamFold::temporary().unwrap();
    seed_user(&tf, "alice");
    define_stored(&tf, "g-empty", "Empty", &[]);

    let result = tf.resolver().normalize(raw(&[], &["g-empty"]));
    assert!(matches!(result, Err(TeamFoldError::EmptyAudience)));

    let result = tf.resolver().normalize(raw(&[], &[]));
    assert!(matches!(result, Err(TeamFoldError::EmptyAudience)));
}

#[test]
fn test_unknown_group_reported_before_empty_expansion() {
    let tf = TeamFold::temporary().unwrap();
    let result = tf.resolver().normalize(raw(&[], &["g-nope"]));
    assert!(matches!(result, Err(TeamFoldError::InvalidAudience(_))));
}

#[test]
fn test_contains_tracks_current_group_membership() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    let bob = seed_user(&tf, "bob");
    define_stored(&tf, "g-eng", "Engineering", &[&alice]);

    let audience = Audience::new(Vec::new(), [GroupId::new("g-eng")]);
    assert!(!tf.resolver().contains(&audience, &bob.id).unwrap());

    // Audience values are immutable; visibility still follows the group.
    tf.directory()
        .add_member(&GroupId::new("g-eng"), &bob.id)
        .unwrap();
    assert!(tf.resolver().contains(&audience, &bob.id).unwrap());
}

#[test]
fn test_expand_includes_deactivated_members() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    define_stored(&tf, "g-eng", "Engineering", &[&alice]);
    tf.directory().set_user_active(&alice.id, false).unwrap();

    let audience = Audience::new(Vec::new(), [GroupId::new("g-eng")]);
    assert!(tf.resolver().expand(&audience).unwrap().contains(&alice.id));
}

#[test]
fn test_ensure_includes_names_the_missing_user() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    let bob = seed_user(&tf, "bob");
    define_stored(&tf, "g-eng", "Engineering", &[&alice]);

    let audience = Audience::new(Vec::new(), [GroupId::new("g-eng")]);
    tf.resolver().ensure_includes(&audience, &alice.id).unwrap();

    let result = tf.resolver().ensure_includes(&audience, &bob.id);
    match result {
        Err(TeamFoldError::CreatorExcluded(id)) => assert_eq!(id, bob.id.to_string()),
        other => panic!("expected CreatorExcluded, got {:?}", other),
    }
}
