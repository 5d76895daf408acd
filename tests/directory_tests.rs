use std::collections::BTreeSet;
use teamfold::{Group, GroupId, GroupRule, Position, TeamFold, TeamFoldError, User, UserId};

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

fn ids(users: &[&User]) -> BTreeSet<UserId> {
    users.iter().map(|u| u.id.clone()).collect()
}

#[test]
fn test_stored_group_membership_both_directions() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    let bob = seed_user(&tf, "bob");
    let carol = seed_user(&tf, "carol");
    define_stored(&tf, "g-eng", "Engineering", &[&alice, &bob]);

    let members = tf.directory().members_of(&GroupId::new("g-eng")).unwrap();
    assert_eq!(members, ids(&[&alice, &bob]));

    assert!(tf
        .directory()
        .groups_of(&alice.id)
        .unwrap()
        .contains(&GroupId::new("g-eng")));
    assert!(tf.directory().groups_of(&carol.id).unwrap().is_empty());
}

#[test]
fn test_groups_of_unknown_user_is_an_error() {
    let tf = TeamFold::temporary().unwrap();
    let result = tf.directory().groups_of(&UserId::new("nobody"));
    assert!(matches!(result, Err(TeamFoldError::UnknownUser(_))));
}

#[test]
fn test_members_of_unknown_group_is_not_found() {
    let tf = TeamFold::temporary().unwrap();
    let result = tf.directory().members_of(&GroupId::new("g-ghost"));
    assert!(matches!(result, Err(TeamFoldError::NotFound(_))));
}

#[test]
fn test_everyone_rule_tracks_user_creation() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    tf.directory()
        .define_group(Group::new(GroupId::new("g-all"), "All", GroupRule::Everyone))
        .unwrap();

    assert_eq!(
        tf.directory().members_of(&GroupId::new("g-all")).unwrap(),
        ids(&[&alice])
    );

    // A new user must appear immediately; the cache is dropped on mutation.
    let bob = seed_user(&tf, "bob");
    assert_eq!(
        tf.directory().members_of(&GroupId::new("g-all")).unwrap(),
        ids(&[&alice, &bob])
    );
}

#[test]
fn test_excluding_rule_subtracts_users() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    let bob = seed_user(&tf, "bob");
    tf.directory()
        .define_group(Group::new(GroupId::new("g-all"), "All", GroupRule::Everyone))
        .unwrap();
    tf.directory()
        .define_group(Group::new(
            GroupId::new("g-no-alice"),
            "Everyone but Alice",
            GroupRule::Excluding {
                base: GroupId::new("g-all"),
                excluded: [alice.id.clone()].into_iter().collect(),
            },
        ))
        .unwrap();

    assert_eq!(
        tf.directory()
            .members_of(&GroupId::new("g-no-alice"))
            .unwrap(),
        ids(&[&bob])
    );
    // groups_of agrees with members_of for virtual groups too.
    assert!(!tf
        .directory()
        .groups_of(&alice.id)
        .unwrap()
        .contains(&GroupId::new("g-no-alice")));
    assert!(tf
        .directory()
        .groups_of(&bob.id)
        .unwrap()
        .contains(&GroupId::new("g-no-alice")));
}

#[test]
fn test_union_of_virtual_groups_terminates_and_combines() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    let bob = seed_user(&tf, "bob");
    let carol = seed_user(&tf, "carol");
    define_stored(&tf, "g-left", "Left", &[&alice]);
    tf.directory()
        .define_group(Group::new(
            GroupId::new("g-right"),
            "Right",
            GroupRule::Excluding {
                base: GroupId::new("g-left"),
                excluded: [alice.id.clone()].into_iter().collect(),
            },
        ))
        .unwrap();
    define_stored(&tf, "g-extra", "Extra", &[&bob, &carol]);
    tf.directory()
        .define_group(Group::new(
            GroupId::new("g-union"),
            "Union",
            GroupRule::Union {
                left: GroupId::new("g-right"),
                right: GroupId::new("g-extra"),
            },
        ))
        .unwrap();

    assert_eq!(
        tf.directory().members_of(&GroupId::new("g-union")).unwrap(),
        ids(&[&bob, &carol])
    );
}

#[test]
fn test_self_referencing_rule_rejected_at_definition_time() {
    let tf = TeamFold::temporary().unwrap();
    seed_user(&tf, "alice");
    define_stored(&tf, "g-a", "A", &[]);

    let result = tf.directory().define_group(Group::new(
        GroupId::new("g-loop"),
        "Loop",
        GroupRule::Union {
            left: GroupId::new("g-loop"),
            right: GroupId::new("g-a"),
        },
    ));
    assert!(matches!(result, Err(TeamFoldError::GroupCycle(_))));
}

#[test]
fn test_redefinition_closing_a_cycle_is_rejected() {
    let tf = TeamFold::temporary().unwrap();
    seed_user(&tf, "alice");
    define_stored(&tf, "g-b", "B", &[]);
    tf.directory()
        .define_group(Group::new(
            GroupId::new("g-a"),
            "A",
            GroupRule::Excluding {
                base: GroupId::new("g-b"),
                excluded: BTreeSet::new(),
            },
        ))
        .unwrap();

    // g-b -> g-a -> g-b would never terminate; refuse the redefinition.
    let result = tf.directory().define_group(Group::new(
        GroupId::new("g-b"),
        "B",
        GroupRule::Excluding {
            base: GroupId::new("g-a"),
            excluded: BTreeSet::new(),
        },
    ));
    assert!(matches!(result, Err(TeamFoldError::GroupCycle(_))));
}

#[test]
fn test_rule_referencing_unknown_group_is_rejected() {
    let tf = TeamFold::temporary().unwrap();
    let result = tf.directory().define_group(Group::new(
        GroupId::new("g-x"),
        "X",
        GroupRule::Union {
            left: GroupId::new("g-missing"),
            right: GroupId::new("g-also-missing"),
        },
    ));
    assert!(matches!(result, Err(TeamFoldError::NotFound(_))));
}

#[test]
fn test_rule_naming_unknown_user_is_rejected() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");

    let result = tf.directory().define_group(Group::new(
        GroupId::new("g-bad"),
        "Bad",
        GroupRule::stored([UserId::new("ghost")]),
    ));
    assert!(matches!(result, Err(TeamFoldError::UnknownUser(_))));

    define_stored(&tf, "g-base", "Base", &[&alice]);
    let result = tf.directory().define_group(Group::new(
        GroupId::new("g-bad"),
        "Bad",
        GroupRule::Excluding {
            base: GroupId::new("g-base"),
            excluded: [UserId::new("ghost")].into_iter().collect(),
        },
    ));
    assert!(matches!(result, Err(TeamFoldError::UnknownUser(_))));

    // Nothing was defined by either rejected attempt.
    assert!(matches!(
        tf.directory().get_group(&GroupId::new("g-bad")),
        Err(TeamFoldError::NotFound(_))
    ));
}

#[test]
fn test_groups_of_resolves_nested_virtual_rules() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    let bob = seed_user(&tf, "bob");
    define_stored(&tf, "g-eng", "Engineering", &[&alice]);
    tf.directory()
        .define_group(Group::new(GroupId::new("g-all"), "All", GroupRule::Everyone))
        .unwrap();
    tf.directory()
        .define_group(Group::new(
            GroupId::new("g-noncore"),
            "Non-core",
            GroupRule::Excluding {
                base: GroupId::new("g-all"),
                excluded: [alice.id.clone()].into_iter().collect(),
            },
        ))
        .unwrap();
    tf.directory()
        .define_group(Group::new(
            GroupId::new("g-combo"),
            "Combo",
            GroupRule::Union {
                left: GroupId::new("g-eng"),
                right: GroupId::new("g-noncore"),
            },
        ))
        .unwrap();

    let alice_groups = tf.directory().groups_of(&alice.id).unwrap();
    let expected: BTreeSet<GroupId> =
        [GroupId::new("g-eng"), GroupId::new("g-all"), GroupId::new("g-combo")]
            .into_iter()
            .collect();
    assert_eq!(alice_groups, expected);

    let bob_groups = tf.directory().groups_of(&bob.id).unwrap();
    let expected: BTreeSet<GroupId> = [
        GroupId::new("g-all"),
        GroupId::new("g-noncore"),
        GroupId::new("g-combo"),
    ]
    .into_iter()
    .collect();
    assert_eq!(bob_groups, expected);
}

#[test]
fn test_add_member_takes_effect_immediately() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    let bob = seed_user(&tf, "bob");
    define_stored(&tf, "g-eng", "Engineering", &[&alice]);

    let group_id = GroupId::new("g-eng");
    // Prime the cache, then mutate.
    assert_eq!(tf.directory().members_of(&group_id).unwrap(), ids(&[&alice]));
    tf.directory().add_member(&group_id, &bob.id).unwrap();
    assert_eq!(
        tf.directory().members_of(&group_id).unwrap(),
        ids(&[&alice, &bob])
    );

    tf.directory().remove_member(&group_id, &alice.id).unwrap();
    assert_eq!(tf.directory().members_of(&group_id).unwrap(), ids(&[&bob]));
}

#[test]
fn test_member_mutation_on_virtual_group_is_rejected() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    tf.directory()
        .define_group(Group::new(GroupId::new("g-all"), "All", GroupRule::Everyone))
        .unwrap();

    let result = tf.directory().add_member(&GroupId::new("g-all"), &alice.id);
    assert!(matches!(result, Err(TeamFoldError::Validation(_))));
}

#[test]
fn test_remove_group_refused_while_referenced() {
    let tf = TeamFold::temporary().unwrap();
    seed_user(&tf, "alice");
    define_stored(&tf, "g-base", "Base", &[]);
    tf.directory()
        .define_group(Group::new(
            GroupId::new("g-derived"),
            "Derived",
            GroupRule::Excluding {
                base: GroupId::new("g-base"),
                excluded: BTreeSet::new(),
            },
        ))
        .unwrap();

    let blocked = tf.directory().remove_group(&GroupId::new("g-base"));
    assert!(matches!(blocked, Err(TeamFoldError::Validation(_))));

    tf.directory().remove_group(&GroupId::new("g-derived")).unwrap();
    tf.directory().remove_group(&GroupId::new("g-base")).unwrap();
    assert!(matches!(
        tf.directory().members_of(&GroupId::new("g-base")),
        Err(TeamFoldError::NotFound(_))
    ));
}

#[test]
fn test_deactivation_does_not_change_membership() {
    let tf = TeamFold::temporary().unwrap();
    let alice = seed_user(&tf, "alice");
    define_stored(&tf, "g-eng", "Engineering", &[&alice]);

    tf.directory().set_user_active(&alice.id, false).unwrap();
    assert!(tf
        .directory()
        .members_of(&GroupId::new("g-eng"))
        .unwrap()
        .contains(&alice.id));
    assert!(!tf.directory().get_user(&alice.id).unwrap().active);
}
