use std::collections::{BTreeSet, HashSet};

use chrono::Utc;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use topic_tangle_allocator::{
    allocate, allocate_configured, allocate_seeded, allocate_with, attach_icebreakers,
    prepare_selections,
    AllocatorOptions, LeftoverPolicy, QuestionBank, RoomConfig, RoomResults, Topic, TopicId,
    UserId, UserSelection,
};

fn room(topics: &[&str], min_group_size: usize, max_group_size: usize) -> RoomConfig {
    RoomConfig {
        id: "ROOM01".to_owned(),
        organizer_id: "organizer".into(),
        topics: topics
            .iter()
            .map(|&topic| Topic {
                id: topic.into(),
                name: format!("Topic {topic}"),
            })
            .collect(),
        min_group_size,
        max_group_size,
        created_at: Utc::now(),
        style: None,
    }
}

fn selection(user: &str, topics: &[&str]) -> UserSelection {
    UserSelection {
        user_id: user.into(),
        room_id: "ROOM01".to_owned(),
        selected_topics: topics.iter().map(|&topic| topic.into()).collect(),
        updated_at: Utc::now(),
    }
}

fn members(results: &RoomResults, user: &str) -> BTreeSet<String> {
    results
        .groups
        .iter()
        .find(|group| group.members.contains(&UserId::from(user)))
        .map(|group| group.members.iter().map(|member| member.0.clone()).collect())
        .unwrap_or_default()
}

fn set(users: &[&str]) -> BTreeSet<String> {
    users.iter().map(|&user| user.to_owned()).collect()
}

fn sizes(results: &RoomResults) -> Vec<usize> {
    let mut sizes: Vec<usize> = results.groups.iter().map(|group| group.members.len()).collect();
    sizes.sort_unstable();
    sizes
}

#[test]
fn empty_room_has_no_groups() {
    let results = allocate_seeded(&room(&["A", "B"], 2, 4), &[], 0);
    assert_eq!(results.room_id, "ROOM01");
    assert!(results.groups.is_empty());
    assert!(results.unassigned_users.is_empty());
}

#[test]
fn users_sharing_one_topic_form_one_group() {
    let selections = [
        selection("user1", &["A"]),
        selection("user2", &["A"]),
        selection("user3", &["A"]),
    ];
    for seed in 0..20 {
        let results = allocate_seeded(&room(&["A", "B", "C"], 2, 4), &selections, seed);
        assert_eq!(results.groups.len(), 1);
        assert_eq!(members(&results, "user1"), set(&["user1", "user2", "user3"]));
        assert_eq!(results.groups[0].assigned_topics, vec![TopicId::from("A")]);
    }
}

#[test]
fn disjoint_interests_form_separate_groups() {
    let selections = [
        selection("u1", &["A"]),
        selection("u2", &["A"]),
        selection("u3", &["B"]),
        selection("u4", &["B"]),
    ];
    for seed in 0..20 {
        let results = allocate_seeded(&room(&["A", "B"], 2, 2), &selections, seed);
        assert_eq!(results.groups.len(), 2);
        assert_eq!(members(&results, "u1"), set(&["u1", "u2"]));
        assert_eq!(members(&results, "u3"), set(&["u3", "u4"]));
        for group in &results.groups {
            let expected = if group.members.contains(&"u1".into()) { "A" } else { "B" };
            assert_eq!(group.assigned_topics, vec![TopicId::from(expected)]);
        }
    }
}

#[test]
fn group_topic_comes_from_the_seed_overlap() {
    let selections = [
        selection("user1", &["A", "B"]),
        selection("user2", &["A"]),
        selection("user3", &["C", "D"]),
        selection("user4", &["C"]),
    ];
    for seed in 0..20 {
        let results = allocate_seeded(&room(&["A", "B", "C", "D"], 2, 2), &selections, seed);
        assert_eq!(results.groups.len(), 2);
        assert_eq!(members(&results, "user1"), set(&["user1", "user2"]));
        assert_eq!(members(&results, "user3"), set(&["user3", "user4"]));
        for group in &results.groups {
            let expected = if group.members.contains(&"user1".into()) { "A" } else { "C" };
            assert_eq!(group.assigned_topics, vec![TopicId::from(expected)]);
        }
    }
}

#[test]
fn leftovers_join_a_group_with_room() {
    let selections = [
        selection("user1", &["A"]),
        selection("user2", &["A"]),
        selection("user3", &["B"]),
    ];
    let results = allocate_seeded(&room(&["A", "B"], 2, 3), &selections, 1);
    assert_eq!(results.groups.len(), 1);
    assert_eq!(members(&results, "user3"), set(&["user1", "user2", "user3"]));
    assert_eq!(results.groups[0].assigned_topics, vec![TopicId::from("A")]);
}

#[test]
fn leftovers_found_a_new_group_when_all_are_full() {
    let selections = [
        selection("user1", &["A"]),
        selection("user2", &["A"]),
        selection("user3", &["B"]),
    ];
    let results = allocate_seeded(&room(&["A", "B"], 2, 2), &selections, 1);
    assert_eq!(results.groups.len(), 2);
    let single = results
        .groups
        .iter()
        .find(|group| group.members.len() == 1)
        .unwrap();
    assert_eq!(single.members, vec![UserId::from("user3")]);
    assert_eq!(single.assigned_topics, vec![TopicId::from("B")]);
}

#[test]
fn leftovers_fill_the_smallest_group_first() {
    let selections = [
        selection("user1", &["A"]),
        selection("user2", &["A"]),
        selection("user3", &["B"]),
        selection("user4", &["B"]),
        selection("user5", &["C"]),
    ];
    for seed in 0..20 {
        let results = allocate_seeded(&room(&["A", "B", "C"], 2, 4), &selections, seed);
        assert_eq!(sizes(&results), vec![2, 3]);
    }
}

#[test]
fn users_without_common_topics_spread_over_small_groups() {
    let selections = [
        selection("user1", &["A"]),
        selection("user2", &["A"]),
        selection("user3", &["B"]),
        selection("user4", &["C"]),
        selection("user5", &["D"]),
    ];
    let results = allocate_seeded(&room(&["A", "B", "C", "D"], 2, 3), &selections, 4);
    assert_eq!(sizes(&results), vec![2, 3]);
    assert_eq!(members(&results, "user1"), set(&["user1", "user2", "user3"]));
    assert_eq!(members(&results, "user4"), set(&["user4", "user5"]));
    assert_eq!(
        results
            .groups
            .iter()
            .find(|group| group.members.contains(&"user4".into()))
            .unwrap()
            .assigned_topics,
        vec![TopicId::from("C")]
    );
}

#[test]
fn unsatisfiable_minimum_still_places_everyone() {
    let selections = [
        selection("u1", &["A"]),
        selection("u2", &["A"]),
        selection("u3", &["B"]),
    ];
    let results = allocate_seeded(&room(&["A", "B"], 3, 5), &selections, 2);
    assert!(results.unassigned_users.is_empty());
    assert_eq!(results.all_users().count(), 3);
    assert_eq!(sizes(&results), vec![3]);
}

#[test]
fn minimum_is_capped_by_the_number_of_users() {
    let selections = [selection("u1", &["A"]), selection("u2", &["A"])];
    let results = allocate_seeded(&room(&["A", "B"], 5, 10), &selections, 2);
    assert_eq!(results.groups.len(), 1);
    assert_eq!(results.groups[0].assigned_topics, vec![TopicId::from("A")]);
}

#[test]
fn single_user_without_topics_gets_the_general_topic() {
    let results = allocate_seeded(&room(&["A", "B"], 2, 4), &[selection("u1", &[])], 0);
    assert_eq!(results.groups.len(), 1);
    assert_eq!(
        results.groups[0].assigned_topics,
        vec![TopicId::general_discussion()]
    );
}

fn topic_match(seed: u64) -> AllocatorOptions {
    AllocatorOptions {
        leftover_policy: LeftoverPolicy::TopicMatch,
        seed: Some(seed),
    }
}

#[test]
fn topic_match_leaves_out_users_once_every_group_is_full() {
    let room = room(&["A", "B", "C"], 2, 2);
    let raw = [
        selection("u1", &["A"]),
        selection("u2", &["A"]),
        selection("u3", &["B"]),
        selection("u4", &["B"]),
        selection("u5", &["C"]),
        selection("u6", &[]),
    ];
    let prepared = prepare_selections(&room, &raw);
    assert_eq!(prepared.len(), 5);
    for seed in 0..50 {
        let results = allocate_configured(&room, &prepared, &topic_match(seed));
        assert_eq!(results.unassigned_users, vec![UserId::from("u5")], "seed {seed}");
        assert_eq!(sizes(&results), vec![2, 2], "seed {seed}");
    }
}

#[test]
fn topic_match_founds_groups_while_others_have_room() {
    let selections = [
        selection("u1", &["A"]),
        selection("u2", &["A"]),
        selection("u3", &[]),
        selection("u4", &["B"]),
    ];
    let results = allocate_configured(&room(&["A", "B"], 2, 4), &selections, &topic_match(3));
    assert!(results.unassigned_users.is_empty());
    assert_eq!(members(&results, "u1"), set(&["u1", "u2"]));
    assert_eq!(members(&results, "u3"), set(&["u3"]));
    assert_eq!(members(&results, "u4"), set(&["u4"]));
}

#[test]
fn released_users_are_seeded_again() {
    let room = room(&["A", "B"], 4, 5);
    let selections = [
        selection("a", &["A", "B"]),
        selection("b", &["A", "B"]),
        selection("c", &["A"]),
        selection("d", &["A"]),
    ];
    for seed in 0..50 {
        let results = allocate_seeded(&room, &selections, seed);
        assert_eq!(results.groups.len(), 1, "seed {seed}");
        assert_eq!(results.groups[0].assigned_topics, vec![TopicId::from("A")], "seed {seed}");
        assert_eq!(sizes(&results), vec![4], "seed {seed}");
    }
}

#[test]
fn configured_seed_is_honored() {
    let room = room(&["A", "B", "C"], 2, 3);
    let selections: Vec<UserSelection> = (0..12)
        .map(|index| selection(&format!("u{index}"), &[["A", "B", "C"][index % 3]]))
        .collect();
    let options = AllocatorOptions {
        seed: Some(21),
        ..AllocatorOptions::default()
    };
    let first = allocate_configured(&room, &selections, &options);
    let second = allocate_configured(&room, &selections, &options);
    assert_eq!(first.groups, second.groups);
    let explicit = allocate_with(&room, &selections, &options, &mut StdRng::seed_from_u64(21));
    assert_eq!(first.groups, explicit.groups);
}

#[test]
fn seeded_runs_repeat() {
    let selections: Vec<UserSelection> = (0..25)
        .map(|index| {
            let topics = ["A", "B", "C", "D"];
            let picked: Vec<&str> = topics
                .iter()
                .enumerate()
                .filter(|(topic, _)| (index * 7 + topic * 3) % 5 < 2)
                .map(|(_, &topic)| topic)
                .collect();
            selection(&format!("u{index}"), &picked)
        })
        .collect();
    let room = room(&["A", "B", "C", "D"], 3, 5);
    let first = allocate_seeded(&room, &selections, 99);
    let second = allocate_seeded(&room, &selections, 99);
    assert_eq!(first.groups, second.groups);
    assert_eq!(first.unassigned_users, second.unassigned_users);
}

#[test]
fn results_round_trip_through_the_wire_format() {
    let room = room(&["A", "B"], 2, 4);
    let selections = [selection("u1", &["A"]), selection("u2", &["A"])];
    let mut results = allocate_seeded(&room, &selections, 5);
    attach_icebreakers(&room, &mut results, &QuestionBank::new(5));
    assert!(!results.groups[0].icebreaker_questions.is_empty());

    let json = serde_json::to_value(&results).unwrap();
    assert!(json["groups"][0]["assignedTopics"].is_array());
    assert!(json["groups"][0]["icebreakerQuestions"].is_array());
    assert!(json["unassignedUsers"].is_array());
    let decoded: RoomResults = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, results);
}

#[test]
fn prepared_selections_feed_the_allocator() {
    let room = room(&["A", "B"], 2, 4);
    let raw = [
        selection("u1", &["A", "ghost"]),
        selection("u2", &["ghost"]),
        selection("u3", &["A"]),
        selection("u1", &["A"]),
    ];
    let prepared = prepare_selections(&room, &raw);
    let mut rng = StdRng::seed_from_u64(8);
    let results = allocate(&room, &prepared, &mut rng);
    let users: HashSet<&UserId> = results.all_users().collect();
    assert_eq!(users.len(), 2);
    assert!(!users.contains(&UserId::from("u2")));
}

fn scenario() -> impl Strategy<Value = (RoomConfig, Vec<UserSelection>)> {
    (
        2usize..6,
        1usize..5,
        proptest::collection::vec(proptest::collection::btree_set(0usize..6, 0..4), 0..30),
    )
        .prop_map(|(min_group_size, spread, picks)| {
            let topics: Vec<String> = (0..6).map(|topic| format!("T{topic}")).collect();
            let topic_names: Vec<&str> = topics.iter().map(String::as_str).collect();
            let room = room(&topic_names, min_group_size, min_group_size + spread);
            let selections = picks
                .iter()
                .enumerate()
                .map(|(index, picked)| {
                    let picked: Vec<&str> = picked.iter().map(|&topic| topic_names[topic]).collect();
                    selection(&format!("u{index}"), &picked)
                })
                .collect();
            (room, selections)
        })
}

fn policy() -> impl Strategy<Value = LeftoverPolicy> {
    prop_oneof![Just(LeftoverPolicy::PlaceAll), Just(LeftoverPolicy::TopicMatch)]
}

proptest! {
    #[test]
    fn every_user_appears_exactly_once(
        (room, selections) in scenario(),
        leftover_policy in policy(),
        seed in any::<u64>()
    ) {
        let options = AllocatorOptions { leftover_policy, seed: Some(seed) };
        let results = allocate_configured(&room, &selections, &options);

        let mut seen = HashSet::new();
        for user in results.all_users() {
            prop_assert!(seen.insert(user.clone()), "{} appears twice", user);
        }
        let expected: HashSet<UserId> =
            selections.iter().map(|selection| selection.user_id.clone()).collect();
        prop_assert_eq!(seen, expected);

        if leftover_policy == LeftoverPolicy::PlaceAll {
            prop_assert!(results.unassigned_users.is_empty());
        } else if !results.unassigned_users.is_empty() {
            prop_assert!(results
                .groups
                .iter()
                .all(|group| group.members.len() == room.max_group_size));
        }
    }

    #[test]
    fn groups_have_one_topic_and_respect_capacity(
        (room, selections) in scenario(),
        leftover_policy in policy(),
        seed in any::<u64>()
    ) {
        let options = AllocatorOptions { leftover_policy, seed: Some(seed) };
        let results = allocate_configured(&room, &selections, &options);
        for group in &results.groups {
            prop_assert_eq!(group.assigned_topics.len(), 1);
            prop_assert!(!group.members.is_empty());
            prop_assert!(group.members.len() <= room.max_group_size);
            prop_assert_eq!(&group.room_id, &room.id);
        }
    }

    #[test]
    fn same_seed_same_groups((room, selections) in scenario(), seed in any::<u64>()) {
        let first = allocate_seeded(&room, &selections, seed);
        let second = allocate_seeded(&room, &selections, seed);
        prop_assert_eq!(first.groups, second.groups);
        prop_assert_eq!(first.unassigned_users, second.unassigned_users);
    }
}
