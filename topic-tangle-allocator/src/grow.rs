use core::cmp::Reverse;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::model::{BreakoutGroup, GroupId, RoomConfig, TopicId};
use crate::pairs::{score_pairs, Participant};
use crate::topic::choose_topic;

/// Builds groups from the strongest pairs first.
///
/// `placed` is indexed like `participants` and is true afterwards exactly for the
/// members of the returned groups. Groups that end up smaller than the room minimum
/// (capped at the number of participants) are dissolved again and their members
/// stay available for later pairs.
pub fn seed_and_grow<R: Rng + ?Sized>(
    room: &RoomConfig,
    participants: &[Participant],
    placed: &mut [bool],
    rng: &mut R,
) -> Vec<BreakoutGroup> {
    let min_group_size = room.min_group_size.min(participants.len());

    let mut pairs = score_pairs(participants);
    // shuffle first so the stable sort leaves equal overlaps in random order
    pairs.shuffle(rng);
    pairs.sort_by_key(|pair| Reverse(pair.common_topics.len()));

    let mut groups = Vec::new();
    for pair in &pairs {
        if placed[pair.first] || placed[pair.second] {
            continue;
        }
        if pair.common_topics.is_empty() {
            break;
        }

        let topic = choose_topic(&pair.common_topics, rng);
        let mut members = vec![pair.first, pair.second];
        placed[pair.first] = true;
        placed[pair.second] = true;

        grow(
            &mut members,
            &topic,
            participants,
            placed,
            room.max_group_size,
            rng,
        );

        if members.len() >= min_group_size {
            debug!(%topic, size = members.len(), "committed group");
            let members = members
                .iter()
                .map(|&index| participants[index].user_id.clone())
                .collect();
            groups.push(BreakoutGroup::new(
                GroupId::random(rng),
                &room.id,
                members,
                topic,
            ));
        } else {
            debug!(%topic, size = members.len(), min_group_size, "dissolved undersized group");
            for member in members {
                placed[member] = false;
            }
        }
    }
    groups
}

/// Pulls unplaced participants who selected `topic` into the group, best connected first.
fn grow<R: Rng + ?Sized>(
    members: &mut Vec<usize>,
    topic: &TopicId,
    participants: &[Participant],
    placed: &mut [bool],
    max_group_size: usize,
    rng: &mut R,
) {
    let mut candidates: Vec<(usize, usize)> = participants
        .iter()
        .enumerate()
        .filter(|&(index, participant)| !placed[index] && participant.topics.contains(topic))
        .map(|(index, participant)| {
            let score = relevance_score(participant, members.as_slice(), participants);
            (index, score)
        })
        .collect();
    candidates.shuffle(rng);
    candidates.sort_by_key(|&(_, score)| Reverse(score));

    for (candidate, _) in candidates {
        if members.len() >= max_group_size {
            break;
        }
        members.push(candidate);
        placed[candidate] = true;
    }
}

/// Sum of the topic overlaps between `candidate` and every member.
fn relevance_score(
    candidate: &Participant,
    members: &[usize],
    participants: &[Participant],
) -> usize {
    members
        .iter()
        .map(|&member| candidate.overlap(&participants[member]))
        .sum()
}
