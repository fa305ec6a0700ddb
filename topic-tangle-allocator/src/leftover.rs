use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::model::{BreakoutGroup, GroupId, RoomConfig, UserId};
use crate::options::LeftoverPolicy;
use crate::pairs::Participant;
use crate::topic::choose_topic;

/// Places every participant not marked in `placed`, in input order.
///
/// Returns the users that could not be placed, which is always empty under
/// [`LeftoverPolicy::PlaceAll`]. Under [`LeftoverPolicy::TopicMatch`] a user without a
/// matching open group is left out only while every group is at capacity.
pub fn place_leftovers<R: Rng + ?Sized>(
    room: &RoomConfig,
    participants: &[Participant],
    placed: &[bool],
    groups: &mut Vec<BreakoutGroup>,
    policy: LeftoverPolicy,
    rng: &mut R,
) -> Vec<UserId> {
    let mut unassigned = Vec::new();

    for (_, participant) in participants
        .iter()
        .enumerate()
        .filter(|&(index, _)| !placed[index])
    {
        let target = match policy {
            LeftoverPolicy::PlaceAll => {
                smallest_open_group(groups, room.max_group_size, |_| true, rng)
            }
            LeftoverPolicy::TopicMatch => smallest_open_group(
                groups,
                room.max_group_size,
                |group| {
                    group
                        .topic()
                        .is_some_and(|topic| participant.topics.contains(topic))
                },
                rng,
            ),
        };

        if let Some(target) = target {
            debug!(user = %participant.user_id, group = %groups[target].id, "joined existing group");
            groups[target].members.push(participant.user_id.clone());
        } else if policy == LeftoverPolicy::TopicMatch
            && all_at_capacity(groups, room.max_group_size)
        {
            debug!(user = %participant.user_id, "left unassigned");
            unassigned.push(participant.user_id.clone());
        } else {
            let topic = choose_topic(&participant.topics, rng);
            debug!(user = %participant.user_id, %topic, "founded singleton group");
            groups.push(BreakoutGroup::new(
                GroupId::random(rng),
                &room.id,
                vec![participant.user_id.clone()],
                topic,
            ));
        }
    }
    unassigned
}

fn all_at_capacity(groups: &[BreakoutGroup], max_group_size: usize) -> bool {
    !groups.is_empty() && groups.iter().all(|group| group.len() >= max_group_size)
}

/// Index of the smallest accepted group below `max_group_size`, ties broken by `rng`.
fn smallest_open_group<R, F>(
    groups: &[BreakoutGroup],
    max_group_size: usize,
    accepts: F,
    rng: &mut R,
) -> Option<usize>
where
    R: Rng + ?Sized,
    F: Fn(&BreakoutGroup) -> bool,
{
    groups
        .iter()
        .enumerate()
        .filter(|(_, group)| group.len() < max_group_size && accepts(*group))
        .min_set_by_key(|(_, group)| group.len())
        .choose(rng)
        .map(|&(index, _)| index)
}
