//! Per-viewer projection of a room into the polling payload.

use std::collections::HashMap;

use crate::{
    dao::models::{MembershipEntity, RoomEntity, VoteEntity},
    dto::{
        format_system_time,
        view::{MemberView, RoomView},
    },
    error::ServiceError,
    services::{
        room_service::{load_room, touch},
        statistics::{compute_head_to_head, compute_statistics},
        vote_service::{order_by_membership, sort_by_join_order},
    },
    state::{
        SharedState,
        room::{MemberId, RoomCode},
        state_machine::RoomPhase,
    },
};

/// Build the view of `room` for `viewer`.
///
/// `members` must be in join order. Votes from other rounds are ignored.
/// Individual votes are hidden from everyone, the viewer included, until
/// the host reveals them.
pub fn project_room(
    room: &RoomEntity,
    members: &[MembershipEntity],
    votes: &[VoteEntity],
    viewer: &MemberId,
) -> RoomView {
    let current: Vec<VoteEntity> = votes
        .iter()
        .filter(|vote| vote.round == room.round)
        .cloned()
        .collect();
    let current = order_by_membership(current, members);
    let by_member: HashMap<&MemberId, &VoteEntity> =
        current.iter().map(|vote| (&vote.member_id, vote)).collect();

    let revealed = room.phase != RoomPhase::Voting;

    let members = members
        .iter()
        .map(|membership| {
            let vote = by_member.get(&membership.member_id);
            MemberView {
                member_id: membership.member_id.to_string(),
                is_host: membership.member_id == room.host_id,
                has_voted: vote.is_some(),
                vote: vote
                    .filter(|_| revealed)
                    .map(|vote| vote.value.to_string()),
                joined_at: format_system_time(membership.joined_at),
            }
        })
        .collect();

    let statistics = if revealed {
        compute_statistics(&current)
    } else {
        None
    };
    let head_to_head = if room.phase == RoomPhase::Versus {
        compute_head_to_head(&current)
    } else {
        None
    };

    RoomView {
        code: room.code.to_string(),
        name: room.name.clone(),
        phase: room.phase.into(),
        round: room.round,
        topic: room.topic.clone(),
        host_id: room.host_id.to_string(),
        is_host: room.host_id == *viewer,
        password_protected: room.password_hash.is_some(),
        members,
        statistics,
        head_to_head,
    }
}

/// Load and project a room for one of its members.
pub async fn room_view(
    state: &SharedState,
    code: &RoomCode,
    viewer: &MemberId,
) -> Result<RoomView, ServiceError> {
    let _guard = state.locks().read(code).await;
    let room = load_room(state, code).await?;

    let store = state.store();
    let mut members = store.list_members(code.clone()).await?;
    if !members.iter().any(|membership| membership.member_id == *viewer) {
        return Err(ServiceError::Forbidden(format!(
            "`{viewer}` is not a member of room `{code}`"
        )));
    }
    sort_by_join_order(&mut members);

    let votes = store.votes_for_round(code.clone(), room.round).await?;
    touch(state, code, viewer);
    Ok(project_room(&room, &members, &votes, viewer))
}
