use std::collections::HashMap;

use tracing::debug;

use crate::{
    dao::models::{MembershipEntity, VoteEntity},
    error::ServiceError,
    services::room_service::{find_member, load_room, require_host, touch},
    state::{
        SharedState,
        room::{MemberId, RoomCode, VoteValue},
        state_machine::RoomPhase,
    },
};

/// Cast or replace the caller's vote for the current round.
pub async fn submit_vote(
    state: &SharedState,
    code: &RoomCode,
    member: &MemberId,
    value: &str,
) -> Result<VoteValue, ServiceError> {
    let _guard = state.locks().write(code).await;
    let room = load_room(state, code).await?;

    if room.phase != RoomPhase::Voting {
        return Err(ServiceError::InvalidState(format!(
            "votes can only be cast while voting (room `{code}` is {:?})",
            room.phase
        )));
    }
    if find_member(state, code, member).await?.is_none() {
        return Err(ServiceError::Forbidden(format!(
            "`{member}` is not a member of room `{code}`"
        )));
    }
    let value = VoteValue::parse(value.trim())?;

    state
        .store()
        .replace_vote(VoteEntity::new(
            code.clone(),
            member.clone(),
            room.round,
            value,
        ))
        .await?;
    touch(state, code, member);
    debug!(room = %code, member = %member, round = room.round, "vote recorded");
    Ok(value)
}

/// Every vote recorded for `round`, in member join order.
pub async fn votes_for_round(
    state: &SharedState,
    code: &RoomCode,
    round: u32,
) -> Result<Vec<VoteEntity>, ServiceError> {
    let _guard = state.locks().read(code).await;
    let store = state.store();
    let votes = store.votes_for_round(code.clone(), round).await?;
    let mut members = store.list_members(code.clone()).await?;
    sort_by_join_order(&mut members);
    Ok(order_by_membership(votes, &members))
}

/// Host-only read of a played round. The current round stays hidden until
/// it is revealed.
pub async fn round_history(
    state: &SharedState,
    code: &RoomCode,
    viewer: &MemberId,
    round: u32,
) -> Result<Vec<VoteEntity>, ServiceError> {
    let room = {
        let _guard = state.locks().read(code).await;
        let room = load_room(state, code).await?;
        require_host(&room, viewer)?;
        room
    };

    if round == 0 || round > room.round {
        return Err(ServiceError::NotFound(format!(
            "round {round} has not been played in room `{code}`"
        )));
    }
    if round == room.round && room.phase == RoomPhase::Voting {
        return Err(ServiceError::InvalidState(
            "votes of the current round stay hidden until they are revealed".into(),
        ));
    }

    let votes = votes_for_round(state, code, round).await?;
    touch(state, code, viewer);
    Ok(votes)
}

/// Sort memberships by `(joined_at, seq)`.
pub(crate) fn sort_by_join_order(members: &mut [MembershipEntity]) {
    members.sort_by_key(|membership| (membership.joined_at, membership.seq));
}

/// Order votes like `members`; votes of members who have since left go last.
pub(crate) fn order_by_membership(
    mut votes: Vec<VoteEntity>,
    members: &[MembershipEntity],
) -> Vec<VoteEntity> {
    let position: HashMap<&MemberId, usize> = members
        .iter()
        .enumerate()
        .map(|(index, membership)| (&membership.member_id, index))
        .collect();

    votes.sort_by_key(|vote| {
        (
            position.get(&vote.member_id).copied().unwrap_or(usize::MAX),
            vote.created_at,
        )
    });
    votes
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;
    use crate::{
        config::AppConfig,
        services::room_service::{create_room, join_room, leave_room, next_round, reveal},
        state::AppState,
    };

    fn member(id: &str) -> MemberId {
        MemberId::new(id)
    }

    async fn room_with(state: &SharedState, host: &str, others: &[&str]) -> RoomCode {
        let code = create_room(state, &member(host), "Estimates", None)
            .await
            .unwrap();
        for other in others {
            join_room(state, &code, &member(other), None).await.unwrap();
        }
        code
    }

    #[tokio::test]
    async fn resubmitting_replaces_the_previous_vote() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &[]).await;

        submit_vote(&state, &code, &member("alice"), "3").await.unwrap();
        submit_vote(&state, &code, &member("alice"), "8").await.unwrap();

        let votes = votes_for_round(&state, &code, 1).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].value, VoteValue::Points(8));
    }

    #[tokio::test]
    async fn votes_are_rejected_outside_voting() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &[]).await;
        reveal(&state, &code, &member("alice")).await.unwrap();

        let result = submit_vote(&state, &code, &member("alice"), "5").await;
        assert!(matches!(result, Err(ServiceError::InvalidState(_))));
    }

    #[tokio::test]
    async fn vote_checks_membership_then_value() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &[]).await;

        let stranger = submit_vote(&state, &code, &member("mallory"), "5").await;
        assert!(matches!(stranger, Err(ServiceError::Forbidden(_))));

        for bad in ["4", "100", "", "abc"] {
            let result = submit_vote(&state, &code, &member("alice"), bad).await;
            assert!(matches!(result, Err(ServiceError::InvalidInput(_))), "{bad}");
        }

        let missing = RoomCode::parse("123456").unwrap();
        let result = submit_vote(&state, &missing, &member("alice"), "5").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_card_is_accepted() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &[]).await;
        let value = submit_vote(&state, &code, &member("alice"), "?").await.unwrap();
        assert_eq!(value, VoteValue::Unknown);
    }

    #[tokio::test]
    async fn votes_follow_member_join_order() {
        let state = AppState::in_memory(AppConfig::default());
        let code = create_room(&state, &member("host"), "Order", None)
            .await
            .unwrap();
        for (id, secs) in [("late", 20), ("early", 10)] {
            state
                .store()
                .insert_member(code.clone(), member(id), UNIX_EPOCH + Duration::from_secs(secs))
                .await
                .unwrap();
        }

        for id in ["host", "late", "early"] {
            submit_vote(&state, &code, &member(id), "5").await.unwrap();
        }

        let order: Vec<String> = votes_for_round(&state, &code, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|vote| vote.member_id.to_string())
            .collect();
        assert_eq!(order, vec!["early", "late", "host"]);
    }

    #[tokio::test]
    async fn history_is_host_only_and_hides_the_open_round() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &["bob"]).await;
        submit_vote(&state, &code, &member("bob"), "13").await.unwrap();

        let open = round_history(&state, &code, &member("alice"), 1).await;
        assert!(matches!(open, Err(ServiceError::InvalidState(_))));

        next_round(&state, &code, &member("alice")).await.unwrap();
        leave_room(&state, &code, &member("bob")).await.unwrap();

        let past = round_history(&state, &code, &member("alice"), 1).await.unwrap();
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].member_id, member("bob"));

        let future = round_history(&state, &code, &member("alice"), 3).await;
        assert!(matches!(future, Err(ServiceError::NotFound(_))));

        join_room(&state, &code, &member("bob"), None).await.unwrap();
        let guest = round_history(&state, &code, &member("bob"), 1).await;
        assert!(matches!(guest, Err(ServiceError::Forbidden(_))));
    }
}
