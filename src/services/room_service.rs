use std::time::{Duration, Instant, SystemTime};

use tracing::{info, warn};

use crate::{
    dao::models::{MembershipEntity, RoomEntity},
    dto::room::RoomSummary,
    error::ServiceError,
    services::password,
    state::{
        SharedState,
        room::{MemberId, RoomCode},
        state_machine::RoomEvent,
    },
};

/// Longest accepted room name, in characters, after trimming.
pub const MAX_ROOM_NAME_CHARS: usize = 64;
/// Longest accepted topic, in characters, after trimming.
pub const MAX_TOPIC_CHARS: usize = 256;
const MAX_CODE_ATTEMPTS: usize = 16;

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The caller became a member.
    Joined,
    /// The caller was already a member; nothing changed.
    AlreadyMember,
}

/// Side effects of removing a member from a room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// The removed member was the last one and the room is gone.
    pub room_deleted: bool,
    /// Member promoted to host because the host was removed.
    pub new_host: Option<MemberId>,
}

/// Open a room hosted by `host`, who becomes its sole member.
pub async fn create_room(
    state: &SharedState,
    host: &MemberId,
    name: &str,
    password: Option<&str>,
) -> Result<RoomCode, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "room name must not be empty".into(),
        ));
    }
    if name.chars().count() > MAX_ROOM_NAME_CHARS {
        return Err(ServiceError::InvalidInput(format!(
            "room name must not exceed {MAX_ROOM_NAME_CHARS} characters"
        )));
    }

    let password_hash = match password.filter(|candidate| !candidate.is_empty()) {
        Some(candidate) => Some(password::hash_password(candidate).await?),
        None => None,
    };

    let now = SystemTime::now();
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = RoomCode::generate();
        let room = RoomEntity::new(
            code.clone(),
            name.to_owned(),
            host.clone(),
            password_hash.clone(),
            now,
        );

        if state.store().create_room(room, now).await? {
            touch(state, &code, host);
            info!(
                room = %code,
                host = %host,
                protected = password_hash.is_some(),
                "room created"
            );
            return Ok(code);
        }

        warn!(room = %code, "room code already taken; drawing another");
    }

    Err(ServiceError::Internal(
        "could not allocate a unique room code".into(),
    ))
}

/// Add `member` to a room, checking the password for newcomers only.
///
/// The password is verified before the write guard is taken. Under the guard
/// the room must still carry the hash that was checked.
pub async fn join_room(
    state: &SharedState,
    code: &RoomCode,
    member: &MemberId,
    password: Option<&str>,
) -> Result<JoinOutcome, ServiceError> {
    let checked_hash = {
        let _guard = state.locks().read(code).await;
        let room = load_room(state, code).await?;
        if find_member(state, code, member).await?.is_some() {
            touch(state, code, member);
            return Ok(JoinOutcome::AlreadyMember);
        }
        room.password_hash
    };

    if let Some(hash) = checked_hash.as_deref() {
        let accepted = match password {
            Some(candidate) => password::verify_password(candidate, hash).await?,
            None => false,
        };
        if !accepted {
            warn!(room = %code, member = %member, "join rejected: wrong room password");
            return Err(ServiceError::Forbidden("incorrect room password".into()));
        }
    }

    let _guard = state.locks().write(code).await;
    let room = load_room(state, code).await?;
    if find_member(state, code, member).await?.is_some() {
        touch(state, code, member);
        return Ok(JoinOutcome::AlreadyMember);
    }
    if room.password_hash != checked_hash {
        warn!(room = %code, member = %member, "join rejected: room replaced during join");
        return Err(ServiceError::Forbidden("incorrect room password".into()));
    }

    let inserted = state
        .store()
        .insert_member(code.clone(), member.clone(), SystemTime::now())
        .await?;
    touch(state, code, member);

    if inserted {
        info!(room = %code, member = %member, "member joined");
        Ok(JoinOutcome::Joined)
    } else {
        Ok(JoinOutcome::AlreadyMember)
    }
}

/// Remove the caller from a room.
pub async fn leave_room(
    state: &SharedState,
    code: &RoomCode,
    member: &MemberId,
) -> Result<RemovalOutcome, ServiceError> {
    let _guard = state.locks().write(code).await;
    let room = load_room(state, code).await?;
    if find_member(state, code, member).await?.is_none() {
        return Err(ServiceError::Forbidden(format!(
            "`{member}` is not a member of room `{code}`"
        )));
    }

    let outcome = remove_member_locked(state, room, member).await?;
    info!(room = %code, member = %member, "member left");
    Ok(outcome)
}

/// Remove a member on behalf of the reaper.
///
/// Returns `Ok(None)` when the member was seen again within `timeout` of
/// `now` after the sweep picked it, and [`ServiceError::NotFound`] when the
/// room or the membership is already gone. In the latter case a room left
/// without members or without a member host is repaired first.
pub async fn evict_inactive(
    state: &SharedState,
    code: &RoomCode,
    member: &MemberId,
    timeout: Duration,
    now: Instant,
) -> Result<Option<RemovalOutcome>, ServiceError> {
    let _guard = state.locks().write(code).await;
    let room = load_room(state, code).await?;

    let still_idle = state
        .presence()
        .last_seen(code, member)
        .is_none_or(|seen| now.saturating_duration_since(seen) > timeout);
    if !still_idle {
        return Ok(None);
    }
    if find_member(state, code, member).await?.is_none() {
        repair_room_locked(state, room).await?;
        return Err(ServiceError::NotFound(format!(
            "`{member}` is no longer a member of room `{code}`"
        )));
    }

    remove_member_locked(state, room, member).await.map(Some)
}

/// Host-only removal of another member.
pub async fn kick_member(
    state: &SharedState,
    code: &RoomCode,
    actor: &MemberId,
    target: &MemberId,
) -> Result<RemovalOutcome, ServiceError> {
    let _guard = state.locks().write(code).await;
    let room = load_room(state, code).await?;
    require_host(&room, actor)?;

    if actor == target {
        return Err(ServiceError::InvalidInput(
            "the host cannot kick themselves; leave the room instead".into(),
        ));
    }
    if find_member(state, code, target).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "`{target}` is not a member of room `{code}`"
        )));
    }

    let outcome = remove_member_locked(state, room, target).await?;
    touch(state, code, actor);
    info!(room = %code, host = %actor, member = %target, "member kicked");
    Ok(outcome)
}

/// Host-only topic update. A missing or blank topic clears it.
pub async fn set_topic(
    state: &SharedState,
    code: &RoomCode,
    actor: &MemberId,
    topic: Option<&str>,
) -> Result<Option<String>, ServiceError> {
    let topic = topic
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .map(str::to_owned);
    if topic
        .as_deref()
        .is_some_and(|topic| topic.chars().count() > MAX_TOPIC_CHARS)
    {
        return Err(ServiceError::InvalidInput(format!(
            "topic must not exceed {MAX_TOPIC_CHARS} characters"
        )));
    }

    let _guard = state.locks().write(code).await;
    let mut room = load_room(state, code).await?;
    require_host(&room, actor)?;

    room.topic = topic.clone();
    state.store().save_room(room).await?;
    touch(state, code, actor);
    info!(room = %code, cleared = topic.is_none(), "topic updated");
    Ok(topic)
}

/// Show the votes of the current round.
pub async fn reveal(
    state: &SharedState,
    code: &RoomCode,
    actor: &MemberId,
) -> Result<RoomEntity, ServiceError> {
    apply_host_event(state, code, actor, RoomEvent::Reveal).await
}

/// Compare the lowest and highest voters of a revealed round.
pub async fn trigger_versus(
    state: &SharedState,
    code: &RoomCode,
    actor: &MemberId,
) -> Result<RoomEntity, ServiceError> {
    apply_host_event(state, code, actor, RoomEvent::TriggerVersus).await
}

/// Start voting on the next round and return its number.
pub async fn next_round(
    state: &SharedState,
    code: &RoomCode,
    actor: &MemberId,
) -> Result<u32, ServiceError> {
    let room = apply_host_event(state, code, actor, RoomEvent::NextRound).await?;
    Ok(room.round)
}

/// Rooms `member` belongs to, oldest first.
pub async fn list_rooms(
    state: &SharedState,
    member: &MemberId,
) -> Result<Vec<RoomSummary>, ServiceError> {
    let rooms = state.store().rooms_for_member(member.clone()).await?;

    let mut summaries = Vec::with_capacity(rooms.len());
    for room in rooms {
        let member_count = state.store().list_members(room.code.clone()).await?.len();
        summaries.push(RoomSummary {
            code: room.code.to_string(),
            name: room.name,
            phase: room.phase.into(),
            member_count,
            is_host: room.host_id == *member,
        });
    }
    Ok(summaries)
}

pub(crate) async fn load_room(
    state: &SharedState,
    code: &RoomCode,
) -> Result<RoomEntity, ServiceError> {
    state
        .store()
        .find_room(code.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{code}` not found")))
}

pub(crate) async fn find_member(
    state: &SharedState,
    code: &RoomCode,
    member: &MemberId,
) -> Result<Option<MembershipEntity>, ServiceError> {
    Ok(state
        .store()
        .find_member(code.clone(), member.clone())
        .await?)
}

pub(crate) fn require_host(room: &RoomEntity, actor: &MemberId) -> Result<(), ServiceError> {
    if room.host_id == *actor {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "only the host of room `{}` can do this",
            room.code
        )))
    }
}

pub(crate) fn touch(state: &SharedState, code: &RoomCode, member: &MemberId) {
    state.presence().mark_seen(code, member, Instant::now());
}

async fn apply_host_event(
    state: &SharedState,
    code: &RoomCode,
    actor: &MemberId,
    event: RoomEvent,
) -> Result<RoomEntity, ServiceError> {
    let _guard = state.locks().write(code).await;
    let mut room = load_room(state, code).await?;
    require_host(&room, actor)?;

    let transition = room.state_machine().apply(event)?;

    room.phase = transition.to;
    room.round = transition.round;
    if transition.clears_topic {
        room.topic = None;
    }

    state.store().save_room(room.clone()).await?;
    touch(state, code, actor);
    info!(
        room = %code,
        from = ?transition.from,
        to = ?transition.to,
        round = transition.round,
        "room phase changed"
    );
    Ok(room)
}

/// Drop the membership and current-round vote of `member`, then either delete
/// the emptied room or hand the host role to the earliest remaining member.
/// Caller must hold the room's write guard.
///
/// Every step leaves the room consistent on its own: the host is reassigned
/// before the old host's membership goes, and a last member is removed by
/// deleting the whole room. A failure part way can be retried.
async fn remove_member_locked(
    state: &SharedState,
    mut room: RoomEntity,
    member: &MemberId,
) -> Result<RemovalOutcome, ServiceError> {
    let code = room.code.clone();
    let round = room.round;
    let store = state.store();

    let remaining = store.list_members(code.clone()).await?;
    let Some(successor) = earliest_member(&remaining, Some(member)) else {
        store.delete_room(code.clone()).await?;
        state.presence().forget_room(&code);
        info!(room = %code, member = %member, "last member gone; room deleted");
        return Ok(RemovalOutcome {
            room_deleted: true,
            new_host: None,
        });
    };

    let new_host = if room.host_id == *member {
        let new_host = successor.member_id.clone();
        room.host_id = new_host.clone();
        store.save_room(room).await?;
        info!(room = %code, previous = %member, host = %new_host, "host reassigned");
        Some(new_host)
    } else {
        None
    };

    store
        .delete_vote(code.clone(), member.clone(), round)
        .await?;
    store.delete_member(code.clone(), member.clone()).await?;
    state.presence().forget(&code, member);

    Ok(RemovalOutcome {
        room_deleted: false,
        new_host,
    })
}

/// Restore the room invariants after an earlier removal stopped part way:
/// delete a room nobody belongs to, or give a host-less room a host.
/// Caller must hold the room's write guard.
async fn repair_room_locked(
    state: &SharedState,
    mut room: RoomEntity,
) -> Result<(), ServiceError> {
    let code = room.code.clone();
    let store = state.store();
    let members = store.list_members(code.clone()).await?;

    let Some(successor) = earliest_member(&members, None) else {
        store.delete_room(code.clone()).await?;
        state.presence().forget_room(&code);
        warn!(room = %code, "room had no members left; deleted");
        return Ok(());
    };

    if members.iter().any(|membership| membership.member_id == room.host_id) {
        return Ok(());
    }

    let previous = std::mem::replace(&mut room.host_id, successor.member_id.clone());
    let host = room.host_id.clone();
    store.save_room(room).await?;
    warn!(room = %code, previous = %previous, host = %host, "host was not a member; reassigned");
    Ok(())
}

fn earliest_member<'a>(
    members: &'a [MembershipEntity],
    excluding: Option<&MemberId>,
) -> Option<&'a MembershipEntity> {
    members
        .iter()
        .filter(|membership| Some(&membership.member_id) != excluding)
        .min_by_key(|membership| (membership.joined_at, membership.seq))
}

#[cfg(test)]
mod tests {
    use std::time::UNIX_EPOCH;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::models::VoteEntity,
        services::read_model::room_view,
        state::{AppState, room::VoteValue, state_machine::RoomPhase},
    };

    fn member(id: &str) -> MemberId {
        MemberId::new(id)
    }

    async fn room_with(state: &SharedState, host: &str, others: &[&str]) -> RoomCode {
        let code = create_room(state, &member(host), "Sprint 42", None)
            .await
            .unwrap();
        for other in others {
            join_room(state, &code, &member(other), None).await.unwrap();
        }
        code
    }

    async fn vote(state: &SharedState, code: &RoomCode, who: &str, value: &str) {
        let room = load_room(state, code).await.unwrap();
        state
            .store()
            .replace_vote(VoteEntity::new(
                code.clone(),
                member(who),
                room.round,
                VoteValue::parse(value).unwrap(),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_room_makes_host_sole_member() {
        let state = AppState::in_memory(AppConfig::default());
        let code = create_room(&state, &member("alice"), "  Sprint 42  ", None)
            .await
            .unwrap();

        let room = load_room(&state, &code).await.unwrap();
        assert_eq!(room.name, "Sprint 42");
        assert_eq!(room.host_id, member("alice"));
        assert_eq!(room.phase, RoomPhase::Voting);
        assert_eq!(room.round, 1);
        assert!(room.password_hash.is_none());

        let members = state.store().list_members(code.clone()).await.unwrap();
        assert_eq!(members.len(), 1);
        assert!(state.presence().last_seen(&code, &member("alice")).is_some());
    }

    #[tokio::test]
    async fn create_room_rejects_blank_and_long_names() {
        let state = AppState::in_memory(AppConfig::default());
        let blank = create_room(&state, &member("alice"), "   ", None).await;
        assert!(matches!(blank, Err(ServiceError::InvalidInput(_))));

        let long = "x".repeat(MAX_ROOM_NAME_CHARS + 1);
        let long = create_room(&state, &member("alice"), &long, None).await;
        assert!(matches!(long, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &[]).await;

        let first = join_room(&state, &code, &member("bob"), None).await.unwrap();
        let second = join_room(&state, &code, &member("bob"), None).await.unwrap();
        assert_eq!(first, JoinOutcome::Joined);
        assert_eq!(second, JoinOutcome::AlreadyMember);
        assert_eq!(state.store().list_members(code).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn join_unknown_room_is_not_found() {
        let state = AppState::in_memory(AppConfig::default());
        let code = RoomCode::parse("ABCDEF").unwrap();
        let result = join_room(&state, &code, &member("bob"), None).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(state.locks().is_empty());
    }

    #[tokio::test]
    async fn protected_rooms_check_passwords_of_newcomers() {
        let state = AppState::in_memory(AppConfig::default());
        let code = create_room(&state, &member("alice"), "Secret", Some("hunter2"))
            .await
            .unwrap();

        let room = load_room(&state, &code).await.unwrap();
        let stored = room.password_hash.unwrap();
        assert_ne!(stored, "hunter2");

        let missing = join_room(&state, &code, &member("bob"), None).await;
        assert!(matches!(missing, Err(ServiceError::Forbidden(_))));
        let wrong = join_room(&state, &code, &member("bob"), Some("hunter3")).await;
        assert!(matches!(wrong, Err(ServiceError::Forbidden(_))));

        let joined = join_room(&state, &code, &member("bob"), Some("hunter2"))
            .await
            .unwrap();
        assert_eq!(joined, JoinOutcome::Joined);

        let again = join_room(&state, &code, &member("bob"), None).await.unwrap();
        assert_eq!(again, JoinOutcome::AlreadyMember);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn password_checks_do_not_hold_the_room() {
        let state = AppState::in_memory(AppConfig::default());
        let code = create_room(&state, &member("alice"), "Secret", Some("hunter2"))
            .await
            .unwrap();

        let topic = {
            let state = state.clone();
            let code = code.clone();
            tokio::spawn(async move {
                set_topic(&state, &code, &member("alice"), Some("Login")).await
            })
        };

        let joined = join_room(&state, &code, &member("bob"), Some("hunter2"))
            .await
            .unwrap();
        assert_eq!(joined, JoinOutcome::Joined);
        assert!(topic.is_finished());
        assert_eq!(topic.await.unwrap().unwrap().as_deref(), Some("Login"));
    }

    #[tokio::test]
    async fn leaving_last_member_deletes_room_and_votes() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &[]).await;
        vote(&state, &code, "alice", "5").await;

        let outcome = leave_room(&state, &code, &member("alice")).await.unwrap();
        assert!(outcome.room_deleted);
        assert_eq!(outcome.new_host, None);

        assert!(state.store().find_room(code.clone()).await.unwrap().is_none());
        assert!(state.store().votes_for_round(code.clone(), 1).await.unwrap().is_empty());
        assert!(state.presence().is_empty());
        assert!(state.locks().is_empty());
    }

    #[tokio::test]
    async fn host_leaving_promotes_earliest_joined_member() {
        let state = AppState::in_memory(AppConfig::default());
        let code = create_room(&state, &member("a"), "Ordering", None).await.unwrap();
        let store = state.store();
        // Join times are set explicitly so the ordering does not depend on the clock.
        store
            .insert_member(code.clone(), member("c"), UNIX_EPOCH + Duration::from_secs(20))
            .await
            .unwrap();
        store
            .insert_member(code.clone(), member("b"), UNIX_EPOCH + Duration::from_secs(10))
            .await
            .unwrap();

        let outcome = leave_room(&state, &code, &member("a")).await.unwrap();
        assert!(!outcome.room_deleted);
        assert_eq!(outcome.new_host, Some(member("b")));
        assert_eq!(load_room(&state, &code).await.unwrap().host_id, member("b"));
    }

    #[tokio::test]
    async fn equal_join_times_fall_back_to_insertion_order() {
        let state = AppState::in_memory(AppConfig::default());
        let code = create_room(&state, &member("a"), "Ties", None).await.unwrap();
        let at = UNIX_EPOCH + Duration::from_secs(5);
        for id in ["x", "y"] {
            state
                .store()
                .insert_member(code.clone(), member(id), at)
                .await
                .unwrap();
        }

        let outcome = leave_room(&state, &code, &member("a")).await.unwrap();
        assert_eq!(outcome.new_host, Some(member("x")));
    }

    #[tokio::test]
    async fn leave_removes_only_the_current_vote() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &["bob"]).await;

        vote(&state, &code, "bob", "3").await;
        next_round(&state, &code, &member("alice")).await.unwrap();
        vote(&state, &code, "bob", "8").await;

        leave_room(&state, &code, &member("bob")).await.unwrap();
        let store = state.store();
        assert_eq!(store.votes_for_round(code.clone(), 1).await.unwrap().len(), 1);
        assert!(store.votes_for_round(code.clone(), 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn leave_requires_membership() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &[]).await;
        let result = leave_room(&state, &code, &member("mallory")).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let missing = RoomCode::parse("000000").unwrap();
        let result = leave_room(&state, &missing, &member("alice")).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn kick_rules() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &["bob", "carol"]).await;

        let by_guest = kick_member(&state, &code, &member("bob"), &member("carol")).await;
        assert!(matches!(by_guest, Err(ServiceError::Forbidden(_))));

        let self_kick = kick_member(&state, &code, &member("alice"), &member("alice")).await;
        assert!(matches!(self_kick, Err(ServiceError::InvalidInput(_))));

        let stranger = kick_member(&state, &code, &member("alice"), &member("dave")).await;
        assert!(matches!(stranger, Err(ServiceError::NotFound(_))));

        let outcome = kick_member(&state, &code, &member("alice"), &member("bob"))
            .await
            .unwrap();
        assert_eq!(outcome, RemovalOutcome::default());
        assert!(find_member(&state, &code, &member("bob")).await.unwrap().is_none());
        assert!(state.presence().last_seen(&code, &member("bob")).is_none());
    }

    #[tokio::test]
    async fn topic_is_host_only_and_blank_clears() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &["bob"]).await;

        let denied = set_topic(&state, &code, &member("bob"), Some("Login page")).await;
        assert!(matches!(denied, Err(ServiceError::Forbidden(_))));

        let topic = set_topic(&state, &code, &member("alice"), Some("  Login page "))
            .await
            .unwrap();
        assert_eq!(topic.as_deref(), Some("Login page"));

        reveal(&state, &code, &member("alice")).await.unwrap();
        let cleared = set_topic(&state, &code, &member("alice"), Some("   "))
            .await
            .unwrap();
        assert_eq!(cleared, None);
        assert_eq!(load_room(&state, &code).await.unwrap().topic, None);

        let long = "t".repeat(MAX_TOPIC_CHARS + 1);
        let long = set_topic(&state, &code, &member("alice"), Some(&long)).await;
        assert!(matches!(long, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn phase_transitions_follow_the_table() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &["bob"]).await;
        let host = member("alice");

        let early = trigger_versus(&state, &code, &host).await;
        assert!(matches!(early, Err(ServiceError::InvalidState(_))));

        let by_guest = reveal(&state, &code, &member("bob")).await;
        assert!(matches!(by_guest, Err(ServiceError::Forbidden(_))));

        vote(&state, &code, "alice", "2").await;
        vote(&state, &code, "bob", "13").await;
        let room = reveal(&state, &code, &host).await.unwrap();
        assert_eq!(room.phase, RoomPhase::Revealed);

        let twice = reveal(&state, &code, &host).await;
        assert!(matches!(twice, Err(ServiceError::InvalidState(_))));

        let room = trigger_versus(&state, &code, &host).await.unwrap();
        assert_eq!(room.phase, RoomPhase::Versus);

        set_topic(&state, &code, &host, Some("Checkout")).await.unwrap();
        assert_eq!(next_round(&state, &code, &host).await.unwrap(), 2);
        let room = load_room(&state, &code).await.unwrap();
        assert_eq!(room.phase, RoomPhase::Voting);
        assert_eq!(room.topic, None);
    }

    #[tokio::test]
    async fn versus_without_a_spread_shows_no_head_to_head() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &["bob"]).await;
        let host = member("alice");

        vote(&state, &code, "alice", "5").await;
        vote(&state, &code, "bob", "5").await;
        reveal(&state, &code, &host).await.unwrap();

        let room = trigger_versus(&state, &code, &host).await.unwrap();
        assert_eq!(room.phase, RoomPhase::Versus);

        let view = room_view(&state, &code, &member("bob")).await.unwrap();
        assert!(view.head_to_head.is_none());
        assert!(view.statistics.is_some());
    }

    #[tokio::test]
    async fn versus_is_allowed_without_numeric_votes() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &["bob"]).await;
        let host = member("alice");

        vote(&state, &code, "bob", "?").await;
        reveal(&state, &code, &host).await.unwrap();
        let room = trigger_versus(&state, &code, &host).await.unwrap();
        assert_eq!(room.phase, RoomPhase::Versus);

        let view = room_view(&state, &code, &host).await.unwrap();
        assert!(view.head_to_head.is_none());
    }

    #[tokio::test]
    async fn next_round_is_allowed_from_every_phase() {
        let state = AppState::in_memory(AppConfig::default());
        let code = room_with(&state, "alice", &[]).await;
        let host = member("alice");

        assert_eq!(next_round(&state, &code, &host).await.unwrap(), 2);
        reveal(&state, &code, &host).await.unwrap();
        assert_eq!(next_round(&state, &code, &host).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn list_rooms_reports_membership_and_hosting() {
        let state = AppState::in_memory(AppConfig::default());
        let hosted = room_with(&state, "alice", &["bob"]).await;
        let joined = room_with(&state, "carol", &["alice"]).await;
        room_with(&state, "dave", &[]).await;

        let rooms = list_rooms(&state, &member("alice")).await.unwrap();
        assert_eq!(rooms.len(), 2);

        let hosted = rooms.iter().find(|room| room.code == hosted.as_str()).unwrap();
        assert!(hosted.is_host);
        assert_eq!(hosted.member_count, 2);

        let joined = rooms.iter().find(|room| room.code == joined.as_str()).unwrap();
        assert!(!joined.is_host);
    }
}
