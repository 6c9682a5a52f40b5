use crate::{
    db::AffinityStore,
    error::{AppError, AppResult},
    models::{
        Follow, FollowOutcome, FollowRequest, FollowStatus, LikedAuthor, Profile, ShelfOut, User,
    },
};

use super::visibility::{resolve_access, Area, VisibilityReport};

/// Status a new follow request starts in
pub fn initial_follow_status(target: &User) -> FollowStatus {
    if target.is_private {
        FollowStatus::Pending
    } else {
        FollowStatus::Accepted
    }
}

/// Profile header of any existing user
pub async fn profile(store: &dyn AffinityStore, viewer_id: i64, target_id: i64) -> AppResult<Profile> {
    let (target, access) = resolve_access(store, viewer_id, target_id).await?;
    let counts = store.follow_counts(target.id).await?;

    Ok(Profile {
        id: target.id,
        username: target.username,
        is_private: target.is_private,
        avatar_url: target.avatar_url,
        followers_count: counts.followers,
        following_count: counts.following,
        is_me: access.is_owner(),
        follow_status: access.follow_status,
    })
}

pub async fn visibility(
    store: &dyn AffinityStore,
    viewer_id: i64,
    target_id: i64,
) -> AppResult<VisibilityReport> {
    let (_, access) = resolve_access(store, viewer_id, target_id).await?;
    Ok(access.report())
}

/// Shelves of the target the viewer may see, with their books
pub async fn visible_shelves(
    store: &dyn AffinityStore,
    viewer_id: i64,
    target_id: i64,
) -> AppResult<Vec<ShelfOut>> {
    let (target, access) = resolve_access(store, viewer_id, target_id).await?;
    access.require(Area::Shelves)?;

    let shelves = store.user_shelves(target.id).await?;
    Ok(shelves
        .into_iter()
        .filter(|s| access.can_see_shelf(s.shelf.visibility))
        .map(ShelfOut::from)
        .collect())
}

pub async fn liked_authors(
    store: &dyn AffinityStore,
    viewer_id: i64,
    target_id: i64,
    limit: i64,
) -> AppResult<Vec<LikedAuthor>> {
    let (target, access) = resolve_access(store, viewer_id, target_id).await?;
    access.require(Area::LikedAuthors)?;
    store.liked_authors(target.id, limit).await
}

/// Requests to follow a user
///
/// An existing follow is returned unchanged, whatever its status.
pub async fn follow_user(
    store: &dyn AffinityStore,
    requester_id: i64,
    target_id: i64,
) -> AppResult<FollowOutcome> {
    if requester_id == target_id {
        return Err(AppError::InvalidInput("Cannot follow yourself".to_string()));
    }

    let target = store
        .get_user(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let existing = store.follow_status(requester_id, target.id).await?;
    if existing != FollowStatus::None {
        return Ok(FollowOutcome { status: existing });
    }

    let status = store
        .create_follow(requester_id, target.id, initial_follow_status(&target))
        .await?;
    tracing::info!(
        requester_id = requester_id,
        target_id = target.id,
        status = status.as_str(),
        "Follow created"
    );
    Ok(FollowOutcome { status })
}

/// Removes the caller's follow of a user, pending or accepted
///
/// Succeeds whether or not a follow existed.
pub async fn unfollow_user(
    store: &dyn AffinityStore,
    requester_id: i64,
    target_id: i64,
) -> AppResult<()> {
    if requester_id == target_id {
        return Err(AppError::InvalidInput("Cannot unfollow yourself".to_string()));
    }

    let target = store
        .get_user(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if store.delete_follow(requester_id, target.id).await? {
        tracing::info!(requester_id = requester_id, target_id = target.id, "Follow removed");
    }
    Ok(())
}

/// Pending requests awaiting the user's decision
pub async fn list_follow_requests(
    store: &dyn AffinityStore,
    user_id: i64,
) -> AppResult<Vec<FollowRequest>> {
    store.pending_follow_requests(user_id).await
}

/// Loads a pending request addressed to `user_id`
///
/// Requests aimed at someone else look missing. Decided ones are a conflict.
async fn pending_request(
    store: &dyn AffinityStore,
    user_id: i64,
    request_id: i64,
) -> AppResult<Follow> {
    let follow = store
        .get_follow(request_id)
        .await?
        .filter(|f| f.target_id == user_id)
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

    if follow.status != FollowStatus::Pending {
        return Err(AppError::Conflict("Request already approved".to_string()));
    }
    Ok(follow)
}

pub async fn approve_follow_request(
    store: &dyn AffinityStore,
    user_id: i64,
    request_id: i64,
) -> AppResult<FollowOutcome> {
    let follow = pending_request(store, user_id, request_id).await?;
    store
        .set_follow_status(follow.id, FollowStatus::Accepted)
        .await?;

    tracing::info!(
        requester_id = follow.requester_id,
        target_id = follow.target_id,
        "Follow request approved"
    );
    Ok(FollowOutcome {
        status: FollowStatus::Accepted,
    })
}

pub async fn deny_follow_request(
    store: &dyn AffinityStore,
    user_id: i64,
    request_id: i64,
) -> AppResult<()> {
    let follow = pending_request(store, user_id, request_id).await?;
    store
        .delete_follow(follow.requester_id, follow.target_id)
        .await?;

    tracing::info!(
        requester_id = follow.requester_id,
        target_id = follow.target_id,
        "Follow request denied"
    );
    Ok(())
}
