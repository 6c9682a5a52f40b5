use serde::Serialize;

use crate::{
    db::AffinityStore,
    error::{AppError, AppResult},
    models::{FollowStatus, ShelfVisibility, User},
};

/// How the viewer relates to the target for visibility purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// Viewer is the target
    Owner,
    /// Target is not private
    PublicProfile,
    /// Target is private and the viewer holds an accepted follow
    AcceptedFollower,
    /// Target is private and the viewer has no accepted follow
    Outsider,
}

/// Parts of a profile gated by the visibility rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Profile,
    Shelves,
    Activity,
    LikedAuthors,
    TasteCompare,
}

impl Area {
    pub const ALL: [Area; 5] = [
        Area::Profile,
        Area::Shelves,
        Area::Activity,
        Area::LikedAuthors,
        Area::TasteCompare,
    ];

    fn denied_message(&self) -> &'static str {
        match self {
            Area::Profile => "Not allowed to view profile",
            Area::Shelves => "Not allowed to view shelves",
            Area::Activity => "Not allowed to view activity",
            Area::LikedAuthors => "Not allowed to view liked authors",
            Area::TasteCompare => "Not allowed to compare taste",
        }
    }
}

/// Why a decision came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Owner,
    PublicProfile,
    AcceptedFollower,
    PublicShelvesOnly,
    FollowPending,
    NotFollowing,
}

/// Outcome of one visibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub area: Area,
    pub allowed: bool,
    pub reason: Reason,
}

/// Every decision for one viewer/target pair
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VisibilityReport {
    pub user_id: i64,
    pub relationship: Relationship,
    pub follow_status: FollowStatus,
    pub visible_shelf_tiers: Vec<ShelfVisibility>,
    pub decisions: Vec<Decision>,
}

/// Evaluated access of one viewer to one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Access {
    pub viewer_id: i64,
    pub target_id: i64,
    pub relationship: Relationship,
    pub follow_status: FollowStatus,
}

const OWNER_TIERS: &[ShelfVisibility] = &[
    ShelfVisibility::Public,
    ShelfVisibility::Followers,
    ShelfVisibility::Private,
];
const FOLLOWER_TIERS: &[ShelfVisibility] = &[ShelfVisibility::Public, ShelfVisibility::Followers];
const PUBLIC_TIERS: &[ShelfVisibility] = &[ShelfVisibility::Public];

impl Access {
    /// Evaluates the relationship of `viewer_id` to `target`
    ///
    /// A pending follow never grants anything beyond what a stranger gets.
    pub fn evaluate(viewer_id: i64, target: &User, follow_status: FollowStatus) -> Self {
        let relationship = if viewer_id == target.id {
            Relationship::Owner
        } else if !target.is_private {
            Relationship::PublicProfile
        } else if follow_status.is_accepted() {
            Relationship::AcceptedFollower
        } else {
            Relationship::Outsider
        };

        Self {
            viewer_id,
            target_id: target.id,
            relationship,
            follow_status,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.relationship == Relationship::Owner
    }

    /// Shelf tiers the viewer may see
    pub fn visible_tiers(&self) -> &'static [ShelfVisibility] {
        match self.relationship {
            Relationship::Owner => OWNER_TIERS,
            Relationship::AcceptedFollower => FOLLOWER_TIERS,
            Relationship::PublicProfile | Relationship::Outsider => PUBLIC_TIERS,
        }
    }

    pub fn can_see_shelf(&self, visibility: ShelfVisibility) -> bool {
        self.visible_tiers().contains(&visibility)
    }

    /// Decides access to one area
    pub fn check(&self, area: Area) -> Decision {
        let (allowed, reason) = match self.relationship {
            Relationship::Owner => (true, Reason::Owner),
            Relationship::PublicProfile => (true, Reason::PublicProfile),
            Relationship::AcceptedFollower => (true, Reason::AcceptedFollower),
            Relationship::Outsider => match area {
                Area::Profile => (true, self.outsider_reason()),
                Area::Shelves => (true, Reason::PublicShelvesOnly),
                Area::Activity | Area::LikedAuthors | Area::TasteCompare => {
                    (false, self.outsider_reason())
                }
            },
        };

        Decision {
            area,
            allowed,
            reason,
        }
    }

    /// Decisions for every area
    pub fn check_all(&self) -> Vec<Decision> {
        Area::ALL.iter().map(|area| self.check(*area)).collect()
    }

    pub fn report(&self) -> VisibilityReport {
        VisibilityReport {
            user_id: self.target_id,
            relationship: self.relationship,
            follow_status: self.follow_status,
            visible_shelf_tiers: self.visible_tiers().to_vec(),
            decisions: self.check_all(),
        }
    }

    /// Fails with `Forbidden` when the area is not visible
    pub fn require(&self, area: Area) -> AppResult<()> {
        let decision = self.check(area);
        if decision.allowed {
            return Ok(());
        }

        tracing::warn!(
            viewer_id = self.viewer_id,
            target_id = self.target_id,
            area = ?area,
            reason = ?decision.reason,
            "Visibility check denied"
        );
        Err(AppError::Forbidden(area.denied_message().to_string()))
    }

    fn outsider_reason(&self) -> Reason {
        match self.follow_status {
            FollowStatus::Pending => Reason::FollowPending,
            _ => Reason::NotFollowing,
        }
    }
}

/// Loads the target and evaluates the viewer's access to it
///
/// Missing targets surface as `NotFound`, before any visibility decision.
pub async fn resolve_access(
    store: &dyn AffinityStore,
    viewer_id: i64,
    target_id: i64,
) -> AppResult<(User, Access)> {
    let target = store
        .get_user(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let follow_status = if viewer_id == target.id {
        FollowStatus::None
    } else {
        store.follow_status(viewer_id, target.id).await?
    };

    let access = Access::evaluate(viewer_id, &target, follow_status);
    Ok((target, access))
}
