//! Resource kinds
//!
//! Each paginated collection type is described by an immutable
//! [`ResourceConfig`] record: remote method, page size, default parameters,
//! whether extended mode is on by default, and where the authoritative total
//! comes from. The collector is parameterised by this record rather than
//! specialised per kind.

use crate::error::{Error, Result};
use crate::types::{ParamValue, Params};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User profile fields requested alongside items
pub const BASE_USER_FIELDS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "is_closed",
    "about",
    "activities",
    "bdate",
    "city",
    "contacts",
    "followers_count",
    "country",
    "domain",
    "has_photo",
    "home_town",
    "interests",
    "personal",
    "quotes",
    "relation",
    "sex",
    "status",
];

/// Comma-separated form of [`BASE_USER_FIELDS`]
pub fn base_user_fields() -> String {
    BASE_USER_FIELDS.join(", ")
}

/// The fixed set of paginated collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Wall posts of a user or community (`wall.get`)
    Posts,
    /// Comments under one wall post (`wall.getComments`)
    Comments,
    /// Members of a community (`groups.getMembers`)
    Members,
    /// Followers of a user (`users.getFollowers`)
    Followers,
    /// Users who liked an object (`likes.getList`)
    Likes,
}

impl ResourceKind {
    /// All kinds, in a stable order
    pub const ALL: [Self; 5] = [
        Self::Posts,
        Self::Comments,
        Self::Members,
        Self::Followers,
        Self::Likes,
    ];

    /// Short name used in logs and store keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Comments => "comments",
            Self::Members => "members",
            Self::Followers => "followers",
            Self::Likes => "likes",
        }
    }

    /// Parameter defaults for this kind
    pub fn config(&self) -> ResourceConfig {
        match self {
            Self::Posts => ResourceConfig {
                kind: *self,
                method: "wall.get",
                page_size: 100,
                extended_default: false,
                side_lists: true,
                total_source: TotalSource::AmountProbe,
                date_ordered: true,
                default_params: vec![("fields", base_user_fields().into())],
            },
            Self::Comments => ResourceConfig {
                kind: *self,
                method: "wall.getComments",
                page_size: 100,
                extended_default: true,
                side_lists: true,
                total_source: TotalSource::AmountProbe,
                date_ordered: false,
                default_params: vec![("fields", base_user_fields().into())],
            },
            Self::Members => ResourceConfig {
                kind: *self,
                method: "groups.getMembers",
                page_size: 1000,
                extended_default: false,
                side_lists: false,
                total_source: TotalSource::GroupMembersCount,
                date_ordered: false,
                default_params: vec![("fields", base_user_fields().into())],
            },
            Self::Followers => ResourceConfig {
                kind: *self,
                method: "users.getFollowers",
                page_size: 1000,
                extended_default: false,
                side_lists: false,
                total_source: TotalSource::UserFollowersCount,
                date_ordered: false,
                default_params: vec![("fields", base_user_fields().into())],
            },
            Self::Likes => ResourceConfig {
                kind: *self,
                method: "likes.getList",
                page_size: 1000,
                extended_default: true,
                side_lists: false,
                total_source: TotalSource::None,
                date_ordered: false,
                default_params: vec![],
            },
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the authoritative total of a collection comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalSource {
    /// One-item call to the paginated method itself, reading `count`
    AmountProbe,
    /// `groups.getById` with `fields=members_count`
    GroupMembersCount,
    /// `users.get` with `fields=followers_count`
    UserFollowersCount,
    /// No authoritative total exists
    None,
}

/// Immutable per-kind configuration record
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceConfig {
    /// The kind this record describes
    pub kind: ResourceKind,
    /// Remote method name
    pub method: &'static str,
    /// Items requested per page
    pub page_size: u64,
    /// Whether extended mode is requested unless overridden
    pub extended_default: bool,
    /// Whether extended responses carry `profiles`/`groups` side lists
    pub side_lists: bool,
    /// Source of the authoritative total
    pub total_source: TotalSource,
    /// Whether items arrive newest-first with a `date` field
    pub date_ordered: bool,
    /// Parameters sent with every page request
    pub default_params: Vec<(&'static str, ParamValue)>,
}

impl ResourceConfig {
    /// Whether each page's `count` is the authoritative total
    pub fn tracks_total(&self) -> bool {
        self.total_source != TotalSource::None
    }

    /// Whether extended mode applies to this kind at all
    pub fn supports_extended(&self) -> bool {
        matches!(
            self.kind,
            ResourceKind::Posts | ResourceKind::Comments | ResourceKind::Likes
        )
    }

    /// Default parameters as an owned map
    pub fn defaults(&self) -> Params {
        self.default_params
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }
}

// ============================================================================
// Target identity
// ============================================================================

/// Identity of the collection to fetch.
///
/// Which fields are required depends on the resource kind; see
/// [`Target::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Owner of a wall or liked object (communities are negative)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    /// Short name of a user or community
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Community id or short name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// User id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Wall post id (comments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    /// Liked object type, e.g. `post`, `photo`, `comment`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// Liked object id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
}

impl Target {
    /// Empty target
    pub fn new() -> Self {
        Self::default()
    }

    /// Wall of `owner_id`
    pub fn owner(owner_id: i64) -> Self {
        Self::new().with_owner_id(owner_id)
    }

    /// Wall of the user or community with short name `domain`
    pub fn domain(domain: impl Into<String>) -> Self {
        Self::new().with_domain(domain)
    }

    /// Comments under `post_id` on the wall of `owner_id`
    pub fn post(owner_id: i64, post_id: i64) -> Self {
        Self::new().with_owner_id(owner_id).with_post_id(post_id)
    }

    /// Members of a community
    pub fn group(group_id: impl Into<String>) -> Self {
        Self::new().with_group_id(group_id)
    }

    /// Followers of a user
    pub fn user(user_id: i64) -> Self {
        Self::new().with_user_id(user_id)
    }

    /// Likes on an object
    pub fn liked(object_type: impl Into<String>, owner_id: i64, item_id: i64) -> Self {
        Self {
            object_type: Some(object_type.into()),
            owner_id: Some(owner_id),
            item_id: Some(item_id),
            ..Self::default()
        }
    }

    /// Set owner id
    #[must_use]
    pub fn with_owner_id(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Set domain
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set group id
    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Set user id
    #[must_use]
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set post id
    #[must_use]
    pub fn with_post_id(mut self, post_id: i64) -> Self {
        self.post_id = Some(post_id);
        self
    }

    /// Set liked object type
    #[must_use]
    pub fn with_object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    /// Set liked object id
    #[must_use]
    pub fn with_item_id(mut self, item_id: i64) -> Self {
        self.item_id = Some(item_id);
        self
    }

    /// Resolve the identity parameters for `kind`.
    ///
    /// Fails when the identity form required by the kind is missing or
    /// ambiguous. No calls are made.
    pub fn resolve(&self, kind: ResourceKind) -> Result<Params> {
        let mut params = Params::new();
        match kind {
            ResourceKind::Posts => match (self.owner_id, self.domain.as_deref()) {
                (Some(owner_id), None) => {
                    params.insert("owner_id".into(), owner_id.into());
                }
                (None, Some(domain)) if !domain.is_empty() => {
                    params.insert("domain".into(), domain.into());
                }
                (Some(_), Some(_)) => {
                    return Err(Error::missing_identity(
                        kind.as_str(),
                        "set exactly one of owner_id or domain, not both",
                    ));
                }
                _ => {
                    return Err(Error::missing_identity(
                        kind.as_str(),
                        "owner_id or domain is required",
                    ));
                }
            },
            ResourceKind::Comments => {
                let owner_id = self.owner_id.ok_or_else(|| {
                    Error::missing_identity(kind.as_str(), "owner_id is required")
                })?;
                let post_id = self.post_id.ok_or_else(|| {
                    Error::missing_identity(kind.as_str(), "post_id is required")
                })?;
                params.insert("owner_id".into(), owner_id.into());
                params.insert("post_id".into(), post_id.into());
            }
            ResourceKind::Members => {
                let group_id = self
                    .group_id
                    .as_deref()
                    .filter(|g| !g.is_empty())
                    .ok_or_else(|| {
                        Error::missing_identity(kind.as_str(), "group_id is required")
                    })?;
                params.insert("group_id".into(), group_id.into());
            }
            ResourceKind::Followers => {
                let user_id = self.user_id.ok_or_else(|| {
                    Error::missing_identity(kind.as_str(), "user_id is required")
                })?;
                params.insert("user_id".into(), user_id.into());
            }
            ResourceKind::Likes => {
                let object_type = self
                    .object_type
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        Error::missing_identity(kind.as_str(), "object type is required")
                    })?;
                let item_id = self.item_id.ok_or_else(|| {
                    Error::missing_identity(kind.as_str(), "item_id is required")
                })?;
                params.insert("type".into(), object_type.into());
                params.insert("item_id".into(), item_id.into());
                if let Some(owner_id) = self.owner_id {
                    params.insert("owner_id".into(), owner_id.into());
                }
            }
        }
        Ok(params)
    }
}
