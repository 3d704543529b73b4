//! The job record and its constructors.

use std::fmt;

use serde::{Deserialize, Serialize};

use sw_core::{JobDomain, JobKey, ObjectId, Role};

// ── JobKind ───────────────────────────────────────────────────────────────────

/// What a job asks for, with its arguments.
///
/// Serialized with an internal `type` tag, e.g.
/// `{"type":"fill_tower","tower":7}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobKind {
    // ── Work ──────────────────────────────────────────────────────────────
    Upgrade { controller: ObjectId },
    Build { site: ObjectId },
    Repair { structure: ObjectId },
    Sign { controller: ObjectId, text: String },
    Defend { target: ObjectId },

    // ── Transport ─────────────────────────────────────────────────────────
    FillExtensions,
    FillTower { tower: ObjectId },
    Supply { from: ObjectId, to: ObjectId, amount: u32 },

    // ── Center transport ──────────────────────────────────────────────────
    Shuttle { from: ObjectId, to: ObjectId, amount: u32 },
}

impl JobKind {
    pub fn tag(&self) -> JobTag {
        match self {
            JobKind::Upgrade { .. }   => JobTag::Upgrade,
            JobKind::Build { .. }     => JobTag::Build,
            JobKind::Repair { .. }    => JobTag::Repair,
            JobKind::Sign { .. }      => JobTag::Sign,
            JobKind::Defend { .. }    => JobTag::Defend,
            JobKind::FillExtensions   => JobTag::FillExtensions,
            JobKind::FillTower { .. } => JobTag::FillTower,
            JobKind::Supply { .. }    => JobTag::Supply,
            JobKind::Shuttle { .. }   => JobTag::Shuttle,
        }
    }

    #[inline]
    pub fn domain(&self) -> JobDomain {
        self.tag().domain()
    }
}

// ── JobTag ────────────────────────────────────────────────────────────────────

/// The discriminant of [`JobKind`], used as a lookup key.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobTag {
    Upgrade,
    Build,
    Repair,
    Sign,
    Defend,
    FillExtensions,
    FillTower,
    Supply,
    Shuttle,
}

impl JobTag {
    pub const ALL: [JobTag; 9] = [
        JobTag::Upgrade,
        JobTag::Build,
        JobTag::Repair,
        JobTag::Sign,
        JobTag::Defend,
        JobTag::FillExtensions,
        JobTag::FillTower,
        JobTag::Supply,
        JobTag::Shuttle,
    ];

    pub fn domain(self) -> JobDomain {
        match self {
            JobTag::Upgrade | JobTag::Build | JobTag::Repair | JobTag::Sign | JobTag::Defend => {
                JobDomain::Work
            }
            JobTag::FillExtensions | JobTag::FillTower | JobTag::Supply => JobDomain::Transport,
            JobTag::Shuttle => JobDomain::CenterTransport,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobTag::Upgrade        => "upgrade",
            JobTag::Build          => "build",
            JobTag::Repair         => "repair",
            JobTag::Sign           => "sign",
            JobTag::Defend         => "defend",
            JobTag::FillExtensions => "fill_extensions",
            JobTag::FillTower      => "fill_tower",
            JobTag::Supply         => "supply",
            JobTag::Shuttle        => "shuttle",
        }
    }
}

impl fmt::Display for JobTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Requirement ───────────────────────────────────────────────────────────────

/// `units` of a job's slots are reserved for agents carrying `tag`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    pub tag:   String,
    pub units: u32,
}

// ── Job ───────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub key: JobKey,

    #[serde(flatten)]
    pub kind: JobKind,

    /// Smaller runs first; `None` runs last.
    pub priority: Option<u32>,

    pub requirement: Option<Requirement>,

    /// Agents wanted.
    pub need: u32,

    /// Agents currently referencing this job.
    #[serde(default)]
    pub assigned: u32,

    /// Assigned agents that carry the requirement tag.
    #[serde(default)]
    pub requirement_assigned: u32,

    /// Roles eligible for this job.
    pub roles: Vec<Role>,

    /// Insertion sequence number; breaks priority ties.
    #[serde(default)]
    pub seq: u64,
}

impl Job {
    #[inline]
    pub fn tag(&self) -> JobTag {
        self.kind.tag()
    }

    /// Sort key: `(unprioritized, priority, seq)`.
    #[inline]
    pub fn order_key(&self) -> (bool, u32, u64) {
        (self.priority.is_none(), self.priority.unwrap_or(0), self.seq)
    }

    /// `true` if `self` runs strictly before `other` by priority alone.
    pub fn outranks(&self, other: &Job) -> bool {
        match (self.priority, other.priority) {
            (Some(a), Some(b)) => a < b,
            (Some(_), None) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn deficit(&self) -> u32 {
        self.need.saturating_sub(self.assigned)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.assigned >= self.need
    }

    /// Requirement slots still waiting for a tagged agent.
    pub fn requirement_deficit(&self) -> u32 {
        match &self.requirement {
            Some(req) => req.units.min(self.need).saturating_sub(self.requirement_assigned),
            None => 0,
        }
    }

    pub fn requirement_tag(&self) -> Option<&str> {
        self.requirement.as_ref().map(|r| r.tag.as_str())
    }

    #[inline]
    pub fn accepts(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// `true` if `(tag, requirement tag)` identify this job.
    pub fn same_identity(&self, tag: JobTag, requirement: Option<&str>) -> bool {
        self.tag() == tag && self.requirement_tag() == requirement
    }
}

// ── JobSelector ───────────────────────────────────────────────────────────────

/// Picks jobs by key or by kind.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum JobSelector {
    Key(JobKey),
    Tag(JobTag),
}

impl JobSelector {
    pub fn matches(&self, job: &Job) -> bool {
        match *self {
            JobSelector::Key(k) => job.key == k,
            JobSelector::Tag(t) => job.tag() == t,
        }
    }
}

impl From<JobKey> for JobSelector {
    fn from(k: JobKey) -> Self {
        JobSelector::Key(k)
    }
}

impl From<JobTag> for JobSelector {
    fn from(t: JobTag) -> Self {
        JobSelector::Tag(t)
    }
}

impl fmt::Display for JobSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSelector::Key(k) => write!(f, "key {}", k.0),
            JobSelector::Tag(t) => write!(f, "tag {t}"),
        }
    }
}

// ── NewJob ────────────────────────────────────────────────────────────────────

/// Builder for a job to be added to a queue.
///
/// ```
/// use sw_core::ObjectId;
/// use sw_task::{JobKind, NewJob};
///
/// let job = NewJob::new(JobKind::Build { site: ObjectId(4) })
///     .priority(2)
///     .need(3)
///     .requirement("heavy_work", 1);
/// assert_eq!(job.need, 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewJob {
    pub kind:        JobKind,
    pub priority:    Option<u32>,
    pub requirement: Option<Requirement>,
    pub need:        u32,
    /// `None` means the domain's default roles.
    pub roles:       Option<Vec<Role>>,
}

impl NewJob {
    pub fn new(kind: JobKind) -> Self {
        Self { kind, priority: None, requirement: None, need: 1, roles: None }
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn need(mut self, need: u32) -> Self {
        self.need = need;
        self
    }

    pub fn requirement(mut self, tag: impl Into<String>, units: u32) -> Self {
        self.requirement = Some(Requirement { tag: tag.into(), units });
        self
    }

    pub fn roles(mut self, roles: impl Into<Vec<Role>>) -> Self {
        self.roles = Some(roles.into());
        self
    }

    pub(crate) fn into_job(self, key: JobKey, seq: u64) -> Job {
        let roles = self
            .roles
            .unwrap_or_else(|| self.kind.domain().default_roles().to_vec());
        Job {
            key,
            kind: self.kind,
            priority: self.priority,
            requirement: self.requirement,
            need: self.need,
            assigned: 0,
            requirement_assigned: 0,
            roles,
            seq,
        }
    }
}

// ── JobPatch ──────────────────────────────────────────────────────────────────

/// Changes merged into the job with the same kind tag and requirement tag.
///
/// `kind` always replaces the stored arguments; every `Option` field left as
/// `None` keeps the stored value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobPatch {
    pub kind:              JobKind,
    pub requirement_tag:   Option<String>,
    pub priority:          Option<u32>,
    pub need:              Option<u32>,
    pub requirement_units: Option<u32>,
    pub roles:             Option<Vec<Role>>,
}

impl JobPatch {
    pub fn new(kind: JobKind) -> Self {
        Self {
            kind,
            requirement_tag:   None,
            priority:          None,
            need:              None,
            requirement_units: None,
            roles:             None,
        }
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn need(mut self, need: u32) -> Self {
        self.need = Some(need);
        self
    }

    /// Target the job reserving slots for `tag`; `units` updates the
    /// reservation size.
    pub fn requirement(mut self, tag: impl Into<String>, units: u32) -> Self {
        self.requirement_tag = Some(tag.into());
        self.requirement_units = Some(units);
        self
    }

    pub fn roles(mut self, roles: impl Into<Vec<Role>>) -> Self {
        self.roles = Some(roles.into());
        self
    }

    /// The job this patch creates when no match exists.
    pub fn into_new_job(self) -> NewJob {
        NewJob {
            kind:        self.kind,
            priority:    self.priority,
            requirement: self
                .requirement_tag
                .map(|tag| Requirement { tag, units: self.requirement_units.unwrap_or(1) }),
            need:        self.need.unwrap_or(1),
            roles:       self.roles,
        }
    }
}
