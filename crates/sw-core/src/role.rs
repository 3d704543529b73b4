//! Agent roles and job domains.
//!
//! A role decides which job domain an agent may serve; a domain names one of
//! the three queues every zone owns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{JobKey, SwarmError};

// ── Role ──────────────────────────────────────────────────────────────────────

/// What kind of worker an agent is.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Static miner; never takes queued jobs.
    Harvester,
    /// General-purpose work agent.
    Worker,
    Builder,
    Upgrader,
    Repairer,
    /// Carrier serving the transport queue.
    Manager,
    /// Carrier parked at the zone core, serving center transport.
    Processor,
    Signer,
    Claimer,
    Defender,
    /// Healer; blocks its cell only while treating.
    Doctor,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::Harvester,
        Role::Worker,
        Role::Builder,
        Role::Upgrader,
        Role::Repairer,
        Role::Manager,
        Role::Processor,
        Role::Signer,
        Role::Claimer,
        Role::Defender,
        Role::Doctor,
    ];

    /// The job domain this role draws work from, if any.
    pub fn domain(self) -> Option<JobDomain> {
        match self {
            Role::Worker
            | Role::Builder
            | Role::Upgrader
            | Role::Repairer
            | Role::Signer
            | Role::Defender => Some(JobDomain::Work),
            Role::Manager => Some(JobDomain::Transport),
            Role::Processor => Some(JobDomain::CenterTransport),
            Role::Harvester | Role::Claimer | Role::Doctor => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Harvester => "harvester",
            Role::Worker    => "worker",
            Role::Builder   => "builder",
            Role::Upgrader  => "upgrader",
            Role::Repairer  => "repairer",
            Role::Manager   => "manager",
            Role::Processor => "processor",
            Role::Signer    => "signer",
            Role::Claimer   => "claimer",
            Role::Defender  => "defender",
            Role::Doctor    => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| SwarmError::Parse(format!("unknown role {s:?}")))
    }
}

// ── JobDomain ─────────────────────────────────────────────────────────────────

/// One of the three job queues of a zone.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobDomain {
    Work,
    Transport,
    CenterTransport,
}

impl JobDomain {
    pub const ALL: [JobDomain; 3] = [JobDomain::Work, JobDomain::Transport, JobDomain::CenterTransport];

    /// Roles eligible for a job of this domain unless the job overrides them.
    pub fn default_roles(self) -> &'static [Role] {
        match self {
            JobDomain::Work => &[
                Role::Worker,
                Role::Builder,
                Role::Upgrader,
                Role::Repairer,
                Role::Signer,
                Role::Defender,
            ],
            JobDomain::Transport => &[Role::Manager],
            JobDomain::CenterTransport => &[Role::Processor],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobDomain::Work            => "work",
            JobDomain::Transport       => "transport",
            JobDomain::CenterTransport => "center_transport",
        }
    }
}

impl fmt::Display for JobDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── JobRef ────────────────────────────────────────────────────────────────────

/// Arena-style reference from an agent to a job: the queue plus the key.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct JobRef {
    pub domain: JobDomain,
    pub key:    JobKey,
}

impl JobRef {
    #[inline]
    pub fn new(domain: JobDomain, key: JobKey) -> Self {
        Self { domain, key }
    }
}

impl fmt::Display for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.domain, self.key.0)
    }
}
