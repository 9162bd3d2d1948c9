//! Edge tags

use super::graph::EdgeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Set of dependence kinds carried by one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependenceKinds(u8);

impl DependenceKinds {
    pub const NONE: Self = Self(0);
    pub const CONTROL: Self = Self(1);
    pub const DATA: Self = Self(1 << 1);
    pub const MEMORY: Self = Self(1 << 2);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_control(self) -> bool {
        self.contains(Self::CONTROL)
    }

    pub fn is_data(self) -> bool {
        self.contains(Self::DATA)
    }

    pub fn is_memory(self) -> bool {
        self.contains(Self::MEMORY)
    }

    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.is_control() {
            names.push("control");
        }
        if self.is_data() {
            names.push("data");
        }
        if self.is_memory() {
            names.push("memory");
        }
        names
    }
}

impl std::ops::BitOr for DependenceKinds {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for DependenceKinds {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for DependenceKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join("|"))
    }
}

/// Whether a dependence is proven or only possible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Certainty {
    #[default]
    Must,
    May,
}

impl Certainty {
    pub fn is_must(self) -> bool {
        self == Certainty::Must
    }

    /// Must only if both sides are must
    pub fn join(self, other: Self) -> Self {
        if self.is_must() && other.is_must() {
            Certainty::Must
        } else {
            Certainty::May
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Certainty::Must => "must",
            Certainty::May => "may",
        }
    }
}

/// Read/write ordering hazard of a data or memory dependence
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataHazard {
    RAW,
    WAR,
    WAW,
}

impl DataHazard {
    pub fn as_str(self) -> &'static str {
        match self {
            DataHazard::RAW => "RAW",
            DataHazard::WAR => "WAR",
            DataHazard::WAW => "WAW",
        }
    }
}

/// Edge payload of a [`super::DependenceGraph`]
///
/// Instruction-level edges have no sub-edges. Component-level edges list the
/// instruction-level edges they summarize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependence {
    pub kinds: DependenceKinds,
    pub certainty: Certainty,
    pub hazard: Option<DataHazard>,
    pub loop_carried: bool,
    pub sub_edges: Vec<EdgeId>,
}

impl Dependence {
    /// Use-def edge: data, RAW, must
    pub fn data() -> Self {
        Self {
            kinds: DependenceKinds::DATA,
            certainty: Certainty::Must,
            hazard: Some(DataHazard::RAW),
            loop_carried: false,
            sub_edges: Vec::new(),
        }
    }

    pub fn control() -> Self {
        Self {
            kinds: DependenceKinds::CONTROL,
            certainty: Certainty::Must,
            hazard: None,
            loop_carried: false,
            sub_edges: Vec::new(),
        }
    }

    pub fn memory(hazard: DataHazard, certainty: Certainty) -> Self {
        Self {
            kinds: DependenceKinds::MEMORY,
            certainty,
            hazard: Some(hazard),
            loop_carried: false,
            sub_edges: Vec::new(),
        }
    }

    /// Empty aggregate edge, filled by [`Dependence::absorb`]
    pub fn aggregate() -> Self {
        Self {
            kinds: DependenceKinds::NONE,
            certainty: Certainty::Must,
            hazard: None,
            loop_carried: false,
            sub_edges: Vec::new(),
        }
    }

    pub fn carried(mut self, loop_carried: bool) -> Self {
        self.loop_carried = loop_carried;
        self
    }

    /// Fold one instruction-level edge into this aggregate
    pub fn absorb(&mut self, sub_edge: EdgeId, sub: &Dependence) {
        self.kinds |= sub.kinds;
        self.certainty = self.certainty.join(sub.certainty);
        self.loop_carried |= sub.loop_carried;
        self.sub_edges.push(sub_edge);
    }

    pub fn is_must(&self) -> bool {
        self.certainty.is_must()
    }

    pub fn is_memory(&self) -> bool {
        self.kinds.is_memory()
    }

    pub fn is_data(&self) -> bool {
        self.kinds.is_data()
    }

    pub fn is_control(&self) -> bool {
        self.kinds.is_control()
    }

    /// Same tag (kinds, certainty, hazard, loop-carried), ignoring sub-edges
    pub fn same_tag(&self, other: &Dependence) -> bool {
        self.kinds == other.kinds
            && self.certainty == other.certainty
            && self.hazard == other.hazard
            && self.loop_carried == other.loop_carried
    }
}

impl fmt::Display for Dependence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kinds)?;
        if let Some(hazard) = self.hazard {
            write!(f, " {}", hazard.as_str())?;
        }
        if !self.kinds.is_control() || self.kinds.is_memory() {
            write!(f, " {}", self.certainty.as_str())?;
        }
        if self.loop_carried {
            write!(f, " (carried)")?;
        }
        Ok(())
    }
}
