//! Interior components: the controller for one part's walkable interior and
//! its deferred-cut bookkeeping.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::common::{ModelId, ObjectId, PartId};

/// Interior controller component - owns the hatch list for one model
#[derive(Debug, Clone)]
pub struct Interior {
    pub model: ModelId,
    pub part: PartId,
    pub hatches: Vec<Entity>,
}

impl Interior {
    pub fn new(model: ModelId, part: PartId) -> Self {
        Self {
            model,
            part,
            hatches: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutKind {
    /// Mesh-vs-mesh boolean subtraction
    #[default]
    Boolean,
    /// Remove the target object outright
    Delete,
}

/// One pending geometry operation. Consumed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutRequest {
    pub target: ObjectId,
    pub tool: Option<ObjectId>,
    pub kind: CutKind,
}

impl CutRequest {
    pub fn boolean(target: ObjectId, tool: ObjectId) -> Self {
        Self {
            target,
            tool: Some(tool),
            kind: CutKind::Boolean,
        }
    }

    pub fn delete(target: ObjectId) -> Self {
        Self {
            target,
            tool: None,
            kind: CutKind::Delete,
        }
    }
}

/// Per-model cut barrier component
///
/// `pending` counts hatch-driven requests still expected. The accumulated
/// list is handed out exactly once, when `pending` reaches zero.
#[derive(Debug, Clone, Default)]
pub struct CutBarrier {
    pub pending: u32,
    pub requests: Vec<CutRequest>,
    pub fired: bool,
}

impl CutBarrier {
    pub fn new(expected: u32, static_requests: Vec<CutRequest>) -> Self {
        Self {
            pending: expected,
            requests: static_requests,
            fired: false,
        }
    }

    /// True when nothing else is expected and the batch has not run yet
    pub fn is_ready(&self) -> bool {
        self.pending == 0 && !self.fired
    }

    /// Record one hatch report. A report that failed to resolve still counts
    /// toward the barrier but adds no request. Returns `is_ready()`.
    pub fn contribute(&mut self, request: Option<CutRequest>) -> bool {
        if self.fired || self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        if let Some(request) = request {
            self.requests.push(request);
        }
        self.is_ready()
    }

    /// Hand out the accumulated batch. `None` once the barrier has fired.
    pub fn take(&mut self) -> Option<Vec<CutRequest>> {
        if !self.is_ready() {
            return None;
        }
        self.fired = true;
        Some(std::mem::take(&mut self.requests))
    }
}
