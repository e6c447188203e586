//! Timer Scheduler - Periodic callback nodes and the active list
//!
//! Nodes live in a table owned by the scheduler and are referred to by
//! [`NodeId`]. The active list holds ids only, so taking a node out of the
//! list never drops its descriptor and callers can re-add it later.
//!
//! # Dispatch
//!
//! One frame pass walks a snapshot of the active ids and re-checks
//! membership before visiting each one. Nodes removed mid-pass are skipped;
//! nodes added mid-pass first run in the next pass.

use crate::events::EventsManager;
use crate::types::NodeFlags;

// =============================================================================
// Handlers
// =============================================================================

/// Callback run when a node comes due.
///
/// Built-in handlers are resolved by the manager; `Custom` carries a plain
/// function that receives the manager as its context.
#[derive(Clone, Copy)]
pub enum Handler {
    /// Master clock: game counter and per-second engine hook.
    MainClock,
    /// One palette fade step.
    Fade,
    /// Brightness level ramp.
    FadeLevels,
    /// Color cycling.
    Cycle,
    /// Cursor blink toggle.
    CursorBlink,
    Custom(fn(&mut EventsManager)),
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MainClock => f.write_str("MainClock"),
            Self::Fade => f.write_str("Fade"),
            Self::FadeLevels => f.write_str("FadeLevels"),
            Self::Cycle => f.write_str("Cycle"),
            Self::CursorBlink => f.write_str("CursorBlink"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// Stable identity of a node in the scheduler's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const FADE: NodeId = NodeId(0);
    pub const FADE2: NodeId = NodeId(1);
    pub const CYCLE: NodeId = NodeId(2);
    pub const EV: NodeId = NodeId(3);
    pub const MAIN: NodeId = NodeId(4);

    pub fn index(self) -> usize {
        self.0
    }
}

const BUILTIN_NODES: usize = 5;

/// A periodic timer callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntNode {
    pub callback: Option<Handler>,
    /// Ticks until due. 0 means due on the next tick.
    pub cur_time: u16,
    /// Value `cur_time` is reloaded with after firing.
    pub time_reset: u16,
    pub flags: NodeFlags,
}

impl IntNode {
    /// `cur_time` is clamped to `time_reset`.
    pub fn new(cur_time: u16, time_reset: u16, flags: NodeFlags) -> Self {
        Self {
            callback: None,
            cur_time: cur_time.min(time_reset),
            time_reset,
            flags,
        }
    }

    pub fn with_callback(mut self, callback: Handler) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.flags.contains(NodeFlags::DISABLED)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.flags.set(NodeFlags::DISABLED, !enabled);
    }
}

// =============================================================================
// Node list
// =============================================================================

#[derive(Debug)]
pub struct IntNodeList {
    nodes: Vec<IntNode>,
    active: Vec<NodeId>,
}

impl Default for IntNodeList {
    fn default() -> Self {
        Self::new()
    }
}

impl IntNodeList {
    /// Table with the five built-in nodes, none of them active.
    pub fn new() -> Self {
        Self {
            nodes: vec![IntNode::default(); BUILTIN_NODES],
            active: Vec::new(),
        }
    }

    /// Store a caller-defined node and return its id. It is not activated.
    pub fn register(&mut self, node: IntNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&IntNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut IntNode> {
        self.nodes.get_mut(id.0)
    }

    /// Append to the active list. Returns false (and changes nothing) for an
    /// unknown id, a node without a callback, or a node already active.
    pub fn add(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id.0) else {
            log::warn!("ignoring add of unknown node {:?}", id);
            return false;
        };
        if node.callback.is_none() {
            log::warn!("ignoring add of node {:?} without a callback", id);
            return false;
        }
        if self.contains(id) {
            log::debug!("node {:?} already active", id);
            return false;
        }
        self.active.push(id);
        true
    }

    /// Take a node out of the active list. Absent nodes are ignored.
    pub fn remove(&mut self, id: NodeId) -> bool {
        match self.active.iter().position(|&active| active == id) {
            Some(pos) => {
                self.active.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.active.contains(&id)
    }

    /// Active ids in dispatch order.
    pub fn active(&self) -> &[NodeId] {
        &self.active
    }

    pub(crate) fn snapshot(&self) -> Vec<NodeId> {
        self.active.clone()
    }

    /// Advance one node by a tick. Returns its handler when it is due.
    pub(crate) fn countdown(&mut self, id: NodeId) -> Option<Handler> {
        let node = self.nodes.get_mut(id.0)?;
        if node.flags.contains(NodeFlags::DISABLED) {
            return None;
        }
        if !node.flags.contains(NodeFlags::EVERY_TICK) {
            node.cur_time = node.cur_time.saturating_sub(1);
            if node.cur_time != 0 {
                return None;
            }
        }
        node.callback
    }

    /// Reload a node after its callback ran.
    pub(crate) fn reload(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.cur_time = node.time_reset;
        }
    }
}
