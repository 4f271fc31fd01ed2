//! Gesture state machine. Gestures go in, the next state and side effects come out; the
//! caller applies the effects to the graph.

use glam::Vec3;

use crate::model::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selecting,
    ConnectPending,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// Click on a node, or on empty space for `None`.
    Click(Option<NodeId>),
    ToggleConnectMode,
    DragStart(NodeId),
    DragMove(NodeId, Vec3),
    DragEnd(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    CreateEdge { start: NodeId, end: NodeId },
    Pin(NodeId),
    MoveNode(NodeId, Vec3),
    Unpin(NodeId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    selected: Option<NodeId>,
    connecting: bool,
    pending_start: Option<NodeId>,
    dragging: Option<NodeId>,
}

impl InteractionState {
    pub fn phase(&self) -> Phase {
        if self.connecting {
            Phase::ConnectPending
        } else if self.selected.is_some() {
            Phase::Selecting
        } else {
            Phase::Idle
        }
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn pending_start(&self) -> Option<NodeId> {
        self.pending_start
    }

    pub fn dragging(&self) -> Option<NodeId> {
        self.dragging
    }

    pub fn select(&mut self, node: Option<NodeId>) {
        self.selected = node;
    }

    /// Drops every reference to a node that no longer exists.
    pub fn forget(&mut self, node: NodeId) {
        if self.selected == Some(node) {
            self.selected = None;
        }
        if self.pending_start == Some(node) {
            self.pending_start = None;
        }
        if self.dragging == Some(node) {
            self.dragging = None;
        }
    }

    pub fn transition(mut self, gesture: Gesture) -> (Self, Vec<Effect>) {
        let mut effects = Vec::new();

        match gesture {
            Gesture::ToggleConnectMode => {
                if self.connecting {
                    self.connecting = false;
                    self.pending_start = None;
                } else {
                    self.connecting = true;
                    self.pending_start = None;
                    self.selected = None;
                }
            }
            Gesture::Click(target) if self.connecting => match (self.pending_start, target) {
                (None, Some(node)) => self.pending_start = Some(node),
                (None, None) => self.connecting = false,
                (Some(start), Some(node)) if start != node => {
                    effects.push(Effect::CreateEdge { start, end: node });
                    self.pending_start = None;
                    self.connecting = false;
                }
                (Some(_), _) => {}
            },
            Gesture::Click(Some(node)) => {
                self.selected = if self.selected == Some(node) {
                    None
                } else {
                    Some(node)
                };
            }
            Gesture::Click(None) => {}
            Gesture::DragStart(node) => {
                if let Some(previous) = self.dragging.replace(node)
                    && previous != node
                {
                    effects.push(Effect::Unpin(previous));
                }
                effects.push(Effect::Pin(node));
            }
            Gesture::DragMove(node, position) => {
                if self.dragging == Some(node) {
                    effects.push(Effect::MoveNode(node, position));
                }
            }
            Gesture::DragEnd(node) => {
                if self.dragging == Some(node) {
                    self.dragging = None;
                    effects.push(Effect::Unpin(node));
                }
            }
        }

        (self, effects)
    }

    pub fn apply(&mut self, gesture: Gesture) -> Vec<Effect> {
        let (next, effects) = self.transition(gesture);
        *self = next;
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: NodeId = NodeId(1);
    const B: NodeId = NodeId(2);

    #[test]
    fn click_selects_and_toggles_off() {
        let mut state = InteractionState::default();
        assert_eq!(state.phase(), Phase::Idle);

        assert!(state.apply(Gesture::Click(Some(A))).is_empty());
        assert_eq!(state.phase(), Phase::Selecting);
        assert_eq!(state.selected(), Some(A));

        state.apply(Gesture::Click(Some(B)));
        assert_eq!(state.selected(), Some(B));

        state.apply(Gesture::Click(Some(B)));
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn entering_connect_mode_clears_selection() {
        let mut state = InteractionState::default();
        state.apply(Gesture::Click(Some(A)));
        state.apply(Gesture::ToggleConnectMode);

        assert_eq!(state.phase(), Phase::ConnectPending);
        assert_eq!(state.selected(), None);
        assert_eq!(state.pending_start(), None);
    }

    #[test]
    fn clicking_start_twice_stays_pending() {
        let mut state = InteractionState::default();
        state.apply(Gesture::ToggleConnectMode);
        state.apply(Gesture::Click(Some(A)));
        let before = state;

        let effects = state.apply(Gesture::Click(Some(A)));

        assert!(effects.is_empty());
        assert_eq!(state, before);
        assert_eq!(state.pending_start(), Some(A));
    }

    #[test]
    fn second_node_creates_edge_and_returns_idle() {
        let mut state = InteractionState::default();
        state.apply(Gesture::ToggleConnectMode);
        state.apply(Gesture::Click(Some(A)));

        let effects = state.apply(Gesture::Click(Some(B)));

        assert_eq!(effects, vec![Effect::CreateEdge { start: A, end: B }]);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.pending_start(), None);
    }

    #[test]
    fn empty_click_without_start_cancels_connect_mode() {
        let mut state = InteractionState::default();
        state.apply(Gesture::ToggleConnectMode);
        state.apply(Gesture::Click(None));
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn empty_click_with_start_keeps_waiting() {
        let mut state = InteractionState::default();
        state.apply(Gesture::ToggleConnectMode);
        state.apply(Gesture::Click(Some(A)));
        state.apply(Gesture::Click(None));
        assert_eq!(state.phase(), Phase::ConnectPending);
        assert_eq!(state.pending_start(), Some(A));
    }

    #[test]
    fn toggling_again_abandons_pending_start() {
        let mut state = InteractionState::default();
        state.apply(Gesture::ToggleConnectMode);
        state.apply(Gesture::Click(Some(A)));
        state.apply(Gesture::ToggleConnectMode);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.pending_start(), None);
    }

    #[test]
    fn drag_pins_moves_and_releases() {
        let mut state = InteractionState::default();
        let target = Vec3::new(1.0, 2.0, 3.0);

        assert_eq!(state.apply(Gesture::DragStart(A)), vec![Effect::Pin(A)]);
        assert_eq!(
            state.apply(Gesture::DragMove(A, target)),
            vec![Effect::MoveNode(A, target)]
        );
        assert!(state.apply(Gesture::DragMove(B, target)).is_empty());
        assert_eq!(state.apply(Gesture::DragEnd(A)), vec![Effect::Unpin(A)]);
        assert!(state.apply(Gesture::DragEnd(A)).is_empty());
    }

    #[test]
    fn forget_clears_references_to_removed_node() {
        let mut state = InteractionState::default();
        state.apply(Gesture::ToggleConnectMode);
        state.apply(Gesture::Click(Some(A)));
        state.apply(Gesture::DragStart(A));

        state.forget(A);

        assert_eq!(state.pending_start(), None);
        assert_eq!(state.dragging(), None);
        assert!(state.is_connecting());
    }
}
