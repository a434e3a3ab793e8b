use std::collections::HashMap;

use crate::transit::Timestamp;

pub trait SlackProvider {
    fn board_slack(&self, slack_index: usize) -> Timestamp;
    fn alight_slack(&self, slack_index: usize) -> Timestamp;
}

/// Fixed board/alight slack, with optional overrides per slack index (usually per mode).
#[derive(Clone, Debug, Default)]
pub struct DefaultSlackProvider {
    pub board_slack: Timestamp,
    pub alight_slack: Timestamp,
    overrides: HashMap<usize, (Timestamp, Timestamp)>,
}

impl DefaultSlackProvider {
    pub fn new(board_slack: Timestamp, alight_slack: Timestamp) -> Self {
        Self { board_slack, alight_slack, overrides: HashMap::new() }
    }

    pub fn with_override(mut self, slack_index: usize, board_slack: Timestamp, alight_slack: Timestamp) -> Self {
        self.overrides.insert(slack_index, (board_slack, alight_slack));
        self
    }
}

impl SlackProvider for DefaultSlackProvider {
    fn board_slack(&self, slack_index: usize) -> Timestamp {
        self.overrides.get(&slack_index).map_or(self.board_slack, |&(board, _)| board)
    }

    fn alight_slack(&self, slack_index: usize) -> Timestamp {
        self.overrides.get(&slack_index).map_or(self.alight_slack, |&(_, alight)| alight)
    }
}
