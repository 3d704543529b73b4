//! A zone: the task board of one spatial area and its rally point.

use sw_core::{Position, ZoneName};
use sw_task::TaskBoard;

#[derive(Debug)]
pub struct Zone {
    pub name:  ZoneName,
    pub board: TaskBoard,
    /// Where idle agents gather.
    pub rally: Position,
}

impl Zone {
    pub fn new(name: impl Into<ZoneName>, rally: Position) -> Self {
        let name = name.into();
        Self { board: TaskBoard::new(name.clone()), name, rally }
    }
}
