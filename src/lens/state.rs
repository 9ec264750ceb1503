#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl Lifecycle {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

pub fn can_transition(from: Lifecycle, to: Lifecycle) -> bool {
    matches!(
        (from, to),
        (Lifecycle::Idle, Lifecycle::Starting)
            | (Lifecycle::Starting, Lifecycle::Running)
            | (Lifecycle::Starting, Lifecycle::Stopped)
            | (Lifecycle::Running, Lifecycle::Stopping)
            | (Lifecycle::Stopping, Lifecycle::Stopped)
    ) || from == to
}
