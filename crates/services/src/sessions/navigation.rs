use tracing::debug;

/// Screens the quiz can ask the host application to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Fresh quiz entry point, shown on restart.
    QuizStart,
}

/// Host-side routing hook. The session never inspects what the host does.
pub trait Navigator: Send + Sync {
    fn navigate(&self, screen: Screen);
}

/// Navigator for hosts without routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, screen: Screen) {
        debug!(?screen, "Navigation requested with no router attached");
    }
}
