pub mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable log and progress lines.
    #[default]
    Text,
    /// One JSON object per runner event on stdout.
    JsonEvents,
}
