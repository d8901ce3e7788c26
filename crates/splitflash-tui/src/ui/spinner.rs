const FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Spinner glyph for the model's tick counter.
pub(crate) fn frame(index: usize) -> &'static str {
    FRAMES[index % FRAMES.len()]
}
