// Progress reporting for terrain initialization.
// Purely observational: the build pipeline never branches on the sink.

/// Receives coarse build milestones as a fraction in [0, 1] plus a label.
pub trait ProgressSink {
    fn report(&mut self, fraction: f32, label: &str);
}

/// Sink that ignores every report. Valid anywhere a sink is required.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&mut self, _fraction: f32, _label: &str) {}
}
