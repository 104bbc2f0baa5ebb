/// Fixed-rate frame clock used to sample scene time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    fps: u32,
}

impl Timeline {
    /// Create a frame clock. A zero rate is bumped to 1 fps.
    pub fn new(fps: u32) -> Self {
        Self { fps: fps.max(1) }
    }

    /// Get FPS
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Convert frame number to time in seconds
    pub fn frame_to_time(&self, frame: u32) -> f64 {
        frame as f64 / self.fps as f64
    }
}
