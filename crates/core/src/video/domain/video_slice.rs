/// A time span of the source video with a playback-speed factor.
///
/// The slice is lazy: no frames are decoded or copied here. The muxer
/// interprets the span and speed during its single pass over the source.
/// Playing at `speed`× changes the rendered duration to `native / speed`
/// (speed < 1 slows the slice down, lengthening it).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoSlice {
    start: f64,
    end: f64,
    speed: f64,
}

impl VideoSlice {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            speed: 1.0,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Span length at native playback speed.
    pub fn native_duration(&self) -> f64 {
        self.end - self.start
    }

    /// Rendered duration after the speed factor is applied.
    pub fn duration(&self) -> f64 {
        self.native_duration() / self.speed
    }

    /// Scale playback speed by `factor`, compounding any existing factor.
    pub fn speed_scaled(self, factor: f64) -> Self {
        Self {
            speed: self.speed * factor,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_native_speed_duration() {
        let slice = VideoSlice::new(1.0, 4.0);
        assert_relative_eq!(slice.native_duration(), 3.0);
        assert_relative_eq!(slice.duration(), 3.0);
        assert_relative_eq!(slice.speed(), 1.0);
    }

    #[test]
    fn test_slowing_down_lengthens() {
        // 2s span at 2/3 speed plays for 3s
        let slice = VideoSlice::new(0.0, 2.0).speed_scaled(2.0 / 3.0);
        assert_relative_eq!(slice.duration(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(slice.native_duration(), 2.0);
    }

    #[test]
    fn test_speeding_up_shortens() {
        let slice = VideoSlice::new(0.0, 3.0).speed_scaled(1.5);
        assert_relative_eq!(slice.duration(), 2.0);
    }

    #[test]
    fn test_speed_scaling_compounds() {
        let slice = VideoSlice::new(0.0, 1.0).speed_scaled(2.0).speed_scaled(0.25);
        assert_relative_eq!(slice.speed(), 0.5);
        assert_relative_eq!(slice.duration(), 2.0);
    }
}
