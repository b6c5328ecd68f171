/// Per-second elapsed counter. Only ticks while running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    elapsed_seconds: u32,
    running: bool,
}

impl Timer {
    /// Returns `true` when the timer went from stopped to running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Returns `true` when the timer was running.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn reset(&mut self) {
        self.stop();
        self.elapsed_seconds = 0;
    }

    /// Counts one second if running.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        true
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// `mm:ss`, minutes keep growing past 59.
pub fn format_mm_ss(total_secs: u32) -> String {
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_idempotent() {
        let mut timer = Timer::default();
        assert!(timer.start());
        assert!(!timer.start());
        assert!(timer.tick());
        assert_eq!(timer.elapsed_seconds(), 1);
    }

    #[test]
    fn test_tick_ignored_while_stopped() {
        let mut timer = Timer::default();
        assert!(!timer.tick());
        timer.start();
        timer.tick();
        assert!(timer.stop());
        assert!(!timer.stop());
        assert!(!timer.tick());
        assert_eq!(timer.elapsed_seconds(), 1);
    }

    #[test]
    fn test_reset_stops_and_zeroes() {
        let mut timer = Timer::default();
        timer.start();
        timer.tick();
        timer.tick();
        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(75), "01:15");
        assert_eq!(format_mm_ss(3725), "62:05");
    }
}
