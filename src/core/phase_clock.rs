//! Millisecond clock for timing the phases of a step.

#[cfg(target_arch = "wasm32")]
type Stamp = f64;
#[cfg(not(target_arch = "wasm32"))]
type Stamp = std::time::Instant;

#[cfg(target_arch = "wasm32")]
fn stamp() -> Stamp {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn stamp() -> Stamp {
    std::time::Instant::now()
}

#[cfg(target_arch = "wasm32")]
fn ms_since(earlier: Stamp) -> f64 {
    js_sys::Date::now() - earlier
}

#[cfg(not(target_arch = "wasm32"))]
fn ms_since(earlier: Stamp) -> f64 {
    earlier.elapsed().as_secs_f64() * 1000.0
}

/// Splits a run into consecutive phases while also tracking the whole run.
#[derive(Clone, Copy)]
pub(crate) struct PhaseClock {
    run_began: Stamp,
    phase_began: Stamp,
}

impl PhaseClock {
    pub(crate) fn begin() -> Self {
        let now = stamp();
        Self { run_began: now, phase_began: now }
    }

    /// Close the current phase and return its length; the next one starts now.
    pub(crate) fn end_phase(&mut self) -> f64 {
        let spent = ms_since(self.phase_began);
        self.phase_began = stamp();
        spent
    }

    pub(crate) fn total_ms(&self) -> f64 {
        ms_since(self.run_began)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_never_exceed_the_run() {
        let mut clock = PhaseClock::begin();
        let first = clock.end_phase();
        let second = clock.end_phase();
        let total = clock.total_ms();
        assert!(first >= 0.0 && second >= 0.0);
        assert!(first + second <= total + 1e-6);
    }
}
