//! Timers
//!
//! Four 16-bit timers. Instead of ticking every cycle, a running timer
//! computes its count on demand from the cycle counter and schedules a
//! single overflow event; cascading timers have no event of their own and
//! advance one step per overflow of the timer below them.

use crate::emu::Gba;
use crate::interrupt::IrqSource;
use crate::scheduler::EventKind;

/// Counter range; a timer overflows when it would reach this.
const OVERFLOW: u32 = 0x1_0000;

/// Prescaler dividers selected by control bits 0-1.
const PRESCALERS: [u32; 4] = [1, 64, 256, 1024];

/// Parsed TMxCNT_H.
#[derive(Debug, Clone, Copy)]
pub struct TimerControl {
    pub val: u16,
    /// Cycles per count step.
    pub freq: u32,
    /// Count overflows of the next-lower timer instead of cycles.
    pub cascade: bool,
    pub irq: bool,
    pub enable: bool,
}

impl Default for TimerControl {
    fn default() -> Self {
        Self {
            val: 0,
            freq: 1,
            cascade: false,
            irq: false,
            enable: false,
        }
    }
}

/// One timer unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    /// Value loaded into the counter on enable and on overflow.
    pub reload: u16,
    /// Count at `start_time`; the live value is derived from the clock.
    pub count: u16,
    /// Cycle time the stored count was valid at.
    pub start_time: u32,
    pub control: TimerControl,
}

impl Gba {
    /// Current counter value. Running non-cascade timers derive it from
    /// elapsed cycles; cascade or stopped timers hold a stored count.
    pub fn timer_get_count(&self, idx: usize) -> u16 {
        let t = &self.timers[idx];
        if !t.control.enable || t.control.cascade {
            return t.count;
        }
        let elapsed = self.scheduler.now().wrapping_sub(t.start_time);
        let ticks = elapsed / t.control.freq;
        let value = t.count as u32 + ticks;
        if value < OVERFLOW {
            value as u16
        } else {
            // The overflow event hasn't run yet (it fires at the loop
            // boundary); fold into the reload period.
            let period = OVERFLOW - t.reload as u32;
            (t.reload as u32 + (value - OVERFLOW) % period) as u16
        }
    }

    /// TMxCNT_L write: stage a new reload value. The running count is not
    /// affected until the next overflow or re-enable.
    pub(crate) fn timer_reload_write(&mut self, idx: usize, value: u16) {
        self.timers[idx].reload = value;
    }

    /// TMxCNT_H write. Reconfiguring cancels any pending overflow event and
    /// re-arms from the current state.
    pub(crate) fn timer_control_write(&mut self, idx: usize, value: u16) {
        let was_enabled = self.timers[idx].control.enable;
        if was_enabled {
            // Materialize the derived count before the clock base changes.
            self.timers[idx].count = self.timer_get_count(idx);
        }
        self.scheduler.cancel(EventKind::TimerOverflow(idx));

        let control = TimerControl {
            val: value,
            freq: PRESCALERS[(value & 3) as usize],
            cascade: value & (1 << 2) != 0,
            irq: value & (1 << 6) != 0,
            enable: value & (1 << 7) != 0,
        };
        self.timers[idx].control = control;

        if control.enable {
            if !was_enabled {
                self.timers[idx].count = self.timers[idx].reload;
            }
            self.timers[idx].start_time = self.scheduler.now();
            if !control.cascade {
                let remaining = (OVERFLOW - self.timers[idx].count as u32) * control.freq;
                self.scheduler.push(EventKind::TimerOverflow(idx), remaining);
            }
        }
    }

    /// Overflow event for timer `idx`. `lateness` is how far past the
    /// scheduled time the event was dispatched; the reschedule compensates
    /// so the period stays exact.
    pub(crate) fn timer_overflow(&mut self, idx: usize, lateness: u32) {
        let (reload, freq, irq) = {
            let t = &self.timers[idx];
            (t.reload, t.control.freq, t.control.irq)
        };
        self.timers[idx].count = reload;
        self.timers[idx].start_time = self.scheduler.now().wrapping_sub(lateness);

        log::trace!("timer {idx} overflow at {}", self.scheduler.now());
        if irq {
            self.raise_interrupt(IrqSource::timer(idx));
        }

        let period = (OVERFLOW - reload as u32) * freq;
        self.scheduler
            .push(EventKind::TimerOverflow(idx), period.saturating_sub(lateness).max(1));

        self.timer_cascade(idx + 1);
    }

    /// Feed one overflow pulse into timer `idx` if it is cascading.
    fn timer_cascade(&mut self, idx: usize) {
        if idx > 3 {
            return;
        }
        let control = self.timers[idx].control;
        if !control.enable || !control.cascade {
            return;
        }
        let next = self.timers[idx].count as u32 + 1;
        if next >= OVERFLOW {
            self.timers[idx].count = self.timers[idx].reload;
            if control.irq {
                self.raise_interrupt(IrqSource::timer(idx));
            }
            self.timer_cascade(idx + 1);
        } else {
            self.timers[idx].count = next as u16;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::emu::Gba;
    use crate::interrupt::IrqSource;

    fn gba() -> Gba {
        Gba::new(&[0u8; 0x4000], &[0u8; 4]).unwrap()
    }

    /// Drain due events, advancing through the scheduler like the frame
    /// loop does but without CPU steps.
    fn run_to(gba: &mut Gba, target: u32) {
        while gba.scheduler.now() < target {
            let step = (target - gba.scheduler.now()).min(1);
            gba.scheduler.advance(step);
            while let Some(ev) = gba.scheduler.pop_due() {
                gba.dispatch_event(ev);
            }
        }
    }

    #[test]
    fn test_count_advances_with_time() {
        let mut gba = gba();
        gba.timer_reload_write(0, 0);
        gba.timer_control_write(0, 0x80); // enable, prescaler 1
        assert_eq!(gba.timer_get_count(0), 0);

        gba.scheduler.advance(100);
        assert_eq!(gba.timer_get_count(0), 100);

        // Strictly increasing until overflow.
        let mut last = 0;
        for _ in 0..50 {
            gba.scheduler.advance(7);
            let now = gba.timer_get_count(0);
            assert!(now > last);
            last = now;
        }
    }

    #[test]
    fn test_prescaler() {
        let mut gba = gba();
        gba.timer_reload_write(0, 0);
        gba.timer_control_write(0, 0x80 | 1); // prescaler 64
        gba.scheduler.advance(640);
        assert_eq!(gba.timer_get_count(0), 10);
    }

    #[test]
    fn test_reload_write_does_not_touch_running_count() {
        let mut gba = gba();
        gba.timer_reload_write(0, 0);
        gba.timer_control_write(0, 0x80);
        gba.scheduler.advance(50);
        gba.timer_reload_write(0, 0xF000);
        assert_eq!(gba.timer_get_count(0), 50);
    }

    #[test]
    fn test_overflow_reloads_and_wraps() {
        let mut gba = gba();
        gba.timer_reload_write(0, 0xFF00);
        gba.timer_control_write(0, 0x80);
        // 0x100 cycles to overflow.
        run_to(&mut gba, 0x100);
        assert_eq!(gba.timer_get_count(0), 0xFF00);
        run_to(&mut gba, 0x100 + 0x80);
        assert_eq!(gba.timer_get_count(0), 0xFF80);
    }

    #[test]
    fn test_overflow_irq() {
        let mut gba = gba();
        gba.timer_reload_write(1, 0xFFFE);
        gba.timer_control_write(1, 0x80 | 0x40);
        run_to(&mut gba, 2);
        assert_ne!(gba.intr.if_ & IrqSource::TIMER1.bits(), 0);
    }

    #[test]
    fn test_cascade() {
        // Two overflows of timer 0 step a cascading timer 1 twice.
        let mut gba = gba();
        gba.timer_reload_write(0, 0xFFFE);
        gba.timer_control_write(0, 0x80);
        gba.timer_reload_write(1, 0);
        gba.timer_control_write(1, 0x80 | 0x04);

        run_to(&mut gba, 5);
        assert_eq!(gba.timer_get_count(1), 2);
    }

    #[test]
    fn test_cascade_overflow_raises_irq() {
        let mut gba = gba();
        gba.timer_reload_write(0, 0xFFFE);
        gba.timer_control_write(0, 0x80);
        // Timer 1 one step from overflow, cascading, with IRQ.
        gba.timer_reload_write(1, 0xFFFF);
        gba.timer_control_write(1, 0x80 | 0x40 | 0x04);

        run_to(&mut gba, 3);
        assert_ne!(gba.intr.if_ & IrqSource::TIMER1.bits(), 0);
        assert_eq!(gba.timer_get_count(1), 0xFFFF);
    }

    #[test]
    fn test_disable_cancels_overflow() {
        let mut gba = gba();
        gba.timer_reload_write(0, 0xFFFE);
        gba.timer_control_write(0, 0x80 | 0x40);
        gba.timer_control_write(0, 0); // disable before it fires
        run_to(&mut gba, 10);
        assert_eq!(gba.intr.if_ & IrqSource::TIMER0.bits(), 0);
    }

    #[test]
    fn test_disabled_timer_holds_count() {
        let mut gba = gba();
        gba.timer_reload_write(0, 0);
        gba.timer_control_write(0, 0x80);
        gba.scheduler.advance(123);
        gba.timer_control_write(0, 0); // freeze
        gba.scheduler.advance(1000);
        assert_eq!(gba.timer_get_count(0), 123);
    }
}
