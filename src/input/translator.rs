//! Motion Translator
//!
//! The event-translation state machine at the heart of the daemon: it turns
//! discrete key press/release events into relative pointer motion and button
//! events, active only while the control key is held.
//!
//! # Behavior
//!
//! Every incoming key event takes exactly one of four paths:
//!
//! 1. **Control key** - arms or disarms the translator; never consumed, so
//!    the key stays visible to the rest of the system.
//! 2. **Disarmed** - any other key while disarmed passes through and clears
//!    leftover translator state.
//! 3. **Unmanaged while armed** - keys without a binding pass through with
//!    no state change; only the ten managed keys are intercepted.
//! 4. **Managed while armed** - translated into motion/button reports and
//!    always consumed, whether or not anything was emitted.
//!
//! Sustained input accelerates: each motion event grows the step by one,
//! clamped at `max_accel`, and a pause longer than `decay_ms` resets the
//! step back to its base so a stale burst cannot carry into a new gesture.
//!
//! The translator is a total function over its inputs; nothing in it can
//! fail. It performs no I/O beyond synchronous calls into the [`MotionSink`]
//! and allocates nothing per event.

use std::time::Instant;

use tracing::{debug, trace};

use crate::config::MotionConfig;
use crate::input::keymap::{KeyMap, LogicalInput};
use crate::input::motion::motion_delta;

/// Monotonic time source for acceleration decay.
///
/// Injected so decay logic is deterministic in tests; production code uses
/// [`MonotonicClock`].
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary fixed origin.
    ///
    /// Must never decrease. A return value of 0 is indistinguishable from
    /// "no event seen yet" and only delays the first decay check by one
    /// event, which is harmless because acceleration starts at zero.
    fn now_ms(&self) -> u64;
}

/// Wall clock anchored at construction.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Pointer buttons the translator can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left button (Button1 binding)
    Left,
    /// Right button (Button2 binding)
    Right,
}

/// Downstream consumer of translated pointer events.
///
/// Reports accumulate until `sync()`, which closes the batch; consumers must
/// deliver the batch as one atomic frame. The translator emits at most one
/// `sync()` per input event and none when nothing changed.
pub trait MotionSink {
    /// Relative pointer motion.
    fn report_relative(&mut self, dx: i32, dy: i32);

    /// Button state change.
    fn report_button(&mut self, button: MouseButton, down: bool);

    /// Close the current frame.
    fn sync(&mut self);
}

/// Fixed-size set of currently pressed logical inputs.
///
/// One bit per [`LogicalInput`], at the input's fixed index. This is the
/// press/release latch: a bit is set iff the most recent managed event for
/// that input was a press not yet followed by a release, independent of
/// auto-repeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSet(u16);

impl InputSet {
    /// Set with no inputs pressed.
    pub const EMPTY: InputSet = InputSet(0);

    /// Whether `input` is currently pressed.
    pub fn contains(self, input: LogicalInput) -> bool {
        self.0 & (1 << input.index()) != 0
    }

    /// Record `input` as pressed or released.
    pub fn set(&mut self, input: LogicalInput, pressed: bool) {
        if pressed {
            self.0 |= 1 << input.index();
        } else {
            self.0 &= !(1 << input.index());
        }
    }

    /// Release everything.
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Whether no input is pressed.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// The keyboard-to-pointer state machine.
///
/// Owns all of its state; create one per source-event stream (or share one
/// behind a mutex when several streams feed it, as the daemon does). State
/// is zeroed at construction and never persisted.
pub struct MotionTranslator<C = MonotonicClock> {
    keymap: KeyMap,
    tuning: MotionConfig,
    clock: C,

    /// Control key currently held.
    armed: bool,

    /// Press/release latch for the ten managed inputs.
    pressed: InputSet,

    /// Current acceleration, 0..=max_accel. Nonzero only while armed.
    accel: u32,

    /// Tick of the most recent managed event; 0 = never.
    last_event_ms: u64,
}

impl MotionTranslator<MonotonicClock> {
    /// Create a translator driven by the wall clock.
    pub fn new(keymap: KeyMap, tuning: MotionConfig) -> Self {
        Self::with_clock(keymap, tuning, MonotonicClock::new())
    }
}

impl<C: Clock> MotionTranslator<C> {
    /// Create a translator with an explicit clock.
    pub fn with_clock(keymap: KeyMap, tuning: MotionConfig, clock: C) -> Self {
        Self {
            keymap,
            tuning,
            clock,
            armed: false,
            pressed: InputSet::EMPTY,
            accel: 0,
            last_event_ms: 0,
        }
    }

    /// Translate one key event.
    ///
    /// Returns `true` when the caller must suppress the original key event
    /// (managed keys while armed are always swallowed); `false` for the
    /// control key itself, unmanaged keys, and everything while disarmed.
    pub fn handle<S: MotionSink>(&mut self, code: u16, pressed: bool, sink: &mut S) -> bool {
        // Control key: toggle armed state, always pass the key through.
        // Clearing on disarm keeps acceleration and the latch from leaking
        // into the next armed session when no event arrives in between.
        if code == self.keymap.control_code() {
            trace!(pressed, "control key");
            self.armed = pressed;
            if !pressed {
                self.accel = 0;
                self.pressed.clear();
            }
            return false;
        }

        if !self.armed {
            self.accel = 0;
            self.pressed.clear();
            return false;
        }

        let Some(input) = self.keymap.lookup(code) else {
            // While armed, everything that isn't one of the ten managed
            // keys passes through untouched.
            return false;
        };

        // Decay: a pause longer than the threshold starts a fresh gesture.
        // Releases refresh the timer too.
        let now = self.clock.now_ms();
        let elapsed = now.saturating_sub(self.last_event_ms);
        if self.last_event_ms != 0 && elapsed >= self.tuning.decay_ms {
            trace!(elapsed, "acceleration decayed");
            self.accel = 0;
        }
        self.last_event_ms = now;

        // Work against a snapshot of the latch; the authoritative update
        // happens after emission so change detection sees previous state.
        let mut b1 = self.pressed.contains(LogicalInput::Button1);
        let mut b2 = self.pressed.contains(LogicalInput::Button2);

        let (dx, dy) = if pressed {
            motion_delta(input, (self.tuning.step_base + self.accel) as i32)
        } else {
            // Releases never move the pointer.
            (0, 0)
        };

        match input {
            LogicalInput::Button1 => b1 = pressed,
            LogicalInput::Button2 => b2 = pressed,
            _ => {}
        }

        let mut sync = false;

        if (dx, dy) != (0, 0) {
            trace!(dx, dy, accel = self.accel, "relative motion");
            sink.report_relative(dx, dy);
            sync = true;
            self.accel = (self.accel + 1).min(self.tuning.max_accel);
        }

        if b1 != self.pressed.contains(LogicalInput::Button1) {
            debug!(down = b1, "left button");
            sink.report_button(MouseButton::Left, b1);
            sync = true;
        }

        if b2 != self.pressed.contains(LogicalInput::Button2) {
            debug!(down = b2, "right button");
            sink.report_button(MouseButton::Right, b2);
            sync = true;
        }

        if sync {
            sink.sync();
        }

        self.pressed.set(input, pressed);

        true
    }

    /// Whether the control key is currently held.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether `input` is currently latched as pressed.
    pub fn is_pressed(&self, input: LogicalInput) -> bool {
        self.pressed.contains(input)
    }

    /// Current acceleration value.
    pub fn acceleration(&self) -> u32 {
        self.accel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keymap::keys;
    use std::cell::Cell;
    use std::rc::Rc;

    const CONTROL: u16 = keys::KEY_RIGHTALT;
    const UP: u16 = keys::KEY_KP8;
    const UP_RIGHT: u16 = keys::KEY_KP9;
    const B1: u16 = keys::KEY_KP5;
    const B2: u16 = keys::KEY_KP0;
    const UNMANAGED: u16 = 30; // KEY_A

    /// Clock advanced by hand from the test body.
    #[derive(Clone, Default)]
    struct ManualClock {
        now: Rc<Cell<u64>>,
    }

    impl ManualClock {
        fn advance(&self, ms: u64) {
            self.now.set(self.now.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }
    }

    /// Sink recording every report in emission order.
    #[derive(Debug, Default)]
    struct RecordingSink {
        events: Vec<SinkEvent>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SinkEvent {
        Relative(i32, i32),
        Button(MouseButton, bool),
        Sync,
    }

    impl MotionSink for RecordingSink {
        fn report_relative(&mut self, dx: i32, dy: i32) {
            self.events.push(SinkEvent::Relative(dx, dy));
        }
        fn report_button(&mut self, button: MouseButton, down: bool) {
            self.events.push(SinkEvent::Button(button, down));
        }
        fn sync(&mut self) {
            self.events.push(SinkEvent::Sync);
        }
    }

    fn tuning() -> MotionConfig {
        MotionConfig {
            step_base: 5,
            max_accel: 50,
            decay_ms: 1000,
        }
    }

    fn translator() -> (MotionTranslator<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        // Start the clock away from 0 so the "never" sentinel stays distinct.
        clock.advance(10);
        let t = MotionTranslator::with_clock(KeyMap::default(), tuning(), clock.clone());
        (t, clock)
    }

    #[test]
    fn test_control_key_arms_and_passes_through() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        assert!(!t.handle(CONTROL, true, &mut sink));
        assert!(t.is_armed());
        assert!(!t.handle(CONTROL, false, &mut sink));
        assert!(!t.is_armed());
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_up_press_emits_base_step_and_sync() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        assert!(t.handle(UP, true, &mut sink));

        assert_eq!(
            sink.events,
            vec![SinkEvent::Relative(0, -5), SinkEvent::Sync]
        );
    }

    #[test]
    fn test_diagonal_press() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(UP_RIGHT, true, &mut sink);

        assert_eq!(sink.events, vec![SinkEvent::Relative(5, -5), SinkEvent::Sync]);
    }

    #[test]
    fn test_acceleration_grows_per_motion_event() {
        let (mut t, clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        for _ in 0..3 {
            clock.advance(50); // well inside the decay window
            t.handle(UP, true, &mut sink);
        }

        let motions: Vec<_> = sink
            .events
            .iter()
            .filter(|e| matches!(e, SinkEvent::Relative(..)))
            .collect();
        assert_eq!(
            motions,
            vec![
                &SinkEvent::Relative(0, -5),
                &SinkEvent::Relative(0, -6),
                &SinkEvent::Relative(0, -7),
            ]
        );
    }

    #[test]
    fn test_acceleration_clamps_at_max() {
        let clock = ManualClock::default();
        clock.advance(10);
        let cfg = MotionConfig {
            step_base: 2,
            max_accel: 3,
            decay_ms: 1000,
        };
        let mut t = MotionTranslator::with_clock(KeyMap::default(), cfg, clock.clone());
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        for _ in 0..6 {
            clock.advance(10);
            t.handle(UP, true, &mut sink);
        }

        let last = sink
            .events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Relative(_, dy) => Some(*dy),
                _ => None,
            })
            .last()
            .unwrap();
        assert_eq!(last, -(2 + 3));
        assert_eq!(t.acceleration(), 3);
    }

    #[test]
    fn test_decay_resets_acceleration() {
        let (mut t, clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(UP, true, &mut sink);
        clock.advance(100);
        t.handle(UP, true, &mut sink); // accel = 2 afterwards

        clock.advance(1000); // at the threshold: decays
        sink.events.clear();
        t.handle(UP, true, &mut sink);

        assert_eq!(sink.events, vec![SinkEvent::Relative(0, -5), SinkEvent::Sync]);
    }

    #[test]
    fn test_release_refreshes_decay_timer() {
        let (mut t, clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(UP, true, &mut sink); // accel -> 1
        clock.advance(600);
        t.handle(UP, false, &mut sink); // no motion, but refreshes the timer
        clock.advance(600);

        // 1200ms since the press but only 600ms since the release, so the
        // earlier acceleration survives.
        sink.events.clear();
        t.handle(UP, true, &mut sink);
        assert_eq!(sink.events, vec![SinkEvent::Relative(0, -6), SinkEvent::Sync]);
    }

    #[test]
    fn test_button_press_release_cycle() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);

        assert!(t.handle(B1, true, &mut sink));
        assert_eq!(
            sink.events,
            vec![SinkEvent::Button(MouseButton::Left, true), SinkEvent::Sync]
        );

        sink.events.clear();
        assert!(t.handle(B1, false, &mut sink));
        assert_eq!(
            sink.events,
            vec![SinkEvent::Button(MouseButton::Left, false), SinkEvent::Sync]
        );
    }

    #[test]
    fn test_button_repeat_emits_nothing_but_consumes() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(B1, true, &mut sink);
        sink.events.clear();

        // Auto-repeat press with no intervening release: state unchanged.
        assert!(t.handle(B1, true, &mut sink));
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_second_button_maps_to_right() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(B2, true, &mut sink);

        assert_eq!(
            sink.events,
            vec![SinkEvent::Button(MouseButton::Right, true), SinkEvent::Sync]
        );
    }

    #[test]
    fn test_direction_release_consumes_without_sync() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(UP, true, &mut sink);
        sink.events.clear();

        // Releasing a direction emits nothing: no motion, no button change,
        // and in particular no spurious sync.
        assert!(t.handle(UP, false, &mut sink));
        assert!(sink.events.is_empty());
        assert!(!t.is_pressed(LogicalInput::Up));
    }

    #[test]
    fn test_unmanaged_keys_pass_through_armed_or_not() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        assert!(!t.handle(UNMANAGED, true, &mut sink));
        t.handle(CONTROL, true, &mut sink);
        assert!(!t.handle(UNMANAGED, true, &mut sink));
        assert!(!t.handle(UNMANAGED, false, &mut sink));
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_unmanaged_keys_leave_state_alone() {
        let (mut t, clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(UP, true, &mut sink);
        let accel = t.acceleration();

        clock.advance(5000); // stale, but unmanaged events skip the decay path
        t.handle(UNMANAGED, true, &mut sink);
        assert_eq!(t.acceleration(), accel);
        assert!(t.is_pressed(LogicalInput::Up));
    }

    #[test]
    fn test_disarm_clears_state() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(UP, true, &mut sink);
        t.handle(B1, true, &mut sink);
        assert!(t.acceleration() > 0);

        t.handle(CONTROL, false, &mut sink);
        assert_eq!(t.acceleration(), 0);
        assert!(!t.is_pressed(LogicalInput::Up));
        assert!(!t.is_pressed(LogicalInput::Button1));
    }

    #[test]
    fn test_rearm_starts_at_base_magnitude() {
        let (mut t, clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(UP, true, &mut sink);
        clock.advance(10);
        t.handle(UP, true, &mut sink);

        t.handle(CONTROL, false, &mut sink);
        t.handle(CONTROL, true, &mut sink);

        sink.events.clear();
        clock.advance(10);
        t.handle(UP, true, &mut sink);
        assert_eq!(sink.events, vec![SinkEvent::Relative(0, -5), SinkEvent::Sync]);
    }

    #[test]
    fn test_events_while_disarmed_clear_leftovers() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(UP, true, &mut sink);
        t.handle(CONTROL, false, &mut sink);

        // Any key while disarmed also scrubs the latch (second clear path).
        assert!(!t.handle(UP, false, &mut sink));
        assert!(!t.is_pressed(LogicalInput::Up));
        assert_eq!(t.acceleration(), 0);
    }

    #[test]
    fn test_no_stale_button_reports_after_rearm() {
        let (mut t, _clock) = translator();
        let mut sink = RecordingSink::default();

        t.handle(CONTROL, true, &mut sink);
        t.handle(B1, true, &mut sink);
        t.handle(CONTROL, false, &mut sink);

        // Re-arm and press a direction while the sink believes the button is
        // still down; the latch was cleared, so only motion is emitted.
        t.handle(CONTROL, true, &mut sink);
        sink.events.clear();
        t.handle(UP, true, &mut sink);
        assert_eq!(sink.events, vec![SinkEvent::Relative(0, -5), SinkEvent::Sync]);
    }

    #[test]
    fn test_input_set() {
        let mut set = InputSet::EMPTY;
        assert!(set.is_empty());

        set.set(LogicalInput::Up, true);
        set.set(LogicalInput::Button2, true);
        assert!(set.contains(LogicalInput::Up));
        assert!(set.contains(LogicalInput::Button2));
        assert!(!set.contains(LogicalInput::Down));

        set.set(LogicalInput::Up, false);
        assert!(!set.contains(LogicalInput::Up));

        set.clear();
        assert!(set.is_empty());
    }
}
