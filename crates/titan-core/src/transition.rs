//! Slide transition between two pages.
//!
//! The incoming surface starts one page-width to the side and both surfaces
//! move `step_px` per tick until the incoming one sits at the origin.
//! Forward brings the new page in from the right while the old one exits to
//! the left; Backward is the mirror image. The engine holds at most one
//! transition and identifies it by a token; ticks carrying a stale token do
//! nothing.

use crate::config::TickTiming;
use crate::error::{Result, TitanError};
use crate::shell::Shell;
use crate::surface::SurfaceId;

/// Slide direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the next app: new page enters from the right.
    Forward,
    /// Towards the previous app: new page enters from the left.
    Backward,
}

impl Direction {
    /// `+1` for Forward, `-1` for Backward.
    pub const fn sign(self) -> i32 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Identifies one `begin` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionToken(u64);

/// Progress of one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionState {
    pub direction: Direction,
    /// Page width in pixels.
    pub total_distance: u32,
    /// Offset of the incoming page from the origin. Never increases.
    pub remaining_distance: u32,
    /// Set once, when `remaining_distance` reaches 0.
    pub finished: bool,
    step_px: u32,
    tick_delay_ms: u64,
    from: SurfaceId,
    to: SurfaceId,
}

impl TransitionState {
    pub fn new(
        from: SurfaceId,
        to: SurfaceId,
        distance: u32,
        step_px: u32,
        direction: Direction,
        duration_ms: u64,
        timing: TickTiming,
    ) -> Self {
        let step_px = step_px.max(1);
        let ticks = u64::from(distance.div_ceil(step_px));
        let tick_delay_ms = match timing {
            TickTiming::PerTick => duration_ms.checked_div(ticks).unwrap_or(0),
            TickTiming::PerPixel => duration_ms.checked_div(u64::from(distance)).unwrap_or(0),
        };
        Self {
            direction,
            total_distance: distance,
            remaining_distance: distance,
            finished: distance == 0,
            step_px,
            tick_delay_ms,
            from,
            to,
        }
    }

    /// `ceil(distance / step)`.
    pub fn tick_count(&self) -> u32 {
        self.total_distance.div_ceil(self.step_px)
    }

    pub fn tick_delay_ms(&self) -> u64 {
        self.tick_delay_ms
    }

    pub fn outgoing(&self) -> SurfaceId {
        self.from
    }

    pub fn incoming(&self) -> SurfaceId {
        self.to
    }

    /// Horizontal position of the incoming page.
    pub fn incoming_x(&self) -> i32 {
        self.direction.sign() * self.remaining_distance as i32
    }

    /// Horizontal position of the outgoing page.
    pub fn outgoing_x(&self) -> i32 {
        self.direction.sign() * (self.remaining_distance as i32 - self.total_distance as i32)
    }

    /// Advance one step. Returns `true` once finished.
    pub fn step(&mut self) -> bool {
        if !self.finished {
            self.remaining_distance = self.remaining_distance.saturating_sub(self.step_px);
            self.finished = self.remaining_distance == 0;
        }
        self.finished
    }
}

/// Holds the active transition, if any.
#[derive(Debug, Default)]
pub struct TransitionEngine {
    active: Option<(TransitionToken, TransitionState)>,
    next_token: u64,
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn state(&self) -> Option<&TransitionState> {
        self.active.as_ref().map(|(_, s)| s)
    }

    /// `None` if `token` is not the active transition.
    pub fn is_finished(&self, token: TransitionToken) -> Option<bool> {
        self.active
            .as_ref()
            .filter(|(t, _)| *t == token)
            .map(|(_, s)| s.finished)
    }

    /// Remove and return the transition for `token` if it has finished.
    pub fn take_finished(&mut self, token: TransitionToken) -> Option<TransitionState> {
        if self.is_finished(token) == Some(true) {
            self.active.take().map(|(_, s)| s)
        } else {
            None
        }
    }

    /// Drop the active transition. Its pending tick becomes a no-op.
    pub fn cancel(&mut self) -> Option<TransitionState> {
        self.active.take().map(|(_, s)| s)
    }

    fn start(&mut self, state: TransitionState) -> TransitionToken {
        let token = TransitionToken(self.next_token);
        self.next_token += 1;
        self.active = Some((token, state));
        token
    }
}

/// Start sliding from `from` to `to`.
///
/// `to` is laid out one page-width away on the side given by `direction` and
/// `from` at the origin. Fails while another transition is active or if
/// either surface is gone.
pub fn begin(
    shell: &mut Shell,
    from: SurfaceId,
    to: SurfaceId,
    duration_ms: u64,
    direction: Direction,
) -> Result<TransitionToken> {
    if shell.transitions.is_active() {
        return Err(TitanError::TransitionInProgress);
    }
    if !shell.surfaces.contains(from) {
        return Err(TitanError::Surface(format!("outgoing {from} is gone")));
    }
    let distance = shell
        .surfaces
        .get(to)
        .map(|s| s.width())
        .ok_or_else(|| TitanError::Surface(format!("incoming {to} is gone")))?;

    let anim = &shell.config.animation;
    let state = TransitionState::new(
        from,
        to,
        distance,
        anim.step_px,
        direction,
        duration_ms,
        anim.tick_timing,
    );
    let delay = state.tick_delay_ms();
    let finished = state.finished;
    layout(shell, &state);
    let token = shell.transitions.start(state);

    log::debug!(
        "Transition {token:?} {direction:?}: {distance}px, tick every {delay}ms"
    );
    if !finished {
        shell.after(delay, move |shell: &mut Shell| tick(shell, token));
    }
    Ok(token)
}

fn layout(shell: &mut Shell, state: &TransitionState) {
    if let Some(s) = shell.surfaces.get_mut(state.to) {
        s.place(state.incoming_x(), 0);
    }
    if let Some(s) = shell.surfaces.get_mut(state.from) {
        s.place(state.outgoing_x(), 0);
    }
}

fn tick(shell: &mut Shell, token: TransitionToken) {
    let Some((active, state)) = shell.transitions.active.as_mut() else {
        return;
    };
    if *active != token || state.finished {
        return;
    }
    if !shell.surfaces.contains(state.from) || !shell.surfaces.contains(state.to) {
        log::debug!("Transition {token:?} lost a surface, stopping");
        state.remaining_distance = 0;
        state.finished = true;
        return;
    }
    let done = state.step();
    let snapshot = state.clone();
    layout(shell, &snapshot);
    if !done {
        shell.after(snapshot.tick_delay_ms(), move |shell: &mut Shell| {
            tick(shell, token)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::geometry::Point;
    use crate::surface::{Surface, SurfaceArena};
    use crate::test_utils::mock_shell;

    fn ids() -> (SurfaceId, SurfaceId) {
        let mut arena = SurfaceArena::new();
        let a = arena.create(Surface::new(1, 1, Color::BLACK));
        let b = arena.create(Surface::new(1, 1, Color::BLACK));
        (a, b)
    }

    fn state(distance: u32, step: u32, dir: Direction) -> TransitionState {
        let (a, b) = ids();
        TransitionState::new(a, b, distance, step, dir, 300, TickTiming::PerTick)
    }

    #[test]
    fn tick_count_rounds_up() {
        assert_eq!(state(300, 15, Direction::Forward).tick_count(), 20);
        assert_eq!(state(310, 15, Direction::Forward).tick_count(), 21);
        assert_eq!(state(1, 15, Direction::Forward).tick_count(), 1);
    }

    #[test]
    fn per_tick_delay_spreads_duration() {
        assert_eq!(state(300, 15, Direction::Forward).tick_delay_ms(), 15);
    }

    #[test]
    fn per_pixel_delay_truncates() {
        let (a, b) = ids();
        let s = TransitionState::new(a, b, 300, 15, Direction::Forward, 300, TickTiming::PerPixel);
        assert_eq!(s.tick_delay_ms(), 1);
        let s = TransitionState::new(a, b, 400, 15, Direction::Forward, 300, TickTiming::PerPixel);
        assert_eq!(s.tick_delay_ms(), 0);
    }

    #[test]
    fn zero_step_is_clamped() {
        let s = state(30, 0, Direction::Forward);
        assert_eq!(s.tick_count(), 30);
    }

    #[test]
    fn positions_are_mirror_images() {
        let mut s = state(300, 15, Direction::Forward);
        assert_eq!((s.incoming_x(), s.outgoing_x()), (300, 0));
        s.step();
        assert_eq!((s.incoming_x(), s.outgoing_x()), (285, -15));

        let mut s = state(300, 15, Direction::Backward);
        assert_eq!((s.incoming_x(), s.outgoing_x()), (-300, 0));
        s.step();
        assert_eq!((s.incoming_x(), s.outgoing_x()), (-285, 15));
    }

    #[test]
    fn final_step_lands_on_origin() {
        let mut s = state(310, 15, Direction::Forward);
        let mut ticks = 0;
        while !s.step() {
            ticks += 1;
        }
        assert_eq!(ticks + 1, 21);
        assert_eq!(s.incoming_x(), 0);
        assert_eq!(s.outgoing_x(), -310);
    }

    #[test]
    fn finished_stays_set() {
        let mut s = state(15, 15, Direction::Forward);
        assert!(s.step());
        assert!(s.step());
        assert_eq!(s.remaining_distance, 0);
    }

    #[test]
    fn zero_width_is_finished_immediately() {
        let s = state(0, 15, Direction::Forward);
        assert!(s.finished);
        assert_eq!(s.tick_count(), 0);
    }

    #[test]
    fn begin_runs_to_completion() {
        let (mut shell, _) = mock_shell(&["a", "b"]);
        let from = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        let to = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        let token = begin(&mut shell, from, to, 300, Direction::Forward).unwrap();

        assert_eq!(shell.surfaces.get(to).unwrap().position(), Some(Point::new(300, 0)));
        assert_eq!(shell.transitions.is_finished(token), Some(false));

        shell.run_until(150);
        let s = shell.transitions.state().unwrap();
        assert_eq!(s.remaining_distance, 150);
        assert_eq!(shell.surfaces.get(from).unwrap().position(), Some(Point::new(-150, 0)));

        shell.run_until(300);
        assert_eq!(shell.transitions.is_finished(token), Some(true));
        assert_eq!(shell.surfaces.get(to).unwrap().position(), Some(Point::ORIGIN));
        assert!(shell.transitions.take_finished(token).is_some());
        assert!(!shell.transitions.is_active());
    }

    #[test]
    fn second_begin_is_rejected() {
        let (mut shell, _) = mock_shell(&["a"]);
        let a = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        let b = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        begin(&mut shell, a, b, 300, Direction::Forward).unwrap();
        let err = begin(&mut shell, b, a, 300, Direction::Backward).unwrap_err();
        assert!(matches!(err, TitanError::TransitionInProgress));
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let (mut shell, _) = mock_shell(&["a"]);
        let a = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        let b = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        begin(&mut shell, a, b, 300, Direction::Forward).unwrap();
        shell.transitions.cancel();
        shell.run_until(1_000);
        assert_eq!(shell.surfaces.get(b).unwrap().position(), Some(Point::new(300, 0)));
    }

    #[test]
    fn destroyed_surface_stops_ticking() {
        let (mut shell, _) = mock_shell(&["a"]);
        let a = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        let b = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        let token = begin(&mut shell, a, b, 300, Direction::Forward).unwrap();
        shell.surfaces.destroy(a);
        shell.run_until(20);
        assert_eq!(shell.transitions.is_finished(token), Some(true));
        assert!(shell.timers.is_empty());
    }

    #[test]
    fn missing_surface_is_error() {
        let (mut shell, _) = mock_shell(&["a"]);
        let a = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        let b = shell.surfaces.create(Surface::new(300, 250, Color::BLACK));
        shell.surfaces.destroy(b);
        let err = begin(&mut shell, a, b, 300, Direction::Forward).unwrap_err();
        assert!(matches!(err, TitanError::Surface(_)));
        assert!(!shell.transitions.is_active());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn remaining_strictly_decreases_then_finishes(
                distance in 1u32..2_000,
                step in 1u32..100,
                forward in any::<bool>(),
            ) {
                let dir = if forward { Direction::Forward } else { Direction::Backward };
                let mut s = state(distance, step, dir);
                let mut prev = s.remaining_distance;
                let mut ticks = 0;
                while !s.finished {
                    s.step();
                    ticks += 1;
                    prop_assert!(s.remaining_distance < prev);
                    prop_assert_eq!(s.outgoing_x() - s.incoming_x(), -dir.sign() * distance as i32);
                    prev = s.remaining_distance;
                }
                prop_assert_eq!(ticks, s.tick_count());
                prop_assert_eq!(s.remaining_distance, 0);
                s.step();
                prop_assert!(s.finished);
                prop_assert_eq!(s.remaining_distance, 0);
            }
        }
    }
}
