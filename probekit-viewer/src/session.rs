//! The press/drag/release protocol shared by every probe.
//!
//! A [`Probe`] supplies directional handlers and the set of actors that move
//! during a drag; [`ProbeSession`] routes pointer events to those handlers
//! and drives the animated redraw of every surface the actors live on.

use log::{debug, trace};
use probekit_core::DataPoint;

use crate::actor::{group_by_pane, ActorId, ActorRef, Pane};
use crate::error::Result;
use crate::surface::Surface;

/// Mouse button held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Left button: create and resize.
    Primary,
    /// Middle button: ignored by every probe.
    Middle,
    /// Right button: select and translate.
    Secondary,
}

/// Pointer position in the input surface's data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Horizontal data coordinate.
    pub x: f64,
    /// Vertical data coordinate.
    pub y: f64,
    /// Button pressed, held or released, if any.
    pub button: Option<Button>,
}

impl PointerEvent {
    /// Event with a button.
    #[must_use]
    pub fn new(x: f64, y: f64, button: Button) -> Self {
        Self {
            x,
            y,
            button: Some(button),
        }
    }

    /// Motion with no button held.
    #[must_use]
    pub fn hover(x: f64, y: f64) -> Self {
        Self { x, y, button: None }
    }

    /// Position as a data point.
    #[must_use]
    pub fn point(&self) -> DataPoint {
        DataPoint::new(self.x, self.y)
    }
}

/// One pointer event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Button pressed.
    Press(PointerEvent),
    /// Pointer moved, with or without a button held.
    Motion(PointerEvent),
    /// Button released.
    Release(PointerEvent),
    /// Pointer left the input surface.
    Leave,
}

/// Capability set of an interactive probe.
///
/// Only the press handlers, [`Probe::actors`] and surface access are
/// required; every other hook defaults to a no-op.
pub trait Probe {
    /// Surface for a pane, `None` if the probe has no such pane.
    fn pane(&self, pane: Pane) -> Option<&Surface>;

    /// Mutable surface for a pane.
    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface>;

    /// Actors animated while a session is active.
    fn actors(&self) -> Vec<ActorRef>;

    /// Primary press inside the input surface.
    ///
    /// # Errors
    /// Returns an error if the probe could not update its actors.
    fn on_primary_press(&mut self, event: &PointerEvent) -> Result<()>;

    /// Secondary press inside the input surface.
    ///
    /// # Errors
    /// Returns an error if the probe could not update its actors.
    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()>;

    /// True when there is nothing to drag, aborting the press and
    /// suppressing drags and releases.
    fn exit_condition(&self) -> bool {
        false
    }

    /// Called after a press that starts a session.
    ///
    /// # Errors
    /// Returns an error if linked views could not be refreshed.
    fn after_press(&mut self, _event: &PointerEvent) -> Result<()> {
        Ok(())
    }

    /// Drag with the primary button held.
    ///
    /// # Errors
    /// Returns an error if the probe could not update its actors.
    fn on_primary_drag(&mut self, _event: &PointerEvent) -> Result<()> {
        Ok(())
    }

    /// Drag with the secondary button held.
    ///
    /// # Errors
    /// Returns an error if the probe could not update its actors.
    fn on_secondary_drag(&mut self, _event: &PointerEvent) -> Result<()> {
        Ok(())
    }

    /// Called after either drag handler.
    ///
    /// # Errors
    /// Returns an error if linked views could not be refreshed.
    fn after_drag(&mut self, _event: &PointerEvent) -> Result<()> {
        Ok(())
    }

    /// Finalizes the dragged geometry before the animation ends.
    ///
    /// # Errors
    /// Returns an error if the probe could not update its actors.
    fn on_release(&mut self, _event: &PointerEvent) -> Result<()> {
        Ok(())
    }

    /// Called once the animation has ended.
    ///
    /// # Errors
    /// Returns an error if linked views could not be refreshed.
    fn after_release(&mut self, _event: &PointerEvent) -> Result<()> {
        Ok(())
    }

    /// Motion with no button held. Returns true when a preview is shown
    /// and should be animated.
    ///
    /// # Errors
    /// Returns an error if the preview could not be updated.
    fn on_hover(&mut self, _event: &PointerEvent) -> Result<bool> {
        Ok(false)
    }

    /// The pointer left the input surface while a preview was shown.
    ///
    /// # Errors
    /// Returns an error if the preview could not be hidden.
    fn on_leave(&mut self) -> Result<()> {
        Ok(())
    }
}

type Groups = Vec<(Pane, Vec<ActorId>)>;

#[derive(Debug, Clone, Default)]
enum SessionState {
    #[default]
    Idle,
    Active {
        button: Button,
        groups: Groups,
    },
    Hovering {
        groups: Groups,
    },
}

/// Event router and animation driver for one probe.
#[derive(Debug, Clone, Default)]
pub struct ProbeSession {
    state: SessionState,
}

impl ProbeSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a press/drag is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    /// True while a hover preview is animated.
    #[must_use]
    pub fn is_hovering(&self) -> bool {
        matches!(self.state, SessionState::Hovering { .. })
    }

    /// Button that started the active session.
    #[must_use]
    pub fn active_button(&self) -> Option<Button> {
        match self.state {
            SessionState::Active { button, .. } => Some(button),
            _ => None,
        }
    }

    /// Routes one pointer action.
    ///
    /// # Errors
    /// Propagates handler and surface errors.
    pub fn handle<P: Probe + ?Sized>(&mut self, probe: &mut P, action: PointerAction) -> Result<()> {
        match action {
            PointerAction::Press(event) => self.press(probe, &event).map(|_| ()),
            PointerAction::Motion(event) => self.motion(probe, &event),
            PointerAction::Release(event) => self.release(probe, &event),
            PointerAction::Leave => self.leave(probe),
        }
    }

    /// Handles a button press. Returns true when a session started.
    ///
    /// Presses outside the input surface and with the middle button are
    /// ignored. A press while a session is still running ends it first.
    ///
    /// # Errors
    /// Propagates handler and surface errors; the session stays idle.
    pub fn press<P: Probe + ?Sized>(&mut self, probe: &mut P, event: &PointerEvent) -> Result<bool> {
        if !inside(probe, event) {
            return Ok(false);
        }
        let button = match event.button {
            Some(button @ (Button::Primary | Button::Secondary)) => button,
            _ => return Ok(false),
        };
        self.reset(probe);

        match button {
            Button::Primary => probe.on_primary_press(event)?,
            _ => probe.on_secondary_press(event)?,
        }
        if probe.exit_condition() {
            debug!("press at ({:.1}, {:.1}) selected nothing", event.x, event.y);
            return Ok(false);
        }
        probe.after_press(event)?;

        let groups = begin(probe)?;
        debug!("session started with {button:?} on {} panes", groups.len());
        self.state = SessionState::Active { button, groups };
        Ok(true)
    }

    /// Handles pointer motion.
    ///
    /// While a session is active, motion outside the input surface is
    /// ignored. With no button held the probe may show a hover preview,
    /// which is cancelled once the pointer leaves the input surface.
    ///
    /// # Errors
    /// Propagates handler and surface errors.
    pub fn motion<P: Probe + ?Sized>(&mut self, probe: &mut P, event: &PointerEvent) -> Result<()> {
        let inside = inside(probe, event);
        if let SessionState::Active { groups, .. } = &self.state {
            if !inside {
                return Ok(());
            }
            match event.button {
                Some(Button::Primary) => probe.on_primary_drag(event)?,
                Some(Button::Secondary) => {
                    if probe.exit_condition() {
                        return Ok(());
                    }
                    probe.on_secondary_drag(event)?;
                }
                _ => return Ok(()),
            }
            probe.after_drag(event)?;
            trace!("drag step at ({:.1}, {:.1})", event.x, event.y);
            return step(probe, groups);
        }

        if event.button.is_some() {
            return Ok(());
        }
        if !inside {
            return self.leave(probe);
        }
        if !probe.on_hover(event)? {
            return Ok(());
        }
        if let SessionState::Hovering { groups } = &self.state {
            return step(probe, groups);
        }
        let groups = begin(probe)?;
        self.state = SessionState::Hovering { groups };
        Ok(())
    }

    /// Handles a button release, committing the dragged geometry.
    ///
    /// Ignored for the middle button, when the probe reports nothing to
    /// drag, or when no session is active.
    ///
    /// # Errors
    /// Propagates handler errors; the animation is ended regardless.
    pub fn release<P: Probe + ?Sized>(&mut self, probe: &mut P, event: &PointerEvent) -> Result<()> {
        if !matches!(event.button, Some(Button::Primary | Button::Secondary))
            || probe.exit_condition()
        {
            return Ok(());
        }
        let SessionState::Active { groups, .. } = std::mem::take(&mut self.state) else {
            return Ok(());
        };
        let finalized = probe.on_release(event);
        end(probe, &groups);
        debug!("session released at ({:.1}, {:.1})", event.x, event.y);
        finalized?;
        probe.after_release(event)
    }

    /// Cancels a hover preview after the pointer left the input surface.
    ///
    /// # Errors
    /// Propagates the probe's leave handler error.
    pub fn leave<P: Probe + ?Sized>(&mut self, probe: &mut P) -> Result<()> {
        let SessionState::Hovering { groups } = &self.state else {
            return Ok(());
        };
        let groups = groups.clone();
        self.state = SessionState::Idle;
        let hidden = probe.on_leave();
        end(probe, &groups);
        trace!("hover cancelled");
        hidden
    }

    /// Ends any running animation without calling release handlers.
    pub fn reset<P: Probe + ?Sized>(&mut self, probe: &mut P) {
        match std::mem::take(&mut self.state) {
            SessionState::Idle => {}
            SessionState::Active { groups, .. } | SessionState::Hovering { groups } => {
                debug!("ending unfinished session");
                end(probe, &groups);
            }
        }
    }
}

fn inside<P: Probe + ?Sized>(probe: &P, event: &PointerEvent) -> bool {
    probe
        .pane(Pane::Input)
        .is_some_and(|surface| surface.contains(event.point()))
}

fn begin<P: Probe + ?Sized>(probe: &mut P) -> Result<Groups> {
    let groups = group_by_pane(&probe.actors());
    let mut started: Groups = Vec::with_capacity(groups.len());
    for (pane, ids) in groups {
        let Some(surface) = probe.pane_mut(pane) else {
            continue;
        };
        if let Err(err) = surface.begin_animated(&ids) {
            end(probe, &started);
            return Err(err);
        }
        started.push((pane, ids));
    }
    Ok(started)
}

fn step<P: Probe + ?Sized>(probe: &mut P, groups: &Groups) -> Result<()> {
    for (pane, ids) in groups {
        if let Some(surface) = probe.pane_mut(*pane) {
            surface.step_animated(ids)?;
        }
    }
    Ok(())
}

fn end<P: Probe + ?Sized>(probe: &mut P, groups: &Groups) {
    for (pane, ids) in groups {
        if let Some(surface) = probe.pane_mut(*pane) {
            surface.end_animated(ids);
        }
    }
}

/// A probe together with the session driving it.
#[derive(Debug)]
pub struct Interactive<P> {
    probe: P,
    session: ProbeSession,
}

impl<P: Probe> Interactive<P> {
    /// Wraps a probe with an idle session.
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            session: ProbeSession::new(),
        }
    }

    /// The wrapped probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Mutable access to the wrapped probe.
    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// The session state.
    pub fn session(&self) -> &ProbeSession {
        &self.session
    }

    /// See [`ProbeSession::handle`].
    ///
    /// # Errors
    /// Propagates handler and surface errors.
    pub fn handle(&mut self, action: PointerAction) -> Result<()> {
        self.session.handle(&mut self.probe, action)
    }

    /// See [`ProbeSession::press`].
    ///
    /// # Errors
    /// Propagates handler and surface errors.
    pub fn press(&mut self, event: PointerEvent) -> Result<bool> {
        self.session.press(&mut self.probe, &event)
    }

    /// See [`ProbeSession::motion`].
    ///
    /// # Errors
    /// Propagates handler and surface errors.
    pub fn motion(&mut self, event: PointerEvent) -> Result<()> {
        self.session.motion(&mut self.probe, &event)
    }

    /// See [`ProbeSession::release`].
    ///
    /// # Errors
    /// Propagates handler errors.
    pub fn release(&mut self, event: PointerEvent) -> Result<()> {
        self.session.release(&mut self.probe, &event)
    }

    /// Unwraps the probe, ending any running animation.
    pub fn into_inner(mut self) -> P {
        self.session.reset(&mut self.probe);
        self.probe
    }
}
