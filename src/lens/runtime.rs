use crate::lens::backend::Backend;
use crate::lens::dispatch::{dispatch, initial_effects, EXIT_CODE_OK};
use crate::lens::geometry::{MagnifierState, ScreenPoint};
use crate::lens::messages::{Effect, MagnifierEvent};
use crate::lens::state::{can_transition, Lifecycle};
use crate::settings::Settings;
use anyhow::{anyhow, Context, Result};
use std::ops::ControlFlow;
use std::time::Duration;

/// Owns the lens state and the OS backend, and serializes every mutation
/// through [`dispatch`].
pub struct MagnifierRuntime<B: Backend> {
    backend: B,
    state: MagnifierState,
    lifecycle: Lifecycle,
    tick_interval: Duration,
    exit_code: i32,
    capability_ready: bool,
    window_ready: bool,
    ticking: bool,
}

impl<B: Backend> MagnifierRuntime<B> {
    pub fn new(backend: B, settings: &Settings) -> Self {
        let screen = backend.screen_metrics();
        let state = MagnifierState::new(screen, settings.border_width);
        Self {
            backend,
            state,
            lifecycle: Lifecycle::Idle,
            tick_interval: settings.tick_interval(),
            exit_code: EXIT_CODE_OK,
            capability_ready: false,
            window_ready: false,
            ticking: false,
        }
    }

    pub fn state(&self) -> &MagnifierState {
        &self.state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Brings up the capability, the window and the tick. Any failure here is
    /// fatal: partial setup is unwound and the error returned.
    pub fn start(&mut self) -> Result<()> {
        self.transition(Lifecycle::Starting)?;
        match self.start_inner() {
            Ok(()) => {
                self.transition(Lifecycle::Running)?;
                tracing::info!(
                    diameter = self.state.diameter(),
                    zoom = self.state.zoom(),
                    "magnifier running"
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "magnifier startup failed");
                self.release();
                self.transition(Lifecycle::Stopped)?;
                Err(err)
            }
        }
    }

    fn start_inner(&mut self) -> Result<()> {
        self.backend
            .initialize()
            .context("failed to initialize the magnification capability")?;
        self.capability_ready = true;

        self.backend
            .create(self.state.host_bounds())
            .context("failed to create the magnifier window")?;
        self.window_ready = true;

        for effect in initial_effects(&mut self.state) {
            match effect {
                Effect::SetZoomTransform { factor } => self
                    .backend
                    .set_zoom_transform(factor)
                    .context("failed to apply the initial zoom transform")?,
                other => {
                    let _ = self.apply_effect(other);
                }
            }
        }
        self.backend.show();

        self.backend
            .start(self.tick_interval)
            .context("failed to start the refresh tick")?;
        self.ticking = true;
        Ok(())
    }

    /// Feeds one event through the dispatcher. Events outside `Running` are
    /// dropped.
    pub fn handle_event(&mut self, event: MagnifierEvent) -> ControlFlow<i32> {
        if !self.lifecycle.is_running() {
            tracing::trace!(?event, lifecycle = ?self.lifecycle, "dropping event");
            return ControlFlow::Continue(());
        }
        let effects = dispatch(&mut self.state, event);
        self.apply_effects(effects)
    }

    pub fn tick(&mut self, cursor: Option<ScreenPoint>) -> ControlFlow<i32> {
        self.handle_event(MagnifierEvent::Tick { cursor })
    }

    /// Stops the tick before the capability is released. Safe to call more
    /// than once.
    pub fn shutdown(&mut self) {
        match self.lifecycle {
            Lifecycle::Running => {
                let _ = self.transition(Lifecycle::Stopping);
                self.release();
                let _ = self.transition(Lifecycle::Stopped);
                tracing::info!(exit_code = self.exit_code, "magnifier stopped");
            }
            Lifecycle::Idle => {
                let _ = self.transition(Lifecycle::Starting);
                let _ = self.transition(Lifecycle::Stopped);
            }
            Lifecycle::Starting | Lifecycle::Stopping | Lifecycle::Stopped => {}
        }
    }

    fn release(&mut self) {
        if self.ticking {
            self.backend.stop();
            self.ticking = false;
        }
        if self.window_ready {
            self.backend.destroy();
            self.window_ready = false;
        }
        if self.capability_ready {
            self.backend.teardown();
            self.capability_ready = false;
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) -> ControlFlow<i32> {
        for effect in effects {
            if let Some(code) = self.apply_effect(effect) {
                return ControlFlow::Break(code);
            }
        }
        ControlFlow::Continue(())
    }

    /// Steady-state effects are best-effort; the next tick recomputes from
    /// the current state anyway.
    fn apply_effect(&mut self, effect: Effect) -> Option<i32> {
        let backend = &mut self.backend;
        let result = match effect {
            Effect::SetZoomTransform { factor } => backend.set_zoom_transform(factor),
            Effect::SetHostBounds { bounds } => backend.set_bounds(bounds),
            Effect::MoveHost { position } => backend.move_to(position),
            Effect::SetHostClip { clip } => backend.set_clip(clip),
            Effect::SetDisplayBounds { bounds } => backend.set_display_bounds(bounds),
            Effect::SetDisplayClip { clip } => backend.set_display_clip(clip),
            Effect::SetSourceRect { rect } => backend.set_source_region(rect),
            Effect::AssertTopmost => backend.assert_topmost(),
            Effect::RepaintBorder => {
                backend.request_repaint();
                Ok(())
            }
            Effect::SetCursorVisible { visible } => backend.set_cursor_visible(visible),
            Effect::SetClickThrough { enabled } => backend.set_click_through(enabled),
            Effect::BeginDrag => {
                backend.begin_drag();
                Ok(())
            }
            Effect::SetMinimized { minimized } => {
                backend.set_minimized(minimized);
                Ok(())
            }
            Effect::Exit { code } => {
                tracing::info!(code, "exit requested");
                self.exit_code = code;
                return Some(code);
            }
        };
        if let Err(err) = result {
            tracing::trace!(?effect, error = %err, "lens update failed");
        }
        None
    }

    fn transition(&mut self, to: Lifecycle) -> Result<()> {
        if !can_transition(self.lifecycle, to) {
            return Err(anyhow!(
                "invalid magnifier lifecycle transition {:?} -> {:?}",
                self.lifecycle,
                to
            ));
        }
        tracing::debug!(from = ?self.lifecycle, to = ?to, "magnifier lifecycle");
        self.lifecycle = to;
        Ok(())
    }
}

impl<B: Backend> Drop for MagnifierRuntime<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
