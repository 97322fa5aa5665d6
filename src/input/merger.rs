//! Merges independent input sources into one ordered queue.
//!
//! Every source holds a sender into the same bounded channel, so events are
//! dequeued in exactly the order they were produced, across sources. A full
//! queue makes producers wait instead of dropping events. The queue closes
//! once every source handle has been dropped.

use tokio::sync::mpsc;

use super::action::Mode;
use super::event::InputEvent;
use super::keybindings::Key;

/// The consumer half has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Input queue is closed")]
pub struct InputClosed;

async fn push(tx: &mpsc::Sender<InputEvent>, event: InputEvent) -> Result<(), InputClosed> {
    tx.send(event).await.map_err(|_| InputClosed)
}

/// Canvas pointer events.
#[derive(Debug, Clone)]
pub struct PointerSource {
    tx: mpsc::Sender<InputEvent>,
}

impl PointerSource {
    pub async fn moved(&self, x: f64, y: f64, dx: f64, dy: f64) -> Result<(), InputClosed> {
        push(&self.tx, InputEvent::PointerMove { x, y, dx, dy }).await
    }

    pub async fn down(&self, x: f64, y: f64) -> Result<(), InputClosed> {
        push(&self.tx, InputEvent::PointerDown { x, y }).await
    }

    pub async fn up(&self, x: f64, y: f64) -> Result<(), InputClosed> {
        push(&self.tx, InputEvent::PointerUp { x, y }).await
    }
}

/// The draw/pan toolbar buttons.
#[derive(Debug, Clone)]
pub struct ModeButtons {
    tx: mpsc::Sender<InputEvent>,
}

impl ModeButtons {
    pub async fn click(&self, mode: Mode) -> Result<(), InputClosed> {
        push(&self.tx, InputEvent::ModeButton { mode }).await
    }
}

/// Key-down events. Auto-repeats are dropped here so a held key produces
/// exactly one event.
#[derive(Debug, Clone)]
pub struct KeyboardSource {
    tx: mpsc::Sender<InputEvent>,
}

impl KeyboardSource {
    /// Forward a key-down. Returns `Ok(false)` if it was an auto-repeat.
    pub async fn key_down(&self, key: Key, repeat: bool) -> Result<bool, InputClosed> {
        if repeat {
            log::trace!("Dropping auto-repeat of {}", key);
            return Ok(false);
        }
        push(&self.tx, InputEvent::Key { key, repeat }).await?;
        Ok(true)
    }
}

/// Mouse wheel over the canvas.
#[derive(Debug, Clone)]
pub struct WheelSource {
    tx: mpsc::Sender<InputEvent>,
}

impl WheelSource {
    pub async fn scroll(&self, x: f64, y: f64, delta_y: f64) -> Result<(), InputClosed> {
        push(&self.tx, InputEvent::Wheel { x, y, delta_y }).await
    }
}

/// All producer handles of one merger.
#[derive(Debug, Clone)]
pub struct InputSources {
    pub pointer: PointerSource,
    pub buttons: ModeButtons,
    pub keyboard: KeyboardSource,
    pub wheel: WheelSource,
}

impl InputSources {
    /// Route a recorded event through the source that would have produced it.
    pub async fn feed(&self, event: InputEvent) -> Result<(), InputClosed> {
        match event {
            InputEvent::PointerMove { x, y, dx, dy } => self.pointer.moved(x, y, dx, dy).await,
            InputEvent::PointerDown { x, y } => self.pointer.down(x, y).await,
            InputEvent::PointerUp { x, y } => self.pointer.up(x, y).await,
            InputEvent::ModeButton { mode } => self.buttons.click(mode).await,
            InputEvent::Key { key, repeat } => self.keyboard.key_down(key, repeat).await.map(|_| ()),
            InputEvent::Wheel { x, y, delta_y } => self.wheel.scroll(x, y, delta_y).await,
        }
    }
}

/// Single consumer of the merged queue.
#[derive(Debug)]
pub struct EventMerger {
    rx: mpsc::Receiver<InputEvent>,
}

impl EventMerger {
    /// Create a merger with room for `capacity` pending events, and the
    /// source handles feeding it.
    pub fn new(capacity: usize) -> (Self, InputSources) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let sources = InputSources {
            pointer: PointerSource { tx: tx.clone() },
            buttons: ModeButtons { tx: tx.clone() },
            keyboard: KeyboardSource { tx: tx.clone() },
            wheel: WheelSource { tx },
        };
        (Self { rx }, sources)
    }

    /// Next event in arrival order. `None` once all sources are gone and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<InputEvent> {
        self.rx.recv().await
    }
}
