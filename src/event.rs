use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

use crate::gateway::GatewayError;
use crate::session::quiz::Question;

/// A finished gateway call, posted back by the worker thread that ran it.
pub enum GatewayReply {
    Questions(Result<Vec<Question>, GatewayError>),
    Analysis(Result<String, GatewayError>),
    Chat(Result<String, GatewayError>),
}

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
    /// `generation` is the sign-in the request was made under.
    Gateway { generation: u64, reply: GatewayReply },
}

/// Single queue the UI loop drains. Terminal input and ticks come from one
/// background thread; gateway workers post through cloned senders.
pub struct EventHandler {
    rx: Receiver<AppEvent>,
    tx: Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let handler = Self::detached();
        let input_tx = handler.sender();
        thread::spawn(move || poll_terminal(&input_tx, tick_rate));
        handler
    }

    /// A queue with no terminal thread behind it.
    fn detached() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

/// Runs until the receiving side is dropped.
fn poll_terminal(tx: &Sender<AppEvent>, tick_rate: Duration) {
    loop {
        let next = if event::poll(tick_rate).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => AppEvent::Key(key),
                Ok(Event::Resize(w, h)) => AppEvent::Resize(w, h),
                _ => continue,
            }
        } else {
            AppEvent::Tick
        };
        if tx.send(next).is_err() {
            return;
        }
    }
}
