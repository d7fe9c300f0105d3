//! Console front end
//!
//! Line-oriented commands on stdin; playback updates are printed as they
//! arrive through a channel subscription. Detaching and re-attaching the
//! view shows the controller replaying its current snapshot.

use crate::error::{DaemonError, Result};
use crate::service::PlaybackService;
use deck_playback::{ChannelObserver, PlaybackEvent, SubscriptionId};
use std::io::{BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc::{self, UnboundedReceiver};

const HELP: &str = "\
commands:
  list            show the library
  play <n>        play item n
  select <n>      click item n (stops if something is playing)
  pause           pause playback
  resume          resume or retry the selected track
  toggle          pause or resume
  stop            stop and clear the selection
  status          print the current snapshot as JSON
  detach          stop printing updates
  attach          print updates again
  quit            stop playback and exit";

/// A parsed console command; item numbers are stored zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Play(usize),
    Select(usize),
    Pause,
    Resume,
    Toggle,
    Stop,
    Status,
    Attach,
    Detach,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = DaemonError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_lowercase();
        let arg = words.next();

        let command = match (verb.as_str(), arg) {
            ("list" | "ls", None) => Command::List,
            ("play", Some(n)) => Command::Play(item_index(n)?),
            ("play", None) | ("resume", None) => Command::Resume,
            ("select", Some(n)) => Command::Select(item_index(n)?),
            ("pause", None) => Command::Pause,
            ("toggle", None) => Command::Toggle,
            ("stop", None) => Command::Stop,
            ("status", None) => Command::Status,
            ("attach", None) => Command::Attach,
            ("detach", None) => Command::Detach,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            _ => {
                return Err(DaemonError::Command(format!(
                    "unrecognised command '{}', try 'help'",
                    line.trim()
                )))
            }
        };

        if words.next().is_some() {
            return Err(DaemonError::Command(format!(
                "too many arguments: '{}'",
                line.trim()
            )));
        }

        Ok(command)
    }
}

fn item_index(arg: &str) -> Result<usize> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(DaemonError::Command(format!(
            "expected an item number, got '{arg}'"
        ))),
    }
}

/// Whether the console keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Renders playback events as console lines
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    last_percent: Option<u32>,
}

impl ConsoleObserver {
    /// Text for `event`, or `None` when nothing visible changed
    pub fn render(&mut self, event: &PlaybackEvent) -> Option<String> {
        match event {
            PlaybackEvent::StateChanged { state } => {
                self.last_percent = None;
                Some(format!("state: {state}"))
            }
            PlaybackEvent::TrackChanged { track: Some(track) } => {
                Some(format!("track: {}", track.name()))
            }
            PlaybackEvent::TrackChanged { track: None } => Some("track: none".to_string()),
            PlaybackEvent::ProgressUpdated { progress } => {
                let percent = progress.floor() as u32;
                if self.last_percent == Some(percent) {
                    return None;
                }
                self.last_percent = Some(percent);
                Some(format!("progress: {percent}%"))
            }
            PlaybackEvent::Error { message } => Some(format!("error: {message}")),
        }
    }
}

/// Read lines from `input` on a dedicated thread
///
/// The reader thread is detached: a read blocked on a terminal never holds
/// up runtime shutdown. The channel closes at end of input or on a read
/// error.
pub fn read_lines<R>(input: R) -> UnboundedReceiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        for line in input.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read console input: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

struct Attachment {
    // The controller holds subscribers weakly
    _observer: Arc<ChannelObserver>,
    id: SubscriptionId,
    events: UnboundedReceiver<PlaybackEvent>,
}

pub struct Console<'a> {
    service: &'a PlaybackService,
    attachment: Option<Attachment>,
    view: ConsoleObserver,
}

impl<'a> Console<'a> {
    pub fn new(service: &'a PlaybackService) -> Self {
        Self {
            service,
            attachment: None,
            view: ConsoleObserver::default(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Subscribe the view; the controller replays its snapshot immediately
    pub fn attach(&mut self) {
        if self.attachment.is_some() {
            return;
        }

        let (observer, events) = ChannelObserver::new();
        let id = self.service.controller().subscribe(&observer);
        self.view = ConsoleObserver::default();
        self.attachment = Some(Attachment {
            _observer: observer,
            id,
            events,
        });
    }

    /// Unsubscribe the view, discarding undelivered events
    pub fn detach(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            self.service.controller().unsubscribe(attachment.id);
            tracing::debug!(subscription = %attachment.id, "Console detached");
        }
    }

    /// Execute commands from `lines` until the channel closes or `quit`
    pub async fn run<W: Write>(
        &mut self,
        mut lines: UnboundedReceiver<String>,
        out: &mut W,
    ) -> Result<()> {
        self.attach();

        loop {
            tokio::select! {
                line = lines.recv() => {
                    let Some(line) = line else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    if self.handle_line(&line, out)? == Flow::Quit {
                        break;
                    }
                }
                Some(event) = next_event(&mut self.attachment) => {
                    self.print_event(&event, out)?;
                }
            }
        }

        self.drain(out)?;
        self.detach();
        Ok(())
    }

    /// Parse and execute one line, reporting failures to `out`
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let result = line
            .parse::<Command>()
            .and_then(|command| self.execute(command, out));

        match result {
            Ok(flow) => Ok(flow),
            // Already reported through the event stream
            Err(DaemonError::Playback(_)) if self.is_attached() => Ok(Flow::Continue),
            Err(e @ (DaemonError::Io(_) | DaemonError::Config(_))) => Err(e),
            Err(e) => {
                writeln!(out, "{e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        let service = self.service;
        let controller = service.controller();

        match command {
            Command::List => self.list(out)?,
            Command::Play(index) => service.play_index(index)?,
            Command::Select(index) => service.select_index(index)?,
            Command::Pause => controller.pause(),
            Command::Resume => controller.play(None)?,
            Command::Toggle => controller.toggle()?,
            Command::Stop => controller.stop(),
            Command::Status => {
                let snapshot = serde_json::to_string(&controller.snapshot())
                    .map_err(|e| DaemonError::Io(e.into()))?;
                writeln!(out, "{snapshot}")?;
            }
            Command::Attach => {
                self.attach();
                writeln!(out, "attached")?;
            }
            Command::Detach => {
                self.detach();
                writeln!(out, "detached")?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn list<W: Write>(&self, out: &mut W) -> Result<()> {
        let library = self.service.library();
        if library.is_empty() {
            writeln!(out, "library is empty")?;
            return Ok(());
        }

        let selected = self.service.controller().selected_track();
        for (i, track) in library.tracks().iter().enumerate() {
            let marker = if selected.as_ref() == Some(track) { '>' } else { ' ' };
            writeln!(out, "{marker}{:>3}. {}", i + 1, track.name())?;
        }
        Ok(())
    }

    fn print_event<W: Write>(&mut self, event: &PlaybackEvent, out: &mut W) -> Result<()> {
        if let Some(text) = self.view.render(event) {
            writeln!(out, "{text}")?;
        }
        Ok(())
    }

    /// Print events that are already queued
    fn drain<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let mut pending = Vec::new();
        if let Some(attachment) = self.attachment.as_mut() {
            while let Ok(event) = attachment.events.try_recv() {
                pending.push(event);
            }
        }

        for event in &pending {
            self.print_event(event, out)?;
        }
        Ok(())
    }
}

async fn next_event(attachment: &mut Option<Attachment>) -> Option<PlaybackEvent> {
    match attachment {
        Some(attachment) => attachment.events.recv().await,
        None => std::future::pending().await,
    }
}
