//! Line-oriented chat loop: password prompt, then one turn per input line.

use std::io::Write;

use gymdesk_ai::{ChatError, Conversation, Role, Session, TurnEvent};
use gymdesk_common::{GymdeskError, Result};
use gymdesk_config::schema::ChatConfig;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::render;

/// Forward every Ctrl-C to a channel for the life of the process.
pub fn ctrl_c_interrupts() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Resolves on the next interrupt; never, without an interrupt source.
async fn next_interrupt(interrupts: &mut Option<mpsc::UnboundedReceiver<()>>) {
    if let Some(rx) = interrupts {
        if rx.recv().await.is_some() {
            return;
        }
    }
    std::future::pending::<()>().await
}

#[derive(Debug, PartialEq)]
enum Command {
    Empty,
    Quit,
    Usage,
    Say(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Command::Empty,
            "/quit" | "/exit" => Command::Quit,
            "/usage" => Command::Usage,
            _ => Command::Say(line.to_string()),
        }
    }
}

pub struct Repl<R, W> {
    input: Lines<R>,
    out: W,
    conversation: Conversation,
    session: Session,
    chat: ChatConfig,
    password: Option<String>,
    interrupts: Option<mpsc::UnboundedReceiver<()>>,
    /// Transcript messages already written to `out`.
    rendered: usize,
}

impl<R, W> Repl<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    pub fn new(
        input: R,
        out: W,
        conversation: Conversation,
        session: Session,
        chat: ChatConfig,
        password: Option<String>,
    ) -> Self {
        Self {
            input: input.lines(),
            out,
            conversation,
            session,
            chat,
            password,
            interrupts: None,
            rendered: 0,
        }
    }

    /// An interrupt at a prompt ends the run; during a turn it cancels
    /// the turn.
    pub fn with_interrupts(mut self, interrupts: mpsc::UnboundedReceiver<()>) -> Self {
        self.interrupts = Some(interrupts);
        self
    }

    /// Run until `/quit`, an interrupt at a prompt, or end of input.
    ///
    /// Turn failures are printed and the loop continues. Only I/O errors and
    /// a missing access password end the run with an error.
    pub async fn run(&mut self) -> Result<()> {
        write!(self.out, "{}", render::header(&self.chat))?;

        if !self.authorize().await? {
            return Ok(());
        }

        self.session
            .start(&self.chat.system_prompt, &self.chat.greeting);
        self.render_new()?;

        while let Some(line) = self.prompt(render::PROMPT).await? {
            match Command::parse(&line) {
                Command::Empty => continue,
                Command::Quit => break,
                Command::Usage => {
                    writeln!(self.out, "{}", render::usage_line(self.session.tracker()))?;
                }
                Command::Say(text) => self.turn(text).await?,
            }
        }

        info!(
            session = %self.session.id(),
            messages = self.session.transcript().len(),
            tokens = self.session.tracker().total_tokens(),
            "chat ended"
        );
        Ok(())
    }

    /// Prompt until the gate opens. `Ok(false)` means input ended first.
    async fn authorize(&mut self) -> Result<bool> {
        while !self.session.is_authorized() {
            let Some(submitted) = self.prompt(render::PASSWORD_PROMPT).await? else {
                return Ok(false);
            };
            match self.session.authorize(submitted, self.password.as_deref()) {
                Ok(()) => {}
                Err(ChatError::AuthFailure) => {
                    writeln!(self.out, "{}", render::error_line(&ChatError::AuthFailure))?;
                }
                Err(e) => {
                    writeln!(self.out, "{}", render::error_line(&e))?;
                    return Err(GymdeskError::Chat(e.to_string()));
                }
            }
        }
        Ok(true)
    }

    /// Run one turn, printing replies and notices as the driver reports them.
    async fn turn(&mut self, text: String) -> Result<()> {
        let cancel = CancellationToken::new();
        let mut write_err: Option<std::io::Error> = None;

        let outcome = {
            let out = &mut self.out;
            let mut on_event = |event: TurnEvent| {
                if write_err.is_none() {
                    if let Err(e) = writeln!(out, "{}", render::event_line(&event)) {
                        write_err = Some(e);
                    }
                }
            };

            let turn = self
                .conversation
                .run_turn(&mut self.session, text, &cancel, &mut on_event);
            tokio::pin!(turn);

            tokio::select! {
                outcome = &mut turn => outcome,
                _ = next_interrupt(&mut self.interrupts) => {
                    info!("interrupt received, cancelling turn");
                    cancel.cancel();
                    turn.await
                }
            }
        };

        if let Some(e) = write_err {
            return Err(e.into());
        }
        self.rendered = self.session.transcript().len();
        self.flush_notices()?;

        match outcome {
            Ok(report) => debug!(path = ?report.path, appended = report.appended, "turn rendered"),
            Err(e) => writeln!(self.out, "{}", render::error_line(&e))?,
        }
        Ok(())
    }

    /// Write transcript messages added since the last call.
    ///
    /// The user's own lines are already on screen.
    fn render_new(&mut self) -> Result<()> {
        let len = self.session.transcript().len();
        for msg in &self.session.transcript().all()[self.rendered..len] {
            if msg.role == Role::User {
                continue;
            }
            if let Some(line) = render::message_line(msg) {
                writeln!(self.out, "{line}")?;
            }
        }
        self.rendered = len;
        self.flush_notices()
    }

    fn flush_notices(&mut self) -> Result<()> {
        for notice in self.session.notices_mut().drain() {
            writeln!(self.out, "{}", render::notice_line(&notice))?;
        }
        Ok(())
    }

    /// Read one line. `None` at end of input or on interrupt.
    async fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        tokio::select! {
            line = self.input.next_line() => Ok(line?),
            _ = next_interrupt(&mut self.interrupts) => {
                writeln!(self.out)?;
                info!("interrupted at prompt");
                Ok(None)
            }
        }
    }
}
