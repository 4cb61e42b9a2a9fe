use std::sync::mpsc::{Receiver, Sender};

use tokio::sync::oneshot;
use tracing::warn;

/// Raised when the executor thread is gone or dropped a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Command executor is not running")]
pub struct Disconnected;

pub type HandlerError<C> = <<C as Command>::Handler as DeviceHandler>::Error;

pub trait Command: Send {
    type Response: Send;
    type Handler: DeviceHandler<Command = Self>;

    fn execute(self, handler: &mut Self::Handler) -> Result<Self::Response, HandlerError<Self>>;
}

pub trait DeviceHandler {
    type Command: Command<Handler = Self>;
    type Error: From<Disconnected> + Send;
}

pub struct GenericCommand<C: Command> {
    command: C,
    response_ch: oneshot::Sender<Result<C::Response, HandlerError<C>>>,
}

impl<C: Command> GenericCommand<C> {
    pub fn new(
        command: C,
        response_ch: oneshot::Sender<Result<C::Response, HandlerError<C>>>,
    ) -> Self {
        Self {
            command,
            response_ch,
        }
    }

    /// Runs the command and hands the result back to the requester.
    pub fn execute(self, handler: &mut C::Handler) -> Result<(), Disconnected> {
        let result = self.command.execute(handler);

        self.response_ch.send(result).map_err(|_| Disconnected)
    }
}

/// Owns a device handler and runs queued commands one at a time.
pub struct CommandExecutor<H: DeviceHandler + Send + 'static> {
    handler: H,
    commands_ch: Receiver<GenericCommand<H::Command>>,
    sender: Sender<GenericCommand<H::Command>>,
}

impl<H: DeviceHandler + Send + 'static> CommandExecutor<H> {
    pub fn new(handler: H) -> Self {
        let (sender, commands_ch) = std::sync::mpsc::channel();

        Self {
            handler,
            commands_ch,
            sender,
        }
    }

    pub fn sender(&self) -> CommandSender<H::Command> {
        CommandSender::new(self.sender.clone())
    }

    /// Blocks until every sender is dropped, then returns the handler.
    pub fn run(self) -> H {
        let CommandExecutor {
            mut handler,
            commands_ch,
            sender,
        } = self;
        drop(sender);

        while let Ok(command) = commands_ch.recv() {
            if command.execute(&mut handler).is_err() {
                warn!("Requester went away before the response was delivered");
            }
        }

        handler
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<H>
    where
        H::Command: 'static,
        <H::Command as Command>::Response: 'static,
        H::Error: 'static,
    {
        tokio::task::spawn_blocking(move || self.run())
    }
}

pub struct CommandSender<C: Command> {
    commands_ch: Sender<GenericCommand<C>>,
}

impl<C: Command> Clone for CommandSender<C> {
    fn clone(&self) -> Self {
        Self {
            commands_ch: self.commands_ch.clone(),
        }
    }
}

impl<C: Command> CommandSender<C> {
    pub fn new(commands_ch: Sender<GenericCommand<C>>) -> Self {
        Self { commands_ch }
    }

    pub async fn send_command(&self, command: C) -> Result<C::Response, HandlerError<C>> {
        let (response_ch, response_rx) = oneshot::channel();
        let command = GenericCommand::new(command, response_ch);

        self.commands_ch.send(command).map_err(|_| Disconnected)?;

        response_rx.await.map_err(|_| Disconnected)?
    }
}
