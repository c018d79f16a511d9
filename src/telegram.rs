use std::sync::Arc;

use log::{debug, info, warn};
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, MessageId, ReplyMarkup};
use teloxide::utils::command::BotCommands;
use teloxide::RequestError;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::Config;
use crate::driver::{self, Frame, Input, SessionClosed, SessionHandle};
use crate::game::Session;
use crate::screen::View;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
pub type ChatStorage = InMemStorage<ChatState>;
pub type ChatDialogue = Dialogue<ChatState, ChatStorage>;

const FRAME_BUFFER: usize = 64;

#[derive(Clone, Debug, Default)]
pub enum ChatState {
    #[default]
    Idle,
    Playing {
        handle: SessionHandle,
    },
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "open the lobby or start the challenge")]
    Start,
    #[command(description = "leave the results and return to the lobby")]
    Reset,
    #[command(description = "show how to play")]
    Help,
}

impl From<Command> for Input {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start => Input::Start,
            Command::Reset => Input::Reset,
            Command::Help => Input::Help,
        }
    }
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let by_state = dptree::entry()
        .branch(dptree::case![ChatState::Idle].endpoint(open_session))
        .branch(dptree::case![ChatState::Playing { handle }].endpoint(forward));

    Update::filter_message()
        .enter_dialogue::<Message, ChatStorage, ChatState>()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .map(|cmd: Command| Input::from(cmd))
                .chain(by_state.clone()),
        )
        .branch(
            dptree::filter_map(|msg: Message| msg.text().map(|text| Input::Text(text.to_string())))
                .chain(by_state),
        )
        .branch(dptree::endpoint(receive_other))
}

async fn open_session(
    bot: Bot,
    dialogue: ChatDialogue,
    input: Input,
    storage: Arc<ChatStorage>,
    config: Arc<Config>,
) -> HandlerResult {
    let chat_id = dialogue.chat_id();
    info!("Opening a game session for chat {chat_id}");

    let session = match config.seed {
        Some(seed) => Session::with_seed(seed),
        None => Session::from_entropy(),
    };
    let (frames_tx, frames_rx) = mpsc::channel(FRAME_BUFFER);
    let (handle, _task) = driver::spawn(session, frames_tx, config.idle_timeout);
    tokio::spawn(outbox(bot, chat_id, frames_rx, config.status_every, storage));

    dialogue
        .update(ChatState::Playing {
            handle: handle.clone(),
        })
        .await?;

    // a fresh session already greets with the lobby
    if input != Input::Start {
        handle.send(input).await?;
    }
    Ok(())
}

async fn forward(
    bot: Bot,
    dialogue: ChatDialogue,
    handle: SessionHandle,
    input: Input,
    storage: Arc<ChatStorage>,
    config: Arc<Config>,
) -> HandlerResult {
    match handle.send(input).await {
        Ok(()) => Ok(()),
        Err(SessionClosed(input)) => {
            debug!("chat {}: session had stopped, opening a new one", dialogue.chat_id());
            open_session(bot, dialogue, input, storage, config).await
        }
    }
}

async fn receive_other(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "Please use the buttons below or send text")
        .await?;
    Ok(())
}

/// Drops the chat's dialogue once its session task has ended, so the next
/// message starts from `ChatState::Idle`.
async fn forget_finished(dialogue: &ChatDialogue) {
    match dialogue.get().await {
        Ok(Some(ChatState::Playing { handle })) if handle.is_closed() => {
            if let Err(err) = dialogue.exit().await {
                warn!("chat {}: could not drop dialogue: {err}", dialogue.chat_id());
            }
        }
        Ok(_) => {}
        Err(err) => warn!("chat {}: could not read dialogue: {err}", dialogue.chat_id()),
    }
}

fn markup(view: &View) -> ReplyMarkup {
    if view.keyboard.is_empty() {
        return ReplyMarkup::KeyboardRemove(KeyboardRemove::new());
    }
    let rows = view
        .keyboard
        .iter()
        .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    ReplyMarkup::Keyboard(KeyboardMarkup::new(rows))
}

struct StatusMessage {
    id: MessageId,
    text: String,
    edited_at: Instant,
}

/// Draws a session's frames into its chat, one at a time.
async fn outbox(
    bot: Bot,
    chat_id: ChatId,
    mut frames: mpsc::Receiver<Frame>,
    status_every: std::time::Duration,
    storage: Arc<ChatStorage>,
) {
    let mut status: Option<StatusMessage> = None;

    while let Some(frame) = frames.recv().await {
        let sent: Result<(), RequestError> = match frame {
            Frame::Screen {
                screen,
                view,
                status: line,
            } => {
                debug!("chat {chat_id}: drawing {screen:?}");
                status = None;
                show_screen(&bot, chat_id, &view, line, &mut status).await
            }
            Frame::Status(line) => update_status(&bot, chat_id, line, &mut status, status_every).await,
            Frame::Notice(text) => bot.send_message(chat_id, text).await.map(|_| ()),
        };

        if let Err(err) = sent {
            warn!("chat {chat_id}: telegram request failed: {err}");
        }
    }

    debug!("chat {chat_id}: outbox closed");
    forget_finished(&ChatDialogue::new(storage, chat_id)).await;
}

async fn show_screen(
    bot: &Bot,
    chat_id: ChatId,
    view: &View,
    line: Option<String>,
    status: &mut Option<StatusMessage>,
) -> Result<(), RequestError> {
    bot.send_message(chat_id, view.text.as_str())
        .reply_markup(markup(view))
        .await?;

    if let Some(line) = line {
        let sent = bot.send_message(chat_id, line.as_str()).await?;
        *status = Some(StatusMessage {
            id: sent.id,
            text: line,
            edited_at: Instant::now(),
        });
    }
    Ok(())
}

async fn update_status(
    bot: &Bot,
    chat_id: ChatId,
    line: String,
    status: &mut Option<StatusMessage>,
    status_every: std::time::Duration,
) -> Result<(), RequestError> {
    let Some(current) = status.as_mut() else {
        return Ok(());
    };
    // Telegram refuses edits that change nothing, and rate limits the rest
    if current.text == line || current.edited_at.elapsed() < status_every {
        return Ok(());
    }

    bot.edit_message_text(chat_id, current.id, line.as_str())
        .await?;
    current.text = line;
    current.edited_at = Instant::now();
    Ok(())
}
