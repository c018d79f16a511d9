use log::{debug, trace};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, Interval};

use crate::game::{Event, Screen, Session};
use crate::screen::{self, View};

const MARKER_PERIOD: Duration = Duration::from_millis(100);
const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);
const INPUT_BUFFER: usize = 32;

/// What a chat can send to its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Reset,
    Help,
    Text(String),
}

/// What the session asks the chat to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Screen {
        screen: Screen,
        view: View,
        status: Option<String>,
    },
    Status(String),
    Notice(String),
}

/// Hands back the input that could not be delivered.
#[derive(Debug, thiserror::Error)]
#[error("the game session has stopped")]
pub struct SessionClosed(pub Input);

#[derive(Debug, Clone)]
pub struct SessionHandle {
    inputs: mpsc::Sender<Input>,
}

impl SessionHandle {
    pub async fn send(&self, input: Input) -> Result<(), SessionClosed> {
        self.inputs
            .send(input)
            .await
            .map_err(|unsent| SessionClosed(unsent.0))
    }

    pub fn is_closed(&self) -> bool {
        self.inputs.is_closed()
    }
}

/// Runs `session` on its own task until every handle is dropped, the frame
/// receiver goes away, or the chat leaves an untimed screen (lobby, results)
/// alone for `idle_timeout`. The task hands the session back when it ends.
pub fn spawn(
    session: Session,
    frames: mpsc::Sender<Frame>,
    idle_timeout: Duration,
) -> (SessionHandle, JoinHandle<Session>) {
    let (inputs_tx, inputs_rx) = mpsc::channel(INPUT_BUFFER);
    let task = tokio::spawn(run(session, inputs_rx, frames, idle_timeout));
    (SessionHandle { inputs: inputs_tx }, task)
}

struct Timers {
    marker: Option<Interval>,
    countdown: Option<Interval>,
}

impl Timers {
    fn for_screen(screen: Screen) -> Self {
        Self {
            marker: screen.runs_marker().then(|| every(MARKER_PERIOD)),
            countdown: screen.has_countdown().then(|| every(COUNTDOWN_PERIOD)),
        }
    }
}

// First tick one period from now, not immediately.
fn every(period: Duration) -> Interval {
    time::interval_at(Instant::now() + period, period)
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn screen_frame(session: &Session) -> Frame {
    Frame::Screen {
        screen: session.screen(),
        view: screen::render(session),
        status: screen::status(session),
    }
}

async fn run(
    mut session: Session,
    mut inputs: mpsc::Receiver<Input>,
    frames: mpsc::Sender<Frame>,
    idle_timeout: Duration,
) -> Session {
    let mut timers = Timers::for_screen(session.screen());
    let mut last_activity = Instant::now();
    if frames.send(screen_frame(&session)).await.is_err() {
        return session;
    }

    loop {
        let idle = !session.screen().has_countdown();
        let event = tokio::select! {
            _ = time::sleep_until(last_activity + idle_timeout), if idle => {
                debug!("closing session idle on {:?}", session.screen());
                let _ = frames.send(Frame::Notice(screen::CLOSED.to_string())).await;
                break;
            }
            input = inputs.recv() => match input {
                Some(Input::Start) => Some(Event::Start),
                Some(Input::Reset) => Some(Event::Reset),
                Some(Input::Help) => {
                    if frames.send(Frame::Notice(screen::HELP.to_string())).await.is_err() {
                        break;
                    }
                    None
                }
                Some(Input::Text(text)) => {
                    let event = screen::interpret(&session, &text);
                    if event.is_none() {
                        debug!("no meaning for {text:?} on {:?}", session.screen());
                        let hint = screen::hint(&session).to_string();
                        if frames.send(Frame::Notice(hint)).await.is_err() {
                            break;
                        }
                    }
                    event
                }
                None => break,
            },
            _ = tick(&mut timers.marker) => Some(Event::MarkerTick),
            _ = tick(&mut timers.countdown) => Some(Event::CountdownTick),
        };
        let Some(event) = event else {
            last_activity = Instant::now();
            continue;
        };

        let before = session.screen();
        let from_chat = !event.is_tick();
        let redraws = matches!(event, Event::SelectOption(_) | Event::NextQuestion);
        let countdown = event == Event::CountdownTick;
        if from_chat {
            last_activity = Instant::now();
        }

        let mut out = Vec::new();
        match session.handle(event) {
            Ok(outcome) => {
                if let Some(notice) = screen::announce(outcome) {
                    out.push(Frame::Notice(notice));
                }
                if session.screen() != before {
                    timers = Timers::for_screen(session.screen());
                    last_activity = Instant::now();
                    out.push(screen_frame(&session));
                } else if redraws {
                    out.push(screen_frame(&session));
                } else if from_chat || countdown {
                    if let Some(status) = screen::status(&session) {
                        out.push(Frame::Status(status));
                    }
                }
            }
            Err(rejected) if from_chat => {
                debug!("rejected on {before:?}: {rejected}");
                out.push(Frame::Notice(format!("⚠️ {rejected}")));
            }
            Err(rejected) => trace!("dropped stale tick: {rejected}"),
        }

        for frame in out {
            if frames.send(frame).await.is_err() {
                return session;
            }
        }
    }

    debug!("session closed on {:?}", session.screen());
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Activity;

    const FRAME_BUFFER: usize = 4_096;
    const IDLE: Duration = Duration::from_secs(600);

    fn drain(frames: &mut mpsc::Receiver<Frame>) -> Vec<Frame> {
        let mut drained = Vec::new();
        while let Ok(frame) = frames.try_recv() {
            drained.push(frame);
        }
        drained
    }

    fn screens(frames: &[Frame]) -> Vec<Screen> {
        frames
            .iter()
            .filter_map(|frame| match frame {
                Frame::Screen { screen, .. } => Some(*screen),
                _ => None,
            })
            .collect()
    }

    fn notices(frames: &[Frame]) -> Vec<&str> {
        frames
            .iter()
            .filter_map(|frame| match frame {
                Frame::Notice(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn opens_on_the_lobby() {
        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, task) = spawn(Session::with_seed(1), tx, IDLE);

        time::sleep(Duration::from_secs(5)).await;
        let frames = drain(&mut rx);
        assert_eq!(screens(&frames), vec![Screen::Lobby]);
        assert_eq!(frames.len(), 1);

        drop(handle);
        assert_eq!(task.await.unwrap().screen(), Screen::Lobby);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_game_runs_to_results_on_the_clock() {
        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, task) = spawn(Session::with_seed(2), tx, IDLE);
        handle.send(Input::Start).await.unwrap();

        time::sleep(Duration::from_millis(194_500)).await;
        let frames = drain(&mut rx);
        assert_eq!(
            screens(&frames),
            vec![
                Screen::Lobby,
                Screen::Active(Activity::Reflex),
                Screen::FactBreak(Activity::Reflex),
                Screen::Active(Activity::Quiz),
                Screen::FactBreak(Activity::Quiz),
                Screen::Active(Activity::Brainstorm),
                Screen::FactBreak(Activity::Brainstorm),
            ]
        );

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(screens(&drain(&mut rx)), vec![Screen::Results]);

        // nothing ticks once the results are up
        time::sleep(Duration::from_secs(60)).await;
        assert!(drain(&mut rx).is_empty());

        drop(handle);
        let session = task.await.unwrap();
        assert_eq!(session.screen(), Screen::Results);
        assert!(session.winner().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_redraws_status_every_second() {
        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, _task) = spawn(Session::with_seed(3), tx, IDLE);
        handle.send(Input::Start).await.unwrap();

        time::sleep(Duration::from_millis(3_500)).await;
        let statuses = drain(&mut rx)
            .into_iter()
            .filter_map(|frame| match frame {
                Frame::Status(line) => Some(line),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(statuses.len(), 3);
        assert!(statuses[2].contains("Time: 27s"));
    }

    #[tokio::test(start_paused = true)]
    async fn strike_is_scored_and_announced() {
        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, task) = spawn(Session::with_seed(4), tx, IDLE);
        handle.send(Input::Start).await.unwrap();
        handle
            .send(Input::Text(screen::STRIKE.to_string()))
            .await
            .unwrap();

        time::sleep(Duration::from_millis(50)).await;
        let frames = drain(&mut rx);
        assert_eq!(notices(&frames), vec!["🎯 +10 points!"]);

        drop(handle);
        assert_eq!(task.await.unwrap().player().score, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn marker_moves_only_on_its_timer() {
        let (tx, _rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, task) = spawn(Session::with_seed(5), tx, IDLE);
        handle.send(Input::Start).await.unwrap();

        time::sleep(Duration::from_millis(250)).await;
        drop(handle);
        let session = task.await.unwrap();
        assert_eq!(session.marker().position(), 60.0);
    }

    #[tokio::test(start_paused = true)]
    async fn nonsense_gets_a_hint_and_changes_nothing() {
        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, task) = spawn(Session::with_seed(6), tx, IDLE);
        handle.send(Input::Text("hello?".into())).await.unwrap();
        handle.send(Input::Reset).await.unwrap();
        handle.send(Input::Help).await.unwrap();

        time::sleep(Duration::from_millis(10)).await;
        let frames = drain(&mut rx);
        let notices = notices(&frames);
        assert_eq!(notices.len(), 3);
        assert_eq!(notices[0], screen::hint(&Session::with_seed(6)));
        assert!(notices[1].starts_with("⚠️"));
        assert_eq!(notices[2], screen::HELP);

        drop(handle);
        assert_eq!(task.await.unwrap().screen(), Screen::Lobby);
    }

    #[tokio::test(start_paused = true)]
    async fn quiz_selection_redraws_the_question() {
        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, _task) = spawn(Session::with_seed(7), tx, IDLE);
        handle.send(Input::Start).await.unwrap();
        handle
            .send(Input::Text(screen::FINISH_ROUND.to_string()))
            .await
            .unwrap();
        time::sleep(Duration::from_millis(5_500)).await;
        drain(&mut rx);

        handle.send(Input::Text("A".into())).await.unwrap();
        time::sleep(Duration::from_millis(10)).await;
        let frames = drain(&mut rx);
        assert_eq!(screens(&frames), vec![Screen::Active(Activity::Quiz)]);
        match &frames[0] {
            Frame::Screen { view, .. } => assert!(view.text.contains("✅ A.")),
            other => panic!("expected a screen, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn idle_lobby_closes_the_session() {
        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, task) = spawn(Session::with_seed(9), tx, Duration::from_secs(60));

        time::sleep(Duration::from_secs(30)).await;
        handle.send(Input::Help).await.unwrap();
        time::sleep(Duration::from_secs(45)).await;
        assert!(!task.is_finished());

        time::sleep(Duration::from_secs(20)).await;
        assert!(task.is_finished());
        assert!(handle.is_closed());
        let frames = drain(&mut rx);
        assert_eq!(notices(&frames).last().copied(), Some(screen::CLOSED));
        assert_eq!(task.await.unwrap().screen(), Screen::Lobby);
    }

    #[tokio::test(start_paused = true)]
    async fn running_game_outlives_the_idle_timeout() {
        let (tx, _rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, task) = spawn(Session::with_seed(10), tx, Duration::from_secs(20));
        handle.send(Input::Start).await.unwrap();

        // 195s of rounds with no input, then results sit idle
        time::sleep(Duration::from_secs(200)).await;
        assert!(!task.is_finished());

        time::sleep(Duration::from_secs(20)).await;
        assert!(task.is_finished());
        assert_eq!(task.await.unwrap().screen(), Screen::Results);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_outbox_stops_the_session() {
        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        let (handle, task) = spawn(Session::with_seed(8), tx, IDLE);
        drop(rx);
        handle.send(Input::Start).await.ok();

        let session = task.await.unwrap();
        assert!(handle.is_closed());
        assert_eq!(session.screen(), Screen::Lobby);
    }
}
