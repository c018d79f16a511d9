//! Chat rendering of a [`Session`] and the reverse mapping from button labels
//! back to game events. Nothing in here changes game state.

use std::fmt::Write;

use crate::game::content::{Icon, BRAINSTORM};
use crate::game::reflex::{LOWER_BOUND, MIDPOINT, UPPER_BOUND};
use crate::game::results::RewardTier;
use crate::game::{Activity, Event, Outcome, Participant, Screen, Session};

pub const START: &str = "🌱 Start Conservation Challenge";
pub const STRIKE: &str = "🛡️ PROTECT NATURE!";
pub const FINISH_ROUND: &str = "⏭️ Finish round";
pub const NEXT_QUESTION: &str = "Next Question ➡️";
pub const SUBMIT_QUIZ: &str = "✅ Submit Quiz";
pub const SUBMIT_IDEAS: &str = "📨 Submit Ideas";
pub const CLEAR_IDEAS: &str = "🧹 Clear ideas";
pub const PLAY_AGAIN: &str = "🔄 Back to the lobby";

pub const HELP: &str = "🌿 Nature Conservation Challenge\n\n\
Three timed rounds: a reflex challenge, an eco quiz and a brainstorm.\n\
Use the keyboard buttons to play. On the brainstorm round every message you send \
is added to your ideas.\n\n\
/start - open the lobby or start the challenge\n\
/reset - leave the results and return to the lobby\n\
/help - show this message";

pub const CLOSED: &str = "💤 The game went to sleep after a quiet spell. Send /start to play again.";

const TRACK_CELLS: usize = 21;
const OPTION_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// One chat message worth of screen: text plus reply-keyboard rows.
/// An empty keyboard means the keyboard should be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub text: String,
    pub keyboard: Vec<Vec<String>>,
}

impl View {
    fn new(text: String) -> Self {
        Self {
            text,
            keyboard: Vec::new(),
        }
    }

    fn row(mut self, labels: &[&str]) -> Self {
        self.keyboard
            .push(labels.iter().map(|label| label.to_string()).collect());
        self
    }
}

pub fn render(session: &Session) -> View {
    match session.screen() {
        Screen::Lobby => lobby(),
        Screen::Active(Activity::Reflex) => reflex(session),
        Screen::Active(Activity::Quiz) => quiz(session),
        Screen::Active(Activity::Brainstorm) => brainstorm(session),
        Screen::FactBreak(_) => fact_break(session),
        Screen::Results => results(session),
    }
}

/// The line under a timed screen that keeps getting redrawn.
pub fn status(session: &Session) -> Option<String> {
    let screen = session.screen();
    if !screen.has_countdown() {
        return None;
    }

    let mut line = match screen {
        Screen::FactBreak(_) => format!("⏳ Next round in: {}s", session.seconds_left()),
        _ => format!(
            "⏱️ Time: {}s · ⭐ Score: {}",
            session.seconds_left(),
            session.player().score
        ),
    };
    let _ = write!(line, " · Progress {:.0}%", session.progress_percent());

    match screen {
        Screen::Active(Activity::Reflex) => {
            let _ = write!(line, "\n{}", track(session.marker().position()));
        }
        Screen::Active(Activity::Brainstorm) if session.ideas().points() > 0 => {
            let _ = write!(line, "\nPotential points: {}", session.ideas().points());
        }
        _ => {}
    }
    Some(line)
}

pub fn announce(outcome: Outcome) -> Option<String> {
    match outcome {
        Outcome::Updated => None,
        Outcome::Struck { points } => Some(format!("🎯 +{points} points!")),
        Outcome::QuizGraded(grade) => Some(format!(
            "📝 Quiz complete: {} correct, +{} points",
            grade.correct, grade.points
        )),
        Outcome::IdeasSubmitted { points } => {
            Some(format!("💡 Ideas submitted: +{points} points"))
        }
    }
}

/// Maps a chat message onto the event it stands for on the current screen.
pub fn interpret(session: &Session, text: &str) -> Option<Event> {
    let text = text.trim();
    match session.screen() {
        Screen::Lobby if text == START => Some(Event::Start),
        Screen::Active(Activity::Reflex) => match text {
            STRIKE => Some(Event::Strike),
            FINISH_ROUND => Some(Event::Submit),
            _ => None,
        },
        Screen::Active(Activity::Quiz) => match text {
            NEXT_QUESTION | SUBMIT_QUIZ => Some(Event::NextQuestion),
            _ => option_index(text).map(Event::SelectOption),
        },
        Screen::Active(Activity::Brainstorm) => match text {
            SUBMIT_IDEAS => Some(Event::Submit),
            CLEAR_IDEAS => Some(Event::EditIdeas(String::new())),
            "" => None,
            idea => {
                let current = session.ideas().text();
                let text = if current.is_empty() {
                    idea.to_string()
                } else {
                    format!("{current}\n{idea}")
                };
                Some(Event::EditIdeas(text))
            }
        },
        Screen::Results if text == PLAY_AGAIN => Some(Event::Reset),
        _ => None,
    }
}

/// What to say when a message means nothing on the current screen.
pub fn hint(session: &Session) -> &'static str {
    match session.screen() {
        Screen::Lobby => "Press the start button (or send /start) to begin.",
        Screen::Active(Activity::Reflex) => "Tap \"PROTECT NATURE!\" when the bar is near the centre.",
        Screen::Active(Activity::Quiz) => "Pick one of the lettered answers.",
        Screen::Active(Activity::Brainstorm) => "Send your ideas as messages, then submit them.",
        Screen::FactBreak(_) => "Take a breath, the next round starts in a moment.",
        Screen::Results => "Press the button (or send /reset) to go back to the lobby.",
    }
}

fn option_label(index: usize, choice: &str) -> String {
    let letter = OPTION_LETTERS.get(index).copied().unwrap_or('?');
    format!("{letter}. {choice}")
}

// Accepts "B", "b", "2" or the full "B. Nitrogen" button label.
fn option_index(text: &str) -> Option<usize> {
    let head = text.split('.').next()?.trim();
    let mut chars = head.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return head.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
    }
    if let Some(digit) = first.to_digit(10) {
        return (digit as usize).checked_sub(1);
    }
    OPTION_LETTERS
        .iter()
        .position(|letter| *letter == first.to_ascii_uppercase())
}

fn track(position: f64) -> String {
    let span = UPPER_BOUND - LOWER_BOUND;
    let cell_of = |p: f64| {
        let scaled = (p - LOWER_BOUND) / span * (TRACK_CELLS - 1) as f64;
        (scaled.round().max(0.0) as usize).min(TRACK_CELLS - 1)
    };
    let centre = cell_of(MIDPOINT);
    let marker = cell_of(position);

    (0..TRACK_CELLS)
        .map(|cell| match (cell == marker, cell == centre) {
            (true, true) => '◉',
            (true, false) => '●',
            (false, true) => '┃',
            (false, false) => '─',
        })
        .collect()
}

fn heading(activity: Activity) -> String {
    format!(
        "{} {}",
        Icon::for_activity(activity).emoji(),
        activity.title()
    )
}

fn leaderboard(session: &Session) -> String {
    let mut board = String::from("🏅 Leaderboard");
    for (rank, participant) in session.standings().into_iter().enumerate() {
        let _ = write!(board, "\n{}", standing_line(rank, participant));
    }
    board
}

fn standing_line(rank: usize, participant: &Participant) -> String {
    let medal = match rank {
        0 => "🥇",
        1 => "🥈",
        2 => "🥉",
        _ => "▫️",
    };
    let marker = if participant.is_player() { " ⬅️" } else { "" };
    format!(
        "{medal} {}: {} pts{marker}",
        participant.name, participant.score
    )
}

fn lobby() -> View {
    let mut text = String::from("🌿 Nature Conservation Challenge\n\n");
    for activity in Activity::ORDER {
        let blurb = match activity {
            Activity::Reflex => "Test your reflexes with nature-themed actions",
            Activity::Quiz => "Answer questions about environmental conservation",
            Activity::Brainstorm => "Share your ideas for protecting our planet",
        };
        let _ = writeln!(
            text,
            "{} ({}s)\n{blurb}\n",
            heading(activity),
            activity.countdown_secs()
        );
    }
    text.push_str("🎁 Rewards");
    for tier in RewardTier::ALL {
        let _ = write!(text, "\n{}: {}", tier.range(), tier.label());
    }
    View::new(text).row(&[START])
}

fn reflex(session: &Session) -> View {
    let text = format!(
        "{}\n\nTap when the bar aligns with the centre to protect nature!\n\
         Points: Centre (10 pts) → Edges (1 pt)\n\n{}",
        heading(Activity::Reflex),
        leaderboard(session)
    );
    View::new(text).row(&[STRIKE]).row(&[FINISH_ROUND])
}

fn quiz(session: &Session) -> View {
    let quiz = session.quiz();
    let item = quiz.current();
    let chosen = quiz.answer_for(item.id);

    let mut text = format!(
        "{}\n\nQuestion {} / {} · Correct: {} / {}\n\n{}\n",
        heading(Activity::Quiz),
        quiz.cursor() + 1,
        quiz.len(),
        session.player().quiz_correct,
        quiz.len(),
        item.prompt
    );
    for (index, choice) in item.choices.iter().enumerate() {
        let tick = if chosen == Some(index) { "✅" } else { "▫️" };
        let _ = write!(text, "\n{tick} {}", option_label(index, choice));
    }

    let mut view = View::new(text);
    for (index, choice) in item.choices.iter().enumerate() {
        let label = option_label(index, choice);
        view = view.row(&[label.as_str()]);
    }
    let advance = if quiz.is_last() { SUBMIT_QUIZ } else { NEXT_QUESTION };
    view.row(&[advance])
}

fn brainstorm(session: &Session) -> View {
    let ideas = session.ideas().text();
    let mut text = format!(
        "{}\n\n{}\n\nExample:\n{}\n\nYou will earn up to 30 points for your ideas!",
        heading(Activity::Brainstorm),
        BRAINSTORM.prompt,
        BRAINSTORM.example
    );
    if !ideas.is_empty() {
        let _ = write!(text, "\n\nYour ideas so far:\n{ideas}");
    }
    View::new(text).row(&[SUBMIT_IDEAS]).row(&[CLEAR_IDEAS])
}

fn fact_break(session: &Session) -> View {
    let fact = session.current_fact();
    View::new(format!(
        "{} Did you know?\n\n{}",
        fact.icon().emoji(),
        fact.text
    ))
}

fn results(session: &Session) -> View {
    let mut text = String::from("🏆 Challenge complete!\n");
    if let Some(winner) = session.winner() {
        let _ = write!(
            text,
            "\nWinner: {} with {} points\nReward: {}\n",
            winner.name,
            winner.score,
            RewardTier::for_score(winner.score).label()
        );
    }
    for (rank, participant) in session.standings().into_iter().enumerate() {
        let _ = write!(
            text,
            "\n{} · {}",
            standing_line(rank, participant),
            RewardTier::for_score(participant.score).label()
        );
    }
    let player = session.player();
    let _ = write!(
        text,
        "\n\nQuiz answers correct: {} / {}",
        player.quiz_correct,
        session.quiz().len()
    );
    View::new(text).row(&[PLAY_AGAIN])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(screen: Screen) -> Session {
        let mut session = Session::with_seed(21);
        if screen == Screen::Lobby {
            return session;
        }
        session.handle(Event::Start).unwrap();
        while session.screen() != screen {
            session.handle(Event::CountdownTick).unwrap();
        }
        session
    }

    #[test]
    fn lobby_lists_every_reward_tier() {
        let view = render(&Session::with_seed(1));
        for tier in RewardTier::ALL {
            assert!(view.text.contains(tier.label()));
        }
        assert_eq!(view.keyboard, vec![vec![START.to_string()]]);
    }

    #[test]
    fn start_button_starts_only_from_the_lobby() {
        let session = Session::with_seed(1);
        assert_eq!(interpret(&session, START), Some(Event::Start));
        assert_eq!(interpret(&session, "hello"), None);

        let session = session_at(Screen::Active(Activity::Reflex));
        assert_eq!(interpret(&session, START), None);
        assert_eq!(interpret(&session, STRIKE), Some(Event::Strike));
        assert_eq!(interpret(&session, FINISH_ROUND), Some(Event::Submit));
    }

    #[test]
    fn quiz_buttons_map_to_options() {
        let session = session_at(Screen::Active(Activity::Quiz));
        let view = render(&session);
        let item = session.quiz().current();

        for (index, choice) in item.choices.iter().enumerate() {
            let label = option_label(index, choice);
            assert!(view.keyboard.contains(&vec![label.clone()]));
            assert_eq!(interpret(&session, &label), Some(Event::SelectOption(index)));
        }
        assert_eq!(interpret(&session, "b"), Some(Event::SelectOption(1)));
        assert_eq!(interpret(&session, "3"), Some(Event::SelectOption(2)));
        assert_eq!(interpret(&session, NEXT_QUESTION), Some(Event::NextQuestion));
        assert_eq!(interpret(&session, "What?"), None);
    }

    #[test]
    fn last_question_offers_submit() {
        let mut session = session_at(Screen::Active(Activity::Quiz));
        for _ in 0..4 {
            session.handle(Event::SelectOption(0)).unwrap();
            session.handle(Event::NextQuestion).unwrap();
        }
        let view = render(&session);
        assert_eq!(view.keyboard.last(), Some(&vec![SUBMIT_QUIZ.to_string()]));
    }

    #[test]
    fn brainstorm_messages_append_lines() {
        let mut session = session_at(Screen::Active(Activity::Brainstorm));
        let first = interpret(&session, "plant trees").unwrap();
        assert_eq!(first, Event::EditIdeas("plant trees".to_string()));
        session.handle(first).unwrap();

        assert_eq!(
            interpret(&session, " ride a bike "),
            Some(Event::EditIdeas("plant trees\nride a bike".to_string()))
        );
        assert_eq!(
            interpret(&session, CLEAR_IDEAS),
            Some(Event::EditIdeas(String::new()))
        );
        assert_eq!(interpret(&session, SUBMIT_IDEAS), Some(Event::Submit));
    }

    #[test]
    fn fact_break_has_no_keyboard() {
        let session = session_at(Screen::FactBreak(Activity::Reflex));
        let view = render(&session);
        assert!(view.keyboard.is_empty());
        assert!(view.text.contains(session.current_fact().text));
        assert!(status(&session).unwrap().starts_with("⏳ Next round in: 5s"));
    }

    #[test]
    fn status_draws_the_marker_track() {
        let session = session_at(Screen::Active(Activity::Reflex));
        let line = status(&session).unwrap();
        assert!(line.contains("Time: 30s"));
        assert!(line.contains("Progress 0%"));
        assert!(line.contains('◉'));

        assert_eq!(track(LOWER_BOUND).chars().next(), Some('●'));
        assert_eq!(track(UPPER_BOUND).chars().last(), Some('●'));
        assert_eq!(track(UPPER_BOUND).chars().count(), TRACK_CELLS);
    }

    #[test]
    fn untimed_screens_have_no_status() {
        assert_eq!(status(&Session::with_seed(1)), None);
        assert_eq!(status(&session_at(Screen::Results)), None);
    }

    #[test]
    fn results_name_the_winner_and_rewards() {
        let session = session_at(Screen::Results);
        let view = render(&session);
        assert!(view.text.contains("Winner: You with 0 points"));
        assert!(view.text.contains("Eco-friendly travel kit"));
        assert_eq!(interpret(&session, PLAY_AGAIN), Some(Event::Reset));
    }

    #[test]
    fn scoring_outcomes_are_announced() {
        assert_eq!(announce(Outcome::Updated), None);
        assert_eq!(
            announce(Outcome::Struck { points: 7 }).as_deref(),
            Some("🎯 +7 points!")
        );
        assert!(announce(Outcome::IdeasSubmitted { points: 12 })
            .unwrap()
            .contains("+12"));
    }
}
