pub mod brainstorm;
pub mod content;
pub mod quiz;
pub mod reflex;
pub mod results;

use std::fmt;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use brainstorm::Ideas;
use content::{Fact, FACTS};
use quiz::{Advance, Grade, QuizRound};
use reflex::Marker;

pub const FACT_BREAK_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Reflex,
    Quiz,
    Brainstorm,
}

impl Activity {
    pub const ORDER: [Activity; 3] = [Activity::Reflex, Activity::Quiz, Activity::Brainstorm];

    pub fn next(self) -> Option<Activity> {
        match self {
            Activity::Reflex => Some(Activity::Quiz),
            Activity::Quiz => Some(Activity::Brainstorm),
            Activity::Brainstorm => None,
        }
    }

    /// How many activities come before this one.
    pub fn ordinal(self) -> u32 {
        match self {
            Activity::Reflex => 0,
            Activity::Quiz => 1,
            Activity::Brainstorm => 2,
        }
    }

    pub fn countdown_secs(self) -> u32 {
        match self {
            Activity::Reflex => 30,
            Activity::Quiz => 60,
            Activity::Brainstorm => 90,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Activity::Reflex => "Nature Reflex Challenge",
            Activity::Quiz => "Eco Quiz",
            Activity::Brainstorm => "Conservation Ideas",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Lobby,
    Active(Activity),
    /// Interstitial shown after the wrapped activity finished.
    FactBreak(Activity),
    Results,
}

impl Screen {
    pub fn has_countdown(self) -> bool {
        matches!(self, Screen::Active(_) | Screen::FactBreak(_))
    }

    pub fn runs_marker(self) -> bool {
        self == Screen::Active(Activity::Reflex)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Lobby => write!(f, "lobby"),
            Screen::Active(activity) => write!(f, "{}", activity.title()),
            Screen::FactBreak(_) => write!(f, "fact break"),
            Screen::Results => write!(f, "results"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Player,
    Scripted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: u8,
    pub name: &'static str,
    pub score: u32,
    pub quiz_correct: u32,
    pub activity: Activity,
    pub control: Control,
}

impl Participant {
    fn new(id: u8, name: &'static str, control: Control) -> Self {
        Self {
            id,
            name,
            score: 0,
            quiz_correct: 0,
            activity: Activity::Reflex,
            control,
        }
    }

    pub fn lineup() -> Vec<Participant> {
        vec![
            Participant::new(1, "You", Control::Player),
            Participant::new(2, "Alex", Control::Scripted),
            Participant::new(3, "Taylor", Control::Scripted),
        ]
    }

    pub fn is_player(&self) -> bool {
        self.control == Control::Player
    }
}

/// Everything that can move a session forward: chat input and timer ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    Strike,
    SelectOption(usize),
    NextQuestion,
    EditIdeas(String),
    Submit,
    Reset,
    MarkerTick,
    CountdownTick,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Strike => "strike",
            Event::SelectOption(_) => "select option",
            Event::NextQuestion => "next question",
            Event::EditIdeas(_) => "edit ideas",
            Event::Submit => "submit",
            Event::Reset => "reset",
            Event::MarkerTick => "marker tick",
            Event::CountdownTick => "countdown tick",
        }
    }

    pub fn is_tick(&self) -> bool {
        matches!(self, Event::MarkerTick | Event::CountdownTick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    Struck { points: u32 },
    QuizGraded(Grade),
    IdeasSubmitted { points: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("\"{event}\" is not available on the {screen} screen")]
    NotAvailable { event: &'static str, screen: Screen },
    #[error("pick an answer before moving on")]
    NoAnswerSelected,
    #[error("there is no option {} (choose 1-{available})", .choice + 1)]
    NoSuchOption { choice: usize, available: usize },
}

pub struct Session {
    screen: Screen,
    participants: Vec<Participant>,
    quiz: QuizRound,
    facts: Vec<&'static Fact>,
    fact_index: usize,
    marker: Marker,
    ideas: Ideas,
    seconds_left: u32,
    winner: Option<usize>,
    rng: StdRng,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("screen", &self.screen)
            .field("seconds_left", &self.seconds_left)
            .field("participants", &self.participants)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(rng: StdRng) -> Self {
        Self {
            screen: Screen::Lobby,
            participants: Participant::lineup(),
            quiz: QuizRound::default(),
            facts: FACTS.iter().collect(),
            fact_index: 0,
            marker: Marker::default(),
            ideas: Ideas::default(),
            seconds_left: Activity::Reflex.countdown_secs(),
            winner: None,
            rng,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn player(&self) -> &Participant {
        // the lineup always seats the player first
        &self.participants[0]
    }

    pub fn quiz(&self) -> &QuizRound {
        &self.quiz
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn ideas(&self) -> &Ideas {
        &self.ideas
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn current_fact(&self) -> &'static Fact {
        self.facts[self.fact_index % self.facts.len()]
    }

    pub fn facts(&self) -> &[&'static Fact] {
        &self.facts
    }

    pub fn winner(&self) -> Option<&Participant> {
        self.winner.map(|index| &self.participants[index])
    }

    pub fn standings(&self) -> Vec<&Participant> {
        results::standings(&self.participants)
    }

    pub fn progress_percent(&self) -> f64 {
        let completed = match self.screen {
            Screen::Lobby => 0,
            Screen::Active(activity) => activity.ordinal(),
            Screen::FactBreak(activity) => activity.ordinal() + 1,
            Screen::Results => Activity::ORDER.len() as u32,
        };
        completed as f64 / Activity::ORDER.len() as f64 * 100.0
    }

    /// The one place session state changes. A rejected event leaves the
    /// session exactly as it was.
    pub fn handle(&mut self, event: Event) -> Result<Outcome, Rejected> {
        match (self.screen, event) {
            (Screen::Lobby, Event::Start) => {
                self.start();
                Ok(Outcome::Updated)
            }
            (Screen::Results, Event::Reset) => {
                self.reset();
                Ok(Outcome::Updated)
            }

            (Screen::Active(Activity::Reflex), Event::MarkerTick) => {
                self.marker.tick();
                Ok(Outcome::Updated)
            }
            (Screen::Active(Activity::Reflex), Event::Strike) => {
                let points = self.marker.strike();
                self.award(points);
                debug!("strike at {:.1} for {points}", self.marker.position());
                Ok(Outcome::Struck { points })
            }
            (Screen::Active(Activity::Reflex), Event::Submit) => {
                self.finish_activity(Activity::Reflex);
                Ok(Outcome::Updated)
            }

            (Screen::Active(Activity::Quiz), Event::SelectOption(choice)) => {
                self.quiz.select(choice)?;
                Ok(Outcome::Updated)
            }
            (Screen::Active(Activity::Quiz), Event::NextQuestion) => match self.quiz.advance()? {
                Advance::Next => Ok(Outcome::Updated),
                Advance::Finished => {
                    let outcome = self.grade_quiz();
                    self.finish_activity(Activity::Quiz);
                    Ok(outcome)
                }
            },

            (Screen::Active(Activity::Brainstorm), Event::EditIdeas(text)) => {
                self.ideas.edit(text);
                Ok(Outcome::Updated)
            }
            (Screen::Active(Activity::Brainstorm), Event::Submit) => {
                // the move to the fact break below keeps this from running twice
                let points = self.ideas.submit().unwrap_or_default();
                self.award(points);
                self.finish_activity(Activity::Brainstorm);
                Ok(Outcome::IdeasSubmitted { points })
            }

            (screen, Event::CountdownTick) if screen.has_countdown() => Ok(self.countdown()),

            (screen, event) => Err(Rejected::NotAvailable {
                event: event.name(),
                screen,
            }),
        }
    }

    fn start(&mut self) {
        self.participants = Participant::lineup();
        self.quiz = QuizRound::shuffled(&mut self.rng);
        self.facts.shuffle(&mut self.rng);
        self.fact_index = 0;
        self.marker = Marker::default();
        self.ideas = Ideas::default();
        self.winner = None;
        self.enter(Screen::Active(Activity::Reflex));
    }

    fn reset(&mut self) {
        self.screen = Screen::Lobby;
        self.participants = Participant::lineup();
        self.quiz = QuizRound::default();
        self.facts = FACTS.iter().collect();
        self.fact_index = 0;
        self.marker = Marker::default();
        self.ideas = Ideas::default();
        self.seconds_left = Activity::Reflex.countdown_secs();
        self.winner = None;
        debug!("session reset to lobby");
    }

    fn countdown(&mut self) -> Outcome {
        self.seconds_left = self.seconds_left.saturating_sub(1);
        if self.seconds_left > 0 {
            return Outcome::Updated;
        }

        match self.screen {
            Screen::Active(Activity::Quiz) => {
                // graded on timeout as well, so every game is graded exactly once;
                // whatever was answered still counts
                let outcome = self.grade_quiz();
                self.finish_activity(Activity::Quiz);
                outcome
            }
            Screen::Active(activity) => {
                self.finish_activity(activity);
                Outcome::Updated
            }
            Screen::FactBreak(finished) => {
                match finished.next() {
                    Some(next) => self.enter(Screen::Active(next)),
                    None => self.show_results(),
                }
                Outcome::Updated
            }
            Screen::Lobby | Screen::Results => Outcome::Updated,
        }
    }

    fn grade_quiz(&mut self) -> Outcome {
        match self.quiz.grade() {
            Some(grade) => {
                self.award(grade.points);
                self.participants[0].quiz_correct = grade.correct;
                debug!("quiz graded: {}/{} correct", grade.correct, self.quiz.len());
                Outcome::QuizGraded(grade)
            }
            None => Outcome::Updated,
        }
    }

    fn finish_activity(&mut self, activity: Activity) {
        self.fact_index = (self.fact_index + 1) % self.facts.len();
        self.enter(Screen::FactBreak(activity));
    }

    fn show_results(&mut self) {
        self.winner = results::winner_index(&self.participants);
        self.screen = Screen::Results;
        self.seconds_left = 0;
        debug!("results: winner is {:?}", self.winner().map(|p| p.name));
    }

    fn enter(&mut self, screen: Screen) {
        self.seconds_left = match screen {
            Screen::Active(activity) => {
                for participant in &mut self.participants {
                    participant.activity = activity;
                }
                activity.countdown_secs()
            }
            Screen::FactBreak(_) => FACT_BREAK_SECS,
            Screen::Lobby | Screen::Results => 0,
        };
        self.screen = screen;
        debug!("entered {screen:?} with {}s on the clock", self.seconds_left);
    }

    fn award(&mut self, points: u32) {
        self.participants[0].score += points;
    }
}
