use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use super::content::{QuizItem, QUIZ_ITEMS};
use super::Rejected;

pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub points: u32,
    pub correct: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Finished,
}

#[derive(Debug, Clone)]
pub struct QuizRound {
    items: Vec<&'static QuizItem>,
    // one entry per item id, None until answered
    answers: BTreeMap<u32, Option<usize>>,
    cursor: usize,
    graded: bool,
}

impl Default for QuizRound {
    fn default() -> Self {
        Self::new(QUIZ_ITEMS.iter().collect())
    }
}

impl QuizRound {
    pub fn new(items: Vec<&'static QuizItem>) -> Self {
        let answers = items.iter().map(|item| (item.id, None)).collect();
        Self {
            items,
            answers,
            cursor: 0,
            graded: false,
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut items = QUIZ_ITEMS.iter().collect::<Vec<_>>();
        items.shuffle(rng);
        Self::new(items)
    }

    pub fn items(&self) -> &[&'static QuizItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> &'static QuizItem {
        self.items[self.cursor]
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.items.len()
    }

    pub fn answer_for(&self, item_id: u32) -> Option<usize> {
        self.answers.get(&item_id).copied().flatten()
    }

    pub fn answers(&self) -> &BTreeMap<u32, Option<usize>> {
        &self.answers
    }

    pub fn is_graded(&self) -> bool {
        self.graded
    }

    pub fn select(&mut self, choice: usize) -> Result<(), Rejected> {
        let item = self.current();
        if choice >= item.choices.len() {
            return Err(Rejected::NoSuchOption {
                choice,
                available: item.choices.len(),
            });
        }
        self.answers.insert(item.id, Some(choice));
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Advance, Rejected> {
        if self.answer_for(self.current().id).is_none() {
            return Err(Rejected::NoAnswerSelected);
        }
        if self.is_last() {
            return Ok(Advance::Finished);
        }
        self.cursor += 1;
        Ok(Advance::Next)
    }

    /// Marks every item once; later calls return None.
    pub fn grade(&mut self) -> Option<Grade> {
        if self.graded {
            return None;
        }
        self.graded = true;

        let correct = self
            .items
            .iter()
            .filter(|item| self.answer_for(item.id) == Some(item.correct))
            .count() as u32;

        Some(Grade {
            points: correct * POINTS_PER_CORRECT,
            correct,
        })
    }
}
