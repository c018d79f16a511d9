pub const MAX_POINTS: u32 = 30;
const CHARS_PER_POINT: usize = 4;

/// Length is the only thing that counts here.
pub fn points_for(text: &str) -> u32 {
    let earned = (text.chars().count() / CHARS_PER_POINT) as u32;
    earned.min(MAX_POINTS)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ideas {
    text: String,
    points: u32,
    submitted: bool,
}

impl Ideas {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn edit(&mut self, text: String) {
        self.points = points_for(&text);
        self.text = text;
    }

    /// Locks the ideas in, handing back the points only the first time.
    pub fn submit(&mut self) -> Option<u32> {
        if self.submitted {
            return None;
        }
        self.submitted = true;
        Some(self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_worth_nothing() {
        assert_eq!(points_for(""), 0);
        assert_eq!(points_for("abc"), 0);
    }

    #[test]
    fn four_characters_per_point() {
        assert_eq!(points_for("abcd"), 1);
        assert_eq!(points_for(&"x".repeat(41)), 10);
    }

    #[test]
    fn capped_at_thirty() {
        assert_eq!(points_for(&"x".repeat(120)), 30);
        assert_eq!(points_for(&"x".repeat(1_000)), 30);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(points_for("🌳🌳🌳🌳"), 1);
    }

    #[test]
    fn edits_update_the_live_value() {
        let mut ideas = Ideas::default();
        ideas.edit("plant native flowers".to_string());
        assert_eq!(ideas.points(), 5);
        ideas.edit(String::new());
        assert_eq!(ideas.points(), 0);
    }

    #[test]
    fn submit_pays_out_once() {
        let mut ideas = Ideas::default();
        ideas.edit("x".repeat(120));
        assert_eq!(ideas.submit(), Some(30));
        assert_eq!(ideas.submit(), None);
        assert!(ideas.is_submitted());
    }
}
