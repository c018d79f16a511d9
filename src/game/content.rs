use super::Activity;

#[derive(Debug, PartialEq, Eq)]
pub struct QuizItem {
    pub id: u32,
    pub prompt: &'static str,
    pub choices: &'static [&'static str],
    pub correct: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Fact {
    pub text: &'static str,
    pub icon: &'static str,
}

impl Fact {
    pub fn icon(&self) -> Icon {
        Icon::from_tag(self.icon)
    }
}

#[derive(Debug)]
pub struct BrainstormPrompt {
    pub prompt: &'static str,
    pub example: &'static str,
}

pub static QUIZ_ITEMS: [QuizItem; 5] = [
    QuizItem {
        id: 1,
        prompt: "Which gas is primarily responsible for climate change?",
        choices: &["Oxygen", "Nitrogen", "Carbon Dioxide", "Hydrogen"],
        correct: 2,
    },
    QuizItem {
        id: 2,
        prompt: "What percentage of Earth's water is freshwater?",
        choices: &["1%", "3%", "10%", "25%"],
        correct: 1,
    },
    QuizItem {
        id: 3,
        prompt: "Which of these is the most biodiverse ecosystem?",
        choices: &["Desert", "Tundra", "Rainforest", "Grassland"],
        correct: 2,
    },
    QuizItem {
        id: 4,
        prompt: "How many species go extinct each day due to deforestation?",
        choices: &["10", "50", "150", "1000"],
        correct: 2,
    },
    QuizItem {
        id: 5,
        prompt: "What is the primary cause of ocean acidification?",
        choices: &["Plastic pollution", "Oil spills", "CO₂ absorption", "Overfishing"],
        correct: 2,
    },
];

pub static FACTS: [Fact; 5] = [
    Fact {
        text: "A single tree can absorb up to 48 pounds of CO₂ per year!",
        icon: "Trees",
    },
    Fact {
        text: "The Amazon rainforest produces 20% of the world's oxygen.",
        icon: "Leaf",
    },
    Fact {
        text: "Coral reefs cover less than 1% of the ocean floor but support 25% of marine life.",
        icon: "Waves",
    },
    Fact {
        text: "Bees pollinate one-third of the food we eat!",
        icon: "Sun",
    },
    Fact {
        text: "A single lightning strike can trigger thousands of forest fires each year.",
        icon: "Mountain",
    },
];

pub static BRAINSTORM: BrainstormPrompt = BrainstormPrompt {
    prompt: "Name 3 ways you can help protect nature in your daily life",
    example: "1. Use reusable bags and bottles\n2. Plant native flowers for pollinators\n3. Reduce energy consumption",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Trees,
    Leaf,
    Waves,
    Mountain,
    Sun,
    Moon,
}

impl Icon {
    /// Unknown tags draw as a leaf.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Trees" => Icon::Trees,
            "Leaf" => Icon::Leaf,
            "Waves" => Icon::Waves,
            "Mountain" => Icon::Mountain,
            "Sun" => Icon::Sun,
            "Moon" => Icon::Moon,
            _ => Icon::Leaf,
        }
    }

    pub fn for_activity(activity: Activity) -> Self {
        match activity {
            Activity::Reflex => Icon::Leaf,
            Activity::Quiz => Icon::Trees,
            Activity::Brainstorm => Icon::Waves,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Icon::Trees => "🌳",
            Icon::Leaf => "🍃",
            Icon::Waves => "🌊",
            Icon::Mountain => "⛰️",
            Icon::Sun => "☀️",
            Icon::Moon => "🌙",
        }
    }
}
