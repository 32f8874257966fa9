/// A multiple-choice question with exactly four options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub text: &'static str,
    pub options: [&'static str; 4],
    pub correct: usize,
}

pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

pub static QUESTIONS: [Question; 8] = [
    Question {
        text: "What is 7 x 8?",
        options: ["54", "56", "58", "62"],
        correct: 1,
    },
    Question {
        text: "What is the capital of Indonesia?",
        options: ["Jakarta", "Bandung", "Surabaya", "Yogyakarta"],
        correct: 0,
    },
    Question {
        text: "Which is the largest planet in the solar system?",
        options: ["Mars", "Venus", "Jupiter", "Saturn"],
        correct: 2,
    },
    Question {
        text: "What does HTML stand for?",
        options: [
            "Hyper Text Markup Language",
            "High Tech Modern Language",
            "Home Tool Markup Language",
            "Hyperlink Text Mode Language",
        ],
        correct: 0,
    },
    Question {
        text: "How many meters are in 1 kilometer?",
        options: ["100", "500", "1000", "10000"],
        correct: 2,
    },
    Question {
        text: "Which is the fastest land animal?",
        options: ["Lion", "Cheetah", "Tiger", "Horse"],
        correct: 1,
    },
    Question {
        text: "Red mixed with blue makes...",
        options: ["Green", "Yellow", "Purple", "Orange"],
        correct: 2,
    },
    Question {
        text: "Which country has the largest population?",
        options: ["USA", "India", "China", "Indonesia"],
        correct: 2,
    },
];

/// Map an answer letter (case-insensitive, surrounding whitespace ignored)
/// to an option index.
pub fn option_index(answer: &str) -> Option<usize> {
    let mut chars = answer.trim().chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    OPTION_LETTERS.iter().position(|&l| l == letter)
}
