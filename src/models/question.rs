use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A question bank row as stored. `options` holds a JSON array serialized
/// as text, exactly as the import pipeline wrote it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,
    pub grade_level: String,
    pub subject: String,
    pub question_text: String,
    pub options: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub verse_text: Option<String>,
    pub highlight_text: Option<String>,
}

impl Question {
    /// Decode the stored options column for delivery to a client.
    pub fn into_quiz(self) -> Result<QuizQuestion, serde_json::Error> {
        let options: Vec<String> = serde_json::from_str(&self.options)?;
        Ok(QuizQuestion {
            id: self.id,
            question_text: self.question_text,
            options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            verse_text: self.verse_text,
            highlight_text: self.highlight_text,
        })
    }
}

/// A question as delivered by `get_quiz`, with options decoded.
#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_text: Option<String>,
}

/// Insert payload for a question bank row.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub grade_level: String,
    pub subject: String,
    pub question_text: String,
    pub options: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub verse_text: Option<String>,
    pub highlight_text: Option<String>,
}

/// One entry in a question import file. The correct answer is given as an
/// index into `opts`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportQuestion {
    pub q: String,
    pub opts: Vec<String>,
    pub ans: usize,
    #[serde(default)]
    pub exp: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
}

impl ImportQuestion {
    /// Resolve the answer index and serialize options for storage. Returns
    /// `None` when `ans` is out of range for `opts`.
    pub fn into_new(self, grade_level: &str, subject: &str) -> Option<NewQuestion> {
        let correct_answer = self.opts.get(self.ans)?.clone();
        let options = serde_json::to_string(&self.opts).ok()?;
        Some(NewQuestion {
            grade_level: grade_level.to_string(),
            subject: subject.to_string(),
            question_text: self.q,
            options,
            correct_answer,
            explanation: self.exp.filter(|s| !s.is_empty()),
            verse_text: self.text.filter(|s| !s.is_empty()),
            highlight_text: self.highlight.filter(|s| !s.is_empty()),
        })
    }
}
