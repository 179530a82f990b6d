use crate::reports::Report;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// One of the 28 selectable dashboard questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Question(u8);

/// Which questions open which report. Several questions deliberately share
/// one report.
const ROUTES: &[(Report, &[u8])] = &[
    (Report::Manufacturing, &[1, 15]),
    (Report::Ux, &[2, 16]),
    (Report::ECommerce, &[3, 17]),
    (Report::Iot, &[4, 18]),
    (Report::Healthcare, &[5, 19]),
    (Report::Telecom, &[6, 20]),
    (Report::Banking, &[7, 21]),
    (Report::Education, &[8, 22]),
    (Report::Logistics, &[9, 23]),
    (Report::Social, &[10, 24, 25]),
    (Report::Hr, &[11]),
    (Report::Weather, &[12, 26]),
    (Report::Stock, &[13, 27]),
    (Report::Traffic, &[14, 28]),
];

impl Question {
    pub const COUNT: u8 = 28;

    pub fn new(number: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&number).then_some(Question(number))
    }

    pub fn all() -> impl Iterator<Item = Question> {
        (1..=Self::COUNT).map(Question)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn label(self) -> String {
        format!("Question {}", self.0)
    }

    /// The report this question opens, if one is routed to it.
    pub fn report(self) -> Option<Report> {
        ROUTES
            .iter()
            .find(|(_, numbers)| numbers.contains(&self.0))
            .map(|(report, _)| *report)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Question {}", self.0)
    }
}

/// One line of the question menu.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct QuestionRow {
    #[serde(rename = "Question")]
    #[tabled(rename = "Question")]
    pub question: String,
    #[serde(rename = "Dashboard")]
    #[tabled(rename = "Dashboard")]
    pub dashboard: String,
    #[serde(rename = "File")]
    #[tabled(rename = "File")]
    pub file: String,
}

pub fn catalog() -> Vec<QuestionRow> {
    Question::all()
        .map(|q| {
            let report = q.report();
            QuestionRow {
                question: q.label(),
                dashboard: report.map_or("-", Report::title).to_string(),
                file: report.map_or("-", |r| r.dataset().file_name()).to_string(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQuestion(pub String);

impl fmt::Display for UnknownQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown question `{}`", self.0)
    }
}

impl std::error::Error for UnknownQuestion {}

impl FromStr for Question {
    type Err = UnknownQuestion;

    /// Accepts `Question N` (any case) or a bare `N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = match trimmed.get(..8) {
            Some(head) if head.eq_ignore_ascii_case("question") => trimmed[8..].trim(),
            _ => trimmed,
        };
        number
            .parse::<u8>()
            .ok()
            .and_then(Question::new)
            .ok_or_else(|| UnknownQuestion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_eight_labels_in_order() {
        let labels: Vec<String> = Question::all().map(|q| q.label()).collect();
        assert_eq!(labels.len(), 28);
        assert_eq!(labels[0], "Question 1");
        assert_eq!(labels[27], "Question 28");
    }

    #[test]
    fn parses_labels_and_numbers() {
        assert_eq!("Question 7".parse::<Question>().unwrap().number(), 7);
        assert_eq!("  question 28 ".parse::<Question>().unwrap().number(), 28);
        assert_eq!("3".parse::<Question>().unwrap().number(), 3);
        assert!("Question 0".parse::<Question>().is_err());
        assert!("Question 29".parse::<Question>().is_err());
        assert!("Question".parse::<Question>().is_err());
        assert!("Quest 3".parse::<Question>().is_err());
        assert!("".parse::<Question>().is_err());
    }

    #[test]
    fn every_question_is_routed_once() {
        for q in Question::all() {
            let hits = ROUTES
                .iter()
                .filter(|(_, numbers)| numbers.contains(&q.number()))
                .count();
            assert_eq!(hits, 1, "{q} routed {hits} times");
        }
    }

    #[test]
    fn aliases_share_a_report() {
        let q = |n| Question::new(n).and_then(Question::report);
        assert_eq!(q(1), Some(Report::Manufacturing));
        assert_eq!(q(15), Some(Report::Manufacturing));
        assert_eq!(q(10), q(25));
        assert_eq!(q(11), Some(Report::Hr));
        assert_eq!(q(28), Some(Report::Traffic));
    }

    #[test]
    fn catalog_names_every_question() {
        let rows = catalog();
        assert_eq!(rows.len(), 28);
        assert_eq!(rows[0].dashboard, "Manufacturing");
        assert_eq!(rows[24].question, "Question 25");
        assert_eq!(rows[24].file, "Social_Media_Performance.csv");
    }
}
