use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::db::types::QuestionType;
use crate::repositories::quizzes::HydratedQuestion;

/// Submissions scoring at or above this percentage pass.
pub(crate) const PASS_THRESHOLD_PERCENT: f64 = 50.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum EvaluateError {
    /// The quiz carries no gradable points, so a percentage cannot be
    /// computed.
    #[error("quiz has no gradable points")]
    ZeroTotalScore,
    /// The answer key marks no option as correct. Under the exact-set
    /// rule an empty submission would otherwise grade as correct, so
    /// such a key is rejected instead of silently matching.
    #[error("question {question_id} has no correct answer options")]
    NoCorrectAnswers { question_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuestionResult {
    pub(crate) question_id: String,
    pub(crate) content: String,
    pub(crate) score: i32,
    pub(crate) is_correct: bool,
    pub(crate) submitted_answer_ids: Vec<String>,
    pub(crate) correct_answer_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EvaluationResult {
    pub(crate) total_questions: usize,
    pub(crate) correct_count: u32,
    pub(crate) wrong_count: u32,
    pub(crate) total_score: f64,
    pub(crate) achieved_score: f64,
    pub(crate) percentage: f64,
    pub(crate) passed: bool,
    pub(crate) question_results: Vec<QuestionResult>,
}

/// Grade one submission against a fully hydrated answer key.
///
/// Pure computation: no I/O, no hidden state, identical inputs always
/// produce identical results. `submitted` maps question id to the
/// learner's selected option ids; a question with no entry is treated
/// as an empty selection, not an error.
///
/// Matching rules per question type:
/// - single choice: correct iff exactly one id was submitted and it is
///   a correct option. Duplicates count toward the size, so `[a, a]`
///   is two selections and therefore wrong.
/// - multiple choice: correct iff the submitted ids form exactly the
///   set of correct options, with order and duplicates ignored.
pub(crate) fn evaluate(
    questions: &[HydratedQuestion],
    submitted: &HashMap<String, Vec<String>>,
) -> Result<EvaluationResult, EvaluateError> {
    static EMPTY: Vec<String> = Vec::new();

    let mut total_score = 0.0_f64;
    let mut achieved_score = 0.0_f64;
    let mut correct_count = 0_u32;
    let mut wrong_count = 0_u32;
    let mut question_results = Vec::with_capacity(questions.len());

    for hydrated in questions {
        let question = &hydrated.question;

        let correct_ids: Vec<String> = hydrated
            .options
            .iter()
            .filter(|option| option.is_correct)
            .map(|option| option.id.clone())
            .collect();

        if correct_ids.is_empty() {
            return Err(EvaluateError::NoCorrectAnswers { question_id: question.id.clone() });
        }

        total_score += f64::from(question.score);

        let submitted_ids = submitted.get(&question.id).unwrap_or(&EMPTY);

        let is_correct = match question.qtype {
            QuestionType::SingleChoice => {
                submitted_ids.len() == 1 && correct_ids.contains(&submitted_ids[0])
            }
            QuestionType::MultipleChoice => {
                let submitted_set: BTreeSet<&str> =
                    submitted_ids.iter().map(String::as_str).collect();
                let correct_set: BTreeSet<&str> = correct_ids.iter().map(String::as_str).collect();
                submitted_set == correct_set
            }
        };

        if is_correct {
            achieved_score += f64::from(question.score);
            correct_count += 1;
        } else {
            wrong_count += 1;
        }

        question_results.push(QuestionResult {
            question_id: question.id.clone(),
            content: question.content.clone(),
            score: question.score,
            is_correct,
            submitted_answer_ids: submitted_ids.clone(),
            correct_answer_ids: correct_ids,
        });
    }

    if total_score == 0.0 {
        return Err(EvaluateError::ZeroTotalScore);
    }

    let percentage = achieved_score / total_score * 100.0;
    let passed = percentage >= PASS_THRESHOLD_PERCENT;

    Ok(EvaluationResult {
        total_questions: questions.len(),
        correct_count,
        wrong_count,
        total_score,
        achieved_score,
        percentage,
        passed,
        question_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;
    use crate::db::models::{AnswerOption, Question};

    fn question(
        id: &str,
        qtype: QuestionType,
        score: i32,
        options: &[(&str, bool)],
    ) -> HydratedQuestion {
        let now = primitive_now_utc();
        HydratedQuestion {
            question: Question {
                id: id.to_string(),
                quiz_id: Some("quiz-1".to_string()),
                content: format!("Question {id}"),
                qtype,
                score,
                position: 0,
                created_at: now,
                updated_at: now,
            },
            options: options
                .iter()
                .enumerate()
                .map(|(index, (option_id, is_correct))| AnswerOption {
                    id: option_id.to_string(),
                    question_id: id.to_string(),
                    content: format!("Option {option_id}"),
                    is_correct: *is_correct,
                    position: index as i32,
                    created_at: now,
                })
                .collect(),
        }
    }

    fn answers(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(question_id, ids)| {
                (question_id.to_string(), ids.iter().map(|id| id.to_string()).collect())
            })
            .collect()
    }

    #[test]
    fn single_choice_correct_selection_scores_full() {
        let questions =
            [question("q1", QuestionType::SingleChoice, 10, &[("a1", true), ("a2", false)])];
        let result = evaluate(&questions, &answers(&[("q1", &["a1"])])).expect("evaluate");

        assert_eq!(result.total_questions, 1);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.wrong_count, 0);
        assert_eq!(result.achieved_score, 10.0);
        assert_eq!(result.percentage, 100.0);
        assert!(result.passed);
        assert!(result.question_results[0].is_correct);
    }

    #[test]
    fn single_choice_extra_selection_is_wrong_even_if_one_is_right() {
        let questions =
            [question("q1", QuestionType::SingleChoice, 10, &[("a1", true), ("a2", false)])];
        let result = evaluate(&questions, &answers(&[("q1", &["a1", "a2"])])).expect("evaluate");

        assert!(!result.question_results[0].is_correct);
        assert_eq!(result.achieved_score, 0.0);
        assert_eq!(result.percentage, 0.0);
        assert!(!result.passed);
    }

    #[test]
    fn single_choice_duplicate_of_correct_id_counts_as_two_selections() {
        let questions =
            [question("q1", QuestionType::SingleChoice, 10, &[("a1", true), ("a2", false)])];
        let result = evaluate(&questions, &answers(&[("q1", &["a1", "a1"])])).expect("evaluate");

        assert!(!result.question_results[0].is_correct);
    }

    #[test]
    fn single_choice_no_selection_is_wrong() {
        let questions =
            [question("q1", QuestionType::SingleChoice, 10, &[("a1", true), ("a2", false)])];
        let result = evaluate(&questions, &HashMap::new()).expect("evaluate");

        assert!(!result.question_results[0].is_correct);
        assert_eq!(result.question_results[0].submitted_answer_ids, Vec::<String>::new());
    }

    #[test]
    fn multiple_choice_exact_set_is_correct() {
        let questions = [question(
            "q1",
            QuestionType::MultipleChoice,
            10,
            &[("a1", true), ("a2", false), ("a3", true)],
        )];
        let result = evaluate(&questions, &answers(&[("q1", &["a3", "a1"])])).expect("evaluate");

        assert!(result.question_results[0].is_correct);
        assert_eq!(result.achieved_score, 10.0);
    }

    #[test]
    fn multiple_choice_subset_is_wrong() {
        let questions = [question(
            "q1",
            QuestionType::MultipleChoice,
            10,
            &[("a1", true), ("a2", false), ("a3", true)],
        )];
        let result = evaluate(&questions, &answers(&[("q1", &["a1"])])).expect("evaluate");

        assert!(!result.question_results[0].is_correct);
        assert_eq!(result.achieved_score, 0.0);
    }

    #[test]
    fn multiple_choice_superset_is_wrong() {
        let questions = [question(
            "q1",
            QuestionType::MultipleChoice,
            10,
            &[("a1", true), ("a2", false), ("a3", true)],
        )];
        let result =
            evaluate(&questions, &answers(&[("q1", &["a1", "a2", "a3"])])).expect("evaluate");

        assert!(!result.question_results[0].is_correct);
    }

    #[test]
    fn multiple_choice_duplicates_are_absorbed() {
        let questions =
            [question("q1", QuestionType::MultipleChoice, 10, &[("a1", true), ("a2", true)])];
        let result =
            evaluate(&questions, &answers(&[("q1", &["a2", "a1", "a2"])])).expect("evaluate");

        assert!(result.question_results[0].is_correct);
    }

    #[test]
    fn half_score_hits_pass_boundary_inclusive() {
        let questions = [
            question("q1", QuestionType::SingleChoice, 10, &[("a1", true), ("a2", false)]),
            question("q2", QuestionType::SingleChoice, 10, &[("b1", true), ("b2", false)]),
        ];
        let result =
            evaluate(&questions, &answers(&[("q1", &["a1"]), ("q2", &["b2"])])).expect("evaluate");

        assert_eq!(result.total_score, 20.0);
        assert_eq!(result.achieved_score, 10.0);
        assert_eq!(result.percentage, 50.0);
        assert!(result.passed);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.wrong_count, 1);
    }

    #[test]
    fn results_follow_quiz_order() {
        let questions = [
            question("q2", QuestionType::SingleChoice, 5, &[("b1", true)]),
            question("q1", QuestionType::SingleChoice, 5, &[("a1", true)]),
        ];
        let result = evaluate(&questions, &HashMap::new()).expect("evaluate");

        let ids: Vec<&str> =
            result.question_results.iter().map(|entry| entry.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q2", "q1"]);
    }

    #[test]
    fn zero_total_score_is_rejected() {
        let questions =
            [question("q1", QuestionType::SingleChoice, 0, &[("a1", true), ("a2", false)])];
        let result = evaluate(&questions, &answers(&[("q1", &["a1"])]));

        assert_eq!(result.unwrap_err(), EvaluateError::ZeroTotalScore);
    }

    #[test]
    fn question_without_correct_options_is_rejected() {
        let questions =
            [question("q1", QuestionType::MultipleChoice, 10, &[("a1", false), ("a2", false)])];
        let result = evaluate(&questions, &HashMap::new());

        assert_eq!(
            result.unwrap_err(),
            EvaluateError::NoCorrectAnswers { question_id: "q1".to_string() }
        );
    }

    #[test]
    fn evaluation_is_idempotent_for_identical_inputs() {
        let questions = [
            question("q1", QuestionType::SingleChoice, 10, &[("a1", true), ("a2", false)]),
            question(
                "q2",
                QuestionType::MultipleChoice,
                15,
                &[("b1", true), ("b2", true), ("b3", false)],
            ),
        ];
        let submitted = answers(&[("q1", &["a2"]), ("q2", &["b1", "b2"])]);

        let first = evaluate(&questions, &submitted).expect("first run");
        let second = evaluate(&questions, &submitted).expect("second run");

        assert_eq!(first, second);
    }

    #[test]
    fn aggregates_are_consistent_with_per_question_results() {
        let questions = [
            question("q1", QuestionType::SingleChoice, 7, &[("a1", true), ("a2", false)]),
            question("q2", QuestionType::SingleChoice, 3, &[("b1", true), ("b2", false)]),
            question("q3", QuestionType::MultipleChoice, 5, &[("c1", true), ("c2", false)]),
        ];
        let result = evaluate(&questions, &answers(&[("q1", &["a1"]), ("q3", &["c1"])]))
            .expect("evaluate");

        let achieved: f64 = result
            .question_results
            .iter()
            .filter(|entry| entry.is_correct)
            .map(|entry| f64::from(entry.score))
            .sum();
        let total: f64 =
            result.question_results.iter().map(|entry| f64::from(entry.score)).sum();

        assert_eq!(result.achieved_score, achieved);
        assert_eq!(result.total_score, total);
        assert!(result.percentage >= 0.0 && result.percentage <= 100.0);
        assert_eq!(result.passed, result.percentage >= PASS_THRESHOLD_PERCENT);
    }
}
