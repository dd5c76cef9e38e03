use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::repositories;
use crate::repositories::quizzes::HydratedQuiz;
use crate::services::grading::{self, EvaluationResult};

#[derive(Debug, Error)]
pub(crate) enum SubmitError {
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Quiz not found: {0}")]
    QuizNotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("failed to store submission")]
    Store(#[source] anyhow::Error),
}

/// Resolves the submitting user.
#[async_trait]
pub(crate) trait UserLookup: Send + Sync {
    async fn by_id(&self, user_id: &str) -> anyhow::Result<Option<User>>;
}

/// Resolves a quiz together with all questions and their answer
/// options in one call, so the evaluator never fetches mid-grade.
#[async_trait]
pub(crate) trait QuizLookup: Send + Sync {
    async fn with_questions_and_answers(
        &self,
        quiz_id: &str,
    ) -> anyhow::Result<Option<HydratedQuiz>>;
}

#[derive(Debug, Clone)]
pub(crate) struct NewSubmission {
    pub(crate) user_id: String,
    pub(crate) quiz_id: String,
    pub(crate) score: f64,
    pub(crate) submission_time: PrimitiveDateTime,
}

/// Append-only store for graded submissions. One atomic create per
/// grading call; there is no update path.
#[async_trait]
pub(crate) trait SubmissionStore: Send + Sync {
    async fn create(&self, submission: NewSubmission) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub(crate) struct SubmittedAnswer {
    pub(crate) question_id: String,
    pub(crate) answer_ids: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct SubmissionReceipt {
    pub(crate) submission_id: String,
    pub(crate) user_id: String,
    pub(crate) user_email: String,
    pub(crate) user_full_name: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) submission_time: PrimitiveDateTime,
    pub(crate) evaluation: EvaluationResult,
}

/// Orchestrates one grading call: load user and quiz, evaluate, record
/// the result exactly once. Collaborators are injected so tests can
/// substitute in-memory fakes for the Postgres-backed ones.
#[derive(Clone)]
pub(crate) struct ExamService {
    users: Arc<dyn UserLookup>,
    quizzes: Arc<dyn QuizLookup>,
    submissions: Arc<dyn SubmissionStore>,
}

impl ExamService {
    pub(crate) fn new(
        users: Arc<dyn UserLookup>,
        quizzes: Arc<dyn QuizLookup>,
        submissions: Arc<dyn SubmissionStore>,
    ) -> Self {
        Self { users, quizzes, submissions }
    }

    pub(crate) fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgUserLookup { pool: pool.clone() }),
            Arc::new(PgQuizLookup { pool: pool.clone() }),
            Arc::new(PgSubmissionStore { pool }),
        )
    }

    pub(crate) async fn submit(
        &self,
        user_id: &str,
        quiz_id: &str,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionReceipt, SubmitError> {
        let user = self
            .users
            .by_id(user_id)
            .await
            .map_err(SubmitError::Store)?
            .ok_or_else(|| SubmitError::UserNotFound(user_id.to_string()))?;

        let hydrated = self
            .quizzes
            .with_questions_and_answers(quiz_id)
            .await
            .map_err(SubmitError::Store)?
            .ok_or_else(|| SubmitError::QuizNotFound(quiz_id.to_string()))?;

        if !hydrated.quiz.is_active {
            return Err(SubmitError::Validation("Quiz is not active".to_string()));
        }

        if hydrated.questions.is_empty() {
            return Err(SubmitError::Validation("Quiz has no questions".to_string()));
        }

        let mut submitted: HashMap<String, Vec<String>> = HashMap::with_capacity(answers.len());
        for answer in answers {
            if submitted.insert(answer.question_id.clone(), answer.answer_ids.clone()).is_some() {
                return Err(SubmitError::Validation(format!(
                    "Duplicate answers for question {}",
                    answer.question_id
                )));
            }
        }

        let evaluation = grading::evaluate(&hydrated.questions, &submitted)
            .map_err(|err| SubmitError::Validation(err.to_string()))?;

        let submission_time = primitive_now_utc();
        let submission_id = self
            .submissions
            .create(NewSubmission {
                user_id: user.id.clone(),
                quiz_id: hydrated.quiz.id.clone(),
                score: evaluation.achieved_score,
                submission_time,
            })
            .await
            .map_err(SubmitError::Store)?;

        tracing::info!(
            user_id = %user.id,
            quiz_id = %hydrated.quiz.id,
            submission_id = %submission_id,
            score = evaluation.achieved_score,
            passed = evaluation.passed,
            "Exam submission graded"
        );

        Ok(SubmissionReceipt {
            submission_id,
            user_id: user.id,
            user_email: user.email,
            user_full_name: user.full_name,
            quiz_id: hydrated.quiz.id,
            quiz_title: hydrated.quiz.title,
            submission_time,
            evaluation,
        })
    }
}

struct PgUserLookup {
    pool: PgPool,
}

#[async_trait]
impl UserLookup for PgUserLookup {
    async fn by_id(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        repositories::users::find_by_id(&self.pool, user_id).await.map_err(Into::into)
    }
}

struct PgQuizLookup {
    pool: PgPool,
}

#[async_trait]
impl QuizLookup for PgQuizLookup {
    async fn with_questions_and_answers(
        &self,
        quiz_id: &str,
    ) -> anyhow::Result<Option<HydratedQuiz>> {
        repositories::quizzes::find_with_questions_and_answers(&self.pool, quiz_id)
            .await
            .map_err(Into::into)
    }
}

struct PgSubmissionStore {
    pool: PgPool,
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn create(&self, submission: NewSubmission) -> anyhow::Result<String> {
        let created = repositories::submissions::create(
            &self.pool,
            repositories::submissions::CreateSubmission {
                id: &Uuid::new_v4().to_string(),
                user_id: &submission.user_id,
                quiz_id: &submission.quiz_id,
                score: submission.score,
                submission_time: submission.submission_time,
                created_at: primitive_now_utc(),
            },
        )
        .await?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::db::models::{AnswerOption, Question, Quiz};
    use crate::db::types::{QuestionType, UserRole};
    use crate::repositories::quizzes::HydratedQuestion;

    struct FakeUsers {
        users: Vec<User>,
    }

    #[async_trait]
    impl UserLookup for FakeUsers {
        async fn by_id(&self, user_id: &str) -> anyhow::Result<Option<User>> {
            Ok(self.users.iter().find(|user| user.id == user_id).cloned())
        }
    }

    struct FakeQuizzes {
        quizzes: Vec<HydratedQuiz>,
    }

    #[async_trait]
    impl QuizLookup for FakeQuizzes {
        async fn with_questions_and_answers(
            &self,
            quiz_id: &str,
        ) -> anyhow::Result<Option<HydratedQuiz>> {
            Ok(self.quizzes.iter().find(|hydrated| hydrated.quiz.id == quiz_id).cloned())
        }
    }

    #[derive(Default)]
    struct FakeStore {
        created: Mutex<Vec<NewSubmission>>,
    }

    #[async_trait]
    impl SubmissionStore for FakeStore {
        async fn create(&self, submission: NewSubmission) -> anyhow::Result<String> {
            self.created.lock().unwrap().push(submission);
            Ok("submission-1".to_string())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SubmissionStore for FailingStore {
        async fn create(&self, _submission: NewSubmission) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("store unavailable"))
        }
    }

    fn user(id: &str) -> User {
        let now = primitive_now_utc();
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            hashed_password: "hashed".to_string(),
            full_name: "Test Learner".to_string(),
            role: UserRole::Member,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn quiz(id: &str, is_active: bool, questions: Vec<HydratedQuestion>) -> HydratedQuiz {
        let now = primitive_now_utc();
        HydratedQuiz {
            quiz: Quiz {
                id: id.to_string(),
                title: "Rust Basics".to_string(),
                description: None,
                duration_minutes: 30,
                is_active,
                created_at: now,
                updated_at: now,
            },
            questions,
        }
    }

    fn single_choice_question(id: &str, score: i32, correct: &str, wrong: &str) -> HydratedQuestion {
        let now = primitive_now_utc();
        HydratedQuestion {
            question: Question {
                id: id.to_string(),
                quiz_id: Some("quiz-1".to_string()),
                content: format!("Question {id}"),
                qtype: QuestionType::SingleChoice,
                score,
                position: 0,
                created_at: now,
                updated_at: now,
            },
            options: vec![
                AnswerOption {
                    id: correct.to_string(),
                    question_id: id.to_string(),
                    content: "right".to_string(),
                    is_correct: true,
                    position: 0,
                    created_at: now,
                },
                AnswerOption {
                    id: wrong.to_string(),
                    question_id: id.to_string(),
                    content: "wrong".to_string(),
                    is_correct: false,
                    position: 1,
                    created_at: now,
                },
            ],
        }
    }

    fn service_with(
        quizzes: Vec<HydratedQuiz>,
        store: Arc<dyn SubmissionStore>,
    ) -> ExamService {
        ExamService::new(
            Arc::new(FakeUsers { users: vec![user("user-1")] }),
            Arc::new(FakeQuizzes { quizzes }),
            store,
        )
    }

    fn answer(question_id: &str, ids: &[&str]) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: question_id.to_string(),
            answer_ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn successful_submission_records_exactly_one_row() {
        let store = Arc::new(FakeStore::default());
        let questions = vec![single_choice_question("q1", 10, "a1", "a2")];
        let service = service_with(vec![quiz("quiz-1", true, questions)], store.clone());

        let receipt = service
            .submit("user-1", "quiz-1", &[answer("q1", &["a1"])])
            .await
            .expect("submission succeeds");

        assert_eq!(receipt.submission_id, "submission-1");
        assert_eq!(receipt.user_email, "user-1@example.com");
        assert_eq!(receipt.quiz_title, "Rust Basics");
        assert_eq!(receipt.evaluation.achieved_score, 10.0);
        assert_eq!(receipt.evaluation.percentage, 100.0);
        assert!(receipt.evaluation.passed);

        let created = store.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].user_id, "user-1");
        assert_eq!(created[0].quiz_id, "quiz-1");
        assert_eq!(created[0].score, 10.0);
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_before_any_write() {
        let store = Arc::new(FakeStore::default());
        let questions = vec![single_choice_question("q1", 10, "a1", "a2")];
        let service = service_with(vec![quiz("quiz-1", true, questions)], store.clone());

        let error = service.submit("ghost", "quiz-1", &[]).await.unwrap_err();

        assert!(matches!(error, SubmitError::UserNotFound(id) if id == "ghost"));
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_quiz_is_rejected() {
        let store = Arc::new(FakeStore::default());
        let service = service_with(vec![], store.clone());

        let error = service.submit("user-1", "missing", &[]).await.unwrap_err();

        assert!(matches!(error, SubmitError::QuizNotFound(id) if id == "missing"));
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn quiz_without_questions_is_rejected_before_evaluation() {
        let store = Arc::new(FakeStore::default());
        let service = service_with(vec![quiz("quiz-1", true, vec![])], store.clone());

        let error = service.submit("user-1", "quiz-1", &[]).await.unwrap_err();

        assert!(matches!(error, SubmitError::Validation(message) if message.contains("no questions")));
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn inactive_quiz_is_rejected() {
        let store = Arc::new(FakeStore::default());
        let questions = vec![single_choice_question("q1", 10, "a1", "a2")];
        let service = service_with(vec![quiz("quiz-1", false, questions)], store.clone());

        let error = service.submit("user-1", "quiz-1", &[answer("q1", &["a1"])]).await.unwrap_err();

        assert!(matches!(error, SubmitError::Validation(message) if message.contains("not active")));
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_question_entries_are_rejected() {
        let store = Arc::new(FakeStore::default());
        let questions = vec![single_choice_question("q1", 10, "a1", "a2")];
        let service = service_with(vec![quiz("quiz-1", true, questions)], store.clone());

        let error = service
            .submit("user-1", "quiz-1", &[answer("q1", &["a1"]), answer("q1", &["a2"])])
            .await
            .unwrap_err();

        assert!(matches!(error, SubmitError::Validation(message) if message.contains("Duplicate")));
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unanswered_questions_grade_as_empty_selections() {
        let store = Arc::new(FakeStore::default());
        let questions = vec![
            single_choice_question("q1", 10, "a1", "a2"),
            single_choice_question("q2", 10, "b1", "b2"),
        ];
        let service = service_with(vec![quiz("quiz-1", true, questions)], store.clone());

        let receipt = service
            .submit("user-1", "quiz-1", &[answer("q1", &["a1"])])
            .await
            .expect("submission succeeds");

        assert_eq!(receipt.evaluation.correct_count, 1);
        assert_eq!(receipt.evaluation.wrong_count, 1);
        assert_eq!(receipt.evaluation.percentage, 50.0);
        assert!(receipt.evaluation.passed);
    }

    #[tokio::test]
    async fn degenerate_quiz_surfaces_as_validation_error() {
        let store = Arc::new(FakeStore::default());
        let questions = vec![single_choice_question("q1", 0, "a1", "a2")];
        let service = service_with(vec![quiz("quiz-1", true, questions)], store.clone());

        let error = service.submit("user-1", "quiz-1", &[answer("q1", &["a1"])]).await.unwrap_err();

        assert!(matches!(error, SubmitError::Validation(message) if message.contains("gradable")));
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_surfaces_without_being_swallowed() {
        let questions = vec![single_choice_question("q1", 10, "a1", "a2")];
        let service = service_with(vec![quiz("quiz-1", true, questions)], Arc::new(FailingStore));

        let error = service.submit("user-1", "quiz-1", &[answer("q1", &["a1"])]).await.unwrap_err();

        assert!(matches!(error, SubmitError::Store(_)));
    }

    #[tokio::test]
    async fn resubmission_appends_an_independent_record() {
        let store = Arc::new(FakeStore::default());
        let questions = vec![single_choice_question("q1", 10, "a1", "a2")];
        let service = service_with(vec![quiz("quiz-1", true, questions)], store.clone());

        service.submit("user-1", "quiz-1", &[answer("q1", &["a1"])]).await.expect("first");
        service.submit("user-1", "quiz-1", &[answer("q1", &["a2"])]).await.expect("second");

        let created = store.created.lock().unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].score, 10.0);
        assert_eq!(created[1].score, 0.0);
    }
}
