//! Quiz: ask random problems from a bank and branch on the score.

use std::sync::Arc;

use async_trait::async_trait;
use iobj_domain::{DomainError, NextState};
use iobj_shared::DialogChoice;
use serde::Deserialize;
use serde_json::Value;

use super::{InvocationContext, StateFunction, StateFunctionError, DIALOG_TIMEOUT};
use crate::infrastructure::ports::{
    DialogPort, MultichoiceDialog, ProblemBankRepo, RandomPort, RepoError,
};

/// Problem bank used when kwargs name none.
pub const DEFAULT_PROBLEM_FILE: &str = "problems.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerProblemsArgs {
    problems: Value,
    goal_points: f64,
    next_state: String,
    next_state_incorrect: String,
    #[serde(default)]
    file: Option<String>,
}

/// Number of problems to ask: a non-negative JSON integer (or integral float).
fn problem_count(value: &Value) -> Result<usize, DomainError> {
    let count = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    count
        .and_then(|c| usize::try_from(c).ok())
        .ok_or_else(|| DomainError::validation(format!("invalid number of problems: {value}")))
}

pub struct AnswerProblems {
    dialog: Arc<dyn DialogPort>,
    bank: Arc<dyn ProblemBankRepo>,
    random: Arc<dyn RandomPort>,
}

impl AnswerProblems {
    pub fn new(
        dialog: Arc<dyn DialogPort>,
        bank: Arc<dyn ProblemBankRepo>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            dialog,
            bank,
            random,
        }
    }
}

#[async_trait]
impl StateFunction for AnswerProblems {
    fn name(&self) -> &'static str {
        "answerProblems"
    }

    fn visible_name(&self) -> &'static str {
        "Answer Problems"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<AnswerProblemsArgs>() else {
            return Ok(NextState::Error);
        };
        let count = match problem_count(&args.problems) {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(owner = %ctx.info.name, error = %e, "Invalid answerProblems configuration");
                return Ok(NextState::Error);
            }
        };

        let file = args.file.as_deref().unwrap_or(DEFAULT_PROBLEM_FILE);
        let bank = self.bank.load(file).await?;
        if count > bank.len() {
            return Err(RepoError::constraint(format!(
                "{file} holds {} problems but {count} were requested",
                bank.len()
            ))
            .into());
        }

        let order = self.random.permutation(bank.len());
        let mut correct = 0usize;
        for entry in bank.permuted(&order).into_iter().take(count) {
            let choices = entry
                .options
                .iter()
                .map(|option| DialogChoice::new(option.token(), option.display()))
                .collect();
            let reply = self
                .dialog
                .show_multichoice(
                    &ctx.player_id,
                    MultichoiceDialog {
                        timeout: DIALOG_TIMEOUT,
                        title: ctx.info.visible_name.clone(),
                        body: entry.dialogs.clone(),
                        choices,
                    },
                )
                .await;

            match reply {
                Ok(reply) => match reply.token {
                    Some(token) => {
                        if entry.is_correct(&token) {
                            correct += 1;
                        }
                    }
                    None => {
                        tracing::warn!(player_id = %ctx.player_id, "Player did not choose in answerProblems");
                        return Ok(NextState::Error);
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        player_id = %ctx.player_id,
                        error = %e,
                        "answerProblems got no answer"
                    );
                    return Ok(NextState::Error);
                }
            }
        }

        tracing::debug!(player_id = %ctx.player_id, correct, asked = count, "Quiz finished");
        if correct as f64 >= args.goal_points {
            Ok(NextState::state(args.next_state))
        } else {
            Ok(NextState::state(args.next_state_incorrect))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::infrastructure::ports::{
        ChoiceReply, DialogError, MockDialogPort, MockProblemBankRepo, RandomPort,
    };
    use crate::use_cases::state_functions::test_support::context;
    use iobj_domain::{ProblemBank, ProblemEntry, ProblemOption};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Always shuffles into the same, non-identity order.
    struct Shuffled(Vec<usize>);

    impl RandomPort for Shuffled {
        fn pick_index(&self, _len: usize) -> usize {
            0
        }

        fn permutation(&self, len: usize) -> Vec<usize> {
            assert_eq!(len, self.0.len());
            self.0.clone()
        }
    }

    fn entry(question: &str, ans: &str) -> ProblemEntry {
        ProblemEntry {
            dialogs: question.to_string(),
            options: vec![
                ProblemOption::Plain("A. first".to_string()),
                ProblemOption::Plain("B. second".to_string()),
            ],
            ans: ans.to_string(),
        }
    }

    fn bank_of_three() -> MockProblemBankRepo {
        let mut bank = MockProblemBankRepo::new();
        bank.expect_load()
            .withf(|file| file == "problems.json")
            .returning(|_| {
                Ok(ProblemBank::new(vec![
                    entry("q1", "A"),
                    entry("q2", "A"),
                    entry("q3", "A"),
                ]))
            });
        bank
    }

    /// Client that answers correctly for the first `right` questions, then wrongly.
    fn player_getting(right: usize) -> MockDialogPort {
        let asked = Arc::new(AtomicUsize::new(0));
        let mut dialog = MockDialogPort::new();
        dialog
            .expect_show_multichoice()
            .withf(|_, d| {
                d.choices
                    == vec![
                        DialogChoice::new("A", "A. first"),
                        DialogChoice::new("B", "B. second"),
                    ]
            })
            .returning(move |_, _| {
                let n = asked.fetch_add(1, Ordering::SeqCst);
                let token = if n < right { "A" } else { "B" };
                Ok(ChoiceReply {
                    token: Some(token.to_string()),
                })
            });
        dialog
    }

    fn quiz_ctx(problems: Value) -> InvocationContext {
        context(
            "answerProblems",
            json!({
                "problems": problems,
                "goalPoints": 2,
                "nextState": "s_pass",
                "nextStateIncorrect": "s_fail"
            }),
        )
    }

    async fn run(right: usize) -> NextState {
        let sf = AnswerProblems::new(
            Arc::new(player_getting(right)),
            Arc::new(bank_of_three()),
            Arc::new(FixedRandom(0)),
        );
        sf.call(&quiz_ctx(json!(3))).await.expect("call")
    }

    #[tokio::test]
    async fn reaching_goal_points_passes() {
        assert_eq!(run(3).await, NextState::state("s_pass"));
        assert_eq!(run(2).await, NextState::state("s_pass"));
    }

    #[tokio::test]
    async fn missing_goal_points_fails() {
        assert_eq!(run(1).await, NextState::state("s_fail"));
        assert_eq!(run(0).await, NextState::state("s_fail"));
    }

    #[tokio::test]
    async fn unanswered_problem_is_fsm_error() {
        let mut dialog = MockDialogPort::new();
        dialog
            .expect_show_multichoice()
            .times(1)
            .returning(|_, _| Err(DialogError::Timeout(60_000)));
        let sf = AnswerProblems::new(
            Arc::new(dialog),
            Arc::new(bank_of_three()),
            Arc::new(FixedRandom(0)),
        );
        assert_eq!(sf.call(&quiz_ctx(json!(3))).await.expect("call"), NextState::Error);
    }

    #[tokio::test]
    async fn non_integer_problem_count_is_fsm_error() {
        for problems in [json!(2.5), json!(-1), json!("3")] {
            let sf = AnswerProblems::new(
                Arc::new(MockDialogPort::new()),
                Arc::new(MockProblemBankRepo::new()),
                Arc::new(FixedRandom(0)),
            );
            assert_eq!(
                sf.call(&quiz_ctx(problems)).await.expect("call"),
                NextState::Error
            );
        }
    }

    #[test]
    fn integral_float_count_is_accepted() {
        assert_eq!(problem_count(&json!(3.0)).expect("count"), 3);
        assert_eq!(problem_count(&json!(0)).expect("count"), 0);
    }

    #[tokio::test]
    async fn missing_bank_is_a_fault() {
        let mut bank = MockProblemBankRepo::new();
        bank.expect_load()
            .returning(|file| Err(RepoError::not_found("Problem bank", file)));
        let sf = AnswerProblems::new(
            Arc::new(MockDialogPort::new()),
            Arc::new(bank),
            Arc::new(FixedRandom(0)),
        );
        let result = sf.call(&quiz_ctx(json!(1))).await;
        assert!(matches!(result, Err(StateFunctionError::Content(_))));
    }

    #[tokio::test]
    async fn asking_more_than_bank_holds_is_a_fault() {
        let sf = AnswerProblems::new(
            Arc::new(MockDialogPort::new()),
            Arc::new(bank_of_three()),
            Arc::new(FixedRandom(0)),
        );
        let result = sf.call(&quiz_ctx(json!(4))).await;
        assert!(matches!(
            result,
            Err(StateFunctionError::Content(RepoError::ConstraintViolation(_)))
        ));
    }

    #[tokio::test]
    async fn custom_file_is_loaded() {
        let mut bank = MockProblemBankRepo::new();
        bank.expect_load()
            .withf(|file| file == "quiz/hard.json")
            .returning(|_| Ok(ProblemBank::new(vec![entry("q", "B")])));
        let sf = AnswerProblems::new(
            Arc::new(player_getting(1)),
            Arc::new(bank),
            Arc::new(FixedRandom(0)),
        );
        let ctx = context(
            "answerProblems",
            json!({
                "problems": 1,
                "goalPoints": 1,
                "nextState": "s_pass",
                "nextStateIncorrect": "s_fail",
                "file": "quiz/hard.json"
            }),
        );
        assert_eq!(sf.call(&ctx).await.expect("call"), NextState::state("s_fail"));
    }

    #[tokio::test]
    async fn problems_are_asked_in_shuffled_order() {
        let asked = Arc::new(Mutex::new(Vec::new()));
        let mut dialog = MockDialogPort::new();
        let record = asked.clone();
        dialog.expect_show_multichoice().returning(move |_, d| {
            record.lock().expect("lock").push(d.body);
            Ok(ChoiceReply {
                token: Some("A".to_string()),
            })
        });

        let sf = AnswerProblems::new(
            Arc::new(dialog),
            Arc::new(bank_of_three()),
            Arc::new(Shuffled(vec![2, 0, 1])),
        );
        assert_eq!(
            sf.call(&quiz_ctx(json!(2))).await.expect("call"),
            NextState::state("s_pass")
        );
        assert_eq!(*asked.lock().expect("lock"), vec!["q3", "q1"]);
    }
}
