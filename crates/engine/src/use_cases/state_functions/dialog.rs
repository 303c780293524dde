//! Dialog-driven state functions: multiple choice and free-text editing.

use std::sync::Arc;

use async_trait::async_trait;
use iobj_domain::{DialogText, NextState, OptionMap};
use iobj_shared::DialogChoice;
use serde::Deserialize;

use super::{InvocationContext, StateFunction, StateFunctionError, DIALOG_TIMEOUT};
use crate::infrastructure::ports::{DialogPort, MultichoiceDialog, PromptDialog, RandomPort};
use crate::stores::DialogVarStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowDialogArgs {
    #[serde(default)]
    dialogs: DialogText,
    #[serde(default)]
    dialog_var: Option<String>,
    /// `message -> nextState`, shown in this order
    options: OptionMap,
}

/// Show a multiple-choice dialog and follow the picked option.
pub struct ShowDialog {
    dialog: Arc<dyn DialogPort>,
    dialog_vars: Arc<DialogVarStore>,
    random: Arc<dyn RandomPort>,
}

impl ShowDialog {
    pub fn new(
        dialog: Arc<dyn DialogPort>,
        dialog_vars: Arc<DialogVarStore>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            dialog,
            dialog_vars,
            random,
        }
    }
}

#[async_trait]
impl StateFunction for ShowDialog {
    fn name(&self) -> &'static str {
        "showDialog"
    }

    fn visible_name(&self) -> &'static str {
        "Show Dialog"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<ShowDialogArgs>() else {
            return Ok(NextState::Error);
        };

        let mut body = args.dialogs.resolve(|len| self.random.pick_index(len));
        if let Some(var) = &args.dialog_var {
            if let Some(stored) = self.dialog_vars.get(&ctx.player_id, &ctx.owner(), var).await {
                body = stored;
            }
        }

        let choices: Vec<DialogChoice> = args
            .options
            .iter()
            .map(|(message, next_state)| DialogChoice::new(next_state, message))
            .collect();

        let reply = self
            .dialog
            .show_multichoice(
                &ctx.player_id,
                MultichoiceDialog {
                    timeout: DIALOG_TIMEOUT,
                    title: ctx.info.visible_name.clone(),
                    body,
                    choices: choices.clone(),
                },
            )
            .await;

        match reply {
            Ok(reply) => match reply.token {
                Some(token) if choices.iter().any(|c| c.token == token) => {
                    Ok(NextState::state(token))
                }
                Some(token) => {
                    tracing::warn!(
                        player_id = %ctx.player_id,
                        token = %token,
                        "Player picked a choice that was not offered in showDialog"
                    );
                    Ok(NextState::Error)
                }
                None => {
                    tracing::warn!(player_id = %ctx.player_id, "Player did not choose in showDialog");
                    Ok(NextState::Error)
                }
            },
            Err(e) => {
                tracing::warn!(player_id = %ctx.player_id, error = %e, "showDialog got no answer");
                Ok(NextState::Error)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditDialogArgs {
    #[serde(default)]
    dialogs: DialogText,
    #[serde(default)]
    dialog_var: Option<String>,
    #[serde(default)]
    button_text: Option<String>,
    next_state: String,
}

/// Ask the player for free text and remember it as a dialog variable.
pub struct EditDialog {
    dialog: Arc<dyn DialogPort>,
    dialog_vars: Arc<DialogVarStore>,
    random: Arc<dyn RandomPort>,
}

impl EditDialog {
    pub fn new(
        dialog: Arc<dyn DialogPort>,
        dialog_vars: Arc<DialogVarStore>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            dialog,
            dialog_vars,
            random,
        }
    }
}

#[async_trait]
impl StateFunction for EditDialog {
    fn name(&self) -> &'static str {
        "editDialog"
    }

    fn visible_name(&self) -> &'static str {
        "Edit Dialog"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<EditDialogArgs>() else {
            return Ok(NextState::Error);
        };

        let body = args.dialogs.resolve(|len| self.random.pick_index(len));
        let reply = self
            .dialog
            .show_prompt(
                &ctx.player_id,
                PromptDialog {
                    timeout: DIALOG_TIMEOUT,
                    title: ctx.info.visible_name.clone(),
                    body,
                    button_text: args.button_text,
                },
            )
            .await;

        match reply {
            Ok(reply) => match reply.msg.filter(|msg| !msg.is_empty()) {
                Some(msg) => {
                    if let Some(var) = &args.dialog_var {
                        self.dialog_vars
                            .set(&ctx.player_id, &ctx.owner(), var, msg)
                            .await;
                    }
                    Ok(NextState::state(args.next_state))
                }
                None => {
                    tracing::warn!(player_id = %ctx.player_id, "Player left editDialog empty");
                    Ok(NextState::Error)
                }
            },
            Err(e) => {
                tracing::warn!(player_id = %ctx.player_id, error = %e, "editDialog got no answer");
                Ok(NextState::Error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::infrastructure::ports::{ChoiceReply, DialogError, MockDialogPort, PromptReply};
    use crate::use_cases::state_functions::test_support::context;
    use serde_json::json;

    fn show_dialog(dialog: MockDialogPort, vars: Arc<DialogVarStore>) -> ShowDialog {
        ShowDialog::new(Arc::new(dialog), vars, Arc::new(FixedRandom(1)))
    }

    #[tokio::test]
    async fn choices_follow_option_order_and_picked_token_wins() {
        let mut dialog = MockDialogPort::new();
        dialog
            .expect_show_multichoice()
            .withf(|player, d| {
                player.as_str() == "alice"
                    && d.title == "Vault Door"
                    && d.body == "b"
                    && d.timeout == DIALOG_TIMEOUT
                    && d.choices
                        == vec![
                            DialogChoice::new("s_open", "Open it"),
                            DialogChoice::new("s_leave", "Walk away"),
                        ]
            })
            .returning(|_, _| {
                Ok(ChoiceReply {
                    token: Some("s_leave".to_string()),
                })
            });

        let sf = show_dialog(dialog, Arc::new(DialogVarStore::default()));
        let ctx = context(
            "showDialog",
            json!({
                "dialogs": ["a", "b"],
                "options": {"Open it": "s_open", "Walk away": "s_leave"}
            }),
        );

        assert_eq!(sf.call(&ctx).await.expect("call"), NextState::state("s_leave"));
    }

    #[tokio::test]
    async fn no_token_is_fsm_error() {
        let mut dialog = MockDialogPort::new();
        dialog
            .expect_show_multichoice()
            .returning(|_, _| Ok(ChoiceReply::default()));

        let sf = show_dialog(dialog, Arc::new(DialogVarStore::default()));
        let ctx = context(
            "showDialog",
            json!({"dialogs": ["a", "b"], "options": {"ok": "s1"}}),
        );

        assert_eq!(sf.call(&ctx).await.expect("call"), NextState::Error);
    }

    #[tokio::test]
    async fn timeout_is_fsm_error() {
        let mut dialog = MockDialogPort::new();
        dialog
            .expect_show_multichoice()
            .returning(|_, _| Err(DialogError::Timeout(60_000)));

        let sf = show_dialog(dialog, Arc::new(DialogVarStore::default()));
        let ctx = context("showDialog", json!({"dialogs": "hi", "options": {"ok": "s1"}}));

        assert_eq!(sf.call(&ctx).await.expect("call"), NextState::Error);
    }

    #[tokio::test]
    async fn unoffered_token_is_fsm_error() {
        let mut dialog = MockDialogPort::new();
        dialog.expect_show_multichoice().returning(|_, _| {
            Ok(ChoiceReply {
                token: Some("s_secret".to_string()),
            })
        });

        let sf = show_dialog(dialog, Arc::new(DialogVarStore::default()));
        let ctx = context("showDialog", json!({"dialogs": "hi", "options": {"ok": "s1"}}));

        assert_eq!(sf.call(&ctx).await.expect("call"), NextState::Error);
    }

    #[tokio::test]
    async fn missing_options_is_fsm_error_without_prompting() {
        let dialog = MockDialogPort::new();
        let sf = show_dialog(dialog, Arc::new(DialogVarStore::default()));
        let ctx = context("showDialog", json!({"dialogs": "hi"}));

        assert_eq!(sf.call(&ctx).await.expect("call"), NextState::Error);
    }

    #[tokio::test]
    async fn edited_text_is_shown_by_later_show_dialog() {
        let vars = Arc::new(DialogVarStore::default());

        let mut prompt = MockDialogPort::new();
        prompt
            .expect_show_prompt()
            .withf(|_, d| d.body == "Write something" && d.button_text.as_deref() == Some("Save"))
            .returning(|_, _| {
                Ok(PromptReply {
                    msg: Some("hello".to_string()),
                })
            });
        let edit = EditDialog::new(Arc::new(prompt), vars.clone(), Arc::new(FixedRandom(0)));
        let edit_ctx = context(
            "editDialog",
            json!({
                "dialogs": "Write something",
                "dialogVar": "x",
                "buttonText": "Save",
                "nextState": "s_saved"
            }),
        );
        assert_eq!(
            edit.call(&edit_ctx).await.expect("call"),
            NextState::state("s_saved")
        );

        let mut show = MockDialogPort::new();
        show.expect_show_multichoice()
            .withf(|_, d| d.body == "hello")
            .returning(|_, _| {
                Ok(ChoiceReply {
                    token: Some("s1".to_string()),
                })
            });
        let sf = show_dialog(show, vars);
        let show_ctx = context(
            "showDialog",
            json!({"dialogs": "default text", "dialogVar": "x", "options": {"ok": "s1"}}),
        );
        assert_eq!(sf.call(&show_ctx).await.expect("call"), NextState::state("s1"));
    }

    #[tokio::test]
    async fn dialog_var_of_another_player_is_not_shown() {
        let vars = Arc::new(DialogVarStore::default());
        vars.set(
            &iobj_domain::PlayerId::from("bob"),
            &iobj_domain::ObjectId::from("vault_door"),
            "x",
            "bob's secret".to_string(),
        )
        .await;

        let mut show = MockDialogPort::new();
        show.expect_show_multichoice()
            .withf(|_, d| d.body == "default text")
            .returning(|_, _| {
                Ok(ChoiceReply {
                    token: Some("s1".to_string()),
                })
            });
        let sf = show_dialog(show, vars);
        let ctx = context(
            "showDialog",
            json!({"dialogs": "default text", "dialogVar": "x", "options": {"ok": "s1"}}),
        );
        assert_eq!(sf.call(&ctx).await.expect("call"), NextState::state("s1"));
    }

    #[tokio::test]
    async fn empty_edit_is_fsm_error_and_stores_nothing() {
        let vars = Arc::new(DialogVarStore::default());
        let mut prompt = MockDialogPort::new();
        prompt.expect_show_prompt().returning(|_, _| {
            Ok(PromptReply {
                msg: Some(String::new()),
            })
        });
        let edit = EditDialog::new(Arc::new(prompt), vars.clone(), Arc::new(FixedRandom(0)));
        let ctx = context(
            "editDialog",
            json!({"dialogs": "?", "dialogVar": "x", "nextState": "s1"}),
        );

        assert_eq!(edit.call(&ctx).await.expect("call"), NextState::Error);
        assert_eq!(
            vars.get(
                &iobj_domain::PlayerId::from("alice"),
                &iobj_domain::ObjectId::from("vault_door"),
                "x"
            )
            .await,
            None
        );
    }
}
