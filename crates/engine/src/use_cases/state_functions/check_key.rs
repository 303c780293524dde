//! Prompt the player for a secret and branch on whether it matches.

use std::sync::Arc;

use async_trait::async_trait;
use iobj_domain::{otp, NextState, TotpSecret};
use serde::Deserialize;

use super::{InvocationContext, StateFunction, StateFunctionError, DIALOG_TIMEOUT};
use crate::infrastructure::ports::{ClockPort, DialogPort, PromptDialog};

/// Ask for free text. Any failure to answer counts as no answer.
async fn prompt_for_answer(
    dialog: &dyn DialogPort,
    ctx: &InvocationContext,
    body: String,
) -> Option<String> {
    let reply = dialog
        .show_prompt(
            &ctx.player_id,
            PromptDialog {
                timeout: DIALOG_TIMEOUT,
                title: ctx.info.visible_name.clone(),
                body,
                button_text: None,
            },
        )
        .await;
    match reply {
        Ok(reply) => reply.msg,
        Err(e) => {
            tracing::warn!(
                player_id = %ctx.player_id,
                function = %ctx.function,
                error = %e,
                "Prompt got no answer"
            );
            None
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckKeyArgs {
    next_state: String,
    next_state_incorrect: String,
    #[serde(default)]
    dialog: String,
    key: String,
}

pub struct ShowDialogAndCheckKey {
    dialog: Arc<dyn DialogPort>,
}

impl ShowDialogAndCheckKey {
    pub fn new(dialog: Arc<dyn DialogPort>) -> Self {
        Self { dialog }
    }
}

#[async_trait]
impl StateFunction for ShowDialogAndCheckKey {
    fn name(&self) -> &'static str {
        "showDialogAndCheckKey"
    }

    fn visible_name(&self) -> &'static str {
        "Show Dialog and Check Key"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<CheckKeyArgs>() else {
            return Ok(NextState::Error);
        };

        let answer = prompt_for_answer(self.dialog.as_ref(), ctx, args.dialog).await;
        if answer.as_deref() == Some(args.key.as_str()) {
            Ok(NextState::state(args.next_state))
        } else {
            Ok(NextState::state(args.next_state_incorrect))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckTotpArgs {
    next_state: String,
    next_state_incorrect: String,
    #[serde(default)]
    dialog: String,
    secret: String,
    #[serde(default)]
    otp_window: Option<u32>,
}

pub struct ShowDialogAndCheckTotp {
    dialog: Arc<dyn DialogPort>,
    clock: Arc<dyn ClockPort>,
}

impl ShowDialogAndCheckTotp {
    pub fn new(dialog: Arc<dyn DialogPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self { dialog, clock }
    }
}

#[async_trait]
impl StateFunction for ShowDialogAndCheckTotp {
    fn name(&self) -> &'static str {
        "showDialogAndCheckTOTP"
    }

    fn visible_name(&self) -> &'static str {
        "Show Dialog and Check TOTP"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<CheckTotpArgs>() else {
            return Ok(NextState::Error);
        };
        let secret = match TotpSecret::parse(&args.secret) {
            Ok(secret) => secret,
            Err(e) => {
                tracing::error!(
                    owner = %ctx.info.name,
                    error = %e,
                    "Invalid TOTP secret in showDialogAndCheckTOTP"
                );
                return Ok(NextState::Error);
            }
        };
        let window = args.otp_window.unwrap_or(otp::DEFAULT_WINDOW);
        if window > otp::MAX_WINDOW {
            tracing::error!(
                owner = %ctx.info.name,
                otp_window = window,
                max = otp::MAX_WINDOW,
                "otpWindow too wide in showDialogAndCheckTOTP"
            );
            return Ok(NextState::Error);
        }

        let answer = prompt_for_answer(self.dialog.as_ref(), ctx, args.dialog).await;
        let matched = answer
            .map(|code| otp::verify(&secret, code.trim(), window, self.clock.now()))
            .unwrap_or(false);

        if matched {
            Ok(NextState::state(args.next_state))
        } else {
            Ok(NextState::state(args.next_state_incorrect))
        }
    }
}
