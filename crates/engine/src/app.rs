//! Application state and composition.

use std::collections::HashSet;
use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::infrastructure::ports::{
    ClockPort, DialogPort, MapPort, ProblemBankRepo, RandomPort, TokenPort, VariableRepo,
};
use crate::stores::DialogVarStore;
use crate::use_cases::state_functions::{
    AnswerProblems, CheckPermission, EditDialog, FlipBoolVar, ShowDialog, ShowDialogAndCheckKey,
    ShowDialogAndCheckTotp, Sleep, Teleport, TestBooleanExpr,
};
use crate::use_cases::{IdentifyPlayer, StateFunctionRegistry, WriteVar};

/// Main application state.
///
/// Holds all repository modules and use cases.
/// Passed to HTTP/WebSocket handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub dialog_vars: Arc<DialogVarStore>,
    /// Keys accepted by the external write endpoint
    api_keys: HashSet<String>,
}

/// Container for the persistent stores.
pub struct Repositories {
    pub variables: Arc<dyn VariableRepo>,
    pub problems: Arc<dyn ProblemBankRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub state_functions: StateFunctionRegistry,
    pub write_var: WriteVar,
    pub identify_player: IdentifyPlayer,
}

/// Everything the engine talks to through a port.
pub struct AppPorts {
    pub variables: Arc<dyn VariableRepo>,
    pub problems: Arc<dyn ProblemBankRepo>,
    pub dialog: Arc<dyn DialogPort>,
    pub tokens: Arc<dyn TokenPort>,
    pub map: Arc<dyn MapPort>,
    pub clock: Arc<dyn ClockPort>,
    pub random: Arc<dyn RandomPort>,
}

impl App {
    pub fn new(
        ports: AppPorts,
        dialog_vars: Arc<DialogVarStore>,
        api_keys: HashSet<String>,
    ) -> Self {
        let state_functions = StateFunctionRegistry::new()
            .with(Arc::new(ShowDialog::new(
                ports.dialog.clone(),
                dialog_vars.clone(),
                ports.random.clone(),
            )))
            .with(Arc::new(EditDialog::new(
                ports.dialog.clone(),
                dialog_vars.clone(),
                ports.random.clone(),
            )))
            .with(Arc::new(ShowDialogAndCheckKey::new(ports.dialog.clone())))
            .with(Arc::new(ShowDialogAndCheckTotp::new(
                ports.dialog.clone(),
                ports.clock.clone(),
            )))
            .with(Arc::new(FlipBoolVar::new(ports.variables.clone())))
            .with(Arc::new(CheckPermission::new(ports.tokens.clone())))
            .with(Arc::new(TestBooleanExpr::new(ports.variables.clone())))
            .with(Arc::new(AnswerProblems::new(
                ports.dialog.clone(),
                ports.problems.clone(),
                ports.random.clone(),
            )))
            .with(Arc::new(Sleep::new()))
            .with(Arc::new(Teleport::new(ports.map.clone())));

        let use_cases = UseCases {
            state_functions,
            write_var: WriteVar::new(ports.variables.clone()),
            identify_player: IdentifyPlayer::new(ports.tokens.clone()),
        };

        Self {
            repositories: Repositories {
                variables: ports.variables,
                problems: ports.problems,
            },
            use_cases,
            dialog_vars,
            api_keys,
        }
    }

    /// Whether `key` may use the external write endpoint.
    ///
    /// Every configured key is compared in constant time.
    pub fn accepts_api_key(&self, key: &str) -> bool {
        let matched = self
            .api_keys
            .iter()
            .fold(subtle::Choice::from(0), |found, candidate| {
                found | candidate.as_bytes().ct_eq(key.as_bytes())
            });
        bool::from(matched)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::{
        MockDialogPort, MockMapPort, MockProblemBankRepo, MockTokenPort, MockVariableRepo,
    };
    use chrono::Utc;

    /// Ports that fail the test if touched, for tests to override.
    pub fn ports() -> AppPorts {
        AppPorts {
            variables: Arc::new(MockVariableRepo::new()),
            problems: Arc::new(MockProblemBankRepo::new()),
            dialog: Arc::new(MockDialogPort::new()),
            tokens: Arc::new(MockTokenPort::new()),
            map: Arc::new(MockMapPort::new()),
            clock: Arc::new(FixedClock(Utc::now())),
            random: Arc::new(FixedRandom(0)),
        }
    }

    pub fn app(ports: AppPorts) -> Arc<App> {
        Arc::new(App::new(
            ports,
            Arc::new(DialogVarStore::default()),
            HashSet::from(["secret2".to_string()]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{app, ports};

    #[test]
    fn every_state_function_is_registered() {
        let app = app(ports());
        let names: Vec<String> = app
            .use_cases
            .state_functions
            .state_functions()
            .into_iter()
            .map(|info| info.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "answerProblems",
                "checkPermission",
                "editDialog",
                "flipBoolVar",
                "showDialog",
                "showDialogAndCheckKey",
                "showDialogAndCheckTOTP",
                "sleep",
                "teleport",
                "testBooleanExpr",
            ]
        );
    }

    #[test]
    fn only_configured_api_keys_are_accepted() {
        let app = app(ports());
        assert!(app.accepts_api_key("secret2"));
        assert!(!app.accepts_api_key("secret3"));
        assert!(!app.accepts_api_key("secret"));
        assert!(!app.accepts_api_key("secret22"));
        assert!(!app.accepts_api_key(""));
    }
}
