//! Funnel flow
//!
//! Intro → Questionnaire → Analysis → Results → Plans → Checkout. The funnel
//! owns the questionnaire controller and the session store; views drive it
//! and own every delay.

use crate::calculator::{HarrisBenedict, MetricsCalculator};
use crate::config::FunnelConfig;
use crate::error::FunnelError;
use crate::handoff::SessionStore;
use crate::plans::{CheckoutRedirect, PlanTier, PlansPage};
use crate::questionnaire::{Advance, Completion, QuestionnaireController};
use crate::results::ResultsView;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// How long the simulated analysis screen stays up
pub const ANALYSIS_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Intro,
    Questionnaire,
    Analysis,
    Results,
    Plans,
    Checkout,
}

pub struct Funnel<C = HarrisBenedict> {
    stage: Stage,
    controller: QuestionnaireController<C>,
    store: SessionStore,
    config: FunnelConfig,
    completion: Option<Completion>,
    /// Plans page of the current visit; the hand-off is read once per load
    plans: Option<PlansPage>,
}

impl Funnel<HarrisBenedict> {
    pub fn new(config: FunnelConfig, store: SessionStore) -> Self {
        Self::with_calculator(config, store, HarrisBenedict)
    }
}

impl<C: MetricsCalculator> Funnel<C> {
    pub fn with_calculator(config: FunnelConfig, store: SessionStore, calculator: C) -> Self {
        Self {
            stage: Stage::Intro,
            controller: QuestionnaireController::with_calculator(calculator),
            store,
            config,
            completion: None,
            plans: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn controller(&self) -> &QuestionnaireController<C> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut QuestionnaireController<C> {
        &mut self.controller
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Leave the intro. A session that already completed the
    /// questionnaire goes straight to the plans.
    pub fn start(&mut self) -> Stage {
        if self.stage == Stage::Intro {
            self.stage = if self.store.is_completed() {
                Stage::Plans
            } else {
                Stage::Questionnaire
            };
            debug!(stage = ?self.stage, "left intro");
        }
        self.stage
    }

    /// Advance the questionnaire; completion writes the hand-off and moves
    /// to the analysis screen.
    pub fn advance(&mut self) -> Result<Advance, FunnelError> {
        self.expect_stage(Stage::Questionnaire)?;

        let advance = self.controller.advance()?;
        if let Advance::Completed(completion) = &advance {
            self.store
                .record_completion(&completion.profile, &completion.results)?;
            self.completion = Some((**completion).clone());
            self.stage = Stage::Analysis;
            info!(session = %self.store.session_id(), "questionnaire handed off");
        }
        Ok(advance)
    }

    /// Called by the view once `ANALYSIS_DURATION` has elapsed
    pub fn finish_analysis(&mut self) -> Result<ResultsView, FunnelError> {
        self.expect_stage(Stage::Analysis)?;
        let view = self.results_view().ok_or_else(|| {
            FunnelError::ConfigError("analysis finished without results".to_string())
        })?;
        self.stage = Stage::Results;
        Ok(view)
    }

    pub fn results_view(&self) -> Option<ResultsView> {
        self.completion.as_ref().map(|c| ResultsView::new(&c.results))
    }

    /// Load the plans page. Each call is a fresh page load and reads the
    /// hand-off again.
    pub fn show_plans(&mut self) -> Result<&PlansPage, FunnelError> {
        if !matches!(self.stage, Stage::Results | Stage::Plans) {
            return Err(self.wrong_stage(Stage::Results));
        }
        self.stage = Stage::Plans;
        let page = PlansPage::from_session(&self.store, &self.config.checkout);
        Ok(&*self.plans.insert(page))
    }

    /// Check out from the loaded plans page, loading it first if the view
    /// never asked for it
    pub fn checkout(&mut self, tier: PlanTier) -> Result<CheckoutRedirect, FunnelError> {
        self.expect_stage(Stage::Plans)?;
        let (store, config) = (&self.store, &self.config);
        let page = self
            .plans
            .get_or_insert_with(|| PlansPage::from_session(store, &config.checkout));
        let redirect = page.checkout(tier)?;
        self.stage = Stage::Checkout;
        Ok(redirect)
    }

    pub fn into_store(self) -> SessionStore {
        self.store
    }

    fn expect_stage(&self, expected: Stage) -> Result<(), FunnelError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(self.wrong_stage(expected))
        }
    }

    fn wrong_stage(&self, expected: Stage) -> FunnelError {
        FunnelError::WrongStage {
            expected,
            actual: self.stage,
        }
    }
}

impl<C: MetricsCalculator + Clone> Funnel<C> {
    /// Clear the session and begin a fresh questionnaire
    pub fn restart(&mut self) {
        self.store.clear();
        let calculator = self.controller.calculator().clone();
        self.controller = QuestionnaireController::with_calculator(calculator);
        self.completion = None;
        self.plans = None;
        self.stage = Stage::Questionnaire;
        info!(session = %self.store.session_id(), "funnel restarted");
    }
}
