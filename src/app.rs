//! Application facade: wires the services to one household and keeps the
//! session's current period in step with closures.

use std::sync::Arc;

use tracing::info;

use hogar_config::{Config, ConfigManager};
use hogar_core::{
    format::{render_period_report, FixedMoneyFormatter},
    BudgetService, CloseOutcome, Clock, ClosureService, DocumentStore, ExpenseService,
    HouseholdStore, IncomeService, MembershipService, PeriodReport, Session, SummaryService,
    SystemClock, TaskService,
};
use hogar_domain::{Expense, Income, Period, Record};
use hogar_storage_json::JsonDocumentStore;

use crate::{
    errors::{HogarError, HogarResult},
    session::{PeriodSession, PeriodStorage},
};

/// What bringing the previous period forward did.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub source: Period,
    pub target: Period,
    pub income: Income,
    pub budgets_added: usize,
}

/// Limits and presentation settings taken from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub currency_symbol: String,
    pub recent_expense_limit: usize,
    pub aggregation_expense_limit: usize,
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            currency_symbol: config.currency_symbol.clone(),
            recent_expense_limit: config.recent_expense_limit,
            aggregation_expense_limit: config.aggregation_expense_limit,
            log_filter: config.log_filter.clone(),
        }
    }
}

pub struct HouseholdApp {
    store: HouseholdStore,
    session: PeriodSession,
    settings: AppSettings,
    incomes: IncomeService,
    budgets: BudgetService,
    expenses: ExpenseService,
    closures: ClosureService,
    summary: SummaryService,
    tasks: TaskService,
    members: MembershipService,
}

impl HouseholdApp {
    pub fn new(
        backend: Arc<dyn DocumentStore>,
        household_id: &str,
        clock: Arc<dyn Clock>,
        session: PeriodSession,
        settings: AppSettings,
    ) -> Self {
        let store = HouseholdStore::new(backend, household_id);
        Self {
            incomes: IncomeService::new(store.clone()),
            budgets: BudgetService::new(store.clone()),
            expenses: ExpenseService::new(store.clone(), clock.clone())
                .with_aggregation_limit(settings.aggregation_expense_limit),
            closures: ClosureService::new(store.clone()),
            summary: SummaryService::new(store.clone(), clock.clone())
                .with_aggregation_limit(settings.aggregation_expense_limit),
            tasks: TaskService::new(store.clone(), clock),
            members: MembershipService::new(store.clone()),
            store,
            session,
            settings,
        }
    }

    /// Opens the household named in the configuration, stored as JSON under
    /// the configured data directory.
    pub fn open(manager: ConfigManager) -> HogarResult<Self> {
        let config = manager.load()?;
        Self::open_with_config(manager, config)
    }

    /// Like [`HouseholdApp::open`] with `config` already loaded from `manager`.
    pub fn open_with_config(manager: ConfigManager, config: Config) -> HogarResult<Self> {
        let backend: Arc<dyn DocumentStore> =
            Arc::new(JsonDocumentStore::new(manager.data_dir(&config))?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let storage: Arc<dyn PeriodStorage> = Arc::new(manager);
        let session = PeriodSession::load(storage, clock.clone())?;
        info!(
            household = %config.household_id,
            backend = backend.backend_tag(),
            period = %session.current(),
            "household opened"
        );
        Ok(Self::new(
            backend,
            &config.household_id,
            clock,
            session,
            AppSettings::from(&config),
        ))
    }

    pub fn household_id(&self) -> &str {
        self.store.paths().household_id()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn session(&self) -> &PeriodSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PeriodSession {
        &mut self.session
    }

    pub fn current_period(&self) -> Period {
        self.session.current()
    }

    pub fn incomes(&self) -> &IncomeService {
        &self.incomes
    }

    pub fn budgets(&self) -> &BudgetService {
        &self.budgets
    }

    pub fn expenses(&self) -> &ExpenseService {
        &self.expenses
    }

    pub fn closures(&self) -> &ClosureService {
        &self.closures
    }

    pub fn summary(&self) -> &SummaryService {
        &self.summary
    }

    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }

    pub fn members(&self) -> &MembershipService {
        &self.members
    }

    pub fn money(&self) -> FixedMoneyFormatter {
        FixedMoneyFormatter::new(self.settings.currency_symbol.clone())
    }

    /// Newest expenses, up to the configured listing size.
    pub async fn recent_expenses(&self) -> HogarResult<Vec<Record<Expense>>> {
        Ok(self
            .expenses
            .list_recent(self.settings.recent_expense_limit)
            .await?)
    }

    /// Closes the current period and moves the session to the next one.
    ///
    /// The pointer only moves when the close succeeded.
    pub async fn close_current_period(&mut self) -> HogarResult<CloseOutcome> {
        let outcome = self.closures.close(self.session.current()).await?;
        self.session.set_current(outcome.next)?;
        info!(closed = %outcome.closed, current = %outcome.next, "session advanced");
        Ok(outcome)
    }

    pub async fn reopen_current_period(&self) -> HogarResult<()> {
        Ok(self.closures.reopen(self.session.current()).await?)
    }

    /// Copies the previous period's resolved income into `target` and imports
    /// its budgets for categories `target` lacks.
    pub async fn import_previous(&self, target: Period) -> HogarResult<ImportOutcome> {
        let source = target.previous();
        let income = self.incomes.resolve(source).await?;
        let income = self.incomes.save(target, income).await?;
        let budgets_added = self.budgets.import_from(source, target).await?;
        info!(%source, %target, budgets_added, "previous period brought forward");
        Ok(ImportOutcome {
            source,
            target,
            income,
            budgets_added,
        })
    }

    pub async fn report(&self, period: Period) -> HogarResult<PeriodReport> {
        Ok(self.summary.period_report(period).await?)
    }

    /// The current period's report rendered with the configured currency.
    pub async fn current_report_text(&self) -> HogarResult<String> {
        let report = self.report(self.session.current()).await?;
        Ok(render_period_report(&report, &self.money()))
    }

    /// Rejects sessions whose user is not registered in the household.
    pub async fn ensure_member(&self, session: &Session) -> HogarResult<()> {
        if self.members.is_member(&session.user_id).await? {
            Ok(())
        } else {
            Err(HogarError::NotAMember {
                user_id: session.user_id.clone(),
                household_id: self.household_id().to_string(),
            })
        }
    }
}
