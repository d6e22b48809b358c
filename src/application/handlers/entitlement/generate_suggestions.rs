//! GenerateSuggestionsHandler - the entitlement gate in front of the generator.
//!
//! Order of operations:
//!
//! 1. Validate mode, tone and image (nothing is spent on a bad request).
//!    Text and image are both optional.
//! 2. Load or lazily create the account
//! 3. Premium callers skip the ledger; everyone else must win the atomic debit
//! 4. Call the generator under the policy timeout
//! 5. Parse the output, falling back to a single retry hint
//!
//! The debit commits before the generator is called. A generator failure
//! therefore costs the unit unless `refund_on_upstream_failure` is set.

use std::sync::Arc;

use serde_json::json;
use tokio::time::timeout;

use crate::adapters::analytics::AnalyticsDispatcher;
use crate::domain::analytics::{AnalyticsEvent, AnalyticsEventType};
use crate::domain::entitlement::{
    ClientAccount, EntitlementError, EntitlementPolicy, EntitlementSnapshot,
};
use crate::domain::foundation::{ClientId, Timestamp};
use crate::domain::suggestion::{parse_suggestions, ImageData, Mode, SuggestionContext, Tone};
use crate::ports::{AccountRepository, SuggestionGenerator};

/// Command to generate suggestions.
#[derive(Debug, Clone)]
pub struct GenerateSuggestionsCommand {
    pub client_id: ClientId,
    pub mode: String,
    pub tone: String,
    pub input: Option<String>,
    /// Data URL or bare base64.
    pub image: Option<String>,
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct GenerateSuggestionsResult {
    pub suggestions: Vec<String>,
    /// Post-debit snapshot. `None` for premium callers.
    pub trial: Option<EntitlementSnapshot>,
    pub premium: bool,
    /// True when the generator output was unusable.
    pub fell_back: bool,
}

/// How the request was paid for.
enum Admission {
    Premium,
    Trial(ClientAccount),
}

/// Handler for gated suggestion generation.
pub struct GenerateSuggestionsHandler {
    accounts: Arc<dyn AccountRepository>,
    generator: Arc<dyn SuggestionGenerator>,
    analytics: AnalyticsDispatcher,
    policy: EntitlementPolicy,
}

impl GenerateSuggestionsHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        generator: Arc<dyn SuggestionGenerator>,
        analytics: AnalyticsDispatcher,
        policy: EntitlementPolicy,
    ) -> Self {
        Self {
            accounts,
            generator,
            analytics,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: GenerateSuggestionsCommand,
    ) -> Result<GenerateSuggestionsResult, EntitlementError> {
        // 1. Validate before touching the ledger
        let context = build_context(&cmd)?;

        // 2. Admission
        let admission = self.admit(&cmd.client_id).await?;

        // 3. Generate
        tracing::debug!(
            client_id = %cmd.client_id,
            mode = context.mode.as_str(),
            blank_context = context.is_blank(),
            "Generating suggestions"
        );
        let raw = match self.generate(&context).await {
            Ok(raw) => raw,
            Err(err) => {
                if let Admission::Trial(_) = admission {
                    self.maybe_refund(&cmd.client_id).await;
                }
                return Err(err);
            }
        };

        // 4. Parse or fall back; the unit stays spent either way
        let parsed = parse_suggestions(&raw, self.policy.max_suggestions);
        if parsed.fell_back {
            tracing::warn!(
                client_id = %cmd.client_id,
                generator = self.generator.name(),
                "Generator output unusable, returning fallback"
            );
        }

        let (premium, trial) = match admission {
            Admission::Premium => (true, None),
            Admission::Trial(account) => (
                false,
                Some(EntitlementSnapshot::for_account(
                    &account,
                    &self.policy,
                    Timestamp::now(),
                )),
            ),
        };

        Ok(GenerateSuggestionsResult {
            suggestions: parsed.suggestions,
            trial,
            premium,
            fell_back: parsed.fell_back,
        })
    }

    async fn admit(&self, client_id: &ClientId) -> Result<Admission, EntitlementError> {
        let now = Timestamp::now();
        let account = self.accounts.find_or_create(client_id, now).await?;

        if account.is_premium_active(now) {
            return Ok(Admission::Premium);
        }

        if !account.trial_active(now) {
            return Err(self.paywall(&account, now));
        }

        // Check and decrement happen in one store operation.
        match self.accounts.try_debit_trial(client_id, now).await? {
            Some(debited) => {
                tracing::debug!(
                    client_id = %client_id,
                    messages_left = debited.trial_messages_left,
                    "Trial unit debited"
                );
                Ok(Admission::Trial(debited))
            }
            None => {
                // Lost the race for the last unit, or the window closed meanwhile.
                let current = self
                    .accounts
                    .find(client_id)
                    .await?
                    .unwrap_or(account);
                Err(self.paywall(&current, now))
            }
        }
    }

    fn paywall(&self, account: &ClientAccount, now: Timestamp) -> EntitlementError {
        let snapshot = EntitlementSnapshot::paywall(account, &self.policy, now);
        let reason = account.paywall_reason(now);

        tracing::info!(
            client_id = %account.client_id,
            reason = reason.code(),
            used_count = account.used_count,
            "Paywall shown"
        );

        self.analytics.dispatch(
            AnalyticsEvent::new(AnalyticsEventType::PaywallShown, account.client_id.clone())
                .with_metadata(json!({
                    "reason": reason.code(),
                    "used_count": account.used_count,
                })),
        );

        EntitlementError::trial_expired(snapshot, reason)
    }

    async fn generate(&self, context: &SuggestionContext) -> Result<String, EntitlementError> {
        let budget = self.policy.generator_timeout;

        match timeout(budget, self.generator.generate(context)).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => {
                tracing::error!(
                    generator = self.generator.name(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Suggestion generation failed"
                );
                Err(EntitlementError::upstream(e.to_string()))
            }
            Err(_) => {
                tracing::error!(
                    generator = self.generator.name(),
                    timeout_secs = budget.as_secs(),
                    "Suggestion generation timed out"
                );
                Err(EntitlementError::upstream(format!(
                    "generator timed out after {}s",
                    budget.as_secs()
                )))
            }
        }
    }

    async fn maybe_refund(&self, client_id: &ClientId) {
        if !self.policy.refund_on_upstream_failure {
            return;
        }

        let result = self
            .accounts
            .credit_trial(client_id, self.policy.trial_allowance, Timestamp::now())
            .await;

        match result {
            Ok(_) => tracing::info!(client_id = %client_id, "Trial unit refunded after upstream failure"),
            Err(e) => tracing::warn!(client_id = %client_id, error = %e, "Trial refund failed"),
        }
    }
}

fn build_context(cmd: &GenerateSuggestionsCommand) -> Result<SuggestionContext, EntitlementError> {
    let mode: Mode = cmd.mode.parse()?;
    let tone: Tone = cmd.tone.parse()?;
    let image = cmd
        .image
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(ImageData::new)
        .transpose()?;

    Ok(SuggestionContext::new(mode, tone, cmd.input.clone(), image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockSuggestionGenerator;
    use crate::adapters::memory::{InMemoryAccountRepository, InMemoryAnalyticsSink};
    use crate::domain::entitlement::{EntitlementState, PaywallReason};
    use crate::domain::suggestion::FALLBACK_SUGGESTION;
    use crate::ports::GeneratorError;
    use std::time::Duration;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        accounts: Arc<InMemoryAccountRepository>,
        generator: MockSuggestionGenerator,
        sink: Arc<InMemoryAnalyticsSink>,
        policy: EntitlementPolicy,
    }

    impl Fixture {
        fn new(generator: MockSuggestionGenerator) -> Self {
            Self {
                accounts: Arc::new(InMemoryAccountRepository::new()),
                generator,
                sink: Arc::new(InMemoryAnalyticsSink::new()),
                policy: EntitlementPolicy::default(),
            }
        }

        fn with_policy(mut self, policy: EntitlementPolicy) -> Self {
            self.policy = policy;
            self
        }

        fn handler(&self) -> GenerateSuggestionsHandler {
            GenerateSuggestionsHandler::new(
                self.accounts.clone(),
                Arc::new(self.generator.clone()),
                AnalyticsDispatcher::new(self.sink.clone()),
                self.policy.clone(),
            )
        }

        async fn start_trial(&self) {
            self.accounts
                .start_trial(&client(), &self.policy, Timestamp::now())
                .await
                .unwrap();
        }

        async fn account(&self) -> ClientAccount {
            self.accounts.find(&client()).await.unwrap().unwrap()
        }
    }

    fn client() -> ClientId {
        ClientId::new("client_abc").unwrap()
    }

    fn command() -> GenerateSuggestionsCommand {
        GenerateSuggestionsCommand {
            client_id: client(),
            mode: "reply".to_string(),
            tone: "casual".to_string(),
            input: Some("oi, sumida".to_string()),
            image: None,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Gate Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn new_client_hits_paywall_without_implicit_trial() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());

        let err = fixture.handler().handle(command()).await.unwrap_err();

        match err {
            EntitlementError::TrialExpired { snapshot, reason } => {
                assert_eq!(snapshot.messages_left, Some(0));
                assert_eq!(snapshot.used_count, Some(0));
                assert_eq!(reason, PaywallReason::NotStarted);
            }
            other => panic!("expected TrialExpired, got {:?}", other),
        }
        assert_eq!(fixture.generator.call_count(), 0);
        // The zero-allowance record was created lazily.
        assert_eq!(fixture.account().await.trial_messages_left, 0);
    }

    #[tokio::test]
    async fn trial_allows_two_generations_then_paywall() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());
        fixture.start_trial().await;
        let handler = fixture.handler();

        let first = handler.handle(command()).await.unwrap();
        let second = handler.handle(command()).await.unwrap();
        let third = handler.handle(command()).await.unwrap_err();

        assert_eq!(first.trial.unwrap().messages_left, Some(1));
        assert_eq!(second.trial.unwrap().messages_left, Some(0));
        assert_eq!(third.code(), "trial_exhausted");
        assert_eq!(fixture.generator.call_count(), 2);

        let account = fixture.account().await;
        assert_eq!(account.trial_messages_left, 0);
        assert_eq!(account.used_count, 2);
    }

    #[tokio::test]
    async fn premium_skips_ledger() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());
        let now = Timestamp::now();
        let mut account = ClientAccount::unclaimed(client(), now);
        account.grant_premium(now.add_days(7), None, None, now);
        fixture.accounts.insert(account).await;

        let result = fixture.handler().handle(command()).await.unwrap();

        assert!(result.premium);
        assert!(result.trial.is_none());
        assert_eq!(fixture.account().await.used_count, 0);
    }

    #[tokio::test]
    async fn lapsed_premium_falls_back_to_trial_rules() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());
        let now = Timestamp::now();
        let mut account = ClientAccount::unclaimed(client(), now);
        account.is_premium = true;
        account.premium_until = Some(now.add_secs(-3600));
        fixture.accounts.insert(account).await;

        let err = fixture.handler().handle(command()).await.unwrap_err();

        assert_eq!(err.code(), "trial_expired");
    }

    #[tokio::test]
    async fn elapsed_window_is_trial_expired() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());
        let now = Timestamp::now();
        let mut account = ClientAccount::unclaimed(client(), now);
        account.start_trial(&EntitlementPolicy::default(), now.add_days(-3));
        fixture.accounts.insert(account).await;

        let err = fixture.handler().handle(command()).await.unwrap_err();

        match err {
            EntitlementError::TrialExpired { snapshot, reason } => {
                assert_eq!(reason, PaywallReason::Expired);
                assert_eq!(snapshot.state, EntitlementState::Expired);
                assert_eq!(snapshot.messages_left, Some(0));
            }
            other => panic!("expected TrialExpired, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn concurrent_requests_for_last_unit_admit_exactly_one() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());
        let now = Timestamp::now();
        let mut account = ClientAccount::unclaimed(client(), now);
        account.start_trial(&EntitlementPolicy::default(), now);
        account.trial_messages_left = 1;
        fixture.accounts.insert(account).await;
        let handler = Arc::new(fixture.handler());

        let a = tokio::spawn({
            let handler = handler.clone();
            async move { handler.handle(command()).await }
        });
        let b = tokio::spawn({
            let handler = handler.clone();
            async move { handler.handle(command()).await }
        });
        let results = [a.await.unwrap(), b.await.unwrap()];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let paywalls = results
            .iter()
            .filter(|r| matches!(r, Err(EntitlementError::TrialExpired { .. })))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(paywalls, 1);
        assert_eq!(fixture.account().await.trial_messages_left, 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Validation Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalid_mode_is_rejected_before_debit() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());
        fixture.start_trial().await;

        let mut cmd = command();
        cmd.mode = "stalk".to_string();
        let err = fixture.handler().handle(cmd).await.unwrap_err();

        assert_eq!(err.code(), "invalid_mode");
        assert_eq!(fixture.account().await.trial_messages_left, 2);
    }

    #[tokio::test]
    async fn invalid_tone_is_rejected() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());
        let mut cmd = command();
        cmd.tone = "rude".to_string();

        let err = fixture.handler().handle(cmd).await.unwrap_err();

        assert_eq!(err.code(), "invalid_tone");
    }

    fn blank_command() -> GenerateSuggestionsCommand {
        GenerateSuggestionsCommand {
            input: None,
            image: None,
            ..command()
        }
    }

    #[tokio::test]
    async fn blank_context_from_new_client_hits_paywall() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());

        let err = fixture.handler().handle(blank_command()).await.unwrap_err();

        match err {
            EntitlementError::TrialExpired { snapshot, .. } => {
                assert_eq!(snapshot.messages_left, Some(0));
            }
            other => panic!("expected TrialExpired, got {:?}", other),
        }
        assert_eq!(fixture.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn blank_context_is_generated_during_trial() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());
        fixture.start_trial().await;

        let mut cmd = blank_command();
        cmd.input = Some("   ".to_string());
        let result = fixture.handler().handle(cmd).await.unwrap();

        assert!(!result.premium);
        assert_eq!(result.trial.unwrap().messages_left, Some(1));
        let calls = fixture.generator.calls();
        assert!(calls[0].is_blank());
    }

    #[tokio::test]
    async fn image_only_request_is_accepted() {
        let fixture = Fixture::new(MockSuggestionGenerator::new());
        fixture.start_trial().await;
        let mut cmd = command();
        cmd.input = None;
        cmd.image = Some("aGVsbG8=".to_string());

        fixture.handler().handle(cmd).await.unwrap();

        let calls = fixture.generator.calls();
        assert_eq!(
            calls[0].image.as_ref().unwrap().as_data_url(),
            "data:image/jpeg;base64,aGVsbG8="
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Generator Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn upstream_failure_spends_unit_by_default() {
        let fixture = Fixture::new(
            MockSuggestionGenerator::new().with_error(GeneratorError::Unavailable("503".into())),
        );
        fixture.start_trial().await;

        let err = fixture.handler().handle(command()).await.unwrap_err();

        assert_eq!(err.code(), "upstream_error");
        assert_eq!(fixture.account().await.trial_messages_left, 1);
    }

    #[tokio::test]
    async fn upstream_failure_refunds_when_enabled() {
        let fixture = Fixture::new(
            MockSuggestionGenerator::new().with_error(GeneratorError::RateLimited),
        )
        .with_policy(EntitlementPolicy {
            refund_on_upstream_failure: true,
            ..EntitlementPolicy::default()
        });
        fixture.start_trial().await;

        let err = fixture.handler().handle(command()).await.unwrap_err();

        assert_eq!(err.code(), "upstream_error");
        let account = fixture.account().await;
        assert_eq!(account.trial_messages_left, 2);
        assert_eq!(account.used_count, 1);
    }

    #[tokio::test]
    async fn generator_timeout_is_upstream_error() {
        let fixture = Fixture::new(
            MockSuggestionGenerator::new().with_delay(Duration::from_millis(200)),
        )
        .with_policy(EntitlementPolicy {
            generator_timeout: Duration::from_millis(20),
            ..EntitlementPolicy::default()
        });
        fixture.start_trial().await;

        let err = fixture.handler().handle(command()).await.unwrap_err();

        assert_eq!(err.code(), "upstream_error");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unparseable_output_returns_fallback_and_counts() {
        let fixture = Fixture::new(MockSuggestionGenerator::new().with_response("not json at all"));
        fixture.start_trial().await;

        let result = fixture.handler().handle(command()).await.unwrap();

        assert!(result.fell_back);
        assert_eq!(result.suggestions, vec![FALLBACK_SUGGESTION.to_string()]);
        assert_eq!(fixture.account().await.used_count, 1);
    }

    #[tokio::test]
    async fn suggestions_are_capped() {
        let fixture = Fixture::new(
            MockSuggestionGenerator::new().with_response(r#"["a","b","c","d","e","f"]"#),
        );
        fixture.start_trial().await;

        let result = fixture.handler().handle(command()).await.unwrap();

        assert_eq!(result.suggestions.len(), 4);
    }
}
