use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use a11y_checklist::browser::launch_browser;
use a11y_checklist::config::{Config, EvaluationMode, FailurePolicy};
use a11y_checklist::error::{AppError, ConfigError, OracleError};
use a11y_checklist::infrastructure::JsExecutor;
use a11y_checklist::models::{
    OutcomeStatus, PageContext, Rule, RuleSet, NO_EVALUATION_PRODUCED, REFERENCE_RULES,
};
use a11y_checklist::orchestrator::{App, EvaluationOptions, RuleEvaluator, Target};
use a11y_checklist::report::NO_REPORT_PLACEHOLDER;
use a11y_checklist::services::{Oracle, OracleRequest, SnapshotService};
use a11y_checklist::utils::init_logging;
use tokio_test::{assert_err, assert_ok};

const URL: &str = "https://example.com/";

/// 脚本化的推理服务：按提示词中的规则条款选择响应和延迟
#[derive(Default)]
struct ScriptedOracle {
    responses: HashMap<u32, Result<Option<String>, String>>,
    delays: HashMap<u32, u64>,
    stalled: Vec<u32>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedOracle {
    fn respond(mut self, rule_id: u32, text: impl Into<String>) -> Self {
        self.responses.insert(rule_id, Ok(Some(text.into())));
        self
    }

    fn respond_empty(mut self, rule_id: u32) -> Self {
        self.responses.insert(rule_id, Ok(None));
        self
    }

    fn fail(mut self, rule_id: u32, message: &str) -> Self {
        self.responses.insert(rule_id, Err(message.to_string()));
        self
    }

    /// 这条规则的调用永远不返回
    fn stall(mut self, rule_id: u32) -> Self {
        self.stalled.push(rule_id);
        self
    }

    fn delay(mut self, rule_id: u32, millis: u64) -> Self {
        self.delays.insert(rule_id, millis);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 单条规则的提示词返回规则 ID，整份清单的提示词返回 0
    fn rule_for(prompt: &str) -> u32 {
        let matched: Vec<u32> = REFERENCE_RULES
            .iter()
            .filter(|rule| prompt.contains(rule.instruction))
            .map(|rule| rule.id)
            .collect();
        match matched.as_slice() {
            [id] => *id,
            _ => 0,
        }
    }
}

impl Oracle for ScriptedOracle {
    async fn complete(&self, request: OracleRequest) -> Result<Option<String>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let rule_id = Self::rule_for(&request.prompt);
        if self.stalled.contains(&rule_id) {
            return std::future::pending().await;
        }
        let delay = self.delays.get(&rule_id).copied().unwrap_or(0);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(&rule_id) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(OracleError::ApiCallFailed {
                model: request.model,
                message: message.clone(),
            }),
            None => Ok(Some(well_formed(rule_id))),
        }
    }
}

fn well_formed(rule_id: u32) -> String {
    format!(
        "## Evaluation Report\nRule {id} passes on this page.\n\n## Playwright Test\n```typescript\ntest('rule {id}', async ({{ page }}) => {{\n  await expect(page.locator('body')).toBeVisible();\n}});\n```\n",
        id = rule_id
    )
}

fn context() -> PageContext {
    PageContext::new(
        URL,
        "<body><img src=\"a.png\"><button></button></body>",
        "{\"nodes\":[]}",
    )
}

fn rules(ids: &[u32]) -> Vec<Rule> {
    let reference = RuleSet::reference();
    ids.iter()
        .map(|id| reference.select_by_id(*id).unwrap())
        .collect()
}

fn options(mode: EvaluationMode, policy: FailurePolicy, max_concurrent: usize) -> EvaluationOptions {
    EvaluationOptions {
        model: "fake-model".to_string(),
        mode,
        failure_policy: policy,
        max_concurrent_rules: max_concurrent,
        ..EvaluationOptions::default()
    }
}

fn per_rule(oracle: ScriptedOracle) -> RuleEvaluator<Arc<ScriptedOracle>> {
    RuleEvaluator::new(
        Arc::new(oracle),
        options(EvaluationMode::PerRule, FailurePolicy::Placeholder, 0),
    )
}

fn heading_count(report: &str) -> usize {
    report.lines().filter(|line| line.starts_with("### ")).count()
}

#[tokio::test]
async fn test_three_well_formed_rules() {
    let evaluator = per_rule(ScriptedOracle::default());
    let selected = rules(&[1, 2, 3]);

    let run = assert_ok!(evaluator.evaluate(&selected, &context()).await);
    let merged = &run.merged;

    assert_eq!(heading_count(&merged.combined_report), 3);
    let first = merged.combined_report.find("### Rule 1:").unwrap();
    let second = merged.combined_report.find("### Rule 2:").unwrap();
    let third = merged.combined_report.find("### Rule 3:").unwrap();
    assert!(first < second && second < third);

    let script = &merged.combined_test_script;
    assert_eq!(script.matches("test.beforeEach").count(), 1);
    assert!(script.contains("page.goto(\"https://example.com/\")"));
    assert_eq!(script.matches("// Test cases for Rule").count(), 3);
    assert_eq!(merged.tests_extracted, 3);
    assert_eq!(run.answered, 3);
    assert_eq!(run.requests, 3);
    assert_eq!(evaluator.oracle().calls(), 3);
}

#[tokio::test]
async fn test_reverse_completion_order_gives_identical_output() {
    let selected = rules(&[1, 2, 3, 4]);

    let in_order = per_rule(ScriptedOracle::default())
        .evaluate(&selected, &context())
        .await
        .unwrap();

    // 第一条规则最晚完成
    let reversed = per_rule(
        ScriptedOracle::default()
            .delay(1, 80)
            .delay(2, 60)
            .delay(3, 40)
            .delay(4, 20),
    )
    .evaluate(&selected, &context())
    .await
    .unwrap();

    let shuffled = per_rule(
        ScriptedOracle::default()
            .delay(1, 30)
            .delay(2, 70)
            .delay(3, 10)
            .delay(4, 50),
    )
    .evaluate(&selected, &context())
    .await
    .unwrap();

    assert_eq!(in_order.merged, reversed.merged);
    assert_eq!(in_order.merged, shuffled.merged);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let evaluator = per_rule(ScriptedOracle::default().respond_empty(2));
    let selected = rules(&[1, 2, 5]);
    let ctx = context();

    let first = evaluator.evaluate(&selected, &ctx).await.unwrap();
    let second = evaluator.evaluate(&selected, &ctx).await.unwrap();

    assert_eq!(first.merged.to_markdown(), second.merged.to_markdown());
}

#[tokio::test]
async fn test_empty_response_uses_placeholder() {
    let evaluator = per_rule(ScriptedOracle::default().respond_empty(2));
    let selected = rules(&[1, 2, 3]);

    let run = evaluator.evaluate(&selected, &context()).await.unwrap();
    let report = &run.merged.combined_report;
    let script = &run.merged.combined_test_script;

    assert_eq!(heading_count(report), 3);
    let rule_two = report.split("### Rule 2:").nth(1).unwrap();
    let rule_two = rule_two.split("### ").next().unwrap();
    assert!(rule_two.contains(NO_REPORT_PLACEHOLDER));

    assert!(script.contains("// No test generated for Rule 2:"));
    assert!(script.contains("// Test cases for Rule 1:"));
    assert!(script.contains("// Test cases for Rule 3:"));
    assert_eq!(run.merged.tests_extracted, 2);
    assert_eq!(run.answered, 2);
}

#[tokio::test]
async fn test_response_without_markers_uses_placeholder() {
    let evaluator = per_rule(ScriptedOracle::default().respond(4, "Looks fine to me."));
    let selected = rules(&[4]);

    let run = evaluator.evaluate(&selected, &context()).await.unwrap();

    assert!(run.merged.combined_report.contains(NO_REPORT_PLACEHOLDER));
    assert!(!run.merged.has_tests());
    assert!(run.merged.combined_test_script.contains("test.describe("));
}

#[tokio::test]
async fn test_failed_call_becomes_placeholder_by_default() {
    let evaluator = per_rule(ScriptedOracle::default().fail(3, "quota exceeded"));
    let selected = rules(&[1, 3]);

    let outcomes = evaluator.run_all(&selected, &context()).await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_answered());
    assert_eq!(outcomes[1].response, NO_EVALUATION_PRODUCED);

    let run = evaluator.evaluate(&selected, &context()).await.unwrap();
    assert_eq!(heading_count(&run.merged.combined_report), 2);
    assert!(run
        .merged
        .combined_test_script
        .contains("// No test generated for Rule 3:"));
}

#[tokio::test]
async fn test_fail_batch_policy_surfaces_error() {
    let evaluator = RuleEvaluator::new(
        ScriptedOracle::default().fail(3, "quota exceeded"),
        options(EvaluationMode::PerRule, FailurePolicy::FailBatch, 0),
    );
    let selected = rules(&[1, 2, 3]);

    let result = evaluator.evaluate(&selected, &context()).await;
    let err = assert_err!(result);
    assert!(matches!(err, OracleError::RuleFailed { rule_id: 3, .. }));
}

#[tokio::test]
async fn test_single_rule_from_reference_set() {
    let evaluator = per_rule(ScriptedOracle::default());
    let selected = RuleSet::reference().select(Some(1)).unwrap();

    let run = evaluator
        .evaluate(selected.rules(), &context())
        .await
        .unwrap();

    assert_eq!(evaluator.oracle().calls(), 1);
    assert_eq!(heading_count(&run.merged.combined_report), 1);
    assert!(run
        .merged
        .combined_report
        .contains("### Rule 1: Images missing alt attributes"));
}

fn app_config() -> Config {
    Config {
        llm_api_key: Some("fake-key".to_string()),
        ..Config::default()
    }
}

fn launch_target() -> Target {
    Target::Launch {
        url: URL.to_string(),
    }
}

#[test]
fn test_unknown_rule_fails_before_any_call() {
    let oracle = Arc::new(ScriptedOracle::default());

    let result = App::new(app_config(), Arc::clone(&oracle), Some(42), launch_target(), false);

    let err = result.err().expect("未知规则应该被拒绝");
    assert!(matches!(err, AppError::Config(ConfigError::RuleNotFound { id: 42 })));
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn test_missing_api_key_fails_before_any_call() {
    let oracle = Arc::new(ScriptedOracle::default());

    let result = App::new(Config::default(), Arc::clone(&oracle), None, launch_target(), false);

    let err = result.err().expect("缺少 API Key 应该被拒绝");
    assert!(matches!(err, AppError::Config(ConfigError::MissingApiKey)));
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn test_app_selects_requested_rule() {
    let app = assert_ok!(App::new(
        app_config(),
        ScriptedOracle::default(),
        Some(3),
        launch_target(),
        false
    ));
    assert_eq!(app.rules().ids(), vec![3]);
    assert_eq!(app.oracle().calls(), 0);
}

#[tokio::test]
async fn test_stalled_rule_does_not_block_batch() {
    let evaluator = RuleEvaluator::new(
        ScriptedOracle::default().stall(2),
        EvaluationOptions {
            invocation_timeout: Duration::from_millis(200),
            ..options(EvaluationMode::PerRule, FailurePolicy::Placeholder, 0)
        },
    );
    let selected = rules(&[1, 2, 3]);

    let run = tokio::time::timeout(
        Duration::from_secs(5),
        evaluator.evaluate(&selected, &context()),
    )
    .await
    .expect("一条卡住的规则不应阻塞整批评估")
    .unwrap();

    assert_eq!(heading_count(&run.merged.combined_report), 3);
    assert_eq!(run.answered, 2);
    assert!(matches!(
        run.statuses[1],
        (ref heading, OutcomeStatus::Failed(_)) if heading.starts_with("Rule 2:")
    ));
    assert!(run
        .merged
        .combined_test_script
        .contains("// No test generated for Rule 2:"));
}

#[tokio::test]
async fn test_stalled_rule_fails_batch_when_configured() {
    let evaluator = RuleEvaluator::new(
        ScriptedOracle::default().stall(2),
        EvaluationOptions {
            invocation_timeout: Duration::from_millis(200),
            ..options(EvaluationMode::PerRule, FailurePolicy::FailBatch, 0)
        },
    );

    let err = assert_err!(evaluator.evaluate(&rules(&[1, 2, 3]), &context()).await);
    match err {
        OracleError::RuleFailed { rule_id, source } => {
            assert_eq!(rule_id, 2);
            assert!(matches!(*source, OracleError::Timeout { .. }));
        }
        other => panic!("应该是规则超时: {}", other),
    }
}

#[tokio::test]
async fn test_combined_mode_sends_one_request() {
    let combined_response = "## Evaluation Report\nAll checks reviewed.\n\n## Playwright Test\n```typescript\ntest('checklist', async ({ page }) => {});\n```";
    let oracle = ScriptedOracle::default().respond(0, combined_response);
    let evaluator = RuleEvaluator::new(
        oracle,
        options(EvaluationMode::Combined, FailurePolicy::Placeholder, 0),
    );
    let selected = rules(&[1, 2, 3]);

    let run = evaluator.evaluate(&selected, &context()).await.unwrap();

    assert_eq!(evaluator.oracle().calls(), 1);
    assert_eq!(run.requests, 1);
    assert_eq!(heading_count(&run.merged.combined_report), 1);
    assert!(run
        .merged
        .combined_report
        .contains("### Rules 1, 2, 3: Combined checklist"));
    assert!(run.merged.has_tests());
}

#[tokio::test]
async fn test_concurrency_limit_caps_in_flight_calls() {
    let mut oracle = ScriptedOracle::default();
    for id in 1..=8 {
        oracle = oracle.delay(id, 20);
    }
    let evaluator = RuleEvaluator::new(
        oracle,
        options(EvaluationMode::PerRule, FailurePolicy::Placeholder, 2),
    );

    let run = evaluator
        .evaluate(&REFERENCE_RULES, &context())
        .await
        .unwrap();

    assert_eq!(heading_count(&run.merged.combined_report), 8);
    assert_eq!(evaluator.oracle().calls(), 8);
    assert!(evaluator.oracle().max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_unbounded_calls_overlap() {
    let mut oracle = ScriptedOracle::default();
    for id in 1..=4 {
        oracle = oracle.delay(id, 50);
    }
    let evaluator = per_rule(oracle);

    evaluator
        .evaluate(&rules(&[1, 2, 3, 4]), &context())
        .await
        .unwrap();

    assert!(evaluator.oracle().max_in_flight.load(Ordering::SeqCst) > 1);
}

#[tokio::test]
#[ignore] // 默认忽略，需要本机 Chrome：cargo test -- --ignored
async fn test_snapshot_real_page() {
    init_logging(false);

    let (mut browser, page) = launch_browser(Some("https://example.com"), false, None)
        .await
        .expect("启动浏览器失败");
    let executor = JsExecutor::new(page);

    let ctx = SnapshotService::new(true)
        .capture(&executor, "https://example.com")
        .await;

    assert!(ctx.structural_snapshot.contains("<body"));
    assert!(ctx.accessibility_representation.len() > 2);
    assert!(ctx.visual_snapshot.is_some());

    let _ = browser.close().await;
}
