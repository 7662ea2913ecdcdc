// tests/flow_tests.rs
mod common;

use common::*;
use merchforge::{ContextData, FlowError, FlowOutcome, Pipeline, SkipCondition, StepControl};
use serial_test::serial;
use std::sync::Arc;

fn record(step: &'static str) -> impl Fn(ContextData<TestContext>) -> std::future::Ready<Result<StepControl, TestError>> {
  move |ctx: ContextData<TestContext>| {
    let control = ctx.update(|c| {
      c.steps_executed.push(step.to_string());
      if c.should_stop_at.as_deref() == Some(step) {
        StepControl::Stop
      } else {
        StepControl::Continue
      }
    });
    std::future::ready(Ok(control))
  }
}

fn three_steps() -> Pipeline<TestContext, TestError> {
  Pipeline::new(&[("a", false, None), ("b", false, None), ("c", false, None)])
}

#[tokio::test]
#[serial]
async fn steps_run_in_declaration_order() {
  setup_tracing();
  let mut p = three_steps();
  p.on("c", record("c"));
  p.on("a", record("a"));
  p.on("b", record("b"));

  let ctx = ContextData::new(TestContext::default());
  let outcome = p.run(ctx.clone()).await;

  assert_eq!(outcome, Ok(FlowOutcome::Completed));
  assert_eq!(ctx.read().steps_executed, vec!["a", "b", "c"]);
  assert_eq!(p.step_names(), vec!["a", "b", "c"]);
}

#[tokio::test]
#[serial]
async fn before_on_after_run_in_phase_order() {
  setup_tracing();
  let mut p = Pipeline::<TestContext, TestError>::new(&[("only", false, None)]);
  p.after("only", record("after"));
  p.on("only", record("on-1"));
  p.before("only", record("before"));
  p.on("only", record("on-2"));

  let ctx = ContextData::new(TestContext::default());
  p.run(ctx.clone()).await.expect("run");

  assert_eq!(ctx.read().steps_executed, vec!["before", "on-1", "on-2", "after"]);
}

#[tokio::test]
#[serial]
async fn stop_halts_without_error() {
  setup_tracing();
  let mut p = three_steps();
  p.on("a", record("a"));
  p.on("b", record("b"));
  p.after("b", record("b-after"));
  p.on("c", record("c"));

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("b".to_string()),
    ..Default::default()
  });
  let outcome = p.run(ctx.clone()).await;

  assert_eq!(outcome, Ok(FlowOutcome::Stopped));
  assert_eq!(ctx.read().steps_executed, vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn handler_error_is_returned_unchanged() {
  setup_tracing();
  let mut p = three_steps();
  p.on("a", record("a"));
  p.on("b", |ctx: ContextData<TestContext>| async move {
    ctx.update(|c| c.steps_executed.push("b".to_string()));
    Err::<StepControl, _>(TestError::Handler("boom".to_string()))
  });
  p.on("c", record("c"));

  let ctx = ContextData::new(TestContext::default());
  let outcome = p.run(ctx.clone()).await;

  assert_eq!(outcome, Err(TestError::Handler("boom".to_string())));
  assert_eq!(ctx.read().steps_executed, vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_skips_every_phase() {
  setup_tracing();
  let skip_b: SkipCondition<TestContext> = Arc::new(|ctx: ContextData<TestContext>| ctx.read().skip_b);
  let mut p = Pipeline::<TestContext, TestError>::new(&[("a", false, None), ("b", false, Some(skip_b)), ("c", false, None)]);
  p.on("a", record("a"));
  p.before("b", record("b-before"));
  p.on("b", record("b"));
  p.on("c", record("c"));

  let ctx = ContextData::new(TestContext {
    skip_b: true,
    ..Default::default()
  });
  p.run(ctx.clone()).await.expect("run");
  assert_eq!(ctx.read().steps_executed, vec!["a", "c"]);

  let ctx = ContextData::new(TestContext::default());
  p.run(ctx.clone()).await.expect("run");
  assert_eq!(ctx.read().steps_executed, vec!["a", "b-before", "b", "c"]);
}

#[tokio::test]
#[serial]
async fn required_step_without_handlers_fails() {
  setup_tracing();
  let mut p = three_steps();
  p.on("a", record("a"));
  p.on("c", record("c"));

  let ctx = ContextData::new(TestContext::default());
  let outcome = p.run(ctx.clone()).await;

  let expected = TestError::from(FlowError::HandlerMissing {
    step_name: "b".to_string(),
  });
  assert_eq!(outcome, Err(expected));
  assert_eq!(ctx.read().steps_executed, vec!["a"]);
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut p = three_steps();
  p.set_optional("b", true).expect("b exists");
  p.on("a", record("a"));
  p.on("c", record("c"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(p.run(ctx.clone()).await, Ok(FlowOutcome::Completed));
  assert_eq!(ctx.read().steps_executed, vec!["a", "c"]);
}

#[tokio::test]
#[serial]
async fn before_each_sees_every_step_name() {
  setup_tracing();
  let mut p = three_steps();
  p.before_each(|name: &str, ctx: ContextData<TestContext>| {
    let entry = format!("enter:{}", name);
    async move {
      ctx.update(|c| c.steps_executed.push(entry));
      Ok::<_, TestError>(StepControl::Continue)
    }
  });
  p.on("a", record("a"));
  p.on("b", record("b"));
  p.on("c", record("c"));

  let ctx = ContextData::new(TestContext::default());
  p.run(ctx.clone()).await.expect("run");

  assert_eq!(
    ctx.read().steps_executed,
    vec!["enter:a", "a", "enter:b", "b", "enter:c", "c"]
  );
}

#[test]
fn reshaping_unknown_steps_is_reported() {
  let mut p = three_steps();
  assert!(matches!(
    p.set_skip_condition("missing", None),
    Err(FlowError::StepNotFound { step_name }) if step_name == "missing"
  ));
  assert!(matches!(p.set_optional("missing", true), Err(FlowError::StepNotFound { .. })));
  assert!(p.set_skip_condition("a", None).is_ok());
}

#[test]
#[should_panic(expected = "step 'nope' is not defined")]
fn registering_on_an_unknown_step_panics() {
  let mut p = three_steps();
  p.on("nope", record("nope"));
}
